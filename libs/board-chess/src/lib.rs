#![warn(missing_debug_implementations)]
#[macro_use] extern crate log;
#[macro_use] extern crate thiserror;
pub extern crate shakmaty;
pub extern crate image;
extern crate fontdue;
extern crate fs_err;
extern crate glam;

pub mod game;
pub mod render;
