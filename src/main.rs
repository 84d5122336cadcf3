#![warn(missing_debug_implementations)]
#[macro_use] extern crate log;
#[macro_use] extern crate serde;
#[macro_use] extern crate thiserror;
extern crate board_chess;
extern crate chrono;
extern crate fern;
extern crate fs_err;
extern crate itertools;
extern crate linefeed;
extern crate toml;

pub(crate) mod utils;
pub(crate) mod config;
pub(crate) mod input;
pub(crate) mod session;

use crate::config::Config;

use board_chess::render::{AssetError, Assets};

use std::sync::mpsc::{channel, Receiver, Sender};

fn main() {
  let (sender, receiver) = channel();
  if let Err(error) = setup_logger(sender) {
    return eprintln!("Logger Error: {error}");
  };

  if let Err(error) = launch(&receiver) {
    error!("{error}");
  };

  // anything logged outside of the session loop has not been printed yet
  for line in receiver.try_iter() {
    eprint!("{line}");
  };
}

fn launch(receiver: &Receiver<String>) -> ViewerResult {
  let config = Config::create()?;
  let assets = Assets::load(&config.assets.paths())?;
  info!("Loaded assets from {}", config.assets.directory.display());
  crate::session::run(&config, &assets, receiver)
}

pub type ViewerResult<T = ()> = Result<T, ViewerError>;

#[derive(Debug, Error)]
pub enum ViewerError {
  #[error("File Error: {1} ({0})")]
  FileError(ViewerFileError, String),
  #[error("Asset Error: {0}")]
  AssetError(#[from] AssetError)
}

#[derive(Debug, Error)]
pub enum ViewerFileError {
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),
  #[error(transparent)]
  Image(#[from] board_chess::image::ImageError)
}

fn setup_logger(sender: Sender<String>) -> Result<(), fern::InitError> {
  let me = env!("CARGO_PKG_NAME").replace('-', "_");
  fern::Dispatch::new()
    .format(move |out, message, record| {
      out.finish(format_args!(
        "{}[{}]({}) {}",
        chrono::Local::now().format("[%H:%M:%S]"),
        record.level(),
        record.target(),
        message
      ))
    })
    .level(log::LevelFilter::Warn)
    .level_for(me, log::LevelFilter::Trace)
    .level_for("board_chess", log::LevelFilter::Trace)
    .chain({
      fern::Dispatch::new()
        .level(log::LevelFilter::Info)
        .chain(sender)
    })
    .chain({
      fs_err::create_dir_all("./data/")?;
      fern::log_file("./data/latest.log")?
    })
    .apply()?;
  Ok(())
}
