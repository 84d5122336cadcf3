use crate::{ViewerError, ViewerFileError, ViewerResult};

use board_chess::shakmaty::Color;

use std::error::Error;

pub fn color_name(color: Color) -> &'static str {
  match color {
    Color::White => "White",
    Color::Black => "Black"
  }
}

pub trait Contextualize {
  type Output;

  fn context(self, context: impl Into<String>) -> Self::Output;
}

impl<T, E> Contextualize for Result<T, E>
where E: Into<ViewerFileError> {
  type Output = ViewerResult<T>;

  fn context(self, context: impl Into<String>) -> Self::Output {
    self.map_err(|error| {
      ViewerError::FileError(error.into(), context.into())
    })
  }
}

pub trait Loggable {
  fn log(self);
}

impl<T, E: Error> Loggable for Result<T, E> {
  fn log(self) {
    if let Err(error) = self {
      error!("{error}");
    };
  }
}
