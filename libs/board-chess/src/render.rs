mod font;

pub use self::font::BuiltinFont;

use fontdue::{Font, FontSettings};
use fontdue::layout::{Layout, LayoutSettings, CoordinateSystem, TextStyle};
use glam::{Vec2, UVec2};
use image::{DynamicImage, GenericImageView, ImageError, ImageResult, Pixel, Rgba, RgbaImage};
use image::imageops::FilterType;
use shakmaty::{Board, Color, Piece, Role, Square};

use std::io::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};



const WHITE: Rgba<u8> = Rgba([0xff; 4]);
const BLACK: Rgba<u8> = Rgba([0x00, 0x00, 0x00, 0xff]);

/// Every piece, in sprite storage order.
pub const PIECES: [Piece; 12] = [
  Piece { color: Color::White, role: Role::Pawn },
  Piece { color: Color::White, role: Role::Knight },
  Piece { color: Color::White, role: Role::Bishop },
  Piece { color: Color::White, role: Role::Rook },
  Piece { color: Color::White, role: Role::Queen },
  Piece { color: Color::White, role: Role::King },
  Piece { color: Color::Black, role: Role::Pawn },
  Piece { color: Color::Black, role: Role::Knight },
  Piece { color: Color::Black, role: Role::Bishop },
  Piece { color: Color::Black, role: Role::Rook },
  Piece { color: Color::Black, role: Role::Queen },
  Piece { color: Color::Black, role: Role::King }
];

/// Renders the given board on top of the board background, with rank numbers
/// in the left margin and file letters in the bottom margin.
/// Rank 8 is always at the top, file A is always on the left.
pub fn render_board(board: &Board, assets: &Assets) -> RgbaImage {
  let layout = assets.layout();
  let canvas_size = layout.canvas_size();
  let mut img = RgbaImage::from_pixel(canvas_size.x, canvas_size.y, WHITE);
  paste(&mut img, &assets.board, layout.board_origin());

  for label in layout.rank_labels().into_iter().chain(layout.file_labels()) {
    let mut text_temporary = [0x00];
    let text = label.text.encode_utf8(&mut text_temporary);
    assets.font.fill_text(&mut img, BLACK, text, TextOptions {
      pos: label.pos,
      size: layout.font_size()
    });
  };

  let square_size = layout.square_size();
  for square in board.occupied() {
    if let Some(piece) = board.piece_at(square) {
      let sprite = assets.pieces.get(piece);
      if sprite.dimensions() == (square_size, square_size) {
        copy(&mut img, sprite, layout.square_origin(square));
      } else {
        let sprite = image::imageops::resize(sprite, square_size, square_size, FilterType::Triangle);
        copy(&mut img, &sprite, layout.square_origin(square));
      };
    };
  };

  img
}

/// Pixel geometry of a rendered board, derived from the size of the board background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
  board_size: UVec2,
  square_size: u32,
  margin: u32
}

impl BoardLayout {
  pub fn new(board_size: UVec2) -> Self {
    let square_size = board_size.x / 8;
    BoardLayout { board_size, square_size, margin: square_size / 4 }
  }

  #[inline]
  pub fn board_size(&self) -> UVec2 {
    self.board_size
  }

  #[inline]
  pub fn square_size(&self) -> u32 {
    self.square_size
  }

  /// Width of the left label band, which is also the height of the bottom label band.
  #[inline]
  pub fn margin(&self) -> u32 {
    self.margin
  }

  #[inline]
  pub fn font_size(&self) -> u32 {
    self.square_size / 4
  }

  pub fn canvas_size(&self) -> UVec2 {
    self.board_size + self.margin
  }

  pub fn board_origin(&self) -> UVec2 {
    UVec2::new(self.margin, 0)
  }

  /// The top left pixel of the given square's grid cell.
  pub fn square_origin(&self, square: Square) -> UVec2 {
    let column = square.file() as u32;
    let row = 7 - square.rank() as u32;
    UVec2::new(column, row) * self.square_size + self.board_origin()
  }

  /// Rank labels from the top row to the bottom row.
  pub fn rank_labels(&self) -> [Label; 8] {
    let inset = (self.square_size - self.font_size()) / 2;
    std::array::from_fn(|row| {
      let row = row as u32;
      Label {
        text: char::from(b'8' - row as u8),
        pos: UVec2::new(self.margin / 4, row * self.square_size + inset)
      }
    })
  }

  /// File labels from the leftmost column to the rightmost column.
  pub fn file_labels(&self) -> [Label; 8] {
    let inset = (self.square_size - self.font_size()) / 2;
    std::array::from_fn(|column| {
      let column = column as u32;
      Label {
        text: char::from(b'a' + column as u8),
        pos: UVec2::new(column * self.square_size + self.margin + inset, self.board_size.y + self.margin / 8)
      }
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
  pub text: char,
  pub pos: UVec2
}

#[derive(Debug, Error)]
pub enum AssetError {
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error("failed to decode {path}: {error}", path = .0.display(), error = .1)]
  Decode(PathBuf, ImageError),
  #[error("board background is {0}x{1}, it must be at least 8x8")]
  BoardTooSmall(u32, u32)
}

#[derive(Debug, Error)]
pub enum FontError {
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error("invalid font data: {0}")]
  Parse(&'static str)
}

/// Where the board background, the piece sprites and the label font are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
  pub directory: PathBuf,
  /// Board background file name, relative to `directory`.
  pub board: PathBuf,
  /// TrueType font used for labels, the built-in font is used when this is missing.
  pub font: Option<PathBuf>
}

#[derive(Debug)]
pub struct Assets {
  board: RgbaImage,
  pieces: PieceSprites,
  font: LabelFont
}

impl Assets {
  pub fn new(board: RgbaImage, pieces: PieceSprites, font: LabelFont) -> Result<Self, AssetError> {
    if board.width() < 8 || board.height() < 8 {
      return Err(AssetError::BoardTooSmall(board.width(), board.height()));
    };

    Ok(Assets { board, pieces, font })
  }

  pub fn load(paths: &AssetPaths) -> Result<Self, AssetError> {
    let board = load_image(&paths.directory.join(&paths.board))?;
    let pieces = PieceSprites::try_from_fn(|piece| {
      load_image(&paths.directory.join(sprite_file_name(piece)))
    })?;
    let font = match &paths.font {
      Some(path) => LabelFont::load_or_builtin(path),
      None => LabelFont::Builtin
    };

    debug!("Loaded board background ({}x{}) and piece sprites", board.width(), board.height());
    Assets::new(board, pieces, font)
  }

  pub fn layout(&self) -> BoardLayout {
    BoardLayout::new(UVec2::from(self.board.dimensions()))
  }

  pub fn font(&self) -> &LabelFont {
    &self.font
  }
}

/// One sprite for each color and role combination.
#[derive(Debug, Clone)]
pub struct PieceSprites {
  sprites: Vec<RgbaImage>
}

impl PieceSprites {
  pub fn from_fn(mut f: impl FnMut(Piece) -> RgbaImage) -> Self {
    PieceSprites { sprites: PIECES.iter().map(|&piece| f(piece)).collect() }
  }

  pub fn try_from_fn<E>(mut f: impl FnMut(Piece) -> Result<RgbaImage, E>) -> Result<Self, E> {
    PIECES.iter().map(|&piece| f(piece)).collect::<Result<Vec<_>, E>>()
      .map(|sprites| PieceSprites { sprites })
  }

  pub fn get(&self, piece: Piece) -> &RgbaImage {
    &self.sprites[sprite_index(piece)]
  }
}

fn sprite_index(piece: Piece) -> usize {
  let column = match piece.role {
    Role::Pawn => 0,
    Role::Knight => 1,
    Role::Bishop => 2,
    Role::Rook => 3,
    Role::Queen => 4,
    Role::King => 5
  };

  let row = match piece.color {
    Color::White => 0,
    Color::Black => 1
  };

  row * 6 + column
}

/// The file name of the sprite for the given piece, inside the asset directory.
pub fn sprite_file_name(piece: Piece) -> &'static str {
  match (piece.color, piece.role) {
    (Color::White, Role::King) => "white_king.png",
    (Color::White, Role::Queen) => "white_queen.png",
    (Color::White, Role::Rook) => "white_rook.png",
    (Color::White, Role::Bishop) => "white_bishop.png",
    (Color::White, Role::Knight) => "white_knight.png",
    (Color::White, Role::Pawn) => "white_pawn.png",
    (Color::Black, Role::King) => "black_king.png",
    (Color::Black, Role::Queen) => "black_queen.png",
    (Color::Black, Role::Rook) => "black_rook.png",
    (Color::Black, Role::Bishop) => "black_bishop.png",
    (Color::Black, Role::Knight) => "black_knight.png",
    (Color::Black, Role::Pawn) => "black_pawn.png"
  }
}

fn load_image(path: &Path) -> Result<RgbaImage, AssetError> {
  let bytes = fs_err::read(path)?;
  decode_image(Cursor::new(bytes))
    .map(DynamicImage::into_rgba8)
    .map_err(|error| AssetError::Decode(path.to_owned(), error))
}

#[derive(Debug)]
pub enum LabelFont {
  TrueType(Font),
  Builtin
}

impl LabelFont {
  pub fn load(path: &Path) -> Result<Self, FontError> {
    let bytes = fs_err::read(path)?;
    Font::from_bytes(bytes.as_slice(), FontSettings::default())
      .map(LabelFont::TrueType)
      .map_err(FontError::Parse)
  }

  /// Loads the given font, falling back to [`LabelFont::Builtin`] if it cannot be used.
  pub fn load_or_builtin(path: &Path) -> Self {
    match LabelFont::load(path) {
      Ok(font) => {
        debug!("Loaded label font {}", path.display());
        font
      },
      Err(error) => {
        warn!("Failed to load label font {}, using the built-in font: {error}", path.display());
        LabelFont::Builtin
      }
    }
  }

  pub fn is_builtin(&self) -> bool {
    matches!(self, LabelFont::Builtin)
  }

  fn fill_text(&self, destination: &mut RgbaImage, pixel: Rgba<u8>, text: &str, text_options: TextOptions) {
    match self {
      LabelFont::TrueType(font) => fill_text(destination, pixel, text, font, text_options),
      LabelFont::Builtin => BuiltinFont.fill_text(destination, pixel, text, text_options.pos, text_options.size)
    }
  }
}

#[derive(Debug, Clone, Copy)]
struct TextOptions {
  pos: UVec2,
  size: u32
}

fn fill_text(destination: &mut RgbaImage, pixel: Rgba<u8>, text: &str, font: &Font, text_options: TextOptions) {
  let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
  layout.reset(&LayoutSettings {
    x: text_options.pos.x as f32,
    y: text_options.pos.y as f32,
    ..LayoutSettings::default()
  });

  layout.append(&[font], &TextStyle::new(text, text_options.size as f32, 0));
  for glyph in layout.glyphs() {
    let glyph_offset = Vec2::new(glyph.x, glyph.y).round().as_ivec2();
    let (metrics, bitmap) = font.rasterize_config(glyph.key);
    for sx in 0..metrics.width {
      for sy in 0..metrics.height {
        let alpha = bitmap[sx + sy * metrics.width];
        if alpha == 0x00 { continue };

        let s_pos = UVec2::new(sx as u32, sy as u32);
        let destination_pos = s_pos.checked_add_signed(glyph_offset)
          .filter(|pos| destination.width() > pos.x && destination.height() > pos.y);
        if let Some(destination_pos) = destination_pos {
          let source_pixel = Rgba([pixel[0], pixel[1], pixel[2], alpha]);
          blend(destination.get_pixel_mut(destination_pos.x, destination_pos.y), source_pixel);
        };
      };
    };
  };
}

/// Overwrites the destination with the source, including transparent pixels.
fn paste(destination: &mut RgbaImage, source: &RgbaImage, pos: UVec2) {
  for (sx, sy, source_pixel) in source.enumerate_pixels() {
    let pos = pos + UVec2::new(sx, sy);
    if destination.width() > pos.x && destination.height() > pos.y {
      destination.put_pixel(pos.x, pos.y, *source_pixel);
    };
  };
}

/// Alpha-composites the source over the destination.
fn copy<S>(destination: &mut RgbaImage, source: &S, pos: UVec2)
where S: GenericImageView<Pixel = Rgba<u8>> {
  for sx in 0..source.width() {
    for sy in 0..source.height() {
      let pos = pos + UVec2::new(sx, sy);
      if destination.width() > pos.x && destination.height() > pos.y {
        blend(destination.get_pixel_mut(pos.x, pos.y), source.get_pixel(sx, sy));
      };
    };
  };
}

fn blend(destination_pixel: &mut Rgba<u8>, source_pixel: Rgba<u8>) {
  match source_pixel[3] {
    0x00 => (),
    0xff => *destination_pixel = source_pixel,
    _ => destination_pixel.blend(&source_pixel)
  };
}

pub fn encode_image_rgba<W: Write>(img: &RgbaImage, writer: W) -> ImageResult<()> {
  use image::{ExtendedColorType, ImageEncoder};
  use image::codecs::png::{CompressionType, FilterType, PngEncoder};
  PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive)
    .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
}

pub fn decode_image<R: BufRead + Seek>(reader: R) -> ImageResult<DynamicImage> {
  image::codecs::png::PngDecoder::new(reader).and_then(DynamicImage::from_decoder)
}
