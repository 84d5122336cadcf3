//! A tiny 5x7 bitmap font, used for board labels when no TrueType font is available.

use glam::UVec2;
use image::{Rgba, RgbaImage};

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

type Glyph = [u8; GLYPH_HEIGHT as usize];

// each row is 5 bits wide, the highest bit is the leftmost column
const GLYPH_UNKNOWN: Glyph = [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111];

fn glyph(ch: char) -> Glyph {
  match ch {
    '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    '3' => [0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110],
    '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
    'a' => [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
    'b' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b11110],
    'c' => [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110],
    'd' => [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111],
    'e' => [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
    'f' => [0b00110, 0b01001, 0b01000, 0b11100, 0b01000, 0b01000, 0b01000],
    'g' => [0b00000, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
    'h' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
    ' ' => [0b00000; GLYPH_HEIGHT as usize],
    _ => GLYPH_UNKNOWN
  }
}

/// Covers the digits and the file letters `a` through `h`,
/// anything else is drawn as an empty box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFont;

impl BuiltinFont {
  /// Integer pixel scale used for the given font size, glyphs are never drawn smaller than 5x7.
  pub fn scale(size: u32) -> u32 {
    (size / (GLYPH_HEIGHT + 1)).max(1)
  }

  /// The width and height of the given text when drawn at the given font size.
  pub fn measure(text: &str, size: u32) -> UVec2 {
    let scale = Self::scale(size);
    let count = text.chars().count() as u32;
    let width = (count * GLYPH_ADVANCE).saturating_sub(1) * scale;
    UVec2::new(width, GLYPH_HEIGHT * scale)
  }

  pub fn fill_text(&self, destination: &mut RgbaImage, pixel: Rgba<u8>, text: &str, pos: UVec2, size: u32) {
    let scale = Self::scale(size);
    for (i, ch) in text.chars().enumerate() {
      let origin = pos + UVec2::new(i as u32 * GLYPH_ADVANCE * scale, 0);
      for (row, bits) in glyph(ch).into_iter().enumerate() {
        for column in 0..GLYPH_WIDTH {
          if bits & (0b10000 >> column) == 0 { continue };
          let cell = origin + UVec2::new(column, row as u32) * scale;
          fill_cell(destination, pixel, cell, scale);
        };
      };
    };
  }
}

fn fill_cell(destination: &mut RgbaImage, pixel: Rgba<u8>, pos: UVec2, size: u32) {
  for sx in pos.x..(pos.x + size).min(destination.width()) {
    for sy in pos.y..(pos.y + size).min(destination.height()) {
      destination.put_pixel(sx, sy, pixel);
    };
  };
}
