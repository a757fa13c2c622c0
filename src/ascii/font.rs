//! Bitmap fonts and the per-glyph brightness metrics derived from them.
//!
//! Fonts are 8 pixels wide; each glyph is `height` bytes, one byte per row,
//! most significant bit leftmost. A font always covers all 256 codes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::{AaError, Result};

/// Number of glyph codes in a font.
pub const GLYPHS: usize = 256;

/// Width of every glyph in pixels.
pub const GLYPH_WIDTH: usize = 8;

/// An 8-pixel-wide bitmap font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    name: String,
    height: usize,
    data: Vec<u8>,
}

impl Font {
    /// Create a font from raw bitmap data (`256 * height` bytes).
    pub fn new(name: impl Into<String>, height: usize, data: Vec<u8>) -> Result<Self> {
        if height < 2 {
            return Err(AaError::Config(format!(
                "font height must be at least 2 rows, got {}",
                height
            )));
        }
        if data.len() != GLYPHS * height {
            return Err(AaError::Config(format!(
                "font data must be {} bytes for height {}, got {}",
                GLYPHS * height,
                height,
                data.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            height,
            data,
        })
    }

    /// The built-in 8x8 font covering printable ASCII.
    pub fn builtin() -> Self {
        let mut data = vec![0u8; GLYPHS * 8];
        for (i, rows) in BUILTIN_8X8.iter().enumerate() {
            let code = FIRST_PRINTABLE + i;
            data[code * 8..code * 8 + 8].copy_from_slice(rows);
        }
        Self {
            name: "builtin 8x8".to_string(),
            height: 8,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bitmap rows of glyph `code`.
    pub fn glyph(&self, code: u8) -> &[u8] {
        let start = code as usize * self.height;
        &self.data[start..start + self.height]
    }

    /// Stable fingerprint of the font contents, used as a cache key.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.name.hash(&mut hasher);
        self.height.hash(&mut hasher);
        self.data.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Brightness signature of one glyph.
///
/// Coverage values are fractions (0.0-1.0) of lit pixels per quadrant, in
/// top-left, top-right, bottom-left, bottom-right order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
    /// Quadrant coverage of the plain bitmap.
    pub normal: [f32; 4],
    /// Quadrant coverage of the emboldened bitmap (`row | row >> 1`).
    pub bold: [f32; 4],
}

impl GlyphMetrics {
    /// Whole-cell coverage of the plain bitmap.
    pub fn brightness(&self) -> f32 {
        self.normal.iter().sum::<f32>() / 4.0
    }

    /// Whole-cell coverage of the emboldened bitmap.
    pub fn bold_brightness(&self) -> f32 {
        self.bold.iter().sum::<f32>() / 4.0
    }
}

/// Per-glyph metrics for a whole font. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    name: String,
    fingerprint: u64,
    glyphs: Vec<GlyphMetrics>,
}

impl FontMetrics {
    /// Derive quadrant coverage for every glyph of `font`.
    pub fn from_font(font: &Font) -> Self {
        let glyphs = (0..GLYPHS)
            .map(|code| {
                let rows = font.glyph(code as u8);
                let bold_rows: Vec<u8> = rows.iter().map(|&r| r | (r >> 1)).collect();
                GlyphMetrics {
                    normal: quadrant_coverage(rows),
                    bold: quadrant_coverage(&bold_rows),
                }
            })
            .collect();

        Self {
            name: font.name().to_string(),
            fingerprint: font.fingerprint(),
            glyphs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn glyph(&self, code: u8) -> &GlyphMetrics {
        &self.glyphs[code as usize]
    }
}

/// Fraction of lit pixels in each quadrant of a glyph bitmap.
fn quadrant_coverage(rows: &[u8]) -> [f32; 4] {
    let half = rows.len() / 2;
    let (top, bottom) = rows.split_at(half);
    let half_width = (GLYPH_WIDTH / 2) as f32;

    let count = |rows: &[u8], mask: u8| -> f32 {
        if rows.is_empty() {
            return 0.0;
        }
        let lit: u32 = rows.iter().map(|r| (r & mask).count_ones()).sum();
        lit as f32 / (rows.len() as f32 * half_width)
    };

    [
        count(top, 0xF0),
        count(top, 0x0F),
        count(bottom, 0xF0),
        count(bottom, 0x0F),
    ]
}

const FIRST_PRINTABLE: usize = 32;

/// 8x8 glyphs for codes 32 (space) through 126 (tilde).
#[rustfmt::skip]
const BUILTIN_8X8: [[u8; 8]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x18, 0x3C, 0x3C, 0x18, 0x18, 0x00, 0x18, 0x00], // '!'
    [0x6C, 0x6C, 0x24, 0x00, 0x00, 0x00, 0x00, 0x00], // '"'
    [0x6C, 0x6C, 0xFE, 0x6C, 0xFE, 0x6C, 0x6C, 0x00], // '#'
    [0x18, 0x3E, 0x60, 0x3C, 0x06, 0x7C, 0x18, 0x00], // '$'
    [0x00, 0xC6, 0xCC, 0x18, 0x30, 0x66, 0xC6, 0x00], // '%'
    [0x38, 0x6C, 0x38, 0x76, 0xDC, 0xCC, 0x76, 0x00], // '&'
    [0x18, 0x18, 0x30, 0x00, 0x00, 0x00, 0x00, 0x00], // '\''
    [0x0C, 0x18, 0x30, 0x30, 0x30, 0x18, 0x0C, 0x00], // '('
    [0x30, 0x18, 0x0C, 0x0C, 0x0C, 0x18, 0x30, 0x00], // ')'
    [0x00, 0x66, 0x3C, 0xFF, 0x3C, 0x66, 0x00, 0x00], // '*'
    [0x00, 0x18, 0x18, 0x7E, 0x18, 0x18, 0x00, 0x00], // '+'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x30], // ','
    [0x00, 0x00, 0x00, 0x7E, 0x00, 0x00, 0x00, 0x00], // '-'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x00], // '.'
    [0x06, 0x0C, 0x18, 0x30, 0x60, 0xC0, 0x80, 0x00], // '/'
    [0x3C, 0x66, 0x6E, 0x76, 0x66, 0x66, 0x3C, 0x00], // '0'
    [0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00], // '1'
    [0x3C, 0x66, 0x06, 0x0C, 0x18, 0x30, 0x7E, 0x00], // '2'
    [0x3C, 0x66, 0x06, 0x1C, 0x06, 0x66, 0x3C, 0x00], // '3'
    [0x0C, 0x1C, 0x3C, 0x6C, 0x7E, 0x0C, 0x0C, 0x00], // '4'
    [0x7E, 0x60, 0x7C, 0x06, 0x06, 0x66, 0x3C, 0x00], // '5'
    [0x1C, 0x30, 0x60, 0x7C, 0x66, 0x66, 0x3C, 0x00], // '6'
    [0x7E, 0x06, 0x0C, 0x18, 0x30, 0x30, 0x30, 0x00], // '7'
    [0x3C, 0x66, 0x66, 0x3C, 0x66, 0x66, 0x3C, 0x00], // '8'
    [0x3C, 0x66, 0x66, 0x3E, 0x06, 0x0C, 0x38, 0x00], // '9'
    [0x00, 0x18, 0x18, 0x00, 0x18, 0x18, 0x00, 0x00], // ':'
    [0x00, 0x18, 0x18, 0x00, 0x18, 0x18, 0x30, 0x00], // ';'
    [0x0C, 0x18, 0x30, 0x60, 0x30, 0x18, 0x0C, 0x00], // '<'
    [0x00, 0x00, 0x7E, 0x00, 0x7E, 0x00, 0x00, 0x00], // '='
    [0x30, 0x18, 0x0C, 0x06, 0x0C, 0x18, 0x30, 0x00], // '>'
    [0x3C, 0x66, 0x0C, 0x18, 0x18, 0x00, 0x18, 0x00], // '?'
    [0x3C, 0x66, 0x6E, 0x6E, 0x60, 0x62, 0x3C, 0x00], // '@'
    [0x3C, 0x66, 0x66, 0x7E, 0x66, 0x66, 0x66, 0x00], // 'A'
    [0x7C, 0x66, 0x66, 0x7C, 0x66, 0x66, 0x7C, 0x00], // 'B'
    [0x3C, 0x66, 0x60, 0x60, 0x60, 0x66, 0x3C, 0x00], // 'C'
    [0x78, 0x6C, 0x66, 0x66, 0x66, 0x6C, 0x78, 0x00], // 'D'
    [0x7E, 0x60, 0x60, 0x7C, 0x60, 0x60, 0x7E, 0x00], // 'E'
    [0x7E, 0x60, 0x60, 0x7C, 0x60, 0x60, 0x60, 0x00], // 'F'
    [0x3C, 0x66, 0x60, 0x6E, 0x66, 0x66, 0x3C, 0x00], // 'G'
    [0x66, 0x66, 0x66, 0x7E, 0x66, 0x66, 0x66, 0x00], // 'H'
    [0x7E, 0x18, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00], // 'I'
    [0x1E, 0x0C, 0x0C, 0x0C, 0x0C, 0x6C, 0x38, 0x00], // 'J'
    [0x66, 0x6C, 0x78, 0x70, 0x78, 0x6C, 0x66, 0x00], // 'K'
    [0x60, 0x60, 0x60, 0x60, 0x60, 0x60, 0x7E, 0x00], // 'L'
    [0x63, 0x77, 0x7F, 0x6B, 0x63, 0x63, 0x63, 0x00], // 'M'
    [0x66, 0x76, 0x7E, 0x7E, 0x6E, 0x66, 0x66, 0x00], // 'N'
    [0x3C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x00], // 'O'
    [0x7C, 0x66, 0x66, 0x7C, 0x60, 0x60, 0x60, 0x00], // 'P'
    [0x3C, 0x66, 0x66, 0x66, 0x6A, 0x6C, 0x36, 0x00], // 'Q'
    [0x7C, 0x66, 0x66, 0x7C, 0x6C, 0x66, 0x66, 0x00], // 'R'
    [0x3C, 0x66, 0x60, 0x3C, 0x06, 0x66, 0x3C, 0x00], // 'S'
    [0x7E, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x00], // 'T'
    [0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x00], // 'U'
    [0x66, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x18, 0x00], // 'V'
    [0x63, 0x63, 0x63, 0x6B, 0x7F, 0x77, 0x63, 0x00], // 'W'
    [0x66, 0x66, 0x3C, 0x18, 0x3C, 0x66, 0x66, 0x00], // 'X'
    [0x66, 0x66, 0x66, 0x3C, 0x18, 0x18, 0x18, 0x00], // 'Y'
    [0x7E, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x7E, 0x00], // 'Z'
    [0x3C, 0x30, 0x30, 0x30, 0x30, 0x30, 0x3C, 0x00], // '['
    [0xC0, 0x60, 0x30, 0x18, 0x0C, 0x06, 0x02, 0x00], // '\\'
    [0x3C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x3C, 0x00], // ']'
    [0x10, 0x38, 0x6C, 0xC6, 0x00, 0x00, 0x00, 0x00], // '^'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF], // '_'
    [0x30, 0x18, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00], // '`'
    [0x00, 0x00, 0x3C, 0x06, 0x3E, 0x66, 0x3E, 0x00], // 'a'
    [0x60, 0x60, 0x7C, 0x66, 0x66, 0x66, 0x7C, 0x00], // 'b'
    [0x00, 0x00, 0x3C, 0x66, 0x60, 0x66, 0x3C, 0x00], // 'c'
    [0x06, 0x06, 0x3E, 0x66, 0x66, 0x66, 0x3E, 0x00], // 'd'
    [0x00, 0x00, 0x3C, 0x66, 0x7E, 0x60, 0x3C, 0x00], // 'e'
    [0x1C, 0x30, 0x30, 0x7C, 0x30, 0x30, 0x30, 0x00], // 'f'
    [0x00, 0x00, 0x3E, 0x66, 0x66, 0x3E, 0x06, 0x3C], // 'g'
    [0x60, 0x60, 0x7C, 0x66, 0x66, 0x66, 0x66, 0x00], // 'h'
    [0x18, 0x00, 0x38, 0x18, 0x18, 0x18, 0x3C, 0x00], // 'i'
    [0x0C, 0x00, 0x1C, 0x0C, 0x0C, 0x0C, 0x6C, 0x38], // 'j'
    [0x60, 0x60, 0x66, 0x6C, 0x78, 0x6C, 0x66, 0x00], // 'k'
    [0x38, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3C, 0x00], // 'l'
    [0x00, 0x00, 0x76, 0x7F, 0x6B, 0x6B, 0x63, 0x00], // 'm'
    [0x00, 0x00, 0x7C, 0x66, 0x66, 0x66, 0x66, 0x00], // 'n'
    [0x00, 0x00, 0x3C, 0x66, 0x66, 0x66, 0x3C, 0x00], // 'o'
    [0x00, 0x00, 0x7C, 0x66, 0x66, 0x7C, 0x60, 0x60], // 'p'
    [0x00, 0x00, 0x3E, 0x66, 0x66, 0x3E, 0x06, 0x06], // 'q'
    [0x00, 0x00, 0x6E, 0x70, 0x60, 0x60, 0x60, 0x00], // 'r'
    [0x00, 0x00, 0x3E, 0x60, 0x3C, 0x06, 0x7C, 0x00], // 's'
    [0x30, 0x30, 0x7C, 0x30, 0x30, 0x30, 0x1C, 0x00], // 't'
    [0x00, 0x00, 0x66, 0x66, 0x66, 0x66, 0x3E, 0x00], // 'u'
    [0x00, 0x00, 0x66, 0x66, 0x66, 0x3C, 0x18, 0x00], // 'v'
    [0x00, 0x00, 0x63, 0x6B, 0x6B, 0x7F, 0x36, 0x00], // 'w'
    [0x00, 0x00, 0x66, 0x3C, 0x18, 0x3C, 0x66, 0x00], // 'x'
    [0x00, 0x00, 0x66, 0x66, 0x66, 0x3E, 0x06, 0x3C], // 'y'
    [0x00, 0x00, 0x7E, 0x0C, 0x18, 0x30, 0x7E, 0x00], // 'z'
    [0x0E, 0x18, 0x18, 0x70, 0x18, 0x18, 0x0E, 0x00], // '{'
    [0x18, 0x18, 0x18, 0x00, 0x18, 0x18, 0x18, 0x00], // '|'
    [0x70, 0x18, 0x18, 0x0E, 0x18, 0x18, 0x70, 0x00], // '}'
    [0x76, 0xDC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // '~'
];
