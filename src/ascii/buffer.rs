//! Image and text buffers owned by a rendering context.
//!
//! Pixel writes follow a clip policy: a point outside the buffer is dropped,
//! a span is clamped to start inside the buffer and truncated at its end.
//! Region reads that feed back-conversion are checked instead, see
//! [`Region::check`].

use super::attr::Attr;
use crate::error::{AaError, Result};

/// Rectangle of cells, `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl Region {
    pub fn new(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The whole of a `width` x `height` buffer.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> usize {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> usize {
        self.y2.saturating_sub(self.y1)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// This region cut down to fit a `width` x `height` buffer.
    pub fn clip(&self, width: usize, height: usize) -> Region {
        let x2 = self.x2.min(width);
        let y2 = self.y2.min(height);
        Region::new(self.x1.min(x2), self.y1.min(y2), x2, y2)
    }

    /// Reject a region that does not lie inside a `width` x `height` buffer.
    pub fn check(&self, width: usize, height: usize) -> Result<()> {
        if self.x1 > self.x2 || self.y1 > self.y2 || self.x2 > width || self.y2 > height {
            return Err(AaError::Bounds {
                x1: self.x1,
                y1: self.y1,
                x2: self.x2,
                y2: self.y2,
                width,
                height,
            });
        }
        Ok(())
    }
}

/// Row-major grid of 8-bit luminance samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A black buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Write one pixel. Returns false if the point was outside and dropped.
    pub fn putpixel(&mut self, x: usize, y: usize, color: u8) -> bool {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = color;
            true
        } else {
            log::trace!("dropped pixel write at ({}, {})", x, y);
            false
        }
    }

    /// Copy `pixels` into the buffer starting at `(x, y)`, wrapping across rows.
    ///
    /// The start offset is clamped to the buffer and the span is truncated at
    /// its end. Returns the number of pixels written.
    pub fn putpixels(&mut self, x: usize, y: usize, pixels: &[u8]) -> usize {
        let start = self.offset(x, y);
        let len = pixels.len().min(self.data.len() - start);
        if len < pixels.len() {
            log::warn!(
                "pixel span at ({}, {}) truncated from {} to {} samples",
                x,
                y,
                pixels.len(),
                len
            );
        }
        self.data[start..start + len].copy_from_slice(&pixels[..len]);
        len
    }

    /// Read up to `len` pixels starting at `(x, y)`, wrapping across rows.
    pub fn pixels(&self, x: usize, y: usize, len: usize) -> &[u8] {
        let start = self.offset(x, y);
        let len = len.min(self.data.len() - start);
        &self.data[start..start + len]
    }

    /// Fill every pixel from a function of its coordinates.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize, usize) -> u8) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.data[y * self.width + x] = f(x, y);
            }
        }
    }

    /// Rounded mean of the `w` x `h` block at `(x, y)`, clipped to the buffer.
    pub fn block_average(&self, x: usize, y: usize, w: usize, h: usize) -> u8 {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        let mut sum = 0u32;
        let mut count = 0u32;
        for py in y..y_end {
            let row = &self.data[py * self.width..(py + 1) * self.width];
            for &p in &row[x.min(x_end)..x_end] {
                sum += p as u32;
                count += 1;
            }
        }
        if count == 0 {
            0
        } else {
            ((sum + count / 2) / count) as u8
        }
    }

    /// Copy the overlapping part of another buffer into this one.
    pub fn copy_from(&mut self, other: &PixelBuffer) {
        let w = self.width.min(other.width);
        for y in 0..self.height.min(other.height) {
            let src = &other.data[y * other.width..y * other.width + w];
            self.data[y * self.width..y * self.width + w].copy_from_slice(src);
        }
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        y.saturating_mul(self.width)
            .saturating_add(x)
            .min(self.data.len())
    }
}

/// Rendered cells for one region, ready to be applied to a [`TextBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPatch {
    pub region: Region,
    pub chars: Vec<u8>,
    pub attrs: Vec<Attr>,
}

impl TextPatch {
    pub fn new(region: Region) -> Self {
        let len = region.width() * region.height();
        Self {
            region,
            chars: vec![b' '; len],
            attrs: vec![Attr::Normal; len],
        }
    }

    /// Cell at `(x, y)` relative to the patch origin.
    pub fn get(&self, x: usize, y: usize) -> (u8, Attr) {
        let idx = y * self.region.width() + x;
        (self.chars[idx], self.attrs[idx])
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, ch: u8, attr: Attr) {
        let idx = y * self.region.width() + x;
        self.chars[idx] = ch;
        self.attrs[idx] = attr;
    }
}

/// Parallel character and attribute grids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    width: usize,
    height: usize,
    chars: Vec<u8>,
    attrs: Vec<Attr>,
}

impl TextBuffer {
    /// A buffer full of NORMAL spaces.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            chars: vec![b' '; width * height],
            attrs: vec![Attr::Normal; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn get(&self, x: usize, y: usize) -> Option<(u8, Attr)> {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            Some((self.chars[idx], self.attrs[idx]))
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, ch: u8, attr: Attr) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            self.chars[idx] = ch;
            self.attrs[idx] = attr;
        }
    }

    /// One row as `(chars, attrs)`.
    pub fn row(&self, y: usize) -> (&[u8], &[Attr]) {
        let range = y * self.width..(y + 1) * self.width;
        (&self.chars[range.clone()], &self.attrs[range])
    }

    /// Write `text` at `(x, y)` with `attr`, clipped at the end of the row.
    ///
    /// Characters outside Latin-1 are written as `?`.
    pub fn puts(&mut self, x: usize, y: usize, attr: Attr, text: &str) -> usize {
        if y >= self.height || x >= self.width {
            return 0;
        }
        let mut written = 0;
        for (col, ch) in (x..self.width).zip(text.chars()) {
            let code = u8::try_from(u32::from(ch)).unwrap_or(b'?');
            self.set(col, y, code, attr);
            written += 1;
        }
        written
    }

    /// Copy a rendered patch into place. Cells outside the buffer are skipped.
    pub fn apply(&mut self, patch: &TextPatch) {
        let region = patch.region;
        for dy in 0..region.height() {
            for dx in 0..region.width() {
                let (ch, attr) = patch.get(dx, dy);
                self.set(region.x1 + dx, region.y1 + dy, ch, attr);
            }
        }
    }

    /// Characters joined row by row with newlines (attributes dropped).
    pub fn to_string_display(&self) -> String {
        if self.width == 0 || self.height == 0 {
            return String::new();
        }
        self.chars
            .chunks(self.width)
            .map(|row| row.iter().map(|&c| c as char).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Pixels recovered from text, two by two per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpixelPatch {
    /// Source region in text cells.
    pub region: Region,
    /// `2 * region.width()` columns by `2 * region.height()` rows.
    pub pixels: PixelBuffer,
}
