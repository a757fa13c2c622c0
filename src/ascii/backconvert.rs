//! Text back to pixels.
//!
//! Each cell becomes a 2x2 block of sub-pixels read from the lookup table.
//! The result only approximates the original image, but rendering it again
//! yields the same glyphs.

use super::attr::Attr;
use super::buffer::{PixelBuffer, Region, SubpixelPatch, TextBuffer};
use super::table::LookupTable;
use crate::error::Result;

/// Convert `region` of `text` into a patch of sub-pixels.
///
/// Fails with `Bounds` if the region does not lie inside the text buffer.
pub fn backconvert(text: &TextBuffer, region: Region, table: &LookupTable) -> Result<SubpixelPatch> {
    region.check(text.width(), text.height())?;

    let mut pixels = PixelBuffer::new(region.width() * 2, region.height() * 2);
    for dy in 0..region.height() {
        for dx in 0..region.width() {
            let Some((ch, attr)) = text.get(region.x1 + dx, region.y1 + dy) else {
                continue;
            };
            let [tl, tr, bl, br] = cell_subpixels(table, ch, attr);
            pixels.putpixel(dx * 2, dy * 2, tl);
            pixels.putpixel(dx * 2 + 1, dy * 2, tr);
            pixels.putpixel(dx * 2, dy * 2 + 1, bl);
            pixels.putpixel(dx * 2 + 1, dy * 2 + 1, br);
        }
    }

    Ok(SubpixelPatch { region, pixels })
}

/// Two pixel rows approximating `len` cells of text starting at `(x, y)`.
///
/// The span runs on across row ends. Its start is clamped to the buffer and
/// it is truncated at the end of the buffer, like [`PixelBuffer::pixels`].
pub fn pixels_from_text(
    text: &TextBuffer,
    x: usize,
    y: usize,
    len: usize,
    table: &LookupTable,
) -> (Vec<u8>, Vec<u8>) {
    let cells = text.width() * text.height();
    let start = y.saturating_mul(text.width()).saturating_add(x).min(cells);
    let len = len.min(cells - start);

    let mut top = Vec::with_capacity(len * 2);
    let mut bottom = Vec::with_capacity(len * 2);
    for pos in start..start + len {
        let ch = text.chars()[pos];
        let attr = text.attrs()[pos];
        let [tl, tr, bl, br] = cell_subpixels(table, ch, attr);
        top.extend_from_slice(&[tl, tr]);
        bottom.extend_from_slice(&[bl, br]);
    }
    (top, bottom)
}

fn cell_subpixels(table: &LookupTable, ch: u8, attr: Attr) -> [u8; 4] {
    // SPECIAL has no entry of its own.
    let attr = if attr == Attr::Special { Attr::Reverse } else { attr };
    table.subpixels(ch, attr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::font::{Font, FontMetrics};
    use crate::ascii::params::{HardwareParams, RenderParams};
    use crate::ascii::table::{TableOptions, SUBPIXEL_ORDER};
    use crate::error::AaError;

    fn table() -> LookupTable {
        let metrics = FontMetrics::from_font(&Font::builtin());
        LookupTable::build(
            &metrics,
            &RenderParams::default(),
            &TableOptions::from(&HardwareParams::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_subpixels_follow_fixed_order() {
        let t = table();
        let mut text = TextBuffer::new(1, 1);
        text.puts(0, 0, Attr::Normal, "_");
        let patch = backconvert(&text, Region::full(1, 1), &t).unwrap();

        let stored = t.entry(b'_', Attr::Normal).subpixels;
        assert_eq!(patch.pixels.get(0, 0), Some(stored[SUBPIXEL_ORDER[0]]));
        assert_eq!(patch.pixels.get(1, 0), Some(stored[SUBPIXEL_ORDER[1]]));
        assert_eq!(patch.pixels.get(0, 1), Some(stored[SUBPIXEL_ORDER[2]]));
        assert_eq!(patch.pixels.get(1, 1), Some(stored[SUBPIXEL_ORDER[3]]));
        // Underscore only lights the bottom half.
        assert_eq!(patch.pixels.get(0, 0), Some(0));
        assert!(patch.pixels.get(0, 1).unwrap() > 0);
    }

    #[test]
    fn test_special_reads_reverse() {
        let t = table();
        let mut text = TextBuffer::new(2, 1);
        text.puts(0, 0, Attr::Special, "A");
        text.puts(1, 0, Attr::Reverse, "A");
        let patch = backconvert(&text, Region::full(2, 1), &t).unwrap();
        assert_eq!(patch.pixels.pixels(0, 0, 2), patch.pixels.pixels(2, 0, 2));
        assert_eq!(patch.pixels.pixels(0, 1, 2), patch.pixels.pixels(2, 1, 2));
    }

    #[test]
    fn test_region_outside_rejected() {
        let t = table();
        let text = TextBuffer::new(4, 4);
        let err = backconvert(&text, Region::new(0, 0, 5, 4), &t).unwrap_err();
        assert!(matches!(err, AaError::Bounds { .. }));
    }

    #[test]
    fn test_pixels_from_text_matches_backconvert() {
        let t = table();
        let mut text = TextBuffer::new(6, 2);
        text.puts(0, 0, Attr::Normal, "ab#@ .");
        text.puts(0, 1, Attr::Bold, "XYZ");

        let (top, bottom) = pixels_from_text(&text, 1, 0, 3, &t);
        let patch = backconvert(&text, Region::new(1, 0, 4, 1), &t).unwrap();
        assert_eq!(top.as_slice(), patch.pixels.pixels(0, 0, 6));
        assert_eq!(bottom.as_slice(), patch.pixels.pixels(0, 1, 6));
    }

    #[test]
    fn test_pixels_from_text_truncates() {
        let t = table();
        let text = TextBuffer::new(4, 1);
        let (top, bottom) = pixels_from_text(&text, 2, 0, 10, &t);
        assert_eq!(top.len(), 4);
        assert_eq!(bottom.len(), 4);
    }
}
