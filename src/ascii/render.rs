//! Image-to-text renderer.
//!
//! Each text cell covers a `mulx` x `muly` block of the pixel buffer. The
//! block's mean luminance is adjusted (brightness, inversion, jitter,
//! dithering) and looked up in the table. The pixel buffer is never touched
//! and nothing is flushed; callers apply the returned patch.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::buffer::{PixelBuffer, Region, TextPatch};
use super::dither::DitherEngine;
use super::params::RenderParams;
use super::table::LookupTable;
use crate::error::{AaError, Result};

/// Pixels per text cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    pub mulx: usize,
    pub muly: usize,
}

impl CellSize {
    pub fn new(mulx: usize, muly: usize) -> Self {
        Self { mulx, muly }
    }

    /// Text cells that fit into a pixel buffer.
    pub fn text_dims(&self, pixels: &PixelBuffer) -> (usize, usize) {
        (
            pixels.width() / self.mulx.max(1),
            pixels.height() / self.muly.max(1),
        )
    }
}

/// Render `region` (text coordinates, clipped to the screen) of `pixels`.
///
/// Fails with `Config` if `table` was built for a different contrast or
/// gamma than `params`; the caller has to rebuild it.
pub fn render(
    pixels: &PixelBuffer,
    cell: CellSize,
    region: Region,
    table: &LookupTable,
    params: &RenderParams,
) -> Result<TextPatch> {
    params.validate()?;
    if !table.key().matches_params(params) {
        return Err(AaError::Config(format!(
            "lookup table was built for contrast {} / gamma {}, not contrast {} / gamma {}",
            table.params().contrast,
            table.params().gamma,
            params.contrast,
            params.gamma
        )));
    }
    if cell.mulx == 0 || cell.muly == 0 {
        return Err(AaError::Config(format!(
            "pixel multipliers must be positive, got {}x{}",
            cell.mulx, cell.muly
        )));
    }

    let (scr_w, scr_h) = cell.text_dims(pixels);
    let region = region.clip(scr_w, scr_h);
    let mut patch = TextPatch::new(region);
    if region.is_empty() {
        return Ok(patch);
    }

    let mut dither = DitherEngine::new(params.dither, region.width());
    let half = params.randomval / 2;
    let mut jitter = (half > 0).then(|| StdRng::seed_from_u64(params.seed));

    for dy in 0..region.height() {
        dither.start_row();
        let y = region.y1 + dy;
        for dx in 0..region.width() {
            let x = region.x1 + dx;
            let mut value =
                pixels.block_average(x * cell.mulx, y * cell.muly, cell.mulx, cell.muly) as i32;

            value += params.bright;
            if params.inversion {
                value = 255 - value;
            }
            if let Some(rng) = jitter.as_mut() {
                value += rng.gen_range(-half..=half);
            }

            let wanted = dither.apply(dx, value);
            let candidate = table.bucket(wanted.clamp(0, 255) as u8);
            dither.record(dx, wanted, candidate.brightness);
            patch.set(dx, dy, candidate.glyph, candidate.attr);
        }
    }

    Ok(patch)
}

/// [`render`] without dithering or jitter, using the table's own params.
pub fn fastrender(
    pixels: &PixelBuffer,
    cell: CellSize,
    region: Region,
    table: &LookupTable,
) -> Result<TextPatch> {
    let params = table.params().fast();
    render(pixels, cell, region, table, &params)
}
