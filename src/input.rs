//! Image input for the command line.
//!
//! Any format the `image` crate can decode (PNG, JPEG, PNM, ...) is read,
//! converted to 8-bit luma and resampled onto a [`PixelBuffer`].

use std::path::Path;

use image::GrayImage;

use crate::ascii::PixelBuffer;
use crate::error::{AaError, Result};

/// Decode an image file and convert it to greyscale.
pub fn load(path: &Path) -> Result<GrayImage> {
    let image = image::open(path)
        .map_err(|e| AaError::image(path.display().to_string(), e))?
        .to_luma8();
    log::debug!(
        "loaded {}x{} image from {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(image)
}

/// Resample `image` onto `target`, filling all of it.
///
/// Each target pixel takes the average of the source pixels it covers,
/// or the nearest source pixel when enlarging.
///
/// # Example
/// ```ignore
/// // Fit a 640x480 photo onto an 80x25 context with 2x2 cells
/// input::resample_into(&photo, ctx.image_mut());
/// ```
pub fn resample_into(image: &GrayImage, target: &mut PixelBuffer) {
    let (width, height) = (image.width() as usize, image.height() as usize);
    if width == 0 || height == 0 {
        return;
    }
    let data = image.as_raw();
    let (tw, th) = (target.width(), target.height());
    let cell_w = width as f32 / tw.max(1) as f32;
    let cell_h = height as f32 / th.max(1) as f32;

    target.fill_with(|x, y| {
        let start_x = ((x as f32 * cell_w) as usize).min(width - 1);
        let end_x = (((x + 1) as f32 * cell_w) as usize).clamp(start_x + 1, width);
        let start_y = ((y as f32 * cell_h) as usize).min(height - 1);
        let end_y = (((y + 1) as f32 * cell_h) as usize).clamp(start_y + 1, height);

        let mut sum = 0u32;
        for sy in start_y..end_y {
            let row = &data[sy * width..(sy + 1) * width];
            sum += row[start_x..end_x].iter().map(|&v| v as u32).sum::<u32>();
        }
        let count = ((end_x - start_x) * (end_y - start_y)) as u32;
        ((sum + count / 2) / count) as u8
    });
}
