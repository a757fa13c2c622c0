//! Rendering context.
//!
//! A context owns an image buffer and a text buffer sized from the hardware
//! params, plus a lazily built lookup table. `putpixel` and friends draw on
//! the image, `render` converts it into the text buffer, `puts` overlays
//! text, and `flush` hands the text buffer to a [`Sink`].
//!
//! The first render builds the lookup table and is noticeably slower. The
//! table is cached until the font or the table-shaping params change.

use std::sync::{Arc, RwLock};

use super::attr::Attr;
use super::backconvert;
use super::buffer::{PixelBuffer, Region, TextBuffer};
use super::font::{Font, FontMetrics};
use super::params::{HardwareParams, RenderParams};
use super::render::{self, CellSize};
use super::table::{LookupTable, TableKey, TableOptions};
use crate::error::{AaError, Result};
use crate::sink::Sink;

/// Lock-guarded slot holding the current lookup table.
///
/// Readers share the table; a rebuild swaps it under the write lock, so no
/// reader ever sees a half-built table. A failed build keeps the old one.
#[derive(Debug, Default)]
struct TableCache {
    slot: RwLock<Option<Arc<LookupTable>>>,
}

impl TableCache {
    fn get(&self) -> Option<Arc<LookupTable>> {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn get_or_build(
        &self,
        metrics: &FontMetrics,
        params: &RenderParams,
        options: &TableOptions,
    ) -> Result<Arc<LookupTable>> {
        let key = TableKey::new(metrics, params, options);
        if let Some(table) = self.get().filter(|t| *t.key() == key) {
            log::debug!("lookup table cache hit");
            return Ok(table);
        }

        let mut slot = self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(table) = slot.as_ref().filter(|t| *t.key() == key) {
            return Ok(Arc::clone(table));
        }
        log::debug!("lookup table cache miss, rebuilding");
        let table = Arc::new(LookupTable::build(metrics, params, options)?);
        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    fn clear(&self) {
        *self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

/// Image buffer, text buffer and lookup table for one output.
#[derive(Debug)]
pub struct Context {
    hardware: HardwareParams,
    metrics: FontMetrics,
    image: PixelBuffer,
    text: TextBuffer,
    cache: TableCache,
}

impl Context {
    /// Open a context with buffers sized from `hardware`.
    pub fn open(hardware: HardwareParams) -> Result<Self> {
        hardware.validate()?;
        let metrics = FontMetrics::from_font(&hardware.font);
        let image = PixelBuffer::new(
            hardware.width * hardware.mulx,
            hardware.height * hardware.muly,
        );
        let text = TextBuffer::new(hardware.width, hardware.height);
        log::debug!(
            "opened {}x{} context ({}x{} pixels, font '{}')",
            hardware.width,
            hardware.height,
            image.width(),
            image.height(),
            metrics.name()
        );
        Ok(Self {
            hardware,
            metrics,
            image,
            text,
            cache: TableCache::default(),
        })
    }

    pub fn hardware_params(&self) -> &HardwareParams {
        &self.hardware
    }

    pub fn font_metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn scrwidth(&self) -> usize {
        self.text.width()
    }

    pub fn scrheight(&self) -> usize {
        self.text.height()
    }

    pub fn imgwidth(&self) -> usize {
        self.image.width()
    }

    pub fn imgheight(&self) -> usize {
        self.image.height()
    }

    /// Ratio of image width to text width.
    pub fn mulx(&self) -> usize {
        self.hardware.mulx
    }

    /// Ratio of image height to text height.
    pub fn muly(&self) -> usize {
        self.hardware.muly
    }

    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut PixelBuffer {
        &mut self.image
    }

    pub fn text(&self) -> &TextBuffer {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut TextBuffer {
        &mut self.text
    }

    /// The cached lookup table, if a render has built one.
    pub fn table(&self) -> Option<Arc<LookupTable>> {
        self.cache.get()
    }

    /// Image coordinates to text coordinates.
    pub fn img2scr(&self, imgx: usize, imgy: usize) -> (usize, usize) {
        (imgx / self.mulx(), imgy / self.muly())
    }

    /// Draw one pixel. Points outside the image are dropped.
    pub fn putpixel(&mut self, x: usize, y: usize, color: u8) -> bool {
        self.image.putpixel(x, y, color)
    }

    /// Draw a span of pixels starting at `(x, y)`.
    pub fn putpixels(&mut self, x: usize, y: usize, pixels: &[u8]) -> usize {
        self.image.putpixels(x, y, pixels)
    }

    /// Read up to `len` pixels starting at `(x, y)`.
    pub fn pixels(&self, x: usize, y: usize, len: usize) -> &[u8] {
        self.image.pixels(x, y, len)
    }

    /// Write text directly into the text buffer. A later render may overwrite it.
    pub fn puts(&mut self, x: usize, y: usize, attr: Attr, text: &str) -> usize {
        self.text.puts(x, y, attr, text)
    }

    /// Render `region` of the image into the text buffer.
    ///
    /// Rebuilds the lookup table first if the font or params changed.
    pub fn render(&mut self, params: &RenderParams, region: Region) -> Result<()> {
        let table = self.cache.get_or_build(
            &self.metrics,
            params,
            &TableOptions::from(&self.hardware),
        )?;
        let patch = render::render(&self.image, self.cell_size(), region, &table, params)?;
        self.text.apply(&patch);
        Ok(())
    }

    /// Render the whole screen.
    pub fn render_all(&mut self, params: &RenderParams) -> Result<()> {
        let region = Region::full(self.scrwidth(), self.scrheight());
        self.render(params, region)
    }

    /// Render without dithering or jitter, reusing the cached table.
    ///
    /// Builds a table from the default params if no render happened yet.
    pub fn fastrender(&mut self, region: Region) -> Result<()> {
        let table = match self.cache.get() {
            Some(table) => table,
            None => self.cache.get_or_build(
                &self.metrics,
                &RenderParams::default(),
                &TableOptions::from(&self.hardware),
            )?,
        };
        let patch = render::fastrender(&self.image, self.cell_size(), region, &table)?;
        self.text.apply(&patch);
        Ok(())
    }

    /// Turn the text in `region` back into approximate image pixels.
    ///
    /// Needs a lookup table from an earlier render (`State` otherwise) and
    /// even pixel multipliers; each sub-pixel fills a `mulx/2` x `muly/2` block.
    pub fn backconvert(&mut self, region: Region) -> Result<()> {
        let table = self.require_table()?;
        let (bw, bh) = self.subpixel_block()?;
        let patch = backconvert::backconvert(&self.text, region, &table)?;

        let origin_x = region.x1 * self.mulx();
        let origin_y = region.y1 * self.muly();
        for sy in 0..patch.pixels.height() {
            for sx in 0..patch.pixels.width() {
                let Some(value) = patch.pixels.get(sx, sy) else {
                    continue;
                };
                for py in 0..bh {
                    for px in 0..bw {
                        self.image
                            .putpixel(origin_x + sx * bw + px, origin_y + sy * bh + py, value);
                    }
                }
            }
        }
        Ok(())
    }

    /// Two pixel rows approximating `len` cells of text at `(x, y)`.
    pub fn pixels_from_text(&self, x: usize, y: usize, len: usize) -> Result<(Vec<u8>, Vec<u8>)> {
        let table = self.require_table()?;
        Ok(backconvert::pixels_from_text(&self.text, x, y, len, &table))
    }

    /// Reallocate both buffers for a new screen size. Contents are cleared.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        let hardware = HardwareParams {
            width,
            height,
            ..self.hardware.clone()
        };
        hardware.validate()?;
        self.image = PixelBuffer::new(width * hardware.mulx, height * hardware.muly);
        self.text = TextBuffer::new(width, height);
        self.hardware = hardware;
        log::info!("resized context to {}x{}", width, height);
        Ok(())
    }

    /// Switch fonts. The cached table is dropped.
    pub fn set_font(&mut self, font: Font) {
        self.metrics = FontMetrics::from_font(&font);
        self.hardware.font = font;
        self.cache.clear();
    }

    /// Copy the image of another context (the overlapping part).
    pub fn copy_image_from(&mut self, other: &Context) {
        self.image.copy_from(&other.image);
    }

    /// Hand the text buffer to `sink`.
    pub fn flush<S: Sink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.flush(&self.text)
    }

    fn cell_size(&self) -> CellSize {
        CellSize::new(self.mulx(), self.muly())
    }

    fn require_table(&self) -> Result<Arc<LookupTable>> {
        self.cache.get().ok_or_else(|| {
            AaError::State("no lookup table yet: render before back-converting".to_string())
        })
    }

    fn subpixel_block(&self) -> Result<(usize, usize)> {
        if self.mulx() % 2 != 0 || self.muly() % 2 != 0 {
            return Err(AaError::Config(format!(
                "back-conversion needs even pixel multipliers, got {}x{}",
                self.mulx(),
                self.muly()
            )));
        }
        Ok((self.mulx() / 2, self.muly() / 2))
    }
}
