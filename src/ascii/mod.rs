//! Grayscale image to attributed text.
//!
//! The pipeline has four stages:
//!
//! 1. **Font metrics** - quadrant coverage per glyph from an 8-pixel-wide bitmap font
//! 2. **Lookup table** - every (glyph, attribute) pair scored and bucketed by luminance
//! 3. **Rendering** - block averages adjusted, dithered and looked up
//! 4. **Back-conversion** - text turned back into approximate pixels
//!
//! [`Context`] ties the stages together around an image buffer and a text
//! buffer. The free functions in [`render`] and [`backconvert`] work on
//! borrowed buffers and return patches instead of writing in place.

mod attr;
pub mod backconvert;
mod buffer;
mod context;
mod dither;
mod font;
mod params;
pub mod render;
mod table;

pub use attr::{Attr, AttrMask, TABLE_ATTRS};
pub use backconvert::pixels_from_text;
pub use buffer::{PixelBuffer, Region, SubpixelPatch, TextBuffer, TextPatch};
pub use context::Context;
pub use dither::DitherEngine;
pub use font::{Font, FontMetrics, GlyphMetrics, GLYPHS, GLYPH_WIDTH};
pub use params::{
    Dither, HardwareParams, RenderParams, DEFAULT_BOLDMUL, DEFAULT_DIMMUL, DEFAULT_GAMMA,
    NORMAL_CONTRAST,
};
pub use render::{fastrender, CellSize};
pub use table::{
    Candidate, LookupTable, TableEntry, TableKey, TableOptions, SUBPIXEL_ORDER, TABLE_ENTRIES,
};
