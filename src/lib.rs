//! aa-render library crate.
//!
//! Converts greyscale pixel buffers into character and attribute grids and
//! writes them to terminals, memory or files.

pub mod ascii;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod sink;

pub use ascii::{Attr, AttrMask, Context, HardwareParams, Region, RenderParams};
pub use error::{AaError, Result};
pub use sink::{FileExport, FormatFlags, LiveDisplay, MemoryCapture, SaveFormat, Sink};
