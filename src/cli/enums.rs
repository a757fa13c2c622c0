//! CLI enum types for dithering and text attributes.

use clap::ValueEnum;

use crate::ascii::{Attr, Dither};

/// Dithering method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DitherMode {
    None,
    ErrorDistrib,
    #[default]
    FloydSteinberg,
}

impl From<DitherMode> for Dither {
    fn from(d: DitherMode) -> Self {
        match d {
            DitherMode::None => Dither::None,
            DitherMode::ErrorDistrib => Dither::ErrorDistrib,
            DitherMode::FloydSteinberg => Dither::FloydSteinberg,
        }
    }
}

/// Text attribute for overlaid messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TextAttr {
    Normal,
    Dim,
    #[default]
    Bold,
    Boldfont,
    Reverse,
}

impl From<TextAttr> for Attr {
    fn from(a: TextAttr) -> Self {
        match a {
            TextAttr::Normal => Attr::Normal,
            TextAttr::Dim => Attr::Dim,
            TextAttr::Bold => Attr::Bold,
            TextAttr::Boldfont => Attr::BoldFont,
            TextAttr::Reverse => Attr::Reverse,
        }
    }
}
