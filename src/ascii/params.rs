//! Render and hardware parameters.
//!
//! Defaults are plain constants passed by value; nothing here is global state.

use serde::{Deserialize, Serialize};

use super::attr::AttrMask;
use super::font::Font;
use crate::error::{AaError, Result};

/// Contrast value that leaves glyph brightness unscaled.
pub const NORMAL_CONTRAST: i32 = 100;

/// Default display gamma (linear).
pub const DEFAULT_GAMMA: f32 = 1.0;

/// Default divisor applied to DIM glyph brightness.
pub const DEFAULT_DIMMUL: f32 = 5.3;

/// Default multiplier applied to BOLD glyph brightness.
pub const DEFAULT_BOLDMUL: f32 = 2.7;

/// Error-diffusion strategy used while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dither {
    None,
    /// Carry the quantisation error to the next cell of the same row.
    ErrorDistrib,
    /// Floyd-Steinberg diffusion over a two-row error buffer.
    #[default]
    FloydSteinberg,
}

impl Dither {
    pub fn name(&self) -> &'static str {
        match self {
            Dither::None => "none",
            Dither::ErrorDistrib => "error-distrib",
            Dither::FloydSteinberg => "floyd-steinberg",
        }
    }
}

/// Parameters of a single render call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    /// Added to every sampled luminance.
    pub bright: i32,
    /// Glyph contrast, `NORMAL_CONTRAST` means unchanged.
    pub contrast: i32,
    pub gamma: f32,
    pub dither: Dither,
    /// Render the negative image.
    pub inversion: bool,
    /// Width (0-255) of the per-cell jitter added before glyph lookup.
    pub randomval: i32,
    /// Seed of the jitter generator.
    pub seed: u64,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            bright: 0,
            contrast: NORMAL_CONTRAST,
            gamma: DEFAULT_GAMMA,
            dither: Dither::default(),
            inversion: false,
            randomval: 0,
            seed: 0,
        }
    }
}

impl RenderParams {
    /// Check that the parameters can build a lookup table.
    pub fn validate(&self) -> Result<()> {
        if self.contrast <= 0 {
            return Err(AaError::Config(format!(
                "contrast must be positive, got {}",
                self.contrast
            )));
        }
        if !(self.gamma > 0.0) || !self.gamma.is_finite() {
            return Err(AaError::Config(format!(
                "gamma must be positive, got {}",
                self.gamma
            )));
        }
        if !(-255..=255).contains(&self.bright) {
            return Err(AaError::Config(format!(
                "bright must be within -255..255, got {}",
                self.bright
            )));
        }
        if !(0..=255).contains(&self.randomval) {
            return Err(AaError::Config(format!(
                "randomval must be within 0-255, got {}",
                self.randomval
            )));
        }
        Ok(())
    }

    /// Copy of these params with dithering and jitter switched off.
    pub fn fast(&self) -> Self {
        Self {
            dither: Dither::None,
            randomval: 0,
            ..*self
        }
    }
}

/// Geometry and display capabilities negotiated with the output device.
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareParams {
    pub font: Font,
    pub supported: AttrMask,
    /// Text buffer width in cells.
    pub width: usize,
    /// Text buffer height in cells.
    pub height: usize,
    /// Image pixels per text cell, horizontally.
    pub mulx: usize,
    /// Image pixels per text cell, vertically.
    pub muly: usize,
    /// DIM brightness is divided by this.
    pub dimmul: f32,
    /// BOLD brightness is multiplied by this.
    pub boldmul: f32,
}

impl Default for HardwareParams {
    fn default() -> Self {
        Self {
            font: Font::builtin(),
            supported: AttrMask::default(),
            width: 80,
            height: 25,
            mulx: 2,
            muly: 2,
            dimmul: DEFAULT_DIMMUL,
            boldmul: DEFAULT_BOLDMUL,
        }
    }
}

impl HardwareParams {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AaError::Config(format!(
                "screen must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.mulx == 0 || self.muly == 0 {
            return Err(AaError::Config(format!(
                "pixel multipliers must be positive, got {}x{}",
                self.mulx, self.muly
            )));
        }
        if !(self.dimmul > 0.0) || !(self.boldmul > 0.0) {
            return Err(AaError::Config(format!(
                "dimmul and boldmul must be positive, got {} and {}",
                self.dimmul, self.boldmul
            )));
        }
        if !self.supported.intersects(
            AttrMask::NORMAL | AttrMask::DIM | AttrMask::BOLD | AttrMask::BOLDFONT | AttrMask::REVERSE,
        ) {
            return Err(AaError::Config(
                "at least one text attribute must be supported".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_render_params_are_valid() {
        assert!(RenderParams::default().validate().is_ok());
        assert_eq!(RenderParams::default().dither, Dither::FloydSteinberg);
    }

    #[test]
    fn test_non_positive_contrast_rejected() {
        let params = RenderParams {
            contrast: 0,
            ..RenderParams::default()
        };
        assert!(matches!(params.validate(), Err(AaError::Config(_))));
    }

    #[test]
    fn test_non_positive_gamma_rejected() {
        for gamma in [0.0, -1.0, f32::NAN] {
            let params = RenderParams {
                gamma,
                ..RenderParams::default()
            };
            assert!(matches!(params.validate(), Err(AaError::Config(_))), "gamma {}", gamma);
        }
    }

    #[test]
    fn test_bright_out_of_range_rejected() {
        for bright in [256, -256, i32::MAX, i32::MIN] {
            let params = RenderParams {
                bright,
                ..RenderParams::default()
            };
            assert!(matches!(params.validate(), Err(AaError::Config(_))), "bright {}", bright);
        }
        for bright in [255, -255] {
            let params = RenderParams {
                bright,
                ..RenderParams::default()
            };
            assert!(params.validate().is_ok());
        }
    }

    #[test]
    fn test_fast_drops_dither_and_jitter() {
        let params = RenderParams {
            randomval: 40,
            contrast: 150,
            ..RenderParams::default()
        };
        let fast = params.fast();
        assert_eq!(fast.dither, Dither::None);
        assert_eq!(fast.randomval, 0);
        assert_eq!(fast.contrast, 150);
    }

    #[test]
    fn test_hardware_params_validation() {
        assert!(HardwareParams::default().validate().is_ok());

        let hp = HardwareParams {
            mulx: 0,
            ..HardwareParams::default()
        };
        assert!(hp.validate().is_err());

        let hp = HardwareParams {
            supported: AttrMask::EIGHT,
            ..HardwareParams::default()
        };
        assert!(hp.validate().is_err());
    }
}
