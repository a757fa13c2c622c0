//! Configuration file handling for aa-render.
//!
//! Loads configuration from `<config dir>/aa-render/config.toml` or a custom path.
//! Command-line flags override whatever is loaded here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ascii::{
    AttrMask, Dither, HardwareParams, RenderParams, DEFAULT_BOLDMUL, DEFAULT_DIMMUL,
    DEFAULT_GAMMA, NORMAL_CONTRAST,
};
use crate::error::AaError;
use crate::sink::FormatFlags;

/// Configuration file structure for aa-render.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub bright: i32,
    pub contrast: i32,
    pub gamma: f32,
    pub dither: Dither,
    pub inversion: bool,
    pub randomval: i32,
    pub seed: u64,
}

impl Default for RenderConfig {
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

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HardwareConfig {
    pub width: usize,
    pub height: usize,
    pub mulx: usize,
    pub muly: usize,
    pub dimmul: f32,
    pub boldmul: f32,
    /// Attribute names: normal, dim, bold, boldfont, reverse, all, eight.
    pub supported: Vec<String>,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 25,
            mulx: 2,
            muly: 2,
            dimmul: DEFAULT_DIMMUL,
            boldmul: DEFAULT_BOLDMUL,
            supported: vec!["normal".into(), "dim".into(), "bold".into()],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Save format name or part of it.
    pub format: String,
    pub pages: bool,
    pub normal_spaces: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pages: false,
            normal_spaces: false,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn render_params(&self) -> RenderParams {
        let r = &self.render;
        RenderParams {
            bright: r.bright,
            contrast: r.contrast,
            gamma: r.gamma,
            dither: r.dither,
            inversion: r.inversion,
            randomval: r.randomval,
            seed: r.seed,
        }
    }

    /// Hardware params with the built-in font. Fails on unknown attribute names.
    pub fn hardware_params(&self) -> Result<HardwareParams, AaError> {
        let h = &self.hardware;
        let mut supported = AttrMask::empty();
        for name in &h.supported {
            supported |= AttrMask::parse_name(name)
                .ok_or_else(|| AaError::Config(format!("unknown attribute '{}'", name)))?;
        }
        Ok(HardwareParams {
            supported,
            width: h.width,
            height: h.height,
            mulx: h.mulx,
            muly: h.muly,
            dimmul: h.dimmul,
            boldmul: h.boldmul,
            ..HardwareParams::default()
        })
    }

    pub fn format_flags(&self) -> FormatFlags {
        let mut flags = FormatFlags::empty();
        flags.set(FormatFlags::USE_PAGES, self.export.pages);
        flags.set(FormatFlags::NORMAL_SPACES, self.export.normal_spaces);
        flags
    }
}

/// Commented template written by `aa-render config init`.
pub const DEFAULT_CONFIG: &str = r#"# aa-render configuration

[render]
# Added to every cell's luminance (-255..255)
bright = 0
# 100 is neutral; higher stretches luminance away from mid-grey
contrast = 100
# Gamma correction applied when building the lookup table
gamma = 1.0
# Dithering: none, error-distrib, floyd-steinberg
dither = "floyd-steinberg"
# Swap light and dark (for light terminals)
inversion = false
# Random jitter amplitude (0 disables)
randomval = 0
# Seed for the jitter generator
seed = 0

[hardware]
# Screen size in text cells
width = 80
height = 25
# Image pixels per text cell
mulx = 2
muly = 2
# Brightness divisor for dim text and multiplier for bold text
dimmul = 5.3
boldmul = 2.7
# Attributes the display can show: normal, dim, bold, boldfont, reverse
# Add "all" or "eight" to also use control or 8-bit characters
supported = ["normal", "dim", "bold"]

[export]
# Save format, matched case-insensitively against format names
format = "text"
# Split output into pages
pages = false
# Write blank cells without attributes
normal_spaces = false
"#;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        })
        .join("aa-render")
        .join("config.toml")
}
