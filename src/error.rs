//! Error types for the rendering pipeline.
//!
//! Every failure is local and synchronous. A failing operation never leaves
//! shared state half-updated: a failed table rebuild keeps the previous table.

/// Errors produced by the rendering pipeline and its output sinks.
#[derive(Debug, thiserror::Error)]
pub enum AaError {
    /// Invalid render or hardware parameters.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The operation needs state that does not exist yet (e.g. a lookup table).
    #[error("invalid state: {0}")]
    State(String),

    /// A region or coordinate lies outside its buffer.
    #[error("region ({x1},{y1})-({x2},{y2}) is outside the {width}x{height} buffer")]
    Bounds {
        x1: usize,
        y1: usize,
        x2: usize,
        y2: usize,
        width: usize,
        height: usize,
    },

    /// Writing to an output destination failed (or it already existed).
    #[error("I/O error on {target}: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// An input image could not be opened or decoded.
    #[error("cannot read image {target}: {source}")]
    Image {
        target: String,
        #[source]
        source: image::ImageError,
    },

    /// No save format matched the requested name or pattern.
    #[error("could not find output format matching '{0}'")]
    FormatNotFound(String),
}

impl AaError {
    /// Wrap an I/O error with the destination it happened on.
    pub fn io(target: impl Into<String>, source: std::io::Error) -> Self {
        AaError::Io {
            target: target.into(),
            source,
        }
    }

    /// Wrap an image decoding error with the file it came from.
    pub fn image(target: impl Into<String>, source: image::ImageError) -> Self {
        AaError::Image {
            target: target.into(),
            source,
        }
    }

    /// True when this is an export refused because the destination exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            AaError::Io { source, .. } if source.kind() == std::io::ErrorKind::AlreadyExists
        )
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_error_display() {
        let err = AaError::Bounds {
            x1: 0,
            y1: 0,
            x2: 90,
            y2: 10,
            width: 80,
            height: 25,
        };
        let msg = err.to_string();
        assert!(msg.contains("(0,0)-(90,10)"));
        assert!(msg.contains("80x25"));
    }

    #[test]
    fn test_already_exists_detection() {
        let err = AaError::io(
            "out.txt",
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "exists"),
        );
        assert!(err.is_already_exists());

        let err = AaError::io(
            "out.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_already_exists());
    }
}
