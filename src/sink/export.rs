//! File export sink.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::format::{FormatFlags, SaveFormat};
use super::Sink;
use crate::ascii::TextBuffer;
use crate::error::{AaError, Result};

/// Writes each flush to a new file in one save format.
///
/// The destination is created with `create_new`, so an existing file is
/// never touched: the flush fails with an `Io` error of kind `AlreadyExists`.
#[derive(Debug, Clone)]
pub struct FileExport {
    path: PathBuf,
    format: &'static SaveFormat,
    flags: FormatFlags,
}

impl FileExport {
    pub fn new(path: impl Into<PathBuf>, format: &'static SaveFormat, flags: FormatFlags) -> Self {
        Self {
            path: path.into(),
            format,
            flags,
        }
    }

    /// Look the format up by name first (see [`SaveFormat::find`]).
    pub fn with_format_name(
        path: impl Into<PathBuf>,
        pattern: &str,
        flags: FormatFlags,
    ) -> Result<Self> {
        Ok(Self::new(path, SaveFormat::find(pattern)?, flags))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> &'static SaveFormat {
        self.format
    }

    pub fn flags(&self) -> FormatFlags {
        self.flags
    }
}

impl Sink for FileExport {
    fn flush(&mut self, text: &TextBuffer) -> Result<()> {
        let target = self.path.display().to_string();
        let encoded = self.format.encode(text, self.flags);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| AaError::io(&target, e))?;
        let written = file.write_all(&encoded).and_then(|_| file.flush());
        drop(file);
        discard_on_error(&self.path, written).map_err(|e| AaError::io(&target, e))?;

        log::info!(
            "exported {}x{} text as '{}' to {}",
            text.width(),
            text.height(),
            self.format.name(),
            target
        );
        Ok(())
    }
}

/// Remove a partly written destination, so a failed export leaves nothing.
fn discard_on_error(path: &Path, written: io::Result<()>) -> io::Result<()> {
    if let Err(e) = written {
        if let Err(remove) = std::fs::remove_file(path) {
            log::warn!("could not remove partial export {}: {}", path.display(), remove);
        }
        return Err(e);
    }
    Ok(())
}
