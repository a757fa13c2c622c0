//! Output sinks.
//!
//! A sink receives the finished text buffer when a context is flushed. The
//! live display writes escape sequences to a terminal stream, the memory
//! capture keeps a copy for inspection and the file export serializes with
//! one of the [`SaveFormat`]s.

mod export;
mod format;
mod live;

pub use export::FileExport;
pub use format::{AttrMarkers, FormatFlags, SaveFormat};
pub use live::LiveDisplay;

use crate::ascii::TextBuffer;
use crate::error::Result;

/// Something a rendered text buffer can be flushed to.
pub trait Sink {
    fn flush(&mut self, text: &TextBuffer) -> Result<()>;
}

/// Keeps the most recently flushed buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryCapture {
    last: Option<TextBuffer>,
    flushes: usize,
}

impl MemoryCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last flushed buffer, if any.
    pub fn last(&self) -> Option<&TextBuffer> {
        self.last.as_ref()
    }

    /// Number of flushes received so far.
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl Sink for MemoryCapture {
    fn flush(&mut self, text: &TextBuffer) -> Result<()> {
        self.last = Some(text.clone());
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::Attr;

    #[test]
    fn test_memory_capture_keeps_latest() {
        let mut sink = MemoryCapture::new();
        assert!(sink.last().is_none());

        let mut text = TextBuffer::new(3, 1);
        sink.flush(&text).unwrap();
        text.puts(0, 0, Attr::Dim, "abc");
        sink.flush(&text).unwrap();

        assert_eq!(sink.flushes(), 2);
        assert_eq!(sink.last(), Some(&text));
    }
}
