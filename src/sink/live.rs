//! Live terminal output.
//!
//! Each flush homes the cursor and repaints the whole text buffer with SGR
//! attributes. Nothing here touches terminal modes; the caller owns the
//! terminal.

use std::io::{self, Write};

use super::Sink;
use crate::ascii::{Attr, AttrMask, TextBuffer};
use crate::error::{AaError, Result};

/// Repaints a text buffer on a terminal stream.
#[derive(Debug)]
pub struct LiveDisplay<W: Write> {
    out: W,
    supported: AttrMask,
    clear_first: bool,
}

impl LiveDisplay<io::Stdout> {
    /// Display on standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> LiveDisplay<W> {
    /// Display on `out`, assuming a terminal that shows every attribute.
    pub fn new(out: W) -> Self {
        Self {
            out,
            supported: AttrMask::NORMAL
                | AttrMask::DIM
                | AttrMask::BOLD
                | AttrMask::BOLDFONT
                | AttrMask::REVERSE,
            clear_first: true,
        }
    }

    /// Restrict the attributes written; others are downgraded.
    pub fn with_supported(mut self, supported: AttrMask) -> Self {
        self.supported = supported;
        self
    }

    /// Clear the screen before the first repaint (on by default).
    pub fn with_clear(mut self, clear: bool) -> Self {
        self.clear_first = clear;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn repaint(&mut self, text: &TextBuffer) -> io::Result<()> {
        if self.clear_first {
            self.out.write_all(b"\x1b[2J")?;
            self.clear_first = false;
        }
        self.out.write_all(b"\x1b[H")?;

        let mut buf = [0u8; 4];
        for y in 0..text.height() {
            if y > 0 {
                self.out.write_all(b"\r\n")?;
            }
            let (chars, attrs) = text.row(y);
            let mut current = Attr::Normal;
            for (&ch, &attr) in chars.iter().zip(attrs) {
                let attr = attr.downgrade(self.supported);
                if attr != current {
                    sgr(&mut self.out, attr)?;
                    current = attr;
                }
                self.out
                    .write_all((ch as char).encode_utf8(&mut buf).as_bytes())?;
            }
            if current != Attr::Normal {
                sgr(&mut self.out, Attr::Normal)?;
            }
        }
        self.out.flush()
    }
}

/// Reset, then switch on `attr`.
fn sgr(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    match attr {
        Attr::Normal => w.write_all(b"\x1b[0m"),
        Attr::Dim => w.write_all(b"\x1b[0;2m"),
        Attr::Bold | Attr::BoldFont => w.write_all(b"\x1b[0;1m"),
        Attr::Reverse | Attr::Special => w.write_all(b"\x1b[0;7m"),
    }
}

impl<W: Write> Sink for LiveDisplay<W> {
    fn flush(&mut self, text: &TextBuffer) -> Result<()> {
        self.repaint(text)
            .map_err(|e| AaError::io("terminal", e))
    }
}
