//! Save formats for file export.
//!
//! Each format is a static description: header and footer, per-attribute
//! begin/end markers, which attributes it can show, which characters need
//! escaping and the page size used when pagination is on. The registry order
//! is fixed, so name lookups always resolve to the same format.

use bitflags::bitflags;
use regex::Regex;

use crate::ascii::{Attr, AttrMask, TextBuffer, TABLE_ATTRS};
use crate::error::{AaError, Result};

bitflags! {
    /// Options for encoding a text buffer with a [`SaveFormat`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FormatFlags: u8 {
        /// Split the output into pages of the format's page height.
        const USE_PAGES = 1;
        /// Write blank cells with the NORMAL attribute.
        const NORMAL_SPACES = 8;
    }
}

/// Markers wrapped around a run of cells with the same attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrMarkers {
    pub begin: &'static str,
    pub end: &'static str,
}

const fn plain() -> AttrMarkers {
    AttrMarkers { begin: "", end: "" }
}

const fn markers(begin: &'static str, end: &'static str) -> AttrMarkers {
    AttrMarkers { begin, end }
}

/// A file export format.
#[derive(Debug, PartialEq, Eq)]
pub struct SaveFormat {
    name: &'static str,
    extension: &'static str,
    /// Page size in text cells. Zero height means unpaginated. Only the
    /// height splits output; the width is what the device fits per line.
    page_width: usize,
    page_height: usize,
    supported: AttrMask,
    head: &'static str,
    end: &'static str,
    newline: &'static str,
    newpage: &'static str,
    /// Indexed by [`Attr::table_index`].
    attrs: [AttrMarkers; TABLE_ATTRS],
    escapes: &'static [(u8, &'static str)],
}

const HTML_ESCAPES: &[(u8, &str)] = &[
    (b'<', "&lt;"),
    (b'>', "&gt;"),
    (b'&', "&amp;"),
    (b'"', "&quot;"),
];

const HTML_HEAD: &str = "<HTML>\n <HEAD> <TITLE>Ascii arted image</TITLE>\n</HEAD>\n\
<BODY BGCOLOR=\"#000000\" TEXT=\"#b2b2b2\" LINK=\"#FFFFFF\">\n<FONT COLOR=#b2b2b2 SIZE=2><PRE>\n";
const HTML_END: &str = "</PRE></FONT></BODY>\n</HTML>\n";

const NICE_HTML_HEAD: &str = "<HTML>\n <HEAD> <TITLE>Ascii arted image</TITLE>\n</HEAD>\n\
<BODY BGCOLOR=\"#000000\" TEXT=\"#b2b2b2\" LINK=\"#FFFFFF\">\n\
<FONT COLOR=\"#b2b2b2\" SIZE=2><PRE>\n";

const HP_HEAD_SMALL: &str = "\x1bE\x1b(s0p16.67h8.5v0s0b0T\x1b&l0O\x1b&a0L";
const HP_HEAD_BIG: &str = "\x1bE\x1b(s0p10h12v0s0b0T\x1b&l0O\x1b&a0L";

static FORMATS: [SaveFormat; 8] = [
    SaveFormat {
        name: "Text file",
        extension: ".txt",
        page_width: 80,
        page_height: 66,
        supported: AttrMask::NORMAL,
        head: "",
        end: "",
        newline: "\n",
        newpage: "\x0c\n",
        attrs: [plain(); TABLE_ATTRS],
        escapes: &[],
    },
    SaveFormat {
        name: "Pure html",
        extension: ".html",
        page_width: 0,
        page_height: 0,
        supported: AttrMask::NORMAL
            .union(AttrMask::BOLD)
            .union(AttrMask::BOLDFONT),
        head: HTML_HEAD,
        end: HTML_END,
        newline: "\n",
        newpage: "\n",
        attrs: [
            plain(),
            plain(),
            markers("<B>", "</B>"),
            markers("<B>", "</B>"),
            plain(),
        ],
        escapes: HTML_ESCAPES,
    },
    SaveFormat {
        name: "Nice looking html",
        extension: ".html",
        page_width: 0,
        page_height: 0,
        supported: AttrMask::NORMAL
            .union(AttrMask::DIM)
            .union(AttrMask::BOLD)
            .union(AttrMask::BOLDFONT)
            .union(AttrMask::REVERSE),
        head: NICE_HTML_HEAD,
        end: HTML_END,
        newline: "\n",
        newpage: "\n",
        attrs: [
            plain(),
            markers("<FONT COLOR=\"#686868\">", "</FONT>"),
            markers("<FONT COLOR=\"#ffffff\">", "</FONT>"),
            markers("<FONT COLOR=\"#ffffff\"><B>", "</B></FONT>"),
            markers("<FONT COLOR=\"#000000\" STYLE=\"background-color: #b2b2b2\">", "</FONT>"),
        ],
        escapes: HTML_ESCAPES,
    },
    SaveFormat {
        name: "ANSI escape seqences",
        extension: ".ansi",
        page_width: 0,
        page_height: 0,
        supported: AttrMask::NORMAL
            .union(AttrMask::DIM)
            .union(AttrMask::BOLD)
            .union(AttrMask::REVERSE),
        head: "",
        end: "\x1b[0m",
        newline: "\n",
        newpage: "\n",
        attrs: [
            plain(),
            markers("\x1b[2m", "\x1b[0m"),
            markers("\x1b[1m", "\x1b[0m"),
            markers("\x1b[1m", "\x1b[0m"),
            markers("\x1b[7m", "\x1b[0m"),
        ],
        escapes: &[],
    },
    SaveFormat {
        name: "HP laser jet - A4 small font",
        extension: ".hp",
        page_width: 253,
        page_height: 118,
        supported: AttrMask::NORMAL.union(AttrMask::BOLD),
        head: HP_HEAD_SMALL,
        end: "\x0c",
        newline: "\r\n",
        newpage: "",
        attrs: [
            plain(),
            plain(),
            markers("\x1b(s3B", "\x1b(s0B"),
            markers("\x1b(s3B", "\x1b(s0B"),
            plain(),
        ],
        escapes: &[],
    },
    SaveFormat {
        name: "HP laser jet - A4 big font",
        extension: ".hp",
        page_width: 160,
        page_height: 64,
        supported: AttrMask::NORMAL.union(AttrMask::BOLD),
        head: HP_HEAD_BIG,
        end: "\x0c",
        newline: "\r\n",
        newpage: "",
        attrs: [
            plain(),
            plain(),
            markers("\x1b(s3B", "\x1b(s0B"),
            markers("\x1b(s3B", "\x1b(s0B"),
            plain(),
        ],
        escapes: &[],
    },
    SaveFormat {
        name: "For catting to an IRC channel",
        extension: ".irc",
        page_width: 70,
        page_height: 25,
        supported: AttrMask::NORMAL
            .union(AttrMask::BOLD)
            .union(AttrMask::REVERSE),
        head: "",
        end: "",
        newline: "\n",
        newpage: "\n",
        attrs: [
            plain(),
            plain(),
            markers("\x02", "\x02"),
            markers("\x02", "\x02"),
            markers("\x16", "\x16"),
        ],
        escapes: &[],
    },
    SaveFormat {
        name: "For catting to an IRC channel II",
        extension: ".irc",
        page_width: 70,
        page_height: 25,
        supported: AttrMask::NORMAL
            .union(AttrMask::DIM)
            .union(AttrMask::BOLD)
            .union(AttrMask::REVERSE),
        head: "",
        end: "",
        newline: "\n",
        newpage: "\n",
        attrs: [
            plain(),
            markers("\x0314", "\x03"),
            markers("\x02", "\x02"),
            markers("\x02", "\x02"),
            markers("\x16", "\x16"),
        ],
        escapes: &[],
    },
];

impl SaveFormat {
    /// All formats, in lookup order.
    pub fn all() -> &'static [SaveFormat] {
        &FORMATS
    }

    /// First format whose name contains `pattern`, ignoring case.
    pub fn find(pattern: &str) -> Result<&'static SaveFormat> {
        let needle = pattern.to_lowercase();
        FORMATS
            .iter()
            .find(|f| f.name.to_lowercase().contains(&needle))
            .ok_or_else(|| AaError::FormatNotFound(pattern.to_string()))
    }

    /// First format whose name matches `pattern`.
    pub fn find_regex(pattern: &Regex) -> Result<&'static SaveFormat> {
        FORMATS
            .iter()
            .find(|f| pattern.is_match(f.name))
            .ok_or_else(|| AaError::FormatNotFound(pattern.as_str().to_string()))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// File extension including the dot.
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    pub fn page_width(&self) -> usize {
        self.page_width
    }

    pub fn page_height(&self) -> usize {
        self.page_height
    }

    pub fn supported(&self) -> AttrMask {
        self.supported
    }

    /// Encode `text` as a complete document.
    ///
    /// Every cell becomes its glyph byte (or the format's escape for it), so
    /// codes 128-255 come out as single bytes. Attributes the format cannot
    /// show are downgraded (and logged once). With [`FormatFlags::USE_PAGES`]
    /// the rows are split into pages of `page_height`, each wrapped in its
    /// own header and footer. Pages only split vertically; `page_width` is
    /// informational and rows are never wrapped.
    pub fn encode(&self, text: &TextBuffer, flags: FormatFlags) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.chars().len() + text.height() * 2);
        let mut downgraded = 0usize;

        let rows_per_page = if flags.contains(FormatFlags::USE_PAGES) && self.page_height > 0 {
            self.page_height
        } else {
            text.height().max(1)
        };

        let rows: Vec<usize> = (0..text.height()).collect();
        let mut pages = rows.chunks(rows_per_page).peekable();
        if pages.peek().is_none() {
            push_str(&mut out, self.head);
            push_str(&mut out, self.end);
        }
        let mut first = true;
        for page in pages {
            if !first {
                push_str(&mut out, self.newpage);
            }
            first = false;
            push_str(&mut out, self.head);
            for &y in page {
                downgraded += self.encode_row(&mut out, text, y, flags);
            }
            push_str(&mut out, self.end);
        }

        if downgraded > 0 {
            log::warn!(
                "{} cells downgraded to attributes supported by '{}'",
                downgraded,
                self.name
            );
        }
        out
    }

    fn encode_row(&self, out: &mut Vec<u8>, text: &TextBuffer, y: usize, flags: FormatFlags) -> usize {
        let (chars, attrs) = text.row(y);
        let mut downgraded = 0;
        let mut current = Attr::Normal;

        for (&ch, &wanted) in chars.iter().zip(attrs) {
            let mut attr = wanted.downgrade(self.supported);
            if attr != wanted && wanted != Attr::Special {
                downgraded += 1;
            }
            if ch == b' ' && flags.contains(FormatFlags::NORMAL_SPACES) {
                attr = Attr::Normal;
            }
            if attr != current {
                push_str(out, self.markers(current).end);
                push_str(out, self.markers(attr).begin);
                current = attr;
            }
            self.push_glyph(out, ch);
        }
        push_str(out, self.markers(current).end);
        push_str(out, self.newline);
        downgraded
    }

    fn markers(&self, attr: Attr) -> AttrMarkers {
        self.attrs[attr.table_index()]
    }

    fn push_glyph(&self, out: &mut Vec<u8>, ch: u8) {
        match self.escapes.iter().find(|(c, _)| *c == ch) {
            Some((_, escaped)) => push_str(out, escaped),
            None => out.push(ch),
        }
    }
}

fn push_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_str(pattern: &str, text: &TextBuffer, flags: FormatFlags) -> String {
        let bytes = SaveFormat::find(pattern).unwrap().encode(text, flags);
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_find_is_case_insensitive_substring() {
        assert_eq!(SaveFormat::find("tEXT").unwrap().name(), "Text file");
        assert_eq!(SaveFormat::find("html").unwrap().name(), "Pure html");
        assert_eq!(SaveFormat::find("ansi").unwrap().extension(), ".ansi");
    }

    #[test]
    fn test_find_unknown() {
        let err = SaveFormat::find("postscript").unwrap_err();
        assert!(matches!(err, AaError::FormatNotFound(name) if name == "postscript"));
    }

    #[test]
    fn test_find_regex() {
        let re = Regex::new("HP.*big").unwrap();
        assert_eq!(SaveFormat::find_regex(&re).unwrap().name(), "HP laser jet - A4 big font");
        let re = Regex::new("IRC.*II").unwrap();
        assert_eq!(SaveFormat::find_regex(&re).unwrap().extension(), ".irc");
    }

    #[test]
    fn test_html_escapes_and_bold() {
        let mut text = TextBuffer::new(3, 1);
        text.puts(0, 0, Attr::Bold, "<&");
        let out = encode_str("pure", &text, FormatFlags::empty());
        assert!(out.contains("<B>&lt;&amp;</B> \n"));
        assert!(out.starts_with("<HTML>"));
    }

    #[test]
    fn test_text_drops_attributes() {
        let mut text = TextBuffer::new(4, 2);
        text.puts(0, 0, Attr::Reverse, "ab");
        text.puts(0, 1, Attr::Dim, "cd");
        let out = encode_str("text", &text, FormatFlags::empty());
        assert_eq!(out, "ab  \ncd  \n");
    }

    #[test]
    fn test_ansi_runs_share_one_escape() {
        let mut text = TextBuffer::new(4, 1);
        text.puts(0, 0, Attr::Reverse, "xyz");
        let out = encode_str("ansi", &text, FormatFlags::empty());
        assert_eq!(out, "\x1b[7mxyz\x1b[0m \n\x1b[0m");
    }

    #[test]
    fn test_normal_spaces() {
        let mut text = TextBuffer::new(3, 1);
        text.puts(0, 0, Attr::Reverse, "a b");
        let out = encode_str("ansi", &text, FormatFlags::NORMAL_SPACES);
        assert_eq!(out, "\x1b[7ma\x1b[0m \x1b[7mb\x1b[0m\n\x1b[0m");
    }

    #[test]
    fn test_pagination_splits_rows() {
        let mut text = TextBuffer::new(2, 60);
        text.puts(0, 30, Attr::Normal, "x");
        let out = encode_str("IRC channel II", &text, FormatFlags::USE_PAGES);
        // 25-row pages: 25 + 25 + 10
        assert_eq!(out.matches('\n').count(), 60 + 2);
        let unpaged = encode_str("IRC channel II", &text, FormatFlags::empty());
        assert_eq!(unpaged.matches('\n').count(), 60);
    }

    #[test]
    fn test_high_glyphs_are_single_bytes() {
        let mut text = TextBuffer::new(3, 1);
        text.set(0, 0, 0xb0, Attr::Normal);
        text.set(1, 0, 0xdb, Attr::Normal);
        text.set(2, 0, b'<', Attr::Normal);
        let text_out = SaveFormat::find("text").unwrap().encode(&text, FormatFlags::empty());
        assert_eq!(text_out, vec![0xb0, 0xdb, b'<', b'\n']);

        let html = SaveFormat::find("pure").unwrap().encode(&text, FormatFlags::empty());
        let row = [0xb0, 0xdb, b'&', b'l', b't', b';', b'\n'];
        assert!(html.windows(row.len()).any(|w| w == row));
    }

    #[test]
    fn test_page_width_does_not_wrap_rows() {
        let text = TextBuffer::new(120, 2);
        let format = SaveFormat::find("text").unwrap();
        assert_eq!(format.page_width(), 80);
        let out = encode_str("text", &text, FormatFlags::USE_PAGES);
        assert_eq!(out.lines().map(str::len).collect::<Vec<_>>(), [120, 120]);
    }
}
