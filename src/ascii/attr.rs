//! Text attributes and attribute support masks.

use bitflags::bitflags;

/// Number of attributes that have lookup-table entries (everything but SPECIAL).
pub const TABLE_ATTRS: usize = 5;

/// Attribute of a single text cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(u8)]
pub enum Attr {
    #[default]
    Normal = 0,
    Dim = 1,
    Bold = 2,
    BoldFont = 3,
    Reverse = 4,
    /// Driver-specific highlight. Has no brightness of its own.
    Special = 5,
}

impl Attr {
    /// Attributes that participate in the lookup table, in table order.
    pub const TABLE: [Attr; TABLE_ATTRS] = [
        Attr::Normal,
        Attr::Dim,
        Attr::Bold,
        Attr::BoldFont,
        Attr::Reverse,
    ];

    /// Index of this attribute in the lookup table.
    ///
    /// SPECIAL shares the REVERSE entry.
    pub fn table_index(self) -> usize {
        match self {
            Attr::Special => Attr::Reverse as usize,
            other => other as usize,
        }
    }

    /// The support-mask bit for this attribute.
    pub fn mask(self) -> AttrMask {
        match self {
            Attr::Normal => AttrMask::NORMAL,
            Attr::Dim => AttrMask::DIM,
            Attr::Bold => AttrMask::BOLD,
            Attr::BoldFont => AttrMask::BOLDFONT,
            Attr::Reverse | Attr::Special => AttrMask::REVERSE,
        }
    }

    /// Closest attribute a sink supporting `supported` can show.
    ///
    /// BOLDFONT falls back to BOLD, everything else falls back to NORMAL.
    pub fn downgrade(self, supported: AttrMask) -> Attr {
        let attr = if self == Attr::Special { Attr::Reverse } else { self };
        if supported.contains(attr.mask()) {
            return attr;
        }
        if attr == Attr::BoldFont && supported.contains(AttrMask::BOLD) {
            return Attr::Bold;
        }
        Attr::Normal
    }

    /// Lowercase name, as used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Attr::Normal => "normal",
            Attr::Dim => "dim",
            Attr::Bold => "bold",
            Attr::BoldFont => "boldfont",
            Attr::Reverse => "reverse",
            Attr::Special => "special",
        }
    }
}

bitflags! {
    /// Set of attributes (and glyph ranges) a display can show.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttrMask: u16 {
        const NORMAL = 1;
        const DIM = 2;
        const BOLD = 4;
        const BOLDFONT = 8;
        const REVERSE = 16;
        /// Also use control codes (0-31, 127) as glyphs.
        const ALL = 128;
        /// Also use the upper half (128-255) as glyphs.
        const EIGHT = 256;
        const EXTENDED = Self::ALL.bits() | Self::EIGHT.bits();
    }
}

impl Default for AttrMask {
    fn default() -> Self {
        AttrMask::NORMAL | AttrMask::DIM | AttrMask::BOLD
    }
}

impl AttrMask {
    /// Parse a single mask name (`"normal"`, `"bold"`, `"all"`, ...).
    pub fn parse_name(name: &str) -> Option<AttrMask> {
        match name.to_ascii_lowercase().as_str() {
            "normal" => Some(AttrMask::NORMAL),
            "dim" => Some(AttrMask::DIM),
            "bold" => Some(AttrMask::BOLD),
            "boldfont" => Some(AttrMask::BOLDFONT),
            "reverse" => Some(AttrMask::REVERSE),
            "all" => Some(AttrMask::ALL),
            "eight" => Some(AttrMask::EIGHT),
            "extended" => Some(AttrMask::EXTENDED),
            _ => None,
        }
    }

    /// Whether glyph `code` may be chosen by the renderer under this mask.
    pub fn allows_glyph(self, code: u8) -> bool {
        match code {
            32..=126 => true,
            0..=31 | 127 => self.contains(AttrMask::ALL),
            128..=255 => self.contains(AttrMask::EIGHT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_shares_reverse_entry() {
        assert_eq!(Attr::Special.table_index(), Attr::Reverse.table_index());
        assert_eq!(Attr::Reverse.table_index(), 4);
    }

    #[test]
    fn test_downgrade() {
        let text_only = AttrMask::NORMAL;
        assert_eq!(Attr::Bold.downgrade(text_only), Attr::Normal);
        assert_eq!(Attr::Reverse.downgrade(text_only), Attr::Normal);

        let bold = AttrMask::NORMAL | AttrMask::BOLD;
        assert_eq!(Attr::BoldFont.downgrade(bold), Attr::Bold);
        assert_eq!(Attr::Dim.downgrade(bold), Attr::Normal);

        let reverse = AttrMask::NORMAL | AttrMask::REVERSE;
        assert_eq!(Attr::Special.downgrade(reverse), Attr::Reverse);
    }

    #[test]
    fn test_glyph_ranges() {
        let mask = AttrMask::default();
        assert!(mask.allows_glyph(b'A'));
        assert!(!mask.allows_glyph(0));
        assert!(!mask.allows_glyph(200));

        let ext = mask | AttrMask::EXTENDED;
        assert!(ext.allows_glyph(0));
        assert!(ext.allows_glyph(127));
        assert!(ext.allows_glyph(200));
    }

    #[test]
    fn test_mask_parse_name() {
        assert_eq!(AttrMask::parse_name("BOLD"), Some(AttrMask::BOLD));
        assert_eq!(AttrMask::parse_name("eight"), Some(AttrMask::EIGHT));
        assert_eq!(AttrMask::parse_name("sparkly"), None);
    }
}
