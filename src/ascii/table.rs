//! Luminance lookup table.
//!
//! Every (glyph, attribute) pair gets an effective brightness and four
//! sub-pixel values. The forward direction maps each of the 256 input
//! luminance buckets to the nearest-brightness candidate; the reverse
//! direction (back-conversion) reads the sub-pixel values of a pair.

use super::attr::{Attr, AttrMask, TABLE_ATTRS};
use super::font::{FontMetrics, GLYPHS};
use super::params::{HardwareParams, RenderParams, NORMAL_CONTRAST};
use crate::error::Result;

/// Number of (glyph, attribute) entries.
pub const TABLE_ENTRIES: usize = GLYPHS * TABLE_ATTRS;

/// Storage slot of the top-left, top-right, bottom-left and bottom-right
/// sub-pixel inside a table entry. Fixed layout; back-conversion depends on it.
pub const SUBPIXEL_ORDER: [usize; 4] = [1, 0, 3, 2];

/// Display capabilities that shape the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableOptions {
    pub supported: AttrMask,
    pub dimmul: f32,
    pub boldmul: f32,
}

impl From<&HardwareParams> for TableOptions {
    fn from(hw: &HardwareParams) -> Self {
        Self {
            supported: hw.supported,
            dimmul: hw.dimmul,
            boldmul: hw.boldmul,
        }
    }
}

/// Identity of a built table: font plus everything that changes brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableKey {
    font: u64,
    contrast: i32,
    gamma_bits: u32,
    dimmul_bits: u32,
    boldmul_bits: u32,
    supported: AttrMask,
}

impl TableKey {
    pub fn new(metrics: &FontMetrics, params: &RenderParams, options: &TableOptions) -> Self {
        Self {
            font: metrics.fingerprint(),
            contrast: params.contrast,
            gamma_bits: params.gamma.to_bits(),
            dimmul_bits: options.dimmul.to_bits(),
            boldmul_bits: options.boldmul.to_bits(),
            supported: options.supported,
        }
    }

    /// Whether a table with this key was built for the contrast and gamma of `params`.
    pub fn matches_params(&self, params: &RenderParams) -> bool {
        self.contrast == params.contrast && self.gamma_bits == params.gamma.to_bits()
    }
}

/// A glyph choice for one luminance bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub glyph: u8,
    pub attr: Attr,
    /// Adjusted brightness the candidate represents.
    pub brightness: u8,
}

impl Candidate {
    /// Tie-break order: NORMAL first, then the lowest glyph code.
    fn preference(&self) -> (u8, u8) {
        (self.attr as u8, self.glyph)
    }
}

/// Brightness data of one (glyph, attribute) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableEntry {
    pub brightness: u8,
    /// Sub-pixel luminance in storage order, see [`SUBPIXEL_ORDER`].
    pub subpixels: [u8; 4],
}

/// Forward and reverse glyph lookup for one font and parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    key: TableKey,
    params: RenderParams,
    entries: Vec<TableEntry>,
    buckets: Vec<Candidate>,
}

impl LookupTable {
    /// Build the table for `metrics` under `params`.
    ///
    /// Fails with `Config` when contrast or gamma is not positive.
    pub fn build(
        metrics: &FontMetrics,
        params: &RenderParams,
        options: &TableOptions,
    ) -> Result<Self> {
        params.validate()?;
        let key = TableKey::new(metrics, params, options);

        let raw: Vec<[f32; 4]> = (0..TABLE_ENTRIES)
            .map(|n| raw_quadrants(metrics, (n % GLYPHS) as u8, Attr::TABLE[n / GLYPHS], options))
            .collect();

        // Normalise so the brightest candidate reaches 255.
        let peak = (0..TABLE_ENTRIES)
            .filter(|&n| is_candidate(n, options.supported))
            .map(|n| raw[n].iter().sum::<f32>() / 4.0)
            .fold(0.0f32, f32::max);
        let scale = if peak > 0.0 { 255.0 / peak } else { 255.0 };

        let entries: Vec<TableEntry> = raw
            .iter()
            .map(|quadrants| {
                let scaled = quadrants.map(|q| q * scale);
                let total = (scaled.iter().sum::<f32>() / 4.0).min(255.0);
                let brightness = adjust(total, params);
                TableEntry {
                    brightness,
                    subpixels: store_subpixels(fit_subpixels(scaled, brightness)),
                }
            })
            .collect();

        let buckets = build_buckets(&entries, options.supported);

        log::debug!(
            "built lookup table for font '{}' (contrast {}, gamma {}, {} candidates)",
            metrics.name(),
            params.contrast,
            params.gamma,
            (0..TABLE_ENTRIES)
                .filter(|&n| is_candidate(n, options.supported))
                .count()
        );

        Ok(Self {
            key,
            params: *params,
            entries,
            buckets,
        })
    }

    pub fn key(&self) -> &TableKey {
        &self.key
    }

    /// The params this table was built with.
    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    /// Best candidate for an input luminance.
    #[inline]
    pub fn bucket(&self, luminance: u8) -> Candidate {
        self.buckets[luminance as usize]
    }

    /// Entry for a glyph shown with `attr` (SPECIAL reads the REVERSE entry).
    #[inline]
    pub fn entry(&self, glyph: u8, attr: Attr) -> &TableEntry {
        &self.entries[glyph as usize + GLYPHS * attr.table_index()]
    }

    /// Brightness a glyph represents with `attr`.
    pub fn brightness(&self, glyph: u8, attr: Attr) -> u8 {
        self.entry(glyph, attr).brightness
    }

    /// Sub-pixels of a glyph in top-left, top-right, bottom-left, bottom-right order.
    pub fn subpixels(&self, glyph: u8, attr: Attr) -> [u8; 4] {
        let stored = &self.entry(glyph, attr).subpixels;
        SUBPIXEL_ORDER.map(|slot| stored[slot])
    }
}

fn is_candidate(n: usize, supported: AttrMask) -> bool {
    let glyph = (n % GLYPHS) as u8;
    let attr = Attr::TABLE[n / GLYPHS];
    supported.contains(attr.mask()) && supported.allows_glyph(glyph)
}

/// Unscaled quadrant brightness of a glyph shown with `attr`.
fn raw_quadrants(metrics: &FontMetrics, glyph: u8, attr: Attr, options: &TableOptions) -> [f32; 4] {
    let m = metrics.glyph(glyph);
    match attr {
        Attr::Normal => m.normal,
        Attr::Dim => m.normal.map(|q| q / options.dimmul),
        Attr::Bold => m.normal.map(|q| q * options.boldmul),
        Attr::BoldFont => m.bold,
        Attr::Reverse | Attr::Special => m.normal.map(|q| 1.0 - q),
    }
}

/// Apply gamma, then contrast around the midpoint.
fn adjust(brightness: f32, params: &RenderParams) -> u8 {
    let gamma = 255.0 * (brightness / 255.0).powf(1.0 / params.gamma);
    let contrast = 128.0 + (gamma - 128.0) * params.contrast as f32 / NORMAL_CONTRAST as f32;
    contrast.round().clamp(0.0, 255.0) as u8
}

/// Integer sub-pixels shaped like `targets` whose sum is exactly `4 * brightness`.
fn fit_subpixels(targets: [f32; 4], brightness: u8) -> [u8; 4] {
    let want = 4 * brightness as i32;
    let sum: f32 = targets.iter().sum();
    let shaped = if sum > 0.0 {
        targets.map(|t| t * want as f32 / sum)
    } else {
        [brightness as f32; 4]
    };

    let mut out = shaped.map(|t| (t.floor() as i32).clamp(0, 255));
    let mut total: i32 = out.iter().sum();

    while total < want {
        let i = pick(&out, &shaped, |v| v < 255, true);
        out[i] += 1;
        total += 1;
    }
    while total > want {
        let i = pick(&out, &shaped, |v| v > 0, false);
        out[i] -= 1;
        total -= 1;
    }

    out.map(|v| v as u8)
}

/// Index with the largest (or smallest) shortfall among slots that can move.
fn pick(out: &[i32; 4], shaped: &[f32; 4], movable: impl Fn(i32) -> bool, largest: bool) -> usize {
    let mut best: Option<(usize, f32)> = None;
    for i in 0..4 {
        if !movable(out[i]) {
            continue;
        }
        let gap = shaped[i] - out[i] as f32;
        let better = match best {
            None => true,
            Some((_, g)) if largest => gap > g,
            Some((_, g)) => gap < g,
        };
        if better {
            best = Some((i, gap));
        }
    }
    best.map_or(0, |(i, _)| i)
}

fn store_subpixels(geometric: [u8; 4]) -> [u8; 4] {
    let mut stored = [0u8; 4];
    for (quadrant, &slot) in SUBPIXEL_ORDER.iter().enumerate() {
        stored[slot] = geometric[quadrant];
    }
    stored
}

/// Nearest candidate for every luminance 0-255.
fn build_buckets(entries: &[TableEntry], supported: AttrMask) -> Vec<Candidate> {
    // Preferred candidate at each exact brightness level.
    let mut best_at: [Option<Candidate>; 256] = [None; 256];
    for (n, entry) in entries.iter().enumerate() {
        if !is_candidate(n, supported) {
            continue;
        }
        let candidate = Candidate {
            glyph: (n % GLYPHS) as u8,
            attr: Attr::TABLE[n / GLYPHS],
            brightness: entry.brightness,
        };
        let slot = &mut best_at[entry.brightness as usize];
        let replace = match slot {
            Some(current) => candidate.preference() < current.preference(),
            None => true,
        };
        if replace {
            *slot = Some(candidate);
        }
    }

    (0..256usize)
        .map(|lum| nearest(&best_at, lum))
        .collect()
}

fn nearest(best_at: &[Option<Candidate>; 256], lum: usize) -> Candidate {
    for d in 0..256usize {
        let below = lum.checked_sub(d).and_then(|i| best_at[i]);
        let above = best_at.get(lum + d).copied().flatten();
        match (below, above) {
            (Some(b), Some(a)) => {
                return if b.preference() <= a.preference() { b } else { a };
            }
            (Some(c), None) | (None, Some(c)) => return c,
            (None, None) => {}
        }
    }
    // The printable range is always a candidate, so this is unreachable in
    // practice; fall back to a blank cell.
    Candidate {
        glyph: b' ',
        attr: Attr::Normal,
        brightness: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::font::Font;

    fn table(params: &RenderParams) -> LookupTable {
        let metrics = FontMetrics::from_font(&Font::builtin());
        LookupTable::build(&metrics, params, &TableOptions::from(&HardwareParams::default()))
            .unwrap()
    }

    #[test]
    fn test_fit_subpixels_exact_sum() {
        for brightness in [0u8, 1, 17, 128, 200, 255] {
            let fitted = fit_subpixels([10.0, 0.0, 250.0, 3.5], brightness);
            let sum: u32 = fitted.iter().map(|&v| v as u32).sum();
            assert_eq!(sum, 4 * brightness as u32, "brightness {}", brightness);
        }
    }

    #[test]
    fn test_fit_subpixels_keeps_shape() {
        let fitted = fit_subpixels([0.0, 0.0, 100.0, 100.0], 50);
        assert_eq!(fitted, [0, 0, 100, 100]);
    }

    #[test]
    fn test_fit_subpixels_blank_shape() {
        assert_eq!(fit_subpixels([0.0; 4], 40), [40, 40, 40, 40]);
    }

    #[test]
    fn test_subpixel_storage_order() {
        let stored = store_subpixels([1, 2, 3, 4]);
        assert_eq!(stored, [2, 1, 4, 3]);
    }

    #[test]
    fn test_space_is_darkest_bucket() {
        let t = table(&RenderParams::default());
        let c = t.bucket(0);
        assert_eq!(c.brightness, 0);
        assert_eq!(c.glyph, b' ');
        assert_eq!(c.attr, Attr::Normal);
    }

    #[test]
    fn test_bucket_candidates_are_supported() {
        let t = table(&RenderParams::default());
        for lum in 0..=255u8 {
            let c = t.bucket(lum);
            assert!(AttrMask::default().contains(c.attr.mask()));
            assert!((32..=126).contains(&c.glyph));
        }
    }

    #[test]
    fn test_brightest_bucket_reaches_top() {
        let t = table(&RenderParams::default());
        assert_eq!(t.bucket(255).brightness, 255);
        assert_eq!(t.bucket(255).attr, Attr::Bold);
    }

    #[test]
    fn test_contrast_changes_table() {
        let base = table(&RenderParams::default());
        let harsh = table(&RenderParams {
            contrast: 300,
            ..RenderParams::default()
        });
        assert_ne!(base.key(), harsh.key());
        assert!(!base.key().matches_params(harsh.params()));
    }

    #[test]
    fn test_key_ignores_dither_and_jitter() {
        let t = table(&RenderParams::default());
        let params = RenderParams {
            randomval: 30,
            bright: 10,
            ..RenderParams::default()
        };
        assert!(t.key().matches_params(&params));
    }

    #[test]
    fn test_build_rejects_bad_params() {
        let metrics = FontMetrics::from_font(&Font::builtin());
        let options = TableOptions::from(&HardwareParams::default());
        let params = RenderParams {
            gamma: 0.0,
            ..RenderParams::default()
        };
        assert!(LookupTable::build(&metrics, &params, &options).is_err());
    }
}
