//! Error-diffusion state used by the renderer.
//!
//! Traversal is raster order, left to right and top to bottom, so results
//! depend only on the input pixels and the parameters.

use super::params::Dither;

/// Per-render diffusion state.
#[derive(Debug, Clone)]
pub enum DitherEngine {
    None,
    /// Running error carried along the current row.
    ErrorDistrib { carry: i32 },
    /// Errors for the current row and the row below it.
    FloydSteinberg { current: Vec<i32>, next: Vec<i32> },
}

impl DitherEngine {
    /// State for a region `width` cells wide.
    pub fn new(mode: Dither, width: usize) -> Self {
        match mode {
            Dither::None => DitherEngine::None,
            Dither::ErrorDistrib => DitherEngine::ErrorDistrib { carry: 0 },
            Dither::FloydSteinberg => DitherEngine::FloydSteinberg {
                current: vec![0; width],
                next: vec![0; width],
            },
        }
    }

    /// Call before the first cell of every row.
    pub fn start_row(&mut self) {
        match self {
            DitherEngine::None => {}
            DitherEngine::ErrorDistrib { carry } => *carry = 0,
            DitherEngine::FloydSteinberg { current, next } => {
                std::mem::swap(current, next);
                next.fill(0);
            }
        }
    }

    /// Add the error accumulated for cell `x` of the current row.
    pub fn apply(&self, x: usize, value: i32) -> i32 {
        match self {
            DitherEngine::None => value,
            DitherEngine::ErrorDistrib { carry } => value + carry,
            DitherEngine::FloydSteinberg { current, .. } => value + current[x],
        }
    }

    /// Spread the error between what cell `x` wanted and what it got.
    pub fn record(&mut self, x: usize, wanted: i32, got: u8) {
        let error = wanted.clamp(0, 255) - got as i32;
        match self {
            DitherEngine::None => {}
            DitherEngine::ErrorDistrib { carry } => *carry = error,
            DitherEngine::FloydSteinberg { current, next } => {
                let w = current.len();
                //       [*] 7/16
                // 3/16 5/16 1/16
                if x + 1 < w {
                    current[x + 1] += error * 7 / 16;
                }
                if x > 0 {
                    next[x - 1] += error * 3 / 16;
                }
                next[x] += error * 5 / 16;
                if x + 1 < w {
                    next[x + 1] += error / 16;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let mut d = DitherEngine::new(Dither::None, 4);
        d.start_row();
        d.record(0, 100, 0);
        assert_eq!(d.apply(1, 42), 42);
    }

    #[test]
    fn test_error_distrib_carries_along_row() {
        let mut d = DitherEngine::new(Dither::ErrorDistrib, 4);
        d.start_row();
        assert_eq!(d.apply(0, 100), 100);
        d.record(0, 100, 90);
        assert_eq!(d.apply(1, 100), 110);
        d.record(1, 110, 120);
        assert_eq!(d.apply(2, 100), 90);
    }

    #[test]
    fn test_error_distrib_resets_each_row() {
        let mut d = DitherEngine::new(Dither::ErrorDistrib, 4);
        d.start_row();
        d.record(0, 100, 50);
        d.start_row();
        assert_eq!(d.apply(0, 100), 100);
    }

    #[test]
    fn test_floyd_steinberg_weights() {
        let mut d = DitherEngine::new(Dither::FloydSteinberg, 3);
        d.start_row();
        d.record(1, 160, 0);
        // 160 * 7/16 to the right on this row
        assert_eq!(d.apply(2, 0), 70);
        d.start_row();
        // 3/16, 5/16 and 1/16 on the row below
        assert_eq!(d.apply(0, 0), 30);
        assert_eq!(d.apply(1, 0), 50);
        assert_eq!(d.apply(2, 0), 10);
    }

    #[test]
    fn test_floyd_steinberg_edges_do_not_panic() {
        let mut d = DitherEngine::new(Dither::FloydSteinberg, 1);
        d.start_row();
        d.record(0, 255, 0);
        d.start_row();
        assert_eq!(d.apply(0, 0), 255 * 5 / 16);
    }
}
