//! Window function implementations

use std::f32::consts::PI;

/// Periodic Hann window of `size` coefficients
///
/// The periodic form (divide by `n`, not `n - 1`) makes a tone sitting
/// exactly on an analysis bin leak into only its two neighbours.
pub fn hann(size: usize) -> Vec<f32> {
    let n = size as f32;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / n).cos()))
        .collect()
}
