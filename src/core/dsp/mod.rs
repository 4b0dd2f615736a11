//! Digital Signal Processing utilities

pub mod windows;

use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

use crate::error::{Result, SetlistError};

/// Per-thread working buffers for [`SpectrumAnalyzer`]
pub struct SpectrumScratch {
    input: Vec<f32>,
    output: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
}

/// Hann-windowed real FFT producing normalized magnitude spectra
///
/// The analyzer itself is immutable and can be shared across threads; each
/// worker owns a [`SpectrumScratch`] obtained from [`SpectrumAnalyzer::scratch`].
pub struct SpectrumAnalyzer {
    frame_size: usize,
    window: Vec<f32>,
    window_sum: f32,
    fft: Arc<dyn RealToComplex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new(frame_size: usize) -> Self {
        let window = windows::hann(frame_size);
        let window_sum: f32 = window.iter().sum();
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_size);
        Self {
            frame_size,
            window,
            window_sum,
            fft,
        }
    }

    pub fn scratch(&self) -> SpectrumScratch {
        SpectrumScratch {
            input: self.fft.make_input_vec(),
            output: self.fft.make_output_vec(),
            scratch: self.fft.make_scratch_vec(),
            magnitudes: vec![0.0; self.num_bins()],
        }
    }

    /// Magnitude spectrum of one frame, `|X[k]| / sum(w)` for `k in 0..=N/2`
    ///
    /// Frames shorter than the frame size are zero padded.
    pub fn magnitudes<'a>(&self, frame: &[f32], scratch: &'a mut SpectrumScratch) -> Result<&'a [f32]> {
        let len = frame.len().min(self.frame_size);
        for (dst, (&s, &w)) in scratch.input.iter_mut().zip(frame[..len].iter().zip(&self.window)) {
            *dst = s * w;
        }
        scratch.input[len..].fill(0.0);

        self.fft
            .process_with_scratch(&mut scratch.input, &mut scratch.output, &mut scratch.scratch)
            .map_err(|e| SetlistError::Spectrum(format!("forward transform failed: {:?}", e)))?;

        let norm = if self.window_sum > 0.0 { 1.0 / self.window_sum } else { 0.0 };
        for (mag, c) in scratch.magnitudes.iter_mut().zip(&scratch.output) {
            *mag = c.norm() * norm;
        }
        Ok(&scratch.magnitudes)
    }

    /// Center frequency of bin `k`
    pub fn bin_frequency(&self, bin: usize, sample_rate: u32) -> f32 {
        bin as f32 * sample_rate as f32 / self.frame_size as f32
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn num_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_spectrum_length() {
        let analyzer = SpectrumAnalyzer::new(1024);
        let mut scratch = analyzer.scratch();
        let samples = vec![0.0f32; 1024];
        let mags = analyzer.magnitudes(&samples, &mut scratch).unwrap();
        assert_eq!(mags.len(), 513);
        assert!(mags.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_bin_centered_tone() {
        let sr = 44_100u32;
        let analyzer = SpectrumAnalyzer::new(2048);
        let bin = 20usize;
        let freq = analyzer.bin_frequency(bin, sr);
        let samples: Vec<f32> = (0..2048)
            .map(|i| (2.0 * PI * freq * i as f32 / sr as f32).sin())
            .collect();

        let mut scratch = analyzer.scratch();
        let mags = analyzer.magnitudes(&samples, &mut scratch).unwrap();

        // Unit sinusoid peaks at amplitude / 2, neighbours at a quarter
        assert!((mags[bin] - 0.5).abs() < 1e-3, "peak {}", mags[bin]);
        assert!((mags[bin - 1] - 0.25).abs() < 1e-3);
        assert!((mags[bin + 1] - 0.25).abs() < 1e-3);
        assert!(mags[bin + 3] < 1e-3);
    }

    #[test]
    fn test_short_frame_is_padded() {
        let analyzer = SpectrumAnalyzer::new(256);
        let mut scratch = analyzer.scratch();
        let samples = vec![0.5f32; 100];
        let mags = analyzer.magnitudes(&samples, &mut scratch).unwrap();
        assert_eq!(mags.len(), 129);
        assert!(mags[0] > 0.0);
    }
}
