// src/core/fingerprint/peaks.rs
//
// Spectral peak picking: local maxima of one frame's magnitude spectrum,
// capped per frame and spread across equal-width frequency bands.

use crate::config::FingerprintConfig;

/// One spectral peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub frequency_hz: f32,
    pub magnitude: f32,
}

/// Turns a magnitude spectrum into a bounded, band-balanced peak set
#[derive(Debug, Clone)]
pub struct SpectralPeakExtractor {
    min_frequency_hz: f32,
    max_frequency_hz: f32,
    magnitude_threshold: f32,
    max_peaks_per_frame: usize,
    num_bands: usize,
    peaks_per_band: usize,
    bin_hz: f32,
}

impl SpectralPeakExtractor {
    pub fn new(config: &FingerprintConfig, sample_rate: u32) -> Self {
        Self {
            min_frequency_hz: config.min_frequency_hz,
            max_frequency_hz: config.max_frequency_hz,
            magnitude_threshold: config.magnitude_threshold,
            max_peaks_per_frame: config.max_peaks_per_frame,
            num_bands: config.num_bands.max(1),
            peaks_per_band: config.peaks_per_band,
            bin_hz: sample_rate as f32 / config.frame_size as f32,
        }
    }

    /// Band-balanced peaks of one frame, sorted by ascending frequency
    pub fn extract(&self, magnitudes: &[f32]) -> Vec<Peak> {
        let candidates = self.candidates(magnitudes);
        let mut peaks = self.balance(candidates);
        peaks.sort_by(|a, b| a.frequency_hz.total_cmp(&b.frequency_hz));
        peaks
    }

    /// Local maxima inside the search range, strongest `max_peaks_per_frame` first
    pub fn candidates(&self, magnitudes: &[f32]) -> Vec<Peak> {
        let mut peaks = Vec::new();
        if magnitudes.len() < 3 {
            return peaks;
        }

        for k in 1..magnitudes.len() - 1 {
            let mag = magnitudes[k];
            if !(mag > magnitudes[k - 1] && mag >= magnitudes[k + 1]) {
                continue;
            }
            if mag < self.magnitude_threshold {
                continue;
            }
            let frequency_hz = k as f32 * self.bin_hz;
            if frequency_hz < self.min_frequency_hz || frequency_hz >= self.max_frequency_hz {
                continue;
            }
            peaks.push(Peak { frequency_hz, magnitude: mag });
        }

        sort_strongest_first(&mut peaks);
        peaks.truncate(self.max_peaks_per_frame);
        peaks
    }

    /// Keep the strongest `peaks_per_band` peaks in each band
    pub fn balance(&self, candidates: Vec<Peak>) -> Vec<Peak> {
        let width = (self.max_frequency_hz - self.min_frequency_hz) / self.num_bands as f32;
        let mut bands: Vec<Vec<Peak>> = vec![Vec::new(); self.num_bands];

        for peak in candidates {
            let band = ((peak.frequency_hz - self.min_frequency_hz) / width) as usize;
            bands[band.min(self.num_bands - 1)].push(peak);
        }

        let mut selected = Vec::with_capacity(self.num_bands * self.peaks_per_band);
        for mut band in bands {
            sort_strongest_first(&mut band);
            band.truncate(self.peaks_per_band);
            selected.extend(band);
        }
        selected
    }

    pub fn bin_hz(&self) -> f32 {
        self.bin_hz
    }
}

// Descending magnitude; equal magnitudes keep the lower frequency first.
fn sort_strongest_first(peaks: &mut [Peak]) {
    peaks.sort_by(|a, b| {
        b.magnitude
            .total_cmp(&a.magnitude)
            .then(a.frequency_hz.total_cmp(&b.frequency_hz))
    });
}
