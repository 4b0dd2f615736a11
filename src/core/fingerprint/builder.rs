// src/core/fingerprint/builder.rs
//
// Audio buffer to Fingerprint: Hann-windowed frames, band-balanced peaks,
// anchor/target pairing and hash accumulation.

use log::debug;
use rayon::prelude::*;

use super::hash::{HashKey, HashLayout};
use super::peaks::{Peak, SpectralPeakExtractor};
use super::Fingerprint;
use crate::config::FingerprintConfig;
use crate::core::dsp::SpectrumAnalyzer;
use crate::error::{Result, SetlistError};

/// Builds fingerprints with one fixed configuration and sample rate
///
/// The builder is immutable; a single instance can fingerprint any number of
/// buffers, from any number of threads.
pub struct FingerprintBuilder {
    config: FingerprintConfig,
    sample_rate: u32,
    analyzer: SpectrumAnalyzer,
    extractor: SpectralPeakExtractor,
}

struct FrameHashes {
    peaks: usize,
    hashes: Vec<(HashKey, f64)>,
}

impl FingerprintBuilder {
    pub fn new(config: FingerprintConfig, sample_rate: u32) -> Result<Self> {
        config.validate_for_rate(sample_rate)?;
        Ok(Self {
            analyzer: SpectrumAnalyzer::new(config.frame_size),
            extractor: SpectralPeakExtractor::new(&config, sample_rate),
            config,
            sample_rate,
        })
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of analysis frames for a buffer of `len` samples
    ///
    /// A buffer shorter than one frame still yields one zero-padded frame.
    pub fn frame_count(&self, len: usize) -> usize {
        if len == 0 {
            0
        } else if len <= self.config.frame_size {
            1
        } else {
            (len - self.config.frame_size) / self.config.hop_size + 1
        }
    }

    /// Fingerprint a mono buffer
    pub fn build(&self, samples: &[f32]) -> Result<Fingerprint> {
        if samples.is_empty() {
            return Err(SetlistError::EmptyAudio);
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(SetlistError::NonFiniteSamples { index });
        }

        let frame_size = self.config.frame_size;
        let hop = self.config.hop_size;
        let num_frames = self.frame_count(samples.len());

        let frames: Vec<FrameHashes> = (0..num_frames)
            .into_par_iter()
            .map_init(
                || self.analyzer.scratch(),
                |scratch, idx| {
                    let start = idx * hop;
                    let end = (start + frame_size).min(samples.len());
                    let magnitudes = self.analyzer.magnitudes(&samples[start..end], scratch)?;
                    let peaks = self.extractor.extract(magnitudes);
                    let time_sec = (idx * hop) as f64 / self.sample_rate as f64;
                    Ok(FrameHashes {
                        peaks: peaks.len(),
                        hashes: self.pair_peaks(&peaks, time_sec),
                    })
                },
            )
            .collect::<Result<Vec<_>>>()?;

        let duration_sec = samples.len() as f64 / self.sample_rate as f64;
        let mut fingerprint = Fingerprint::new(duration_sec);
        let mut total_peaks = 0usize;
        for frame in frames {
            total_peaks += frame.peaks;
            for (key, time) in frame.hashes {
                fingerprint.insert(key, time);
            }
        }

        debug!(
            "fingerprint: {} frames, {} peaks, {} keys, {} occurrences, {:.2}s",
            num_frames,
            total_peaks,
            fingerprint.len(),
            fingerprint.occurrences(),
            duration_sec
        );

        Ok(fingerprint)
    }

    /// Pair each anchor with up to `fan_out` higher peaks of the same frame
    ///
    /// `peaks` must be sorted by ascending frequency.
    fn pair_peaks(&self, peaks: &[Peak], time_sec: f64) -> Vec<(HashKey, f64)> {
        pair_peaks(
            peaks,
            self.config.fan_out,
            self.config.min_delta_hz,
            self.config.max_delta_hz,
            &self.config.hash,
            time_sec,
        )
    }
}

fn pair_peaks(
    peaks: &[Peak],
    fan_out: usize,
    min_delta_hz: f32,
    max_delta_hz: f32,
    layout: &HashLayout,
    time_sec: f64,
) -> Vec<(HashKey, f64)> {
    let mut hashes = Vec::new();
    for (i, anchor) in peaks.iter().enumerate() {
        for target in peaks.iter().skip(i + 1).take(fan_out) {
            let delta = target.frequency_hz - anchor.frequency_hz;
            if delta > min_delta_hz && delta < max_delta_hz {
                hashes.push((layout.encode_hz(anchor.frequency_hz, delta), time_sec));
            }
        }
    }
    hashes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const SR: u32 = 44_100;

    fn bin_hz() -> f32 {
        SR as f32 / 2048.0
    }

    /// Sum of sinusoids centered on the given analysis bins
    fn chord(bins: &[usize], secs: f32) -> Vec<f32> {
        let n = (secs * SR as f32) as usize;
        (0..n)
            .map(|i| {
                bins.iter()
                    .map(|&b| 0.25 * (2.0 * PI * (b * i) as f64 / 2048.0).sin())
                    .sum::<f64>() as f32
            })
            .collect()
    }

    fn peak(frequency_hz: f32) -> Peak {
        Peak { frequency_hz, magnitude: 1.0 }
    }

    #[test]
    fn test_pairing_respects_delta_bounds() {
        let layout = HashLayout::default();
        let peaks = [peak(200.0), peak(220.0), peak(500.0), peak(1300.0)];
        let hashes = pair_peaks(&peaks, 9, 30.0, 1000.0, &layout, 0.5);

        let pairs: Vec<(u32, u32)> = hashes.iter().map(|(k, _)| layout.decode(*k)).collect();
        // 200->220 is too close, 200->1300 and 220->1300 are too far
        assert_eq!(pairs, vec![(200, 300), (220, 280), (500, 800)]);
        assert!(hashes.iter().all(|(_, t)| *t == 0.5));
    }

    #[test]
    fn test_pairing_fan_out() {
        let layout = HashLayout::default();
        let peaks: Vec<Peak> = (0..12).map(|i| peak(100.0 + 50.0 * i as f32)).collect();
        let hashes = pair_peaks(&peaks, 3, 30.0, 1000.0, &layout, 0.0);
        let from_first = hashes
            .iter()
            .filter(|(k, _)| layout.decode(*k).0 == 100)
            .count();
        assert_eq!(from_first, 3);
    }

    #[test]
    fn test_empty_buffer_is_error() {
        let builder = FingerprintBuilder::new(FingerprintConfig::default(), SR).unwrap();
        assert!(matches!(builder.build(&[]), Err(SetlistError::EmptyAudio)));
    }

    #[test]
    fn test_non_finite_sample_is_error() {
        let builder = FingerprintBuilder::new(FingerprintConfig::default(), SR).unwrap();
        let mut samples = vec![0.0f32; 4096];
        samples[1000] = f32::NAN;
        match builder.build(&samples) {
            Err(SetlistError::NonFiniteSamples { index }) => assert_eq!(index, 1000),
            other => panic!("expected non-finite error, got {:?}", other.map(|f| f.len())),
        }
    }

    #[test]
    fn test_silence_is_empty_fingerprint() {
        let builder = FingerprintBuilder::new(FingerprintConfig::default(), SR).unwrap();
        let fp = builder.build(&vec![0.0; SR as usize]).unwrap();
        assert!(fp.is_empty());
        assert!((fp.duration_sec() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_chord_produces_expected_keys() {
        let builder = FingerprintBuilder::new(FingerprintConfig::default(), SR).unwrap();
        // bins 20, 30, 40: ~430.7, ~646.0, ~861.3 Hz
        let fp = builder.build(&chord(&[20, 30, 40], 1.0)).unwrap();
        assert!(!fp.is_empty());

        let layout = HashLayout::default();
        let f = |b: usize| b as f32 * bin_hz();
        let expected = [
            layout.encode_hz(f(20), f(30) - f(20)),
            layout.encode_hz(f(20), f(40) - f(20)),
            layout.encode_hz(f(30), f(40) - f(30)),
        ];
        for key in expected {
            assert!(fp.contains(key), "missing {}", key);
        }
        // Every full frame sees the same three pairs
        let frames = builder.frame_count(SR as usize);
        assert_eq!(fp.get(expected[0]).map(|t| t.len()), Some(frames));
    }

    #[test]
    fn test_occurrence_times_follow_hop() {
        let builder = FingerprintBuilder::new(FingerprintConfig::default(), SR).unwrap();
        let fp = builder.build(&chord(&[20, 30], 0.5)).unwrap();
        let (first, last) = fp.time_span().unwrap();
        assert_eq!(first, 0.0);
        let frames = builder.frame_count((0.5 * SR as f32) as usize);
        let expected_last = ((frames - 1) * 512) as f64 / SR as f64;
        assert!((last - expected_last).abs() < 1e-12);
    }

    #[test]
    fn test_frame_count() {
        let builder = FingerprintBuilder::new(FingerprintConfig::default(), SR).unwrap();
        assert_eq!(builder.frame_count(0), 0);
        assert_eq!(builder.frame_count(100), 1);
        assert_eq!(builder.frame_count(2048), 1);
        assert_eq!(builder.frame_count(2048 + 511), 1);
        assert_eq!(builder.frame_count(2048 + 512), 2);
    }
}
