// src/config/settings.rs
//
// Immutable parameter sets for fingerprinting, matching and scanning.
// Each struct is passed explicitly into the component that uses it, so
// concurrent scans can run with different parameters.

use serde::{Deserialize, Serialize};

use crate::core::fingerprint::HashLayout;
use crate::error::{Result, SetlistError};

/// Default analysis sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Parameters of the fingerprint builder and its peak extractor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// FFT frame length in samples
    pub frame_size: usize,
    /// Stride between consecutive frames in samples
    pub hop_size: usize,
    /// Lower edge of the peak search range (inclusive)
    pub min_frequency_hz: f32,
    /// Upper edge of the peak search range (exclusive)
    pub max_frequency_hz: f32,
    /// Minimum normalized magnitude for a spectral peak
    pub magnitude_threshold: f32,
    /// Strongest peaks considered per frame before band balancing
    pub max_peaks_per_frame: usize,
    /// Number of equal-width bands across the search range
    pub num_bands: usize,
    /// Peaks kept per band
    pub peaks_per_band: usize,
    /// Targets paired with each anchor peak
    pub fan_out: usize,
    /// Anchor/target spacing must exceed this (Hz)
    pub min_delta_hz: f32,
    /// Anchor/target spacing must stay below this (Hz)
    pub max_delta_hz: f32,
    /// Bit layout of the packed hash key
    pub hash: HashLayout,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            min_frequency_hz: 100.0,
            max_frequency_hz: 4095.0,
            magnitude_threshold: 1e-4,
            max_peaks_per_frame: 30,
            num_bands: 5,
            peaks_per_band: 6,
            fan_out: 9,
            min_delta_hz: 30.0,
            max_delta_hz: 1000.0,
            hash: HashLayout::default(),
        }
    }
}

impl FingerprintConfig {
    /// Check every field, including the hash width against the frequency range
    pub fn validate(&self) -> Result<()> {
        if self.frame_size < 64 || !self.frame_size.is_power_of_two() {
            return Err(SetlistError::config(
                "frame_size",
                format!("{} is not a power of two >= 64", self.frame_size),
            ));
        }
        if self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(SetlistError::config(
                "hop_size",
                format!("{} must be in 1..={}", self.hop_size, self.frame_size),
            ));
        }
        if !self.min_frequency_hz.is_finite() || self.min_frequency_hz < 0.0 {
            return Err(SetlistError::config(
                "min_frequency_hz",
                "must be finite and non-negative",
            ));
        }
        if !self.max_frequency_hz.is_finite() || self.max_frequency_hz <= self.min_frequency_hz {
            return Err(SetlistError::config(
                "max_frequency_hz",
                format!(
                    "{} must be greater than min_frequency_hz ({})",
                    self.max_frequency_hz, self.min_frequency_hz
                ),
            ));
        }
        self.hash.validate()?;
        // Frequencies are rounded to whole Hz before packing
        let anchor_capacity = self.hash.anchor_capacity() as f32;
        if self.max_frequency_hz.round() >= anchor_capacity {
            return Err(SetlistError::config(
                "max_frequency_hz",
                format!(
                    "{} Hz does not fit {} anchor bits (limit {} Hz); widen hash.freq_bits",
                    self.max_frequency_hz, self.hash.freq_bits, anchor_capacity
                ),
            ));
        }
        if !self.magnitude_threshold.is_finite() || self.magnitude_threshold < 0.0 {
            return Err(SetlistError::config(
                "magnitude_threshold",
                "must be finite and non-negative",
            ));
        }
        if self.max_peaks_per_frame == 0 {
            return Err(SetlistError::config("max_peaks_per_frame", "must be positive"));
        }
        if self.num_bands == 0 {
            return Err(SetlistError::config("num_bands", "must be positive"));
        }
        if self.peaks_per_band == 0 {
            return Err(SetlistError::config("peaks_per_band", "must be positive"));
        }
        if self.fan_out == 0 {
            return Err(SetlistError::config("fan_out", "must be positive"));
        }
        if !self.min_delta_hz.is_finite() || self.min_delta_hz < 0.0 {
            return Err(SetlistError::config("min_delta_hz", "must be finite and non-negative"));
        }
        if !self.max_delta_hz.is_finite() || self.max_delta_hz <= self.min_delta_hz {
            return Err(SetlistError::config(
                "max_delta_hz",
                "must be greater than min_delta_hz",
            ));
        }
        if self.max_delta_hz.round() >= self.hash.delta_capacity() as f32 {
            return Err(SetlistError::config(
                "max_delta_hz",
                format!(
                    "{} Hz does not fit {} delta bits",
                    self.max_delta_hz, self.hash.delta_bits
                ),
            ));
        }
        Ok(())
    }

    /// Validate against a concrete analysis sample rate as well
    pub fn validate_for_rate(&self, sample_rate: u32) -> Result<()> {
        self.validate()?;
        if sample_rate == 0 {
            return Err(SetlistError::InvalidSampleRate(sample_rate));
        }
        let nyquist = sample_rate as f32 / 2.0;
        if self.max_frequency_hz > nyquist {
            return Err(SetlistError::config(
                "max_frequency_hz",
                format!("{} Hz exceeds Nyquist ({} Hz)", self.max_frequency_hz, nyquist),
            ));
        }
        Ok(())
    }

    /// Frame resolution in seconds at the given rate
    pub fn hop_secs(&self, sample_rate: u32) -> f64 {
        self.hop_size as f64 / sample_rate as f64
    }
}

/// Parameters of the offset-histogram similarity scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Decimal places kept when bucketing time offsets (2 = 10 ms buckets)
    pub time_offset_precision: u32,
    /// Share of the smaller fingerprint that saturates similarity to 1.0
    pub normalization_factor: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            time_offset_precision: 2,
            normalization_factor: 0.5,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.time_offset_precision > 6 {
            return Err(SetlistError::config(
                "time_offset_precision",
                format!("{} decimal places exceeds 6", self.time_offset_precision),
            ));
        }
        if !(self.normalization_factor > 0.0 && self.normalization_factor <= 1.0) {
            return Err(SetlistError::config(
                "normalization_factor",
                format!("{} must be in (0, 1]", self.normalization_factor),
            ));
        }
        Ok(())
    }

    /// Integer buckets per second
    pub fn bucket_scale(&self) -> f64 {
        10f64.powi(self.time_offset_precision as i32)
    }
}

/// Parameters of the sliding-window timeline scan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Window length in seconds
    pub chunk_size_sec: f64,
    /// Stride between window starts in seconds
    pub hop_size_sec: f64,
    /// Minimum similarity for a window to produce a detection
    pub similarity_threshold: f64,
    /// Similarity above which the scanner skips ahead
    pub best_similarity_threshold: f64,
    /// How far to skip after a confident detection; 0 disables skipping
    pub skip_duration_sec: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_size_sec: 15.0,
            hop_size_sec: 5.0,
            similarity_threshold: 0.15,
            best_similarity_threshold: 0.8,
            skip_duration_sec: 90.0,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.chunk_size_sec.is_finite() || self.chunk_size_sec <= 0.0 {
            return Err(SetlistError::config("chunk_size_sec", "must be positive"));
        }
        if !self.hop_size_sec.is_finite() || self.hop_size_sec <= 0.0 {
            return Err(SetlistError::config("hop_size_sec", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(SetlistError::config(
                "similarity_threshold",
                format!("{} is outside [0, 1]", self.similarity_threshold),
            ));
        }
        if !(0.0..=1.0).contains(&self.best_similarity_threshold) {
            return Err(SetlistError::config(
                "best_similarity_threshold",
                format!("{} is outside [0, 1]", self.best_similarity_threshold),
            ));
        }
        if self.best_similarity_threshold < self.similarity_threshold {
            return Err(SetlistError::config(
                "best_similarity_threshold",
                format!(
                    "{} is below similarity_threshold ({})",
                    self.best_similarity_threshold, self.similarity_threshold
                ),
            ));
        }
        if !self.skip_duration_sec.is_finite() || self.skip_duration_sec < 0.0 {
            return Err(SetlistError::config(
                "skip_duration_sec",
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Windows skipped after a confident detection
    pub fn skip_windows(&self) -> usize {
        (self.skip_duration_sec / self.hop_size_sec).ceil() as usize
    }
}

/// Everything a scan needs, loadable from a JSON file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Analysis sample rate; audio is resampled to this before fingerprinting
    pub sample_rate: u32,
    pub fingerprint: FingerprintConfig,
    pub matching: MatchConfig,
    pub scan: ScanConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            fingerprint: FingerprintConfig::default(),
            matching: MatchConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.fingerprint.validate_for_rate(self.sample_rate)?;
        self.matching.validate()?;
        self.scan.validate()
    }

    /// Read settings from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }
}
