// src/config/profiles.rs
//
// Named parameter presets and a fluent builder for scan settings

use serde::{Deserialize, Serialize};

use super::settings::{FingerprintConfig, MatchConfig, ScanConfig, Settings};
use crate::error::Result;

/// Preset parameter sets for common capture rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfilePreset {
    /// 44.1 kHz analysis, 512-sample hop (~11.6 ms resolution)
    CdQuality,
    /// 48 kHz analysis, 640-sample hop (~13.3 ms resolution)
    Broadcast,
}

impl ProfilePreset {
    pub fn all() -> Vec<Self> {
        vec![Self::CdQuality, Self::Broadcast]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CdQuality => "cd-quality",
            Self::Broadcast => "broadcast",
        }
    }

    /// Build the full settings for this preset
    pub fn settings(&self) -> Settings {
        match self {
            Self::CdQuality => Settings::default(),
            Self::Broadcast => Settings {
                sample_rate: 48_000,
                fingerprint: FingerprintConfig {
                    hop_size: 640,
                    ..FingerprintConfig::default()
                },
                ..Settings::default()
            },
        }
    }
}

impl std::str::FromStr for ProfilePreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cd" | "cd-quality" | "cdquality" => Ok(Self::CdQuality),
            "broadcast" => Ok(Self::Broadcast),
            other => Err(format!("unknown preset: {}", other)),
        }
    }
}

/// Builder for custom settings
#[derive(Debug, Clone, Copy)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
        }
    }

    pub fn from_preset(preset: ProfilePreset) -> Self {
        Self {
            settings: preset.settings(),
        }
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.settings.sample_rate = sample_rate;
        self
    }

    pub fn fingerprint(mut self, config: FingerprintConfig) -> Self {
        self.settings.fingerprint = config;
        self
    }

    pub fn matching(mut self, config: MatchConfig) -> Self {
        self.settings.matching = config;
        self
    }

    pub fn scan(mut self, config: ScanConfig) -> Self {
        self.settings.scan = config;
        self
    }

    pub fn chunk_size_sec(mut self, secs: f64) -> Self {
        self.settings.scan.chunk_size_sec = secs;
        self
    }

    pub fn hop_size_sec(mut self, secs: f64) -> Self {
        self.settings.scan.hop_size_sec = secs;
        self
    }

    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.settings.scan.similarity_threshold = threshold;
        self
    }

    pub fn best_similarity_threshold(mut self, threshold: f64) -> Self {
        self.settings.scan.best_similarity_threshold = threshold;
        self
    }

    pub fn skip_duration_sec(mut self, secs: f64) -> Self {
        self.settings.scan.skip_duration_sec = secs;
        self
    }

    /// Disable skip-ahead after confident detections
    pub fn no_skip(self) -> Self {
        self.skip_duration_sec(0.0)
    }

    pub fn time_offset_precision(mut self, decimals: u32) -> Self {
        self.settings.matching.time_offset_precision = decimals;
        self
    }

    /// Validate and return the settings
    pub fn build(self) -> Result<Settings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
