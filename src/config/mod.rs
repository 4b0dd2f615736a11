//! Configuration module for setlistr

mod profiles;
mod settings;

pub use profiles::{ProfilePreset, SettingsBuilder};
pub use settings::{FingerprintConfig, MatchConfig, ScanConfig, Settings, DEFAULT_SAMPLE_RATE};
