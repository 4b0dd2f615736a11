// src/error.rs
//
// Error taxonomy for the fingerprinting and matching core.

use thiserror::Error;

/// Errors raised by fingerprinting, matching, scanning and library handling
#[derive(Error, Debug)]
pub enum SetlistError {
    #[error("setlistr: empty sample buffer")]
    EmptyAudio,

    #[error("setlistr: invalid sample rate {0} Hz")]
    InvalidSampleRate(u32),

    #[error("setlistr: non-finite sample at index {index}")]
    NonFiniteSamples { index: usize },

    #[error("setlistr: reference library is empty")]
    EmptyLibrary,

    #[error("setlistr: duplicate reference name: {0}")]
    DuplicateReference(String),

    #[error("setlistr: library incompatible with scan settings: {0}")]
    IncompatibleLibrary(String),

    #[error("setlistr: invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("setlistr: spectrum error: {0}")]
    Spectrum(String),

    #[error("setlistr: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("setlistr: serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SetlistError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        SetlistError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, SetlistError>;
