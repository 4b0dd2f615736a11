//! setlistr - find known songs inside a long recording
//!
//! Given a library of reference recordings and one long recording that plays
//! some of them back to back (with talk, applause or silence in between),
//! setlistr reports which songs appear and where each one starts. Matching is
//! by audio content only, using landmark fingerprints and time-offset voting.
//!
//! ## Module Structure
//!
//! - `core` - fingerprinting, matching, timeline scanning, library, decoding
//! - `config` - parameter sets, presets and validation
//! - `detection` - match and detection result types
//! - `cli` - command-line interface
//! - `testgen` - deterministic synthetic songs for tests and demos
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use setlistr::config::{ProfilePreset, SettingsBuilder};
//! use setlistr::core::{DedupPolicy, ReferenceLibrary, TimelineAnalyzer, TimelineScanner};
//!
//! let settings = SettingsBuilder::from_preset(ProfilePreset::CdQuality)
//!     .chunk_size_sec(10.0)
//!     .build()?;
//!
//! let mut library = ReferenceLibrary::new(settings.fingerprint, settings.sample_rate);
//! library.add_recording("opener", &opener_samples)?;
//! library.add_recording("encore", &encore_samples)?;
//!
//! let scanner = TimelineScanner::new(&library, &settings)?;
//! let events = scanner.scan_events(&concert_samples)?;
//! let timeline = TimelineAnalyzer::new(DedupPolicy::FirstDetection).analyze(events);
//!
//! for event in &timeline {
//!     println!("{:>8.1}s  {}", event.estimated_start_time, event.song_name);
//! }
//! ```
//!
//! ## How matching works
//!
//! | Stage        | What it does                                                   |
//! |--------------|----------------------------------------------------------------|
//! | Peaks        | Hann-windowed FFT frames, local maxima spread over 5 bands     |
//! | Hashes       | anchor peak + next 9 peaks, `(anchor Hz << 12) \| delta Hz`     |
//! | Scoring      | histogram of `t_ref - t_query` over shared hashes, tallest bin |
//! | Scanning     | sliding windows, best reference per window, skip-ahead         |
//! | Timeline     | one event per song, ordered by estimated start                 |

// Core fingerprinting and matching
pub mod core;

// Command-line interface
pub mod cli;

// Configuration and presets
pub mod config;

// Detection result types
pub mod detection;

// Error taxonomy
pub mod error;

// Synthetic test material
pub mod testgen;

// Re-export commonly used types at crate root for convenience
pub use config::{
    FingerprintConfig, MatchConfig, ProfilePreset, ScanConfig, Settings, SettingsBuilder,
};
pub use core::{
    DedupPolicy, Fingerprint, FingerprintBuilder, HashKey, HashLayout, ReferenceLibrary, Scan,
    SimilarityScorer, TimelineAnalyzer, TimelineScanner,
};
pub use detection::{DetectionEvent, MatchResult, Timeline, WindowOutcome};
pub use error::{Result, SetlistError};
