//! Core fingerprinting and matching modules

pub mod decoder;
pub mod dsp;
pub mod fingerprint;
pub mod library;
pub mod matching;
pub mod timeline;

pub use fingerprint::{Fingerprint, FingerprintBuilder, HashKey, HashLayout};
pub use library::{ReferenceEntry, ReferenceLibrary};
pub use matching::SimilarityScorer;
pub use timeline::{DedupPolicy, Scan, TimelineAnalyzer, TimelineScanner};
