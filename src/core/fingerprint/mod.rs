//! Landmark fingerprints
//!
//! A [`Fingerprint`] maps packed anchor/target hashes ([`HashKey`]) to the
//! times (seconds from the start of the analysed buffer) at which each hash
//! occurred. Fingerprints are built once by [`FingerprintBuilder`] and are
//! immutable afterwards.

mod builder;
mod hash;
mod peaks;

pub use builder::FingerprintBuilder;
pub use hash::{HashKey, HashLayout};
pub use peaks::{Peak, SpectralPeakExtractor};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Hash key to occurrence times
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFingerprint", into = "RawFingerprint")]
pub struct Fingerprint {
    hashes: HashMap<HashKey, Vec<f64>>,
    occurrences: usize,
    first_time: f64,
    last_time: f64,
    duration_sec: f64,
}

impl Fingerprint {
    /// Empty fingerprint for a buffer of the given length
    pub fn new(duration_sec: f64) -> Self {
        Self {
            duration_sec,
            ..Default::default()
        }
    }

    /// Record one occurrence of `key` at `time_sec`
    pub fn insert(&mut self, key: HashKey, time_sec: f64) {
        if self.occurrences == 0 {
            self.first_time = time_sec;
            self.last_time = time_sec;
        } else {
            self.first_time = self.first_time.min(time_sec);
            self.last_time = self.last_time.max(time_sec);
        }
        self.occurrences += 1;
        self.hashes.entry(key).or_default().push(time_sec);
    }

    pub fn get(&self, key: HashKey) -> Option<&[f64]> {
        self.hashes.get(&key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: HashKey) -> bool {
        self.hashes.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HashKey, &[f64])> {
        self.hashes.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Number of distinct hash keys
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences == 0
    }

    /// Total number of (key, time) occurrences
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// Earliest and latest occurrence time, `None` when empty
    pub fn time_span(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            None
        } else {
            Some((self.first_time, self.last_time))
        }
    }

    /// Length of the analysed buffer in seconds
    pub fn duration_sec(&self) -> f64 {
        self.duration_sec
    }
}

/// Serialized form: keys sorted so identical fingerprints serialize identically
#[derive(Serialize, Deserialize)]
struct RawFingerprint {
    duration_sec: f64,
    hashes: Vec<(HashKey, Vec<f64>)>,
}

impl From<RawFingerprint> for Fingerprint {
    fn from(raw: RawFingerprint) -> Self {
        let mut fingerprint = Fingerprint::new(raw.duration_sec);
        for (key, times) in raw.hashes {
            for time in times {
                fingerprint.insert(key, time);
            }
        }
        fingerprint
    }
}

impl From<Fingerprint> for RawFingerprint {
    fn from(fingerprint: Fingerprint) -> Self {
        let mut hashes: Vec<(HashKey, Vec<f64>)> = fingerprint.hashes.into_iter().collect();
        hashes.sort_by_key(|(key, _)| *key);
        RawFingerprint {
            duration_sec: fingerprint.duration_sec,
            hashes,
        }
    }
}
