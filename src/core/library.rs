// src/core/library.rs
//
// Reference library: named song fingerprints in insertion order, tagged
// with the fingerprint parameters they were built with.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::FingerprintConfig;
use crate::core::fingerprint::{Fingerprint, FingerprintBuilder};
use crate::error::{Result, SetlistError};

/// One named reference fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub name: String,
    pub fingerprint: Fingerprint,
}

/// Ordered collection of reference fingerprints
///
/// Iteration order is insertion order; a scan that sees two equally good
/// references reports the one inserted first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLibrary {
    sample_rate: u32,
    config: FingerprintConfig,
    entries: Vec<ReferenceEntry>,
}

impl ReferenceLibrary {
    pub fn new(config: FingerprintConfig, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            config,
            entries: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Add a fingerprint built elsewhere with this library's parameters
    pub fn insert(&mut self, name: impl Into<String>, fingerprint: Fingerprint) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(SetlistError::DuplicateReference(name));
        }
        self.entries.push(ReferenceEntry { name, fingerprint });
        Ok(())
    }

    /// Fingerprint `samples` (mono, at the library's sample rate) and insert it
    pub fn add_recording(&mut self, name: impl Into<String>, samples: &[f32]) -> Result<()> {
        let builder = FingerprintBuilder::new(self.config, self.sample_rate)?;
        self.add_with(&builder, name, samples)
    }

    /// Like [`add_recording`](Self::add_recording), reusing an existing builder
    pub fn add_with(
        &mut self,
        builder: &FingerprintBuilder,
        name: impl Into<String>,
        samples: &[f32],
    ) -> Result<()> {
        self.check_compatible(builder.config(), builder.sample_rate())?;
        let name = name.into();
        if self.contains(&name) {
            return Err(SetlistError::DuplicateReference(name));
        }
        let fingerprint = builder.build(samples)?;
        info!(
            "fingerprinted '{}': {} keys, {} occurrences, {:.1}s",
            name,
            fingerprint.len(),
            fingerprint.occurrences(),
            fingerprint.duration_sec()
        );
        self.entries.push(ReferenceEntry { name, fingerprint });
        Ok(())
    }

    /// Fail unless this library was built with exactly these parameters
    pub fn check_compatible(&self, config: &FingerprintConfig, sample_rate: u32) -> Result<()> {
        if self.sample_rate != sample_rate {
            return Err(SetlistError::IncompatibleLibrary(format!(
                "library sample rate {} Hz, scan sample rate {} Hz",
                self.sample_rate, sample_rate
            )));
        }
        if &self.config != config {
            return Err(SetlistError::IncompatibleLibrary(
                "fingerprint parameters differ from the ones the library was built with".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Fingerprint> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.fingerprint)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        info!("saved {} references to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let library: ReferenceLibrary = serde_json::from_reader(reader)?;
        library.config.validate_for_rate(library.sample_rate)?;

        let mut seen = HashSet::new();
        for entry in &library.entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(SetlistError::DuplicateReference(entry.name.clone()));
            }
        }

        info!("loaded {} references from {}", library.len(), path.display());
        Ok(library)
    }
}
