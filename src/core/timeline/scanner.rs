// src/core/timeline/scanner.rs
//
// Sliding-window scan of a long recording against a reference library.
// Windows are processed strictly in time order; scoring one window against
// every reference runs in parallel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::{ScanConfig, Settings};
use crate::core::fingerprint::{Fingerprint, FingerprintBuilder};
use crate::core::library::ReferenceLibrary;
use crate::core::matching::SimilarityScorer;
use crate::detection::{DetectionEvent, MatchResult, WindowOutcome};
use crate::error::{Result, SetlistError};

/// Matches windows of a long recording against a reference library
pub struct TimelineScanner<'a> {
    library: &'a ReferenceLibrary,
    builder: FingerprintBuilder,
    scorer: SimilarityScorer,
    config: ScanConfig,
    sample_rate: u32,
}

impl<'a> TimelineScanner<'a> {
    /// Validate `settings` and check the library was built with them
    pub fn new(library: &'a ReferenceLibrary, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        if library.is_empty() {
            return Err(SetlistError::EmptyLibrary);
        }
        library.check_compatible(&settings.fingerprint, settings.sample_rate)?;

        Ok(Self {
            library,
            builder: FingerprintBuilder::new(settings.fingerprint, settings.sample_rate)?,
            scorer: SimilarityScorer::new(settings.matching),
            config: settings.scan,
            sample_rate: settings.sample_rate,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Start a pull-based scan over `samples` (mono, at the scanner's rate)
    pub fn scan<'s>(&'s self, samples: &'s [f32]) -> Result<Scan<'s>> {
        if samples.is_empty() {
            return Err(SetlistError::EmptyAudio);
        }

        let sr = self.sample_rate as f64;
        let chunk_samples = ((self.config.chunk_size_sec * sr).round() as usize).max(1);
        let hop_samples = ((self.config.hop_size_sec * sr).round() as usize).max(1);
        let total_windows = if samples.len() < chunk_samples {
            warn!(
                "recording is {:.2}s, shorter than one {:.2}s window; nothing to scan",
                samples.len() as f64 / sr,
                self.config.chunk_size_sec
            );
            0
        } else {
            (samples.len() - chunk_samples) / hop_samples + 1
        };

        info!(
            "scanning {:.1}s in {} windows against {} references",
            samples.len() as f64 / sr,
            total_windows,
            self.library.len()
        );

        Ok(Scan {
            scanner: self,
            samples,
            chunk_samples,
            hop_samples,
            total_windows,
            skip_windows: self.config.skip_windows(),
            next_index: 0,
            cancel: None,
            stats: ScanStats::default(),
            finished: false,
        })
    }

    /// Scan to the end and return every raw detection
    pub fn scan_events(&self, samples: &[f32]) -> Result<Vec<DetectionEvent>> {
        Ok(self.scan(samples)?.collect())
    }

    /// Best-scoring reference for `query`, `None` when nothing shares a hash
    ///
    /// Equal similarities resolve to the reference inserted first.
    pub fn best_match(&self, query: &Fingerprint) -> Option<MatchResult> {
        if query.is_empty() {
            return None;
        }

        let scores: Vec<(f64, f64)> = self
            .library
            .entries()
            .par_iter()
            .map(|entry| self.scorer.score(query, &entry.fingerprint))
            .collect();

        let mut best: Option<(usize, f64, f64)> = None;
        for (idx, &(similarity, offset)) in scores.iter().enumerate() {
            if similarity <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, s, _)| similarity > s) {
                best = Some((idx, similarity, offset));
            }
        }

        best.map(|(idx, similarity, offset)| MatchResult {
            similarity,
            offset,
            reference_name: self.library.entries()[idx].name.clone(),
        })
    }
}

/// Counters for one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub processed: usize,
    pub detected: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// An in-progress scan
///
/// `next_window` advances one window at a time and reports what happened to
/// it; iterating yields only the detections. A scan cannot be rewound: start
/// a new one to go again.
pub struct Scan<'s> {
    scanner: &'s TimelineScanner<'s>,
    samples: &'s [f32],
    chunk_samples: usize,
    hop_samples: usize,
    total_windows: usize,
    skip_windows: usize,
    next_index: usize,
    cancel: Option<Arc<AtomicBool>>,
    stats: ScanStats,
    finished: bool,
}

impl<'s> Scan<'s> {
    /// Stop before the next window once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn total_windows(&self) -> usize {
        self.total_windows
    }

    /// Windows consumed so far, including skipped ones
    pub fn windows_consumed(&self) -> usize {
        self.next_index.min(self.total_windows)
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Start time of window `index` in seconds
    pub fn window_start(&self, index: usize) -> f64 {
        (index * self.hop_samples) as f64 / self.scanner.sample_rate as f64
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// Process the next window; `None` once the scan is over or cancelled
    pub fn next_window(&mut self) -> Option<WindowOutcome> {
        if self.finished {
            return None;
        }
        if self.is_cancelled() {
            info!("scan cancelled at window {}/{}", self.windows_consumed(), self.total_windows);
            self.finished = true;
            return None;
        }
        if self.next_index >= self.total_windows {
            self.finish();
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;
        let outcome = self.process(index);
        self.stats.processed += 1;

        match &outcome {
            WindowOutcome::Detected(event) => {
                self.stats.detected += 1;
                if self.skip_windows > 0 && event.similarity > self.scanner.config.best_similarity_threshold {
                    let skipped = self.skip_windows.min(self.total_windows - self.next_index);
                    debug!(
                        "confident match for '{}' ({:.3}); skipping {} windows",
                        event.song_name, event.similarity, skipped
                    );
                    self.next_index += skipped;
                    self.stats.skipped += skipped;
                }
            }
            WindowOutcome::Failed { .. } => self.stats.failed += 1,
            WindowOutcome::NoMatch { .. } => {}
        }

        Some(outcome)
    }

    fn process(&self, index: usize) -> WindowOutcome {
        let start = index * self.hop_samples;
        let end = start + self.chunk_samples;
        let sr = self.scanner.sample_rate as f64;
        let window_start = start as f64 / sr;
        let window_end = end as f64 / sr;

        let fingerprint = match self.scanner.builder.build(&self.samples[start..end]) {
            Ok(fp) => fp,
            Err(e) => {
                warn!("window at {:.2}s skipped: {}", window_start, e);
                return WindowOutcome::Failed {
                    window_start,
                    reason: e.to_string(),
                };
            }
        };

        let Some(best) = self.scanner.best_match(&fingerprint) else {
            return WindowOutcome::NoMatch {
                window_start,
                best: None,
            };
        };

        let estimated_start = window_start - best.offset;
        if best.similarity < self.scanner.config.similarity_threshold || estimated_start < 0.0 {
            return WindowOutcome::NoMatch {
                window_start,
                best: Some(best),
            };
        }

        let event = DetectionEvent::from_match(&best, window_start, window_end);
        debug!(
            "window {:.2}s: '{}' similarity {:.3}, starts at {:.2}s",
            window_start, event.song_name, event.similarity, event.estimated_start_time
        );
        WindowOutcome::Detected(event)
    }

    fn finish(&mut self) {
        self.finished = true;
        info!(
            "scan finished: {} windows processed, {} detections, {} skipped, {} failed",
            self.stats.processed, self.stats.detected, self.stats.skipped, self.stats.failed
        );
    }
}

impl Iterator for Scan<'_> {
    type Item = DetectionEvent;

    fn next(&mut self) -> Option<DetectionEvent> {
        while let Some(outcome) = self.next_window() {
            if let WindowOutcome::Detected(event) = outcome {
                return Some(event);
            }
        }
        None
    }
}
