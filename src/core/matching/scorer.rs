// src/core/matching/scorer.rs
//
// Offset-histogram voting between two fingerprints.

use super::histogram::OffsetHistogram;
use crate::config::MatchConfig;
use crate::core::fingerprint::Fingerprint;

/// Scores how well a query fingerprint aligns with a reference fingerprint
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer {
    config: MatchConfig,
}

impl SimilarityScorer {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Returns `(similarity, offset)`
    ///
    /// `offset` is `t_reference - t_query` at the histogram mode: a query that
    /// starts `d` seconds into the reference scores an offset near `+d`.
    /// Empty fingerprints and fingerprints with no common key score `(0.0, 0.0)`.
    pub fn score(&self, query: &Fingerprint, reference: &Fingerprint) -> (f64, f64) {
        let (Some((q_first, q_last)), Some((r_first, r_last))) =
            (query.time_span(), reference.time_span())
        else {
            return (0.0, 0.0);
        };

        let mut histogram =
            OffsetHistogram::with_range(r_first - q_last, r_last - q_first, self.config.bucket_scale());

        // Walk the fingerprint with fewer keys and probe the other
        if query.len() <= reference.len() {
            for (key, q_times) in query.iter() {
                if let Some(r_times) = reference.get(key) {
                    vote(&mut histogram, q_times, r_times);
                }
            }
        } else {
            for (key, r_times) in reference.iter() {
                if let Some(q_times) = query.get(key) {
                    vote(&mut histogram, q_times, r_times);
                }
            }
        }

        let Some((offset, mode_count)) = histogram.mode() else {
            return (0.0, 0.0);
        };

        let smaller = query.occurrences().min(reference.occurrences()) as f64;
        let similarity = (mode_count as f64 / (smaller * self.config.normalization_factor)).min(1.0);
        (similarity, offset)
    }
}

fn vote(histogram: &mut OffsetHistogram, q_times: &[f64], r_times: &[f64]) {
    for &tq in q_times {
        for &tr in r_times {
            histogram.add(tr - tq);
        }
    }
}
