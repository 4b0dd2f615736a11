// src/core/timeline/analyzer.rs
//
// Raw detections to a final timeline: one event per song, ordered by
// estimated start time.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::detection::{DetectionEvent, Timeline};

/// Which event represents a song that was detected more than once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DedupPolicy {
    /// The earliest event in scan order
    #[default]
    FirstDetection,
    /// The event with the highest similarity; earlier events win ties
    HighestSimilarity,
}

impl std::str::FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" | "first-detection" => Ok(Self::FirstDetection),
            "highest" | "highest-similarity" => Ok(Self::HighestSimilarity),
            other => Err(format!("unknown dedup policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineAnalyzer {
    policy: DedupPolicy,
}

impl TimelineAnalyzer {
    pub fn new(policy: DedupPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Deduplicate by song and sort by estimated start time
    ///
    /// `events` must be in scan order.
    pub fn analyze<I>(&self, events: I) -> Timeline
    where
        I: IntoIterator<Item = DetectionEvent>,
    {
        let mut kept: Vec<DetectionEvent> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for event in events {
            match index.get(&event.song_name) {
                None => {
                    index.insert(event.song_name.clone(), kept.len());
                    kept.push(event);
                }
                Some(&i) => {
                    if self.policy == DedupPolicy::HighestSimilarity
                        && event.similarity > kept[i].similarity
                    {
                        kept[i] = event;
                    }
                }
            }
        }

        kept.sort_by(|a, b| a.estimated_start_time.total_cmp(&b.estimated_start_time));
        Timeline { events: kept }
    }

    /// Library songs that never made it into `timeline`
    pub fn not_detected<'n, N>(names: N, timeline: &Timeline) -> BTreeSet<String>
    where
        N: IntoIterator<Item = &'n str>,
    {
        names
            .into_iter()
            .filter(|name| !timeline.contains(name))
            .map(str::to_string)
            .collect()
    }
}
