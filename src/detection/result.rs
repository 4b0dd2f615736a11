//! Detection result types produced by a timeline scan

use serde::{Deserialize, Serialize};

/// Best-scoring reference for one scan window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Similarity in [0, 1]
    pub similarity: f64,
    /// `t_reference - t_query` at the histogram mode (seconds)
    pub offset: f64,
    pub reference_name: String,
}

/// A candidate detection emitted during a scan, possibly a duplicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub song_name: String,
    pub similarity: f64,
    /// Where the song starts in the long recording (seconds)
    pub estimated_start_time: f64,
    /// Start of the window that produced the detection (seconds)
    pub window_start: f64,
    /// End of that window (seconds)
    pub window_end: f64,
}

impl DetectionEvent {
    /// Event for `best`, found in the window `[window_start, window_end)`
    pub fn from_match(best: &MatchResult, window_start: f64, window_end: f64) -> Self {
        Self {
            song_name: best.reference_name.clone(),
            similarity: best.similarity,
            estimated_start_time: window_start - best.offset,
            window_start,
            window_end,
        }
    }
}

/// What happened to one processed scan window
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    /// The window produced a detection
    Detected(DetectionEvent),
    /// Nothing cleared the threshold, or the alignment was impossible
    NoMatch {
        window_start: f64,
        best: Option<MatchResult>,
    },
    /// The window could not be fingerprinted; the scan went on without it
    Failed { window_start: f64, reason: String },
}

impl WindowOutcome {
    pub fn window_start(&self) -> f64 {
        match self {
            WindowOutcome::Detected(event) => event.window_start,
            WindowOutcome::NoMatch { window_start, .. } => *window_start,
            WindowOutcome::Failed { window_start, .. } => *window_start,
        }
    }

    pub fn event(&self) -> Option<&DetectionEvent> {
        match self {
            WindowOutcome::Detected(event) => Some(event),
            _ => None,
        }
    }

    pub fn into_event(self) -> Option<DetectionEvent> {
        match self {
            WindowOutcome::Detected(event) => Some(event),
            _ => None,
        }
    }
}

/// Deduplicated detections ordered by estimated start time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub events: Vec<DetectionEvent>,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DetectionEvent> {
        self.events.iter()
    }

    /// Song names in timeline order
    pub fn song_names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.song_name.as_str()).collect()
    }

    pub fn contains(&self, song_name: &str) -> bool {
        self.events.iter().any(|e| e.song_name == song_name)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a DetectionEvent;
    type IntoIter = std::slice::Iter<'a, DetectionEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
