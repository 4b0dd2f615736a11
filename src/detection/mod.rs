//! Detection module for setlistr

mod result;

pub use result::{DetectionEvent, MatchResult, Timeline, WindowOutcome};
