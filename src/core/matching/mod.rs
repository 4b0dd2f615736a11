//! Fingerprint matching by time-offset voting

mod histogram;
mod scorer;

pub use histogram::{OffsetHistogram, MAX_DENSE_BUCKETS};
pub use scorer::SimilarityScorer;
