//! Timeline scanning and assembly

mod analyzer;
mod scanner;

pub use analyzer::{DedupPolicy, TimelineAnalyzer};
pub use scanner::{Scan, ScanStats, TimelineScanner};
