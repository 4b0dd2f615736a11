//! Output formatting for CLI results

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colorful::Colorful;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::detection::Timeline;

/// Whole seconds as `HH:MM:SS`; negative times clamp to zero
pub fn format_time(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 { secs.floor() as u64 } else { 0 };
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Parse `HH:MM:SS`, `MM:SS` or plain seconds (fractions allowed in the last field)
pub fn parse_time(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let (last, whole) = parts.split_last()?;
    let mut total = 0.0;
    for part in whole {
        let value: u64 = part.parse().ok()?;
        total = total * 60.0 + value as f64;
    }
    let secs: f64 = last.parse().ok()?;
    if !secs.is_finite() || secs < 0.0 || (!whole.is_empty() && secs >= 60.0) {
        return None;
    }
    Some(total * 60.0 + secs)
}

/// One line per detection: `HH:MM:SS  name  (similarity)`
pub fn format_timeline(timeline: &Timeline, start_offset: f64) -> Vec<String> {
    timeline
        .iter()
        .map(|event| {
            format!(
                "{}  {}  ({:.3})",
                format_time(event.estimated_start_time + start_offset),
                event.song_name,
                event.similarity
            )
        })
        .collect()
}

pub fn print_timeline(timeline: &Timeline, start_offset: f64) {
    if timeline.is_empty() {
        println!("{}", "No songs detected".yellow());
        return;
    }

    println!("{}", "Timeline".bold());
    for event in timeline {
        println!(
            "  {}  {}  {}",
            format_time(event.estimated_start_time + start_offset).cyan(),
            event.song_name.clone().green(),
            format!("({:.3})", event.similarity).dim()
        );
    }
}

pub fn print_not_detected(missing: &BTreeSet<String>) {
    if missing.is_empty() {
        println!("{}", "All library songs detected".green());
        return;
    }

    println!("\n{}", format!("Not detected ({})", missing.len()).red());
    for name in missing {
        println!("  • {}", name);
    }
}

/// One timeline entry in the JSON report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub song_name: String,
    pub start: String,
    pub start_sec: f64,
    pub similarity: f64,
    pub window_start: f64,
    pub window_end: f64,
}

/// JSON report written by `scan --json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub recording: String,
    pub generated_at: DateTime<Local>,
    pub start_offset_sec: f64,
    pub settings: Settings,
    pub timeline: Vec<ReportEntry>,
    pub not_detected: Vec<String>,
}

impl ScanReport {
    pub fn new(
        recording: &Path,
        settings: &Settings,
        timeline: &Timeline,
        missing: &BTreeSet<String>,
        start_offset: f64,
    ) -> Self {
        let timeline = timeline
            .iter()
            .map(|event| ReportEntry {
                song_name: event.song_name.clone(),
                start: format_time(event.estimated_start_time + start_offset),
                start_sec: event.estimated_start_time + start_offset,
                similarity: event.similarity,
                window_start: event.window_start,
                window_end: event.window_end,
            })
            .collect();

        Self {
            recording: recording.display().to_string(),
            generated_at: Local::now(),
            start_offset_sec: start_offset,
            settings: *settings,
            timeline,
            not_detected: missing.iter().cloned().collect(),
        }
    }
}

/// `song_detection_result_<timestamp>.json` in the working directory
pub fn default_report_path() -> PathBuf {
    PathBuf::from(format!(
        "song_detection_result_{}.json",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

pub fn write_json(report: &ScanReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Results written to {}", path.display().to_string().cyan());
    Ok(())
}
