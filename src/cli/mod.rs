// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::{Args, Command, FingerprintArgs, GenerateArgs, PolicyArg, PresetArg, ScanArgs};
pub use output::{
    default_report_path, format_time, format_timeline, parse_time, print_not_detected,
    print_timeline, write_json, ReportEntry, ScanReport,
};

use anyhow::{Context, Result};
use colorful::Colorful;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::config::{ProfilePreset, Settings, SettingsBuilder};
use crate::core::decoder::{collect_audio_files, decode_mono};
use crate::core::{FingerprintBuilder, ReferenceLibrary, TimelineAnalyzer, TimelineScanner};
use crate::detection::WindowOutcome;
use crate::error::SetlistError;
use crate::testgen;

/// Run the CLI
pub fn run(args: Args) -> Result<()> {
    match &args.command {
        Command::Fingerprint(cmd) => fingerprint(&args, cmd),
        Command::Scan(cmd) => scan(&args, cmd),
        Command::Generate(cmd) => generate(&args, cmd),
    }
}

/// Settings from the config file (or preset), with scan overrides applied
fn resolve_settings(args: &Args, overrides: Option<&ScanArgs>) -> Result<Settings> {
    let base = match &args.config {
        Some(path) => Settings::from_json_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ProfilePreset::from(args.preset).settings(),
    };

    let mut builder = SettingsBuilder::from_settings(base);
    if let Some(scan) = overrides {
        if let Some(chunk) = scan.chunk {
            builder = builder.chunk_size_sec(chunk);
        }
        if let Some(hop) = scan.hop {
            builder = builder.hop_size_sec(hop);
        }
        if let Some(threshold) = scan.threshold {
            builder = builder.similarity_threshold(threshold);
        }
        if let Some(best) = scan.best_threshold {
            builder = builder.best_similarity_threshold(best);
        }
        if let Some(skip) = scan.skip {
            builder = builder.skip_duration_sec(skip);
        }
    }
    Ok(builder.build()?)
}

fn progress_bar(len: u64, template: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn fingerprint(args: &Args, cmd: &FingerprintArgs) -> Result<()> {
    let settings = resolve_settings(args, None)?;
    let files = collect_audio_files(&cmd.input)?;
    if files.is_empty() {
        println!("{}", "No audio files found!".red());
        return Ok(());
    }
    println!("Found {} audio file(s)\n", files.len());

    let mut library = if cmd.append && cmd.library.exists() {
        let library = ReferenceLibrary::load(&cmd.library)?;
        library.check_compatible(&settings.fingerprint, settings.sample_rate)?;
        library
    } else {
        ReferenceLibrary::new(settings.fingerprint, settings.sample_rate)
    };

    let builder = FingerprintBuilder::new(settings.fingerprint, settings.sample_rate)?;
    let pb = progress_bar(
        files.len() as u64,
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    );

    for path in &files {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        pb.set_message(name.clone());

        let audio = decode_mono(path, settings.sample_rate)?;
        match library.add_with(&builder, name.as_str(), &audio.samples) {
            Ok(()) => {}
            Err(SetlistError::DuplicateReference(dup)) => {
                warn!("'{}' is already in the library; skipping {}", dup, path.display())
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to fingerprint {}", path.display())),
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    library.save(&cmd.library)?;
    println!(
        "{} {} references in {}",
        "✓".green(),
        library.len(),
        cmd.library.display().to_string().cyan()
    );
    Ok(())
}

fn scan(args: &Args, cmd: &ScanArgs) -> Result<()> {
    let settings = resolve_settings(args, Some(cmd))?;
    let library = ReferenceLibrary::load(&cmd.library)
        .with_context(|| format!("Failed to load library {}", cmd.library.display()))?;
    let scanner = TimelineScanner::new(&library, &settings)?;

    println!("Scanning: {}", cmd.input.display().to_string().cyan());
    let audio = decode_mono(&cmd.input, settings.sample_rate)?;

    let mut scan = scanner.scan(&audio.samples)?;
    let pb = if cmd.quiet {
        ProgressBar::hidden()
    } else {
        progress_bar(
            scan.total_windows() as u64,
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} windows ({eta}) {msg}",
        )
    };

    let mut events = Vec::new();
    while let Some(outcome) = scan.next_window() {
        if let WindowOutcome::Detected(event) = outcome {
            pb.set_message(event.song_name.clone());
            events.push(event);
        }
        pb.set_position(scan.windows_consumed() as u64);
    }
    pb.finish_and_clear();

    let stats = scan.stats();
    info!(
        "{} raw detections from {} windows ({} skipped, {} failed)",
        events.len(),
        stats.processed,
        stats.skipped,
        stats.failed
    );

    let timeline = TimelineAnalyzer::new(cmd.policy.into()).analyze(events);
    let missing = TimelineAnalyzer::not_detected(library.names(), &timeline);
    let start_offset = cmd.start_offset.unwrap_or(0.0);

    println!();
    print_timeline(&timeline, start_offset);
    print_not_detected(&missing);

    if let Some(json) = &cmd.json {
        let path = json.clone().unwrap_or_else(default_report_path);
        let report = ScanReport::new(&cmd.input, &settings, &timeline, &missing, start_offset);
        write_json(&report, &path)?;
    }
    Ok(())
}

fn generate(args: &Args, cmd: &GenerateArgs) -> Result<()> {
    let settings = resolve_settings(args, None)?;
    let manifest = testgen::generate_demo(&cmd.output, settings.sample_rate, settings.fingerprint.frame_size)?;

    println!("Wrote demo set to {}", cmd.output.display().to_string().cyan());
    for path in &manifest.song_files {
        println!("  song: {}", path.display());
    }
    println!("  mix:  {}", manifest.mix_file.display());
    for placement in &manifest.placements {
        println!(
            "    {}  {}",
            format_time(placement.start_sec),
            placement.name
        );
    }
    Ok(())
}
