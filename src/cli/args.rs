//! CLI argument model

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use super::output::parse_time;
use crate::config::ProfilePreset;
use crate::core::DedupPolicy;

#[derive(Parser, Debug)]
#[command(name = "setlistr")]
#[command(version)]
#[command(about = "Find which known songs play, and when, inside a long recording")]
pub struct Args {
    /// Verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (JSON); missing fields fall back to the preset
    #[arg(long, global = true, env = "SETLISTR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Parameter preset
    #[arg(long, global = true, value_enum, default_value = "cd-quality", env = "SETLISTR_PRESET")]
    pub preset: PresetArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fingerprint songs and store them in a reference library
    Fingerprint(FingerprintArgs),
    /// Scan a long recording for songs from a library
    Scan(ScanArgs),
    /// Write a synthetic demo set (three songs and a mixed recording)
    Generate(GenerateArgs),
}

#[derive(ClapArgs, Debug)]
pub struct FingerprintArgs {
    /// Song file or directory of songs
    #[arg(short, long)]
    pub input: PathBuf,

    /// Library file to write
    #[arg(short, long, env = "SETLISTR_LIBRARY")]
    pub library: PathBuf,

    /// Add to an existing library instead of replacing it
    #[arg(short, long)]
    pub append: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ScanArgs {
    /// Long recording to scan
    #[arg(short, long)]
    pub input: PathBuf,

    /// Reference library file
    #[arg(short, long, env = "SETLISTR_LIBRARY")]
    pub library: PathBuf,

    /// Window length in seconds
    #[arg(long)]
    pub chunk: Option<f64>,

    /// Window stride in seconds
    #[arg(long)]
    pub hop: Option<f64>,

    /// Minimum similarity for a detection
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Similarity that triggers skip-ahead
    #[arg(long)]
    pub best_threshold: Option<f64>,

    /// Seconds skipped after a confident detection (0 disables)
    #[arg(long)]
    pub skip: Option<f64>,

    /// Which detection represents a song found more than once
    #[arg(long, value_enum, default_value = "first")]
    pub policy: PolicyArg,

    /// Where the recording starts in the full event (HH:MM:SS), added to printed times
    #[arg(long, value_parser = parse_time_arg)]
    pub start_offset: Option<f64>,

    /// Write the timeline as JSON (default name is timestamped)
    #[arg(long)]
    pub json: Option<Option<PathBuf>>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ClapArgs, Debug)]
pub struct GenerateArgs {
    /// Output directory
    #[arg(short, long, default_value = "demo")]
    pub output: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresetArg {
    CdQuality,
    Broadcast,
}

impl From<PresetArg> for ProfilePreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::CdQuality => ProfilePreset::CdQuality,
            PresetArg::Broadcast => ProfilePreset::Broadcast,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    First,
    Highest,
}

impl From<PolicyArg> for DedupPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::First => DedupPolicy::FirstDetection,
            PolicyArg::Highest => DedupPolicy::HighestSimilarity,
        }
    }
}

fn parse_time_arg(s: &str) -> Result<f64, String> {
    parse_time(s).ok_or_else(|| format!("invalid time '{}', expected HH:MM:SS", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_command() {
        let args = Args::try_parse_from([
            "setlistr",
            "scan",
            "--input",
            "set.flac",
            "--library",
            "lib.json",
            "--chunk",
            "10",
            "--policy",
            "highest",
            "--start-offset",
            "01:02:03",
            "--json",
        ])
        .unwrap();

        let Command::Scan(scan) = args.command else {
            panic!("expected scan command");
        };
        assert_eq!(scan.chunk, Some(10.0));
        assert_eq!(scan.hop, None);
        assert_eq!(scan.policy, PolicyArg::Highest);
        assert_eq!(scan.start_offset, Some(3723.0));
        assert_eq!(scan.json, Some(None));
        assert_eq!(args.preset, PresetArg::CdQuality);
    }

    #[test]
    fn test_parse_fingerprint_command() {
        let args = Args::try_parse_from([
            "setlistr",
            "--preset",
            "broadcast",
            "fingerprint",
            "-i",
            "songs",
            "-l",
            "lib.json",
        ])
        .unwrap();
        assert_eq!(ProfilePreset::from(args.preset), ProfilePreset::Broadcast);
        assert!(matches!(args.command, Command::Fingerprint(ref f) if !f.append));
    }

    #[test]
    fn test_bad_start_offset() {
        let result = Args::try_parse_from([
            "setlistr",
            "scan",
            "-i",
            "x.wav",
            "-l",
            "lib.json",
            "--start-offset",
            "later",
        ]);
        assert!(result.is_err());
    }
}
