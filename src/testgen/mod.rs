// src/testgen/mod.rs
//
// Synthetic test material for setlistr.
// Generates deterministic "songs" (chord progressions whose partials sit
// exactly on analysis bins), silence gaps, a long mixed recording with a
// known placement manifest, and WAV export for the command-line demo.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Scale degrees (in analysis bins above the base bin) chords are built on
const DEGREES: [usize; 7] = [0, 2, 4, 5, 7, 9, 11];
const NOTE_SECS: f64 = 0.3;
const RAMP_SECS: f64 = 0.008;
const PARTIAL_AMPLITUDE: f64 = 0.25;

/// A reproducible synthetic song
///
/// Each 0.3 s note is a three-partial chord (root, fifth-ish, octave) whose
/// root is drawn from a small scale above `base_hz` by a seeded LCG. Every
/// partial is snapped to the center of an analysis bin so a Hann-windowed
/// frame sees exactly one peak per partial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordSong {
    pub name: String,
    pub base_hz: f64,
    pub duration_sec: f64,
    pub seed: u64,
}

impl ChordSong {
    /// Song seeded from its name
    pub fn new(name: impl Into<String>, base_hz: f64, duration_sec: f64) -> Self {
        let name = name.into();
        let seed = fnv1a(name.as_bytes());
        Self {
            name,
            base_hz,
            duration_sec,
            seed,
        }
    }

    /// Render mono samples for the given analysis rate and frame size
    pub fn render(&self, sample_rate: u32, frame_size: usize) -> Vec<f32> {
        let total = (self.duration_sec * sample_rate as f64).round() as usize;
        let note_len = ((NOTE_SECS * sample_rate as f64).round() as usize).max(1);
        let ramp = ((RAMP_SECS * sample_rate as f64).round() as usize).max(1);
        let bin_hz = sample_rate as f64 / frame_size as f64;
        let base_bin = (self.base_hz / bin_hz).round().max(1.0) as usize;

        let mut rng = Lcg::new(self.seed);
        let mut out = Vec::with_capacity(total);

        let mut start = 0;
        while start < total {
            let len = note_len.min(total - start);
            let root = base_bin + DEGREES[rng.next_below(DEGREES.len())];
            let partials = [root, (root as f64 * 1.5).round() as usize, root * 2];

            for n in 0..len {
                let i = start + n;
                let env = envelope(n, len, ramp);
                let value: f64 = partials
                    .iter()
                    .map(|&bin| {
                        // Reduce the phase index mod frame_size to keep it exact
                        let phase = ((bin * i) % frame_size) as f64 / frame_size as f64;
                        PARTIAL_AMPLITUDE * (2.0 * PI * phase).sin()
                    })
                    .sum();
                out.push((value * env) as f32);
            }
            start += len;
        }
        out
    }
}

fn envelope(n: usize, len: usize, ramp: usize) -> f64 {
    let ramp = ramp.min(len / 2).max(1);
    if n < ramp {
        n as f64 / ramp as f64
    } else if n >= len - ramp {
        (len - n) as f64 / ramp as f64
    } else {
        1.0
    }
}

/// `secs` of digital silence
pub fn silence(secs: f64, sample_rate: u32) -> Vec<f32> {
    vec![0.0; (secs * sample_rate as f64).round() as usize]
}

/// One piece of a synthetic long recording
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Silence(f64),
    /// Index into the song list
    Song(usize),
}

/// Where a song was placed inside a mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub name: String,
    pub start_sec: f64,
    pub duration_sec: f64,
}

/// Concatenate songs and silences, recording where each song starts
pub fn build_mix(
    songs: &[ChordSong],
    layout: &[Segment],
    sample_rate: u32,
    frame_size: usize,
) -> (Vec<f32>, Vec<Placement>) {
    let mut mix = Vec::new();
    let mut placements = Vec::new();

    for segment in layout {
        match segment {
            Segment::Silence(secs) => mix.extend(silence(*secs, sample_rate)),
            Segment::Song(idx) => {
                let Some(song) = songs.get(*idx) else {
                    continue;
                };
                let samples = song.render(sample_rate, frame_size);
                placements.push(Placement {
                    name: song.name.clone(),
                    start_sec: mix.len() as f64 / sample_rate as f64,
                    duration_sec: samples.len() as f64 / sample_rate as f64,
                });
                mix.extend(samples);
            }
        }
    }
    (mix, placements)
}

/// The three demo songs: A (440 Hz, 10 s), B (880 Hz, 8 s), C (220 Hz, 12 s)
pub fn demo_songs() -> Vec<ChordSong> {
    vec![
        ChordSong::new("A", 440.0, 10.0),
        ChordSong::new("B", 880.0, 8.0),
        ChordSong::new("C", 220.0, 12.0),
    ]
}

/// `[5 s silence, B, 3 s silence, A, 2 s silence, C]`
pub fn demo_layout() -> Vec<Segment> {
    vec![
        Segment::Silence(5.0),
        Segment::Song(1),
        Segment::Silence(3.0),
        Segment::Song(0),
        Segment::Silence(2.0),
        Segment::Song(2),
    ]
}

/// Write mono samples as 16-bit PCM WAV
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer.write_sample(v)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Description of a generated demo set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoManifest {
    pub sample_rate: u32,
    pub songs: Vec<ChordSong>,
    pub song_files: Vec<PathBuf>,
    pub mix_file: PathBuf,
    pub placements: Vec<Placement>,
}

impl DemoManifest {
    /// Save manifest to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load manifest from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&json)?;
        Ok(manifest)
    }
}

/// Write the demo songs, the mixed recording and `manifest.json` into `dir`
pub fn generate_demo(dir: &Path, sample_rate: u32, frame_size: usize) -> Result<DemoManifest> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let songs = demo_songs();
    let songs_dir = dir.join("songs");
    std::fs::create_dir_all(&songs_dir)?;

    let mut song_files = Vec::new();
    for song in &songs {
        let path = songs_dir.join(format!("{}.wav", song.name));
        write_wav(&path, &song.render(sample_rate, frame_size), sample_rate)?;
        song_files.push(path);
    }

    let (mix, placements) = build_mix(&songs, &demo_layout(), sample_rate, frame_size);
    let mix_file = dir.join("mix.wav");
    write_wav(&mix_file, &mix, sample_rate)?;

    let manifest = DemoManifest {
        sample_rate,
        songs,
        song_files,
        mix_file,
        placements,
    };
    manifest.save(dir.join("manifest.json"))?;
    Ok(manifest)
}

/// 64-bit LCG (Knuth's MMIX constants)
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0
    }

    fn next_below(&mut self, n: usize) -> usize {
        ((self.next_u64() >> 33) % n as u64) as usize
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
    })
}
