// src/core/decoder.rs
//
// Audio decoding boundary: any container Symphonia understands, down-mixed
// to mono and resampled to the analysis rate.

use anyhow::{bail, Context, Result};
use log::debug;
use rubato::{FftFixedIn, Resampler};
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use walkdir::WalkDir;

/// File extensions picked up when collecting songs from a folder
pub const AUDIO_EXTENSIONS: [&str; 6] = ["flac", "wav", "mp3", "ogg", "m4a", "aac"];

const RESAMPLE_CHUNK: usize = 1024;

/// Decoded mono audio at the analysis sample rate
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate of `samples` in Hz
    pub sample_rate: u32,
    /// Sample rate of the file before resampling
    pub source_rate: u32,
    /// Channel count of the file before down-mixing
    pub channels: usize,
    /// Original codec name
    pub codec_name: String,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode `path` to mono samples at `target_rate`
pub fn decode_mono(path: &Path, target_rate: u32) -> Result<DecodedAudio> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe file format - may be corrupted or unsupported")?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No supported audio track found in file")?;

    let track_id = track.id;
    let source_rate = track
        .codec_params
        .sample_rate
        .context("File does not specify sample rate")?;
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);
    let codec_name = format!("{:?}", track.codec_params.codec);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder for audio codec")?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match probed.format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(symphonia::core::errors::Error::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            channels = spec.channels.count();
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(buf.samples());
        }
    }

    if interleaved.is_empty() {
        bail!("No audio samples decoded from {}", path.display());
    }
    if channels == 0 {
        bail!("File reports 0 audio channels");
    }

    let mono = downmix(&interleaved, channels);
    let samples = resample_mono(&mono, source_rate, target_rate)?;

    debug!(
        "decoded {}: {} ch @ {} Hz -> {} mono samples @ {} Hz",
        path.display(),
        channels,
        source_rate,
        samples.len(),
        target_rate
    );

    Ok(DecodedAudio {
        samples,
        sample_rate: target_rate,
        source_rate,
        channels,
        codec_name,
    })
}

/// Average interleaved channels into one
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample mono audio, trimming the resampler delay so timing is preserved
pub fn resample_mono(input: &[f32], from: u32, to: u32) -> Result<Vec<f32>> {
    if from == to || input.is_empty() {
        return Ok(input.to_vec());
    }
    if from == 0 || to == 0 {
        bail!("Cannot resample between {} Hz and {} Hz", from, to);
    }

    let mut resampler = FftFixedIn::<f32>::new(from as usize, to as usize, RESAMPLE_CHUNK, 2, 1)
        .context("Failed to create resampler")?;

    let expected = (input.len() as f64 * to as f64 / from as f64).round() as usize;
    let delay = resampler.output_delay();
    let mut output: Vec<f32> = Vec::with_capacity(expected + delay);

    let mut position = 0;
    while input.len() - position >= resampler.input_frames_next() {
        let next = resampler.input_frames_next();
        let chunk = &input[position..position + next];
        let result = resampler
            .process(&[chunk], None)
            .context("Resampling failed")?;
        output.extend_from_slice(&result[0]);
        position += next;
    }

    if position < input.len() {
        let tail = [&input[position..]];
        let result = resampler
            .process_partial(Some(&tail[..]), None)
            .context("Resampling failed")?;
        output.extend_from_slice(&result[0]);
    }

    // Flush until the delayed tail is out
    while output.len() < expected + delay {
        let result = resampler
            .process_partial::<&[f32]>(None, None)
            .context("Resampling failed")?;
        if result[0].is_empty() {
            break;
        }
        output.extend_from_slice(&result[0]);
    }

    let start = delay.min(output.len());
    let mut samples = output.split_off(start);
    samples.truncate(expected);
    Ok(samples)
}

fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// A single audio file, or every audio file below a directory (sorted)
pub fn collect_audio_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        if has_audio_extension(path) {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if entry.file_type().is_file() && has_audio_extension(path) {
                files.push(path.to_path_buf());
            }
        }
    } else {
        bail!("Input path does not exist: {}", path.display());
    }

    files.sort();
    Ok(files)
}
