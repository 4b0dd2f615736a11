#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use setlistr::testgen::ChordSong;
use setlistr::{ReferenceLibrary, Settings, SettingsBuilder};
use uuid::Uuid;

pub const SR: u32 = 44_100;
pub const FRAME: usize = 2048;

pub fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_setlistr"))
}

pub fn run_setlistr<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(binary_path())
        .args(args)
        .env_remove("SETLISTR_CONFIG")
        .env_remove("SETLISTR_PRESET")
        .env_remove("SETLISTR_LIBRARY")
        .output()
        .expect("Failed to execute setlistr")
}

/// Fresh scratch directory under the system temp dir
pub fn scratch_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{}-{}", prefix, Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}

pub fn remove_dir(dir: &Path) {
    let _ = std::fs::remove_dir_all(dir);
}

/// Short windows and no skip-ahead, suited to recordings under a minute
pub fn short_scan_settings() -> Settings {
    SettingsBuilder::new()
        .chunk_size_sec(5.0)
        .hop_size_sec(2.0)
        .similarity_threshold(0.1)
        .no_skip()
        .build()
        .expect("valid settings")
}

pub fn library_from(songs: &[ChordSong], settings: &Settings) -> ReferenceLibrary {
    let mut library = ReferenceLibrary::new(settings.fingerprint, settings.sample_rate);
    for song in songs {
        library
            .add_recording(song.name.clone(), &song.render(settings.sample_rate, FRAME))
            .expect("fingerprint reference");
    }
    library
}
