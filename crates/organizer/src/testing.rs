//! In-memory collaborators for unit tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::error::SplitError;
use crate::models::TrackMetadata;
use crate::splitter::{SplitRequest, Splitter, expected_file_name};
use crate::tags::TagIo;

pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, contents).expect("write file");
}

/// Tags keyed by path. Reads of unknown paths fail, like a corrupt file would.
#[derive(Default)]
pub struct FakeTags {
    tags: Mutex<HashMap<PathBuf, TrackMetadata>>,
    reads: Mutex<Vec<PathBuf>>,
    writes: Mutex<Vec<(PathBuf, TrackMetadata)>>,
    broken: Mutex<HashSet<PathBuf>>,
}

impl FakeTags {
    pub fn insert(&self, path: &Path, artist: &str, album: &str, number: u32, genre: &str) {
        self.insert_track(
            path,
            TrackMetadata {
                artist: artist.into(),
                album: album.into(),
                year: None,
                number: Some(number),
                title: format!("Track {number}"),
                genre: Some(genre.into()),
                path: None,
            },
        );
    }

    pub fn insert_track(&self, path: &Path, track: TrackMetadata) {
        self.tags.lock().unwrap().insert(path.to_path_buf(), track);
    }

    /// Make writes to `path` fail.
    pub fn break_writes(&self, path: &Path) {
        self.broken.lock().unwrap().insert(path.to_path_buf());
    }

    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<(PathBuf, TrackMetadata)> {
        self.writes.lock().unwrap().clone()
    }
}

impl TagIo for FakeTags {
    fn read(&self, path: &Path) -> Result<TrackMetadata> {
        self.reads.lock().unwrap().push(path.to_path_buf());
        self.tags
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no tags in {:?}", path))
    }

    fn write(&self, path: &Path, track: &TrackMetadata) -> Result<()> {
        if !path.is_file() {
            return Err(anyhow!("no such file {:?}", path));
        }
        if self.broken.lock().unwrap().contains(path) {
            return Err(anyhow!("read-only file {:?}", path));
        }
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), track.clone()));
        Ok(())
    }
}

/// Writes one small file per planned track, named the way shnsplit would.
#[derive(Default)]
pub struct FakeSplitter {
    fail: bool,
    /// Titles whose output file is not produced.
    drop_titles: Vec<String>,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeSplitter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Succeeds but never writes the files for `titles`.
    pub fn dropping(titles: &[&str]) -> Self {
        Self {
            drop_titles: titles.iter().map(|title| title.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Output directories the splitter was asked to write into.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl Splitter for FakeSplitter {
    fn split(&self, request: &SplitRequest<'_>) -> Result<(), SplitError> {
        self.calls
            .lock()
            .unwrap()
            .push(request.output_dir.to_path_buf());
        if self.fail {
            return Err(SplitError::Timeout(Duration::from_secs(1)));
        }
        for track in request.tracks {
            if self.drop_titles.contains(&track.title) {
                continue;
            }
            let number = track.number.unwrap_or(0);
            write_file(
                &request.output_dir.join(expected_file_name(number, &track.title)),
                b"flac",
            );
        }
        Ok(())
    }
}
