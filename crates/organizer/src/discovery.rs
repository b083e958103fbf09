//! Album discovery.
//!
//! Walks the source root twice: once for cue sheets (merged albums), once for loose audio files
//! (split albums grouped by their album tag).

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::cover::find_cover;
use crate::cue::{self, CueSheet};
use crate::error::{DiscoveryError, TrackError};
use crate::models::{AlbumMetadata, AlbumSource, TrackMetadata, UNKNOWN_ARTIST, parse_year};
use crate::tags::TagIo;

pub const AUDIO_EXTENSIONS: [&str; 3] = ["flac", "ape", "mp3"];
pub const CUE_EXTENSION: &str = "cue";

/// Albums found under a source root, merged albums first.
#[derive(Debug, Default)]
pub struct Discovery {
    pub albums: Vec<AlbumMetadata>,
    /// Loose files that could not be turned into tracks.
    pub skipped: Vec<TrackError>,
}

pub fn discover(root: &Path, tags: &dyn TagIo) -> Result<Discovery, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::PathNotFound(root.to_path_buf()));
    }

    tracing::info!(root = %root.display(), "discovering albums");
    let mut albums = collect_merged_albums(root);
    let merged = albums.len();
    let (split, skipped) = collect_split_albums(root, tags);
    albums.extend(split);

    tracing::info!(
        root = %root.display(),
        merged,
        split = albums.len() - merged,
        skipped = skipped.len(),
        "discovery complete"
    );
    Ok(Discovery { albums, skipped })
}

fn collect_merged_albums(root: &Path) -> Vec<AlbumMetadata> {
    files_with_extension(root, |ext| ext == CUE_EXTENSION)
        .into_iter()
        .filter_map(|cue_path| {
            let sheet = match cue::read(&cue_path) {
                Ok(sheet) => sheet,
                Err(err) => {
                    tracing::warn!(
                        cue = %cue_path.display(),
                        "skipping unreadable cue sheet: {err:#}"
                    );
                    return None;
                }
            };
            merged_album(cue_path, sheet)
        })
        .collect()
}

fn merged_album(cue_path: PathBuf, sheet: CueSheet) -> Option<AlbumMetadata> {
    let Some(file) = sheet.file.as_deref() else {
        tracing::debug!(cue = %cue_path.display(), "cue sheet references no audio file");
        return None;
    };
    let dir = cue_path.parent()?.to_path_buf();
    let audio_path = dir.join(file);
    if !audio_path.is_file() {
        tracing::debug!(
            cue = %cue_path.display(),
            audio = %audio_path.display(),
            "referenced audio file missing"
        );
        return None;
    }
    if sheet.tracks.is_empty() {
        tracing::debug!(cue = %cue_path.display(), "cue sheet declares no tracks");
        return None;
    }

    let title = sheet.title.clone().unwrap_or_else(|| stem_of(&cue_path));
    let performer = sheet.performer.clone();
    let year = sheet.date.as_deref().and_then(parse_year);
    let tracks = sheet
        .tracks
        .iter()
        .map(|track| TrackMetadata {
            artist: track
                .performer
                .clone()
                .or_else(|| performer.clone())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: title.clone(),
            year,
            number: Some(track.number),
            title: track
                .title
                .clone()
                .unwrap_or_else(|| format!("Track {:02}", track.number)),
            genre: sheet.genre.clone(),
            path: None,
        })
        .collect();

    let cover = find_cover(&dir);
    Some(AlbumMetadata {
        artist: performer
            .clone()
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        album_artist: performer,
        title,
        year,
        genre: sheet.genre,
        tracks,
        dir,
        source: AlbumSource::Merged {
            cue_path,
            audio_path,
        },
        cover,
    })
}

fn collect_split_albums(root: &Path, tags: &dyn TagIo) -> (Vec<AlbumMetadata>, Vec<TrackError>) {
    let mut albums: Vec<AlbumMetadata> = Vec::new();
    let mut by_title: HashMap<String, usize> = HashMap::new();
    let mut skipped = Vec::new();

    for path in files_with_extension(root, |ext| AUDIO_EXTENSIONS.contains(&ext)) {
        if path.with_extension(CUE_EXTENSION).exists() {
            continue;
        }
        let track = match tags.read(&path) {
            Ok(track) => track.placed_at(path),
            Err(err) => {
                tracing::warn!(path = %path.display(), "skipping unreadable track: {err:#}");
                skipped.push(TrackError::tag_read(path, err));
                continue;
            }
        };

        match by_title.get(&track.album) {
            Some(&index) => albums[index].tracks.push(track),
            None => {
                let dir = track
                    .path
                    .as_deref()
                    .and_then(Path::parent)
                    .unwrap_or(root)
                    .to_path_buf();
                let cover = find_cover(&dir);
                by_title.insert(track.album.clone(), albums.len());
                albums.push(AlbumMetadata {
                    artist: track.artist.clone(),
                    album_artist: None,
                    title: track.album.clone(),
                    year: track.year,
                    genre: track.genre.clone(),
                    tracks: vec![track],
                    dir,
                    source: AlbumSource::Split,
                    cover,
                });
            }
        }
    }

    (albums, skipped)
}

/// Files under `root` whose lowercased extension satisfies `accept`, in sorted traversal order.
fn files_with_extension(root: &Path, accept: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "walk error");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(OsStr::to_str)
                .map(|ext| accept(&ext.to_ascii_lowercase()))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect()
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("<unknown>")
        .to_string()
}
