//! Album and track metadata as discovered in the source tree.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Metadata for a single track.
///
/// Values are rewritten only through the consuming `placed_at` / `as_movement` steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackMetadata {
    pub artist: String,
    pub album: String,
    pub year: Option<u32>,
    pub number: Option<u32>,
    pub title: String,
    pub genre: Option<String>,
    /// Location of the track's own file. `None` for cue tracks that are not split yet.
    pub path: Option<PathBuf>,
}

impl TrackMetadata {
    /// The track now lives at `path`.
    pub fn placed_at(self, path: PathBuf) -> Self {
        Self {
            path: Some(path),
            ..self
        }
    }

    /// Re-file the track as movement `number` of `work`.
    pub fn as_movement(
        self,
        work: &str,
        movement: &str,
        number: u32,
        fallback_genre: Option<&str>,
    ) -> Self {
        let genre = self.genre.or_else(|| fallback_genre.map(str::to_string));
        Self {
            album: work.to_string(),
            title: movement.to_string(),
            number: Some(number),
            genre,
            ..self
        }
    }

    /// Source extension including the leading dot, or an empty string.
    pub fn extension(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::extension)
            .and_then(OsStr::to_str)
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }
}

/// Where an album's audio comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlbumSource {
    /// One audio container described by a cue sheet.
    Merged { cue_path: PathBuf, audio_path: PathBuf },
    /// One file per track.
    Split,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumMetadata {
    pub artist: String,
    pub album_artist: Option<String>,
    pub title: String,
    pub year: Option<u32>,
    pub genre: Option<String>,
    /// Disc order, not necessarily sorted by number.
    pub tracks: Vec<TrackMetadata>,
    pub dir: PathBuf,
    pub source: AlbumSource,
    pub cover: Option<PathBuf>,
}

impl AlbumMetadata {
    /// `"{title} ({year})"`, or just the title when the year is unknown.
    pub fn dir_name(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self.source, AlbumSource::Merged { .. })
    }
}

/// Make a tag value safe to use as a single path component.
pub fn path_component(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|ch| match ch {
            '/' | '\\' => '-',
            ch if ch.is_control() => ' ',
            ch => ch,
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse the leading year of a date tag such as `1973` or `1973-03-01`.
pub fn parse_year(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok().filter(|year| *year > 0)
}
