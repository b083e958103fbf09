//! Top-level run: discover albums, dispatch each to its restructurer, aggregate the results.

use std::path::{Path, PathBuf};

use crate::Backends;
use crate::discovery::discover;
use crate::error::{AlbumError, DiscoveryError, TrackError};
use crate::models::AlbumMetadata;
use crate::{classical, regular};

pub const DEFAULT_CLASSICAL_GENRE: &str = "Classical";

/// Run settings.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Destination root. Defaults to the parent of the source root.
    pub destination: Option<PathBuf>,
    /// Genres (exact match) restructured by work instead of by album.
    pub classical_genres: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            destination: None,
            classical_genres: vec![DEFAULT_CLASSICAL_GENRE.to_string()],
        }
    }
}

impl Settings {
    /// Where output goes for a given source root.
    ///
    /// The source is resolved first, so `.` or `incoming/..` still yield a directory above it.
    pub fn destination_for(&self, source: &Path) -> std::io::Result<PathBuf> {
        if let Some(dest) = &self.destination {
            return Ok(dest.clone());
        }
        let source = std::fs::canonicalize(source)?;
        Ok(source.parent().unwrap_or(&source).to_path_buf())
    }
}

/// How an album is laid out at the destination. Chosen once per album.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Classical,
    Regular,
}

impl Strategy {
    pub fn for_album(album: &AlbumMetadata, settings: &Settings) -> Self {
        let classical = album
            .genre
            .as_deref()
            .is_some_and(|genre| settings.classical_genres.iter().any(|g| g == genre));
        if classical {
            Strategy::Classical
        } else {
            Strategy::Regular
        }
    }

    pub fn restructure(
        self,
        album: &AlbumMetadata,
        dest_root: &Path,
        backends: &Backends<'_>,
    ) -> AlbumOutcome {
        match self {
            Strategy::Classical => classical::restructure(album, dest_root, backends),
            Strategy::Regular => regular::restructure(album, dest_root, backends),
        }
    }
}

#[derive(Debug)]
pub enum AlbumOutcome {
    Success,
    /// Some tracks failed; the rest were placed.
    Partial(Vec<TrackError>),
    Failed(AlbumError),
}

impl AlbumOutcome {
    pub fn from_errors(errors: Vec<TrackError>) -> Self {
        if errors.is_empty() {
            AlbumOutcome::Success
        } else {
            AlbumOutcome::Partial(errors)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AlbumOutcome::Success)
    }
}

#[derive(Debug)]
pub struct AlbumReport {
    pub artist: String,
    pub title: String,
    pub strategy: Strategy,
    pub outcome: AlbumOutcome,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub destination: PathBuf,
    pub albums: Vec<AlbumReport>,
    /// Loose files dropped during discovery.
    pub skipped: Vec<TrackError>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.albums.iter().all(|album| album.outcome.is_success())
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Done(RunReport),
    PathNotFound,
    AlbumsNotFound,
}

/// Organize every album under `source`, one album at a time.
pub fn organize(source: &Path, settings: &Settings, backends: &Backends<'_>) -> RunOutcome {
    let discovery = match discover(source, backends.tags) {
        Ok(discovery) => discovery,
        Err(DiscoveryError::PathNotFound(path)) => {
            tracing::error!(path = %path.display(), "source path not found");
            return RunOutcome::PathNotFound;
        }
    };
    if discovery.albums.is_empty() && discovery.skipped.is_empty() {
        tracing::warn!(source = %source.display(), "no albums found");
        return RunOutcome::AlbumsNotFound;
    }

    let destination = match settings.destination_for(source) {
        Ok(destination) => destination,
        Err(err) => {
            tracing::error!(source = %source.display(), "resolve source path: {err}");
            return RunOutcome::PathNotFound;
        }
    };
    tracing::info!(
        source = %source.display(),
        destination = %destination.display(),
        albums = discovery.albums.len(),
        "organizing albums"
    );

    let mut albums = Vec::with_capacity(discovery.albums.len());
    for album in &discovery.albums {
        let strategy = Strategy::for_album(album, settings);
        tracing::info!(
            artist = %album.artist,
            album = %album.title,
            ?strategy,
            merged = album.is_merged(),
            tracks = album.tracks.len(),
            "restructuring album"
        );
        let outcome = strategy.restructure(album, &destination, backends);
        match &outcome {
            AlbumOutcome::Success => {}
            AlbumOutcome::Partial(errors) => {
                for err in errors {
                    tracing::warn!(album = %album.title, "[ERROR] {err}");
                }
            }
            AlbumOutcome::Failed(err) => {
                tracing::error!(album = %album.title, "album failed: {err}");
            }
        }
        albums.push(AlbumReport {
            artist: album.artist.clone(),
            title: album.title.clone(),
            strategy,
            outcome,
        });
    }

    RunOutcome::Done(RunReport {
        destination,
        albums,
        skipped: discovery.skipped,
    })
}
