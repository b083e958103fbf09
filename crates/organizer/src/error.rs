//! Error types for discovery, per-track and per-album failures.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("source path not found: {}", .0.display())]
    PathNotFound(PathBuf),
}

/// A failure that affects one track. Recorded and skipped; the album carries on.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("File not found: {}", .0.display())]
    FileMissing(PathBuf),

    #[error("track {title:?} has no source file")]
    Unplaced { title: String },

    #[error("invalid movement title {0:?}: no leading Roman numeral I-X")]
    InvalidMovementTitle(String),

    #[error("track {title:?} has no track number")]
    MissingTrackNumber { title: String },

    #[error("read tags {}: {message}", path.display())]
    TagRead { path: PathBuf, message: String },

    #[error("write tags {}: {message}", path.display())]
    TagWrite { path: PathBuf, message: String },

    #[error("copy {} -> {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TrackError {
    pub(crate) fn tag_read(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        TrackError::TagRead {
            path: path.into(),
            message: format!("{err:#}"),
        }
    }

    pub(crate) fn tag_write(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        TrackError::TagWrite {
            path: path.into(),
            message: format!("{err:#}"),
        }
    }
}

/// External splitter failures.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("splitter timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("splitter exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("wait for splitter: {0}")]
    Wait(#[source] std::io::Error),
}

/// A failure that stops one album. Sibling albums still run.
#[derive(Debug, Error)]
pub enum AlbumError {
    #[error(transparent)]
    Splitter(#[from] SplitError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl AlbumError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        AlbumError::Io {
            context: context.into(),
            source,
        }
    }
}
