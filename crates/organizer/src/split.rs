//! Shared split step for merged albums.

use std::path::Path;

use crate::Backends;
use crate::error::{AlbumError, TrackError};
use crate::models::{AlbumMetadata, AlbumSource, TrackMetadata};
use crate::splitter::{SplitRequest, expected_file_name};

/// Tracks of a merged album after splitting.
#[derive(Debug, Default)]
pub struct SplitOutcome {
    /// Tracks whose file was produced, now pointing at it.
    pub tracks: Vec<TrackMetadata>,
    pub errors: Vec<TrackError>,
}

/// Cut a merged album into per-track flac files under `dest_dir` and tag them.
///
/// Split albums pass through untouched. A splitter failure stops the album; a missing output
/// file or a failed tag write only drops that track.
pub fn split_album(
    album: &AlbumMetadata,
    dest_dir: &Path,
    backends: &Backends<'_>,
) -> Result<SplitOutcome, AlbumError> {
    let AlbumSource::Merged {
        cue_path,
        audio_path,
    } = &album.source
    else {
        return Ok(SplitOutcome {
            tracks: album.tracks.clone(),
            errors: Vec::new(),
        });
    };

    std::fs::create_dir_all(dest_dir)
        .map_err(|err| AlbumError::io(format!("create {}", dest_dir.display()), err))?;

    backends.splitter.split(&SplitRequest {
        audio_path,
        cue_path,
        output_dir: dest_dir,
        tracks: &album.tracks,
    })?;

    let mut outcome = SplitOutcome::default();
    for track in &album.tracks {
        let Some(number) = track.number else {
            outcome.errors.push(TrackError::MissingTrackNumber {
                title: track.title.clone(),
            });
            continue;
        };
        let path = dest_dir.join(expected_file_name(number, &track.title));
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "splitter did not produce expected track");
            outcome.errors.push(TrackError::FileMissing(path));
            continue;
        }
        if let Err(err) = backends.tags.write(&path, track) {
            tracing::warn!(path = %path.display(), "tag write failed: {err:#}");
            outcome.errors.push(TrackError::tag_write(path, err));
            continue;
        }
        outcome.tracks.push(track.clone().placed_at(path));
    }

    tracing::info!(
        album = %album.title,
        produced = outcome.tracks.len(),
        failed = outcome.errors.len(),
        "album split"
    );
    Ok(outcome)
}
