//! Classical restructuring: one destination album per musical work.
//!
//! Track titles look like `"Symphony No. 5 - III. Scherzo"`. The part before `" - "` names the
//! work (the destination album), the part after is the movement, numbered by its leading Roman
//! numeral. A title without the separator is a single-movement work.

use std::path::{Path, PathBuf};

use crate::Backends;
use crate::cover::copy_cover;
use crate::error::{AlbumError, TrackError};
use crate::models::{AlbumMetadata, path_component};
use crate::organize::AlbumOutcome;
use crate::split::split_album;

const WORK_SEPARATOR: &str = " - ";
const ROMAN_NUMERALS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

/// A movement number and the title left once the numeral is stripped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Movement {
    pub number: u32,
    pub title: String,
}

/// Where a classical track belongs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassicalTitle {
    pub work: String,
    pub movement: String,
    pub number: u32,
}

/// Resolve the leading Roman numeral (I to X) of a movement title.
///
/// The number comes from the longest leading run of `I`, `V` and `X`. The numeral is stripped
/// from the returned title only when a separator follows it, so `"Intermezzo"` stays whole.
pub fn resolve_movement(title: &str) -> Result<Movement, TrackError> {
    let trimmed = title.trim_start();
    let run_len = trimmed
        .find(|ch: char| !matches!(ch, 'I' | 'V' | 'X'))
        .unwrap_or(trimmed.len());
    let (numeral, rest) = trimmed.split_at(run_len);

    let index = ROMAN_NUMERALS
        .iter()
        .position(|candidate| *candidate == numeral)
        .ok_or_else(|| TrackError::InvalidMovementTitle(title.to_string()))?;

    let title = if rest.chars().next().is_some_and(char::is_alphanumeric) {
        trimmed.to_string()
    } else {
        let stripped = rest.trim_start_matches(is_numeral_separator);
        if stripped.is_empty() {
            numeral.to_string()
        } else {
            stripped.to_string()
        }
    };
    Ok(Movement {
        number: index as u32 + 1,
        title,
    })
}

fn is_numeral_separator(ch: char) -> bool {
    matches!(ch, '.' | ':' | ')') || ch.is_whitespace()
}

/// Split a track title into work, movement and movement number.
pub fn parse_title(title: &str) -> Result<ClassicalTitle, TrackError> {
    match title.split_once(WORK_SEPARATOR) {
        Some((work, movement)) => {
            let movement = resolve_movement(movement)?;
            Ok(ClassicalTitle {
                work: work.trim().to_string(),
                movement: movement.title,
                number: movement.number,
            })
        }
        None => Ok(ClassicalTitle {
            work: title.to_string(),
            movement: title.to_string(),
            number: 1,
        }),
    }
}

/// `"{number}. {movement}.flac"`; classical output is always flac.
pub fn movement_file_name(number: u32, movement: &str) -> String {
    format!("{}. {}.flac", number, path_component(movement))
}

pub fn restructure(
    album: &AlbumMetadata,
    dest_root: &Path,
    backends: &Backends<'_>,
) -> AlbumOutcome {
    // Merged albums are split in place: the destination depends on each track's title.
    let (tracks, mut errors) = match split_album(album, &album.dir, backends) {
        Ok(split) => (split.tracks, split.errors),
        Err(err) => return AlbumOutcome::Failed(err),
    };

    let mut album_dirs: Vec<PathBuf> = Vec::new();
    for track in tracks {
        let source = match track.path.clone() {
            Some(path) if path.is_file() => path,
            Some(path) => {
                errors.push(TrackError::FileMissing(path));
                continue;
            }
            None => {
                errors.push(TrackError::Unplaced {
                    title: track.title.clone(),
                });
                continue;
            }
        };

        let parsed = match parse_title(&track.title) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(path = %source.display(), "{err}");
                errors.push(err);
                continue;
            }
        };
        let track = track.as_movement(
            &parsed.work,
            &parsed.movement,
            parsed.number,
            album.genre.as_deref(),
        );

        if let Err(err) = backends.tags.write(&source, &track) {
            tracing::warn!(path = %source.display(), "tag write failed: {err:#}");
            errors.push(TrackError::tag_write(source, err));
            continue;
        }

        let work_dir = dest_root
            .join(path_component(&track.artist))
            .join(path_component(&parsed.work));
        if let Err(err) = std::fs::create_dir_all(&work_dir) {
            return AlbumOutcome::Failed(AlbumError::io(
                format!("create {}", work_dir.display()),
                err,
            ));
        }
        let target = work_dir.join(movement_file_name(parsed.number, &parsed.movement));
        if let Err(err) = std::fs::copy(&source, &target) {
            errors.push(TrackError::Copy {
                from: source,
                to: target,
                source: err,
            });
            continue;
        }
        tracing::debug!(from = %source.display(), to = %target.display(), "movement copied");

        if !album_dirs.contains(&work_dir) {
            album_dirs.push(work_dir);
        }
    }

    for dir in &album_dirs {
        if let Err(err) = copy_cover(album, dir) {
            return AlbumOutcome::Failed(err);
        }
    }

    tracing::info!(
        album = %album.title,
        works = album_dirs.len(),
        errors = errors.len(),
        "classical album restructured"
    );
    AlbumOutcome::from_errors(errors)
}
