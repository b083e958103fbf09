//! Regular restructuring: one destination album per source album.

use std::path::Path;

use crate::Backends;
use crate::cover::copy_cover;
use crate::error::{AlbumError, TrackError};
use crate::models::{AlbumMetadata, TrackMetadata, path_component};
use crate::organize::AlbumOutcome;
use crate::split::split_album;

/// `dest_root/Artist/Title (Year)`.
pub fn album_dir(album: &AlbumMetadata, dest_root: &Path) -> std::path::PathBuf {
    dest_root
        .join(path_component(&album.artist))
        .join(path_component(&album.dir_name()))
}

/// `"{number:02}. {title}{ext}"` keeping the source extension.
pub fn track_file_name(number: u32, track: &TrackMetadata) -> String {
    format!(
        "{:02}. {}{}",
        number,
        path_component(&track.title),
        track.extension()
    )
}

pub fn restructure(
    album: &AlbumMetadata,
    dest_root: &Path,
    backends: &Backends<'_>,
) -> AlbumOutcome {
    let dest_dir = album_dir(album, dest_root);
    if let Err(err) = std::fs::create_dir_all(&dest_dir) {
        return AlbumOutcome::Failed(AlbumError::io(
            format!("create {}", dest_dir.display()),
            err,
        ));
    }

    let errors = if album.is_merged() {
        match split_album(album, &dest_dir, backends) {
            Ok(split) => split.errors,
            Err(err) => return AlbumOutcome::Failed(err),
        }
    } else {
        copy_tracks(album, &dest_dir)
    };

    if let Err(err) = copy_cover(album, &dest_dir) {
        return AlbumOutcome::Failed(err);
    }

    tracing::info!(
        album = %album.title,
        dest = %dest_dir.display(),
        errors = errors.len(),
        "album restructured"
    );
    AlbumOutcome::from_errors(errors)
}

fn copy_tracks(album: &AlbumMetadata, dest_dir: &Path) -> Vec<TrackError> {
    let mut errors = Vec::new();
    for track in &album.tracks {
        let source = match track.path.as_deref() {
            Some(path) if path.is_file() => path,
            Some(path) => {
                errors.push(TrackError::FileMissing(path.to_path_buf()));
                continue;
            }
            None => {
                errors.push(TrackError::Unplaced {
                    title: track.title.clone(),
                });
                continue;
            }
        };
        let Some(number) = track.number else {
            errors.push(TrackError::MissingTrackNumber {
                title: track.title.clone(),
            });
            continue;
        };

        let target = dest_dir.join(track_file_name(number, track));
        match std::fs::copy(source, &target) {
            Ok(_) => {
                tracing::debug!(from = %source.display(), to = %target.display(), "track copied")
            }
            Err(err) => {
                tracing::warn!(
                    from = %source.display(),
                    to = %target.display(),
                    "copy failed: {err}"
                );
                errors.push(TrackError::Copy {
                    from: source.to_path_buf(),
                    to: target,
                    source: err,
                });
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlbumSource;
    use crate::testing::{FakeSplitter, FakeTags, write_file};

    fn track(dir: &Path, file: &str, number: Option<u32>, title: &str) -> TrackMetadata {
        let path = dir.join(file);
        write_file(&path, file.as_bytes());
        TrackMetadata {
            artist: "Pink Floyd".into(),
            album: "Moon".into(),
            year: Some(1973),
            number,
            title: title.into(),
            genre: Some("Rock".into()),
            path: Some(path),
        }
    }

    fn split_album_fixture(dir: &Path, tracks: Vec<TrackMetadata>) -> AlbumMetadata {
        AlbumMetadata {
            artist: "Pink Floyd".into(),
            album_artist: None,
            title: "Moon".into(),
            year: Some(1973),
            genre: Some("Rock".into()),
            tracks,
            dir: dir.to_path_buf(),
            source: AlbumSource::Split,
            cover: None,
        }
    }

    #[test]
    fn album_dir_uses_artist_and_dir_name() {
        let album = split_album_fixture(Path::new("/src"), Vec::new());
        assert_eq!(
            album_dir(&album, Path::new("/lib")),
            Path::new("/lib/Pink Floyd/Moon (1973)")
        );
    }

    #[test]
    fn split_tracks_keep_number_and_extension() {
        let src = tempfile::tempdir().expect("tempdir");
        let dst = tempfile::tempdir().expect("tempdir");
        let album = split_album_fixture(
            src.path(),
            vec![
                track(src.path(), "b.mp3", Some(3), "Time"),
                track(src.path(), "a.flac", Some(1), "Speak to Me"),
            ],
        );
        let tags = FakeTags::default();
        let splitter = FakeSplitter::default();
        let backends = Backends {
            tags: &tags,
            splitter: &splitter,
        };

        let outcome = restructure(&album, dst.path(), &backends);
        assert!(matches!(outcome, AlbumOutcome::Success), "{outcome:?}");
        let dir = dst.path().join("Pink Floyd/Moon (1973)");
        assert_eq!(std::fs::read(dir.join("03. Time.mp3")).unwrap(), b"b.mp3");
        assert_eq!(std::fs::read(dir.join("01. Speak to Me.flac")).unwrap(), b"a.flac");
        assert!(splitter.calls().is_empty());
        assert!(tags.writes().is_empty());
    }

    #[test]
    fn bad_tracks_are_reported_and_others_copied() {
        let src = tempfile::tempdir().expect("tempdir");
        let dst = tempfile::tempdir().expect("tempdir");
        let mut gone = track(src.path(), "gone.mp3", Some(2), "Gone");
        gone.path = Some(src.path().join("really-gone.mp3"));
        let album = split_album_fixture(
            src.path(),
            vec![
                track(src.path(), "a.mp3", Some(1), "One"),
                gone,
                track(src.path(), "c.mp3", None, "No Number"),
                TrackMetadata {
                    path: None,
                    ..track(src.path(), "d.mp3", Some(4), "Nowhere")
                },
            ],
        );
        let tags = FakeTags::default();
        let splitter = FakeSplitter::default();
        let backends = Backends {
            tags: &tags,
            splitter: &splitter,
        };

        let AlbumOutcome::Partial(errors) = restructure(&album, dst.path(), &backends) else {
            panic!("expected partial outcome");
        };
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], TrackError::FileMissing(_)));
        assert!(matches!(errors[1], TrackError::MissingTrackNumber { .. }));
        assert!(matches!(&errors[2], TrackError::Unplaced { title } if title == "Nowhere"));
        assert!(dst.path().join("Pink Floyd/Moon (1973)/01. One.mp3").is_file());
    }

    #[test]
    fn merged_album_is_split_into_album_dir() {
        let src = tempfile::tempdir().expect("tempdir");
        let dst = tempfile::tempdir().expect("tempdir");
        write_file(&src.path().join("album.cue"), b"cue");
        write_file(&src.path().join("album.ape"), b"audio");
        let mut album = split_album_fixture(src.path(), Vec::new());
        album.year = None;
        album.source = AlbumSource::Merged {
            cue_path: src.path().join("album.cue"),
            audio_path: src.path().join("album.ape"),
        };
        album.tracks = vec![TrackMetadata {
            artist: "Pink Floyd".into(),
            album: "Moon".into(),
            year: None,
            number: Some(1),
            title: "Speak to Me".into(),
            genre: Some("Rock".into()),
            path: None,
        }];
        let tags = FakeTags::default();
        let splitter = FakeSplitter::default();
        let backends = Backends {
            tags: &tags,
            splitter: &splitter,
        };

        let outcome = restructure(&album, dst.path(), &backends);
        assert!(matches!(outcome, AlbumOutcome::Success), "{outcome:?}");
        let dir = dst.path().join("Pink Floyd/Moon");
        assert_eq!(splitter.calls(), vec![dir.clone()]);
        assert!(dir.join("01. Speak to Me.flac").is_file());
    }

    #[test]
    fn splitter_failure_fails_album() {
        let src = tempfile::tempdir().expect("tempdir");
        let dst = tempfile::tempdir().expect("tempdir");
        let mut album = split_album_fixture(src.path(), Vec::new());
        album.source = AlbumSource::Merged {
            cue_path: src.path().join("album.cue"),
            audio_path: src.path().join("album.flac"),
        };
        let tags = FakeTags::default();
        let splitter = FakeSplitter::failing();
        let backends = Backends {
            tags: &tags,
            splitter: &splitter,
        };

        let outcome = restructure(&album, dst.path(), &backends);
        assert!(matches!(outcome, AlbumOutcome::Failed(AlbumError::Splitter(_))));
    }
}
