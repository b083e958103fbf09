//! Tag reading and writing.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, Result};
use lofty::{Accessor, AudioFile, ItemKey, Tag, TagType, TaggedFileExt, read_from_path};

use crate::models::{TrackMetadata, UNKNOWN_ARTIST, parse_year};

/// Reads and writes the tags the organizer cares about.
pub trait TagIo {
    fn read(&self, path: &Path) -> Result<TrackMetadata>;
    fn write(&self, path: &Path, track: &TrackMetadata) -> Result<()>;
}

/// [`TagIo`] backed by `lofty`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoftyTags;

impl TagIo for LoftyTags {
    fn read(&self, path: &Path) -> Result<TrackMetadata> {
        let tagged_file = read_from_path(path).context("read tags")?;
        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .context("file has no tags")?;

        let year = tag
            .year()
            .or_else(|| tag.get_string(&ItemKey::RecordingDate).and_then(parse_year));

        Ok(TrackMetadata {
            artist: tag
                .artist()
                .map(|value| value.into_owned())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: tag
                .album()
                .map(|value| value.into_owned())
                .unwrap_or_else(|| fallback_album(path)),
            year: year.filter(|year| *year > 0),
            number: tag.track().filter(|number| *number > 0),
            title: tag
                .title()
                .map(|value| value.into_owned())
                .unwrap_or_else(|| file_stem(path)),
            genre: tag.genre().map(|value| value.into_owned()),
            path: Some(path.to_path_buf()),
        })
    }

    fn write(&self, path: &Path, track: &TrackMetadata) -> Result<()> {
        let mut tagged_file = read_from_path(path).context("read tags")?;
        let mut tag_type = tagged_file.primary_tag_type();
        if tagged_file.tag(tag_type).is_none() {
            if let Some(tag) = tagged_file.first_tag() {
                tag_type = tag.tag_type();
            } else {
                tag_type = default_tag_type(path);
            }
        }
        let tag = match tagged_file.tag_mut(tag_type) {
            Some(tag) => tag,
            None => {
                tagged_file.insert_tag(Tag::new(tag_type));
                tagged_file
                    .tag_mut(tag_type)
                    .context("create tag container")?
            }
        };

        tag.set_artist(track.artist.clone());
        tag.set_album(track.album.clone());
        tag.set_title(track.title.clone());
        if let Some(genre) = track.genre.as_deref() {
            tag.set_genre(genre.to_string());
        }
        if let Some(year) = track.year {
            tag.insert_text(ItemKey::Year, year.to_string());
        }
        if let Some(number) = track.number {
            tag.set_track(number);
        }

        tagged_file.save_to_path(path).context("write tags")?;
        Ok(())
    }
}

fn default_tag_type(path: &Path) -> TagType {
    let ext = path
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "flac" | "ogg" | "oga" | "opus" => TagType::VorbisComments,
        "ape" => TagType::Ape,
        _ => TagType::Id3v2,
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("<unknown>")
        .to_string()
}

fn fallback_album(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .and_then(OsStr::to_str)
        .unwrap_or("<unknown>")
        .to_string()
}
