//! Cover art lookup and copy.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::AlbumError;
use crate::models::AlbumMetadata;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const PREFERRED_STEMS: [&str; 2] = ["cover", "folder"];

/// Best-effort cover search under `dir`.
///
/// Prefers an image whose name contains `cover` or `folder`, otherwise the first image in
/// traversal order.
pub fn find_cover(dir: &Path) -> Option<PathBuf> {
    let mut first = None;
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        if is_preferred(entry.path()) {
            return Some(entry.into_path());
        }
        if first.is_none() {
            first = Some(entry.into_path());
        }
    }
    first
}

/// Copy the album's cover into `dest_dir` as `cover.<ext>`. No cover is not an error.
pub fn copy_cover(album: &AlbumMetadata, dest_dir: &Path) -> Result<Option<PathBuf>, AlbumError> {
    let Some(cover) = album.cover.as_deref() else {
        return Ok(None);
    };
    let target = dest_dir.join(cover_file_name(cover));
    std::fs::copy(cover, &target).map_err(|err| {
        AlbumError::io(
            format!("copy cover {} -> {}", cover.display(), target.display()),
            err,
        )
    })?;
    tracing::debug!(cover = %target.display(), "cover copied");
    Ok(Some(target))
}

fn cover_file_name(cover: &Path) -> String {
    match cover.extension().and_then(OsStr::to_str) {
        Some(ext) => format!("cover.{}", ext.to_ascii_lowercase()),
        None => "cover".to_string(),
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_preferred(path: &Path) -> bool {
    let stem = path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("")
        .to_lowercase();
    PREFERRED_STEMS.iter().any(|preferred| stem.contains(preferred))
}
