//! Minimal cue-sheet parser.
//!
//! Reads the album-level `TITLE`/`PERFORMER`/`FILE`, the `REM GENRE`/`REM DATE` comments and
//! the per-track `TRACK`/`TITLE`/`PERFORMER` commands. Index points are left to the splitter.

use std::path::Path;

use anyhow::{Context, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CueSheet {
    /// Audio file referenced by the first `FILE` command.
    pub file: Option<String>,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub genre: Option<String>,
    pub date: Option<String>,
    pub tracks: Vec<CueTrack>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CueTrack {
    pub number: u32,
    pub title: Option<String>,
    pub performer: Option<String>,
}

/// Read and parse a cue sheet. Non-UTF-8 bytes are replaced rather than rejected.
pub fn read(path: &Path) -> Result<CueSheet> {
    let bytes = std::fs::read(path).with_context(|| format!("read cue sheet {:?}", path))?;
    Ok(parse(&String::from_utf8_lossy(&bytes)))
}

pub fn parse(text: &str) -> CueSheet {
    let mut sheet = CueSheet::default();
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for line in text.lines() {
        let (command, rest) = split_command(line);
        match command.to_ascii_uppercase().as_str() {
            "REM" => {
                let (key, value) = split_command(rest);
                match key.to_ascii_uppercase().as_str() {
                    "GENRE" => sheet.genre = non_empty(unquote(value)),
                    "DATE" => sheet.date = non_empty(unquote(value)),
                    _ => {}
                }
            }
            "FILE" => {
                if sheet.file.is_none() {
                    sheet.file = non_empty(file_name(rest));
                }
            }
            "TRACK" => {
                let (number, _kind) = split_command(rest);
                match number.parse::<u32>() {
                    Ok(number) => sheet.tracks.push(CueTrack {
                        number,
                        title: None,
                        performer: None,
                    }),
                    Err(_) => tracing::debug!(line, "skipping malformed TRACK line"),
                }
            }
            "TITLE" => {
                let value = non_empty(unquote(rest));
                match sheet.tracks.last_mut() {
                    Some(track) => track.title = value,
                    None => sheet.title = value,
                }
            }
            "PERFORMER" => {
                let value = non_empty(unquote(rest));
                match sheet.tracks.last_mut() {
                    Some(track) => track.performer = value,
                    None => sheet.performer = value,
                }
            }
            _ => {}
        }
    }

    sheet
}

fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    }
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    match value.strip_prefix('"') {
        Some(inner) => match inner.find('"') {
            Some(end) => &inner[..end],
            None => inner,
        },
        None => value,
    }
}

/// `FILE "name.flac" WAVE` or `FILE name.flac WAVE`.
fn file_name(rest: &str) -> &str {
    if rest.starts_with('"') {
        return unquote(rest);
    }
    match rest.rsplit_once(char::is_whitespace) {
        Some((name, _kind)) => name.trim(),
        None => rest,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
