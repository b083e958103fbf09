//! Configuration loading and resolution.
//!
//! The TOML file is optional; command-line flags override it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use organizer::{Settings, ShnSplit};
use serde::Deserialize;

use crate::cli::Args;

/// Top-level config loaded from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizerConfig {
    /// Library root to write into.
    pub destination: Option<String>,
    /// Genres restructured by work (exact match).
    pub classical_genres: Option<Vec<String>>,
    /// External splitter settings.
    pub splitter: Option<SplitterConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitterConfig {
    /// Executable name or path (default: shnsplit).
    pub program: Option<String>,
    /// Seconds before a running split is killed (default: 600).
    pub timeout_secs: Option<u64>,
}

impl OrganizerConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = toml::from_str::<OrganizerConfig>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

/// Merge file config and flags into library settings.
pub fn settings_from(cfg: &OrganizerConfig, args: &Args) -> Settings {
    let destination = args
        .dest
        .clone()
        .or_else(|| non_empty(cfg.destination.as_deref()).map(PathBuf::from));
    let classical_genres = cfg
        .classical_genres
        .clone()
        .filter(|genres| !genres.is_empty())
        .unwrap_or_else(|| Settings::default().classical_genres);
    Settings {
        destination,
        classical_genres,
    }
}

/// Build the splitter from file config and flags.
pub fn splitter_from(cfg: &OrganizerConfig, args: &Args) -> ShnSplit {
    let defaults = ShnSplit::default();
    let file = cfg.splitter.as_ref();
    let program = args
        .splitter
        .clone()
        .or_else(|| non_empty(file.and_then(|s| s.program.as_deref())).map(PathBuf::from))
        .unwrap_or(defaults.program);
    let timeout = args
        .split_timeout
        .or_else(|| file.and_then(|s| s.timeout_secs))
        .map(Duration::from_secs)
        .unwrap_or(defaults.timeout);
    ShnSplit::new(program, timeout)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
