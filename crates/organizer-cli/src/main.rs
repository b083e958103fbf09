//! `music-organizer`: sorts a folder of ripped albums into a library tree.
//!
//! Cue + single-file rips are split with `shnsplit`. Albums whose genre is configured as
//! classical are filed by work (`Artist/Work/N. Movement.flac`); everything else lands in
//! `Artist/Album (Year)/NN. Title.ext`.

mod cli;
mod config;

use anyhow::{Result, bail};
use clap::Parser;
use organizer::{AlbumOutcome, Backends, LoftyTags, RunOutcome, RunReport, organize};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,organizer=info,music_organizer=info")
        }))
        .init();

    let cfg = match &args.config {
        Some(path) => config::OrganizerConfig::load(path)?,
        None => config::OrganizerConfig::default(),
    };
    let settings = config::settings_from(&cfg, &args);
    let splitter = config::splitter_from(&cfg, &args);
    tracing::debug!(
        program = %splitter.program.display(),
        timeout_secs = splitter.timeout.as_secs(),
        "splitter configured"
    );

    let tags = LoftyTags;
    let backends = Backends {
        tags: &tags,
        splitter: &splitter,
    };

    match organize(&args.source, &settings, &backends) {
        RunOutcome::PathNotFound => bail!("source path not found: {}", args.source.display()),
        RunOutcome::AlbumsNotFound => {
            tracing::warn!(source = %args.source.display(), "nothing to organize");
            Ok(())
        }
        RunOutcome::Done(report) => {
            summarize(&report);
            if !report.is_clean() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn summarize(report: &RunReport) {
    for err in &report.skipped {
        tracing::warn!("skipped: {err}");
    }
    let mut failed = 0usize;
    let mut partial = 0usize;
    for album in &report.albums {
        match &album.outcome {
            AlbumOutcome::Success => {}
            AlbumOutcome::Partial(errors) => {
                partial += 1;
                tracing::warn!(
                    artist = %album.artist,
                    album = %album.title,
                    failed_tracks = errors.len(),
                    "album organized with errors"
                );
            }
            AlbumOutcome::Failed(err) => {
                failed += 1;
                tracing::error!(artist = %album.artist, album = %album.title, "{err}");
            }
        }
    }
    tracing::info!(
        destination = %report.destination.display(),
        albums = report.albums.len(),
        partial,
        failed,
        skipped = report.skipped.len(),
        "done"
    );
}
