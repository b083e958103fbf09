//! Music library organizer: turns a tree of ripped albums into
//! `Artist/Album (Year)/NN. Title.ext`.
//!
//! ## Pipeline
//! 1. **Discover**: walk the source tree, build one album per cue sheet and one album per
//!    album tag shared by loose audio files.
//! 2. **Dispatch**: pick a [`Strategy`] per album from its genre.
//! 3. **Restructure**: split merged albums with an external splitter, write tags, copy tracks
//!    and cover art into the destination tree.
//!
//! Tag I/O and the splitter are reached through the [`TagIo`] and [`Splitter`] traits, bundled
//! in [`Backends`].

pub mod classical;
pub mod cover;
pub mod cue;
pub mod discovery;
pub mod error;
pub mod models;
pub mod organize;
pub mod regular;
pub mod split;
pub mod splitter;
pub mod tags;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AlbumError, DiscoveryError, SplitError, TrackError};
pub use models::{AlbumMetadata, AlbumSource, TrackMetadata};
pub use organize::{
    AlbumOutcome, AlbumReport, RunOutcome, RunReport, Settings, Strategy, organize,
};
pub use splitter::{ShnSplit, SplitRequest, Splitter};
pub use tags::{LoftyTags, TagIo};

/// Collaborators used while restructuring albums.
#[derive(Clone, Copy)]
pub struct Backends<'a> {
    pub tags: &'a dyn TagIo,
    pub splitter: &'a dyn Splitter,
}
