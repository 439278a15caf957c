//! Error types for arena operations.
//!
//! Out-of-memory is fatal for an arena: the infallible surface
//! ([`Arena::allocate`](crate::Arena::allocate) and friends) aborts the
//! process, while the `try_*` surface hands the same condition back as an
//! [`ArenaError`] so the caller can report it before giving up on the arena.

use std::io;

use thiserror::Error;

/// Errors produced while mapping, releasing or sizing regions.
#[derive(Error, Debug)]
pub enum ArenaError {
  /// The OS refused to map a new region.
  #[error("failed to map a region of {size} bytes: {source}")]
  MapFailed {
    /// Total mapping size that was requested, header included.
    size: usize,
    #[source]
    source: io::Error,
  },

  /// The OS refused to release a region mapping.
  #[error("failed to unmap a region of {size} bytes: {source}")]
  UnmapFailed {
    /// Total mapping size, header included.
    size: usize,
    #[source]
    source: io::Error,
  },

  /// The requested size cannot be expressed as a page-rounded mapping length.
  #[error("requested size {requested} overflows the region size computation")]
  SizeOverflow {
    /// The usable byte count that was asked for.
    requested: usize,
  },

  /// The arena configuration is unusable.
  #[error("invalid arena configuration: {0}")]
  InvalidConfig(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ArenaError>;
