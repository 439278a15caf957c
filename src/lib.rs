//! # marena - A Region-Based Arena Allocator
//!
//! This crate provides a thread-safe **arena allocator** that carves many
//! small allocations out of a few large regions mapped with `mmap(2)`.
//! Allocations are never freed one by one: the whole arena is reset or
//! destroyed at once.
//!
//! ## Overview
//!
//! ```text
//!   Arena:
//!
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │  Region 0 (head)                                                   │
//!   │  ┌────────┬─────┬─────┬──────────┬───────────────────────────────┐ │
//!   │  │ header │ A1  │ A2  │ A3       │         remaining             │ │
//!   │  └────────┴─────┴─────┴──────────┴───────────────────────────────┘ │
//!   │                                  ▲                                 │
//!   │                                cursor                              │
//!   │       │ next                                                       │
//!   │       ▼                                                            │
//!   │  Region 1 (tail)                                                   │
//!   │  ┌────────┬──────────────────────────────┬───────────────────────┐ │
//!   │  │ header │ A4 (did not fit in region 0) │       remaining       │ │
//!   │  └────────┴──────────────────────────────┴───────────────────────┘ │
//!   └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A request is served from the first region, starting at the head, with
//! enough room left. If none has room, a new region is mapped, big enough for
//! the request and never smaller than the configured floor (two pages by
//! default), and appended after the tail.
//!
//! ## Crate Structure
//!
//! ```text
//!   marena
//!   ├── align      - align! macro, page-rounded region sizes
//!   ├── array      - ArenaVec, a growable array of Copy values
//!   ├── arena      - Arena: region chain behind a single mutex
//!   ├── buffer     - ArenaBuf, a growable byte buffer on top of an arena
//!   ├── config     - ArenaConfig (page size, region floor)
//!   ├── error      - ArenaError
//!   ├── growth     - power-of-two capacity policy
//!   ├── region     - Region header and OS mappings (internal)
//!   └── stats      - RegionStats / ArenaReport diagnostics
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use marena::{Arena, ArenaBuf};
//!
//! let arena = Arena::new(4096).unwrap();
//!
//! let bytes = arena.alloc_copy(b"hello");
//! bytes[0] = b'j';
//! assert_eq!(bytes, b"jello");
//!
//! let mut buf = ArenaBuf::new(&arena);
//! buf.append(b"grows ");
//! buf.append(b"by copying");
//! assert_eq!(buf.to_string(), "grows by copying");
//! ```
//!
//! ## Reallocation
//!
//! There is no way to free a single block, so growing a block means copying
//! it into a fresh one:
//!
//! ```text
//!   reallocate(p, 4, 8):
//!
//!   ┌────────┬──────┬──────────┬──────────────┐
//!   │ header │ ABCD │ ABCD.... │  remaining   │
//!   └────────┴──────┴──────────┴──────────────┘
//!              ▲      ▲
//!              │      └── returned pointer
//!              └── dead space until reset/destroy
//! ```
//!
//! Shrinking is a no-op that hands the original pointer back. Memory use
//! therefore only grows until the arena is reset or destroyed.
//!
//! ## Threading
//!
//! `Arena` is `Send + Sync`. Every allocation holds one mutex for its whole
//! duration. `reset` and `destroy` take `&mut self`, so they can only run
//! once no other thread (and no borrowed slice) is using the arena.
//!
//! ## Failure
//!
//! Failing to map memory is fatal: [`Arena::allocate`] and
//! [`Arena::reallocate`] abort the process. The `try_*` variants return
//! [`ArenaError`] instead. Using an arena before it is initialized panics.

pub mod align;
mod array;
mod arena;
mod buffer;
mod config;
mod error;
mod growth;
mod region;
mod stats;

pub use arena::Arena;
pub use array::ArenaVec;
pub use buffer::ArenaBuf;
pub use config::{ArenaConfig, os_page_size};
pub use error::{ArenaError, Result};
pub use growth::{ARRAY_INIT_CAPACITY, grow_array_capacity, next_capacity};
pub use stats::{ArenaReport, RegionStats};
