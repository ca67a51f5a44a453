//! # firstfit - A First-Fit Chunk Allocator
//!
//! This crate manages one page-aligned memory region ("arena") mapped with
//! `mmap(2)` and carves it into chunks on demand. Every chunk, free or
//! allocated, is threaded onto a single address-ordered, doubly-linked list
//! of headers stored inside the arena itself.
//!
//! ## Overview
//!
//! ```text
//!   Arena after three allocations and one free:
//!
//!   start                                                       end
//!   ┌─────┬──────┬─────┬──────┬─────┬──────┬─────┬─────────────┐
//!   │ hdr │  A1  │ hdr │ free │ hdr │  A3  │ hdr │    free     │
//!   └─────┴──────┴─────┴──────┴─────┴──────┴─────┴─────────────┘
//!      ▲              ▲              ▲              ▲
//!      └─── fwd/bwd ──┴─── fwd/bwd ──┴─── fwd/bwd ──┘
//!
//!   fwd/bwd always name the chunk immediately after/before in memory.
//! ```
//!
//! * **Allocation** walks the list from the start and takes the first free
//!   chunk that is large enough. If enough space is left over for another
//!   header, the tail is split off as a new free chunk.
//! * **Freeing** marks the chunk free and merges it with a free neighbor on
//!   either side, so two free chunks are never adjacent.
//!
//! ## Crate Structure
//!
//! ```text
//!   firstfit
//!   ├── align      - align_to! rounding macro
//!   ├── allocator  - Allocator: init/destroy, mem_alloc, mem_free, coalesce
//!   ├── arena      - the mapped region and bounds-checked header access
//!   ├── chunk      - header layout, ChunkOffset, Chunk diagnostics
//!   ├── config     - AllocatorConfig
//!   ├── error      - Error and Result
//!   ├── list       - address-ordered chunk list, first-fit, validation
//!   └── sys        - mmap/munmap/sysconf wrappers
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use firstfit::{Allocator, HEADER_SIZE};
//!
//! let mut allocator = Allocator::new();
//! let reserved = allocator.init(4096).unwrap();
//!
//! let ptr = allocator.mem_alloc(64).unwrap();
//! unsafe { ptr.as_ptr().write_bytes(0xAB, 64) };
//!
//! allocator.mem_free(ptr.as_ptr()).unwrap();
//!
//! let head = allocator.head().unwrap();
//! assert_eq!(head.size(), reserved - HEADER_SIZE);
//! assert!(head.is_free());
//!
//! allocator.destroy().unwrap();
//! ```
//!
//! ## Chunk Layout
//!
//! ```text
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Chunk Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ is_free         │  │  │                          │  │
//!   │  │ fwd: offset/-   │  │  │     N bytes usable       │  │
//!   │  │ bwd: offset/-   │  │  │                          │  │
//!   │  └─────────────────┘  │  └──────────────────────────┘  │
//!   │   HEADER_SIZE bytes   │                                │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! Neighbor links are byte offsets from the arena start. All header reads
//! and writes go through the arena and are checked against its length.
//!
//! ## Limitations
//!
//! - **Single-threaded**: an `Allocator` needs `&mut self` for every change
//! - **One arena**: the arena never grows; requests that do not fit fail
//! - **No alignment**: payloads start `HEADER_SIZE` past their header, so
//!   odd request sizes leave later payloads unaligned
//! - **Unix-only**: requires `libc` and `mmap`

pub mod align;
mod allocator;
mod arena;
mod chunk;
mod config;
mod error;
mod list;
mod sys;

pub use allocator::Allocator;
pub use chunk::{Chunk, ChunkOffset, HEADER_SIZE, print_chunk};
pub use config::{AllocatorConfig, DEFAULT_MAX_ARENA_SIZE, MAX_ARENA_SIZE_ENV};
pub use error::{Error, Result};
pub use list::Chunks;
