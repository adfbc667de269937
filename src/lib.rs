//! # rmempool - A Fixed-Capacity Segregated Memory Pool
//!
//! This crate provides a **segregated-size pool allocator**: one arena is
//! reserved up front, cut into fixed-size chunks grouped by size class, and
//! every allocation afterwards is served from those chunks without going back
//! to the system allocator.
//!
//! ## Overview
//!
//! ```text
//!   Pool Layout (config {(8, 20), (16, 15), (32, 10)}, alignment 2048):
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                              ARENA                                   │
//!   │                                                                      │
//!   │   ┌──────────────┬──────────────┬──────────────┬──────────────────┐  │
//!   │   │  20 x 8 B    │  15 x 16 B   │  10 x 32 B   │     padding      │  │
//!   │   └──────────────┴──────────────┴──────────────┴──────────────────┘  │
//!   │   0             160            400            720             2048   │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Each size class keeps a LIFO stack of its free chunks.
//!   alloc: O(size classes) - pop from the first class that fits.
//!   free:  O(1) - push back onto the class the chunk came from.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rmempool
//!   ├── align       - Alignment macro (align_to!)
//!   ├── arena       - Aligned backing region (libc)
//!   ├── config      - PoolConfig, validation, TOML loading
//!   ├── descriptor  - SizeClassDescriptor
//!   ├── error       - MempoolError
//!   ├── pool        - Mempool implementation
//!   └── stats       - Statistic and PoolReport
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rmempool::{Mempool, SizeClassDescriptor};
//!
//! let pool = Mempool::new(
//!   [
//!     SizeClassDescriptor::new(8, 20),
//!     SizeClassDescriptor::new(16, 15),
//!     SizeClassDescriptor::new(32, 10),
//!   ],
//!   2048,
//! )
//! .expect("valid pool configuration");
//!
//! let chunk = pool.alloc(16).expect("a free 16 byte chunk");
//!
//! unsafe { chunk.as_ptr().cast::<u64>().write(42) };
//!
//! pool.free(chunk.as_ptr());
//! ```
//!
//! ## How Allocation Works
//!
//! A request is served by the smallest size class whose chunks are at least
//! as large. When that class is exhausted the next larger one is tried, and
//! so on:
//!
//! ```text
//!   alloc(16), 16 B class exhausted:
//!
//!     8 B  [■ ■ ■ ■ □ □]      too small, never considered
//!    16 B  [■ ■ ■ ■ ■ ■]      ceiling class, empty
//!    32 B  [■ ■ □ □ □ □]  ─── chunk popped here
//!
//!   ■ live   □ free
//! ```
//!
//! Requests larger than the biggest chunk size, or finding every class at or
//! above the ceiling empty, get `None`.
//!
//! Freeing looks the pointer up in a live-allocation index, so pointers that
//! were never handed out (or were already freed) are ignored instead of
//! corrupting the free stacks.
//!
//! ## Limits
//!
//! - Every chunk size must divide the arena alignment.
//! - The summed footprint of all size classes is capped at
//!   [`MAX_POOL_SIZE`] bytes.
//! - No growth, no splitting or coalescing of chunks.
//!
//! ## Thread Safety
//!
//! [`Mempool`] is `Send + Sync`. `alloc` and `free` each take one lock over
//! the whole pool state for the duration of the call.

pub mod align;
mod arena;
mod config;
mod descriptor;
mod error;
mod pool;
mod stats;

pub use config::{MAX_POOL_SIZE, PoolConfig};
pub use descriptor::{MempoolConfig, SizeClassDescriptor};
pub use error::{MempoolError, Result};
pub use pool::Mempool;
pub use stats::{PoolReport, SizeClassReport, Statistic};
