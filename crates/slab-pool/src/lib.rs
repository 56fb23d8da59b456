// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Slab-based byte-buffer allocator.
//!
//! A [`Pool`] hands out reference-counted byte buffers ([`Chunk`]) drawn from
//! a small number of fixed chunk sizes ("size classes"), each backed by
//! fixed-size memory regions ("slabs") that are subdivided into chunks on
//! first use and recycled once every chunk in them is returned. See
//! `SPEC_FULL.md` for the full design and `DESIGN.md` for how each piece maps
//! back to prior art.
//!
//! Not thread-safe: callers needing concurrent access must synchronize
//! externally (see `SPEC_FULL.md` §5).

mod chunk_info;
mod error;
mod pool;
mod size_class;
mod slab;

pub use error::{PoolError, PoolResult};
pub use pool::{Chunk, Pool};
pub use slab::FOOTER_LEN;
