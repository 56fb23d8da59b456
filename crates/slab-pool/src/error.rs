// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recoverable error types for slab pool operations.

use std::fmt;

/// Errors returned by [`crate::Pool`] operations.
///
/// Fatal invariant violations (double-free, incrementing a freed chunk) are
/// not represented here; those abort the process via `panic!` (see
/// [`crate::chunk_info::ChunkInfo`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// `Pool::new` was called with invalid parameters. The payload names the
    /// violated constraint.
    BadConfig(&'static str),

    /// `Pool::get` was called with a size of zero or greater than the pool's
    /// configured maximum chunk size.
    BadSize { requested: usize, max: usize },

    /// `put`/`inc_ref`/`dec_ref` was called with a chunk that is the wrong
    /// length, has had its underlying capacity truncated, or does not belong
    /// to this pool.
    BadChunk(&'static str),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::BadConfig(msg) => write!(f, "invalid pool config: {msg}"),
            PoolError::BadSize { requested, max } => {
                write!(f, "illegal chunk size {requested}: must be in 1..={max}")
            }
            PoolError::BadChunk(msg) => write!(f, "invalid chunk: {msg}"),
        }
    }
}

impl std::error::Error for PoolError {}

pub type PoolResult<T> = Result<T, PoolError>;
