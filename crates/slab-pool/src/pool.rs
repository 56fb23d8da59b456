// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Top-level allocator: owns the size classes, routes requests to the
//! smallest one that fits, and reverse-maps returned buffers to their slab.

use crate::error::{PoolError, PoolResult};
use crate::size_class::SizeClass;
use crate::slab::FOOTER_LEN;

/// An allocated chunk handle returned by [`Pool::get`].
///
/// Carries no borrow of the pool — just the indices needed to resolve the
/// owning slab again in O(1). Use [`Pool::bytes`]/[`Pool::bytes_mut`] to read
/// or write through it, and [`Pool::put`]/[`Pool::inc_ref`]/[`Pool::dec_ref`]
/// to manage its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pool_magic: u64,
    class_index: usize,
    slab_index: usize,
    chunk_index: usize,
    len: usize,
}

impl Chunk {
    /// Length in bytes of the caller-visible view (the `size` passed to
    /// [`Pool::get`]).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Slab-based byte-buffer allocator.
///
/// See the crate-level documentation and `SPEC_FULL.md` for the full
/// contract. All operations are O(1) except slab creation, which is
/// O(chunk_count) for free-list initialization, and none of them may be
/// invoked concurrently on the same `Pool` (see SPEC_FULL.md §5).
pub struct Pool {
    classes: Vec<SizeClass>,
    slab_size: usize,
    chunk_size_min: usize,
    chunk_size_max: usize,
    pool_magic: u64,
}

fn validate_params(
    slab_size: usize,
    chunk_size_min: usize,
    chunk_size_max: usize,
    factor: f64,
) -> PoolResult<()> {
    if chunk_size_min == 0 || chunk_size_min > chunk_size_max {
        return Err(PoolError::BadConfig(
            "chunk_size_min must be > 0 and <= chunk_size_max",
        ));
    }
    if slab_size < chunk_size_max {
        return Err(PoolError::BadConfig(
            "slab_size must be >= chunk_size_max",
        ));
    }
    if factor <= 1.0 {
        return Err(PoolError::BadConfig("factor must be greater than 1"));
    }
    if ((chunk_size_min as f64) * factor) as usize == chunk_size_min {
        return Err(PoolError::BadConfig(
            "factor too close to 1: geometric progression would stall",
        ));
    }
    Ok(())
}

impl Pool {
    /// Create a new pool.
    ///
    /// `classes` are populated for `chunk_size = chunk_size_min`, then
    /// `chunk_size = floor(chunk_size * factor)` repeatedly, stopping once
    /// `chunk_size >= chunk_size_max`.
    pub fn new(
        slab_size: usize,
        chunk_size_min: usize,
        chunk_size_max: usize,
        factor: f64,
    ) -> PoolResult<Self> {
        validate_params(slab_size, chunk_size_min, chunk_size_max, factor)?;

        let pool_magic = fastrand::u64(..);
        let mut classes = Vec::new();
        let mut chunk_size = chunk_size_min;
        while chunk_size < chunk_size_max {
            let class_index = classes.len() as u32;
            classes.push(SizeClass::new(class_index, slab_size, chunk_size, pool_magic));
            chunk_size = ((chunk_size as f64) * factor) as usize;
        }
        // The geometric progression rarely lands exactly on chunk_size_max;
        // always add a final class there so every size in
        // 1..=chunk_size_max is routable.
        let class_index = classes.len() as u32;
        classes.push(SizeClass::new(
            class_index,
            slab_size,
            chunk_size_max,
            pool_magic,
        ));

        log::debug!(
            "[slab_pool] pool created: slab_size={slab_size} chunk_size_min={chunk_size_min} chunk_size_max={chunk_size_max} classes={}",
            classes.len()
        );

        Ok(Self {
            classes,
            slab_size,
            chunk_size_min,
            chunk_size_max,
            pool_magic,
        })
    }

    pub fn slab_size(&self) -> usize {
        self.slab_size
    }

    pub fn chunk_size_min(&self) -> usize {
        self.chunk_size_min
    }

    pub fn chunk_size_max(&self) -> usize {
        self.chunk_size_max
    }

    /// Smallest size-class index whose chunk size is `>= size`.
    fn class_for(&self, size: usize) -> usize {
        self.classes.partition_point(|c| c.chunk_size() < size)
    }

    /// Allocate a chunk able to hold `size` bytes.
    pub fn get(&mut self, size: usize) -> PoolResult<Chunk> {
        if size == 0 || size > self.chunk_size_max {
            return Err(PoolError::BadSize {
                requested: size,
                max: self.chunk_size_max,
            });
        }

        let class_index = self.class_for(size);
        let (slab_index, chunk_index) = self.classes[class_index].alloc_chunk();
        log::trace!(
            "[slab_pool] get({size}) -> class={class_index} slab={slab_index} chunk={chunk_index}"
        );
        Ok(Chunk {
            pool_magic: self.pool_magic,
            class_index,
            slab_index,
            chunk_index,
            len: size,
        })
    }

    /// Release a chunk, equivalent to `dec_ref`.
    pub fn put(&mut self, chunk: Chunk) -> PoolResult<()> {
        self.dec_ref(&chunk)
    }

    /// Increase a chunk's reference count.
    ///
    /// # Panics
    /// Panics if the chunk's refcount is already zero (see
    /// [`crate::chunk_info::ChunkInfo::inc_ref`]); this indicates a
    /// programming error, not caller misuse of the public API.
    pub fn inc_ref(&mut self, chunk: &Chunk) -> PoolResult<()> {
        self.validate_handle(chunk)?;
        self.classes[chunk.class_index].inc_ref(chunk.slab_index, chunk.chunk_index);
        Ok(())
    }

    /// Decrease a chunk's reference count, recycling it once it reaches
    /// zero.
    ///
    /// # Panics
    /// Panics on double free (see
    /// [`crate::chunk_info::ChunkInfo::dec_ref`]).
    pub fn dec_ref(&mut self, chunk: &Chunk) -> PoolResult<()> {
        self.validate_handle(chunk)?;
        self.classes[chunk.class_index].dec_ref(chunk.slab_index, chunk.chunk_index);
        Ok(())
    }

    /// Read-only view of a chunk's bytes.
    pub fn bytes(&self, chunk: &Chunk) -> PoolResult<&[u8]> {
        self.validate_handle(chunk)?;
        Ok(self.classes[chunk.class_index]
            .slab(chunk.slab_index)
            .chunk_bytes(chunk.chunk_index, chunk.len))
    }

    /// Mutable view of a chunk's bytes.
    pub fn bytes_mut(&mut self, chunk: &Chunk) -> PoolResult<&mut [u8]> {
        self.validate_handle(chunk)?;
        Ok(self.classes[chunk.class_index]
            .slab_mut(chunk.slab_index)
            .chunk_bytes_mut(chunk.chunk_index, chunk.len))
    }

    /// The chunk's full reserved extent (start to end of the slab's backing
    /// memory, footer included). Pair with [`Pool::locate_raw`] to recover a
    /// chunk's identity from a buffer that outlived its [`Chunk`] handle —
    /// e.g. after round-tripping the bytes through storage or an IPC
    /// boundary that doesn't carry Rust types.
    pub fn chunk_extended(&self, chunk: &Chunk) -> PoolResult<&[u8]> {
        self.validate_handle(chunk)?;
        Ok(self.classes[chunk.class_index]
            .slab(chunk.slab_index)
            .chunk_extended(chunk.chunk_index))
    }

    /// Count of not-yet-allocated chunks across every slab in the size class
    /// that would serve a request of `size` bytes. Useful for capacity
    /// monitoring; not part of the allocation fast path.
    pub fn free_chunks(&self, size: usize) -> PoolResult<usize> {
        if size == 0 || size > self.chunk_size_max {
            return Err(PoolError::BadSize {
                requested: size,
                max: self.chunk_size_max,
            });
        }
        let class = &self.classes[self.class_for(size)];
        Ok((0..class.slab_count())
            .map(|i| class.slab(i).free_count())
            .sum())
    }

    /// Validate that a handle was issued by this pool and still addresses a
    /// live slab/chunk slot. The magic check alone rejects foreign chunks in
    /// O(1) before any indexing happens (scenario E: cross-pool rejection).
    fn validate_handle(&self, chunk: &Chunk) -> PoolResult<()> {
        if chunk.pool_magic != self.pool_magic {
            return Err(PoolError::BadChunk(
                "magic number not matched, a chunk not allocated from this pool?",
            ));
        }
        if chunk.len == 0 || chunk.len > self.chunk_size_max {
            return Err(PoolError::BadChunk("chunk size out of range"));
        }
        if chunk.class_index >= self.classes.len() {
            return Err(PoolError::BadChunk("chunk references an unknown size class"));
        }
        Ok(())
    }

    /// Resolve the owning `(class_index, slab_index, chunk_index)` for a raw
    /// byte region whose length is the chunk's full reserved capacity
    /// (i.e. from the chunk's start to the end of its slab's backing memory,
    /// footer included) — the byte-oriented reverse-lookup path described in
    /// SPEC_FULL.md §4.3/§4.4, kept for buffers recovered without a live
    /// [`Chunk`] handle.
    pub fn locate_raw(&self, chunk_capacity_view: &[u8]) -> PoolResult<(usize, usize, usize)> {
        if chunk_capacity_view.len() <= FOOTER_LEN {
            return Err(PoolError::BadChunk(
                "chunk capacity should not be truncated to the footer length or below",
            ));
        }

        let footer = &chunk_capacity_view[chunk_capacity_view.len() - FOOTER_LEN..];
        let magic = u64::from_be_bytes(footer[0..8].try_into().unwrap());
        if magic != self.pool_magic {
            return Err(PoolError::BadChunk(
                "magic number not matched, a chunk not allocated from this pool?",
            ));
        }
        let slab_id = u64::from_be_bytes(footer[8..16].try_into().unwrap());
        let class_index = (slab_id >> 32) as usize;
        let slab_index = (slab_id & 0xFFFF_FFFF) as usize;

        let class = self
            .classes
            .get(class_index)
            .ok_or(PoolError::BadChunk("chunk references an unknown size class"))?;
        if slab_index >= class.slab_count() {
            return Err(PoolError::BadChunk("chunk references an unknown slab"));
        }
        let slab = class.slab(slab_index);

        let underlying_capacity = chunk_capacity_view.len();
        let chunk_index =
            (slab.slab_size() + FOOTER_LEN - underlying_capacity) / slab.chunk_size();
        Ok((class_index, slab_index, chunk_index))
    }
}
