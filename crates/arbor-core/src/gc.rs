//! The top-level runtime: wires the arena and the header pool together
//! and exposes the external interface (lifecycle, allocation,
//! refcounting, collection, introspection).

use crate::addr::{roundup_aligned, Addr};
use crate::arena::Arena;
use crate::config::{ArenaConfig, GcConfig};
use crate::header::{GcHeader, HeaderId, HeaderPool, MAX_REF_COUNT, NONTRIVIAL_FLAG};
use crate::mem::MemorySpace;
use crate::ops::{ObjectOps, TRIVIAL_OPS};
use alloc::vec::Vec;

/// Owns the arena and the header pool for one runtime instance.
///
/// `Gc` is the process-wide state the spec describes: the header
/// pool, the three lists, the two bump cursors, and the semispace
/// identity. There is exactly one of these per runtime; it is
/// initialized once by [`Gc::init`] and torn down once by
/// [`Gc::free_memory`].
pub struct Gc {
    pub(crate) arena: Arena,
    pub(crate) pool: HeaderPool,
}

impl Gc {
    /// `init_memory` followed by `init_gc` from the external interface,
    /// combined into one call since the header pool cannot exist
    /// without an arena to eventually place other reserved-region
    /// structures in.
    ///
    /// # Panics
    /// Panics if either config fails validation, or if the host
    /// allocator refuses the arena's backing buffer.
    #[must_use]
    pub fn init(arena_config: &ArenaConfig, gc_config: &GcConfig) -> Self {
        gc_config.validate().expect("invalid GcConfig");
        let arena = Arena::init(arena_config);
        let pool = HeaderPool::new(gc_config.num_headers);
        Self { arena, pool }
    }

    /// Releases the arena's backing buffer. Consuming `self` means no
    /// further call on this instance is possible after teardown.
    pub fn free_memory(self) {
        drop(self);
    }

    #[must_use]
    pub fn stack_top(&self, i: usize) -> Addr {
        self.arena.stack_top(i)
    }

    #[must_use]
    pub fn stack_bottom(&self, i: usize) -> Addr {
        self.arena.stack_bottom(i)
    }

    /// Long-lived reserved-region allocation, for runtime structures
    /// that are neither task stacks nor GC-managed heap objects.
    pub fn alloc_reserved(&mut self, size: usize) -> Option<Addr> {
        self.arena.alloc_reserved(size)
    }

    #[must_use]
    pub fn in_use_count(&self) -> usize {
        self.pool.in_use_count()
    }

    #[must_use]
    pub fn heap_usage(&self) -> usize {
        self.arena.heap_usage()
    }

    /// Read-only view onto the arena's backing buffer, for object
    /// operators implemented by clients.
    #[must_use]
    pub fn mem(&self) -> &dyn MemorySpace {
        &self.arena
    }

    /// Mutable view onto the arena's backing buffer.
    pub fn mem_mut(&mut self) -> &mut dyn MemorySpace {
        &mut self.arena
    }

    /// `alloc_trivial(size)` with the canonical trivial operators.
    pub fn alloc_trivial(&mut self, size: usize) -> Option<HeaderId> {
        self.alloc_trivial_with_ops(size, &TRIVIAL_OPS)
    }

    /// `alloc_trivial(size, ops)`: a header placed on the trivial list
    /// regardless of what `ops` actually does. Per the open question
    /// in the design notes, list membership follows the allocator
    /// called, not the operators supplied.
    pub fn alloc_trivial_with_ops(
        &mut self,
        size: usize,
        ops: &'static dyn ObjectOps,
    ) -> Option<HeaderId> {
        self.alloc_common(size, ops, false)
    }

    /// `alloc_nontrivial(size, ops)`.
    pub fn alloc_nontrivial(
        &mut self,
        size: usize,
        ops: &'static dyn ObjectOps,
    ) -> Option<HeaderId> {
        self.alloc_common(size, ops, true)
    }

    fn alloc_common(
        &mut self,
        size: usize,
        ops: &'static dyn ObjectOps,
        nontrivial: bool,
    ) -> Option<HeaderId> {
        let id = self.pool.take_free()?;

        let Some(payload) = self.arena.alloc_heap(size) else {
            // Payload exhaustion: give the header back, so the caller
            // sees no side effect from a failed allocation.
            self.pool.push_free(id);
            tracing::warn!(size, "heap exhausted on alloc");
            return None;
        };

        self.arena.slice_mut(payload, roundup_aligned(size)).fill(0);

        {
            let h: &mut GcHeader = self.pool.get_mut(id);
            h.obj = payload;
            h.ops = Some(ops);
            h.ref_count = 1;
            h.meta_ref_count = if nontrivial { NONTRIVIAL_FLAG } else { 0 };
        }

        if nontrivial {
            self.pool.push_nontrivial(id);
        } else {
            self.pool.push_trivial(id);
        }

        tracing::trace!(?id, size, nontrivial, "allocated header");
        Some(id)
    }

    /// Returns the payload address and operators of a live header, for
    /// clients building their own typed accessors on top (e.g. the
    /// tuple container).
    #[must_use]
    pub fn payload(&self, id: HeaderId) -> (Addr, &'static dyn ObjectOps) {
        let h = self.pool.get(id);
        (h.obj, h.ops.expect("payload() called on a freed header"))
    }

    #[must_use]
    pub fn ref_count(&self, id: HeaderId) -> i32 {
        self.pool.get(id).ref_count
    }

    /// Increments `h.ref_count`.
    ///
    /// # Panics
    /// Panics if the count would reach `2^28` — per the error model,
    /// this is a programming error, not a recoverable condition.
    pub fn ref_header(&mut self, id: HeaderId) {
        let h = self.pool.get_mut(id);
        h.ref_count += 1;
        assert!(
            h.ref_count < MAX_REF_COUNT,
            "ref_count overflow: header reached the {MAX_REF_COUNT} ceiling"
        );
    }

    /// Decrements `h.ref_count`; at zero, transitively releases every
    /// managed child via an explicit worklist (never native recursion,
    /// so long reference chains can't blow the call stack).
    ///
    /// # Panics
    /// Panics if `h.ref_count` is already zero — unref-at-zero is a
    /// programming error per the error model.
    pub fn unref_header(&mut self, id: HeaderId) {
        {
            let h = self.pool.get_mut(id);
            assert!(h.ref_count > 0, "unref at zero");
            h.ref_count -= 1;
            if h.ref_count != 0 {
                return;
            }
        }
        self.release(id);
    }

    fn release(&mut self, root: HeaderId) {
        let mut worklist: Vec<HeaderId> = alloc::vec![root];
        while let Some(id) = worklist.pop() {
            let h = self.pool.get(id);
            let ops = h.ops.expect("release() called on a freed header");
            let payload = h.obj;
            let nontrivial = h.is_nontrivial();

            if nontrivial {
                self.pool.remove_nontrivial(id);
            } else {
                self.pool.remove_trivial(id);
            }

            let mut children: Vec<HeaderId> = Vec::new();
            ops.visit(&self.arena, payload, &mut |child| children.push(child));

            for child in children {
                let ch = self.pool.get_mut(child);
                assert!(ch.ref_count > 0, "unref at zero while releasing a parent's child");
                ch.ref_count -= 1;
                if ch.ref_count == 0 {
                    worklist.push(child);
                }
            }

            self.pool.push_free(id);
            tracing::trace!(?id, "freed header");
        }
    }
}

#[cfg(test)]
mod gc_test;
