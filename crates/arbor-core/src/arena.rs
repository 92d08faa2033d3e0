//! The arena: one contiguous backing buffer carved into the reserved
//! region, the task-stack slots, and two heap semispaces.
//!
//! The arena itself tracks only bump cursors; it has no notion of
//! headers, refcounts, or object kinds. Everything above this layer
//! is built out of [`Addr`] offsets into a single buffer.

use crate::addr::{roundup_aligned, Addr};
use crate::config::ArenaConfig;
use crate::mem::MemorySpace;
use alloc::vec;
use alloc::vec::Vec;

pub struct Arena {
    buf: Vec<u8>,

    reserved_base: Addr,
    reserved_cur: Addr,
    reserved_end: Addr,

    stacks_base: Addr,
    per_stack_size: usize,
    num_stacks: usize,

    /// Base of semispace A and semispace B; `active_is_a` selects which
    /// one is currently the "from" space that `alloc_heap` bumps into.
    heap_a_base: Addr,
    heap_b_base: Addr,
    heap_size: usize,
    active_is_a: bool,

    heap_cur: Addr,
    heap_end: Addr,
}

impl Arena {
    /// Allocates the single backing buffer and computes segment bases.
    /// All four segment sizes are rounded up to a multiple of 8, as is
    /// the arena's own base (trivially true for a freshly allocated
    /// `Vec<u8>`, which `alloc` returns at least 8-byte aligned).
    ///
    /// # Panics
    /// Panics if the host allocator refuses the request (per the
    /// crate's error model, host-allocator failure in arena
    /// initialization is a fatal abort, not a recoverable error).
    #[must_use]
    pub fn init(config: &ArenaConfig) -> Self {
        config.validate().expect("invalid ArenaConfig");

        let reserved_size = roundup_aligned(config.reserved_size);
        let per_stack_size = roundup_aligned(config.per_stack_size);
        let heap_size = roundup_aligned(config.heap_size);
        let num_stacks = config.num_stacks;

        let reserved_base = Addr::ZERO;
        let stacks_base = reserved_base.add(reserved_size as u64);
        let heap_a_base = stacks_base.add((per_stack_size * num_stacks) as u64);
        let heap_b_base = heap_a_base.add(heap_size as u64);
        let total = heap_b_base.add(heap_size as u64).as_usize();

        let buf = vec![0u8; total];

        Self {
            buf,
            reserved_base,
            reserved_cur: reserved_base,
            reserved_end: stacks_base,
            stacks_base,
            per_stack_size,
            num_stacks,
            heap_a_base,
            heap_b_base,
            heap_size,
            active_is_a: true,
            heap_cur: heap_a_base,
            heap_end: heap_a_base.add(heap_size as u64),
        }
    }

    /// Releases the backing buffer. Consuming `self` makes further
    /// arena calls a compile error rather than a runtime one.
    pub fn teardown(self) {
        drop(self);
    }

    fn active_base(&self) -> Addr {
        if self.active_is_a {
            self.heap_a_base
        } else {
            self.heap_b_base
        }
    }

    fn inactive_base(&self) -> Addr {
        if self.active_is_a {
            self.heap_b_base
        } else {
            self.heap_a_base
        }
    }

    /// Inclusive-high address of stack `i` (stacks grow downward).
    ///
    /// # Panics
    /// Panics if `i >= num_stacks`.
    #[must_use]
    pub fn stack_top(&self, i: usize) -> Addr {
        assert!(i < self.num_stacks, "stack index out of range");
        self.stacks_base
            .add(((i + 1) * self.per_stack_size) as u64)
            .sub(1)
    }

    /// Inclusive-low address of stack `i`.
    ///
    /// # Panics
    /// Panics if `i >= num_stacks`.
    #[must_use]
    pub fn stack_bottom(&self, i: usize) -> Addr {
        assert!(i < self.num_stacks, "stack index out of range");
        self.stacks_base.add((i * self.per_stack_size) as u64)
    }

    /// Bump-allocates `size` bytes from the reserved region.
    ///
    /// Returns `None` on exhaustion; the crate's error model treats
    /// post-init reserved exhaustion as recoverable for the caller to
    /// decide (only exhaustion *during* `init_gc` is a fatal abort,
    /// and that distinction is the GC layer's responsibility, not the
    /// arena's).
    pub fn alloc_reserved(&mut self, size: usize) -> Option<Addr> {
        let size = roundup_aligned(size);
        let next = self.reserved_cur.add(size as u64);
        if next > self.reserved_end {
            return None;
        }
        let addr = self.reserved_cur;
        self.reserved_cur = next;
        Some(addr)
    }

    /// Bump-allocates `size` bytes from the active semispace.
    pub fn alloc_heap(&mut self, size: usize) -> Option<Addr> {
        let size = roundup_aligned(size);
        let next = self.heap_cur.add(size as u64);
        if next > self.heap_end {
            return None;
        }
        let addr = self.heap_cur;
        self.heap_cur = next;
        Some(addr)
    }

    /// Bytes advanced in the active semispace since the last swap.
    #[must_use]
    pub fn heap_usage(&self) -> usize {
        self.heap_cur.diff(self.active_base()) as usize
    }

    /// Exchanges the active/inactive semispace roles and resets the
    /// heap bump cursor to the base of the newly active (previously
    /// inactive) space. Exposed only to the GC; clients never call
    /// this directly.
    pub(crate) fn swap_semispaces(&mut self) {
        self.active_is_a = !self.active_is_a;
        let base = self.active_base();
        self.heap_cur = base;
        self.heap_end = base.add(self.heap_size as u64);
    }

    #[cfg(test)]
    pub(crate) fn inactive_base_for_test(&self) -> Addr {
        self.inactive_base()
    }

    #[cfg(test)]
    pub(crate) fn active_base_for_test(&self) -> Addr {
        self.active_base()
    }
}

impl MemorySpace for Arena {
    fn slice(&self, addr: Addr, len: usize) -> &[u8] {
        let start = addr.as_usize();
        &self.buf[start..start + len]
    }

    fn slice_mut(&mut self, addr: Addr, len: usize) -> &mut [u8] {
        let start = addr.as_usize();
        &mut self.buf[start..start + len]
    }

    fn copy_within(&mut self, src: Addr, dst: Addr, len: usize) {
        let src_start = src.as_usize();
        let dst_start = dst.as_usize();
        assert!(src_start + len <= self.buf.len(), "copy_within: src out of bounds");
        assert!(dst_start + len <= self.buf.len(), "copy_within: dst out of bounds");
        assert!(
            src_start + len <= dst_start || dst_start + len <= src_start,
            "copy_within: ranges overlap"
        );
        // SAFETY: bounds-checked above, and the non-overlap assertion
        // above lets us take two disjoint pointers into the same Vec.
        unsafe {
            let base = self.buf.as_mut_ptr();
            let src_ptr = base.add(src_start);
            let dst_ptr = base.add(dst_start);
            core::ptr::copy_nonoverlapping(src_ptr, dst_ptr, len);
        }
    }
}

#[cfg(test)]
mod arena_test;
