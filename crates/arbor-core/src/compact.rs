//! The compactor: evacuates every live payload into the currently
//! inactive semispace.
//!
//! Header addresses never move — only `obj` changes. Managed children
//! are referenced by header id, not payload address, so compaction
//! never needs to fix up payload contents, only the header's own
//! pointer into the heap.

use crate::gc::Gc;
use crate::mem::MemorySpace;

impl Gc {
    pub(crate) fn compact(&mut self) {
        self.arena.swap_semispaces();

        // Trivial list first, then nontrivial, matching the order the
        // design fixes (not load-bearing for correctness, since the
        // two lists are disjoint and each header's own address is
        // independent of iteration order).
        let ids = self
            .pool
            .trivial_ids()
            .into_iter()
            .chain(self.pool.nontrivial_ids());

        for id in ids {
            let (old_payload, ops) = {
                let h = self.pool.get(id);
                (h.obj, h.ops.expect("compacted header missing ops"))
            };
            let size = ops.bytes(&self.arena, old_payload);
            let new_payload = self
                .arena
                .alloc_heap(size)
                .expect("compaction must fit every live object into the fresh semispace");
            self.arena.copy_within(old_payload, new_payload, size);
            self.pool.get_mut(id).obj = new_payload;
        }

        tracing::debug!(
            heap_usage = self.arena.heap_usage(),
            in_use = self.pool.in_use_count(),
            "compaction complete"
        );
    }
}

#[cfg(test)]
mod compact_test;
