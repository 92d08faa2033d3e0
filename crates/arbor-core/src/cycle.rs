//! Trial deletion: the cycle collector.
//!
//! Scope is the nontrivial list only — trivial objects have no
//! outgoing edges and cannot participate in a cycle. The five phases
//! below are run in the order the design fixes (Copy, Internal-edge
//! subtract, Recover, Mark, Break-and-free); within Break-and-free the
//! two passes (break edges, then deallocate) must not be merged, since
//! the edge-breaking walk must never dereference an already-freed
//! header.

use crate::gc::Gc;
use crate::header::HeaderId;
use alloc::vec::Vec;

impl Gc {
    /// Runs trial deletion over the nontrivial list, then compacts the
    /// survivors into the other semispace. Not interruptible; cost is
    /// `O(R + E)` for the collection plus `O(L)` for compaction, where
    /// `R`/`E` are the nontrivial root and edge counts and `L` is live
    /// bytes.
    pub fn run_gc(&mut self) {
        tracing::debug!("run_gc: trial deletion");
        self.trial_deletion();
        tracing::debug!("run_gc: compaction");
        self.compact();
    }

    fn trial_deletion(&mut self) {
        let ids = self.pool.nontrivial_ids();

        // 1. Copy: shadow := ref_count, unreachable flag cleared.
        for &id in &ids {
            let rc = self.pool.get(id).ref_count;
            debug_assert!(rc >= 0, "ref_count went negative");
            let h = self.pool.get_mut(id);
            h.clear_unreachable();
            h.set_shadow(rc as u32);
        }

        // 2. Internal-edge subtract: each nontrivial incoming edge
        // removes one from the child's shadow count.
        for &id in &ids {
            let (payload, ops) = {
                let h = self.pool.get(id);
                (h.obj, h.ops.expect("nontrivial header missing ops"))
            };
            ops.visit(&self.arena, payload, &mut |child| {
                let ch = self.pool.get_mut(child);
                if ch.is_nontrivial() {
                    let shadow = ch.shadow();
                    ch.set_shadow(shadow.saturating_sub(1));
                }
            });
        }

        // 3. Recover: anything with residual shadow > 0 is externally
        // retained; transitively raise everything reachable from it.
        for &id in &ids {
            if self.pool.get(id).shadow() > 0 {
                self.recover(id);
            }
        }

        // 4. Mark: whatever is still at shadow zero is unreachable.
        for &id in &ids {
            if self.pool.get(id).shadow() == 0 {
                self.pool.get_mut(id).set_unreachable();
            }
        }

        // 5. Break-and-free, two passes.
        let unreachable: Vec<HeaderId> = ids
            .iter()
            .copied()
            .filter(|&id| self.pool.get(id).is_unreachable())
            .collect();

        for &id in &unreachable {
            let (payload, ops) = {
                let h = self.pool.get(id);
                (h.obj, h.ops.expect("unreachable header missing ops"))
            };
            let mut edges: Vec<HeaderId> = Vec::new();
            ops.visit(&self.arena, payload, &mut |child| edges.push(child));
            for child in edges {
                // Unreachable children are left alone here; their own
                // entry in `unreachable` frees them directly below,
                // without going through the normal unref cascade.
                if !self.pool.get(child).is_unreachable() {
                    self.unref_header(child);
                }
            }
        }

        for &id in &unreachable {
            self.pool.remove_nontrivial(id);
            self.pool.push_free(id);
            tracing::trace!(?id, "cycle-collected header");
        }
    }

    /// Transitively raises every nontrivial object reachable from
    /// `start` to shadow = 1, via an explicit worklist rather than
    /// native recursion (the reachable set from one retained root can
    /// be arbitrarily deep).
    fn recover(&mut self, start: HeaderId) {
        let mut worklist: Vec<HeaderId> = alloc::vec![start];
        while let Some(id) = worklist.pop() {
            let (payload, ops) = {
                let h = self.pool.get(id);
                (h.obj, h.ops.expect("recover on a header missing ops"))
            };
            let mut children: Vec<HeaderId> = Vec::new();
            ops.visit(&self.arena, payload, &mut |child| children.push(child));
            for child in children {
                let ch = self.pool.get_mut(child);
                if ch.is_nontrivial() && ch.shadow() == 0 {
                    ch.set_shadow(1);
                    worklist.push(child);
                }
            }
        }
    }
}

#[cfg(test)]
mod cycle_test;
