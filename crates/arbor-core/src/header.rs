//! The fixed-size pool of out-of-band GC headers.
//!
//! A header owns exactly one heap payload and sits on exactly one of
//! three lists: free, trivial, or nontrivial. The pool is allocated
//! once at [`crate::gc::Gc::init`] and never grows; headers are
//! recycled through the free list for the lifetime of the runtime.

use crate::addr::Addr;
use crate::ops::ObjectOps;
use alloc::vec::Vec;

/// High bit of `meta_ref_count`: set while the header is on the
/// nontrivial list, clear while on the trivial list. Meaningless while
/// the header is free.
pub(crate) const NONTRIVIAL_FLAG: u32 = 1 << 31;
/// Next bit of `meta_ref_count`: set by the cycle collector's Mark
/// phase once a header is known unreachable.
pub(crate) const UNREACHABLE_FLAG: u32 = 1 << 30;
/// Remaining bits of `meta_ref_count`: the cycle collector's shadow
/// count, meaningless outside a collection pass.
pub(crate) const SHADOW_MASK: u32 = !(NONTRIVIAL_FLAG | UNREACHABLE_FLAG);

/// Ceiling on `ref_count`, matching the original runtime's 28-bit
/// incoming-edge budget. `ref` past this is a programming error.
pub const MAX_REF_COUNT: i32 = 1 << 28;

/// Stable handle to a GC header. Survives compaction (only the
/// header's `obj` field changes); invalidated once the header is
/// freed and its slot recycled.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct HeaderId(u32);

impl HeaderId {
    fn idx(self) -> usize {
        self.0 as usize
    }

    /// Encodes this handle as a raw `u32`, suitable for storing inside a
    /// managed slot's raw word alongside trivial (non-managed) values.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Reconstructs a handle from a raw `u32` previously produced by
    /// [`Self::as_raw`]. Does not itself validate that the id is live;
    /// callers must only round-trip ids obtained from this pool.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

pub(crate) struct GcHeader {
    pub(crate) obj: Addr,
    pub(crate) ops: Option<&'static dyn ObjectOps>,
    pub(crate) ref_count: i32,
    pub(crate) meta_ref_count: u32,
    /// Index of this header within whichever list (free/trivial/nontrivial)
    /// it currently occupies. Enables O(1) removal via `swap_remove`.
    pos: u32,
}

impl GcHeader {
    const fn empty() -> Self {
        Self {
            obj: Addr::ZERO,
            ops: None,
            ref_count: 0,
            meta_ref_count: 0,
            pos: 0,
        }
    }

    pub(crate) fn is_nontrivial(&self) -> bool {
        self.meta_ref_count & NONTRIVIAL_FLAG != 0
    }

    pub(crate) fn is_unreachable(&self) -> bool {
        self.meta_ref_count & UNREACHABLE_FLAG != 0
    }

    pub(crate) fn shadow(&self) -> u32 {
        self.meta_ref_count & SHADOW_MASK
    }

    pub(crate) fn set_shadow(&mut self, value: u32) {
        assert!(value & !SHADOW_MASK == 0, "shadow count overflowed its field");
        self.meta_ref_count = (self.meta_ref_count & !SHADOW_MASK) | value;
    }

    pub(crate) fn set_unreachable(&mut self) {
        self.meta_ref_count |= UNREACHABLE_FLAG;
    }

    pub(crate) fn clear_unreachable(&mut self) {
        self.meta_ref_count &= !UNREACHABLE_FLAG;
    }
}

/// The pool of headers plus the three lists they live on.
pub(crate) struct HeaderPool {
    headers: Vec<GcHeader>,
    free: Vec<HeaderId>,
    trivial: Vec<HeaderId>,
    nontrivial: Vec<HeaderId>,
}

impl HeaderPool {
    pub(crate) fn new(num_headers: usize) -> Self {
        let mut headers = Vec::with_capacity(num_headers);
        let mut free = Vec::with_capacity(num_headers);
        for i in 0..num_headers {
            headers.push(GcHeader::empty());
            free.push(HeaderId(i as u32));
        }
        // free list order doesn't matter for correctness; reverse so
        // id 0 is handed out first, matching intuitive allocation order.
        free.reverse();
        Self {
            headers,
            free,
            trivial: Vec::new(),
            nontrivial: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.headers.len()
    }

    pub(crate) fn in_use_count(&self) -> usize {
        self.trivial.len() + self.nontrivial.len()
    }

    pub(crate) fn get(&self, id: HeaderId) -> &GcHeader {
        &self.headers[id.idx()]
    }

    pub(crate) fn get_mut(&mut self, id: HeaderId) -> &mut GcHeader {
        &mut self.headers[id.idx()]
    }

    /// Snapshot of every header currently on the trivial list, in
    /// stored order. The cycle collector and compactor only read this
    /// list; taking a snapshot sidesteps aliasing between list
    /// iteration and list mutation during `visit` callbacks.
    pub(crate) fn trivial_ids(&self) -> Vec<HeaderId> {
        self.trivial.clone()
    }

    pub(crate) fn nontrivial_ids(&self) -> Vec<HeaderId> {
        self.nontrivial.clone()
    }

    /// Detaches the first free header, if any. The header's fields are
    /// still zeroed/empty; the caller is responsible for populating
    /// `obj`/`ops`/`ref_count` and pushing it onto a roots list.
    pub(crate) fn take_free(&mut self) -> Option<HeaderId> {
        self.free.pop()
    }

    pub(crate) fn push_trivial(&mut self, id: HeaderId) {
        self.headers[id.idx()].pos = self.trivial.len() as u32;
        self.trivial.push(id);
    }

    pub(crate) fn push_nontrivial(&mut self, id: HeaderId) {
        self.headers[id.idx()].pos = self.nontrivial.len() as u32;
        self.nontrivial.push(id);
    }

    /// Removes `id` from the trivial list, where it is asserted to be.
    pub(crate) fn remove_trivial(&mut self, id: HeaderId) {
        Self::swap_remove(&mut self.trivial, &mut self.headers, id);
    }

    /// Removes `id` from the nontrivial list, where it is asserted to be.
    pub(crate) fn remove_nontrivial(&mut self, id: HeaderId) {
        Self::swap_remove(&mut self.nontrivial, &mut self.headers, id);
    }

    fn swap_remove(list: &mut Vec<HeaderId>, headers: &mut [GcHeader], id: HeaderId) {
        let pos = headers[id.idx()].pos as usize;
        debug_assert_eq!(list[pos], id, "header's recorded list position is stale");
        list.swap_remove(pos);
        if let Some(&moved) = list.get(pos) {
            headers[moved.idx()].pos = pos as u32;
        }
    }

    /// Returns a header to the free list, clearing every field that
    /// carried meaning while it was live.
    pub(crate) fn push_free(&mut self, id: HeaderId) {
        let h = &mut self.headers[id.idx()];
        h.obj = Addr::ZERO;
        h.ops = None;
        h.ref_count = 0;
        h.meta_ref_count = 0;
        h.pos = 0;
        self.free.push(id);
    }
}

#[cfg(test)]
mod header_test;
