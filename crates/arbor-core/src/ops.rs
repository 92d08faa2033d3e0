//! The object operators vtable.
//!
//! Every payload kind the GC touches — trivial boxed words and any
//! client-defined nontrivial compound object such as a tuple — is
//! described by one of these. The GC never interprets payload bytes
//! itself; it only calls `bytes` and `visit`.

use crate::header::HeaderId;
use crate::mem::MemorySpace;
use crate::addr::Addr;
use core::mem::size_of;

/// Per-kind descriptor: payload size and child traversal.
///
/// Implementations are expected to be `'static` singletons (one
/// instance per object kind, shared across every header of that
/// kind), since a header only stores a `&'static dyn ObjectOps`.
pub trait ObjectOps {
    /// Current payload size in bytes, read from the payload itself
    /// (variable-size objects like tuples derive it from their own
    /// length field rather than it being fixed per kind).
    fn bytes(&self, mem: &dyn MemorySpace, payload: Addr) -> usize;

    /// Invokes `f` once for each managed child reachable one hop from
    /// `payload`. Trivial slots are skipped. Iteration order does not
    /// matter to any caller in this crate.
    fn visit(&self, mem: &dyn MemorySpace, payload: Addr, f: &mut dyn FnMut(HeaderId));
}

/// A single machine word: the payload of every trivial (boxed
/// primitive) object. Trivial objects never have managed children.
pub struct TrivialOps;

/// The one shared instance of [`TrivialOps`]. Every trivial allocation
/// without client-supplied operators uses this.
pub static TRIVIAL_OPS: TrivialOps = TrivialOps;

impl ObjectOps for TrivialOps {
    fn bytes(&self, _mem: &dyn MemorySpace, _payload: Addr) -> usize {
        size_of::<u64>()
    }

    fn visit(&self, _mem: &dyn MemorySpace, _payload: Addr, _f: &mut dyn FnMut(HeaderId)) {
        // A boxed word has no outgoing edges.
    }
}

#[cfg(test)]
mod ops_test;
