//! Fixed-arity managed tuple: the canonical nontrivial compound object.
//!
//! Stored in memory as:
//! - 8 bytes: element count (`num`)
//! - 8 bytes: managed-slot bitmask (`gc_mask`, bit `i` set means slot
//!   `i` holds a [`HeaderId`] rather than a raw trivial word)
//! - `num * 8` bytes: the slots themselves

use arbor_core::{read_value, write_value, Addr, Gc, HeaderId, MemorySpace, ObjectOps};

/// Tuples top out at 64 slots: `gc_mask` is a single `u64` bitmask, one
/// bit per slot, the same limit the layout this is grounded on uses.
pub const MAX_ARITY: usize = 64;

#[repr(C)]
#[derive(Clone, Copy)]
struct Header {
    num: u64,
    gc_mask: u64,
}

const HEADER_SIZE: usize = core::mem::size_of::<Header>();

/// One tuple slot: either a trivial 64-bit word or a managed reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TupleValue {
    Trivial(u64),
    Managed(HeaderId),
}

fn slot_addr(payload: Addr, i: usize) -> Addr {
    payload.add((HEADER_SIZE + i * 8) as u64)
}

fn read_header(mem: &dyn MemorySpace, payload: Addr) -> Header {
    read_value(mem, payload)
}

fn write_header(mem: &mut dyn MemorySpace, payload: Addr, header: Header) {
    write_value(mem, payload, header);
}

/// The [`ObjectOps`] implementation shared by every tuple, regardless
/// of arity: arity and the managed-slot mask both live in the payload
/// itself, so one singleton instance covers every tuple ever allocated.
pub struct TupleOps;

/// The one shared instance of [`TupleOps`].
pub static TUPLE_OPS: TupleOps = TupleOps;

impl ObjectOps for TupleOps {
    fn bytes(&self, mem: &dyn MemorySpace, payload: Addr) -> usize {
        let header = read_header(mem, payload);
        HEADER_SIZE + header.num as usize * 8
    }

    fn visit(&self, mem: &dyn MemorySpace, payload: Addr, f: &mut dyn FnMut(HeaderId)) {
        let header = read_header(mem, payload);
        for i in 0..header.num as usize {
            if header.gc_mask & (1 << i) != 0 {
                let raw: u64 = read_value(mem, slot_addr(payload, i));
                f(HeaderId::from_raw(raw as u32));
            }
        }
    }
}

/// Allocates a tuple of `num` slots, every slot initially `Trivial(0)`.
///
/// # Panics
/// Panics if `num` exceeds [`MAX_ARITY`], or if the heap cannot fit
/// the tuple.
pub fn alloc_tuple(gc: &mut Gc, num: usize) -> HeaderId {
    assert!(num <= MAX_ARITY, "tuple arity exceeds the gc_mask's 64 bits");
    let id = gc
        .alloc_nontrivial(HEADER_SIZE + num * 8, &TUPLE_OPS)
        .expect("tuple allocation should not fail under normal heap pressure");
    let (payload, _) = gc.payload(id);
    write_header(
        gc.mem_mut(),
        payload,
        Header {
            num: num as u64,
            gc_mask: 0,
        },
    );
    id
}

/// Number of slots in the tuple at `id`.
#[must_use]
pub fn tuple_len(gc: &Gc, id: HeaderId) -> usize {
    let (payload, _) = gc.payload(id);
    read_header(gc.mem(), payload).num as usize
}

/// Reads slot `i`.
///
/// # Panics
/// Panics if `i >= tuple_len(gc, id)`.
#[must_use]
pub fn get_tuple_at(gc: &Gc, id: HeaderId, i: usize) -> TupleValue {
    let (payload, _) = gc.payload(id);
    let header = read_header(gc.mem(), payload);
    assert!((i as u64) < header.num, "tuple index out of range");
    let raw: u64 = read_value(gc.mem(), slot_addr(payload, i));
    if header.gc_mask & (1 << i) != 0 {
        TupleValue::Managed(HeaderId::from_raw(raw as u32))
    } else {
        TupleValue::Trivial(raw)
    }
}

/// Writes slot `i`.
///
/// Unlike the layout this is grounded on, overwriting a managed slot
/// always unrefs the value it displaces: a write that merely replaced
/// the bitmask bit without releasing the old reference would leak
/// every tuple slot ever reassigned.
///
/// # Panics
/// Panics if `i >= tuple_len(gc, id)`.
pub fn set_tuple_at(gc: &mut Gc, id: HeaderId, i: usize, value: TupleValue) {
    let (payload, _) = gc.payload(id);
    let mut header = read_header(gc.mem(), payload);
    assert!((i as u64) < header.num, "tuple index out of range");

    let bit = 1u64 << i;
    let old_managed = header.gc_mask & bit != 0;
    let old_raw: u64 = read_value(gc.mem(), slot_addr(payload, i));

    if let TupleValue::Managed(h) = value {
        gc.ref_header(h);
    }

    let new_raw = match value {
        TupleValue::Trivial(v) => {
            header.gc_mask &= !bit;
            v
        }
        TupleValue::Managed(h) => {
            header.gc_mask |= bit;
            u64::from(h.as_raw())
        }
    };

    write_header(gc.mem_mut(), payload, header);
    write_value(gc.mem_mut(), slot_addr(payload, i), new_raw);

    if old_managed {
        gc.unref_header(HeaderId::from_raw(old_raw as u32));
    }
}

#[cfg(test)]
mod tuple_test;
