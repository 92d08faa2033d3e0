//! A minimal two-slot nontrivial object, used only by this crate's own
//! cycle-collector and compactor tests so they don't need to depend on
//! the tuple container crate built on top of this one.

use crate::gc::Gc;
use crate::header::HeaderId;
use crate::mem::{read_value, write_value, MemorySpace};
use crate::ops::ObjectOps;
use crate::addr::Addr;

#[derive(Clone, Copy)]
#[repr(C)]
struct RawPair {
    slot0: u64,
    slot1: u64,
    mask: u8,
}

pub(crate) struct PairOps;
pub(crate) static PAIR_OPS: PairOps = PairOps;

impl ObjectOps for PairOps {
    fn bytes(&self, _mem: &dyn MemorySpace, _payload: Addr) -> usize {
        core::mem::size_of::<RawPair>()
    }

    fn visit(&self, mem: &dyn MemorySpace, payload: Addr, f: &mut dyn FnMut(HeaderId)) {
        let raw: RawPair = read_value(mem, payload);
        if raw.mask & 0b01 != 0 {
            f(HeaderId::from_raw(raw.slot0 as u32));
        }
        if raw.mask & 0b10 != 0 {
            f(HeaderId::from_raw(raw.slot1 as u32));
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) enum Slot {
    Trivial(u64),
    Managed(HeaderId),
}

pub(crate) fn alloc_pair(gc: &mut Gc) -> HeaderId {
    gc.alloc_nontrivial(core::mem::size_of::<RawPair>(), &PAIR_OPS)
        .expect("test pair allocation should not fail")
}

pub(crate) fn set_slot(gc: &mut Gc, id: HeaderId, index: usize, new: Slot) {
    let (payload, _) = gc.payload(id);
    let mut raw: RawPair = read_value(gc.mem(), payload);
    let bit = 1u8 << index;

    if let Slot::Managed(h) = new {
        gc.ref_header(h);
    }

    let old_managed = raw.mask & bit != 0;
    let old_value = if index == 0 { raw.slot0 } else { raw.slot1 };

    match new {
        Slot::Trivial(v) => {
            if index == 0 {
                raw.slot0 = v;
            } else {
                raw.slot1 = v;
            }
            raw.mask &= !bit;
        }
        Slot::Managed(h) => {
            let v = u64::from(h.as_raw());
            if index == 0 {
                raw.slot0 = v;
            } else {
                raw.slot1 = v;
            }
            raw.mask |= bit;
        }
    }

    write_value(gc.mem_mut(), payload, raw);

    if old_managed {
        gc.unref_header(HeaderId::from_raw(old_value as u32));
    }
}

pub(crate) fn get_slot(gc: &Gc, id: HeaderId, index: usize) -> Slot {
    let (payload, _) = gc.payload(id);
    let raw: RawPair = read_value(gc.mem(), payload);
    let bit = 1u8 << index;
    let value = if index == 0 { raw.slot0 } else { raw.slot1 };
    if raw.mask & bit != 0 {
        Slot::Managed(HeaderId::from_raw(value as u32))
    } else {
        Slot::Trivial(value)
    }
}
