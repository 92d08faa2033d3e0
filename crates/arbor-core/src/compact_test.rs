use super::*;
use crate::config::{ArenaConfig, GcConfig};
use crate::mem::read_value;
use crate::test_support::{alloc_pair, set_slot, Slot};

fn small_gc(num_headers: usize, heap_size: usize) -> Gc {
    Gc::init(
        &ArenaConfig {
            reserved_size: 64,
            per_stack_size: 0,
            num_stacks: 0,
            heap_size,
        },
        &GcConfig { num_headers },
    )
}

#[test]
fn compaction_preserves_trivial_payload_contents() {
    let mut gc = small_gc(4, 256);
    let h = gc.alloc_trivial(8).expect("alloc should fit");
    let (payload, _) = gc.payload(h);
    crate::mem::write_value(gc.mem_mut(), payload, 0xabcd_ef01_u64);

    gc.compact();

    let (new_payload, _) = gc.payload(h);
    let v: u64 = read_value(gc.mem(), new_payload);
    assert_eq!(v, 0xabcd_ef01);
}

#[test]
fn compaction_moves_live_payloads_into_the_other_semispace() {
    let mut gc = small_gc(4, 256);
    let h = gc.alloc_trivial(8).expect("alloc should fit");
    let before = gc.payload(h).0;

    gc.compact();

    let after = gc.payload(h).0;
    assert_ne!(before, after, "compaction must relocate every live payload");
}

#[test]
fn compaction_preserves_graph_edges_between_nontrivial_objects() {
    let mut gc = small_gc(4, 256);
    let a = alloc_pair(&mut gc);
    let b = alloc_pair(&mut gc);
    set_slot(&mut gc, a, 0, Slot::Managed(b));

    gc.compact();

    match crate::test_support::get_slot(&gc, a, 0) {
        Slot::Managed(child) => assert_eq!(child, b, "edges must survive relocation"),
        Slot::Trivial(_) => panic!("expected a managed slot to survive compaction"),
    }

    gc.unref_header(a);
    gc.unref_header(b);
    gc.run_gc();
    assert_eq!(gc.in_use_count(), 0);
}

#[test]
fn run_gc_compacts_after_collecting_garbage() {
    let mut gc = small_gc(8, 1024);
    let a = alloc_pair(&mut gc);
    let b = alloc_pair(&mut gc);
    set_slot(&mut gc, a, 0, Slot::Managed(b));

    let garbage = alloc_pair(&mut gc);
    gc.unref_header(garbage);

    gc.run_gc();
    assert_eq!(gc.in_use_count(), 2, "only the reachable pair should remain");

    gc.unref_header(a);
    gc.unref_header(b);
    gc.run_gc();
    assert_eq!(gc.in_use_count(), 0);
}
