use super::*;

#[test]
fn new_pool_hands_out_every_header_before_exhausting() {
    let mut pool = HeaderPool::new(3);
    assert_eq!(pool.capacity(), 3);
    assert_eq!(pool.in_use_count(), 0);

    let a = pool.take_free().expect("first header");
    let b = pool.take_free().expect("second header");
    let c = pool.take_free().expect("third header");
    assert!(pool.take_free().is_none(), "pool should be exhausted");

    pool.push_free(a);
    pool.push_free(b);
    pool.push_free(c);
}

#[test]
fn push_and_remove_trivial_keeps_positions_consistent() {
    let mut pool = HeaderPool::new(4);
    let ids: Vec<HeaderId> = (0..4).map(|_| pool.take_free().unwrap()).collect();
    for &id in &ids {
        pool.push_trivial(id);
    }
    assert_eq!(pool.in_use_count(), 4);

    // Remove a middle element; the swap-remove must fix up whichever
    // header took its place so a later removal doesn't double-free.
    pool.remove_trivial(ids[1]);
    assert_eq!(pool.trivial_ids().len(), 3);
    assert!(!pool.trivial_ids().contains(&ids[1]));

    pool.remove_trivial(ids[0]);
    pool.remove_trivial(ids[2]);
    pool.remove_trivial(ids[3]);
    assert_eq!(pool.in_use_count(), 0);
}

#[test]
fn nontrivial_flag_round_trips_through_shadow_helpers() {
    let mut pool = HeaderPool::new(1);
    let id = pool.take_free().unwrap();
    {
        let h = pool.get_mut(id);
        h.meta_ref_count = NONTRIVIAL_FLAG;
        h.ref_count = 5;
    }
    pool.push_nontrivial(id);

    let h = pool.get_mut(id);
    assert!(h.is_nontrivial());
    assert!(!h.is_unreachable());
    h.set_shadow(h.ref_count as u32);
    assert_eq!(h.shadow(), 5);
    h.set_unreachable();
    assert!(h.is_unreachable());
    assert!(h.is_nontrivial(), "unreachable flag must not clobber the nontrivial flag");
    h.clear_unreachable();
    assert!(!h.is_unreachable());
}

#[test]
fn push_free_clears_every_field() {
    let mut pool = HeaderPool::new(1);
    let id = pool.take_free().unwrap();
    {
        let h = pool.get_mut(id);
        h.obj = Addr::new(64);
        h.ref_count = 3;
        h.meta_ref_count = NONTRIVIAL_FLAG | 7;
    }
    pool.push_free(id);
    let h = pool.get(id);
    assert_eq!(h.obj, Addr::ZERO);
    assert_eq!(h.ref_count, 0);
    assert_eq!(h.meta_ref_count, 0);
}

#[test]
fn header_id_raw_round_trip() {
    let id = HeaderId::from_raw(42);
    assert_eq!(id.as_raw(), 42);
}
