use super::*;

#[test]
fn diff_is_zero_for_equal_addrs() {
    let a = Addr::new(128);
    assert_eq!(a.diff(a), 0);
}

#[test]
fn add_and_diff_round_trip() {
    let base = Addr::new(64);
    let advanced = base.add(40);
    assert_eq!(advanced.diff(base), 40);
}

#[test]
fn align_up_rounds_to_next_multiple() {
    assert_eq!(Addr::new(1).align_up(8), Some(Addr::new(8)));
    assert_eq!(Addr::new(8).align_up(8), Some(Addr::new(8)));
    assert_eq!(Addr::new(9).align_up(8), Some(Addr::new(16)));
}

#[test]
fn align_up_rejects_non_power_of_two() {
    assert_eq!(Addr::new(9).align_up(3), None);
}

#[test]
fn is_aligned_checks_power_of_two_boundary() {
    assert!(Addr::new(16).is_aligned(8));
    assert!(!Addr::new(12).is_aligned(8));
}

#[test]
fn debug_and_display_use_hex() {
    let a = Addr::new(0xff);
    assert_eq!(format!("{a:?}"), "Addr(0xff)");
    assert_eq!(format!("{a}"), "0xff");
}

#[test]
fn roundup_aligned_handles_zero_and_multiples() {
    assert_eq!(roundup_aligned(0), 0);
    assert_eq!(roundup_aligned(1), 8);
    assert_eq!(roundup_aligned(8), 8);
    assert_eq!(roundup_aligned(9), 16);
}
