use super::*;

fn arena_cfg() -> ArenaConfig {
    ArenaConfig {
        reserved_size: 4096,
        per_stack_size: 1024,
        num_stacks: 4,
        heap_size: 8192,
    }
}

#[test]
fn valid_arena_config_passes() {
    assert!(arena_cfg().validate().is_ok());
}

#[test]
fn zero_reserved_size_rejected() {
    let cfg = ArenaConfig {
        reserved_size: 0,
        ..arena_cfg()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::ZeroSize("reserved_size")));
}

#[test]
fn zero_stack_size_rejected_only_when_stacks_requested() {
    let cfg = ArenaConfig {
        per_stack_size: 0,
        num_stacks: 0,
        ..arena_cfg()
    };
    assert!(cfg.validate().is_ok());

    let cfg = ArenaConfig {
        per_stack_size: 0,
        num_stacks: 1,
        ..arena_cfg()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::ZeroSize("per_stack_size")));
}

#[test]
fn zero_heap_size_rejected() {
    let cfg = ArenaConfig {
        heap_size: 0,
        ..arena_cfg()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::ZeroSize("heap_size")));
}

#[test]
fn total_bytes_rounds_every_segment_up_to_eight() {
    let cfg = ArenaConfig {
        reserved_size: 1,
        per_stack_size: 1,
        num_stacks: 2,
        heap_size: 1,
    };
    // reserved: 8, stacks: 8*2=16, heaps: 8*2=16 -> 40
    assert_eq!(cfg.total_bytes(), 8 + 16 + 16);
}

#[test]
fn gc_config_rejects_zero_headers() {
    let cfg = GcConfig { num_headers: 0 };
    assert_eq!(cfg.validate(), Err(ConfigError::ZeroSize("num_headers")));
}
