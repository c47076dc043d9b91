//! Routing scenarios: hot-class affinity, slow-path fallback, large objects.

use classalloc::{ClassAllocator, PoolConfig, Route, HEADER_SIZE};

fn allocator() -> ClassAllocator {
    ClassAllocator::new(
        PoolConfig::default()
            .with_initial_blocks(32)
            .with_growth_blocks(32),
    )
    .unwrap()
}

#[test]
fn reference_scenario() {
    let mut a = allocator();
    let before = a.statistics();

    let small = a.allocate(20).unwrap();
    assert_eq!(small.route(), Route::Class(0));
    let medium = a.allocate(40).unwrap();
    assert_eq!(medium.route(), Route::Class(1));

    let pooled = a.statistics();
    let big = a.allocate(2000).unwrap();
    assert_eq!(big.route(), Route::Large);

    let stats = a.statistics();
    assert_eq!(stats.large.allocations, 1);
    assert_eq!(stats.free_blocks(), pooled.free_blocks(), "large path must not touch pools");
    assert_eq!(stats.pools[0].free_blocks, before.pools[0].free_blocks - 1);
    assert_eq!(stats.pools[1].free_blocks, before.pools[1].free_blocks - 1);

    unsafe {
        a.release(small);
        a.release(medium);
        a.release(big);
    }
    assert_eq!(a.statistics().free_blocks(), before.free_blocks());
}

#[test]
fn strong_affinity_never_picks_a_class_too_small() {
    let mut a = allocator();
    for _ in 0..1000 {
        a.learn(0).unwrap();
    }
    for _ in 0..10 {
        a.learn(3).unwrap();
    }
    assert_eq!(a.predictor().current_hot_index(), 0);

    // 40 + header does not fit 32 bytes, so the slow path must find class 1.
    assert!(40 + HEADER_SIZE > 32);
    let before = a.route_counters();
    let block = a.allocate(40).unwrap();
    assert_eq!(block.route(), Route::Class(1));
    let after = a.route_counters();
    assert_eq!(after.slow_scans, before.slow_scans + 1);
    assert_eq!(after.fast_hits, before.fast_hits);
    unsafe { a.release(block) };
}

#[test]
fn dominant_class_is_served_without_scanning() {
    let mut a = allocator();
    for _ in 0..5 {
        a.learn(3).unwrap();
    }
    a.learn(1).unwrap();
    assert_eq!(a.predictor().current_hot_index(), 3);

    // Every size that fits class 3 (256 bytes) goes straight there,
    // including ones a smaller class would also hold.
    let mut held = Vec::new();
    for size in [1usize, 20, 100, 200, 256 - HEADER_SIZE] {
        let b = a.allocate(size).unwrap();
        assert_eq!(b.route(), Route::Class(3), "size {}", size);
        held.push(b);
    }
    assert_eq!(a.route_counters().slow_scans, 0);
    assert_eq!(a.route_counters().fast_hits, 5);
    for b in held {
        unsafe { a.release(b) };
    }
}

#[test]
fn hot_class_follows_demand() {
    let mut a = allocator();
    let mut held = Vec::new();
    for _ in 0..3 {
        held.push(a.allocate(100).unwrap());
    }
    assert_eq!(a.predictor().current_hot_index(), 2);
    for _ in 0..4 {
        held.push(a.allocate(400).unwrap());
    }
    assert_eq!(a.predictor().current_hot_index(), 4);
    // Small requests now ride the hot class.
    let small = a.allocate(10).unwrap();
    assert_eq!(small.route(), Route::Class(4));
    held.push(small);
    for b in held {
        unsafe { a.release(b) };
    }
}

#[test]
fn route_class_does_not_learn() {
    let mut a = allocator();
    assert_eq!(a.route_class(300), Route::Class(4));
    assert_eq!(a.route_class(5000), Route::Large);
    assert_eq!(a.statistics().total_hits(), 0);
    assert_eq!(a.route_counters().large_routes, 1);
}

#[test]
fn seeding_matches_replayed_allocations() {
    let history: Vec<usize> = [20usize, 20, 50, 20, 120, 3000, 50, 50, 50, 0]
        .iter()
        .copied()
        .cycle()
        .take(400)
        .collect();

    let mut seeded = allocator();
    let routed = seeded.seed(history.iter().copied());

    let mut replayed = allocator();
    for &size in &history {
        let block = replayed.allocate(size).unwrap();
        unsafe { replayed.release(block) };
    }

    let s = seeded.statistics();
    let r = replayed.statistics();
    assert_eq!(routed, 360);
    assert_eq!(s.predictor, r.predictor);
    assert_eq!(s.hot_class, r.hot_class);
    assert_eq!(s.routes, r.routes);
    // Seeding takes no blocks.
    assert!(s.pools.iter().all(|p| p.in_use == 0));
    assert_eq!(s.large.allocations, 0);
}
