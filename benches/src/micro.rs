/// Microbenchmarks for classalloc.
///
/// Plain timing loops rather than a harness, so numbers for the pooled
/// allocator and the system allocator come out of the same binary.
/// Run with `cargo run --release -p classalloc-bench --bin micro [iterations]`.
use classalloc::{api, init, ClassAllocator, PoolConfig};
use std::hint::black_box;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Request sizes in the mix the allocator is tuned for.
const MIXED_SIZES: [usize; 8] = [16, 20, 24, 40, 20, 100, 16, 200];

/// Measure allocate/release latency for a given size on an owned allocator.
fn bench_pooled(a: &mut ClassAllocator, size: usize, iterations: usize) -> f64 {
    for _ in 0..1000 {
        let p = a.allocate_raw(black_box(size));
        unsafe { a.release_raw(black_box(p)) };
    }
    let start = Instant::now();
    for _ in 0..iterations {
        let p = a.allocate_raw(black_box(size));
        unsafe {
            std::ptr::write_bytes(p, 0xAB, std::cmp::min(size, 64));
            a.release_raw(black_box(p));
        }
    }
    start.elapsed().as_nanos() as f64 / iterations as f64
}

/// Same loop against the system allocator.
fn bench_system(size: usize, iterations: usize) -> f64 {
    for _ in 0..1000 {
        unsafe {
            let p = libc::malloc(black_box(size));
            libc::free(black_box(p));
        }
    }
    let start = Instant::now();
    for _ in 0..iterations {
        unsafe {
            let p = libc::malloc(black_box(size)) as *mut u8;
            std::ptr::write_bytes(p, 0xAB, std::cmp::min(size, 64));
            libc::free(black_box(p as *mut libc::c_void));
        }
    }
    start.elapsed().as_nanos() as f64 / iterations as f64
}

/// Batch of live objects with a skewed size mix, then release them all.
fn bench_mixed_batch(a: &mut ClassAllocator, batch: usize, rounds: usize) -> f64 {
    let mut ptrs = Vec::with_capacity(batch);
    let start = Instant::now();
    for _ in 0..rounds {
        for i in 0..batch {
            ptrs.push(a.allocate_raw(black_box(MIXED_SIZES[i % MIXED_SIZES.len()])));
        }
        for p in ptrs.drain(..) {
            unsafe { a.release_raw(p) };
        }
    }
    start.elapsed().as_nanos() as f64 / (batch * rounds) as f64
}

/// Cost of the growth step: allocate far past the initial region.
fn bench_growth(count: usize) -> f64 {
    let mut a = ClassAllocator::new(
        PoolConfig::default()
            .with_initial_blocks(64)
            .with_growth_blocks(1024),
    )
    .expect("valid configuration");
    let start = Instant::now();
    let ptrs: Vec<_> = (0..count).map(|_| a.allocate_raw(black_box(48))).collect();
    let elapsed = start.elapsed();
    for p in ptrs {
        unsafe { a.release_raw(p) };
    }
    elapsed.as_nanos() as f64 / count as f64
}

/// Multi-threaded throughput through the process-wide (locked) instance.
fn bench_global_throughput(num_threads: usize, ops_per_thread: usize, size: usize) -> f64 {
    init::initialize();
    let start = Instant::now();
    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            std::thread::spawn(move || {
                for _ in 0..ops_per_thread {
                    let p = api::allocate(black_box(size));
                    unsafe {
                        std::ptr::write_bytes(p, 0xCD, std::cmp::min(size, 16));
                        api::release(black_box(p));
                    }
                }
            })
        })
        .collect();

    for h in handles {
        if h.join().is_err() {
            tracing::error!("benchmark thread panicked");
        }
    }
    let total_ops = num_threads * ops_per_thread;
    total_ops as f64 / start.elapsed().as_secs_f64()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let iterations: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1_000_000);

    let mut cold = ClassAllocator::new(PoolConfig::from_env()).expect("valid configuration");
    let mut warm = ClassAllocator::new(PoolConfig::from_env()).expect("valid configuration");
    let routed = warm.seed(MIXED_SIZES.iter().copied().cycle().take(4_000));
    tracing::info!(routed, hot_class = warm.predictor().current_hot_index(), "seeded warm allocator");

    println!("=== classalloc microbenchmarks ===\n");

    let mut latencies: Vec<(usize, f64, f64, f64)> = Vec::new();
    println!("--- allocate/release latency (ns/op) ---");
    println!("  {:>8} {:>10} {:>10} {:>10}", "size", "cold", "seeded", "system");
    for &size in &[0usize, 16, 24, 56, 120, 248, 504, 1016, 4096, 65536] {
        let c = bench_pooled(&mut cold, size, iterations);
        let w = bench_pooled(&mut warm, size, iterations);
        let s = bench_system(size, iterations);
        println!("  {:>8} {:>10.1} {:>10.1} {:>10.1}", size, c, w, s);
        latencies.push((size, c, w, s));
    }

    println!("\n--- mixed batch of 4096 live objects (ns/op) ---");
    let ns = bench_mixed_batch(&mut warm, 4096, iterations / 4096 + 1);
    println!("  {:.1} ns", ns);

    println!("\n--- growth past initial region (ns/op) ---");
    let ns = bench_growth(100_000);
    println!("  {:.1} ns", ns);

    println!("\n--- process-wide instance throughput (Mops/sec) ---");
    for &threads in &[1, 2, 4, 8] {
        let mops = bench_global_throughput(threads, iterations / threads, 64) / 1_000_000.0;
        println!("  threads={}: {:>6.2} Mops/sec", threads, mops);
    }

    let stats = warm.statistics();
    println!(
        "\nroutes: fast={} slow={} large={}",
        stats.routes.fast_hits, stats.routes.slow_scans, stats.routes.large_routes
    );

    // Machine-parseable summary line
    print!("\nSUMMARY");
    for &(size, c, w, s) in &latencies {
        print!("|{}={:.1}/{:.1}/{:.1}", size, c, w, s);
    }
    println!();
}
