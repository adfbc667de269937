//! Alloc/free throughput of the pool.
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rmempool::{Mempool, SizeClassDescriptor};

fn default_pool() -> Mempool {
  Mempool::new(
    [(8, 20), (16, 15), (32, 10)].map(SizeClassDescriptor::from),
    2048,
  )
  .expect("valid pool configuration")
}

fn bench_alloc_free_pair(c: &mut Criterion) {
  let pool = default_pool();
  let mut group = c.benchmark_group("alloc_free_pair");

  for size in [8usize, 16, 32] {
    group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
      b.iter(|| {
        let chunk = pool.alloc(black_box(size)).expect("free chunk");
        pool.free(chunk.as_ptr());
      });
    });
  }

  group.finish();
}

fn bench_drain_and_refill(c: &mut Criterion) {
  let pool = default_pool();
  let mut chunks = Vec::with_capacity(45);

  c.bench_function("drain_and_refill_45_chunks", |b| {
    b.iter(|| {
      while let Some(chunk) = pool.alloc(black_box(1)) {
        chunks.push(chunk);
      }
      for chunk in chunks.drain(..) {
        pool.free(chunk.as_ptr());
      }
    });
  });
}

fn bench_upsizing(c: &mut Criterion) {
  let pool = default_pool();
  // Drain the 8 and 16 byte classes so every request falls through to 32.
  let held: Vec<_> = (0..35).filter_map(|_| pool.alloc(8)).collect();

  c.bench_function("alloc_free_upsized", |b| {
    b.iter(|| {
      let chunk = pool.alloc(black_box(8)).expect("free 32 byte chunk");
      pool.free(chunk.as_ptr());
    });
  });

  for chunk in held {
    pool.free(chunk.as_ptr());
  }
}

criterion_group!(
  benches,
  bench_alloc_free_pair,
  bench_drain_and_refill,
  bench_upsizing
);
criterion_main!(benches);
