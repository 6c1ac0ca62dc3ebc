//! Benchmarks for ipcountry lookup performance.
//!
//! Run with: cargo bench
//!
//! This benchmark suite measures:
//! - Raw binary search throughput against table size
//! - Cached vs uncached resolution through `TableCache`
//! - Table build time from reference text

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ipcountry::{CacheConfig, MemorySource, RangeTable, TableCache};

/// Generate reference text with `count` disjoint /24 blocks.
fn generate_reference(count: usize) -> String {
    (0..count)
        .map(|i| {
            let n = (i as u32) << 8;
            format!(
                "{}.{}.{}.0/24,Country{}\n",
                (n >> 24) & 0xFF,
                (n >> 16) & 0xFF,
                (n >> 8) & 0xFF,
                i % 250
            )
        })
        .collect()
}

/// Generate query addresses spread over the covered space plus misses.
fn generate_queries(count: usize, table_size: usize) -> Vec<u32> {
    let span = (table_size as u64) << 8;
    (0..count as u64)
        .map(|i| ((i.wrapping_mul(2_654_435_761)) % (span * 2)) as u32)
        .collect()
}

/// Benchmark raw binary search for different table sizes.
fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");

    for size in [1_000usize, 10_000, 100_000] {
        let table = RangeTable::parse_str(&generate_reference(size)).unwrap();
        let queries = generate_queries(1_000, size);

        group.throughput(Throughput::Elements(queries.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &queries, |b, queries| {
            let lookup = table.lookup();
            b.iter(|| {
                for &q in queries {
                    black_box(lookup.find(black_box(q)));
                }
            });
        });
    }

    group.finish();
}

/// Benchmark resolution through the keyed cache.
fn bench_cache_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_resolve");
    let queries: Vec<String> = generate_queries(1_000, 10_000)
        .into_iter()
        .map(|q| std::net::Ipv4Addr::from(q).to_string())
        .collect();
    group.throughput(Throughput::Elements(queries.len() as u64));

    for (name, config) in [
        ("result_cache", CacheConfig::default()),
        ("no_cache", CacheConfig::no_cache()),
    ] {
        let source = MemorySource::new();
        source.insert("geo", generate_reference(10_000));
        let cache = TableCache::with_source(source, config);
        cache.get_or_build("geo").unwrap();

        group.bench_function(name, |b| {
            b.iter(|| {
                for q in &queries {
                    black_box(cache.resolve(black_box(q), "geo").unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Benchmark table construction.
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(20);

    for size in [10_000usize, 100_000] {
        let text = generate_reference(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| RangeTable::parse_str(black_box(text)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_find, bench_cache_resolve, bench_build);
criterion_main!(benches);
