//! Benchmarks for Mosaic Mesh Topology
//!
//! Measures performance of:
//! - Seam index resolution (table lookup vs. frame composition)
//! - Edge-relative coordinates
//! - Arc end resolution

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mosaic_topology::{resolve_end, resolve_seam, Direction, End, GridIndex, IndexMap};

/// Resolve every position of the net across each edge pairing
fn bench_resolve_seam(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_seam");
    let indices: Vec<GridIndex> = GridIndex::all().collect();

    for out in Direction::EDGES {
        group.throughput(Throughput::Elements((indices.len() * 4) as u64));
        group.bench_with_input(BenchmarkId::new("edge", out), &out, |b, &out| {
            b.iter(|| {
                for back in Direction::EDGES {
                    for &idx in &indices {
                        black_box(resolve_seam(black_box(out), back, idx).ok());
                    }
                }
            })
        });
    }

    group.throughput(Throughput::Elements(Direction::CORNERS.len() as u64));
    group.bench_function("corner", |b| {
        b.iter(|| {
            for corner in Direction::CORNERS {
                let point = corner.corner_point();
                if let Some(point) = point {
                    black_box(resolve_seam(corner, corner.opposite(), black_box(point)).ok());
                }
            }
        })
    });
    group.finish();
}

/// Precomputed table vs. mapping through edge-relative coordinates
fn bench_seam_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("seam_strategy");
    let indices: Vec<GridIndex> = GridIndex::all().collect();
    group.throughput(Throughput::Elements(indices.len() as u64));

    group.bench_function("index_map", |b| {
        let map = IndexMap::seam(Direction::W, Direction::S);
        b.iter(|| {
            if let Some(map) = map {
                for &idx in &indices {
                    black_box(map.apply(black_box(idx)));
                }
            }
        })
    });

    group.bench_function("seam_coord", |b| {
        b.iter(|| {
            for &idx in &indices {
                let coord = black_box(idx).seam_coord(Direction::W);
                black_box(coord.and_then(|c| GridIndex::from_seam(Direction::S, c)));
            }
        })
    });
    group.finish();
}

fn bench_resolve_end(c: &mut Criterion) {
    c.bench_function("resolve_end", |b| {
        b.iter(|| {
            for out in End::ALL {
                for back in End::ALL {
                    for i in 0..4 {
                        black_box(resolve_end(out, back, black_box(i)).ok());
                    }
                }
            }
        })
    });
}

criterion_group!(
    benches,
    bench_resolve_seam,
    bench_seam_strategies,
    bench_resolve_end,
);
criterion_main!(benches);
