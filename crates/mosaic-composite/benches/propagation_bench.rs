//! Benchmarks for Mosaic composite networks
//!
//! Measures performance of:
//! - Control point propagation across strips of growing length
//! - Vertex star repair when closing a ring
//! - Text serialization

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mosaic_composite::{CompositeSurface, Direction, Handle, Point3};

/// Row of `len` patches continued eastwards
fn strip(len: usize) -> (CompositeSurface, Vec<Handle>) {
    let mut surface = CompositeSurface::new();
    let mut handles = vec![surface.insert_new_patch().unwrap()];
    for _ in 1..len {
        let last = handles[handles.len() - 1];
        handles.push(surface.continue_existing_patch(last, Direction::E).unwrap());
    }
    (surface, handles)
}

/// Translating the first patch reaches every patch of the strip
fn bench_translate_strip(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate_strip");

    for &len in &[1usize, 4, 16, 64] {
        let (mut surface, handles) = strip(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &handles[0], |b, &first| {
            b.iter(|| {
                surface
                    .translate_patch(first, black_box(Point3::new(0.0, 0.0, 1e-3)))
                    .unwrap()
            })
        });
    }
    group.finish();
}

/// A single boundary edit only reaches the direct neighbour
fn bench_boundary_edit(c: &mut Criterion) {
    let (mut surface, handles) = strip(16);
    let middle = handles[8];
    let mut z = 0.0;
    c.bench_function("boundary_edit", |b| {
        b.iter(|| {
            z += 1e-3;
            surface
                .update_control_point(middle, 1, 3, black_box(Point3::new(0.0, 1.0, z)))
                .unwrap()
        })
    });
}

/// Build a 2x2 block and close it with a merge
fn bench_merge_quad(c: &mut Criterion) {
    c.bench_function("merge_quad", |b| {
        b.iter(|| {
            let mut surface = CompositeSurface::new();
            let a = surface.insert_new_patch().unwrap();
            let east = surface.continue_existing_patch(a, Direction::E).unwrap();
            let south = surface.continue_existing_patch(a, Direction::S).unwrap();
            let corner = surface.continue_existing_patch(south, Direction::E).unwrap();
            surface
                .merge_existing_patches(corner, Direction::N, east, Direction::S)
                .unwrap();
            black_box(surface.node_count())
        })
    });
}

fn bench_to_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_text");
    for &len in &[4usize, 64] {
        let (surface, _) = strip(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &surface, |b, surface| {
            b.iter(|| black_box(surface.to_text().unwrap()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_translate_strip,
    bench_boundary_edit,
    bench_merge_quad,
    bench_to_text,
);
criterion_main!(benches);
