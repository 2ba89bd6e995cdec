//! Quadtree Benchmarks
//!
//! Broad phase build and query costs, plus a full collide pass over a level

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glam::Vec2;
use tessel_core::{Rect, WorldConfig};
use tessel_physics::{BodyHandle, BodySet, CollisionSpace, ListTag, PhysicsBody, QuadTree};

const WORLD_SIZE: f32 = 2048.0;

fn world() -> WorldConfig {
    WorldConfig::new(Rect::new(0.0, 0.0, WORLD_SIZE, WORLD_SIZE), 4).unwrap()
}

/// Lay bodies out on a jittered grid so some of them touch
fn populate(count: usize) -> (BodySet, Vec<BodyHandle>) {
    let mut bodies = BodySet::new();
    let per_row = (count as f32).sqrt().ceil() as usize;
    let spacing = WORLD_SIZE / per_row as f32;

    let handles = (0..count)
        .map(|i| {
            let col = (i % per_row) as f32;
            let row = (i / per_row) as f32;
            let jitter = ((i * 7919) % 13) as f32;
            let (x, y) = (col * spacing + jitter, row * spacing + jitter);
            let mut body = PhysicsBody::new(x, y, 16.0, 16.0);
            body.velocity = Vec2::new(jitter * 10.0 - 60.0, 40.0);
            bodies.insert(body)
        })
        .collect();
    (bodies, handles)
}

fn bench_tree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_build");

    for count in [100, 1000, 5000].iter() {
        let (bodies, handles) = populate(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            let mut tree = QuadTree::new(&world());
            b.iter(|| {
                tree.reset(&world());
                for &handle in &handles {
                    tree.add(&bodies, handle, ListTag::A);
                }
                black_box(tree.node_count())
            });
        });
    }

    group.finish();
}

fn bench_self_overlap(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_self_overlap");

    for count in [100, 1000, 5000].iter() {
        let (mut bodies, handles) = populate(*count);
        let mut tree = QuadTree::new(&world());
        for &handle in &handles {
            tree.add(&bodies, handle, ListTag::A);
        }

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let mut pairs = 0usize;
                let mut count_pairs = |_: &mut BodySet, _: BodyHandle, _: BodyHandle| {
                    pairs += 1;
                    false
                };
                tree.overlap(&mut bodies, false, Some(&mut count_pairs));
                black_box(pairs)
            });
        });
    }

    group.finish();
}

fn bench_collide_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("collide_level");

    for count in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || {
                    let (mut bodies, handles) = populate(count);
                    let level = bodies.insert_group();
                    for handle in handles {
                        let _ = bodies.add_member(level, handle);
                    }
                    bodies.update(1.0 / 60.0);
                    (bodies, level)
                },
                |(mut bodies, level)| {
                    let mut space = CollisionSpace::new(world()).unwrap();
                    black_box(space.collide(&mut bodies, level, level))
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tree_build, bench_self_overlap, bench_collide_level);
criterion_main!(benches);
