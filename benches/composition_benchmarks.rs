// Copyright 2025 Cowboy AI, LLC.

use cim_compose::{Compositor, SchemaField, TraitDefinition};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// A linear chain: trait N depends on trait N-1
fn chain_traits(len: usize) -> Vec<TraitDefinition> {
    (0..len)
        .map(|i| {
            let mut trait_def = TraitDefinition::new(format!("Trait{i:04}"), "1.0.0")
                .with_field(format!("field_{i}"), SchemaField::new("string"));
            if i > 0 {
                trait_def = trait_def.with_dependency(format!("Trait{:04}", i - 1));
            }
            trait_def
        })
        .collect()
}

/// A wide fan: every trait depends on a single root
fn fan_traits(width: usize) -> Vec<TraitDefinition> {
    let mut traits = vec![
        TraitDefinition::new("Root", "1.0.0").with_field("id", SchemaField::new("uuid").required()),
    ];
    traits.extend((0..width).map(|i| {
        TraitDefinition::new(format!("Leaf{i:04}"), "1.0.0")
            .with_dependency("Root")
            .with_field(format!("leaf_{i}"), SchemaField::new("string"))
    }));
    traits
}

/// Layered traits that all redefine one shared field, forcing a
/// collision per layer
fn colliding_traits(layers: usize) -> Vec<TraitDefinition> {
    (0..layers)
        .map(|i| {
            let mut trait_def = TraitDefinition::new(format!("Layer{i:04}"), "1.0.0")
                .with_field("shared", SchemaField::new("string"));
            if i > 0 {
                trait_def = trait_def.with_dependency(format!("Layer{:04}", i - 1));
            }
            trait_def
        })
        .collect()
}

fn benchmark_compose_chain(c: &mut Criterion) {
    let compositor = Compositor::new();
    let mut group = c.benchmark_group("compose_chain");

    for len in [10, 100, 500].iter() {
        let traits = chain_traits(*len);
        group.bench_with_input(BenchmarkId::from_parameter(len), len, |b, _| {
            b.iter(|| compositor.compose(black_box(&traits), None).unwrap());
        });
    }

    group.finish();
}

fn benchmark_compose_fan(c: &mut Criterion) {
    let compositor = Compositor::new();
    let mut group = c.benchmark_group("compose_fan");

    for width in [10, 100, 500].iter() {
        let traits = fan_traits(*width);
        group.bench_with_input(BenchmarkId::from_parameter(width), width, |b, _| {
            b.iter(|| compositor.compose(black_box(&traits), None).unwrap());
        });
    }

    group.finish();
}

fn benchmark_collision_resolution(c: &mut Criterion) {
    let compositor = Compositor::new();
    let mut group = c.benchmark_group("compose_collisions");

    for layers in [10, 50, 100].iter() {
        let traits = colliding_traits(*layers);
        group.bench_with_input(BenchmarkId::from_parameter(layers), layers, |b, _| {
            b.iter(|| compositor.compose(black_box(&traits), None).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compose_chain,
    benchmark_compose_fan,
    benchmark_collision_resolution
);
criterion_main!(benches);
