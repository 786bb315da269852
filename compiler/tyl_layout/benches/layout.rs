//! Layout benchmarks.
//!
//! Measures placement cost for wide types, deep inheritance chains, and
//! diamond-heavy hierarchies with shared bases.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tyl_ir::{BaseSpec, FieldSpec, FieldType, TypeDescriptor, TypeIdx, TypePool};
use tyl_layout::{layout, LayoutCache, LayoutEngine, TargetModel};

/// One type with `n` alternating char/int/double fields.
fn wide_type(n: usize) -> (TypePool, TypeIdx) {
    let mut pool = TypePool::new();
    let kinds = [FieldType::CHAR, FieldType::INT, FieldType::DOUBLE];
    let desc = TypeDescriptor::new("Wide").fields(
        (0..n).map(|i| FieldSpec::new(format!("f{i}"), kinds[i % kinds.len()])),
    );
    let idx = pool.add(desc);
    (pool, idx)
}

/// Single inheritance, one field per layer.
fn chain(depth: usize) -> (TypePool, TypeIdx) {
    let mut pool = TypePool::new();
    let mut prev = pool.add(TypeDescriptor::new("L0").field(FieldSpec::new("f", FieldType::INT)));
    for i in 1..depth {
        prev = pool.add(
            TypeDescriptor::new(format!("L{i}"))
                .base(BaseSpec::owned(prev))
                .field(FieldSpec::new(format!("f{i}"), FieldType::CHAR)),
        );
    }
    (pool, prev)
}

/// Stacked diamonds: each level joins two types that share the level below.
fn diamonds(levels: usize) -> (TypePool, TypeIdx) {
    let mut pool = TypePool::new();
    let mut top = pool.add(TypeDescriptor::new("Root").field(FieldSpec::new("r", FieldType::INT)).polymorphic());
    for i in 0..levels {
        let left = pool.add(
            TypeDescriptor::new(format!("Left{i}"))
                .base(BaseSpec::shared(top))
                .field(FieldSpec::new("l", FieldType::INT)),
        );
        let right = pool.add(
            TypeDescriptor::new(format!("Right{i}"))
                .base(BaseSpec::shared(top))
                .field(FieldSpec::new("r", FieldType::DOUBLE)),
        );
        top = pool.add(
            TypeDescriptor::new(format!("Join{i}"))
                .base(BaseSpec::owned(left))
                .base(BaseSpec::owned(right))
                .field(FieldSpec::new("j", FieldType::CHAR)),
        );
    }
    (pool, top)
}

fn bench_wide(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/wide");
    for size in [16, 256, 4096] {
        let (pool, idx) = wide_type(size);
        group.bench_with_input(BenchmarkId::new("fields", size), &idx, |b, &idx| {
            b.iter(|| layout(black_box(&pool), idx, &TargetModel::LP64));
        });
    }
    group.finish();
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/chain");
    for depth in [10, 100, 1000] {
        let (pool, idx) = chain(depth);
        group.bench_with_input(BenchmarkId::new("depth", depth), &idx, |b, &idx| {
            b.iter(|| layout(black_box(&pool), idx, &TargetModel::LP64));
        });
    }
    group.finish();
}

fn bench_diamonds(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/diamonds");
    for levels in [4, 32, 128] {
        let (pool, idx) = diamonds(levels);
        group.bench_with_input(BenchmarkId::new("levels", levels), &idx, |b, &idx| {
            b.iter(|| layout(black_box(&pool), idx, &TargetModel::LP64));
        });
    }
    group.finish();
}

fn bench_reuse(c: &mut Criterion) {
    let (pool, _) = chain(500);
    let all: Vec<TypeIdx> = pool.indices().collect();

    c.bench_function("layout/engine_all_types", |b| {
        b.iter(|| {
            let mut engine = LayoutEngine::new(&pool, TargetModel::LP64);
            for &idx in &all {
                let _ = black_box(engine.layout(idx));
            }
        });
    });

    c.bench_function("layout/cache_warm_hit", |b| {
        let cache = LayoutCache::new(&pool, TargetModel::LP64);
        let last = all[all.len() - 1];
        let _ = cache.get(last);
        b.iter(|| cache.get(black_box(last)));
    });
}

criterion_group!(benches, bench_wide, bench_chain, bench_diamonds, bench_reuse);
criterion_main!(benches);
