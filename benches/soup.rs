//! Criterion benchmarks for board generation and combination search.
//!
//! Run with:
//!   cargo bench
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use gnosis::combo::FoundSet;
use gnosis::search::{count_combinations, find_combination};
use gnosis::soup::Variant;
use gnosis::{Difficulty, Grid, Prng};

const VARIANTS: [Variant; 4] = [
    Variant::PairAddition,
    Variant::Advanced(Difficulty::Easy),
    Variant::Advanced(Difficulty::Medium),
    Variant::Advanced(Difficulty::Hard),
];

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for variant in VARIANTS {
        let cfg = variant.config();
        group.bench_with_input(BenchmarkId::from_parameter(variant.name()), &cfg, |b, cfg| {
            let mut rng = Prng::new(42);
            b.iter(|| black_box(Grid::generate(cfg.grid_size, cfg.max_value, &mut rng)));
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    for variant in VARIANTS {
        let cfg = variant.config();
        let grid = Grid::generate(cfg.grid_size, cfg.max_value, &mut Prng::new(7));
        let found = FoundSet::new(cfg.grid_size);

        group.bench_function(BenchmarkId::new("first", variant.name()), |b| {
            b.iter(|| black_box(find_combination(&grid, cfg.rule, cfg.target, &found)));
        });
        group.bench_function(BenchmarkId::new("count", variant.name()), |b| {
            b.iter(|| black_box(count_combinations(&grid, cfg.rule, cfg.target, &found)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_search);
criterion_main!(benches);
