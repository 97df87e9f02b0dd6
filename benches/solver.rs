//! Benchmarks for the Soma solver.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use soma::geometry::unique_orientations;
use soma::{PieceKind, SolverConfig, Soma};

const CUBE: &str = "\
ooo
ooo
ooo

ooo
ooo
ooo

ooo
ooo
ooo
";

/// Benchmark loading the cube and finding its first solution.
fn bench_first_solution(c: &mut Criterion) {
    c.bench_function("cube_first_solution", |b| {
        b.iter(|| {
            let mut soma = Soma::default();
            soma.load_figure(black_box(CUBE)).unwrap();
            soma.solve()
        })
    });
}

/// Benchmark enumerating the distinct solutions of the cube.
fn bench_distinct_solutions(c: &mut Criterion) {
    let mut group = c.benchmark_group("cube");
    group.sample_size(10);
    group.bench_function("distinct_solutions", |b| {
        b.iter(|| {
            let mut soma = Soma::default();
            soma.load_figure(black_box(CUBE)).unwrap();
            soma.solutions().count()
        })
    });
    group.bench_function("all_solutions", |b| {
        b.iter(|| {
            let mut soma = Soma::new(SolverConfig::default().with_all_rotations());
            soma.load_figure(black_box(CUBE)).unwrap();
            soma.solutions().count()
        })
    });
    group.finish();
}

/// Benchmark computing the orientations of the piece with most of them.
fn bench_orientations(c: &mut Criterion) {
    c.bench_function("unique_orientations", |b| {
        b.iter(|| unique_orientations(black_box(PieceKind::Ell.offsets())))
    });
}

/// Benchmark building a figure: components, adjacency and symmetry groups.
fn bench_load(c: &mut Criterion) {
    let mut soma = Soma::default();
    c.bench_function("load_figure", |b| {
        b.iter(|| soma.load_figure(black_box(CUBE)))
    });
}

criterion_group!(
    benches,
    bench_first_solution,
    bench_distinct_solutions,
    bench_orientations,
    bench_load
);
criterion_main!(benches);
