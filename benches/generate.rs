use criterion::{black_box, Criterion, criterion_group, criterion_main};
use spiluk_harness::generator::{MatrixGenerator, SparsityPolicy};
use spiluk_harness::matrix::{blockize, unblock};
use spiluk_harness::verify::iluk;

fn bench_generate_and_transcode(c: &mut Criterion) {
    let n = 48;
    let mut g = MatrixGenerator::new(Some(0));

    c.bench_function("generate uniform", |ben| {
        ben.iter(|| g.generate(black_box(n), 20, 1, SparsityPolicy::UniformRandom).unwrap())
    });

    c.bench_function("generate block", |ben| {
        ben.iter(|| g.generate(black_box(n), 20, 4, SparsityPolicy::BlockConcentrated).unwrap())
    });

    let a = g.generate(n, 20, 4, SparsityPolicy::BlockConcentrated).unwrap();
    c.bench_function("blockize + unblock", |ben| {
        ben.iter(|| {
            let grid = blockize(black_box(&a), 4).unwrap();
            unblock(&grid, 4).unwrap()
        })
    });

    c.bench_function("reference ILU(2)", |ben| {
        ben.iter(|| iluk(black_box(&a), 2).unwrap())
    });
}

criterion_group!(benches, bench_generate_and_transcode);
criterion_main!(benches);
