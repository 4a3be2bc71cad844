use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ecmult::{FieldElement, RandomField, Scalar};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_field_mul(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = FieldElement::random(&mut rng);
    let b = FieldElement::random(&mut rng);
    c.bench_function("field_mul", |bencher| {
        bencher.iter(|| black_box(black_box(a) * black_box(b)))
    });
}

fn bench_field_square(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = FieldElement::random(&mut rng);
    c.bench_function("field_square", |bencher| {
        bencher.iter(|| black_box(black_box(a).square()))
    });
}

fn bench_field_inverse(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = FieldElement::random(&mut rng);
    c.bench_function("field_inverse", |bencher| {
        bencher.iter(|| black_box(black_box(a).inverse()))
    });
}

fn bench_field_batch_invert(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let values: Vec<FieldElement> = (0..64).map(|_| FieldElement::random(&mut rng)).collect();
    c.bench_function("field_batch_invert_64", |bencher| {
        bencher.iter(|| {
            let mut batch = values.clone();
            FieldElement::batch_invert(&mut batch);
            black_box(batch)
        })
    });
}

fn bench_scalar_mul(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = Scalar::random(&mut rng);
    let b = Scalar::random(&mut rng);
    c.bench_function("scalar_mul", |bencher| {
        bencher.iter(|| black_box(black_box(a) * black_box(b)))
    });
}

fn bench_scalar_split_lambda(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let k = Scalar::random(&mut rng);
    c.bench_function("scalar_split_lambda", |bencher| {
        bencher.iter(|| black_box(black_box(k).split_lambda()))
    });
}

criterion_group!(
    benches,
    bench_field_mul,
    bench_field_square,
    bench_field_inverse,
    bench_field_batch_invert,
    bench_scalar_mul,
    bench_scalar_split_lambda
);
criterion_main!(benches);
