use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ecmult::{EcmultContext, Group, Jacobian, RandomField, Scalar};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn built_context(endomorphism: bool) -> EcmultContext {
    let mut ctx = EcmultContext::new();
    ctx.build_with(endomorphism).unwrap();
    ctx
}

fn bench_context_build(c: &mut Criterion) {
    c.bench_function("context_build", |bencher| {
        bencher.iter(|| {
            let mut ctx = EcmultContext::new();
            ctx.build_with(false).unwrap();
            black_box(ctx)
        })
    });
}

fn bench_context_build_endomorphism(c: &mut Criterion) {
    c.bench_function("context_build_endomorphism", |bencher| {
        bencher.iter(|| {
            let mut ctx = EcmultContext::new();
            ctx.build_with(true).unwrap();
            black_box(ctx)
        })
    });
}

fn bench_ecmult(c: &mut Criterion) {
    let ctx = built_context(false);
    let mut rng = StdRng::seed_from_u64(42);
    let a = Jacobian::generator().scalar_mul(&Scalar::random(&mut rng));
    let na = Scalar::random(&mut rng);
    let ng = Scalar::random(&mut rng);

    c.bench_function("ecmult", |bencher| {
        bencher.iter(|| black_box(ctx.ecmult(black_box(&a), black_box(&na), black_box(&ng))))
    });
}

fn bench_ecmult_endomorphism(c: &mut Criterion) {
    let ctx = built_context(true);
    let mut rng = StdRng::seed_from_u64(42);
    let a = Jacobian::generator().scalar_mul(&Scalar::random(&mut rng));
    let na = Scalar::random(&mut rng);
    let ng = Scalar::random(&mut rng);

    c.bench_function("ecmult_endomorphism", |bencher| {
        bencher.iter(|| black_box(ctx.ecmult(black_box(&a), black_box(&na), black_box(&ng))))
    });
}

fn bench_naive_double_base(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = Jacobian::generator().scalar_mul(&Scalar::random(&mut rng));
    let na = Scalar::random(&mut rng);
    let ng = Scalar::random(&mut rng);

    c.bench_function("naive_double_base", |bencher| {
        bencher.iter(|| {
            let g = Jacobian::generator();
            black_box(a.scalar_mul(black_box(&na)) + g.scalar_mul(black_box(&ng)))
        })
    });
}

criterion_group!(
    benches,
    bench_context_build,
    bench_context_build_endomorphism,
    bench_ecmult,
    bench_ecmult_endomorphism,
    bench_naive_double_base
);
criterion_main!(benches);
