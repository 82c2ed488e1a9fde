use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use paydraw_execution::{
    analyze, mocks::random_pool, mocks::scenario_config, run_rng, CandidateGenerator, ClusterIndex,
    PayoutEvaluator,
};
use paydraw_types::{Draw, NumberDomain, TierMultipliers};

fn evaluate_pool(c: &mut Criterion) {
    let config = scenario_config().validate().expect("scenario config is valid");
    let evaluator = PayoutEvaluator::new(&config);
    let identity = TierMultipliers::identity(&config.tiers);
    let draw = Draw::from_distinct(vec![3, 17, 42, 58, 91]);

    let mut group = c.benchmark_group("evaluate_pool");
    for size in [100usize, 1_000, 10_000] {
        let pool = random_pool(&mut run_rng(0, size as u64), size, 5, NumberDomain::new(1, 99));
        group.bench_function(BenchmarkId::new("set", size), |b| {
            b.iter(|| black_box(evaluator.evaluate(&draw, &pool, &identity)))
        });
    }
    group.finish();
}

fn generate_candidates(c: &mut Criterion) {
    let config = scenario_config().validate().expect("scenario config is valid");
    let pool = random_pool(&mut run_rng(1, 0), 1_000, 5, NumberDomain::new(1, 99));
    let frequency = analyze(&pool);
    let clusters = ClusterIndex::build(&pool, 100);
    let generator = CandidateGenerator::new(&config, &pool, &frequency, &clusters);

    c.bench_function("generate_uniform", |b| {
        let mut rng = run_rng(2, 0);
        b.iter(|| black_box(generator.generate(&mut rng)))
    });
    c.bench_function("cluster_index_1000", |b| {
        b.iter(|| black_box(ClusterIndex::build(&pool, 100)))
    });
}

criterion_group!(benches, evaluate_pool, generate_candidates);
criterion_main!(benches);
