use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ternfactor::synthetic::{random_product_matrix, PlantedParams};
use ternfactor::{
    AssociationGenerator, BasisSelector, CandidateGenerator, Combinator, Cover, Decomposition, DecompositionConfig,
    FastLoc, GreedyCombinator, IdentityGenerator, Iter, TernMatrix,
};

fn planted(height: usize, width: usize, rank: usize) -> TernMatrix {
    // Deterministic matrices for stable benches
    let mut rng = StdRng::seed_from_u64(0xbeef);
    let params = PlantedParams {
        height,
        width,
        rank,
        noise: 0.02,
        unknown: 0.05,
        ..PlantedParams::default()
    };
    random_product_matrix(&params, &mut rng).unwrap().matrix
}

fn bench_matrix_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix_ops");

    for &n in &[32usize, 128] {
        let a = planted(n, n, 8);
        let b = planted(n, n, 8);
        group.bench_with_input(BenchmarkId::new("boolean_product", n), &n, |bencher, _| {
            bencher.iter(|| black_box(&a).boolean_product(black_box(&b)))
        });
        group.bench_with_input(BenchmarkId::new("reconstruction_error", n), &n, |bencher, _| {
            bencher.iter(|| black_box(&a).reconstruction_error(black_box(&b), 2.0))
        });
    }

    group.finish();
}

fn bench_cover(c: &mut Criterion) {
    let mut group = c.benchmark_group("cover");
    let m = planted(2, 1024, 4);
    let row = m.row(0).unwrap();
    let pattern = m.row(1).unwrap();
    let mut cover = Cover::new(row.len(), 1.0);
    cover.include(pattern);

    group.bench_function("change_on_inclusion", |bencher| {
        bencher.iter(|| cover.cover_change_on_inclusion(black_box(row), black_box(pattern)))
    });
    group.bench_function("change_density_on_inclusion", |bencher| {
        bencher.iter(|| cover.cover_change_density_on_inclusion(black_box(row), black_box(pattern)))
    });
    group.bench_function("change_on_exclusion", |bencher| {
        bencher.iter(|| cover.cover_change_on_exclusion(black_box(row), black_box(pattern)))
    });

    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");
    group.sample_size(20);

    let original = planted(100, 60, 5);
    let identity = IdentityGenerator.generate_candidates(&original, 5);

    group.bench_function("association_candidates", |bencher| {
        let generator = AssociationGenerator::new(0.5).unwrap();
        bencher.iter(|| generator.generate_candidates(black_box(&original), 5))
    });

    group.bench_function("fastloc_select", |bencher| {
        bencher.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            FastLoc::default().select_basis(black_box(&identity), &original, 5, 1.0, &mut rng)
        })
    });

    let mut rng = StdRng::seed_from_u64(1);
    let selection = FastLoc::default()
        .select_basis(&identity, &original, 5, 1.0, &mut rng)
        .unwrap();

    group.bench_function("iter_combine", |bencher| {
        bencher.iter(|| {
            Iter::default().combine_matrix(
                black_box(&original),
                selection.combination.clone(),
                &selection.basis,
                1.0,
            )
        })
    });

    group.bench_function("density_greedy_combine", |bencher| {
        bencher.iter(|| {
            GreedyCombinator::density().combine_matrix(
                black_box(&original),
                selection.combination.clone(),
                &selection.basis,
                1.0,
            )
        })
    });

    group.finish();
}

fn bench_presets(c: &mut Criterion) {
    let mut group = c.benchmark_group("presets");
    group.sample_size(10);

    let original = planted(100, 60, 5);
    for config in [
        DecompositionConfig::loc_iter(),
        DecompositionConfig::dbp(0.5),
        DecompositionConfig::best_unconfigured(),
        DecompositionConfig::best_configured(0.5),
    ] {
        let config = config.with_seed(7);
        group.bench_function(config.label(), |bencher| {
            bencher.iter(|| {
                let mut decomposition = Decomposition::from_config(&config).unwrap();
                decomposition.decompose(black_box(&original), 5)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_matrix_ops, bench_cover, bench_stages, bench_presets);
criterion_main!(benches);
