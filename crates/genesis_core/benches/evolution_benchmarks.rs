use criterion::{black_box, criterion_group, criterion_main, Criterion};
use genesis_core::evolution::EvolutionEngine;
use genesis_core::genetics::{crossover, generate_population, mutate, MutationParams};
use genesis_core::neural_web::{compatibility, NeuralWeb};
use genesis_core::GenesisConfig;
use genesis_data::FitnessScores;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

/// Benchmark crossover followed by mutation.
fn bench_reproduce(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let parents = generate_population(2, &mut rng);
    let params = MutationParams::new(0.1, 0.1).unwrap();

    c.bench_function("crossover_mutate", |b| {
        b.iter(|| {
            let child = crossover(&parents[0], &parents[1], 0.7, &mut rng);
            black_box(mutate(&child, &params, &mut rng))
        })
    });
}

/// Benchmark a full generation boundary for 1000 agents.
fn bench_evolve_generation(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut population = generate_population(1000, &mut rng);
    for dna in &mut population {
        dna.fitness_scores = FitnessScores::uniform(rng.gen_range(-1.0..1.0));
    }
    let engine = EvolutionEngine::from_config(&GenesisConfig::default()).unwrap();

    c.bench_function("evolve_generation_1000", |b| {
        b.iter(|| black_box(engine.evolve_generation(0, &population, 0, &mut rng).unwrap()))
    });
}

fn bench_compatibility(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let pair = generate_population(2, &mut rng);

    c.bench_function("compatibility", |b| {
        b.iter(|| black_box(compatibility(&pair[0], &pair[1])))
    });
}

/// Benchmark one neural web cycle with 2000 candidate pairs.
fn bench_web_cycle(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let population = generate_population(500, &mut rng);
    let ids: Vec<Uuid> = population.iter().map(|a| a.agent_id).collect();
    let pairs: Vec<(Uuid, Uuid)> = (0..2000)
        .map(|_| {
            (
                ids[rng.gen_range(0..ids.len())],
                ids[rng.gen_range(0..ids.len())],
            )
        })
        .collect();
    let mut web = NeuralWeb::new(&GenesisConfig::default().social).unwrap();
    web.sync_agents(&ids);

    c.bench_function("neural_web_cycle", |b| {
        b.iter(|| black_box(web.process_interactions(&population, &pairs)))
    });
}

criterion_group!(
    benches,
    bench_reproduce,
    bench_evolve_generation,
    bench_compatibility,
    bench_web_cycle
);
criterion_main!(benches);
