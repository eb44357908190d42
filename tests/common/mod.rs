use genesis_core::fitness::{formula, PerformanceData};
use genesis_core::genetics::generate_random;
use genesis_core::population::Population;
use genesis_core::runtime::CycleOutput;
use genesis_core::GenesisConfig;
use genesis_data::{AgentDNA, FitnessScores, GeneticTrait, Universe};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

#[allow(dead_code)]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Random genome with a fixed id and every fitness score set to `fitness`.
#[allow(dead_code)]
pub fn agent_with_fitness(id: u128, fitness: f64) -> AgentDNA {
    let mut rng = seeded_rng(id as u64);
    let mut dna = generate_random(Uuid::from_u128(id), &mut rng);
    dna.fitness_scores = FitnessScores::uniform(fitness);
    dna
}

/// Genome whose numeric traits all hold `value`.
#[allow(dead_code)]
pub fn flat_agent(id: u128, value: f64) -> AgentDNA {
    let mut dna = agent_with_fitness(id, 0.5);
    for universe in Universe::ALL {
        for &t in universe.numeric_traits() {
            dna.universe_mut(universe).set_numeric(t, value);
        }
    }
    dna
}

#[allow(dead_code)]
pub fn with_trait(mut dna: AgentDNA, t: GeneticTrait, value: f64) -> AgentDNA {
    dna.universe_mut(t.universe()).set_numeric(t, value);
    dna
}

/// Small seeded configuration for fast lifecycle tests.
#[allow(dead_code)]
pub fn test_config(population: usize, generation_cycles: u64, seed: u64) -> GenesisConfig {
    let mut config = GenesisConfig::default();
    config.population.population_size = population;
    config.population.generation_cycles = generation_cycles;
    config.population.seed = Some(seed);
    config.social.community_interval = 2;
    config
}

/// Performance data where every formula metric of every universe is `value`.
#[allow(dead_code)]
pub fn uniform_performance(value: f64) -> PerformanceData {
    let mut data = PerformanceData::new();
    for universe in Universe::ALL {
        for (metric, _) in formula(universe) {
            data.insert(universe, metric, value);
        }
    }
    data
}

/// Runtime that reports `score(agent)` for every metric and pairs agents
/// with their neighbour in population order.
#[allow(dead_code)]
pub fn scripted_runtime<F>(
    score: F,
) -> impl FnMut(u64, &Population) -> anyhow::Result<CycleOutput> + Send + 'static
where
    F: Fn(&AgentDNA) -> f64 + Send + 'static,
{
    move |_cycle: u64, population: &Population| -> anyhow::Result<CycleOutput> {
        let performance = population
            .iter()
            .map(|a| (a.agent_id, uniform_performance(score(a))))
            .collect();
        let interactions = population
            .agents()
            .windows(2)
            .map(|w| (w[0].agent_id, w[1].agent_id))
            .collect();
        Ok(CycleOutput {
            performance,
            interactions,
        })
    }
}
