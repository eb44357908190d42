//! Selection and generational reproduction.
//!
//! One call to [`EvolutionEngine::evolve_generation`] turns an evaluated
//! population into the next one: rank, keep elites, build the eligible pool,
//! fill the remaining slots with mutated crossover offspring and summarize
//! the evaluated generation in a [`GenerationRecord`].

use crate::config::GenesisConfig;
use crate::error::{GenesisError, Result};
use crate::genetics::{crossover, mutate, MutationParams};
use crate::stats::{build_record, RecordContext};
use genesis_data::{AgentDNA, GenerationRecord};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::cmp::Ordering;
use uuid::Uuid;

/// Keeps zero-fitness agents selectable.
const SELECTION_EPSILON: f64 = 1e-6;
const MIN_PARENTS: usize = 2;

/// Result of one generation boundary.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// Elites first in rank order, then offspring.
    pub next: Vec<AgentDNA>,
    pub record: GenerationRecord,
    pub elite_ids: Vec<Uuid>,
    pub eligible_ids: Vec<Uuid>,
    pub used_fallback: bool,
    pub parent_pairs: Vec<(Uuid, Uuid)>,
}

#[derive(Debug, Clone)]
pub struct EvolutionEngine {
    elite_ratio: f64,
    reproduction_threshold: f64,
    crossover_rate: f64,
    mutation: MutationParams,
    fingerprint: String,
}

/// Descending by overall fitness, ties to the lower id.
fn rank_order(a: &AgentDNA, b: &AgentDNA) -> Ordering {
    b.overall_fitness()
        .total_cmp(&a.overall_fitness())
        .then_with(|| a.agent_id.cmp(&b.agent_id))
}

/// Indices of `agents` from best to worst.
#[must_use]
pub fn rank(agents: &[AgentDNA]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..agents.len()).collect();
    idx.sort_by(|&i, &j| rank_order(&agents[i], &agents[j]));
    idx
}

/// Fitness-proportionate weights shifted so every weight is positive.
fn selection_weights(pool: &[&AgentDNA]) -> Vec<f64> {
    let min = pool
        .iter()
        .map(|a| a.overall_fitness())
        .fold(f64::INFINITY, f64::min);
    let shift = min.min(0.0);
    pool.iter()
        .map(|a| a.overall_fitness() - shift + SELECTION_EPSILON)
        .collect()
}

impl EvolutionEngine {
    pub fn from_config(config: &GenesisConfig) -> Result<Self> {
        let e = &config.evolution;
        Ok(Self {
            elite_ratio: e.elite_ratio,
            reproduction_threshold: e.reproduction_threshold,
            crossover_rate: e.crossover_rate,
            mutation: MutationParams::new(e.mutation_rate, e.mutation_sigma)?,
            fingerprint: config.fingerprint(),
        })
    }

    #[must_use]
    pub fn elite_count(&self, population_size: usize) -> usize {
        (self.elite_ratio * population_size as f64).floor() as usize
    }

    /// Picks two distinct pool indices, the second drawn with the first
    /// excluded.
    fn pick_parents<R: Rng + ?Sized>(
        weights: &[f64],
        first_dist: &WeightedIndex<f64>,
        rng: &mut R,
    ) -> Result<(usize, usize)> {
        let first = first_dist.sample(rng);
        let mut rest = weights.to_vec();
        rest[first] = 0.0;
        let second = WeightedIndex::new(&rest)
            .map_err(|e| GenesisError::Runtime(format!("parent selection: {e}")))?
            .sample(rng);
        Ok((first, second))
    }

    /// Advances one generation. `evaluated` must carry fresh fitness scores.
    pub fn evolve_generation<R: Rng + ?Sized>(
        &self,
        generation: u32,
        evaluated: &[AgentDNA],
        failed_evaluations: usize,
        rng: &mut R,
    ) -> Result<EvolutionOutcome> {
        let n = evaluated.len();
        if n < MIN_PARENTS {
            return Err(GenesisError::DegenerateEligiblePool {
                eligible: n,
                required: MIN_PARENTS,
            });
        }

        let ranked: Vec<&AgentDNA> = rank(evaluated).into_iter().map(|i| &evaluated[i]).collect();
        let elite_count = self.elite_count(n);
        let elites: Vec<AgentDNA> = ranked[..elite_count].iter().map(|a| (*a).clone()).collect();

        let mut pool: Vec<&AgentDNA> = ranked
            .iter()
            .copied()
            .filter(|a| a.overall_fitness() >= self.reproduction_threshold)
            .collect();
        let used_fallback = pool.len() < MIN_PARENTS;
        if used_fallback {
            let err = GenesisError::DegenerateEligiblePool {
                eligible: pool.len(),
                required: MIN_PARENTS,
            };
            tracing::warn!(generation, error = %err, "Falling back to top-ranked parents");
            pool = ranked[..MIN_PARENTS].to_vec();
        }

        let weights = selection_weights(&pool);
        let dist = WeightedIndex::new(&weights)
            .map_err(|e| GenesisError::Runtime(format!("parent selection: {e}")))?;

        let offspring_count = n - elite_count;
        let mut plans = Vec::with_capacity(offspring_count);
        for _ in 0..offspring_count {
            let (i, j) = Self::pick_parents(&weights, &dist, rng)?;
            plans.push((pool[i], pool[j], rng.gen::<u64>()));
        }

        let offspring: Vec<AgentDNA> = plans
            .par_iter()
            .map(|(a, b, seed)| {
                let mut child_rng = ChaCha8Rng::seed_from_u64(*seed);
                let child = crossover(a, b, self.crossover_rate, &mut child_rng);
                mutate(&child, &self.mutation, &mut child_rng)
            })
            .collect();

        let record = build_record(RecordContext {
            generation,
            evaluated,
            elite_count,
            offspring_count,
            eligible_count: pool.len(),
            used_fallback,
            failed_evaluations,
            config_fingerprint: &self.fingerprint,
        });

        let elite_ids = elites.iter().map(|a| a.agent_id).collect();
        let eligible_ids = pool.iter().map(|a| a.agent_id).collect();
        let parent_pairs = plans.iter().map(|(a, b, _)| (a.agent_id, b.agent_id)).collect();

        let mut next = elites;
        next.extend(offspring);
        debug_assert_eq!(next.len(), n);

        tracing::info!(
            generation,
            population = n,
            elites = elite_count,
            offspring = offspring_count,
            eligible = pool.len(),
            best = record.fitness.max,
            mean = record.fitness.mean,
            "Generation evolved"
        );

        Ok(EvolutionOutcome {
            next,
            record,
            elite_ids,
            eligible_ids,
            used_fallback,
            parent_pairs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::generate_random;
    use genesis_data::FitnessScores;

    fn population(fitness: &[f64], rng: &mut ChaCha8Rng) -> Vec<AgentDNA> {
        fitness
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let mut dna = generate_random(Uuid::from_u128(i as u128 + 1), rng);
                dna.fitness_scores = FitnessScores::uniform(*f);
                dna
            })
            .collect()
    }

    fn engine(elite_ratio: f64, threshold: f64) -> EvolutionEngine {
        let mut config = GenesisConfig::default();
        config.evolution.elite_ratio = elite_ratio;
        config.evolution.reproduction_threshold = threshold;
        EvolutionEngine::from_config(&config).unwrap()
    }

    #[test]
    fn test_rank_breaks_ties_by_id() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let pop = population(&[0.5, 0.9, 0.5], &mut rng);
        assert_eq!(rank(&pop), vec![1, 0, 2]);
    }

    #[test]
    fn test_population_size_is_conserved() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let pop = population(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7], &mut rng);
        let out = engine(0.3, 0.0)
            .evolve_generation(0, &pop, 0, &mut rng)
            .unwrap();
        assert_eq!(out.next.len(), 7);
        assert_eq!(out.record.elite_count + out.record.offspring_count, 7);
        assert_eq!(out.elite_ids.len(), 2);
    }

    #[test]
    fn test_elites_copied_unchanged() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let pop = population(&[0.2, 0.8, 0.6, 0.4], &mut rng);
        let out = engine(0.5, 0.0)
            .evolve_generation(0, &pop, 0, &mut rng)
            .unwrap();
        assert_eq!(out.next[0], pop[1]);
        assert_eq!(out.next[1], pop[2]);
    }

    #[test]
    fn test_offspring_parents_distinct_and_from_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let pop = population(&[0.9, 0.7, 0.3, 0.1, 0.6, 0.2], &mut rng);
        let out = engine(0.2, 0.5)
            .evolve_generation(0, &pop, 0, &mut rng)
            .unwrap();
        assert!(!out.used_fallback);
        for (a, b) in &out.parent_pairs {
            assert_ne!(a, b);
            assert!(out.eligible_ids.contains(a));
            assert!(out.eligible_ids.contains(b));
        }
        for child in &out.next[out.elite_ids.len()..] {
            assert_eq!(child.parent_ids.len(), 2);
            assert_eq!(child.generation, 1);
        }
    }

    #[test]
    fn test_fallback_when_pool_degenerate() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let pop = population(&[0.2, 0.1, 0.3, 0.0], &mut rng);
        let out = engine(0.25, 0.9)
            .evolve_generation(0, &pop, 0, &mut rng)
            .unwrap();
        assert!(out.used_fallback);
        assert!(out.record.used_fallback);
        assert_eq!(out.eligible_ids, vec![pop[2].agent_id, pop[0].agent_id]);
        assert_eq!(out.next.len(), 4);
    }

    #[test]
    fn test_negative_fitness_still_selectable() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let pop = population(&[-0.5, -0.9, -0.2], &mut rng);
        let out = engine(0.3, -1.0)
            .evolve_generation(0, &pop, 0, &mut rng)
            .unwrap();
        assert_eq!(out.next.len(), 3);
    }

    #[test]
    fn test_same_seed_same_offspring() {
        let mut setup = ChaCha8Rng::seed_from_u64(7);
        let pop = population(&[0.9, 0.7, 0.3, 0.1, 0.5], &mut setup);
        let e = engine(0.2, 0.0);
        let a = e
            .evolve_generation(0, &pop, 0, &mut ChaCha8Rng::seed_from_u64(42))
            .unwrap();
        let b = e
            .evolve_generation(0, &pop, 0, &mut ChaCha8Rng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a.parent_pairs, b.parent_pairs);
        for (x, y) in a.next.iter().zip(&b.next) {
            assert_eq!(x.agent_id, y.agent_id);
            assert!(x.same_traits(y));
        }
    }

    #[test]
    fn test_too_small_population_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let pop = population(&[0.5], &mut rng);
        assert!(engine(0.5, 0.0)
            .evolve_generation(0, &pop, 0, &mut rng)
            .is_err());
    }
}
