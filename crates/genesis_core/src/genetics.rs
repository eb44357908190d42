//! Genetic operators over [`AgentDNA`].
//!
//! All operators are pure: they read their inputs, draw from the injected
//! RNG and return a fresh genome. Nothing here touches shared state, so the
//! evolution engine can fan them out across a worker pool.

use crate::error::{GenesisError, Result};
use genesis_data::{AestheticBias, AgentDNA, Gene, GeneticTrait, MutationEvent, Universe};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use uuid::Uuid;

/// Draws a fresh agent id from the RNG, so seeded runs get stable ids.
pub fn random_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Uuid::from_u128(rng.gen())
}

fn random_bias<R: Rng + ?Sized>(rng: &mut R) -> AestheticBias {
    AestheticBias::ALL[rng.gen_range(0..AestheticBias::ALL.len())]
}

/// Genesis genome: every numeric trait uniform in [0, 1], every categorical
/// trait uniform over its categories.
pub fn generate_random<R: Rng + ?Sized>(agent_id: Uuid, rng: &mut R) -> AgentDNA {
    let mut dna = AgentDNA::empty(agent_id, 0, Vec::new());
    for universe in Universe::ALL {
        let genes = dna.universe_mut(universe);
        for &t in universe.numeric_traits() {
            genes.set_numeric(t, rng.gen::<f64>());
        }
        for &t in universe.categorical_traits() {
            genes.set_categorical(t, random_bias(rng));
        }
    }
    dna
}

/// `n` genesis genomes with RNG-derived ids.
pub fn generate_population<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<AgentDNA> {
    (0..n)
        .map(|_| {
            let id = random_id(rng);
            generate_random(id, rng)
        })
        .collect()
}

/// Per-trait crossover.
///
/// With probability `crossover_rate` a numeric trait is blended as
/// `w * a + (1 - w) * b` with a fresh `w ~ U(0, 1)`; otherwise one parent's
/// value is taken 50/50. Categorical traits always come from one parent.
pub fn crossover<R: Rng + ?Sized>(
    parent_a: &AgentDNA,
    parent_b: &AgentDNA,
    crossover_rate: f64,
    rng: &mut R,
) -> AgentDNA {
    let child_id = random_id(rng);
    let generation = parent_a.generation.max(parent_b.generation) + 1;
    let mut child = AgentDNA::empty(
        child_id,
        generation,
        vec![parent_a.agent_id, parent_b.agent_id],
    );

    for universe in Universe::ALL {
        let (ga, gb) = (parent_a.universe(universe), parent_b.universe(universe));
        for &t in universe.numeric_traits() {
            let a = ga.numeric(t).unwrap_or(0.5);
            let b = gb.numeric(t).unwrap_or(0.5);
            let value = if rng.gen::<f64>() < crossover_rate {
                let w = rng.gen::<f64>();
                w * a + (1.0 - w) * b
            } else if rng.gen_bool(0.5) {
                a
            } else {
                b
            };
            child.universe_mut(universe).set_numeric(t, value);
        }
        for &t in universe.categorical_traits() {
            let inherited = if rng.gen_bool(0.5) {
                ga.categorical(t)
            } else {
                gb.categorical(t)
            };
            let value = match inherited {
                Some(v) => v,
                None => random_bias(rng),
            };
            child.universe_mut(universe).set_categorical(t, value);
        }
    }

    child.fitness_scores =
        genesis_data::FitnessScores::mean_of(&parent_a.fitness_scores, &parent_b.fitness_scores);
    child
}

/// Validated mutation parameters. Immutable once built, so the cached noise
/// distribution always matches `sigma`.
#[derive(Debug, Clone, Copy)]
pub struct MutationParams {
    rate: f64,
    sigma: f64,
    noise: Normal<f64>,
}

impl MutationParams {
    pub fn new(rate: f64, sigma: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(GenesisError::config(format!(
                "mutation_rate must be in [0, 1], got {rate}"
            )));
        }
        let noise = Normal::new(0.0, sigma)
            .map_err(|e| GenesisError::config(format!("mutation_sigma {sigma}: {e}")))?;
        Ok(Self { rate, sigma, noise })
    }

    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

/// Gaussian point mutation.
///
/// Each numeric trait mutates with probability `rate` (noise `N(0, sigma)`,
/// clamped back into [0, 1]); each categorical trait is replaced with a
/// different category with the same probability. Every applied mutation is
/// appended to `mutation_history`. A rate of zero returns the input as-is.
pub fn mutate<R: Rng + ?Sized>(dna: &AgentDNA, params: &MutationParams, rng: &mut R) -> AgentDNA {
    let mut out = dna.clone();
    if params.rate <= 0.0 {
        return out;
    }

    for universe in Universe::ALL {
        for &t in universe.numeric_traits() {
            if rng.gen::<f64>() >= params.rate {
                continue;
            }
            let old = out.universe(universe).numeric(t).unwrap_or(0.5);
            let new = (old + params.noise.sample(rng)).clamp(0.0, 1.0);
            out.universe_mut(universe).set_numeric(t, new);
            out.mutation_history.push(MutationEvent {
                trait_name: t,
                old_value: Gene::Numeric(old),
                new_value: Gene::Numeric(new),
                generation: out.generation,
            });
        }
        for &t in universe.categorical_traits() {
            if rng.gen::<f64>() >= params.rate {
                continue;
            }
            let Some(old) = out.universe(universe).categorical(t) else {
                continue;
            };
            let new = different_bias(old, rng);
            out.universe_mut(universe).set_categorical(t, new);
            out.mutation_history.push(MutationEvent {
                trait_name: t,
                old_value: Gene::Categorical(old),
                new_value: Gene::Categorical(new),
                generation: out.generation,
            });
        }
    }
    out
}

fn different_bias<R: Rng + ?Sized>(current: AestheticBias, rng: &mut R) -> AestheticBias {
    let mut idx = rng.gen_range(0..AestheticBias::ALL.len() - 1);
    if idx >= current.index() {
        idx += 1;
    }
    AestheticBias::ALL[idx]
}

/// Checks that every schema trait is present and every numeric value lies
/// in [0, 1].
pub fn validate_dna(dna: &AgentDNA) -> Result<()> {
    for universe in Universe::ALL {
        let genes = dna.universe(universe);
        for &t in universe.numeric_traits() {
            match genes.numeric(t) {
                Some(v) if (0.0..=1.0).contains(&v) => {}
                Some(v) => return Err(invalid(t, v)),
                None => return Err(invalid(t, f64::NAN)),
            }
        }
        for &t in universe.categorical_traits() {
            if genes.categorical(t).is_none() {
                return Err(invalid(t, f64::NAN));
            }
        }
    }
    Ok(())
}

fn invalid(t: GeneticTrait, value: f64) -> GenesisError {
    GenesisError::InvalidGeneValue {
        path: t.path(),
        value,
    }
}
