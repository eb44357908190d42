//! Configuration management for evolution parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every section has defaults, so a file only needs
//! the values it overrides.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [population]
//! population_size = 100
//! generation_cycles = 100
//! seed = 42
//!
//! [evolution]
//! elite_ratio = 0.2
//! mutation_rate = 0.1
//!
//! [fitness.weights]
//! limbo = 0.25
//! odyssey = 0.20
//! ritual = 0.25
//! engine = 0.15
//! logs = 0.15
//!
//! [social]
//! edge_threshold = 0.5
//! decay_factor = 0.95
//! ```

use crate::error::{GenesisError, Result};
use genesis_data::Universe;
use serde::{Deserialize, Serialize};

/// Tolerance used when checking that fitness weights sum to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(GenesisError::InvalidConfiguration(format!($($arg)+)));
        }
    };
}

/// Population size and generation pacing.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PopulationConfig {
    /// Constant population size `N`.
    pub population_size: usize,
    /// Cycles between generation boundaries.
    pub generation_cycles: u64,
    /// Seed for the master RNG. `None` draws one from entropy.
    pub seed: Option<u64>,
    /// Default target for `run_simulation` when the caller gives none.
    pub max_generations: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generation_cycles: 100,
            seed: None,
            max_generations: 1000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EvolutionConfig {
    pub elite_ratio: f64,
    pub mutation_rate: f64,
    /// Standard deviation of the Gaussian mutation noise.
    pub mutation_sigma: f64,
    pub crossover_rate: f64,
    pub reproduction_threshold: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            elite_ratio: 0.2,
            mutation_rate: 0.1,
            mutation_sigma: 0.1,
            crossover_rate: 0.7,
            reproduction_threshold: 0.0,
        }
    }
}

/// Contribution of each universe to overall fitness.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FitnessWeights {
    pub limbo: f64,
    pub odyssey: f64,
    pub ritual: f64,
    pub engine: f64,
    pub logs: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            limbo: 0.25,
            odyssey: 0.20,
            ritual: 0.25,
            engine: 0.15,
            logs: 0.15,
        }
    }
}

impl FitnessWeights {
    #[must_use]
    pub fn weight(&self, universe: Universe) -> f64 {
        match universe {
            Universe::Limbo => self.limbo,
            Universe::Odyssey => self.odyssey,
            Universe::Ritual => self.ritual,
            Universe::Engine => self.engine,
            Universe::Logs => self.logs,
        }
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        Universe::ALL.iter().map(|u| self.weight(*u)).sum()
    }

    pub fn validate(&self) -> Result<()> {
        for universe in Universe::ALL {
            let w = self.weight(universe);
            ensure_config!(
                w.is_finite() && w >= 0.0,
                "Fitness weight for {universe} must be a non-negative number, got {w}"
            );
        }
        let sum = self.sum();
        ensure_config!(
            (sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE,
            "Fitness weights must sum to 1.0, got {sum}"
        );
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct FitnessConfig {
    pub weights: FitnessWeights,
}

/// Community extraction algorithm for the neural web.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommunityMethod {
    #[default]
    ConnectedComponents,
    LabelPropagation,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SocialConfig {
    /// Minimum compatibility for an interaction to create or reinforce an edge.
    pub edge_threshold: f64,
    /// Geometric decay applied to edges not reinforced in a cycle.
    pub decay_factor: f64,
    /// Edges lighter than this are removed.
    pub prune_epsilon: f64,
    pub learning_rate: f64,
    /// Cycles between community extractions. Zero disables periodic runs.
    pub community_interval: u64,
    pub community_method: CommunityMethod,
    pub label_propagation_iterations: usize,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 0.5,
            decay_factor: 0.95,
            prune_epsilon: 0.01,
            learning_rate: 0.1,
            community_interval: 10,
            community_method: CommunityMethod::ConnectedComponents,
            label_propagation_iterations: 20,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct GenesisConfig {
    pub population: PopulationConfig,
    pub evolution: EvolutionConfig,
    pub fitness: FitnessConfig,
    pub social: SocialConfig,
}

impl GenesisConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or
    /// [`GenesisError::InvalidConfiguration`] describing the first failure.
    pub fn validate(&self) -> Result<()> {
        let p = &self.population;
        ensure_config!(
            p.population_size >= 2,
            "population_size must be at least 2, got {}",
            p.population_size
        );
        ensure_config!(
            p.generation_cycles > 0,
            "generation_cycles must be positive"
        );

        let e = &self.evolution;
        ensure_config!(
            e.elite_ratio > 0.0 && e.elite_ratio < 1.0,
            "elite_ratio must be in (0, 1), got {}",
            e.elite_ratio
        );
        ensure_config!(
            (0.0..=1.0).contains(&e.mutation_rate),
            "mutation_rate must be in [0, 1], got {}",
            e.mutation_rate
        );
        ensure_config!(
            e.mutation_sigma.is_finite() && e.mutation_sigma >= 0.0,
            "mutation_sigma must be non-negative, got {}",
            e.mutation_sigma
        );
        ensure_config!(
            (0.0..=1.0).contains(&e.crossover_rate),
            "crossover_rate must be in [0, 1], got {}",
            e.crossover_rate
        );
        ensure_config!(
            (-1.0..=1.0).contains(&e.reproduction_threshold),
            "reproduction_threshold must be in [-1, 1], got {}",
            e.reproduction_threshold
        );

        self.fitness.weights.validate()?;

        let s = &self.social;
        ensure_config!(
            s.edge_threshold > 0.0 && s.edge_threshold <= 1.0,
            "edge_threshold must be in (0, 1], got {}",
            s.edge_threshold
        );
        ensure_config!(
            s.decay_factor > 0.0 && s.decay_factor < 1.0,
            "decay_factor must be in (0, 1), got {}",
            s.decay_factor
        );
        ensure_config!(
            s.prune_epsilon > 0.0 && s.prune_epsilon < 1.0,
            "prune_epsilon must be in (0, 1), got {}",
            s.prune_epsilon
        );
        ensure_config!(
            s.learning_rate > 0.0 && s.learning_rate <= 1.0,
            "learning_rate must be in (0, 1], got {}",
            s.learning_rate
        );
        ensure_config!(
            s.label_propagation_iterations > 0,
            "label_propagation_iterations must be positive"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(content)
            .map_err(|e| GenesisError::config(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Number of elites carried into every next generation.
    #[must_use]
    pub fn elite_count(&self) -> usize {
        (self.evolution.elite_ratio * self.population.population_size as f64).floor() as usize
    }

    /// Digest of the parameters that shape evolution, stamped on every
    /// generation record.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.population.population_size.to_le_bytes());
        hasher.update(self.population.generation_cycles.to_le_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hasher.update(format!("{:?}", self.fitness).as_bytes());
        hasher.update(format!("{:?}", self.social).as_bytes());
        hex::encode(hasher.finalize())
    }
}
