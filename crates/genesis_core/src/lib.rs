//! # Genesis Core
//!
//! The evolution engine behind Genesis: a population of agents whose
//! behavior is driven by a five-universe genome.
//!
//! This crate contains:
//! - Genetic operators (random generation, per-trait crossover, Gaussian mutation)
//! - The fitness engine turning raw per-cycle metrics into weighted scores
//! - Elitist, fitness-proportionate selection and generational reproduction
//! - The population manager state machine and its read-only views
//! - The Neural Web social graph with decay, pruning and community extraction
//! - Configuration, error taxonomy, metrics and structured logging
//!
//! ## Example
//!
//! ```
//! use genesis_core::genetics::{crossover, generate_random, mutate, random_id, MutationParams};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let a = generate_random(random_id(&mut rng), &mut rng);
//! let b = generate_random(random_id(&mut rng), &mut rng);
//!
//! let params = MutationParams::new(0.1, 0.1).unwrap();
//! let child = mutate(&crossover(&a, &b, 0.7, &mut rng), &params, &mut rng);
//! assert_eq!(child.generation, 1);
//! assert_eq!(child.parent_ids, vec![a.agent_id, b.agent_id]);
//! ```

pub mod community;
pub mod config;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod genetics;
pub mod metrics;
pub mod neural_web;
pub mod personality;
pub mod population;
pub mod runtime;
pub mod shutdown;
pub mod stats;
pub mod storage;

pub use config::GenesisConfig;
pub use error::{GenesisError, Result};
pub use population::{LifecycleState, Population, PopulationManager, PopulationReader};
