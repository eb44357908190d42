//! # Genesis Data
//!
//! Plain data model shared by every Genesis crate: the five universes and
//! their trait schemas, genes, agent DNA, mutation events, fitness scores
//! and immutable generation records.

pub mod data;

pub use data::genome::{AgentDNA, FitnessScores, Gene, MutationEvent, UniverseGenes};
pub use data::record::{FitnessSummary, GenerationRecord, TraitDistribution};
pub use data::universe::{AestheticBias, GeneticTrait, Universe};
