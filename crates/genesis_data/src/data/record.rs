use super::universe::{GeneticTrait, Universe};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Distribution of overall fitness across a population.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Population-wide statistics for one numeric trait.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitDistribution {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Immutable snapshot taken at a generation boundary.
///
/// Summarizes the generation that was just evaluated, before it was
/// replaced by its offspring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: u32,
    pub timestamp: DateTime<Utc>,
    pub population_size: usize,
    pub fitness: FitnessSummary,
    /// Variance per trait, per universe.
    pub gene_diversity: BTreeMap<Universe, BTreeMap<GeneticTrait, f64>>,
    /// Mean trait standard deviation per universe.
    pub universe_diversity: BTreeMap<Universe, f64>,
    pub trait_distributions: BTreeMap<GeneticTrait, TraitDistribution>,
    pub elite_count: usize,
    pub offspring_count: usize,
    pub eligible_count: usize,
    pub used_fallback: bool,
    pub failed_evaluations: usize,
    pub mean_lineage_depth: f64,
    pub max_lineage_depth: u32,
    pub config_fingerprint: String,
}

impl GenerationRecord {
    #[must_use]
    pub fn variance(&self, trait_name: GeneticTrait) -> Option<f64> {
        self.gene_diversity
            .get(&trait_name.universe())
            .and_then(|m| m.get(&trait_name))
            .copied()
    }
}
