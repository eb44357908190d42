//! Population statistics recorded at generation boundaries.

use chrono::Utc;
use genesis_data::{
    AgentDNA, FitnessSummary, GenerationRecord, GeneticTrait, TraitDistribution, Universe,
};
use std::collections::BTreeMap;

/// Sample variance. Zero for fewer than two values.
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = mean(values);
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
}

#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[must_use]
pub fn fitness_summary(values: &[f64]) -> FitnessSummary {
    if values.is_empty() {
        return FitnessSummary::default();
    }
    FitnessSummary {
        mean: mean(values),
        median: median(values),
        std_dev: variance(values).sqrt(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

#[must_use]
pub fn trait_distribution(values: &[f64]) -> TraitDistribution {
    if values.is_empty() {
        return TraitDistribution::default();
    }
    let variance = variance(values);
    TraitDistribution {
        mean: mean(values),
        variance,
        std_dev: variance.sqrt(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Per-trait statistics for every numeric trait, keyed by universe.
#[derive(Debug, Clone, Default)]
pub struct GeneDiversity {
    pub variance: BTreeMap<Universe, BTreeMap<GeneticTrait, f64>>,
    /// Mean trait standard deviation per universe.
    pub universe: BTreeMap<Universe, f64>,
    pub distributions: BTreeMap<GeneticTrait, TraitDistribution>,
}

#[must_use]
pub fn gene_diversity(agents: &[AgentDNA]) -> GeneDiversity {
    let mut out = GeneDiversity::default();
    for universe in Universe::ALL {
        let traits = universe.numeric_traits();
        let mut per_trait = BTreeMap::new();
        let mut std_sum = 0.0;
        for &t in traits {
            let values: Vec<f64> = agents.iter().filter_map(|a| a.numeric(t)).collect();
            let dist = trait_distribution(&values);
            per_trait.insert(t, dist.variance);
            std_sum += dist.std_dev;
            out.distributions.insert(t, dist);
        }
        out.universe.insert(universe, std_sum / traits.len() as f64);
        out.variance.insert(universe, per_trait);
    }
    out
}

/// Everything about a boundary that is not derived from the genomes.
pub struct RecordContext<'a> {
    pub generation: u32,
    pub evaluated: &'a [AgentDNA],
    pub elite_count: usize,
    pub offspring_count: usize,
    pub eligible_count: usize,
    pub used_fallback: bool,
    pub failed_evaluations: usize,
    pub config_fingerprint: &'a str,
}

/// Summarizes the evaluated generation before it is discarded.
#[must_use]
pub fn build_record(ctx: RecordContext) -> GenerationRecord {
    let fitness: Vec<f64> = ctx.evaluated.iter().map(|a| a.overall_fitness()).collect();
    let depths: Vec<f64> = ctx
        .evaluated
        .iter()
        .map(|a| f64::from(a.generation))
        .collect();
    let diversity = gene_diversity(ctx.evaluated);

    GenerationRecord {
        generation: ctx.generation,
        timestamp: Utc::now(),
        population_size: ctx.evaluated.len(),
        fitness: fitness_summary(&fitness),
        gene_diversity: diversity.variance,
        universe_diversity: diversity.universe,
        trait_distributions: diversity.distributions,
        elite_count: ctx.elite_count,
        offspring_count: ctx.offspring_count,
        eligible_count: ctx.eligible_count,
        used_fallback: ctx.used_fallback,
        failed_evaluations: ctx.failed_evaluations,
        mean_lineage_depth: mean(&depths),
        max_lineage_depth: ctx
            .evaluated
            .iter()
            .map(|a| a.generation)
            .max()
            .unwrap_or(0),
        config_fingerprint: ctx.config_fingerprint.to_string(),
    }
}
