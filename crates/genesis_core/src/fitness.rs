//! Fitness engine: raw per-cycle performance metrics to weighted scores.

use crate::config::FitnessWeights;
use crate::error::{GenesisError, Result};
use genesis_data::{AgentDNA, FitnessScores, Universe};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Named metrics and their weights for one universe.
#[must_use]
pub fn formula(universe: Universe) -> [(&'static str, f64); 3] {
    match universe {
        Universe::Limbo => [
            ("profit_ratio", 0.4),
            ("decision_accuracy", 0.3),
            ("market_timing", 0.3),
        ],
        Universe::Odyssey => [
            ("creativity_score", 0.4),
            ("popularity_score", 0.3),
            ("innovation_score", 0.3),
        ],
        Universe::Ritual => [
            ("community_engagement", 0.4),
            ("social_influence", 0.3),
            ("subscription_satisfaction", 0.3),
        ],
        Universe::Engine => [
            ("prediction_accuracy", 0.4),
            ("analysis_quality", 0.3),
            ("ai_contributions", 0.3),
        ],
        Universe::Logs => [
            ("delivery_satisfaction", 0.4),
            ("operational_efficiency", 0.3),
            ("problem_resolution", 0.3),
        ],
    }
}

/// Raw metrics for one agent: universe -> metric name -> value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceData {
    pub metrics: BTreeMap<Universe, BTreeMap<String, f64>>,
}

impl PerformanceData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, universe: Universe, metric: &str, value: f64) -> Self {
        self.insert(universe, metric, value);
        self
    }

    pub fn insert(&mut self, universe: Universe, metric: &str, value: f64) {
        self.metrics
            .entry(universe)
            .or_default()
            .insert(metric.to_string(), value);
    }

    /// Absent metrics read as 0.
    #[must_use]
    pub fn get(&self, universe: Universe, metric: &str) -> f64 {
        self.metrics
            .get(&universe)
            .and_then(|m| m.get(metric))
            .copied()
            .unwrap_or(0.0)
    }

    fn first_non_finite(&self) -> Option<(Universe, &str, f64)> {
        self.metrics.iter().find_map(|(u, m)| {
            m.iter()
                .find(|(_, v)| !v.is_finite())
                .map(|(k, v)| (*u, k.as_str(), *v))
        })
    }
}

/// Sums per-cycle records per agent and averages them at the generation
/// boundary.
#[derive(Debug, Default)]
pub struct PerformanceAccumulator {
    totals: HashMap<Uuid, (PerformanceData, u32)>,
}

impl PerformanceAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, agent_id: Uuid, data: &PerformanceData) {
        let (sum, cycles) = self.totals.entry(agent_id).or_default();
        for (universe, metrics) in &data.metrics {
            let slot = sum.metrics.entry(*universe).or_default();
            for (name, value) in metrics {
                *slot.entry(name.clone()).or_insert(0.0) += value;
            }
        }
        *cycles += 1;
    }

    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.totals.len()
    }

    /// Per-agent mean over the cycles that agent reported in.
    #[must_use]
    pub fn averaged(&self) -> HashMap<Uuid, PerformanceData> {
        self.totals
            .iter()
            .map(|(id, (sum, cycles))| {
                let n = f64::from((*cycles).max(1));
                let metrics = sum
                    .metrics
                    .iter()
                    .map(|(u, m)| (*u, m.iter().map(|(k, v)| (k.clone(), v / n)).collect()))
                    .collect();
                (*id, PerformanceData { metrics })
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.totals.clear();
    }
}

/// Outcome of scoring a whole population.
#[derive(Debug)]
pub struct FitnessReport {
    /// Input agents with refreshed `fitness_scores`, same order.
    pub agents: Vec<AgentDNA>,
    /// Recovered per-agent failures; those agents were scored 0.0.
    pub failures: Vec<GenesisError>,
}

#[derive(Debug, Clone)]
pub struct FitnessEngine {
    weights: FitnessWeights,
}

impl FitnessEngine {
    pub fn new(weights: FitnessWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    #[must_use]
    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Score of one universe from its three weighted metrics.
    #[must_use]
    pub fn universe_fitness(universe: Universe, data: &PerformanceData) -> f64 {
        formula(universe)
            .iter()
            .map(|(name, w)| w * data.get(universe, name).clamp(-1.0, 1.0))
            .sum::<f64>()
            .clamp(-1.0, 1.0)
    }

    /// Per-universe and overall fitness for one agent.
    pub fn calculate_fitness(
        &self,
        dna: &AgentDNA,
        data: Option<&PerformanceData>,
    ) -> Result<FitnessScores> {
        let data = data.ok_or_else(|| {
            GenesisError::missing_data(dna.agent_id, "no performance data recorded")
        })?;
        if let Some((universe, metric, value)) = data.first_non_finite() {
            return Err(GenesisError::missing_data(
                dna.agent_id,
                format!("{universe}.{metric} is {value}"),
            ));
        }

        let universes: BTreeMap<Universe, f64> = Universe::ALL
            .iter()
            .map(|u| (*u, Self::universe_fitness(*u, data)))
            .collect();
        let overall = universes
            .iter()
            .map(|(u, f)| self.weights.weight(*u) * f)
            .sum::<f64>()
            .clamp(-1.0, 1.0);
        Ok(FitnessScores { universes, overall })
    }

    /// Scores every agent in parallel. Failures are isolated: the agent gets
    /// zero fitness and the error is returned in the report.
    #[must_use]
    pub fn score_population(
        &self,
        agents: &[AgentDNA],
        performance: &HashMap<Uuid, PerformanceData>,
    ) -> FitnessReport {
        let results: Vec<(AgentDNA, Option<GenesisError>)> = agents
            .par_iter()
            .map(|dna| {
                let mut scored = dna.clone();
                match self.calculate_fitness(dna, performance.get(&dna.agent_id)) {
                    Ok(scores) => {
                        scored.fitness_scores = scores;
                        (scored, None)
                    }
                    Err(e) => {
                        scored.fitness_scores = FitnessScores::zero();
                        (scored, Some(e))
                    }
                }
            })
            .collect();

        let mut report = FitnessReport {
            agents: Vec::with_capacity(results.len()),
            failures: Vec::new(),
        };
        for (dna, failure) in results {
            if let Some(e) = failure {
                tracing::warn!(agent = %dna.agent_id, error = %e, "Fitness evaluation failed, using default");
                report.failures.push(e);
            }
            report.agents.push(dna);
        }
        report
    }
}
