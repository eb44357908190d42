//! Synthetic agent runtime used by the CLI.
//!
//! Each agent's metrics are derived from its own genes plus Gaussian noise,
//! so selection pressure is real but the run needs no external services.
//! Encounters are sampled uniformly: every agent meets a fixed number of
//! random partners per cycle.

use genesis_core::fitness::PerformanceData;
use genesis_core::population::Population;
use genesis_core::runtime::{AgentRuntime, CycleOutput};
use genesis_data::{AgentDNA, GeneticTrait as T, Universe};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;

pub struct SyntheticRuntime {
    rng: ChaCha8Rng,
    noise: Normal<f64>,
    encounters_per_agent: usize,
}

impl SyntheticRuntime {
    pub fn new(seed: Option<u64>, noise_sigma: f64, encounters_per_agent: usize) -> anyhow::Result<Self> {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            rng,
            noise: Normal::new(0.0, noise_sigma)?,
            encounters_per_agent,
        })
    }

    fn gene(dna: &AgentDNA, t: T) -> f64 {
        dna.numeric(t).unwrap_or(0.5)
    }

    fn noisy(&mut self, value: f64) -> f64 {
        (value + self.noise.sample(&mut self.rng)).clamp(-1.0, 1.0)
    }

    fn performance(&mut self, dna: &AgentDNA) -> PerformanceData {
        let g = |t| Self::gene(dna, t);
        let mut data = PerformanceData::new();

        // Risky agents swing harder in both directions.
        let market = self.rng.gen_range(-1.0f64..1.0) * g(T::RiskTolerance);
        let profit = 0.5 * g(T::QualityPreference) + 0.5 * (1.0 - g(T::PriceSensitivity)) - 0.5 + market;
        data.insert(Universe::Limbo, "profit_ratio", self.noisy(profit));
        let accuracy = (g(T::AnalyticalThinking) + g(T::BrandLoyalty)) / 2.0;
        data.insert(Universe::Limbo, "decision_accuracy", self.noisy(accuracy));
        data.insert(Universe::Limbo, "market_timing", self.noisy(g(T::RiskTolerance)));

        data.insert(Universe::Odyssey, "creativity_score", self.noisy(g(T::CreativityDrive)));
        let popularity = g(T::CreativityDrive) * g(T::Experimentation);
        data.insert(Universe::Odyssey, "popularity_score", self.noisy(popularity));
        let innovation = (g(T::Experimentation) + g(T::InnovationAppetite)) / 2.0;
        data.insert(Universe::Odyssey, "innovation_score", self.noisy(innovation));

        data.insert(Universe::Ritual, "community_engagement", self.noisy(g(T::CommunityBonding)));
        data.insert(Universe::Ritual, "social_influence", self.noisy(g(T::LeadershipTendency)));
        let satisfaction = (g(T::CommunityBonding)
            + (1.0 - g(T::InfluenceSusceptibility))
            + g(T::LeadershipTendency))
            / 3.0;
        data.insert(Universe::Ritual, "subscription_satisfaction", self.noisy(satisfaction));

        let prediction = (g(T::AnalyticalThinking) + g(T::PatternRecognition)) / 2.0;
        data.insert(Universe::Engine, "prediction_accuracy", self.noisy(prediction));
        let analysis = (g(T::AnalyticalThinking) + g(T::DataInterpretation)) / 2.0;
        data.insert(Universe::Engine, "analysis_quality", self.noisy(analysis));
        let contributions = (g(T::StrategicPlanning) + g(T::DecisionConfidence)) / 2.0;
        data.insert(Universe::Engine, "ai_contributions", self.noisy(contributions));

        let delivery = self.rng.gen::<f64>();
        let felt = if delivery < 0.5 {
            delivery * g(T::PatienceLevel)
        } else {
            delivery
        };
        data.insert(Universe::Logs, "delivery_satisfaction", self.noisy(felt));
        let complaints = if delivery < g(T::ServiceExpectations) {
            g(T::ComplaintTendency)
        } else {
            0.0
        };
        let efficiency = 1.0 - complaints * (1.0 - g(T::EfficiencyPriority));
        data.insert(Universe::Logs, "operational_efficiency", self.noisy(efficiency));
        let resolution = (g(T::PatienceLevel) + g(T::ReliabilityValue)) / 2.0;
        data.insert(Universe::Logs, "problem_resolution", self.noisy(resolution));

        data
    }
}

impl AgentRuntime for SyntheticRuntime {
    fn run_cycle(&mut self, _cycle: u64, population: &Population) -> anyhow::Result<CycleOutput> {
        let agents = population.agents();
        let mut performance = HashMap::with_capacity(agents.len());
        for dna in agents {
            let data = self.performance(dna);
            performance.insert(dna.agent_id, data);
        }

        let mut interactions = Vec::with_capacity(agents.len() * self.encounters_per_agent);
        if agents.len() > 1 {
            for (i, dna) in agents.iter().enumerate() {
                for _ in 0..self.encounters_per_agent {
                    let mut j = self.rng.gen_range(0..agents.len() - 1);
                    if j >= i {
                        j += 1;
                    }
                    interactions.push((dna.agent_id, agents[j].agent_id));
                }
            }
        }

        Ok(CycleOutput {
            performance,
            interactions,
        })
    }
}
