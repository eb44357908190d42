use super::universe::{AestheticBias, GeneticTrait, Universe};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A single trait value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gene {
    /// Numeric trait in [0.0, 1.0].
    Numeric(f64),
    /// Categorical trait drawn from a fixed set.
    Categorical(AestheticBias),
}

impl Gene {
    #[must_use]
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Gene::Numeric(v) => Some(*v),
            Gene::Categorical(_) => None,
        }
    }

    #[must_use]
    pub fn as_categorical(&self) -> Option<AestheticBias> {
        match self {
            Gene::Categorical(c) => Some(*c),
            Gene::Numeric(_) => None,
        }
    }
}

impl std::fmt::Display for Gene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gene::Numeric(v) => write!(f, "{v:.4}"),
            Gene::Categorical(c) => write!(f, "{c}"),
        }
    }
}

/// Genes of one universe, keyed in schema order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UniverseGenes {
    pub universe: Universe,
    pub genes: BTreeMap<GeneticTrait, Gene>,
}

impl UniverseGenes {
    #[must_use]
    pub fn new(universe: Universe) -> Self {
        Self {
            universe,
            genes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, trait_name: GeneticTrait) -> Option<&Gene> {
        self.genes.get(&trait_name)
    }

    #[must_use]
    pub fn numeric(&self, trait_name: GeneticTrait) -> Option<f64> {
        self.genes.get(&trait_name).and_then(Gene::as_numeric)
    }

    #[must_use]
    pub fn categorical(&self, trait_name: GeneticTrait) -> Option<AestheticBias> {
        self.genes.get(&trait_name).and_then(Gene::as_categorical)
    }

    /// Stores a numeric trait, clamped to [0.0, 1.0].
    pub fn set_numeric(&mut self, trait_name: GeneticTrait, value: f64) {
        self.genes
            .insert(trait_name, Gene::Numeric(value.clamp(0.0, 1.0)));
    }

    pub fn set_categorical(&mut self, trait_name: GeneticTrait, value: AestheticBias) {
        self.genes.insert(trait_name, Gene::Categorical(value));
    }

    /// Numeric traits in schema order.
    pub fn numeric_values(&self) -> impl Iterator<Item = (GeneticTrait, f64)> + '_ {
        self.genes
            .iter()
            .filter_map(|(t, g)| g.as_numeric().map(|v| (*t, v)))
    }

    /// The numeric trait with the highest value. Ties keep schema order.
    #[must_use]
    pub fn dominant_trait(&self) -> Option<(GeneticTrait, f64)> {
        self.numeric_values().fold(None, |best, (t, v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((t, v)),
        })
    }
}

/// Per-universe fitness plus the weighted overall score, all in [-1.0, 1.0].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitnessScores {
    pub universes: BTreeMap<Universe, f64>,
    pub overall: f64,
}

impl FitnessScores {
    /// Every score set to `value`.
    #[must_use]
    pub fn uniform(value: f64) -> Self {
        Self {
            universes: Universe::ALL.iter().map(|u| (*u, value)).collect(),
            overall: value,
        }
    }

    /// Prior assigned to genesis individuals before their first evaluation.
    #[must_use]
    pub fn neutral() -> Self {
        Self::uniform(0.5)
    }

    /// Substitute used when an agent's performance data is unusable.
    #[must_use]
    pub fn zero() -> Self {
        Self::uniform(0.0)
    }

    #[must_use]
    pub fn get(&self, universe: Universe) -> f64 {
        self.universes.get(&universe).copied().unwrap_or(0.0)
    }

    /// Element-wise mean of two score sets.
    #[must_use]
    pub fn mean_of(a: &FitnessScores, b: &FitnessScores) -> Self {
        Self {
            universes: Universe::ALL
                .iter()
                .map(|u| (*u, (a.get(*u) + b.get(*u)) / 2.0))
                .collect(),
            overall: (a.overall + b.overall) / 2.0,
        }
    }
}

impl Default for FitnessScores {
    fn default() -> Self {
        Self::neutral()
    }
}

/// One applied mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationEvent {
    pub trait_name: GeneticTrait,
    pub old_value: Gene,
    pub new_value: Gene,
    pub generation: u32,
}

impl MutationEvent {
    #[must_use]
    pub fn trait_path(&self) -> String {
        self.trait_name.path()
    }
}

/// Complete genome of one agent plus lineage metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentDNA {
    pub agent_id: Uuid,
    pub generation: u32,
    /// Empty for genesis agents, two ids for sexually produced offspring.
    pub parent_ids: Vec<Uuid>,
    pub birth_timestamp: DateTime<Utc>,
    pub limbo: UniverseGenes,
    pub odyssey: UniverseGenes,
    pub ritual: UniverseGenes,
    pub engine: UniverseGenes,
    pub logs: UniverseGenes,
    pub fitness_scores: FitnessScores,
    /// Append-only.
    pub mutation_history: Vec<MutationEvent>,
}

impl AgentDNA {
    /// DNA with empty gene maps. Callers fill the schema in.
    #[must_use]
    pub fn empty(agent_id: Uuid, generation: u32, parent_ids: Vec<Uuid>) -> Self {
        Self {
            agent_id,
            generation,
            parent_ids,
            birth_timestamp: Utc::now(),
            limbo: UniverseGenes::new(Universe::Limbo),
            odyssey: UniverseGenes::new(Universe::Odyssey),
            ritual: UniverseGenes::new(Universe::Ritual),
            engine: UniverseGenes::new(Universe::Engine),
            logs: UniverseGenes::new(Universe::Logs),
            fitness_scores: FitnessScores::neutral(),
            mutation_history: Vec::new(),
        }
    }

    #[must_use]
    pub fn universe(&self, universe: Universe) -> &UniverseGenes {
        match universe {
            Universe::Limbo => &self.limbo,
            Universe::Odyssey => &self.odyssey,
            Universe::Ritual => &self.ritual,
            Universe::Engine => &self.engine,
            Universe::Logs => &self.logs,
        }
    }

    pub fn universe_mut(&mut self, universe: Universe) -> &mut UniverseGenes {
        match universe {
            Universe::Limbo => &mut self.limbo,
            Universe::Odyssey => &mut self.odyssey,
            Universe::Ritual => &mut self.ritual,
            Universe::Engine => &mut self.engine,
            Universe::Logs => &mut self.logs,
        }
    }

    /// Looks a trait up in the universe it belongs to.
    #[must_use]
    pub fn gene(&self, trait_name: GeneticTrait) -> Option<&Gene> {
        self.universe(trait_name.universe()).get(trait_name)
    }

    #[must_use]
    pub fn numeric(&self, trait_name: GeneticTrait) -> Option<f64> {
        self.gene(trait_name).and_then(Gene::as_numeric)
    }

    #[must_use]
    pub fn aesthetic_bias(&self) -> Option<AestheticBias> {
        self.odyssey.categorical(GeneticTrait::AestheticBias)
    }

    #[must_use]
    pub fn overall_fitness(&self) -> f64 {
        self.fitness_scores.overall
    }

    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// True when both genomes carry the same trait values, ignoring
    /// identity, lineage, fitness and history.
    #[must_use]
    pub fn same_traits(&self, other: &AgentDNA) -> bool {
        Universe::ALL
            .iter()
            .all(|u| self.universe(*u).genes == other.universe(*u).genes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_numeric_clamps() {
        let mut genes = UniverseGenes::new(Universe::Limbo);
        genes.set_numeric(GeneticTrait::RiskTolerance, 1.7);
        genes.set_numeric(GeneticTrait::BrandLoyalty, -0.2);
        assert_eq!(genes.numeric(GeneticTrait::RiskTolerance), Some(1.0));
        assert_eq!(genes.numeric(GeneticTrait::BrandLoyalty), Some(0.0));
    }

    #[test]
    fn test_dominant_trait_prefers_first_on_tie() {
        let mut genes = UniverseGenes::new(Universe::Ritual);
        genes.set_numeric(GeneticTrait::CommunityBonding, 0.8);
        genes.set_numeric(GeneticTrait::LoyaltyFactor, 0.8);
        genes.set_numeric(GeneticTrait::SocialConformity, 0.1);
        assert_eq!(
            genes.dominant_trait(),
            Some((GeneticTrait::CommunityBonding, 0.8))
        );
    }

    #[test]
    fn test_fitness_mean_of() {
        let a = FitnessScores::uniform(0.2);
        let b = FitnessScores::uniform(0.6);
        let m = FitnessScores::mean_of(&a, &b);
        assert!((m.overall - 0.4).abs() < 1e-12);
        assert!((m.get(Universe::Logs) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_dna_json_keeps_trait_names() {
        let mut dna = AgentDNA::empty(Uuid::nil(), 0, Vec::new());
        dna.limbo.set_numeric(GeneticTrait::RiskTolerance, 0.25);
        dna.odyssey
            .set_categorical(GeneticTrait::AestheticBias, AestheticBias::Vintage);
        let json = serde_json::to_string(&dna).unwrap();
        assert!(json.contains("\"risk_tolerance\""));
        assert!(json.contains("\"vintage\""));
        let back: AgentDNA = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dna);
    }
}
