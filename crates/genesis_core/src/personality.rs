//! Personality archetypes derived from dominant traits.

use genesis_data::{AestheticBias, AgentDNA, GeneticTrait, Universe};
use serde::{Deserialize, Serialize};

/// A dominant trait must exceed this to define an archetype.
pub const DOMINANCE_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    BoldSpeculator,
    BargainHunter,
    PremiumPerfectionist,
    InnovativeArtist,
    BornExperimenter,
    CommunityLeader,
    LoyalFollower,
    Balanced,
}

/// Ordered rules: the first universe whose dominant trait matches wins.
const RULES: &[(Universe, GeneticTrait, Personality)] = &[
    (Universe::Limbo, GeneticTrait::RiskTolerance, Personality::BoldSpeculator),
    (Universe::Limbo, GeneticTrait::PriceSensitivity, Personality::BargainHunter),
    (Universe::Limbo, GeneticTrait::QualityPreference, Personality::PremiumPerfectionist),
    (Universe::Odyssey, GeneticTrait::CreativityDrive, Personality::InnovativeArtist),
    (Universe::Odyssey, GeneticTrait::Experimentation, Personality::BornExperimenter),
    (Universe::Ritual, GeneticTrait::CommunityBonding, Personality::CommunityLeader),
    (Universe::Ritual, GeneticTrait::InfluenceSusceptibility, Personality::LoyalFollower),
];

fn matches(dna: &AgentDNA) -> impl Iterator<Item = Personality> + '_ {
    RULES.iter().filter_map(move |(universe, t, personality)| {
        let (dominant, value) = dna.universe(*universe).dominant_trait()?;
        (dominant == *t && value > DOMINANCE_THRESHOLD).then_some(*personality)
    })
}

/// Primary archetype of a genome.
#[must_use]
pub fn classify(dna: &AgentDNA) -> Personality {
    matches(dna).next().unwrap_or(Personality::Balanced)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    pub primary: Personality,
    pub archetypes: Vec<Personality>,
    pub aesthetic_bias: Option<AestheticBias>,
}

/// Every matching archetype plus the aesthetic bias.
#[must_use]
pub fn profile(dna: &AgentDNA) -> PersonalityProfile {
    let archetypes: Vec<Personality> = matches(dna).collect();
    PersonalityProfile {
        primary: archetypes.first().copied().unwrap_or(Personality::Balanced),
        archetypes,
        aesthetic_bias: dna.aesthetic_bias(),
    }
}
