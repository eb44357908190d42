use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five behavioral domains a genome spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Universe {
    /// Market behavior.
    Limbo,
    /// Creativity and personalization.
    Odyssey,
    /// Social behavior.
    Ritual,
    /// Intelligence and analysis.
    Engine,
    /// Operational expectations.
    Logs,
}

impl Universe {
    /// All universes in schema order.
    pub const ALL: [Universe; 5] = [
        Universe::Limbo,
        Universe::Odyssey,
        Universe::Ritual,
        Universe::Engine,
        Universe::Logs,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Universe::Limbo => "limbo",
            Universe::Odyssey => "odyssey",
            Universe::Ritual => "ritual",
            Universe::Engine => "engine",
            Universe::Logs => "logs",
        }
    }

    /// Position of this universe in [`Universe::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Numeric traits of this universe, in schema order.
    #[must_use]
    pub fn numeric_traits(self) -> &'static [GeneticTrait] {
        use GeneticTrait::*;
        match self {
            Universe::Limbo => &[
                RiskTolerance,
                PriceSensitivity,
                QualityPreference,
                NoveltySeeking,
                BrandLoyalty,
            ],
            Universe::Odyssey => &[
                CreativityDrive,
                Experimentation,
                CustomizationDesire,
                InnovationAppetite,
            ],
            Universe::Ritual => &[
                CommunityBonding,
                InfluenceSusceptibility,
                LoyaltyFactor,
                SocialConformity,
                LeadershipTendency,
            ],
            Universe::Engine => &[
                AnalyticalThinking,
                PatternRecognition,
                StrategicPlanning,
                DataInterpretation,
                DecisionConfidence,
            ],
            Universe::Logs => &[
                PatienceLevel,
                ServiceExpectations,
                ComplaintTendency,
                EfficiencyPriority,
                ReliabilityValue,
            ],
        }
    }

    /// Categorical traits of this universe. Only odyssey carries one.
    #[must_use]
    pub fn categorical_traits(self) -> &'static [GeneticTrait] {
        match self {
            Universe::Odyssey => &[GeneticTrait::AestheticBias],
            _ => &[],
        }
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Universe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Universe::ALL
            .iter()
            .copied()
            .find(|u| u.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("unknown universe '{s}'"))
    }
}

/// Named trait inside a universe schema.
///
/// Declaration order is schema order, so ordered maps keyed by this type
/// iterate traits the way the schema lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneticTrait {
    // Limbo
    RiskTolerance,
    PriceSensitivity,
    QualityPreference,
    NoveltySeeking,
    BrandLoyalty,
    // Odyssey
    CreativityDrive,
    Experimentation,
    AestheticBias,
    CustomizationDesire,
    InnovationAppetite,
    // Ritual
    CommunityBonding,
    InfluenceSusceptibility,
    LoyaltyFactor,
    SocialConformity,
    LeadershipTendency,
    // Engine
    AnalyticalThinking,
    PatternRecognition,
    StrategicPlanning,
    DataInterpretation,
    DecisionConfidence,
    // Logs
    PatienceLevel,
    ServiceExpectations,
    ComplaintTendency,
    EfficiencyPriority,
    ReliabilityValue,
}

impl GeneticTrait {
    #[must_use]
    pub fn universe(self) -> Universe {
        use GeneticTrait::*;
        match self {
            RiskTolerance | PriceSensitivity | QualityPreference | NoveltySeeking
            | BrandLoyalty => Universe::Limbo,
            CreativityDrive | Experimentation | AestheticBias | CustomizationDesire
            | InnovationAppetite => Universe::Odyssey,
            CommunityBonding | InfluenceSusceptibility | LoyaltyFactor | SocialConformity
            | LeadershipTendency => Universe::Ritual,
            AnalyticalThinking | PatternRecognition | StrategicPlanning | DataInterpretation
            | DecisionConfidence => Universe::Engine,
            PatienceLevel | ServiceExpectations | ComplaintTendency | EfficiencyPriority
            | ReliabilityValue => Universe::Logs,
        }
    }

    #[must_use]
    pub fn is_categorical(self) -> bool {
        matches!(self, GeneticTrait::AestheticBias)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        use GeneticTrait::*;
        match self {
            RiskTolerance => "risk_tolerance",
            PriceSensitivity => "price_sensitivity",
            QualityPreference => "quality_preference",
            NoveltySeeking => "novelty_seeking",
            BrandLoyalty => "brand_loyalty",
            CreativityDrive => "creativity_drive",
            Experimentation => "experimentation",
            AestheticBias => "aesthetic_bias",
            CustomizationDesire => "customization_desire",
            InnovationAppetite => "innovation_appetite",
            CommunityBonding => "community_bonding",
            InfluenceSusceptibility => "influence_susceptibility",
            LoyaltyFactor => "loyalty_factor",
            SocialConformity => "social_conformity",
            LeadershipTendency => "leadership_tendency",
            AnalyticalThinking => "analytical_thinking",
            PatternRecognition => "pattern_recognition",
            StrategicPlanning => "strategic_planning",
            DataInterpretation => "data_interpretation",
            DecisionConfidence => "decision_confidence",
            PatienceLevel => "patience_level",
            ServiceExpectations => "service_expectations",
            ComplaintTendency => "complaint_tendency",
            EfficiencyPriority => "efficiency_priority",
            ReliabilityValue => "reliability_value",
        }
    }

    /// Dotted path used in mutation logs, e.g. `limbo.risk_tolerance`.
    #[must_use]
    pub fn path(self) -> String {
        format!("{}.{}", self.universe(), self.as_str())
    }
}

impl fmt::Display for GeneticTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed category set for the odyssey aesthetic bias gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AestheticBias {
    Minimalist,
    Maximalist,
    Vintage,
    Futuristic,
    Natural,
    Geometric,
    Organic,
    Industrial,
}

impl AestheticBias {
    pub const ALL: [AestheticBias; 8] = [
        AestheticBias::Minimalist,
        AestheticBias::Maximalist,
        AestheticBias::Vintage,
        AestheticBias::Futuristic,
        AestheticBias::Natural,
        AestheticBias::Geometric,
        AestheticBias::Organic,
        AestheticBias::Industrial,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AestheticBias::Minimalist => "minimalist",
            AestheticBias::Maximalist => "maximalist",
            AestheticBias::Vintage => "vintage",
            AestheticBias::Futuristic => "futuristic",
            AestheticBias::Natural => "natural",
            AestheticBias::Geometric => "geometric",
            AestheticBias::Organic => "organic",
            AestheticBias::Industrial => "industrial",
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AestheticBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
