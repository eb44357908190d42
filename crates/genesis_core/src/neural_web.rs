//! The Neural Web: a weighted social graph keyed by agent id.
//!
//! The graph never owns genomes. Compatibility is scored against the DNA
//! the caller passes in, and only ids are stored as nodes. Edges are
//! reinforced by compatible interactions, decay geometrically when left
//! alone, and are removed once they fall below the pruning threshold.

use crate::community::{self, CommunityPartition};
use crate::config::{CommunityMethod, SocialConfig};
use crate::error::{GenesisError, Result};
use genesis_data::{AgentDNA, GeneticTrait, Universe};
use petgraph::graphmap::UnGraphMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use uuid::Uuid;

/// Influence retained per hop, before the edge weight is applied.
pub const INFLUENCE_HOP_FACTOR: f64 = 0.8;
/// Spread stops once influence drops below this.
pub const INFLUENCE_FLOOR: f64 = 0.1;

fn universe_weight(universe: Universe) -> f64 {
    match universe {
        Universe::Ritual => 0.4,
        _ => 0.15,
    }
}

fn trait_weight(t: GeneticTrait) -> f64 {
    let base = universe_weight(t.universe());
    match t {
        GeneticTrait::CommunityBonding | GeneticTrait::InfluenceSusceptibility => base * 2.0,
        _ => base,
    }
}

/// Social affinity in [0, 1]: one minus the weighted mean absolute trait
/// distance. Ritual traits weigh most. Categorical traits are not compared.
#[must_use]
pub fn compatibility(a: &AgentDNA, b: &AgentDNA) -> f64 {
    let mut distance = 0.0;
    let mut total = 0.0;
    for universe in Universe::ALL {
        for &t in universe.numeric_traits() {
            if let (Some(x), Some(y)) = (a.numeric(t), b.numeric(t)) {
                let w = trait_weight(t);
                distance += w * (x - y).abs();
                total += w;
            }
        }
    }
    if total == 0.0 {
        return 0.0;
    }
    (1.0 - distance / total).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    Collaborator,
    Friend,
    Acquaintance,
    Rival,
}

impl ConnectionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collaborator => "collaborator",
            Self::Friend => "friend",
            Self::Acquaintance => "acquaintance",
            Self::Rival => "rival",
        }
    }

    #[must_use]
    pub fn from_compatibility(score: f64) -> Self {
        if score >= 0.8 {
            Self::Collaborator
        } else if score >= 0.6 {
            Self::Friend
        } else if score >= 0.4 {
            Self::Acquaintance
        } else {
            Self::Rival
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialEdge {
    /// Always in (0, 1].
    pub weight: f64,
    pub kind: ConnectionKind,
    pub interactions: u32,
    pub created_cycle: u64,
    pub last_reinforced_cycle: u64,
}

/// What one cycle did to the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleUpdate {
    pub evaluated: usize,
    pub created: usize,
    pub reinforced: usize,
    pub decayed: usize,
    pub pruned: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialMetrics {
    pub degree: usize,
    pub degree_centrality: f64,
    pub strength: f64,
    pub mean_weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub mean_weight: f64,
    pub mean_degree: f64,
    pub community_count: usize,
    pub kinds: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub a: Uuid,
    pub b: Uuid,
    #[serde(flatten)]
    pub edge: SocialEdge,
}

/// Owned copy of the graph for read-only consumers and for persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSnapshot {
    pub cycle: u64,
    pub nodes: Vec<Uuid>,
    pub edges: Vec<EdgeSnapshot>,
}

#[derive(Debug, Clone)]
pub struct NeuralWeb {
    graph: UnGraphMap<Uuid, SocialEdge>,
    edge_threshold: f64,
    decay_factor: f64,
    prune_epsilon: f64,
    learning_rate: f64,
    cycle: u64,
}

fn ordered(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl NeuralWeb {
    pub fn new(config: &SocialConfig) -> Result<Self> {
        if !(config.edge_threshold > 0.0 && config.edge_threshold <= 1.0) {
            return Err(GenesisError::config(format!(
                "edge_threshold must be in (0, 1], got {}",
                config.edge_threshold
            )));
        }
        if !(config.decay_factor > 0.0 && config.decay_factor < 1.0) {
            return Err(GenesisError::config(format!(
                "decay_factor must be in (0, 1), got {}",
                config.decay_factor
            )));
        }
        if config.learning_rate.is_nan() || config.learning_rate <= 0.0 {
            return Err(GenesisError::config("learning_rate must be positive"));
        }
        Ok(Self {
            graph: UnGraphMap::new(),
            edge_threshold: config.edge_threshold,
            decay_factor: config.decay_factor,
            prune_epsilon: config.prune_epsilon,
            learning_rate: config.learning_rate,
            cycle: 0,
        })
    }

    /// Rebuilds a web from a stored snapshot. Edges touching unknown nodes
    /// or weighing less than `prune_epsilon` are dropped.
    pub fn from_snapshot(config: &SocialConfig, snapshot: &GraphSnapshot) -> Result<Self> {
        let mut web = Self::new(config)?;
        web.cycle = snapshot.cycle;
        for id in &snapshot.nodes {
            web.graph.add_node(*id);
        }
        for e in &snapshot.edges {
            if e.a == e.b || !web.graph.contains_node(e.a) || !web.graph.contains_node(e.b) {
                continue;
            }
            if !(e.edge.weight >= web.prune_epsilon && e.edge.weight <= 1.0) {
                continue;
            }
            web.graph.add_edge(e.a, e.b, e.edge.clone());
        }
        Ok(web)
    }

    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    #[must_use]
    pub fn graph(&self) -> &UnGraphMap<Uuid, SocialEdge> {
        &self.graph
    }

    pub fn add_agent(&mut self, id: Uuid) {
        self.graph.add_node(id);
    }

    #[must_use]
    pub fn contains_agent(&self, id: Uuid) -> bool {
        self.graph.contains_node(id)
    }

    /// Makes the node set equal to `ids`. Surviving agents keep their edges.
    /// Returns the number of nodes removed.
    pub fn sync_agents(&mut self, ids: &[Uuid]) -> usize {
        let keep: HashSet<Uuid> = ids.iter().copied().collect();
        let stale: Vec<Uuid> = self.graph.nodes().filter(|n| !keep.contains(n)).collect();
        for id in &stale {
            self.graph.remove_node(*id);
        }
        for id in ids {
            self.graph.add_node(*id);
        }
        stale.len()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn edge(&self, a: Uuid, b: Uuid) -> Option<&SocialEdge> {
        self.graph.edge_weight(a, b)
    }

    #[must_use]
    pub fn edge_weight(&self, a: Uuid, b: Uuid) -> Option<f64> {
        self.edge(a, b).map(|e| e.weight)
    }

    /// Scores candidate pairs in parallel. Self-pairs and ids that are not
    /// in `population` are skipped.
    #[must_use]
    pub fn score_pairs(
        population: &[AgentDNA],
        pairs: &[(Uuid, Uuid)],
    ) -> Vec<(Uuid, Uuid, f64)> {
        let lookup: HashMap<Uuid, &AgentDNA> =
            population.iter().map(|a| (a.agent_id, a)).collect();
        pairs
            .par_iter()
            .filter(|(a, b)| a != b)
            .filter_map(|(a, b)| {
                let (da, db) = (lookup.get(a)?, lookup.get(b)?);
                Some((*a, *b, compatibility(da, db)))
            })
            .collect()
    }

    /// Applies one cycle of scored interactions. Compatible pairs are
    /// reinforced and every other edge decays. Any edge left below
    /// `prune_epsilon` is removed, including one that was just created.
    pub fn apply_cycle(&mut self, scored: &[(Uuid, Uuid, f64)]) -> CycleUpdate {
        self.cycle += 1;
        let cycle = self.cycle;
        let mut update = CycleUpdate {
            evaluated: scored.len(),
            ..Default::default()
        };
        let mut reinforced: HashSet<(Uuid, Uuid)> = HashSet::new();

        for &(a, b, score) in scored {
            if a == b || score < self.edge_threshold {
                continue;
            }
            if !self.graph.contains_node(a) || !self.graph.contains_node(b) {
                continue;
            }
            let delta = self.learning_rate * score;
            let kind = ConnectionKind::from_compatibility(score);
            let weight = match self.graph.edge_weight_mut(a, b) {
                Some(edge) => {
                    edge.weight = (edge.weight + delta).min(1.0);
                    edge.kind = kind;
                    edge.interactions += 1;
                    edge.last_reinforced_cycle = cycle;
                    update.reinforced += 1;
                    edge.weight
                }
                None => {
                    let weight = delta.min(1.0);
                    if weight < self.prune_epsilon {
                        update.pruned += 1;
                        continue;
                    }
                    self.graph.add_edge(
                        a,
                        b,
                        SocialEdge {
                            weight,
                            kind,
                            interactions: 1,
                            created_cycle: cycle,
                            last_reinforced_cycle: cycle,
                        },
                    );
                    update.created += 1;
                    weight
                }
            };
            if weight < self.prune_epsilon {
                self.graph.remove_edge(a, b);
                update.pruned += 1;
                continue;
            }
            reinforced.insert(ordered(a, b));
        }

        let stale: Vec<(Uuid, Uuid)> = self
            .graph
            .all_edges()
            .map(|(a, b, _)| ordered(a, b))
            .filter(|key| !reinforced.contains(key))
            .collect();
        for (a, b) in stale {
            let Some(edge) = self.graph.edge_weight_mut(a, b) else {
                continue;
            };
            edge.weight *= self.decay_factor;
            update.decayed += 1;
            if edge.weight < self.prune_epsilon {
                self.graph.remove_edge(a, b);
                update.pruned += 1;
            }
        }

        tracing::debug!(
            cycle,
            created = update.created,
            reinforced = update.reinforced,
            pruned = update.pruned,
            edges = self.graph.edge_count(),
            "Neural web updated"
        );
        update
    }

    /// Scores `pairs` against `population` and applies the cycle.
    pub fn process_interactions(
        &mut self,
        population: &[AgentDNA],
        pairs: &[(Uuid, Uuid)],
    ) -> CycleUpdate {
        let scored = Self::score_pairs(population, pairs);
        self.apply_cycle(&scored)
    }

    /// Breadth-first influence spread from `source`. Each hop multiplies the
    /// influence by the edge weight and [`INFLUENCE_HOP_FACTOR`]; agents
    /// below [`INFLUENCE_FLOOR`] are not reached. The source is excluded.
    #[must_use]
    pub fn influence_network(&self, source: Uuid, max_depth: usize) -> BTreeMap<Uuid, f64> {
        let mut reached: BTreeMap<Uuid, f64> = BTreeMap::new();
        if !self.graph.contains_node(source) {
            return reached;
        }
        let mut queue = VecDeque::from([(source, 1.0, 0usize)]);
        while let Some((node, influence, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for (_, neighbor, edge) in self.graph.edges(node) {
                if neighbor == source {
                    continue;
                }
                let next = influence * edge.weight * INFLUENCE_HOP_FACTOR;
                if next < INFLUENCE_FLOOR {
                    continue;
                }
                let better = reached.get(&neighbor).map_or(true, |v| next > *v);
                if better {
                    reached.insert(neighbor, next);
                    queue.push_back((neighbor, next, depth + 1));
                }
            }
        }
        reached
    }

    #[must_use]
    pub fn social_metrics(&self, agent: Uuid) -> Option<SocialMetrics> {
        if !self.graph.contains_node(agent) {
            return None;
        }
        let weights: Vec<f64> = self.graph.edges(agent).map(|(_, _, e)| e.weight).collect();
        let degree = weights.len();
        let others = self.graph.node_count().saturating_sub(1);
        let strength: f64 = weights.iter().sum();
        Some(SocialMetrics {
            degree,
            degree_centrality: if others == 0 {
                0.0
            } else {
                degree as f64 / others as f64
            },
            strength,
            mean_weight: if degree == 0 {
                0.0
            } else {
                strength / degree as f64
            },
        })
    }

    #[must_use]
    pub fn network_statistics(&self, community_count: usize) -> NetworkStatistics {
        let n = self.graph.node_count();
        let e = self.graph.edge_count();
        let mut kinds = BTreeMap::new();
        let mut weight_sum = 0.0;
        for (_, _, edge) in self.graph.all_edges() {
            weight_sum += edge.weight;
            *kinds.entry(edge.kind.as_str().to_string()).or_insert(0) += 1;
        }
        NetworkStatistics {
            node_count: n,
            edge_count: e,
            density: if n < 2 {
                0.0
            } else {
                2.0 * e as f64 / (n as f64 * (n - 1) as f64)
            },
            mean_weight: if e == 0 { 0.0 } else { weight_sum / e as f64 },
            mean_degree: if n == 0 { 0.0 } else { 2.0 * e as f64 / n as f64 },
            community_count,
            kinds,
        }
    }

    /// Read-only partition of the current graph.
    #[must_use]
    pub fn communities(&self, method: CommunityMethod, max_iterations: usize) -> CommunityPartition {
        match method {
            CommunityMethod::ConnectedComponents => community::connected_components(&self.graph),
            CommunityMethod::LabelPropagation => {
                community::label_propagation(&self.graph, max_iterations)
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        let mut nodes: Vec<Uuid> = self.graph.nodes().collect();
        nodes.sort();
        let mut edges: Vec<EdgeSnapshot> = self
            .graph
            .all_edges()
            .map(|(a, b, e)| {
                let (a, b) = ordered(a, b);
                EdgeSnapshot {
                    a,
                    b,
                    edge: e.clone(),
                }
            })
            .collect();
        edges.sort_by(|x, y| (x.a, x.b).cmp(&(y.a, y.b)));
        GraphSnapshot {
            cycle: self.cycle,
            nodes,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(id: u128, value: f64) -> AgentDNA {
        let mut dna = AgentDNA::empty(Uuid::from_u128(id), 0, Vec::new());
        for u in Universe::ALL {
            for &t in u.numeric_traits() {
                dna.universe_mut(u).set_numeric(t, value);
            }
        }
        dna
    }

    fn web(config: SocialConfig, agents: &[AgentDNA]) -> NeuralWeb {
        let mut web = NeuralWeb::new(&config).unwrap();
        let ids: Vec<Uuid> = agents.iter().map(|a| a.agent_id).collect();
        web.sync_agents(&ids);
        web
    }

    #[test]
    fn test_compatibility_bounds() {
        let a = flat(1, 0.0);
        let b = flat(2, 1.0);
        assert_eq!(compatibility(&a, &a), 1.0);
        assert_eq!(compatibility(&a, &b), 0.0);
        assert_eq!(compatibility(&a, &b), compatibility(&b, &a));
    }

    #[test]
    fn test_ritual_traits_weigh_more() {
        let base = flat(1, 0.5);
        let mut ritual = base.clone();
        ritual.ritual.set_numeric(GeneticTrait::CommunityBonding, 1.0);
        let mut limbo = base.clone();
        limbo.limbo.set_numeric(GeneticTrait::RiskTolerance, 1.0);
        assert!(compatibility(&base, &ritual) < compatibility(&base, &limbo));
    }

    #[test]
    fn test_connection_kind_bands() {
        assert_eq!(ConnectionKind::from_compatibility(0.85), ConnectionKind::Collaborator);
        assert_eq!(ConnectionKind::from_compatibility(0.6), ConnectionKind::Friend);
        assert_eq!(ConnectionKind::from_compatibility(0.45), ConnectionKind::Acquaintance);
        assert_eq!(ConnectionKind::from_compatibility(0.1), ConnectionKind::Rival);
    }

    #[test]
    fn test_compatible_pair_creates_edge() {
        let agents = vec![flat(1, 0.5), flat(2, 0.5)];
        let mut web = web(SocialConfig::default(), &agents);
        let update = web.process_interactions(&agents, &[(agents[0].agent_id, agents[1].agent_id)]);
        assert_eq!(update.created, 1);
        let edge = web.edge(agents[0].agent_id, agents[1].agent_id).unwrap();
        assert!((edge.weight - 0.1).abs() < 1e-12);
        assert_eq!(edge.kind, ConnectionKind::Collaborator);
    }

    #[test]
    fn test_incompatible_pair_ignored_and_self_loops_skipped() {
        let agents = vec![flat(1, 0.0), flat(2, 1.0)];
        let mut web = web(SocialConfig::default(), &agents);
        let (a, b) = (agents[0].agent_id, agents[1].agent_id);
        let update = web.process_interactions(&agents, &[(a, b), (a, a)]);
        assert_eq!(update.evaluated, 1);
        assert_eq!(web.edge_count(), 0);
    }

    #[test]
    fn test_reinforcement_caps_at_one() {
        let agents = vec![flat(1, 0.5), flat(2, 0.5)];
        let config = SocialConfig {
            learning_rate: 0.7,
            ..Default::default()
        };
        let mut web = web(config, &agents);
        let pair = [(agents[0].agent_id, agents[1].agent_id)];
        web.process_interactions(&agents, &pair);
        web.process_interactions(&agents, &pair);
        let edge = web.edge(agents[0].agent_id, agents[1].agent_id).unwrap();
        assert_eq!(edge.weight, 1.0);
        assert_eq!(edge.interactions, 2);
    }

    #[test]
    fn test_unreinforced_edge_decays_then_prunes() {
        let agents = vec![flat(1, 0.5), flat(2, 0.5)];
        let config = SocialConfig {
            learning_rate: 0.5,
            decay_factor: 0.5,
            prune_epsilon: 0.1,
            ..Default::default()
        };
        let mut web = web(config, &agents);
        let (a, b) = (agents[0].agent_id, agents[1].agent_id);
        web.process_interactions(&agents, &[(a, b)]);
        assert_eq!(web.edge_weight(a, b), Some(0.5));
        web.apply_cycle(&[]);
        assert_eq!(web.edge_weight(a, b), Some(0.25));
        web.apply_cycle(&[]);
        assert_eq!(web.edge_weight(a, b), Some(0.125));
        let update = web.apply_cycle(&[]);
        assert_eq!(update.pruned, 1);
        assert_eq!(web.edge_weight(a, b), None);
    }

    #[test]
    fn test_sync_agents_drops_departed_nodes() {
        let agents = vec![flat(1, 0.5), flat(2, 0.5), flat(3, 0.5)];
        let mut web = web(SocialConfig::default(), &agents);
        let ids: Vec<Uuid> = agents.iter().map(|a| a.agent_id).collect();
        web.process_interactions(&agents, &[(ids[0], ids[1]), (ids[1], ids[2])]);
        let removed = web.sync_agents(&[ids[0], ids[1]]);
        assert_eq!(removed, 1);
        assert_eq!(web.edge_count(), 1);
        assert!(web.edge(ids[0], ids[1]).is_some());
    }

    #[test]
    fn test_influence_spread() {
        let agents = vec![flat(1, 0.5), flat(2, 0.5), flat(3, 0.5)];
        let config = SocialConfig {
            learning_rate: 1.0,
            ..Default::default()
        };
        let mut web = web(config, &agents);
        let ids: Vec<Uuid> = agents.iter().map(|a| a.agent_id).collect();
        web.process_interactions(&agents, &[(ids[0], ids[1]), (ids[1], ids[2])]);

        let reach = web.influence_network(ids[0], 3);
        assert!((reach[&ids[1]] - 0.8).abs() < 1e-12);
        assert!((reach[&ids[2]] - 0.64).abs() < 1e-12);
        assert!(!reach.contains_key(&ids[0]));

        let shallow = web.influence_network(ids[0], 1);
        assert_eq!(shallow.len(), 1);
    }

    #[test]
    fn test_metrics_and_statistics() {
        let agents = vec![flat(1, 0.5), flat(2, 0.5), flat(3, 0.5)];
        let mut web = web(SocialConfig::default(), &agents);
        let ids: Vec<Uuid> = agents.iter().map(|a| a.agent_id).collect();
        web.process_interactions(&agents, &[(ids[0], ids[1])]);

        let m = web.social_metrics(ids[0]).unwrap();
        assert_eq!(m.degree, 1);
        assert!((m.degree_centrality - 0.5).abs() < 1e-12);
        assert!(web.social_metrics(Uuid::from_u128(99)).is_none());

        let stats = web.network_statistics(2);
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_count, 1);
        assert!((stats.density - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.kinds.get("collaborator"), Some(&1));
    }

    #[test]
    fn test_from_snapshot_rebuilds_graph() {
        let agents = vec![flat(1, 0.5), flat(2, 0.5), flat(3, 0.5)];
        let mut original = web(SocialConfig::default(), &agents);
        let ids: Vec<Uuid> = agents.iter().map(|a| a.agent_id).collect();
        original.process_interactions(&agents, &[(ids[0], ids[1]), (ids[1], ids[2])]);
        original.apply_cycle(&[]);

        let snapshot = original.snapshot();
        let restored = NeuralWeb::from_snapshot(&SocialConfig::default(), &snapshot).unwrap();
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.cycle(), 2);

        let mut tampered = snapshot.clone();
        tampered.edges[0].edge.weight = 0.001;
        tampered.edges[1].b = Uuid::from_u128(99);
        let restored = NeuralWeb::from_snapshot(&SocialConfig::default(), &tampered).unwrap();
        assert_eq!(restored.edge_count(), 0);
        assert_eq!(restored.node_count(), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SocialConfig {
            edge_threshold: 0.0,
            ..Default::default()
        };
        assert!(NeuralWeb::new(&config).is_err());
    }
}
