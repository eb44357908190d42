//! Community extraction over the neural web.
//!
//! Both methods are read-only over the graph they are given and return a
//! partition of every node id. An empty graph yields an empty partition.
//! [`profile_communities`] derives a leader, a cohesion score and the shared
//! trait means for each group of a partition.

use crate::config::CommunityMethod;
use crate::neural_web::SocialEdge;
use genesis_data::{AgentDNA, GeneticTrait, Universe};
use petgraph::graphmap::UnGraphMap;
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Weight of `leadership_tendency` in the leader score.
pub const LEADERSHIP_WEIGHT: f64 = 0.6;
/// Weight of in-community influence in the leader score.
pub const INFLUENCE_WEIGHT: f64 = 0.4;
/// Weight of edge density in cohesion. Mean edge strength takes the rest.
pub const DENSITY_WEIGHT: f64 = 0.6;

/// Groups of agent ids. Groups are sorted largest first, members by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityPartition {
    pub method: Option<CommunityMethod>,
    pub groups: Vec<Vec<Uuid>>,
    /// Agent id to index into `groups`.
    pub membership: HashMap<Uuid, usize>,
}

impl CommunityPartition {
    fn from_groups(method: CommunityMethod, groups: impl IntoIterator<Item = Vec<Uuid>>) -> Self {
        let mut groups: Vec<Vec<Uuid>> = groups
            .into_iter()
            .filter(|g| !g.is_empty())
            .map(|mut g| {
                g.sort();
                g
            })
            .collect();
        groups.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
        let membership = groups
            .iter()
            .enumerate()
            .flat_map(|(i, g)| g.iter().map(move |id| (*id, i)))
            .collect();
        Self {
            method: Some(method),
            groups,
            membership,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn community_of(&self, agent: Uuid) -> Option<&[Uuid]> {
        self.membership
            .get(&agent)
            .and_then(|i| self.groups.get(*i))
            .map(Vec::as_slice)
    }

    /// Groups with more than one member.
    pub fn non_trivial(&self) -> impl Iterator<Item = &Vec<Uuid>> {
        self.groups.iter().filter(|g| g.len() > 1)
    }
}

/// Read-only description of one community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityProfile {
    /// Index into the partition's `groups`.
    pub index: usize,
    pub members: Vec<Uuid>,
    pub leader: Option<Uuid>,
    /// In [0, 1]. A singleton is fully cohesive.
    pub cohesion: f64,
    /// Mean of each numeric trait over members with known DNA.
    pub shared_values: BTreeMap<GeneticTrait, f64>,
}

/// Profiles every group of `partition`. Members that are missing from
/// `population` count towards cohesion but cannot lead or contribute values.
#[must_use]
pub fn profile_communities(
    partition: &CommunityPartition,
    graph: &UnGraphMap<Uuid, SocialEdge>,
    population: &[AgentDNA],
) -> Vec<CommunityProfile> {
    let lookup: HashMap<Uuid, &AgentDNA> = population.iter().map(|a| (a.agent_id, a)).collect();
    partition
        .groups
        .iter()
        .enumerate()
        .map(|(index, members)| {
            let dna: Vec<&AgentDNA> = members
                .iter()
                .filter_map(|id| lookup.get(id).copied())
                .collect();
            CommunityProfile {
                index,
                members: members.clone(),
                leader: elect_leader(members, &dna, graph),
                cohesion: cohesion(members, graph),
                shared_values: shared_values(&dna),
            }
        })
        .collect()
}

/// Summed weight of the member's edges that stay inside the community,
/// capped at 1.
fn influence_within(id: Uuid, members: &[Uuid], graph: &UnGraphMap<Uuid, SocialEdge>) -> f64 {
    if !graph.contains_node(id) {
        return 0.0;
    }
    graph
        .edges(id)
        .filter(|(_, other, _)| members.binary_search(other).is_ok())
        .map(|(_, _, e)| e.weight)
        .sum::<f64>()
        .min(1.0)
}

fn elect_leader(
    members: &[Uuid],
    dna: &[&AgentDNA],
    graph: &UnGraphMap<Uuid, SocialEdge>,
) -> Option<Uuid> {
    dna.iter()
        .map(|a| {
            let leadership = a.numeric(GeneticTrait::LeadershipTendency).unwrap_or(0.0);
            let score = leadership * LEADERSHIP_WEIGHT
                + influence_within(a.agent_id, members, graph) * INFLUENCE_WEIGHT;
            (a.agent_id, score)
        })
        .max_by(|(ia, sa), (ib, sb)| sa.total_cmp(sb).then_with(|| ib.cmp(ia)))
        .map(|(id, _)| id)
}

/// `density * 0.6 + mean_strength * 0.4` over edges between members.
fn cohesion(members: &[Uuid], graph: &UnGraphMap<Uuid, SocialEdge>) -> f64 {
    let m = members.len();
    if m < 2 {
        return 1.0;
    }
    let mut edges = 0usize;
    let mut strength = 0.0;
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            if let Some(edge) = graph.edge_weight(*a, *b) {
                edges += 1;
                strength += edge.weight;
            }
        }
    }
    if edges == 0 {
        return 0.0;
    }
    let possible = m * (m - 1) / 2;
    let density = edges as f64 / possible as f64;
    let mean_strength = strength / edges as f64;
    density * DENSITY_WEIGHT + mean_strength * (1.0 - DENSITY_WEIGHT)
}

fn shared_values(dna: &[&AgentDNA]) -> BTreeMap<GeneticTrait, f64> {
    let mut sums: BTreeMap<GeneticTrait, (f64, usize)> = BTreeMap::new();
    for agent in dna {
        for universe in Universe::ALL {
            for &t in universe.numeric_traits() {
                if let Some(v) = agent.numeric(t) {
                    let entry = sums.entry(t).or_insert((0.0, 0));
                    entry.0 += v;
                    entry.1 += 1;
                }
            }
        }
    }
    sums.into_iter()
        .map(|(t, (sum, count))| (t, sum / count as f64))
        .collect()
}

fn sorted_nodes(graph: &UnGraphMap<Uuid, SocialEdge>) -> (Vec<Uuid>, HashMap<Uuid, usize>) {
    let mut nodes: Vec<Uuid> = graph.nodes().collect();
    nodes.sort();
    let index = nodes.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    (nodes, index)
}

/// Connected components via union-find.
#[must_use]
pub fn connected_components(graph: &UnGraphMap<Uuid, SocialEdge>) -> CommunityPartition {
    if graph.node_count() == 0 {
        return CommunityPartition::default();
    }
    let (nodes, index) = sorted_nodes(graph);
    let mut uf = UnionFind::<usize>::new(nodes.len());
    for (a, b, _) in graph.all_edges() {
        uf.union(index[&a], index[&b]);
    }

    let mut groups: BTreeMap<usize, Vec<Uuid>> = BTreeMap::new();
    for (i, id) in nodes.iter().enumerate() {
        groups.entry(uf.find(i)).or_default().push(*id);
    }
    CommunityPartition::from_groups(CommunityMethod::ConnectedComponents, groups.into_values())
}

/// Weighted label propagation.
///
/// Nodes are visited in id order. Each adopts the neighbor label with the
/// largest total edge weight, ties going to the smaller label. Stops when a
/// sweep changes nothing or after `max_iterations` sweeps.
#[must_use]
pub fn label_propagation(
    graph: &UnGraphMap<Uuid, SocialEdge>,
    max_iterations: usize,
) -> CommunityPartition {
    if graph.node_count() == 0 {
        return CommunityPartition::default();
    }
    let (nodes, index) = sorted_nodes(graph);
    let mut labels: Vec<usize> = (0..nodes.len()).collect();

    for iteration in 0..max_iterations {
        let mut changed = false;
        for (i, id) in nodes.iter().enumerate() {
            let mut votes: BTreeMap<usize, f64> = BTreeMap::new();
            for (_, neighbor, edge) in graph.edges(*id) {
                *votes.entry(labels[index[&neighbor]]).or_insert(0.0) += edge.weight;
            }
            // BTreeMap iterates labels ascending, so strict > keeps the smaller on ties.
            let best = votes.into_iter().fold(None, |best: Option<(usize, f64)>, (l, w)| {
                match best {
                    Some((_, bw)) if bw >= w => best,
                    _ => Some((l, w)),
                }
            });
            if let Some((label, _)) = best {
                if label != labels[i] {
                    labels[i] = label;
                    changed = true;
                }
            }
        }
        if !changed {
            tracing::debug!(iterations = iteration + 1, "Label propagation converged");
            break;
        }
    }

    let mut groups: BTreeMap<usize, Vec<Uuid>> = BTreeMap::new();
    for (i, id) in nodes.iter().enumerate() {
        groups.entry(labels[i]).or_default().push(*id);
    }
    CommunityPartition::from_groups(CommunityMethod::LabelPropagation, groups.into_values())
}
