//! Population lifecycle and the single-writer population manager.
//!
//! [`PopulationManager`] is the only component that mutates the active
//! population. Readers hold a [`PopulationReader`] and always observe a
//! complete generation: a boundary builds the next [`Population`] off to the
//! side and swaps the shared `Arc` in one write.

use crate::community::{profile_communities, CommunityPartition, CommunityProfile};
use crate::config::GenesisConfig;
use crate::error::{GenesisError, Result};
use crate::evolution::EvolutionEngine;
use crate::fitness::{FitnessEngine, PerformanceAccumulator};
use crate::genetics::{generate_population, validate_dna};
use crate::metrics::{EvolutionMetrics, MetricsSnapshot};
use crate::neural_web::{CycleUpdate, GraphSnapshot, NetworkStatistics, NeuralWeb};
use crate::personality::{classify, Personality};
use crate::runtime::{AgentRuntime, CycleOutput};
use crate::shutdown::ShutdownSignal;
use crate::stats::{fitness_summary, mean};
use crate::storage::{Snapshot, SnapshotStore};
use genesis_data::{AgentDNA, FitnessSummary, GenerationRecord, Universe};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use uuid::Uuid;

/// The agents of one generation. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    generation: u32,
    agents: Vec<AgentDNA>,
}

impl Population {
    /// Validates unique ids, complete in-range genomes and lineage shape.
    pub fn new(generation: u32, agents: Vec<AgentDNA>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(agents.len());
        for dna in &agents {
            if !seen.insert(dna.agent_id) {
                return Err(GenesisError::DuplicateAgent(dna.agent_id));
            }
            validate_dna(dna)?;
            if !(dna.parent_ids.is_empty() || dna.parent_ids.len() == 2) {
                return Err(GenesisError::config(format!(
                    "agent {} has {} parents",
                    dna.agent_id,
                    dna.parent_ids.len()
                )));
            }
        }
        Ok(Self { generation, agents })
    }

    /// An empty placeholder used before genesis.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            generation: 0,
            agents: Vec::new(),
        }
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn agents(&self) -> &[AgentDNA] {
        &self.agents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&AgentDNA> {
        self.agents.iter().find(|a| a.agent_id == id)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<Uuid> {
        self.agents.iter().map(|a| a.agent_id).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AgentDNA> {
        self.agents.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Uninitialized,
    Genesis,
    Running,
    Terminated,
}

impl LifecycleState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Genesis => "genesis",
            Self::Running => "running",
            Self::Terminated => "terminated",
        }
    }
}

/// Read-only view for dashboards and APIs.
#[derive(Debug, Clone, Serialize)]
pub struct PopulationSummary {
    pub state: LifecycleState,
    pub generation: u32,
    pub cycle: u64,
    pub population_size: usize,
    pub fitness: FitnessSummary,
    pub universe_fitness: BTreeMap<Universe, f64>,
    pub best_agent: Option<Uuid>,
    pub personalities: BTreeMap<Personality, usize>,
    pub last_record: Option<GenerationRecord>,
    pub network: NetworkStatistics,
    pub metrics: MetricsSnapshot,
}

/// What one call to `run_population_cycle` did.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: u64,
    pub generation: u32,
    pub agents_reported: usize,
    pub web: CycleUpdate,
    /// Set when this cycle closed a generation.
    pub evolved: Option<GenerationRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub generations_completed: u32,
    pub cycles: u64,
    pub cancelled: bool,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

struct SharedState {
    state: RwLock<LifecycleState>,
    population: RwLock<Arc<Population>>,
    history: RwLock<Vec<GenerationRecord>>,
    web: RwLock<NeuralWeb>,
    communities: RwLock<Arc<CommunityPartition>>,
    profiles: RwLock<Arc<Vec<CommunityProfile>>>,
    cycle: AtomicU64,
    metrics: EvolutionMetrics,
}

/// Cloneable read handle onto the manager's shared state.
#[derive(Clone)]
pub struct PopulationReader {
    shared: Arc<SharedState>,
}

impl PopulationReader {
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *read(&self.shared.state)
    }

    /// The active generation. Cheap: clones the `Arc`.
    #[must_use]
    pub fn population(&self) -> Arc<Population> {
        Arc::clone(&read(&self.shared.population))
    }

    #[must_use]
    pub fn communities(&self) -> Arc<CommunityPartition> {
        Arc::clone(&read(&self.shared.communities))
    }

    /// Leader, cohesion and shared values of each current community.
    #[must_use]
    pub fn community_profiles(&self) -> Arc<Vec<CommunityProfile>> {
        Arc::clone(&read(&self.shared.profiles))
    }

    #[must_use]
    pub fn get_generation_history(&self) -> Vec<GenerationRecord> {
        read(&self.shared.history).clone()
    }

    #[must_use]
    pub fn get_graph_snapshot(&self) -> GraphSnapshot {
        read(&self.shared.web).snapshot()
    }

    #[must_use]
    pub fn get_population_summary(&self) -> PopulationSummary {
        let population = self.population();
        let fitness: Vec<f64> = population.iter().map(AgentDNA::overall_fitness).collect();
        let universe_fitness = Universe::ALL
            .iter()
            .map(|u| {
                let values: Vec<f64> =
                    population.iter().map(|a| a.fitness_scores.get(*u)).collect();
                (*u, mean(&values))
            })
            .collect();
        let best_agent = population
            .iter()
            .max_by(|a, b| {
                a.overall_fitness()
                    .total_cmp(&b.overall_fitness())
                    .then_with(|| b.agent_id.cmp(&a.agent_id))
            })
            .map(|a| a.agent_id);
        let mut personalities = BTreeMap::new();
        for dna in population.iter() {
            *personalities.entry(classify(dna)).or_insert(0) += 1;
        }
        let community_count = self.communities().len();

        PopulationSummary {
            state: self.state(),
            generation: population.generation(),
            cycle: self.shared.cycle.load(Ordering::Relaxed),
            population_size: population.len(),
            fitness: fitness_summary(&fitness),
            universe_fitness,
            best_agent,
            personalities,
            last_record: read(&self.shared.history).last().cloned(),
            network: read(&self.shared.web).network_statistics(community_count),
            metrics: self.shared.metrics.snapshot(),
        }
    }
}

pub struct PopulationManager {
    config: GenesisConfig,
    rng: ChaCha8Rng,
    runtime: Box<dyn AgentRuntime + Send>,
    store: Option<Box<dyn SnapshotStore + Send>>,
    fitness: FitnessEngine,
    evolution: EvolutionEngine,
    accumulator: PerformanceAccumulator,
    shared: Arc<SharedState>,
    cycles_in_generation: u64,
}

impl PopulationManager {
    /// Validates the configuration. Any violation is fatal here.
    pub fn new<R>(config: GenesisConfig, runtime: R) -> Result<Self>
    where
        R: AgentRuntime + Send + 'static,
    {
        config.validate()?;
        let rng = match config.population.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let fitness = FitnessEngine::new(config.fitness.weights.clone())?;
        let evolution = EvolutionEngine::from_config(&config)?;
        let web = NeuralWeb::new(&config.social)?;

        Ok(Self {
            config,
            rng,
            runtime: Box::new(runtime),
            store: None,
            fitness,
            evolution,
            accumulator: PerformanceAccumulator::new(),
            shared: Arc::new(SharedState {
                state: RwLock::new(LifecycleState::Uninitialized),
                population: RwLock::new(Arc::new(Population::empty())),
                history: RwLock::new(Vec::new()),
                web: RwLock::new(web),
                communities: RwLock::new(Arc::new(CommunityPartition::default())),
                profiles: RwLock::new(Arc::new(Vec::new())),
                cycle: AtomicU64::new(0),
                metrics: EvolutionMetrics::new(),
            }),
            cycles_in_generation: 0,
        })
    }

    #[must_use]
    pub fn with_store<S>(mut self, store: S) -> Self
    where
        S: SnapshotStore + Send + 'static,
    {
        self.store = Some(Box::new(store));
        self
    }

    #[must_use]
    pub fn config(&self) -> &GenesisConfig {
        &self.config
    }

    #[must_use]
    pub fn reader(&self) -> PopulationReader {
        PopulationReader {
            shared: Arc::clone(&self.shared),
        }
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *read(&self.shared.state)
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        read(&self.shared.population).generation()
    }

    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.shared.cycle.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn population(&self) -> Arc<Population> {
        Arc::clone(&read(&self.shared.population))
    }

    #[must_use]
    pub fn metrics(&self) -> &EvolutionMetrics {
        &self.shared.metrics
    }

    pub fn get_population_summary(&self) -> PopulationSummary {
        self.reader().get_population_summary()
    }

    pub fn get_generation_history(&self) -> Vec<GenerationRecord> {
        self.reader().get_generation_history()
    }

    pub fn get_graph_snapshot(&self) -> GraphSnapshot {
        self.reader().get_graph_snapshot()
    }

    fn transition(&self, to: LifecycleState) {
        let mut state = write(&self.shared.state);
        tracing::info!(from = state.as_str(), to = to.as_str(), "Lifecycle transition");
        *state = to;
    }

    fn require(&self, expected: LifecycleState, operation: &'static str) -> Result<()> {
        let state = self.state();
        if state == expected {
            Ok(())
        } else {
            Err(GenesisError::InvalidLifecycle {
                state: state.as_str(),
                operation,
            })
        }
    }

    /// Makes `population` the active generation and syncs the web's nodes.
    fn install(&self, population: Population) {
        let ids = population.ids();
        *write(&self.shared.population) = Arc::new(population);
        let removed = write(&self.shared.web).sync_agents(&ids);
        if removed > 0 {
            tracing::debug!(removed, "Dropped departed agents from neural web");
        }
    }

    /// `Uninitialized -> Genesis -> Running` with `N` random genomes.
    pub fn initialize_genesis_population(&mut self) -> Result<()> {
        self.require(LifecycleState::Uninitialized, "initialize genesis population")?;
        self.transition(LifecycleState::Genesis);

        let n = self.config.population.population_size;
        let agents = generate_population(n, &mut self.rng);
        self.install(Population::new(0, agents)?);
        tracing::info!(population = n, "Genesis population created");

        self.transition(LifecycleState::Running);
        Ok(())
    }

    /// Restores the latest stored snapshot. Returns `false` when the store
    /// is empty or absent, leaving the manager uninitialized.
    pub fn resume_from_store(&mut self) -> Result<bool> {
        self.require(LifecycleState::Uninitialized, "resume from store")?;
        let Some(store) = self.store.as_ref() else {
            return Ok(false);
        };
        let Some(snapshot) = store
            .load_latest()
            .map_err(|e| GenesisError::Storage(format!("{e:#}")))?
        else {
            return Ok(false);
        };

        let n = self.config.population.population_size;
        if snapshot.population.len() != n {
            return Err(GenesisError::config(format!(
                "stored population has {} agents, configured population_size is {n}",
                snapshot.population.len()
            )));
        }
        let generation = snapshot.record.generation + 1;
        let population = Population::new(generation, snapshot.population)?;
        let web = NeuralWeb::from_snapshot(&self.config.social, &snapshot.graph)?;
        write(&self.shared.history).push(snapshot.record);
        *write(&self.shared.web) = web;
        self.install(population);
        self.refresh_communities();
        tracing::info!(
            generation,
            edges = read(&self.shared.web).edge_count(),
            "Resumed from stored snapshot"
        );

        self.transition(LifecycleState::Running);
        Ok(true)
    }

    /// Runs one cycle of the agent runtime and the neural web. Closes the
    /// generation every `generation_cycles` cycles.
    pub fn run_population_cycle(&mut self) -> Result<CycleReport> {
        self.require(LifecycleState::Running, "run a cycle")?;
        let started = Instant::now();
        let cycle = self.cycle() + 1;
        let population = self.population();

        let output = match self.runtime.run_cycle(cycle, &population) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(cycle, error = %format!("{e:#}"), "Agent runtime failed, cycle yields no data");
                self.shared.metrics.increment_counter("runtime_errors");
                CycleOutput::default()
            }
        };

        let mut agents_reported = 0;
        for (id, data) in &output.performance {
            if population.get(*id).is_some() {
                self.accumulator.record(*id, data);
                agents_reported += 1;
            }
        }

        let web = write(&self.shared.web).process_interactions(population.agents(), &output.interactions);
        self.shared.metrics.record_edges(web.created, web.pruned);

        self.shared.cycle.store(cycle, Ordering::Relaxed);
        self.cycles_in_generation += 1;

        let evolved = if self.cycles_in_generation >= self.config.population.generation_cycles {
            Some(self.evolve_generation()?)
        } else {
            None
        };

        let interval = self.config.social.community_interval;
        if interval > 0 && cycle % interval == 0 {
            self.refresh_communities();
        }

        self.shared.metrics.record_cycle(
            started.elapsed(),
            population.len(),
            read(&self.shared.web).edge_count(),
        );

        Ok(CycleReport {
            cycle,
            generation: self.generation(),
            agents_reported,
            web,
            evolved,
        })
    }

    /// Scores the active generation, reproduces, stores the snapshot and
    /// swaps in the next generation.
    pub fn evolve_generation(&mut self) -> Result<GenerationRecord> {
        self.require(LifecycleState::Running, "evolve a generation")?;
        let current = self.population();

        let performance = self.accumulator.averaged();
        let report = self.fitness.score_population(current.agents(), &performance);
        self.shared
            .metrics
            .record_evaluations(report.agents.len(), report.failures.len());

        let outcome = self.evolution.evolve_generation(
            current.generation(),
            &report.agents,
            report.failures.len(),
            &mut self.rng,
        )?;
        if outcome.used_fallback {
            self.shared.metrics.record_fallback();
        }

        let next = Population::new(current.generation() + 1, outcome.next)?;
        let mut web = read(&self.shared.web).clone();
        web.sync_agents(&next.ids());
        if let Some(store) = self.store.as_mut() {
            let snapshot = Snapshot {
                record: outcome.record.clone(),
                population: next.agents().to_vec(),
                graph: web.snapshot(),
            };
            store
                .save_snapshot(&snapshot)
                .map_err(|e| GenesisError::Storage(format!("{e:#}")))?;
        }

        // The record lands before the swap, so a reader that sees the new
        // generation also sees the record of the one it replaced.
        write(&self.shared.history).push(outcome.record.clone());
        *write(&self.shared.web) = web;
        self.install(next);
        self.accumulator.clear();
        self.cycles_in_generation = 0;
        self.shared.metrics.record_generation();

        Ok(outcome.record)
    }

    /// Recomputes communities and their profiles against a copy of the
    /// current graph.
    pub fn refresh_communities(&self) -> Arc<CommunityPartition> {
        let web = read(&self.shared.web).clone();
        let population = self.population();
        let social = &self.config.social;
        let partition = Arc::new(
            web.communities(social.community_method, social.label_propagation_iterations),
        );
        let profiles = Arc::new(profile_communities(
            &partition,
            web.graph(),
            population.agents(),
        ));
        tracing::debug!(
            communities = partition.len(),
            nodes = web.node_count(),
            "Communities refreshed"
        );
        *write(&self.shared.communities) = Arc::clone(&partition);
        *write(&self.shared.profiles) = profiles;
        partition
    }

    #[must_use]
    pub fn community_profiles(&self) -> Arc<Vec<CommunityProfile>> {
        self.reader().community_profiles()
    }

    /// Cycles until the generation counter reaches `target_generation` or
    /// `shutdown` is observed, then terminates. Initializes a genesis
    /// population first when needed.
    pub fn run_simulation(
        &mut self,
        target_generation: u32,
        shutdown: &ShutdownSignal,
    ) -> Result<SimulationReport> {
        if self.state() == LifecycleState::Uninitialized {
            self.initialize_genesis_population()?;
        }
        self.require(LifecycleState::Running, "run a simulation")?;

        let start_generation = self.generation();
        let start_cycle = self.cycle();
        let mut cancelled = false;
        tracing::info!(
            from = start_generation,
            to = target_generation,
            "Simulation started"
        );

        while self.generation() < target_generation {
            if shutdown.is_shutdown_requested() {
                cancelled = true;
                break;
            }
            self.run_population_cycle()?;
        }

        self.refresh_communities();
        self.transition(LifecycleState::Terminated);

        let report = SimulationReport {
            generations_completed: self.generation() - start_generation,
            cycles: self.cycle() - start_cycle,
            cancelled,
        };
        tracing::info!(
            generations = report.generations_completed,
            cycles = report.cycles,
            cancelled,
            "Simulation finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::{formula, PerformanceData};
    use crate::runtime::IdleRuntime;
    use crate::storage::MemorySnapshotStore;
    use std::collections::HashMap;

    fn config(n: usize, cycles: u64) -> GenesisConfig {
        let mut config = GenesisConfig::default();
        config.population.population_size = n;
        config.population.generation_cycles = cycles;
        config.population.seed = Some(42);
        config
    }

    /// Every agent reports the same value for every metric.
    fn flat_runtime(value: f64) -> impl AgentRuntime + Send {
        move |_cycle: u64, population: &Population| -> anyhow::Result<CycleOutput> {
            let mut data = PerformanceData::new();
            for u in Universe::ALL {
                for (name, _) in formula(u) {
                    data.insert(u, name, value);
                }
            }
            let performance: HashMap<Uuid, PerformanceData> =
                population.iter().map(|a| (a.agent_id, data.clone())).collect();
            Ok(CycleOutput {
                performance,
                interactions: Vec::new(),
            })
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut bad = config(10, 1);
        bad.fitness.weights.limbo = 0.9;
        assert!(matches!(
            PopulationManager::new(bad, IdleRuntime),
            Err(GenesisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut manager = PopulationManager::new(config(6, 2), IdleRuntime).unwrap();
        assert_eq!(manager.state(), LifecycleState::Uninitialized);
        assert!(matches!(
            manager.run_population_cycle(),
            Err(GenesisError::InvalidLifecycle { .. })
        ));

        manager.initialize_genesis_population().unwrap();
        assert_eq!(manager.state(), LifecycleState::Running);
        assert_eq!(manager.population().len(), 6);
        assert!(manager.initialize_genesis_population().is_err());

        manager.run_simulation(1, &ShutdownSignal::new()).unwrap();
        assert_eq!(manager.state(), LifecycleState::Terminated);
        assert!(manager.run_population_cycle().is_err());
    }

    #[test]
    fn test_generation_boundary_every_n_cycles() {
        let mut manager = PopulationManager::new(config(8, 3), flat_runtime(0.4)).unwrap();
        manager.initialize_genesis_population().unwrap();

        assert!(manager.run_population_cycle().unwrap().evolved.is_none());
        assert!(manager.run_population_cycle().unwrap().evolved.is_none());
        let report = manager.run_population_cycle().unwrap();
        let record = report.evolved.unwrap();

        assert_eq!(record.generation, 0);
        assert!((record.fitness.mean - 0.4).abs() < 1e-9);
        assert_eq!(manager.generation(), 1);
        assert_eq!(manager.population().len(), 8);
        assert_eq!(manager.get_generation_history().len(), 1);
    }

    #[test]
    fn test_idle_runtime_scores_zero() {
        let mut manager = PopulationManager::new(config(5, 1), IdleRuntime).unwrap();
        manager.initialize_genesis_population().unwrap();
        let record = manager.run_population_cycle().unwrap().evolved.unwrap();
        assert_eq!(record.failed_evaluations, 5);
        assert_eq!(record.fitness.max, 0.0);
        assert_eq!(manager.metrics().snapshot().failed_evaluations, 5);
    }

    #[test]
    fn test_runtime_failure_is_recovered() {
        let failing = |_: u64, _: &Population| -> anyhow::Result<CycleOutput> {
            anyhow::bail!("runtime offline")
        };
        let mut manager = PopulationManager::new(config(4, 2), failing).unwrap();
        manager.initialize_genesis_population().unwrap();
        let report = manager.run_population_cycle().unwrap();
        assert_eq!(report.agents_reported, 0);
        assert_eq!(
            manager.metrics().snapshot().counters.get("runtime_errors"),
            Some(&1)
        );
    }

    #[test]
    fn test_cancelled_simulation_terminates() {
        let mut manager = PopulationManager::new(config(4, 1), IdleRuntime).unwrap();
        let signal = ShutdownSignal::new();
        signal.request_shutdown();
        let report = manager.run_simulation(10, &signal).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.generations_completed, 0);
        assert_eq!(manager.state(), LifecycleState::Terminated);
    }

    #[test]
    fn test_snapshots_are_resumable() {
        let store = MemorySnapshotStore::new();
        let mut manager = PopulationManager::new(config(6, 1), flat_runtime(0.2))
            .unwrap()
            .with_store(store);
        manager.run_simulation(2, &ShutdownSignal::new()).unwrap();
        let last_population = manager.population();

        let latest = manager
            .store
            .as_ref()
            .unwrap()
            .load_latest()
            .unwrap()
            .unwrap();
        assert_eq!(latest.record.generation, 1);
        assert_eq!(latest.population, last_population.agents());
    }

    #[test]
    fn test_reader_sees_swapped_population() {
        let mut manager = PopulationManager::new(config(6, 1), flat_runtime(0.3)).unwrap();
        let reader = manager.reader();
        manager.initialize_genesis_population().unwrap();
        let before = reader.population();
        manager.run_population_cycle().unwrap();
        let after = reader.population();
        assert_eq!(before.generation(), 0);
        assert_eq!(after.generation(), 1);
        assert_eq!(after.len(), 6);

        let summary = reader.get_population_summary();
        assert_eq!(summary.generation, 1);
        assert_eq!(summary.population_size, 6);
        assert_eq!(summary.personalities.values().sum::<usize>(), 6);
        assert!(summary.last_record.is_some());
    }

    #[test]
    fn test_reader_exposes_community_profiles() {
        let mut manager = PopulationManager::new(config(6, 5), flat_runtime(0.3)).unwrap();
        let reader = manager.reader();
        assert!(reader.community_profiles().is_empty());
        manager.initialize_genesis_population().unwrap();
        manager.refresh_communities();

        // No interactions yet, so every agent is its own community.
        let profiles = reader.community_profiles();
        assert_eq!(profiles.len(), 6);
        for profile in profiles.iter() {
            assert_eq!(profile.members.len(), 1);
            assert_eq!(profile.leader, Some(profile.members[0]));
            assert_eq!(profile.cohesion, 1.0);
        }
    }

    #[test]
    fn test_population_rejects_duplicates() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let agents = generate_population(2, &mut rng);
        let dup = vec![agents[0].clone(), agents[0].clone()];
        assert!(matches!(
            Population::new(0, dup),
            Err(GenesisError::DuplicateAgent(_))
        ));
    }
}
