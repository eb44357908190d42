//! Headless application wiring: configuration loading, storage backend
//! selection and the simulation run itself.

use crate::runtime::SyntheticRuntime;
use anyhow::{Context, Result};
use genesis_core::population::PopulationSummary;
use genesis_core::storage::{Snapshot, SnapshotStore};
use genesis_core::{GenesisConfig, PopulationManager};
use genesis_core::shutdown::ShutdownSignal;
use genesis_data::{AgentDNA, GenerationRecord};
use genesis_io::{FileSnapshotStore, HistoryLog, SqliteSnapshotStore};
use std::path::{Path, PathBuf};

/// Where generation snapshots go.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Keep nothing beyond the in-process history.
    #[default]
    None,
    /// `generation_NNNNNN.json.gz` files.
    File,
    /// `genesis.db` SQLite database.
    Sqlite,
}

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub generations: Option<u32>,
    pub population: Option<usize>,
}

/// Loads `path`, falling back to defaults when the file does not exist.
/// A file that exists but does not parse or validate is an error.
pub fn load_config(path: &Path, overrides: &Overrides) -> Result<GenesisConfig> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        GenesisConfig::from_toml(&content).with_context(|| format!("loading {}", path.display()))?
    } else {
        tracing::info!(path = %path.display(), "Config file not found, using defaults");
        GenesisConfig::default()
    };

    if let Some(seed) = overrides.seed {
        config.population.seed = Some(seed);
    }
    if let Some(generations) = overrides.generations {
        config.population.max_generations = generations;
    }
    if let Some(population) = overrides.population {
        config.population.population_size = population;
    }
    config.validate()?;
    Ok(config)
}

/// Opens the selected backend under `data_dir`.
pub fn open_store(
    backend: StoreBackend,
    data_dir: &Path,
) -> Result<Option<Box<dyn SnapshotStore + Send>>> {
    Ok(match backend {
        StoreBackend::None => None,
        StoreBackend::File => Some(Box::new(FileSnapshotStore::new(data_dir.join("snapshots"))?)),
        StoreBackend::Sqlite => {
            std::fs::create_dir_all(data_dir)?;
            Some(Box::new(SqliteSnapshotStore::open(data_dir.join("genesis.db"))?))
        }
    })
}

/// Store decorator that appends every saved record to the history log.
pub struct HistoryRecordingStore {
    inner: Option<Box<dyn SnapshotStore + Send>>,
    log: HistoryLog,
}

impl HistoryRecordingStore {
    #[must_use]
    pub fn new(inner: Option<Box<dyn SnapshotStore + Send>>, log: HistoryLog) -> Self {
        Self { inner, log }
    }
}

impl SnapshotStore for HistoryRecordingStore {
    fn save_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        if let Some(inner) = self.inner.as_mut() {
            inner.save_snapshot(snapshot)?;
        }
        self.log.append(&snapshot.record)?;
        Ok(())
    }

    fn load_latest(&self) -> Result<Option<Snapshot>> {
        match self.inner.as_ref() {
            Some(inner) => inner.load_latest(),
            None => Ok(None),
        }
    }
}

pub struct RunOptions {
    pub config: GenesisConfig,
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
    pub resume: bool,
    pub encounters_per_agent: usize,
    pub noise_sigma: f64,
}

pub struct App {
    manager: PopulationManager,
    target_generation: u32,
}

impl App {
    pub fn new(options: RunOptions) -> Result<Self> {
        let RunOptions {
            config,
            backend,
            data_dir,
            resume,
            encounters_per_agent,
            noise_sigma,
        } = options;

        let runtime_seed = config.population.seed.map(|s| s.wrapping_add(1));
        let runtime = SyntheticRuntime::new(runtime_seed, noise_sigma, encounters_per_agent)?;
        let target_generation = config.population.max_generations;
        tracing::info!(
            fingerprint = %config.fingerprint(),
            population = config.population.population_size,
            generations = target_generation,
            "Configuration loaded"
        );

        let history = HistoryLog::open_in(&data_dir)?;
        let store = HistoryRecordingStore::new(open_store(backend, &data_dir)?, history);
        let mut manager = PopulationManager::new(config, runtime)?.with_store(store);

        if resume && manager.resume_from_store()? {
            tracing::info!(generation = manager.generation(), "Continuing stored run");
        }

        Ok(Self {
            manager,
            target_generation,
        })
    }

    #[must_use]
    pub fn manager(&self) -> &PopulationManager {
        &self.manager
    }

    /// Runs to the configured generation count or until `shutdown`.
    pub fn run(&mut self, shutdown: &ShutdownSignal) -> Result<PopulationSummary> {
        let report = self
            .manager
            .run_simulation(self.target_generation, shutdown)?;
        if report.cancelled {
            tracing::warn!(
                generations = report.generations_completed,
                "Simulation cancelled before reaching target"
            );
        }
        Ok(self.manager.get_population_summary())
    }
}

/// Summary of what a data directory holds.
#[derive(Debug, serde::Serialize)]
pub struct Inspection {
    pub latest: Option<GenerationRecord>,
    pub stored_population: usize,
    pub best_agent: Option<AgentDNA>,
    pub history_len: usize,
    pub history_hash: String,
}

pub fn inspect(backend: StoreBackend, data_dir: &Path) -> Result<Inspection> {
    let latest = match open_store(backend, data_dir)? {
        Some(store) => store.load_latest()?,
        None => None,
    };
    let history = HistoryLog::read_all(data_dir.join("history.jsonl"))?;

    let (latest, stored_population, best_agent) = match latest {
        Some(Snapshot { record, population, .. }) => {
            let best = population
                .iter()
                .max_by(|a, b| a.overall_fitness().total_cmp(&b.overall_fitness()))
                .cloned();
            (Some(record), population.len(), best)
        }
        None => (history.last().cloned(), 0, None),
    };

    Ok(Inspection {
        latest,
        stored_population,
        best_agent,
        history_len: history.len(),
        history_hash: HistoryLog::compute_history_hash(&history)?,
    })
}
