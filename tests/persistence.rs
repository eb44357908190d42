mod common;

use common::{scripted_runtime, test_config};
use genesis_core::population::{LifecycleState, Population};
use genesis_core::runtime::{CycleOutput, IdleRuntime};
use genesis_core::shutdown::ShutdownSignal;
use genesis_core::storage::SnapshotStore;
use genesis_core::{GenesisError, PopulationManager};
use genesis_io::{FileSnapshotStore, HistoryLog, SqliteSnapshotStore};
use genesis_lib::app::{self, App, Overrides, RunOptions, StoreBackend};
use std::collections::HashMap;
use std::io::Write;

#[test]
fn test_file_store_keeps_one_snapshot_per_generation() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSnapshotStore::new(dir.path()).unwrap();
    let mut manager = PopulationManager::new(test_config(10, 2, 1), IdleRuntime)
        .unwrap()
        .with_store(store.clone());
    manager.run_simulation(3, &ShutdownSignal::new()).unwrap();

    assert_eq!(store.generations().unwrap(), vec![0, 1, 2]);
    let latest = store.latest().unwrap().unwrap();
    assert_eq!(latest.record.generation, 2);
    assert_eq!(latest.population.len(), 10);
    assert_eq!(latest.population, manager.population().agents());
}

#[test]
fn test_resume_continues_from_latest_file_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(12, 2, 9);

    let mut first = PopulationManager::new(config.clone(), scripted_runtime(|_| 0.4))
        .unwrap()
        .with_store(FileSnapshotStore::new(dir.path()).unwrap());
    first.run_simulation(2, &ShutdownSignal::new()).unwrap();
    let saved = first.population();

    let mut second = PopulationManager::new(config, scripted_runtime(|_| 0.4))
        .unwrap()
        .with_store(FileSnapshotStore::new(dir.path()).unwrap());
    assert!(second.resume_from_store().unwrap());
    assert_eq!(second.state(), LifecycleState::Running);
    assert_eq!(second.generation(), 2);
    assert_eq!(second.population().agents(), saved.agents());
    assert_eq!(second.get_generation_history().len(), 1);

    second.run_simulation(4, &ShutdownSignal::new()).unwrap();
    assert_eq!(second.generation(), 4);
}

/// Every agent meets every other agent each cycle.
fn everyone_meets_runtime(
) -> impl FnMut(u64, &Population) -> anyhow::Result<CycleOutput> + Send + 'static {
    |_cycle: u64, population: &Population| -> anyhow::Result<CycleOutput> {
        let ids = population.ids();
        let interactions = ids
            .iter()
            .enumerate()
            .flat_map(|(i, a)| ids[i + 1..].iter().map(move |b| (*a, *b)))
            .collect();
        Ok(CycleOutput {
            performance: HashMap::new(),
            interactions,
        })
    }
}

#[test]
fn test_resume_restores_social_graph() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(12, 2, 21);
    config.evolution.elite_ratio = 0.5;

    let mut first = PopulationManager::new(config.clone(), everyone_meets_runtime())
        .unwrap()
        .with_store(FileSnapshotStore::new(dir.path()).unwrap());
    first.run_simulation(1, &ShutdownSignal::new()).unwrap();
    let before = first.get_graph_snapshot();
    assert!(!before.edges.is_empty());

    let stored = FileSnapshotStore::new(dir.path()).unwrap().latest().unwrap().unwrap();
    assert_eq!(stored.graph, before);

    let mut second = PopulationManager::new(config, everyone_meets_runtime())
        .unwrap()
        .with_store(FileSnapshotStore::new(dir.path()).unwrap());
    assert!(second.resume_from_store().unwrap());
    assert_eq!(second.get_graph_snapshot(), before);
    assert!(!second.reader().communities().is_empty());
}

#[test]
fn test_resume_from_empty_store_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = PopulationManager::new(test_config(6, 2, 2), IdleRuntime)
        .unwrap()
        .with_store(FileSnapshotStore::new(dir.path()).unwrap());
    assert!(!manager.resume_from_store().unwrap());
    assert_eq!(manager.state(), LifecycleState::Uninitialized);
}

#[test]
fn test_resume_rejects_population_size_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = PopulationManager::new(test_config(8, 1, 3), IdleRuntime)
        .unwrap()
        .with_store(FileSnapshotStore::new(dir.path()).unwrap());
    writer.run_simulation(1, &ShutdownSignal::new()).unwrap();

    let mut reader = PopulationManager::new(test_config(10, 1, 3), IdleRuntime)
        .unwrap()
        .with_store(FileSnapshotStore::new(dir.path()).unwrap());
    assert!(matches!(
        reader.resume_from_store(),
        Err(GenesisError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_sqlite_store_round_trips_a_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("genesis.db");
    let mut manager = PopulationManager::new(test_config(10, 2, 4), scripted_runtime(|_| 0.6))
        .unwrap()
        .with_store(SqliteSnapshotStore::open(&path).unwrap());
    manager.run_simulation(3, &ShutdownSignal::new()).unwrap();

    let store = SqliteSnapshotStore::open(&path).unwrap();
    assert_eq!(store.latest_generation().unwrap(), Some(2));
    let latest = store.load_latest().unwrap().unwrap();
    assert_eq!(latest.population, manager.population().agents());
    assert_eq!(latest.graph, manager.get_graph_snapshot());

    let trend = store.fitness_trend().unwrap();
    assert_eq!(trend.len(), 3);
    assert!(trend.iter().all(|(_, mean, max)| mean <= max));
}

#[test]
fn test_history_log_skips_malformed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = PopulationManager::new(test_config(6, 1, 5), IdleRuntime).unwrap();
    manager.run_simulation(2, &ShutdownSignal::new()).unwrap();
    let records = manager.get_generation_history();

    let mut log = HistoryLog::open_in(dir.path()).unwrap();
    log.append(&records[0]).unwrap();
    {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .unwrap();
        writeln!(file, "{{not json").unwrap();
    }
    log.append(&records[1]).unwrap();

    let read = HistoryLog::read_all(log.path()).unwrap();
    assert_eq!(read, records);
    assert_eq!(
        HistoryLog::compute_history_hash(&read).unwrap(),
        HistoryLog::compute_history_hash(&records).unwrap()
    );
}

#[test]
fn test_app_run_writes_history_and_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = Overrides {
        seed: Some(7),
        generations: Some(2),
        population: Some(10),
    };
    let mut config = app::load_config(&dir.path().join("missing.toml"), &overrides).unwrap();
    config.population.generation_cycles = 3;

    let mut app = App::new(RunOptions {
        config,
        backend: StoreBackend::File,
        data_dir: dir.path().to_path_buf(),
        resume: false,
        encounters_per_agent: 2,
        noise_sigma: 0.05,
    })
    .unwrap();
    let summary = app.run(&ShutdownSignal::new()).unwrap();
    assert_eq!(summary.generation, 2);
    assert_eq!(summary.population_size, 10);

    let inspection = app::inspect(StoreBackend::File, dir.path()).unwrap();
    assert_eq!(inspection.history_len, 2);
    assert_eq!(inspection.stored_population, 10);
    assert_eq!(inspection.latest.map(|r| r.generation), Some(1));
    assert!(inspection.best_agent.is_some());
}

#[test]
fn test_load_config_rejects_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[evolution]\nelite_ratio = 1.5\n").unwrap();
    assert!(app::load_config(&path, &Overrides::default()).is_err());

    std::fs::write(&path, "[population]\npopulation_size = 30\n").unwrap();
    let config = app::load_config(&path, &Overrides::default()).unwrap();
    assert_eq!(config.population.population_size, 30);
    assert_eq!(config.population.generation_cycles, 100);
}
