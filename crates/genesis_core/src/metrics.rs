//! Counters and logging setup for the evolution engine.
//!
//! Provides structured logging and lock-free counters for monitoring
//! cycle throughput, evaluation failures and social graph churn.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Engine-wide counters, shared between the manager and its readers.
pub struct EvolutionMetrics {
    cycles: AtomicU64,
    generations: AtomicU64,
    fitness_evaluations: AtomicU64,
    failed_evaluations: AtomicU64,
    pool_fallbacks: AtomicU64,
    edges_created: AtomicU64,
    edges_pruned: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

/// Point-in-time copy of [`EvolutionMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub generations: u64,
    pub fitness_evaluations: u64,
    pub failed_evaluations: u64,
    pub pool_fallbacks: u64,
    pub edges_created: u64,
    pub edges_pruned: u64,
    pub counters: BTreeMap<String, u64>,
    pub elapsed_ms: u64,
}

impl Default for EvolutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EvolutionMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            generations: AtomicU64::new(0),
            fitness_evaluations: AtomicU64::new(0),
            failed_evaluations: AtomicU64::new(0),
            pool_fallbacks: AtomicU64::new(0),
            edges_created: AtomicU64::new(0),
            edges_pruned: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed cycle with its duration.
    pub fn record_cycle(&self, duration: Duration, population: usize, edges: usize) {
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            cycle,
            population,
            edges,
            duration_ms = duration.as_millis() as u64,
            "Population cycle"
        );
    }

    pub fn record_generation(&self) {
        self.generations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evaluations(&self, total: usize, failed: usize) {
        self.fitness_evaluations
            .fetch_add(total as u64, Ordering::Relaxed);
        self.failed_evaluations
            .fetch_add(failed as u64, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.pool_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_edges(&self, created: usize, pruned: usize) {
        self.edges_created.fetch_add(created as u64, Ordering::Relaxed);
        self.edges_pruned.fetch_add(pruned as u64, Ordering::Relaxed);
    }

    /// Increments a named counter.
    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn generation_count(&self) -> u64 {
        self.generations.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        MetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            generations: self.generations.load(Ordering::Relaxed),
            fitness_evaluations: self.fitness_evaluations.load(Ordering::Relaxed),
            failed_evaluations: self.failed_evaluations.load(Ordering::Relaxed),
            pool_fallbacks: self.pool_fallbacks.load(Ordering::Relaxed),
            edges_created: self.edges_created.load(Ordering::Relaxed),
            edges_pruned: self.edges_pruned.load(Ordering::Relaxed),
            counters: counters
                .iter()
                .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
                .collect(),
            elapsed_ms: self.elapsed().as_millis() as u64,
        }
    }
}

/// Initialize tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `level`. Installing twice is a no-op.
pub fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .finish(),
    )
    .ok();
}
