//! Persistence port for generation snapshots.

use crate::neural_web::GraphSnapshot;
use genesis_data::{AgentDNA, GenerationRecord};

/// A record together with the population that replaced the generation it
/// describes and the social graph over that population, so the latest
/// snapshot is directly resumable.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub record: GenerationRecord,
    pub population: Vec<AgentDNA>,
    #[serde(default)]
    pub graph: GraphSnapshot,
}

pub trait SnapshotStore {
    fn save_snapshot(&mut self, snapshot: &Snapshot) -> anyhow::Result<()>;

    fn load_latest(&self) -> anyhow::Result<Option<Snapshot>>;
}

/// Keeps every snapshot in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshotStore {
    snapshots: Vec<Snapshot>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save_snapshot(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }

    fn load_latest(&self) -> anyhow::Result<Option<Snapshot>> {
        Ok(self.snapshots.last().cloned())
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn save_snapshot(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
        (**self).save_snapshot(snapshot)
    }

    fn load_latest(&self) -> anyhow::Result<Option<Snapshot>> {
        (**self).load_latest()
    }
}
