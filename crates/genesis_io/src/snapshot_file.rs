//! Snapshot directory: one gzip JSON file per generation boundary.

use crate::error::{IoError, Result};
use crate::serialization::{read_json_gz, write_json_gz};
use genesis_core::storage::{Snapshot, SnapshotStore};
use std::path::{Path, PathBuf};

const PREFIX: &str = "generation_";
const SUFFIX: &str = ".json.gz";

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Opens `dir`, creating it if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| IoError::from(e).at("creating", &dir))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, generation: u32) -> PathBuf {
        self.dir.join(format!("{PREFIX}{generation:06}{SUFFIX}"))
    }

    fn parse_generation(name: &str) -> Option<u32> {
        name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?.parse().ok()
    }

    /// Stored generation indices, ascending.
    pub fn generations(&self) -> Result<Vec<u32>> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(g) = entry.file_name().to_str().and_then(Self::parse_generation) {
                out.push(g);
            }
        }
        out.sort_unstable();
        Ok(out)
    }

    pub fn write(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        let generation = snapshot.record.generation;
        let path = self.path_for(generation);
        write_json_gz(snapshot, &path).map_err(|e| e.at("writing", &path))?;
        tracing::debug!(
            generation,
            edges = snapshot.graph.edges.len(),
            path = %path.display(),
            "Snapshot written"
        );
        Ok(path)
    }

    pub fn read(&self, generation: u32) -> Result<Snapshot> {
        let path = self.path_for(generation);
        read_json_gz(&path).map_err(|e| e.at("reading", &path))
    }

    pub fn latest(&self) -> Result<Option<Snapshot>> {
        match self.generations()?.last() {
            Some(g) => self.read(*g).map(Some),
            None => Ok(None),
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save_snapshot(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
        self.write(snapshot)?;
        Ok(())
    }

    fn load_latest(&self) -> anyhow::Result<Option<Snapshot>> {
        Ok(self.latest()?)
    }
}
