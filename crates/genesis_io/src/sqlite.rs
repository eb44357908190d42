//! SQLite snapshot store.
//!
//! `generations` holds one row per boundary with the full record as JSON
//! plus a few columns for querying. `agents` holds the population that
//! replaced that generation, in population order. `graphs` holds the social
//! graph over that population as JSON.

use crate::error::{IoError, Result};
use genesis_core::neural_web::GraphSnapshot;
use genesis_core::storage::{Snapshot, SnapshotStore};
use genesis_data::GenerationRecord;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteSnapshotStore {
    conn: Connection,
}

/// Fitness trend row: generation, mean, max.
pub type FitnessPoint = (u32, f64, f64);

fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS generations (
            generation INTEGER PRIMARY KEY,
            timestamp TEXT NOT NULL,
            population_size INTEGER NOT NULL,
            mean_fitness REAL NOT NULL,
            max_fitness REAL NOT NULL,
            config_fingerprint TEXT NOT NULL,
            record_json TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS agents (
            generation INTEGER NOT NULL,
            slot INTEGER NOT NULL,
            agent_id TEXT NOT NULL,
            agent_generation INTEGER NOT NULL,
            overall_fitness REAL NOT NULL,
            dna_json TEXT NOT NULL,
            PRIMARY KEY (generation, slot)
        );
        CREATE TABLE IF NOT EXISTS graphs (
            generation INTEGER PRIMARY KEY,
            edge_count INTEGER NOT NULL,
            graph_json TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_agents_id ON agents(agent_id);",
    )?;
    Ok(())
}

impl SqliteSnapshotStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;");
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn write(&mut self, snapshot: &Snapshot) -> Result<()> {
        let Snapshot {
            record,
            population,
            graph,
        } = snapshot;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO generations
                (generation, timestamp, population_size, mean_fitness, max_fitness, config_fingerprint, record_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.generation,
                record.timestamp.to_rfc3339(),
                record.population_size as i64,
                record.fitness.mean,
                record.fitness.max,
                record.config_fingerprint,
                serde_json::to_string(record)?,
            ],
        )?;
        tx.execute(
            "DELETE FROM agents WHERE generation = ?1",
            params![record.generation],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO agents (generation, slot, agent_id, agent_generation, overall_fitness, dna_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (slot, dna) in population.iter().enumerate() {
                stmt.execute(params![
                    record.generation,
                    slot as i64,
                    dna.agent_id.to_string(),
                    dna.generation,
                    dna.overall_fitness(),
                    serde_json::to_string(dna)?,
                ])?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO graphs (generation, edge_count, graph_json) VALUES (?1, ?2, ?3)",
            params![
                record.generation,
                graph.edges.len() as i64,
                serde_json::to_string(graph)?,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn read(&self, generation: u32) -> Result<Snapshot> {
        let record_json: Option<String> = self
            .conn
            .query_row(
                "SELECT record_json FROM generations WHERE generation = ?1",
                params![generation],
                |row| row.get(0),
            )
            .optional()?;
        let record_json = record_json.ok_or(IoError::MissingGeneration(generation))?;
        let record: GenerationRecord = serde_json::from_str(&record_json)?;

        let mut stmt = self
            .conn
            .prepare("SELECT dna_json FROM agents WHERE generation = ?1 ORDER BY slot")?;
        let rows = stmt.query_map(params![generation], |row| row.get::<_, String>(0))?;
        let mut population = Vec::new();
        for json in rows {
            population.push(serde_json::from_str(&json?)?);
        }
        if population.len() != record.population_size {
            return Err(IoError::PopulationMismatch {
                generation,
                stored: population.len(),
                expected: record.population_size,
            });
        }
        let graph_json: Option<String> = self
            .conn
            .query_row(
                "SELECT graph_json FROM graphs WHERE generation = ?1",
                params![generation],
                |row| row.get(0),
            )
            .optional()?;
        let graph: GraphSnapshot = match graph_json {
            Some(json) => serde_json::from_str(&json)?,
            None => GraphSnapshot::default(),
        };
        Ok(Snapshot {
            record,
            population,
            graph,
        })
    }

    pub fn latest_generation(&self) -> Result<Option<u32>> {
        Ok(self
            .conn
            .query_row("SELECT MAX(generation) FROM generations", [], |row| {
                row.get::<_, Option<u32>>(0)
            })?)
    }

    pub fn latest(&self) -> Result<Option<Snapshot>> {
        match self.latest_generation()? {
            Some(g) => self.read(g).map(Some),
            None => Ok(None),
        }
    }

    /// Mean and max fitness per stored generation, ascending.
    pub fn fitness_trend(&self) -> Result<Vec<FitnessPoint>> {
        let mut stmt = self.conn.prepare(
            "SELECT generation, mean_fitness, max_fitness FROM generations ORDER BY generation",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok::<FitnessPoint, rusqlite::Error>((row.get(0)?, row.get(1)?, row.get(2)?))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn save_snapshot(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
        self.write(snapshot)?;
        Ok(())
    }

    fn load_latest(&self) -> anyhow::Result<Option<Snapshot>> {
        Ok(self.latest()?)
    }
}
