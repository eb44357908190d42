//! Append-only JSONL log of generation records.

use crate::error::Result;
use crate::serialization::json_digest;
use genesis_data::GenerationRecord;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct HistoryLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl HistoryLog {
    /// Opens `dir/history.jsonl` for appending, creating `dir` if needed.
    pub fn open_in<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Self::open(dir.join("history.jsonl"))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, record: &GenerationRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Every readable record in file order. Malformed lines are skipped.
    pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<GenerationRecord>> {
        let file = match File::open(path.as_ref()) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<GenerationRecord>(&line) {
                Ok(r) => records.push(r),
                Err(e) => tracing::warn!(line = n + 1, error = %e, "Skipping malformed history line"),
            }
        }
        Ok(records)
    }

    /// SHA-256 over the JSON encoding of `records`.
    pub fn compute_history_hash(records: &[GenerationRecord]) -> Result<String> {
        json_digest(&records)
    }
}
