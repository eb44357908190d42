//! # Genesis IO
//!
//! Persistence adapters for the Genesis evolution engine.
//!
//! This crate provides:
//! - Error types for file, gzip and database failures
//! - Gzip JSON file helpers and content digests
//! - A snapshot directory store (`generation_NNNNNN.json.gz` files)
//! - A SQLite snapshot store
//! - An append-only JSONL generation history log

/// Error types and result aliases for I/O operations
pub mod error;
/// Append-only JSONL log of generation records
pub mod history;
/// Gzip JSON files and digests
pub mod serialization;
/// Gzip snapshot directory implementing the core storage port
pub mod snapshot_file;
/// SQLite snapshot database implementing the core storage port
pub mod sqlite;

pub use error::{IoError, Result};
pub use history::HistoryLog;
pub use serialization::{read_json_gz, write_json_gz};
pub use snapshot_file::FileSnapshotStore;
pub use sqlite::SqliteSnapshotStore;
