//! Errors raised by the snapshot stores and the history log.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A gzip stream could not be finished or decoded.
    #[error("gzip error: {0}")]
    Gzip(String),

    #[error("no snapshot file at {}", .0.display())]
    MissingSnapshot(PathBuf),

    #[error("generation {0} is not stored")]
    MissingGeneration(u32),

    /// Stored agent rows disagree with the record's population size.
    #[error("generation {generation}: {stored} agents stored, record says {expected}")]
    PopulationMismatch {
        generation: u32,
        stored: usize,
        expected: usize,
    },

    #[error("{action} {}: {source}", .path.display())]
    At {
        action: &'static str,
        path: PathBuf,
        source: Box<IoError>,
    },
}

pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    /// Tags the error with the file operation that raised it.
    #[must_use]
    pub fn at(self, action: &'static str, path: &Path) -> Self {
        Self::At {
            action,
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }

    /// The innermost error, past any [`IoError::At`] wrappers.
    #[must_use]
    pub fn root(&self) -> &IoError {
        match self {
            Self::At { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_at_names_action_and_path() {
        let err = IoError::Gzip("invalid gzip header".into())
            .at("reading", Path::new("snapshots/generation_000004.json.gz"));
        assert_eq!(
            err.to_string(),
            "reading snapshots/generation_000004.json.gz: gzip error: invalid gzip header"
        );
        assert!(err.source().is_some());
        assert!(matches!(err.root(), IoError::Gzip(_)));
    }

    #[test]
    fn test_population_mismatch_message() {
        let err = IoError::PopulationMismatch {
            generation: 3,
            stored: 9,
            expected: 10,
        };
        assert_eq!(err.to_string(), "generation 3: 9 agents stored, record says 10");
        assert!(matches!(err.root(), IoError::PopulationMismatch { generation: 3, .. }));
    }
}
