//! Error taxonomy for the evolution engine.
//!
//! Configuration errors are fatal. Per-agent data errors and degenerate
//! selection pools are recovered where they occur and only surface in
//! logs and generation records.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for genesis_core operations.
#[derive(Error, Debug)]
pub enum GenesisError {
    /// An operator produced a trait outside [0.0, 1.0].
    #[error("Invalid gene value at {path}: {value}")]
    InvalidGeneValue { path: String, value: f64 },

    /// Rejected configuration, fatal at startup.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Missing or malformed per-agent performance data.
    #[error("Missing performance data for agent {agent_id}: {reason}")]
    MissingPerformanceData { agent_id: Uuid, reason: String },

    /// Fewer agents than required passed the reproduction threshold.
    #[error("Degenerate eligible pool: {eligible} eligible, {required} required")]
    DegenerateEligiblePool { eligible: usize, required: usize },

    /// Operation not allowed in the current lifecycle state.
    #[error("Cannot {operation} while population is {state}")]
    InvalidLifecycle {
        state: &'static str,
        operation: &'static str,
    },

    /// Two agents in one population share an id.
    #[error("Duplicate agent id {0}")]
    DuplicateAgent(Uuid),

    /// The agent runtime collaborator failed.
    #[error("Agent runtime error: {0}")]
    Runtime(String),

    /// The snapshot store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for genesis_core operations.
pub type Result<T> = std::result::Result<T, GenesisError>;

impl GenesisError {
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    #[must_use]
    pub fn missing_data<S: Into<String>>(agent_id: Uuid, reason: S) -> Self {
        Self::MissingPerformanceData {
            agent_id,
            reason: reason.into(),
        }
    }

    /// True for errors that must stop the engine.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_) | Self::InvalidGeneValue { .. } | Self::DuplicateAgent(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GenesisError::config("population_size must be at least 2");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: population_size must be at least 2"
        );
    }

    #[test]
    fn test_recoverable_errors_are_not_fatal() {
        assert!(!GenesisError::missing_data(Uuid::nil(), "no record").is_fatal());
        assert!(!GenesisError::DegenerateEligiblePool {
            eligible: 1,
            required: 2
        }
        .is_fatal());
        assert!(GenesisError::config("bad").is_fatal());
    }
}
