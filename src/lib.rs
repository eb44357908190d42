//! Headless Genesis application: CLI wiring and a synthetic agent runtime
//! on top of `genesis_core` and `genesis_io`.

pub mod app;
pub mod runtime;

pub use genesis_core::{GenesisConfig, GenesisError, PopulationManager};
