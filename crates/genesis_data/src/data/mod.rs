//! Core data structures for the Genesis evolution engine.

pub mod genome;
pub mod record;
pub mod universe;
