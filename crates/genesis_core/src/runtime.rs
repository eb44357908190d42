//! Port for the agent runtime that drives per-cycle behavior.
//!
//! The runtime decides what agents actually do. The engine only sees the
//! metrics it reports and which agents met each other.

use crate::fitness::PerformanceData;
use crate::population::Population;
use std::collections::HashMap;
use uuid::Uuid;

/// Everything one cycle reports back to the engine.
#[derive(Debug, Clone, Default)]
pub struct CycleOutput {
    /// Raw metrics per agent. Agents may be missing.
    pub performance: HashMap<Uuid, PerformanceData>,
    /// Candidate pairs for the neural web, e.g. agents that interacted.
    pub interactions: Vec<(Uuid, Uuid)>,
}

pub trait AgentRuntime {
    /// Runs one cycle for the given population.
    fn run_cycle(&mut self, cycle: u64, population: &Population) -> anyhow::Result<CycleOutput>;
}

/// Runtime that reports nothing. Every agent ends up with zero fitness.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleRuntime;

impl AgentRuntime for IdleRuntime {
    fn run_cycle(&mut self, _cycle: u64, _population: &Population) -> anyhow::Result<CycleOutput> {
        Ok(CycleOutput::default())
    }
}

impl<F> AgentRuntime for F
where
    F: FnMut(u64, &Population) -> anyhow::Result<CycleOutput>,
{
    fn run_cycle(&mut self, cycle: u64, population: &Population) -> anyhow::Result<CycleOutput> {
        self(cycle, population)
    }
}
