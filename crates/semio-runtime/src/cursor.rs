//! Execution cursor
//!
//! Mutable per-run state: simulated time, sensing bias, bound values,
//! RNG state, event log. Allocated fresh per run and discarded at run
//! end; never shared across runs.

use indexmap::IndexMap;

use crate::rng::Lcg32;
use crate::trace::TraceEvent;

/// A bound sense result, kept until commit.
#[derive(Debug, Clone)]
pub struct SensedValue {
    pub channel: String,
    pub s: f64,
    pub r_raw: f64,
    pub noise: Option<f64>,
    pub r_eff: f64,
}

/// Per-run mutable state, exclusively owned by one interpreter
/// invocation.
#[derive(Debug, Default)]
pub struct ExecutionCursor {
    /// Current simulated time. Monotonic.
    pub t: f64,
    /// Additive sensing bias set by `do add_bias(..)`.
    pub bias: f64,
    /// Bound values, insertion-ordered.
    pub bindings: IndexMap<String, SensedValue>,
    /// RNG service, present once a seed statement ran.
    pub rng: Option<Lcg32>,
    /// Next event step number (1-indexed in the trace).
    step: u64,
    /// Accumulated event log.
    pub events: Vec<TraceEvent>,
    /// Commits so far.
    pub commits: u64,
    /// Sum of per-commit kappa_loc, for the summary mean.
    pub kappa_sum: f64,
}

impl ExecutionCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next 1-indexed step number.
    pub fn next_step(&mut self) -> u64 {
        self.step += 1;
        self.step
    }
}
