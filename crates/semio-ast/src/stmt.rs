//! Regime statements
//!
//! The ordered statement sequence inside a context block.

use serde::{Deserialize, Serialize};

/// A declared side-effecting adjustment (`do ...` statement).
///
/// Closed catalog, v1: additive sensing bias only. Deterministic given
/// its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Additive bias applied to every subsequent raw sense value.
    AddBias { arg: f64 },
}

/// One statement in a regime body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Statement {
    /// Initialize the RNG service. At most one per run.
    Seed { value: u32 },
    /// Advance simulated time by `dt` (must be positive).
    Tick { dt: f64 },
    /// Sample a channel at the current time, apply the active chain,
    /// bind the result.
    Sense { binding: String, channel: String },
    /// Commit a previously sensed binding.
    Commit { binding: String },
    /// Apply a side-effecting adjustment.
    Do { #[serde(flatten)] effect: Effect },
    /// Close the run and emit the aggregate `out` event.
    #[serde(rename = "out_summarize")]
    Summarize,
}
