//! Proof verification errors

use thiserror::Error;

/// Proof check failures, naming the first point of divergence.
#[derive(Debug, Error, PartialEq)]
pub enum ProofError {
    /// Structural replay diverged: a step's declared match does not
    /// apply, or the replayed result differs from the declared optimized
    /// chain. `step == steps.len()` means the final-chain comparison.
    #[error("structural mismatch at step {step}, chain position {pos}")]
    StructuralMismatch { step: usize, pos: usize },

    /// Semantic replay diverged: the original and optimized chains
    /// produced non-equivalent traces.
    #[error("semantic divergence at event index {event_index}")]
    SemanticDivergence { event_index: usize },

    /// Semantic replay could not execute one of the chains.
    #[error("semantic replay failed: {0}")]
    Execution(#[from] semio_runtime::Error),
}
