//! Strict gate
//!
//! Structural checks a program must pass before execution under the
//! Strict protocol. These catch what the grammar alone cannot: statement
//! ordering, argument polarity, binding discipline.

use thiserror::Error;

use crate::regime::Regime;
use crate::stmt::Statement;

/// Strict-gate violations
#[derive(Debug, Error, PartialEq)]
pub enum StrictError {
    #[error("context must contain at least one operator")]
    EmptyContext,

    #[error("program must contain exactly one 'out := summarize;', found {0}")]
    SummarizeCount(usize),

    #[error("'out := summarize;' must be the last statement in the context block")]
    SummarizeNotLast,

    #[error("tick dt must be > 0, got {0}")]
    NonPositiveTick(f64),

    #[error("commit {0} before sensing it")]
    CommitBeforeSense(String),

    #[error("at most one 'seed' statement is allowed")]
    DuplicateSeed,
}

/// Run all Strict checks against a parsed regime.
pub fn check_strict(regime: &Regime) -> Result<(), StrictError> {
    if regime.chain.is_empty() {
        return Err(StrictError::EmptyContext);
    }

    let summarize_positions: Vec<usize> = regime
        .body
        .iter()
        .enumerate()
        .filter(|(_, s)| matches!(s, Statement::Summarize))
        .map(|(i, _)| i)
        .collect();
    if summarize_positions.len() != 1 {
        return Err(StrictError::SummarizeCount(summarize_positions.len()));
    }
    if summarize_positions[0] != regime.body.len() - 1 {
        return Err(StrictError::SummarizeNotLast);
    }

    let mut sensed: Vec<&str> = Vec::new();
    let mut seeds = 0usize;
    for stmt in &regime.body {
        match stmt {
            Statement::Seed { .. } => {
                seeds += 1;
                if seeds > 1 {
                    return Err(StrictError::DuplicateSeed);
                }
            }
            Statement::Tick { dt } => {
                if *dt <= 0.0 {
                    return Err(StrictError::NonPositiveTick(*dt));
                }
            }
            Statement::Sense { binding, .. } => sensed.push(binding.as_str()),
            Statement::Commit { binding } => {
                if !sensed.iter().any(|b| *b == binding.as_str()) {
                    return Err(StrictError::CommitBeforeSense(binding.clone()));
                }
            }
            Statement::Do { .. } | Statement::Summarize => {}
        }
    }

    Ok(())
}
