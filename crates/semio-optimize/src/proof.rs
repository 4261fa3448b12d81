//! Optimization proof artifact
//!
//! An ordered sequence of rewrite steps from the original chain to the
//! optimized chain. Immutable; never produced apart from its optimized
//! chain, so no optimization can escape verification.

use serde::{Deserialize, Serialize};

use semio_ast::{Operator, OperatorChain};
use semio_contracts::PROOF_SCHEMA_V1;

use crate::rules::RuleId;

/// One equivalence-preserving transformation applied at a chain
/// position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteStep {
    pub rule: RuleId,
    /// Index of the matched sub-chain in the chain the step was applied to.
    pub pos: usize,
    pub matched: Vec<Operator>,
    pub replacement: Vec<Operator>,
}

/// `semiocore.proof.v1` artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    pub schema: String,
    pub original: OperatorChain,
    pub optimized: OperatorChain,
    pub steps: Vec<RewriteStep>,
}

impl Proof {
    pub fn new(original: OperatorChain, optimized: OperatorChain, steps: Vec<RewriteStep>) -> Self {
        Self {
            schema: PROOF_SCHEMA_V1.to_string(),
            original,
            optimized,
            steps,
        }
    }
}
