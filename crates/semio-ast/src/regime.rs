//! Regime: operator chain + statement body
//!
//! The parsed program. Immutable after construction; mutation points
//! (seed override for replay, chain substitution for scanning) return
//! fresh copies.

use serde::{Deserialize, Serialize};

use crate::op::OperatorChain;
use crate::stmt::Statement;

/// A parsed `.sc` program: one operator chain plus its statement body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regime {
    pub chain: OperatorChain,
    pub body: Vec<Statement>,
}

impl Regime {
    pub fn new(chain: OperatorChain, body: Vec<Statement>) -> Self {
        Self { chain, body }
    }

    /// The seed declared in the body, if any.
    pub fn seed(&self) -> Option<u32> {
        self.body.iter().find_map(|stmt| match stmt {
            Statement::Seed { value } => Some(*value),
            _ => None,
        })
    }

    /// Copy with the declared seed replaced, or injected as the first
    /// statement when the body declares none. Used by replay to apply
    /// the manifest's seed.
    pub fn with_seed(&self, seed: u32) -> Self {
        let mut body = self.body.clone();
        let mut replaced = false;
        for stmt in body.iter_mut() {
            if let Statement::Seed { value } = stmt {
                *value = seed;
                replaced = true;
                break;
            }
        }
        if !replaced {
            body.insert(0, Statement::Seed { value: seed });
        }
        Self {
            chain: self.chain.clone(),
            body,
        }
    }

    /// Copy with a substituted operator chain. Used by the context
    /// scanner and the optimizer; the body is shared unchanged.
    pub fn with_chain(&self, chain: OperatorChain) -> Self {
        Self {
            chain,
            body: self.body.clone(),
        }
    }
}
