//! Rewrite/optimizer
//!
//! Applies a fixed, ordered catalog of equivalence-preserving rewrite
//! rules to an operator chain, producing the optimized chain together
//! with a structured proof. The proof is independently re-checkable:
//! structurally against the rule catalog, and semantically by executing
//! both chains and diffing their traces.

pub mod error;
pub mod optimizer;
pub mod proof;
pub mod rules;
pub mod verifier;

pub use error::ProofError;
pub use optimizer::{optimize, optimize_chain};
pub use proof::{Proof, RewriteStep};
pub use rules::{RuleId, CATALOG, MAX_PASSES};
pub use verifier::{verify, verify_semantic, verify_structural};
