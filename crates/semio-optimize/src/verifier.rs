//! Proof verifier
//!
//! Two independent checks, both required. Structural replay re-applies
//! each declared step against the rule catalog; semantic replay executes
//! both chains embedded in the same regime body against the same world
//! and seed and diffs the traces. Rule catalogs can have latent bugs;
//! structural checking alone is not trusted.

use tracing::{debug, instrument};

use semio_ast::{OperatorChain, Regime};
use semio_runtime::{first_divergence, Interpreter};
use semio_world::World;

use crate::error::ProofError;
use crate::proof::Proof;
use crate::rules::rule_by_id;

/// Structural replay: apply each step's declared rule at its declared
/// position starting from `original` and require the result to equal
/// `optimized` exactly.
pub fn verify_structural(
    proof: &Proof,
    original: &OperatorChain,
    optimized: &OperatorChain,
) -> Result<(), ProofError> {
    let mut ops = original.ops().to_vec();

    for (index, step) in proof.steps.iter().enumerate() {
        let rule = rule_by_id(step.rule);
        let end = step.pos + rule.width;
        if end > ops.len() || ops[step.pos..end] != step.matched[..] {
            return Err(ProofError::StructuralMismatch {
                step: index,
                pos: step.pos,
            });
        }
        let replacement = (rule.matcher)(&ops[step.pos..end]).ok_or(
            ProofError::StructuralMismatch {
                step: index,
                pos: step.pos,
            },
        )?;
        if replacement != step.replacement {
            return Err(ProofError::StructuralMismatch {
                step: index,
                pos: step.pos,
            });
        }
        ops.splice(step.pos..end, replacement);
    }

    let shared = ops.len().min(optimized.len());
    for pos in 0..shared {
        if ops[pos] != optimized.ops()[pos] {
            return Err(ProofError::StructuralMismatch {
                step: proof.steps.len(),
                pos,
            });
        }
    }
    if ops.len() != optimized.len() {
        return Err(ProofError::StructuralMismatch {
            step: proof.steps.len(),
            pos: shared,
        });
    }
    Ok(())
}

/// Semantic replay: execute both chains under the same body/world/seed
/// and require trace equivalence.
pub fn verify_semantic(
    original: &OperatorChain,
    optimized: &OperatorChain,
    body: &Regime,
    world: &World,
) -> Result<(), ProofError> {
    let interpreter = Interpreter::new(world);
    let base = interpreter.execute(&body.with_chain(original.clone()), "verify.sc")?;
    let opt = interpreter.execute(&body.with_chain(optimized.clone()), "verify.sc")?;
    match first_divergence(&base, &opt) {
        None => Ok(()),
        Some(event_index) => Err(ProofError::SemanticDivergence { event_index }),
    }
}

/// Full verification: structural replay, then semantic replay with the
/// proof's chains embedded in `body` against `world`.
#[instrument(skip_all, fields(steps = proof.steps.len()))]
pub fn verify(proof: &Proof, body: &Regime, world: &World) -> Result<(), ProofError> {
    verify_structural(proof, &proof.original, &proof.optimized)?;
    verify_semantic(&proof.original, &proof.optimized, body, world)?;
    debug!("proof verified");
    Ok(())
}
