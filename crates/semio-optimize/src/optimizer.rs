//! Fixed-point rewrite driver
//!
//! Each pass applies the first matching rule at the earliest chain
//! position (leftmost-outermost) and records a rewrite step; passes
//! repeat until no rule matches, with a bounded pass count.

use tracing::{debug, trace};

use semio_ast::{OperatorChain, Regime};

use crate::proof::{Proof, RewriteStep};
use crate::rules::{CATALOG, MAX_PASSES};

/// Optimize a chain. The optimized chain and its proof are produced as
/// one unit.
pub fn optimize_chain(chain: &OperatorChain) -> (OperatorChain, Proof) {
    let original = chain.clone();
    let mut ops = chain.ops().to_vec();
    let mut steps = Vec::new();

    for _pass in 0..MAX_PASSES {
        let mut applied = false;

        'scan: for pos in 0..ops.len() {
            for rule in CATALOG {
                if pos + rule.width > ops.len() {
                    continue;
                }
                let window = &ops[pos..pos + rule.width];
                if let Some(replacement) = (rule.matcher)(window) {
                    trace!(
                        rule = rule.id.name(),
                        pos,
                        "rewrite applied"
                    );
                    steps.push(RewriteStep {
                        rule: rule.id,
                        pos,
                        matched: window.to_vec(),
                        replacement: replacement.clone(),
                    });
                    ops.splice(pos..pos + rule.width, replacement);
                    applied = true;
                    break 'scan;
                }
            }
        }

        if !applied {
            break;
        }
    }

    let optimized = OperatorChain::new(ops);
    debug!(
        original = %original,
        optimized = %optimized,
        steps = steps.len(),
        "optimization complete"
    );
    let proof = Proof::new(original, optimized.clone(), steps);
    (optimized, proof)
}

/// Optimize a regime's chain, keeping the body unchanged.
pub fn optimize(regime: &Regime) -> (Regime, Proof) {
    let (chain, proof) = optimize_chain(&regime.chain);
    (regime.with_chain(chain), proof)
}
