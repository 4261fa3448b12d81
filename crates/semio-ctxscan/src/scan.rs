//! Scan driver
//!
//! Enumerates window permutations, executes every variant, and builds
//! the report. Variants are embarrassingly parallel: each run owns its
//! cursor and RNG, the world is shared read-only, and results are
//! collected in enumeration order so the report stays deterministic.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, instrument};

use semio_ast::{Operator, Regime};
use semio_contracts::{hash::HashError, sha256_canonical, CTXSCAN_SCHEMA_V1};
use semio_runtime::{Interpreter, Objectivation, Trace};
use semio_world::World;

use crate::perm::{distinct_count, distinct_permutations};
use crate::report::{CtxScanReport, VariantEntry, Witness, WindowReport};

/// Scan failures
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(
        "window at {start}: {count} distinct permutations exceeds the budget of {max}"
    )]
    PermutationBudget {
        start: usize,
        count: usize,
        max: usize,
    },

    #[error(transparent)]
    Run(#[from] semio_runtime::Error),

    #[error("variant digest failed: {0}")]
    Digest(#[from] HashError),
}

/// Scan configuration.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Sliding window size. Values larger than the chain scan the whole
    /// chain as one window; `<= 1` yields zero witnesses by
    /// construction (no permutation freedom) and is not an error.
    pub window_size: usize,
    /// Upper bound on distinct permutations per window.
    pub max_perms_per_window: usize,
}

impl ScanOptions {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            max_perms_per_window: 720,
        }
    }
}

/// One executed variant's trace, for optional per-variant emission.
#[derive(Debug, Clone)]
pub struct VariantTrace {
    pub window_start: usize,
    pub index: usize,
    pub ctx: String,
    pub trace: Trace,
}

/// Scan result: the report plus every variant trace in report order.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub report: CtxScanReport,
    pub variant_traces: Vec<VariantTrace>,
}

/// Commit projection: the ordered objectivation/value pairs compared
/// between variants.
fn outcomes(trace: &Trace) -> Vec<(Objectivation, f64)> {
    trace.commit_outcomes()
}

/// Scan a regime against a world.
#[instrument(skip_all, fields(ctx = %regime.chain, window = options.window_size))]
pub fn scan(
    regime: &Regime,
    world: &World,
    program_file: &str,
    world_file: &str,
    options: &ScanOptions,
) -> Result<ScanOutcome, ScanError> {
    let interpreter = Interpreter::new(world);
    let baseline = interpreter.execute(regime, program_file)?;
    let base_outcomes = outcomes(&baseline);
    let base_kappa = baseline.summary.as_ref().map(|s| s.kappa).unwrap_or(0.0);
    let baseline_ctx = regime.chain.canonical();

    let ops = regime.chain.ops();
    let len = ops.len();
    let window_len = options.window_size.min(len);

    let mut windows = Vec::new();
    let mut witnesses = Vec::new();
    let mut variant_traces = Vec::new();
    let mut dkappa_max = 0.0f64;
    let mut max_outcome_delta = 0.0f64;

    if window_len >= 2 {
        for start in 0..=(len - window_len) {
            let window = &ops[start..start + window_len];
            let count = distinct_count(window);
            if count > options.max_perms_per_window {
                return Err(ScanError::PermutationBudget {
                    start,
                    count,
                    max: options.max_perms_per_window,
                });
            }

            let mut perms = distinct_permutations(window);
            // Baseline order runs first; the rest keep canonical order
            let base_key: Vec<String> = window.iter().map(|op| op.to_string()).collect();
            if let Some(at) = perms
                .iter()
                .position(|p| p.iter().map(|op| op.to_string()).collect::<Vec<_>>() == base_key)
            {
                if at != 0 {
                    let baseline_perm = perms.remove(at);
                    perms.insert(0, baseline_perm);
                }
            }

            let variants: Vec<Regime> = perms
                .iter()
                .map(|perm| {
                    let mut chain = ops.to_vec();
                    chain.splice(start..start + window_len, perm.iter().copied());
                    regime.with_chain(chain.into())
                })
                .collect();

            let results: Vec<semio_runtime::Result<Trace>> = variants
                .par_iter()
                .map(|variant| interpreter.execute(variant, program_file))
                .collect();

            let mut entries = Vec::with_capacity(results.len());
            let mut window_witness: Option<Witness> = None;

            for (i, (variant, result)) in variants.iter().zip(results).enumerate() {
                let trace = result?;
                let ctx = variant.chain.canonical();
                let kappa = trace.summary.as_ref().map(|s| s.kappa).unwrap_or(0.0);
                let dkappa = (kappa - base_kappa).abs();
                dkappa_max = dkappa_max.max(dkappa);

                let variant_outcomes = outcomes(&trace);
                let shared = base_outcomes.len().min(variant_outcomes.len());
                for k in 0..shared {
                    let delta = (variant_outcomes[k].1 - base_outcomes[k].1).abs();
                    max_outcome_delta = max_outcome_delta.max(delta);
                }

                if window_witness.is_none() {
                    if let Some(k) = (0..shared)
                        .find(|&k| variant_outcomes[k].0 != base_outcomes[k].0)
                    {
                        window_witness = Some(Witness {
                            window_start: start,
                            ctx_base: baseline_ctx.clone(),
                            ctx_variant: ctx.clone(),
                            projection: format!("threshold@{}", k),
                            diff_step: k + 1,
                            baseline_obj: base_outcomes[k].0.to_string(),
                            variant_obj: variant_outcomes[k].0.to_string(),
                            baseline_value: base_outcomes[k].1,
                            variant_value: variant_outcomes[k].1,
                        });
                    }
                }

                entries.push(VariantEntry {
                    i,
                    ctx: ctx.clone(),
                    summary: trace.summary.clone(),
                    dkappa,
                    digest: sha256_canonical(&trace.events)?,
                });
                variant_traces.push(VariantTrace {
                    window_start: start,
                    index: i,
                    ctx,
                    trace,
                });
            }

            if let Some(ref witness) = window_witness {
                witnesses.push(witness.clone());
            }
            windows.push(WindowReport {
                start,
                len: window_len,
                perms: entries,
                witness: window_witness,
            });
        }
    }

    let noncommuting_fraction = noncommuting_fraction(
        regime,
        &interpreter,
        program_file,
        &base_outcomes,
    )?;

    let noncontextual = witnesses.is_empty();
    debug!(
        windows = windows.len(),
        witnesses = witnesses.len(),
        noncontextual,
        "scan complete"
    );

    let report = CtxScanReport {
        schema: CTXSCAN_SCHEMA_V1.to_string(),
        program_file: program_file.to_string(),
        world_file: world_file.to_string(),
        protocol: "Strict".to_string(),
        baseline_ctx,
        baseline_summary: baseline.summary.clone(),
        window_size: options.window_size,
        noncontextual,
        dkappa_max,
        noncommuting_fraction,
        max_outcome_delta,
        witnesses,
        windows,
    };

    Ok(ScanOutcome {
        report,
        variant_traces,
    })
}

/// Fraction of adjacent operator pairs whose swap changes the commit
/// projection. Independent of window size.
fn noncommuting_fraction(
    regime: &Regime,
    interpreter: &Interpreter<'_>,
    program_file: &str,
    base_outcomes: &[(Objectivation, f64)],
) -> Result<f64, ScanError> {
    let ops = regime.chain.ops();
    if ops.len() < 2 {
        return Ok(0.0);
    }

    let mut divergent = 0usize;
    for pair in 0..ops.len() - 1 {
        let mut swapped: Vec<Operator> = ops.to_vec();
        swapped.swap(pair, pair + 1);
        let trace = interpreter.execute(&regime.with_chain(swapped.into()), program_file)?;
        let swapped_outcomes = outcomes(&trace);
        let shared = base_outcomes.len().min(swapped_outcomes.len());
        if (0..shared).any(|k| swapped_outcomes[k].0 != base_outcomes[k].0) {
            divergent += 1;
        }
    }
    Ok(divergent as f64 / (ops.len() - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use semio_ast::{OperatorChain, Statement};
    use semio_contracts::to_canonical_json;

    fn world(value: f64) -> World {
        World::from_json_str(&format!(r#"{{"channels": {{"ch": {}}}}}"#, value)).unwrap()
    }

    fn regime(ops: Vec<Operator>) -> Regime {
        Regime::new(
            OperatorChain::new(ops),
            vec![
                Statement::Tick { dt: 1.0 },
                Statement::Sense {
                    binding: "x".into(),
                    channel: "ch".into(),
                },
                Statement::Commit {
                    binding: "x".into(),
                },
                Statement::Summarize,
            ],
        )
    }

    fn run_scan(ops: Vec<Operator>, value: f64, window: usize) -> CtxScanReport {
        let w = world(value);
        let r = regime(ops);
        scan(&r, &w, "p.sc", "w.json", &ScanOptions::new(window))
            .unwrap()
            .report
    }

    #[test]
    fn test_noncommutativity_witness_add_then_sign() {
        // Add(0.5)>>Sign at -0.2: AFFIRM; Sign>>Add(0.5): NEGATE
        let report = run_scan(
            vec![Operator::Add { arg: 0.5 }, Operator::Sign],
            -0.2,
            2,
        );
        assert!(!report.noncontextual);
        assert_eq!(report.witnesses.len(), 1);
        let witness = &report.witnesses[0];
        assert_eq!(witness.projection, "threshold@0");
        assert_eq!(witness.diff_step, 1);
        assert_eq!(witness.ctx_base, "Add(0.5)>>Sign");
        assert_eq!(witness.ctx_variant, "Sign>>Add(0.5)");
        assert_eq!(witness.baseline_obj, "AFFIRM");
        assert_eq!(witness.variant_obj, "NEGATE");
        assert_eq!(witness.baseline_value, 1.0);
        assert_eq!(witness.variant_value, -0.5);
        assert_eq!(report.noncommuting_fraction, 1.0);
        // kappa flips from 0 (AFFIRM vs expected NEGATE) to 1
        assert_eq!(report.dkappa_max, 1.0);
    }

    #[test]
    fn test_window_one_yields_zero_witnesses() {
        let report = run_scan(
            vec![Operator::Add { arg: 0.5 }, Operator::Sign],
            -0.2,
            1,
        );
        assert!(report.noncontextual);
        assert!(report.witnesses.is_empty());
        assert!(report.windows.is_empty());
    }

    #[test]
    fn test_commuting_chain_is_noncontextual() {
        let report = run_scan(
            vec![Operator::Add { arg: 0.1 }, Operator::Add { arg: 0.2 }],
            0.4,
            2,
        );
        assert!(report.noncontextual);
        assert_eq!(report.noncommuting_fraction, 0.0);
        assert_eq!(report.dkappa_max, 0.0);
    }

    #[test]
    fn test_oversized_window_scans_whole_chain() {
        let report = run_scan(
            vec![Operator::Add { arg: 0.5 }, Operator::Sign],
            -0.2,
            99,
        );
        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.windows[0].len, 2);
        assert!(!report.noncontextual);
    }

    #[test]
    fn test_baseline_variant_listed_first() {
        let report = run_scan(
            vec![Operator::Sign, Operator::Add { arg: 0.5 }],
            -0.2,
            2,
        );
        let perms = &report.windows[0].perms;
        assert_eq!(perms[0].ctx, "Sign>>Add(0.5)");
        assert_eq!(perms[0].dkappa, 0.0);
        assert_eq!(perms.len(), 2);
    }

    #[test]
    fn test_report_byte_identical_across_runs() {
        let a = run_scan(
            vec![
                Operator::Add { arg: 0.5 },
                Operator::Sign,
                Operator::Add { arg: -0.1 },
            ],
            -0.2,
            2,
        );
        let b = run_scan(
            vec![
                Operator::Add { arg: 0.5 },
                Operator::Sign,
                Operator::Add { arg: -0.1 },
            ],
            -0.2,
            2,
        );
        assert_eq!(
            to_canonical_json(&a).unwrap(),
            to_canonical_json(&b).unwrap()
        );
    }

    #[test]
    fn test_permutation_budget_enforced() {
        let w = world(0.1);
        let r = regime(vec![
            Operator::Add { arg: 0.1 },
            Operator::Add { arg: 0.2 },
            Operator::Add { arg: 0.3 },
        ]);
        let mut options = ScanOptions::new(3);
        options.max_perms_per_window = 2;
        let err = scan(&r, &w, "p.sc", "w.json", &options).unwrap_err();
        assert!(matches!(err, ScanError::PermutationBudget { count: 6, .. }));
    }

    #[test]
    fn test_empty_chain_scans_clean() {
        let report = run_scan(Vec::new(), 0.3, 2);
        assert!(report.noncontextual);
        assert!(report.windows.is_empty());
        assert_eq!(report.noncommuting_fraction, 0.0);
    }
}
