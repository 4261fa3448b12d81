//! End-to-end integration tests for the SemioCore toolchain.
//!
//! These exercise the full pipeline across crate boundaries:
//! Parse → Check → Execute → Artifacts → Replay / Scan / Optimize.

use std::path::PathBuf;

use semio_contracts::to_canonical_json;
use semio_ctxscan::{scan, ScanOptions};
use semio_integration_tests::TestHarness;
use semio_optimize::{optimize, verify};
use semio_plasticity::{compute_plasticity_report, PlasticityOptions};
use semio_replay::replay_and_check;
use semio_runtime::first_divergence;

const FUSED_PROGRAM: &str = r#"
# two additive operators, fusable to one
context Add(0.2) >> Add(0.3) {
  tick 0.5;
  x := sense photon_flux;
  commit x;
  out := summarize;
}
"#;

const WITNESS_PROGRAM: &str = r#"
context Add(0.5) >> Sign {
  tick 1.0;
  x := sense photon_flux;
  commit x;
  out := summarize;
}
"#;

const JITTER_PROGRAM: &str = r#"
seed 123;
context Add(0.1) >> JitterU(0.1) {
  tick 0.5;
  a := sense photon_flux;
  commit a;
  tick 0.5;
  b := sense photon_flux;
  commit b;
  out := summarize;
}
"#;

const WORLD_POSITIVE: &str = r#"{"channels": {"photon_flux": 0.25}}"#;
const WORLD_NEAR_ZERO: &str = r#"{"channels": {"photon_flux": -0.2}}"#;

/// Determinism: two independent executions produce byte-identical
/// trace artifacts.
#[test]
fn test_two_runs_byte_identical() {
    let harness = TestHarness::new(JITTER_PROGRAM, WORLD_POSITIVE);
    let (a, _) = harness.run();
    let (b, _) = harness.run();
    assert_eq!(
        to_canonical_json(&a).unwrap(),
        to_canonical_json(&b).unwrap()
    );
}

/// Replay idempotence: a run replayed from its persisted manifest
/// reproduces the original trace exactly, without the regime object.
#[test]
fn test_replay_round_trip() {
    let harness = TestHarness::new(JITTER_PROGRAM, WORLD_POSITIVE);
    let (trace, manifest_path) = harness.run_and_persist();
    let replayed = replay_and_check(&manifest_path, &trace).unwrap();
    assert_eq!(first_divergence(&trace, &replayed), None);
}

/// Optimization soundness: the fused chain's proof verifies both
/// structurally and semantically, and the fused run matches the
/// original run event-for-event.
#[test]
fn test_optimize_verify_and_execute() {
    let harness = TestHarness::new(FUSED_PROGRAM, WORLD_POSITIVE);
    let (optimized, proof) = optimize(&harness.regime);
    assert_eq!(optimized.chain.canonical(), "Add(0.5)");
    verify(&proof, &harness.regime, &harness.world).unwrap();

    let base = harness.run().0;
    let opt_trace = semio_runtime::Interpreter::new(&harness.world)
        .execute(&optimized, "program.sc")
        .unwrap();
    assert_eq!(first_divergence(&base, &opt_trace), None);
}

/// ctxscan end-to-end: the canonical non-commuting pair near zero is
/// reported as a witness at the threshold projection, and the report
/// itself is deterministic.
#[test]
fn test_ctxscan_witness_pipeline() {
    let harness = TestHarness::new(WITNESS_PROGRAM, WORLD_NEAR_ZERO);
    let options = ScanOptions::new(2);
    let a = scan(
        &harness.regime,
        &harness.world,
        "program.sc",
        "world.json",
        &options,
    )
    .unwrap();
    let b = scan(
        &harness.regime,
        &harness.world,
        "program.sc",
        "world.json",
        &options,
    )
    .unwrap();

    assert!(!a.report.noncontextual);
    let witness = &a.report.witnesses[0];
    assert_eq!(witness.projection, "threshold@0");
    assert_eq!(witness.baseline_obj, "AFFIRM");
    assert_eq!(witness.variant_obj, "NEGATE");

    assert_eq!(
        to_canonical_json(&a.report).unwrap(),
        to_canonical_json(&b.report).unwrap()
    );
}

/// Window size 1 yields no witnesses, for any program.
#[test]
fn test_ctxscan_degenerate_window() {
    let harness = TestHarness::new(WITNESS_PROGRAM, WORLD_NEAR_ZERO);
    let outcome = scan(
        &harness.regime,
        &harness.world,
        "program.sc",
        "world.json",
        &ScanOptions::new(1),
    )
    .unwrap();
    assert!(outcome.report.noncontextual);
    assert!(outcome.report.witnesses.is_empty());
}

/// Plasticity over persisted traces: a stable seeded run produces a
/// stable verdict with full provenance digests.
#[test]
fn test_plasticity_over_persisted_traces() {
    let harness = TestHarness::new(JITTER_PROGRAM, WORLD_POSITIVE);
    let (_, manifest_path) = harness.run_and_persist();
    // run_and_persist wrote run.trace.json next to the manifest
    let trace_path: PathBuf = manifest_path.parent().unwrap().join("run.trace.json");

    let report = compute_plasticity_report(
        &[trace_path],
        &PlasticityOptions::new("Add(0.1)>>JitterU(0.1)", "photon_flux"),
    )
    .unwrap();

    assert_eq!(report.schema, "semiocore.plasticity.v1");
    assert_eq!(report.evidence.n_traces, 1);
    assert_eq!(report.evidence.n_events, 2);
    assert_eq!(report.evidence.trace_digests.len(), 1);
    assert_eq!(report.program_file, "program.sc");
}

/// The emitted artifacts carry their frozen schema ids.
#[test]
fn test_artifact_schema_ids() {
    let harness = TestHarness::new(FUSED_PROGRAM, WORLD_POSITIVE);
    let (trace, manifest) = harness.run();
    assert_eq!(trace.schema, "semiocore.trace.v1");
    assert_eq!(manifest.schema, "semiocore.manifest.v1");
    assert_eq!(manifest.protocol, "Strict");

    let (_, proof) = optimize(&harness.regime);
    assert_eq!(proof.schema, "semiocore.proof.v1");

    let outcome = scan(
        &harness.regime,
        &harness.world,
        "program.sc",
        "world.json",
        &ScanOptions::new(2),
    )
    .unwrap();
    assert_eq!(outcome.report.schema, "semiocore.ctxscan.v1");
}

/// Manifest declares the RNG parameters replay relies on.
#[test]
fn test_manifest_rng_provenance() {
    let harness = TestHarness::new(JITTER_PROGRAM, WORLD_POSITIVE);
    let (_, manifest) = harness.run();
    assert_eq!(manifest.seed, Some(123));
    let rng = manifest.rng.unwrap();
    assert_eq!(rng.kind, "LCG32");
    assert_eq!(rng.a, 1_664_525);
    assert_eq!(rng.c, 1_013_904_223);
    assert_eq!(rng.state0, 123);
}
