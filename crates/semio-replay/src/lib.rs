//! Replay engine
//!
//! Reconstructs an execution purely from a persisted manifest: the
//! program is re-resolved from `program_file` provenance, the manifest's
//! seed is applied, and the run is executed identically. Given a
//! reference trace, replay asserts bit-for-bit event equivalence.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument};

use semio_ast::check_strict;
use semio_contracts::MANIFEST_SCHEMA_V1;
use semio_parser::parse_program_file;
use semio_runtime::{first_divergence, Interpreter, Trace};
use semio_world::World;

/// Replay failures
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("cannot read manifest {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported manifest schema: {0}")]
    UnsupportedSchema(String),

    #[error("manifest lacks provenance field '{0}'")]
    MissingProvenance(&'static str),

    #[error(transparent)]
    Parse(#[from] semio_parser::ParseError),

    #[error(transparent)]
    Strict(#[from] semio_ast::StrictError),

    #[error(transparent)]
    World(#[from] semio_world::WorldError),

    #[error(transparent)]
    Run(#[from] semio_runtime::Error),

    #[error("replay diverged from reference trace at event index {event_index}")]
    Divergence { event_index: usize },
}

/// Resolve a manifest-recorded path: as given if it exists, else
/// relative to the manifest's directory.
fn resolve_path(recorded: &str, base_dir: &Path) -> PathBuf {
    let direct = PathBuf::from(recorded);
    if direct.exists() {
        return direct;
    }
    let relative = base_dir.join(recorded);
    if relative.exists() {
        return relative;
    }
    direct
}

/// Re-execute the run a manifest describes and return the fresh trace.
///
/// The emitted trace carries the manifest's literal `program_file`
/// string, so replayed artifacts remain comparable to the originals.
#[instrument(skip_all, fields(manifest = %manifest_path.display()))]
pub fn replay_from_manifest(manifest_path: &Path) -> Result<Trace, ReplayError> {
    let text = fs::read_to_string(manifest_path).map_err(|source| ReplayError::Io {
        path: manifest_path.display().to_string(),
        source,
    })?;
    let manifest: serde_json::Value = serde_json::from_str(&text)?;

    let schema = manifest
        .get("schema")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    if schema != MANIFEST_SCHEMA_V1 {
        return Err(ReplayError::UnsupportedSchema(schema.to_string()));
    }

    let program_file = manifest
        .get("program_file")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(ReplayError::MissingProvenance("program_file"))?;
    let world_file = manifest
        .get("world_file")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(ReplayError::MissingProvenance("world_file"))?;
    let seed = manifest
        .get("seed")
        .and_then(serde_json::Value::as_u64)
        .map(|s| (s & 0xFFFF_FFFF) as u32);

    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let program_path = resolve_path(program_file, base_dir);
    let world_path = resolve_path(world_file, base_dir);
    debug!(
        program = %program_path.display(),
        world = %world_path.display(),
        seed,
        "replaying"
    );

    let mut regime = parse_program_file(&program_path)?;
    check_strict(&regime)?;
    if let Some(seed) = seed {
        regime = regime.with_seed(seed);
    }

    let world = World::load(&world_path)?;
    let trace = Interpreter::new(&world).execute(&regime, program_file)?;
    info!(events = trace.events.len(), "replay complete");
    Ok(trace)
}

/// Replay and assert equivalence with a reference trace.
pub fn replay_and_check(
    manifest_path: &Path,
    reference: &Trace,
) -> Result<Trace, ReplayError> {
    let trace = replay_from_manifest(manifest_path)?;
    match first_divergence(reference, &trace) {
        None => Ok(trace),
        Some(event_index) => Err(ReplayError::Divergence { event_index }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semio_contracts::{sha256_file, write_canonical_json};
    use semio_runtime::{execute, Provenance};
    use std::io::Write;

    const PROGRAM: &str = r#"
seed 123
context Add(0.2) >> JitterU(0.1) {
  tick 0.5
  x := sense photon_flux
  commit x
  tick 0.5
  y := sense photon_flux
  commit y
  out := summarize
}
"#;
    const WORLD: &str = r#"{"channels": {"photon_flux": 0.25}}"#;

    fn write_run(dir: &Path) -> (Trace, PathBuf) {
        let program_path = dir.join("p.sc");
        let world_path = dir.join("w.json");
        fs::write(&program_path, PROGRAM).unwrap();
        fs::write(&world_path, WORLD).unwrap();

        let regime = semio_parser::parse_program_file(&program_path).unwrap();
        let world = World::load(&world_path).unwrap();
        let provenance = Provenance {
            program_file: "p.sc".into(),
            program_hash_sha256: sha256_file(&program_path).unwrap(),
            world_file: "w.json".into(),
            world_hash_sha256: sha256_file(&world_path).unwrap(),
        };
        let (trace, manifest) = execute(&regime, &world, &provenance).unwrap();

        let manifest_path = dir.join("run.manifest.json");
        write_canonical_json(&manifest_path, &manifest).unwrap();
        (trace, manifest_path)
    }

    #[test]
    fn test_replay_reproduces_trace() {
        let dir = tempfile::tempdir().unwrap();
        let (trace, manifest_path) = write_run(dir.path());
        let replayed = replay_and_check(&manifest_path, &trace).unwrap();
        assert_eq!(first_divergence(&trace, &replayed), None);
        assert_eq!(replayed.program_file, "p.sc");
    }

    #[test]
    fn test_replay_detects_divergent_reference() {
        let dir = tempfile::tempdir().unwrap();
        let (mut trace, manifest_path) = write_run(dir.path());
        // Corrupt the reference: flip one tick duration
        if let semio_runtime::TraceEvent::Tick { t, .. } = &mut trace.events[0] {
            *t += 1.0;
        }
        let err = replay_and_check(&manifest_path, &trace).unwrap_err();
        assert!(matches!(err, ReplayError::Divergence { event_index: 0 }));
    }

    #[test]
    fn test_missing_provenance_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("bad.manifest.json");
        let mut f = fs::File::create(&manifest_path).unwrap();
        write!(
            f,
            r#"{{"schema": "semiocore.manifest.v1", "world_file": "w.json"}}"#
        )
        .unwrap();
        let err = replay_from_manifest(&manifest_path).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::MissingProvenance("program_file")
        ));
    }

    #[test]
    fn test_unsupported_schema_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("bad.manifest.json");
        fs::write(&manifest_path, r#"{"schema": "semiocore.manifest.v9"}"#).unwrap();
        let err = replay_from_manifest(&manifest_path).unwrap_err();
        assert!(matches!(err, ReplayError::UnsupportedSchema(_)));
    }
}
