//! Integration test harness for SemioCore.
//!
//! Utilities for end-to-end testing of the full pipeline:
//! Parse → Check → Execute → Artifacts → Replay / Scan / Optimize.

use std::fs;
use std::path::{Path, PathBuf};

use semio_ast::{check_strict, Regime};
use semio_contracts::{sha256_file, write_canonical_json};
use semio_parser::parse_program_file;
use semio_runtime::{execute, Manifest, Provenance, Trace};
use semio_world::World;

/// Test harness holding a program, a world, and their on-disk fixture
/// files in a temp directory.
pub struct TestHarness {
    pub dir: tempfile::TempDir,
    pub regime: Regime,
    pub world: World,
    pub program_path: PathBuf,
    pub world_path: PathBuf,
}

impl TestHarness {
    /// Create a harness from `.sc` source and world JSON.
    ///
    /// # Panics
    ///
    /// Panics if the program fails parsing or the Strict gate, or the
    /// world fails loading. Harness construction is not what these
    /// tests probe.
    pub fn new(program_source: &str, world_json: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let program_path = dir.path().join("program.sc");
        let world_path = dir.path().join("world.json");
        fs::write(&program_path, program_source).expect("write program");
        fs::write(&world_path, world_json).expect("write world");

        let regime = parse_program_file(&program_path).expect("parse program");
        check_strict(&regime).expect("strict gate");
        let world = World::load(&world_path).expect("load world");

        Self {
            dir,
            regime,
            world,
            program_path,
            world_path,
        }
    }

    /// File-level provenance with the literal fixture names.
    pub fn provenance(&self) -> Provenance {
        Provenance {
            program_file: "program.sc".to_string(),
            program_hash_sha256: sha256_file(&self.program_path).expect("hash program"),
            world_file: "world.json".to_string(),
            world_hash_sha256: sha256_file(&self.world_path).expect("hash world"),
        }
    }

    /// Execute the program, returning trace and manifest.
    pub fn run(&self) -> (Trace, Manifest) {
        execute(&self.regime, &self.world, &self.provenance()).expect("execute")
    }

    /// Execute and persist both artifacts next to the fixtures,
    /// returning the trace and the manifest path.
    pub fn run_and_persist(&self) -> (Trace, PathBuf) {
        let (trace, manifest) = self.run();
        let trace_path = self.dir.path().join("run.trace.json");
        let manifest_path = self.dir.path().join("run.manifest.json");
        write_canonical_json(&trace_path, &trace).expect("write trace");
        write_canonical_json(&manifest_path, &manifest).expect("write manifest");
        (trace, manifest_path)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
