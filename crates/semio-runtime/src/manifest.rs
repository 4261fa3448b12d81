//! Run manifest
//!
//! Provenance/summary record of one run, sufficient to drive replay.
//! `run_id` and `timestamp` are volatile bookkeeping fields excluded
//! from conformance comparison.

use serde::{Deserialize, Serialize};

use semio_contracts::{utc_now_iso, MANIFEST_SCHEMA_V1, SEMIO_VERSION, STDLIB_VERSION};

use crate::rng::{LCG_A, LCG_C, LCG_M};

/// File-level provenance computed by the surrounding tool layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub program_file: String,
    pub program_hash_sha256: String,
    pub world_file: String,
    pub world_hash_sha256: String,
}

/// Declared RNG parameters, so replay never has to guess the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RngDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub a: u64,
    pub c: u64,
    pub m: u64,
    pub state0: u32,
}

impl RngDescriptor {
    pub fn lcg32(seed: u32) -> Self {
        Self {
            kind: "LCG32".to_string(),
            a: LCG_A as u64,
            c: LCG_C as u64,
            m: LCG_M,
            state0: seed,
        }
    }
}

/// `semiocore.manifest.v1` artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema: String,
    pub semio_version: String,
    pub stdlib_version: String,
    pub program_file: String,
    pub program_hash_sha256: String,
    pub world_file: String,
    pub world_hash_sha256: String,
    pub protocol: String,
    pub seed: Option<u32>,
    pub rng: Option<RngDescriptor>,
    pub run_id: String,
    pub timestamp: String,
}

impl Manifest {
    pub fn new(provenance: &Provenance, seed: Option<u32>) -> Self {
        Self {
            schema: MANIFEST_SCHEMA_V1.to_string(),
            semio_version: SEMIO_VERSION.to_string(),
            stdlib_version: STDLIB_VERSION.to_string(),
            program_file: provenance.program_file.clone(),
            program_hash_sha256: provenance.program_hash_sha256.clone(),
            world_file: provenance.world_file.clone(),
            world_hash_sha256: provenance.world_hash_sha256.clone(),
            protocol: "Strict".to_string(),
            seed,
            rng: seed.map(RngDescriptor::lcg32),
            run_id: format!(
                "run-{}",
                &provenance.program_hash_sha256[..provenance.program_hash_sha256.len().min(8)]
            ),
            timestamp: utc_now_iso(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provenance() -> Provenance {
        Provenance {
            program_file: "fixtures/p.sc".into(),
            program_hash_sha256: "aabbccddeeff00112233".into(),
            world_file: "fixtures/w.json".into(),
            world_hash_sha256: "99".into(),
        }
    }

    #[test]
    fn test_manifest_declares_rng_only_when_seeded() {
        let m = Manifest::new(&provenance(), Some(123));
        let rng = m.rng.unwrap();
        assert_eq!(rng.kind, "LCG32");
        assert_eq!(rng.state0, 123);
        assert_eq!(rng.m, 1 << 32);

        let m = Manifest::new(&provenance(), None);
        assert!(m.rng.is_none());
        assert_eq!(m.seed, None);
    }

    #[test]
    fn test_run_id_derived_from_program_hash() {
        let m = Manifest::new(&provenance(), None);
        assert_eq!(m.run_id, "run-aabbccdd");
    }
}
