//! Artifact hashing
//!
//! sha256 over file bytes (manifest provenance) and over canonical JSON
//! (per-variant outcome digests).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Hashing errors
#[derive(Debug, Error)]
pub enum HashError {
    #[error("cannot hash {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot canonicalize for hashing: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// sha256 of a file's bytes, hex-encoded.
pub fn sha256_file(path: &Path) -> Result<String, HashError> {
    let file = File::open(path).map_err(|source| HashError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf).map_err(|source| HashError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex(&hasher.finalize()))
}

/// sha256 of a value's compact canonical JSON (sorted keys, no whitespace),
/// hex-encoded. Stable across formatting, so usable as an outcome digest.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, HashError> {
    let value = serde_json::to_value(value)?;
    let bytes = serde_json::to_vec(&value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex(&hasher.finalize()))
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sha256_file_matches_known_vector() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"abc").unwrap();
        let h = sha256_file(f.path()).unwrap();
        assert_eq!(
            h,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_canonical_is_format_independent() {
        let a: serde_json::Value = serde_json::from_str(r#"{"b":1,"a":2}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str("{ \"a\": 2,\n \"b\": 1 }").unwrap();
        assert_eq!(
            sha256_canonical(&a).unwrap(),
            sha256_canonical(&b).unwrap()
        );
    }
}
