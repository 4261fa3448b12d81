//! Canonical JSON emission
//!
//! Every artifact is emitted the same way: UTF-8, sorted keys, 2-space
//! indent, no non-ASCII escaping, trailing newline. Serialization goes
//! through `serde_json::Value`, whose map type keeps keys sorted, so the
//! byte output of identical artifacts is identical across runs.

use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// Canonical emission errors
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Render a serializable artifact as canonical JSON text.
pub fn to_canonical_json<T: Serialize>(artifact: &T) -> Result<String, JsonError> {
    let value = serde_json::to_value(artifact)?;
    let mut text = serde_json::to_string_pretty(&value)?;
    text.push('\n');
    Ok(text)
}

/// Write a serializable artifact to `path` as canonical JSON.
///
/// Parent directories are created as needed.
pub fn write_canonical_json<T: Serialize>(path: &Path, artifact: &T) -> Result<(), JsonError> {
    let text = to_canonical_json(artifact)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| JsonError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
    }
    fs::write(path, text).map_err(|source| JsonError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Sample {
        zeta: f64,
        alpha: &'static str,
    }

    #[test]
    fn test_keys_sorted_and_trailing_newline() {
        let text = to_canonical_json(&Sample {
            zeta: 0.5,
            alpha: "señal",
        })
        .unwrap();

        assert!(text.ends_with('\n'));
        let alpha_at = text.find("alpha").unwrap();
        let zeta_at = text.find("zeta").unwrap();
        assert!(alpha_at < zeta_at);
        // Non-ASCII stays unescaped
        assert!(text.contains("señal"));
    }

    #[test]
    fn test_byte_stable_across_calls() {
        let a = to_canonical_json(&Sample {
            zeta: 1.0,
            alpha: "x",
        })
        .unwrap();
        let b = to_canonical_json(&Sample {
            zeta: 1.0,
            alpha: "x",
        })
        .unwrap();
        assert_eq!(a, b);
    }
}
