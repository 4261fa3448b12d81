//! Path rendering for artifacts
//!
//! Path-like artifact fields are informational, not stable identifiers,
//! but they are still emitted POSIX-normalized and repo-relative where
//! possible so artifacts diff cleanly across machines.

use std::path::Path;

/// Render a path with forward slashes, relative to `base` when it is a
/// prefix, otherwise as given.
pub fn portable(path: &Path, base: &Path) -> String {
    let p = path.strip_prefix(base).unwrap_or(path);
    posix(p)
}

/// Render a path with forward slashes.
pub fn posix(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for comp in path.components() {
        parts.push(comp.as_os_str().to_string_lossy().into_owned());
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_portable_strips_base() {
        let base = PathBuf::from("/repo");
        let p = PathBuf::from("/repo/fixtures/world/w_paper.json");
        assert_eq!(portable(&p, &base), "fixtures/world/w_paper.json");
    }

    #[test]
    fn test_portable_keeps_foreign_paths() {
        let base = PathBuf::from("/repo");
        let p = PathBuf::from("elsewhere/prog.sc");
        assert_eq!(portable(&p, &base), "elsewhere/prog.sc");
    }
}
