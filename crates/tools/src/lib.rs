//! SemioCore Tools
//!
//! CLI tools for working with SemioCore programs, worlds, and
//! artifacts.

use std::path::Path;

use tracing_subscriber::{fmt, EnvFilter};

use semio_contracts::{paths, sha256_file};
use semio_runtime::Provenance;

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` environment variable to override the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,semio_tools=debug,semio_runtime=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Render a path POSIX-normalized and cwd-relative where possible, for
/// artifact provenance fields.
pub fn portable_path(path: &Path) -> String {
    match std::env::current_dir() {
        Ok(cwd) => paths::portable(path, &cwd),
        Err(_) => paths::posix(path),
    }
}

/// Compute file-level provenance for a run.
pub fn provenance_for(
    program: &Path,
    world: &Path,
) -> Result<Provenance, semio_contracts::hash::HashError> {
    Ok(Provenance {
        program_file: portable_path(program),
        program_hash_sha256: sha256_file(program)?,
        world_file: portable_path(world),
        world_hash_sha256: sha256_file(world)?,
    })
}
