//! Artifact contracts
//!
//! Frozen schema identifiers plus the canonical JSON emission discipline
//! shared by every artifact the toolchain produces.

pub mod hash;
pub mod json;
pub mod paths;

pub use hash::{sha256_canonical, sha256_file};
pub use json::{to_canonical_json, write_canonical_json};

/// Schema id for the canonical program AST envelope.
pub const AST_SCHEMA_V1: &str = "semiocore.ast.v1";

/// Schema id for the language manifest.
pub const LANG_SCHEMA_V1: &str = "semiocore.lang.v1";

/// Schema id for execution traces.
pub const TRACE_SCHEMA_V1: &str = "semiocore.trace.v1";

/// Schema id for run manifests.
pub const MANIFEST_SCHEMA_V1: &str = "semiocore.manifest.v1";

/// Schema id for context-scan reports.
pub const CTXSCAN_SCHEMA_V1: &str = "semiocore.ctxscan.v1";

/// Schema id for optimization proofs.
pub const PROOF_SCHEMA_V1: &str = "semiocore.proof.v1";

/// Schema id for plasticity reports.
pub const PLASTICITY_SCHEMA_V1: &str = "semiocore.plasticity.v1";

/// Engine version declared in manifests.
pub const SEMIO_VERSION: &str = "1.0.0";

/// Standard library version declared in manifests.
pub const STDLIB_VERSION: &str = "1.0.0";

/// Current UTC time in RFC 3339 form. Volatile manifest field, excluded
/// from every conformance comparison.
pub fn utc_now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
