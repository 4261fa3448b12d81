//! `semiocore.ctxscan.v1` report
//!
//! Aggregation over all variants: per-variant outcome digests,
//! sensitivity metrics, and contextuality witnesses. Producers emit a
//! canonical deterministic order; consumers must not assume list order
//! is semantic beyond what the schema states.

use serde::{Deserialize, Serialize};

use semio_runtime::Summary;

/// A minimal pair of variants whose traces diverge under the commit
/// projection, plus the projection that exhibits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Witness {
    /// Start of the permuted window in the base chain.
    pub window_start: usize,
    /// Canonical composition string of the baseline variant.
    pub ctx_base: String,
    /// Canonical composition string of the diverging variant.
    pub ctx_variant: String,
    /// Projection label, e.g. `threshold@0`: compare the sign of the
    /// committed value at commit index 0.
    pub projection: String,
    /// 1-indexed commit step at which the outcomes differ.
    pub diff_step: usize,
    pub baseline_obj: String,
    pub variant_obj: String,
    pub baseline_value: f64,
    pub variant_value: f64,
}

/// One executed permutation of a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantEntry {
    /// Index within the window's canonical permutation order.
    pub i: usize,
    /// Canonical composition string of the full variant chain.
    pub ctx: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    /// |kappa - baseline kappa|
    pub dkappa: f64,
    /// sha256 over the variant trace's canonical event list.
    pub digest: String,
}

/// All variants of one sliding window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub start: usize,
    pub len: usize,
    pub perms: Vec<VariantEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witness: Option<Witness>,
}

/// `semiocore.ctxscan.v1` artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtxScanReport {
    pub schema: String,
    pub program_file: String,
    pub world_file: String,
    pub protocol: String,
    pub baseline_ctx: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_summary: Option<Summary>,
    pub window_size: usize,
    /// True when no window produced a witness.
    pub noncontextual: bool,
    /// Max |kappa - baseline kappa| across all variants.
    pub dkappa_max: f64,
    /// Fraction of adjacent operator pairs whose swap diverges under
    /// the commit projection.
    pub noncommuting_fraction: f64,
    /// Max |r_eff - baseline r_eff| over aligned commits across all
    /// variants.
    pub max_outcome_delta: f64,
    pub witnesses: Vec<Witness>,
    pub windows: Vec<WindowReport>,
}
