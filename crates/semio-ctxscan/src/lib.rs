//! Context scanner (ctxscan)
//!
//! Permutes a regime's operator chain within sliding windows, executes
//! every variant against the same world and seed, and aggregates a
//! deterministic sensitivity report with contextuality witnesses.

pub mod perm;
pub mod report;
pub mod scan;

pub use perm::distinct_permutations;
pub use report::{CtxScanReport, VariantEntry, Witness, WindowReport};
pub use scan::{scan, ScanError, ScanOptions, ScanOutcome, VariantTrace};
