//! SemioCore execution engine
//!
//! Walks a regime against a world, producing an ordered trace and a run
//! manifest. Execution is single-threaded and synchronous per run;
//! determinism is the load-bearing property.

pub mod cursor;
pub mod error;
pub mod interpreter;
pub mod manifest;
pub mod rng;
pub mod trace;

pub use error::{BindingError, Error, RegimeError, Result};
pub use interpreter::{execute, Interpreter};
pub use manifest::{Manifest, Provenance, RngDescriptor};
pub use rng::Lcg32;
pub use trace::{first_divergence, q10, Objectivation, Summary, Trace, TraceEvent};
