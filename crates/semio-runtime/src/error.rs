//! Runtime errors
//!
//! All failures are fatal at the point of detection: the engine never
//! returns a partially-built trace as if complete.

use thiserror::Error;

use semio_world::ChannelError;

/// Runtime result type
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed statement sequences detected during execution.
#[derive(Debug, Error, PartialEq)]
pub enum RegimeError {
    #[error("duplicate seed statement")]
    DuplicateSeed,

    #[error("tick dt must be > 0, got {dt}")]
    InvalidTick { dt: f64 },

    #[error("JitterU requires a seed")]
    SeedRequired,

    #[error("total time must be > 0 to summarize")]
    ZeroDuration,
}

/// Use of a binding that was never sensed.
#[derive(Debug, Error, PartialEq)]
pub enum BindingError {
    #[error("commit {0} before sensing it")]
    Unbound(String),
}

/// Top-level runtime error.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Regime(#[from] RegimeError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Binding(#[from] BindingError),
}
