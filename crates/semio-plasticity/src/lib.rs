//! Plasticity analysis
//!
//! A deterministic, auditable report over one or more persisted traces,
//! filtered by (ctx, channel): no randomness, stable ordering, explicit
//! thresholds, evidence digests. Traces are read as loose JSON so
//! reports can also audit artifacts from foreign producers.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use semio_contracts::{hash::HashError, sha256_file, PLASTICITY_SCHEMA_V1};

/// Plasticity failures
#[derive(Debug, Error)]
pub enum PlasticityError {
    #[error("trace_paths must be non-empty")]
    EmptyInput,

    #[error("window_size and window_step must be > 0")]
    InvalidWindow,

    #[error("cannot read trace {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("trace is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no events for ctx={ctx} and channel={channel} in provided traces")]
    NoMatchingEvents { ctx: String, channel: String },

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Analysis configuration.
#[derive(Debug, Clone)]
pub struct PlasticityOptions {
    /// Context label the events must carry.
    pub ctx: String,
    /// Channel the events must reference.
    pub channel: String,
    pub protocol: String,
    pub window_size: usize,
    pub window_step: usize,
    /// Provenance override; defaults to the first trace's program_file.
    pub program_file: Option<String>,
}

impl PlasticityOptions {
    pub fn new(ctx: &str, channel: &str) -> Self {
        Self {
            ctx: ctx.to_string(),
            channel: channel.to_string(),
            protocol: "Strict".to_string(),
            window_size: 10,
            window_step: 10,
            program_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Windowing {
    pub mode: String,
    pub size: usize,
    pub step: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub partition_stability: f64,
    pub noise_sensitivity: f64,
    pub indeterminacy_rate: f64,
    pub coherence_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub plasticity_state: String,
    pub trend: String,
    pub confidence: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(rename = "N_traces")]
    pub n_traces: usize,
    #[serde(rename = "N_events")]
    pub n_events: usize,
    pub trace_digests: Vec<String>,
}

/// `semiocore.plasticity.v1` artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasticityReport {
    pub schema: String,
    pub program_file: String,
    pub protocol: String,
    pub ctx: String,
    pub channel: String,
    pub windowing: Windowing,
    pub metrics: Metrics,
    pub verdict: Verdict,
    pub evidence: Evidence,
}

struct ObservedEvent {
    obj: String,
    sig: f64,
    kappa_loc: Option<f64>,
}

/// Compute a plasticity report from one or more trace files.
pub fn compute_plasticity_report(
    trace_paths: &[PathBuf],
    options: &PlasticityOptions,
) -> Result<PlasticityReport, PlasticityError> {
    if options.window_size == 0 || options.window_step == 0 {
        return Err(PlasticityError::InvalidWindow);
    }
    if trace_paths.is_empty() {
        return Err(PlasticityError::EmptyInput);
    }

    let mut traces = Vec::with_capacity(trace_paths.len());
    let mut digests = Vec::with_capacity(trace_paths.len());
    for path in trace_paths {
        digests.push(sha256_file(path)?);
        traces.push(load_json(path)?);
    }

    let program_file = options.program_file.clone().unwrap_or_else(|| {
        traces[0]
            .get("program_file")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    });

    // Collect matching events across traces; sort by (t, step, global idx)
    let mut keyed: Vec<(f64, u64, usize, ObservedEvent)> = Vec::new();
    for (ti, trace) in traces.iter().enumerate() {
        let events = trace
            .get("events")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for (ei, ev) in events.iter().enumerate() {
            if ev.get("ctx").and_then(Value::as_str) != Some(options.ctx.as_str()) {
                continue;
            }
            if ev.get("ch").and_then(Value::as_str) != Some(options.channel.as_str()) {
                continue;
            }
            if let Some(kind) = ev.get("event").and_then(Value::as_str) {
                if kind != "commit" {
                    continue;
                }
            }
            let t = ev.get("t").and_then(Value::as_f64).unwrap_or(0.0);
            let step = ev.get("step").and_then(Value::as_u64).unwrap_or(0);
            let sig = ev
                .get("r_raw")
                .and_then(Value::as_f64)
                .or_else(|| ev.get("s").and_then(Value::as_f64))
                .unwrap_or(0.0);
            keyed.push((
                t,
                step,
                ti * 1_000_000 + ei,
                ObservedEvent {
                    obj: ev
                        .get("obj")
                        .and_then(Value::as_str)
                        .unwrap_or("UNKNOWN")
                        .to_string(),
                    sig,
                    kappa_loc: ev.get("kappa_loc").and_then(Value::as_f64),
                },
            ));
        }
    }
    keyed.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });
    let events: Vec<ObservedEvent> = keyed.into_iter().map(|(_, _, _, ev)| ev).collect();

    if events.is_empty() {
        return Err(PlasticityError::NoMatchingEvents {
            ctx: options.ctx.clone(),
            channel: options.channel.clone(),
        });
    }

    let n = events.len();
    let objs: Vec<&str> = events.iter().map(|e| e.obj.as_str()).collect();
    let sigs: Vec<f64> = events.iter().map(|e| e.sig).collect();
    let kappas: Vec<f64> = events.iter().filter_map(|e| e.kappa_loc).collect();
    let undetermined = objs
        .iter()
        .filter(|o| {
            let upper = o.to_uppercase();
            upper == "UNDETERMINED" || upper == "UNKNOWN"
        })
        .count();

    // Metric A: partition stability over fixed event windows
    let mut stabilities = Vec::new();
    let mut start = 0;
    while start < n {
        let window = &objs[start..(start + options.window_size).min(n)];
        stabilities.push(stability_of(window));
        start += options.window_step;
    }
    let partition_stability = if stabilities.is_empty() {
        1.0
    } else {
        stabilities.iter().sum::<f64>() / stabilities.len() as f64
    };

    // Metric B: noise sensitivity (partition flips per unit of signal variation)
    let noise_sensitivity = if n > 1 {
        let mut flips = 0.0;
        let mut denom = 0.0;
        for i in 1..n {
            if objs[i] != objs[i - 1] {
                flips += 1.0;
            }
            denom += (sigs[i] - sigs[i - 1]).abs();
        }
        flips / (denom + 1e-9)
    } else {
        0.0
    };

    // Metric C: indeterminacy rate
    let indeterminacy_rate = undetermined as f64 / n as f64;

    // Metric D: coherence loss (variance of kappa_loc)
    let coherence_loss = variance(&kappas);

    // Trend: first half vs second half partition stability
    let half = n / 2;
    let s1 = stability_of(&objs[..half]);
    let s2 = stability_of(&objs[half..]);
    let trend = if s2 < s1 - 0.05 {
        "declining"
    } else if s2 > s1 + 0.05 {
        "improving"
    } else {
        "stable"
    };

    // Verdict thresholds are part of the contract semantics
    let mut reasons = Vec::new();
    if partition_stability < 0.85 {
        reasons.push("low_partition_stability".to_string());
    }
    if noise_sensitivity > 2.0 {
        reasons.push("high_noise_sensitivity".to_string());
    }
    if indeterminacy_rate > 0.05 {
        reasons.push("high_indeterminacy_rate".to_string());
    }
    if coherence_loss > 0.05 {
        reasons.push("high_coherence_loss".to_string());
    }

    let plasticity_state = if reasons.is_empty() {
        "stable"
    } else if partition_stability >= 0.70 && indeterminacy_rate <= 0.20 {
        "fragile"
    } else {
        "degraded"
    };

    let confidence = (n as f64 / 50.0).min(1.0);

    Ok(PlasticityReport {
        schema: PLASTICITY_SCHEMA_V1.to_string(),
        program_file,
        protocol: options.protocol.clone(),
        ctx: options.ctx.clone(),
        channel: options.channel.clone(),
        windowing: Windowing {
            mode: "fixed".to_string(),
            size: options.window_size,
            step: options.window_step,
        },
        metrics: Metrics {
            partition_stability,
            noise_sensitivity,
            indeterminacy_rate,
            coherence_loss,
        },
        verdict: Verdict {
            plasticity_state: plasticity_state.to_string(),
            trend: trend.to_string(),
            confidence,
            reasons,
        },
        evidence: Evidence {
            n_traces: trace_paths.len(),
            n_events: n,
            trace_digests: digests,
        },
    })
}

fn load_json(path: &Path) -> Result<Value, PlasticityError> {
    let text = fs::read_to_string(path).map_err(|source| PlasticityError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Share of the window occupied by its mode. Ties break lexically so
/// the result never depends on iteration order.
fn stability_of(window: &[&str]) -> f64 {
    if window.is_empty() {
        return 1.0;
    }
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in window.iter().copied() {
        match counts.iter_mut().find(|entry| entry.0 == value) {
            Some(entry) => entry.1 += 1,
            None => counts.push((value, 1)),
        }
    }
    let max = counts.iter().map(|entry| entry.1).max().unwrap_or(0);
    let mode = counts
        .iter()
        .filter(|entry| entry.1 == max)
        .map(|entry| entry.0)
        .min()
        .unwrap_or("");
    window.iter().filter(|v| v.eq(&&mode)).count() as f64 / window.len() as f64
}

fn variance(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / xs.len() as f64
}
