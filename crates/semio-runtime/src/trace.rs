//! Trace artifact
//!
//! One immutable record per observable action; event order is the
//! primary semantic content. Floats in noise-free events are quantized
//! to 10 decimal places so decimal-add binary artefacts never reach the
//! artifact; noise-bearing sense values keep full precision.

use std::fmt;

use serde::{Deserialize, Serialize};

use semio_contracts::TRACE_SCHEMA_V1;

/// Quantize to 10 decimal places. Negative zero is normalized.
pub fn q10(x: f64) -> f64 {
    let y = (x * 1e10).round() / 1e10;
    if y == 0.0 {
        0.0
    } else {
        y
    }
}

/// Commit outcome under the Strict protocol: sign of the effective
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objectivation {
    #[serde(rename = "AFFIRM")]
    Affirm,
    #[serde(rename = "NEGATE")]
    Negate,
}

impl Objectivation {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Objectivation::Affirm
        } else {
            Objectivation::Negate
        }
    }
}

impl fmt::Display for Objectivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objectivation::Affirm => write!(f, "AFFIRM"),
            Objectivation::Negate => write!(f, "NEGATE"),
        }
    }
}

/// One observable execution event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Simulated time advanced.
    Tick { step: u64, t: f64, dt: f64 },
    /// A channel was sampled and transformed under the active context.
    Sense {
        step: u64,
        t: f64,
        ctx: String,
        binding: String,
        ch: String,
        s: f64,
        r_raw: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        noise: Option<f64>,
        r_eff: f64,
    },
    /// A sensed binding was committed.
    Commit {
        step: u64,
        t: f64,
        ctx: String,
        binding: String,
        ch: String,
        s: f64,
        r_raw: f64,
        r_eff: f64,
        obj: Objectivation,
        expected_obj: Objectivation,
        kappa_loc: f64,
    },
    /// The run was closed and summarized.
    Out {
        step: u64,
        t: f64,
        #[serde(rename = "N")]
        n: u64,
        #[serde(rename = "deltaT")]
        delta_t: f64,
        rho: f64,
        kappa: f64,
    },
}

impl TraceEvent {
    /// Equivalence for conformance comparison. The `ctx` label is
    /// informational (it changes under provably-equivalent chain
    /// rewrites) and is excluded, like the volatile run fields.
    pub fn equivalent(&self, other: &TraceEvent) -> bool {
        use TraceEvent::*;
        match (self, other) {
            (
                Tick { step, t, dt },
                Tick {
                    step: step2,
                    t: t2,
                    dt: dt2,
                },
            ) => step == step2 && t == t2 && dt == dt2,
            (
                Sense {
                    step,
                    t,
                    ctx: _,
                    binding,
                    ch,
                    s,
                    r_raw,
                    noise,
                    r_eff,
                },
                Sense {
                    step: step2,
                    t: t2,
                    ctx: _,
                    binding: binding2,
                    ch: ch2,
                    s: s2,
                    r_raw: r_raw2,
                    noise: noise2,
                    r_eff: r_eff2,
                },
            ) => {
                step == step2
                    && t == t2
                    && binding == binding2
                    && ch == ch2
                    && s == s2
                    && r_raw == r_raw2
                    && noise == noise2
                    && r_eff == r_eff2
            }
            (
                Commit {
                    step,
                    t,
                    ctx: _,
                    binding,
                    ch,
                    s,
                    r_raw,
                    r_eff,
                    obj,
                    expected_obj,
                    kappa_loc,
                },
                Commit {
                    step: step2,
                    t: t2,
                    ctx: _,
                    binding: binding2,
                    ch: ch2,
                    s: s2,
                    r_raw: r_raw2,
                    r_eff: r_eff2,
                    obj: obj2,
                    expected_obj: expected_obj2,
                    kappa_loc: kappa_loc2,
                },
            ) => {
                step == step2
                    && t == t2
                    && binding == binding2
                    && ch == ch2
                    && s == s2
                    && r_raw == r_raw2
                    && r_eff == r_eff2
                    && obj == obj2
                    && expected_obj == expected_obj2
                    && kappa_loc == kappa_loc2
            }
            (
                Out {
                    step,
                    t,
                    n,
                    delta_t,
                    rho,
                    kappa,
                },
                Out {
                    step: step2,
                    t: t2,
                    n: n2,
                    delta_t: delta_t2,
                    rho: rho2,
                    kappa: kappa2,
                },
            ) => {
                step == step2
                    && t == t2
                    && n == n2
                    && delta_t == delta_t2
                    && rho == rho2
                    && kappa == kappa2
            }
            _ => false,
        }
    }
}

/// Run summary, stored on the trace and carried by the `out` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "N")]
    pub n: u64,
    #[serde(rename = "deltaT")]
    pub delta_t: f64,
    pub rho: f64,
    pub kappa: f64,
}

/// Ordered log of observable execution events plus identifying metadata.
///
/// `program_file` is informational provenance; it and the schema id are
/// excluded from equivalence comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub schema: String,
    pub program_file: String,
    pub events: Vec<TraceEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl Trace {
    pub fn new(program_file: &str, events: Vec<TraceEvent>, summary: Option<Summary>) -> Self {
        Self {
            schema: TRACE_SCHEMA_V1.to_string(),
            program_file: program_file.to_string(),
            events,
            summary,
        }
    }

    /// Ordered commit outcomes: the `threshold` projection the scanner
    /// and the witness machinery compare on.
    pub fn commit_outcomes(&self) -> Vec<(Objectivation, f64)> {
        self.events
            .iter()
            .filter_map(|ev| match ev {
                TraceEvent::Commit { obj, r_eff, .. } => Some((*obj, *r_eff)),
                _ => None,
            })
            .collect()
    }
}

/// Index of the first non-equivalent event between two traces, or the
/// shorter length when one trace is a strict prefix of the other.
/// `None` means the traces are equivalent.
pub fn first_divergence(a: &Trace, b: &Trace) -> Option<usize> {
    let shared = a.events.len().min(b.events.len());
    for i in 0..shared {
        if !a.events[i].equivalent(&b.events[i]) {
            return Some(i);
        }
    }
    if a.events.len() != b.events.len() {
        return Some(shared);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_q10_kills_decimal_add_artifacts() {
        let x = 0.1 + 0.2; // 0.30000000000000004
        assert_eq!(q10(x), 0.3);
        assert_eq!(q10(-1e-20), 0.0);
    }

    #[test]
    fn test_equivalence_ignores_ctx() {
        let a = TraceEvent::Sense {
            step: 1,
            t: 0.5,
            ctx: "Add(0.2)>>Add(0.3)".into(),
            binding: "x".into(),
            ch: "ch".into(),
            s: 0.25,
            r_raw: 0.25,
            noise: None,
            r_eff: 0.75,
        };
        let b = TraceEvent::Sense {
            step: 1,
            t: 0.5,
            ctx: "Add(0.5)".into(),
            binding: "x".into(),
            ch: "ch".into(),
            s: 0.25,
            r_raw: 0.25,
            noise: None,
            r_eff: 0.75,
        };
        assert!(a.equivalent(&b));
    }

    #[test]
    fn test_first_divergence_reports_index() {
        let tick = |t: f64| TraceEvent::Tick {
            step: 1,
            t,
            dt: t,
        };
        let a = Trace::new("p.sc", vec![tick(0.5), tick(1.0)], None);
        let b = Trace::new("p.sc", vec![tick(0.5), tick(2.0)], None);
        assert_eq!(first_divergence(&a, &b), Some(1));

        let c = Trace::new("p.sc", vec![tick(0.5)], None);
        assert_eq!(first_divergence(&a, &c), Some(1));
        assert_eq!(first_divergence(&a, &a.clone()), None);
    }

    #[test]
    fn test_event_serde_tags() {
        let json = serde_json::to_value(TraceEvent::Tick {
            step: 1,
            t: 0.5,
            dt: 0.5,
        })
        .unwrap();
        assert_eq!(json["event"], "tick");

        let json = serde_json::to_value(TraceEvent::Out {
            step: 4,
            t: 1.0,
            n: 2,
            delta_t: 1.0,
            rho: 2.0,
            kappa: 1.0,
        })
        .unwrap();
        assert_eq!(json["event"], "out");
        assert_eq!(json["N"], 2);
        assert_eq!(json["deltaT"], 1.0);
    }
}
