//! Interpreter
//!
//! Walks a regime's statement body in sequence under an execution
//! cursor, producing an ordered trace. Operator chain application is a
//! strict left-to-right fold; no operation suspends or yields outside
//! the engine's own call stack.

use tracing::{debug, instrument, trace};

use semio_ast::{Effect, Operator, OperatorChain, Regime, Statement};
use semio_world::World;

use crate::cursor::{ExecutionCursor, SensedValue};
use crate::error::{BindingError, RegimeError, Result};
use crate::manifest::{Manifest, Provenance};
use crate::rng::Lcg32;
use crate::trace::{q10, Objectivation, Summary, Trace, TraceEvent};

/// Executes regimes against one world. The world is read-only and may
/// be shared across concurrent interpreters; all mutable state lives in
/// the per-run cursor.
pub struct Interpreter<'w> {
    world: &'w World,
}

/// Execute a regime and produce its trace and manifest as one unit.
pub fn execute(
    regime: &Regime,
    world: &World,
    provenance: &Provenance,
) -> Result<(Trace, Manifest)> {
    let trace = Interpreter::new(world).execute(regime, &provenance.program_file)?;
    let manifest = Manifest::new(provenance, regime.seed());
    Ok((trace, manifest))
}

/// Apply an operator chain left-to-right: each operator's output feeds
/// the next. Returns the effective value and the last jitter noise
/// drawn, if any. `JitterU` consumes exactly one RNG draw per
/// application and requires a seeded RNG.
pub fn apply_chain(
    chain: &OperatorChain,
    rng: &mut Option<Lcg32>,
    input: f64,
) -> Result<(f64, Option<f64>)> {
    let mut value = input;
    let mut noise_out = None;
    for op in chain.ops() {
        match op {
            Operator::Add { arg } => value += arg,
            Operator::Sign => value = if value > 0.0 { 1.0 } else { -1.0 },
            Operator::JitterU { arg } => {
                let rng = rng.as_mut().ok_or(RegimeError::SeedRequired)?;
                let u = rng.next_u01();
                let noise = (2.0 * u - 1.0) * arg;
                value += noise;
                noise_out = Some(noise);
            }
        }
    }
    Ok((value, noise_out))
}

impl<'w> Interpreter<'w> {
    pub fn new(world: &'w World) -> Self {
        Self { world }
    }

    /// Execute the regime's statement body. Structural errors abort the
    /// run; no partial trace is returned.
    #[instrument(skip_all, fields(ctx = %regime.chain))]
    pub fn execute(&self, regime: &Regime, program_file: &str) -> Result<Trace> {
        let ctx_label = regime.chain.canonical();
        let mut cursor = ExecutionCursor::new();
        let mut summary = None;

        for stmt in &regime.body {
            match stmt {
                Statement::Seed { value } => {
                    if cursor.rng.is_some() {
                        return Err(RegimeError::DuplicateSeed.into());
                    }
                    debug!(seed = value, "rng seeded");
                    cursor.rng = Some(Lcg32::new(*value));
                }
                Statement::Tick { dt } => {
                    if *dt <= 0.0 {
                        return Err(RegimeError::InvalidTick { dt: *dt }.into());
                    }
                    cursor.t += dt;
                    let step = cursor.next_step();
                    cursor.events.push(TraceEvent::Tick {
                        step,
                        t: q10(cursor.t),
                        dt: q10(*dt),
                    });
                }
                Statement::Sense { binding, channel } => {
                    self.sense(&mut cursor, &regime.chain, &ctx_label, binding, channel)?;
                }
                Statement::Commit { binding } => {
                    Self::commit(&mut cursor, &ctx_label, binding)?;
                }
                Statement::Do {
                    effect: Effect::AddBias { arg },
                } => {
                    trace!(bias = arg, "bias set");
                    cursor.bias = *arg;
                }
                Statement::Summarize => {
                    summary = Some(Self::summarize(&mut cursor)?);
                    break;
                }
            }
        }

        debug!(
            events = cursor.events.len(),
            draws = cursor.rng.as_ref().map(|r| r.draws()).unwrap_or(0),
            "run complete"
        );
        Ok(Trace::new(program_file, cursor.events, summary))
    }

    fn sense(
        &self,
        cursor: &mut ExecutionCursor,
        chain: &OperatorChain,
        ctx_label: &str,
        binding: &str,
        channel: &str,
    ) -> Result<()> {
        let s = self.world.channel(channel)?.sample_at(cursor.t)?;
        let r_raw = s + cursor.bias;
        let (r_eff, noise) = apply_chain(chain, &mut cursor.rng, r_raw)?;

        let step = cursor.next_step();
        let event = if noise.is_none() {
            TraceEvent::Sense {
                step,
                t: q10(cursor.t),
                ctx: ctx_label.to_string(),
                binding: binding.to_string(),
                ch: channel.to_string(),
                s: q10(s),
                r_raw: q10(r_raw),
                noise: None,
                r_eff: q10(r_eff),
            }
        } else {
            TraceEvent::Sense {
                step,
                t: cursor.t,
                ctx: ctx_label.to_string(),
                binding: binding.to_string(),
                ch: channel.to_string(),
                s,
                r_raw,
                noise,
                r_eff,
            }
        };
        cursor.events.push(event);

        cursor.bindings.insert(
            binding.to_string(),
            SensedValue {
                channel: channel.to_string(),
                s,
                r_raw,
                noise,
                r_eff,
            },
        );
        Ok(())
    }

    fn commit(cursor: &mut ExecutionCursor, ctx_label: &str, binding: &str) -> Result<()> {
        let sensed = cursor
            .bindings
            .get(binding)
            .cloned()
            .ok_or_else(|| BindingError::Unbound(binding.to_string()))?;

        let obj = Objectivation::of(sensed.r_eff);
        let expected_obj = Objectivation::of(sensed.s);
        let kappa_loc = if obj == expected_obj { 1.0 } else { 0.0 };
        cursor.commits += 1;
        cursor.kappa_sum += kappa_loc;

        let step = cursor.next_step();
        let event = if sensed.noise.is_none() {
            TraceEvent::Commit {
                step,
                t: q10(cursor.t),
                ctx: ctx_label.to_string(),
                binding: binding.to_string(),
                ch: sensed.channel,
                s: q10(sensed.s),
                r_raw: q10(sensed.r_raw),
                r_eff: q10(sensed.r_eff),
                obj,
                expected_obj,
                kappa_loc,
            }
        } else {
            TraceEvent::Commit {
                step,
                t: cursor.t,
                ctx: ctx_label.to_string(),
                binding: binding.to_string(),
                ch: sensed.channel,
                s: sensed.s,
                r_raw: sensed.r_raw,
                r_eff: sensed.r_eff,
                obj,
                expected_obj,
                kappa_loc,
            }
        };
        cursor.events.push(event);
        Ok(())
    }

    fn summarize(cursor: &mut ExecutionCursor) -> Result<Summary> {
        if cursor.t <= 0.0 {
            return Err(RegimeError::ZeroDuration.into());
        }
        let n = cursor.commits;
        let rho = if n > 0 { n as f64 / cursor.t } else { 0.0 };
        let kappa = if n > 0 {
            cursor.kappa_sum / n as f64
        } else {
            0.0
        };
        let summary = Summary {
            n,
            delta_t: q10(cursor.t),
            rho: q10(rho),
            kappa: q10(kappa),
        };

        let step = cursor.next_step();
        cursor.events.push(TraceEvent::Out {
            step,
            t: q10(cursor.t),
            n: summary.n,
            delta_t: summary.delta_t,
            rho: summary.rho,
            kappa: summary.kappa,
        });
        Ok(summary)
    }
}
