//! Turning user text into a validated, classified function.
//!
//! Every keystroke produces a candidate, most of them incomplete, so every
//! failure here is a quiet [`Rejection`] that leaves the caller's state alone.

use thiserror::Error;
use tracing::debug;

use crate::evaluator::{CompiledFunction, compile};
use crate::syntax::Variable;
use crate::{PlotError, random_unit};

#[derive(Error, Debug)]
pub enum Rejection {
  #[error("empty input")]
  Empty,
  #[error("does not compile: {0}")]
  ParseFailure(#[from] PlotError),
  #[error("probe evaluated to {0}, not a finite number")]
  NonNumericResult(f64),
  #[error("same function is already active")]
  Redundant,
}

/// A compiled function that survived probing.
#[derive(Debug, Clone)]
pub struct Candidate {
  pub function: CompiledFunction,
  pub time_parametric: bool,
}

/// The random inputs a candidate is probed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
  pub x: f64,
  pub y: f64,
  pub t1: f64,
  pub t2: f64,
}

impl Probe {
  /// Draw a fresh probe from the global RNG.
  pub fn random() -> Self {
    Probe {
      x: random_unit(),
      y: random_unit(),
      t1: random_unit(),
      t2: random_unit(),
    }
  }
}

/// Compile `text` and probe it with random inputs.
pub fn load(text: &str) -> Result<Candidate, Rejection> {
  load_with_probe(text, Probe::random())
}

/// Compile `text` and probe it at `probe`.
///
/// The time classification compares `f(x, y, t1)` with `f(x, y, t2)` and
/// nothing more, so a function whose t-dependence is invisible at those two
/// instants is classified static, and one with call-to-call noise (such as
/// `random()`) is classified time-parametric.
pub fn load_with_probe(
  text: &str,
  probe: Probe,
) -> Result<Candidate, Rejection> {
  if text.trim().is_empty() {
    return Err(Rejection::Empty);
  }
  let function = compile(text)?;
  let first = function.eval(probe.x, probe.y, probe.t1);
  if !first.is_finite() {
    return Err(Rejection::NonNumericResult(first));
  }
  let second = function.eval(probe.x, probe.y, probe.t2);
  let time_parametric = first != second;
  if time_parametric != function.expr().mentions(Variable::T) {
    debug!(
      source = function.source(),
      time_parametric, "time classification disagrees with the syntax tree"
    );
  }
  Ok(Candidate {
    function,
    time_parametric,
  })
}
