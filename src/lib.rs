use pest::Parser;
use pest_derive::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use thiserror::Error;

pub mod clock;
pub mod config;
pub mod driver;
pub mod evaluator;
pub mod functions;
pub mod grid;
pub mod height_field;
pub mod loader;
pub mod persistence;
pub mod region;
pub mod render;
pub mod surface;
pub mod syntax;

pub use evaluator::{CompiledFunction, compile};
pub use loader::{Candidate, Rejection};
pub use region::{Axis, Bound, Interval, Region};
pub use surface::{SurfaceController, TransitionState};

#[derive(Parser)]
#[grammar = "expression.pest"]
pub struct ExpressionParser;

#[derive(Error, Debug)]
pub enum PlotError {
  #[error("Parse error: {0}")]
  Parse(#[from] Box<pest::error::Error<Rule>>),
  #[error("Unknown identifier: {0}")]
  UnknownIdentifier(String),
  #[error("{name} expects {expected} argument(s), got {found}")]
  Arity {
    name: String,
    expected: String,
    found: usize,
  },
  #[error("Invalid number literal: {0}")]
  Number(String),
  #[error("Malformed expression: {0}")]
  Syntax(String),
  #[error("Configuration error: {0}")]
  Config(String),
  #[error("Invalid share hash: {0}")]
  Hash(String),
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl ExpressionParser {
  pub fn parse_expression(
    input: &str,
  ) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>>
  {
    Self::parse(Rule::Program, input).map_err(Box::new)
  }
}

pub fn parse(
  input: &str,
) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>> {
  ExpressionParser::parse_expression(input)
}

// Global RNG state: None = use thread_rng(), Some = use seeded ChaCha8Rng
thread_local! {
    static SEEDED_RNG: RefCell<Option<ChaCha8Rng>> = const { RefCell::new(None) };
}

/// Seed the global RNG so probes and `random()` become reproducible.
pub fn seed_rng(seed: u64) {
  SEEDED_RNG.with(|rng| {
    *rng.borrow_mut() = Some(ChaCha8Rng::seed_from_u64(seed));
  });
}

/// Reset the global RNG to non-deterministic mode.
pub fn unseed_rng() {
  SEEDED_RNG.with(|rng| {
    *rng.borrow_mut() = None;
  });
}

/// Execute a closure with a mutable reference to the current RNG.
/// Uses the seeded RNG if set, otherwise falls back to thread_rng().
pub fn with_rng<F, R>(f: F) -> R
where
  F: FnOnce(&mut dyn rand::RngCore) -> R,
{
  SEEDED_RNG.with(|cell| {
    let mut borrow = cell.borrow_mut();
    if let Some(ref mut seeded) = *borrow {
      f(seeded)
    } else {
      f(&mut rand::thread_rng())
    }
  })
}

/// Uniform sample in `[0, 1)` from the global RNG.
pub fn random_unit() -> f64 {
  use rand::Rng;
  with_rng(|rng| rng.gen_range(0.0..1.0))
}
