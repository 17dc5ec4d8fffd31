use crate::PlotError;

/// Named constants. Each is also reachable through its lowercase alias
/// (`PI` and `pi`, `SQRT1_2` and `sqrt1_2`).
const CONSTANTS: &[(&str, f64)] = &[
  ("E", std::f64::consts::E),
  ("LN10", std::f64::consts::LN_10),
  ("LN2", std::f64::consts::LN_2),
  ("LOG10E", std::f64::consts::LOG10_E),
  ("LOG2E", std::f64::consts::LOG2_E),
  ("PI", std::f64::consts::PI),
  ("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2),
  ("SQRT2", std::f64::consts::SQRT_2),
];

pub fn lookup_constant(name: &str) -> Option<f64> {
  CONSTANTS
    .iter()
    .find(|(key, _)| *key == name || key.to_lowercase() == name)
    .map(|&(_, value)| value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
  Exact(usize),
  Variadic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFunction {
  Abs,
  Acos,
  Acosh,
  Asin,
  Asinh,
  Atan,
  Atan2,
  Atanh,
  Cbrt,
  Ceil,
  Clz32,
  Cos,
  Cosh,
  Exp,
  Expm1,
  Floor,
  Fround,
  Hypot,
  Imul,
  Log,
  Log1p,
  Log10,
  Log2,
  Max,
  Min,
  Pow,
  Random,
  Round,
  Sign,
  Sin,
  Sinh,
  Sqrt,
  Tan,
  Tanh,
  Trunc,
}

const FUNCTIONS: &[(&str, MathFunction)] = &[
  ("abs", MathFunction::Abs),
  ("acos", MathFunction::Acos),
  ("acosh", MathFunction::Acosh),
  ("asin", MathFunction::Asin),
  ("asinh", MathFunction::Asinh),
  ("atan", MathFunction::Atan),
  ("atan2", MathFunction::Atan2),
  ("atanh", MathFunction::Atanh),
  ("cbrt", MathFunction::Cbrt),
  ("ceil", MathFunction::Ceil),
  ("clz32", MathFunction::Clz32),
  ("cos", MathFunction::Cos),
  ("cosh", MathFunction::Cosh),
  ("exp", MathFunction::Exp),
  ("expm1", MathFunction::Expm1),
  ("floor", MathFunction::Floor),
  ("fround", MathFunction::Fround),
  ("hypot", MathFunction::Hypot),
  ("imul", MathFunction::Imul),
  ("log", MathFunction::Log),
  ("log1p", MathFunction::Log1p),
  ("log10", MathFunction::Log10),
  ("log2", MathFunction::Log2),
  ("max", MathFunction::Max),
  ("min", MathFunction::Min),
  ("pow", MathFunction::Pow),
  ("random", MathFunction::Random),
  ("round", MathFunction::Round),
  ("sign", MathFunction::Sign),
  ("sin", MathFunction::Sin),
  ("sinh", MathFunction::Sinh),
  ("sqrt", MathFunction::Sqrt),
  ("tan", MathFunction::Tan),
  ("tanh", MathFunction::Tanh),
  ("trunc", MathFunction::Trunc),
];

impl MathFunction {
  pub fn lookup(name: &str) -> Option<Self> {
    FUNCTIONS
      .iter()
      .find(|(key, _)| *key == name)
      .map(|&(_, f)| f)
  }

  pub fn name(self) -> &'static str {
    FUNCTIONS
      .iter()
      .find(|(_, f)| *f == self)
      .map(|&(key, _)| key)
      .unwrap_or("?")
  }

  pub fn arity(self) -> Arity {
    use MathFunction::*;
    match self {
      Random => Arity::Exact(0),
      Atan2 | Imul | Pow => Arity::Exact(2),
      Hypot | Max | Min => Arity::Variadic,
      _ => Arity::Exact(1),
    }
  }

  pub fn check_arity(self, found: usize) -> Result<(), PlotError> {
    match self.arity() {
      Arity::Exact(n) if n != found => Err(PlotError::Arity {
        name: self.name().to_string(),
        expected: n.to_string(),
        found,
      }),
      _ => Ok(()),
    }
  }

  /// Apply to already-evaluated arguments. Arity was checked at compile time.
  pub fn apply(self, args: &[f64]) -> f64 {
    use MathFunction::*;
    let a = args.first().copied().unwrap_or(f64::NAN);
    let b = args.get(1).copied().unwrap_or(f64::NAN);
    match self {
      Abs => a.abs(),
      Acos => a.acos(),
      Acosh => a.acosh(),
      Asin => a.asin(),
      Asinh => a.asinh(),
      Atan => a.atan(),
      Atan2 => a.atan2(b),
      Atanh => a.atanh(),
      Cbrt => a.cbrt(),
      Ceil => a.ceil(),
      Clz32 => to_uint32(a).leading_zeros() as f64,
      Cos => a.cos(),
      Cosh => a.cosh(),
      Exp => a.exp(),
      Expm1 => a.exp_m1(),
      Floor => a.floor(),
      Fround => a as f32 as f64,
      Hypot => hypot(args),
      Imul => (to_uint32(a) as i32).wrapping_mul(to_uint32(b) as i32) as f64,
      Log => a.ln(),
      Log1p => a.ln_1p(),
      Log10 => a.log10(),
      Log2 => a.log2(),
      Max => extremum(args, f64::NEG_INFINITY, |v, acc| v > acc),
      Min => extremum(args, f64::INFINITY, |v, acc| v < acc),
      Pow => pow(a, b),
      Random => crate::random_unit(),
      Round => round(a),
      Sign => sign(a),
      Sin => a.sin(),
      Sinh => a.sinh(),
      Sqrt => a.sqrt(),
      Tan => a.tan(),
      Tanh => a.tanh(),
      Trunc => a.trunc(),
    }
  }
}

/// Exponentiation where a NaN exponent, or `±1 ** ±Infinity`, is NaN.
pub fn pow(base: f64, exponent: f64) -> f64 {
  if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
    return f64::NAN;
  }
  base.powf(exponent)
}

/// Round half toward positive infinity.
pub fn round(x: f64) -> f64 {
  if !x.is_finite() {
    return x;
  }
  let floor = x.floor();
  if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

fn sign(x: f64) -> f64 {
  if x.is_nan() || x == 0.0 { x } else { x.signum() }
}

fn hypot(args: &[f64]) -> f64 {
  if args.iter().any(|v| v.is_infinite()) {
    return f64::INFINITY;
  }
  args.iter().fold(0.0, |acc, v| acc.hypot(*v))
}

/// Max/min that propagate NaN instead of skipping it.
fn extremum(args: &[f64], empty: f64, better: fn(f64, f64) -> bool) -> f64 {
  let mut acc = empty;
  for &v in args {
    if v.is_nan() {
      return f64::NAN;
    }
    if better(v, acc) {
      acc = v;
    }
  }
  acc
}

/// Modular conversion to a 32-bit unsigned integer.
fn to_uint32(x: f64) -> u32 {
  if !x.is_finite() {
    return 0;
  }
  x.trunc().rem_euclid(4_294_967_296.0) as u32
}
