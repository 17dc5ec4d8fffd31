use crate::PlotError;
use crate::functions::pow;
use crate::syntax::{
  BinaryOperator, Expr, UnaryOperator, Variable, string_to_expr,
};

/// Values bound to the three input variables during one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Inputs {
  pub x: f64,
  pub y: f64,
  pub t: f64,
}

/// A user expression that parsed and resolved against the math table.
/// Evaluation is total: it never fails, non-finite values propagate.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
  source: String,
  expr: Expr,
}

/// Compile `text` into a callable `(x, y, t) -> f64`.
pub fn compile(text: &str) -> Result<CompiledFunction, PlotError> {
  let source = text.trim();
  let expr = string_to_expr(source)?;
  Ok(CompiledFunction {
    source: source.to_string(),
    expr,
  })
}

impl CompiledFunction {
  /// The trimmed source text this function was compiled from.
  pub fn source(&self) -> &str {
    &self.source
  }

  pub fn expr(&self) -> &Expr {
    &self.expr
  }

  pub fn eval(&self, x: f64, y: f64, t: f64) -> f64 {
    evaluate_expr(&self.expr, Inputs { x, y, t })
  }
}

fn truthy(v: f64) -> bool {
  v != 0.0 && !v.is_nan()
}

fn from_bool(b: bool) -> f64 {
  if b { 1.0 } else { 0.0 }
}

/// Evaluate an expression tree with the given variable bindings.
pub fn evaluate_expr(expr: &Expr, inputs: Inputs) -> f64 {
  match expr {
    Expr::Number(n) => *n,
    Expr::Constant(_, value) => *value,
    Expr::Variable(Variable::X) => inputs.x,
    Expr::Variable(Variable::Y) => inputs.y,
    Expr::Variable(Variable::T) => inputs.t,
    Expr::UnaryOp { op, operand } => {
      let v = evaluate_expr(operand, inputs);
      match op {
        UnaryOperator::Minus => -v,
        UnaryOperator::Plus => v,
        UnaryOperator::Not => from_bool(!truthy(v)),
      }
    }
    Expr::BinaryOp { op, left, right } => {
      let l = evaluate_expr(left, inputs);
      // logical operators short-circuit and yield the deciding operand
      match op {
        BinaryOperator::And if !truthy(l) => return l,
        BinaryOperator::Or if truthy(l) => return l,
        _ => {}
      }
      let r = evaluate_expr(right, inputs);
      match op {
        BinaryOperator::Plus => l + r,
        BinaryOperator::Minus => l - r,
        BinaryOperator::Times => l * r,
        BinaryOperator::Divide => l / r,
        BinaryOperator::Remainder => l % r,
        BinaryOperator::Power => pow(l, r),
        BinaryOperator::Equal => from_bool(l == r),
        BinaryOperator::NotEqual => from_bool(l != r),
        BinaryOperator::Less => from_bool(l < r),
        BinaryOperator::LessEqual => from_bool(l <= r),
        BinaryOperator::Greater => from_bool(l > r),
        BinaryOperator::GreaterEqual => from_bool(l >= r),
        BinaryOperator::And | BinaryOperator::Or => r,
      }
    }
    Expr::Conditional {
      condition,
      then,
      otherwise,
    } => {
      if truthy(evaluate_expr(condition, inputs)) {
        evaluate_expr(then, inputs)
      } else {
        evaluate_expr(otherwise, inputs)
      }
    }
    Expr::FunctionCall { function, args } => {
      let values: Vec<f64> =
        args.iter().map(|a| evaluate_expr(a, inputs)).collect();
      function.apply(&values)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn eval(text: &str, x: f64, y: f64, t: f64) -> f64 {
    compile(text).unwrap().eval(x, y, t)
  }

  #[test]
  fn arithmetic_precedence() {
    assert_eq!(eval("1 + 2 * 3", 0.0, 0.0, 0.0), 7.0);
    assert_eq!(eval("(1 + 2) * 3", 0.0, 0.0, 0.0), 9.0);
    assert_eq!(eval("2 ** 3 ** 2", 0.0, 0.0, 0.0), 512.0);
    assert_eq!(eval("-2 ^ 2", 0.0, 0.0, 0.0), -4.0);
    assert_eq!(eval("7 % 3", 0.0, 0.0, 0.0), 1.0);
    assert_eq!(eval("-7 % 3", 0.0, 0.0, 0.0), -1.0);
  }

  #[test]
  fn variables_are_bound() {
    assert_eq!(eval("x * 100 + y * 10 + t", 1.0, 2.0, 3.0), 123.0);
  }

  #[test]
  fn conditional_and_logic() {
    assert_eq!(eval("x > 0 ? x : -x", -3.0, 0.0, 0.0), 3.0);
    assert_eq!(eval("x && y", 0.0, 5.0, 0.0), 0.0);
    assert_eq!(eval("x || y", 0.0, 5.0, 0.0), 5.0);
    assert_eq!(eval("!x", 0.0, 0.0, 0.0), 1.0);
  }

  #[test]
  fn math_table_calls() {
    let v = eval("cos(x) * sin(y)", 0.0, std::f64::consts::FRAC_PI_2, 0.0);
    assert!((v - 1.0).abs() < 1e-12);
    assert_eq!(eval("Math.max(x, y, 4)", 1.0, 2.0, 0.0), 4.0);
    assert_eq!(eval("hypot(3, 4)", 0.0, 0.0, 0.0), 5.0);
  }

  #[test]
  fn division_by_zero_is_not_finite() {
    assert!(!eval("1 / x", 0.0, 0.0, 0.0).is_finite());
    assert!(eval("0 / x", 0.0, 0.0, 0.0).is_nan());
  }

  #[test]
  fn source_is_trimmed() {
    assert_eq!(compile("  x + y \n").unwrap().source(), "x + y");
  }
}
