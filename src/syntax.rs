use pest::iterators::Pair;

use crate::functions::{MathFunction, lookup_constant};
use crate::{PlotError, Rule, parse};

/// The three inputs every plotted function receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
  X,
  Y,
  T,
}

impl Variable {
  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "x" => Some(Variable::X),
      "y" => Some(Variable::Y),
      "t" => Some(Variable::T),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
  Minus,
  Plus,
  Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
  Plus,
  Minus,
  Times,
  Divide,
  Remainder,
  Power,
  Equal,
  NotEqual,
  Less,
  LessEqual,
  Greater,
  GreaterEqual,
  And,
  Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Number(f64),
  /// A named constant such as `PI`, kept by name for display.
  Constant(String, f64),
  Variable(Variable),
  UnaryOp {
    op: UnaryOperator,
    operand: Box<Expr>,
  },
  BinaryOp {
    op: BinaryOperator,
    left: Box<Expr>,
    right: Box<Expr>,
  },
  Conditional {
    condition: Box<Expr>,
    then: Box<Expr>,
    otherwise: Box<Expr>,
  },
  FunctionCall {
    function: MathFunction,
    args: Vec<Expr>,
  },
}

impl Expr {
  /// True if `var` occurs anywhere in the expression.
  pub fn mentions(&self, var: Variable) -> bool {
    match self {
      Expr::Number(_) | Expr::Constant(..) => false,
      Expr::Variable(v) => *v == var,
      Expr::UnaryOp { operand, .. } => operand.mentions(var),
      Expr::BinaryOp { left, right, .. } => {
        left.mentions(var) || right.mentions(var)
      }
      Expr::Conditional {
        condition,
        then,
        otherwise,
      } => {
        condition.mentions(var) || then.mentions(var) || otherwise.mentions(var)
      }
      Expr::FunctionCall { args, .. } => args.iter().any(|a| a.mentions(var)),
    }
  }
}

/// Deepest expression tree accepted. Evaluation recurses once per level.
pub const MAX_DEPTH: usize = 256;

/// Deepest parenthesis nesting handed to the parser.
pub const MAX_NESTING: usize = 32;

/// Parse `input` into an expression tree.
pub fn string_to_expr(input: &str) -> Result<Expr, PlotError> {
  check_nesting(input)?;
  let program = parse(input)?
    .next()
    .ok_or_else(|| PlotError::Syntax("empty program".into()))?;
  // Program = SOI ~ Expression ~ EOI
  let expression = program
    .into_inner()
    .find(|p| p.as_rule() == Rule::Expression)
    .ok_or_else(|| PlotError::Syntax("missing expression".into()))?;
  pair_to_expr(expression)
}

/// Reject text whose parentheses, conditionals or power chains would make
/// the parser recurse past what the tree builder accepts anyway.
fn check_nesting(input: &str) -> Result<(), PlotError> {
  let mut depth = 0usize;
  for c in input.chars() {
    match c {
      '(' => {
        depth += 1;
        if depth > MAX_NESTING {
          return Err(PlotError::Syntax(format!(
            "parentheses nested deeper than {MAX_NESTING}"
          )));
        }
      }
      ')' => depth = depth.saturating_sub(1),
      _ => {}
    }
  }
  let chained = input.matches('?').count()
    + input.matches('^').count()
    + input.matches("**").count();
  if chained > MAX_DEPTH {
    return Err(too_deep());
  }
  Ok(())
}

fn too_deep() -> PlotError {
  PlotError::Syntax(format!("expression nested deeper than {MAX_DEPTH}"))
}

pub fn pair_to_expr(pair: Pair<Rule>) -> Result<Expr, PlotError> {
  build(pair, 0)
}

/// Build the tree for `pair`, whose root sits `depth` levels down.
fn build(pair: Pair<Rule>, depth: usize) -> Result<Expr, PlotError> {
  if depth > MAX_DEPTH {
    return Err(too_deep());
  }
  let pair = skip_wrappers(pair);
  match pair.as_rule() {
    Rule::Expression => {
      let mut inner = pair.into_inner();
      let condition = next_expr(&mut inner, depth + 1)?;
      match (inner.next(), inner.next()) {
        (Some(then), Some(otherwise)) => Ok(Expr::Conditional {
          condition: Box::new(condition),
          then: Box::new(build(then, depth + 1)?),
          otherwise: Box::new(build(otherwise, depth + 1)?),
        }),
        _ => Err(PlotError::Syntax("incomplete conditional".into())),
      }
    }
    Rule::Disjunction
    | Rule::Conjunction
    | Rule::Comparison
    | Rule::Sum
    | Rule::Product => fold_left(pair, depth),
    Rule::Unary => prefixed(pair, depth),
    Rule::Power => {
      let mut inner = pair.into_inner();
      let base = next_expr(&mut inner, depth + 1)?;
      match (inner.next(), inner.next()) {
        (Some(_), Some(exponent)) => Ok(Expr::BinaryOp {
          op: BinaryOperator::Power,
          left: Box::new(base),
          right: Box::new(build(exponent, depth + 1)?),
        }),
        _ => Err(PlotError::Syntax("missing exponent".into())),
      }
    }
    Rule::Number => {
      let text = pair.as_str();
      text
        .parse::<f64>()
        .map(Expr::Number)
        .map_err(|_| PlotError::Number(text.to_string()))
    }
    Rule::Identifier => identifier_to_expr(pair),
    Rule::Call => call(pair, depth),
    rule => Err(PlotError::Syntax(format!("unexpected rule {rule:?}"))),
  }
}

/// Descend through precedence levels that wrap a single operand, so that
/// parentheses cost no recursion of their own.
fn skip_wrappers(mut pair: Pair<Rule>) -> Pair<Rule> {
  loop {
    match pair.as_rule() {
      Rule::Expression
      | Rule::Disjunction
      | Rule::Conjunction
      | Rule::Comparison
      | Rule::Sum
      | Rule::Product
      | Rule::Unary
      | Rule::Power => {
        let mut inner = pair.clone().into_inner();
        match (inner.next(), inner.next()) {
          (Some(only), None) => pair = only,
          _ => return pair,
        }
      }
      _ => return pair,
    }
  }
}

fn next_expr<'a>(
  inner: &mut impl Iterator<Item = Pair<'a, Rule>>,
  depth: usize,
) -> Result<Expr, PlotError> {
  let first = inner
    .next()
    .ok_or_else(|| PlotError::Syntax("missing operand".into()))?;
  build(first, depth)
}

/// Left-associative fold over `operand (op operand)*` sequences. With `n`
/// operators the first operand ends up `n` levels below the root.
fn fold_left(pair: Pair<Rule>, depth: usize) -> Result<Expr, PlotError> {
  let pairs: Vec<_> = pair.into_inner().collect();
  let operators = pairs.len() / 2;
  let operand_depth = depth + operators;
  if operand_depth > MAX_DEPTH {
    return Err(too_deep());
  }
  let mut inner = pairs.into_iter();
  let mut acc = next_expr(&mut inner, operand_depth)?;
  while let Some(op_pair) = inner.next() {
    let op = binary_operator(op_pair.as_str());
    let rhs = next_expr(&mut inner, operand_depth)?;
    acc = Expr::BinaryOp {
      op,
      left: Box::new(acc),
      right: Box::new(rhs),
    };
  }
  Ok(acc)
}

fn prefixed(pair: Pair<Rule>, depth: usize) -> Result<Expr, PlotError> {
  let mut prefixes = Vec::new();
  let mut operand = None;
  for p in pair.into_inner() {
    if p.as_rule() == Rule::PrefixOp {
      prefixes.push(unary_operator(p.as_str()));
      if depth + prefixes.len() > MAX_DEPTH {
        return Err(too_deep());
      }
    } else {
      operand = Some(p);
    }
  }
  let operand =
    operand.ok_or_else(|| PlotError::Syntax("missing operand".into()))?;
  let mut expr = build(operand, depth + prefixes.len())?;
  // innermost prefix binds first
  for op in prefixes.into_iter().rev() {
    expr = Expr::UnaryOp {
      op,
      operand: Box::new(expr),
    };
  }
  Ok(expr)
}

fn call(pair: Pair<Rule>, depth: usize) -> Result<Expr, PlotError> {
  let mut inner = pair.into_inner();
  let ident = inner
    .next()
    .ok_or_else(|| PlotError::Syntax("missing function name".into()))?;
  let name = identifier_name(&ident);
  let function = MathFunction::lookup(name)
    .ok_or_else(|| PlotError::UnknownIdentifier(ident.as_str().into()))?;
  let args = inner
    .map(|arg| build(arg, depth + 1))
    .collect::<Result<Vec<_>, _>>()?;
  function.check_arity(args.len())?;
  Ok(Expr::FunctionCall { function, args })
}

fn identifier_name<'a>(pair: &Pair<'a, Rule>) -> &'a str {
  // Identifier = MathPrefix? ~ Name, and only Name produces a pair
  pair
    .clone()
    .into_inner()
    .next()
    .map(|name| name.as_str())
    .unwrap_or_else(|| pair.as_str())
}

fn identifier_to_expr(pair: Pair<Rule>) -> Result<Expr, PlotError> {
  let full = pair.as_str();
  let name = identifier_name(&pair);
  // Math.x is the constant namespace, never a variable
  if name == full
    && let Some(var) = Variable::from_name(name)
  {
    return Ok(Expr::Variable(var));
  }
  lookup_constant(name)
    .map(|value| Expr::Constant(name.to_string(), value))
    .ok_or_else(|| PlotError::UnknownIdentifier(full.to_string()))
}

fn unary_operator(op: &str) -> UnaryOperator {
  match op {
    "-" => UnaryOperator::Minus,
    "!" => UnaryOperator::Not,
    _ => UnaryOperator::Plus,
  }
}

fn binary_operator(op: &str) -> BinaryOperator {
  match op {
    "+" => BinaryOperator::Plus,
    "-" => BinaryOperator::Minus,
    "*" => BinaryOperator::Times,
    "/" => BinaryOperator::Divide,
    "%" => BinaryOperator::Remainder,
    "**" | "^" => BinaryOperator::Power,
    "==" | "===" => BinaryOperator::Equal,
    "!=" | "!==" => BinaryOperator::NotEqual,
    "<" => BinaryOperator::Less,
    "<=" => BinaryOperator::LessEqual,
    ">" => BinaryOperator::Greater,
    ">=" => BinaryOperator::GreaterEqual,
    "&&" => BinaryOperator::And,
    _ => BinaryOperator::Or,
  }
}
