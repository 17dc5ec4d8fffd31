//! Coordinate mapping between normalized grid space, the user's
//! domain/range box and plot space.
//!
//! The plot lives in the unit cube `[-0.5, 0.5]³`. Grid coordinates are
//! already centered, so `grid_to_domain` shifts by `+0.5` before
//! interpolating and `range_to_normalized` shifts back by `-0.5`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PlotError;

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
  a + (b - a) * t
}

/// Inverse of [`lerp`]. A degenerate span (`a == b`, or a non-finite one)
/// maps every value to the midpoint `0.5`.
pub fn inverse_lerp(a: f64, b: f64, v: f64) -> f64 {
  let span = b - a;
  if span == 0.0 || !span.is_finite() {
    return 0.5;
  }
  (v - a) / span
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
  pub min: f64,
  pub max: f64,
}

impl Interval {
  pub const fn new(min: f64, max: f64) -> Self {
    Interval { min, max }
  }

  pub fn is_degenerate(&self) -> bool {
    self.min == self.max
  }

  fn bound_mut(&mut self, bound: Bound) -> &mut f64 {
    match bound {
      Bound::Min => &mut self.min,
      Bound::Max => &mut self.max,
    }
  }
}

/// Map a normalized grid coordinate in `[-0.5, 0.5]` into `interval`.
pub fn grid_to_domain(normalized: f64, interval: Interval) -> f64 {
  lerp(interval.min, interval.max, 0.5 + normalized)
}

/// Map a function value in `interval` to a centered normalized height.
/// Degenerate intervals map everything to `0`.
pub fn range_to_normalized(value: f64, interval: Interval) -> f64 {
  inverse_lerp(interval.min, interval.max, value) - 0.5
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
  X,
  Y,
  Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
  Min,
  Max,
}

impl FromStr for Axis {
  type Err = PlotError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "x" => Ok(Axis::X),
      "y" => Ok(Axis::Y),
      "z" => Ok(Axis::Z),
      other => Err(PlotError::Config(format!("unknown axis {other:?}"))),
    }
  }
}

impl FromStr for Bound {
  type Err = PlotError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "min" => Ok(Bound::Min),
      "max" => Ok(Bound::Max),
      other => Err(PlotError::Config(format!("unknown bound {other:?}"))),
    }
  }
}

impl fmt::Display for Axis {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Axis::X => "x",
      Axis::Y => "y",
      Axis::Z => "z",
    })
  }
}

impl fmt::Display for Bound {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Bound::Min => "min",
      Bound::Max => "max",
    })
  }
}

/// Parse a bound field name such as `xmin` or `zmax`.
pub fn parse_field_name(name: &str) -> Result<(Axis, Bound), PlotError> {
  if !name.is_ascii() || name.len() < 2 {
    return Err(PlotError::Config(format!("invalid bound field {name:?}")));
  }
  let (axis, bound) = name.split_at(1);
  Ok((axis.parse()?, bound.parse()?))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
  pub x: Interval,
  pub y: Interval,
  pub z: Interval,
}

impl Default for Region {
  fn default() -> Self {
    Region {
      x: Interval::new(-5.0, 5.0),
      y: Interval::new(-5.0, 5.0),
      z: Interval::new(-2.5, 2.5),
    }
  }
}

impl Region {
  pub fn axis(&self, axis: Axis) -> Interval {
    match axis {
      Axis::X => self.x,
      Axis::Y => self.y,
      Axis::Z => self.z,
    }
  }

  fn axis_mut(&mut self, axis: Axis) -> &mut Interval {
    match axis {
      Axis::X => &mut self.x,
      Axis::Y => &mut self.y,
      Axis::Z => &mut self.z,
    }
  }

  pub fn set_bound(&mut self, axis: Axis, bound: Bound, value: f64) {
    *self.axis_mut(axis).bound_mut(bound) = value;
  }

  /// Domain point `(x, y)` sampled by the grid vertex at `(nx, ny)`.
  pub fn domain_point(&self, nx: f64, ny: f64) -> (f64, f64) {
    (grid_to_domain(nx, self.x), grid_to_domain(ny, self.y))
  }

  /// Normalized height of function value `z`.
  pub fn height_of(&self, z: f64) -> f64 {
    range_to_normalized(z, self.z)
  }

  /// Plot-space image of the domain origin, where the axis crosshair sits.
  pub fn origin_image(&self) -> [f64; 3] {
    [
      range_to_normalized(0.0, self.x),
      range_to_normalized(0.0, self.y),
      range_to_normalized(0.0, self.z),
    ]
  }

  pub fn is_finite(&self) -> bool {
    [self.x, self.y, self.z]
      .iter()
      .all(|i| i.min.is_finite() && i.max.is_finite())
  }
}
