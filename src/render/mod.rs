//! The drawing side of the plotter. The surface controller hands a
//! [`SurfaceFrame`] to a [`Renderer`] after every height mutation.

use crate::grid::Grid;
use crate::region::Region;

mod svg;

pub use svg::*;

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceFrame<'a> {
  pub grid: &'a Grid,
  pub heights: &'a [f64],
  pub region: &'a Region,
  /// Plot-space position of the axis crosshair.
  pub axis_position: [f64; 3],
}

impl SurfaceFrame<'_> {
  /// Plot-space position of vertex `i`.
  pub fn vertex(&self, i: usize) -> [f64; 3] {
    let [x, y] = self.grid.position(i);
    [x, y, self.heights[i]]
  }
}

pub trait Renderer {
  /// Recompute normals from the frame's heights, re-upload and draw.
  fn refresh(&mut self, frame: &SurfaceFrame<'_>);

  /// Show or hide the bounding box and axis crosshair.
  fn set_helpers_visible(&mut self, visible: bool);
}

/// Draws nothing; counts how often it was asked to.
#[derive(Debug, Default, Clone)]
pub struct NullRenderer {
  pub refreshes: usize,
  pub helpers_visible: bool,
}

impl Renderer for NullRenderer {
  fn refresh(&mut self, _frame: &SurfaceFrame<'_>) {
    self.refreshes += 1;
  }

  fn set_helpers_visible(&mut self, visible: bool) {
    self.helpers_visible = visible;
  }
}

pub fn triangle_normal(v0: [f64; 3], v1: [f64; 3], v2: [f64; 3]) -> [f64; 3] {
  let u = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
  let v = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
  [
    u[1] * v[2] - u[2] * v[1],
    u[2] * v[0] - u[0] * v[2],
    u[0] * v[1] - u[1] * v[0],
  ]
}

fn normalize(n: [f64; 3]) -> [f64; 3] {
  let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
  if len < 1e-15 || !len.is_finite() {
    [0.0, 0.0, 1.0]
  } else {
    [n[0] / len, n[1] / len, n[2] / len]
  }
}

/// Smooth per-vertex normals: the area-weighted sum of the unnormalized
/// normals of every adjacent triangle.
pub fn vertex_normals(frame: &SurfaceFrame<'_>) -> Vec<[f64; 3]> {
  let mut sums = vec![[0.0; 3]; frame.grid.len()];
  for [a, b, c] in frame.grid.triangles() {
    let n = triangle_normal(frame.vertex(a), frame.vertex(b), frame.vertex(c));
    for i in [a, b, c] {
      for k in 0..3 {
        sums[i][k] += n[k];
      }
    }
  }
  sums.into_iter().map(normalize).collect()
}
