use crate::PlotError;

/// Largest supported grid side, about four million vertices.
pub const MAX_PRECISION: usize = 2048;

/// A square `precision × precision` arrangement of vertices over the unit
/// square `[-0.5, 0.5]²`. Row 0 is the top edge (`y = 0.5`), and vertex
/// positions never change after construction.
#[derive(Debug, Clone)]
pub struct Grid {
  precision: usize,
  positions: Vec<[f64; 2]>,
}

impl Grid {
  pub fn new(precision: usize) -> Result<Self, PlotError> {
    if !(2..=MAX_PRECISION).contains(&precision) {
      return Err(PlotError::Config(format!(
        "grid precision must be between 2 and {MAX_PRECISION}, \
         got {precision}"
      )));
    }
    let segments = (precision - 1) as f64;
    let mut positions = Vec::with_capacity(precision * precision);
    for row in 0..precision {
      let y = 0.5 - row as f64 / segments;
      for col in 0..precision {
        positions.push([col as f64 / segments - 0.5, y]);
      }
    }
    Ok(Grid {
      precision,
      positions,
    })
  }

  pub fn precision(&self) -> usize {
    self.precision
  }

  pub fn len(&self) -> usize {
    self.positions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  pub fn positions(&self) -> &[[f64; 2]] {
    &self.positions
  }

  pub fn position(&self, index: usize) -> [f64; 2] {
    self.positions[index]
  }

  pub fn index(&self, row: usize, col: usize) -> usize {
    row * self.precision + col
  }

  /// The two triangles of every grid cell, as vertex indices.
  pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
    let n = self.precision;
    (0..n - 1).flat_map(move |row| {
      (0..n - 1).flat_map(move |col| {
        let a = self.index(row, col);
        let b = self.index(row + 1, col);
        let c = self.index(row + 1, col + 1);
        let d = self.index(row, col + 1);
        [[a, b, d], [b, c, d]]
      })
    })
  }
}
