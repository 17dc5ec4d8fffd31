//! Per-vertex heights and their in-flight transitions.

/// A transition still in progress for one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
  target: f64,
  increment: f64,
  steps_left: u32,
}

/// Owns the current height of every vertex plus, for vertices mid-transition,
/// the target height and the per-step increment.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
  current: Vec<f64>,
  pending: Vec<Option<Pending>>,
}

impl HeightField {
  pub fn new(len: usize) -> Self {
    HeightField {
      current: vec![0.0; len],
      pending: vec![None; len],
    }
  }

  pub fn len(&self) -> usize {
    self.current.len()
  }

  pub fn is_empty(&self) -> bool {
    self.current.is_empty()
  }

  /// The buffer the renderer draws from.
  pub fn heights(&self) -> &[f64] {
    &self.current
  }

  pub fn current(&self, i: usize) -> f64 {
    self.current[i]
  }

  pub fn target(&self, i: usize) -> Option<f64> {
    self.pending[i].map(|p| p.target)
  }

  pub fn increment(&self, i: usize) -> Option<f64> {
    self.pending[i].map(|p| p.increment)
  }

  /// Retarget vertex `i`. With `steps == 0` the value is written straight
  /// into the current buffer and any pending transition is dropped.
  pub fn set_target(&mut self, i: usize, value: f64, steps: u32) {
    if steps == 0 {
      self.current[i] = value;
      self.pending[i] = None;
      return;
    }
    self.pending[i] = Some(Pending {
      target: value,
      increment: (value - self.current[i]) / steps as f64,
      steps_left: steps,
    });
  }

  /// Advance every pending vertex by one increment, snapping onto the target
  /// when the remaining distance is within one increment or the step budget
  /// runs out. Returns whether any vertex is still mid-transition.
  pub fn step_all(&mut self) -> bool {
    let mut dirty = false;
    for (current, slot) in self.current.iter_mut().zip(self.pending.iter_mut())
    {
      let Some(pending) = slot else {
        continue;
      };
      let remaining = (pending.target - *current).abs();
      if pending.steps_left > 1 && remaining > pending.increment.abs() {
        *current += pending.increment;
        pending.steps_left -= 1;
        dirty = true;
      } else {
        *current = pending.target;
        *slot = None;
      }
    }
    dirty
  }

  /// True while at least one vertex has not reached its target.
  pub fn is_dirty(&self) -> bool {
    self
      .current
      .iter()
      .zip(&self.pending)
      .any(|(c, p)| p.is_some_and(|p| p.target != *c))
  }

  /// Whether any vertex still has a transition scheduled.
  pub fn has_pending(&self) -> bool {
    self.pending.iter().any(Option::is_some)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn direct_write_skips_animation() {
    let mut field = HeightField::new(2);
    field.set_target(0, 0.25, 0);
    assert_eq!(field.current(0), 0.25);
    assert_eq!(field.target(0), None);
    assert!(!field.step_all());
  }

  #[test]
  fn reaches_target_after_exact_step_count() {
    let mut field = HeightField::new(1);
    field.set_target(0, 0.3, 3);
    assert!(field.step_all());
    assert!(field.step_all());
    assert!(!field.step_all());
    assert_eq!(field.current(0), 0.3);
  }

  #[test]
  fn superseding_target_recomputes_increment() {
    let mut field = HeightField::new(1);
    field.set_target(0, 1.0, 10);
    field.step_all();
    field.set_target(0, 0.0, 10);
    assert!((field.increment(0).unwrap() + 0.01).abs() < 1e-12);
  }
}
