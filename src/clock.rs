use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of the wall time that drives time-parametric functions.
pub trait Clock {
  /// Seconds since an arbitrary fixed origin.
  fn now(&self) -> f64;
}

/// Monotonic clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
  origin: Instant,
}

impl SystemClock {
  pub fn new() -> Self {
    SystemClock {
      origin: Instant::now(),
    }
  }
}

impl Default for SystemClock {
  fn default() -> Self {
    Self::new()
  }
}

impl Clock for SystemClock {
  fn now(&self) -> f64 {
    self.origin.elapsed().as_secs_f64()
  }
}

/// A clock that only moves when told to. Clones share the same time, so the
/// frame driver and the surface controller can hold one each.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
  seconds: Rc<Cell<f64>>,
}

impl ManualClock {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn advance(&self, seconds: f64) {
    self.seconds.set(self.seconds.get() + seconds);
  }

  pub fn set(&self, seconds: f64) {
    self.seconds.set(seconds);
  }
}

impl Clock for ManualClock {
  fn now(&self) -> f64 {
    self.seconds.get()
  }
}
