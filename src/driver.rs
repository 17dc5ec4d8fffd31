use std::time::{Duration, Instant};

use tracing::trace;

use crate::clock::{Clock, ManualClock, SystemClock};
use crate::persistence::Persistence;
use crate::render::Renderer;
use crate::surface::{SurfaceController, TransitionState};

/// Stand-in for a display's frame callback: calls
/// [`SurfaceController::tick`] once per frame.
pub trait Driver {
  type Clock: Clock;

  /// Drive one frame. Returns whether the surface was redrawn.
  fn frame<R: Renderer, P: Persistence>(
    &mut self,
    surface: &mut SurfaceController<R, P, Self::Clock>,
  ) -> bool;

  fn run<R: Renderer, P: Persistence>(
    &mut self,
    surface: &mut SurfaceController<R, P, Self::Clock>,
    frames: u64,
  ) -> RunSummary {
    let mut summary = RunSummary::default();
    for _ in 0..frames {
      summary.frames += 1;
      if self.frame(surface) {
        summary.redraws += 1;
      }
    }
    summary
  }

  /// Tick until the controller stops animating, up to `max_frames`.
  /// A time-parametric surface never settles and runs the full budget.
  fn run_until_idle<R: Renderer, P: Persistence>(
    &mut self,
    surface: &mut SurfaceController<R, P, Self::Clock>,
    max_frames: u64,
  ) -> RunSummary {
    let mut summary = RunSummary::default();
    while summary.frames < max_frames
      && surface.state() != TransitionState::Idle
    {
      summary.frames += 1;
      if self.frame(surface) {
        summary.redraws += 1;
      }
    }
    summary
  }
}

/// What a run of frames did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
  pub frames: u64,
  pub redraws: u64,
}

/// Fixed-rate driver that advances a shared [`ManualClock`] by one frame
/// period before each tick.
#[derive(Debug, Clone)]
pub struct FrameDriver {
  clock: ManualClock,
  frame_period: f64,
  frames: u64,
}

impl FrameDriver {
  pub fn new(clock: ManualClock, fps: u32) -> Self {
    FrameDriver {
      clock,
      frame_period: 1.0 / fps.max(1) as f64,
      frames: 0,
    }
  }

  pub fn clock(&self) -> &ManualClock {
    &self.clock
  }

  /// Total frames driven so far.
  pub fn frames(&self) -> u64 {
    self.frames
  }
}

impl Driver for FrameDriver {
  type Clock = ManualClock;

  fn frame<R: Renderer, P: Persistence>(
    &mut self,
    surface: &mut SurfaceController<R, P, ManualClock>,
  ) -> bool {
    self.clock.advance(self.frame_period);
    self.frames += 1;
    let redrawn = surface.tick();
    trace!(frame = self.frames, redrawn, "frame");
    redrawn
  }
}

/// Paces frames against the wall clock, sleeping out whatever is left of
/// each frame period after the tick.
#[derive(Debug, Clone)]
pub struct RealTimeDriver {
  frame_period: Duration,
  frames: u64,
}

impl RealTimeDriver {
  pub fn new(fps: u32) -> Self {
    RealTimeDriver {
      frame_period: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
      frames: 0,
    }
  }

  pub fn frames(&self) -> u64 {
    self.frames
  }
}

impl Driver for RealTimeDriver {
  type Clock = SystemClock;

  fn frame<R: Renderer, P: Persistence>(
    &mut self,
    surface: &mut SurfaceController<R, P, SystemClock>,
  ) -> bool {
    let started = Instant::now();
    self.frames += 1;
    let redrawn = surface.tick();
    let elapsed = started.elapsed();
    trace!(frame = self.frames, redrawn, ?elapsed, "frame");
    if let Some(rest) = self.frame_period.checked_sub(elapsed) {
      std::thread::sleep(rest);
    }
    redrawn
  }
}
