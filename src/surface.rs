//! The surface controller: owns the grid, the Region, the height field and
//! the active function, and drives transitions once per frame.
//!
//! All mutation happens through `&mut self`, from input callbacks and from
//! [`SurfaceController::tick`], so there is no locking anywhere.

use tracing::{debug, info, trace};

use crate::PlotError;
use crate::clock::Clock;
use crate::config::PlotConfig;
use crate::evaluator::CompiledFunction;
use crate::grid::Grid;
use crate::height_field::HeightField;
use crate::loader::{Candidate, Rejection, load};
use crate::persistence::Persistence;
use crate::region::{Axis, Bound, Region};
use crate::render::{Renderer, SurfaceFrame};

/// The function currently plotted.
#[derive(Debug, Clone)]
pub struct ActiveFunction {
  pub function: CompiledFunction,
  pub time_parametric: bool,
  /// Clock reading when the function was accepted; `t` counts from here.
  pub base_time: f64,
  /// Region the targets were last computed under.
  applied_region: Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
  /// Nothing moving.
  Idle,
  /// Stepping toward fresh targets.
  Animating,
  /// Recomputed from the clock every tick.
  Continuous,
}

pub struct SurfaceController<R, P, C> {
  grid: Grid,
  region: Region,
  field: HeightField,
  steps: u32,
  active: Option<ActiveFunction>,
  dirty: bool,
  first: bool,
  displayed_text: String,
  axis_position: [f64; 3],
  renderer: R,
  persistence: P,
  clock: C,
}

impl<R: Renderer, P: Persistence, C: Clock> SurfaceController<R, P, C> {
  pub fn new(
    grid: Grid,
    region: Region,
    steps: u32,
    renderer: R,
    persistence: P,
    clock: C,
  ) -> Self {
    let field = HeightField::new(grid.len());
    let axis_position = region.origin_image();
    SurfaceController {
      grid,
      region,
      field,
      steps,
      active: None,
      dirty: false,
      first: true,
      displayed_text: String::new(),
      axis_position,
      renderer,
      persistence,
      clock,
    }
  }

  pub fn from_config(
    config: &PlotConfig,
    renderer: R,
    persistence: P,
    clock: C,
  ) -> Result<Self, PlotError> {
    config.validate()?;
    let grid = Grid::new(config.precision)?;
    Ok(Self::new(
      grid,
      config.region,
      config.steps,
      renderer,
      persistence,
      clock,
    ))
  }

  /// Offer a new expression. Returns whether it replaced the active function;
  /// every rejection leaves the surface exactly as it was.
  ///
  /// `replay` marks text that came from persisted state (or a Region edit)
  /// and must not be published again.
  pub fn input(&mut self, text: &str, replay: bool) -> bool {
    self.displayed_text = text.to_string();
    match self.try_accept(text) {
      Ok(candidate) => {
        self.accept(text, candidate, replay);
        true
      }
      Err(rejection) => {
        debug!(text, %rejection, "input rejected");
        false
      }
    }
  }

  fn try_accept(&self, text: &str) -> Result<Candidate, Rejection> {
    let candidate = load(text)?;
    if let Some(active) = &self.active
      && active.function.source() == candidate.function.source()
      && active.applied_region == self.region
    {
      return Err(Rejection::Redundant);
    }
    Ok(candidate)
  }

  fn accept(&mut self, text: &str, candidate: Candidate, replay: bool) {
    if !replay {
      self.persistence.publish(text);
    }
    let time_parametric = candidate.time_parametric;
    info!(
      source = candidate.function.source(),
      time_parametric, replay, "function accepted"
    );
    self.active = Some(ActiveFunction {
      function: candidate.function,
      time_parametric,
      base_time: self.clock.now(),
      applied_region: self.region,
    });
    self.apply_fun(!(self.first || time_parametric));
    self.settle();
    self.first = false;
  }

  /// Recompute every vertex from the active function at the current time.
  /// With `animate`, heights are retargeted over the configured step count;
  /// otherwise they are written directly.
  pub fn apply_fun(&mut self, animate: bool) {
    let Some(active) = self.active.as_mut() else {
      return;
    };
    let t = self.clock.now() - active.base_time;
    let steps = if animate { self.steps } else { 0 };
    for (i, &[nx, ny]) in self.grid.positions().iter().enumerate() {
      let (x, y) = self.region.domain_point(nx, ny);
      let z = active.function.eval(x, y, t);
      self.field.set_target(i, self.region.height_of(z), steps);
    }
    active.applied_region = self.region;
    self.axis_position = self.region.origin_image();
    trace!(t, animate, "surface recomputed");
  }

  /// One frame. Steps a pending transition and, for a time-parametric
  /// function, recomputes the whole field. Returns whether anything was
  /// redrawn.
  pub fn tick(&mut self) -> bool {
    let mut changed = false;
    if self.dirty {
      changed = self.field.has_pending();
      self.dirty = self.field.step_all();
      if !self.dirty {
        debug!("transition converged");
      }
    }
    if self.is_time_parametric() {
      self.apply_fun(false);
      changed = true;
    }
    if changed {
      self.refresh();
    }
    changed
  }

  /// Hand the current heights to the renderer.
  pub fn refresh(&mut self) {
    let frame = SurfaceFrame {
      grid: &self.grid,
      heights: self.field.heights(),
      region: &self.region,
      axis_position: self.axis_position,
    };
    self.renderer.refresh(&frame);
  }

  /// Apply a Region edit and re-evaluate the displayed text under it.
  pub fn set_region_bound(&mut self, axis: Axis, bound: Bound, value: f64) {
    self.region.set_bound(axis, bound, value);
    debug!(%axis, %bound, value, "region changed");
    let text = self.displayed_text.clone();
    if !self.input(&text, true) {
      // the text box may hold a half-typed expression; keep the old function
      self.retarget();
    }
  }

  /// Recompute the active function's targets if the Region moved under it.
  fn retarget(&mut self) {
    let Some(active) = &self.active else {
      return;
    };
    if active.applied_region == self.region {
      return;
    }
    let animate = !active.time_parametric;
    self.apply_fun(animate);
    self.settle();
  }

  /// Record whether a transition is running after `apply_fun`. Heights that
  /// were written directly (snapshots, or `steps == 0`) are drawn right away
  /// since no tick will report them.
  fn settle(&mut self) {
    self.dirty = self.field.has_pending();
    if !self.dirty {
      self.refresh();
    }
  }

  pub fn set_helpers_visible(&mut self, visible: bool) {
    self.renderer.set_helpers_visible(visible);
    self.refresh();
  }

  /// Persistence reported `text` as the current state. Replays it unless it
  /// is what is already displayed.
  pub fn restore(&mut self, text: &str) -> bool {
    if text == self.displayed_text {
      return false;
    }
    self.input(text, true)
  }

  pub fn state(&self) -> TransitionState {
    if self.is_time_parametric() {
      TransitionState::Continuous
    } else if self.dirty {
      TransitionState::Animating
    } else {
      TransitionState::Idle
    }
  }

  fn is_time_parametric(&self) -> bool {
    self.active.as_ref().is_some_and(|a| a.time_parametric)
  }

  pub fn is_dirty(&self) -> bool {
    self.dirty
  }

  pub fn active(&self) -> Option<&ActiveFunction> {
    self.active.as_ref()
  }

  pub fn grid(&self) -> &Grid {
    &self.grid
  }

  pub fn region(&self) -> &Region {
    &self.region
  }

  pub fn field(&self) -> &HeightField {
    &self.field
  }

  pub fn heights(&self) -> &[f64] {
    self.field.heights()
  }

  pub fn steps(&self) -> u32 {
    self.steps
  }

  pub fn axis_position(&self) -> [f64; 3] {
    self.axis_position
  }

  /// Text most recently offered through [`Self::input`].
  pub fn displayed_text(&self) -> &str {
    &self.displayed_text
  }

  pub fn renderer(&self) -> &R {
    &self.renderer
  }

  pub fn renderer_mut(&mut self) -> &mut R {
    &mut self.renderer
  }

  pub fn persistence(&self) -> &P {
    &self.persistence
  }

  pub fn persistence_mut(&mut self) -> &mut P {
    &mut self.persistence
  }

  pub fn clock(&self) -> &C {
    &self.clock
  }
}
