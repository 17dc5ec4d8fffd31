use graphit::clock::ManualClock;
use graphit::driver::{Driver, FrameDriver};
use graphit::grid::Grid;
use graphit::persistence::{HashHistory, encode_hash};
use graphit::region::{Axis, Bound, Interval, Region};
use graphit::render::NullRenderer;
use graphit::{SurfaceController, TransitionState, compile};

type Surface = SurfaceController<NullRenderer, HashHistory, ManualClock>;

fn unit_region() -> Region {
  Region {
    x: Interval::new(-1.0, 1.0),
    y: Interval::new(-1.0, 1.0),
    z: Interval::new(-1.0, 1.0),
  }
}

fn surface(precision: usize, steps: u32) -> (Surface, ManualClock) {
  let clock = ManualClock::new();
  let surface = SurfaceController::new(
    Grid::new(precision).unwrap(),
    unit_region(),
    steps,
    NullRenderer::default(),
    HashHistory::new(),
    clock.clone(),
  );
  (surface, clock)
}

/// Heights the surface should settle on for a static expression.
fn expected_heights(surface: &Surface, text: &str) -> Vec<f64> {
  let f = compile(text).unwrap();
  let region = surface.region();
  surface
    .grid()
    .positions()
    .iter()
    .map(|&[nx, ny]| {
      let (x, y) = region.domain_point(nx, ny);
      region.height_of(f.eval(x, y, 0.0))
    })
    .collect()
}

mod scenario {
  use super::*;

  #[test]
  fn identity_in_x_on_four_by_four_grid() {
    let (mut surface, _) = surface(4, 10);
    assert!(surface.input("x", true));
    let grid = surface.grid().clone();
    for row in 0..4 {
      let i = grid.index(row, 3);
      assert_eq!(grid.position(i)[0], 0.5);
      assert_eq!(surface.heights()[i], 0.5);
      assert_eq!(surface.heights()[grid.index(row, 0)], -0.5);
    }
  }

  #[test]
  fn first_function_is_drawn_without_animation() {
    let (mut surface, _) = surface(4, 10);
    surface.input("x * y", true);
    assert_eq!(surface.heights(), expected_heights(&surface, "x * y"));
    assert_eq!(surface.renderer().refreshes, 1);
    assert!(!surface.field().has_pending());
  }
}

mod transitions {
  use super::*;

  #[test]
  fn static_function_converges_to_mapped_values() {
    let (mut surface, clock) = surface(6, 10);
    surface.input("x", true);
    assert!(surface.input("cos(x) * sin(y)", false));
    assert_eq!(surface.state(), TransitionState::Animating);

    let mut driver = FrameDriver::new(clock, 60);
    driver.run_until_idle(&mut surface, 100);
    assert_eq!(surface.state(), TransitionState::Idle);

    let expected = expected_heights(&surface, "cos(x) * sin(y)");
    for (got, want) in surface.heights().iter().zip(&expected) {
      assert!((got - want).abs() < 1e-12, "{got} != {want}");
    }
  }

  #[test]
  fn transition_takes_exactly_the_step_count() {
    let (mut surface, _) = surface(5, 4);
    surface.input("0", true);
    surface.input("x + y", false);
    let expected = expected_heights(&surface, "x + y");

    for _ in 0..3 {
      assert!(surface.tick());
      assert_eq!(surface.state(), TransitionState::Animating);
    }
    assert!(surface.tick());
    assert_eq!(surface.state(), TransitionState::Idle);
    assert_eq!(surface.heights(), expected);
  }

  #[test]
  fn ticking_a_converged_surface_changes_nothing() {
    let (mut surface, _) = surface(4, 3);
    surface.input("x", true);
    surface.input("y", false);
    for _ in 0..3 {
      surface.tick();
    }
    let settled = surface.heights().to_vec();
    let refreshes = surface.renderer().refreshes;
    for _ in 0..5 {
      assert!(!surface.tick());
    }
    assert_eq!(surface.heights(), settled);
    assert_eq!(surface.renderer().refreshes, refreshes);
  }

  #[test]
  fn zero_steps_switch_instantly() {
    let (mut surface, _) = surface(4, 0);
    surface.input("x", true);
    surface.input("-x", false);
    assert_eq!(surface.heights(), expected_heights(&surface, "-x"));
  }

  #[test]
  fn zero_steps_draw_every_direct_write() {
    let (mut surface, _) = surface(4, 0);
    surface.input("x", true);
    assert_eq!(surface.renderer().refreshes, 1);

    surface.input("-x", false);
    assert_eq!(surface.renderer().refreshes, 2);
    assert_eq!(surface.state(), TransitionState::Idle);
    for _ in 0..5 {
      assert!(!surface.tick());
    }
    assert_eq!(surface.renderer().refreshes, 2);

    surface.set_region_bound(Axis::X, Bound::Max, 3.0);
    assert_eq!(surface.renderer().refreshes, 3);
    assert_eq!(surface.heights(), expected_heights(&surface, "-x"));

    // half-typed text falls back to retargeting the active function
    surface.input("-x +", false);
    surface.set_region_bound(Axis::Y, Bound::Min, -2.0);
    assert_eq!(surface.renderer().refreshes, 4);
    assert_eq!(surface.active().unwrap().function.source(), "-x");
  }

  #[test]
  fn new_target_supersedes_a_running_transition() {
    let (mut surface, _) = surface(4, 10);
    surface.input("0", true);
    surface.input("x", false);
    surface.tick();
    surface.tick();
    surface.input("y", false);
    for _ in 0..10 {
      surface.tick();
    }
    assert_eq!(surface.state(), TransitionState::Idle);
    assert_eq!(surface.heights(), expected_heights(&surface, "y"));
  }
}

mod time_parametric {
  use super::*;

  #[test]
  fn recomputes_every_tick_from_the_clock() {
    let (mut surface, clock) = surface(4, 10);
    clock.set(5.0);
    assert!(surface.input("t", true));
    assert_eq!(surface.state(), TransitionState::Continuous);
    // t counts from acceptance
    assert!(surface.heights().iter().all(|&h| h == 0.0));

    clock.advance(0.5);
    assert!(surface.tick());
    assert!(surface.heights().iter().all(|&h| h == 0.25));

    clock.advance(0.5);
    assert!(surface.tick());
    assert!(surface.heights().iter().all(|&h| h == 0.5));
  }

  #[test]
  fn stays_continuous_until_replaced_by_a_static_function() {
    let (mut surface, clock) = surface(4, 5);
    surface.input("sin(x + t)", true);
    let mut driver = FrameDriver::new(clock, 30);
    let summary = driver.run(&mut surface, 50);
    assert_eq!(summary.redraws, 50);
    assert_eq!(surface.state(), TransitionState::Continuous);

    surface.input("x", false);
    assert_eq!(surface.state(), TransitionState::Animating);
    driver.run_until_idle(&mut surface, 20);
    assert_eq!(surface.state(), TransitionState::Idle);
    assert_eq!(surface.heights(), expected_heights(&surface, "x"));
  }
}

mod rejected_input {
  use super::*;

  fn snapshot(surface: &Surface) -> (Option<String>, Region, Vec<f64>) {
    (
      surface.active().map(|a| a.function.source().to_string()),
      *surface.region(),
      surface.heights().to_vec(),
    )
  }

  #[test]
  fn empty_string_changes_nothing() {
    let (mut surface, _) = surface(4, 10);
    surface.input("x", true);
    surface.input("y", false);
    surface.tick();
    let before = snapshot(&surface);
    let field = surface.field().clone();

    assert!(!surface.input("", false));
    assert_eq!(snapshot(&surface), before);
    assert_eq!(surface.field(), &field);
    assert_eq!(surface.persistence().len(), 1);
  }

  #[test]
  fn unbalanced_syntax_changes_nothing() {
    let (mut surface, _) = surface(4, 10);
    surface.input("x", true);
    let before = snapshot(&surface);
    for text in ["(x", "x)", "sin(", "x +", "1 / 0"] {
      assert!(!surface.input(text, false));
      assert_eq!(snapshot(&surface), before);
    }
    assert_eq!(surface.state(), TransitionState::Idle);
  }

  #[test]
  fn retyping_the_same_text_is_redundant() {
    let (mut surface, _) = surface(4, 10);
    assert!(surface.input("x + y", false));
    let refreshes = surface.renderer().refreshes;
    assert!(!surface.input("  x + y ", false));
    assert_eq!(surface.persistence().len(), 1);
    assert_eq!(surface.renderer().refreshes, refreshes);
  }
}

mod region {
  use super::*;

  #[test]
  fn bound_edit_recomputes_the_same_expression() {
    let (mut surface, _) = surface(4, 10);
    surface.input("x", true);
    surface.set_region_bound(Axis::X, Bound::Max, 3.0);
    assert_eq!(surface.state(), TransitionState::Animating);

    for _ in 0..10 {
      surface.tick();
    }
    let grid = surface.grid().clone();
    // domain x = 3 on the right edge, mapped through z: [-1, 1]
    assert_eq!(surface.heights()[grid.index(0, 3)], 1.5);
    assert_eq!(surface.heights(), expected_heights(&surface, "x"));
  }

  #[test]
  fn bound_edit_is_not_published() {
    let (mut surface, _) = surface(4, 10);
    surface.input("x", false);
    surface.set_region_bound(Axis::Y, Bound::Min, -2.0);
    assert_eq!(surface.persistence().len(), 1);
  }

  #[test]
  fn bound_edit_with_half_typed_text_keeps_old_function() {
    let (mut surface, _) = surface(4, 10);
    surface.input("x", true);
    surface.input("x +", false);
    surface.set_region_bound(Axis::X, Bound::Min, 0.0);
    assert_eq!(surface.state(), TransitionState::Animating);
    assert_eq!(surface.active().unwrap().function.source(), "x");
    for _ in 0..10 {
      surface.tick();
    }
    assert_eq!(surface.heights(), expected_heights(&surface, "x"));
  }

  #[test]
  fn axis_follows_the_domain_origin() {
    let (mut surface, _) = surface(4, 10);
    surface.input("x", true);
    assert_eq!(surface.axis_position(), [0.0, 0.0, 0.0]);
    surface.set_region_bound(Axis::Z, Bound::Min, 0.0);
    assert_eq!(surface.axis_position(), [0.0, 0.0, -0.5]);
  }

  #[test]
  fn degenerate_range_flattens_instead_of_dividing_by_zero() {
    let (mut surface, _) = surface(4, 1);
    surface.input("x * y", true);
    surface.set_region_bound(Axis::Z, Bound::Min, 1.0);
    surface.set_region_bound(Axis::Z, Bound::Max, 1.0);
    surface.tick();
    assert!(surface.heights().iter().all(|&h| h == 0.0));
  }
}

mod collaborators {
  use super::*;

  #[test]
  fn accepted_input_is_published_as_a_hash() {
    let (mut surface, _) = surface(4, 10);
    surface.input("x + y", false);
    let expected = encode_hash("x + y");
    assert_eq!(expected, "#eCArIHk=");
    assert_eq!(surface.persistence().current(), Some(expected.as_str()));
  }

  #[test]
  fn replayed_input_is_not_published() {
    let (mut surface, _) = surface(4, 10);
    surface.input("x", true);
    assert!(surface.persistence().is_empty());
  }

  #[test]
  fn restore_replays_only_different_text() {
    let (mut surface, _) = surface(4, 10);
    surface.input("x", false);
    assert!(!surface.restore("x"));
    assert!(surface.restore("y"));
    assert_eq!(surface.displayed_text(), "y");
    assert_eq!(surface.persistence().len(), 1);
  }

  #[test]
  fn history_back_restores_previous_expression() {
    let (mut surface, _) = surface(4, 10);
    surface.input("x", false);
    surface.input("y", false);
    let previous = surface.persistence_mut().back().unwrap();
    assert!(surface.restore(&previous));
    assert_eq!(surface.active().unwrap().function.source(), "x");
  }

  #[test]
  fn helper_toggle_is_forwarded_and_redrawn() {
    let (mut surface, _) = surface(4, 10);
    let refreshes = surface.renderer().refreshes;
    surface.set_helpers_visible(true);
    assert!(surface.renderer().helpers_visible);
    assert_eq!(surface.renderer().refreshes, refreshes + 1);
  }
}
