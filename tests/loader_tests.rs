use graphit::loader::{Probe, Rejection, load, load_with_probe};
use graphit::{seed_rng, unseed_rng};

mod classification {
  use super::*;

  #[test]
  fn sum_of_coordinates_is_static() {
    for _ in 0..20 {
      assert!(!load("x + y").unwrap().time_parametric);
    }
  }

  #[test]
  fn adding_time_makes_it_time_parametric() {
    for _ in 0..20 {
      assert!(load("x + y + t").unwrap().time_parametric);
    }
  }

  #[test]
  fn random_calls_look_time_parametric() {
    assert!(load("random()").unwrap().time_parametric);
  }

  #[test]
  fn symmetric_blind_spot_is_kept() {
    // |t - 0.5| agrees at 0.25 and 0.75, so the dependence on t goes unseen
    let probe = Probe {
      x: 0.5,
      y: 0.5,
      t1: 0.25,
      t2: 0.75,
    };
    let candidate = load_with_probe("abs(t - 0.5)", probe).unwrap();
    assert!(!candidate.time_parametric);
  }

  #[test]
  fn seeded_probes_are_reproducible() {
    seed_rng(7);
    let first = Probe::random();
    seed_rng(7);
    let second = Probe::random();
    unseed_rng();
    assert_eq!(first, second);
    for v in [first.x, first.y, first.t1, first.t2] {
      assert!((0.0..1.0).contains(&v));
    }
  }
}

mod rejection {
  use super::*;

  #[test]
  fn empty_and_blank() {
    assert!(matches!(load(""), Err(Rejection::Empty)));
    assert!(matches!(load(" \t\n"), Err(Rejection::Empty)));
  }

  #[test]
  fn partial_keystrokes() {
    for text in ["c", "co", "cos", "cos(", "cos(x", "cos(x) *", "cos(x) * s"] {
      assert!(
        matches!(load(text), Err(Rejection::ParseFailure(_))),
        "{text:?} should be a parse failure"
      );
    }
  }

  #[test]
  fn unknown_names_and_wrong_arity() {
    assert!(matches!(load("foo(x)"), Err(Rejection::ParseFailure(_))));
    assert!(matches!(load("z + 1"), Err(Rejection::ParseFailure(_))));
    assert!(matches!(load("atan2(x)"), Err(Rejection::ParseFailure(_))));
  }

  #[test]
  fn non_numeric_results() {
    assert!(matches!(load("0 / 0"), Err(Rejection::NonNumericResult(_))));
    assert!(matches!(load("1 / 0"), Err(Rejection::NonNumericResult(_))));
    assert!(matches!(load("log(-1)"), Err(Rejection::NonNumericResult(_))));
  }

  #[test]
  fn complete_expression_is_accepted() {
    let candidate = load("cos(x) * sin(y)").unwrap();
    assert_eq!(candidate.function.source(), "cos(x) * sin(y)");
    assert!(!candidate.time_parametric);
  }
}
