use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::PlotError;
use crate::grid::MAX_PRECISION;
use crate::region::Region;

pub const DEFAULT_PRECISION: usize = 100;
pub const DEFAULT_STEPS: u32 = 10;
pub const DEFAULT_FPS: u32 = 60;
pub const DEFAULT_EXPRESSION: &str = "cos(x) * sin(y)";

/// Startup settings. Every field has a default, so a JSON file only needs
/// the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
  /// Vertices per grid side.
  pub precision: usize,
  /// Frames a static transition takes; 0 disables animation.
  pub steps: u32,
  pub region: Region,
  /// Expression plotted when nothing else is restored.
  pub expression: String,
  /// Frame rate of the built-in frame driver.
  pub fps: u32,
  /// Seed for probes and `random()`; unseeded when absent.
  pub seed: Option<u64>,
}

impl Default for PlotConfig {
  fn default() -> Self {
    PlotConfig {
      precision: DEFAULT_PRECISION,
      steps: DEFAULT_STEPS,
      region: Region::default(),
      expression: DEFAULT_EXPRESSION.to_string(),
      fps: DEFAULT_FPS,
      seed: None,
    }
  }
}

impl PlotConfig {
  pub fn from_json(json: &str) -> Result<Self, PlotError> {
    let config: PlotConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, PlotError> {
    let json = std::fs::read_to_string(path)?;
    Self::from_json(&json)
  }

  pub fn validate(&self) -> Result<(), PlotError> {
    if !(2..=MAX_PRECISION).contains(&self.precision) {
      return Err(PlotError::Config(format!(
        "precision must be between 2 and {MAX_PRECISION}, got {}",
        self.precision
      )));
    }
    if self.fps == 0 {
      return Err(PlotError::Config("fps must be positive".into()));
    }
    if !self.region.is_finite() {
      return Err(PlotError::Config("region bounds must be finite".into()));
    }
    Ok(())
  }
}
