use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use graphit::clock::{Clock, ManualClock, SystemClock};
use graphit::config::PlotConfig;
use graphit::driver::{Driver, FrameDriver, RealTimeDriver};
use graphit::loader::load;
use graphit::persistence::{HashHistory, decode_hash, encode_hash};
use graphit::region::parse_field_name;
use graphit::render::{Shading, SvgRenderer};
use graphit::{SurfaceController, compile};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Log state transitions and rejected inputs
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Evaluate an expression at a single point
  Eval {
    expression: String,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    x: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    y: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    t: f64,
  },
  /// Report whether an expression is accepted, and if so whether it
  /// depends on time
  Classify { expression: String },
  /// Drive the surface for a number of frames and write the result
  Render {
    /// Expression to plot; falls back to --hash, then the configured one
    expression: Option<String>,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Restore the expression from a share hash
    #[arg(long)]
    hash: Option<String>,
    /// Region edits applied after the first frame, e.g. xmin=-3
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    bounds: Vec<String>,
    #[arg(long, default_value_t = 30)]
    frames: u64,
    #[arg(long)]
    precision: Option<usize>,
    #[arg(long)]
    steps: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Hide the bounding box and axis crosshair
    #[arg(long)]
    no_helpers: bool,
    /// Paint the surface one colour instead of shading it by height
    #[arg(long)]
    flat: bool,
    /// Pace frames against the wall clock instead of simulated time
    #[arg(long)]
    realtime: bool,
    /// Write the last frame as SVG
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Write the final height buffer as JSON
    #[arg(long)]
    json: Option<PathBuf>,
  },
  /// Encode an expression as a share hash, or decode one
  Share {
    text: String,
    #[arg(long)]
    decode: bool,
  },
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "graphit=debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

struct RenderOutput {
  text: String,
  replay: bool,
  bounds: Vec<String>,
  frames: u64,
  no_helpers: bool,
  svg: Option<PathBuf>,
  json: Option<PathBuf>,
}

fn render<C: Clock, D: Driver<Clock = C>>(
  mut surface: SurfaceController<SvgRenderer, HashHistory, C>,
  mut driver: D,
  output: RenderOutput,
) -> Result<()> {
  let text = &output.text;
  if output.no_helpers {
    surface.set_helpers_visible(false);
  }
  if !surface.input(text, output.replay) {
    bail!("expression {text:?} was rejected");
  }
  driver.frame(&mut surface);
  for edit in &output.bounds {
    let (field, value) = edit
      .split_once('=')
      .with_context(|| format!("expected FIELD=VALUE, got {edit:?}"))?;
    let (axis, bound) = parse_field_name(field.trim())?;
    let value: f64 = value
      .trim()
      .parse()
      .with_context(|| format!("invalid bound value in {edit:?}"))?;
    surface.set_region_bound(axis, bound, value);
  }
  let summary = driver.run(&mut surface, output.frames.saturating_sub(1));

  eprintln!(
    "{} frames, {} redraws, state {:?}",
    summary.frames + 1,
    summary.redraws,
    surface.state()
  );
  if let Some(hash) = surface.persistence().current() {
    eprintln!("share: {hash}");
  }
  if let Some(path) = output.svg {
    // make sure the final heights are on screen
    surface.refresh();
    let document = surface
      .renderer()
      .last_svg()
      .context("nothing was rendered")?;
    std::fs::write(&path, document)
      .with_context(|| format!("cannot write {}", path.display()))?;
  }
  if let Some(path) = output.json {
    let document = serde_json::json!({
      "expression": surface.displayed_text(),
      "precision": surface.grid().precision(),
      "region": surface.region(),
      "heights": surface.heights(),
    });
    std::fs::write(&path, serde_json::to_string_pretty(&document)?)
      .with_context(|| format!("cannot write {}", path.display()))?;
  }
  Ok(())
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match cli.command {
    Commands::Eval { expression, x, y, t } => {
      let function = compile(&expression)
        .with_context(|| format!("cannot compile {expression:?}"))?;
      println!("{}", function.eval(x, y, t));
    }
    Commands::Classify { expression } => match load(&expression) {
      Ok(candidate) if candidate.time_parametric => {
        println!("time-parametric")
      }
      Ok(_) => println!("static"),
      Err(rejection) => println!("rejected: {rejection}"),
    },
    Commands::Render {
      expression,
      config,
      hash,
      bounds,
      frames,
      precision,
      steps,
      seed,
      no_helpers,
      svg,
      json,
      flat,
      realtime,
    } => {
      let mut config = match config {
        Some(path) => PlotConfig::load(&path)
          .with_context(|| format!("cannot load {}", path.display()))?,
        None => PlotConfig::default(),
      };
      if let Some(precision) = precision {
        config.precision = precision;
      }
      if let Some(steps) = steps {
        config.steps = steps;
      }
      if seed.is_some() {
        config.seed = seed;
      }
      if let Some(seed) = config.seed {
        graphit::seed_rng(seed);
      }

      let restored = hash.as_deref().map(decode_hash).transpose()?;
      let replay = expression.is_none();
      let text = expression
        .or(restored)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| config.expression.clone());

      let mut renderer = SvgRenderer::default();
      if flat {
        renderer.shading = Shading::Flat;
      }
      let output = RenderOutput {
        text,
        replay,
        bounds,
        frames,
        no_helpers,
        svg,
        json,
      };
      if realtime {
        let surface = SurfaceController::from_config(
          &config,
          renderer,
          HashHistory::new(),
          SystemClock::new(),
        )?;
        render(surface, RealTimeDriver::new(config.fps), output)?;
      } else {
        let clock = ManualClock::new();
        let surface = SurfaceController::from_config(
          &config,
          renderer,
          HashHistory::new(),
          clock.clone(),
        )?;
        render(surface, FrameDriver::new(clock, config.fps), output)?;
      }
    }
    Commands::Share { text, decode } => {
      if decode {
        println!("{}", decode_hash(&text)?);
      } else {
        println!("{}", encode_hash(&text));
      }
    }
  }

  Ok(())
}
