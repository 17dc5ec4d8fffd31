use std::fmt::Write;

use super::{Renderer, SurfaceFrame, normalize, vertex_normals};

const DEFAULT_SIZE: u32 = 480;
const BACKGROUND: &str = "#1b1d1e";
const HELPER_COLOR: &str = "#5e3fbe";
const SURFACE_COLOR: (u8, u8, u8) = (0xff, 0x59, 0x95);
const LOW_COLOR: (u8, u8, u8) = (0x5e, 0x3f, 0xbe);
/// Half-length of each crosshair arm, in plot units.
const AXIS_HALF_LENGTH: f64 = 0.5;

/// Orthographic camera on a sphere around the origin, z up.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
  pub azimuth: f64,
  pub elevation: f64,
}

impl Default for Camera {
  fn default() -> Self {
    // Looking at the origin from (0, -1.5, 1.5)
    Camera {
      azimuth: -std::f64::consts::FRAC_PI_2,
      elevation: std::f64::consts::FRAC_PI_4,
    }
  }
}

impl Camera {
  /// Orthographic projection to (screen_x, screen_y).
  pub fn project(&self, p: [f64; 3]) -> (f64, f64) {
    let (sa, ca) = self.azimuth.sin_cos();
    let (se, ce) = self.elevation.sin_cos();
    // Right vector: (-sin(a), cos(a), 0)
    let screen_x = -p[0] * sa + p[1] * ca;
    // Up vector: (-cos(a)*sin(e), -sin(a)*sin(e), cos(e))
    let screen_y = -p[0] * ca * se - p[1] * sa * se + p[2] * ce;
    (screen_x, screen_y)
  }

  /// Depth along the viewing direction. Larger is further away.
  pub fn depth(&self, p: [f64; 3]) -> f64 {
    let (sa, ca) = self.azimuth.sin_cos();
    let (se, ce) = self.elevation.sin_cos();
    -(p[0] * ce * ca + p[1] * ce * sa + p[2] * se)
  }
}

/// How a triangle gets its colour before lighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
  /// The surface colour everywhere.
  Flat,
  /// Blend from the helper colour at the bottom of the cube to the surface
  /// colour at the top.
  #[default]
  Height,
}

/// Height-based colour for a plot-space height in `[-0.5, 0.5]`.
fn height_color(z: f64) -> (u8, u8, u8) {
  let t = (z + 0.5).clamp(0.0, 1.0);
  let mix =
    |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
  (
    mix(LOW_COLOR.0, SURFACE_COLOR.0),
    mix(LOW_COLOR.1, SURFACE_COLOR.1),
    mix(LOW_COLOR.2, SURFACE_COLOR.2),
  )
}

struct Triangle {
  projected: [(f64, f64); 3],
  depth: f64,
  color: (u8, u8, u8),
}

/// Diffuse + ambient lighting from a light at the camera.
fn apply_lighting(
  color: (u8, u8, u8),
  normal: [f64; 3],
  camera: &Camera,
) -> (u8, u8, u8) {
  let (sa, ca) = camera.azimuth.sin_cos();
  let (se, ce) = camera.elevation.sin_cos();
  let light = normalize([ce * ca, ce * sa, se]);

  let dot = normal[0] * light[0] + normal[1] * light[1] + normal[2] * light[2];
  let diffuse = dot.abs(); // both sides are lit

  let ambient = 0.35;
  let intensity = (ambient + (1.0 - ambient) * diffuse).clamp(0.0, 1.0);

  let r = (color.0 as f64 * intensity).round() as u8;
  let g = (color.1 as f64 * intensity).round() as u8;
  let b = (color.2 as f64 * intensity).round() as u8;
  (r, g, b)
}

/// The 8 corners of the plot cube `[-0.5, 0.5]³`.
fn cube_corners() -> [[f64; 3]; 8] {
  let mut corners = [[0.0; 3]; 8];
  for (i, corner) in corners.iter_mut().enumerate() {
    for (axis, c) in corner.iter_mut().enumerate() {
      *c = if i & (1 << axis) == 0 { -0.5 } else { 0.5 };
    }
  }
  corners
}

/// Renders each frame to an SVG document, painter's-algorithm style.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
  pub camera: Camera,
  pub width: u32,
  pub height: u32,
  pub shading: Shading,
  helpers_visible: bool,
  frames: usize,
  last: Option<String>,
}

impl Default for SvgRenderer {
  fn default() -> Self {
    Self::new(DEFAULT_SIZE, DEFAULT_SIZE)
  }
}

impl SvgRenderer {
  pub fn new(width: u32, height: u32) -> Self {
    SvgRenderer {
      camera: Camera::default(),
      width,
      height,
      shading: Shading::default(),
      helpers_visible: true,
      frames: 0,
      last: None,
    }
  }

  /// Number of frames drawn so far.
  pub fn frames(&self) -> usize {
    self.frames
  }

  /// The most recently drawn frame.
  pub fn last_svg(&self) -> Option<&str> {
    self.last.as_deref()
  }

  pub fn helpers_visible(&self) -> bool {
    self.helpers_visible
  }

  pub fn render(&self, frame: &SurfaceFrame<'_>) -> String {
    let camera = &self.camera;
    let normals = vertex_normals(frame);

    let mut triangles: Vec<Triangle> = frame
      .grid
      .triangles()
      .filter_map(|[a, b, c]| {
        let v = [frame.vertex(a), frame.vertex(b), frame.vertex(c)];
        if v.iter().flatten().any(|coord| !coord.is_finite()) {
          return None;
        }
        let n = normalize([
          normals[a][0] + normals[b][0] + normals[c][0],
          normals[a][1] + normals[b][1] + normals[c][1],
          normals[a][2] + normals[b][2] + normals[c][2],
        ]);
        let center = [
          (v[0][0] + v[1][0] + v[2][0]) / 3.0,
          (v[0][1] + v[1][1] + v[2][1]) / 3.0,
          (v[0][2] + v[1][2] + v[2][2]) / 3.0,
        ];
        let base = match self.shading {
          Shading::Flat => SURFACE_COLOR,
          Shading::Height => height_color(center[2]),
        };
        Some(Triangle {
          projected: v.map(|p| camera.project(p)),
          depth: camera.depth(center),
          color: apply_lighting(base, n, camera),
        })
      })
      .collect();

    // Painter's algorithm: sort back-to-front (largest depth first)
    triangles.sort_by(|a, b| {
      b.depth
        .partial_cmp(&a.depth)
        .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Fit the plot cube, not the surface, so frames share one framing
    let mut px_min = f64::INFINITY;
    let mut px_max = f64::NEG_INFINITY;
    let mut py_min = f64::INFINITY;
    let mut py_max = f64::NEG_INFINITY;
    for corner in cube_corners() {
      let (px, py) = camera.project(corner);
      px_min = px_min.min(px);
      px_max = px_max.max(px);
      py_min = py_min.min(py);
      py_max = py_max.max(py);
    }

    let margin = 20.0;
    let draw_w = self.width as f64 - 2.0 * margin;
    let draw_h = self.height as f64 - 2.0 * margin;
    let scale = (draw_w / (px_max - px_min)).min(draw_h / (py_max - py_min));
    let cx = margin + draw_w / 2.0;
    let cy = margin + draw_h / 2.0;
    let p_cx = (px_min + px_max) / 2.0;
    let p_cy = (py_min + py_max) / 2.0;

    let to_screen = |(px, py): (f64, f64)| -> (f64, f64) {
      (cx + (px - p_cx) * scale, cy - (py - p_cy) * scale) // flip Y for SVG
    };
    let to_svg = |p: [f64; 3]| to_screen(camera.project(p));

    let mut svg = String::with_capacity(triangles.len() * 100 + 2000);
    let _ = writeln!(
      svg,
      "<svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" xmlns=\"http://www.w3.org/2000/svg\">",
      w = self.width,
      h = self.height
    );
    let _ = writeln!(
      svg,
      "<rect width=\"{}\" height=\"{}\" fill=\"{BACKGROUND}\"/>",
      self.width, self.height
    );

    if self.helpers_visible {
      let corners = cube_corners();
      for (i, &a) in corners.iter().enumerate() {
        for axis in 0..3 {
          // each edge once, from its lower corner
          if i & (1 << axis) == 0 {
            let b = corners[i | (1 << axis)];
            push_line(&mut svg, to_svg(a), to_svg(b), 1.0);
          }
        }
      }
    }

    for tri in &triangles {
      let [(x0, y0), (x1, y1), (x2, y2)] = tri.projected.map(to_screen);
      let (r, g, b) = tri.color;
      let _ = writeln!(
        svg,
        "<polygon points=\"{x0:.1},{y0:.1} {x1:.1},{y1:.1} {x2:.1},{y2:.1}\" fill=\"rgb({r},{g},{b})\" stroke=\"none\"/>"
      );
    }

    // The crosshair is drawn last so it shows through the surface
    if self.helpers_visible {
      let [ox, oy, oz] = frame.axis_position;
      let h = AXIS_HALF_LENGTH;
      for (a, b) in [
        ([ox - h, oy, oz], [ox + h, oy, oz]),
        ([ox, oy - h, oz], [ox, oy + h, oz]),
        ([ox, oy, oz - h], [ox, oy, oz + h]),
      ] {
        push_line(&mut svg, to_svg(a), to_svg(b), 2.0);
      }
    }

    svg.push_str("</svg>");
    svg
  }
}

fn push_line(svg: &mut String, a: (f64, f64), b: (f64, f64), width: f64) {
  let _ = writeln!(
    svg,
    "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{HELPER_COLOR}\" stroke-width=\"{width}\"/>",
    a.0, a.1, b.0, b.1
  );
}

impl Renderer for SvgRenderer {
  fn refresh(&mut self, frame: &SurfaceFrame<'_>) {
    self.last = Some(self.render(frame));
    self.frames += 1;
  }

  fn set_helpers_visible(&mut self, visible: bool) {
    self.helpers_visible = visible;
  }
}
