//! Geometry shader: four colored points, each expanded into a polygon outline.
//!
//! Press the main toggle to cycle through the number of sides.

use crate::shared::{load_program, log_warnings, ColorVertex};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use gltut::framebuffer::Framebuffer;
use gltut::shader::{Program, Uniform};
use gltut::tess::{Mode, Tess, TessBuilder};
use gltut::Context;

const POINTS: [ColorVertex; 4] = [
  ColorVertex::new([-0.45, 0.45], [1., 0., 0.]),
  ColorVertex::new([0.45, 0.45], [0., 1., 0.]),
  ColorVertex::new([0.45, -0.45], [0., 0., 1.]),
  ColorVertex::new([-0.45, -0.45], [1., 1., 0.]),
];

/// Side counts cycled through; the geometry shader emits at most 64 sides.
const SIDES: [i32; 7] = [3, 4, 5, 6, 8, 12, 64];

const RADIUS: f32 = 0.3;

/// Local demo.
pub struct LocalDemo {
  program: Program,
  sides: Uniform<i32>,
  aspect: Uniform<f32>,
  points: Tess<ColorVertex>,
  sides_index: usize,
}

impl Demo for LocalDemo {
  fn bootstrap(
    platform: &mut impl PlatformServices,
    ctx: &mut Context,
  ) -> Result<Self, DemoError> {
    let program = load_program(
      platform,
      ctx,
      "geometry.vert",
      Some("geometry.geom"),
      "geometry.frag",
    )?;

    let layout = ColorVertex::layout();
    let (points, warnings) = TessBuilder::new(&POINTS, &layout)
      .set_mode(Mode::Point)
      .build(ctx, &program)?;
    log_warnings(warnings);

    program.set(&program.uniform_or_unbound("radius"), RADIUS);
    let sides = program.uniform_or_unbound("sides");
    let aspect = program.uniform_or_unbound("aspect");

    Ok(LocalDemo {
      program,
      sides,
      aspect,
      points,
      sides_index: 0,
    })
  }

  fn render_frame(
    &mut self,
    _: f32,
    back_buffer: &Framebuffer,
    actions: impl Iterator<Item = InputAction>,
    ctx: &mut Context,
  ) -> Result<LoopFeedback, DemoError> {
    for action in actions {
      match action {
        InputAction::Quit => return Ok(LoopFeedback::Exit),

        InputAction::MainToggle => {
          self.sides_index = (self.sides_index + 1) % SIDES.len();
          log::info!("polygons now have {} sides", SIDES[self.sides_index]);
        }

        _ => (),
      }
    }

    back_buffer.bind();
    ctx.clear([0., 0., 0., 1.], false);

    let [w, h] = back_buffer.size();
    self.program.set(&self.sides, SIDES[self.sides_index]);
    self.program.set(&self.aspect, w.max(1) as f32 / h.max(1) as f32);
    self.points.render();

    Ok(LoopFeedback::Continue)
  }
}
