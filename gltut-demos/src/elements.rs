//! Indexed drawing: a quad made of four colored vertices and six indices.
//!
//! The colors are tinted by a brightness pulsing with time. Press the main toggle to freeze the
//! pulse.

use crate::shared::{load_program, log_warnings, ColorVertex, QUAD_INDICES};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use gltut::framebuffer::Framebuffer;
use gltut::shader::{Program, Uniform};
use gltut::tess::{Tess, TessBuilder};
use gltut::Context;

const VERTICES: [ColorVertex; 4] = [
  ColorVertex::new([-0.5, 0.5], [1., 0., 0.]),
  ColorVertex::new([0.5, 0.5], [0., 1., 0.]),
  ColorVertex::new([0.5, -0.5], [0., 0., 1.]),
  ColorVertex::new([-0.5, -0.5], [1., 1., 1.]),
];

/// Local demo.
pub struct LocalDemo {
  program: Program,
  time: Uniform<f32>,
  quad: Tess<ColorVertex>,
  frozen_at: Option<f32>,
}

impl Demo for LocalDemo {
  fn bootstrap(
    platform: &mut impl PlatformServices,
    ctx: &mut Context,
  ) -> Result<Self, DemoError> {
    let program = load_program(platform, ctx, "elements.vert", None, "elements.frag")?;
    let time = program.uniform_or_unbound("time");

    let layout = ColorVertex::layout();
    let (quad, warnings) = TessBuilder::new(&VERTICES, &layout)
      .set_indices(&QUAD_INDICES)
      .build(ctx, &program)?;
    log_warnings(warnings);

    Ok(LocalDemo {
      program,
      time,
      quad,
      frozen_at: None,
    })
  }

  fn render_frame(
    &mut self,
    t: f32,
    back_buffer: &Framebuffer,
    actions: impl Iterator<Item = InputAction>,
    ctx: &mut Context,
  ) -> Result<LoopFeedback, DemoError> {
    for action in actions {
      match action {
        InputAction::Quit => return Ok(LoopFeedback::Exit),

        InputAction::MainToggle => {
          self.frozen_at = match self.frozen_at {
            Some(_) => None,
            None => Some(t),
          };
        }

        _ => (),
      }
    }

    back_buffer.bind();
    ctx.clear([0., 0., 0., 1.], false);

    self.program.set(&self.time, self.frozen_at.unwrap_or(t));
    self.quad.render();

    Ok(LoopFeedback::Continue)
  }
}
