//! The very first program: a single green triangle.
//!
//! The triangle color is not part of the vertices but a uniform, set once at startup.

use crate::shared::{load_program, log_warnings};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use gltut::framebuffer::Framebuffer;
use gltut::shader::Program;
use gltut::tess::{Tess, TessBuilder};
use gltut::vertex::{VertexAttrib, VertexLayout};
use gltut::Context;

const VERTICES: [[f32; 2]; 3] = [[0., 0.5], [0.5, -0.5], [-0.5, -0.5]];

const TRIANGLE_COLOR: [f32; 3] = [0., 1., 0.];

/// Local demo.
pub struct LocalDemo {
  program: Program,
  triangle: Tess<[f32; 2]>,
}

impl Demo for LocalDemo {
  fn bootstrap(
    platform: &mut impl PlatformServices,
    ctx: &mut Context,
  ) -> Result<Self, DemoError> {
    let program = load_program(platform, ctx, "triangle.vert", None, "triangle.frag")?;

    let layout = VertexLayout::interleaved([VertexAttrib::float("position", 2)]);
    let (triangle, warnings) = TessBuilder::new(&VERTICES, &layout).build(ctx, &program)?;
    log_warnings(warnings);

    let color = program.uniform_or_unbound("triangle_color");
    program.set(&color, TRIANGLE_COLOR);

    Ok(LocalDemo { program, triangle })
  }

  fn render_frame(
    &mut self,
    _: f32,
    back_buffer: &Framebuffer,
    actions: impl Iterator<Item = InputAction>,
    ctx: &mut Context,
  ) -> Result<LoopFeedback, DemoError> {
    for action in actions {
      if action == InputAction::Quit {
        return Ok(LoopFeedback::Exit);
      }
    }

    back_buffer.bind();
    ctx.clear([0., 0., 0., 1.], false);

    self.program.use_program();
    self.triangle.render();

    Ok(LoopFeedback::Continue)
  }
}
