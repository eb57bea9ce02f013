//! Textured quad blending two textures, modulated by the vertex colors.
//!
//! Press the main toggle to swap which texture dominates.

use crate::shared::{load_program, load_texture, textured_quad, TexturedVertex};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use gltut::framebuffer::Framebuffer;
use gltut::shader::{Program, Uniform};
use gltut::tess::Tess;
use gltut::texture::{MagFilter, MinFilter, Sampler, Texture2D, Wrap};
use gltut::Context;

/// Sampler for the small pixel-art textures shipped with the demos.
pub(crate) const PIXEL_SAMPLER: Sampler = Sampler {
  wrap_s: Wrap::Repeat,
  wrap_t: Wrap::Repeat,
  min_filter: MinFilter::Nearest,
  mag_filter: MagFilter::Nearest,
};

/// Local demo.
pub struct LocalDemo {
  program: Program,
  mix_factor: Uniform<f32>,
  quad: Tess<TexturedVertex>,
  checker: Texture2D,
  stripes: Texture2D,
  stripes_dominate: bool,
}

impl Demo for LocalDemo {
  fn bootstrap(
    platform: &mut impl PlatformServices,
    ctx: &mut Context,
  ) -> Result<Self, DemoError> {
    let program = load_program(platform, ctx, "texture.vert", None, "texture.frag")?;
    let quad = textured_quad(ctx, &program)?;

    let checker = load_texture(platform, ctx, "checker.ppm", &PIXEL_SAMPLER)?;
    let stripes = load_texture(platform, ctx, "stripes.ppm", &PIXEL_SAMPLER)?;

    program.set(&program.uniform_or_unbound("tex_checker"), 0i32);
    program.set(&program.uniform_or_unbound("tex_stripes"), 1i32);
    let mix_factor = program.uniform_or_unbound("mix_factor");

    Ok(LocalDemo {
      program,
      mix_factor,
      quad,
      checker,
      stripes,
      stripes_dominate: false,
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
        InputAction::MainToggle => self.stripes_dominate = !self.stripes_dominate,
        _ => (),
      }
    }

    back_buffer.bind();
    ctx.clear([0., 0., 0., 1.], false);

    self.checker.bind(0);
    self.stripes.bind(1);

    let factor = if self.stripes_dominate { 0.8 } else { 0.2 };
    self.program.set(&self.mix_factor, factor);
    self.quad.render();

    Ok(LoopFeedback::Continue)
  }
}
