//! Offscreen rendering: the spinning quad is rendered into a framebuffer whose color texture is
//! then drawn onto the screen through a post-processing effect.
//!
//! Press the main toggle to cycle through the effects.

use crate::shared::{fullscreen_quad, load_program, load_texture, textured_quad, TexturedVertex};
use crate::texture::PIXEL_SAMPLER;
use crate::transform::{projection_matrix, view_matrix};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use cgmath::{Matrix4, Rad};
use gltut::framebuffer::Framebuffer;
use gltut::shader::{Program, Uniform};
use gltut::tess::Tess;
use gltut::texture::{Sampler, Texture2D};
use gltut::Context;

/// Post-processing effects, in cycling order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Effect {
  /// Plain copy.
  None,
  /// Color inversion.
  Invert,
  /// Luma only.
  Grayscale,
  /// 3×3 box blur.
  Blur,
  /// Sobel edge detection.
  Edges,
}

impl Effect {
  fn next(self) -> Self {
    match self {
      Effect::None => Effect::Invert,
      Effect::Invert => Effect::Grayscale,
      Effect::Grayscale => Effect::Blur,
      Effect::Blur => Effect::Edges,
      Effect::Edges => Effect::None,
    }
  }

  // Value of the `effect` uniform in post.frag.
  fn id(self) -> i32 {
    match self {
      Effect::None => 0,
      Effect::Invert => 1,
      Effect::Grayscale => 2,
      Effect::Blur => 3,
      Effect::Edges => 4,
    }
  }
}

/// Local demo.
pub struct LocalDemo {
  scene_program: Program,
  model: Uniform<Matrix4<f32>>,
  view: Uniform<Matrix4<f32>>,
  projection: Uniform<Matrix4<f32>>,
  quad: Tess<TexturedVertex>,
  texture: Texture2D,
  post_program: Program,
  effect_uniform: Uniform<i32>,
  texel_size: Uniform<[f32; 2]>,
  fullscreen: Tess<()>,
  offscreen: Option<Framebuffer>,
  effect: Effect,
}

impl Demo for LocalDemo {
  fn bootstrap(
    platform: &mut impl PlatformServices,
    ctx: &mut Context,
  ) -> Result<Self, DemoError> {
    let scene_program = load_program(platform, ctx, "transform.vert", None, "texture.frag")?;
    let quad = textured_quad(ctx, &scene_program)?;
    let texture = load_texture(platform, ctx, "checker.ppm", &PIXEL_SAMPLER)?;

    scene_program.set(&scene_program.uniform_or_unbound("tex_checker"), 0i32);
    scene_program.set(&scene_program.uniform_or_unbound("tex_stripes"), 0i32);
    scene_program.set(&scene_program.uniform_or_unbound("mix_factor"), 0f32);
    let model = scene_program.uniform_or_unbound("model");
    let view = scene_program.uniform_or_unbound("view");
    let projection = scene_program.uniform_or_unbound("projection");

    let post_program = load_program(platform, ctx, "fullscreen.vert", None, "post.frag")?;
    let fullscreen = fullscreen_quad(ctx, &post_program)?;

    post_program.set(&post_program.uniform_or_unbound("source"), 0i32);
    let effect_uniform = post_program.uniform_or_unbound("effect");
    let texel_size = post_program.uniform_or_unbound("texel_size");

    Ok(LocalDemo {
      scene_program,
      model,
      view,
      projection,
      quad,
      texture,
      post_program,
      effect_uniform,
      texel_size,
      fullscreen,
      offscreen: None,
      effect: Effect::None,
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
          self.effect = self.effect.next();
          log::info!("post effect: {:?}", self.effect);
        }

        _ => (),
      }
    }

    let size = back_buffer.size();

    if self.offscreen.as_ref().map_or(true, |fb| fb.size() != size) {
      log::debug!("creating {}x{} offscreen framebuffer", size[0], size[1]);
      self.offscreen = Some(Framebuffer::new(ctx, size, &Sampler::default())?);
    }

    let offscreen = match self.offscreen {
      Some(ref offscreen) => offscreen,
      None => return Ok(LoopFeedback::Continue),
    };

    // scene pass
    offscreen.bind();
    ctx.clear([0.1, 0.1, 0.1, 1.], false);

    self.texture.bind(0);
    self.scene_program.set(&self.model, Matrix4::from_angle_z(Rad(t)));
    self.scene_program.set(&self.view, view_matrix());
    self.scene_program.set(&self.projection, projection_matrix(size));
    self.quad.render();

    // post pass
    back_buffer.bind();
    ctx.clear([0., 0., 0., 1.], false);

    if let Some(color) = offscreen.color_slot() {
      color.bind(0);
    }

    let texel_size = [1. / size[0].max(1) as f32, 1. / size[1].max(1) as f32];
    self.post_program.set(&self.effect_uniform, self.effect.id());
    self.post_program.set(&self.texel_size, texel_size);
    self.fullscreen.render();

    Ok(LoopFeedback::Continue)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn effects_cycle_back_to_none() {
    let mut effect = Effect::None;
    let mut ids = Vec::new();

    for _ in 0..5 {
      ids.push(effect.id());
      effect = effect.next();
    }

    assert_eq!(effect, Effect::None);
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
  }
}
