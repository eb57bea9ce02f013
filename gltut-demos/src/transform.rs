//! Transformations: the textured quad spins around the Z axis, seen from above through a
//! perspective camera.
//!
//! Press the main toggle to pause the rotation.

use crate::shared::{load_program, load_texture, textured_quad, TexturedVertex};
use crate::texture::PIXEL_SAMPLER;
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use cgmath::{perspective, Deg, Matrix4, Point3, Rad, Vector3};
use gltut::framebuffer::Framebuffer;
use gltut::shader::{Program, Uniform};
use gltut::tess::Tess;
use gltut::texture::Texture2D;
use gltut::Context;

const FOVY: Deg<f32> = Deg(45.);
const Z_NEAR: f32 = 1.;
const Z_FAR: f32 = 10.;

/// Local demo.
pub struct LocalDemo {
  program: Program,
  model: Uniform<Matrix4<f32>>,
  view: Uniform<Matrix4<f32>>,
  projection: Uniform<Matrix4<f32>>,
  quad: Tess<TexturedVertex>,
  texture: Texture2D,
  angle: Rad<f32>,
  last_t: f32,
  paused: bool,
}

/// Camera slightly above the XY plane, looking at the origin with Z up.
pub(crate) fn view_matrix() -> Matrix4<f32> {
  Matrix4::look_at_rh(
    Point3::new(1.2, 1.2, 1.2),
    Point3::new(0., 0., 0.),
    Vector3::unit_z(),
  )
}

pub(crate) fn projection_matrix(size: [u32; 2]) -> Matrix4<f32> {
  let aspect = size[0].max(1) as f32 / size[1].max(1) as f32;
  perspective(FOVY, aspect, Z_NEAR, Z_FAR)
}

impl Demo for LocalDemo {
  fn bootstrap(
    platform: &mut impl PlatformServices,
    ctx: &mut Context,
  ) -> Result<Self, DemoError> {
    let program = load_program(platform, ctx, "transform.vert", None, "texture.frag")?;
    let quad = textured_quad(ctx, &program)?;
    let texture = load_texture(platform, ctx, "checker.ppm", &PIXEL_SAMPLER)?;

    program.set(&program.uniform_or_unbound("tex_checker"), 0i32);
    program.set(&program.uniform_or_unbound("tex_stripes"), 0i32);
    program.set(&program.uniform_or_unbound("mix_factor"), 0f32);

    let model = program.uniform_or_unbound("model");
    let view = program.uniform_or_unbound("view");
    let projection = program.uniform_or_unbound("projection");

    Ok(LocalDemo {
      program,
      model,
      view,
      projection,
      quad,
      texture,
      angle: Rad(0.),
      last_t: 0.,
      paused: false,
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
        InputAction::MainToggle => self.paused = !self.paused,
        _ => (),
      }
    }

    if !self.paused {
      self.angle += Rad(t - self.last_t);
    }
    self.last_t = t;

    back_buffer.bind();
    ctx.clear([0., 0., 0., 1.], false);

    self.texture.bind(0);

    let program = &self.program;
    program.set(&self.model, Matrix4::from_angle_z(self.angle));
    program.set(&self.view, view_matrix());
    program.set(&self.projection, projection_matrix(back_buffer.size()));
    self.quad.render();

    Ok(LoopFeedback::Continue)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cgmath::{SquareMatrix, Vector4};

  #[test]
  fn origin_is_in_front_of_the_camera() {
    let clip = projection_matrix([800, 600]) * view_matrix() * Vector4::new(0., 0., 0., 1.);
    let ndc = clip.truncate() / clip.w;

    assert!(clip.w > 0.);
    assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    assert!(ndc.z > -1. && ndc.z < 1.);
  }

  #[test]
  fn degenerate_sizes_still_invert() {
    assert!(projection_matrix([0, 0]).invert().is_some());
  }
}
