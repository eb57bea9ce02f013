use crate::{DemoError, PlatformServices};
use gltut::shader::Program;
use gltut::tess::{Mode, Tess, TessBuilder};
use gltut::texture::{Sampler, Texture2D};
use gltut::vertex::{VertexAttrib, VertexLayout};
use gltut::Context;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorVertex {
  pub position: [f32; 2],
  pub color: [f32; 3],
}

impl ColorVertex {
  pub const fn new(position: [f32; 2], color: [f32; 3]) -> Self {
    ColorVertex { position, color }
  }

  pub fn layout() -> VertexLayout {
    VertexLayout::interleaved([VertexAttrib::float("position", 2), VertexAttrib::float("color", 3)])
  }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexturedVertex {
  pub position: [f32; 2],
  pub color: [f32; 3],
  pub texcoord: [f32; 2],
}

impl TexturedVertex {
  pub const fn new(position: [f32; 2], color: [f32; 3], texcoord: [f32; 2]) -> Self {
    TexturedVertex {
      position,
      color,
      texcoord,
    }
  }

  pub fn layout() -> VertexLayout {
    VertexLayout::interleaved([
      VertexAttrib::float("position", 2),
      VertexAttrib::float("color", 3),
      VertexAttrib::float("texcoord", 2),
    ])
  }
}

// Counter-clockwise from the top left corner.
pub const TEXTURED_QUAD: [TexturedVertex; 4] = [
  TexturedVertex::new([-0.5, 0.5], [1., 0., 0.], [0., 1.]),
  TexturedVertex::new([0.5, 0.5], [0., 1., 0.], [1., 1.]),
  TexturedVertex::new([0.5, -0.5], [0., 0., 1.], [1., 0.]),
  TexturedVertex::new([-0.5, -0.5], [1., 1., 1.], [0., 0.]),
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Fetch, compile and link a program.
pub fn load_program(
  platform: &mut impl PlatformServices,
  ctx: &mut Context,
  vertex: &str,
  geometry: Option<&str>,
  fragment: &str,
) -> Result<Program, DemoError> {
  let vs = platform.fetch_shader(vertex)?;
  let gs = geometry.map(|name| platform.fetch_shader(name)).transpose()?;
  let fs = platform.fetch_shader(fragment)?;

  Ok(Program::from_strings(ctx, &vs, gs.as_deref(), &fs)?)
}

/// Fetch a texture and upload it.
pub fn load_texture(
  platform: &mut impl PlatformServices,
  ctx: &mut Context,
  name: &str,
  sampler: &Sampler,
) -> Result<Texture2D, DemoError> {
  let image = platform.fetch_texture(name)?;
  Ok(Texture2D::from_image(ctx, &image, sampler)?)
}

/// Indexed textured quad.
pub fn textured_quad(ctx: &mut Context, program: &Program) -> Result<Tess<TexturedVertex>, DemoError> {
  let layout = TexturedVertex::layout();
  let (tess, warnings) = TessBuilder::new(&TEXTURED_QUAD, &layout)
    .set_indices(&QUAD_INDICES)
    .build(ctx, program)?;

  log_warnings(warnings);
  Ok(tess)
}

/// Screen-covering quad, generated from `gl_VertexID` in `fullscreen.vert`.
pub fn fullscreen_quad(ctx: &mut Context, program: &Program) -> Result<Tess<()>, DemoError> {
  let (tess, _) = TessBuilder::attributeless(4)
    .set_mode(Mode::TriangleStrip)
    .build(ctx, program)?;

  Ok(tess)
}

pub fn log_warnings<W>(warnings: impl IntoIterator<Item = W>)
where
  W: std::fmt::Display,
{
  for warning in warnings {
    log::warn!("{}", warning);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::mem;

  #[test]
  fn layouts_match_vertex_types() {
    assert_eq!(ColorVertex::layout().stride(), mem::size_of::<ColorVertex>());
    assert_eq!(
      TexturedVertex::layout().stride(),
      mem::size_of::<TexturedVertex>()
    );
  }

  #[test]
  fn quad_indices_are_in_bounds() {
    assert!(QUAD_INDICES
      .iter()
      .all(|&i| (i as usize) < TEXTURED_QUAD.len()));
  }
}
