//! Tessellations: vertex data ready to be drawn.

use crate::buffer::{Buffer, Target, Usage};
use crate::context::Context;
use crate::shader::{Program, VertexAttribWarning};
use crate::vertex::{VertexArray, VertexLayout};
use gl::types::*;
use std::error;
use std::fmt;

/// Primitive mode.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
  /// A single point per vertex.
  Point,
  /// A line between every two vertices.
  Line,
  /// Connected lines.
  LineStrip,
  /// A triangle every three vertices.
  Triangle,
  /// Triangles sharing their last two vertices with the next one.
  TriangleStrip,
  /// Triangles sharing the first vertex.
  TriangleFan,
}

impl Mode {
  /// Number of primitives assembled from `vert_nb` vertices.
  pub fn primitive_count(self, vert_nb: usize) -> usize {
    match self {
      Mode::Point => vert_nb,
      Mode::Line => vert_nb / 2,
      Mode::LineStrip => vert_nb.saturating_sub(1),
      Mode::Triangle => vert_nb / 3,
      Mode::TriangleStrip | Mode::TriangleFan => vert_nb.saturating_sub(2),
    }
  }

  /// Number of vertices each assembled primitive is made of.
  pub fn vertices_per_primitive(self) -> usize {
    match self {
      Mode::Point => 1,
      Mode::Line | Mode::LineStrip => 2,
      Mode::Triangle | Mode::TriangleStrip | Mode::TriangleFan => 3,
    }
  }

  pub(crate) fn opengl_mode(self) -> GLenum {
    match self {
      Mode::Point => gl::POINTS,
      Mode::Line => gl::LINES,
      Mode::LineStrip => gl::LINE_STRIP,
      Mode::Triangle => gl::TRIANGLES,
      Mode::TriangleStrip => gl::TRIANGLE_STRIP,
      Mode::TriangleFan => gl::TRIANGLE_FAN,
    }
  }
}

/// Errors that can occur when building a [`Tess`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TessError {
  /// Nothing to render: no vertices, no indices and no vertex count.
  NoData,
  /// An index refers to a vertex that doesn’t exist.
  IndexOutOfBounds {
    /// Offending index.
    index: u32,
    /// Number of vertices.
    vert_nb: usize,
  },
}

impl fmt::Display for TessError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      TessError::NoData => f.write_str("tessellation has nothing to render"),
      TessError::IndexOutOfBounds { index, vert_nb } => write!(
        f,
        "index {} out of bounds (only {} vertices)",
        index, vert_nb
      ),
    }
  }
}

impl error::Error for TessError {}

/// Vertices, optional indices and a primitive mode, bound in a vertex array.
#[derive(Debug)]
pub struct Tess<V> {
  vao: VertexArray,
  vertices: Option<Buffer<V>>,
  indices: Option<Buffer<u32>>,
  vert_nb: usize,
  mode: Mode,
}

impl<V> Tess<V>
where
  V: Copy,
{
  /// Draw the tessellation with the currently used program.
  pub fn render(&self) {
    self.vao.bind();

    unsafe {
      match self.indices {
        Some(_) => gl::DrawElements(
          self.mode.opengl_mode(),
          self.vert_nb as GLsizei,
          gl::UNSIGNED_INT,
          std::ptr::null(),
        ),
        None => gl::DrawArrays(self.mode.opengl_mode(), 0, self.vert_nb as GLsizei),
      }
    }
  }

  /// Number of vertices (or indices) drawn.
  pub fn vert_nb(&self) -> usize {
    self.vert_nb
  }

  /// Primitive mode.
  pub fn mode(&self) -> Mode {
    self.mode
  }

  /// Vertex buffer, if any.
  pub fn vertices(&self) -> Option<&Buffer<V>> {
    self.vertices.as_ref()
  }

  /// Mutable vertex buffer, if any.
  pub fn vertices_mut(&mut self) -> Option<&mut Buffer<V>> {
    self.vertices.as_mut()
  }
}

/// Build a [`Tess`].
#[derive(Debug)]
pub struct TessBuilder<'a, V> {
  vertices: Option<(&'a [V], &'a VertexLayout)>,
  indices: Option<&'a [u32]>,
  usage: Usage,
  render_vert_nb: Option<usize>,
  mode: Mode,
}

impl<'a> TessBuilder<'a, ()> {
  /// Attributeless tessellation: vertices are generated in the vertex shader from `gl_VertexID`.
  pub fn attributeless(vert_nb: usize) -> Self {
    TessBuilder {
      vertices: None,
      indices: None,
      usage: Usage::StaticDraw,
      render_vert_nb: Some(vert_nb),
      mode: Mode::Triangle,
    }
  }
}

impl<'a, V> TessBuilder<'a, V>
where
  V: Copy,
{
  /// Tessellation reading interleaved vertices laid out according to `layout`.
  pub fn new(vertices: &'a [V], layout: &'a VertexLayout) -> Self {
    TessBuilder {
      vertices: Some((vertices, layout)),
      indices: None,
      usage: Usage::StaticDraw,
      render_vert_nb: None,
      mode: Mode::Triangle,
    }
  }

  /// Draw through an element buffer.
  pub fn set_indices(mut self, indices: &'a [u32]) -> Self {
    self.indices = Some(indices);
    self
  }

  /// Primitive mode; defaults to [`Mode::Triangle`].
  pub fn set_mode(mut self, mode: Mode) -> Self {
    self.mode = mode;
    self
  }

  /// Vertex buffer usage hint; defaults to [`Usage::StaticDraw`].
  pub fn set_usage(mut self, usage: Usage) -> Self {
    self.usage = usage;
    self
  }

  /// Override the number of vertices to draw.
  pub fn set_render_vertex_nb(mut self, vert_nb: usize) -> Self {
    self.render_vert_nb = Some(vert_nb);
    self
  }

  /// Upload the data and bind the vertex layout to `program`’s attributes.
  ///
  /// Inactive attributes are not fatal and are returned as warnings.
  pub fn build(
    self,
    ctx: &mut Context,
    program: &Program,
  ) -> Result<(Tess<V>, Vec<VertexAttribWarning>), TessError> {
    let vert_nb = self.vert_nb()?;

    let mut vao = VertexArray::new(ctx);
    let mut warnings = Vec::new();

    let vertices = self.vertices.map(|(vertices, layout)| {
      let buffer = Buffer::from_slice(ctx, Target::Array, self.usage, vertices);
      warnings = vao.bind_layout(program, &buffer, layout);
      buffer
    });

    let indices = self.indices.map(|indices| {
      vao.bind();
      let buffer = Buffer::from_slice(ctx, Target::ElementArray, Usage::StaticDraw, indices);
      buffer.bind();
      buffer
    });

    let tess = Tess {
      vao,
      vertices,
      indices,
      vert_nb,
      mode: self.mode,
    };

    Ok((tess, warnings))
  }

  // Number of vertices to draw, checking indices against the vertex count.
  fn vert_nb(&self) -> Result<usize, TessError> {
    let data_nb = self.vertices.map_or(0, |(vertices, _)| vertices.len());

    if let Some(indices) = self.indices {
      validate_indices(indices, data_nb)?;
    }

    let vert_nb = match (self.render_vert_nb, self.indices) {
      (Some(nb), _) => nb,
      (None, Some(indices)) => indices.len(),
      (None, None) => data_nb,
    };

    if vert_nb == 0 {
      Err(TessError::NoData)
    } else {
      Ok(vert_nb)
    }
  }
}

fn validate_indices(indices: &[u32], vert_nb: usize) -> Result<(), TessError> {
  match indices.iter().find(|&&i| i as usize >= vert_nb) {
    Some(&index) => Err(TessError::IndexOutOfBounds { index, vert_nb }),
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::vertex::VertexAttrib;

  #[test]
  fn primitive_counts() {
    assert_eq!(Mode::Point.primitive_count(5), 5);
    assert_eq!(Mode::Line.primitive_count(5), 2);
    assert_eq!(Mode::LineStrip.primitive_count(5), 4);
    assert_eq!(Mode::Triangle.primitive_count(7), 2);
    assert_eq!(Mode::TriangleStrip.primitive_count(4), 2);
    assert_eq!(Mode::TriangleFan.primitive_count(1), 0);
  }

  #[test]
  fn vertex_count_of_indexed_quad() {
    let layout = VertexLayout::interleaved(vec![VertexAttrib::float("position", 2)]);
    let vertices = [[-0.5f32, 0.5], [0.5, 0.5], [0.5, -0.5], [-0.5, -0.5]];
    let indices = [0, 1, 2, 2, 3, 0];

    let builder = TessBuilder::new(&vertices[..], &layout).set_indices(&indices);
    assert_eq!(builder.vert_nb(), Ok(6));
  }

  #[test]
  fn out_of_bounds_index() {
    let layout = VertexLayout::interleaved(vec![VertexAttrib::float("position", 2)]);
    let vertices = [[0.0f32, 0.5], [0.5, -0.5], [-0.5, -0.5]];
    let indices = [0, 1, 3];

    let builder = TessBuilder::new(&vertices[..], &layout).set_indices(&indices);
    assert_eq!(
      builder.vert_nb(),
      Err(TessError::IndexOutOfBounds {
        index: 3,
        vert_nb: 3
      })
    );
  }

  #[test]
  fn attributeless_needs_a_count() {
    assert_eq!(TessBuilder::attributeless(4).vert_nb(), Ok(4));
    assert_eq!(
      TessBuilder::attributeless(0).vert_nb(),
      Err(TessError::NoData)
    );
  }

  #[test]
  fn render_count_overrides_data() {
    let layout = VertexLayout::interleaved(vec![VertexAttrib::float("value", 1)]);
    let vertices = [1.0f32, 2.0, 3.0, 4.0];

    let builder = TessBuilder::new(&vertices[..], &layout)
      .set_mode(Mode::Point)
      .set_render_vertex_nb(2);
    assert_eq!(builder.vert_nb(), Ok(2));
  }
}
