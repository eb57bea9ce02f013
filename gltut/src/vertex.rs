//! Vertex layouts and vertex array objects.
//!
//! A [`VertexLayout`] describes how interleaved vertex data is organized in a buffer: which
//! attributes, how many components each, and where they start. A [`VertexArray`] records that
//! description for a given program and buffer, so that draw calls only need to bind the VAO.

use crate::buffer::Buffer;
use crate::context::Context;
use crate::shader::{Program, VertexAttribWarning};
use crate::state::{Bind, GLState};
use gl::types::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Type of the components of a vertex attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttribType {
  /// 32-bit floating point.
  Float,
  /// 32-bit signed integer, read as an integer in shaders.
  Int,
  /// 32-bit unsigned integer, read as an integer in shaders.
  UInt,
  /// 8-bit unsigned integer, normalized to `[0; 1]` in shaders.
  NormalizedU8,
}

impl AttribType {
  /// Size in bytes of a single component.
  pub fn size(self) -> usize {
    match self {
      AttribType::Float | AttribType::Int | AttribType::UInt => 4,
      AttribType::NormalizedU8 => 1,
    }
  }

  fn opengl_type(self) -> GLenum {
    match self {
      AttribType::Float => gl::FLOAT,
      AttribType::Int => gl::INT,
      AttribType::UInt => gl::UNSIGNED_INT,
      AttribType::NormalizedU8 => gl::UNSIGNED_BYTE,
    }
  }
}

/// A named vertex attribute.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VertexAttrib {
  /// Name of the attribute in the vertex shader.
  pub name: &'static str,
  /// Number of components (1 to 4).
  pub dim: usize,
  /// Component type.
  pub ty: AttribType,
}

impl VertexAttrib {
  /// Floating point attribute with `dim` components.
  pub const fn float(name: &'static str, dim: usize) -> Self {
    VertexAttrib {
      name,
      dim,
      ty: AttribType::Float,
    }
  }

  /// Size in bytes of the attribute.
  pub fn size(&self) -> usize {
    self.dim * self.ty.size()
  }
}

/// Interleaved layout of a vertex.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VertexLayout {
  attribs: Vec<(VertexAttrib, usize)>,
  stride: usize,
}

impl VertexLayout {
  /// Lay `attribs` out one after the other, in order, without padding.
  pub fn interleaved(attribs: impl IntoIterator<Item = VertexAttrib>) -> Self {
    let mut stride = 0;
    let attribs = attribs
      .into_iter()
      .map(|attrib| {
        let offset = stride;
        stride += attrib.size();
        (attrib, offset)
      })
      .collect();

    VertexLayout { attribs, stride }
  }

  /// Size in bytes of a whole vertex.
  pub fn stride(&self) -> usize {
    self.stride
  }

  /// Attributes along with their byte offset within a vertex.
  pub fn attribs(&self) -> impl Iterator<Item = (&VertexAttrib, usize)> {
    self.attribs.iter().map(|(attrib, offset)| (attrib, *offset))
  }

  /// Number of whole vertices held by `bytes` bytes.
  pub fn vertex_count(&self, bytes: usize) -> usize {
    if self.stride == 0 {
      0
    } else {
      bytes / self.stride
    }
  }
}

/// Vertex array object.
#[derive(Debug)]
pub struct VertexArray {
  handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl Drop for VertexArray {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteVertexArrays(1, &self.handle);
    }

    self.state.borrow_mut().forget_vertex_array(self.handle);
  }
}

impl VertexArray {
  /// Create an empty vertex array.
  pub fn new(ctx: &mut Context) -> Self {
    let mut handle: GLuint = 0;

    unsafe {
      gl::GenVertexArrays(1, &mut handle);
    }

    VertexArray {
      handle,
      state: ctx.state.clone(),
    }
  }

  /// Bind the vertex array.
  pub fn bind(&self) {
    unsafe {
      self
        .state
        .borrow_mut()
        .bind_vertex_array(self.handle, Bind::Cached)
    }
  }

  /// Record `layout` for `buffer`, with attribute locations taken from `program`.
  ///
  /// Attributes the program doesn’t use are skipped; a warning is returned for each of them and
  /// left to the caller to report.
  pub fn bind_layout<T>(
    &mut self,
    program: &Program,
    buffer: &Buffer<T>,
    layout: &VertexLayout,
  ) -> Vec<VertexAttribWarning>
  where
    T: Copy,
  {
    self.bind();
    buffer.bind();

    let mut warnings = Vec::new();

    for (attrib, offset) in layout.attribs() {
      let location = match program.attrib_location(attrib.name) {
        Ok(location) => location,
        Err(warning) => {
          warnings.push(warning);
          continue;
        }
      };

      unsafe {
        match attrib.ty {
          AttribType::Int | AttribType::UInt => gl::VertexAttribIPointer(
            location,
            attrib.dim as GLint,
            attrib.ty.opengl_type(),
            layout.stride() as GLsizei,
            offset as *const _,
          ),

          AttribType::Float | AttribType::NormalizedU8 => gl::VertexAttribPointer(
            location,
            attrib.dim as GLint,
            attrib.ty.opengl_type(),
            (attrib.ty == AttribType::NormalizedU8) as GLboolean,
            layout.stride() as GLsizei,
            offset as *const _,
          ),
        }

        gl::EnableVertexAttribArray(location);
      }
    }

    warnings
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn interleaved_offsets_and_stride() {
    let layout = VertexLayout::interleaved(vec![
      VertexAttrib::float("position", 2),
      VertexAttrib::float("color", 3),
      VertexAttrib::float("texcoord", 2),
    ]);

    let offsets: Vec<_> = layout.attribs().map(|(a, o)| (a.name, o)).collect();
    assert_eq!(
      offsets,
      vec![("position", 0), ("color", 8), ("texcoord", 20)]
    );
    assert_eq!(layout.stride(), 28);
  }

  #[test]
  fn mixed_component_types() {
    let layout = VertexLayout::interleaved(vec![
      VertexAttrib {
        name: "rgba",
        dim: 4,
        ty: AttribType::NormalizedU8,
      },
      VertexAttrib {
        name: "id",
        dim: 1,
        ty: AttribType::UInt,
      },
    ]);

    assert_eq!(layout.stride(), 8);
    assert_eq!(layout.attribs().nth(1).map(|(_, o)| o), Some(4));
  }

  #[test]
  fn vertex_count_from_bytes() {
    let layout = VertexLayout::interleaved(vec![VertexAttrib::float("position", 2)]);
    assert_eq!(layout.vertex_count(24), 3);
    assert_eq!(layout.vertex_count(23), 2);

    let empty = VertexLayout::interleaved(Vec::new());
    assert_eq!(empty.stride(), 0);
    assert_eq!(empty.vertex_count(64), 0);
  }
}
