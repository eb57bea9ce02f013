//! OpenGL buffer implementation.

use crate::context::Context;
use crate::state::{Bind, GLState};
use gl::types::*;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::rc::Rc;

/// Binding point a buffer is created for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Target {
  /// Vertex data.
  Array,
  /// Vertex indices.
  ElementArray,
  /// Transform feedback capture.
  TransformFeedback,
}

/// Usage hint given to the driver.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Usage {
  /// Uploaded once, drawn many times.
  StaticDraw,
  /// Modified repeatedly, drawn many times.
  DynamicDraw,
  /// Modified once per draw.
  StreamDraw,
  /// Written by the GPU, read back by the application.
  StaticRead,
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      Target::Array => f.write_str("array buffer"),
      Target::ElementArray => f.write_str("element array buffer"),
      Target::TransformFeedback => f.write_str("transform feedback buffer"),
    }
  }
}

/// OpenGL buffer holding `len` values of type `T`.
#[derive(Debug)]
pub struct Buffer<T> {
  handle: GLuint,
  target: Target,
  len: usize,
  state: Rc<RefCell<GLState>>,
  _t: PhantomData<*const T>,
}

impl<T> Drop for Buffer<T> {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteBuffers(1, &self.handle);
    }

    self.state.borrow_mut().forget_buffer(self.handle);
  }
}

impl<T> Buffer<T>
where
  T: Copy,
{
  /// Create a buffer and upload `values` in it.
  pub fn from_slice(ctx: &mut Context, target: Target, usage: Usage, values: &[T]) -> Self {
    let buffer = Self::alloc(ctx, target, values.len());

    unsafe {
      buffer.bind();
      gl::BufferData(
        opengl_target(target),
        byte_len::<T>(values.len()),
        values.as_ptr() as _,
        opengl_usage(usage),
      );
    }

    buffer
  }

  /// Create a buffer of `len` values with uninitialized storage.
  pub fn new(ctx: &mut Context, target: Target, usage: Usage, len: usize) -> Self {
    let buffer = Self::alloc(ctx, target, len);

    unsafe {
      buffer.bind();
      gl::BufferData(
        opengl_target(target),
        byte_len::<T>(len),
        std::ptr::null(),
        opengl_usage(usage),
      );
    }

    buffer
  }

  fn alloc(ctx: &mut Context, target: Target, len: usize) -> Self {
    let mut handle: GLuint = 0;
    unsafe { gl::GenBuffers(1, &mut handle) };

    log::debug!("created {} #{} ({} values)", target, handle, len);

    Buffer {
      handle,
      target,
      len,
      state: ctx.state.clone(),
      _t: PhantomData,
    }
  }

  /// Number of values in the buffer.
  pub fn len(&self) -> usize {
    self.len
  }

  /// Whether the buffer holds no value.
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Binding point of the buffer.
  pub fn target(&self) -> Target {
    self.target
  }

  pub(crate) fn handle(&self) -> GLuint {
    self.handle
  }

  /// Bind the buffer to its own binding point.
  ///
  /// Element buffers are recorded in the currently bound vertex array.
  pub fn bind(&self) {
    unsafe {
      match self.target {
        Target::Array => self
          .state
          .borrow_mut()
          .bind_array_buffer(self.handle, Bind::Cached),
        Target::ElementArray => self
          .state
          .borrow_mut()
          .bind_element_array_buffer(self.handle, Bind::Forced),
        Target::TransformFeedback => gl::BindBuffer(gl::TRANSFORM_FEEDBACK_BUFFER, self.handle),
      }
    }
  }

  /// Replace the content of the buffer, starting at the first value.
  ///
  /// Values past the end of the buffer are ignored.
  pub fn write(&mut self, values: &[T]) {
    let len = values.len().min(self.len);

    unsafe {
      self.bind();
      gl::BufferSubData(
        opengl_target(self.target),
        0,
        byte_len::<T>(len),
        values.as_ptr() as _,
      );
    }
  }

  /// Copy the content of the buffer back to the CPU.
  pub fn read_back(&self) -> Vec<T> {
    let mut values = Vec::<T>::with_capacity(self.len);

    unsafe {
      self.bind();
      gl::GetBufferSubData(
        opengl_target(self.target),
        0,
        byte_len::<T>(self.len),
        values.as_mut_ptr() as _,
      );
      values.set_len(self.len);
    }

    values
  }
}

pub(crate) fn byte_len<T>(len: usize) -> GLsizeiptr {
  (mem::size_of::<T>() * len) as GLsizeiptr
}

fn opengl_target(target: Target) -> GLenum {
  match target {
    Target::Array => gl::ARRAY_BUFFER,
    Target::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    Target::TransformFeedback => gl::TRANSFORM_FEEDBACK_BUFFER,
  }
}

fn opengl_usage(usage: Usage) -> GLenum {
  match usage {
    Usage::StaticDraw => gl::STATIC_DRAW,
    Usage::DynamicDraw => gl::DYNAMIC_DRAW,
    Usage::StreamDraw => gl::STREAM_DRAW,
    Usage::StaticRead => gl::STATIC_READ,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn byte_lengths() {
    assert_eq!(byte_len::<f32>(6), 24);
    assert_eq!(byte_len::<[f32; 2]>(3), 24);
    assert_eq!(byte_len::<u8>(0), 0);
  }

  #[test]
  fn targets_display() {
    assert_eq!(Target::ElementArray.to_string(), "element array buffer");
  }
}
