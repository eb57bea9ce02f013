//! Graphics context.
//!
//! A [`Context`] is the entry point of every GPU resource this crate creates. It must be built
//! once the OpenGL function pointers are loaded (see `gltut-sdl2`), on the thread that owns the
//! OpenGL context.

use crate::state::{GLState, StateQueryError};
use gl::types::*;
use std::cell::RefCell;
use std::ffi::CStr;
use std::rc::Rc;

/// OpenGL 3.2 core graphics context.
#[derive(Debug)]
pub struct Context {
  pub(crate) state: Rc<RefCell<GLState>>,
}

impl Context {
  /// Acquire the graphics state of the current thread.
  pub fn new() -> Result<Self, StateQueryError> {
    let state = GLState::new()?;

    Ok(Context {
      state: Rc::new(RefCell::new(state)),
    })
  }

  /// Access the cached graphics state.
  pub fn state(&self) -> &Rc<RefCell<GLState>> {
    &self.state
  }

  /// Name of the company responsible for the driver.
  pub fn vendor(&self) -> Result<String, StateQueryError> {
    get_string(gl::VENDOR)
  }

  /// Name of the renderer (usually the GPU).
  pub fn renderer(&self) -> Result<String, StateQueryError> {
    get_string(gl::RENDERER)
  }

  /// Version of OpenGL.
  pub fn gl_version(&self) -> Result<String, StateQueryError> {
    get_string(gl::VERSION)
  }

  /// Version of the shading language.
  pub fn glsl_version(&self) -> Result<String, StateQueryError> {
    get_string(gl::SHADING_LANGUAGE_VERSION)
  }

  /// Set the viewport of the currently bound framebuffer.
  pub fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
    unsafe {
      self
        .state
        .borrow_mut()
        .set_viewport([x, y, width as GLint, height as GLint]);
    }
  }

  /// Clear the currently bound framebuffer.
  ///
  /// Depth (and stencil) is cleared only when `depth` is `true`.
  pub fn clear(&mut self, color: [f32; 4], depth: bool) {
    let mut bits = gl::COLOR_BUFFER_BIT;

    if depth {
      bits |= gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT;
    }

    unsafe {
      self.state.borrow_mut().set_clear_color(color);
      gl::Clear(bits);
    }
  }

  /// Enable or disable the depth test.
  pub fn set_depth_test(&mut self, enabled: bool) {
    unsafe { self.state.borrow_mut().set_depth_test(enabled) }
  }
}

fn get_string(name: GLenum) -> Result<String, StateQueryError> {
  unsafe {
    let ptr = gl::GetString(name);

    if ptr.is_null() {
      return Err(StateQueryError::UnknownString(name));
    }

    let s = CStr::from_ptr(ptr as *const _);
    Ok(s.to_string_lossy().into_owned())
  }
}
