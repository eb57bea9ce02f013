//! Graphics state.

use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::marker::PhantomData;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// Cached value.
///
/// A cached value is used to prevent issuing GPU commands when we know the driver already holds
/// the value the command tries to set. A value that was never set, or that got invalidated, is
/// always considered invalid so that the next setter goes through to the driver.
#[derive(Debug)]
pub(crate) struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// Nothing cached yet.
  pub(crate) fn empty() -> Self {
    Cached(None)
  }

  /// Explicitly invalidate a value.
  pub(crate) fn invalidate(&mut self) {
    self.0 = None;
  }

  pub(crate) fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  pub(crate) fn get(&self) -> Option<&T> {
    self.0.as_ref()
  }

  /// Check if the cached value is invalid regarding a value.
  pub(crate) fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }
}

/// Should the binding be cached or forced to the provided value?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Bind {
  Forced,
  Cached,
}

/// The graphics state.
///
/// Acts as a forward-gate to the bindings the wrappers of this crate touch, with a small cache
/// layer over it so that the same call with the same parameters is not issued twice in a row.
///
/// Only one graphics state can exist per thread.
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  viewport: Cached<[GLint; 4]>,
  clear_color: Cached<[GLfloat; 4]>,
  depth_test: Cached<bool>,
  rasterizer_discard: Cached<bool>,

  current_texture_unit: Cached<u32>,
  // 2D texture bound per texture unit
  bound_textures: Vec<GLuint>,

  bound_array_buffer: Cached<GLuint>,
  bound_element_array_buffer: Cached<GLuint>,
  bound_draw_framebuffer: Cached<GLuint>,
  bound_vertex_array: Cached<GLuint>,
  current_program: Cached<GLuint>,
}

impl GLState {
  /// Acquire the graphics state of the current thread.
  ///
  /// Fails with [`StateQueryError::UnavailableGLState`] if it was already acquired on this thread.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match *inner {
        Some(_) => {
          inner.take();
          Ok(Self::unknown())
        }

        None => Err(StateQueryError::UnavailableGLState),
      }
    })
  }

  // Nothing is known about the context yet: every first setter reaches the driver.
  fn unknown() -> Self {
    GLState {
      _a: PhantomData,
      viewport: Cached::empty(),
      clear_color: Cached::empty(),
      depth_test: Cached::empty(),
      rasterizer_discard: Cached::empty(),
      current_texture_unit: Cached::empty(),
      bound_textures: vec![0; 16], // 16 is the platform minimal requirement
      bound_array_buffer: Cached::empty(),
      bound_element_array_buffer: Cached::empty(),
      bound_draw_framebuffer: Cached::empty(),
      bound_vertex_array: Cached::empty(),
      current_program: Cached::empty(),
    }
  }

  /// Invalidate the whole cache.
  ///
  /// Use it after issuing raw GL calls behind the back of this crate.
  pub fn invalidate(&mut self) {
    self.viewport.invalidate();
    self.clear_color.invalidate();
    self.depth_test.invalidate();
    self.rasterizer_discard.invalidate();
    self.current_texture_unit.invalidate();
    self.bound_textures.iter_mut().for_each(|h| *h = GLuint::MAX);
    self.bound_array_buffer.invalidate();
    self.bound_element_array_buffer.invalidate();
    self.bound_draw_framebuffer.invalidate();
    self.bound_vertex_array.invalidate();
    self.current_program.invalidate();
  }

  pub(crate) unsafe fn set_viewport(&mut self, viewport: [GLint; 4]) {
    if self.viewport.is_invalid(&viewport) {
      gl::Viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
      self.viewport.set(viewport);
    }
  }

  pub(crate) unsafe fn set_clear_color(&mut self, clear_color: [GLfloat; 4]) {
    if self.clear_color.is_invalid(&clear_color) {
      gl::ClearColor(
        clear_color[0],
        clear_color[1],
        clear_color[2],
        clear_color[3],
      );
      self.clear_color.set(clear_color);
    }
  }

  pub(crate) unsafe fn set_depth_test(&mut self, enabled: bool) {
    if self.depth_test.is_invalid(&enabled) {
      if enabled {
        gl::Enable(gl::DEPTH_TEST);
      } else {
        gl::Disable(gl::DEPTH_TEST);
      }

      self.depth_test.set(enabled);
    }
  }

  pub(crate) unsafe fn set_rasterizer_discard(&mut self, enabled: bool) {
    if self.rasterizer_discard.is_invalid(&enabled) {
      if enabled {
        gl::Enable(gl::RASTERIZER_DISCARD);
      } else {
        gl::Disable(gl::RASTERIZER_DISCARD);
      }

      self.rasterizer_discard.set(enabled);
    }
  }

  pub(crate) fn is_rasterizer_discarded(&self) -> bool {
    self.rasterizer_discard.get().copied().unwrap_or(false)
  }

  pub(crate) unsafe fn set_texture_unit(&mut self, unit: u32) {
    if self.current_texture_unit.is_invalid(&unit) {
      gl::ActiveTexture(gl::TEXTURE0 + unit as GLenum);
      self.current_texture_unit.set(unit);
    }
  }

  /// Bind a 2D texture to a texture unit.
  pub(crate) unsafe fn bind_texture(&mut self, unit: u32, handle: GLuint) {
    self.set_texture_unit(unit);

    let unit = unit as usize;
    if unit >= self.bound_textures.len() {
      // not enough registered texture units; let’s grow a bit more
      self.bound_textures.resize(unit + 1, GLuint::MAX);
    }

    if self.bound_textures[unit] != handle {
      gl::BindTexture(gl::TEXTURE_2D, handle);
      self.bound_textures[unit] = handle;
    }
  }

  pub(crate) unsafe fn bind_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_array_buffer.is_invalid(&handle) {
      gl::BindBuffer(gl::ARRAY_BUFFER, handle);
      self.bound_array_buffer.set(handle);
    }
  }

  pub(crate) unsafe fn bind_element_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_element_array_buffer.is_invalid(&handle) {
      gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, handle);
      self.bound_element_array_buffer.set(handle);
    }
  }

  pub(crate) unsafe fn bind_draw_framebuffer(&mut self, handle: GLuint) {
    if self.bound_draw_framebuffer.is_invalid(&handle) {
      gl::BindFramebuffer(gl::FRAMEBUFFER, handle);
      self.bound_draw_framebuffer.set(handle);
    }
  }

  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_vertex_array.is_invalid(&handle) {
      gl::BindVertexArray(handle);
      self.bound_vertex_array.set(handle);
    }
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program.is_invalid(&handle) {
      gl::UseProgram(handle);
      self.current_program.set(handle);
    }
  }

  // Deleting a bound object reverts its binding point to zero on the driver side; the forget_*
  // methods mirror that in the cache without issuing any call.

  pub(crate) fn forget_buffer(&mut self, handle: GLuint) {
    for cached in [
      &mut self.bound_array_buffer,
      &mut self.bound_element_array_buffer,
    ] {
      if cached.get() == Some(&handle) {
        cached.set(0);
      }
    }
  }

  pub(crate) fn forget_texture(&mut self, handle: GLuint) {
    self
      .bound_textures
      .iter_mut()
      .filter(|h| **h == handle)
      .for_each(|h| *h = 0);
  }

  pub(crate) fn forget_framebuffer(&mut self, handle: GLuint) {
    if self.bound_draw_framebuffer.get() == Some(&handle) {
      self.bound_draw_framebuffer.set(0);
    }
  }

  pub(crate) fn forget_vertex_array(&mut self, handle: GLuint) {
    if self.bound_vertex_array.get() == Some(&handle) {
      self.bound_vertex_array.set(0);
    }
  }

  pub(crate) fn forget_program(&mut self, handle: GLuint) {
    // a deleted program stays in use until another one is installed; only the cache forgets it
    if self.current_program.get() == Some(&handle) {
      self.current_program.invalidate();
    }
  }
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The [`GLState`] object is unavailable.
  ///
  /// That might occur if the current thread doesn’t support allocating a new graphics state. It
  /// might happen if you try to have more than one state on the same thread, for instance.
  UnavailableGLState,
  /// A `glGetString` query returned no string.
  UnknownString(GLenum),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnknownString(name) => {
        write!(f, "unknown OpenGL string query: {:#x}", name)
      }
    }
  }
}

impl error::Error for StateQueryError {}

#[cfg(test)]
mod tests {
  use super::*;
  use std::thread;

  #[test]
  fn cached_empty_is_always_invalid() {
    let cached = Cached::<u32>::empty();
    assert!(cached.is_invalid(&0));
    assert!(cached.is_invalid(&42));
  }

  #[test]
  fn cached_set_then_compare() {
    let mut cached = Cached::empty();
    cached.set(3);
    assert!(!cached.is_invalid(&3));
    assert!(cached.is_invalid(&4));

    cached.set(4);
    assert!(!cached.is_invalid(&4));

    cached.invalidate();
    assert!(cached.is_invalid(&4));
  }

  #[test]
  fn one_state_per_thread() {
    thread::spawn(|| {
      assert!(GLState::new().is_ok());
      assert!(matches!(
        GLState::new(),
        Err(StateQueryError::UnavailableGLState)
      ));
    })
    .join()
    .unwrap();

    // another thread gets its own barrier
    thread::spawn(|| assert!(GLState::new().is_ok()))
      .join()
      .unwrap();
  }

  #[test]
  fn forgetting_resets_matching_bindings_only() {
    let mut state = GLState::unknown();
    state.bound_array_buffer.set(3);
    state.bound_element_array_buffer.set(4);
    state.bound_textures[2] = 7;
    state.bound_textures[5] = 7;
    state.bound_textures[6] = 8;

    state.forget_buffer(3);
    state.forget_texture(7);

    assert_eq!(state.bound_array_buffer.get(), Some(&0));
    assert_eq!(state.bound_element_array_buffer.get(), Some(&4));
    assert_eq!(&state.bound_textures[..7], &[0, 0, 0, 0, 0, 0, 8]);
  }

  #[test]
  fn forgetting_the_current_program_invalidates_it() {
    let mut state = GLState::unknown();
    state.current_program.set(9);

    state.forget_program(1);
    assert_eq!(state.current_program.get(), Some(&9));

    state.forget_program(9);
    assert!(state.current_program.is_invalid(&9));
  }

  #[test]
  fn unknown_state_has_no_discard() {
    let mut state = GLState::unknown();
    assert!(!state.is_rasterizer_discarded());

    state.rasterizer_discard.set(true);
    assert!(state.is_rasterizer_discarded());
  }
}
