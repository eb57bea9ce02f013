//! Framebuffers.
//!
//! A framebuffer is either the back buffer (the default framebuffer of the window, handle `0`) or
//! an offscreen framebuffer owning a color texture and a depth/stencil renderbuffer. The color
//! texture of an offscreen framebuffer can be bound and sampled by a later render pass.

use crate::context::Context;
use crate::state::GLState;
use crate::texture::{PixelFormat, Sampler, Texture2D, TextureError};
use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::rc::Rc;

/// Framebuffer error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FramebufferError {
  /// Texture error.
  ///
  /// This happen while creating the color attachment.
  TextureError(TextureError),
  /// Incomplete error.
  ///
  /// This happens when finalizing the construction of the framebuffer.
  Incomplete(IncompleteReason),
}

impl fmt::Display for FramebufferError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      FramebufferError::TextureError(ref e) => write!(f, "framebuffer texture error: {}", e),

      FramebufferError::Incomplete(ref e) => write!(f, "incomplete framebuffer: {}", e),
    }
  }
}

impl error::Error for FramebufferError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      FramebufferError::TextureError(e) => Some(e),
      FramebufferError::Incomplete(_) => None,
    }
  }
}

impl From<TextureError> for FramebufferError {
  fn from(e: TextureError) -> Self {
    FramebufferError::TextureError(e)
  }
}

impl From<IncompleteReason> for FramebufferError {
  fn from(e: IncompleteReason) -> Self {
    FramebufferError::Incomplete(e)
  }
}

/// Reason a framebuffer is incomplete.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IncompleteReason {
  /// Incomplete framebuffer.
  Undefined,
  /// Incomplete attachment (color / depth).
  IncompleteAttachment,
  /// An attachment was missing.
  MissingAttachment,
  /// Incomplete draw buffer.
  IncompleteDrawBuffer,
  /// Incomplete read buffer.
  IncompleteReadBuffer,
  /// Unsupported.
  Unsupported,
  /// Incomplete multisample configuration.
  IncompleteMultisample,
  /// Incomplete layer targets.
  IncompleteLayerTargets,
  /// Status not known by this crate.
  Unknown(GLenum),
}

impl fmt::Display for IncompleteReason {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      IncompleteReason::Undefined => write!(f, "incomplete reason"),
      IncompleteReason::IncompleteAttachment => write!(f, "incomplete attachment"),
      IncompleteReason::MissingAttachment => write!(f, "missing attachment"),
      IncompleteReason::IncompleteDrawBuffer => write!(f, "incomplete draw buffer"),
      IncompleteReason::IncompleteReadBuffer => write!(f, "incomplete read buffer"),
      IncompleteReason::Unsupported => write!(f, "unsupported"),
      IncompleteReason::IncompleteMultisample => write!(f, "incomplete multisample"),
      IncompleteReason::IncompleteLayerTargets => write!(f, "incomplete layer targets"),
      IncompleteReason::Unknown(status) => write!(f, "unknown status {:#x}", status),
    }
  }
}

/// Framebuffer: either the back buffer or an offscreen render target.
#[derive(Debug)]
pub struct Framebuffer {
  handle: GLuint,
  renderbuffer: Option<GLuint>,
  color: Option<Texture2D>,
  size: [u32; 2],
  state: Rc<RefCell<GLState>>,
}

impl Drop for Framebuffer {
  fn drop(&mut self) {
    if let Some(renderbuffer) = self.renderbuffer {
      unsafe {
        gl::DeleteRenderbuffers(1, &renderbuffer);
      }
    }

    if self.handle != 0 {
      unsafe {
        gl::DeleteFramebuffers(1, &self.handle);
      }

      self.state.borrow_mut().forget_framebuffer(self.handle);
    }
  }
}

impl Framebuffer {
  /// The default framebuffer of the window.
  pub fn back_buffer(ctx: &mut Context, size: [u32; 2]) -> Self {
    Framebuffer {
      handle: 0,
      renderbuffer: None,
      color: None,
      size,
      state: ctx.state.clone(),
    }
  }

  /// Offscreen framebuffer with an RGBA8 color texture and a depth/stencil renderbuffer.
  pub fn new(
    ctx: &mut Context,
    size: [u32; 2],
    sampler: &Sampler,
  ) -> Result<Self, FramebufferError> {
    Self::with_format(ctx, size, PixelFormat::RGBA8, sampler)
  }

  /// Offscreen framebuffer with a color texture of the given format.
  pub fn with_format(
    ctx: &mut Context,
    size: [u32; 2],
    format: PixelFormat,
    sampler: &Sampler,
  ) -> Result<Self, FramebufferError> {
    let color = Texture2D::new(ctx, size, format, sampler)?;

    let mut handle: GLuint = 0;
    let mut renderbuffer: GLuint = 0;

    unsafe {
      gl::GenFramebuffers(1, &mut handle);
      ctx.state.borrow_mut().bind_draw_framebuffer(handle);

      gl::FramebufferTexture2D(
        gl::FRAMEBUFFER,
        gl::COLOR_ATTACHMENT0,
        gl::TEXTURE_2D,
        color.handle(),
        0,
      );
      gl::DrawBuffers(1, [gl::COLOR_ATTACHMENT0].as_ptr());

      gl::GenRenderbuffers(1, &mut renderbuffer);
      gl::BindRenderbuffer(gl::RENDERBUFFER, renderbuffer);
      gl::RenderbufferStorage(
        gl::RENDERBUFFER,
        gl::DEPTH24_STENCIL8,
        size[0] as GLsizei,
        size[1] as GLsizei,
      );
      gl::BindRenderbuffer(gl::RENDERBUFFER, 0);

      gl::FramebufferRenderbuffer(
        gl::FRAMEBUFFER,
        gl::DEPTH_STENCIL_ATTACHMENT,
        gl::RENDERBUFFER,
        renderbuffer,
      );
    }

    // built before validation so that an incomplete framebuffer still gets released
    let framebuffer = Framebuffer {
      handle,
      renderbuffer: Some(renderbuffer),
      color: Some(color),
      size,
      state: ctx.state.clone(),
    };

    let status = unsafe { gl::CheckFramebufferStatus(gl::FRAMEBUFFER) };
    if let Some(reason) = incomplete_reason(status) {
      return Err(reason.into());
    }

    log::debug!(
      "created framebuffer #{} ({}x{})",
      handle,
      size[0],
      size[1]
    );

    Ok(framebuffer)
  }

  /// Whether this is the default framebuffer.
  pub fn is_back_buffer(&self) -> bool {
    self.handle == 0
  }

  /// Size of the framebuffer.
  pub fn size(&self) -> [u32; 2] {
    self.size
  }

  /// Color attachment, if any.
  pub fn color_slot(&self) -> Option<&Texture2D> {
    self.color.as_ref()
  }

  /// Bind the framebuffer for drawing and set the viewport to cover it.
  pub fn bind(&self) {
    let mut state = self.state.borrow_mut();

    unsafe {
      state.bind_draw_framebuffer(self.handle);
      state.set_viewport([0, 0, self.size[0] as GLint, self.size[1] as GLint]);
    }
  }
}

fn incomplete_reason(status: GLenum) -> Option<IncompleteReason> {
  match status {
    gl::FRAMEBUFFER_COMPLETE => None,
    gl::FRAMEBUFFER_UNDEFINED => Some(IncompleteReason::Undefined),
    gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => Some(IncompleteReason::IncompleteAttachment),
    gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => Some(IncompleteReason::MissingAttachment),
    gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => Some(IncompleteReason::IncompleteDrawBuffer),
    gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => Some(IncompleteReason::IncompleteReadBuffer),
    gl::FRAMEBUFFER_UNSUPPORTED => Some(IncompleteReason::Unsupported),
    gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => Some(IncompleteReason::IncompleteMultisample),
    gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => Some(IncompleteReason::IncompleteLayerTargets),
    _ => Some(IncompleteReason::Unknown(status)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn complete_status() {
    assert_eq!(incomplete_reason(gl::FRAMEBUFFER_COMPLETE), None);
  }

  #[test]
  fn incomplete_statuses() {
    assert_eq!(
      incomplete_reason(gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT),
      Some(IncompleteReason::MissingAttachment)
    );
    assert_eq!(
      incomplete_reason(gl::FRAMEBUFFER_UNSUPPORTED),
      Some(IncompleteReason::Unsupported)
    );
    assert_eq!(
      incomplete_reason(0x1234),
      Some(IncompleteReason::Unknown(0x1234))
    );
  }

  #[test]
  fn error_display() {
    let err = FramebufferError::from(IncompleteReason::IncompleteAttachment);
    assert_eq!(err.to_string(), "incomplete framebuffer: incomplete attachment");

    let err = FramebufferError::from(TextureError::TextureStorageCreationFailed(
      "empty texture size 0x600".to_owned(),
    ));
    assert_eq!(
      err.to_string(),
      "framebuffer texture error: texture storage creation failed: empty texture size 0x600"
    );
  }
}
