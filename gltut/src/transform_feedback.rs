//! Transform feedback.
//!
//! Capture the outputs of the vertex (or geometry) stage into a buffer instead of (or on top of)
//! rasterizing them. The captured varyings must be declared on the program before linking, see
//! [`ProgramBuilder::transform_feedback_varyings`](crate::shader::ProgramBuilder::transform_feedback_varyings).

use crate::buffer::{Buffer, Target};
use crate::context::Context;
use crate::tess::Mode;
use gl::types::*;
use std::error;
use std::fmt;

/// Errors that can occur while capturing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransformFeedbackError {
  /// The capture buffer was not created for transform feedback.
  WrongTarget(Target),
}

impl fmt::Display for TransformFeedbackError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      TransformFeedbackError::WrongTarget(target) => {
        write!(f, "cannot capture transform feedback into buffer target: {}", target)
      }
    }
  }
}

impl error::Error for TransformFeedbackError {}

/// Primitive mode to pass to `glBeginTransformFeedback`.
///
/// Transform feedback only captures points, lines or triangles: strips and fans are decomposed by
/// the driver into their base primitive.
pub fn capture_mode(mode: Mode) -> GLenum {
  match mode {
    Mode::Point => gl::POINTS,
    Mode::Line | Mode::LineStrip => gl::LINES,
    Mode::Triangle | Mode::TriangleStrip | Mode::TriangleFan => gl::TRIANGLES,
  }
}

/// Capture configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TransformFeedback {
  mode: Mode,
  discard_rasterizer: bool,
}

impl TransformFeedback {
  /// Capture primitives of `mode`, rasterization discarded.
  pub fn new(mode: Mode) -> Self {
    TransformFeedback {
      mode,
      discard_rasterizer: true,
    }
  }

  /// Keep rasterizing while capturing.
  pub fn keep_rasterizer(self) -> Self {
    TransformFeedback {
      discard_rasterizer: false,
      ..self
    }
  }

  /// Primitive mode being captured.
  pub fn mode(&self) -> Mode {
    self.mode
  }

  /// Run `f` with `buffer` bound as capture buffer; draw calls issued in `f` are captured.
  ///
  /// The rasterizer discard state is restored afterwards.
  pub fn capture<T, F, A>(
    &self,
    ctx: &mut Context,
    buffer: &mut Buffer<T>,
    f: F,
  ) -> Result<A, TransformFeedbackError>
  where
    T: Copy,
    F: FnOnce(&mut Context) -> A,
  {
    if buffer.target() != Target::TransformFeedback {
      return Err(TransformFeedbackError::WrongTarget(buffer.target()));
    }

    let primitive = capture_mode(self.mode);
    let was_discarded = ctx.state.borrow().is_rasterizer_discarded();

    unsafe {
      ctx
        .state
        .borrow_mut()
        .set_rasterizer_discard(self.discard_rasterizer);
      gl::BindBufferBase(gl::TRANSFORM_FEEDBACK_BUFFER, 0, buffer.handle());
      gl::BeginTransformFeedback(primitive);
    }

    let a = f(ctx);

    unsafe {
      gl::EndTransformFeedback();
      gl::BindBufferBase(gl::TRANSFORM_FEEDBACK_BUFFER, 0, 0);
      ctx.state.borrow_mut().set_rasterizer_discard(was_discarded);
    }

    Ok(a)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn capture_modes() {
    assert_eq!(capture_mode(Mode::Point), gl::POINTS);
    assert_eq!(capture_mode(Mode::LineStrip), gl::LINES);
    assert_eq!(capture_mode(Mode::TriangleFan), gl::TRIANGLES);
  }

  #[test]
  fn rasterizer_is_discarded_by_default() {
    let tf = TransformFeedback::new(Mode::Point);
    assert!(tf.discard_rasterizer);
    assert!(!tf.keep_rasterizer().discard_rasterizer);
  }

  #[test]
  fn wrong_target_display() {
    assert_eq!(
      TransformFeedbackError::WrongTarget(Target::Array).to_string(),
      "cannot capture transform feedback into buffer target: array buffer"
    );
  }
}
