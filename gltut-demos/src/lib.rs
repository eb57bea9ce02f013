//! gltut demos.
//!
//! A set of small OpenGL programs, each one introducing a single feature on top of the previous
//! ones: drawing a triangle, element buffers, textures, transformations, transform feedback,
//! geometry shaders, framebuffers and finally a multi-pass render pipeline.
//!
//! # Demo architecture
//!
//! Demos are simple modules exposed from this crate. They do not depend on windowing concepts,
//! such as system events: whenever a demo requires user interaction, it gets an [`InputAction`]
//! from the runner. Shader sources and textures are fetched through [`PlatformServices`], so that
//! the runner decides where assets live.
//!
//! Demos are responsible for allocating their GPU resources in [`Demo::bootstrap`] and for
//! rendering a single frame in [`Demo::render_frame`].

use gltut::framebuffer::{Framebuffer, FramebufferError};
use gltut::pipeline::PipelineError;
use gltut::shader::{ProgramError, StageError};
use gltut::tess::TessError;
use gltut::texture::TextureError;
use gltut::transform_feedback::TransformFeedbackError;
use gltut::Context;
use std::error;
use std::fmt;

pub mod elements;
pub mod framebuffer;
pub mod geometry_shader;
pub mod render_pipeline;
mod shared;
pub mod texture;
pub mod transform;
pub mod transform_feedback;
pub mod triangle;

/// Demo interface.
pub trait Demo: Sized {
  /// Bootstrap the demo.
  fn bootstrap(
    platform: &mut impl PlatformServices,
    ctx: &mut Context,
  ) -> Result<Self, DemoError>;

  /// Render a frame of the demo.
  fn render_frame(
    &mut self,
    time: f32,
    back_buffer: &Framebuffer,
    actions: impl Iterator<Item = InputAction>,
    ctx: &mut Context,
  ) -> Result<LoopFeedback, DemoError>;
}

/// A type used to pass “inputs” to demos.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum InputAction {
  /// Quit the application.
  Quit,

  /// Main action. Typically used to switch an effect on and off or to cycle through it.
  MainToggle,

  /// Auxiliary action. Often used to toggle smaller parts of a bigger effect.
  AuxiliaryToggle,

  /// Framebuffer size changed.
  Resized {
    /// New width, in pixels.
    width: u32,
    /// New height, in pixels.
    height: u32,
  },
}

/// What the runner should do after a frame.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum LoopFeedback {
  /// Keep running.
  Continue,
  /// Stop the demo.
  Exit,
}

/// Asset access, provided by the runner.
pub trait PlatformServices {
  /// Source of the shader `name`.
  fn fetch_shader(&mut self, name: &str) -> Result<String, StageError>;

  /// Texture `name`, with its first row at the bottom.
  fn fetch_texture(&mut self, name: &str) -> Result<image::RgbaImage, TextureError>;
}

/// Errors a demo can fail with.
#[derive(Debug)]
pub enum DemoError {
  /// A shader stage couldn’t be fetched or compiled.
  Stage(StageError),
  /// A program couldn’t be linked.
  Program(ProgramError),
  /// A tessellation couldn’t be built.
  Tess(TessError),
  /// A texture couldn’t be fetched or created.
  Texture(TextureError),
  /// A framebuffer couldn’t be created.
  Framebuffer(FramebufferError),
  /// Transform feedback couldn’t be captured.
  TransformFeedback(TransformFeedbackError),
  /// The render pipeline failed.
  Pipeline(PipelineError),
}

impl fmt::Display for DemoError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      DemoError::Stage(ref e) => write!(f, "shader stage error: {}", e),
      DemoError::Program(ref e) => write!(f, "program error: {}", e),
      DemoError::Tess(ref e) => write!(f, "tessellation error: {}", e),
      DemoError::Texture(ref e) => write!(f, "texture error: {}", e),
      DemoError::Framebuffer(ref e) => write!(f, "framebuffer error: {}", e),
      DemoError::TransformFeedback(ref e) => write!(f, "transform feedback error: {}", e),
      DemoError::Pipeline(ref e) => write!(f, "render pipeline error: {}", e),
    }
  }
}

impl error::Error for DemoError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      DemoError::Stage(e) => Some(e),
      DemoError::Program(e) => Some(e),
      DemoError::Tess(e) => Some(e),
      DemoError::Texture(e) => Some(e),
      DemoError::Framebuffer(e) => Some(e),
      DemoError::TransformFeedback(e) => Some(e),
      DemoError::Pipeline(e) => Some(e),
    }
  }
}

impl From<StageError> for DemoError {
  fn from(e: StageError) -> Self {
    DemoError::Stage(e)
  }
}

impl From<ProgramError> for DemoError {
  fn from(e: ProgramError) -> Self {
    DemoError::Program(e)
  }
}

impl From<TessError> for DemoError {
  fn from(e: TessError) -> Self {
    DemoError::Tess(e)
  }
}

impl From<TextureError> for DemoError {
  fn from(e: TextureError) -> Self {
    DemoError::Texture(e)
  }
}

impl From<FramebufferError> for DemoError {
  fn from(e: FramebufferError) -> Self {
    DemoError::Framebuffer(e)
  }
}

impl From<TransformFeedbackError> for DemoError {
  fn from(e: TransformFeedbackError) -> Self {
    DemoError::TransformFeedback(e)
  }
}

impl From<PipelineError> for DemoError {
  fn from(e: PipelineError) -> Self {
    DemoError::Pipeline(e)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::error::Error as _;
  use std::path::PathBuf;

  #[test]
  fn demo_errors_keep_their_source() {
    let stage = StageError::SourceUnavailable(
      PathBuf::from("shaders/missing.vert"),
      "no such file".to_owned(),
    );
    let e = DemoError::from(stage);

    assert!(e.to_string().starts_with("shader stage error: "));
    assert!(e.source().is_some());
  }

  #[test]
  fn pipeline_errors_convert() {
    let e: DemoError = PipelineError::Empty.into();
    assert_eq!(e.to_string(), "render pipeline error: render pipeline has no step");
  }
}
