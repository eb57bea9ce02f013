//! Multi-pass render pipeline.
//!
//! A [`RenderPipeline`] is an ordered list of [`RenderStep`]s run once per frame. Every step but
//! the last one renders into an offscreen framebuffer; the last one renders into the back buffer.
//! Each step can sample the color output of the step right before it.
//!
//! Two offscreen framebuffers are used in turn (ping-pong), so that a step never samples the
//! framebuffer it’s rendering into. A two-step pipeline only ever allocates one of them.

use crate::context::Context;
use crate::framebuffer::{Framebuffer, FramebufferError};
use crate::shader::ProgramError;
use crate::tess::TessError;
use crate::texture::{Sampler, Texture2D, TextureError};
use std::error;
use std::fmt;

/// One of the two offscreen framebuffers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Slot {
  /// Written by even steps.
  Ping,
  /// Written by odd steps.
  Pong,
}

impl Slot {
  fn index(self) -> usize {
    match self {
      Slot::Ping => 0,
      Slot::Pong => 1,
    }
  }
}

/// Where a pass renders.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Target {
  /// The back buffer.
  Screen,
  /// An offscreen framebuffer.
  Offscreen(Slot),
}

/// A scheduled run of a step.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Pass {
  /// Index of the step in the pipeline.
  pub step: usize,
  /// Offscreen framebuffer whose color is handed to the step, if any.
  pub input: Option<Slot>,
  /// Framebuffer the step renders into.
  pub output: Target,
}

/// Schedule `step_nb` steps.
///
/// Step `i` reads what step `i - 1` wrote and writes into the screen if it’s the last step,
/// or into the ping (even `i`) or pong (odd `i`) offscreen framebuffer otherwise.
pub fn schedule(step_nb: usize) -> Vec<Pass> {
  let mut input = None;

  (0..step_nb)
    .map(|step| {
      let output = if step + 1 == step_nb {
        Target::Screen
      } else if step % 2 == 0 {
        Target::Offscreen(Slot::Ping)
      } else {
        Target::Offscreen(Slot::Pong)
      };

      let pass = Pass {
        step,
        input,
        output,
      };

      input = match output {
        Target::Offscreen(slot) => Some(slot),
        Target::Screen => None,
      };

      pass
    })
    .collect()
}

/// Per-step framebuffer state, applied before the step runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineState {
  /// Color to clear the output with; `None` keeps its content.
  pub clear_color: Option<[f32; 4]>,
  /// Whether depth testing is enabled (depth is cleared along with the color).
  pub depth_test: bool,
}

impl Default for PipelineState {
  /// Defaults:
  ///
  /// - `clear_color` set to opaque black.
  /// - `depth_test` disabled.
  fn default() -> Self {
    PipelineState {
      clear_color: Some([0., 0., 0., 1.]),
      depth_test: false,
    }
  }
}

impl PipelineState {
  /// Set the clear color.
  pub fn set_clear_color(self, clear_color: impl Into<Option<[f32; 4]>>) -> Self {
    PipelineState {
      clear_color: clear_color.into(),
      ..self
    }
  }

  /// Enable or disable the depth test.
  pub fn enable_depth_test(self, depth_test: bool) -> Self {
    PipelineState { depth_test, ..self }
  }
}

/// Errors a step can fail with.
#[derive(Debug)]
pub enum StepError {
  /// Program error (typically at step creation).
  Program(ProgramError),
  /// Texture error.
  Texture(TextureError),
  /// Tessellation error.
  Tess(TessError),
  /// Anything else, described.
  Custom(String),
}

impl fmt::Display for StepError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StepError::Program(ref e) => write!(f, "program error: {}", e),
      StepError::Texture(ref e) => write!(f, "texture error: {}", e),
      StepError::Tess(ref e) => write!(f, "tessellation error: {}", e),
      StepError::Custom(ref e) => f.write_str(e),
    }
  }
}

impl error::Error for StepError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      StepError::Program(e) => Some(e),
      StepError::Texture(e) => Some(e),
      StepError::Tess(e) => Some(e),
      StepError::Custom(_) => None,
    }
  }
}

impl From<ProgramError> for StepError {
  fn from(e: ProgramError) -> Self {
    StepError::Program(e)
  }
}

impl From<TextureError> for StepError {
  fn from(e: TextureError) -> Self {
    StepError::Texture(e)
  }
}

impl From<TessError> for StepError {
  fn from(e: TessError) -> Self {
    StepError::Tess(e)
  }
}

/// Errors of [`RenderPipeline::render_frame`] and [`RenderPipeline::resize`].
#[derive(Debug)]
pub enum PipelineError {
  /// The pipeline has no step.
  Empty,
  /// An offscreen framebuffer could not be created.
  Framebuffer(FramebufferError),
  /// A step reading the previous step’s output is scheduled first.
  MissingInput(String),
  /// A step failed.
  StepFailed {
    /// Name of the step.
    step: String,
    /// What went wrong.
    error: StepError,
  },
}

impl fmt::Display for PipelineError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      PipelineError::Empty => f.write_str("render pipeline has no step"),

      PipelineError::Framebuffer(ref e) => write!(f, "render pipeline framebuffer error: {}", e),

      PipelineError::MissingInput(ref step) => {
        write!(f, "render step {} needs an input but runs first", step)
      }

      PipelineError::StepFailed { ref step, ref error } => {
        write!(f, "render step {} failed: {}", step, error)
      }
    }
  }
}

impl error::Error for PipelineError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      PipelineError::Framebuffer(e) => Some(e),
      PipelineError::StepFailed { error, .. } => Some(error),
      _ => None,
    }
  }
}

impl From<FramebufferError> for PipelineError {
  fn from(e: FramebufferError) -> Self {
    PipelineError::Framebuffer(e)
  }
}

/// What a step gets to render a frame.
#[derive(Debug)]
pub struct StepContext<'a> {
  ctx: &'a mut Context,
  input: Option<&'a Texture2D>,
  size: [u32; 2],
  time: f32,
}

impl<'a> StepContext<'a> {
  /// Graphics context.
  pub fn ctx(&mut self) -> &mut Context {
    self.ctx
  }

  /// Color output of the previous step.
  pub fn input(&self) -> Option<&'a Texture2D> {
    self.input
  }

  /// Size of the framebuffer being rendered into.
  pub fn size(&self) -> [u32; 2] {
    self.size
  }

  /// Time of the frame, in seconds.
  pub fn time(&self) -> f32 {
    self.time
  }
}

/// A render step.
pub trait RenderStep {
  /// Name of the step, used in logs and errors.
  fn name(&self) -> &str;

  /// Whether the step samples the previous step’s output.
  fn needs_input(&self) -> bool {
    false
  }

  /// State of the output framebuffer when the step starts.
  fn pipeline_state(&self) -> PipelineState {
    PipelineState::default()
  }

  /// The framebuffers were resized.
  fn resize(&mut self, _ctx: &mut Context, _size: [u32; 2]) -> Result<(), StepError> {
    Ok(())
  }

  /// Render a frame into the bound framebuffer.
  fn render(&mut self, frame: &mut StepContext) -> Result<(), StepError>;
}

/// Ordered render steps and the offscreen framebuffers linking them.
pub struct RenderPipeline {
  steps: Vec<Box<dyn RenderStep>>,
  passes: Vec<Pass>,
  offscreen: [Option<Framebuffer>; 2],
  sampler: Sampler,
  size: [u32; 2],
}

impl fmt::Debug for RenderPipeline {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("RenderPipeline")
      .field("steps", &self.step_names().collect::<Vec<_>>())
      .field("passes", &self.passes)
      .field("size", &self.size)
      .finish()
  }
}

impl RenderPipeline {
  /// Empty pipeline whose offscreen framebuffers are `size` large.
  pub fn new(size: [u32; 2]) -> Self {
    RenderPipeline {
      steps: Vec::new(),
      passes: Vec::new(),
      offscreen: [None, None],
      sampler: Sampler::default(),
      size,
    }
  }

  /// Sampler used for the offscreen color textures.
  pub fn set_sampler(mut self, sampler: Sampler) -> Self {
    self.sampler = sampler;
    self.offscreen = [None, None];
    self
  }

  /// Append a step.
  ///
  /// The first step has nothing to sample, so it's rejected with [`PipelineError::MissingInput`]
  /// if it needs an input.
  pub fn push(&mut self, step: impl RenderStep + 'static) -> Result<&mut Self, PipelineError> {
    if self.steps.is_empty() && step.needs_input() {
      return Err(PipelineError::MissingInput(step.name().to_owned()));
    }

    self.steps.push(Box::new(step));
    self.passes = schedule(self.steps.len());

    Ok(self)
  }

  /// Number of steps.
  pub fn len(&self) -> usize {
    self.steps.len()
  }

  /// Whether the pipeline has no step.
  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// Names of the steps, in order.
  pub fn step_names(&self) -> impl Iterator<Item = &str> {
    self.steps.iter().map(|step| step.name())
  }

  /// Scheduled passes.
  pub fn passes(&self) -> &[Pass] {
    &self.passes
  }

  /// Size of the offscreen framebuffers.
  pub fn size(&self) -> [u32; 2] {
    self.size
  }

  /// Resize the offscreen framebuffers and notify the steps.
  pub fn resize(&mut self, ctx: &mut Context, size: [u32; 2]) -> Result<(), PipelineError> {
    log::debug!("resizing render pipeline to {}x{}", size[0], size[1]);

    self.size = size;
    self.offscreen = [None, None];

    for step in &mut self.steps {
      step
        .resize(ctx, size)
        .map_err(|error| PipelineError::StepFailed {
          step: step.name().to_owned(),
          error,
        })?;
    }

    Ok(())
  }

  // Create the offscreen framebuffers the schedule writes to and that don’t exist yet.
  fn ensure_offscreen(&mut self, ctx: &mut Context) -> Result<(), FramebufferError> {
    for pass in &self.passes {
      if let Target::Offscreen(slot) = pass.output {
        let framebuffer = &mut self.offscreen[slot.index()];

        if framebuffer.is_none() {
          *framebuffer = Some(Framebuffer::new(ctx, self.size, &self.sampler)?);
        }
      }
    }

    Ok(())
  }

  /// Run every step once, the last one into `back_buffer`.
  pub fn render_frame(
    &mut self,
    ctx: &mut Context,
    back_buffer: &Framebuffer,
    time: f32,
  ) -> Result<(), PipelineError> {
    if self.steps.is_empty() {
      return Err(PipelineError::Empty);
    }

    self.ensure_offscreen(ctx)?;

    let offscreen = &self.offscreen;

    for pass in &self.passes {
      let step = &mut self.steps[pass.step];

      let output = match pass.output {
        Target::Screen => Some(back_buffer),
        Target::Offscreen(slot) => offscreen[slot.index()].as_ref(),
      };
      let output = output.ok_or_else(|| missing_framebuffer(step.name()))?;

      let input = pass
        .input
        .and_then(|slot| offscreen[slot.index()].as_ref())
        .and_then(Framebuffer::color_slot);

      output.bind();

      let state = step.pipeline_state();
      ctx.set_depth_test(state.depth_test);

      if let Some(color) = state.clear_color {
        ctx.clear(color, state.depth_test);
      }

      let mut frame = StepContext {
        ctx: &mut *ctx,
        input,
        size: output.size(),
        time,
      };

      step
        .render(&mut frame)
        .map_err(|error| PipelineError::StepFailed {
          step: step.name().to_owned(),
          error,
        })?;
    }

    Ok(())
  }
}

fn missing_framebuffer(step: &str) -> PipelineError {
  PipelineError::StepFailed {
    step: step.to_owned(),
    error: StepError::Custom("offscreen framebuffer not allocated".to_owned()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Named(&'static str);

  impl RenderStep for Named {
    fn name(&self) -> &str {
      self.0
    }

    fn render(&mut self, _: &mut StepContext) -> Result<(), StepError> {
      Ok(())
    }
  }

  #[test]
  fn empty_schedule() {
    assert!(schedule(0).is_empty());
  }

  #[test]
  fn single_step_renders_to_screen() {
    assert_eq!(
      schedule(1),
      vec![Pass {
        step: 0,
        input: None,
        output: Target::Screen
      }]
    );
  }

  #[test]
  fn two_steps_use_one_offscreen_framebuffer() {
    assert_eq!(
      schedule(2),
      vec![
        Pass {
          step: 0,
          input: None,
          output: Target::Offscreen(Slot::Ping)
        },
        Pass {
          step: 1,
          input: Some(Slot::Ping),
          output: Target::Screen
        },
      ]
    );
  }

  #[test]
  fn longer_pipelines_ping_pong() {
    let outputs: Vec<_> = schedule(4).into_iter().map(|p| (p.input, p.output)).collect();

    assert_eq!(
      outputs,
      vec![
        (None, Target::Offscreen(Slot::Ping)),
        (Some(Slot::Ping), Target::Offscreen(Slot::Pong)),
        (Some(Slot::Pong), Target::Offscreen(Slot::Ping)),
        (Some(Slot::Ping), Target::Screen),
      ]
    );
  }

  struct Sampling(&'static str);

  impl RenderStep for Sampling {
    fn name(&self) -> &str {
      self.0
    }

    fn needs_input(&self) -> bool {
      true
    }

    fn render(&mut self, _: &mut StepContext) -> Result<(), StepError> {
      Ok(())
    }
  }

  #[test]
  fn pushing_reschedules() {
    let mut pipeline = RenderPipeline::new([800, 600]);
    assert!(pipeline.is_empty());

    pipeline
      .push(Named("scene"))
      .unwrap()
      .push(Sampling("post"))
      .unwrap();

    assert_eq!(pipeline.len(), 2);
    assert_eq!(pipeline.step_names().collect::<Vec<_>>(), ["scene", "post"]);
    assert_eq!(pipeline.passes(), &schedule(2)[..]);
  }

  #[test]
  fn first_step_cannot_need_an_input() {
    let mut pipeline = RenderPipeline::new([800, 600]);

    match pipeline.push(Sampling("post")) {
      Err(PipelineError::MissingInput(step)) => assert_eq!(step, "post"),
      other => panic!("unexpected result: {:?}", other.map(|p| p.len())),
    }

    assert!(pipeline.is_empty());
    assert!(pipeline.passes().is_empty());
  }

  #[test]
  fn default_pipeline_state() {
    let state = PipelineState::default();
    assert_eq!(state.clear_color, Some([0., 0., 0., 1.]));
    assert!(!state.depth_test);

    let state = state.set_clear_color(None).enable_depth_test(true);
    assert_eq!(state.clear_color, None);
    assert!(state.depth_test);
  }

  #[test]
  fn step_failure_display() {
    let err = PipelineError::StepFailed {
      step: "blur".to_owned(),
      error: StepError::Custom("no input texture".to_owned()),
    };

    assert_eq!(err.to_string(), "render step blur failed: no input texture");
    assert_eq!(
      PipelineError::MissingInput("grade".to_owned()).to_string(),
      "render step grade needs an input but runs first"
    );
  }
}
