//! Transform feedback: the vertex shader computes square roots and its output is captured into a
//! buffer instead of being rasterized.
//!
//! The captured values and the number of primitives written, as counted by a query, are logged.
//! Press the main toggle to run the capture again with the next batch of inputs.

use crate::shared::log_warnings;
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use gltut::buffer::{Buffer, Target, Usage};
use gltut::framebuffer::Framebuffer;
use gltut::query::{Query, QueryKind};
use gltut::shader::{Program, ProgramBuilder, Stage, StageType, VaryingsMode};
use gltut::tess::{Mode, Tess, TessBuilder, TessError};
use gltut::transform_feedback::TransformFeedback;
use gltut::vertex::{VertexAttrib, VertexLayout};
use gltut::Context;

const BATCH_LEN: usize = 5;

/// Inputs of the `n`-th capture.
fn batch(n: usize) -> [f32; BATCH_LEN] {
  let mut values = [0.; BATCH_LEN];

  for (i, v) in values.iter_mut().enumerate() {
    *v = (n * BATCH_LEN + i + 1) as f32;
  }

  values
}

/// Local demo.
pub struct LocalDemo {
  program: Program,
  inputs: Tess<f32>,
  captured: Buffer<f32>,
  query: Query,
  feedback: TransformFeedback,
  batch: usize,
}

impl LocalDemo {
  fn capture(&mut self, ctx: &mut Context) -> Result<Vec<f32>, DemoError> {
    let values = batch(self.batch);
    self
      .inputs
      .vertices_mut()
      .ok_or(TessError::NoData)?
      .write(&values);

    self.program.use_program();

    let inputs = &self.inputs;
    {
      let _active = self.query.begin();
      self
        .feedback
        .capture(ctx, &mut self.captured, |_| inputs.render())?;
    }

    let written = self.query.result() as usize;
    let results = self.captured.read_back();

    log::info!("batch #{}: {} primitives written", self.batch, written);
    for (input, output) in values.iter().zip(&results).take(written) {
      log::info!("  sqrt({}) = {}", input, output);
    }

    Ok(results)
  }
}

impl Demo for LocalDemo {
  fn bootstrap(
    platform: &mut impl PlatformServices,
    ctx: &mut Context,
  ) -> Result<Self, DemoError> {
    let vs = platform.fetch_shader("transform_feedback.vert")?;
    let program = ProgramBuilder::new(Stage::new(ctx, StageType::VertexShader, &vs)?)
      .transform_feedback_varyings(["out_value"], VaryingsMode::Interleaved)
      .link(ctx)?;

    let layout = VertexLayout::interleaved([VertexAttrib::float("in_value", 1)]);
    let (inputs, warnings) = TessBuilder::new(&batch(0), &layout)
      .set_mode(Mode::Point)
      .set_usage(Usage::DynamicDraw)
      .build(ctx, &program)?;
    log_warnings(warnings);

    let captured = Buffer::new(ctx, Target::TransformFeedback, Usage::StaticRead, BATCH_LEN);
    let query = Query::new(ctx, QueryKind::TransformFeedbackPrimitivesWritten);

    let mut demo = LocalDemo {
      program,
      inputs,
      captured,
      query,
      feedback: TransformFeedback::new(Mode::Point),
      batch: 0,
    };

    demo.capture(ctx)?;

    Ok(demo)
  }

  fn render_frame(
    &mut self,
    _: f32,
    back_buffer: &Framebuffer,
    actions: impl Iterator<Item = InputAction>,
    ctx: &mut Context,
  ) -> Result<LoopFeedback, DemoError> {
    for action in actions {
      match action {
        InputAction::Quit => return Ok(LoopFeedback::Exit),

        InputAction::MainToggle => {
          self.batch += 1;
          self.capture(ctx)?;
        }

        _ => (),
      }
    }

    back_buffer.bind();
    ctx.clear([0., 0., 0., 1.], false);

    Ok(LoopFeedback::Continue)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn batches_follow_each_other() {
    assert_eq!(batch(0), [1., 2., 3., 4., 5.]);
    assert_eq!(batch(1), [6., 7., 8., 9., 10.]);
  }
}
