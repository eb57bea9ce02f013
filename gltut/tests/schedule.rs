use gltut::framebuffer::Framebuffer;
use gltut::pipeline::{
  schedule, PipelineError, RenderPipeline, RenderStep, Slot, StepContext, StepError, Target,
};
use gltut::Context;

#[test]
fn last_pass_always_renders_to_screen() {
  for n in 1..16 {
    let passes = schedule(n);

    assert_eq!(passes.len(), n);
    assert_eq!(passes.last().map(|p| p.output), Some(Target::Screen));
    assert!(passes[..n - 1].iter().all(|p| p.output != Target::Screen));
  }
}

#[test]
fn steps_run_in_order() {
  let passes = schedule(9);
  let steps: Vec<_> = passes.iter().map(|p| p.step).collect();

  assert_eq!(steps, (0..9).collect::<Vec<_>>());
}

#[test]
fn each_pass_reads_what_the_previous_one_wrote() {
  for n in 1..16 {
    let passes = schedule(n);

    assert_eq!(passes[0].input, None);

    for w in passes.windows(2) {
      assert_eq!(Some(w[0].output), w[1].input.map(Target::Offscreen));
    }
  }
}

#[test]
fn no_pass_samples_its_own_output() {
  for n in 1..16 {
    for pass in schedule(n) {
      if let Some(slot) = pass.input {
        assert_ne!(pass.output, Target::Offscreen(slot));
      }
    }
  }
}

#[test]
fn only_long_pipelines_need_the_pong_framebuffer() {
  let uses_pong = |n| {
    schedule(n)
      .iter()
      .any(|p| p.output == Target::Offscreen(Slot::Pong))
  };

  assert!(!uses_pong(1));
  assert!(!uses_pong(2));
  assert!(uses_pong(3));
}

struct Post;

impl RenderStep for Post {
  fn name(&self) -> &str {
    "post"
  }

  fn needs_input(&self) -> bool {
    true
  }

  fn render(&mut self, _: &mut StepContext) -> Result<(), StepError> {
    Ok(())
  }
}

#[test]
fn rendering_an_empty_pipeline_fails() {
  let mut ctx = Context::new().unwrap();
  let back_buffer = Framebuffer::back_buffer(&mut ctx, [800, 600]);
  let mut pipeline = RenderPipeline::new([800, 600]);

  match pipeline.render_frame(&mut ctx, &back_buffer, 0.) {
    Err(PipelineError::Empty) => (),
    other => panic!("unexpected result: {:?}", other),
  }
}

#[test]
fn sampling_step_cannot_run_first() {
  let mut ctx = Context::new().unwrap();
  let back_buffer = Framebuffer::back_buffer(&mut ctx, [800, 600]);
  let mut pipeline = RenderPipeline::new([800, 600]);

  let err = pipeline.push(Post).err().unwrap();
  assert_eq!(
    err.to_string(),
    "render step post needs an input but runs first"
  );

  // nothing was pushed, so there is still nothing to render
  match pipeline.render_frame(&mut ctx, &back_buffer, 0.) {
    Err(PipelineError::Empty) => (),
    other => panic!("unexpected result: {:?}", other),
  }
}
