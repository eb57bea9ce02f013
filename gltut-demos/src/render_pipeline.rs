//! Multi-pass rendering with a [`RenderPipeline`].
//!
//! The spinning quad is rendered offscreen, blurred, then color graded onto the screen. Each step
//! samples what the previous one rendered.
//!
//! Press the main toggle to switch the sepia grading on and off, and the auxiliary toggle to
//! remove or add back the blur step.

use crate::shared::{fullscreen_quad, textured_quad, TexturedVertex};
use crate::texture::PIXEL_SAMPLER;
use crate::transform::{projection_matrix, view_matrix};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use cgmath::{Matrix4, Rad};
use gltut::framebuffer::Framebuffer;
use gltut::pipeline::{PipelineState, RenderPipeline, RenderStep, StepContext, StepError};
use gltut::shader::{Program, Uniform};
use gltut::tess::Tess;
use gltut::texture::Texture2D;
use gltut::Context;
use std::cell::Cell;
use std::rc::Rc;

/// Assets the steps are built from, kept around to rebuild the pipeline.
struct Assets {
  scene_vs: String,
  scene_fs: String,
  fullscreen_vs: String,
  blur_fs: String,
  grade_fs: String,
  texture: image::RgbaImage,
}

impl Assets {
  fn fetch(platform: &mut impl PlatformServices) -> Result<Self, DemoError> {
    Ok(Assets {
      scene_vs: platform.fetch_shader("transform.vert")?,
      scene_fs: platform.fetch_shader("texture.frag")?,
      fullscreen_vs: platform.fetch_shader("fullscreen.vert")?,
      blur_fs: platform.fetch_shader("blur.frag")?,
      grade_fs: platform.fetch_shader("grade.frag")?,
      texture: platform.fetch_texture("checker.ppm")?,
    })
  }
}

struct SceneStep {
  program: Program,
  model: Uniform<Matrix4<f32>>,
  view: Uniform<Matrix4<f32>>,
  projection: Uniform<Matrix4<f32>>,
  quad: Tess<TexturedVertex>,
  texture: Texture2D,
}

impl SceneStep {
  fn new(ctx: &mut Context, assets: &Assets) -> Result<Self, DemoError> {
    let program = Program::from_strings(ctx, &assets.scene_vs, None, &assets.scene_fs)?;
    let quad = textured_quad(ctx, &program)?;
    let texture = Texture2D::from_image(ctx, &assets.texture, &PIXEL_SAMPLER)?;

    program.set(&program.uniform_or_unbound("tex_checker"), 0i32);
    program.set(&program.uniform_or_unbound("tex_stripes"), 0i32);
    program.set(&program.uniform_or_unbound("mix_factor"), 0f32);

    Ok(SceneStep {
      model: program.uniform_or_unbound("model"),
      view: program.uniform_or_unbound("view"),
      projection: program.uniform_or_unbound("projection"),
      program,
      quad,
      texture,
    })
  }
}

impl RenderStep for SceneStep {
  fn name(&self) -> &str {
    "scene"
  }

  fn pipeline_state(&self) -> PipelineState {
    PipelineState::default()
      .set_clear_color([0.1, 0.1, 0.1, 1.])
      .enable_depth_test(true)
  }

  fn render(&mut self, frame: &mut StepContext) -> Result<(), StepError> {
    self.texture.bind(0);

    let program = &self.program;
    program.set(&self.model, Matrix4::from_angle_z(Rad(frame.time())));
    program.set(&self.view, view_matrix());
    program.set(&self.projection, projection_matrix(frame.size()));
    self.quad.render();

    Ok(())
  }
}

/// A full-screen pass sampling the previous step’s output on unit 0.
///
/// `texel_size` is only set when the fragment shader uses it.
struct PostStep {
  name: &'static str,
  program: Program,
  texel_size: Option<Uniform<[f32; 2]>>,
  sepia: Option<(Uniform<bool>, Rc<Cell<bool>>)>,
  fullscreen: Tess<()>,
}

impl PostStep {
  fn new(
    ctx: &mut Context,
    name: &'static str,
    vertex: &str,
    fragment: &str,
  ) -> Result<Self, DemoError> {
    let program = Program::from_strings(ctx, vertex, None, fragment)?;
    let fullscreen = fullscreen_quad(ctx, &program)?;

    program.set(&program.uniform_or_unbound("source"), 0i32);

    Ok(PostStep {
      name,
      texel_size: program.uniform("texel_size").ok(),
      program,
      sepia: None,
      fullscreen,
    })
  }

  fn with_sepia(mut self, sepia: Rc<Cell<bool>>) -> Self {
    self.sepia = Some((self.program.uniform_or_unbound("sepia"), sepia));
    self
  }
}

impl RenderStep for PostStep {
  fn name(&self) -> &str {
    self.name
  }

  fn needs_input(&self) -> bool {
    true
  }

  fn render(&mut self, frame: &mut StepContext) -> Result<(), StepError> {
    let input = frame
      .input()
      .ok_or_else(|| StepError::Custom(format!("{} has nothing to sample", self.name)))?;
    input.bind(0);

    if let Some(ref texel_size) = self.texel_size {
      let [w, h] = input.size();
      self
        .program
        .set(texel_size, [1. / w.max(1) as f32, 1. / h.max(1) as f32]);
    }

    if let Some((ref uniform, ref enabled)) = self.sepia {
      self.program.set(uniform, enabled.get());
    }

    self.fullscreen.render();

    Ok(())
  }
}

fn build_pipeline(
  ctx: &mut Context,
  assets: &Assets,
  size: [u32; 2],
  blur: bool,
  sepia: &Rc<Cell<bool>>,
) -> Result<RenderPipeline, DemoError> {
  let mut pipeline = RenderPipeline::new(size);

  pipeline.push(SceneStep::new(ctx, assets)?)?;

  if blur {
    pipeline.push(PostStep::new(
      ctx,
      "blur",
      &assets.fullscreen_vs,
      &assets.blur_fs,
    )?)?;
  }

  pipeline.push(
    PostStep::new(ctx, "grade", &assets.fullscreen_vs, &assets.grade_fs)?
      .with_sepia(sepia.clone()),
  )?;

  log::info!(
    "render pipeline: {}",
    pipeline.step_names().collect::<Vec<_>>().join(" -> ")
  );

  Ok(pipeline)
}

/// Local demo.
pub struct LocalDemo {
  assets: Assets,
  pipeline: RenderPipeline,
  blur: bool,
  sepia: Rc<Cell<bool>>,
}

impl Demo for LocalDemo {
  fn bootstrap(
    platform: &mut impl PlatformServices,
    ctx: &mut Context,
  ) -> Result<Self, DemoError> {
    let assets = Assets::fetch(platform)?;
    let sepia = Rc::new(Cell::new(false));
    let pipeline = build_pipeline(ctx, &assets, [800, 600], true, &sepia)?;

    Ok(LocalDemo {
      assets,
      pipeline,
      blur: true,
      sepia,
    })
  }

  fn render_frame(
    &mut self,
    t: f32,
    back_buffer: &Framebuffer,
    actions: impl Iterator<Item = InputAction>,
    ctx: &mut Context,
  ) -> Result<LoopFeedback, DemoError> {
    for action in actions {
      match action {
        InputAction::Quit => return Ok(LoopFeedback::Exit),

        InputAction::MainToggle => self.sepia.set(!self.sepia.get()),

        InputAction::AuxiliaryToggle => {
          self.blur = !self.blur;
          let size = self.pipeline.size();
          self.pipeline = build_pipeline(ctx, &self.assets, size, self.blur, &self.sepia)?;
        }

        InputAction::Resized { width, height } => {
          self.pipeline.resize(ctx, [width, height])?;
        }
      }
    }

    self.pipeline.render_frame(ctx, back_buffer, t)?;

    Ok(LoopFeedback::Continue)
  }
}
