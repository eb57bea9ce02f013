mod platform;

use gltut_demos::{Demo, DemoError, InputAction, LoopFeedback};
use gltut_sdl2::{GL32Surface, Sdl2SurfaceError, WindowDim, WindowOpt};
use platform::DesktopPlatformServices;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::{Keycode, Mod};
use std::{error, fmt, path::PathBuf, process, time::Instant};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "gltut-demos", about = "Incremental OpenGL tutorial programs")]
pub struct CLIOpts {
  #[structopt(short, long)]
  /// Directory holding the shaders/ and textures/ directories.
  assets: Option<PathBuf>,

  #[structopt(short, long)]
  /// List available demos.
  list_demos: bool,

  #[structopt(short, long)]
  /// Open the window in fullscreen, at the desktop resolution.
  fullscreen: bool,

  #[structopt(long, default_value = "800")]
  /// Width of the window.
  width: u32,

  #[structopt(long, default_value = "600")]
  /// Height of the window.
  height: u32,

  /// Demo to run.
  demo: Option<String>,
}

impl CLIOpts {
  fn assets_root(&self) -> PathBuf {
    self
      .assets
      .clone()
      .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets"))
  }

  fn window_dim(&self) -> WindowDim {
    if self.fullscreen {
      WindowDim::FullscreenDesktop
    } else {
      WindowDim::Windowed {
        width: self.width,
        height: self.height,
      }
    }
  }
}

/// Errors that end a demo run.
#[derive(Debug)]
enum RunError {
  Surface(Sdl2SurfaceError),
  Demo(DemoError),
}

impl fmt::Display for RunError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      RunError::Surface(ref e) => write!(f, "cannot create surface: {}", e),
      RunError::Demo(ref e) => write!(f, "{}", e),
    }
  }
}

impl error::Error for RunError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      RunError::Surface(e) => Some(e),
      RunError::Demo(e) => Some(e),
    }
  }
}

impl From<Sdl2SurfaceError> for RunError {
  fn from(e: Sdl2SurfaceError) -> Self {
    RunError::Surface(e)
  }
}

impl From<DemoError> for RunError {
  fn from(e: DemoError) -> Self {
    RunError::Demo(e)
  }
}

/// Macro to declaratively add demos.
macro_rules! demos {
  ($($name:literal, $module:ident),* $(,)?) => {
    fn show_available_demos() {
      println!("available demos:");
      for name in demo_names() {
        println!("  - {}", name);
      }
    }

    fn demo_names() -> &'static [&'static str] {
      &[$($name),*]
    }

    // run a demo based on its name
    fn pick_and_run_demo(cli_opts: &CLIOpts) -> Result<(), RunError> {
      match cli_opts.demo.as_deref() {
        $(
          Some($name) => run_demo::<gltut_demos::$module::LocalDemo>(cli_opts, $name),
        )*

        _ => {
          log::error!("no demo found");
          show_available_demos();
          Ok(())
        }
      }
    }
  }
}

// Run a demo until it exits or fails.
fn run_demo<D>(cli_opts: &CLIOpts, name: &str) -> Result<(), RunError>
where
  D: Demo,
{
  let mut platform = DesktopPlatformServices::new(cli_opts.assets_root());
  log::info!("running {} with assets from {}", name, platform.root().display());

  let opt = WindowOpt::default().set_dim(cli_opts.window_dim());
  let mut surface = GL32Surface::new("OpenGL", opt)?;
  let mut event_pump = surface.event_pump()?;

  let mut demo = D::bootstrap(&mut platform, surface.context())?;
  let start_t = Instant::now();

  // the first frame gets the actual framebuffer size, which may differ from the requested one
  let [width, height] = surface.drawable_size();
  let mut pending = vec![InputAction::Resized { width, height }];

  loop {
    let fullscreen = surface.is_fullscreen();
    let drawable_size = surface.drawable_size();

    pending.extend(
      event_pump
        .poll_iter()
        .filter_map(|event| adapt_event(&event, fullscreen, drawable_size)),
    );

    let back_buffer = surface.back_buffer();
    let t = start_t.elapsed().as_secs_f32();
    let feedback = demo.render_frame(t, &back_buffer, pending.drain(..), surface.context())?;

    if feedback == LoopFeedback::Exit {
      log::info!("exiting {}", name);
      return Ok(());
    }

    surface.swap_buffers();
  }
}

/// Turn an SDL event into a demo action.
///
/// Escape only quits in fullscreen, where there is no window decoration to close. Resizes report
/// the drawable size, in pixels.
fn adapt_event(event: &Event, fullscreen: bool, drawable_size: [u32; 2]) -> Option<InputAction> {
  match *event {
    Event::Quit { .. } => Some(InputAction::Quit),

    Event::KeyUp {
      keycode: Some(Keycode::Escape),
      ..
    } if fullscreen => Some(InputAction::Quit),

    Event::KeyUp {
      keycode: Some(Keycode::Space),
      keymod,
      ..
    } => {
      let shift = Mod::LSHIFTMOD | Mod::RSHIFTMOD;

      if keymod.intersects(shift) {
        Some(InputAction::AuxiliaryToggle)
      } else {
        Some(InputAction::MainToggle)
      }
    }

    Event::Window {
      win_event: WindowEvent::SizeChanged(..),
      ..
    } => Some(InputAction::Resized {
      width: drawable_size[0],
      height: drawable_size[1],
    }),

    _ => None,
  }
}

demos! {
  "triangle", triangle,
  "elements", elements,
  "texture", texture,
  "transform", transform,
  "transform-feedback", transform_feedback,
  "geometry-shader", geometry_shader,
  "framebuffer", framebuffer,
  "render-pipeline", render_pipeline,
}

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  if cli_opts.list_demos {
    show_available_demos();
  } else if let Err(e) = pick_and_run_demo(&cli_opts) {
    log::error!("{}", e);
    process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key_up(keycode: Keycode, keymod: Mod) -> Event {
    Event::KeyUp {
      timestamp: 0,
      window_id: 1,
      keycode: Some(keycode),
      scancode: None,
      keymod,
      repeat: false,
    }
  }

  const SIZE: [u32; 2] = [1600, 1200];

  #[test]
  fn window_close_quits() {
    assert_eq!(
      adapt_event(&Event::Quit { timestamp: 0 }, false, SIZE),
      Some(InputAction::Quit)
    );
  }

  #[test]
  fn escape_only_quits_in_fullscreen() {
    let escape = key_up(Keycode::Escape, Mod::NOMOD);

    assert_eq!(adapt_event(&escape, false, SIZE), None);
    assert_eq!(adapt_event(&escape, true, SIZE), Some(InputAction::Quit));
  }

  #[test]
  fn space_toggles() {
    assert_eq!(
      adapt_event(&key_up(Keycode::Space, Mod::NOMOD), false, SIZE),
      Some(InputAction::MainToggle)
    );
    assert_eq!(
      adapt_event(&key_up(Keycode::Space, Mod::LSHIFTMOD), false, SIZE),
      Some(InputAction::AuxiliaryToggle)
    );
  }

  #[test]
  fn resizes_report_the_drawable_size() {
    let event = Event::Window {
      timestamp: 0,
      window_id: 1,
      win_event: WindowEvent::SizeChanged(800, 600),
    };

    assert_eq!(
      adapt_event(&event, false, SIZE),
      Some(InputAction::Resized {
        width: 1600,
        height: 1200
      })
    );
  }

  #[test]
  fn cli_defaults() {
    let opts = CLIOpts::from_iter(&["gltut-demos", "triangle"]);

    assert_eq!(opts.demo.as_deref(), Some("triangle"));
    assert_eq!(
      opts.window_dim(),
      WindowDim::Windowed {
        width: 800,
        height: 600
      }
    );
    assert!(opts.assets_root().ends_with("assets"));
  }

  #[test]
  fn cli_fullscreen_and_assets() {
    let opts = CLIOpts::from_iter(&["gltut-demos", "-f", "-a", "/tmp/assets", "render-pipeline"]);

    assert_eq!(opts.window_dim(), WindowDim::FullscreenDesktop);
    assert_eq!(opts.assets_root(), PathBuf::from("/tmp/assets"));
  }

  #[test]
  fn demo_names_are_unique() {
    let mut names = demo_names().to_vec();
    names.sort_unstable();
    names.dedup();

    assert_eq!(names.len(), demo_names().len());
  }
}
