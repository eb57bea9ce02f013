//! [SDL2](https://crates.io/crates/sdl2) surface for [gltut](../gltut/index.html).
//!
//! Opens a window, creates an OpenGL core profile context on it, loads the OpenGL function
//! pointers and acquires the [`gltut::Context`] of the current thread.

#![deny(missing_docs)]

mod opt;

pub use gltut::state::StateQueryError;
use gltut::{framebuffer::Framebuffer, Context};
pub use opt::{WindowDim, WindowOpt};
pub use sdl2;
use sdl2::video::{FullscreenType, GLProfile, SwapInterval};
use std::error;
use std::fmt;
use std::os::raw::c_void;

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum Sdl2SurfaceError {
  /// Initialization of the surface went wrong.
  InitError(String),
  /// Window creation failed.
  WindowCreationFailed(sdl2::video::WindowBuildError),
  /// Failed to create an OpenGL context.
  GlContextInitFailed(String),
  /// No available video mode.
  VideoInitError(String),
  /// The event pump is unavailable.
  EventPumpError(String),
  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired.
  GraphicsStateError(StateQueryError),
}

impl fmt::Display for Sdl2SurfaceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      Sdl2SurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      Sdl2SurfaceError::WindowCreationFailed(ref e) => write!(f, "failed to create window: {}", e),
      Sdl2SurfaceError::GlContextInitFailed(ref e) => {
        write!(f, "failed to create OpenGL context: {}", e)
      }
      Sdl2SurfaceError::VideoInitError(ref e) => {
        write!(f, "failed to initialize video system: {}", e)
      }
      Sdl2SurfaceError::EventPumpError(ref e) => write!(f, "failed to get event pump: {}", e),
      Sdl2SurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
    }
  }
}

impl error::Error for Sdl2SurfaceError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      Sdl2SurfaceError::WindowCreationFailed(e) => Some(e),
      Sdl2SurfaceError::GraphicsStateError(e) => Some(e),
      _ => None,
    }
  }
}

/// An SDL2 window with an OpenGL core profile context.
///
/// ```ignore
/// use gltut_sdl2::{GL32Surface, WindowOpt};
///
/// let mut surface = GL32Surface::new("OpenGL", WindowOpt::default())
///     .expect("failed to create surface");
///
/// let back_buffer = surface.back_buffer();
/// ```
pub struct GL32Surface {
  sdl: sdl2::Sdl,
  _video: sdl2::VideoSubsystem,
  window: sdl2::video::Window,
  ctx: Context,
  // This needs to stay alive until we are done with OpenGL stuff.
  _gl_context: sdl2::video::GLContext,
}

impl GL32Surface {
  /// Open a centered window titled `title` and create its OpenGL context.
  pub fn new(title: &str, opt: WindowOpt) -> Result<Self, Sdl2SurfaceError> {
    let sdl = sdl2::init().map_err(Sdl2SurfaceError::InitError)?;
    let video = sdl.video().map_err(Sdl2SurfaceError::VideoInitError)?;

    {
      let gl_attr = video.gl_attr();
      let (major, minor) = opt.gl_version();

      gl_attr.set_context_profile(GLProfile::Core);
      gl_attr.set_context_flags().forward_compatible().set();
      gl_attr.set_context_version(major, minor);
      gl_attr.set_stencil_size(opt.stencil_bits());

      if let Some(samples) = opt.num_samples() {
        gl_attr.set_multisample_buffers(1);
        gl_attr.set_multisample_samples(samples.min(u8::MAX as u32) as u8);
      }
    }

    let (width, height) = opt.dim().requested_size();
    let mut builder = video.window(title, width, height);
    builder.position_centered().opengl();

    match opt.dim() {
      WindowDim::Windowed { .. } => (),
      WindowDim::Fullscreen { .. } => {
        builder.fullscreen();
      }
      WindowDim::FullscreenDesktop => {
        builder.fullscreen_desktop();
      }
    }

    let window = builder
      .build()
      .map_err(Sdl2SurfaceError::WindowCreationFailed)?;

    let _gl_context = window
      .gl_create_context()
      .map_err(Sdl2SurfaceError::GlContextInitFailed)?;

    gl::load_with(|s| video.gl_get_proc_address(s) as *const c_void);

    let interval = if opt.vsync() {
      SwapInterval::VSync
    } else {
      SwapInterval::Immediate
    };

    if let Err(e) = video.gl_set_swap_interval(interval) {
      log::warn!("cannot set swap interval: {}", e);
    }

    let ctx = Context::new().map_err(Sdl2SurfaceError::GraphicsStateError)?;

    log::info!(
      "OpenGL {} ({}, {}), GLSL {}",
      ctx.gl_version().unwrap_or_default(),
      ctx.vendor().unwrap_or_default(),
      ctx.renderer().unwrap_or_default(),
      ctx.glsl_version().unwrap_or_default(),
    );

    Ok(GL32Surface {
      sdl,
      _video: video,
      window,
      ctx,
      _gl_context,
    })
  }

  /// The entry point to most of the SDL2 API.
  pub fn sdl(&self) -> &sdl2::Sdl {
    &self.sdl
  }

  /// Borrow the underlying SDL2 window of this surface.
  pub fn window(&self) -> &sdl2::video::Window {
    &self.window
  }

  /// Mutably borrow the underlying SDL2 window of this surface.
  pub fn window_mut(&mut self) -> &mut sdl2::video::Window {
    &mut self.window
  }

  /// Graphics context.
  pub fn context(&mut self) -> &mut Context {
    &mut self.ctx
  }

  /// Event pump of the SDL2 context.
  ///
  /// Only one event pump can exist at a time.
  pub fn event_pump(&self) -> Result<sdl2::EventPump, Sdl2SurfaceError> {
    self.sdl.event_pump().map_err(Sdl2SurfaceError::EventPumpError)
  }

  /// Whether the window is currently fullscreen.
  pub fn is_fullscreen(&self) -> bool {
    self.window.fullscreen_state() != FullscreenType::Off
  }

  /// Size of the drawable area of the window, in pixels.
  pub fn drawable_size(&self) -> [u32; 2] {
    let (w, h) = self.window.drawable_size();
    [w, h]
  }

  /// Get the back buffer.
  pub fn back_buffer(&mut self) -> Framebuffer {
    let size = self.drawable_size();
    Framebuffer::back_buffer(&mut self.ctx, size)
  }

  /// Present the back buffer.
  pub fn swap_buffers(&self) {
    self.window.gl_swap_window();
  }
}
