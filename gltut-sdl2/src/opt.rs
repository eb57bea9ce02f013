//! Window options.

/// Dimension metrics.
///
///   - `Windowed { width, height }` opens in windowed mode with the wished resolution.
///   - `Fullscreen { width, height }` switches the display mode to the wished resolution.
///   - `FullscreenDesktop` opens in fullscreen mode by using the desktop resolution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowDim {
  /// Windowed mode.
  Windowed {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
  /// Fullscreen mode with a display mode change.
  Fullscreen {
    /// Width of the display mode.
    width: u32,
    /// Height of the display mode.
    height: u32,
  },
  /// Fullscreen mode (adapt to your screen).
  FullscreenDesktop,
}

impl WindowDim {
  /// Whether this dimension puts the window in fullscreen.
  pub fn is_fullscreen(&self) -> bool {
    !matches!(self, WindowDim::Windowed { .. })
  }

  /// Size to create the window with.
  ///
  /// The desktop fullscreen mode ignores it; SDL still wants a non-zero size.
  pub fn requested_size(&self) -> (u32, u32) {
    match *self {
      WindowDim::Windowed { width, height } | WindowDim::Fullscreen { width, height } => {
        (width.max(1), height.max(1))
      }
      WindowDim::FullscreenDesktop => (1, 1),
    }
  }
}

/// Different window options.
///
/// Feel free to look at the different methods available to tweak the options. You may want to
/// start with `default()` though.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowOpt {
  dim: WindowDim,
  vsync: bool,
  num_samples: Option<u32>,
  stencil_bits: u8,
  gl_version: (u8, u8),
}

impl Default for WindowOpt {
  /// Defaults:
  ///
  /// - `dim` set to an 800×600 window.
  /// - `vsync` enabled.
  /// - `num_samples` set to `None`.
  /// - `stencil_bits` set to `8`.
  /// - `gl_version` set to `3.2` (core profile).
  fn default() -> Self {
    WindowOpt {
      dim: WindowDim::Windowed {
        width: 800,
        height: 600,
      },
      vsync: true,
      num_samples: None,
      stencil_bits: 8,
      gl_version: (3, 2),
    }
  }
}

impl WindowOpt {
  /// Set the dimension of the window.
  #[inline]
  pub fn set_dim(self, dim: WindowDim) -> Self {
    WindowOpt { dim, ..self }
  }

  /// Get the dimension of the window.
  #[inline]
  pub fn dim(&self) -> WindowDim {
    self.dim
  }

  /// Enable or disable vertical synchronization.
  #[inline]
  pub fn set_vsync(self, vsync: bool) -> Self {
    WindowOpt { vsync, ..self }
  }

  /// Whether vertical synchronization is asked for.
  #[inline]
  pub fn vsync(&self) -> bool {
    self.vsync
  }

  /// Set the number of samples to use for multisampling.
  ///
  /// Pass `None` to disable multisampling.
  #[inline]
  pub fn set_num_samples<S>(self, samples: S) -> Self
  where
    S: Into<Option<u32>>,
  {
    WindowOpt {
      num_samples: samples.into(),
      ..self
    }
  }

  /// Get the number of samples to use in multisampling, if any.
  #[inline]
  pub fn num_samples(&self) -> Option<u32> {
    self.num_samples
  }

  /// Set the number of bits of the stencil buffer.
  #[inline]
  pub fn set_stencil_bits(self, stencil_bits: u8) -> Self {
    WindowOpt {
      stencil_bits,
      ..self
    }
  }

  /// Number of bits of the stencil buffer.
  #[inline]
  pub fn stencil_bits(&self) -> u8 {
    self.stencil_bits
  }

  /// Set the OpenGL core profile version to ask for.
  ///
  /// Versions older than 3.2 have no core profile and are raised to 3.2.
  #[inline]
  pub fn set_gl_version(self, major: u8, minor: u8) -> Self {
    WindowOpt {
      gl_version: (major, minor).max((3, 2)),
      ..self
    }
  }

  /// OpenGL core profile version.
  #[inline]
  pub fn gl_version(&self) -> (u8, u8) {
    self.gl_version
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_the_tutorial_window() {
    let opt = WindowOpt::default();

    assert_eq!(
      opt.dim(),
      WindowDim::Windowed {
        width: 800,
        height: 600
      }
    );
    assert_eq!(opt.stencil_bits(), 8);
    assert_eq!(opt.gl_version(), (3, 2));
    assert_eq!(opt.num_samples(), None);
    assert!(opt.vsync());
  }

  #[test]
  fn builder_setters() {
    let opt = WindowOpt::default()
      .set_dim(WindowDim::FullscreenDesktop)
      .set_num_samples(4)
      .set_vsync(false)
      .set_gl_version(4, 1);

    assert!(opt.dim().is_fullscreen());
    assert_eq!(opt.num_samples(), Some(4));
    assert!(!opt.vsync());
    assert_eq!(opt.gl_version(), (4, 1));
  }

  #[test]
  fn old_gl_versions_are_raised_to_core() {
    assert_eq!(WindowOpt::default().set_gl_version(2, 1).gl_version(), (3, 2));
    assert_eq!(WindowOpt::default().set_gl_version(3, 3).gl_version(), (3, 3));
  }

  #[test]
  fn requested_sizes() {
    assert_eq!(
      WindowDim::Windowed {
        width: 0,
        height: 300
      }
      .requested_size(),
      (1, 300)
    );
    assert_eq!(WindowDim::FullscreenDesktop.requested_size(), (1, 1));
    assert!(!WindowDim::Windowed {
      width: 1,
      height: 1
    }
    .is_fullscreen());
  }
}
