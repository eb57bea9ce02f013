//! Platform services implementation.

use gltut::shader::{read_source, StageError};
use gltut::texture::{load_image, TextureError};
use gltut_demos::PlatformServices;
use std::path::{Path, PathBuf};

/// Desktop implementation of the [`PlatformServices`] API.
///
/// Shaders are read from `<root>/shaders` and textures from `<root>/textures`, every time they
/// are asked for.
#[derive(Debug)]
pub struct DesktopPlatformServices {
  root: PathBuf,
}

impl DesktopPlatformServices {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  fn shader_path(&self, name: &str) -> PathBuf {
    self.root.join("shaders").join(name)
  }

  fn texture_path(&self, name: &str) -> PathBuf {
    self.root.join("textures").join(name)
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

impl PlatformServices for DesktopPlatformServices {
  fn fetch_shader(&mut self, name: &str) -> Result<String, StageError> {
    let path = self.shader_path(name);
    log::debug!("fetching shader {}", path.display());
    read_source(path)
  }

  fn fetch_texture(&mut self, name: &str) -> Result<image::RgbaImage, TextureError> {
    let path = self.texture_path(name);
    log::debug!("fetching texture {}", path.display());
    load_image(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn shipped_assets() -> DesktopPlatformServices {
    DesktopPlatformServices::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"))
  }

  #[test]
  fn every_shader_of_the_demos_is_shipped() {
    let mut platform = shipped_assets();
    let shaders = [
      "triangle.vert",
      "triangle.frag",
      "elements.vert",
      "elements.frag",
      "texture.vert",
      "texture.frag",
      "transform.vert",
      "transform_feedback.vert",
      "geometry.vert",
      "geometry.geom",
      "geometry.frag",
      "fullscreen.vert",
      "post.frag",
      "blur.frag",
      "grade.frag",
    ];

    for name in shaders {
      let src = platform.fetch_shader(name).unwrap();
      assert!(src.starts_with("#version 150 core"), "{}", name);
    }
  }

  #[test]
  fn textures_are_loaded_as_rgba() {
    let mut platform = shipped_assets();

    for name in ["checker.ppm", "stripes.ppm"] {
      let image = platform.fetch_texture(name).unwrap();
      assert_eq!(image.dimensions(), (8, 8));
    }
  }

  #[test]
  fn missing_shader_reports_the_path() {
    let mut platform = DesktopPlatformServices::new("/nonexistent");

    match platform.fetch_shader("nope.vert") {
      Err(StageError::SourceUnavailable(path, _)) => {
        assert_eq!(path, Path::new("/nonexistent/shaders/nope.vert"))
      }
      other => panic!("unexpected result: {:?}", other),
    }
  }
}
