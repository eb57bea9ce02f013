//! 2D textures and samplers.

use crate::context::Context;
use crate::state::GLState;
use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

/// How to wrap texture coordinates while sampling textures.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Wrap {
  /// Clamp coordinates to the edge of the texture.
  ClampToEdge,
  /// Repeat the texture.
  Repeat,
  /// Repeat the texture, mirroring it every other time.
  MirroredRepeat,
}

/// Minification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MinFilter {
  /// Nearest texel.
  Nearest,
  /// Linear interpolation of the closest texels.
  Linear,
  /// Linear interpolation between the two closest mipmaps.
  LinearMipmapLinear,
}

/// Magnification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MagFilter {
  /// Nearest texel.
  Nearest,
  /// Linear interpolation of the closest texels.
  Linear,
}

/// A sampler is a set of parameters telling how a texture is read in shaders.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Sampler {
  /// How to wrap the `s` coordinate.
  pub wrap_s: Wrap,
  /// How to wrap the `t` coordinate.
  pub wrap_t: Wrap,
  /// Minification filter.
  pub min_filter: MinFilter,
  /// Magnification filter.
  pub mag_filter: MagFilter,
}

impl Default for Sampler {
  /// Defaults:
  ///
  /// - `wrap_s` and `wrap_t` set to `Wrap::ClampToEdge`.
  /// - `min_filter` set to `MinFilter::Linear`.
  /// - `mag_filter` set to `MagFilter::Linear`.
  fn default() -> Self {
    Sampler {
      wrap_s: Wrap::ClampToEdge,
      wrap_t: Wrap::ClampToEdge,
      min_filter: MinFilter::Linear,
      mag_filter: MagFilter::Linear,
    }
  }
}

/// Pixel format of a texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PixelFormat {
  /// 8-bit normalized red, green and blue.
  RGB8,
  /// 8-bit normalized red, green, blue and alpha.
  RGBA8,
  /// 32-bit floating red, green, blue and alpha.
  RGBA32F,
}

impl PixelFormat {
  /// Size in bytes of a single pixel.
  pub fn bytes_per_pixel(self) -> usize {
    match self {
      PixelFormat::RGB8 => 3,
      PixelFormat::RGBA8 => 4,
      PixelFormat::RGBA32F => 16,
    }
  }

  fn opengl_format(self) -> (GLenum, GLenum, GLenum) {
    match self {
      PixelFormat::RGB8 => (gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
      PixelFormat::RGBA8 => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
      PixelFormat::RGBA32F => (gl::RGBA32F, gl::RGBA, gl::FLOAT),
    }
  }
}

/// Errors that might happen when working with textures.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TextureError {
  /// A texture’s storage failed to be created.
  ///
  /// The carried [`String`] gives the reason of the failure.
  TextureStorageCreationFailed(String),
  /// Not enough pixel data provided for the given area asked.
  ///
  /// The first [`usize`] is the number of expected bytes to be uploaded and the second [`usize`] is
  /// the number you provided.
  NotEnoughTexels(usize, usize),
  /// The image could not be opened or decoded.
  ImageLoadFailed(String),
}

impl fmt::Display for TextureError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      TextureError::TextureStorageCreationFailed(ref e) => {
        write!(f, "texture storage creation failed: {}", e)
      }

      TextureError::NotEnoughTexels(expected, provided) => write!(
        f,
        "not enough texels provided: expected {} bytes, provided {} bytes",
        expected, provided
      ),

      TextureError::ImageLoadFailed(ref e) => write!(f, "cannot load image: {}", e),
    }
  }
}

impl error::Error for TextureError {}

/// A 2D texture.
#[derive(Debug)]
pub struct Texture2D {
  handle: GLuint,
  size: [u32; 2],
  format: PixelFormat,
  state: Rc<RefCell<GLState>>,
}

impl Drop for Texture2D {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteTextures(1, &self.handle);
    }

    self.state.borrow_mut().forget_texture(self.handle);
  }
}

impl Texture2D {
  /// Create a texture with uninitialized storage.
  pub fn new(
    ctx: &mut Context,
    size: [u32; 2],
    format: PixelFormat,
    sampler: &Sampler,
  ) -> Result<Self, TextureError> {
    Self::create(ctx, size, format, sampler, None)
  }

  /// Create a texture and upload `texels` in it.
  ///
  /// `texels` must hold at least `width * height` pixels in `format`.
  pub fn from_texels<T>(
    ctx: &mut Context,
    size: [u32; 2],
    format: PixelFormat,
    sampler: &Sampler,
    texels: &[T],
  ) -> Result<Self, TextureError>
  where
    T: Copy,
  {
    let provided = std::mem::size_of_val(texels);
    check_texels(size, format, provided)?;

    Self::create(ctx, size, format, sampler, Some(texels.as_ptr() as *const _))
  }

  /// Create an RGBA8 texture from an image.
  pub fn from_image(
    ctx: &mut Context,
    image: &image::RgbaImage,
    sampler: &Sampler,
  ) -> Result<Self, TextureError> {
    let (width, height) = image.dimensions();
    Self::from_texels(
      ctx,
      [width, height],
      PixelFormat::RGBA8,
      sampler,
      image.as_raw(),
    )
  }

  fn create(
    ctx: &mut Context,
    size: [u32; 2],
    format: PixelFormat,
    sampler: &Sampler,
    texels: Option<*const GLvoid>,
  ) -> Result<Self, TextureError> {
    if size[0] == 0 || size[1] == 0 {
      return Err(TextureError::TextureStorageCreationFailed(format!(
        "empty texture size {}x{}",
        size[0], size[1]
      )));
    }

    let mut handle: GLuint = 0;
    let (internal_format, pixel_format, pixel_type) = format.opengl_format();

    unsafe {
      gl::GenTextures(1, &mut handle);
      ctx.state.borrow_mut().bind_texture(0, handle);

      set_sampler(sampler);
      gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
      gl::TexImage2D(
        gl::TEXTURE_2D,
        0,
        internal_format as GLint,
        size[0] as GLsizei,
        size[1] as GLsizei,
        0,
        pixel_format,
        pixel_type,
        texels.unwrap_or(std::ptr::null()),
      );

      if sampler.min_filter == MinFilter::LinearMipmapLinear {
        gl::GenerateMipmap(gl::TEXTURE_2D);
      }
    }

    log::debug!(
      "created {:?} texture #{} ({}x{})",
      format,
      handle,
      size[0],
      size[1]
    );

    Ok(Texture2D {
      handle,
      size,
      format,
      state: ctx.state.clone(),
    })
  }

  pub(crate) fn handle(&self) -> GLuint {
    self.handle
  }

  /// Size of the texture.
  pub fn size(&self) -> [u32; 2] {
    self.size
  }

  /// Pixel format of the texture.
  pub fn format(&self) -> PixelFormat {
    self.format
  }

  /// Replace the whole content of the texture.
  pub fn upload<T>(&mut self, texels: &[T]) -> Result<(), TextureError>
  where
    T: Copy,
  {
    check_texels(self.size, self.format, std::mem::size_of_val(texels))?;

    let (_, pixel_format, pixel_type) = self.format.opengl_format();

    unsafe {
      self.state.borrow_mut().bind_texture(0, self.handle);
      gl::TexSubImage2D(
        gl::TEXTURE_2D,
        0,
        0,
        0,
        self.size[0] as GLsizei,
        self.size[1] as GLsizei,
        pixel_format,
        pixel_type,
        texels.as_ptr() as *const _,
      );
    }

    Ok(())
  }

  /// Bind the texture to a texture unit, so that a sampler uniform set to `unit` reads it.
  pub fn bind(&self, unit: u32) {
    unsafe { self.state.borrow_mut().bind_texture(unit, self.handle) }
  }
}

/// Load an image from disk, ready to upload.
///
/// The image is flipped vertically, since OpenGL expects the first row to be the bottom one.
pub fn load_image(path: impl AsRef<Path>) -> Result<image::RgbaImage, TextureError> {
  let path = path.as_ref();
  let img = image::open(path)
    .map_err(|e| TextureError::ImageLoadFailed(format!("{}: {}", path.display(), e)))?;

  Ok(img.flipv().to_rgba8())
}

fn check_texels(size: [u32; 2], format: PixelFormat, provided: usize) -> Result<(), TextureError> {
  let expected = size[0] as usize * size[1] as usize * format.bytes_per_pixel();

  if provided < expected {
    Err(TextureError::NotEnoughTexels(expected, provided))
  } else {
    Ok(())
  }
}

unsafe fn set_sampler(sampler: &Sampler) {
  gl::TexParameteri(
    gl::TEXTURE_2D,
    gl::TEXTURE_WRAP_S,
    opengl_wrap(sampler.wrap_s) as GLint,
  );
  gl::TexParameteri(
    gl::TEXTURE_2D,
    gl::TEXTURE_WRAP_T,
    opengl_wrap(sampler.wrap_t) as GLint,
  );
  gl::TexParameteri(
    gl::TEXTURE_2D,
    gl::TEXTURE_MIN_FILTER,
    opengl_min_filter(sampler.min_filter) as GLint,
  );
  gl::TexParameteri(
    gl::TEXTURE_2D,
    gl::TEXTURE_MAG_FILTER,
    opengl_mag_filter(sampler.mag_filter) as GLint,
  );
}

fn opengl_wrap(wrap: Wrap) -> GLenum {
  match wrap {
    Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
    Wrap::Repeat => gl::REPEAT,
    Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
  }
}

fn opengl_min_filter(filter: MinFilter) -> GLenum {
  match filter {
    MinFilter::Nearest => gl::NEAREST,
    MinFilter::Linear => gl::LINEAR,
    MinFilter::LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
  }
}

fn opengl_mag_filter(filter: MagFilter) -> GLenum {
  match filter {
    MagFilter::Nearest => gl::NEAREST,
    MagFilter::Linear => gl::LINEAR,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{ImageBuffer, Rgba};
  use std::env;
  use std::process;

  #[test]
  fn texel_count_check() {
    assert_eq!(check_texels([2, 2], PixelFormat::RGBA8, 16), Ok(()));
    assert_eq!(check_texels([2, 2], PixelFormat::RGB8, 32), Ok(()));
    assert_eq!(
      check_texels([4, 4], PixelFormat::RGBA32F, 255),
      Err(TextureError::NotEnoughTexels(256, 255))
    );
  }

  #[test]
  fn default_sampler() {
    let sampler = Sampler::default();
    assert_eq!(sampler.wrap_s, Wrap::ClampToEdge);
    assert_eq!(sampler.min_filter, MinFilter::Linear);
  }

  #[test]
  fn not_enough_texels_display() {
    assert_eq!(
      TextureError::NotEnoughTexels(16, 12).to_string(),
      "not enough texels provided: expected 16 bytes, provided 12 bytes"
    );
  }

  #[test]
  fn loaded_images_are_flipped() {
    // 1x2 image: red on top, blue at the bottom
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(1, 2, |_, y| {
      if y == 0 {
        Rgba([255, 0, 0, 255])
      } else {
        Rgba([0, 0, 255, 255])
      }
    });
    let path = env::temp_dir().join(format!("gltut-flip-{}.png", process::id()));
    img.save(&path).unwrap();

    let loaded = load_image(&path);
    std::fs::remove_file(&path).unwrap();
    let loaded = loaded.unwrap();

    assert_eq!(loaded.dimensions(), (1, 2));
    assert_eq!(loaded.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    assert_eq!(loaded.get_pixel(0, 1), &Rgba([255, 0, 0, 255]));
  }

  #[test]
  fn missing_image() {
    let err = load_image(env::temp_dir().join("gltut-no-such-image.png")).unwrap_err();
    assert!(matches!(err, TextureError::ImageLoadFailed(_)));
  }
}
