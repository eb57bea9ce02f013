//! Shader stages and programs.
//!
//! A [`Stage`] is a single compiled piece of GLSL (vertex, geometry or fragment). Stages are
//! linked together into a [`Program`] with a [`ProgramBuilder`], which is also where fragment
//! outputs and transform feedback varyings are declared, since both must be known before linking.

use crate::context::Context;
use crate::state::GLState;
use cgmath::Matrix4;
use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::ffi::CString;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::ptr::{null, null_mut};
use std::rc::Rc;

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Geometry shader.
  GeometryShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::GeometryShader => f.write_str("geometry shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that shader stages can emit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
  /// The GLSL source file could not be read.
  SourceUnavailable(PathBuf, String),
  /// Occurs when a shader fails to compile. Carries the driver’s info log.
  CompilationFailed(StageType, String),
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StageError::SourceUnavailable(ref path, ref e) => write!(
        f,
        "could not open shader source file \"{}\": {}",
        path.display(),
        e
      ),

      StageError::CompilationFailed(ref ty, ref r) => write!(f, "{} compilation error: {}", ty, r),
    }
  }
}

impl error::Error for StageError {}

/// Errors that a [`Program`] can generate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramError {
  /// A shader stage failed to compile.
  StageError(StageError),
  /// Program link failed. You can inspect the reason by looking at the contained `String`.
  LinkFailed(String),
  /// A fragment output or transform feedback varying name is not a valid C string.
  InvalidName(String),
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ProgramError::StageError(ref e) => write!(f, "shader program has stage error: {}", e),

      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),

      ProgramError::InvalidName(ref s) => write!(f, "invalid shader program name: {:?}", s),
    }
  }
}

impl error::Error for ProgramError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ProgramError::StageError(e) => Some(e),
      _ => None,
    }
  }
}

impl From<StageError> for ProgramError {
  fn from(e: StageError) -> Self {
    ProgramError::StageError(e)
  }
}

/// Warnings related to uniform issues.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UniformWarning {
  /// Inactive uniform (not in use / no participation to the final output in shaders).
  Inactive(String),
}

impl fmt::Display for UniformWarning {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      UniformWarning::Inactive(ref s) => write!(f, "inactive {} uniform", s),
    }
  }
}

impl error::Error for UniformWarning {}

/// Warnings related to vertex attributes issues.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VertexAttribWarning {
  /// Inactive vertex attribute (not read in the vertex shader).
  Inactive(String),
}

impl fmt::Display for VertexAttribWarning {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      VertexAttribWarning::Inactive(ref s) => write!(f, "inactive {} vertex attribute", s),
    }
  }
}

impl error::Error for VertexAttribWarning {}

/// Read a GLSL source file.
pub fn read_source(path: impl AsRef<Path>) -> Result<String, StageError> {
  let path = path.as_ref();

  fs::read_to_string(path)
    .map_err(|e| StageError::SourceUnavailable(path.to_owned(), e.to_string()))
}

/// A compiled shader stage.
#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
  ty: StageType,
}

impl Drop for Stage {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteShader(self.handle);
    }
  }
}

impl Stage {
  /// Compile a stage from its GLSL source.
  pub fn new(_: &mut Context, ty: StageType, src: &str) -> Result<Self, StageError> {
    let c_src = CString::new(src.as_bytes()).map_err(|_| {
      StageError::CompilationFailed(ty, "source contains a nul byte".to_owned())
    })?;

    unsafe {
      let handle = gl::CreateShader(opengl_shader_type(ty));

      if handle == 0 {
        return Err(StageError::CompilationFailed(
          ty,
          "unable to create shader stage".to_owned(),
        ));
      }

      gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
      gl::CompileShader(handle);

      let mut compiled: GLint = gl::FALSE.into();
      gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

      if compiled == gl::TRUE.into() {
        log::debug!("compiled {} #{}", ty, handle);
        Ok(Stage { handle, ty })
      } else {
        let mut log_len: GLint = 0;
        gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

        let mut log = vec![0u8; log_len.max(0) as usize];
        gl::GetShaderInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

        gl::DeleteShader(handle);

        Err(StageError::CompilationFailed(ty, info_log_to_string(log)))
      }
    }
  }

  /// Read and compile a stage from a GLSL file.
  pub fn from_file(
    ctx: &mut Context,
    ty: StageType,
    path: impl AsRef<Path>,
  ) -> Result<Self, StageError> {
    let src = read_source(path)?;
    Self::new(ctx, ty, &src)
  }

  /// Type of this stage.
  pub fn ty(&self) -> StageType {
    self.ty
  }
}

/// How transform feedback varyings are laid out in the capture buffer(s).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VaryingsMode {
  /// All varyings are interleaved in a single buffer.
  Interleaved,
  /// Each varying is written to its own buffer binding.
  Separate,
}

/// Link stages into a [`Program`].
///
/// Stages are owned by the builder and deleted once the program is linked.
#[derive(Debug)]
pub struct ProgramBuilder {
  vertex: Stage,
  geometry: Option<Stage>,
  fragment: Option<Stage>,
  frag_outputs: Vec<(u32, String)>,
  varyings: Vec<String>,
  varyings_mode: VaryingsMode,
}

impl ProgramBuilder {
  /// Start a program with its vertex stage.
  pub fn new(vertex: Stage) -> Self {
    ProgramBuilder {
      vertex,
      geometry: None,
      fragment: None,
      frag_outputs: Vec::new(),
      varyings: Vec::new(),
      varyings_mode: VaryingsMode::Interleaved,
    }
  }

  /// Add a geometry stage.
  pub fn geometry(self, stage: Stage) -> Self {
    ProgramBuilder {
      geometry: Some(stage),
      ..self
    }
  }

  /// Add a fragment stage.
  ///
  /// A program without fragment stage is only useful with rasterization discarded (transform
  /// feedback).
  pub fn fragment(self, stage: Stage) -> Self {
    ProgramBuilder {
      fragment: Some(stage),
      ..self
    }
  }

  /// Bind a fragment shader output to a color number.
  pub fn bind_frag_data(mut self, color_number: u32, name: impl Into<String>) -> Self {
    self.frag_outputs.push((color_number, name.into()));
    self
  }

  /// Declare vertex (or geometry) outputs to capture with transform feedback.
  pub fn transform_feedback_varyings<I, S>(mut self, varyings: I, mode: VaryingsMode) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.varyings = varyings.into_iter().map(Into::into).collect();
    self.varyings_mode = mode;
    self
  }

  /// Attach the stages and link the program.
  pub fn link(self, ctx: &mut Context) -> Result<Program, ProgramError> {
    let frag_outputs = self
      .frag_outputs
      .iter()
      .map(|(n, name)| c_string(name).map(|c| (*n, c)))
      .collect::<Result<Vec<_>, _>>()?;
    let varyings = self
      .varyings
      .iter()
      .map(|name| c_string(name))
      .collect::<Result<Vec<_>, _>>()?;

    unsafe {
      let handle = gl::CreateProgram();
      let program = Program {
        handle,
        state: ctx.state.clone(),
      };

      gl::AttachShader(handle, self.vertex.handle);

      if let Some(ref geometry) = self.geometry {
        gl::AttachShader(handle, geometry.handle);
      }

      if let Some(ref fragment) = self.fragment {
        gl::AttachShader(handle, fragment.handle);
      }

      for (color_number, name) in &frag_outputs {
        gl::BindFragDataLocation(handle, *color_number, name.as_ptr());
      }

      if !varyings.is_empty() {
        let ptrs: Vec<*const GLchar> = varyings.iter().map(|v| v.as_ptr()).collect();
        let mode = match self.varyings_mode {
          VaryingsMode::Interleaved => gl::INTERLEAVED_ATTRIBS,
          VaryingsMode::Separate => gl::SEPARATE_ATTRIBS,
        };

        gl::TransformFeedbackVaryings(handle, ptrs.len() as GLsizei, ptrs.as_ptr(), mode);
      }

      program.link()?;
      log::debug!("linked program #{}", handle);

      // stages get deleted here; the program keeps them alive on the driver side
      Ok(program)
    }
  }
}

/// A linked shader program.
#[derive(Debug)]
pub struct Program {
  handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl Drop for Program {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteProgram(self.handle);
    }

    self.state.borrow_mut().forget_program(self.handle);
  }
}

impl Program {
  /// Compile and link a program from GLSL strings.
  pub fn from_strings(
    ctx: &mut Context,
    vertex: &str,
    geometry: Option<&str>,
    fragment: &str,
  ) -> Result<Self, ProgramError> {
    let mut builder = ProgramBuilder::new(Stage::new(ctx, StageType::VertexShader, vertex)?);

    if let Some(geometry) = geometry {
      builder = builder.geometry(Stage::new(ctx, StageType::GeometryShader, geometry)?);
    }

    builder
      .fragment(Stage::new(ctx, StageType::FragmentShader, fragment)?)
      .bind_frag_data(0, "out_color")
      .link(ctx)
  }

  fn link(&self) -> Result<(), ProgramError> {
    let handle = self.handle;

    unsafe {
      gl::LinkProgram(handle);

      let mut linked: GLint = gl::FALSE.into();
      gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

      if linked == gl::TRUE.into() {
        Ok(())
      } else {
        let mut log_len: GLint = 0;
        gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

        let mut log = vec![0u8; log_len.max(0) as usize];
        gl::GetProgramInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

        Err(ProgramError::LinkFailed(info_log_to_string(log)))
      }
    }
  }

  /// Install the program as part of the current rendering state.
  pub fn use_program(&self) {
    unsafe { self.state.borrow_mut().use_program(self.handle) }
  }

  /// Location of an active vertex attribute.
  pub fn attrib_location(&self, name: &str) -> Result<GLuint, VertexAttribWarning> {
    let location = match CString::new(name.as_bytes()) {
      Ok(c_name) => unsafe { gl::GetAttribLocation(self.handle, c_name.as_ptr()) },
      Err(_) => -1,
    };

    if location < 0 {
      Err(VertexAttribWarning::Inactive(name.to_owned()))
    } else {
      Ok(location as GLuint)
    }
  }

  /// Look up an active uniform.
  pub fn uniform<T>(&self, name: &str) -> Result<Uniform<T>, UniformWarning>
  where
    T: Uniformable,
  {
    let location = match CString::new(name.as_bytes()) {
      Ok(c_name) => unsafe { gl::GetUniformLocation(self.handle, c_name.as_ptr()) },
      Err(_) => -1,
    };

    if location < 0 {
      Err(UniformWarning::Inactive(name.to_owned()))
    } else {
      Ok(Uniform::new(location))
    }
  }

  /// Look up a uniform, falling back to an unbound one when it’s inactive.
  ///
  /// Setting an unbound uniform does nothing. The warning is logged.
  pub fn uniform_or_unbound<T>(&self, name: &str) -> Uniform<T>
  where
    T: Uniformable,
  {
    self.uniform(name).unwrap_or_else(|warning| {
      log::warn!("program #{}: {}", self.handle, warning);
      Uniform::new(-1)
    })
  }

  /// Set a uniform value. The program is made current first.
  pub fn set<T>(&self, uniform: &Uniform<T>, value: T)
  where
    T: Uniformable,
  {
    self.use_program();
    unsafe { value.update(uniform.location) }
  }
}

/// A shader uniform.
#[derive(Debug)]
pub struct Uniform<T> {
  location: GLint,
  _t: PhantomData<*const T>,
}

impl<T> Uniform<T> {
  fn new(location: GLint) -> Self {
    Uniform {
      location,
      _t: PhantomData,
    }
  }

  /// Whether this uniform is active in its program.
  pub fn is_bound(&self) -> bool {
    self.location >= 0
  }
}

/// Types that can be sent to a shader uniform.
///
/// # Safety
///
/// Implementors must issue the `glUniform*` call matching the GLSL type they represent.
pub unsafe trait Uniformable: Sized {
  /// Upload the value to the currently used program.
  unsafe fn update(self, location: GLint);
}

unsafe impl Uniformable for f32 {
  unsafe fn update(self, location: GLint) {
    gl::Uniform1f(location, self);
  }
}

unsafe impl Uniformable for i32 {
  unsafe fn update(self, location: GLint) {
    gl::Uniform1i(location, self);
  }
}

unsafe impl Uniformable for u32 {
  unsafe fn update(self, location: GLint) {
    gl::Uniform1ui(location, self);
  }
}

unsafe impl Uniformable for bool {
  unsafe fn update(self, location: GLint) {
    gl::Uniform1i(location, self as GLint);
  }
}

unsafe impl Uniformable for [f32; 2] {
  unsafe fn update(self, location: GLint) {
    gl::Uniform2f(location, self[0], self[1]);
  }
}

unsafe impl Uniformable for [f32; 3] {
  unsafe fn update(self, location: GLint) {
    gl::Uniform3f(location, self[0], self[1], self[2]);
  }
}

unsafe impl Uniformable for [f32; 4] {
  unsafe fn update(self, location: GLint) {
    gl::Uniform4f(location, self[0], self[1], self[2], self[3]);
  }
}

unsafe impl Uniformable for [[f32; 4]; 4] {
  unsafe fn update(self, location: GLint) {
    gl::UniformMatrix4fv(location, 1, gl::FALSE, self.as_ptr() as *const GLfloat);
  }
}

unsafe impl Uniformable for Matrix4<f32> {
  unsafe fn update(self, location: GLint) {
    let m: [[f32; 4]; 4] = self.into();
    m.update(location)
  }
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::GeometryShader => gl::GEOMETRY_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}

fn c_string(name: &str) -> Result<CString, ProgramError> {
  CString::new(name.as_bytes()).map_err(|_| ProgramError::InvalidName(name.to_owned()))
}

// Info logs are nul-terminated and might carry trailing whitespace.
fn info_log_to_string(mut log: Vec<u8>) -> String {
  if let Some(nul) = log.iter().position(|&b| b == 0) {
    log.truncate(nul);
  }

  String::from_utf8_lossy(&log).trim_end().to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::env;
  use std::process;

  #[test]
  fn stage_type_display() {
    assert_eq!(StageType::VertexShader.to_string(), "vertex shader");
    assert_eq!(StageType::GeometryShader.to_string(), "geometry shader");
    assert_eq!(StageType::FragmentShader.to_string(), "fragment shader");
  }

  #[test]
  fn compilation_error_carries_the_log() {
    let err = ProgramError::from(StageError::CompilationFailed(
      StageType::FragmentShader,
      "0:3(1): error: syntax error".to_owned(),
    ));

    assert_eq!(
      err.to_string(),
      "shader program has stage error: fragment shader compilation error: 0:3(1): error: syntax error"
    );
    assert!(error::Error::source(&err).is_some());
  }

  #[test]
  fn missing_source_file() {
    let path = env::temp_dir().join("gltut-no-such-shader.vert");
    let err = read_source(&path).unwrap_err();

    match err {
      StageError::SourceUnavailable(ref p, _) => assert_eq!(p, &path),
      _ => panic!("unexpected error: {}", err),
    }

    assert!(err
      .to_string()
      .starts_with("could not open shader source file"));
  }

  #[test]
  fn existing_source_file() {
    let path = env::temp_dir().join(format!("gltut-shader-{}.frag", process::id()));
    fs::write(&path, "void main() {}\n").unwrap();

    let src = read_source(&path);
    fs::remove_file(&path).unwrap();

    assert_eq!(src.unwrap(), "void main() {}\n");
  }

  #[test]
  fn info_log_is_trimmed_at_nul() {
    let log = b"error: oops\n\0garbage".to_vec();
    assert_eq!(info_log_to_string(log), "error: oops");
    assert_eq!(info_log_to_string(Vec::new()), "");
  }

  #[test]
  fn names_with_nul_bytes_are_rejected() {
    assert_eq!(
      c_string("out\0color").unwrap_err(),
      ProgramError::InvalidName("out\0color".to_owned())
    );
    assert!(c_string("out_color").is_ok());
  }

  #[test]
  fn warnings_display() {
    assert_eq!(
      UniformWarning::Inactive("time".to_owned()).to_string(),
      "inactive time uniform"
    );
    assert_eq!(
      VertexAttribWarning::Inactive("color".to_owned()).to_string(),
      "inactive color vertex attribute"
    );
  }
}
