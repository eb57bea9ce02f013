//! Query objects.
//!
//! Queries count what the GPU did between [`Query::begin`] and the end of the returned guard:
//! primitives generated, primitives written by transform feedback or samples passed.

use crate::context::Context;
use gl::types::*;

/// What a [`Query`] measures.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum QueryKind {
  /// Primitives emitted by the last vertex processing stage.
  PrimitivesGenerated,
  /// Primitives written to transform feedback buffers.
  TransformFeedbackPrimitivesWritten,
  /// Samples passing the depth test.
  SamplesPassed,
}

impl QueryKind {
  fn opengl_target(self) -> GLenum {
    match self {
      QueryKind::PrimitivesGenerated => gl::PRIMITIVES_GENERATED,
      QueryKind::TransformFeedbackPrimitivesWritten => gl::TRANSFORM_FEEDBACK_PRIMITIVES_WRITTEN,
      QueryKind::SamplesPassed => gl::SAMPLES_PASSED,
    }
  }
}

/// A query object.
#[derive(Debug)]
pub struct Query {
  handle: GLuint,
  kind: QueryKind,
}

impl Drop for Query {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteQueries(1, &self.handle);
    }
  }
}

impl Query {
  /// Create a query object.
  pub fn new(_: &mut Context, kind: QueryKind) -> Self {
    let mut handle: GLuint = 0;

    unsafe {
      gl::GenQueries(1, &mut handle);
    }

    Query { handle, kind }
  }

  /// What this query measures.
  pub fn kind(&self) -> QueryKind {
    self.kind
  }

  /// Start measuring; the measure stops when the returned guard is dropped.
  pub fn begin(&mut self) -> ActiveQuery<'_> {
    unsafe {
      gl::BeginQuery(self.kind.opengl_target(), self.handle);
    }

    ActiveQuery { query: self }
  }

  /// Wait for the result of the last measure and return it.
  pub fn result(&self) -> u32 {
    let mut value: GLuint = 0;

    unsafe {
      gl::GetQueryObjectuiv(self.handle, gl::QUERY_RESULT, &mut value);
    }

    value
  }

  /// Whether the result of the last measure is available without waiting.
  pub fn is_available(&self) -> bool {
    let mut available: GLuint = 0;

    unsafe {
      gl::GetQueryObjectuiv(self.handle, gl::QUERY_RESULT_AVAILABLE, &mut available);
    }

    available == gl::TRUE as GLuint
  }
}

/// A running query.
#[derive(Debug)]
pub struct ActiveQuery<'a> {
  query: &'a mut Query,
}

impl Drop for ActiveQuery<'_> {
  fn drop(&mut self) {
    unsafe {
      gl::EndQuery(self.query.kind.opengl_target());
    }
  }
}
