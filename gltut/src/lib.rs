//! # gltut
//!
//! Thin, RAII wrappers over the OpenGL 3.2 core objects used by the `gltut` tutorial programs:
//! shader stages and programs, buffers, vertex arrays, textures, framebuffers, queries and
//! transform feedback. Every wrapper owns exactly one driver object and deletes it when dropped.
//!
//! On top of these, [`pipeline::RenderPipeline`] runs an ordered list of render steps per frame,
//! chaining them through offscreen framebuffers and rendering the last one to the screen.
//!
//! # Getting a context
//!
//! This crate doesn’t open windows. A windowing crate (such as `gltut-sdl2`) creates the OpenGL
//! context, loads the function pointers with [`gl::load_with`] and then builds a
//! [`Context`](context::Context), which every resource constructor asks for.
//!
//! # Errors
//!
//! Every driver failure is surfaced with the driver’s own diagnostic (shader info logs, program
//! link logs, framebuffer status). Nothing is retried.

#![deny(missing_docs)]

pub mod buffer;
pub mod context;
pub mod framebuffer;
pub mod pipeline;
pub mod query;
pub mod shader;
pub mod state;
pub mod tess;
pub mod texture;
pub mod transform_feedback;
pub mod vertex;

pub use context::Context;
pub use gl;
