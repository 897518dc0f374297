//! A software rasterization pipeline.
//!
//! `softpipe` implements a fixed subset of an OpenGL-style draw pipeline
//! entirely on the CPU: primitive assembly over vertex/index buffers,
//! vertex shading with a post-shader cache, clip-space clipping,
//! perspective-correct or affine interpolation, and depth-tested
//! rasterization of triangles, lines and points into an RGBA8888 color
//! plane with an `f64` depth plane.
//!
//! Shaders are plain Rust functions over opaque byte records; see
//! [`shaders`] for the ABI and [`context::Context`] for the draw entry
//! points.

pub mod arena;
pub mod buffer;
pub mod color;
pub mod context;
pub mod framebuffer;
pub mod pipeline;
mod raster;
pub mod shaders;
pub mod texture;

pub use crate::arena::Arena;
pub use crate::buffer::{ElementType, IndexBuffer, VertexBuffer};
pub use crate::color::Color;
pub use crate::context::{
    Context, CullFace, FaceWinding, InterpolationMode, Message, MessageKind, MessageSeverity,
};
pub use crate::framebuffer::Framebuffer;
pub use crate::pipeline::topology::Primitive;
pub use crate::shaders::{
    FragmentShader, FsInput, FsOutput, ShaderProgram, VaryingInfo, VaryingLayout, VertexShader,
    VsInput, VsOutput,
};
pub use crate::texture::{FilteringMode, Texture, TextureError, WrappingMode};
