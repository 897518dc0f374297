//! Shader ABI
//!
//! User shaders are plain functions. The vertex shader receives one opaque
//! vertex record and writes a clip-space position plus a varying record;
//! the fragment shader receives the interpolated varying record and writes
//! a color. Varying records are flat byte blocks described by a
//! [`VaryingLayout`], which is the only thing the pipeline knows about
//! them: it interpolates element-by-element according to the descriptor and
//! never inspects attribute semantics.

use nalgebra::Vector4;

use crate::buffer::ElementType;

/// One attribute of a varying record: `count` packed elements of a single
/// element type.
#[derive(Debug, Clone, Copy)]
pub struct VaryingInfo {
    pub count: usize,
    pub ty: ElementType,
}

/// Byte layout of a varying record: a sequence of attributes packed without
/// padding, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct VaryingLayout {
    attributes: Vec<VaryingInfo>,
    offsets: Vec<usize>,
    stride: usize,
}

impl VaryingLayout {
    pub fn new(attributes: Vec<VaryingInfo>) -> VaryingLayout {
        let mut offsets = Vec::with_capacity(attributes.len());
        let mut stride = 0;
        for attribute in &attributes {
            offsets.push(stride);
            stride += attribute.count * attribute.ty.size_in_bytes();
        }

        VaryingLayout {
            attributes,
            offsets,
            stride,
        }
    }

    /// A layout with no attributes, for programs without varyings.
    pub fn empty() -> VaryingLayout {
        VaryingLayout::default()
    }

    /// Total record size in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn attributes(&self) -> &[VaryingInfo] {
        &self.attributes
    }

    /// Byte offset of the attribute at `index`.
    pub fn offset(&self, index: usize) -> usize {
        self.offsets[index]
    }
}

/// Write packed `f64` elements into a varying record at a byte offset.
pub fn write_f64s(record: &mut [u8], offset: usize, values: &[f64]) {
    for (i, value) in values.iter().enumerate() {
        put_f64(record, offset + i * 8, *value);
    }
}

/// Read packed `f64` elements from a varying record at a byte offset.
pub fn read_f64s(record: &[u8], offset: usize, out: &mut [f64]) {
    for (i, value) in out.iter_mut().enumerate() {
        *value = get_f64(record, offset + i * 8);
    }
}

#[inline]
pub(crate) fn get_f64(record: &[u8], offset: usize) -> f64 {
    bytemuck::pod_read_unaligned(&record[offset..offset + 8])
}

#[inline]
pub(crate) fn put_f64(record: &mut [u8], offset: usize, value: f64) {
    record[offset..offset + 8].copy_from_slice(&value.to_ne_bytes());
}

/// Everything a vertex shader invocation sees.
pub struct VsInput<'a, U> {
    /// The vertex's index into its vertex buffer.
    pub vertex_id: usize,
    /// The raw vertex record; its layout is the shader's own business.
    pub vertex: &'a [u8],
    pub uniform: &'a U,
}

/// Everything a vertex shader invocation writes.
pub struct VsOutput<'a> {
    /// Clip-space position.
    pub position: Vector4<f64>,
    /// The varying record to fill in, zero-initialized by the pipeline.
    pub varyings: &'a mut [u8],
}

/// Everything a fragment shader invocation sees.
pub struct FsInput<'a, U> {
    pub uniform: &'a U,
    /// The interpolated varying record.
    pub varyings: &'a [u8],
    /// x and y are the pixel center in window space, z the interpolated
    /// depth in [-1, 1], w the reciprocal of the interpolated 1/w.
    pub frag_coord: Vector4<f64>,
    pub front_facing: bool,
    pub primitive_id: usize,
}

/// Everything a fragment shader invocation writes.
pub struct FsOutput {
    /// Normalized RGBA, quantized to RGBA8888 after the shader returns.
    pub color: [f64; 4],
    /// Overrides the interpolated depth when set to a non-NaN value.
    pub frag_depth: f64,
}

impl Default for FsOutput {
    fn default() -> FsOutput {
        FsOutput {
            color: [0.0; 4],
            frag_depth: f64::NAN,
        }
    }
}

pub type VertexShaderFn<U> = fn(&VsInput<'_, U>, &mut VsOutput<'_>);
pub type FragmentShaderFn<U> = fn(&FsInput<'_, U>, &mut FsOutput);

/// A vertex shader callback together with the layout of the varying record
/// it writes.
#[derive(Clone)]
pub struct VertexShader<U> {
    pub shader: VertexShaderFn<U>,
    pub layout: VaryingLayout,
}

#[derive(Clone, Copy)]
pub struct FragmentShader<U> {
    pub shader: FragmentShaderFn<U>,
}

/// The shaders and uniform used by a draw call.
///
/// Not compiled or linked in any way; the name mirrors the OpenGL object
/// it stands in for. The program borrows its uniform, which is opaque to
/// the pipeline and passed through to both shaders.
pub struct ShaderProgram<'u, U> {
    pub uniform: &'u U,
    pub vertex: VertexShader<U>,
    pub fragment: FragmentShader<U>,
}

impl<'u, U> ShaderProgram<'u, U> {
    pub fn new(
        uniform: &'u U,
        vertex: VertexShader<U>,
        fragment: FragmentShader<U>,
    ) -> ShaderProgram<'u, U> {
        ShaderProgram {
            uniform,
            vertex,
            fragment,
        }
    }
}
