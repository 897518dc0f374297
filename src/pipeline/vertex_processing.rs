//! Vertex shading and the post-vertex-shader cache

use nalgebra::Vector4;

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::shaders::{ShaderProgram, VsInput, VsOutput};

use super::{resolve_vertex_index, DrawState};

/// A shaded vertex: clip-space position plus its varying record.
///
/// The varying bytes live in the draw's arena; copying a `ClipVertex` is
/// cheap and shares them.
#[derive(Clone, Copy)]
pub(crate) struct ClipVertex<'a> {
    pub position: Vector4<f64>,
    pub varyings: &'a [u8],
}

/// Divide x, y and z by clip w and pin w to 1, turning a clip-space
/// position into NDC. Returns the reciprocal of the original w.
pub(crate) fn apply_perspective_divide(vertex: &mut ClipVertex<'_>) -> f64 {
    let inv_w = 1.0 / vertex.position.w;
    vertex.position.x *= inv_w;
    vertex.position.y *= inv_w;
    vertex.position.z *= inv_w;
    vertex.position.w = 1.0;
    inv_w
}

/// Memoizes vertex shader outputs for one draw, keyed by
/// `vertex_index - base_vertex` where `base_vertex` is the smallest vertex
/// index the draw touches.
pub(crate) struct VertexCache<'a> {
    base_vertex: usize,
    entries: Vec<Option<ClipVertex<'a>>>,
}

impl<'a> VertexCache<'a> {
    /// Size the cache from the min/max decoded vertex index of the draw's
    /// stream range (the range itself when there is no index buffer).
    pub(crate) fn for_draw(
        state: &DrawState<'a>,
        index_buffer: Option<&IndexBuffer>,
        start: usize,
        count: usize,
    ) -> VertexCache<'a> {
        let (min_vertex, max_vertex) = match index_buffer {
            None => (start, start + count - 1),
            Some(_) => {
                let mut min = usize::MAX;
                let mut max = 0;
                for i in 0..count {
                    let vertex_index = resolve_vertex_index(state, index_buffer, start + i);
                    min = min.min(vertex_index);
                    max = max.max(vertex_index);
                }
                (min, max)
            }
        };

        VertexCache {
            base_vertex: min_vertex,
            entries: vec![None; max_vertex - min_vertex + 1],
        }
    }

    /// Fetch the shaded vertex for `vertex_index`, running the vertex
    /// shader only on the first request for that index.
    pub(crate) fn fetch<U>(
        &mut self,
        state: &DrawState<'a>,
        vertex_buffer: &VertexBuffer,
        program: &ShaderProgram<'_, U>,
        vertex_index: usize,
    ) -> ClipVertex<'a> {
        let slot = vertex_index - self.base_vertex;
        if let Some(vertex) = self.entries[slot] {
            return vertex;
        }

        let vertex = shade_vertex(state, vertex_buffer, program, vertex_index);
        self.entries[slot] = Some(vertex);
        vertex
    }
}

fn shade_vertex<'a, U>(
    state: &DrawState<'a>,
    vertex_buffer: &VertexBuffer,
    program: &ShaderProgram<'_, U>,
    vertex_index: usize,
) -> ClipVertex<'a> {
    let input = VsInput {
        vertex_id: vertex_index,
        vertex: vertex_buffer.vertex(vertex_index),
        uniform: program.uniform,
    };
    let mut output = VsOutput {
        position: Vector4::zeros(),
        varyings: state.arena.alloc_zeroed(program.vertex.layout.stride()),
    };

    (program.vertex.shader)(&input, &mut output);

    let VsOutput { position, varyings } = output;
    ClipVertex { position, varyings }
}
