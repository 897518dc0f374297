//! Draw dispatch
//!
//! A draw call flows through here: the stream range is validated, the
//! primitive kind is classified, and each primitive is assembled from the
//! post-vertex-shader cache, clipped, set up and rasterized, in stream
//! order. Everything a stage needs from the context travels in a
//! [`DrawState`].

pub(crate) mod clipping;
pub(crate) mod interpolation;
pub mod topology;
pub(crate) mod vertex_processing;

use crate::arena::Arena;
use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::context::{
    CullFace, FaceWinding, InterpolationMode, MessageKind, MessageSeverity, MessageSink,
};
use crate::framebuffer::Framebuffer;
use crate::raster::line::Line;
use crate::raster::point::Point;
use crate::raster::triangle::Triangle;
use crate::shaders::ShaderProgram;

use self::topology::Primitive;
use self::vertex_processing::{apply_perspective_divide, VertexCache};

/// Shared "roughly zero" threshold for the fill convention and for clip
/// distance ratios.
pub(crate) const EPSILON: f64 = 1e-9;

#[inline]
pub(crate) fn roughly_zero(value: f64) -> bool {
    value.abs() <= EPSILON
}

/// A snapshot of the context state plus the per-draw allocator, passed down
/// the pipeline for the duration of one draw call.
pub(crate) struct DrawState<'c> {
    pub interpolation_mode: InterpolationMode,
    pub front_face: FaceWinding,
    pub cull_face: Option<CullFace>,
    pub point_size: f64,
    pub arena: &'c Arena,
    pub messages: &'c MessageSink,
}

impl DrawState<'_> {
    #[inline]
    pub(crate) fn perspective(&self) -> bool {
        self.interpolation_mode == InterpolationMode::Perspective
    }
}

/// Decode the vertex index at a stream position.
///
/// A float-typed index buffer cannot address vertices; that reads as index
/// 0 after an `InvalidArgument` message, and the draw carries on with the
/// wrong topology it asked for.
pub(crate) fn resolve_vertex_index(
    state: &DrawState<'_>,
    index_buffer: Option<&IndexBuffer>,
    stream_index: usize,
) -> usize {
    match index_buffer {
        None => stream_index,
        Some(ib) => match ib.index(stream_index) {
            Some(vertex_index) => vertex_index as usize,
            None => {
                state.messages.emit(
                    MessageSeverity::High,
                    MessageKind::InvalidArgument,
                    "index_buffer",
                    format_args!(
                        "index buffers require an unsigned element type, got {:?}",
                        ib.element_type()
                    ),
                );
                0
            }
        },
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_buffer<U>(
    state: &DrawState<'_>,
    index_buffer: Option<&IndexBuffer>,
    vertex_buffer: &VertexBuffer,
    framebuffer: &mut Framebuffer,
    program: &ShaderProgram<'_, U>,
    primitive: Primitive,
    start: usize,
    count: usize,
) {
    if count == 0 {
        return;
    }

    let stream_len = index_buffer.map_or(vertex_buffer.len(), IndexBuffer::len);
    if start.checked_add(count).map_or(true, |end| end > stream_len) {
        state.messages.emit(
            MessageSeverity::High,
            MessageKind::InvalidArgument,
            "draw_buffer",
            format_args!(
                "draw range [{start}, {start}+{count}) exceeds the {stream_len}-element stream"
            ),
        );
        return;
    }

    if primitive.is_triangle_based() {
        draw_triangles(
            state,
            index_buffer,
            vertex_buffer,
            framebuffer,
            program,
            primitive,
            start,
            count,
        );
    } else if primitive.is_line_based() {
        draw_lines(
            state,
            index_buffer,
            vertex_buffer,
            framebuffer,
            program,
            primitive,
            start,
            count,
        );
    } else {
        draw_points(
            state,
            index_buffer,
            vertex_buffer,
            framebuffer,
            program,
            start,
            count,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_triangles<U>(
    state: &DrawState<'_>,
    index_buffer: Option<&IndexBuffer>,
    vertex_buffer: &VertexBuffer,
    framebuffer: &mut Framebuffer,
    program: &ShaderProgram<'_, U>,
    primitive: Primitive,
    start: usize,
    count: usize,
) {
    if state.cull_face == Some(CullFace::FrontAndBack) {
        return;
    }

    topology::warn_on_excess_vertices(state, primitive, count);
    let triangle_count = topology::triangle_count(count, primitive);
    if triangle_count == 0 {
        return;
    }

    let mut cache = VertexCache::for_draw(state, index_buffer, start, count);
    let scratch = state.arena.alloc_zeroed(program.vertex.layout.stride());

    let mut primitive_id = 0;
    for raw_index in 0..triangle_count {
        let stream = topology::triangle_stream_indices(start, raw_index, primitive);
        let corners = stream.map(|stream_index| {
            let vertex_index = resolve_vertex_index(state, index_buffer, stream_index);
            cache.fetch(state, vertex_buffer, program, vertex_index)
        });

        let polygon = clipping::clip_triangle(state, &program.vertex.layout, corners);
        if polygon.len() < 3 {
            continue;
        }

        // Fan retriangulation of the clipped polygon.
        for i in 1..polygon.len() - 1 {
            let fan = [polygon[0], polygon[i], polygon[i + 1]];
            if let Some(mut triangle) = Triangle::setup(state, framebuffer, fan, primitive_id) {
                triangle.rasterize(state, framebuffer, program, scratch);
                primitive_id += 1;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_lines<U>(
    state: &DrawState<'_>,
    index_buffer: Option<&IndexBuffer>,
    vertex_buffer: &VertexBuffer,
    framebuffer: &mut Framebuffer,
    program: &ShaderProgram<'_, U>,
    primitive: Primitive,
    start: usize,
    count: usize,
) {
    topology::warn_on_excess_vertices(state, primitive, count);
    let line_count = topology::line_count(count, primitive);
    if line_count == 0 {
        return;
    }

    let mut cache = VertexCache::for_draw(state, index_buffer, start, count);
    let scratch = state.arena.alloc_zeroed(program.vertex.layout.stride());

    let mut primitive_id = 0;
    for raw_index in 0..line_count {
        let stream = topology::line_stream_indices(start, raw_index, primitive, count);
        let endpoints = stream.map(|stream_index| {
            let vertex_index = resolve_vertex_index(state, index_buffer, stream_index);
            cache.fetch(state, vertex_buffer, program, vertex_index)
        });

        let Some(endpoints) = clipping::clip_line(state, &program.vertex.layout, endpoints) else {
            continue;
        };

        let line = Line::setup(framebuffer, endpoints, primitive_id);
        line.rasterize(state, framebuffer, program, scratch);
        primitive_id += 1;
    }
}

fn draw_points<U>(
    state: &DrawState<'_>,
    index_buffer: Option<&IndexBuffer>,
    vertex_buffer: &VertexBuffer,
    framebuffer: &mut Framebuffer,
    program: &ShaderProgram<'_, U>,
    start: usize,
    count: usize,
) {
    if state.point_size <= 0.0 {
        return;
    }

    let mut cache = VertexCache::for_draw(state, index_buffer, start, count);

    for raw_index in 0..count {
        let vertex_index = resolve_vertex_index(state, index_buffer, start + raw_index);
        let mut vertex = cache.fetch(state, vertex_buffer, program, vertex_index);
        apply_perspective_divide(&mut vertex);

        let point = Point {
            vertex,
            id: raw_index,
        };
        point.rasterize(state, framebuffer, program);
    }
}
