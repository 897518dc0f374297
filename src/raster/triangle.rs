//! Triangle setup and rasterization
//!
//! Setup turns three clip-space vertices into everything the scanline loop
//! needs: NDC positions, culling and winding decisions, a screen-space
//! bounding box, and barycentric coordinates with their per-pixel deltas.
//! Rasterization then walks the bounding box row by row, advancing the
//! barycentrics incrementally instead of re-evaluating them per pixel.

use nalgebra::{Vector2, Vector3, Vector4};

use crate::context::{CullFace, FaceWinding};
use crate::framebuffer::Framebuffer;
use crate::pipeline::interpolation::{
    interpolate_attributes, interpolate_position, PerspectiveTerms,
};
use crate::pipeline::vertex_processing::{apply_perspective_divide, ClipVertex};
use crate::pipeline::{roughly_zero, DrawState};
use crate::shaders::{FsInput, ShaderProgram};

use super::emit_fragment;

pub(crate) struct Triangle<'a> {
    vertices: [ClipVertex<'a>; 3],
    inv_w: [f64; 3],
    edge_top_left: [bool; 3],
    lambda: [f64; 3],
    lambda_row: [f64; 3],
    dldx: [f64; 3],
    dldy: [f64; 3],
    min_bp: Vector2<f64>,
    max_bp: Vector2<f64>,
    front_facing: bool,
    id: usize,
}

/// z component of the 2D cross product; the signed area of the
/// parallelogram the two vectors span.
#[inline]
fn signed_parallelogram_area(a: Vector3<f64>, b: Vector3<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Top-left rule: an edge owns the pixels it passes through exactly when
/// it is a flat top edge or a left edge, assuming counter-clockwise order.
#[inline]
fn is_edge_flat_top_or_left(edge: Vector3<f64>) -> bool {
    (edge.x > 0.0 && roughly_zero(edge.y)) || edge.y < 0.0
}

/// `None` when the triangle must be culled; otherwise whether its NDC
/// winding is counter-clockwise and whether it faces front.
fn cull_classify(state: &DrawState<'_>, vertices: &[ClipVertex<'_>; 3]) -> Option<(bool, bool)> {
    let edge0 = (vertices[1].position - vertices[0].position).xyz();
    let edge1 = (vertices[2].position - vertices[0].position).xyz();
    let signed_area = signed_parallelogram_area(edge0, edge1);
    let is_ccw = signed_area > 0.0;

    if state.cull_face == Some(CullFace::FrontAndBack) {
        return None;
    }

    let front_facing = is_ccw == (state.front_face == FaceWinding::CounterClockwise);
    let cull = match state.cull_face {
        Some(CullFace::Front) => front_facing,
        Some(CullFace::Back) => !front_facing,
        _ => false,
    };

    if cull {
        None
    } else {
        Some((is_ccw, front_facing))
    }
}

impl<'a> Triangle<'a> {
    /// Perspective divide, culling, winding correction and barycentric
    /// setup. Returns `None` when the triangle is culled or degenerate.
    pub(crate) fn setup(
        state: &DrawState<'a>,
        framebuffer: &Framebuffer,
        mut vertices: [ClipVertex<'a>; 3],
        id: usize,
    ) -> Option<Triangle<'a>> {
        let mut inv_w = [0.0; 3];
        for (vertex, slot) in vertices.iter_mut().zip(&mut inv_w) {
            *slot = apply_perspective_divide(vertex);
        }

        let (is_ccw, front_facing) = cull_classify(state, &vertices)?;

        // Rasterization assumes counter-clockwise order.
        if !is_ccw {
            vertices.swap(1, 2);
            inv_w.swap(1, 2);
        }

        let screen = [0, 1, 2].map(|i| framebuffer.ndc_to_screen(vertices[i].position.xyz()));
        let edges = [0, 1, 2].map(|i| screen[(i + 1) % 3] - screen[i]);

        // Degenerate in screen space.
        let area_x2 = signed_parallelogram_area(edges[0], edges[2]).abs();
        if roughly_zero(area_x2) {
            return None;
        }

        let min_bp = Vector2::new(
            screen[0].x.min(screen[1].x).min(screen[2].x).floor(),
            screen[0].y.min(screen[1].y).min(screen[2].y).floor(),
        );
        let max_bp = Vector2::new(
            screen[0].x.max(screen[1].x).max(screen[2].x).ceil(),
            screen[0].y.max(screen[1].y).max(screen[2].y).ceil(),
        );

        // Barycentrics at the first pixel center of the bounding box.
        let point = Vector2::new(min_bp.x + 0.5, min_bp.y + 0.5);
        let to_point =
            [0, 1, 2].map(|i| Vector3::new(point.x - screen[i].x, point.y - screen[i].y, 0.0));

        let lambda = [
            signed_parallelogram_area(to_point[1], edges[1]) / area_x2,
            signed_parallelogram_area(to_point[2], edges[2]) / area_x2,
            signed_parallelogram_area(to_point[0], edges[0]) / area_x2,
        ];
        let dldx = [
            edges[1].y / area_x2,
            edges[2].y / area_x2,
            edges[0].y / area_x2,
        ];
        let dldy = [
            -edges[1].x / area_x2,
            -edges[2].x / area_x2,
            -edges[0].x / area_x2,
        ];

        Some(Triangle {
            vertices,
            inv_w,
            edge_top_left: edges.map(is_edge_flat_top_or_left),
            lambda,
            lambda_row: lambda,
            dldx,
            dldy,
            min_bp,
            max_bp,
            front_facing,
            id,
        })
    }

    /// Walk the bounding box and emit a fragment for every covered pixel
    /// center.
    pub(crate) fn rasterize<U>(
        &mut self,
        state: &DrawState<'_>,
        framebuffer: &mut Framebuffer,
        program: &ShaderProgram<'_, U>,
        scratch: &mut [u8],
    ) {
        let min_x = self.min_bp.x as usize;
        let max_x = self.max_bp.x as usize;
        let min_y = self.min_bp.y as usize;
        let max_y = self.max_bp.y as usize;

        for y in min_y..max_y {
            for x in min_x..max_x {
                // A pixel exactly on an edge belongs to this triangle only
                // when that edge is a top or left one.
                let rejected = (0..3)
                    .any(|i| roughly_zero(self.lambda[i]) && !self.edge_top_left[i]);

                if !rejected && self.lambda.iter().all(|&lambda| lambda >= 0.0) {
                    self.shade_pixel(state, framebuffer, program, scratch, x, y);
                }

                for i in 0..3 {
                    self.lambda[i] += self.dldx[i];
                }
            }

            for i in 0..3 {
                self.lambda_row[i] += self.dldy[i];
                self.lambda[i] = self.lambda_row[i];
            }
        }
    }

    fn shade_pixel<U>(
        &self,
        state: &DrawState<'_>,
        framebuffer: &mut Framebuffer,
        program: &ShaderProgram<'_, U>,
        scratch: &mut [u8],
        x: usize,
        y: usize,
    ) {
        let position =
            interpolate_position(&self.vertices, &self.lambda, &self.inv_w, state.perspective());
        let perspective = state.perspective().then(|| PerspectiveTerms {
            inv_w: &self.inv_w,
            interpolated_w: position.w,
        });
        interpolate_attributes(
            state,
            &program.vertex.layout,
            &self.vertices,
            &self.lambda,
            perspective,
            scratch,
        );

        let input = FsInput {
            uniform: program.uniform,
            varyings: &*scratch,
            frag_coord: Vector4::new(x as f64 + 0.5, y as f64 + 0.5, position.z, position.w),
            front_facing: self.front_facing,
            primitive_id: self.id,
        };
        emit_fragment(state, framebuffer, program, x, y, &input);
    }
}
