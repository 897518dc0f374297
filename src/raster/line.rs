//! Line rasterization
//!
//! Lines step uniformly from one screen-space endpoint to the other, one
//! step per pixel of the longer axis, interpolating position and varyings
//! at each step and emitting the fragment at the rounded pixel.

use nalgebra::{Vector3, Vector4};

use crate::framebuffer::Framebuffer;
use crate::pipeline::interpolation::{
    interpolate_attributes, interpolate_position, PerspectiveTerms,
};
use crate::pipeline::vertex_processing::{apply_perspective_divide, ClipVertex};
use crate::pipeline::DrawState;
use crate::shaders::{FsInput, ShaderProgram};

use super::emit_fragment;

pub(crate) struct Line<'a> {
    vertices: [ClipVertex<'a>; 2],
    inv_w: [f64; 2],
    screen: [Vector3<f64>; 2],
    id: usize,
}

impl<'a> Line<'a> {
    /// Perspective divide and screen mapping for both endpoints.
    pub(crate) fn setup(
        framebuffer: &Framebuffer,
        mut endpoints: [ClipVertex<'a>; 2],
        id: usize,
    ) -> Line<'a> {
        let mut inv_w = [0.0; 2];
        for (vertex, slot) in endpoints.iter_mut().zip(&mut inv_w) {
            *slot = apply_perspective_divide(vertex);
        }

        let screen = [0, 1].map(|i| framebuffer.ndc_to_screen(endpoints[i].position.xyz()));

        Line {
            vertices: endpoints,
            inv_w,
            screen,
            id,
        }
    }

    pub(crate) fn rasterize<U>(
        &self,
        state: &DrawState<'_>,
        framebuffer: &mut Framebuffer,
        program: &ShaderProgram<'_, U>,
        scratch: &mut [u8],
    ) {
        let dx = self.screen[1].x - self.screen[0].x;
        let dy = self.screen[1].y - self.screen[0].y;

        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        let x_increment = dx / steps;
        let y_increment = dy / steps;
        let t_increment = 1.0 / steps;

        let mut x = self.screen[0].x;
        let mut y = self.screen[0].y;
        let mut t = 0.0;

        for _ in 0..=steps as usize {
            let pixel_x = x.round();
            let pixel_y = y.round();

            // Accumulated stepping error can land one step just past the
            // framebuffer edge.
            if pixel_x >= 0.0
                && pixel_y >= 0.0
                && (pixel_x as usize) < framebuffer.width()
                && (pixel_y as usize) < framebuffer.height()
            {
                self.shade_step(
                    state,
                    framebuffer,
                    program,
                    scratch,
                    pixel_x as usize,
                    pixel_y as usize,
                    t,
                );
            }

            x += x_increment;
            y += y_increment;
            t += t_increment;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn shade_step<U>(
        &self,
        state: &DrawState<'_>,
        framebuffer: &mut Framebuffer,
        program: &ShaderProgram<'_, U>,
        scratch: &mut [u8],
        x: usize,
        y: usize,
        t: f64,
    ) {
        let weights = [1.0 - t, t];
        let position =
            interpolate_position(&self.vertices, &weights, &self.inv_w, state.perspective());
        let perspective = state.perspective().then(|| PerspectiveTerms {
            inv_w: &self.inv_w,
            interpolated_w: position.w,
        });
        interpolate_attributes(
            state,
            &program.vertex.layout,
            &self.vertices,
            &weights,
            perspective,
            scratch,
        );

        let input = FsInput {
            uniform: program.uniform,
            varyings: &*scratch,
            frag_coord: Vector4::new(x as f64 + 0.5, y as f64 + 0.5, position.z, position.w),
            front_facing: true,
            primitive_id: self.id,
        };
        emit_fragment(state, framebuffer, program, x, y, &input);
    }
}
