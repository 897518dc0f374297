//! Point rasterization
//!
//! A point becomes an axis-aligned square of side `point_size` centered on
//! its screen-space position. There is no interpolation: every covered
//! pixel sees the vertex's own varying record.

use nalgebra::{Vector2, Vector4};

use crate::framebuffer::Framebuffer;
use crate::pipeline::vertex_processing::ClipVertex;
use crate::pipeline::DrawState;
use crate::shaders::{FsInput, ShaderProgram};

use super::emit_fragment;

pub(crate) struct Point<'a> {
    /// The shaded vertex, already in NDC.
    pub vertex: ClipVertex<'a>,
    pub id: usize,
}

impl Point<'_> {
    pub(crate) fn rasterize<U>(
        &self,
        state: &DrawState<'_>,
        framebuffer: &mut Framebuffer,
        program: &ShaderProgram<'_, U>,
    ) {
        let screen = framebuffer.ndc_to_screen(self.vertex.position.xyz());
        let half_size = state.point_size / 2.0;

        // The square in continuous screen coordinates.
        let min_bp = Vector2::new(screen.x - half_size, screen.y - half_size);
        let max_bp = Vector2::new(screen.x + half_size, screen.y + half_size);

        // Integer pixel bounds, clipped to the framebuffer.
        let width = framebuffer.width() as i64;
        let height = framebuffer.height() as i64;
        let min_x = min_bp.x.floor() as i64;
        let min_y = min_bp.y.floor() as i64;
        let max_x = max_bp.x.floor() as i64;
        let max_y = max_bp.y.floor() as i64;

        if max_x < 0 || max_y < 0 || min_x >= width || min_y >= height {
            return;
        }

        let min_x = min_x.max(0) as usize;
        let min_y = min_y.max(0) as usize;
        let max_x = max_x.min(width - 1) as usize;
        let max_y = max_y.min(height - 1) as usize;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let pixel_x = x as f64 + 0.5;
                let pixel_y = y as f64 + 0.5;

                // Half-open square coverage at pixel centers.
                if pixel_x < min_bp.x
                    || pixel_x >= max_bp.x
                    || pixel_y < min_bp.y
                    || pixel_y >= max_bp.y
                {
                    continue;
                }

                let input = FsInput {
                    uniform: program.uniform,
                    varyings: self.vertex.varyings,
                    frag_coord: Vector4::new(
                        pixel_x,
                        pixel_y,
                        self.vertex.position.z,
                        self.vertex.position.w,
                    ),
                    front_facing: true,
                    primitive_id: self.id,
                };
                emit_fragment(state, framebuffer, program, x, y, &input);
            }
        }
    }
}
