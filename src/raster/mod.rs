//! Primitive rasterization

pub(crate) mod line;
pub(crate) mod point;
pub(crate) mod triangle;

use crate::color::Color;
use crate::context::{MessageKind, MessageSeverity};
use crate::framebuffer::Framebuffer;
use crate::pipeline::DrawState;
use crate::shaders::{FsInput, FsOutput, ShaderProgram};

/// Run the fragment shader for one covered pixel, then depth-test and
/// write the result.
///
/// The fragment's depth is the shader's `frag_depth` when it wrote one
/// (anything but the NaN it starts as), otherwise the interpolated
/// `frag_coord.z`. A depth outside [-1, 1] is rejected so the depth plane
/// only ever holds NDC values.
pub(crate) fn emit_fragment<U>(
    state: &DrawState<'_>,
    framebuffer: &mut Framebuffer,
    program: &ShaderProgram<'_, U>,
    x: usize,
    y: usize,
    input: &FsInput<'_, U>,
) {
    let mut output = FsOutput::default();
    (program.fragment.shader)(input, &mut output);

    let depth = if output.frag_depth.is_nan() {
        input.frag_coord.z
    } else {
        output.frag_depth
    };
    if !(-1.0..=1.0).contains(&depth) {
        state.messages.emit(
            MessageSeverity::High,
            MessageKind::InvalidArgument,
            "emit_fragment",
            format_args!("fragment depth {depth} is outside [-1, 1]"),
        );
        return;
    }

    if framebuffer.depth_test(x, y, depth) {
        framebuffer.draw_pixel(x, y, depth, Color::from_normalized(output.color));
    }
}
