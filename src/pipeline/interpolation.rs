//! Attribute and position interpolation
//!
//! Positions interpolate linearly in screen space in x, y and z; w carries
//! the perspective term. Varying attributes interpolate element-by-element
//! according to the program's varying layout: affinely as
//! `sum(w_i * a_i)`, or perspective-correct as
//! `(1 / sum(w_i / W_i)) * sum(w_i * a_i / W_i)` with `W_i` the clip-space
//! w of each vertex. The same routine serves triangles (three barycentric
//! weights), lines (two parametric weights) and clip-edge vertices.

use nalgebra::Vector4;

use crate::buffer::ElementType;
use crate::context::{MessageKind, MessageSeverity};
use crate::shaders::{self, VaryingLayout};

use super::vertex_processing::ClipVertex;
use super::DrawState;

/// The extra inputs perspective-correct interpolation needs on top of the
/// plain weights.
pub(crate) struct PerspectiveTerms<'a> {
    /// Reciprocal clip-space w of each vertex.
    pub inv_w: &'a [f64],
    /// Reciprocal of the interpolated 1/w, i.e. the fragment's w.
    pub interpolated_w: f64,
}

/// Interpolate a position from per-vertex weights. z is linear in screen
/// space either way; w becomes the perspective term or 1.
pub(crate) fn interpolate_position(
    vertices: &[ClipVertex<'_>],
    weights: &[f64],
    inv_w: &[f64],
    perspective: bool,
) -> Vector4<f64> {
    let mut position = Vector4::zeros();
    for (vertex, weight) in vertices.iter().zip(weights) {
        position.x += vertex.position.x * weight;
        position.y += vertex.position.y * weight;
        position.z += vertex.position.z * weight;
    }

    position.w = if perspective {
        let denominator: f64 = inv_w.iter().zip(weights).map(|(iw, w)| iw * w).sum();
        1.0 / denominator
    } else {
        1.0
    };

    position
}

/// Interpolate every attribute of the varying layout into `out`.
///
/// Only `F64` elements are implemented; any other element type is reported
/// as unsupported and its bytes keep their zero initialization.
pub(crate) fn interpolate_attributes(
    state: &DrawState<'_>,
    layout: &VaryingLayout,
    vertices: &[ClipVertex<'_>],
    weights: &[f64],
    perspective: Option<PerspectiveTerms<'_>>,
    out: &mut [u8],
) {
    for (index, attribute) in layout.attributes().iter().enumerate() {
        let base = layout.offset(index);

        match attribute.ty {
            ElementType::F64 => {
                for element in 0..attribute.count {
                    let offset = base + element * 8;

                    let mut sum = 0.0;
                    match &perspective {
                        Some(terms) => {
                            for ((vertex, weight), inv_w) in
                                vertices.iter().zip(weights).zip(terms.inv_w)
                            {
                                sum += shaders::get_f64(vertex.varyings, offset) * inv_w * weight;
                            }
                            sum *= terms.interpolated_w;
                        }
                        None => {
                            for (vertex, weight) in vertices.iter().zip(weights) {
                                sum += shaders::get_f64(vertex.varyings, offset) * weight;
                            }
                        }
                    }

                    shaders::put_f64(out, offset, sum);
                }
            }
            other => {
                state.messages.emit(
                    MessageSeverity::High,
                    MessageKind::Unsupported,
                    "interpolate_attributes",
                    format_args!("interpolation of {other:?} attribute elements is not implemented"),
                );
            }
        }
    }
}
