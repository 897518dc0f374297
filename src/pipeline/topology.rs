//! Primitive topology
//!
//! Maps a primitive kind and a primitive number to the stream positions it
//! reads. The dispatcher guarantees each table is only consulted for its
//! own primitive family.

use crate::context::{MessageKind, MessageSeverity};

use super::DrawState;

/// The kinds of primitives a draw call can assemble.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Primitive {
    Triangle,
    TriangleStrip,
    TriangleFan,
    Line,
    LineStrip,
    LineLoop,
    Point,
}

impl Primitive {
    pub(crate) fn is_triangle_based(self) -> bool {
        matches!(
            self,
            Primitive::Triangle | Primitive::TriangleStrip | Primitive::TriangleFan
        )
    }

    pub(crate) fn is_line_based(self) -> bool {
        matches!(
            self,
            Primitive::Line | Primitive::LineStrip | Primitive::LineLoop
        )
    }
}

/// Number of triangles assembled from `vertex_count` stream positions.
pub(crate) fn triangle_count(vertex_count: usize, primitive: Primitive) -> usize {
    match primitive {
        Primitive::Triangle => vertex_count / 3,
        Primitive::TriangleStrip | Primitive::TriangleFan => vertex_count.saturating_sub(2),
        _ => unreachable!("not a triangle-based primitive"),
    }
}

/// Stream positions read by triangle number `raw_index`.
pub(crate) fn triangle_stream_indices(
    base: usize,
    raw_index: usize,
    primitive: Primitive,
) -> [usize; 3] {
    match primitive {
        Primitive::Triangle => {
            let first = base + raw_index * 3;
            [first, first + 1, first + 2]
        }
        Primitive::TriangleStrip => {
            // Odd triangles swap their first two vertices so the visible
            // winding matches the even ones.
            let odd = raw_index % 2 == 1;
            if odd {
                [base + raw_index + 1, base + raw_index, base + raw_index + 2]
            } else {
                [base + raw_index, base + raw_index + 1, base + raw_index + 2]
            }
        }
        Primitive::TriangleFan => [base, base + raw_index + 1, base + raw_index + 2],
        _ => unreachable!("not a triangle-based primitive"),
    }
}

/// Number of lines assembled from `vertex_count` stream positions.
pub(crate) fn line_count(vertex_count: usize, primitive: Primitive) -> usize {
    match primitive {
        Primitive::Line => vertex_count / 2,
        Primitive::LineStrip => vertex_count.saturating_sub(1),
        Primitive::LineLoop => {
            if vertex_count > 1 {
                vertex_count
            } else {
                0
            }
        }
        _ => unreachable!("not a line-based primitive"),
    }
}

/// Stream positions read by line number `raw_index`.
pub(crate) fn line_stream_indices(
    base: usize,
    raw_index: usize,
    primitive: Primitive,
    vertex_count: usize,
) -> [usize; 2] {
    match primitive {
        Primitive::Line => [base + raw_index * 2, base + raw_index * 2 + 1],
        Primitive::LineStrip => [base + raw_index, base + raw_index + 1],
        Primitive::LineLoop => [base + raw_index, base + (raw_index + 1) % vertex_count],
        _ => unreachable!("not a line-based primitive"),
    }
}

/// Warn when trailing stream positions cannot form a whole primitive.
pub(crate) fn warn_on_excess_vertices(
    state: &DrawState<'_>,
    primitive: Primitive,
    vertex_count: usize,
) {
    match primitive {
        Primitive::Line if vertex_count % 2 != 0 => {
            state.messages.emit(
                MessageSeverity::Low,
                MessageKind::Warning,
                "draw_buffer",
                format_args!("odd vertex count when drawing lines; the last vertex is ignored"),
            );
        }
        Primitive::Triangle if vertex_count % 3 != 0 => {
            state.messages.emit(
                MessageSeverity::Low,
                MessageKind::Warning,
                "draw_buffer",
                format_args!(
                    "vertex count not divisible by 3 when drawing triangles; \
                     the last {} vertices are ignored",
                    vertex_count % 3
                ),
            );
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_counts() {
        assert_eq!(triangle_count(7, Primitive::Triangle), 2);
        assert_eq!(triangle_count(7, Primitive::TriangleStrip), 5);
        assert_eq!(triangle_count(7, Primitive::TriangleFan), 5);
        assert_eq!(triangle_count(2, Primitive::TriangleStrip), 0);
    }

    #[test]
    fn strip_swaps_odd_triangles() {
        assert_eq!(
            triangle_stream_indices(10, 0, Primitive::TriangleStrip),
            [10, 11, 12]
        );
        assert_eq!(
            triangle_stream_indices(10, 1, Primitive::TriangleStrip),
            [12, 11, 13]
        );
        assert_eq!(
            triangle_stream_indices(10, 2, Primitive::TriangleStrip),
            [12, 13, 14]
        );
    }

    #[test]
    fn fan_pivots_on_the_base_vertex() {
        assert_eq!(
            triangle_stream_indices(4, 2, Primitive::TriangleFan),
            [4, 7, 8]
        );
    }

    #[test]
    fn line_counts() {
        assert_eq!(line_count(7, Primitive::Line), 3);
        assert_eq!(line_count(7, Primitive::LineStrip), 6);
        assert_eq!(line_count(7, Primitive::LineLoop), 7);
        assert_eq!(line_count(1, Primitive::LineLoop), 0);
        assert_eq!(line_count(0, Primitive::LineStrip), 0);
    }

    #[test]
    fn loop_wraps_to_the_first_vertex() {
        assert_eq!(line_stream_indices(3, 4, Primitive::LineLoop, 5), [7, 3]);
        assert_eq!(line_stream_indices(3, 1, Primitive::LineLoop, 5), [4, 5]);
    }
}
