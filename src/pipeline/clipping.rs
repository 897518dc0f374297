//! Clip-space primitive clipping
//!
//! Clipping runs on clip-space positions, before the perspective divide.
//! Polygons go through Sutherland-Hodgman against each of the six volume
//! planes in turn; lines are clipped parametrically. Vertices created at
//! plane crossings interpolate their position in clip space and their
//! varyings affinely, since no divide has happened yet.

use nalgebra::Vector4;
use smallvec::SmallVec;

use crate::shaders::VaryingLayout;

use super::interpolation::interpolate_attributes;
use super::vertex_processing::ClipVertex;
use super::{roughly_zero, DrawState};

/// The six planes bounding the clip-space volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClipPlane {
    Left,
    Right,
    Bottom,
    Top,
    Near,
    Far,
}

pub(crate) const ALL_CLIP_PLANES: [ClipPlane; 6] = [
    ClipPlane::Left,
    ClipPlane::Right,
    ClipPlane::Bottom,
    ClipPlane::Top,
    ClipPlane::Near,
    ClipPlane::Far,
];

impl ClipPlane {
    /// Signed distance of a clip-space position from the plane;
    /// non-negative means inside.
    #[inline]
    pub(crate) fn distance(self, position: &Vector4<f64>) -> f64 {
        match self {
            ClipPlane::Left => position.x + position.w,
            ClipPlane::Right => position.w - position.x,
            ClipPlane::Bottom => position.y + position.w,
            ClipPlane::Top => position.w - position.y,
            ClipPlane::Near => position.z + position.w,
            ClipPlane::Far => position.w - position.z,
        }
    }
}

/// A triangle clipped against six planes gains at most one vertex per
/// plane.
pub(crate) type ClipPolygon<'a> = SmallVec<[ClipVertex<'a>; 9]>;

/// Clip a triangle against the whole volume. The result is a convex
/// polygon with up to 9 vertices, empty when fully outside; the caller fan
/// retriangulates it.
pub(crate) fn clip_triangle<'a>(
    state: &DrawState<'a>,
    layout: &VaryingLayout,
    corners: [ClipVertex<'a>; 3],
) -> ClipPolygon<'a> {
    let mut polygon = ClipPolygon::from_slice(&corners);

    for plane in ALL_CLIP_PLANES {
        polygon = clip_against_plane(state, layout, &polygon, plane);
        if polygon.is_empty() {
            break;
        }
    }

    polygon
}

/// One Sutherland-Hodgman pass: walk the polygon's edges and keep the part
/// inside `plane`.
fn clip_against_plane<'a>(
    state: &DrawState<'a>,
    layout: &VaryingLayout,
    polygon: &[ClipVertex<'a>],
    plane: ClipPlane,
) -> ClipPolygon<'a> {
    let mut clipped = ClipPolygon::new();

    for i in 0..polygon.len() {
        let current = &polygon[i];
        let next = &polygon[(i + 1) % polygon.len()];

        let distance_current = plane.distance(&current.position);
        let distance_next = plane.distance(&next.position);
        let current_inside = distance_current >= 0.0;
        let next_inside = distance_next >= 0.0;

        if current_inside && next_inside {
            clipped.push(*next);
        } else if current_inside || next_inside {
            // The edge crosses the plane; a degenerate edge contributes
            // nothing.
            if roughly_zero(distance_current - distance_next) {
                continue;
            }
            let t = distance_current / (distance_current - distance_next);
            clipped.push(intersect(state, layout, current, next, t));

            if next_inside {
                clipped.push(*next);
            }
        }
    }

    clipped
}

/// Clip a line segment against the whole volume, returning `None` when it
/// is entirely outside.
pub(crate) fn clip_line<'a>(
    state: &DrawState<'a>,
    layout: &VaryingLayout,
    endpoints: [ClipVertex<'a>; 2],
) -> Option<[ClipVertex<'a>; 2]> {
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for plane in ALL_CLIP_PLANES {
        let distance_a = plane.distance(&endpoints[0].position);
        let distance_b = plane.distance(&endpoints[1].position);

        if distance_a < 0.0 && distance_b < 0.0 {
            return None;
        }
        if distance_a < 0.0 || distance_b < 0.0 {
            if roughly_zero(distance_a - distance_b) {
                continue;
            }
            let t = distance_a / (distance_a - distance_b);
            if distance_a < 0.0 {
                // Entering: push the start forward.
                t0 = t0.max(t);
            } else {
                // Leaving: pull the end back.
                t1 = t1.min(t);
            }
            if t0 > t1 {
                return None;
            }
        }
    }

    let [a, b] = endpoints;
    let mut clipped = endpoints;
    if t0 > 0.0 {
        clipped[0] = intersect(state, layout, &a, &b, t0);
    }
    if t1 < 1.0 {
        clipped[1] = intersect(state, layout, &a, &b, t1);
    }
    Some(clipped)
}

/// Build the vertex at parameter `t` along the edge from `a` to `b`.
fn intersect<'a>(
    state: &DrawState<'a>,
    layout: &VaryingLayout,
    a: &ClipVertex<'a>,
    b: &ClipVertex<'a>,
    t: f64,
) -> ClipVertex<'a> {
    let position = a.position * (1.0 - t) + b.position * t;

    let varyings = state.arena.alloc_zeroed(layout.stride());
    interpolate_attributes(
        state,
        layout,
        &[*a, *b],
        &[1.0 - t, t],
        None,
        varyings,
    );

    ClipVertex { position, varyings }
}
