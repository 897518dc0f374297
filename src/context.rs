//! Pipeline state and draw entry points
//!
//! A [`Context`] is the explicit home of everything the pipeline used to be
//! able to assume globally: interpolation mode, face orientation and
//! culling, point size, the message callback and the per-draw arena. One
//! context serves one thread; draws run to completion on the caller.

use std::fmt;

use crate::arena::Arena;
use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::framebuffer::Framebuffer;
use crate::pipeline::topology::Primitive;
use crate::pipeline::{self, DrawState};
use crate::shaders::ShaderProgram;

/// Winding direction of a triangle's vertices, as seen in the final image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceWinding {
    Clockwise,
    CounterClockwise,
}

/// Which facing to cull. `None` on the context disables culling entirely;
/// `FrontAndBack` culls every triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    Front,
    Back,
    FrontAndBack,
}

/// How varyings are interpolated across a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Account for the perspective divide using the reciprocals of clip w.
    Perspective,
    /// Plain barycentric weighting in screen space.
    Affine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Something worth knowing that does not invalidate the draw.
    Warning,
    /// Out-of-range draw parameters, NaN where a number is required.
    InvalidArgument,
    /// A feature the pipeline does not implement.
    Unsupported,
    /// Inconsistent state the pipeline treats as a caller bug.
    ProgrammerError,
}

/// A diagnostic emitted by the pipeline.
///
/// Delivered synchronously through the context's message callback; the
/// callback must not re-enter the pipeline. When no callback is installed,
/// messages go to the `log` crate instead.
#[derive(Debug)]
pub struct Message<'a> {
    pub severity: MessageSeverity,
    pub kind: MessageKind,
    /// Name of the pipeline stage that produced the message.
    pub source: &'a str,
    pub text: &'a str,
}

pub(crate) struct MessageSink {
    callback: Option<Box<dyn Fn(&Message<'_>)>>,
}

impl MessageSink {
    pub(crate) fn new() -> MessageSink {
        MessageSink { callback: None }
    }

    /// Format and deliver a message. Only error paths call this, so the
    /// formatting cost never lands on a successful draw.
    pub(crate) fn emit(
        &self,
        severity: MessageSeverity,
        kind: MessageKind,
        source: &'static str,
        text: fmt::Arguments<'_>,
    ) {
        let text = text.to_string();
        match &self.callback {
            Some(callback) => callback(&Message {
                severity,
                kind,
                source,
                text: &text,
            }),
            None if kind == MessageKind::Warning => {
                log::warn!(target: "softpipe", "{source}: {text}");
            }
            None => {
                log::error!(target: "softpipe", "{source}: {text}");
            }
        }
    }
}

pub struct Context {
    interpolation_mode: InterpolationMode,
    front_face: FaceWinding,
    cull_face: Option<CullFace>,
    point_size: f64,
    messages: MessageSink,
    arena: Arena,
}

impl Context {
    pub fn new() -> Context {
        Context {
            interpolation_mode: InterpolationMode::Perspective,
            front_face: FaceWinding::CounterClockwise,
            cull_face: None,
            point_size: 1.0,
            messages: MessageSink::new(),
            arena: Arena::default(),
        }
    }

    pub fn interpolation_mode(&self) -> InterpolationMode {
        self.interpolation_mode
    }

    pub fn set_interpolation_mode(&mut self, mode: InterpolationMode) {
        self.interpolation_mode = mode;
    }

    /// The winding considered front-facing. Defaults to counter-clockwise.
    pub fn front_face(&self) -> FaceWinding {
        self.front_face
    }

    pub fn set_front_face(&mut self, winding: FaceWinding) {
        self.front_face = winding;
    }

    /// The facing culled before rasterization. Defaults to `None`.
    pub fn cull_face(&self) -> Option<CullFace> {
        self.cull_face
    }

    pub fn set_cull_face(&mut self, cull_face: Option<CullFace>) {
        self.cull_face = cull_face;
    }

    /// Side length, in pixels, of the square rasterized for each point.
    pub fn point_size(&self) -> f64 {
        self.point_size
    }

    /// Set the point size. NaN is rejected with an `InvalidArgument`
    /// message and leaves the current value in place.
    pub fn set_point_size(&mut self, point_size: f64) {
        if point_size.is_nan() {
            self.messages.emit(
                MessageSeverity::High,
                MessageKind::InvalidArgument,
                "set_point_size",
                format_args!("point size must not be NaN"),
            );
            return;
        }
        self.point_size = point_size;
    }

    /// Install a message callback. State the C API would have passed
    /// through a user pointer is simply captured by the closure.
    pub fn set_message_callback<F>(&mut self, callback: F)
    where
        F: Fn(&Message<'_>) + 'static,
    {
        self.messages.callback = Some(Box::new(callback));
    }

    /// Remove the message callback, routing messages to `log` again.
    pub fn clear_message_callback(&mut self) {
        self.messages.callback = None;
    }

    /// Draw `count` consecutive vertices starting at `start`.
    pub fn draw_vertex_buffer<U>(
        &mut self,
        vertex_buffer: &VertexBuffer,
        framebuffer: &mut Framebuffer,
        program: &ShaderProgram<'_, U>,
        primitive: Primitive,
        start: usize,
        count: usize,
    ) {
        self.draw(
            None,
            vertex_buffer,
            framebuffer,
            program,
            primitive,
            start,
            count,
        );
    }

    /// Draw `count` indices starting at stream position `start`.
    pub fn draw_index_buffer<U>(
        &mut self,
        index_buffer: &IndexBuffer,
        vertex_buffer: &VertexBuffer,
        framebuffer: &mut Framebuffer,
        program: &ShaderProgram<'_, U>,
        primitive: Primitive,
        start: usize,
        count: usize,
    ) {
        self.draw(
            Some(index_buffer),
            vertex_buffer,
            framebuffer,
            program,
            primitive,
            start,
            count,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn draw<U>(
        &mut self,
        index_buffer: Option<&IndexBuffer>,
        vertex_buffer: &VertexBuffer,
        framebuffer: &mut Framebuffer,
        program: &ShaderProgram<'_, U>,
        primitive: Primitive,
        start: usize,
        count: usize,
    ) {
        {
            let state = DrawState {
                interpolation_mode: self.interpolation_mode,
                front_face: self.front_face,
                cull_face: self.cull_face,
                point_size: self.point_size,
                arena: &self.arena,
                messages: &self.messages,
            };
            pipeline::draw_buffer(
                &state,
                index_buffer,
                vertex_buffer,
                framebuffer,
                program,
                primitive,
                start,
                count,
            );
        }

        // Every per-draw allocation dies here.
        self.arena.reset();
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}
