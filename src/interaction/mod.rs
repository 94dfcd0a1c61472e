//! Pointer-driven editing: the draw tool lifecycle and vertex dragging

pub mod draw;
pub mod vertex;

pub use draw::{DrawController, DrawOutcome};
pub use vertex::{
    CORNER_EPSILON, DragSession, VERTEX_TOLERANCE_PX, drag_ring, find_vertex, is_box,
};
