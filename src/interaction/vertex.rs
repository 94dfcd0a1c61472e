//! Vertex hit-testing and drag editing on projected polygon rings

use geo::{Coord, LineString};
use std::cmp::Ordering;

use crate::geometry::Extent;
use crate::viewport::Viewport;

/// Default pick radius around a vertex
pub const VERTEX_TOLERANCE_PX: f64 = 10.0;

/// Two box corners closer than this (in meters) on an axis are treated as
/// sharing that axis. Exact float equality drifts after repeated edits.
pub const CORNER_EPSILON: f64 = 1e-6;

fn cmp_coord(a: &Coord<f64>, b: &Coord<f64>) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// Whether a closed ring is an axis-aligned rectangle: exactly five points
/// whose first four are, in any order, the corners of its own bounding box
pub fn is_box(ring: &LineString<f64>) -> bool {
    if ring.0.len() != 5 {
        return false;
    }
    let Some(extent) = Extent::from_coords(&ring.0) else {
        return false;
    };

    let mut corners: Vec<Coord<f64>> = ring.0[..4].to_vec();
    let mut expected: Vec<Coord<f64>> = extent.to_ring().0[..4].to_vec();
    corners.sort_by(cmp_coord);
    expected.sort_by(cmp_coord);
    corners == expected
}

/// First vertex of `ring` within `tolerance_px` of `pixel` on both axes.
///
/// Pixel positions are rounded before comparing, so a vertex sitting exactly
/// `tolerance_px` away still counts as a hit.
pub fn find_vertex(
    pixel: Coord<f64>,
    ring: &LineString<f64>,
    tolerance_px: f64,
    viewport: &Viewport,
) -> Option<(usize, Coord<f64>)> {
    ring.0.iter().enumerate().find_map(|(i, coord)| {
        let px = viewport.pixel_from_coordinate(*coord);
        let dx = (pixel.x.round() - px.x.round()).abs();
        let dy = (pixel.y.round() - px.y.round()).abs();
        (dx <= tolerance_px && dy <= tolerance_px).then_some((i, *coord))
    })
}

/// An in-progress vertex drag. Lives from pointer-down to pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Index of the feature in the draw layer
    pub feature: usize,
    /// Polygon within a multipolygon, 0 for plain polygons
    pub polygon: usize,
    pub vertex: usize,
    /// Where the dragged vertex was after the last accepted update
    pub coordinate: Coord<f64>,
}

impl DragSession {
    pub fn new(feature: usize, polygon: usize, vertex: usize, coordinate: Coord<f64>) -> Self {
        Self {
            feature,
            polygon,
            vertex,
            coordinate,
        }
    }
}

fn close_enough(a: f64, b: f64) -> bool {
    (a - b).abs() <= CORNER_EPSILON
}

/// Move the dragged vertex of `ring` to `to`.
///
/// Boxes keep their shape: every corner sharing the dragged corner's X takes
/// the new X, and every corner sharing its Y takes the new Y. Other rings
/// move only the picked vertex (and its closing duplicate).
///
/// Returns `None` when the result would have no area; the caller keeps the
/// previous ring and the drag carries on.
pub fn drag_ring(
    ring: &LineString<f64>,
    session: &DragSession,
    to: Coord<f64>,
) -> Option<LineString<f64>> {
    let from = session.coordinate;
    let last = ring.0.len().checked_sub(1)?;

    let coords: Vec<Coord<f64>> = if is_box(ring) {
        ring.0
            .iter()
            .map(|c| Coord {
                x: if close_enough(c.x, from.x) { to.x } else { c.x },
                y: if close_enough(c.y, from.y) { to.y } else { c.y },
            })
            .collect()
    } else {
        let closing = ring.is_closed() && (session.vertex == 0 || session.vertex == last);
        ring.0
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let picked = i == session.vertex || (closing && (i == 0 || i == last));
                if picked { to } else { *c }
            })
            .collect()
    };

    let extent = Extent::from_coords(&coords)?;
    if extent.is_degenerate() {
        log::trace!("drag to ({:.1}, {:.1}) rejected: no area", to.x, to.y);
        return None;
    }
    Some(LineString::new(coords))
}
