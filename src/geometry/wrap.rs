//! Antimeridian wrap handling for the projected (periodic in X) frame
//!
//! The map repeats the world horizontally, so pointer-driven geometry can
//! land any number of world widths away from the valid projection extent.
//! These helpers shift such coordinates back by whole worlds.

use geo::{Coord, Geometry, LineString, MapCoords};

use super::Extent;

/// Number of whole worlds `x` must be shifted by to land inside `projection`
fn worlds_away(x: f64, projection: &Extent) -> f64 {
    ((projection.min_x - x) / projection.width()).ceil()
}

fn is_outside(x: f64, projection: &Extent) -> bool {
    x < projection.min_x || x > projection.max_x
}

/// Shift a single X value back into the projection's valid range.
/// Values on the boundary are left alone.
///
/// The shifted value is clamped because rounding can leave it a hair past
/// an edge, which would make a second unwrap jump to the other edge.
pub fn unwrap_x(x: f64, projection: &Extent) -> f64 {
    if is_outside(x, projection) {
        (x + projection.width() * worlds_away(x, projection))
            .clamp(projection.min_x, projection.max_x)
    } else {
        x
    }
}

pub fn unwrap_coord(coord: Coord<f64>, projection: &Extent) -> Coord<f64> {
    Coord {
        x: unwrap_x(coord.x, projection),
        y: coord.y,
    }
}

/// Unwrap every coordinate of every ring
pub fn unwrap_coordinates(rings: &[LineString<f64>], projection: &Extent) -> Vec<LineString<f64>> {
    rings
        .iter()
        .map(|ring| {
            ring.coords()
                .map(|c| unwrap_coord(*c, projection))
                .collect::<LineString<f64>>()
        })
        .collect()
}

/// Unwrap every coordinate of a projected geometry
pub fn unwrap_geometry(geometry: &Geometry<f64>, projection: &Extent) -> Geometry<f64> {
    let projection = *projection;
    geometry.map_coords(move |c| unwrap_coord(c, &projection))
}

/// Unwrap `min_x` and `max_x` independently.
///
/// Only meant for comparing extents: the two edges may come back from
/// different worlds, so the result can have `min_x > max_x`.
pub fn unwrap_extent(extent: &Extent, projection: &Extent) -> Extent {
    Extent {
        min_x: unwrap_x(extent.min_x, projection),
        max_x: unwrap_x(extent.max_x, projection),
        ..*extent
    }
}

/// Whether the view centre has scrolled past the valid projection extent
pub fn is_viewport_outside_valid_extent(center: Coord<f64>, projection: &Extent) -> bool {
    is_outside(center.x, projection)
}

/// The view centre shifted by the minimal whole-world offset that puts it
/// back inside the valid extent
pub fn snap_viewport_to_valid_extent(center: Coord<f64>, projection: &Extent) -> Coord<f64> {
    unwrap_coord(center, projection)
}

/// Round to 5 decimal places (about a meter at the equator)
pub fn truncate(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}
