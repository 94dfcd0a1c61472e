//! Polygon validity and area checks on geographic (EPSG:4326) geometry

use geo::{Area, GeodesicArea, Geometry, Validation};

/// Whether a geometry is a valid simple polygon (or multipolygon).
///
/// Self-crossing rings, too-few-point rings and non-finite coordinates are
/// all invalid. Non-polygonal geometry never counts as a valid polygon.
pub fn is_valid_simple_polygon(geometry: &Geometry<f64>) -> bool {
    match geometry {
        Geometry::Polygon(p) => p.exterior().0.len() >= 4 && p.is_valid(),
        Geometry::MultiPolygon(mp) => {
            !mp.0.is_empty() && mp.iter().all(|p| p.exterior().0.len() >= 4) && mp.is_valid()
        }
        Geometry::Rect(r) => r.to_polygon().is_valid(),
        Geometry::Triangle(t) => t.to_polygon().is_valid(),
        _ => false,
    }
}

/// Whether the geometry covers a non-zero area
pub fn has_area(geometry: &Geometry<f64>) -> bool {
    geometry.unsigned_area() > 0.0
}

/// Ellipsoidal area in square kilometres.
///
/// Measured on the WGS84 ellipsoid rather than the plane so that
/// high-latitude selections are not inflated the way Mercator inflates them.
pub fn area_sq_km(geometry: &Geometry<f64>) -> f64 {
    let sq_m = match geometry {
        Geometry::Polygon(p) => p.geodesic_area_unsigned(),
        Geometry::MultiPolygon(mp) => mp.geodesic_area_unsigned(),
        Geometry::Rect(r) => r.to_polygon().geodesic_area_unsigned(),
        Geometry::Triangle(t) => t.to_polygon().geodesic_area_unsigned(),
        Geometry::GeometryCollection(gc) => gc.iter().map(area_sq_km).sum::<f64>() * 1e6,
        _ => 0.0,
    };
    sq_m / 1e6
}
