use geo::{Coord, Geometry, MapCoords};
use std::f64::consts::PI;

use super::Extent;

/// Spherical Web Mercator radius in meters (EPSG:3857)
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the projected world width: the projection spans `-HALF_WORLD..=HALF_WORLD`
pub const HALF_WORLD: f64 = PI * EARTH_RADIUS;

/// Latitude at which Web Mercator becomes square
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Valid extent of the Web Mercator projection in meters
pub const WEB_MERCATOR_EXTENT: Extent = Extent {
    min_x: -HALF_WORLD,
    min_y: -HALF_WORLD,
    max_x: HALF_WORLD,
    max_y: HALF_WORLD,
};

/// Project a geographic (lon, lat) pair to Web Mercator meters
///
/// Latitudes beyond the Mercator limit are clamped so poles map to the
/// top/bottom edge of the projected world instead of infinity.
pub fn to_projected(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y.clamp(-HALF_WORLD, HALF_WORLD))
}

/// Inverse of [`to_projected`]
pub fn to_geographic(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

pub fn project_coord(coord: Coord<f64>) -> Coord<f64> {
    let (x, y) = to_projected(coord.x, coord.y);
    Coord { x, y }
}

pub fn unproject_coord(coord: Coord<f64>) -> Coord<f64> {
    let (x, y) = to_geographic(coord.x, coord.y);
    Coord { x, y }
}

/// Transform a whole geometry from EPSG:4326 to EPSG:3857
pub fn project_geometry(geometry: &Geometry<f64>) -> Geometry<f64> {
    geometry.map_coords(project_coord)
}

/// Transform a whole geometry from EPSG:3857 back to EPSG:4326
pub fn unproject_geometry(geometry: &Geometry<f64>) -> Geometry<f64> {
    geometry.map_coords(unproject_coord)
}

/// Clamp a geographic point's longitude into `[-180, 180]`
pub fn unwrap_point(coord: Coord<f64>) -> Coord<f64> {
    let x = if coord.x > 0.0 {
        coord.x.min(180.0)
    } else {
        coord.x.max(-180.0)
    };
    Coord { x, y: coord.y }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_origin() {
        let (x, y) = to_projected(0.0, 0.0);
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn test_antimeridian_is_world_edge() {
        let (x, _) = to_projected(180.0, 0.0);
        assert!((x - HALF_WORLD).abs() < 1e-6);
        let (x, _) = to_projected(-180.0, 0.0);
        assert!((x + HALF_WORLD).abs() < 1e-6);
    }

    #[test]
    fn test_projection_round_trip() {
        let (x, y) = to_projected(55.2531, 25.2564);
        let (lon, lat) = to_geographic(x, y);
        assert!((lon - 55.2531).abs() < 1e-9);
        assert!((lat - 25.2564).abs() < 1e-9);
    }

    #[test]
    fn test_pole_is_clamped() {
        let (_, y) = to_projected(0.0, 90.0);
        assert!(y.is_finite());
        assert!((y - HALF_WORLD).abs() < 1.0);
    }

    #[test]
    fn test_unwrap_point_clamps_longitude() {
        let c = unwrap_point(Coord { x: 190.0, y: 10.0 });
        assert_eq!(c, Coord { x: 180.0, y: 10.0 });
        let c = unwrap_point(Coord { x: -200.0, y: -5.0 });
        assert_eq!(c, Coord { x: -180.0, y: -5.0 });
        let c = unwrap_point(Coord { x: 12.5, y: 1.0 });
        assert_eq!(c, Coord { x: 12.5, y: 1.0 });
    }
}
