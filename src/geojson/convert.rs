use geo::{Coord, LineString, MapCoords, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

use super::{Feature, FeatureCollection, Geometry, Position};
use crate::error::{AoiError, Result};
use crate::geometry::{Extent, project_geometry, truncate, unproject_geometry};

fn coord(position: &Position) -> Result<Coord<f64>> {
    match position.as_slice() {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        other => Err(AoiError::InvalidPosition(other.len())),
    }
}

fn line_string(positions: &[Position]) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(coord)
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|r| line_string(r));
    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => LineString::new(vec![]),
    };
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Convert a GeoJSON geometry into a `geo` geometry, keeping only x/y
pub fn to_geo(geometry: &Geometry) -> Result<geo::Geometry<f64>> {
    let converted: geo::Geometry<f64> = match geometry {
        Geometry::Point { coordinates } => Point::from(coord(coordinates)?).into(),
        Geometry::MultiPoint { coordinates } => coordinates
            .iter()
            .map(|p| coord(p).map(Point::from))
            .collect::<Result<Vec<_>>>()
            .map(MultiPoint::new)?
            .into(),
        Geometry::LineString { coordinates } => line_string(coordinates)?.into(),
        Geometry::MultiLineString { coordinates } => coordinates
            .iter()
            .map(|l| line_string(l))
            .collect::<Result<Vec<_>>>()
            .map(MultiLineString::new)?
            .into(),
        Geometry::Polygon { coordinates } => polygon(coordinates)?.into(),
        Geometry::MultiPolygon { coordinates } => coordinates
            .iter()
            .map(|p| polygon(p))
            .collect::<Result<Vec<_>>>()
            .map(MultiPolygon::new)?
            .into(),
        Geometry::GeometryCollection { geometries } => geometries
            .iter()
            .map(to_geo)
            .collect::<Result<Vec<_>>>()
            .map(|g| geo::Geometry::GeometryCollection(geo::GeometryCollection::new_from(g)))?,
    };
    Ok(converted)
}

fn position(c: &Coord<f64>) -> Position {
    vec![c.x, c.y]
}

fn positions(line: &LineString<f64>) -> Vec<Position> {
    line.coords().map(position).collect()
}

fn rings(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(positions)
        .collect()
}

/// Convert a `geo` geometry into GeoJSON.
///
/// `Line`, `Rect` and `Triangle` have no GeoJSON counterpart and are written
/// as the equivalent LineString / Polygon.
pub fn from_geo(geometry: &geo::Geometry<f64>) -> Geometry {
    match geometry {
        geo::Geometry::Point(p) => Geometry::Point {
            coordinates: position(&p.0),
        },
        geo::Geometry::MultiPoint(mp) => Geometry::MultiPoint {
            coordinates: mp.iter().map(|p| position(&p.0)).collect(),
        },
        geo::Geometry::Line(line) => Geometry::LineString {
            coordinates: vec![position(&line.start), position(&line.end)],
        },
        geo::Geometry::LineString(ls) => Geometry::LineString {
            coordinates: positions(ls),
        },
        geo::Geometry::MultiLineString(mls) => Geometry::MultiLineString {
            coordinates: mls.iter().map(positions).collect(),
        },
        geo::Geometry::Polygon(p) => Geometry::Polygon {
            coordinates: rings(p),
        },
        geo::Geometry::MultiPolygon(mp) => Geometry::MultiPolygon {
            coordinates: mp.iter().map(rings).collect(),
        },
        geo::Geometry::Rect(r) => Geometry::Polygon {
            coordinates: rings(&r.to_polygon()),
        },
        geo::Geometry::Triangle(t) => Geometry::Polygon {
            coordinates: rings(&t.to_polygon()),
        },
        geo::Geometry::GeometryCollection(gc) => Geometry::GeometryCollection {
            geometries: gc.iter().map(from_geo).collect(),
        },
    }
}

/// Wrap a projected (EPSG:3857) drawing into a one-feature collection in
/// EPSG:4326, with the feature's bbox and coordinates truncated
pub fn from_projected(geometry: &geo::Geometry<f64>) -> FeatureCollection {
    let mut feature = Feature::new(from_geo(&unproject_geometry(geometry).map_coords(|c| {
        Coord {
            x: truncate(c.x),
            y: truncate(c.y),
        }
    })));
    if let Some(extent) = Extent::of_geometry(geometry) {
        feature = feature.with_bbox(extent.serialize());
    }
    FeatureCollection::single(feature)
}

/// Read every feature of a geographic collection into the projected frame.
/// Features that cannot be read are skipped.
pub fn to_projected(collection: &FeatureCollection) -> Vec<geo::Geometry<f64>> {
    collection
        .geometries()
        .filter_map(|g| match to_geo(g) {
            Ok(g) => Some(project_geometry(&g)),
            Err(e) => {
                log::warn!("dropping unreadable {} from the draw layer: {e}", g.kind());
                None
            }
        })
        .collect()
}
