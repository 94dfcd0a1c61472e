//! Geometry validity and buffer engine
//!
//! Callers talk to [`GeometryEngine`], which owns the frame round-trips
//! (EPSG:4326 in and out, EPSG:3857 meters for the offset) and the
//! "never fail loudly" contract. The planar algorithms themselves sit behind
//! [`PlanarOps`] so another computational-geometry backend can be swapped in.

use geo::{BooleanOps, Buffer, Geometry, MultiPolygon, Polygon};

use super::projection::{project_geometry, unproject_geometry};
use super::validity::is_valid_simple_polygon;
use crate::error::{AoiError, Result};
use crate::geojson::{self, Feature, FeatureCollection, GeometryKind};

/// Distance used when a buffer of 0 (or an unset one) is requested, so that
/// points and lines always gain a usable footprint
pub const MIN_BUFFER_M: f64 = 1.0;

/// Planar geometry primitives the engine needs
pub trait PlanarOps {
    /// Valid simple polygon check
    fn is_valid(&self, geometry: &Geometry<f64>) -> bool;

    /// Offset `geometry` outward by `distance` in its own units, round joins
    fn buffer(&self, geometry: &Geometry<f64>, distance: f64) -> MultiPolygon<f64>;

    /// Polygon union
    fn union(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64>;
}

/// [`PlanarOps`] backed by the `geo` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoOps;

impl PlanarOps for GeoOps {
    fn is_valid(&self, geometry: &Geometry<f64>) -> bool {
        is_valid_simple_polygon(geometry)
    }

    fn buffer(&self, geometry: &Geometry<f64>, distance: f64) -> MultiPolygon<f64> {
        // the default buffer style uses round joins and round caps
        geometry.buffer(distance)
    }

    fn union(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        a.union(b)
    }
}

/// Collapse a multipolygon to a plain polygon when it has exactly one part
fn simplest(mut mp: MultiPolygon<f64>) -> Geometry<f64> {
    if mp.0.len() == 1
        && let Some(p) = mp.0.pop()
    {
        return Geometry::Polygon(p);
    }
    Geometry::MultiPolygon(mp)
}

fn into_multi(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        Geometry::MultiPolygon(mp) => Some(mp),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        _ => None,
    }
}

fn is_polygonal(geometry: &Geometry<f64>) -> bool {
    matches!(geometry, Geometry::Polygon(_) | Geometry::MultiPolygon(_))
}

#[derive(Debug, Clone, Default)]
pub struct GeometryEngine<P: PlanarOps = GeoOps> {
    ops: P,
}

impl GeometryEngine<GeoOps> {
    pub fn new() -> Self {
        Self { ops: GeoOps }
    }
}

impl<P: PlanarOps> GeometryEngine<P> {
    pub fn with_ops(ops: P) -> Self {
        Self { ops }
    }

    /// Validity of the first feature's geometry.
    ///
    /// Malformed or missing geometry is reported as invalid, never as an error.
    pub fn is_valid_polygon(&self, collection: &FeatureCollection) -> bool {
        let Some(geometry) = collection.features.first().and_then(|f| f.geometry.as_ref()) else {
            return false;
        };
        match geojson::to_geo(geometry) {
            Ok(g) => self.ops.is_valid(&g),
            Err(e) => {
                log::debug!("validity check on unreadable geometry: {e}");
                false
            }
        }
    }

    /// Validity of every feature in the collection
    pub fn all_valid(&self, collection: &FeatureCollection) -> bool {
        !collection.is_empty()
            && collection.features.iter().all(|f| {
                f.geometry
                    .as_ref()
                    .and_then(|g| geojson::to_geo(g).ok())
                    .is_some_and(|g| self.ops.is_valid(&g))
            })
    }

    /// Buffer a geographic geometry by `distance_m` meters.
    ///
    /// Polygons are returned unchanged unless `also_buffer_polygons` is set.
    /// A distance of 0 buffers by [`MIN_BUFFER_M`] instead.
    pub fn buffer_geometry(
        &self,
        geometry: &Geometry<f64>,
        distance_m: f64,
        also_buffer_polygons: bool,
    ) -> Geometry<f64> {
        if is_polygonal(geometry) && !also_buffer_polygons {
            return geometry.clone();
        }

        let distance = if distance_m == 0.0 || distance_m.is_nan() {
            MIN_BUFFER_M
        } else {
            distance_m
        };

        let projected = project_geometry(geometry);
        let buffered = self.ops.buffer(&projected, distance);
        log::trace!("buffered by {distance}m into {} part(s)", buffered.0.len());
        unproject_geometry(&simplest(buffered))
    }

    /// Buffer every feature and union the results into one geometry.
    ///
    /// Returns a single-feature collection. An empty union is reported as
    /// [`AoiError::EmptyBuffer`] so the caller can keep its previous state.
    pub fn buffer_feature_collection(
        &self,
        collection: &FeatureCollection,
        distance_m: f64,
        also_buffer_polygons: bool,
    ) -> Result<FeatureCollection> {
        let mut merged: Option<MultiPolygon<f64>> = None;

        for feature in &collection.features {
            let Some(geometry) = feature.geometry.as_ref() else {
                continue;
            };
            let geometry = match geojson::to_geo(geometry) {
                Ok(g) => g,
                Err(e) => {
                    log::warn!("skipping unreadable feature while buffering: {e}");
                    continue;
                }
            };
            let buffered = self.buffer_geometry(&geometry, distance_m, also_buffer_polygons);
            let Some(part) = into_multi(buffered) else {
                continue;
            };
            merged = Some(match merged {
                Some(acc) => self.ops.union(&acc, &part),
                None => part,
            });
        }

        let merged: Vec<Polygon<f64>> = merged.map(|mp| mp.0).unwrap_or_default();
        if merged.is_empty() {
            return Err(AoiError::EmptyBuffer);
        }

        let geometry = geojson::from_geo(&simplest(MultiPolygon::new(merged)));
        debug_assert!(matches!(
            geometry.kind(),
            GeometryKind::Polygon | GeometryKind::MultiPolygon
        ));
        Ok(FeatureCollection::single(Feature::new(geometry)))
    }
}
