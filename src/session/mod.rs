//! The current Area of Interest and the rules for changing it

use crate::domain::{AoiRecord, Provenance, SearchResult};
use crate::error::{AoiError, Result};
use crate::geojson::{self, FeatureCollection, GeometryKind};
use crate::geometry::{GeoOps, GeometryEngine, PlanarOps, area_sq_km, has_area};

/// Largest buffer the session accepts unless configured otherwise
pub const DEFAULT_MAX_BUFFER_M: f64 = 10_000.0;

pub const CUSTOM_POLYGON_TITLE: &str = "Custom Polygon";

/// Whether a selection may be used for an export.
///
/// Every feature must cover some area (a lone point or line does not). When
/// `max_area_sq_km` is set, the summed ellipsoidal area must not exceed it.
pub fn is_selection_acceptable(collection: &FeatureCollection, max_area_sq_km: Option<f64>) -> bool {
    if collection.is_empty() {
        return false;
    }

    let mut total = 0.0;
    for feature in &collection.features {
        let Some(geometry) = feature.geometry.as_ref().and_then(|g| geojson::to_geo(g).ok()) else {
            return false;
        };
        if !has_area(&geometry) {
            return false;
        }
        total += area_sq_km(&geometry);
    }

    match max_area_sq_km {
        Some(max) if total > max => {
            log::debug!("selection of {total:.1} km² exceeds the {max} km² limit");
            false
        }
        _ => true,
    }
}

/// Holds at most one AOI record and applies edits to it
#[derive(Debug, Clone)]
pub struct AoiSession<P: PlanarOps = GeoOps> {
    record: Option<AoiRecord>,
    engine: GeometryEngine<P>,
    max_buffer_m: f64,
    max_area_sq_km: Option<f64>,
}

impl Default for AoiSession<GeoOps> {
    fn default() -> Self {
        Self::new(GeometryEngine::new())
    }
}

impl<P: PlanarOps> AoiSession<P> {
    pub fn new(engine: GeometryEngine<P>) -> Self {
        Self {
            record: None,
            engine,
            max_buffer_m: DEFAULT_MAX_BUFFER_M,
            max_area_sq_km: None,
        }
    }

    pub fn with_limits(mut self, max_buffer_m: f64, max_area_sq_km: Option<f64>) -> Self {
        self.max_buffer_m = max_buffer_m;
        self.max_area_sq_km = max_area_sq_km;
        self
    }

    pub fn engine(&self) -> &GeometryEngine<P> {
        &self.engine
    }

    pub fn record(&self) -> Option<&AoiRecord> {
        self.record.as_ref()
    }

    pub fn working(&self) -> Option<&FeatureCollection> {
        self.record.as_ref().map(AoiRecord::working)
    }

    pub fn max_buffer_m(&self) -> f64 {
        self.max_buffer_m
    }

    pub fn max_area_sq_km(&self) -> Option<f64> {
        self.max_area_sq_km
    }

    /// Start a new record. Working, base and original geometry are all set
    /// to `collection` and the buffer goes back to 0.
    pub fn set_from_drawn_geometry(
        &mut self,
        collection: FeatureCollection,
        provenance: Provenance,
        title: impl Into<String>,
        description: impl Into<String>,
    ) {
        let kind = collection.dominant_kind().unwrap_or(GeometryKind::Polygon);
        let record = AoiRecord::new(collection, kind, provenance, title, description);
        log::debug!(
            "new {} selection \"{}\" ({})",
            record.provenance(),
            record.title(),
            record.kind()
        );
        self.record = Some(record);
    }

    /// Use a search result as the selection
    pub fn set_from_search(&mut self, result: &SearchResult) {
        let description = result.description();
        self.set_from_drawn_geometry(
            FeatureCollection::single(result.feature.clone()),
            Provenance::Search,
            result.name.clone(),
            description,
        );
    }

    /// Use an imported file as the selection; it is labelled by its most
    /// common geometry type
    pub fn set_from_import(&mut self, collection: FeatureCollection, filename: &str) {
        let description = collection
            .dominant_kind()
            .map(|k| k.as_str())
            .unwrap_or_default();
        self.set_from_drawn_geometry(collection, Provenance::Import, filename, description);
    }

    /// Use the visible map area as the selection
    pub fn set_from_map_view(&mut self, collection: FeatureCollection) {
        self.set_from_drawn_geometry(
            collection,
            Provenance::MapView,
            CUSTOM_POLYGON_TITLE,
            "Map View",
        );
    }

    /// Replace the shape after a vertex edit. The edited shape becomes the
    /// new buffering base; the revert target is untouched.
    pub fn commit_edit(&mut self, collection: FeatureCollection) -> Result<()> {
        let record = self.record.as_mut().ok_or(AoiError::NoSelection)?;
        record.base = collection.clone();
        record.working = collection;
        record.buffer_m = 0.0;
        Ok(())
    }

    fn check_buffer(&self, distance_m: f64) -> Result<()> {
        if !(0.0..=self.max_buffer_m).contains(&distance_m) {
            log::debug!("rejecting buffer of {distance_m}m");
            return Err(AoiError::BufferOutOfRange {
                got: distance_m,
                max: self.max_buffer_m,
            });
        }
        Ok(())
    }

    /// Buffered geometry for `distance_m` without touching the record.
    ///
    /// A distance of 0 still buffers by [`MIN_BUFFER_M`](crate::geometry::MIN_BUFFER_M),
    /// so a point or line selection always gains an area.
    pub fn preview_buffer(&self, distance_m: f64) -> Result<FeatureCollection> {
        self.check_buffer(distance_m)?;
        let record = self.record.as_ref().ok_or(AoiError::NoSelection)?;
        self.engine
            .buffer_feature_collection(&record.base, distance_m, true)
    }

    /// Buffer the current base by `distance_m` and make it the working shape.
    ///
    /// On any error the previous buffer and geometry are kept.
    pub fn apply_buffer(&mut self, distance_m: f64) -> Result<&FeatureCollection> {
        let buffered = self.preview_buffer(distance_m)?;
        let record = self.record.as_mut().ok_or(AoiError::NoSelection)?;
        record.working = buffered;
        record.buffer_m = distance_m;
        Ok(&record.working)
    }

    /// Restore the originally selected shape and drop any buffer
    pub fn revert(&mut self) -> Result<&FeatureCollection> {
        let record = self.record.as_mut().ok_or(AoiError::NoSelection)?;
        record.working = record.original.clone();
        record.base = record.original.clone();
        record.buffer_m = 0.0;
        Ok(&record.working)
    }

    pub fn clear(&mut self) {
        if self.record.take().is_some() {
            log::debug!("selection cleared");
        }
    }

    pub fn is_selection_acceptable(&self, collection: &FeatureCollection) -> bool {
        is_selection_acceptable(collection, self.max_area_sq_km)
    }

    /// Whether the next step may proceed with the current working shape
    pub fn next_enabled(&self) -> bool {
        self.working()
            .is_some_and(|fc| self.is_selection_acceptable(fc))
    }
}
