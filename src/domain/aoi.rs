use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geojson::{FeatureCollection, GeometryKind};

/// How a selection was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    Search,
    Box,
    Free,
    MapView,
    Import,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Search => "search",
            Provenance::Box => "box",
            Provenance::Free => "free",
            Provenance::MapView => "mapView",
            Provenance::Import => "import",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The current Area of Interest
///
/// `original` is fixed when the record is created and is what `revert`
/// restores. `base` is the latest un-buffered shape (the original, or the
/// result of a vertex edit) and is what buffering is computed from, so
/// buffer changes never compound. `working` is what downstream consumers see.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AoiRecord {
    #[serde(rename = "geojson")]
    pub(crate) working: FeatureCollection,
    #[serde(rename = "originalGeojson")]
    pub(crate) original: FeatureCollection,
    #[serde(skip)]
    pub(crate) base: FeatureCollection,
    #[serde(rename = "geomType")]
    pub(crate) kind: GeometryKind,
    pub(crate) title: String,
    pub(crate) description: String,
    #[serde(rename = "selectionType")]
    pub(crate) provenance: Provenance,
    #[serde(rename = "buffer")]
    pub(crate) buffer_m: f64,
}

impl AoiRecord {
    pub fn new(
        geometry: FeatureCollection,
        kind: GeometryKind,
        provenance: Provenance,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            working: geometry.clone(),
            base: geometry.clone(),
            original: geometry,
            kind,
            title: title.into(),
            description: description.into(),
            provenance,
            buffer_m: 0.0,
        }
    }

    pub fn working(&self) -> &FeatureCollection {
        &self.working
    }

    pub fn original(&self) -> &FeatureCollection {
        &self.original
    }

    pub fn base(&self) -> &FeatureCollection {
        &self.base
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn buffer_m(&self) -> f64 {
        self.buffer_m
    }

    /// Whether the working geometry differs from what was originally selected
    pub fn is_modified(&self) -> bool {
        self.working != self.original || self.buffer_m != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::{Feature, Geometry};

    #[test]
    fn test_new_record_starts_unbuffered() {
        let fc = FeatureCollection::single(Feature::new(Geometry::Point {
            coordinates: vec![1.0, 2.0],
        }));
        let record = AoiRecord::new(
            fc.clone(),
            GeometryKind::Point,
            Provenance::Search,
            "Somewhere",
            "Country",
        );
        assert_eq!(record.working(), &fc);
        assert_eq!(record.original(), &fc);
        assert_eq!(record.base(), &fc);
        assert_eq!(record.buffer_m(), 0.0);
        assert!(!record.is_modified());
    }

    #[test]
    fn test_serialized_shape() {
        let record = AoiRecord::new(
            FeatureCollection::default(),
            GeometryKind::Polygon,
            Provenance::MapView,
            "Custom Polygon",
            "Map View",
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["selectionType"], "mapView");
        assert_eq!(value["geomType"], "Polygon");
        assert_eq!(value["buffer"], 0.0);
        assert!(value.get("base").is_none());
    }
}
