//! GeoJSON boundary types (RFC 7946) and conversion into `geo` geometries
//!
//! Selections enter and leave the core as GeoJSON in EPSG:4326. Only the
//! parts of the format the editor consumes are modelled; foreign members
//! on features are kept in `properties`.

mod convert;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{AoiError, Result};

pub use convert::{from_geo, from_projected, to_geo, to_projected};

/// `[x, y]` or `[x, y, z]`
pub type Position = Vec<f64>;

pub type Properties = Map<String, Value>;

/// The `type` member of a GeoJSON geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Position,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point { .. } => GeometryKind::Point,
            Geometry::MultiPoint { .. } => GeometryKind::MultiPoint,
            Geometry::LineString { .. } => GeometryKind::LineString,
            Geometry::MultiLineString { .. } => GeometryKind::MultiLineString,
            Geometry::Polygon { .. } => GeometryKind::Polygon,
            Geometry::MultiPolygon { .. } => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection { .. } => GeometryKind::GeometryCollection,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Properties>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            bbox: None,
            geometry: Some(geometry),
            properties: None,
        }
    }

    pub fn with_bbox(mut self, bbox: [f64; 4]) -> Self {
        self.bbox = Some(bbox.to_vec());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// String property, empty strings treated as absent
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            bbox: None,
            features,
        }
    }

    pub fn single(feature: Feature) -> Self {
        Self::new(vec![feature])
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn geometries(&self) -> impl Iterator<Item = &Geometry> {
        self.features.iter().filter_map(|f| f.geometry.as_ref())
    }

    /// Most frequent geometry type; ties go to the type seen first
    pub fn dominant_kind(&self) -> Option<GeometryKind> {
        let mut counts: HashMap<GeometryKind, usize> = HashMap::new();
        let mut order: Vec<GeometryKind> = Vec::new();

        for kind in self.geometries().map(Geometry::kind) {
            let count = counts.entry(kind).or_insert(0);
            if *count == 0 {
                order.push(kind);
            }
            *count += 1;
        }

        let mut best: Option<(GeometryKind, usize)> = None;
        for kind in order {
            let count = counts[&kind];
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((kind, count));
            }
        }
        best.map(|(kind, _)| kind)
    }
}

/// Any top-level GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeoJson {
    FeatureCollection(FeatureCollection),
    Feature(Feature),
    Geometry(Geometry),
}

impl GeoJson {
    /// Dispatch on the `type` member
    pub fn from_value(value: Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| AoiError::MalformedGeoJson("missing \"type\" member".to_string()))?;

        match kind {
            "FeatureCollection" => Ok(GeoJson::FeatureCollection(serde_json::from_value(value)?)),
            "Feature" => Ok(GeoJson::Feature(serde_json::from_value(value)?)),
            "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "Polygon"
            | "MultiPolygon" | "GeometryCollection" => {
                Ok(GeoJson::Geometry(serde_json::from_value(value)?))
            }
            other => Err(AoiError::MalformedGeoJson(format!(
                "unknown GeoJSON type \"{other}\""
            ))),
        }
    }

    /// Normalise to a feature collection.
    ///
    /// A bare `GeometryCollection` contributes one feature per member
    /// geometry so each part can be buffered and unioned on its own.
    pub fn into_feature_collection(self) -> FeatureCollection {
        match self {
            GeoJson::FeatureCollection(fc) => fc,
            GeoJson::Feature(feature) => FeatureCollection::single(feature),
            GeoJson::Geometry(Geometry::GeometryCollection { geometries }) => {
                FeatureCollection::new(geometries.into_iter().map(Feature::new).collect())
            }
            GeoJson::Geometry(geometry) => FeatureCollection::single(Feature::new(geometry)),
        }
    }
}

impl FromStr for GeoJson {
    type Err = AoiError;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(value)
    }
}
