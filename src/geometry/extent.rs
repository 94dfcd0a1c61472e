use geo::{BoundingRect, Coord, Geometry, LineString, Polygon};

use super::projection::{to_geographic, to_projected, unwrap_point};
use super::wrap::truncate;

/// Axis-aligned bounding box `(min_x, min_y, max_x, max_y)`
///
/// The reference frame (geographic degrees or projected meters) is implied
/// by the caller; nothing here converts between them implicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create an extent from a set of coordinates
    pub fn from_coords<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coord<f64>>,
    {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut extent = Self::new(first.x, first.y, first.x, first.y);
        for c in iter {
            extent.include(*c);
        }
        Some(extent)
    }

    /// Extent of any geometry, `None` when it has no coordinates
    pub fn of_geometry(geometry: &Geometry<f64>) -> Option<Self> {
        geometry
            .bounding_rect()
            .map(|r| Self::new(r.min().x, r.min().y, r.max().x, r.max().y))
    }

    pub fn include(&mut self, c: Coord<f64>) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }

    /// Grow to cover another extent
    pub fn extend(&mut self, other: &Extent) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    /// True when the box has no area (zero width or zero height)
    pub fn is_degenerate(&self) -> bool {
        self.min_x == self.max_x || self.min_y == self.max_y
    }

    /// Closed rectangle ring, wound the same way as a map toolkit's
    /// `Polygon.fromExtent`: min/min, min/max, max/max, max/min, min/min
    pub fn to_ring(&self) -> LineString<f64> {
        LineString::from(vec![
            (self.min_x, self.min_y),
            (self.min_x, self.max_y),
            (self.max_x, self.max_y),
            (self.max_x, self.min_y),
            (self.min_x, self.min_y),
        ])
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(self.to_ring(), vec![])
    }

    /// Convert a projected extent into a geographic bbox
    /// `[min_lon, min_lat, max_lon, max_lat]`, longitudes clamped to the
    /// antimeridian and every value truncated for transmission
    pub fn serialize(&self) -> [f64; 4] {
        let (min_lon, min_lat) = to_geographic(self.min_x, self.min_y);
        let (max_lon, max_lat) = to_geographic(self.max_x, self.max_y);
        let p1 = unwrap_point(Coord {
            x: min_lon,
            y: min_lat,
        });
        let p2 = unwrap_point(Coord {
            x: max_lon,
            y: max_lat,
        });
        [p1.x, p1.y, p2.x, p2.y].map(truncate)
    }

    /// Inverse of [`Extent::serialize`]: anything but a 4-value bbox is rejected
    pub fn deserialize(bbox: &[f64]) -> Option<Self> {
        if bbox.len() != 4 {
            return None;
        }
        let (min_x, min_y) = to_projected(bbox[0], bbox[1]);
        let (max_x, max_y) = to_projected(bbox[2], bbox[3]);
        Some(Self::new(min_x, min_y, max_x, max_y))
    }
}
