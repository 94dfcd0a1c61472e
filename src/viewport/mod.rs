//! Map viewport: centre + resolution over the projected (EPSG:3857) frame
//!
//! The viewport is an owned value handed to whoever needs it; there is no
//! shared map instance.

use geo::{Coord, Geometry};

use crate::geometry::wrap::{is_viewport_outside_valid_extent, snap_viewport_to_valid_extent};
use crate::geometry::{Extent, WEB_MERCATOR_EXTENT};

pub const DEFAULT_TILE_SIZE: f64 = 256.0;

/// Extent the "reset map" control zooms to: the whole inhabited world
/// without the empty polar rows
pub const WORLD_VIEW_EXTENT: Extent = Extent {
    min_x: -14_251_567.507_896_82,
    min_y: -10_584_983.780_136_958,
    max_x: 14_251_787.507_896_82,
    max_y: 10_584_983.780_136_958,
};

/// Discrete zoom level for a resolution (meters per pixel), floored
pub fn zoom_level_for(resolution: f64, projection: &Extent, tile_size: f64) -> i32 {
    let max_resolution = projection.width() / tile_size;
    (max_resolution / resolution).log2().floor() as i32
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    center: Coord<f64>,
    /// meters per pixel
    resolution: f64,
    width_px: f64,
    height_px: f64,
    tile_size: f64,
    min_zoom: u8,
    max_zoom: u8,
    projection: Extent,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

impl Viewport {
    /// A Web Mercator viewport at zoom 2, centred just east of the origin
    pub fn new(width_px: f64, height_px: f64) -> Self {
        let mut viewport = Self {
            center: Coord { x: 110.0, y: 0.0 },
            resolution: 1.0,
            width_px,
            height_px,
            tile_size: DEFAULT_TILE_SIZE,
            min_zoom: 2,
            max_zoom: 22,
            projection: WEB_MERCATOR_EXTENT,
        };
        viewport.set_zoom(2.0);
        viewport
    }

    pub fn with_zoom_limits(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom.min(max_zoom);
        self.max_zoom = max_zoom.max(min_zoom);
        self.set_resolution(self.resolution);
        self
    }

    pub fn with_tile_size(mut self, tile_size: f64) -> Self {
        let zoom = self.zoom();
        self.tile_size = tile_size;
        self.set_zoom(zoom);
        self
    }

    pub fn center(&self) -> Coord<f64> {
        self.center
    }

    pub fn set_center(&mut self, center: Coord<f64>) {
        self.center = center;
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn projection(&self) -> &Extent {
        &self.projection
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width_px, self.height_px)
    }

    fn max_resolution(&self) -> f64 {
        self.projection.width() / self.tile_size
    }

    fn resolution_for_zoom(&self, zoom: f64) -> f64 {
        self.max_resolution() / 2f64.powf(zoom)
    }

    /// Set the resolution, clamped to the zoom limits
    pub fn set_resolution(&mut self, resolution: f64) {
        let finest = self.resolution_for_zoom(self.max_zoom as f64);
        let coarsest = self.resolution_for_zoom(self.min_zoom as f64);
        self.resolution = resolution.clamp(finest, coarsest);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.set_resolution(self.resolution_for_zoom(zoom));
    }

    /// Continuous zoom
    pub fn zoom(&self) -> f64 {
        (self.max_resolution() / self.resolution).log2()
    }

    /// Zoom level for display
    pub fn zoom_level(&self) -> i32 {
        zoom_level_for(self.resolution, &self.projection, self.tile_size)
    }

    /// Visible extent at the current centre and resolution
    pub fn calculate_extent(&self) -> Extent {
        let half_w = self.width_px * self.resolution / 2.0;
        let half_h = self.height_px * self.resolution / 2.0;
        Extent::new(
            self.center.x - half_w,
            self.center.y - half_h,
            self.center.x + half_w,
            self.center.y + half_h,
        )
    }

    /// Centre on the extent and pick the resolution that fits it
    pub fn fit_extent(&mut self, extent: &Extent) {
        self.center = extent.center();
        let resolution = (extent.width() / self.width_px).max(extent.height() / self.height_px);
        if resolution > 0.0 && resolution.is_finite() {
            self.set_resolution(resolution);
        }
    }

    /// Points centre the view and keep the zoom; everything else is fitted
    pub fn fit_to_geometry(&mut self, geometry: &Geometry<f64>) {
        match geometry {
            Geometry::Point(p) => self.center = p.0,
            other => {
                if let Some(extent) = Extent::of_geometry(other) {
                    self.fit_extent(&extent);
                }
            }
        }
    }

    /// Show the whole world
    pub fn reset_to_world(&mut self) {
        self.fit_extent(&WORLD_VIEW_EXTENT);
    }

    /// Pixel position of a projected coordinate, origin top-left
    pub fn pixel_from_coordinate(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (coord.x - self.center.x) / self.resolution + self.width_px / 2.0,
            y: (self.center.y - coord.y) / self.resolution + self.height_px / 2.0,
        }
    }

    pub fn coordinate_from_pixel(&self, pixel: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.center.x + (pixel.x - self.width_px / 2.0) * self.resolution,
            y: self.center.y - (pixel.y - self.height_px / 2.0) * self.resolution,
        }
    }

    pub fn is_outside_valid_extent(&self) -> bool {
        is_viewport_outside_valid_extent(self.center, &self.projection)
    }

    /// Shift the centre back into the valid extent, keeping the same view.
    /// Returns whether anything moved.
    pub fn go_to_valid_extent(&mut self) -> bool {
        if !self.is_outside_valid_extent() {
            return false;
        }
        let snapped = snap_viewport_to_valid_extent(self.center, &self.projection);
        log::debug!(
            "viewport centre {:.1} wrapped back to {:.1}",
            self.center.x,
            snapped.x
        );
        self.center = snapped;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::projection::HALF_WORLD;
    use geo::{Point, Rect};

    #[test]
    fn test_zoom_level_is_floored() {
        let vp = Viewport::default();
        let res_at_3 = vp.resolution_for_zoom(3.0);
        assert_eq!(zoom_level_for(res_at_3, &WEB_MERCATOR_EXTENT, 256.0), 3);
        assert_eq!(
            zoom_level_for(res_at_3 * 0.9, &WEB_MERCATOR_EXTENT, 256.0),
            3
        );
        assert_eq!(
            zoom_level_for(res_at_3 * 0.45, &WEB_MERCATOR_EXTENT, 256.0),
            4
        );
    }

    #[test]
    fn test_zoom_zero_resolution() {
        // one 256px tile covers the whole world at zoom 0
        let res = 2.0 * HALF_WORLD / 256.0;
        assert_eq!(zoom_level_for(res, &WEB_MERCATOR_EXTENT, 256.0), 0);
    }

    #[test]
    fn test_point_centres_without_zoom_change() {
        let mut vp = Viewport::default();
        vp.set_zoom(7.0);
        let before = vp.resolution();
        vp.fit_to_geometry(&Point::new(5000.0, -300.0).into());
        assert_eq!(vp.center(), Coord { x: 5000.0, y: -300.0 });
        assert_eq!(vp.resolution(), before);
    }

    #[test]
    fn test_fit_polygon_covers_extent() {
        let mut vp = Viewport::new(800.0, 600.0);
        let rect = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 80_000.0, y: 30_000.0 });
        vp.fit_to_geometry(&rect.to_polygon().into());
        let visible = vp.calculate_extent();
        assert!(visible.min_x <= 0.0 + 1e-6 && visible.max_x >= 80_000.0 - 1e-6);
        assert!(visible.min_y <= 0.0 + 1e-6 && visible.max_y >= 30_000.0 - 1e-6);
        assert_eq!(vp.center(), Coord { x: 40_000.0, y: 15_000.0 });
    }

    #[test]
    fn test_resolution_clamped_to_zoom_limits() {
        let mut vp = Viewport::default();
        vp.set_resolution(1e-9);
        assert_eq!(vp.zoom_level(), 22);
        vp.set_resolution(1e12);
        assert_eq!(vp.zoom_level(), 2);
    }

    #[test]
    fn test_pixel_round_trip() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.set_center(Coord { x: 1000.0, y: 2000.0 });
        vp.set_zoom(10.0);
        let coord = Coord { x: 1500.0, y: 1800.0 };
        let pixel = vp.pixel_from_coordinate(coord);
        let back = vp.coordinate_from_pixel(pixel);
        assert!((back.x - coord.x).abs() < 1e-6);
        assert!((back.y - coord.y).abs() < 1e-6);
        assert_eq!(
            vp.pixel_from_coordinate(vp.center()),
            Coord { x: 400.0, y: 300.0 }
        );
    }

    #[test]
    fn test_reset_to_world() {
        let mut vp = Viewport::default();
        vp.set_center(Coord { x: 1.0e6, y: 2.0e6 });
        vp.set_zoom(12.0);
        vp.reset_to_world();
        assert!((vp.center().x - 110.0).abs() < 1e-6);
        assert_eq!(vp.center().y, 0.0);
        assert!(vp.zoom_level() <= 2);
    }

    #[test]
    fn test_go_to_valid_extent() {
        let mut vp = Viewport::default();
        vp.set_center(Coord {
            x: 3.0 * HALF_WORLD,
            y: 10.0,
        });
        assert!(vp.is_outside_valid_extent());
        assert!(vp.go_to_valid_extent());
        assert!(!vp.is_outside_valid_extent());
        assert!(!vp.go_to_valid_extent());
    }
}
