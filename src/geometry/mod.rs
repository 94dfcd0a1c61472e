pub mod buffer;
pub mod extent;
pub mod projection;
pub mod validity;
pub mod wrap;

pub use buffer::{GeoOps, GeometryEngine, MIN_BUFFER_M, PlanarOps};
pub use extent::Extent;
pub use projection::{WEB_MERCATOR_EXTENT, project_geometry, unproject_geometry};
pub use validity::{area_sq_km, has_area, is_valid_simple_polygon};
pub use wrap::{
    is_viewport_outside_valid_extent, snap_viewport_to_valid_extent, truncate, unwrap_coordinates,
    unwrap_extent, unwrap_geometry,
};
