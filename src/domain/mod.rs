pub mod aoi;
pub mod draw_mode;
pub mod search;

pub use aoi::{AoiRecord, Provenance};
pub use draw_mode::{DrawMode, ToolEvent};
pub use search::SearchResult;
