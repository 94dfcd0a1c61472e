//! aoikit - Area of Interest selection, editing and buffering over a
//! wrapping Web Mercator map

pub mod api;
pub mod config;
pub mod domain;
pub mod editor;
pub mod error;
pub mod geojson;
pub mod geometry;
pub mod interaction;
pub mod session;
pub mod viewport;

pub use editor::{AoiEditor, DragOutcome, Signals};
pub use error::{AoiError, Result};
