pub mod nominatim;

pub use nominatim::search_place;
