pub mod countries;
pub mod geojson;

pub use geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry};
