//! # mapbridge
//!
//! A Google-Maps-style object model (maps, markers, circles, info windows,
//! geocoding, places and directions) implemented on top of a MapLibre-style
//! rendering library and a location-service backend.
//!
//! The adapters in this crate keep the caller-facing vocabulary (event names,
//! request shapes, `OK`/`UNKNOWN_ERROR` statuses, callback-plus-result delivery)
//! while driving the collaborators declared in [`render`] and [`backend`].

pub mod backend;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod render;
pub mod services;

pub mod prelude;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::MapbridgeConfig,
    geo::{LatLng, LatLngBounds, LatLngBoundsLiteral, LatLngLiteral},
    map::{MapOptions, MigrationMap},
    mvc::{MvcObject, PropertyBag},
};

pub use layers::{
    circle::{Circle, CircleOptions},
    info_window::{InfoWindow, InfoWindowOptions},
    marker::{Marker, MarkerOptions},
    MapAttachment,
};

pub use input::{
    events::{EventTarget, MapsEvent},
    handler::{add_listener, add_listener_once, remove_listener, MapsEventListener},
};

pub use services::{
    directions::{DirectionsRenderer, DirectionsService},
    geocoder::Geocoder,
    places::{Autocomplete, PlacesService, SearchBox},
    units::UnitSystem,
    ServiceError, Status,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapsError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Backend request failed: {0}")]
    BackendRequestFailed(String),

    #[error("{0} is not supported")]
    UnsupportedOperation(&'static str),

    #[error("Unknown result: {0}")]
    UnknownResult(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MapsError {
    /// Wraps a failure raised by a backend client.
    pub fn backend(error: anyhow::Error) -> Self {
        MapsError::BackendRequestFailed(format!("{error:#}"))
    }
}

/// Error type alias for convenience
pub type Error = MapsError;

/// Installs `env_logger` as the diagnostic channel. Safe to call repeatedly.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .try_init();
}
