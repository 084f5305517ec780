//! Prelude module for common mapbridge types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapbridge::prelude::*;`

pub use crate::core::{
    config::{CircleRenderConfig, MapbridgeConfig, MapbridgeProfile, ServiceConfig},
    geo::{LatLng, LatLngBounds, LatLngBoundsLiteral, LatLngLiteral},
    map::{MapOptions, MigrationMap},
    mvc::{BaseObject, MvcObject, PropertyBag},
};

pub use crate::layers::{
    circle::{Circle, CircleOptions},
    info_window::{InfoWindow, InfoWindowOptions},
    marker::{Marker, MarkerOptions},
    MapAttachment,
};

pub use crate::input::{
    events::{EventTarget, MapsEvent, MouseEvent},
    handler::{add_listener, add_listener_once, remove_listener, EventBus, EventHandler, MapsEventListener},
};

pub use crate::render::{
    DomElement, GeocoderControl, LayerSpec, ListenerId, RenderEvent, RenderListener, RenderMap,
    RenderMarker, RenderPopup,
};

pub use crate::backend::{Command, CommandOutput, LocationClient};

pub use crate::services::{
    directions::{DirectionsRenderer, DirectionsRequest, DirectionsService, TravelMode},
    geocoder::{Geocoder, GeocoderRequest, GeocoderResponse, GeocoderResult},
    places::{parse_or_find_location, Autocomplete, LocationInput, PlacesService, SearchBox},
    units::{
        format_distance_based_on_unit_system, format_duration_seconds,
        get_reverse_geocoded_addresses, get_unit_system_from_lat_long, is_point_in_imperial_country,
        UnitSystem,
    },
    ServiceError, Status,
};

pub use crate::{Error as MapsError, Result};

pub use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, Weak},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
