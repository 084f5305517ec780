//! Boundary to the rendering library.
//!
//! The adapters never draw anything themselves; they drive these traits,
//! which mirror the source/layer/marker/popup surface of a MapLibre-style
//! renderer. Coordinates cross this boundary in `[lng, lat]` order.
//!
//! Contract shared by every `off`/`remove_*` method: removing something that
//! is not registered is a silent no-op.

use crate::{data::geojson::GeoJson, prelude::Arc, Result};
use serde::Serialize;

pub type ListenerId = u64;

/// Listener attached to a render-library or DOM event.
pub type RenderListener = Arc<dyn Fn(&RenderEvent) + Send + Sync>;

/// Event payload delivered by the rendering library or the DOM.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderEvent {
    pub event_type: String,
    /// Pointer position for mouse-like events.
    pub lng_lat: Option<[f64; 2]>,
    /// Event-specific payload, e.g. geocoder results.
    pub data: serde_json::Value,
}

impl RenderEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Default::default()
        }
    }

    pub fn at(mut self, lng_lat: [f64; 2]) -> Self {
        self.lng_lat = Some(lng_lat);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Fill,
    Line,
}

/// A style layer definition, serialised the way the renderer expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub source: String,
    pub layout: serde_json::Value,
    pub paint: serde_json::Value,
}

/// Layout `visibility` value for a visible flag.
pub fn visibility(visible: bool) -> serde_json::Value {
    serde_json::Value::from(if visible { "visible" } else { "none" })
}

/// The underlying map object.
pub trait RenderMap: Send + Sync {
    fn add_source(&self, id: &str, data: GeoJson) -> Result<()>;
    fn has_source(&self, id: &str) -> bool;
    fn set_source_data(&self, id: &str, data: GeoJson) -> Result<()>;
    fn remove_source(&self, id: &str) -> Result<()>;

    fn add_layer(&self, layer: LayerSpec) -> Result<()>;
    fn has_layer(&self, id: &str) -> bool;
    fn remove_layer(&self, id: &str) -> Result<()>;
    fn set_paint_property(&self, layer_id: &str, name: &str, value: serde_json::Value) -> Result<()>;
    fn set_layout_property(&self, layer_id: &str, name: &str, value: serde_json::Value) -> Result<()>;

    /// Sources and layers may only be added once this is true.
    fn is_style_loaded(&self) -> bool;

    fn get_center(&self) -> [f64; 2];
    fn set_center(&self, lng_lat: [f64; 2]);
    fn pan_to(&self, lng_lat: [f64; 2]);
    fn pan_by(&self, offset: [f64; 2]);
    fn get_zoom(&self) -> f64;
    fn set_zoom(&self, zoom: f64);
    fn set_min_zoom(&self, zoom: Option<f64>);
    fn set_max_zoom(&self, zoom: Option<f64>);
    fn get_bearing(&self) -> f64;
    fn set_bearing(&self, bearing: f64);
    fn get_pitch(&self) -> f64;
    fn set_pitch(&self, pitch: f64);
    /// Visible area as `[west, south, east, north]`.
    fn get_bounds(&self) -> [f64; 4];
    fn fit_bounds(&self, bbox: [f64; 4], padding: f64);

    fn on(&self, event: &str, listener: RenderListener) -> ListenerId;
    fn once(&self, event: &str, listener: RenderListener) -> ListenerId;
    fn off(&self, event: &str, id: ListenerId);
}

/// A one-shot `load` listener waiting on one particular map.
pub(crate) struct PendingLoad {
    render: Arc<dyn RenderMap>,
    id: ListenerId,
}

impl PendingLoad {
    pub(crate) fn arm(render: Arc<dyn RenderMap>, listener: RenderListener) -> Self {
        let id = render.once("load", listener);
        Self { render, id }
    }

    /// Unregisters the listener from the map it was armed on.
    pub(crate) fn cancel(self) {
        self.render.off("load", self.id);
    }
}

/// A DOM element owned by the renderer (marker element, popup container).
pub trait DomElement: Send + Sync {
    fn add_event_listener(&self, event: &str, listener: RenderListener) -> ListenerId;
    fn remove_event_listener(&self, event: &str, id: ListenerId);
    fn set_style(&self, property: &str, value: &str);
    fn set_attribute(&self, name: &str, value: &str);
}

/// The underlying marker object.
pub trait RenderMarker: Send + Sync {
    fn set_lng_lat(&self, lng_lat: [f64; 2]);
    fn get_lng_lat(&self) -> Option<[f64; 2]>;
    fn add_to(&self, map: &Arc<dyn RenderMap>);
    fn remove(&self);
    fn set_draggable(&self, draggable: bool);
    fn set_opacity(&self, opacity: f64);
    fn element(&self) -> Arc<dyn DomElement>;

    fn on(&self, event: &str, listener: RenderListener) -> ListenerId;
    fn off(&self, event: &str, id: ListenerId);
}

/// The underlying popup object, backing info windows.
pub trait RenderPopup: Send + Sync {
    fn set_lng_lat(&self, lng_lat: [f64; 2]);
    fn set_html(&self, html: &str);
    fn set_max_width(&self, max_width: &str);
    fn add_to(&self, map: &Arc<dyn RenderMap>);
    fn remove(&self);
    fn is_open(&self) -> bool;

    fn on(&self, event: &str, listener: RenderListener) -> ListenerId;
    fn off(&self, event: &str, id: ListenerId);
}

/// Search-box control backing `Autocomplete` and `SearchBox`.
///
/// Emits `results` with `{"query": .., "items": [ResultItem..]}` when a query
/// is submitted and `result` with a single `ResultItem` when one is picked.
pub trait GeocoderControl: Send + Sync {
    fn set_bias_bbox(&self, bbox: Option<[f64; 4]>);

    fn on(&self, event: &str, listener: RenderListener) -> ListenerId;
    fn off(&self, event: &str, id: ListenerId);
}
