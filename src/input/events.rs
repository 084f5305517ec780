use crate::{
    core::{geo::LatLng, map::MigrationMap},
    layers::{circle::Circle, info_window::InfoWindow, marker::Marker},
    render::RenderEvent,
    services::{
        directions::DirectionsRenderer,
        places::{Autocomplete, SearchBox},
    },
};

/// Mouse-like event handed to listeners of `click`, `drag`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub lat_lng: Option<LatLng>,
    /// The untranslated render-library or DOM event.
    pub dom_event: RenderEvent,
}

/// What a caller's handler receives.
#[derive(Debug, Clone, PartialEq)]
pub enum MapsEvent {
    /// click, dblclick, drag, mouseover, ...
    Mouse(MouseEvent),
    /// Payload-free notifications: `center_changed`, `idle`, `place_changed`, ...
    Notify { name: String },
}

impl MapsEvent {
    pub fn notify(name: impl Into<String>) -> Self {
        MapsEvent::Notify { name: name.into() }
    }

    pub fn mouse(event: &RenderEvent) -> Self {
        MapsEvent::Mouse(MouseEvent {
            lat_lng: event.lng_lat.map(LatLng::from_lng_lat),
            dom_event: event.clone(),
        })
    }

    pub fn lat_lng(&self) -> Option<LatLng> {
        match self {
            MapsEvent::Mouse(mouse) => mouse.lat_lng,
            MapsEvent::Notify { .. } => None,
        }
    }
}

/// Every adapter kind a listener can be attached to.
///
/// Kinds outside the event-capable set (currently `Circle`) are accepted and
/// ignored, so ported code that listens on them keeps running.
#[derive(Clone)]
pub enum EventTarget {
    Map(MigrationMap),
    Marker(Marker),
    InfoWindow(InfoWindow),
    DirectionsRenderer(DirectionsRenderer),
    Autocomplete(Autocomplete),
    SearchBox(SearchBox),
    Circle(Circle),
}

impl EventTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            EventTarget::Map(_) => "Map",
            EventTarget::Marker(_) => "Marker",
            EventTarget::InfoWindow(_) => "InfoWindow",
            EventTarget::DirectionsRenderer(_) => "DirectionsRenderer",
            EventTarget::Autocomplete(_) => "Autocomplete",
            EventTarget::SearchBox(_) => "SearchBox",
            EventTarget::Circle(_) => "Circle",
        }
    }
}

macro_rules! impl_event_target_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<&$ty> for EventTarget {
                fn from(value: &$ty) -> Self {
                    EventTarget::$variant(value.clone())
                }
            }

            impl From<$ty> for EventTarget {
                fn from(value: $ty) -> Self {
                    EventTarget::$variant(value)
                }
            }
        )*
    };
}

impl_event_target_from!(
    Map => MigrationMap,
    Marker => Marker,
    InfoWindow => InfoWindow,
    DirectionsRenderer => DirectionsRenderer,
    Autocomplete => Autocomplete,
    SearchBox => SearchBox,
    Circle => Circle,
);

/// How a translated event reaches the caller's handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Mouse,
    Notify,
}

/// Map event name → (render event, payload).
pub const MAP_EVENTS: &[(&str, &str, Payload)] = &[
    ("click", "click", Payload::Mouse),
    ("dblclick", "dblclick", Payload::Mouse),
    ("contextmenu", "contextmenu", Payload::Mouse),
    ("mousemove", "mousemove", Payload::Mouse),
    ("mouseout", "mouseout", Payload::Mouse),
    ("mouseover", "mouseover", Payload::Mouse),
    ("drag", "drag", Payload::Notify),
    ("dragstart", "dragstart", Payload::Notify),
    ("dragend", "dragend", Payload::Notify),
    ("idle", "idle", Payload::Notify),
    ("center_changed", "move", Payload::Notify),
    ("zoom_changed", "zoom", Payload::Notify),
    ("heading_changed", "rotate", Payload::Notify),
    ("tilt_changed", "pitch", Payload::Notify),
    ("tilesloaded", "load", Payload::Notify),
    ("bounds_changed", "moveend", Payload::Notify),
];

/// Marker events delivered through a DOM listener on the marker element.
pub const MARKER_DOM_EVENTS: &[&str] = &["click", "dblclick", "contextmenu", "mouseover", "mouseout"];

/// Marker events delivered on the marker's own event bus.
pub const MARKER_EVENTS: &[&str] = &["drag", "dragstart", "dragend"];

pub const INFO_WINDOW_CLOSE: (&str, &str) = ("close", "close");

pub const DIRECTIONS_CHANGED: &str = "directions_changed";

pub const PLACE_CHANGED: &str = "place_changed";

pub const PLACES_CHANGED: &str = "places_changed";

/// Underlying geocoder-control events behind `place_changed`/`places_changed`.
pub const GEOCODER_SELECTION_EVENTS: [&str; 2] = ["results", "result"];

pub fn map_event(name: &str) -> Option<(&'static str, Payload)> {
    MAP_EVENTS
        .iter()
        .find(|(source, _, _)| *source == name)
        .map(|(_, render, payload)| (*render, *payload))
}

pub fn marker_dom_event(name: &str) -> Option<&'static str> {
    MARKER_DOM_EVENTS.iter().find(|e| **e == name).copied()
}

pub fn marker_event(name: &str) -> Option<&'static str> {
    MARKER_EVENTS.iter().find(|e| **e == name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_event_translation() {
        assert_eq!(map_event("center_changed"), Some(("move", Payload::Notify)));
        assert_eq!(map_event("zoom_changed"), Some(("zoom", Payload::Notify)));
        assert_eq!(map_event("click"), Some(("click", Payload::Mouse)));
        assert_eq!(map_event("tilesloaded"), Some(("load", Payload::Notify)));
        assert_eq!(map_event("place_changed"), None);
    }

    #[test]
    fn test_marker_event_split() {
        assert_eq!(marker_dom_event("click"), Some("click"));
        assert_eq!(marker_dom_event("drag"), None);
        assert_eq!(marker_event("dragend"), Some("dragend"));
        assert_eq!(marker_event("click"), None);
    }

    #[test]
    fn test_mouse_event_translates_position() {
        let event = MapsEvent::mouse(&RenderEvent::new("click").at([-97.7457518, 30.268193]));
        let lat_lng = event.lat_lng().unwrap();
        assert_eq!(lat_lng.lat(), 30.268193);
        assert_eq!(lat_lng.lng(), -97.7457518);
        assert_eq!(MapsEvent::notify("idle").lat_lng(), None);
    }
}
