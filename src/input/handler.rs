//! Listener registration: translates caller-facing event names onto the
//! render library, the DOM or an adapter's own bus, and records exactly what
//! was attached so it can be reversed later.

use crate::{
    input::events::{
        map_event, marker_dom_event, marker_event, EventTarget, MapsEvent, Payload,
        DIRECTIONS_CHANGED, GEOCODER_SELECTION_EVENTS, INFO_WINDOW_CLOSE, PLACES_CHANGED,
        PLACE_CHANGED,
    },
    prelude::{Arc, HashMap, Mutex},
    render::{
        DomElement, GeocoderControl, ListenerId, RenderEvent, RenderListener, RenderMap,
        RenderMarker, RenderPopup,
    },
};
use std::sync::atomic::{AtomicBool, Ordering};

/// Event listener callback type
pub type EventHandler = Arc<dyn Fn(&MapsEvent) + Send + Sync>;

#[derive(Default)]
struct BusState {
    next_id: ListenerId,
    listeners: HashMap<String, Vec<(ListenerId, EventHandler)>>,
}

/// In-process event bus for adapters whose events have no render-library
/// counterpart (e.g. `directions_changed`).
#[derive(Clone, Default)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut BusState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Register an event listener
    pub fn on(&self, event_type: &str, handler: EventHandler) -> ListenerId {
        self.with_state(|state| {
            let id = state.next_id;
            state.next_id += 1;
            state
                .listeners
                .entry(event_type.to_string())
                .or_default()
                .push((id, handler));
            id
        })
    }

    pub fn off(&self, event_type: &str, id: ListenerId) {
        self.with_state(|state| {
            if let Some(listeners) = state.listeners.get_mut(event_type) {
                listeners.retain(|(listener_id, _)| *listener_id != id);
            }
        });
    }

    /// Calls every listener registered for `event_type`. Listeners may add or
    /// remove registrations while being called.
    pub fn emit(&self, event_type: &str, event: &MapsEvent) {
        let snapshot: Vec<EventHandler> = self.with_state(|state| {
            state
                .listeners
                .get(event_type)
                .map(|l| l.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        });
        for handler in snapshot {
            handler(event);
        }
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.with_state(|state| state.listeners.get(event_type).map_or(0, Vec::len))
    }
}

/// One underlying attachment, carrying what is needed to detach it.
#[derive(Clone)]
enum Registration {
    Map {
        map: Arc<dyn RenderMap>,
        event: &'static str,
        id: ListenerId,
    },
    Marker {
        marker: Arc<dyn RenderMarker>,
        event: &'static str,
        id: ListenerId,
    },
    Dom {
        element: Arc<dyn DomElement>,
        event: &'static str,
        id: ListenerId,
    },
    Popup {
        popup: Arc<dyn RenderPopup>,
        event: &'static str,
        id: ListenerId,
    },
    Geocoder {
        control: Arc<dyn GeocoderControl>,
        event: &'static str,
        id: ListenerId,
    },
    Local {
        bus: EventBus,
        event: &'static str,
        id: ListenerId,
    },
}

impl Registration {
    fn reverse(self) {
        match self {
            Registration::Map { map, event, id } => map.off(event, id),
            Registration::Marker { marker, event, id } => marker.off(event, id),
            Registration::Dom { element, event, id } => element.remove_event_listener(event, id),
            Registration::Popup { popup, event, id } => popup.off(event, id),
            Registration::Geocoder { control, event, id } => control.off(event, id),
            Registration::Local { bus, event, id } => bus.off(event, id),
        }
    }
}

/// Handle returned by [`add_listener`]; pass it to [`remove_listener`] to
/// undo that registration and nothing else.
#[derive(Clone)]
pub struct MapsEventListener {
    target_kind: &'static str,
    event_name: String,
    registrations: Vec<Registration>,
}

impl MapsEventListener {
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn target_kind(&self) -> &'static str {
        self.target_kind
    }

    /// Number of underlying listeners this registration attached.
    pub fn underlying_count(&self) -> usize {
        self.registrations.len()
    }

    pub fn remove(self) {
        remove_listener(self);
    }
}

impl std::fmt::Debug for MapsEventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsEventListener")
            .field("target_kind", &self.target_kind)
            .field("event_name", &self.event_name)
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

fn translated(payload: Payload, name: &str, event: &RenderEvent) -> MapsEvent {
    match payload {
        Payload::Mouse => MapsEvent::mouse(event),
        Payload::Notify => MapsEvent::notify(name),
    }
}

fn forward(handler: &EventHandler, payload: Payload, name: &str) -> RenderListener {
    let handler = handler.clone();
    let name = name.to_string();
    Arc::new(move |event: &RenderEvent| handler(&translated(payload, &name, event)))
}

fn register(target: &EventTarget, name: &str, handler: &EventHandler) -> Option<Vec<Registration>> {
    match target {
        EventTarget::Map(map) => {
            let (event, payload) = map_event(name)?;
            let render = map.render().clone();
            let id = render.on(event, forward(handler, payload, name));
            Some(vec![Registration::Map {
                map: render,
                event,
                id,
            }])
        }
        EventTarget::Marker(marker) => {
            let render = marker.render_marker().clone();
            if let Some(event) = marker_dom_event(name) {
                let element = render.element();
                let id = element.add_event_listener(event, forward(handler, Payload::Mouse, name));
                return Some(vec![Registration::Dom { element, event, id }]);
            }
            let event = marker_event(name)?;
            let id = render.on(event, forward(handler, Payload::Mouse, name));
            Some(vec![Registration::Marker {
                marker: render,
                event,
                id,
            }])
        }
        EventTarget::InfoWindow(info_window) => {
            let (source, event) = INFO_WINDOW_CLOSE;
            if name != source {
                return None;
            }
            let popup = info_window.render_popup().clone();
            let id = popup.on(event, forward(handler, Payload::Notify, name));
            Some(vec![Registration::Popup { popup, event, id }])
        }
        EventTarget::DirectionsRenderer(renderer) => {
            if name != DIRECTIONS_CHANGED {
                return None;
            }
            let bus = renderer.event_bus().clone();
            let id = bus.on(DIRECTIONS_CHANGED, handler.clone());
            Some(vec![Registration::Local {
                bus,
                event: DIRECTIONS_CHANGED,
                id,
            }])
        }
        EventTarget::Autocomplete(autocomplete) => {
            if name != PLACE_CHANGED {
                return None;
            }
            let control = autocomplete.control().clone();
            Some(
                GEOCODER_SELECTION_EVENTS
                    .into_iter()
                    .map(|event| {
                        let autocomplete = autocomplete.clone();
                        let handler = handler.clone();
                        let listener: RenderListener = Arc::new(move |raw: &RenderEvent| {
                            autocomplete.capture_selection(event, raw);
                            handler(&MapsEvent::notify(PLACE_CHANGED));
                        });
                        let id = control.on(event, listener);
                        Registration::Geocoder {
                            control: control.clone(),
                            event,
                            id,
                        }
                    })
                    .collect(),
            )
        }
        EventTarget::SearchBox(search_box) => {
            if name != PLACES_CHANGED {
                return None;
            }
            let control = search_box.control().clone();
            Some(
                GEOCODER_SELECTION_EVENTS
                    .into_iter()
                    .map(|event| {
                        let search_box = search_box.clone();
                        let handler = handler.clone();
                        let listener: RenderListener = Arc::new(move |raw: &RenderEvent| {
                            search_box.capture_selection(event, raw);
                            handler(&MapsEvent::notify(PLACES_CHANGED));
                        });
                        let id = control.on(event, listener);
                        Registration::Geocoder {
                            control: control.clone(),
                            event,
                            id,
                        }
                    })
                    .collect(),
            )
        }
        EventTarget::Circle(_) => None,
    }
}

/// Attaches `handler` to `event_name` on `target`.
///
/// Returns `None`, attaching nothing, when the adapter kind has no listener
/// support or does not know the event name.
pub fn add_listener<F>(target: impl Into<EventTarget>, event_name: &str, handler: F) -> Option<MapsEventListener>
where
    F: Fn(&MapsEvent) + Send + Sync + 'static,
{
    let target = target.into();
    let handler: EventHandler = Arc::new(handler);
    let Some(registrations) = register(&target, event_name, &handler) else {
        log::debug!("{} has no '{}' event, listener ignored", target.kind(), event_name);
        return None;
    };
    log::debug!(
        "{} '{}' listener attached ({} underlying)",
        target.kind(),
        event_name,
        registrations.len()
    );
    Some(MapsEventListener {
        target_kind: target.kind(),
        event_name: event_name.to_string(),
        registrations,
    })
}

/// Like [`add_listener`], but the handler runs at most once and every
/// underlying registration is detached after that first call.
pub fn add_listener_once<F>(target: impl Into<EventTarget>, event_name: &str, handler: F) -> Option<MapsEventListener>
where
    F: Fn(&MapsEvent) + Send + Sync + 'static,
{
    let fired = Arc::new(AtomicBool::new(false));
    let slot: Arc<Mutex<Option<MapsEventListener>>> = Arc::new(Mutex::new(None));
    let teardown = slot.clone();
    let listener = add_listener(target, event_name, move |event: &MapsEvent| {
        if fired.swap(true, Ordering::SeqCst) {
            return;
        }
        handler(event);
        let registered = teardown.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(registered) = registered {
            remove_listener(registered);
        }
    })?;
    *slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(listener.clone());
    Some(listener)
}

/// Detaches every underlying listener recorded in `listener`.
pub fn remove_listener(listener: MapsEventListener) {
    log::debug!(
        "{} '{}' listener removed",
        listener.target_kind,
        listener.event_name
    );
    for registration in listener.registrations {
        registration.reverse();
    }
}
