//! Recording fakes for the render library and the location backend, plus a
//! thread-local log capture for asserting diagnostic counts.

#![allow(dead_code)]

use async_trait::async_trait;
use mapbridge::backend::{
    Address, Command, CommandOutput, Country, LocationClient, ResultItem,
};
use mapbridge::data::geojson::GeoJson;
use mapbridge::render::{
    DomElement, GeocoderControl, LayerSpec, ListenerId, RenderEvent, RenderListener, RenderMap,
    RenderMarker, RenderPopup,
};
use mapbridge::{MapsError, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

/// Listener table shared by every fake.
#[derive(Default)]
pub struct Listeners {
    next_id: ListenerId,
    entries: Vec<(ListenerId, String, RenderListener, bool)>,
}

impl Listeners {
    fn add(&mut self, event: &str, listener: RenderListener, once: bool) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, event.to_string(), listener, once));
        id
    }

    fn remove(&mut self, event: &str, id: ListenerId) {
        self.entries.retain(|(i, e, _, _)| !(*i == id && e == event));
    }

    fn take_for(&mut self, event: &str) -> Vec<RenderListener> {
        let matching: Vec<RenderListener> = self
            .entries
            .iter()
            .filter(|(_, e, _, _)| e == event)
            .map(|(_, _, l, _)| l.clone())
            .collect();
        self.entries.retain(|(_, e, _, once)| !(e == event && *once));
        matching
    }

    fn count(&self, event: &str) -> usize {
        self.entries.iter().filter(|(_, e, _, _)| e == event).count()
    }
}

fn dispatch(listeners: &Mutex<Listeners>, event: &RenderEvent) {
    let snapshot = listeners.lock().unwrap().take_for(&event.event_type);
    for listener in snapshot {
        listener(event);
    }
}

struct MapState {
    calls: Vec<String>,
    sources: HashMap<String, GeoJson>,
    layers: HashMap<String, LayerSpec>,
    layout: HashMap<(String, String), Value>,
    paint: HashMap<(String, String), Value>,
    style_loaded: bool,
    center: [f64; 2],
    zoom: f64,
    min_zoom: Option<f64>,
    max_zoom: Option<f64>,
    bearing: f64,
    pitch: f64,
    bounds: [f64; 4],
}

/// Render map that records every mutating call.
pub struct FakeRenderMap {
    state: Mutex<MapState>,
    listeners: Mutex<Listeners>,
}

impl FakeRenderMap {
    fn build(style_loaded: bool) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MapState {
                calls: Vec::new(),
                sources: HashMap::new(),
                layers: HashMap::new(),
                layout: HashMap::new(),
                paint: HashMap::new(),
                style_loaded,
                center: [0.0, 0.0],
                zoom: 0.0,
                min_zoom: None,
                max_zoom: None,
                bearing: 0.0,
                pitch: 0.0,
                bounds: [-180.0, -85.0, 180.0, 85.0],
            }),
            listeners: Mutex::new(Listeners::default()),
        })
    }

    pub fn new() -> Arc<Self> {
        Self::build(true)
    }

    /// A map whose style has not finished loading yet.
    pub fn loading() -> Arc<Self> {
        Self::build(false)
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls whose name is `name`, e.g. `"add_layer"`.
    pub fn calls_named(&self, name: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split_whitespace().next() == Some(name))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn source(&self, id: &str) -> Option<GeoJson> {
        self.state.lock().unwrap().sources.get(id).cloned()
    }

    pub fn layer(&self, id: &str) -> Option<LayerSpec> {
        self.state.lock().unwrap().layers.get(id).cloned()
    }

    pub fn layout_property(&self, layer: &str, name: &str) -> Option<Value> {
        let key = (layer.to_string(), name.to_string());
        self.state.lock().unwrap().layout.get(&key).cloned()
    }

    pub fn paint_property(&self, layer: &str, name: &str) -> Option<Value> {
        let key = (layer.to_string(), name.to_string());
        self.state.lock().unwrap().paint.get(&key).cloned()
    }

    pub fn zoom_limits(&self) -> (Option<f64>, Option<f64>) {
        let state = self.state.lock().unwrap();
        (state.min_zoom, state.max_zoom)
    }

    pub fn set_visible_bounds(&self, bounds: [f64; 4]) {
        self.state.lock().unwrap().bounds = bounds;
    }

    pub fn finish_loading(&self) {
        self.state.lock().unwrap().style_loaded = true;
        self.emit(RenderEvent::new("load"));
    }

    pub fn emit(&self, event: RenderEvent) {
        dispatch(&self.listeners, &event);
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().unwrap().count(event)
    }
}

impl RenderMap for FakeRenderMap {
    fn add_source(&self, id: &str, data: GeoJson) -> Result<()> {
        self.record(format!("add_source {id}"));
        let mut state = self.state.lock().unwrap();
        if state.sources.contains_key(id) {
            return Err(MapsError::Render(format!("source {id} already exists")));
        }
        state.sources.insert(id.to_string(), data);
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.state.lock().unwrap().sources.contains_key(id)
    }

    fn set_source_data(&self, id: &str, data: GeoJson) -> Result<()> {
        self.record(format!("set_source_data {id}"));
        let mut state = self.state.lock().unwrap();
        match state.sources.get_mut(id) {
            Some(source) => {
                *source = data;
                Ok(())
            }
            None => Err(MapsError::Render(format!("no source {id}"))),
        }
    }

    fn remove_source(&self, id: &str) -> Result<()> {
        self.record(format!("remove_source {id}"));
        let mut state = self.state.lock().unwrap();
        if state.layers.values().any(|layer| layer.source == id) {
            return Err(MapsError::Render(format!("source {id} is still in use")));
        }
        state.sources.remove(id);
        Ok(())
    }

    fn add_layer(&self, layer: LayerSpec) -> Result<()> {
        self.record(format!("add_layer {}", layer.id));
        let mut state = self.state.lock().unwrap();
        if !state.sources.contains_key(&layer.source) {
            return Err(MapsError::Render(format!("no source {}", layer.source)));
        }
        state.layers.insert(layer.id.clone(), layer);
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.state.lock().unwrap().layers.contains_key(id)
    }

    fn remove_layer(&self, id: &str) -> Result<()> {
        self.record(format!("remove_layer {id}"));
        self.state.lock().unwrap().layers.remove(id);
        Ok(())
    }

    fn set_paint_property(&self, layer_id: &str, name: &str, value: Value) -> Result<()> {
        self.record(format!("set_paint_property {layer_id} {name}"));
        let key = (layer_id.to_string(), name.to_string());
        self.state.lock().unwrap().paint.insert(key, value);
        Ok(())
    }

    fn set_layout_property(&self, layer_id: &str, name: &str, value: Value) -> Result<()> {
        self.record(format!("set_layout_property {layer_id} {name}"));
        let key = (layer_id.to_string(), name.to_string());
        self.state.lock().unwrap().layout.insert(key, value);
        Ok(())
    }

    fn is_style_loaded(&self) -> bool {
        self.state.lock().unwrap().style_loaded
    }

    fn get_center(&self) -> [f64; 2] {
        self.state.lock().unwrap().center
    }

    fn set_center(&self, lng_lat: [f64; 2]) {
        self.record("set_center".to_string());
        self.state.lock().unwrap().center = lng_lat;
    }

    fn pan_to(&self, lng_lat: [f64; 2]) {
        self.record("pan_to".to_string());
        self.state.lock().unwrap().center = lng_lat;
    }

    fn pan_by(&self, offset: [f64; 2]) {
        self.record(format!("pan_by {} {}", offset[0], offset[1]));
    }

    fn get_zoom(&self) -> f64 {
        self.state.lock().unwrap().zoom
    }

    fn set_zoom(&self, zoom: f64) {
        self.record("set_zoom".to_string());
        self.state.lock().unwrap().zoom = zoom;
    }

    fn set_min_zoom(&self, zoom: Option<f64>) {
        self.state.lock().unwrap().min_zoom = zoom;
    }

    fn set_max_zoom(&self, zoom: Option<f64>) {
        self.state.lock().unwrap().max_zoom = zoom;
    }

    fn get_bearing(&self) -> f64 {
        self.state.lock().unwrap().bearing
    }

    fn set_bearing(&self, bearing: f64) {
        self.state.lock().unwrap().bearing = bearing;
    }

    fn get_pitch(&self) -> f64 {
        self.state.lock().unwrap().pitch
    }

    fn set_pitch(&self, pitch: f64) {
        self.state.lock().unwrap().pitch = pitch;
    }

    fn get_bounds(&self) -> [f64; 4] {
        self.state.lock().unwrap().bounds
    }

    fn fit_bounds(&self, bbox: [f64; 4], padding: f64) {
        self.record(format!("fit_bounds {:?} {}", bbox, padding));
    }

    fn on(&self, event: &str, listener: RenderListener) -> ListenerId {
        self.listeners.lock().unwrap().add(event, listener, false)
    }

    fn once(&self, event: &str, listener: RenderListener) -> ListenerId {
        self.listeners.lock().unwrap().add(event, listener, true)
    }

    fn off(&self, event: &str, id: ListenerId) {
        self.listeners.lock().unwrap().remove(event, id);
    }
}

#[derive(Default)]
pub struct FakeElement {
    listeners: Mutex<Listeners>,
    styles: Mutex<HashMap<String, String>>,
    attributes: Mutex<HashMap<String, String>>,
}

impl FakeElement {
    pub fn dispatch(&self, event: RenderEvent) {
        dispatch(&self.listeners, &event);
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().unwrap().count(event)
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.styles.lock().unwrap().get(property).cloned()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.lock().unwrap().get(name).cloned()
    }
}

impl DomElement for FakeElement {
    fn add_event_listener(&self, event: &str, listener: RenderListener) -> ListenerId {
        self.listeners.lock().unwrap().add(event, listener, false)
    }

    fn remove_event_listener(&self, event: &str, id: ListenerId) {
        self.listeners.lock().unwrap().remove(event, id);
    }

    fn set_style(&self, property: &str, value: &str) {
        self.styles.lock().unwrap().insert(property.to_string(), value.to_string());
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes.lock().unwrap().insert(name.to_string(), value.to_string());
    }
}

#[derive(Default)]
struct MarkerState {
    lng_lat: Option<[f64; 2]>,
    on_map: bool,
    add_count: usize,
    draggable: bool,
    opacity: f64,
}

#[derive(Default)]
pub struct FakeMarker {
    pub element: Arc<FakeElement>,
    state: Mutex<MarkerState>,
    listeners: Mutex<Listeners>,
}

impl FakeMarker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_on_map(&self) -> bool {
        self.state.lock().unwrap().on_map
    }

    pub fn add_count(&self) -> usize {
        self.state.lock().unwrap().add_count
    }

    pub fn is_draggable(&self) -> bool {
        self.state.lock().unwrap().draggable
    }

    pub fn opacity(&self) -> f64 {
        self.state.lock().unwrap().opacity
    }

    pub fn emit(&self, event: RenderEvent) {
        dispatch(&self.listeners, &event);
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().unwrap().count(event)
    }
}

impl RenderMarker for FakeMarker {
    fn set_lng_lat(&self, lng_lat: [f64; 2]) {
        self.state.lock().unwrap().lng_lat = Some(lng_lat);
    }

    fn get_lng_lat(&self) -> Option<[f64; 2]> {
        self.state.lock().unwrap().lng_lat
    }

    fn add_to(&self, _map: &Arc<dyn RenderMap>) {
        let mut state = self.state.lock().unwrap();
        state.on_map = true;
        state.add_count += 1;
    }

    fn remove(&self) {
        self.state.lock().unwrap().on_map = false;
    }

    fn set_draggable(&self, draggable: bool) {
        self.state.lock().unwrap().draggable = draggable;
    }

    fn set_opacity(&self, opacity: f64) {
        self.state.lock().unwrap().opacity = opacity;
    }

    fn element(&self) -> Arc<dyn DomElement> {
        self.element.clone()
    }

    fn on(&self, event: &str, listener: RenderListener) -> ListenerId {
        self.listeners.lock().unwrap().add(event, listener, false)
    }

    fn off(&self, event: &str, id: ListenerId) {
        self.listeners.lock().unwrap().remove(event, id);
    }
}

#[derive(Default)]
struct PopupState {
    lng_lat: Option<[f64; 2]>,
    html: String,
    max_width: Option<String>,
    open: bool,
}

/// Popup that fires `close` when removed while open.
#[derive(Default)]
pub struct FakePopup {
    state: Mutex<PopupState>,
    listeners: Mutex<Listeners>,
}

impl FakePopup {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn html(&self) -> String {
        self.state.lock().unwrap().html.clone()
    }

    pub fn lng_lat(&self) -> Option<[f64; 2]> {
        self.state.lock().unwrap().lng_lat
    }

    pub fn max_width(&self) -> Option<String> {
        self.state.lock().unwrap().max_width.clone()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().unwrap().count(event)
    }
}

impl RenderPopup for FakePopup {
    fn set_lng_lat(&self, lng_lat: [f64; 2]) {
        self.state.lock().unwrap().lng_lat = Some(lng_lat);
    }

    fn set_html(&self, html: &str) {
        self.state.lock().unwrap().html = html.to_string();
    }

    fn set_max_width(&self, max_width: &str) {
        self.state.lock().unwrap().max_width = Some(max_width.to_string());
    }

    fn add_to(&self, _map: &Arc<dyn RenderMap>) {
        self.state.lock().unwrap().open = true;
    }

    fn remove(&self) {
        let was_open = std::mem::replace(&mut self.state.lock().unwrap().open, false);
        if was_open {
            dispatch(&self.listeners, &RenderEvent::new("close"));
        }
    }

    fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }

    fn on(&self, event: &str, listener: RenderListener) -> ListenerId {
        self.listeners.lock().unwrap().add(event, listener, false)
    }

    fn off(&self, event: &str, id: ListenerId) {
        self.listeners.lock().unwrap().remove(event, id);
    }
}

#[derive(Default)]
pub struct FakeGeocoderControl {
    bias: Mutex<Option<[f64; 4]>>,
    listeners: Mutex<Listeners>,
}

impl FakeGeocoderControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn bias(&self) -> Option<[f64; 4]> {
        *self.bias.lock().unwrap()
    }

    pub fn emit(&self, event: RenderEvent) {
        dispatch(&self.listeners, &event);
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().unwrap().count(event)
    }
}

impl GeocoderControl for FakeGeocoderControl {
    fn set_bias_bbox(&self, bbox: Option<[f64; 4]>) {
        *self.bias.lock().unwrap() = bbox;
    }

    fn on(&self, event: &str, listener: RenderListener) -> ListenerId {
        self.listeners.lock().unwrap().add(event, listener, false)
    }

    fn off(&self, event: &str, id: ListenerId) {
        self.listeners.lock().unwrap().remove(event, id);
    }
}

type Script = Box<dyn Fn(&Command) -> anyhow::Result<CommandOutput> + Send + Sync>;
type Delay = Box<dyn Fn(&Command) -> Duration + Send + Sync>;

/// Backend answering from a closure and recording every command.
pub struct ScriptedClient {
    script: Script,
    delay: Option<Delay>,
    calls: Mutex<Vec<Command>>,
}

impl ScriptedClient {
    pub fn new(script: impl Fn(&Command) -> anyhow::Result<CommandOutput> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            delay: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Like `new`, but each answer is held back for `delay(command)`.
    pub fn delayed(
        script: impl Fn(&Command) -> anyhow::Result<CommandOutput> + Send + Sync + 'static,
        delay: impl Fn(&Command) -> Duration + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            delay: Some(Box::new(delay)),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Command> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LocationClient for ScriptedClient {
    async fn send(&self, command: Command) -> anyhow::Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());
        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(&command)).await;
        }
        (self.script)(&command)
    }
}

/// A place in Austin, TX with the given id.
pub fn austin_item(place_id: &str) -> ResultItem {
    ResultItem {
        place_id: Some(place_id.to_string()),
        place_type: Some("PointOfInterest".to_string()),
        title: Some("Texas State Capitol".to_string()),
        address: Some(Address {
            label: Some("1100 Congress Ave, Austin, TX 78701, United States".to_string()),
            country: Some(Country {
                code2: Some("US".to_string()),
                code3: Some("USA".to_string()),
                name: Some("United States".to_string()),
            }),
            locality: Some("Austin".to_string()),
            ..Default::default()
        }),
        position: Some([-97.7457518, 30.268193]),
        ..Default::default()
    }
}

/// A labelled place in the country with the given alpha-3 code.
pub fn item_in_country(code3: &str, label: &str) -> ResultItem {
    ResultItem {
        place_id: Some(format!("{code3}-place")),
        address: Some(Address {
            label: Some(label.to_string()),
            country: Some(Country {
                code3: Some(code3.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        position: Some([0.0, 0.0]),
        ..Default::default()
    }
}

thread_local! {
    static RECORDS: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.target().starts_with("mapbridge")
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            RECORDS.with(|r| r.borrow_mut().push((record.level(), record.args().to_string())));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Starts capturing this thread's log records, discarding earlier ones.
pub fn capture_logs() {
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);
    });
    RECORDS.with(|r| r.borrow_mut().clear());
}

pub fn logs_at(level: log::Level) -> Vec<String> {
    RECORDS.with(|r| {
        r.borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    })
}

pub fn error_logs() -> Vec<String> {
    logs_at(log::Level::Error)
}
