//! Circle overlay drawn as a generated polygon.
//!
//! Each attached circle owns one GeoJSON source and two layers on the render
//! map (`circle-fill-<n>` over `circle-line-<n>`, both reading
//! `circle-source-<n>`), where `n` comes from the map's circle counter.
//! Mutations while attached update the source in place; detaching removes the
//! layers before the source that backs them.

use crate::{
    core::{
        constants::{CIRCLE_FILL_PREFIX, CIRCLE_LINE_PREFIX, CIRCLE_SOURCE_PREFIX, DEFAULT_CIRCLE_STEPS},
        geo::{LatLng, LatLngBounds},
        map::MigrationMap,
        mvc::PropertyBag,
    },
    data::geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry},
    layers::MapAttachment,
    prelude::{Arc, Mutex},
    render::{visibility, LayerKind, LayerSpec, PendingLoad, RenderEvent, RenderListener, RenderMap},
    MapsError, Result,
};
use geo::{BoundingRect, HaversineDestination, LineString, Point, Polygon};
use serde_json::Value;

/// Configuration accepted by [`Circle::new`] and [`Circle::set_options`].
/// Absent fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct CircleOptions {
    pub center: Option<LatLng>,
    /// Meters.
    pub radius: Option<f64>,
    pub stroke_color: Option<String>,
    pub stroke_opacity: Option<f64>,
    pub stroke_weight: Option<f64>,
    pub fill_color: Option<String>,
    pub fill_opacity: Option<f64>,
    pub draggable: Option<bool>,
    pub editable: Option<bool>,
    pub visible: Option<bool>,
    pub map: Option<MigrationMap>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleStyle {
    pub stroke_color: String,
    pub stroke_opacity: f64,
    pub stroke_weight: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self {
            stroke_color: "#000000".to_string(),
            stroke_opacity: 1.0,
            stroke_weight: 3.0,
            fill_color: "#000000".to_string(),
            fill_opacity: 0.3,
        }
    }
}

impl CircleStyle {
    fn fill_paint(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("fill-color", Value::from(self.fill_color.as_str())),
            ("fill-opacity", Value::from(self.fill_opacity)),
        ]
    }

    fn line_paint(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("line-color", Value::from(self.stroke_color.as_str())),
            ("line-opacity", Value::from(self.stroke_opacity)),
            ("line-width", Value::from(self.stroke_weight)),
        ]
    }
}

fn paint_object(entries: Vec<(&'static str, Value)>) -> Value {
    Value::Object(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

/// Source and layer ids for one drawn circle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircleLayerIds {
    pub source: String,
    pub fill: String,
    pub line: String,
}

impl CircleLayerIds {
    pub fn new(n: u64) -> Self {
        Self {
            source: format!("{CIRCLE_SOURCE_PREFIX}-{n}"),
            fill: format!("{CIRCLE_FILL_PREFIX}-{n}"),
            line: format!("{CIRCLE_LINE_PREFIX}-{n}"),
        }
    }
}

/// Polygon approximating a geodesic circle, vertices walked
/// counter-clockwise from north. The ring is closed.
pub fn circle_polygon(center: LatLng, radius: f64, steps: usize) -> Polygon<f64> {
    let origin = Point::new(center.lng(), center.lat());
    let steps = steps.max(3);
    let ring: Vec<_> = (0..steps)
        .map(|i| {
            let bearing = -(i as f64 * 360.0 / steps as f64);
            origin.haversine_destination(bearing, radius).0
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

struct CircleState {
    center: Option<LatLng>,
    radius: Option<f64>,
    style: CircleStyle,
    draggable: bool,
    editable: bool,
    visible: bool,
    map: MapAttachment,
    ids: Option<CircleLayerIds>,
    pending_load: Option<PendingLoad>,
}

impl Default for CircleState {
    fn default() -> Self {
        Self {
            center: None,
            radius: None,
            style: CircleStyle::default(),
            draggable: false,
            editable: false,
            visible: true,
            map: MapAttachment::Unset,
            ids: None,
            pending_load: None,
        }
    }
}

struct DrawPlan {
    render: Arc<dyn RenderMap>,
    ids: CircleLayerIds,
    polygon: Polygon<f64>,
    style: CircleStyle,
    visible: bool,
}

impl CircleState {
    fn merge(&mut self, options: CircleOptions) {
        if let Some(center) = options.center {
            self.center = Some(center);
        }
        if let Some(radius) = options.radius {
            match validate_radius(radius) {
                Ok(radius) => self.radius = Some(radius),
                Err(e) => log::error!("Ignoring circle radius: {}", e),
            }
        }
        let style = &mut self.style;
        if let Some(color) = options.stroke_color {
            style.stroke_color = color;
        }
        if let Some(opacity) = options.stroke_opacity {
            style.stroke_opacity = opacity;
        }
        if let Some(weight) = options.stroke_weight {
            style.stroke_weight = weight;
        }
        if let Some(color) = options.fill_color {
            style.fill_color = color;
        }
        if let Some(opacity) = options.fill_opacity {
            style.fill_opacity = opacity;
        }
        if let Some(draggable) = options.draggable {
            self.draggable = draggable;
        }
        if let Some(editable) = options.editable {
            self.editable = editable;
        }
        if let Some(visible) = options.visible {
            self.visible = visible;
        }
    }

    fn steps(&self) -> usize {
        self.map
            .map()
            .map_or(DEFAULT_CIRCLE_STEPS, |map| map.config().circle.steps)
    }

    fn plan(&self) -> Option<DrawPlan> {
        let map = self.map.map()?;
        let ids = self.ids.clone()?;
        let polygon = circle_polygon(self.center?, self.radius?, self.steps());
        Some(DrawPlan {
            render: map.render().clone(),
            ids,
            polygon,
            style: self.style.clone(),
            visible: self.visible,
        })
    }
}

fn validate_radius(radius: f64) -> Result<f64> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(radius)
    } else {
        Err(MapsError::InvalidArgument(format!(
            "radius must be a non-negative number of meters, got {radius}"
        )))
    }
}

fn draw(plan: &DrawPlan) -> Result<()> {
    let render = plan.render.as_ref();
    let ids = &plan.ids;
    let data = GeoJson::Feature(GeoJsonFeature::new(GeoJsonGeometry::from(&plan.polygon)));

    if render.has_source(&ids.source) {
        render.set_source_data(&ids.source, data)?;
        for (layer, paint) in [
            (&ids.fill, plan.style.fill_paint()),
            (&ids.line, plan.style.line_paint()),
        ] {
            for (name, value) in paint {
                render.set_paint_property(layer, name, value)?;
            }
            render.set_layout_property(layer, "visibility", visibility(plan.visible))?;
        }
        return Ok(());
    }

    let layout = serde_json::json!({ "visibility": visibility(plan.visible) });
    render.add_source(&ids.source, data)?;
    render.add_layer(LayerSpec {
        id: ids.fill.clone(),
        kind: LayerKind::Fill,
        source: ids.source.clone(),
        layout: layout.clone(),
        paint: paint_object(plan.style.fill_paint()),
    })?;
    render.add_layer(LayerSpec {
        id: ids.line.clone(),
        kind: LayerKind::Line,
        source: ids.source.clone(),
        layout,
        paint: paint_object(plan.style.line_paint()),
    })?;
    log::debug!("Added circle source {}", ids.source);
    Ok(())
}

/// Removes whatever exists of a drawn circle. Layers go first.
fn erase(render: &dyn RenderMap, ids: &CircleLayerIds) {
    for layer in [&ids.fill, &ids.line] {
        if render.has_layer(layer) {
            if let Err(e) = render.remove_layer(layer) {
                log::error!("Failed to remove circle layer {}: {}", layer, e);
            }
        }
    }
    if render.has_source(&ids.source) {
        if let Err(e) = render.remove_source(&ids.source) {
            log::error!("Failed to remove circle source {}: {}", ids.source, e);
        }
    }
}

/// A circle overlay. Clones share state.
#[derive(Clone)]
pub struct Circle {
    state: Arc<Mutex<CircleState>>,
    properties: PropertyBag,
}

crate::impl_mvc_object!(Circle, properties);

impl Circle {
    /// Creates a circle; when `options.map` is set it is drawn immediately
    /// (or as soon as the map's style finishes loading).
    pub fn new(options: CircleOptions) -> Self {
        let circle = Self {
            state: Arc::new(Mutex::new(CircleState::default())),
            properties: PropertyBag::new(),
        };
        circle.set_options(Some(options));
        circle
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut CircleState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Merges `options` into the current configuration; `None` changes
    /// nothing.
    pub fn set_options(&self, options: Option<CircleOptions>) {
        let Some(mut options) = options else {
            return;
        };
        let map = options.map.take();
        self.with_state(|state| state.merge(options));
        match map {
            Some(map) => self.set_map(Some(&map)),
            None => self.redraw(),
        }
    }

    pub fn set_map(&self, map: Option<&MigrationMap>) {
        let unchanged = self.with_state(|state| match (state.map.map(), map) {
            (Some(current), Some(next)) => current.same_map(next),
            _ => false,
        });
        if !unchanged {
            self.detach();
            self.with_state(|state| {
                state.map = map.into();
                state.ids = map.map(|m| CircleLayerIds::new(m.next_circle_id()));
            });
        }
        self.redraw();
    }

    pub fn get_map(&self) -> MapAttachment {
        self.with_state(|state| state.map.clone())
    }

    pub fn set_center(&self, center: impl Into<LatLng>) {
        let center = center.into();
        self.with_state(|state| state.center = Some(center));
        self.redraw();
    }

    pub fn get_center(&self) -> Option<LatLng> {
        self.with_state(|state| state.center)
    }

    pub fn set_radius(&self, radius: f64) -> Result<()> {
        let radius = validate_radius(radius)?;
        self.with_state(|state| state.radius = Some(radius));
        self.redraw();
        Ok(())
    }

    pub fn get_radius(&self) -> Option<f64> {
        self.with_state(|state| state.radius)
    }

    /// Hidden circles keep their layers, with `visibility: none`.
    pub fn set_visible(&self, visible: bool) {
        self.with_state(|state| state.visible = visible);
        self.redraw();
    }

    pub fn get_visible(&self) -> bool {
        self.with_state(|state| state.visible)
    }

    pub fn set_draggable(&self, draggable: bool) {
        self.with_state(|state| state.draggable = draggable);
    }

    pub fn get_draggable(&self) -> bool {
        self.with_state(|state| state.draggable)
    }

    pub fn set_editable(&self, editable: bool) {
        self.with_state(|state| state.editable = editable);
    }

    pub fn get_editable(&self) -> bool {
        self.with_state(|state| state.editable)
    }

    pub fn style(&self) -> CircleStyle {
        self.with_state(|state| state.style.clone())
    }

    /// Ids used on the current map, if attached.
    pub fn layer_ids(&self) -> Option<CircleLayerIds> {
        self.with_state(|state| state.ids.clone())
    }

    /// Envelope of the drawn polygon; `None` until both center and radius
    /// are set.
    pub fn get_bounds(&self) -> Option<LatLngBounds> {
        let (center, radius, steps) = self.with_state(|state| (state.center, state.radius, state.steps()));
        let rect = circle_polygon(center?, radius?, steps).bounding_rect()?;
        let (min, max) = (rect.min(), rect.max());
        LatLngBounds::new(
            LatLng::with_clamp(min.y, min.x, true),
            LatLng::with_clamp(max.y, max.x, true),
        )
        .ok()
    }

    fn redraw(&self) {
        let Some(plan) = self.with_state(|state| state.plan()) else {
            return;
        };
        if !plan.render.is_style_loaded() {
            self.defer_until_loaded(plan.render);
            return;
        }
        if let Err(e) = draw(&plan) {
            log::error!("Failed to draw circle {}: {}", plan.ids.source, e);
        }
    }

    fn defer_until_loaded(&self, render: Arc<dyn RenderMap>) {
        if self.with_state(|state| state.pending_load.is_some()) {
            return;
        }
        let state = Arc::downgrade(&self.state);
        let properties = self.properties.clone();
        let listener: RenderListener = Arc::new(move |_: &RenderEvent| {
            if let Some(state) = state.upgrade() {
                let circle = Circle {
                    state,
                    properties: properties.clone(),
                };
                circle.with_state(|state| state.pending_load = None);
                circle.redraw();
            }
        });
        let pending = PendingLoad::arm(render, listener);
        self.with_state(|state| state.pending_load = Some(pending));
    }

    fn detach(&self) {
        let (drawn, pending) = self.with_state(|state| {
            let render = state.map.map().map(|map| map.render().clone());
            (render.zip(state.ids.take()), state.pending_load.take())
        });
        if let Some(pending) = pending {
            pending.cancel();
        }
        if let Some((render, ids)) = drawn {
            erase(render.as_ref(), &ids);
        }
    }
}

impl std::fmt::Debug for Circle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_state(|state| {
            f.debug_struct("Circle")
                .field("center", &state.center)
                .field("radius", &state.radius)
                .field("ids", &state.ids)
                .finish()
        })
    }
}
