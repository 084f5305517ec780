use crate::{
    backend::{self, CalculateRoutesCommand, LocationClient, RouteAvoidanceOptions, RouteLeg, RouteStep, RouteTravelMode},
    core::{
        config::ServiceConfig,
        constants::DIRECTIONS_PREFIX,
        geo::{LatLng, LatLngBounds},
        map::MigrationMap,
        mvc::PropertyBag,
    },
    data::geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry},
    input::{events::DIRECTIONS_CHANGED, handler::EventBus, MapsEvent},
    layers::MapAttachment,
    prelude::{Arc, Mutex},
    render::{LayerKind, LayerSpec, PendingLoad, RenderEvent, RenderListener, RenderMap},
    services::{
        delivery::{settle, Callback},
        places::{resolve_location, LocationInput, ResolvedLocation},
        units::{format_distance_based_on_unit_system, format_duration_seconds, is_point_in_imperial_country, UnitSystem},
        ServiceError, Status,
    },
    MapsError, Result,
};
use futures::future::join_all;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    /// Backend travel mode; transit has no counterpart.
    pub fn to_backend(self) -> Result<RouteTravelMode> {
        match self {
            TravelMode::Driving => Ok(RouteTravelMode::Car),
            TravelMode::Walking => Ok(RouteTravelMode::Pedestrian),
            TravelMode::Bicycling => Ok(RouteTravelMode::Scooter),
            TravelMode::Transit => Err(MapsError::InvalidArgument(
                "TRANSIT travel mode is not available".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: LocationInput,
    pub destination: LocationInput,
    pub waypoints: Vec<LocationInput>,
    pub travel_mode: TravelMode,
    /// Inferred from the origin when absent.
    pub unit_system: Option<UnitSystem>,
    pub avoid_tolls: bool,
    pub avoid_ferries: bool,
    pub avoid_highways: bool,
    /// RFC 3339 timestamp.
    pub departure_time: Option<String>,
    pub language: Option<String>,
}

impl DirectionsRequest {
    pub fn new(origin: impl Into<LocationInput>, destination: impl Into<LocationInput>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            waypoints: Vec::new(),
            travel_mode: TravelMode::default(),
            unit_system: None,
            avoid_tolls: false,
            avoid_ferries: false,
            avoid_highways: false,
            departure_time: None,
            language: None,
        }
    }
}

/// Folds the avoid flags of `request` into `avoid`, keeping flags already
/// set there. Requests that avoid nothing leave `avoid` untouched.
pub fn apply_avoidance(request: &DirectionsRequest, avoid: &mut Option<RouteAvoidanceOptions>) {
    if !(request.avoid_tolls || request.avoid_ferries || request.avoid_highways) {
        return;
    }
    let options = avoid.get_or_insert_with(RouteAvoidanceOptions::default);
    if request.avoid_tolls {
        options.toll_roads = Some(true);
        options.toll_transponders = Some(true);
    }
    if request.avoid_ferries {
        options.ferries = Some(true);
    }
    if request.avoid_highways {
        options.controlled_access_highways = Some(true);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextValue {
    pub text: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsStep {
    pub distance: TextValue,
    pub duration: TextValue,
    pub start_location: Option<LatLng>,
    pub end_location: Option<LatLng>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsLeg {
    pub distance: TextValue,
    pub duration: TextValue,
    pub start_location: Option<LatLng>,
    pub end_location: Option<LatLng>,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
    pub steps: Vec<DirectionsStep>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRoute {
    pub legs: Vec<DirectionsLeg>,
    pub overview_path: Vec<LatLng>,
    pub bounds: LatLngBounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsResult {
    pub routes: Vec<DirectionsRoute>,
    pub unit_system: UnitSystem,
}

fn distance_text(meters: Option<f64>, unit_system: UnitSystem) -> TextValue {
    let value = meters.unwrap_or_default();
    TextValue {
        text: format_distance_based_on_unit_system(value, unit_system),
        value,
    }
}

fn duration_text(seconds: Option<f64>) -> TextValue {
    let value = seconds.unwrap_or_default();
    TextValue {
        text: format_duration_seconds(value.max(0.0).round() as u64),
        value,
    }
}

fn translate_step(step: &RouteStep, unit_system: UnitSystem) -> DirectionsStep {
    DirectionsStep {
        distance: distance_text(step.distance, unit_system),
        duration: duration_text(step.duration_seconds),
        start_location: step.start_position.map(LatLng::from_lng_lat),
        end_location: step.end_position.map(LatLng::from_lng_lat),
        instructions: step.instruction.clone(),
    }
}

fn translate_leg(leg: &RouteLeg, unit_system: UnitSystem) -> DirectionsLeg {
    DirectionsLeg {
        distance: distance_text(leg.distance, unit_system),
        duration: duration_text(leg.duration_seconds),
        start_location: leg.start_position.map(LatLng::from_lng_lat),
        end_location: leg.end_position.map(LatLng::from_lng_lat),
        start_address: None,
        end_address: None,
        steps: leg.steps.iter().map(|s| translate_step(s, unit_system)).collect(),
    }
}

fn translate_route(legs: &[RouteLeg], unit_system: UnitSystem) -> DirectionsRoute {
    let overview_path: Vec<LatLng> = legs
        .iter()
        .flat_map(|leg| leg.geometry.iter().flatten())
        .map(|p| LatLng::from_lng_lat(*p))
        .collect();
    let mut bounds = LatLngBounds::empty();
    for point in &overview_path {
        bounds.extend(*point);
    }
    DirectionsRoute {
        legs: legs.iter().map(|leg| translate_leg(leg, unit_system)).collect(),
        overview_path,
        bounds,
    }
}

#[derive(Clone)]
pub struct DirectionsService {
    client: Arc<dyn LocationClient>,
    config: ServiceConfig,
}

impl DirectionsService {
    pub fn new(client: Arc<dyn LocationClient>) -> Self {
        Self::with_config(client, ServiceConfig::default())
    }

    pub fn with_config(client: Arc<dyn LocationClient>, config: ServiceConfig) -> Self {
        Self { client, config }
    }

    pub async fn route(
        &self,
        request: DirectionsRequest,
        callback: Option<Callback<DirectionsResult>>,
    ) -> std::result::Result<DirectionsResult, ServiceError> {
        let outcome = self.calculate(request).await;
        settle("Directions", outcome, callback, DirectionsResult::clone)
    }

    async fn resolve(&self, input: &LocationInput) -> std::result::Result<ResolvedLocation, ServiceError> {
        resolve_location(self.client.as_ref(), input)
            .await
            .map_err(|e| ServiceError::new(Status::NotFound, e))
    }

    async fn calculate(&self, request: DirectionsRequest) -> std::result::Result<DirectionsResult, ServiceError> {
        let travel_mode = request.travel_mode.to_backend()?;
        let origin = self.resolve(&request.origin).await?;
        let destination = self.resolve(&request.destination).await?;
        let waypoints = join_all(request.waypoints.iter().map(|w| self.resolve(w)))
            .await
            .into_iter()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let unit_system = request.unit_system.unwrap_or_else(|| {
            if is_point_in_imperial_country(origin.location_lat_lng) {
                UnitSystem::Imperial
            } else {
                UnitSystem::Metric
            }
        });

        let mut command = CalculateRoutesCommand {
            origin: origin.position,
            destination: destination.position,
            waypoints: waypoints.iter().map(|w| w.position).collect(),
            travel_mode,
            avoid: None,
            departure_time: request.departure_time.clone(),
            language: self.config.language_for(request.language.as_deref()),
        };
        apply_avoidance(&request, &mut command.avoid);

        let response = backend::calculate_routes(self.client.as_ref(), command).await?;
        let routes = response
            .routes
            .ok_or_else(|| MapsError::UnknownResult("response has no routes".to_string()))?;
        if routes.is_empty() {
            return Err(ServiceError::status(Status::ZeroResults));
        }

        let mut routes: Vec<DirectionsRoute> = routes
            .iter()
            .map(|route| translate_route(&route.legs, unit_system))
            .collect();
        for route in &mut routes {
            if let Some(first) = route.legs.first_mut() {
                first.start_address = origin.formatted_address.clone();
            }
            if let Some(last) = route.legs.last_mut() {
                last.end_address = destination.formatted_address.clone();
            }
        }
        Ok(DirectionsResult { routes, unit_system })
    }
}

/// Source and layer id of one renderer's route line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLayerIds {
    pub source: String,
    pub line: String,
}

impl RouteLayerIds {
    pub fn new(n: u64) -> Self {
        Self {
            source: format!("{DIRECTIONS_PREFIX}-source-{n}"),
            line: format!("{DIRECTIONS_PREFIX}-line-{n}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DirectionsRendererOptions {
    pub map: Option<MigrationMap>,
    pub directions: Option<DirectionsResult>,
    pub route_index: Option<usize>,
}

#[derive(Default)]
struct RendererState {
    map: MapAttachment,
    ids: Option<RouteLayerIds>,
    directions: Option<DirectionsResult>,
    route_index: usize,
    pending_load: Option<PendingLoad>,
}

/// Draws a directions result as a line on its map.
#[derive(Clone)]
pub struct DirectionsRenderer {
    state: Arc<Mutex<RendererState>>,
    events: EventBus,
    properties: PropertyBag,
}

crate::impl_mvc_object!(DirectionsRenderer, properties);

impl DirectionsRenderer {
    pub fn new(options: DirectionsRendererOptions) -> Self {
        let renderer = Self {
            state: Arc::new(Mutex::new(RendererState::default())),
            events: EventBus::new(),
            properties: PropertyBag::new(),
        };
        if let Some(route_index) = options.route_index {
            renderer.with_state(|state| state.route_index = route_index);
        }
        if let Some(map) = options.map {
            renderer.set_map(Some(&map));
        }
        if let Some(directions) = options.directions {
            renderer.set_directions(directions);
        }
        renderer
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut RendererState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Bus carrying `directions_changed`.
    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    pub fn set_map(&self, map: Option<&MigrationMap>) {
        let (drawn, pending) = self.with_state(|state| {
            let render = state.map.map().map(|m| m.render().clone());
            let drawn = render.zip(state.ids.take());
            state.map = map.into();
            state.ids = map.map(|m| RouteLayerIds::new(m.next_directions_id()));
            (drawn, state.pending_load.take())
        });
        if let Some(pending) = pending {
            pending.cancel();
        }
        if let Some((render, ids)) = drawn {
            erase(render.as_ref(), &ids);
        }
        self.redraw();
    }

    pub fn get_map(&self) -> MapAttachment {
        self.with_state(|state| state.map.clone())
    }

    /// Stores `directions`, draws the selected route and fires
    /// `directions_changed`.
    pub fn set_directions(&self, directions: DirectionsResult) {
        self.with_state(|state| state.directions = Some(directions));
        self.redraw();
        self.events
            .emit(DIRECTIONS_CHANGED, &MapsEvent::notify(DIRECTIONS_CHANGED));
    }

    pub fn get_directions(&self) -> Option<DirectionsResult> {
        self.with_state(|state| state.directions.clone())
    }

    pub fn set_route_index(&self, route_index: usize) {
        self.with_state(|state| state.route_index = route_index);
        self.redraw();
    }

    pub fn get_route_index(&self) -> usize {
        self.with_state(|state| state.route_index)
    }

    pub fn layer_ids(&self) -> Option<RouteLayerIds> {
        self.with_state(|state| state.ids.clone())
    }

    fn redraw(&self) {
        let plan = self.with_state(|state| {
            let render = state.map.map()?.render().clone();
            let ids = state.ids.clone()?;
            let route = state.directions.as_ref()?.routes.get(state.route_index)?;
            Some((render, ids, route.overview_path.clone()))
        });
        let Some((render, ids, path)) = plan else {
            return;
        };
        if !render.is_style_loaded() {
            self.redraw_on_load(render);
            return;
        }
        if let Err(e) = draw_route(render.as_ref(), &ids, &path) {
            log::error!("Failed to draw route {}: {}", ids.source, e);
        }
    }

    fn redraw_on_load(&self, render: Arc<dyn RenderMap>) {
        if self.with_state(|state| state.pending_load.is_some()) {
            return;
        }
        let state = Arc::downgrade(&self.state);
        let (events, properties) = (self.events.clone(), self.properties.clone());
        let listener: RenderListener = Arc::new(move |_: &RenderEvent| {
            if let Some(state) = state.upgrade() {
                let renderer = DirectionsRenderer {
                    state,
                    events: events.clone(),
                    properties: properties.clone(),
                };
                renderer.with_state(|state| state.pending_load = None);
                renderer.redraw();
            }
        });
        let pending = PendingLoad::arm(render, listener);
        self.with_state(|state| state.pending_load = Some(pending));
    }
}

fn draw_route(render: &dyn RenderMap, ids: &RouteLayerIds, path: &[LatLng]) -> Result<()> {
    let data = GeoJson::Feature(GeoJsonFeature::new(GeoJsonGeometry::line_string(path)));
    if render.has_source(&ids.source) {
        return render.set_source_data(&ids.source, data);
    }
    render.add_source(&ids.source, data)?;
    render.add_layer(LayerSpec {
        id: ids.line.clone(),
        kind: LayerKind::Line,
        source: ids.source.clone(),
        layout: serde_json::json!({ "line-join": "round", "line-cap": "round" }),
        paint: serde_json::json!({ "line-color": "#73B9FF", "line-width": 6, "line-opacity": 0.8 }),
    })
}

fn erase(render: &dyn RenderMap, ids: &RouteLayerIds) {
    if render.has_layer(&ids.line) {
        if let Err(e) = render.remove_layer(&ids.line) {
            log::error!("Failed to remove route layer {}: {}", ids.line, e);
        }
    }
    if render.has_source(&ids.source) {
        if let Err(e) = render.remove_source(&ids.source) {
            log::error!("Failed to remove route source {}: {}", ids.source, e);
        }
    }
}
