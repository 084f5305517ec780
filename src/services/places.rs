//! Place search and details, the location-input resolver used by
//! directions, and the search-box backed `Autocomplete` and `SearchBox`.

use crate::{
    backend::{self, GetPlaceCommand, LocationClient, ResultItem, SearchTextCommand},
    core::{
        config::ServiceConfig,
        constants::TIME_ZONE_FEATURE,
        geo::{LatLng, LatLngBounds},
        mvc::PropertyBag,
    },
    prelude::{Arc, Mutex},
    render::{GeocoderControl, RenderEvent},
    services::{
        delivery::{settle, Callback},
        geocoder::{address_components, place_types, viewport, AddressComponent, GeocoderGeometry},
        ServiceError, Status,
    },
    MapsError, Result,
};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceResult {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub geometry: Option<GeocoderGeometry>,
    pub types: Vec<String>,
    pub address_components: Vec<AddressComponent>,
    /// Offset from UTC, when the backend reported a time zone.
    pub utc_offset_minutes: Option<i64>,
}

impl PlaceResult {
    /// Query-only result, produced when a search is submitted without
    /// picking a suggestion.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl From<&ResultItem> for PlaceResult {
    fn from(item: &ResultItem) -> Self {
        let name = item
            .title
            .clone()
            .or_else(|| item.label().and_then(|l| l.split(',').next()).map(str::to_string));
        Self {
            place_id: item.place_id.clone(),
            name,
            formatted_address: item.label().map(str::to_string),
            geometry: item.position.map(|position| GeocoderGeometry {
                location: LatLng::from_lng_lat(position),
                viewport: viewport(item),
            }),
            types: place_types(item),
            address_components: address_components(item),
            utc_offset_minutes: item
                .time_zone
                .as_ref()
                .and_then(|tz| tz.offset_seconds)
                .map(|seconds| seconds / 60),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindPlaceFromQueryRequest {
    pub query: String,
    pub location_bias: Option<LatLng>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextSearchRequest {
    pub query: String,
    /// Biases results toward this point.
    pub location: Option<LatLng>,
    /// Restricts results to this area when no `location` is given.
    pub bounds: Option<LatLngBounds>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceDetailsRequest {
    pub place_id: String,
    pub language: Option<String>,
}

fn place_results(items: Option<Vec<ResultItem>>) -> std::result::Result<Vec<PlaceResult>, ServiceError> {
    let items = items.ok_or_else(|| MapsError::UnknownResult("response has no result items".to_string()))?;
    if items.is_empty() {
        return Err(ServiceError::status(Status::ZeroResults));
    }
    Ok(items.iter().map(PlaceResult::from).collect())
}

#[derive(Clone)]
pub struct PlacesService {
    client: Arc<dyn LocationClient>,
    config: ServiceConfig,
}

impl PlacesService {
    pub fn new(client: Arc<dyn LocationClient>) -> Self {
        Self::with_config(client, ServiceConfig::default())
    }

    pub fn with_config(client: Arc<dyn LocationClient>, config: ServiceConfig) -> Self {
        Self { client, config }
    }

    pub async fn find_place_from_query(
        &self,
        request: FindPlaceFromQueryRequest,
        callback: Option<Callback<Vec<PlaceResult>>>,
    ) -> std::result::Result<Vec<PlaceResult>, ServiceError> {
        let command = SearchTextCommand {
            query_text: request.query,
            bias_position: request.location_bias.map(|p| p.to_lng_lat()),
            language: self.config.language_for(request.language.as_deref()),
            max_results: Some(self.config.max_results),
            ..Default::default()
        };
        let outcome = match backend::search_text(self.client.as_ref(), command).await {
            Ok(response) => place_results(response.result_items),
            Err(e) => Err(e.into()),
        };
        settle("Place search", outcome, callback, Vec::clone)
    }

    pub async fn text_search(
        &self,
        request: TextSearchRequest,
        callback: Option<Callback<Vec<PlaceResult>>>,
    ) -> std::result::Result<Vec<PlaceResult>, ServiceError> {
        let bias_position = request.location.map(|p| p.to_lng_lat());
        let filter_bounding_box = match bias_position {
            Some(_) => None,
            None => request.bounds.as_ref().and_then(LatLngBounds::to_bbox),
        };
        let command = SearchTextCommand {
            query_text: request.query,
            bias_position,
            filter_bounding_box,
            language: self.config.language_for(request.language.as_deref()),
            max_results: Some(self.config.max_results),
        };
        let outcome = match backend::search_text(self.client.as_ref(), command).await {
            Ok(response) => place_results(response.result_items),
            Err(e) => Err(e.into()),
        };
        settle("Text search", outcome, callback, Vec::clone)
    }

    pub async fn get_details(
        &self,
        request: PlaceDetailsRequest,
        callback: Option<Callback<PlaceResult>>,
    ) -> std::result::Result<PlaceResult, ServiceError> {
        let command = GetPlaceCommand {
            place_id: request.place_id,
            language: self.config.language_for(request.language.as_deref()),
            additional_features: vec![TIME_ZONE_FEATURE.to_string()],
        };
        let outcome = backend::get_place(self.client.as_ref(), command)
            .await
            .map(|item| PlaceResult::from(&item))
            .map_err(ServiceError::from);
        settle("Place details", outcome, callback, PlaceResult::clone)
    }
}

/// A location as callers hand it to directions requests.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Free text, searched for.
    Query(String),
    /// Looked up by id.
    PlaceId(String),
    /// Used as given.
    LatLng(LatLng),
}

impl LocationInput {
    /// Accepts a string, `{query}`, `{placeId}` or a `{lat, lng}` object.
    pub fn from_value(value: &Value) -> Result<Self> {
        if let Some(query) = value.as_str() {
            return Ok(LocationInput::Query(query.to_string()));
        }
        if let Some(query) = value.get("query").and_then(Value::as_str) {
            return Ok(LocationInput::Query(query.to_string()));
        }
        if let Some(place_id) = value.get("placeId").and_then(Value::as_str) {
            return Ok(LocationInput::PlaceId(place_id.to_string()));
        }
        LatLng::from_value(value, false).map(LocationInput::LatLng)
    }
}

impl From<&str> for LocationInput {
    fn from(query: &str) -> Self {
        LocationInput::Query(query.to_string())
    }
}

impl From<LatLng> for LocationInput {
    fn from(point: LatLng) -> Self {
        LocationInput::LatLng(point)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub location_lat_lng: LatLng,
    /// `[lng, lat]`, ready for backend commands.
    pub position: [f64; 2],
    pub place_id: Option<String>,
    pub types: Vec<String>,
    pub formatted_address: Option<String>,
}

impl ResolvedLocation {
    fn at(point: LatLng) -> Self {
        Self {
            location_lat_lng: point,
            position: point.to_lng_lat(),
            place_id: None,
            types: Vec::new(),
            formatted_address: None,
        }
    }

    fn from_item(item: &ResultItem) -> Option<Self> {
        let point = LatLng::from_lng_lat(item.position?);
        Some(Self {
            place_id: item.place_id.clone(),
            types: place_types(item),
            formatted_address: item.label().map(str::to_string),
            ..Self::at(point)
        })
    }
}

/// Rejection of [`parse_or_find_location`]. Carries no status: the
/// rejection itself is the signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, thiserror::Error)]
#[error("location could not be resolved")]
pub struct LocationLookupError;

/// Resolution without logging, for callers that report failures themselves.
pub(crate) async fn resolve_location(client: &dyn LocationClient, input: &LocationInput) -> Result<ResolvedLocation> {
    let item = match input {
        LocationInput::LatLng(point) => return Ok(ResolvedLocation::at(*point)),
        LocationInput::Query(query) => {
            let command = SearchTextCommand {
                query_text: query.clone(),
                max_results: Some(1),
                ..Default::default()
            };
            backend::search_text(client, command)
                .await?
                .result_items
                .and_then(|items| items.into_iter().next())
                .ok_or_else(|| MapsError::UnknownResult(format!("no place matches '{query}'")))?
        }
        LocationInput::PlaceId(place_id) => {
            let command = GetPlaceCommand {
                place_id: place_id.clone(),
                ..Default::default()
            };
            backend::get_place(client, command).await?
        }
    };
    ResolvedLocation::from_item(&item)
        .ok_or_else(|| MapsError::UnknownResult("place has no position".to_string()))
}

/// Resolves a location input: searched, looked up by id, or taken as is.
pub async fn parse_or_find_location(
    client: &dyn LocationClient,
    input: &LocationInput,
) -> std::result::Result<ResolvedLocation, LocationLookupError> {
    resolve_location(client, input).await.map_err(|e| {
        log::error!("Failed to resolve location {:?}: {}", input, e);
        LocationLookupError
    })
}

fn selected_items(event_name: &str, data: &Value) -> Result<Vec<ResultItem>> {
    match event_name {
        "results" => {
            let items = data.get("items").cloned().unwrap_or(Value::Array(Vec::new()));
            Ok(serde_json::from_value(items)?)
        }
        _ => Ok(vec![serde_json::from_value(data.clone())?]),
    }
}

#[derive(Debug, Clone, Default)]
pub struct AutocompleteOptions {
    pub bounds: Option<LatLngBounds>,
}

#[derive(Default)]
struct SelectionState<T> {
    selection: Option<T>,
    bounds: Option<LatLngBounds>,
}

/// Single-place autocomplete over a search-box control.
#[derive(Clone)]
pub struct Autocomplete {
    control: Arc<dyn GeocoderControl>,
    state: Arc<Mutex<SelectionState<PlaceResult>>>,
    properties: PropertyBag,
}

crate::impl_mvc_object!(Autocomplete, properties);

impl Autocomplete {
    pub fn new(control: Arc<dyn GeocoderControl>, options: AutocompleteOptions) -> Self {
        let autocomplete = Self {
            control,
            state: Arc::new(Mutex::new(SelectionState::default())),
            properties: PropertyBag::new(),
        };
        autocomplete.set_bounds(options.bounds);
        autocomplete
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SelectionState<PlaceResult>) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn control(&self) -> &Arc<dyn GeocoderControl> {
        &self.control
    }

    /// Records the place behind a control `results`/`result` event.
    pub fn capture_selection(&self, event_name: &str, event: &RenderEvent) {
        let place = if event_name == "results" {
            let query = event.data.get("query").and_then(Value::as_str).unwrap_or_default();
            PlaceResult::named(query)
        } else {
            match selected_items(event_name, &event.data) {
                Ok(items) => items.first().map(PlaceResult::from).unwrap_or_default(),
                Err(e) => {
                    log::error!("Unreadable autocomplete selection: {}", e);
                    return;
                }
            }
        };
        self.with_state(|state| state.selection = Some(place));
    }

    pub fn get_place(&self) -> Option<PlaceResult> {
        self.with_state(|state| state.selection.clone())
    }

    pub fn set_bounds(&self, bounds: Option<LatLngBounds>) {
        self.control
            .set_bias_bbox(bounds.as_ref().and_then(LatLngBounds::to_bbox));
        self.with_state(|state| state.bounds = bounds);
    }

    pub fn get_bounds(&self) -> Option<LatLngBounds> {
        self.with_state(|state| state.bounds.clone())
    }
}

/// Multi-place search box over a search-box control.
#[derive(Clone)]
pub struct SearchBox {
    control: Arc<dyn GeocoderControl>,
    state: Arc<Mutex<SelectionState<Vec<PlaceResult>>>>,
    properties: PropertyBag,
}

crate::impl_mvc_object!(SearchBox, properties);

impl SearchBox {
    pub fn new(control: Arc<dyn GeocoderControl>, bounds: Option<LatLngBounds>) -> Self {
        let search_box = Self {
            control,
            state: Arc::new(Mutex::new(SelectionState::default())),
            properties: PropertyBag::new(),
        };
        search_box.set_bounds(bounds);
        search_box
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SelectionState<Vec<PlaceResult>>) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn control(&self) -> &Arc<dyn GeocoderControl> {
        &self.control
    }

    /// `results` selects every listed place, `result` just the picked one.
    pub fn capture_selection(&self, event_name: &str, event: &RenderEvent) {
        match selected_items(event_name, &event.data) {
            Ok(items) => {
                let places = items.iter().map(PlaceResult::from).collect();
                self.with_state(|state| state.selection = Some(places));
            }
            Err(e) => log::error!("Unreadable search box selection: {}", e),
        }
    }

    pub fn get_places(&self) -> Option<Vec<PlaceResult>> {
        self.with_state(|state| state.selection.clone())
    }

    pub fn set_bounds(&self, bounds: Option<LatLngBounds>) {
        self.control
            .set_bias_bbox(bounds.as_ref().and_then(LatLngBounds::to_bbox));
        self.with_state(|state| state.bounds = bounds);
    }

    pub fn get_bounds(&self) -> Option<LatLngBounds> {
        self.with_state(|state| state.bounds.clone())
    }
}
