use crate::{
    backend::{self, GeocodeCommand, GetPlaceCommand, LocationClient, ResultItem, ReverseGeocodeCommand},
    core::{
        config::ServiceConfig,
        constants::TIME_ZONE_FEATURE,
        geo::{LatLng, LatLngBounds},
    },
    prelude::Arc,
    services::{
        delivery::{settle, Callback},
        snake_case, ServiceError, Status,
    },
    MapsError, Result,
};

/// A geocode request. The first present field among `location`, `place_id`
/// and `address` decides the backend operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocoderRequest {
    pub address: Option<String>,
    pub location: Option<LatLng>,
    pub place_id: Option<String>,
    /// Only used with `address`: its centre becomes the bias position.
    pub bounds: Option<LatLngBounds>,
    pub language: Option<String>,
}

impl GeocoderRequest {
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Default::default()
        }
    }

    pub fn location(location: impl Into<LatLng>) -> Self {
        Self {
            location: Some(location.into()),
            ..Default::default()
        }
    }

    pub fn place_id(place_id: impl Into<String>) -> Self {
        Self {
            place_id: Some(place_id.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    pub types: Vec<String>,
}

impl AddressComponent {
    fn new(long_name: &str, short_name: Option<&str>, types: &[&str]) -> Self {
        Self {
            long_name: long_name.to_string(),
            short_name: short_name.unwrap_or(long_name).to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderGeometry {
    pub location: LatLng,
    pub viewport: Option<LatLngBounds>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderResult {
    pub formatted_address: String,
    pub place_id: String,
    pub geometry: GeocoderGeometry,
    pub address_components: Vec<AddressComponent>,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderResponse {
    pub results: Vec<GeocoderResult>,
}

/// Caller-facing name of a backend place type.
pub fn translate_place_type(place_type: &str) -> String {
    match place_type {
        "PointAddress" | "InterpolatedAddress" => "street_address".to_string(),
        "Street" | "Intersection" => "route".to_string(),
        "Locality" => "locality".to_string(),
        "District" | "SubDistrict" => "neighborhood".to_string(),
        "PostalCode" => "postal_code".to_string(),
        "SubRegion" => "administrative_area_level_2".to_string(),
        "Region" => "administrative_area_level_1".to_string(),
        "Country" => "country".to_string(),
        other => snake_case(other),
    }
}

/// Place type first, then category ids, without duplicates.
pub fn place_types(item: &ResultItem) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    let translated = item
        .place_type
        .as_deref()
        .map(translate_place_type)
        .into_iter()
        .chain(item.categories.iter().map(|c| snake_case(&c.id)));
    for t in translated {
        if !types.contains(&t) {
            types.push(t);
        }
    }
    types
}

pub fn address_components(item: &ResultItem) -> Vec<AddressComponent> {
    let Some(address) = item.address.as_ref() else {
        return Vec::new();
    };
    let mut components = Vec::new();
    if let Some(number) = address.address_number.as_deref() {
        components.push(AddressComponent::new(number, None, &["street_number"]));
    }
    if let Some(street) = address.street.as_deref() {
        components.push(AddressComponent::new(street, None, &["route"]));
    }
    if let Some(district) = address.district.as_deref() {
        components.push(AddressComponent::new(district, None, &["neighborhood", "political"]));
    }
    if let Some(locality) = address.locality.as_deref() {
        components.push(AddressComponent::new(locality, None, &["locality", "political"]));
    }
    if let Some(name) = address.sub_region.as_ref().and_then(|r| r.name.as_deref()) {
        components.push(AddressComponent::new(
            name,
            address.sub_region.as_ref().and_then(|r| r.code.as_deref()),
            &["administrative_area_level_2", "political"],
        ));
    }
    if let Some(name) = address.region.as_ref().and_then(|r| r.name.as_deref()) {
        components.push(AddressComponent::new(
            name,
            address.region.as_ref().and_then(|r| r.code.as_deref()),
            &["administrative_area_level_1", "political"],
        ));
    }
    if let Some(country) = address.country.as_ref() {
        if let Some(name) = country.name.as_deref().or(country.code3.as_deref()) {
            components.push(AddressComponent::new(
                name,
                country.code2.as_deref(),
                &["country", "political"],
            ));
        }
    }
    if let Some(postal_code) = address.postal_code.as_deref() {
        components.push(AddressComponent::new(postal_code, None, &["postal_code"]));
    }
    components
}

/// Viewport from the backend map view, if it forms valid bounds.
pub fn viewport(item: &ResultItem) -> Option<LatLngBounds> {
    item.map_view.and_then(|bbox| LatLngBounds::from_bbox(bbox).ok())
}

/// Normalises one backend result. A missing label, place id or position
/// is an [`MapsError::UnknownResult`].
pub fn translate_result(item: &ResultItem) -> Result<GeocoderResult> {
    let formatted_address = item
        .label()
        .ok_or_else(|| MapsError::UnknownResult("result has no address label".to_string()))?;
    let place_id = item
        .place_id
        .clone()
        .ok_or_else(|| MapsError::UnknownResult("result has no place id".to_string()))?;
    let position = item
        .position
        .ok_or_else(|| MapsError::UnknownResult("result has no position".to_string()))?;
    Ok(GeocoderResult {
        formatted_address: formatted_address.to_string(),
        place_id,
        geometry: GeocoderGeometry {
            location: LatLng::from_lng_lat(position),
            viewport: viewport(item),
        },
        address_components: address_components(item),
        types: place_types(item),
    })
}

#[derive(Clone)]
pub struct Geocoder {
    client: Arc<dyn LocationClient>,
    config: ServiceConfig,
}

impl Geocoder {
    pub fn new(client: Arc<dyn LocationClient>) -> Self {
        Self::with_config(client, ServiceConfig::default())
    }

    pub fn with_config(client: Arc<dyn LocationClient>, config: ServiceConfig) -> Self {
        Self { client, config }
    }

    /// Geocodes `request`. The callback, when given, sees the outcome
    /// before it is returned.
    pub async fn geocode(
        &self,
        request: GeocoderRequest,
        callback: Option<Callback<Vec<GeocoderResult>>>,
    ) -> std::result::Result<GeocoderResponse, ServiceError> {
        let outcome = self.lookup(request).await;
        settle("Geocoding", outcome, callback, |response| response.results.clone())
    }

    async fn lookup(&self, request: GeocoderRequest) -> std::result::Result<GeocoderResponse, ServiceError> {
        let client = self.client.as_ref();
        let language = self.config.language_for(request.language.as_deref());
        let items = if let Some(location) = request.location {
            let command = ReverseGeocodeCommand {
                query_position: location.to_lng_lat(),
                language,
                max_results: Some(self.config.max_results),
                ..Default::default()
            };
            backend::reverse_geocode(client, command).await?.result_items
        } else if let Some(place_id) = request.place_id {
            let command = GetPlaceCommand {
                place_id,
                language,
                additional_features: vec![TIME_ZONE_FEATURE.to_string()],
            };
            Some(vec![backend::get_place(client, command).await?])
        } else if let Some(address) = request.address {
            let command = GeocodeCommand {
                query_text: address,
                bias_position: request
                    .bounds
                    .as_ref()
                    .and_then(LatLngBounds::center)
                    .map(|center| center.to_lng_lat()),
                language,
                max_results: Some(self.config.max_results),
                ..Default::default()
            };
            backend::geocode(client, command).await?.result_items
        } else {
            return Err(MapsError::InvalidArgument(
                "geocode request needs a location, placeId or address".to_string(),
            )
            .into());
        };

        let items = items
            .ok_or_else(|| MapsError::UnknownResult("response has no result items".to_string()))?;
        if items.is_empty() {
            return Err(ServiceError::status(Status::ZeroResults));
        }
        let results = items
            .iter()
            .map(translate_result)
            .collect::<Result<Vec<_>>>()?;
        Ok(GeocoderResponse { results })
    }
}
