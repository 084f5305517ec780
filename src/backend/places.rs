//! Geocoding and place commands with the response shapes consumed from them.
//!
//! Positions are `[lng, lat]`; bounding boxes are `[west, south, east, north]`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeocodeCommand {
    pub query_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_position: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReverseGeocodeCommand {
    pub query_position: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetPlaceCommand {
    pub place_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchTextCommand {
    pub query_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_position: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_bounding_box: Option<[f64; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Country {
    pub code2: Option<String>,
    pub code3: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Region {
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Address {
    pub label: Option<String>,
    pub country: Option<Country>,
    pub region: Option<Region>,
    pub sub_region: Option<Region>,
    pub locality: Option<String>,
    pub district: Option<String>,
    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub address_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Category {
    pub id: String,
    pub name: Option<String>,
    pub primary: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TimeZone {
    pub name: Option<String>,
    /// e.g. `-05:00`
    pub offset: Option<String>,
    pub offset_seconds: Option<i64>,
}

/// A place as returned by every geocoding and search command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResultItem {
    pub place_id: Option<String>,
    /// e.g. `PointAddress`, `Locality`, `PointOfInterest`
    pub place_type: Option<String>,
    pub title: Option<String>,
    pub address: Option<Address>,
    pub position: Option<[f64; 2]>,
    pub map_view: Option<[f64; 4]>,
    pub categories: Vec<Category>,
    pub time_zone: Option<TimeZone>,
}

impl ResultItem {
    pub fn country_code3(&self) -> Option<&str> {
        self.address
            .as_ref()?
            .country
            .as_ref()?
            .code3
            .as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.address.as_ref()?.label.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GeocodeResponse {
    pub result_items: Option<Vec<ResultItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReverseGeocodeResponse {
    pub result_items: Option<Vec<ResultItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SearchTextResponse {
    pub result_items: Option<Vec<ResultItem>>,
}
