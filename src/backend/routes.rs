use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteTravelMode {
    #[default]
    Car,
    Pedestrian,
    Scooter,
    Truck,
}

/// Features a route should avoid. Unset flags are left to the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RouteAvoidanceOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toll_roads: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toll_transponders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ferries: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controlled_access_highways: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub u_turns: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dirt_roads: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tunnels: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CalculateRoutesCommand {
    pub origin: [f64; 2],
    pub destination: [f64; 2],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub waypoints: Vec<[f64; 2]>,
    pub travel_mode: RouteTravelMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avoid: Option<RouteAvoidanceOptions>,
    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RouteStep {
    /// Meters.
    pub distance: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub start_position: Option<[f64; 2]>,
    pub end_position: Option<[f64; 2]>,
    pub instruction: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RouteLeg {
    /// Meters.
    pub distance: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub start_position: Option<[f64; 2]>,
    pub end_position: Option<[f64; 2]>,
    /// Polyline, `[lng, lat]` per vertex.
    pub geometry: Option<Vec<[f64; 2]>>,
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Route {
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CalculateRoutesResponse {
    pub routes: Option<Vec<Route>>,
}
