//! Boundary to the geocoding, places and routing backend.
//!
//! Every request is a [`Command`] sent through one [`LocationClient::send`];
//! the typed helpers below check that the output matches the command and
//! turn client failures into [`MapsError::BackendRequestFailed`].

pub mod places;
pub mod routes;

pub use places::{
    Address, Category, Country, GeocodeCommand, GeocodeResponse, GetPlaceCommand, Region,
    ResultItem, ReverseGeocodeCommand, ReverseGeocodeResponse, SearchTextCommand,
    SearchTextResponse, TimeZone,
};
pub use routes::{
    CalculateRoutesCommand, CalculateRoutesResponse, Route, RouteAvoidanceOptions, RouteLeg,
    RouteStep, RouteTravelMode,
};

use crate::{MapsError, Result};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Geocode(GeocodeCommand),
    ReverseGeocode(ReverseGeocodeCommand),
    GetPlace(GetPlaceCommand),
    SearchText(SearchTextCommand),
    CalculateRoutes(CalculateRoutesCommand),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Geocode(_) => "Geocode",
            Command::ReverseGeocode(_) => "ReverseGeocode",
            Command::GetPlace(_) => "GetPlace",
            Command::SearchText(_) => "SearchText",
            Command::CalculateRoutes(_) => "CalculateRoutes",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    Geocode(GeocodeResponse),
    ReverseGeocode(ReverseGeocodeResponse),
    GetPlace(ResultItem),
    SearchText(SearchTextResponse),
    CalculateRoutes(CalculateRoutesResponse),
}

impl CommandOutput {
    pub fn name(&self) -> &'static str {
        match self {
            CommandOutput::Geocode(_) => "Geocode",
            CommandOutput::ReverseGeocode(_) => "ReverseGeocode",
            CommandOutput::GetPlace(_) => "GetPlace",
            CommandOutput::SearchText(_) => "SearchText",
            CommandOutput::CalculateRoutes(_) => "CalculateRoutes",
        }
    }
}

/// A backend client. Implementations own transport, credentials and
/// retries; a hung request is never timed out here.
#[async_trait]
pub trait LocationClient: Send + Sync {
    async fn send(&self, command: Command) -> anyhow::Result<CommandOutput>;
}

macro_rules! typed_send {
    ($(#[$meta:meta])* $fn_name:ident, $variant:ident, $command:ty, $response:ty) => {
        $(#[$meta])*
        pub async fn $fn_name(client: &dyn LocationClient, command: $command) -> Result<$response> {
            let output = client
                .send(Command::$variant(command))
                .await
                .map_err(MapsError::backend)?;
            match output {
                CommandOutput::$variant(response) => Ok(response),
                other => Err(MapsError::UnknownResult(format!(
                    "{} command answered with {} output",
                    stringify!($variant),
                    other.name()
                ))),
            }
        }
    };
}

typed_send!(geocode, Geocode, GeocodeCommand, GeocodeResponse);
typed_send!(reverse_geocode, ReverseGeocode, ReverseGeocodeCommand, ReverseGeocodeResponse);
typed_send!(
    /// Place details by id.
    get_place, GetPlace, GetPlaceCommand, ResultItem
);
typed_send!(search_text, SearchText, SearchTextCommand, SearchTextResponse);
typed_send!(calculate_routes, CalculateRoutes, CalculateRoutesCommand, CalculateRoutesResponse);
