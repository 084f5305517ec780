//! Request translation between the caller-facing services (geocoder,
//! places, directions) and the location backend.
//!
//! Every asynchronous operation delivers its outcome twice, first to the
//! optional callback and then as the returned `Result`, through
//! [`delivery::settle`].

pub mod delivery;
pub mod directions;
pub mod geocoder;
pub mod places;
pub mod units;

use crate::MapsError;
use serde::{Deserialize, Serialize};

/// Status vocabulary reported to callbacks and carried by [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    UnknownError,
    ZeroResults,
    InvalidRequest,
    NotFound,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::UnknownError => "UNKNOWN_ERROR",
            Status::ZeroResults => "ZERO_RESULTS",
            Status::InvalidRequest => "INVALID_REQUEST",
            Status::NotFound => "NOT_FOUND",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn describe_source(source: &Option<MapsError>) -> String {
    source.as_ref().map(|e| format!(": {e}")).unwrap_or_default()
}

/// A failed service call, as the caller sees it.
#[derive(Debug, thiserror::Error)]
#[error("{status}{}", describe_source(.source))]
pub struct ServiceError {
    pub status: Status,
    #[source]
    pub source: Option<MapsError>,
}

impl ServiceError {
    pub fn new(status: Status, source: MapsError) -> Self {
        Self {
            status,
            source: Some(source),
        }
    }

    pub fn status(status: Status) -> Self {
        Self { status, source: None }
    }
}

impl From<MapsError> for ServiceError {
    fn from(error: MapsError) -> Self {
        let status = match error {
            MapsError::InvalidArgument(_) => Status::InvalidRequest,
            _ => Status::UnknownError,
        };
        Self::new(status, error)
    }
}

/// Lower snake case of a backend identifier: `PointOfInterest` becomes
/// `point_of_interest`; already snake-cased ids pass through.
pub fn snake_case(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 4);
    for (i, c) in id.chars().enumerate() {
        if c == ' ' || c == '-' {
            out.push('_');
        } else if c.is_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
