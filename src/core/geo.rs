use crate::{MapsError, Result};
use serde::{Deserialize, Serialize};

const MAX_LATITUDE: f64 = 90.0;
const FULL_TURN: f64 = 360.0;

/// Plain `{lat, lng}` object, the shape callers hand in and get back from `to_json`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngLiteral {
    pub lat: f64,
    pub lng: f64,
}

impl LatLngLiteral {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Represents a geographical coordinate with latitude and longitude.
///
/// Unless built with `no_clamp`, latitude is clamped to `[-90, 90]` and
/// longitude is wrapped into `[-180, 180)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    lat: f64,
    lng: f64,
}

impl LatLng {
    /// Creates a normalised coordinate. Non-finite input is passed through
    /// unchanged; use [`LatLng::try_new`] when the input is untrusted.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self::with_clamp(lat, lng, false)
    }

    /// Creates a coordinate, optionally skipping normalisation.
    pub fn with_clamp(lat: f64, lng: f64, no_clamp: bool) -> Self {
        if no_clamp {
            Self { lat, lng }
        } else {
            Self {
                lat: Self::clamp_lat(lat),
                lng: Self::wrap_lng(lng),
            }
        }
    }

    /// Validating constructor: rejects NaN and infinite components.
    pub fn try_new(lat: f64, lng: f64, no_clamp: bool) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(MapsError::InvalidArgument(format!(
                "not a LatLng or LatLngLiteral: ({lat}, {lng})"
            )));
        }
        Ok(Self::with_clamp(lat, lng, no_clamp))
    }

    /// Builds a coordinate from a loosely typed `{lat, lng}` object.
    pub fn from_value(value: &serde_json::Value, no_clamp: bool) -> Result<Self> {
        let field = |name: &str| {
            value.get(name).and_then(serde_json::Value::as_f64).ok_or_else(|| {
                MapsError::InvalidArgument(format!("not a LatLng or LatLngLiteral: {value}"))
            })
        };
        Self::try_new(field("lat")?, field("lng")?, no_clamp)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Wraps longitude into `[-180, 180)`
    pub fn wrap_lng(lng: f64) -> f64 {
        if (-180.0..180.0).contains(&lng) {
            return lng;
        }
        (lng + 180.0).rem_euclid(FULL_TURN) - 180.0
    }

    /// Clamps latitude to `[-90, 90]`
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Formats as `"lat,lng"`, rounded to `precision` decimal digits with
    /// trailing zeros dropped.
    pub fn to_url_value(&self, precision: usize) -> String {
        format!(
            "{},{}",
            round_to(self.lat, precision),
            round_to(self.lng, precision)
        )
    }

    pub fn to_json(&self) -> LatLngLiteral {
        LatLngLiteral::new(self.lat, self.lng)
    }

    /// Render-library ordering: `[lng, lat]`.
    pub fn to_lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn from_lng_lat(lng_lat: [f64; 2]) -> Self {
        Self::new(lng_lat[1], lng_lat[0])
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

impl From<LatLngLiteral> for LatLng {
    fn from(literal: LatLngLiteral) -> Self {
        Self::new(literal.lat, literal.lng)
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl From<LatLng> for LatLngLiteral {
    fn from(lat_lng: LatLng) -> Self {
        lat_lng.to_json()
    }
}

impl Serialize for LatLng {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LatLng {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        LatLngLiteral::deserialize(deserializer).map(LatLng::from)
    }
}

fn round_to(value: f64, precision: usize) -> f64 {
    let factor = 10_f64.powi(precision as i32);
    // `+ 0.0` folds a rounded `-0` into `0`
    (value * factor).round() / factor + 0.0
}

/// Eastward angular distance from `from` to `to`, in `[0, 360]`.
fn eastward(from: f64, to: f64) -> f64 {
    let delta = to - from;
    if delta >= 0.0 {
        delta
    } else {
        delta + FULL_TURN
    }
}

/// `{north, south, east, west}` object form of a bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBoundsLiteral {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// A longitude arc, stored as a start plus an eastward width so that
/// arcs crossing the antimeridian (`west > east`) need no special casing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LngArc {
    west: f64,
    width: f64,
}

impl LngArc {
    fn between(west: f64, east: f64) -> Self {
        if east - west >= FULL_TURN {
            return Self::full();
        }
        Self {
            west,
            width: eastward(west, east),
        }
    }

    fn full() -> Self {
        Self {
            west: -180.0,
            width: FULL_TURN,
        }
    }

    fn east(&self) -> f64 {
        if self.width >= FULL_TURN {
            180.0
        } else {
            LatLng::wrap_lng(self.west + self.width)
        }
    }

    fn contains(&self, lng: f64) -> bool {
        self.width >= FULL_TURN || eastward(self.west, lng) <= self.width
    }

    fn overlaps(&self, other: &LngArc) -> bool {
        eastward(self.west, other.west) <= self.width || eastward(other.west, self.west) <= other.width
    }

    fn union(&self, other: &LngArc) -> LngArc {
        let offset = eastward(self.west, other.west);
        if offset <= self.width {
            return Self::spanning(self.west, self.width.max(offset + other.width));
        }
        let back = eastward(other.west, self.west);
        if back <= other.width {
            return Self::spanning(other.west, other.width.max(back + self.width));
        }
        // Disjoint: close whichever gap is smaller, ties go to the western start
        let forward = Self::spanning(self.west, offset + other.width);
        let reverse = Self::spanning(other.west, back + self.width);
        if forward.width < reverse.width
            || (forward.width == reverse.width && self.west <= other.west)
        {
            forward
        } else {
            reverse
        }
    }

    fn spanning(west: f64, width: f64) -> Self {
        if width >= FULL_TURN {
            Self::full()
        } else {
            Self { west, width }
        }
    }

    fn center(&self) -> f64 {
        if self.width >= FULL_TURN {
            0.0
        } else {
            LatLng::wrap_lng(self.west + self.width / 2.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Extent {
    south: f64,
    north: f64,
    lng: LngArc,
}

/// Represents a bounding box of geographical coordinates, possibly empty.
///
/// `extend` and `union` mutate the receiver and hand the same instance back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LatLngBounds {
    extent: Option<Extent>,
}

impl LatLngBounds {
    /// Creates an empty bounds
    pub fn empty() -> Self {
        Self { extent: None }
    }

    /// Creates bounds from a south-west and north-east corner.
    pub fn new(south_west: impl Into<LatLng>, north_east: impl Into<LatLng>) -> Result<Self> {
        let (south_west, north_east) = (south_west.into(), north_east.into());
        if south_west.lat() > north_east.lat() {
            return Err(MapsError::InvalidArgument(format!(
                "south-west {south_west} lies north of north-east {north_east}"
            )));
        }
        Ok(Self::from_edges(
            south_west.lat(),
            north_east.lat(),
            south_west.lng(),
            north_east.lng(),
        ))
    }

    /// Creates bounds from a `{north, south, east, west}` literal.
    pub fn from_literal(literal: LatLngBoundsLiteral) -> Result<Self> {
        let values = [literal.north, literal.south, literal.east, literal.west];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MapsError::InvalidArgument(format!(
                "not a LatLngBounds or LatLngBoundsLiteral: {literal:?}"
            )));
        }
        if literal.south > literal.north {
            return Err(MapsError::InvalidArgument(format!(
                "south {} lies north of north {}",
                literal.south, literal.north
            )));
        }
        let lng = if literal.east - literal.west >= FULL_TURN {
            LngArc::full()
        } else {
            LngArc::between(LatLng::wrap_lng(literal.west), LatLng::wrap_lng(literal.east))
        };
        Ok(Self {
            extent: Some(Extent {
                south: LatLng::clamp_lat(literal.south),
                north: LatLng::clamp_lat(literal.north),
                lng,
            }),
        })
    }

    /// Builds bounds from a loosely typed object: either a literal or `{south_west, north_east}` pair.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        if let Ok(literal) = serde_json::from_value::<LatLngBoundsLiteral>(value.clone()) {
            return Self::from_literal(literal);
        }
        match (value.get("south_west"), value.get("north_east")) {
            (Some(sw), Some(ne)) => Self::new(LatLng::from_value(sw, false)?, LatLng::from_value(ne, false)?),
            _ => Err(MapsError::InvalidArgument(format!(
                "not a LatLngBounds or LatLngBoundsLiteral: {value}"
            ))),
        }
    }

    fn from_edges(south: f64, north: f64, west: f64, east: f64) -> Self {
        Self {
            extent: Some(Extent {
                south,
                north,
                lng: LngArc::between(west, east),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.extent.is_none()
    }

    pub fn south_west(&self) -> Option<LatLng> {
        self.extent
            .map(|e| LatLng::with_clamp(e.south, e.lng.west, true))
    }

    pub fn north_east(&self) -> Option<LatLng> {
        self.extent
            .map(|e| LatLng::with_clamp(e.north, e.lng.east(), true))
    }

    /// True when the arc runs from west across the antimeridian to east.
    pub fn crosses_antimeridian(&self) -> bool {
        self.extent
            .map(|e| e.lng.width < FULL_TURN && e.lng.west > e.lng.east())
            .unwrap_or(false)
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: impl Into<LatLng>) -> bool {
        let point = point.into();
        match self.extent {
            Some(e) => point.lat() >= e.south && point.lat() <= e.north && e.lng.contains(point.lng()),
            None => false,
        }
    }

    /// True iff both the latitude ranges and the longitude arcs overlap.
    pub fn intersects(&self, other: &LatLngBounds) -> bool {
        match (self.extent, other.extent) {
            (Some(a), Some(b)) => a.south <= b.north && b.south <= a.north && a.lng.overlaps(&b.lng),
            _ => false,
        }
    }

    /// Grows the receiver to the minimal bounds containing both, in place.
    pub fn union(&mut self, other: &LatLngBounds) -> &mut Self {
        let Some(theirs) = other.extent else {
            return self;
        };
        self.extent = Some(match self.extent {
            Some(ours) => Extent {
                south: ours.south.min(theirs.south),
                north: ours.north.max(theirs.north),
                lng: ours.lng.union(&theirs.lng),
            },
            None => theirs,
        });
        self
    }

    /// Grows the receiver to contain `point`, in place.
    pub fn extend(&mut self, point: impl Into<LatLng>) -> &mut Self {
        let point = point.into();
        let single = Self::from_edges(point.lat(), point.lat(), point.lng(), point.lng());
        self.union(&single)
    }

    /// Arithmetic centre (not geodesic); wrapping arcs are centred across the antimeridian.
    pub fn center(&self) -> Option<LatLng> {
        self.extent
            .map(|e| LatLng::new((e.south + e.north) / 2.0, e.lng.center()))
    }

    /// Latitude and longitude extents, as an unclamped coordinate.
    pub fn to_span(&self) -> LatLng {
        match self.extent {
            Some(e) => LatLng::with_clamp(e.north - e.south, e.lng.width, true),
            None => LatLng::with_clamp(0.0, 0.0, true),
        }
    }

    pub fn to_json(&self) -> Option<LatLngBoundsLiteral> {
        self.extent.map(|e| LatLngBoundsLiteral {
            north: e.north,
            south: e.south,
            east: e.lng.east(),
            west: e.lng.west,
        })
    }

    /// `"south,west,north,east"`, each rounded to `precision` digits.
    pub fn to_url_value(&self, precision: usize) -> String {
        match (self.south_west(), self.north_east()) {
            (Some(sw), Some(ne)) => format!("{},{}", sw.to_url_value(precision), ne.to_url_value(precision)),
            _ => String::new(),
        }
    }

    /// Render-library ordering: `[west, south, east, north]`.
    pub fn to_bbox(&self) -> Option<[f64; 4]> {
        self.to_json().map(|l| [l.west, l.south, l.east, l.north])
    }

    pub fn from_bbox(bbox: [f64; 4]) -> Result<Self> {
        Self::from_literal(LatLngBoundsLiteral {
            west: bbox[0],
            south: bbox[1],
            east: bbox[2],
            north: bbox[3],
        })
    }
}

impl From<LatLng> for LatLngBounds {
    fn from(point: LatLng) -> Self {
        let mut bounds = Self::empty();
        bounds.extend(point);
        bounds
    }
}
