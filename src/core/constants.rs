//! Engine-wide constants: render-library id prefixes, unit conversions and
//! the country codes that default to imperial units.

/// Source id prefix for generated circle polygons.
pub const CIRCLE_SOURCE_PREFIX: &str = "circle-source";

/// Fill layer id prefix for generated circle polygons.
pub const CIRCLE_FILL_PREFIX: &str = "circle-fill";

/// Outline layer id prefix for generated circle polygons.
pub const CIRCLE_LINE_PREFIX: &str = "circle-line";

/// Source/layer id prefix for rendered directions.
pub const DIRECTIONS_PREFIX: &str = "directions";

/// Polygon vertices used to approximate a circle.
pub const DEFAULT_CIRCLE_STEPS: usize = 64;

/// Default precision for `to_url_value`.
pub const DEFAULT_URL_PRECISION: usize = 6;

pub const METERS_PER_KILOMETER: f64 = 1000.0;

pub const MILES_PER_KILOMETER: f64 = 0.621371;

pub const FEET_PER_MILE: f64 = 5280.0;

/// ISO 3166-1 alpha-3 codes of the countries that default to imperial units.
pub const IMPERIAL_COUNTRY_CODES: [&str; 3] = ["USA", "MMR", "LBR"];

/// The same countries as ISO 3166-1 alpha-2 codes, used for boundary lookups.
pub const IMPERIAL_COUNTRY_ISO2_CODES: [&str; 3] = ["US", "MM", "LR"];

/// Backend feature flag requesting time-zone metadata on place lookups.
pub const TIME_ZONE_FEATURE: &str = "TimeZone";
