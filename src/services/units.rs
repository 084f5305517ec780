//! Unit-system inference and the distance/duration text shown in
//! directions, plus the batch reverse-geocoding helper.

use crate::{
    backend::{self, LocationClient, ReverseGeocodeCommand},
    core::{
        constants::{FEET_PER_MILE, IMPERIAL_COUNTRY_CODES, METERS_PER_KILOMETER, MILES_PER_KILOMETER},
        geo::LatLng,
    },
    data::countries::is_in_imperial_country,
    MapsError, Result,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitSystem {
    Imperial,
    Metric,
}

impl UnitSystem {
    pub fn from_country_code(code3: Option<&str>) -> Self {
        match code3 {
            Some(code) if IMPERIAL_COUNTRY_CODES.contains(&code) => UnitSystem::Imperial,
            _ => UnitSystem::Metric,
        }
    }
}

/// Whether `point` falls inside the USA, Myanmar or Liberia.
pub fn is_point_in_imperial_country(point: LatLng) -> bool {
    is_in_imperial_country(point)
}

/// Single best match for `point`. Every result item carries its full
/// address, country included, so no additional feature is requested.
fn nearest_address_command(point: LatLng) -> ReverseGeocodeCommand {
    ReverseGeocodeCommand {
        query_position: point.to_lng_lat(),
        max_results: Some(1),
        ..Default::default()
    }
}

/// Reverse-geocodes `point` and picks the unit system of its country.
/// Every failure, including a failed request, falls back to metric.
pub async fn get_unit_system_from_lat_long(client: &dyn LocationClient, point: LatLng) -> UnitSystem {
    match backend::reverse_geocode(client, nearest_address_command(point)).await {
        Ok(response) => {
            let first = response.result_items.as_ref().and_then(|items| items.first());
            UnitSystem::from_country_code(first.and_then(|item| item.country_code3()))
        }
        Err(e) => {
            log::warn!("Unit system lookup for {} failed, using metric: {}", point, e);
            UnitSystem::Metric
        }
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// `"1 day 2 hours 5 mins"`. Leftover seconds round up to a whole minute;
/// zero-valued parts are omitted, and a zero duration reads `"0 mins"`.
pub fn format_duration_seconds(seconds: u64) -> String {
    let mut days = seconds / 86_400;
    let mut hours = seconds % 86_400 / 3_600;
    let mut minutes = (seconds % 3_600).div_ceil(60);
    if minutes == 60 {
        minutes = 0;
        hours += 1;
    }
    if hours == 24 {
        hours = 0;
        days += 1;
    }

    let parts: Vec<String> = [(days, "day"), (hours, "hour"), (minutes, "min")]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, unit)| plural(count, unit))
        .collect();
    if parts.is_empty() {
        plural(0, "min")
    } else {
        parts.join(" ")
    }
}

/// Digits of `value` with `,` between thousands.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One decimal below 1,000 after rounding, grouped whole numbers from there.
fn format_large(value: f64, unit: &str) -> String {
    let tenths = (value * 10.0).round() / 10.0;
    if tenths < 1000.0 {
        format!("{tenths:.1} {unit}")
    } else {
        format!("{} {unit}", group_thousands(value.round() as u64))
    }
}

/// Human readable distance for `meters`: m/km for metric, ft/mi for imperial.
pub fn format_distance_based_on_unit_system(meters: f64, unit_system: UnitSystem) -> String {
    let kilometers = meters / METERS_PER_KILOMETER;
    match unit_system {
        UnitSystem::Metric => {
            let whole_meters = meters.round();
            if whole_meters < METERS_PER_KILOMETER {
                format!("{} m", whole_meters as i64)
            } else {
                format_large(kilometers, "km")
            }
        }
        UnitSystem::Imperial => {
            let miles = kilometers * MILES_PER_KILOMETER;
            if miles < 0.1 {
                format!("{} ft", (miles * FEET_PER_MILE).round() as i64)
            } else {
                format_large(miles, "mi")
            }
        }
    }
}

async fn reverse_geocoded_label(client: &dyn LocationClient, point: LatLng) -> Result<String> {
    let response = backend::reverse_geocode(client, nearest_address_command(point)).await?;
    response
        .result_items
        .as_ref()
        .and_then(|items| items.first())
        .and_then(|item| item.label())
        .map(str::to_string)
        .ok_or_else(|| MapsError::UnknownResult(format!("no address label for {point}")))
}

/// Reverse-geocodes every point concurrently. A failed lookup yields `""`
/// at its index and never affects the others; the callback, when given,
/// receives the full list before it is returned.
pub async fn get_reverse_geocoded_addresses(
    client: &dyn LocationClient,
    points: &[LatLng],
    callback: Option<Box<dyn FnOnce(Vec<String>) + Send>>,
) -> Vec<String> {
    let lookups = points.iter().map(|point| async move {
        match reverse_geocoded_label(client, *point).await {
            Ok(label) => label,
            Err(e) => {
                log::error!("Reverse geocoding {} failed: {}", point, e);
                String::new()
            }
        }
    });
    let addresses = join_all(lookups).await;
    if let Some(callback) = callback {
        callback(addresses.clone());
    }
    addresses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration_seconds(0), "0 mins");
        assert_eq!(format_duration_seconds(1), "1 min");
        assert_eq!(format_duration_seconds(61), "2 mins");
        assert_eq!(format_duration_seconds(3_600), "1 hour");
        assert_eq!(format_duration_seconds(7_260), "2 hours 1 min");
        assert_eq!(format_duration_seconds(86_400 + 3_600 + 60), "1 day 1 hour 1 min");
        assert_eq!(format_duration_seconds(2 * 86_400), "2 days");
        assert_eq!(format_duration_seconds(3_599), "1 hour");
    }

    #[test]
    fn test_metric_distance() {
        assert_eq!(format_distance_based_on_unit_system(0.0, UnitSystem::Metric), "0 m");
        assert_eq!(format_distance_based_on_unit_system(999.4, UnitSystem::Metric), "999 m");
        assert_eq!(format_distance_based_on_unit_system(1_234.0, UnitSystem::Metric), "1.2 km");
        assert_eq!(format_distance_based_on_unit_system(999_000.0, UnitSystem::Metric), "999.0 km");
        assert_eq!(format_distance_based_on_unit_system(1_500_000.0, UnitSystem::Metric), "1,500 km");
        assert_eq!(
            format_distance_based_on_unit_system(12_345_678.0, UnitSystem::Metric),
            "12,346 km"
        );
    }

    #[test]
    fn test_distance_rounding_into_next_unit() {
        assert_eq!(format_distance_based_on_unit_system(999.6, UnitSystem::Metric), "1.0 km");
        assert_eq!(format_distance_based_on_unit_system(999_950.0, UnitSystem::Metric), "1,000 km");
        assert_eq!(format_distance_based_on_unit_system(999_949.0, UnitSystem::Metric), "999.9 km");
        let miles_999_96 = 999.96 / MILES_PER_KILOMETER * METERS_PER_KILOMETER;
        assert_eq!(format_distance_based_on_unit_system(miles_999_96, UnitSystem::Imperial), "1,000 mi");
    }

    #[test]
    fn test_imperial_distance() {
        assert_eq!(format_distance_based_on_unit_system(100.0, UnitSystem::Imperial), "328 ft");
        assert_eq!(format_distance_based_on_unit_system(1_609.345, UnitSystem::Imperial), "1.0 mi");
        assert_eq!(
            format_distance_based_on_unit_system(1_609_345.0, UnitSystem::Imperial),
            "1,000 mi"
        );
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_point_in_imperial_country() {
        assert!(is_point_in_imperial_country(LatLng::new(30.268193, -97.7457518)));
        assert!(is_point_in_imperial_country(LatLng::new(61.2, -149.9)));
        assert!(is_point_in_imperial_country(LatLng::new(16.87, 96.2)));
        assert!(is_point_in_imperial_country(LatLng::new(7.0, -9.47)));
        assert!(!is_point_in_imperial_country(LatLng::new(48.8566, 2.3522)));
        assert!(!is_point_in_imperial_country(LatLng::new(49.2827, -123.1207)));
    }

    #[test]
    fn test_border_cities() {
        // Miami, El Paso, Brownsville, San Diego, Detroit
        assert!(is_point_in_imperial_country(LatLng::new(25.7617, -80.1918)));
        assert!(is_point_in_imperial_country(LatLng::new(31.79, -106.42)));
        assert!(is_point_in_imperial_country(LatLng::new(25.93, -97.48)));
        assert!(is_point_in_imperial_country(LatLng::new(32.7157, -117.1611)));
        assert!(is_point_in_imperial_country(LatLng::new(42.36, -83.07)));
        // Tijuana, Ciudad Juarez, Windsor ON, Victoria BC
        assert!(!is_point_in_imperial_country(LatLng::new(32.5027, -117.00)));
        assert!(!is_point_in_imperial_country(LatLng::new(31.69, -106.42)));
        assert!(!is_point_in_imperial_country(LatLng::new(42.28, -83.00)));
        assert!(!is_point_in_imperial_country(LatLng::new(48.4284, -123.3656)));
    }

    #[test]
    fn test_country_code_mapping() {
        assert_eq!(UnitSystem::from_country_code(Some("USA")), UnitSystem::Imperial);
        assert_eq!(UnitSystem::from_country_code(Some("LBR")), UnitSystem::Imperial);
        assert_eq!(UnitSystem::from_country_code(Some("CAN")), UnitSystem::Metric);
        assert_eq!(UnitSystem::from_country_code(None), UnitSystem::Metric);
    }
}
