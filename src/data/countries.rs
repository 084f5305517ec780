//! Country lookup for a point, backed by the OpenStreetMap-derived boundary
//! set bundled with the `country-boundaries` crate.
//!
//! The boundaries are decoded once on first use and shared read-only
//! afterwards.

use crate::core::{constants::IMPERIAL_COUNTRY_ISO2_CODES, geo::LatLng};
use country_boundaries::{CountryBoundaries, LatLon, BOUNDARIES_ODBL_360X180};
use once_cell::sync::Lazy;

static BOUNDARIES: Lazy<Option<CountryBoundaries>> =
    Lazy::new(|| match CountryBoundaries::from_reader(BOUNDARIES_ODBL_360X180) {
        Ok(boundaries) => Some(boundaries),
        Err(e) => {
            log::error!("Failed to load country boundaries: {:?}", e);
            None
        }
    });

fn position(point: LatLng) -> Option<LatLon> {
    LatLon::new(point.lat(), point.lng()).ok()
}

/// ISO 3166 ids of every region containing `point`, subdivisions first
/// (`["US-TX", "US"]` for Austin). Empty at sea.
pub fn region_ids(point: LatLng) -> Vec<&'static str> {
    match (BOUNDARIES.as_ref(), position(point)) {
        (Some(boundaries), Some(position)) => boundaries.ids(position),
        _ => Vec::new(),
    }
}

/// Whether `point` lies in the country with ISO 3166-1 alpha-2 `code`.
pub fn is_in_country(point: LatLng, code: &str) -> bool {
    match (BOUNDARIES.as_ref(), position(point)) {
        (Some(boundaries), Some(position)) => boundaries.is_in(position, code),
        _ => false,
    }
}

/// Whether `point` lies in the USA, Myanmar or Liberia.
pub fn is_in_imperial_country(point: LatLng) -> bool {
    IMPERIAL_COUNTRY_ISO2_CODES
        .iter()
        .any(|code| is_in_country(point, code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_ids_include_subdivision() {
        let ids = region_ids(LatLng::new(30.268193, -97.7457518));
        assert!(ids.contains(&"US"));
        assert!(ids.contains(&"US-TX"));
    }

    #[test]
    fn test_open_sea_has_no_country() {
        assert!(region_ids(LatLng::new(0.0, -30.0)).is_empty());
        assert!(!is_in_imperial_country(LatLng::new(0.0, -30.0)));
    }

    #[test]
    fn test_country_by_code() {
        assert!(is_in_country(LatLng::new(6.5, -10.3), "LR"));
        assert!(is_in_country(LatLng::new(16.87, 96.2), "MM"));
        assert!(!is_in_country(LatLng::new(16.87, 96.2), "LR"));
    }
}
