mod common;

use common::*;
use mapbridge::backend::{
    Command, CommandOutput, GeocodeResponse, ReverseGeocodeResponse, SearchTextResponse,
};
use mapbridge::prelude::*;
use mapbridge::services::delivery::callback;
use mapbridge::services::places::{FindPlaceFromQueryRequest, PlaceDetailsRequest, TextSearchRequest};

#[cfg(test)]
mod geocoder_tests {
    use super::*;

    fn reverse_geocode_with(items: Vec<mapbridge::backend::ResultItem>) -> Arc<ScriptedClient> {
        ScriptedClient::new(move |_| {
            Ok(CommandOutput::ReverseGeocode(ReverseGeocodeResponse {
                result_items: Some(items.clone()),
            }))
        })
    }

    /// Reverse geocoding a location delivers the translated result to the
    /// callback before the awaited value resolves.
    #[tokio::test]
    async fn test_geocode_by_location_delivers_callback_then_result() {
        let client = reverse_geocode_with(vec![austin_item("KEEP_AUSTIN_WEIRD")]);
        let geocoder = Geocoder::new(client.clone());
        let order = Arc::new(Mutex::new(Vec::new()));

        let seen = order.clone();
        let response = geocoder
            .geocode(
                GeocoderRequest::location(LatLng::new(30.268193, -97.7457518)),
                callback(move |results: Option<Vec<GeocoderResult>>, status| {
                    assert_eq!(status, Status::Ok);
                    assert_eq!(results.map(|r| r.len()), Some(1));
                    seen.lock().unwrap().push("callback");
                }),
            )
            .await
            .expect("geocode should succeed");
        order.lock().unwrap().push("result");

        assert_eq!(*order.lock().unwrap(), vec!["callback", "result"]);
        assert_eq!(response.results.len(), 1);
        let result = &response.results[0];
        assert_eq!(result.place_id, "KEEP_AUSTIN_WEIRD");
        assert_eq!(result.geometry.location.lat(), 30.268193);
        assert_eq!(result.geometry.location.lng(), -97.7457518);

        match &client.calls()[0] {
            Command::ReverseGeocode(command) => {
                assert_eq!(command.query_position, [-97.7457518, 30.268193]);
            }
            other => panic!("unexpected command {}", other.name()),
        }
    }

    /// A response object without a result list is an UNKNOWN_ERROR, reported
    /// to the callback, returned as an error and logged exactly once.
    #[tokio::test]
    async fn test_empty_response_is_unknown_error_logged_once() {
        capture_logs();
        let client = ScriptedClient::new(|_| Ok(CommandOutput::ReverseGeocode(ReverseGeocodeResponse::default())));
        let geocoder = Geocoder::new(client);
        let delivered = Arc::new(Mutex::new(None));

        let slot = delivered.clone();
        let error = geocoder
            .geocode(
                GeocoderRequest::location(LatLng::new(30.268193, -97.7457518)),
                callback(move |results: Option<Vec<GeocoderResult>>, status| {
                    *slot.lock().unwrap() = Some((results.is_none(), status));
                }),
            )
            .await
            .unwrap_err();

        assert_eq!(error.status, Status::UnknownError);
        assert_eq!(*delivered.lock().unwrap(), Some((true, Status::UnknownError)));
        assert_eq!(error_logs().len(), 1);
    }

    /// A client failure is reported the same way as a malformed response.
    #[tokio::test]
    async fn test_backend_failure_is_unknown_error() {
        capture_logs();
        let client = ScriptedClient::new(|_| Err(anyhow::anyhow!("connection reset")));
        let geocoder = Geocoder::new(client);

        let error = geocoder
            .geocode(GeocoderRequest::address("1100 Congress Ave"), None)
            .await
            .unwrap_err();

        assert_eq!(error.status, Status::UnknownError);
        assert_eq!(error_logs().len(), 1);
    }

    /// An empty result list is an answer, not a fault.
    #[tokio::test]
    async fn test_no_matches_is_zero_results() {
        capture_logs();
        let client = reverse_geocode_with(Vec::new());
        let geocoder = Geocoder::new(client);

        let error = geocoder
            .geocode(GeocoderRequest::location(LatLng::new(0.0, 0.0)), None)
            .await
            .unwrap_err();

        assert_eq!(error.status, Status::ZeroResults);
        assert!(error_logs().is_empty());
    }

    /// A request with none of location, placeId or address is rejected
    /// without reaching the backend.
    #[tokio::test]
    async fn test_empty_request_is_invalid() {
        let client = reverse_geocode_with(Vec::new());
        let geocoder = Geocoder::new(client.clone());

        let error = geocoder.geocode(GeocoderRequest::default(), None).await.unwrap_err();

        assert_eq!(error.status, Status::InvalidRequest);
        assert_eq!(client.call_count(), 0);
    }

    /// Place ids go through GetPlace and carry the requested language.
    #[tokio::test]
    async fn test_geocode_by_place_id() {
        let client = ScriptedClient::new(|_| Ok(CommandOutput::GetPlace(austin_item("KEEP_AUSTIN_WEIRD"))));
        let geocoder = Geocoder::new(client.clone());

        let request = GeocoderRequest {
            language: Some("es".to_string()),
            ..GeocoderRequest::place_id("KEEP_AUSTIN_WEIRD")
        };
        let response = geocoder.geocode(request, None).await.unwrap();

        assert_eq!(response.results[0].place_id, "KEEP_AUSTIN_WEIRD");
        match &client.calls()[0] {
            Command::GetPlace(command) => {
                assert_eq!(command.place_id, "KEEP_AUSTIN_WEIRD");
                assert_eq!(command.language.as_deref(), Some("es"));
            }
            other => panic!("unexpected command {}", other.name()),
        }
    }

    /// Address queries are biased towards the centre of the given bounds.
    #[tokio::test]
    async fn test_geocode_address_bias() {
        let client = ScriptedClient::new(|_| {
            Ok(CommandOutput::Geocode(GeocodeResponse {
                result_items: Some(vec![austin_item("KEEP_AUSTIN_WEIRD")]),
            }))
        });
        let geocoder = Geocoder::new(client.clone());

        let request = GeocoderRequest {
            bounds: Some(LatLngBounds::new((30.0, -98.0), (31.0, -97.0)).unwrap()),
            ..GeocoderRequest::address("Congress Ave")
        };
        geocoder.geocode(request, None).await.unwrap();

        match &client.calls()[0] {
            Command::Geocode(command) => {
                assert_eq!(command.query_text, "Congress Ave");
                assert_eq!(command.bias_position, Some([-97.5, 30.5]));
            }
            other => panic!("unexpected command {}", other.name()),
        }
    }

    /// Text search prefers a location bias over a bounding-box filter.
    #[tokio::test]
    async fn test_text_search_bias_and_filter() {
        let client = ScriptedClient::new(|_| {
            Ok(CommandOutput::SearchText(SearchTextResponse {
                result_items: Some(vec![austin_item("KEEP_AUSTIN_WEIRD")]),
            }))
        });
        let places = PlacesService::new(client.clone());
        let bounds = LatLngBounds::new((30.0, -98.0), (31.0, -97.0)).unwrap();

        let results = places
            .text_search(
                TextSearchRequest {
                    query: "capitol".to_string(),
                    bounds: Some(bounds.clone()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(results[0].place_id.as_deref(), Some("KEEP_AUSTIN_WEIRD"));

        places
            .text_search(
                TextSearchRequest {
                    query: "capitol".to_string(),
                    location: Some(LatLng::new(30.5, -97.5)),
                    bounds: Some(bounds),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        let calls = client.calls();
        match (&calls[0], &calls[1]) {
            (Command::SearchText(filtered), Command::SearchText(biased)) => {
                assert_eq!(filtered.filter_bounding_box, Some([-98.0, 30.0, -97.0, 31.0]));
                assert_eq!(filtered.bias_position, None);
                assert_eq!(biased.bias_position, Some([-97.5, 30.5]));
                assert_eq!(biased.filter_bounding_box, None);
            }
            _ => panic!("expected two text searches"),
        }
    }

    /// Find-place and details both translate the backend item into a place.
    #[tokio::test]
    async fn test_find_place_and_details() {
        let client = ScriptedClient::new(|command| match command {
            Command::SearchText(_) => Ok(CommandOutput::SearchText(SearchTextResponse {
                result_items: Some(vec![austin_item("KEEP_AUSTIN_WEIRD")]),
            })),
            _ => Ok(CommandOutput::GetPlace(austin_item("KEEP_AUSTIN_WEIRD"))),
        });
        let places = PlacesService::new(client);

        let found = places
            .find_place_from_query(
                FindPlaceFromQueryRequest {
                    query: "Texas State Capitol".to_string(),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(found[0].name.as_deref(), Some("Texas State Capitol"));

        let details = places
            .get_details(
                PlaceDetailsRequest {
                    place_id: "KEEP_AUSTIN_WEIRD".to_string(),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(details.geometry.map(|g| g.location), Some(LatLng::new(30.268193, -97.7457518)));
    }
}
