//! Integration tests for the Overpass POI client against a mock server.
//!
//! Verifies the query shape sent upstream, the node → Restaurant mapping,
//! and that provider failures degrade to an empty result set instead of
//! propagating.

use serde_json::json;
use wiremock::matchers::{method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

use platefinder::poi::overpass::OverpassClient;

fn sample_elements() -> serde_json::Value {
    json!({
        "elements": [
            {
                "type": "node",
                "id": 419367357,
                "lat": 40.7167899,
                "lon": -73.9996711,
                "tags": {
                    "name": "Nha Trang One",
                    "cuisine": "vietnamese",
                    "phone": "+1-212-233-5948",
                    "addr:housenumber": "87",
                    "addr:street": "Baxter Street",
                    "addr:city": "New York"
                }
            },
            // Ways carry no coordinates and must be dropped.
            { "type": "way", "id": 1, "tags": { "name": "Ignored Way" } },
            // Unnamed nodes must be dropped.
            { "type": "node", "id": 2, "lat": 40.0, "lon": -73.0, "tags": {} }
        ]
    })
}

#[tokio::test]
async fn test_maps_overpass_nodes_to_restaurants() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_elements()))
        .mount(&server)
        .await;

    let client = OverpassClient::new(&format!("{}/api/interpreter", server.uri()));
    let results = client.find_nearby(40.7128, -74.0060, 1000).await;

    assert_eq!(results.len(), 1);
    let r = &results[0];
    assert_eq!(r.id, "419367357");
    assert_eq!(r.name, "Nha Trang One");
    assert_eq!(r.cuisine.as_deref(), Some("vietnamese"));
    assert_eq!(r.address.as_deref(), Some("87 Baxter Street, New York"));
}

#[tokio::test]
async fn test_query_carries_radius_and_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/interpreter"))
        .and(query_param_contains("data", "around:500,40.7128,-74.006"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "elements": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OverpassClient::new(&format!("{}/api/interpreter", server.uri()));
    let results = client.find_nearby(40.7128, -74.0060, 500).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_upstream_error_degrades_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = OverpassClient::new(&format!("{}/api/interpreter", server.uri()));
    let results = client.find_nearby(40.7128, -74.0060, 1000).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_malformed_payload_degrades_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = OverpassClient::new(&format!("{}/api/interpreter", server.uri()));
    let results = client.find_nearby(40.7128, -74.0060, 1000).await;
    assert!(results.is_empty());
}
