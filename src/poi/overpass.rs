//! HTTP client for the OpenStreetMap Overpass API.
//! Uses reqwest-middleware for retries; the provider is treated as
//! unreliable and any failure degrades to an empty result set.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use std::time::Duration;

use crate::models::restaurant::{OsmElement, Restaurant};

pub const DEFAULT_RADIUS_M: u32 = 1000;

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OsmElement>,
}

#[derive(Clone)]
pub struct OverpassClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl OverpassClient {
    pub fn new(base_url: &str) -> Self {
        let reqwest_client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build HTTP client");

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(2);
        let client = ClientBuilder::new(reqwest_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// Restaurants within `radius_m` of the coordinates. Fetch or parse
    /// errors yield an empty list — the provider must never take the
    /// endpoint down with it.
    pub async fn find_nearby(&self, lat: f64, lon: f64, radius_m: u32) -> Vec<Restaurant> {
        match self.fetch(lat, lon, radius_m).await {
            Ok(restaurants) => restaurants,
            Err(e) => {
                tracing::warn!("Overpass fetch failed, returning empty set: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch(&self, lat: f64, lon: f64, radius_m: u32) -> anyhow::Result<Vec<Restaurant>> {
        let query = build_query(lat, lon, radius_m);

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("data", query.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: OverpassResponse = resp.json().await?;
        Ok(body
            .elements
            .iter()
            .filter_map(Restaurant::from_node)
            .collect())
    }
}

/// Overpass QL query for restaurant nodes/ways/relations around a point.
/// Only nodes survive the mapping; ways and relations lack coordinates.
fn build_query(lat: f64, lon: f64, radius_m: u32) -> String {
    format!(
        r#"[out:json][timeout:25];
(
  node["amenity"="restaurant"](around:{radius},{lat},{lon});
  way["amenity"="restaurant"](around:{radius},{lat},{lon});
  relation["amenity"="restaurant"](around:{radius},{lat},{lon});
);
out body;
>;
out skel qt;"#,
        radius = radius_m,
        lat = lat,
        lon = lon,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_contains_coordinates_and_radius() {
        let q = build_query(40.7128, -74.0060, 500);
        assert!(q.contains("around:500,40.7128,-74.006"));
        assert!(q.contains(r#"node["amenity"="restaurant"]"#));
        assert!(q.starts_with("[out:json]"));
    }
}
