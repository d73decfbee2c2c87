// src/geo/ors_client.rs
use anyhow::{Context, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

use super::types::{
    Coordinate, DirectionsRequest, DirectionsResponse, GeocodeResponse, Route,
};
use crate::core::config_manager::GeoConfig;
use crate::error::GeoError;

const GEOCODE_ENDPOINT: &str = "/geocode/search";
const DIRECTIONS_ENDPOINT: &str = "/v2/directions/driving-car/geojson";

/// openrouteservice client: geocoding and driving directions
pub struct OrsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OrsClient {
    pub fn new(config: &GeoConfig, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// Resolve a free-text address to the best matching coordinate
    pub async fn geocode(&self, text: &str) -> Result<Coordinate, GeoError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, GEOCODE_ENDPOINT))
            .header("Authorization", &self.api_key)
            .query(&[("text", text), ("size", "1")])
            .send()
            .await?;

        let body: GeocodeResponse = Self::check(response).await?.json().await?;

        match body.features.first().map(|f| f.geometry.coordinates.as_slice()) {
            Some([lon, lat, ..]) => Ok(Coordinate {
                lon: *lon,
                lat: *lat,
            }),
            _ => Err(GeoError::NoMatch(text.to_string())),
        }
    }

    /// Driving route between two coordinates
    pub async fn directions(&self, from: Coordinate, to: Coordinate) -> Result<Route, GeoError> {
        let request = DirectionsRequest {
            coordinates: vec![from.as_pair(), to.as_pair()],
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, DIRECTIONS_ENDPOINT))
            .header("Authorization", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let body: DirectionsResponse = Self::check(response).await?.json().await?;

        body.features
            .first()
            .and_then(|feature| feature.properties.segments.first())
            .map(|segment| Route {
                distance: segment.distance,
                duration: segment.duration,
            })
            .ok_or(GeoError::NoRoute)
    }

    async fn check(response: Response) -> Result<Response, GeoError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|value| {
                let error = value.get("error")?;
                error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .or_else(|| error.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(text);

        debug!("openrouteservice error {}: {}", status, message);
        Err(GeoError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl std::fmt::Debug for OrsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> OrsClient {
        let config = GeoConfig {
            api_key: "test-key".to_string(),
            base_url: server.url(),
            origin_address: "Leeds".to_string(),
        };
        OrsClient::new(&config, 5).unwrap()
    }

    #[tokio::test]
    async fn test_geocode_first_feature() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/geocode/search")
            .match_header("authorization", "test-key")
            .match_query(Matcher::UrlEncoded("text".into(), "LS9 7TF".into()))
            .with_status(200)
            .with_body(
                r#"{"features":[
                    {"geometry":{"type":"Point","coordinates":[-1.52,53.80]}},
                    {"geometry":{"type":"Point","coordinates":[0.0,0.0]}}
                ]}"#,
            )
            .create_async()
            .await;

        let coord = client(&server).geocode("LS9 7TF").await.unwrap();
        assert_eq!(coord, Coordinate { lon: -1.52, lat: 53.80 });
    }

    #[tokio::test]
    async fn test_geocode_no_match() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/geocode/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"features":[]}"#)
            .create_async()
            .await;

        let err = client(&server).geocode("nowhere").await.unwrap_err();
        assert!(matches!(err, GeoError::NoMatch(ref t) if t == "nowhere"));
    }

    #[tokio::test]
    async fn test_directions_reads_first_segment() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v2/directions/driving-car/geojson")
            .match_body(Matcher::Json(serde_json::json!({
                "coordinates": [[-1.5, 53.8], [-1.0, 54.0]]
            })))
            .with_status(200)
            .with_body(
                r#"{"features":[{"properties":{"segments":[{"distance":41250.0,"duration":2730.5}],
                    "summary":{"distance":41250.0,"duration":2730.5}}}]}"#,
            )
            .create_async()
            .await;

        let route = client(&server)
            .directions(
                Coordinate { lon: -1.5, lat: 53.8 },
                Coordinate { lon: -1.0, lat: 54.0 },
            )
            .await
            .unwrap();
        assert_eq!(route.distance, 41250.0);
        assert_eq!(route.duration, 2730.5);
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v2/directions/driving-car/geojson")
            .with_status(404)
            .with_body(r#"{"error":{"code":2010,"message":"Could not find routable point"}}"#)
            .create_async()
            .await;

        let err = client(&server)
            .directions(
                Coordinate { lon: 0.0, lat: 0.0 },
                Coordinate { lon: 1.0, lat: 1.0 },
            )
            .await
            .unwrap_err();
        match err {
            GeoError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Could not find routable point");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
