// src/geo/mod.rs
//! Driving distance from the configured origin to a job's address

use anyhow::{Context, Result};
use tracing::{info, warn};

pub mod ors_client;
pub mod types;

pub use ors_client::OrsClient;
pub use types::{Coordinate, Route};

use crate::error::GeoError;

/// Stored and sent in place of a distance when the geo service fails
pub const DISTANCE_UNAVAILABLE: &str = "Distance: unavailable (geocoding service error)";

pub struct GeoEnricher {
    client: OrsClient,
    origin: Coordinate,
}

impl GeoEnricher {
    pub fn new(client: OrsClient, origin: Coordinate) -> Self {
        Self { client, origin }
    }

    /// Geocode the origin once; failing here is fatal for the run
    pub async fn resolve(client: OrsClient, origin_address: &str) -> Result<Self> {
        let origin = client
            .geocode(origin_address)
            .await
            .with_context(|| format!("Failed to geocode origin address '{}'", origin_address))?;
        info!(
            "Origin resolved: {} -> ({}, {})",
            origin_address, origin.lon, origin.lat
        );
        Ok(Self::new(client, origin))
    }

    /// Human readable distance summary, or `DISTANCE_UNAVAILABLE` on any geo failure
    pub async fn distance(&self, address: &str) -> String {
        match self.route_to(address).await {
            Ok(route) => format_route(&route),
            Err(e) => {
                warn!("Distance lookup failed for '{}': {}", address.replace('\n', ", "), e);
                DISTANCE_UNAVAILABLE.to_string()
            }
        }
    }

    pub async fn route_to(&self, address: &str) -> Result<Route, GeoError> {
        let destination = self.client.geocode(address).await?;
        let route = self.client.directions(self.origin, destination).await?;
        info!(
            "Route found: {:.0} m, {:.0} s",
            route.distance, route.duration
        );
        Ok(route)
    }
}

/// `Distance: {km} KM\nDuration: {h} hour[s] {m} minutes`
pub fn format_route(route: &Route) -> String {
    let km = route.distance / 1000.0;
    let total_minutes = (route.duration.max(0.0) / 60.0).floor() as u64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    format!(
        "Distance: {:?} KM\nDuration: {} hour{} {} minutes",
        km,
        hours,
        if hours > 1 { "s" } else { "" },
        minutes
    )
}
