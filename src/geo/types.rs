// src/geo/types.rs
use serde::{Deserialize, Serialize};

/// Longitude/latitude pair as openrouteservice expects it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn as_pair(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Driving route summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    /// meters
    pub distance: f64,
    /// seconds
    pub duration: f64,
}

// Wire formats (GeoJSON subsets)

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    #[serde(default)]
    pub features: Vec<PointFeature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PointFeature {
    pub geometry: PointGeometry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PointGeometry {
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DirectionsRequest {
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsResponse {
    #[serde(default)]
    pub features: Vec<RouteFeature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RouteFeature {
    pub properties: RouteProperties,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RouteProperties {
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Segment {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
}
