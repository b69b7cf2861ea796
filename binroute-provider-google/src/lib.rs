//! Directions provider for binroute using the Google Directions API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use binroute_core::{
    model::Coordinate,
    ports::{DirectionsPort, PortError},
};

const BASE_URL: &str = "https://maps.googleapis.com";
const STATUS_OK: &str = "OK";

/// Response from /maps/api/directions/json
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    start_location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Driving directions backed by Google.
pub struct GoogleDirectionsPort {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleDirectionsPort {
    /// Create a new port bound to the given HTTP client and API key.
    #[must_use]
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_owned(),
        }
    }

    /// Point the port at a different host, e.g. a local proxy.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl DirectionsPort for GoogleDirectionsPort {
    async fn route(&self, waypoints: &[Coordinate]) -> Result<Vec<Coordinate>, PortError> {
        let query = route_query(waypoints)?;
        debug!(stops = waypoints.len(), "requesting driving directions");

        let mut params: Vec<(&str, &str)> = query
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        params.push(("key", self.api_key.as_str()));

        let req = self
            .client
            .get(format!("{}/maps/api/directions/json", self.base_url))
            .query(&params);

        let response = fetch_json::<DirectionsResponse>(req).await?;
        route_steps(response)
    }
}

/// Build the directions port wrapped for the dispatch service.
#[must_use]
pub fn port(client: Client, api_key: impl Into<String>) -> Arc<dyn DirectionsPort> {
    Arc::new(GoogleDirectionsPort::new(client, api_key))
}

/// Origin, destination, optional intermediate stops, and travel mode.
fn route_query(waypoints: &[Coordinate]) -> Result<Vec<(&'static str, String)>, PortError> {
    let [origin, stops @ .., destination] = waypoints else {
        return Err(PortError::TooFewWaypoints(waypoints.len()));
    };

    let mut query = vec![
        ("origin", origin.to_string()),
        ("destination", destination.to_string()),
        ("mode", "driving".to_owned()),
    ];
    if !stops.is_empty() {
        let joined = stops
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("|");
        query.push(("waypoints", joined));
    }
    Ok(query)
}

/// Start location of every step of every leg of the first route.
fn route_steps(response: DirectionsResponse) -> Result<Vec<Coordinate>, PortError> {
    if response.status != STATUS_OK {
        let detail = match response.error_message {
            Some(message) => format!("{}: {message}", response.status),
            None => response.status,
        };
        return Err(PortError::Provider(detail));
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(PortError::EmptyResponse)?;

    Ok(route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| Coordinate::new(step.start_location.lat, step.start_location.lng))
        .collect())
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}
