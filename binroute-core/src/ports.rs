//! Traits describing the external services and shared error types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{Coordinate, PhoneNumber};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to external services.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The service answered with a non-success status.
    #[error("Provider error: {0}")]
    Provider(String),
    /// The service answered without any usable content.
    #[error("Empty response from provider")]
    EmptyResponse,
    /// A route needs at least an origin and a destination.
    #[error("Route needs at least two waypoints, got {0}")]
    TooFewWaypoints(usize),
    /// Credentials for the service are missing.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Trait for driving-directions backends.
pub trait DirectionsPort: Send + Sync {
    /// Fetch a driving route through the waypoints.
    ///
    /// The first waypoint is the origin, the last the destination, anything in between
    /// an intermediate stop. The result is the start location of every route step.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails or no route is found.
    async fn route(&self, waypoints: &[Coordinate]) -> Result<Vec<Coordinate>, PortError>;
}

#[async_trait]
/// Trait for text message backends.
pub trait NotifierPort: Send + Sync {
    /// Send a message. Delivery is not confirmed.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider rejects the message.
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<(), PortError>;
}

/// Stand-in for a service whose credentials are missing.
///
/// Every call fails with [`PortError::NotConfigured`].
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured {
    service: &'static str,
}

impl Unconfigured {
    /// Name the missing service in error messages.
    #[must_use]
    pub const fn new(service: &'static str) -> Self {
        Self { service }
    }
}

#[async_trait]
impl DirectionsPort for Unconfigured {
    async fn route(&self, _waypoints: &[Coordinate]) -> Result<Vec<Coordinate>, PortError> {
        Err(PortError::NotConfigured(self.service))
    }
}

#[async_trait]
impl NotifierPort for Unconfigured {
    async fn send(&self, _to: &PhoneNumber, _body: &str) -> Result<(), PortError> {
        Err(PortError::NotConfigured(self.service))
    }
}
