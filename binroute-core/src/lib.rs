//! Core types and service wiring for the binroute waste collection dispatcher.

/// Monthly waste and carbon footprint analytics.
pub mod analytics;
/// Nearest-van assignment of bins.
pub mod assignment;
/// CSV import of bins, vans, and worker rosters.
pub mod dataset;
/// Error types for scoring, assignment, and dispatch.
pub mod error;
/// Domain models and identifiers shared by all crates.
pub mod model;
/// Traits describing the external directions and notification services.
pub mod ports;
/// Field worker directory used to resolve notification targets.
pub mod roster;
/// Priority scoring of bin readings.
pub mod scoring;
/// High-level dispatch facade used by clients.
pub mod service;
/// Deterministic synthetic data for demos.
pub mod simulate;

pub use assignment::*;
pub use error::*;
pub use model::*;
pub use ports::*;
pub use roster::*;
pub use scoring::*;
pub use service::*;
