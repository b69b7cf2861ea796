//! Domain data structures for bins, vans, workers, and waste records.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier for a physical bin, unique within one batch.
pub struct BinId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier for a collection vehicle, unique within one batch.
pub struct VehicleId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier for a field worker.
pub struct WorkerId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Destination for SMS notifications, e.g. `+15005550006`.
pub struct PhoneNumber(pub String);

impl fmt::Display for BinId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for BinId {
    fn from(value: &str) -> Self {
        BinId(value.to_owned())
    }
}

impl From<&str> for VehicleId {
    fn from(value: &str) -> Self {
        VehicleId(value.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Geographic position in degrees.
pub struct Coordinate {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl Coordinate {
    /// Construct a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{},{}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One sensor sample for a physical bin.
pub struct BinReading {
    /// Stable identifier of the bin.
    pub bin_id: BinId,
    /// Where the bin stands.
    pub location: Coordinate,
    /// Fill level, nominally within `0..=100`.
    pub fill_level_pct: f64,
    /// Temperature inside the bin in degrees Celsius.
    pub temperature_c: f64,
    /// Relative humidity inside the bin.
    pub humidity_pct: f64,
    /// Whether the bin reports an abnormal tilt.
    pub tilt: bool,
    /// Capture time of the sample.
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Bin reading annotated with its computed priority.
pub struct ScoredBin {
    /// The underlying sensor sample.
    pub reading: BinReading,
    /// Urgency score, higher means collect sooner.
    pub priority: f64,
}

impl ScoredBin {
    /// Shortcut to the bin identifier.
    #[must_use]
    pub fn bin_id(&self) -> &BinId {
        &self.reading.bin_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A collection vehicle eligible to receive bins.
pub struct Vehicle {
    /// Unique identifier of the van.
    pub vehicle_id: VehicleId,
    /// Current position.
    pub location: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Field worker that can receive task notifications.
pub struct Worker {
    /// Roster identifier.
    pub worker_id: WorkerId,
    /// Display name.
    pub name: String,
    /// Zone the worker covers.
    pub zone: String,
    /// Where task notifications are sent.
    pub phone: PhoneNumber,
    /// Van this worker drives, if any.
    pub vehicle: Option<VehicleId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Waste collected from one bin on one day.
pub struct DailyWaste {
    /// Bin the waste came from.
    pub bin_id: BinId,
    /// Collection day.
    pub date: NaiveDate,
    /// Collected mass in kilograms.
    pub waste_kg: f64,
    /// Carbon footprint of that waste in kilograms of CO2.
    pub carbon_kg: f64,
}
