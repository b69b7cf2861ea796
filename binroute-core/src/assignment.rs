//! Nearest-van assignment.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::model::{BinId, Coordinate, ScoredBin, Vehicle, VehicleId};

/// Mean earth radius used by [`DistanceMetric::Haversine`].
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// How the distance between a bin and a van is measured.
pub enum DistanceMetric {
    /// Straight line on raw degree coordinates.
    #[default]
    Planar,
    /// Great-circle distance in kilometres.
    Haversine,
}

impl DistanceMetric {
    /// Distance between two points under this metric.
    #[must_use]
    pub fn distance(self, from: Coordinate, to: Coordinate) -> f64 {
        match self {
            DistanceMetric::Planar => planar_distance(from, to),
            DistanceMetric::Haversine => haversine_km(from, to),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "planar" | "euclidean" => Ok(Self::Planar),
            "haversine" | "geodesic" => Ok(Self::Haversine),
            other => Err(format!("unknown distance metric `{other}`")),
        }
    }
}

/// `sqrt(dlat^2 + dlon^2)` in degrees.
#[must_use]
pub fn planar_distance(from: Coordinate, to: Coordinate) -> f64 {
    (from.lat - to.lat).hypot(from.lon - to.lon)
}

/// Great-circle distance in kilometres.
#[must_use]
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat_from = from.lat.to_radians();
    let lat_to = to.lat.to_radians();
    let half_dlat = ((to.lat - from.lat).to_radians() / 2.0).sin();
    let half_dlon = ((to.lon - from.lon).to_radians() / 2.0).sin();

    let hav = half_dlat * half_dlat + lat_from.cos() * lat_to.cos() * half_dlon * half_dlon;
    2.0 * EARTH_RADIUS_KM * hav.sqrt().asin()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Bin to vehicle mapping produced by [`NearestAssigner::assign`].
pub struct Assignment {
    vehicles: HashMap<BinId, VehicleId>,
}

impl Assignment {
    /// Vehicle responsible for the bin.
    #[must_use]
    pub fn vehicle_for(&self, bin: &BinId) -> Option<&VehicleId> {
        self.vehicles.get(bin)
    }

    /// Number of assigned bins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// True when no bin was assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Iterator over `(bin, vehicle)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&BinId, &VehicleId)> {
        self.vehicles.iter()
    }

    /// How many bins each vehicle received.
    #[must_use]
    pub fn load(&self) -> HashMap<&VehicleId, usize> {
        let mut load = HashMap::new();
        for vehicle in self.vehicles.values() {
            *load.entry(vehicle).or_insert(0) += 1;
        }
        load
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Assigns every bin to the closest vehicle.
pub struct NearestAssigner {
    metric: DistanceMetric,
}

impl NearestAssigner {
    /// Build an assigner using the given distance metric.
    #[must_use]
    pub const fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }

    /// Metric used to compare vehicles.
    #[must_use]
    pub const fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Map each bin to its nearest vehicle.
    ///
    /// Vehicles are scanned in order and only a strictly shorter distance replaces the
    /// current choice, so the earlier vehicle wins a tie. Vehicles carry no capacity.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NoVehiclesAvailable`] for an empty vehicle list,
    /// [`DispatchError::MalformedVehicle`] or [`DispatchError::MalformedInput`] for
    /// non-finite coordinates, and [`DispatchError::DuplicateVehicle`] or
    /// [`DispatchError::DuplicateBin`] when ids collide.
    pub fn assign(
        &self,
        bins: &[ScoredBin],
        vehicles: &[Vehicle],
    ) -> Result<Assignment, DispatchError> {
        validate_vehicles(vehicles)?;
        validate_bins(bins)?;

        let mut assignment = Assignment {
            vehicles: HashMap::with_capacity(bins.len()),
        };

        for bin in bins {
            let location = bin.reading.location;
            let mut nearest: Option<(&Vehicle, f64)> = None;

            for vehicle in vehicles {
                let distance = self.metric.distance(location, vehicle.location);
                let closer = nearest.is_none_or(|(_, best)| distance < best);
                if closer {
                    nearest = Some((vehicle, distance));
                }
            }

            let (vehicle, _) = nearest.ok_or(DispatchError::NoVehiclesAvailable)?;
            assignment
                .vehicles
                .insert(bin.bin_id().clone(), vehicle.vehicle_id.clone());
        }

        Ok(assignment)
    }
}

fn validate_bins(bins: &[ScoredBin]) -> Result<(), DispatchError> {
    let mut seen = HashSet::with_capacity(bins.len());
    for bin in bins {
        let location = bin.reading.location;
        for (field, value) in [("latitude", location.lat), ("longitude", location.lon)] {
            if !value.is_finite() {
                return Err(DispatchError::MalformedInput {
                    bin_id: bin.bin_id().clone(),
                    field,
                });
            }
        }
        if !seen.insert(bin.bin_id()) {
            return Err(DispatchError::DuplicateBin(bin.bin_id().clone()));
        }
    }
    Ok(())
}

fn validate_vehicles(vehicles: &[Vehicle]) -> Result<(), DispatchError> {
    if vehicles.is_empty() {
        return Err(DispatchError::NoVehiclesAvailable);
    }

    let mut seen = HashSet::with_capacity(vehicles.len());
    for vehicle in vehicles {
        if !vehicle.location.lat.is_finite() {
            return Err(DispatchError::MalformedVehicle {
                vehicle_id: vehicle.vehicle_id.clone(),
                field: "latitude",
            });
        }
        if !vehicle.location.lon.is_finite() {
            return Err(DispatchError::MalformedVehicle {
                vehicle_id: vehicle.vehicle_id.clone(),
                field: "longitude",
            });
        }
        if !seen.insert(&vehicle.vehicle_id) {
            return Err(DispatchError::DuplicateVehicle(vehicle.vehicle_id.clone()));
        }
    }
    Ok(())
}
