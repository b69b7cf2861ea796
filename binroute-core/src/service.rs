//! High-level dispatch facade combining scoring, assignment, routing, and notices.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::assignment::{Assignment, NearestAssigner};
use crate::error::DispatchError;
use crate::model::{
    BinId, BinReading, Coordinate, PhoneNumber, ScoredBin, Vehicle, VehicleId, WorkerId,
};
use crate::ports::{DirectionsPort, NotifierPort};
use crate::roster::WorkerDirectory;
use crate::scoring::score;

/// Scored bins, the vans they were assigned to, and the mapping between them.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    bins: Vec<ScoredBin>,
    vehicles: Vec<Vehicle>,
    assignment: Assignment,
}

impl DispatchPlan {
    /// Bins in descending priority.
    #[must_use]
    pub fn bins(&self) -> &[ScoredBin] {
        &self.bins
    }

    /// Vans in input order.
    #[must_use]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Bin to van mapping.
    #[must_use]
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Look up a van of this plan.
    #[must_use]
    pub fn vehicle(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| &vehicle.vehicle_id == id)
    }

    /// Look up a bin of this plan.
    #[must_use]
    pub fn bin(&self, id: &BinId) -> Option<&ScoredBin> {
        self.bins.iter().find(|bin| bin.bin_id() == id)
    }

    /// Bins assigned to the van, highest priority first.
    pub fn assigned_bins<'plan>(
        &'plan self,
        vehicle: &'plan VehicleId,
    ) -> impl Iterator<Item = &'plan ScoredBin> + 'plan {
        self.bins
            .iter()
            .filter(move |bin| self.assignment.vehicle_for(bin.bin_id()) == Some(vehicle))
    }

    /// The van position followed by the positions of its bins.
    ///
    /// Returns just the van position when it has no bins.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownVehicle`] when the van is not in the plan.
    pub fn waypoints(&self, vehicle: &VehicleId) -> Result<Vec<Coordinate>, DispatchError> {
        let van = self
            .vehicle(vehicle)
            .ok_or_else(|| DispatchError::UnknownVehicle(vehicle.clone()))?;

        let mut waypoints = vec![van.location];
        waypoints.extend(self.assigned_bins(vehicle).map(|bin| bin.reading.location));
        Ok(waypoints)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Which vans to fetch routes for.
pub enum RouteSelection {
    /// Every van with at least one bin.
    All,
    /// One specific van.
    Vehicle(VehicleId),
}

#[derive(Debug, Clone, PartialEq)]
/// Result of asking the directions service for one van.
pub enum RouteOutcome {
    /// The service returned a path.
    Routed {
        /// Start location of every route step.
        path: Vec<Coordinate>,
    },
    /// The service failed; the plan itself is unaffected.
    Failed {
        /// Human-readable failure description.
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Route for a single van.
pub struct VehicleRoute {
    /// Van the route belongs to.
    pub vehicle_id: VehicleId,
    /// Van position followed by its bins.
    pub waypoints: Vec<Coordinate>,
    /// What the directions service answered.
    pub outcome: RouteOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Message that was handed to the notification service.
pub struct Notice {
    /// Recipient.
    pub worker_id: WorkerId,
    /// Destination number.
    pub phone: PhoneNumber,
    /// Message text.
    pub body: String,
}

/// Public entry point for planning collections and dispatching workers.
pub struct DispatchService {
    directions: Arc<dyn DirectionsPort>,
    notifier: Arc<dyn NotifierPort>,
    workers: WorkerDirectory,
    assigner: NearestAssigner,
}

impl DispatchService {
    /// Create a new service bound to the provided collaborators.
    #[must_use]
    pub fn new(
        directions: Arc<dyn DirectionsPort>,
        notifier: Arc<dyn NotifierPort>,
        workers: WorkerDirectory,
        assigner: NearestAssigner,
    ) -> Self {
        Self {
            directions,
            notifier,
            workers,
            assigner,
        }
    }

    /// Worker roster used for notifications.
    #[must_use]
    pub fn workers(&self) -> &WorkerDirectory {
        &self.workers
    }

    /// Score the bins and assign each one to its nearest van.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] when a record is malformed, ids collide, or there
    /// are no vans.
    pub fn plan(
        &self,
        bins: Vec<BinReading>,
        vehicles: Vec<Vehicle>,
    ) -> Result<DispatchPlan, DispatchError> {
        let scored = score(bins)?;
        let assignment = self.assigner.assign(&scored, &vehicles)?;

        info!(
            bins = scored.len(),
            vehicles = vehicles.len(),
            metric = ?self.assigner.metric(),
            "planned collection"
        );

        Ok(DispatchPlan {
            bins: scored,
            vehicles,
            assignment,
        })
    }

    /// Fetch driving routes for the selected vans.
    ///
    /// Vans without bins are skipped. A directions failure is reported in the
    /// van's [`RouteOutcome`] and does not stop the other vans.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownVehicle`] when a selected van is not in the plan.
    pub async fn routes(
        &self,
        plan: &DispatchPlan,
        selection: &RouteSelection,
    ) -> Result<Vec<VehicleRoute>, DispatchError> {
        let selected: Vec<&VehicleId> = match selection {
            RouteSelection::All => plan
                .vehicles
                .iter()
                .map(|vehicle| &vehicle.vehicle_id)
                .collect(),
            RouteSelection::Vehicle(id) => {
                if plan.vehicle(id).is_none() {
                    return Err(DispatchError::UnknownVehicle(id.clone()));
                }
                vec![id]
            }
        };

        let mut routes = Vec::with_capacity(selected.len());
        for vehicle_id in selected {
            let waypoints = plan.waypoints(vehicle_id)?;
            if waypoints.len() < 2 {
                debug!(vehicle = %vehicle_id, "no bins assigned, skipping route");
                continue;
            }

            let outcome = match self.directions.route(&waypoints).await {
                Ok(path) => RouteOutcome::Routed { path },
                Err(err) => {
                    warn!(vehicle = %vehicle_id, error = %err, "route lookup failed");
                    RouteOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            };

            routes.push(VehicleRoute {
                vehicle_id: vehicle_id.clone(),
                waypoints,
                outcome,
            });
        }

        Ok(routes)
    }

    /// Tell a worker to collect a bin of the plan.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownBin`] when the bin is not in the plan,
    /// [`DispatchError::UnknownWorker`] for an id not on the roster and
    /// [`DispatchError::Notification`] when the message cannot be sent.
    pub async fn notify_worker(
        &self,
        plan: &DispatchPlan,
        worker_id: WorkerId,
        bin_id: &BinId,
    ) -> Result<Notice, DispatchError> {
        if plan.bin(bin_id).is_none() {
            return Err(DispatchError::UnknownBin(bin_id.clone()));
        }
        let worker = self.workers.worker(worker_id)?;
        let body = task_message(bin_id);
        self.deliver(worker_id, &worker.phone, body).await
    }

    /// Send the driver of a van the list of bins assigned to it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownVehicle`] when the van is not in the plan,
    /// [`DispatchError::NoDriver`] when nobody drives it, and
    /// [`DispatchError::Notification`] when the message cannot be sent.
    pub async fn notify_driver(
        &self,
        plan: &DispatchPlan,
        vehicle_id: &VehicleId,
    ) -> Result<Notice, DispatchError> {
        if plan.vehicle(vehicle_id).is_none() {
            return Err(DispatchError::UnknownVehicle(vehicle_id.clone()));
        }
        let driver = self.workers.driver_of(vehicle_id)?;

        let bins: Vec<String> = plan
            .assigned_bins(vehicle_id)
            .map(|bin| bin.bin_id().to_string())
            .collect();
        let body = if bins.is_empty() {
            format!("No bins are assigned to {vehicle_id} right now.")
        } else {
            format!(
                "{vehicle_id} route: collect {} in this order.",
                bins.join(", ")
            )
        };

        self.deliver(driver.worker_id, &driver.phone, body).await
    }

    async fn deliver(
        &self,
        worker_id: WorkerId,
        phone: &PhoneNumber,
        body: String,
    ) -> Result<Notice, DispatchError> {
        self.notifier
            .send(phone, &body)
            .await
            .map_err(DispatchError::Notification)?;

        info!(worker = %worker_id, "notification sent");
        Ok(Notice {
            worker_id,
            phone: phone.clone(),
            body,
        })
    }
}

/// Text sent to a worker who was handed a bin.
#[must_use]
pub fn task_message(bin_id: &BinId) -> String {
    format!("Bin {bin_id} has been assigned to you. Please collect the waste promptly.")
}
