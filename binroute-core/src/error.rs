//! Errors raised while scoring, assigning, and dispatching.

use crate::model::{BinId, VehicleId, WorkerId};
use crate::ports::PortError;

#[derive(thiserror::Error, Debug)]
/// Errors that abort a scoring, assignment, or dispatch call.
pub enum DispatchError {
    /// A bin carries a missing or non-numeric value in a required field.
    #[error("Malformed input: field `{field}` of bin {bin_id} is not a finite number")]
    MalformedInput {
        /// Offending bin.
        bin_id: BinId,
        /// Name of the invalid field.
        field: &'static str,
    },
    /// A vehicle carries a non-numeric coordinate.
    #[error("Malformed input: field `{field}` of vehicle {vehicle_id} is not a finite number")]
    MalformedVehicle {
        /// Offending vehicle.
        vehicle_id: VehicleId,
        /// Name of the invalid field.
        field: &'static str,
    },
    /// Assignment was requested without any vehicle.
    #[error("No vehicles available for assignment")]
    NoVehiclesAvailable,
    /// Two bins in the same batch share an identifier.
    #[error("Duplicate bin id: {0}")]
    DuplicateBin(BinId),
    /// Two vehicles in the same batch share an identifier.
    #[error("Duplicate vehicle id: {0}")]
    DuplicateVehicle(VehicleId),
    /// The requested vehicle is not part of the plan.
    #[error("Unknown vehicle: {0}")]
    UnknownVehicle(VehicleId),
    /// The requested bin is not part of the plan.
    #[error("Unknown bin: {0}")]
    UnknownBin(BinId),
    /// The requested worker is not in the directory.
    #[error("Unknown worker: {0}")]
    UnknownWorker(WorkerId),
    /// No worker is registered as driver of the vehicle.
    #[error("No driver registered for vehicle {0}")]
    NoDriver(VehicleId),
    /// The notification service rejected the message.
    #[error("Notification failed: {0}")]
    Notification(#[source] PortError),
}
