//! Directory of field workers and the vans they drive.

use std::collections::HashMap;

use crate::error::DispatchError;
use crate::model::{PhoneNumber, VehicleId, Worker, WorkerId};

/// Directory that resolves workers by id or by the van they drive.
#[derive(Debug, Clone, Default)]
pub struct WorkerDirectory {
    workers: Vec<Worker>,
    by_id: HashMap<WorkerId, usize>,
}

impl WorkerDirectory {
    /// Build a directory from the provided roster.
    ///
    /// A later entry with a repeated id replaces the earlier one.
    #[must_use]
    pub fn new(workers: Vec<Worker>) -> Self {
        let mut deduped: Vec<Worker> = Vec::with_capacity(workers.len());
        let mut by_id = HashMap::with_capacity(workers.len());
        for worker in workers {
            match by_id.get(&worker.worker_id) {
                Some(&slot) => {
                    if let Some(existing) = deduped.get_mut(slot) {
                        *existing = worker;
                    }
                }
                None => {
                    by_id.insert(worker.worker_id, deduped.len());
                    deduped.push(worker);
                }
            }
        }
        Self {
            workers: deduped,
            by_id,
        }
    }

    /// Demo roster: four workers, one per zone, each driving one of the demo vans.
    #[must_use]
    pub fn demo() -> Self {
        let roster = [
            (101, "Rajesh", "North", "+15005550001", "Van-1"),
            (102, "Amit", "South", "+15005550002", "Van-2"),
            (103, "Pooja", "East", "+15005550003", "Van-3"),
            (104, "Suresh", "West", "+15005550004", "Van-4"),
        ];
        Self::new(
            roster
                .into_iter()
                .map(|(id, name, zone, phone, van)| Worker {
                    worker_id: WorkerId(id),
                    name: name.to_owned(),
                    zone: zone.to_owned(),
                    phone: PhoneNumber(phone.to_owned()),
                    vehicle: Some(VehicleId::from(van)),
                })
                .collect(),
        )
    }

    /// All workers in roster order.
    #[must_use]
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Look up a worker by id.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownWorker`] when the id is not on the roster.
    pub fn worker(&self, id: WorkerId) -> Result<&Worker, DispatchError> {
        self.by_id
            .get(&id)
            .and_then(|&slot| self.workers.get(slot))
            .ok_or(DispatchError::UnknownWorker(id))
    }

    /// First worker on the roster driving the given van.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NoDriver`] when nobody drives the van.
    pub fn driver_of(&self, vehicle: &VehicleId) -> Result<&Worker, DispatchError> {
        self.workers
            .iter()
            .find(|worker| worker.vehicle.as_ref() == Some(vehicle))
            .ok_or_else(|| DispatchError::NoDriver(vehicle.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_workers_and_drivers() {
        let directory = WorkerDirectory::demo();

        assert_eq!(directory.workers().len(), 4);
        assert_eq!(
            directory.worker(WorkerId(103)).expect("known").name,
            "Pooja"
        );
        assert_eq!(
            directory
                .driver_of(&VehicleId::from("Van-2"))
                .expect("has driver")
                .worker_id,
            WorkerId(102)
        );
    }

    #[test]
    fn unknown_lookups_fail() {
        let directory = WorkerDirectory::demo();

        assert!(matches!(
            directory.worker(WorkerId(7)),
            Err(DispatchError::UnknownWorker(WorkerId(7)))
        ));
        assert!(matches!(
            directory.driver_of(&VehicleId::from("Van-9")),
            Err(DispatchError::NoDriver(_))
        ));
    }

    #[test]
    fn repeated_id_replaces_entry() {
        let worker = |phone: &str| Worker {
            worker_id: WorkerId(1),
            name: "Asha".to_owned(),
            zone: "North".to_owned(),
            phone: PhoneNumber(phone.to_owned()),
            vehicle: None,
        };

        let directory = WorkerDirectory::new(vec![worker("+1"), worker("+2")]);

        assert_eq!(directory.workers().len(), 1);
        assert_eq!(
            directory.worker(WorkerId(1)).expect("known").phone,
            PhoneNumber("+2".to_owned())
        );
    }
}
