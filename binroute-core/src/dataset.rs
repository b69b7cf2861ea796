//! CSV import of bin readings, vans, and worker rosters.
//!
//! Rows are read into loosely typed records first and converted field by field, so a
//! missing or unreadable value is reported with its row and record id instead of
//! surfacing later as a bogus score.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::model::{
    BinId, BinReading, Coordinate, PhoneNumber, Vehicle, VehicleId, Worker, WorkerId,
};

/// Timestamp layout used in bin CSV files.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(thiserror::Error, Debug)]
/// Errors raised while importing CSV data.
pub enum DatasetError {
    /// The file could not be opened.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The CSV structure is broken.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// A required column is empty or absent.
    #[error("Row {row} ({id}): missing field `{field}`")]
    MissingField {
        /// 1-based data row.
        row: usize,
        /// Record identifier, or `?` when the id itself is missing.
        id: String,
        /// Column name.
        field: &'static str,
    },
    /// A column holds a value of the wrong shape.
    #[error("Row {row} ({id}): invalid value `{value}` for field `{field}`")]
    InvalidField {
        /// 1-based data row.
        row: usize,
        /// Record identifier.
        id: String,
        /// Column name.
        field: &'static str,
        /// Raw value as read.
        value: String,
    },
}

#[derive(Debug, Deserialize)]
struct BinRow {
    bin_id: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    fill_level_pct: Option<String>,
    temperature_c: Option<String>,
    humidity_pct: Option<String>,
    tilt: Option<String>,
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VehicleRow {
    vehicle_id: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkerRow {
    worker_id: Option<String>,
    name: Option<String>,
    zone: Option<String>,
    phone: Option<String>,
    #[serde(default)]
    vehicle_id: Option<String>,
}

/// Cursor over one row that turns raw cells into typed values.
struct Fields {
    row: usize,
    id: String,
}

impl Fields {
    fn required<'cell>(
        &self,
        field: &'static str,
        cell: Option<&'cell String>,
    ) -> Result<&'cell str, DatasetError> {
        cell.map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| DatasetError::MissingField {
                row: self.row,
                id: self.id.clone(),
                field,
            })
    }

    fn invalid(&self, field: &'static str, value: &str) -> DatasetError {
        DatasetError::InvalidField {
            row: self.row,
            id: self.id.clone(),
            field,
            value: value.to_owned(),
        }
    }

    fn number(&self, field: &'static str, cell: Option<&String>) -> Result<f64, DatasetError> {
        let raw = self.required(field, cell)?;
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| self.invalid(field, raw))
    }

    fn flag(&self, field: &'static str, cell: Option<&String>) -> Result<bool, DatasetError> {
        let raw = self.required(field, cell)?;
        match raw {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(self.invalid(field, other)),
        }
    }
}

fn id_of(row: usize, cell: Option<&String>, field: &'static str) -> Result<String, DatasetError> {
    Fields {
        row,
        id: "?".to_owned(),
    }
    .required(field, cell)
    .map(str::to_owned)
}

fn rows<R: Read, T: DeserializeOwned>(
    reader: R,
) -> impl Iterator<Item = (usize, csv::Result<T>)> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_deserialize::<T>()
        .enumerate()
        .map(|(idx, record)| (idx + 1, record))
}

/// Read bin readings with columns `bin_id, latitude, longitude, fill_level_pct,
/// temperature_c, humidity_pct, tilt, timestamp`.
///
/// # Errors
///
/// Returns a [`DatasetError`] for the first unreadable row.
pub fn read_bins<R: Read>(reader: R) -> Result<Vec<BinReading>, DatasetError> {
    let mut bins = Vec::new();
    for (row, record) in rows::<R, BinRow>(reader) {
        let record = record?;
        let id = id_of(row, record.bin_id.as_ref(), "bin_id")?;
        let fields = Fields { row, id };

        let raw_timestamp = fields.required("timestamp", record.timestamp.as_ref())?;
        let timestamp = NaiveDateTime::parse_from_str(raw_timestamp, TIMESTAMP_FORMAT)
            .map_err(|_err| fields.invalid("timestamp", raw_timestamp))?;

        bins.push(BinReading {
            location: Coordinate::new(
                fields.number("latitude", record.latitude.as_ref())?,
                fields.number("longitude", record.longitude.as_ref())?,
            ),
            fill_level_pct: fields.number("fill_level_pct", record.fill_level_pct.as_ref())?,
            temperature_c: fields.number("temperature_c", record.temperature_c.as_ref())?,
            humidity_pct: fields.number("humidity_pct", record.humidity_pct.as_ref())?,
            tilt: fields.flag("tilt", record.tilt.as_ref())?,
            timestamp,
            bin_id: BinId(fields.id),
        });
    }
    Ok(bins)
}

/// Read vans with columns `vehicle_id, latitude, longitude`.
///
/// # Errors
///
/// Returns a [`DatasetError`] for the first unreadable row.
pub fn read_vehicles<R: Read>(reader: R) -> Result<Vec<Vehicle>, DatasetError> {
    let mut vehicles = Vec::new();
    for (row, record) in rows::<R, VehicleRow>(reader) {
        let record = record?;
        let id = id_of(row, record.vehicle_id.as_ref(), "vehicle_id")?;
        let fields = Fields { row, id };

        vehicles.push(Vehicle {
            location: Coordinate::new(
                fields.number("latitude", record.latitude.as_ref())?,
                fields.number("longitude", record.longitude.as_ref())?,
            ),
            vehicle_id: VehicleId(fields.id),
        });
    }
    Ok(vehicles)
}

/// Read a roster with columns `worker_id, name, zone, phone` and an optional
/// `vehicle_id` naming the van the worker drives.
///
/// # Errors
///
/// Returns a [`DatasetError`] for the first unreadable row.
pub fn read_workers<R: Read>(reader: R) -> Result<Vec<Worker>, DatasetError> {
    let mut workers = Vec::new();
    for (row, record) in rows::<R, WorkerRow>(reader) {
        let record = record?;
        let id = id_of(row, record.worker_id.as_ref(), "worker_id")?;
        let fields = Fields { row, id };

        let worker_id = fields
            .id
            .parse::<u32>()
            .map_err(|_err| fields.invalid("worker_id", &fields.id))?;
        let vehicle = record
            .vehicle_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(VehicleId::from);

        workers.push(Worker {
            worker_id: WorkerId(worker_id),
            name: fields.required("name", record.name.as_ref())?.to_owned(),
            zone: fields.required("zone", record.zone.as_ref())?.to_owned(),
            phone: PhoneNumber(fields.required("phone", record.phone.as_ref())?.to_owned()),
            vehicle,
        });
    }
    Ok(workers)
}

/// Open a file and read bins from it.
///
/// # Errors
///
/// Returns a [`DatasetError`] when the file cannot be opened or parsed.
pub fn bins_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<BinReading>, DatasetError> {
    read_bins(File::open(path)?)
}

/// Open a file and read vans from it.
///
/// # Errors
///
/// Returns a [`DatasetError`] when the file cannot be opened or parsed.
pub fn vehicles_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Vehicle>, DatasetError> {
    read_vehicles(File::open(path)?)
}

/// Open a file and read a worker roster from it.
///
/// # Errors
///
/// Returns a [`DatasetError`] when the file cannot be opened or parsed.
pub fn workers_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Worker>, DatasetError> {
    read_workers(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINS: &str = "\
bin_id,latitude,longitude,fill_level_pct,temperature_c,humidity_pct,tilt,timestamp
Bin-1, 28.61, 77.11, 80, 25.5, 50, 0, 2024-01-01 08:00:00
Bin-2,28.70,77.30,20,31,64.2,1,2024-01-01 08:05:00
";

    #[test]
    fn reads_bins_with_trimmed_cells() {
        let bins = read_bins(BINS.as_bytes()).expect("valid csv");

        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].bin_id, BinId::from("Bin-1"));
        assert_eq!(bins[0].location, Coordinate::new(28.61, 77.11));
        assert!(!bins[0].tilt);
        assert!(bins[1].tilt);
        assert!((bins[1].humidity_pct - 64.2).abs() < 1e-9, "humidity parsed");
    }

    #[test]
    fn missing_number_names_row_bin_and_field() {
        let csv = "\
bin_id,latitude,longitude,fill_level_pct,temperature_c,humidity_pct,tilt,timestamp
Bin-1,28.61,77.11,80,25,50,0,2024-01-01 08:00:00
Bin-2,28.70,77.30,,31,64,1,2024-01-01 08:05:00
";

        let err = read_bins(csv.as_bytes()).expect_err("fill level missing");

        match err {
            DatasetError::MissingField { row, id, field } => {
                assert_eq!(row, 2);
                assert_eq!(id, "Bin-2");
                assert_eq!(field, "fill_level_pct");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_and_bad_tilt_are_invalid() {
        let text = "\
bin_id,latitude,longitude,fill_level_pct,temperature_c,humidity_pct,tilt,timestamp
Bin-1,north,77.11,80,25,50,0,2024-01-01 08:00:00
";
        let tilt = "\
bin_id,latitude,longitude,fill_level_pct,temperature_c,humidity_pct,tilt,timestamp
Bin-1,28.6,77.11,80,25,50,2,2024-01-01 08:00:00
";

        assert!(matches!(
            read_bins(text.as_bytes()),
            Err(DatasetError::InvalidField { field: "latitude", .. })
        ));
        assert!(matches!(
            read_bins(tilt.as_bytes()),
            Err(DatasetError::InvalidField { field: "tilt", .. })
        ));
    }

    #[test]
    fn reads_vehicles() {
        let csv = "vehicle_id,latitude,longitude\nVan-1,28.6,77.1\nVan-2,29.0,78.0\n";

        let vans = read_vehicles(csv.as_bytes()).expect("valid csv");

        assert_eq!(vans.len(), 2);
        assert_eq!(vans[1].vehicle_id, VehicleId::from("Van-2"));
        assert_eq!(vans[1].location, Coordinate::new(29.0, 78.0));
    }

    #[test]
    fn missing_vehicle_id_is_reported() {
        let csv = "vehicle_id,latitude,longitude\n,28.6,77.1\n";

        assert!(matches!(
            read_vehicles(csv.as_bytes()),
            Err(DatasetError::MissingField { row: 1, field: "vehicle_id", .. })
        ));
    }

    #[test]
    fn reads_workers_with_optional_van() {
        let csv = "\
worker_id,name,zone,phone,vehicle_id
101,Rajesh,North,+15005550001,Van-1
102,Amit,South,+15005550002,
";

        let workers = read_workers(csv.as_bytes()).expect("valid csv");

        assert_eq!(workers.len(), 2);
        assert_eq!(workers[0].worker_id, WorkerId(101));
        assert_eq!(workers[0].vehicle, Some(VehicleId::from("Van-1")));
        assert_eq!(workers[1].vehicle, None);
    }

    #[test]
    fn roster_without_van_column_is_accepted() {
        let csv = "worker_id,name,zone,phone\n7,Asha,East,+15005550007\n";

        let workers = read_workers(csv.as_bytes()).expect("valid csv");

        assert_eq!(workers[0].phone, PhoneNumber("+15005550007".to_owned()));
        assert!(workers[0].vehicle.is_none());
    }
}
