//! Waste and carbon footprint aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{BinId, DailyWaste};

/// Kilograms of CO2 emitted per tonne of collected waste.
pub const CO2_KG_PER_TONNE: f64 = 2.52;

/// Carbon footprint of the given waste mass, in kilograms of CO2.
#[must_use]
pub fn carbon_footprint_kg(waste_kg: f64) -> f64 {
    waste_kg * CO2_KG_PER_TONNE / 1000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Waste and carbon summed over all bins for one day.
pub struct DailyTotal {
    /// Day the totals cover.
    pub date: NaiveDate,
    /// Total collected waste in kilograms.
    pub waste_kg: f64,
    /// Total footprint in kilograms of CO2.
    pub carbon_kg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Key figures for a reporting period.
pub struct MonthlySummary {
    /// Waste over the whole period.
    pub total_waste_kg: f64,
    /// Footprint over the whole period.
    pub total_carbon_kg: f64,
    /// Day with the highest total waste.
    pub peak_day: NaiveDate,
}

/// Per-day totals ordered by date.
#[must_use]
pub fn daily_totals(records: &[DailyWaste]) -> Vec<DailyTotal> {
    let mut by_day: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for record in records {
        let entry = by_day.entry(record.date).or_insert((0.0, 0.0));
        entry.0 += record.waste_kg;
        entry.1 += record.carbon_kg;
    }

    by_day
        .into_iter()
        .map(|(date, (waste_kg, carbon_kg))| DailyTotal {
            date,
            waste_kg,
            carbon_kg,
        })
        .collect()
}

/// `(date, waste_kg)` points for one bin, ordered by date.
#[must_use]
pub fn per_bin_series(records: &[DailyWaste], bin_id: &BinId) -> Vec<(NaiveDate, f64)> {
    let mut series: Vec<(NaiveDate, f64)> = records
        .iter()
        .filter(|record| &record.bin_id == bin_id)
        .map(|record| (record.date, record.waste_kg))
        .collect();
    series.sort_by_key(|(date, _)| *date);
    series
}

/// Totals and the busiest day, or `None` when there are no records.
///
/// When several days share the highest total, the earliest one is reported.
#[must_use]
pub fn summarize(records: &[DailyWaste]) -> Option<MonthlySummary> {
    let totals = daily_totals(records);

    let mut peak: Option<&DailyTotal> = None;
    for day in &totals {
        if peak.is_none_or(|best| day.waste_kg > best.waste_kg) {
            peak = Some(day);
        }
    }

    let peak_day = peak?.date;
    Some(MonthlySummary {
        total_waste_kg: totals.iter().map(|day| day.waste_kg).sum(),
        total_carbon_kg: totals.iter().map(|day| day.carbon_kg).sum(),
        peak_day,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).expect("valid January date")
    }

    fn record(bin: &str, on: u32, waste_kg: f64) -> DailyWaste {
        DailyWaste {
            bin_id: BinId::from(bin),
            date: day(on),
            waste_kg,
            carbon_kg: carbon_footprint_kg(waste_kg),
        }
    }

    #[test]
    fn footprint_uses_fixed_factor() {
        assert!((carbon_footprint_kg(1000.0) - 2.52).abs() < 1e-12, "one tonne");
        assert!((carbon_footprint_kg(50.0) - 0.126).abs() < 1e-12, "fifty kilograms");
    }

    #[test]
    fn totals_group_by_day_in_order() {
        let records = [
            record("Bin-2", 2, 30.0),
            record("Bin-1", 1, 20.0),
            record("Bin-1", 2, 40.0),
        ];

        let totals = daily_totals(&records);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].date, day(1));
        assert!((totals[1].waste_kg - 70.0).abs() < 1e-9, "day two sums both bins");
        assert!(
            (totals[1].carbon_kg - carbon_footprint_kg(70.0)).abs() < 1e-12,
            "carbon sums too"
        );
    }

    #[test]
    fn summary_reports_totals_and_peak_day() {
        let records = [
            record("Bin-1", 1, 20.0),
            record("Bin-2", 1, 25.0),
            record("Bin-1", 2, 90.0),
            record("Bin-1", 3, 10.0),
        ];

        let summary = summarize(&records).expect("records present");

        assert!((summary.total_waste_kg - 145.0).abs() < 1e-9, "total waste");
        assert!(
            (summary.total_carbon_kg - carbon_footprint_kg(145.0)).abs() < 1e-9,
            "total carbon"
        );
        assert_eq!(summary.peak_day, day(2));
    }

    #[test]
    fn earliest_day_wins_peak_tie() {
        let records = [record("Bin-1", 5, 60.0), record("Bin-1", 4, 60.0)];

        assert_eq!(
            summarize(&records).map(|summary| summary.peak_day),
            Some(day(4))
        );
    }

    #[test]
    fn no_records_no_summary() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn series_filters_one_bin() {
        let records = [
            record("Bin-1", 3, 30.0),
            record("Bin-2", 1, 99.0),
            record("Bin-1", 1, 10.0),
        ];

        let series = per_bin_series(&records, &BinId::from("Bin-1"));

        assert_eq!(series, vec![(day(1), 10.0), (day(3), 30.0)]);
    }
}
