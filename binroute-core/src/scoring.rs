//! Priority scoring for bin readings.

use std::collections::HashSet;

use crate::error::DispatchError;
use crate::model::{BinReading, ScoredBin};

const FILL_WEIGHT: f64 = 2.0;
const TILT_WEIGHT: f64 = 3.0;
const TEMPERATURE_DIVISOR: f64 = 50.0;
const HUMIDITY_DIVISOR: f64 = 100.0;

/// Fixed linear urgency of a single reading.
///
/// Out-of-range sensor values are scored as they are.
#[must_use]
pub fn priority(reading: &BinReading) -> f64 {
    let tilt = f64::from(u8::from(reading.tilt));
    (reading.fill_level_pct / 100.0) * FILL_WEIGHT
        + tilt * TILT_WEIGHT
        + reading.temperature_c / TEMPERATURE_DIVISOR
        + reading.humidity_pct / HUMIDITY_DIVISOR
}

/// Score every bin and order the batch by descending priority.
///
/// The sort is stable, so bins with equal priority keep their input order.
///
/// # Errors
///
/// Returns [`DispatchError::MalformedInput`] when a numeric field is not finite and
/// [`DispatchError::DuplicateBin`] when two readings share an id. Nothing is scored
/// in either case.
pub fn score(bins: Vec<BinReading>) -> Result<Vec<ScoredBin>, DispatchError> {
    let mut seen = HashSet::with_capacity(bins.len());
    for reading in &bins {
        validate(reading)?;
        if !seen.insert(&reading.bin_id) {
            return Err(DispatchError::DuplicateBin(reading.bin_id.clone()));
        }
    }

    let mut scored: Vec<ScoredBin> = bins
        .into_iter()
        .map(|reading| ScoredBin {
            priority: priority(&reading),
            reading,
        })
        .collect();

    scored.sort_by(|left, right| right.priority.total_cmp(&left.priority));
    Ok(scored)
}

fn validate(reading: &BinReading) -> Result<(), DispatchError> {
    let fields = [
        ("latitude", reading.location.lat),
        ("longitude", reading.location.lon),
        ("fill_level_pct", reading.fill_level_pct),
        ("temperature_c", reading.temperature_c),
        ("humidity_pct", reading.humidity_pct),
    ];

    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some(&(field, _)) => Err(DispatchError::MalformedInput {
            bin_id: reading.bin_id.clone(),
            field,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{BinId, Coordinate};

    fn reading(id: &str, fill: f64, tilt: bool, temp: f64, humidity: f64) -> BinReading {
        BinReading {
            bin_id: BinId::from(id),
            location: Coordinate::new(28.6, 77.1),
            fill_level_pct: fill,
            temperature_c: temp,
            humidity_pct: humidity,
            tilt,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|date| date.and_hms_opt(8, 0, 0))
                .expect("valid timestamp"),
        }
    }

    fn ids(scored: &[ScoredBin]) -> Vec<&str> {
        scored.iter().map(|bin| bin.bin_id().0.as_str()).collect()
    }

    #[test]
    fn tilted_bin_outranks_fuller_bin() {
        let bins = vec![
            reading("B1", 80.0, false, 25.0, 50.0),
            reading("B2", 20.0, true, 25.0, 50.0),
        ];

        let scored = score(bins).expect("valid batch");

        assert_eq!(ids(&scored), ["B2", "B1"]);
        assert!((scored[0].priority - 4.4).abs() < 1e-9, "B2 scores 4.4");
        assert!((scored[1].priority - 2.6).abs() < 1e-9, "B1 scores 2.6");
    }

    #[test]
    fn equal_priorities_keep_input_order() {
        let bins = vec![
            reading("first", 50.0, false, 20.0, 40.0),
            reading("top", 100.0, true, 40.0, 80.0),
            reading("second", 50.0, false, 20.0, 40.0),
            reading("third", 50.0, false, 20.0, 40.0),
        ];

        let scored = score(bins).expect("valid batch");

        assert_eq!(ids(&scored), ["top", "first", "second", "third"]);
    }

    #[test]
    fn output_is_a_non_increasing_permutation() {
        let bins: Vec<BinReading> = (0_u32..25)
            .map(|idx| {
                let spread = f64::from(idx * 7 % 11);
                reading(
                    &format!("Bin-{idx}"),
                    spread * 9.0,
                    idx % 3 == 0,
                    20.0 + spread,
                    30.0 + spread * 4.0,
                )
            })
            .collect();
        let mut expected: Vec<String> = bins.iter().map(|bin| bin.bin_id.0.clone()).collect();

        let scored = score(bins).expect("valid batch");

        let mut actual: Vec<String> = scored.iter().map(|bin| bin.bin_id().0.clone()).collect();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);
        assert!(
            scored
                .windows(2)
                .all(|pair| pair[0].priority >= pair[1].priority),
            "priorities must not increase"
        );
    }

    #[test]
    fn priority_grows_with_each_signal() {
        let base = reading("B", 40.0, false, 25.0, 50.0);
        let base_priority = priority(&base);

        let fuller = BinReading {
            fill_level_pct: 90.0,
            ..base.clone()
        };
        let tilted = BinReading {
            tilt: true,
            ..base.clone()
        };
        let warmer = BinReading {
            temperature_c: 35.0,
            ..base.clone()
        };
        let damper = BinReading {
            humidity_pct: 75.0,
            ..base.clone()
        };

        for variant in [fuller, tilted, warmer, damper] {
            assert!(priority(&variant) >= base_priority, "{variant:?}");
        }
    }

    #[test]
    fn out_of_range_values_are_still_scored() {
        let scored = score(vec![reading("B", 150.0, false, -60.0, 0.0)]).expect("scored");
        assert!((scored[0].priority - (3.0 - 1.2)).abs() < 1e-9, "garbage in, garbage out");
    }

    #[test]
    fn empty_batch_scores_to_empty() {
        assert!(score(Vec::new()).expect("empty is fine").is_empty());
    }

    #[test]
    fn non_finite_field_is_rejected_with_bin_and_field() {
        let bins = vec![
            reading("ok", 10.0, false, 20.0, 30.0),
            reading("bad", 10.0, false, f64::NAN, 30.0),
        ];

        let err = score(bins).expect_err("NaN temperature");

        match err {
            DispatchError::MalformedInput { bin_id, field } => {
                assert_eq!(bin_id, BinId::from("bad"));
                assert_eq!(field, "temperature_c");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let bins = vec![
            reading("dup", 10.0, false, 20.0, 30.0),
            reading("dup", 90.0, true, 20.0, 30.0),
        ];

        assert!(matches!(
            score(bins),
            Err(DispatchError::DuplicateBin(id)) if id == BinId::from("dup")
        ));
    }
}
