//! Interval-series reshaping for inbound short-term forecasts.
//!
//! The workforce-management service returns contact volume and average
//! handle time as flat arrays of 15-minute intervals anchored to the
//! data's own first day. Downstream forecast logic consumes Sunday-anchored
//! day buckets, so the series are chunked per day, enriched with a derived
//! total-handle-time series, and rotated to the canonical week boundary.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of 15-minute intervals in one day.
pub const INTERVALS_PER_DAY: usize = 96;

/// Number of days in the canonical forecast week.
pub const DAYS_PER_WEEK: usize = 7;

/// Number of 15-minute intervals in the canonical 7-day week.
pub const INTERVALS_PER_WEEK: usize = DAYS_PER_WEEK * INTERVALS_PER_DAY;

// ---------------------------------------------------------------------------
// Canonical series
// ---------------------------------------------------------------------------

/// Per-planning-group forecast series in the canonical day-bucket schema.
///
/// Each field holds [`DAYS_PER_WEEK`] buckets of [`INTERVALS_PER_DAY`]
/// values. Day index 0 is Sunday regardless of which weekday the requested
/// week starts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalForecastSeries {
    /// Offered contact volume per interval.
    pub n_contacts: Vec<Vec<f64>>,

    /// Total handle-time contribution per interval, derived as
    /// `offered * average handle time`. Not an independent measurement.
    pub t_handle: Vec<Vec<f64>>,

    /// Handled contact volume per interval. Inbound data carries no
    /// independent handled count, so this duplicates `n_contacts`;
    /// downstream modification logic divides by it and a 1.0 ratio is the
    /// deliberate stand-in.
    pub n_handled: Vec<Vec<f64>>,
}

// ---------------------------------------------------------------------------
// Reshaping
// ---------------------------------------------------------------------------

/// Number of positions the day buckets rotate so that bucket 0 lands on
/// Sunday.
///
/// Weekday numbering is 0 = Sunday .. 6 = Saturday, so a Sunday week start
/// needs no rotation and a Monday week start rotates by six.
pub fn rotate_by(week_start: NaiveDate) -> usize {
    let weekday = week_start.weekday().num_days_from_sunday() as usize;
    (DAYS_PER_WEEK - weekday) % DAYS_PER_WEEK
}

/// Reshape flat offered/handle-time interval arrays into the canonical
/// Sunday-anchored day-bucket schema.
///
/// Both inputs must be exactly [`INTERVALS_PER_WEEK`] entries long and of
/// equal length. Anything else returns [`CoreError::ShapeMismatch`]; a
/// partial or untrimmed week is never silently truncated.
pub fn reshape(
    offered: &[f64],
    aht: &[f64],
    week_start: NaiveDate,
) -> Result<CanonicalForecastSeries, CoreError> {
    if offered.len() != INTERVALS_PER_WEEK {
        return Err(CoreError::ShapeMismatch {
            expected: INTERVALS_PER_WEEK,
            actual: offered.len(),
        });
    }
    if aht.len() != offered.len() {
        return Err(CoreError::ShapeMismatch {
            expected: offered.len(),
            actual: aht.len(),
        });
    }

    let mut n_contacts: Vec<Vec<f64>> = Vec::with_capacity(DAYS_PER_WEEK);
    let mut t_handle: Vec<Vec<f64>> = Vec::with_capacity(DAYS_PER_WEEK);

    for day in 0..DAYS_PER_WEEK {
        let start = day * INTERVALS_PER_DAY;
        let chunk_offered = &offered[start..start + INTERVALS_PER_DAY];
        let chunk_aht = &aht[start..start + INTERVALS_PER_DAY];
        let chunk_tht: Vec<f64> = chunk_offered
            .iter()
            .zip(chunk_aht)
            .map(|(o, a)| o * a)
            .collect();

        n_contacts.push(chunk_offered.to_vec());
        t_handle.push(chunk_tht);
    }

    // The source buckets are anchored to the data's native week start while
    // the canonical schema is anchored to Sunday. Offered and the derived
    // handle-time rotate together so the per-interval pairing stays intact.
    let shift = rotate_by(week_start);
    n_contacts.rotate_left(shift);
    t_handle.rotate_left(shift);

    let n_handled = n_contacts.clone();

    Ok(CanonicalForecastSeries {
        n_contacts,
        t_handle,
        n_handled,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a flat week where every interval of day `d` holds `base + d`.
    fn week_of_day_values(base: f64) -> Vec<f64> {
        (0..INTERVALS_PER_WEEK)
            .map(|i| base + (i / INTERVALS_PER_DAY) as f64)
            .collect()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()
    }

    // -- rotate_by -----------------------------------------------------------

    #[test]
    fn sunday_week_start_needs_no_rotation() {
        assert_eq!(rotate_by(sunday()), 0);
    }

    #[test]
    fn monday_week_start_rotates_by_six() {
        assert_eq!(rotate_by(monday()), 6);
    }

    #[test]
    fn rotate_by_covers_every_weekday() {
        // 2024-06-09 is a Sunday; walking the week gives 0, 6, 5, .. 1.
        let expected = [0, 6, 5, 4, 3, 2, 1];
        for (offset, want) in expected.iter().enumerate() {
            let date = sunday() + chrono::Days::new(offset as u64);
            assert_eq!(rotate_by(date), *want, "offset {offset}");
        }
    }

    // -- reshape shape -------------------------------------------------------

    #[test]
    fn output_has_seven_buckets_of_ninety_six() {
        let offered = week_of_day_values(1.0);
        let aht = week_of_day_values(100.0);

        let series = reshape(&offered, &aht, monday()).unwrap();

        for buckets in [&series.n_contacts, &series.t_handle, &series.n_handled] {
            assert_eq!(buckets.len(), DAYS_PER_WEEK);
            for day in buckets {
                assert_eq!(day.len(), INTERVALS_PER_DAY);
            }
        }
    }

    // -- rotation ------------------------------------------------------------

    #[test]
    fn monday_rotation_moves_last_bucket_first() {
        // Day d holds the constant value 1 + d, so the source bucket order
        // reads [1, 2, 3, 4, 5, 6, 7] and a Monday week start must yield
        // [7, 1, 2, 3, 4, 5, 6].
        let offered = week_of_day_values(1.0);
        let aht = vec![1.0; INTERVALS_PER_WEEK];

        let series = reshape(&offered, &aht, monday()).unwrap();

        let first_values: Vec<f64> = series.n_contacts.iter().map(|day| day[0]).collect();
        assert_eq!(first_values, vec![7.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn sunday_rotation_is_identity() {
        let offered = week_of_day_values(1.0);
        let aht = vec![1.0; INTERVALS_PER_WEEK];

        let series = reshape(&offered, &aht, sunday()).unwrap();

        let first_values: Vec<f64> = series.n_contacts.iter().map(|day| day[0]).collect();
        assert_eq!(first_values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn rotation_preserves_bucket_contents() {
        // Rotation is a pure permutation of whole buckets: every source
        // bucket must appear unchanged somewhere in the output.
        let offered: Vec<f64> = (0..INTERVALS_PER_WEEK).map(|i| i as f64).collect();
        let aht = vec![1.0; INTERVALS_PER_WEEK];

        let series = reshape(&offered, &aht, monday()).unwrap();

        let mut source_buckets: Vec<Vec<f64>> = offered
            .chunks(INTERVALS_PER_DAY)
            .map(|c| c.to_vec())
            .collect();
        let mut output_buckets = series.n_contacts.clone();
        source_buckets.sort_by(|a, b| a[0].partial_cmp(&b[0]).unwrap());
        output_buckets.sort_by(|a, b| a[0].partial_cmp(&b[0]).unwrap());
        assert_eq!(source_buckets, output_buckets);
    }

    // -- derived series ------------------------------------------------------

    #[test]
    fn handle_time_is_elementwise_product_after_rotation() {
        // Distinct per-interval values so a desynchronized rotation of the
        // offered and handle-time buckets would be caught.
        let offered: Vec<f64> = (0..INTERVALS_PER_WEEK).map(|i| (i % 13) as f64 + 1.0).collect();
        let aht: Vec<f64> = (0..INTERVALS_PER_WEEK).map(|i| (i % 7) as f64 + 30.0).collect();

        let series = reshape(&offered, &aht, monday()).unwrap();

        for day in 0..DAYS_PER_WEEK {
            for i in 0..INTERVALS_PER_DAY {
                let expected = series.n_contacts[day][i]
                    * aht[((day + rotate_by(monday())) % DAYS_PER_WEEK) * INTERVALS_PER_DAY + i];
                assert_eq!(series.t_handle[day][i], expected, "day {day} interval {i}");
            }
        }
    }

    #[test]
    fn handled_duplicates_contacts() {
        let offered = week_of_day_values(2.0);
        let aht = week_of_day_values(90.0);

        let series = reshape(&offered, &aht, monday()).unwrap();

        assert_eq!(series.n_handled, series.n_contacts);
    }

    // -- shape violations ----------------------------------------------------

    #[test]
    fn rejects_short_input() {
        let offered = vec![1.0; 480];
        let aht = vec![1.0; 480];
        assert!(reshape(&offered, &aht, monday()).is_err());
    }

    #[test]
    fn rejects_untrimmed_eight_day_input() {
        // Eight days is a multiple of the day length but not a canonical
        // week; the fetcher must trim before reshaping.
        let offered = vec![1.0; 8 * INTERVALS_PER_DAY];
        let aht = vec![1.0; 8 * INTERVALS_PER_DAY];
        assert!(reshape(&offered, &aht, monday()).is_err());
    }

    #[test]
    fn rejects_length_not_a_multiple_of_a_day() {
        let offered = vec![1.0; 700];
        let aht = vec![1.0; 700];
        assert!(reshape(&offered, &aht, monday()).is_err());
    }

    #[test]
    fn rejects_mismatched_series_lengths() {
        let offered = vec![1.0; INTERVALS_PER_WEEK];
        let aht = vec![1.0; INTERVALS_PER_WEEK - 1];
        assert!(reshape(&offered, &aht, monday()).is_err());
    }

    #[test]
    fn shape_error_reports_lengths() {
        let offered = vec![1.0; 480];
        let aht = vec![1.0; 480];
        let err = reshape(&offered, &aht, monday()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("480"));
        assert!(msg.contains("672"));
    }
}
