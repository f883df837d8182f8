//! Hourly resampling of raw occupancy readings.
//!
//! Readings arrive at irregular sub-hour intervals; forecasting wants one
//! value per hour. Each reading is assigned to its nearest hour and each
//! bucket carries the arithmetic mean of every category's free count over
//! the readings that landed in it.

use std::collections::BTreeMap;

use time::{Duration, PrimitiveDateTime};
use wellpark_client::domain::{ParkObservation, SpotCategory};

/// Mean free-space counts for one hourly bucket.
///
/// A category with no samples in the bucket holds `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyOccupancy {
    pub bucket: PrimitiveDateTime,
    pub free_means: [Option<f64>; SpotCategory::COUNT],
}

impl HourlyOccupancy {
    pub fn free_mean(&self, category: SpotCategory) -> Option<f64> {
        self.free_means[category.index()]
    }
}

/// Nearest-hour bucketing; 30 minutes or more past the hour rounds up.
pub fn round_to_hour(ts: PrimitiveDateTime) -> PrimitiveDateTime {
    let floored = ts
        - Duration::minutes(ts.minute() as i64)
        - Duration::seconds(ts.second() as i64)
        - Duration::nanoseconds(ts.nanosecond() as i64);
    if ts - floored >= Duration::minutes(30) {
        floored + Duration::HOUR
    } else {
        floored
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Accum {
    sum: f64,
    count: u32,
}

/// Group observations into nearest-hour buckets and average each category's
/// free count per bucket. Buckets come back in ascending time order.
pub fn hourly_means(observations: &[ParkObservation]) -> Vec<HourlyOccupancy> {
    let mut buckets: BTreeMap<PrimitiveDateTime, [Accum; SpotCategory::COUNT]> = BTreeMap::new();

    for obs in observations {
        let bucket = buckets.entry(round_to_hour(obs.update_time)).or_default();
        for category in SpotCategory::ALL {
            if let Some(free) = obs.free_count(category) {
                let acc = &mut bucket[category.index()];
                acc.sum += f64::from(free);
                acc.count += 1;
            }
        }
    }

    buckets
        .into_iter()
        .map(|(bucket, accs)| {
            let mut free_means = [None; SpotCategory::COUNT];
            for category in SpotCategory::ALL {
                let acc = accs[category.index()];
                if acc.count > 0 {
                    free_means[category.index()] = Some(acc.sum / f64::from(acc.count));
                }
            }
            HourlyOccupancy { bucket, free_means }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn observation(ts: PrimitiveDateTime, free: u32) -> ParkObservation {
        ParkObservation {
            park_no: "004".to_string(),
            parking_name: None,
            update_time: ts,
            free_quantity: Some(free),
            total_quantity: Some(200),
            free_quantity_mot: None,
            total_quantity_mot: None,
            free_quantity_dis: None,
            total_quantity_dis: None,
            free_quantity_cw: None,
            total_quantity_cw: None,
            free_quantity_ecar: None,
            total_quantity_ecar: None,
            free_quantity_big: None,
            total_quantity_big: None,
        }
    }

    #[test]
    fn rounds_down_before_half_hour() {
        assert_eq!(
            round_to_hour(datetime!(2024-10-17 05:29:59)),
            datetime!(2024-10-17 05:00:00)
        );
    }

    #[test]
    fn rounds_up_from_half_hour() {
        assert_eq!(
            round_to_hour(datetime!(2024-10-17 05:30:00)),
            datetime!(2024-10-17 06:00:00)
        );
    }

    #[test]
    fn rounding_up_crosses_midnight() {
        assert_eq!(
            round_to_hour(datetime!(2024-10-17 23:45:00)),
            datetime!(2024-10-18 00:00:00)
        );
    }

    #[test]
    fn means_are_taken_per_bucket() {
        let observations = vec![
            observation(datetime!(2024-10-17 05:10:00), 10),
            observation(datetime!(2024-10-17 05:20:00), 20),
            observation(datetime!(2024-10-17 06:05:00), 7),
        ];

        let hourly = hourly_means(&observations);
        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly[0].bucket, datetime!(2024-10-17 05:00:00));
        assert_eq!(hourly[0].free_mean(SpotCategory::General), Some(15.0));
        assert_eq!(hourly[1].bucket, datetime!(2024-10-17 06:00:00));
        assert_eq!(hourly[1].free_mean(SpotCategory::General), Some(7.0));
    }

    #[test]
    fn buckets_come_back_sorted_even_from_unsorted_input() {
        let observations = vec![
            observation(datetime!(2024-10-17 08:00:00), 1),
            observation(datetime!(2024-10-17 05:00:00), 2),
            observation(datetime!(2024-10-17 06:00:00), 3),
        ];

        let hourly = hourly_means(&observations);
        let buckets: Vec<_> = hourly.iter().map(|h| h.bucket).collect();
        assert_eq!(
            buckets,
            vec![
                datetime!(2024-10-17 05:00:00),
                datetime!(2024-10-17 06:00:00),
                datetime!(2024-10-17 08:00:00),
            ]
        );
    }

    #[test]
    fn categories_without_samples_stay_empty() {
        let observations = vec![observation(datetime!(2024-10-17 05:00:00), 10)];
        let hourly = hourly_means(&observations);
        assert_eq!(hourly[0].free_mean(SpotCategory::Electric), None);
        assert_eq!(hourly[0].free_mean(SpotCategory::General), Some(10.0));
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(hourly_means(&[]).is_empty());
    }
}
