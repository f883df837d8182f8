//! Per-category forecasting over resampled history.
//!
//! Model selection is delegated entirely to [`AutoETS`]: a fully automatic
//! spec over error/trend/season with the configured seasonal period. This
//! module only assembles the per-category series, clamps the model output
//! into usable counts and attaches timestamps.

use augurs::{ets::AutoETS, prelude::*};
use time::{Duration, PrimitiveDateTime};
use wellpark_client::domain::{PredictedPark, SpotCategory};

use crate::resample::HourlyOccupancy;

#[derive(Debug, thiserror::Error)]
#[error("ETS model selection failed: {0}")]
pub struct ForecastError(pub String);

/// Fit a seasonal automatic-ETS model on `values` and return a point
/// forecast `horizon` steps ahead.
pub fn forecast_series(
    values: &[f64],
    season_length: usize,
    horizon: usize,
) -> Result<Vec<f64>, ForecastError> {
    let searcher =
        AutoETS::new(season_length, "ZZZ").map_err(|e| ForecastError(e.to_string()))?;
    let fitted = searcher
        .fit(values)
        .map_err(|e| ForecastError(e.to_string()))?;
    let forecast = fitted
        .predict(horizon, None)
        .map_err(|e| ForecastError(e.to_string()))?;
    Ok(forecast.point)
}

/// Round a raw model output to a usable space count, clamped at zero.
pub fn clamp_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

/// Timestamps for the forecast rows. The first row shares the final observed
/// bucket's timestamp; each following row advances one hour.
pub fn future_timestamps(last_bucket: PrimitiveDateTime, horizon: usize) -> Vec<PrimitiveDateTime> {
    (0..horizon)
        .map(|i| last_bucket + Duration::hours(i as i64))
        .collect()
}

/// Forecast every category of one lot and assemble upload-ready rows.
///
/// A category with no samples at all keeps a zero forecast; a fitting error
/// on a non-empty series aborts the lot.
pub fn build_predictions(
    park_no: &str,
    hourly: &[HourlyOccupancy],
    season_length: usize,
    horizon: usize,
) -> Result<Vec<PredictedPark>, ForecastError> {
    let last_bucket = match hourly.last() {
        Some(h) => h.bucket,
        None => return Ok(Vec::new()),
    };

    let mut rows: Vec<PredictedPark> = future_timestamps(last_bucket, horizon)
        .into_iter()
        .map(|ts| PredictedPark::new(park_no.to_string(), ts))
        .collect();

    for category in SpotCategory::ALL {
        let series: Vec<f64> = hourly.iter().filter_map(|h| h.free_mean(category)).collect();
        if series.is_empty() {
            tracing::warn!(
                park_no = %park_no,
                category = category.free_field(),
                "no samples for category, forecasting zeros"
            );
            continue;
        }

        let points = forecast_series(&series, season_length, horizon)?;
        for (row, value) in rows.iter_mut().zip(points) {
            row.set_free_count(category, clamp_count(value));
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn clamp_rounds_to_nearest_and_floors_at_zero() {
        assert_eq!(clamp_count(11.4), 11);
        assert_eq!(clamp_count(11.5), 12);
        assert_eq!(clamp_count(0.2), 0);
        assert_eq!(clamp_count(-3.7), 0);
        assert_eq!(clamp_count(f64::NAN), 0);
    }

    #[test]
    fn first_future_timestamp_reuses_last_bucket() {
        let times = future_timestamps(datetime!(2024-10-17 06:00:00), 3);
        assert_eq!(
            times,
            vec![
                datetime!(2024-10-17 06:00:00),
                datetime!(2024-10-17 07:00:00),
                datetime!(2024-10-17 08:00:00),
            ]
        );
    }

    #[test]
    fn empty_history_yields_no_rows() {
        let rows = build_predictions("004", &[], 24, 24).expect("no fitting happens");
        assert!(rows.is_empty());
    }

    #[test]
    fn unsampled_categories_stay_zero() {
        // General is populated, everything else has no samples; the rows must
        // still carry all counters.
        let hourly: Vec<HourlyOccupancy> = (0..72)
            .map(|i| {
                let mut free_means = [None; SpotCategory::COUNT];
                // Three full daily cycles of a simple sawtooth.
                free_means[SpotCategory::General.index()] = Some(10.0 + (i % 24) as f64);
                HourlyOccupancy {
                    bucket: datetime!(2024-10-01 00:00:00) + Duration::hours(i),
                    free_means,
                }
            })
            .collect();

        let rows = build_predictions("004", &hourly, 24, 6).expect("fit succeeds on cyclic data");
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].future_time, hourly.last().map(|h| h.bucket).expect("non-empty"));
        for row in &rows {
            assert_eq!(row.park_no, "004");
            assert_eq!(row.free_quantity_ecar, 0);
            assert_eq!(row.free_quantity_mot, 0);
        }
    }
}
