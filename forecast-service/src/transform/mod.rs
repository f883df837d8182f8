use crate::pipeline::{Envelope, PipelineError, Transform};
use time::macros::datetime;
use wellpark_client::domain::{ParkObservation, SpotCategory};

/// Pure validation of a `ParkObservation` record.
///
/// Rules:
/// - update_time must be within a broad sanity window [2000-01-01, 2100-01-01].
/// - no category may report more free than total spaces.
pub fn validate_observation(
    env: Envelope<ParkObservation>,
) -> Result<Envelope<ParkObservation>, PipelineError> {
    let obs = &env.payload;

    let min_ts = datetime!(2000-01-01 00:00:00);
    let max_ts = datetime!(2100-01-01 00:00:00);

    if obs.update_time < min_ts || obs.update_time > max_ts {
        return Err(PipelineError::Transform(
            "update_time out of allowed range".to_string(),
        ));
    }

    for category in SpotCategory::ALL {
        if let (Some(free), Some(total)) = (obs.free_count(category), obs.total_count(category)) {
            if free > total {
                return Err(PipelineError::Transform(format!(
                    "{} exceeds its total",
                    category.free_field()
                )));
            }
        }
    }

    Ok(env)
}

#[derive(Clone, Default)]
pub struct ObservationValidation;

#[async_trait::async_trait]
impl Transform<ParkObservation, ParkObservation> for ObservationValidation {
    async fn apply(
        &self,
        input: Envelope<ParkObservation>,
    ) -> Result<Envelope<ParkObservation>, PipelineError> {
        match validate_observation(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("validation_observation_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::datetime, PrimitiveDateTime};

    fn observation(ts: PrimitiveDateTime, free: u32, total: u32) -> ParkObservation {
        ParkObservation {
            park_no: "004".to_string(),
            parking_name: None,
            update_time: ts,
            free_quantity: Some(free),
            total_quantity: Some(total),
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
    fn validation_accepts_valid_observation() {
        let env = Envelope::now(observation(datetime!(2024-01-01 00:00:00), 3, 10));
        assert!(validate_observation(env).is_ok());
    }

    #[test]
    fn validation_rejects_free_exceeding_total() {
        let env = Envelope::now(observation(datetime!(2024-01-01 00:00:00), 11, 10));
        let res = validate_observation(env);
        assert!(matches!(res, Err(PipelineError::Transform(_))));
    }

    #[test]
    fn validation_rejects_out_of_range_timestamp() {
        let env = Envelope::now(observation(datetime!(1800-01-01 00:00:00), 3, 10));
        let res = validate_observation(env);
        assert!(matches!(res, Err(PipelineError::Transform(_))));
    }

    #[test]
    fn validation_ignores_categories_without_counters() {
        // A missing total means the category cannot be cross-checked.
        let mut obs = observation(datetime!(2024-01-01 00:00:00), 3, 10);
        obs.free_quantity_ecar = Some(5);
        obs.total_quantity_ecar = None;
        let env = Envelope::now(obs);
        assert!(validate_observation(env).is_ok());
    }
}
