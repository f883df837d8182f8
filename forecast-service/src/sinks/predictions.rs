use std::{sync::Arc, time::SystemTime};

use futures::StreamExt;
use wellpark_client::{domain::ParkObservation, WellparkClient};

use crate::{
    forecast,
    pipeline::{Envelope, PipelineError, Sink},
    resample,
};

/// Terminal stage of the forecast pipeline for one parking lot.
///
/// Buffers the lot's full history off the stream, resamples it to hourly
/// means, fits one model per space category and uploads the predicted rows
/// one POST at a time. A failed upload is logged and the remaining rows are
/// still attempted.
pub struct ForecastSink {
    api: Arc<WellparkClient>,
    park_no: String,
    season_length: usize,
    horizon: usize,
}

impl ForecastSink {
    pub fn new(
        api: Arc<WellparkClient>,
        park_no: impl Into<String>,
        season_length: usize,
        horizon: usize,
    ) -> Self {
        Self {
            api,
            park_no: park_no.into(),
            season_length,
            horizon,
        }
    }
}

#[async_trait::async_trait]
impl Sink<ParkObservation> for ForecastSink {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<ParkObservation>, PipelineError>>
            + Send
            + Unpin
            + 'static,
    {
        let mut observations: Vec<ParkObservation> = Vec::new();
        let mut first_fetched: Option<SystemTime> = None;

        while let Some(item) = input.next().await {
            match item {
                Ok(env) => {
                    first_fetched.get_or_insert(env.fetched_at);
                    observations.push(env.payload);
                }
                Err(e) => {
                    tracing::error!(error = %e, "error in upstream pipeline for ForecastSink");
                    continue;
                }
            }
        }

        metrics::counter!("observations_ingested_total").increment(observations.len() as u64);

        let hourly = resample::hourly_means(&observations);
        if hourly.is_empty() {
            tracing::warn!(park_no = %self.park_no, "no usable history, skipping forecast");
            return Ok(());
        }

        let rows = forecast::build_predictions(
            &self.park_no,
            &hourly,
            self.season_length,
            self.horizon,
        )
        .map_err(|e| PipelineError::Sink(e.to_string()))?;

        for (i, row) in rows.iter().enumerate() {
            match self.api.post_prediction(row).await {
                Ok(()) => {
                    metrics::counter!("predictions_posted_total").increment(1);
                    tracing::info!(park_no = %self.park_no, row = i, "prediction row accepted");
                }
                Err(e) => {
                    metrics::counter!("prediction_upload_errors_total").increment(1);
                    tracing::warn!(
                        park_no = %self.park_no,
                        row = i,
                        error = %e,
                        "prediction upload failed, continuing"
                    );
                }
            }
        }

        // Approximate latency from the first fetched record to upload completion.
        if let Some(start) = first_fetched {
            if let Ok(dur) = SystemTime::now().duration_since(start) {
                metrics::histogram!("forecast_end_to_end_latency_seconds").record(dur.as_secs_f64());
            }
        }

        Ok(())
    }
}
