use anyhow::Result;
use forecast_service::{
    config::AppConfig,
    metrics_server, observability,
    pipeline::Pipeline,
    sinks::ForecastSink,
    sources::ParkHistorySource,
    transform,
};
use std::sync::Arc;
use wellpark_client::{
    domain::{ParkObservation, ParkSummary},
    WellparkClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr);
    }

    let api = Arc::new(WellparkClient::new(&cfg.api.base_url));

    let parks = fetch_latest_parks(&api).await;
    if parks.is_empty() {
        tracing::warn!("no parking lots listed, nothing to forecast");
        return Ok(());
    }
    tracing::info!(count = parks.len(), "parking lots to forecast");

    // One pipeline run per lot, strictly in sequence. A lot that fails is
    // logged and skipped; the remaining lots still get their forecasts.
    for park in parks {
        tracing::info!(park_no = %park.park_no, "forecasting parking lot");

        let source = ParkHistorySource::new(api.clone(), park.park_no.clone(), cfg.api.history_per_page);
        let sink = ForecastSink::new(
            api.clone(),
            park.park_no.clone(),
            cfg.forecast.season_length,
            cfg.forecast.horizon,
        );

        let pipeline: Pipeline<_, ParkObservation, _> = Pipeline {
            source,
            transforms: vec![Arc::new(transform::ObservationValidation::default())],
            sink,
        };

        if let Err(e) = pipeline.run().await {
            tracing::error!(
                park_no = %park.park_no,
                error = %e,
                "forecast failed for parking lot, moving on"
            );
        }
    }

    Ok(())
}

/// Enumerate all lots from the `latest-parks` listing, following `links.next`
/// until the API reports no further page. A failing page ends the walk with
/// whatever was accumulated.
async fn fetch_latest_parks(api: &WellparkClient) -> Vec<ParkSummary> {
    let mut parks = Vec::new();
    let mut page = 1u32;

    loop {
        match api.latest_parks_page(page).await {
            Ok(fetched) => {
                parks.extend(fetched.data);
                if fetched.links.next.is_none() {
                    break;
                }
                page += 1;
            }
            Err(e) => {
                tracing::warn!(
                    page,
                    error = %e,
                    "latest-parks page fetch failed, continuing with partial data"
                );
                break;
            }
        }
    }

    parks
}
