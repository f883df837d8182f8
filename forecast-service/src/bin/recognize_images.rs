use anyhow::Result;
use forecast_service::{
    config::AppConfig,
    metrics_server, observability,
    pipeline::Pipeline,
    sinks::RecognitionSink,
    sources::UnrecognizedImageSource,
    vision::{self, VisionClient},
};
use std::{path::Path, sync::Arc, time::Duration};
use wellpark_client::{domain::ParkImage, WellparkClient};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr);
    }

    let api = Arc::new(WellparkClient::new(&cfg.api.base_url));

    let vision_cfg = &cfg.recognition.vision;
    let api_key = vision::read_api_key(Path::new(&vision_cfg.key_file))?;
    let vision = VisionClient::new(
        vision_cfg.endpoint.clone(),
        api_key,
        vision_cfg.model.clone(),
        vision_cfg.max_tokens,
        Duration::from_secs(vision_cfg.request_timeout_secs),
    )?;

    let source = UnrecognizedImageSource::new(
        api.clone(),
        Duration::from_secs(cfg.recognition.idle_backoff_secs),
    );
    let sink = RecognitionSink::new(api, vision);

    // The source polls forever; this run only returns on a sink error.
    let pipeline: Pipeline<_, ParkImage, _> = Pipeline {
        source,
        transforms: vec![],
        sink,
    };

    pipeline.run().await?;

    Ok(())
}
