use std::sync::Arc;

use futures::StreamExt;
use wellpark_client::{
    domain::{ParkImage, SpaceReading},
    ApiError, WellparkClient,
};

use crate::{
    pipeline::{Envelope, PipelineError, Sink},
    vision::{VisionClient, VisionError},
};

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Vision(#[from] VisionError),
}

/// Terminal stage of the recognition pipeline.
///
/// For each queued image: download the bytes, ask the vision model for a
/// count, post the reading back. Any failure is logged and the loop moves to
/// the next image; the sink itself only ends when the source does.
pub struct RecognitionSink {
    api: Arc<WellparkClient>,
    vision: VisionClient,
}

impl RecognitionSink {
    pub fn new(api: Arc<WellparkClient>, vision: VisionClient) -> Self {
        Self { api, vision }
    }

    async fn process(&self, image: &ParkImage) -> Result<(), RecognitionError> {
        let bytes = self.api.image_bytes(&image.url).await?;
        let count = self.vision.recognize_free_spaces(&bytes).await?;

        let Some(free_quantity) = count else {
            metrics::counter!("vision_unreadable_images_total").increment(1);
            tracing::warn!(
                image_id = image.id,
                park_no = %image.park_no,
                "model could not read a space count off the image"
            );
            return Ok(());
        };

        let reading = SpaceReading {
            park_no: image.park_no.clone(),
            free_quantity,
            update_time: image.captured_at,
            park_image_id: image.id,
        };
        self.api.post_reading(&reading).await?;

        metrics::counter!("readings_posted_total").increment(1);
        tracing::info!(
            image_id = image.id,
            park_no = %image.park_no,
            free_quantity,
            "space reading posted"
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sink<ParkImage> for RecognitionSink {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<ParkImage>, PipelineError>>
            + Send
            + Unpin
            + 'static,
    {
        while let Some(item) = input.next().await {
            let env = match item {
                Ok(env) => env,
                Err(e) => {
                    tracing::error!(error = %e, "error in upstream pipeline for RecognitionSink");
                    continue;
                }
            };

            if let Err(e) = self.process(&env.payload).await {
                metrics::counter!("image_recognition_errors_total").increment(1);
                tracing::warn!(
                    image_id = env.payload.id,
                    error = %e,
                    "image recognition failed, skipping"
                );
            }
        }

        Ok(())
    }
}
