use std::{sync::Arc, time::Duration};

use futures::Stream;
use wellpark_client::{domain::ParkImage, WellparkClient};

use crate::pipeline::{Envelope, PipelineError, Source};

/// Unbounded source of camera images awaiting recognition.
///
/// Each round accumulates every page of the `recognized=0` listing; when the
/// listing comes back empty, the source sleeps for a fixed back-off before
/// polling again. The stream never ends on its own.
pub struct UnrecognizedImageSource {
    api: Arc<WellparkClient>,
    idle_backoff: Duration,
}

impl UnrecognizedImageSource {
    pub fn new(api: Arc<WellparkClient>, idle_backoff: Duration) -> Self {
        Self { api, idle_backoff }
    }
}

#[async_trait::async_trait]
impl Source<ParkImage> for UnrecognizedImageSource {
    async fn stream(
        &self,
    ) -> std::pin::Pin<Box<dyn Stream<Item = Result<Envelope<ParkImage>, PipelineError>> + Send>>
    {
        let api = self.api.clone();
        let idle_backoff = self.idle_backoff;

        let s = async_stream::stream! {
            loop {
                let mut images: Vec<ParkImage> = Vec::new();
                let mut page = 1u32;
                loop {
                    let fetched = match api.unrecognized_images_page(page).await {
                        Ok(p) => p,
                        Err(e) => {
                            metrics::counter!("park_image_fetch_errors_total").increment(1);
                            tracing::warn!(
                                page,
                                error = %e,
                                "image page fetch failed, continuing with partial data"
                            );
                            break;
                        }
                    };

                    metrics::counter!("park_image_pages_fetched_total").increment(1);
                    let last = fetched.meta.current_page >= fetched.meta.last_page
                        || fetched.data.is_empty();
                    images.extend(fetched.data);
                    if last {
                        break;
                    }
                    page += 1;
                }

                if images.is_empty() {
                    metrics::counter!("recognition_idle_polls_total").increment(1);
                    tracing::info!(
                        backoff_secs = idle_backoff.as_secs(),
                        "no unrecognized images, backing off"
                    );
                    tokio::time::sleep(idle_backoff).await;
                    continue;
                }

                tracing::info!(count = images.len(), "unrecognized images queued");
                for image in images {
                    yield Ok(Envelope::now(image));
                }
            }
        };

        Box::pin(s)
    }
}
