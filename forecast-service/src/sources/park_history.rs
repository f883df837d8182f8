use std::sync::Arc;

use futures::Stream;
use wellpark_client::{domain::ParkObservation, WellparkClient};

use crate::pipeline::{Envelope, PipelineError, Source};

/// Streams the full stored history of one parking lot, page by page.
///
/// A page fetch failure ends the stream early: downstream stages see
/// whatever was fetched before the failure.
pub struct ParkHistorySource {
    api: Arc<WellparkClient>,
    park_no: String,
    per_page: u32,
}

impl ParkHistorySource {
    pub fn new(api: Arc<WellparkClient>, park_no: impl Into<String>, per_page: u32) -> Self {
        Self {
            api,
            park_no: park_no.into(),
            per_page,
        }
    }
}

#[async_trait::async_trait]
impl Source<ParkObservation> for ParkHistorySource {
    async fn stream(
        &self,
    ) -> std::pin::Pin<Box<dyn Stream<Item = Result<Envelope<ParkObservation>, PipelineError>> + Send>>
    {
        let api = self.api.clone();
        let park_no = self.park_no.clone();
        let per_page = self.per_page;

        let s = async_stream::stream! {
            let mut page = 1u32;
            loop {
                let fetched = match api.park_history_page(&park_no, page, per_page).await {
                    Ok(p) => p,
                    Err(e) => {
                        metrics::counter!("park_history_fetch_errors_total").increment(1);
                        tracing::warn!(
                            park_no = %park_no,
                            page,
                            error = %e,
                            "history page fetch failed, continuing with partial data"
                        );
                        break;
                    }
                };

                metrics::counter!("park_history_pages_fetched_total").increment(1);
                tracing::info!(
                    park_no = %park_no,
                    current_page = fetched.meta.current_page,
                    last_page = fetched.meta.last_page,
                    "fetched history page"
                );

                if fetched.data.is_empty() {
                    break;
                }

                let last = fetched.meta.current_page >= fetched.meta.last_page;
                for obs in fetched.data {
                    yield Ok(Envelope::now(obs));
                }
                if last {
                    break;
                }
                page += 1;
            }
        };

        Box::pin(s)
    }
}
