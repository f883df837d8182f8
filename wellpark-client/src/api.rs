//! Typed client for the Wellpark REST endpoints.
//!
//! Wraps the paginated park/history/image listings, the form-encoded
//! prediction and reading uploads, and the multipart image upload using
//! [`reqwest`].

use serde::{de::DeserializeOwned, Deserialize};
use time::PrimitiveDateTime;

use crate::domain::{
    wire_time, ParkImage, ParkObservation, ParkSummary, PredictedPark, SpaceReading,
};

/// Pagination block on listings that report page positions.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
}

/// Pagination block on listings that only link to the next page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageLinks {
    pub next: Option<String>,
}

/// One page of a `meta`-style listing.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// One page of a `links`-style listing.
#[derive(Debug, Deserialize)]
pub struct LinkedPage<T> {
    pub data: Vec<T>,
    pub links: PageLinks,
}

/// Errors from the Wellpark REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Wellpark API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A timestamp could not be rendered in the wire format.
    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// HTTP client for one Wellpark deployment.
pub struct WellparkClient {
    http: reqwest::Client,
    base_url: String,
}

impl WellparkClient {
    /// Create a client for the given host, e.g. `https://wellpark.example.com`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// One page of the `latest-parks` listing.
    pub async fn latest_parks_page(&self, page: u32) -> Result<LinkedPage<ParkSummary>, ApiError> {
        self.get_json(
            format!("{}/api/latest-parks", self.base_url),
            &[("page", page.to_string())],
        )
        .await
    }

    /// One page of a lot's stored occupancy history.
    pub async fn park_history_page(
        &self,
        park_no: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<ParkObservation>, ApiError> {
        self.get_json(
            format!("{}/api/parks", self.base_url),
            &[
                ("page", page.to_string()),
                ("park_no", park_no.to_string()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    /// One page of camera images still awaiting recognition.
    pub async fn unrecognized_images_page(&self, page: u32) -> Result<Page<ParkImage>, ApiError> {
        self.get_json(
            format!("{}/api/park-images", self.base_url),
            &[("page", page.to_string()), ("recognized", "0".to_string())],
        )
        .await
    }

    /// Upload one forecast row, form-encoded.
    pub async fn post_prediction(&self, prediction: &PredictedPark) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/api/pred-park", self.base_url))
            .form(prediction)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Upload one recognized space reading, form-encoded. The server marks
    /// the referenced image recognized.
    pub async fn post_reading(&self, reading: &SpaceReading) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/api/park", self.base_url))
            .form(reading)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Download an image by its listing-relative path.
    pub async fn image_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self.http.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Upload one local camera image with its metadata as a multipart form.
    pub async fn upload_image(
        &self,
        park_no: &str,
        captured_at: PrimitiveDateTime,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<serde_json::Value, ApiError> {
        let captured = captured_at.format(wire_time::FORMAT)?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/jpeg")?;
        let form = reqwest::multipart::Form::new()
            .text("park_no", park_no.to_string())
            .text("captured_at", captured)
            .part("image", part);

        let response = self
            .http
            .post(format!("{}/api/park-image", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    // ---- private helpers ----

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.http.get(url).query(query).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Returns the response unchanged on success, or an
    /// [`ApiError::Status`] containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_page_deserializes() {
        let json = r#"{
            "data": [
                {"park_no": "004", "update_time": "2024-10-17 05:00:00", "free_quantity": 3, "total_quantity": 10}
            ],
            "meta": {"current_page": 2, "last_page": 7, "per_page": 1440, "total": 9312}
        }"#;

        let page: Page<ParkObservation> = serde_json::from_str(json).expect("valid page");
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.meta.current_page, 2);
        assert_eq!(page.meta.last_page, 7);
    }

    #[test]
    fn linked_page_deserializes_with_null_next() {
        let json = r#"{
            "data": [{"park_no": "004"}],
            "links": {"first": "https://x/api/latest-parks?page=1", "next": null, "prev": null}
        }"#;

        let page: LinkedPage<ParkSummary> = serde_json::from_str(json).expect("valid page");
        assert_eq!(page.data[0].park_no, "004");
        assert!(page.links.next.is_none());
    }

    #[test]
    fn linked_page_deserializes_with_next_url() {
        let json = r#"{
            "data": [],
            "links": {"next": "https://x/api/latest-parks?page=3"}
        }"#;

        let page: LinkedPage<ParkSummary> = serde_json::from_str(json).expect("valid page");
        assert!(page.links.next.is_some());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = WellparkClient::new("https://wellpark.example.com/");
        assert_eq!(client.base_url, "https://wellpark.example.com");
    }
}
