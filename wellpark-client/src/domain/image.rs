use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use super::wire_time;

/// A camera image queued for recognition.
///
/// `url` is relative to the API host. The server flips `recognized` once a
/// reading referencing the image is posted.
#[derive(Debug, Clone, Deserialize)]
pub struct ParkImage {
    pub id: u64,
    pub park_no: String,
    pub url: String,
    #[serde(with = "wire_time")]
    pub captured_at: PrimitiveDateTime,
    #[serde(default)]
    pub recognized: u8,
}

/// A free-space count read off a camera image, posted back form-encoded.
#[derive(Debug, Clone, Serialize)]
pub struct SpaceReading {
    pub park_no: String,
    pub free_quantity: u32,
    #[serde(with = "wire_time")]
    pub update_time: PrimitiveDateTime,
    pub park_image_id: u64,
}
