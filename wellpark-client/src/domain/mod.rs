pub mod image;
pub mod park;
pub mod prediction;

pub use image::{ParkImage, SpaceReading};
pub use park::{ParkObservation, ParkSummary, SpotCategory};
pub use prediction::PredictedPark;

/// Serde adapter for the API's naive `YYYY-MM-DD HH:MM:SS` timestamps.
pub mod wire_time {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use time::{format_description::FormatItem, macros::format_description, PrimitiveDateTime};

    pub const FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    pub fn serialize<S: Serializer>(ts: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = ts.format(FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PrimitiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        PrimitiveDateTime::parse(&text, FORMAT).map_err(D::Error::custom)
    }
}
