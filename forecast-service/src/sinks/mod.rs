pub mod predictions;
pub mod recognition;

pub use predictions::ForecastSink;
pub use recognition::RecognitionSink;
