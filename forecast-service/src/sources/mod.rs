pub mod park_history;
pub mod park_images;

pub use park_history::ParkHistorySource;
pub use park_images::UnrecognizedImageSource;
