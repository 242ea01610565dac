pub mod config;
pub mod extract;
pub mod models;
pub mod server;

pub use extract::{extract_event, ExtractError, SOURCE_TAG};
pub use models::{EventDate, EventLocation, ExtractedEvent, LocationType};
