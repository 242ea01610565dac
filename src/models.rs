use serde::{Deserialize, Serialize};

/// Normalized event record produced by one extraction pass.
///
/// Every field is guaranteed non-null: extractors fall back to fixed
/// defaults, so callers never see a partially-populated record.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtractedEvent {
    pub title: String,
    pub description: String,
    pub image: String,
    pub date: EventDate,
    pub time: String,
    pub location: EventLocation,
    pub instructor: String,
    pub price: f64,
    #[serde(rename = "priceDisplay")]
    pub price_display: String,
    pub capacity: u32,
    pub remaining: u32,
    pub category: Vec<String>,
    /// Exact echo of the caller-supplied URL, never normalized.
    #[serde(rename = "bookingLink")]
    pub booking_link: String,
    pub source: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EventDate {
    /// Human-readable long-form date, or the raw source-page text when
    /// scraped from page content.
    pub display: String,
    /// RFC-3339 timestamp, real or synthesized future placeholder.
    pub iso: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EventLocation {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "type")]
    pub kind: LocationType,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Venue,
    Online,
}
