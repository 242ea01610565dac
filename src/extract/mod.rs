pub mod base;
pub mod categories;
pub mod dates;
pub mod fields;
pub mod pricing;

use scraper::Html;
use thiserror::Error;

use crate::models::ExtractedEvent;

/// Provenance tag stamped on every record this pipeline produces.
pub const SOURCE_TAG: &str = "url-import";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document is empty or not parseable HTML")]
    UnparseableDocument,
}

/// Run the full extraction pipeline against one fetched page.
///
/// Fails only when the document itself cannot be parsed; every field-level
/// miss is absorbed by that field's default, so a successful return is
/// always a complete record. Order matters: price, capacity and categories
/// reuse the already-extracted description and title.
pub fn extract_event(html: &str, url: &str) -> Result<ExtractedEvent, ExtractError> {
    let document = parse_document(html)?;
    let body_text = base::body_text_lower(&document);

    let title = fields::extract_title(&document);
    let description = fields::extract_description(&document);
    let image = fields::extract_image(&document);
    let resolved = dates::resolve_date_time(&document, url);
    let location = fields::extract_location(&document, &body_text);
    let instructor = fields::extract_instructor(&document);
    let (price, price_display) = pricing::extract_price(&document, &description, &body_text);
    let capacity = pricing::extract_capacity(&description);
    let remaining = pricing::extract_remaining(&description);
    let category = categories::detect_categories(&title, &description);

    tracing::debug!(url, %title, "extracted event record");

    Ok(ExtractedEvent {
        title,
        description,
        image,
        date: resolved.date,
        time: resolved.time,
        location,
        instructor,
        price,
        price_display,
        capacity,
        remaining,
        category,
        booking_link: url.to_string(),
        source: SOURCE_TAG.to_string(),
    })
}

fn parse_document(html: &str) -> Result<Html, ExtractError> {
    // scraper's parser is lenient and will wrap nearly anything in a
    // document skeleton; the one input it cannot make a document from is
    // no markup at all.
    if html.trim().is_empty() {
        return Err(ExtractError::UnparseableDocument);
    }
    Ok(Html::parse_document(html))
}
