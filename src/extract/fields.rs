use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::base;
use crate::models::{EventLocation, LocationType};

pub const DEFAULT_TITLE: &str = "Untitled Event";
pub const DEFAULT_IMAGE: &str =
    "https://images.unsplash.com/photo-1506126613408-eca07ce68773?auto=format&fit=crop&w=1200&q=80";
pub const DEFAULT_INSTRUCTOR: &str = "Guest Teacher";

static TITLE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    base::compile_selectors(&[
        "h1.event-title",
        ".event-header h1",
        "article h1",
        "main h1",
        "h1",
    ])
});
static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    base::compile_selectors(&[
        ".event-description",
        ".event-details",
        ".entry-content",
        "article .content",
        "main article",
        "article",
    ])
});
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("paragraph selector"));
static IMAGE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    base::compile_selectors(&[
        ".event-image img",
        ".event-header img",
        ".entry-content img",
        "article img",
        "main img",
    ])
});
static LOCATION_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    base::compile_selectors(&[
        ".event-location",
        ".venue-details",
        ".location",
        ".where",
    ])
});
static VENUE_NAME_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    base::compile_selectors(&[".venue-name", ".location-name", "h3", "strong"])
});
static ADDRESS_SELECTORS: Lazy<Vec<Selector>> =
    Lazy::new(|| base::compile_selectors(&["address", ".address", ".venue-address"]));
static INSTRUCTOR_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    base::compile_selectors(&[
        ".instructor-name",
        ".instructor",
        ".teacher",
        ".presenter",
        ".facilitator",
    ])
});

static EXTRA_NEWLINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("newline collapse regex"));
// "Asheville, NC" style: comma-separated city and two-letter state code.
static CITY_STATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z][A-Za-z .'-]*?),\s*([A-Z]{2})\b").expect("city/state regex")
});

pub fn extract_title(document: &Html) -> String {
    base::meta_content(document, &base::OG_TITLE)
        .or_else(|| base::first_text_in(document, &TITLE_SELECTORS))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// Paragraph text of the first matching content container, joined with
/// blank lines; the container's own text when it has no paragraphs; then
/// the meta description. May legitimately end up empty.
pub fn extract_description(document: &Html) -> String {
    if let Some(container) = base::first_element(document, &CONTENT_SELECTORS) {
        let paragraphs: Vec<String> = container
            .select(&PARAGRAPH_SELECTOR)
            .map(|p| base::clean_text(&p.text().collect::<Vec<_>>().join(" ")))
            .filter(|text| !text.is_empty())
            .collect();

        let text = if paragraphs.is_empty() {
            base::block_text(container)
        } else {
            paragraphs.join("\n\n")
        };
        let text = EXTRA_NEWLINES_RE.replace_all(text.trim(), "\n\n").to_string();
        if !text.is_empty() {
            return text;
        }
    }

    base::meta_content(document, &base::META_DESCRIPTION).unwrap_or_default()
}

pub fn extract_image(document: &Html) -> String {
    base::meta_content(document, &base::OG_IMAGE)
        .or_else(|| base::first_attr_in(document, &IMAGE_SELECTORS, "src"))
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string())
}

pub fn default_location() -> EventLocation {
    EventLocation {
        name: "Still Mountain Retreat Center".to_string(),
        address: "1850 Cedar Ridge Road".to_string(),
        city: "Asheville".to_string(),
        state: "NC".to_string(),
        kind: LocationType::Venue,
    }
}

/// Venue details from a location container, falling back to the fixed
/// default venue. Independently of what the container says, "online" in
/// the name/address or "zoom" anywhere on the page marks the event online.
pub fn extract_location(document: &Html, body_text_lower: &str) -> EventLocation {
    let mut location = default_location();

    if let Some(container) = base::first_element(document, &LOCATION_SELECTORS) {
        let name = base::child_text(&container, &VENUE_NAME_SELECTORS)
            .unwrap_or_else(|| base::inner_text(container));
        if !name.is_empty() {
            location.name = name;
        }
        if let Some(address_el) = base::child_element(&container, &ADDRESS_SELECTORS) {
            let address_text = base::inner_text(address_el);
            if !address_text.is_empty() {
                if let Some(caps) = CITY_STATE_RE.captures(&address_text) {
                    location.city = caps[1].trim().to_string();
                    location.state = caps[2].to_string();
                }
                location.address = address_text;
            }
        }
    }

    let name_lower = location.name.to_lowercase();
    let address_lower = location.address.to_lowercase();
    if name_lower.contains("online")
        || address_lower.contains("online")
        || body_text_lower.contains("zoom")
    {
        location.kind = LocationType::Online;
    }

    location
}

pub fn extract_instructor(document: &Html) -> String {
    base::first_text_in(document, &INSTRUCTOR_SELECTORS)
        .unwrap_or_else(|| DEFAULT_INSTRUCTOR.to_string())
}
