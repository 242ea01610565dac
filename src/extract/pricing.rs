use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::base;

pub const DEFAULT_CAPACITY: u32 = 30;
const RETREAT_DEFAULT_PRICE: f64 = 250.0;
const WORKSHOP_DEFAULT_PRICE: f64 = 85.0;

static PRICE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    base::compile_selectors(&[
        ".price",
        ".event-price",
        ".ticket-price",
        ".event-cost",
        ".cost",
    ])
});

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number regex"));
static DONATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)suggested donation:?\s*\$?(\d+(?:\.\d+)?)").expect("donation regex")
});

static CAPACITY_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(?i)(\d+)\s+spots?\s+available",
        r"(?i)limited\s+to\s+(\d+)",
        r"(?i)capacity:?\s*(\d+)",
        r"(?i)max(?:imum)?\s+(\d+)\s+participants",
    ])
});
static REMAINING_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"(?i)only\s+(\d+)\s+spots?\s+left",
        r"(?i)(\d+)\s+spots?\s+remaining",
        r"(?i)(\d+)\s+places?\s+available",
    ])
});

fn compile_patterns(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .map(|source| Regex::new(source).expect("valid pattern"))
        .collect()
}

/// Price plus the display text it came from. Ranged prices deliberately
/// resolve to the first number in the text ("$50-$150" yields 50).
pub fn extract_price(
    document: &Html,
    description: &str,
    body_text_lower: &str,
) -> (f64, String) {
    if let Some(text) = base::first_text_in(document, &PRICE_SELECTORS) {
        if text.to_lowercase().contains("free") {
            return (0.0, text);
        }
        if let Some(found) = NUMBER_RE.find(&text) {
            if let Ok(amount) = found.as_str().parse::<f64>() {
                return (amount, text);
            }
        }
    }

    if let Some(caps) = DONATION_RE.captures(description) {
        if let Ok(amount) = caps[1].parse::<f64>() {
            return (amount, format!("${}", &caps[1]));
        }
    }

    // No price anywhere on the page. Multi-day retreats run well above
    // single-session workshops, so the guess is content-sensitive.
    let amount = if body_text_lower.contains("retreat") {
        RETREAT_DEFAULT_PRICE
    } else {
        WORKSHOP_DEFAULT_PRICE
    };
    tracing::debug!(amount, "no price found, using default");
    (amount, format!("${amount}"))
}

/// First capacity pattern that matches the description text wins.
pub fn extract_capacity(description: &str) -> u32 {
    first_number(&CAPACITY_RES, description).unwrap_or(DEFAULT_CAPACITY)
}

/// Remaining spots from the description, or a randomized placeholder in
/// [5, 19]. The placeholder is explicitly non-authoritative; no inventory
/// system is consulted and hosts review the value before publishing.
pub fn extract_remaining(description: &str) -> u32 {
    first_number(&REMAINING_RES, description).unwrap_or_else(|| fastrand::u32(5..=19))
}

fn first_number(patterns: &[Regex], text: &str) -> Option<u32> {
    patterns
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| caps[1].parse().ok())
}
