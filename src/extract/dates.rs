use chrono::{DateTime, Datelike, Duration, Local, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use super::base;
use crate::models::EventDate;

pub const DEFAULT_TIME: &str = "10:00 AM";

const DISPLAY_FORMAT: &str = "%A, %B %-d, %Y";
const CLOCK_FORMAT: &str = "%-I:%M %p";

static DATE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    base::compile_selectors(&[
        ".event-date",
        ".event-datetime",
        ".date-time",
        ".event-when",
        ".when",
        "time",
    ])
});
static LD_JSON_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("ld+json selector")
});
static EVENT_START_META: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="event:start_time"]"#).expect("event start meta")
});
static PUBLISHED_META: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="article:published_time"]"#).expect("published meta")
});
static URL_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-(\d{2})-(\d{2})$").expect("url date regex")
});

/// Fully resolved date and time-of-day for one event page.
#[derive(Debug, Clone)]
pub struct ResolvedDateTime {
    pub date: EventDate,
    pub time: String,
}

/// Date/time decoded from a `YYYY-MM-DD-HH-MM` trailing URL path segment.
#[derive(Debug, Clone)]
pub struct UrlDate {
    pub iso: String,
    pub display: String,
    pub time_of_day: NaiveTime,
}

struct DateParts {
    iso: String,
    display: String,
    time: String,
}

/// Ordered cascade of fallback tiers. Tiers 1 and 2 fill individual
/// sub-fields; tier 3 (JSON-LD) overwrites all three together when it runs
/// at all; tier 4 fills only the date. Anything still unset after that gets
/// the synthesized placeholder.
pub fn resolve_date_time(document: &Html, url: &str) -> ResolvedDateTime {
    let mut iso: Option<String> = None;
    let mut display: Option<String> = None;
    let mut time: Option<String> = None;

    // Tier 1: structured on-page element, "display date | time range".
    if let Some(text) = base::first_text_in(document, &DATE_SELECTORS) {
        let (date_part, time_part) = match text.split_once('|') {
            Some((left, right)) => (left.trim().to_string(), Some(right.trim().to_string())),
            None => (text.trim().to_string(), None),
        };
        if let Some(range) = time_part.filter(|t| !t.is_empty()) {
            time = Some(range);
        }
        if let Some(parsed) = parse_display_date(&date_part) {
            iso = Some(midnight_iso(parsed));
            display = Some(date_part);
        } else {
            tracing::debug!(text = %date_part, "on-page date text did not parse");
        }
    }

    // Tier 2: date encoded in the URL path.
    if iso.is_none() {
        if let Some(url_date) = decode_url_date(url) {
            iso = Some(url_date.iso);
            display = Some(url_date.display);
            if time.is_none() {
                time = Some(url_date.time_of_day.format(CLOCK_FORMAT).to_string());
            }
        }
    }

    // Tier 3: JSON-LD Event.startDate. Trusted as a unit, so it overwrites
    // date and time together, but it is only consulted while a gap remains.
    if iso.is_none() || time.is_none() {
        if let Some(parts) = jsonld_start_date(document) {
            iso = Some(parts.iso);
            display = Some(parts.display);
            time = Some(parts.time);
        }
    }

    // Tier 4: open-graph style meta tags, date only.
    if iso.is_none() {
        if let Some(parts) = meta_start_date(document) {
            iso = Some(parts.iso);
            display = Some(parts.display);
        }
    }

    let date = match (iso, display) {
        (Some(iso), Some(display)) => EventDate { display, iso },
        _ => {
            tracing::debug!(url, "no date found on page, synthesizing placeholder");
            fallback_date()
        }
    };

    ResolvedDateTime {
        date,
        time: time.unwrap_or_else(|| DEFAULT_TIME.to_string()),
    }
}

/// Decode a trailing `YYYY-MM-DD-HH-MM` path segment. Exact shape match
/// only; URLs that encode dates differently fall through to other tiers.
pub fn decode_url_date(url: &str) -> Option<UrlDate> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?
        .to_string();
    let caps = URL_DATE_RE.captures(&segment)?;

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    let hour: u32 = caps.get(4)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(5)?.as_str().parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time_of_day = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let start = Utc.from_utc_datetime(&date.and_time(time_of_day));

    Some(UrlDate {
        iso: start.to_rfc3339(),
        display: date.format(DISPLAY_FORMAT).to_string(),
        time_of_day,
    })
}

/// Placeholder used when every extraction tier fails: three calendar months
/// ahead of now, so the record stays schedulable and sorts into the future.
pub fn fallback_date() -> EventDate {
    let now = Utc::now();
    let future = now
        .checked_add_months(Months::new(3))
        .unwrap_or(now + Duration::days(90));
    EventDate {
        display: future.date_naive().format(DISPLAY_FORMAT).to_string(),
        iso: future.to_rfc3339(),
    }
}

fn jsonld_start_date(document: &Html) -> Option<DateParts> {
    for script in document.select(&LD_JSON_SELECTOR) {
        let raw = script.text().collect::<String>();
        // Malformed blocks are skipped, not fatal.
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            tracing::debug!("skipping unparseable ld+json block");
            continue;
        };
        if let Some(start) = event_start_from(&value) {
            if let Some(parts) = parse_start_date(&start) {
                return Some(parts);
            }
        }
    }
    None
}

fn event_start_from(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if is_event_node(map.get("@type")) {
                return map
                    .get("startDate")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            if let Some(Value::Array(graph)) = map.get("@graph") {
                return graph.iter().find_map(event_start_from);
            }
            None
        }
        Value::Array(items) => items.iter().find_map(event_start_from),
        _ => None,
    }
}

fn is_event_node(kind: Option<&Value>) -> bool {
    match kind {
        Some(Value::String(name)) => name == "Event",
        Some(Value::Array(names)) => names.iter().any(|n| n.as_str() == Some("Event")),
        _ => false,
    }
}

fn parse_start_date(input: &str) -> Option<DateParts> {
    let trimmed = input.trim();

    if let Ok(start) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(DateParts {
            iso: start.to_rfc3339(),
            display: start.date_naive().format(DISPLAY_FORMAT).to_string(),
            time: start.time().format(CLOCK_FORMAT).to_string(),
        });
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            let start = Utc.from_utc_datetime(&naive);
            return Some(DateParts {
                iso: start.to_rfc3339(),
                display: naive.date().format(DISPLAY_FORMAT).to_string(),
                time: naive.time().format(CLOCK_FORMAT).to_string(),
            });
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(DateParts {
            iso: midnight_iso(date),
            display: date.format(DISPLAY_FORMAT).to_string(),
            time: NaiveTime::MIN.format(CLOCK_FORMAT).to_string(),
        });
    }

    None
}

fn meta_start_date(document: &Html) -> Option<EventDate> {
    for selector in [&*EVENT_START_META, &*PUBLISHED_META] {
        if let Some(content) = base::meta_content(document, selector) {
            if let Some(parts) = parse_start_date(&content) {
                return Some(EventDate {
                    display: parts.display,
                    iso: parts.iso,
                });
            }
        }
    }
    None
}

/// Parse visible date text against common US event-page formats. Year-less
/// forms resolve to the next future occurrence.
fn parse_display_date(input: &str) -> Option<NaiveDate> {
    let cleaned = base::clean_text(input);
    if cleaned.is_empty() {
        return None;
    }

    let formats = [
        ("%B %d, %Y", true),
        ("%b %d, %Y", true),
        ("%A, %B %d, %Y", true),
        ("%A %B %d, %Y", true),
        ("%m/%d/%Y", true),
        ("%m/%d/%y", true),
        ("%Y-%m-%d", true),
        ("%B %d", false),
        ("%b %d", false),
    ];

    for (fmt, has_year) in formats.iter() {
        if let Ok(mut date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            if *has_year {
                return Some(date);
            }
            let current_year = Local::now().year();
            date = date.with_year(current_year)?;
            let today = Local::now().date_naive();
            if date < today {
                date = date.with_year(current_year + 1)?;
            }
            return Some(date);
        }
    }

    None
}

fn midnight_iso(date: NaiveDate) -> String {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
        .to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_trailing_url_date_segment() {
        let decoded = decode_url_date("https://example.com/events/2025-11-08-18-30")
            .expect("url date decodes");
        assert!(decoded.iso.starts_with("2025-11-08T18:30:00"));
        assert_eq!(decoded.display, "Saturday, November 8, 2025");
        assert_eq!(decoded.time_of_day.format(CLOCK_FORMAT).to_string(), "6:30 PM");
    }

    #[test]
    fn url_date_tolerates_trailing_slash() {
        let decoded = decode_url_date("https://example.com/events/2025-11-08-18-30/")
            .expect("url date decodes");
        assert!(decoded.iso.starts_with("2025-11-08T18:30:00"));
    }

    #[test]
    fn url_date_requires_exact_segment_shape() {
        assert!(decode_url_date("https://example.com/events/2025-11-08").is_none());
        assert!(decode_url_date("https://example.com/2025-11-08-18-30/extra").is_none());
        assert!(decode_url_date("https://example.com/events/2025-13-08-18-30").is_none());
        assert!(decode_url_date("not a url").is_none());
    }

    #[test]
    fn fallback_date_is_three_months_out() {
        let fallback = fallback_date();
        let parsed = DateTime::parse_from_rfc3339(&fallback.iso).expect("valid iso");
        let lower = Utc::now() + Duration::days(85);
        let upper = Utc::now() + Duration::days(95);
        assert!(parsed > lower && parsed < upper);
        assert!(!fallback.display.is_empty());
    }

    #[test]
    fn on_page_date_splits_display_and_time_range() {
        let document = Html::parse_document(
            r#"<div class="event-date">June 14, 2025 | 9:00 AM - 4:00 PM</div>"#,
        );
        let resolved = resolve_date_time(&document, "https://example.com/events/retreat");
        assert_eq!(resolved.date.display, "June 14, 2025");
        assert!(resolved.date.iso.starts_with("2025-06-14"));
        assert_eq!(resolved.time, "9:00 AM - 4:00 PM");
    }

    #[test]
    fn on_page_date_beats_jsonld_when_fully_resolved() {
        let document = Html::parse_document(
            r#"
            <div class="event-date">June 14, 2025 | 9:00 AM - 4:00 PM</div>
            <script type="application/ld+json">
            {"@type": "Event", "startDate": "2026-01-01T08:00:00Z"}
            </script>
            "#,
        );
        let resolved = resolve_date_time(&document, "https://example.com/events/retreat");
        assert!(resolved.date.iso.starts_with("2025-06-14"));
        assert_eq!(resolved.time, "9:00 AM - 4:00 PM");
    }

    #[test]
    fn jsonld_fills_all_three_fields_when_gaps_remain() {
        let document = Html::parse_document(
            r#"
            <script type="application/ld+json">
            {"@context": "https://schema.org", "@type": "Event",
             "startDate": "2025-09-20T14:30:00Z"}
            </script>
            "#,
        );
        let resolved = resolve_date_time(&document, "https://example.com/events/sit");
        assert!(resolved.date.iso.starts_with("2025-09-20T14:30:00"));
        assert_eq!(resolved.date.display, "Saturday, September 20, 2025");
        assert_eq!(resolved.time, "2:30 PM");
    }

    #[test]
    fn jsonld_event_found_inside_graph_array() {
        let document = Html::parse_document(
            r#"
            <script type="application/ld+json">
            {"@graph": [
                {"@type": "WebPage", "name": "irrelevant"},
                {"@type": "Event", "startDate": "2025-10-05T10:00:00Z"}
            ]}
            </script>
            "#,
        );
        let resolved = resolve_date_time(&document, "https://example.com/e");
        assert!(resolved.date.iso.starts_with("2025-10-05"));
    }

    #[test]
    fn malformed_jsonld_blocks_are_skipped() {
        let document = Html::parse_document(
            r#"
            <script type="application/ld+json">{not json at all</script>
            <script type="application/ld+json">
            {"@type": "Event", "startDate": "2025-12-01T09:00:00Z"}
            </script>
            "#,
        );
        let resolved = resolve_date_time(&document, "https://example.com/e");
        assert!(resolved.date.iso.starts_with("2025-12-01"));
    }

    #[test]
    fn meta_start_time_is_last_real_tier() {
        let document = Html::parse_document(
            r#"<head><meta property="event:start_time" content="2025-08-09T17:00:00Z"></head>"#,
        );
        let resolved = resolve_date_time(&document, "https://example.com/e");
        assert!(resolved.date.iso.starts_with("2025-08-09"));
        assert_eq!(resolved.date.display, "Saturday, August 9, 2025");
        // Tier 4 never sets the time of day.
        assert_eq!(resolved.time, DEFAULT_TIME);
    }

    #[test]
    fn everything_missing_yields_future_placeholder() {
        let document = Html::parse_document("<html><body><p>hello</p></body></html>");
        let resolved = resolve_date_time(&document, "https://example.com/events/sit");
        let parsed = DateTime::parse_from_rfc3339(&resolved.date.iso).expect("valid iso");
        assert!(parsed.with_timezone(&Utc) > Utc::now());
        assert_eq!(resolved.time, DEFAULT_TIME);
    }

    #[test]
    fn url_date_backfills_time_in_twelve_hour_clock() {
        let document = Html::parse_document("<html><body></body></html>");
        let resolved =
            resolve_date_time(&document, "https://example.com/events/2025-07-04-09-15");
        assert!(resolved.date.iso.starts_with("2025-07-04T09:15:00"));
        assert_eq!(resolved.date.display, "Friday, July 4, 2025");
        assert_eq!(resolved.time, "9:15 AM");
    }
}
