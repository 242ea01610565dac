use chrono::{DateTime, Utc};
use retreat_scrape::{extract_event, LocationType};

const RICH_HTML: &str = r#"
<html>
<head>
    <meta property="og:title" content="Sunrise Meditation">
    <meta property="og:image" content="https://cdn.example.com/sunrise.jpg">
    <meta name="description" content="unused, content container wins">
</head>
<body>
    <h1>Different Heading</h1>
    <div class="event-date">March 21, 2026 | 6:00 AM - 8:00 AM</div>
    <div class="event-description">
        <p>Greet the day with a guided sit.</p>
        <p>Suggested donation: $85 for the teacher.</p>
    </div>
</body>
</html>
"#;

#[test]
fn og_title_beats_heading_content() {
    let event = extract_event(RICH_HTML, "https://example.com/events/sunrise").unwrap();
    assert_eq!(event.title, "Sunrise Meditation");
}

#[test]
fn suggested_donation_sets_price_when_no_price_element() {
    let event = extract_event(RICH_HTML, "https://example.com/events/sunrise").unwrap();
    assert_eq!(event.price, 85.0);
    assert_eq!(event.price_display, "$85");
}

#[test]
fn extraction_is_deterministic_except_remaining() {
    let url = "https://example.com/events/sunrise";
    let first = extract_event(RICH_HTML, url).unwrap();
    let second = extract_event(RICH_HTML, url).unwrap();

    let mut a = serde_json::to_value(&first).unwrap();
    let mut b = serde_json::to_value(&second).unwrap();
    a.as_object_mut().unwrap().remove("remaining");
    b.as_object_mut().unwrap().remove("remaining");
    assert_eq!(a, b);
}

#[test]
fn booking_link_is_an_exact_echo() {
    let url = "https://example.com/Events/Sunrise/?utm_source=Mail&frag=1#top";
    let event = extract_event(RICH_HTML, url).unwrap();
    assert_eq!(event.booking_link, url);
}

#[test]
fn category_count_always_between_two_and_three() {
    let pages = [
        "<html><body><p>nothing detectable</p></body></html>",
        "<html><body><article><p>yoga zen vipassana breathwork retreat workshop metta weekend insight</p></article></body></html>",
    ];
    for html in pages {
        let event = extract_event(html, "https://example.com/e").unwrap();
        assert!(
            (2..=3).contains(&event.category.len()),
            "got {:?}",
            event.category
        );
        let mut unique = event.category.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), event.category.len());
    }
}

#[test]
fn structured_page_date_wins_over_conflicting_jsonld() {
    let html = r#"
    <html><body>
        <div class="event-date">March 21, 2026 | 6:00 AM - 8:00 AM</div>
        <script type="application/ld+json">
        {"@type": "Event", "startDate": "2027-12-31T23:00:00Z"}
        </script>
    </body></html>
    "#;
    let event = extract_event(html, "https://example.com/e").unwrap();
    assert!(event.date.iso.starts_with("2026-03-21"));
    assert_eq!(event.date.display, "March 21, 2026");
    assert_eq!(event.time, "6:00 AM - 8:00 AM");
}

#[test]
fn dateless_page_synthesizes_future_date_and_default_time() {
    let html = "<html><body><p>no dates here</p></body></html>";
    let event = extract_event(html, "https://example.com/events/mystery").unwrap();

    let parsed = DateTime::parse_from_rfc3339(&event.date.iso).expect("valid iso");
    assert!(parsed.with_timezone(&Utc) > Utc::now());
    assert!(!event.date.display.is_empty());
    assert_eq!(event.time, "10:00 AM");
}

#[test]
fn zoom_mention_flags_location_online() {
    let html = "<html><body><p>We will meet over Zoom this month.</p></body></html>";
    let event = extract_event(html, "https://example.com/e").unwrap();
    assert_eq!(event.location.kind, LocationType::Online);
}

#[test]
fn record_serializes_with_spec_field_names() {
    let event = extract_event(RICH_HTML, "https://example.com/events/sunrise").unwrap();
    let json = serde_json::to_value(&event).unwrap();
    let object = json.as_object().unwrap();

    for key in [
        "title",
        "description",
        "image",
        "date",
        "time",
        "location",
        "instructor",
        "price",
        "priceDisplay",
        "capacity",
        "remaining",
        "category",
        "bookingLink",
        "source",
    ] {
        assert!(object.contains_key(key), "missing key {key}");
    }
    assert_eq!(json["location"]["type"], "venue");
    assert_eq!(json["source"], "url-import");
    assert!(json["date"]["iso"].as_str().is_some());
    assert!(json["date"]["display"].as_str().is_some());
}
