use once_cell::sync::Lazy;
use regex::Regex;

/// Every record carries these two tags; detectors may add at most one more.
const DEFAULT_TAGS: [&str; 2] = ["Meditation", "Wellness"];
const MAX_TAGS: usize = 3;

static DETECTORS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\byoga\b", "Yoga"),
        (r"(?i)vipassana|insight", "Vipassana"),
        (r"(?i)retreat|weekend", "Retreat"),
        (r"(?i)workshop", "Workshop"),
        (r"(?i)\bzen\b", "Zen"),
        (r"(?i)compassion|metta|loving.kindness", "Compassion"),
        (r"(?i)breath(?:ing|work)?", "Breathwork"),
    ]
    .into_iter()
    .map(|(pattern, tag)| (Regex::new(pattern).expect("valid detector"), tag))
    .collect()
});

/// Seeded tags plus specialty tags detected in title and description.
/// Detector order is fixed, so it decides which tag wins near the cap.
pub fn detect_categories(title: &str, description: &str) -> Vec<String> {
    let haystack = format!("{title} {description}");
    let mut tags: Vec<String> = DEFAULT_TAGS.iter().map(|tag| tag.to_string()).collect();

    for (pattern, tag) in DETECTORS.iter() {
        if tags.len() >= MAX_TAGS {
            break;
        }
        if pattern.is_match(&haystack) && !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }

    tags
}
