use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

pub fn compile_selectors(sources: &[&str]) -> Vec<Selector> {
    sources
        .iter()
        .map(|source| Selector::parse(source).expect("valid selector"))
        .collect()
}

pub fn clean_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn inner_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Raw text of an element with line structure preserved, for content blocks
/// where paragraph boundaries matter.
pub fn block_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join("").trim().to_string()
}

/// First element matched by any selector in the ordered list.
pub fn first_element<'a>(document: &'a Html, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| document.select(selector).next())
}

/// Ordered-strategy text lookup: the first selector whose first match has
/// non-empty text wins. This is the core fallback idiom shared by every
/// field extractor.
pub fn first_text_in(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .map(inner_text)
            .filter(|text| !text.is_empty())
    })
}

/// Same fallback shape for attributes (image `src`, link `href`).
pub fn first_attr_in(document: &Html, selectors: &[Selector], attr: &str) -> Option<String> {
    selectors.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .and_then(|element| element.value().attr(attr))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

pub fn child_text(element: &ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        element
            .select(selector)
            .next()
            .map(inner_text)
            .filter(|text| !text.is_empty())
    })
}

pub fn child_element<'a>(
    element: &ElementRef<'a>,
    selectors: &[Selector],
) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| element.select(selector).next())
}

pub fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(clean_text)
        .filter(|content| !content.is_empty())
}

/// Full page text, lowercased once so extractors can run cheap substring
/// scans ("zoom", "retreat") against it.
pub fn body_text_lower(document: &Html) -> String {
    inner_text(document.root_element()).to_lowercase()
}

pub static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("og:title selector"));
pub static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:image"]"#).expect("og:image selector"));
pub static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).expect("meta description"));
