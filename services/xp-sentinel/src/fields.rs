//! Selector-based profile field parsing
//!
//! Reads what the rendered page shows: the heading, the displayed XP counter
//! and the avatar image. Every lookup is best effort.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static XP_COUNTER: LazyLock<Selector> = LazyLock::new(|| selector("div._3WDmu.vKjpS ._2ydTi"));
static THUMBNAIL: LazyLock<Selector> =
    LazyLock::new(|| selector("img._3rgDV, div._4OXDk img"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("profile selectors are valid CSS")
}

/// Values read from the page markup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub title: Option<String>,
    pub xp: Option<i64>,
    pub thumbnail_url: Option<String>,
}

/// Parse title, displayed XP and thumbnail from a profile page
pub fn parse_profile_fields(document: &str) -> ProfileFields {
    let html = Html::parse_document(document);

    let title = html
        .select(&TITLE)
        .next()
        .map(stripped_text)
        .filter(|text| !text.is_empty());

    let xp = html
        .select(&XP_COUNTER)
        .next()
        .map(stripped_text)
        .and_then(|text| normalize_int(&text));

    let thumbnail_url = html
        .select(&THUMBNAIL)
        .next()
        .and_then(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty())
        .map(normalize_thumbnail_url);

    ProfileFields {
        title,
        xp,
        thumbnail_url,
    }
}

/// Text content with every text node trimmed and empty nodes dropped
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a displayed number, ignoring everything but digits and minus signs.
///
/// `"12,345"` is `12345`; `"abc"` and `""` are `None`.
pub fn normalize_int(value: &str) -> Option<i64> {
    let digits: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Turn a protocol-relative reference into an `https://` URL
pub fn normalize_thumbnail_url(src: &str) -> String {
    if src.starts_with("//") {
        format!("https:{}", src)
    } else {
        src.to_string()
    }
}
