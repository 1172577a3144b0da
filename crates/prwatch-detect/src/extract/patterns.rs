//! Labeled-field patterns found in Japanese video descriptions.

use std::sync::LazyLock;

use regex::Regex;

/// Captures the value after `提供` up to the first line break or
/// ideographic comma/period. Spaces (ASCII and full-width) and an optional
/// `:`/`：` may separate label and value.
static SPONSOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"提供[ \t\u{3000}]*[:：]?[ \t\u{3000}]*([\w\u{3000}\u{3003}-\u{9FFF}\u{FF01}-\u{FF5E} \t]+)",
    )
    .expect("valid sponsor regex")
});

static PRODUCT_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:商品名|アイテム名)[ \t\u{3000}]*[:：]?[ \t\u{3000}]*([\w\u{3000}\u{3003}-\u{9FFF}\u{FF01}-\u{FF5E} \t]+)",
    )
    .expect("valid product label regex")
});

/// A bare separator (`提供：` followed by a line break) backtracks into the
/// capture, so separators are stripped along with whitespace.
fn trim_value(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == ':' || c == '：')
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| trim_value(m.as_str()))
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Sponsor named in a `提供：…` field, or an empty string.
#[must_use]
pub fn extract_sponsor(description: &str) -> String {
    first_capture(&SPONSOR_RE, description).unwrap_or_default()
}

/// Product named in a `商品名：…` / `アイテム名：…` field.
#[must_use]
pub fn labeled_product(description: &str) -> Option<String> {
    first_capture(&PRODUCT_LABEL_RE, description)
}
