//! Keyword-based PR (sponsored content) classification.
//!
//! Bare tokens (`PR`, `案件`, `提供`, `タイアップ`) must stand alone: neither
//! neighbour may be an ASCII letter, digit or underscore, so `PRIVATE` and
//! `APR` are ignored while `【PR】` and `PR案件` still count. Hashtag forms and
//! the English phrases match anywhere.

use std::sync::LazyLock;

use regex::Regex;

use prwatch_core::{ClassificationResult, VideoSummary};

/// Hashtags and phrases come first so that `#PR` is reported as the hashtag,
/// not as the bare token behind it.
static PR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#PR|#提供|sponsored|paid promotion|PR|案件|提供|タイアップ")
        .expect("valid PR keyword regex")
});

/// Classifies a video by scanning title, description, then each tag.
///
/// The first field containing a keyword decides; its matched text is kept
/// for auditing.
#[must_use]
pub fn classify(summary: &VideoSummary) -> ClassificationResult {
    let fields = [summary.title.as_str(), summary.description.as_str()]
        .into_iter()
        .chain(summary.tags.iter().map(String::as_str));

    for field in fields {
        if let Some(keyword) = find_pr_keyword(field) {
            tracing::debug!(video_id = %summary.id, keyword, "PR keyword matched");
            return ClassificationResult::pr(keyword);
        }
    }
    ClassificationResult::not_pr()
}

/// Returns the first PR keyword occurrence in `text` that satisfies the
/// boundary rule.
#[must_use]
pub fn find_pr_keyword(text: &str) -> Option<&str> {
    PR_PATTERN
        .find_iter(text)
        .find(|m| !is_bare_token(m.as_str()) || stands_alone(text, m.start(), m.end()))
        .map(|m| m.as_str())
}

fn is_bare_token(token: &str) -> bool {
    !token.starts_with('#')
        && !token.eq_ignore_ascii_case("sponsored")
        && !token.eq_ignore_ascii_case("paid promotion")
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `true` when the characters around `text[start..end]` are not word chars.
fn stands_alone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}
