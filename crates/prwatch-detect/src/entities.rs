//! Named-entity recognition behind a pluggable trait.
//!
//! The extractor only relies on the label vocabulary: it keeps
//! [`EntityLabel::Organization`] and [`EntityLabel::Product`] spans and
//! filters them against the brand dictionary. Any model can be plugged in by
//! implementing [`EntityRecognizer`]; [`HeuristicRecognizer`] is the built-in
//! pattern-based fallback.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    Organization,
    Product,
    Person,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

impl Entity {
    #[must_use]
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }

    /// `true` for labels the product extractor considers.
    #[must_use]
    pub fn is_brand_like(&self) -> bool {
        matches!(self.label, EntityLabel::Organization | EntityLabel::Product)
    }
}

/// Finds named entities in free text.
///
/// Implementations must return entities in the order they occur in `text`;
/// repeated mentions are reported once per occurrence.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<Entity>;
}

/// Recognizer that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecognizer;

impl EntityRecognizer for NoopRecognizer {
    fn recognize(&self, _text: &str) -> Vec<Entity> {
        Vec::new()
    }
}

/// Corporate forms written before or after the company name, plus
/// capitalised Latin names followed by an English legal suffix.
static ORGANIZATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?:株式会社|有限会社|合同会社)[ \u{3000}]?[\p{Han}\p{Katakana}ー・A-Za-z0-9&]+",
        r"|[\p{Han}\p{Katakana}ー・A-Za-z0-9&]+[ \u{3000}]?(?:株式会社|有限会社|合同会社)",
        r"|\b[A-Z][A-Za-z0-9&]*(?: [A-Z][A-Za-z0-9&]*)* (?:Inc\.?|Corp\.?|Co\., Ltd\.|LLC|Ltd\.?)",
    ))
    .expect("valid organization regex")
});

/// Runs of capitalised Latin words (`Anker`, `Nintendo Switch`).
static LATIN_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][A-Za-z0-9&'+]+(?: [A-Z][A-Za-z0-9&'+]*)*\b")
        .expect("valid latin name regex")
});

/// Katakana runs of three or more, optionally with a Latin/digit tail
/// (`アイテムY`, `ブランドX2`).
static KATAKANA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Katakana}ー][\p{Katakana}ー・]{2,}[A-Za-z0-9]*")
        .expect("valid katakana regex")
});

/// Terms in Japanese corner brackets.
static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[「『]([^」』\n]{1,40})[」』]").expect("valid quoted regex"));

/// Latin words that start sentences or titles far more often than they name
/// a brand.
const LATIN_STOPWORDS: &[&str] = &[
    "A", "An", "And", "I", "It", "My", "No", "Of", "On", "Our", "PR", "So", "The", "This", "To",
    "We", "You", "Your",
];

/// Pattern-based recognizer for mixed Japanese/English descriptions.
///
/// Overlapping matches are resolved left to right, longest span first, so
/// each character belongs to at most one entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRecognizer;

struct Span {
    start: usize,
    end: usize,
    entity: Entity,
}

impl HeuristicRecognizer {
    fn collect_spans(text: &str) -> Vec<Span> {
        let mut spans = Vec::new();

        for m in ORGANIZATION_RE.find_iter(text) {
            spans.push(Span {
                start: m.start(),
                end: m.end(),
                entity: Entity::new(m.as_str().trim(), EntityLabel::Organization),
            });
        }

        for caps in QUOTED_RE.captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let inner = inner.as_str().trim();
            if inner.is_empty() {
                continue;
            }
            spans.push(Span {
                start: whole.start(),
                end: whole.end(),
                entity: Entity::new(inner, EntityLabel::Product),
            });
        }

        for m in LATIN_NAME_RE.find_iter(text) {
            if LATIN_STOPWORDS.contains(&m.as_str()) {
                continue;
            }
            spans.push(Span {
                start: m.start(),
                end: m.end(),
                entity: Entity::new(m.as_str(), EntityLabel::Organization),
            });
        }

        for m in KATAKANA_RE.find_iter(text) {
            spans.push(Span {
                start: m.start(),
                end: m.end(),
                entity: Entity::new(m.as_str(), EntityLabel::Product),
            });
        }

        spans
    }
}

impl EntityRecognizer for HeuristicRecognizer {
    fn recognize(&self, text: &str) -> Vec<Entity> {
        let mut spans = Self::collect_spans(text);
        // Stable: on identical spans the earlier pattern (organization) wins.
        spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut entities = Vec::new();
        let mut covered_until = 0usize;
        for span in spans {
            if span.start < covered_until {
                continue;
            }
            covered_until = span.end;
            entities.push(span.entity);
        }
        entities
    }
}
