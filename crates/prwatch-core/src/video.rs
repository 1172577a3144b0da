//! Video records as they move through the detection pipeline.
//!
//! [`VideoSummary`] is decoded once at the catalog boundary and never mutated.
//! Each later stage derives a value from it, and [`EnrichedRecord`] bundles
//! the whole chain into one output row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Catalog metadata for a single video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: String,
    pub published_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Outcome of the PR keyword scan.
///
/// `matched_keyword` holds the exact substring that triggered the flag and is
/// empty when `is_pr` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_pr: bool,
    pub matched_keyword: String,
}

impl ClassificationResult {
    #[must_use]
    pub fn not_pr() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pr(matched_keyword: impl Into<String>) -> Self {
        Self {
            is_pr: true,
            matched_keyword: matched_keyword.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub sponsor: String,
    pub product: String,
}

/// One fully assembled output row for a PR-flagged video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub video: VideoSummary,
    pub classification: ClassificationResult,
    pub transcript: String,
    pub extraction: ExtractionResult,
    /// Number of fields (title, description, transcript) containing the
    /// product verbatim. Always in `0..=3`.
    pub confidence_score: u8,
    pub video_url: String,
}

/// Canonical watch URL for a video ID.
#[must_use]
pub fn video_url(video_id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{video_id}")
}
