//! The PR video table: one CSV row per flagged video.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::SecondsFormat;
use serde::{Deserialize, Deserializer, Serialize};

use prwatch_core::EnrichedRecord;

pub(crate) const OUTPUT_FILE_NAME: &str = "pr_videos.csv";

/// Header row; must stay in step with the field order of [`OutputRow`].
pub(crate) const COLUMNS: [&str; 11] = [
    "video_id",
    "published_at",
    "title",
    "description",
    "transcript",
    "is_pr",
    "pr_keyword",
    "sponsor",
    "product",
    "video_url",
    "confidence_score",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct OutputRow {
    pub video_id: String,
    pub published_at: String,
    pub title: String,
    pub description: String,
    pub transcript: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub is_pr: bool,
    pub pr_keyword: String,
    pub sponsor: String,
    pub product: String,
    pub video_url: String,
    #[serde(deserialize_with = "flexible_score")]
    pub confidence_score: u8,
}

impl From<&EnrichedRecord> for OutputRow {
    fn from(record: &EnrichedRecord) -> Self {
        Self {
            video_id: record.video.id.clone(),
            published_at: record
                .video
                .published_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            title: record.video.title.clone(),
            description: record.video.description.clone(),
            transcript: record.transcript.clone(),
            is_pr: record.classification.is_pr,
            pr_keyword: record.classification.matched_keyword.clone(),
            sponsor: record.extraction.sponsor.clone(),
            product: record.extraction.product.clone(),
            video_url: record.video_url.clone(),
            confidence_score: record.confidence_score,
        }
    }
}

/// Accepts `true`/`false` in any case as well as `1`/`0`, so tables that
/// went through a spreadsheet still load.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean value: {other}"
        ))),
    }
}

/// Accepts a blank cell as `0` and decimals such as `1.0`, rounded.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn flexible_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    if let Ok(score) = trimmed.parse::<u8>() {
        return Ok(score);
    }
    let value: f64 = trimmed.parse().map_err(|_| {
        serde::de::Error::custom(format!("invalid confidence score: {trimmed}"))
    })?;
    let rounded = value.round();
    if !(0.0..=f64::from(u8::MAX)).contains(&rounded) {
        return Err(serde::de::Error::custom(format!(
            "confidence score out of range: {trimmed}"
        )));
    }
    Ok(rounded as u8)
}

/// Writes `records` to `<output_dir>/pr_videos.csv`, creating the directory.
pub(crate) fn write_records(
    output_dir: &Path,
    records: &[EnrichedRecord],
) -> anyhow::Result<PathBuf> {
    let path = output_dir.join(OUTPUT_FILE_NAME);
    let rows: Vec<OutputRow> = records.iter().map(OutputRow::from).collect();
    write_rows(&path, &rows)?;
    Ok(path)
}

/// Writes the header followed by `rows` in the given order.
pub(crate) fn write_rows(path: &Path, rows: &[OutputRow]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    // Header written by hand so that an empty table still has one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to open {} for writing", path.display()))?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub(crate) fn read_rows(path: &Path) -> anyhow::Result<Vec<OutputRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    reader
        .deserialize::<OutputRow>()
        .enumerate()
        .map(|(index, row)| {
            row.with_context(|| format!("invalid row {} in {}", index + 1, path.display()))
        })
        .collect()
}
