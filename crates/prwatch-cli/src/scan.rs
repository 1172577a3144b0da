//! `prwatch scan`: channel uploads to PR video table.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use prwatch_captions::{CaptionService, TimedTextClient, TranscriptFetcher};
use prwatch_catalog::{CatalogClient, RetryPolicy};
use prwatch_core::{load_brand_dictionary, AppConfig, EnrichedRecord, VideoSummary};
use prwatch_detect::{classify, Analyzer, Extractor};

use crate::output;

#[derive(Debug, Clone)]
pub(crate) struct ScanOptions {
    pub channel_id: String,
    /// Takes precedence over `YOUTUBE_API_KEY`.
    pub api_key: Option<String>,
    pub max_videos: Option<usize>,
    /// Takes precedence over `PRWATCH_OUTPUT_DIR`.
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub(crate) struct ScanReport {
    pub scanned: usize,
    pub pr_videos: usize,
    pub path: PathBuf,
}

/// Runs the full scan for one channel and writes the PR table.
///
/// # Errors
///
/// Returns an error if no API key is available, the brand dictionary is
/// invalid, any catalog call fails (including exhausted retries), or the
/// table cannot be written. Transcript failures are not errors.
pub(crate) async fn run_scan(
    options: &ScanOptions,
    config: &AppConfig,
) -> anyhow::Result<ScanReport> {
    let api_key = options
        .api_key
        .as_deref()
        .or(config.youtube_api_key.as_deref())
        .ok_or_else(|| {
            anyhow::anyhow!("YOUTUBE_API_KEY is not set and --api-key was not given; cannot scan")
        })?;

    let retry = RetryPolicy::new(
        config.max_retries,
        Duration::from_secs(config.retry_backoff_base_secs),
    );
    let catalog = CatalogClient::with_base_url(
        api_key,
        config.request_timeout_secs,
        &config.user_agent,
        retry,
        &config.catalog_base_url,
    )
    .context("failed to build catalog client")?;
    let captions = TimedTextClient::with_base_url(
        config.request_timeout_secs,
        &config.user_agent,
        &config.captions_base_url,
    )
    .context("failed to build captions client")?;
    let fetcher = TranscriptFetcher::new(captions, config.caption_languages.clone());

    let dictionary = load_brand_dictionary(&config.brands_path)?;
    let analyzer = Analyzer::new(Extractor::with_heuristics(dictionary));

    let channel_id = options.channel_id.as_str();
    let feed_id = catalog
        .resolve_uploads_feed(channel_id)
        .await
        .with_context(|| format!("failed to resolve uploads feed for channel {channel_id}"))?;
    tracing::info!(channel_id, feed_id = %feed_id, "resolved uploads feed");

    let video_ids = catalog
        .list_video_ids(&feed_id, options.max_videos)
        .await
        .context("failed to list channel uploads")?;
    tracing::info!(count = video_ids.len(), max_videos = ?options.max_videos, "listed video IDs");

    let summaries = catalog
        .fetch_video_summaries(&video_ids)
        .await
        .context("failed to fetch video metadata")?;
    tracing::info!(count = summaries.len(), "fetched video metadata");

    let scanned = summaries.len();
    let records = assemble_records(summaries, &fetcher, &analyzer).await;

    let output_dir = options
        .output_dir
        .as_deref()
        .unwrap_or(config.output_dir.as_path());
    let path = output::write_records(output_dir, &records)?;
    tracing::info!(rows = records.len(), path = %path.display(), "wrote PR video table");

    Ok(ScanReport {
        scanned,
        pr_videos: records.len(),
        path,
    })
}

/// Classifies each video in order and builds a record for every PR video.
///
/// Transcripts are only fetched for PR videos; a missing transcript leaves
/// the record's transcript empty.
pub(crate) async fn assemble_records<S: CaptionService>(
    summaries: Vec<VideoSummary>,
    fetcher: &TranscriptFetcher<S>,
    analyzer: &Analyzer,
) -> Vec<EnrichedRecord> {
    let total = summaries.len();
    let mut records = Vec::new();
    let mut without_transcript = 0usize;

    for summary in summaries {
        let classification = classify(&summary);
        if !classification.is_pr {
            continue;
        }

        let transcript = fetcher.fetch_transcript(&summary.id).await;
        if transcript.is_empty() {
            without_transcript += 1;
        }
        records.push(analyzer.analyze(summary, classification, transcript));
    }

    tracing::info!(
        total,
        pr_videos = records.len(),
        without_transcript,
        "classified videos"
    );
    records
}
