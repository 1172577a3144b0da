use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prwatch_captions::{
    CaptionError, CaptionSegment, CaptionService, CaptionTrack, TrackKind, TranscriptFetcher,
};
use prwatch_core::{AppConfig, BrandDictionary, Environment, VideoSummary};
use prwatch_detect::{Analyzer, Extractor};

use super::*;
use crate::enrich::{enrich_row, run_enrich, Filled};
use crate::output::{read_rows, write_rows, OutputRow};
use crate::scan::{assemble_records, run_scan, ScanOptions};

// ---------------------------------------------------------------------------
// argument parsing
// ---------------------------------------------------------------------------

#[test]
fn parses_scan_with_defaults() {
    let cli = Cli::try_parse_from(["prwatch", "scan", "--channel", "UCabc"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Scan {
            ref channel,
            api_key: None,
            max_videos: None,
            output: None,
            debug: false,
        } if channel == "UCabc"
    ));
    assert!(!cli.debug());
}

#[test]
fn parses_scan_with_all_options() {
    let cli = Cli::try_parse_from([
        "prwatch",
        "scan",
        "--channel",
        "UCabc",
        "--api-key",
        "k",
        "--max-videos",
        "75",
        "--output",
        "out",
        "--debug",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Scan {
            api_key: Some(ref key),
            max_videos: Some(75),
            output: Some(ref dir),
            debug: true,
            ..
        } if key == "k" && dir == &PathBuf::from("out")
    ));
    assert!(cli.debug());
}

#[test]
fn scan_requires_channel() {
    assert!(Cli::try_parse_from(["prwatch", "scan"]).is_err());
}

#[test]
fn scan_rejects_non_numeric_cap() {
    assert!(
        Cli::try_parse_from(["prwatch", "scan", "--channel", "UC", "--max-videos", "all"])
            .is_err()
    );
}

#[test]
fn parses_enrich() {
    let cli = Cli::try_parse_from(["prwatch", "enrich", "--input", "in.csv"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Enrich { ref input, output: None } if input == &PathBuf::from("in.csv")
    ));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["prwatch"]).is_err());
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn test_config(dir: &Path, base_url: &str) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "debug".to_owned(),
        youtube_api_key: Some("test-key".to_owned()),
        brands_path: dir.join("brands.json"),
        output_dir: dir.join("output"),
        log_dir: dir.join("logs"),
        catalog_base_url: base_url.to_owned(),
        captions_base_url: base_url.to_owned(),
        caption_languages: vec!["ja".to_owned(), "en".to_owned()],
        request_timeout_secs: 5,
        user_agent: "prwatch-test/0.1".to_owned(),
        max_retries: 0,
        retry_backoff_base_secs: 0,
    }
}

fn summary(id: &str, title: &str, description: &str) -> VideoSummary {
    VideoSummary {
        id: id.to_owned(),
        published_at: Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap(),
        title: title.to_owned(),
        description: description.to_owned(),
        tags: Vec::new(),
    }
}

fn analyzer() -> Analyzer {
    Analyzer::new(Extractor::with_heuristics(BrandDictionary::from_terms([
        "ブランドX",
        "アイテムY",
    ])))
}

/// Serves one Japanese segment per known video; unknown videos have no
/// captions. Records which videos were asked for.
struct FakeCaptions {
    transcripts: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl FakeCaptions {
    fn new(transcripts: &[(&str, &str)]) -> Self {
        Self {
            transcripts: transcripts
                .iter()
                .map(|(id, text)| ((*id).to_owned(), (*text).to_owned()))
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CaptionService for FakeCaptions {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, CaptionError> {
        self.requested.lock().unwrap().push(video_id.to_owned());
        if self.transcripts.contains_key(video_id) {
            Ok(vec![CaptionTrack {
                lang_code: "ja".to_owned(),
                name: String::new(),
                kind: TrackKind::Generated,
            }])
        } else {
            Err(CaptionError::Disabled {
                video_id: video_id.to_owned(),
            })
        }
    }

    async fn fetch_segments(
        &self,
        video_id: &str,
        _track: &CaptionTrack,
    ) -> Result<Vec<CaptionSegment>, CaptionError> {
        Ok(vec![CaptionSegment {
            start_secs: 0.0,
            duration_secs: 1.0,
            text: self.transcripts[video_id].clone(),
        }])
    }
}

// ---------------------------------------------------------------------------
// assemble_records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn only_pr_videos_become_records_and_get_transcripts() {
    let fetcher = TranscriptFetcher::with_default_languages(FakeCaptions::new(&[
        ("pr1", "アイテムYを使ってみました"),
        ("plain", "普通の動画です"),
    ]));
    let summaries = vec![
        summary("pr1", "【PR】アイテムYレビュー", "提供：ブランドX\n◆商品名：アイテムY"),
        summary("plain", "PRIVATE vlog", "休日の過ごし方"),
        summary("pr2", "新作紹介", "◆ブランドX\n本日はタイアップ動画です"),
    ];

    let records = assemble_records(summaries, &fetcher, &analyzer()).await;

    let ids: Vec<&str> = records.iter().map(|r| r.video.id.as_str()).collect();
    assert_eq!(ids, vec!["pr1", "pr2"]);
    assert_eq!(
        *fetcher_requests(&fetcher),
        vec!["pr1".to_owned(), "pr2".to_owned()]
    );

    let first = &records[0];
    assert_eq!(first.transcript, "アイテムYを使ってみました");
    assert_eq!(first.extraction.sponsor, "ブランドX");
    assert_eq!(first.extraction.product, "アイテムY");
    assert_eq!(first.confidence_score, 3);
    assert_eq!(first.classification.matched_keyword, "PR");

    let second = &records[1];
    assert_eq!(second.transcript, "");
    assert_eq!(second.classification.matched_keyword, "タイアップ");
    assert_eq!(second.extraction.product, "ブランドX");
    assert_eq!(second.confidence_score, 1);
}

fn fetcher_requests(
    fetcher: &TranscriptFetcher<FakeCaptions>,
) -> std::sync::MutexGuard<'_, Vec<String>> {
    fetcher.service().requested.lock().unwrap()
}

#[tokio::test]
async fn no_pr_videos_yield_no_records() {
    let fetcher = TranscriptFetcher::with_default_languages(FakeCaptions::new(&[]));
    let summaries = vec![summary("a", "週末の散歩", "カフェ巡り")];
    assert!(assemble_records(summaries, &fetcher, &analyzer())
        .await
        .is_empty());
    assert!(fetcher_requests(&fetcher).is_empty());
}

// ---------------------------------------------------------------------------
// run_scan end to end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scan_writes_pr_table_from_remote_services() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = test_config(dir.path(), &server.uri());
    fs::write(&config.brands_path, r#"["ブランドX", "アイテムY"]"#).unwrap();

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", "UCchan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "UCchan", "contentDetails": { "relatedPlaylists": { "uploads": "UUchan" } } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "UUchan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "contentDetails": { "videoId": "v1" } },
                { "contentDetails": { "videoId": "v2" } }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1,v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "v1",
                    "snippet": {
                        "publishedAt": "2024-04-01T09:00:00Z",
                        "title": "【PR】アイテムYを一週間使ってみた",
                        "description": "提供：ブランドX\n◆商品名：アイテムY\n詳細は概要欄"
                    }
                },
                {
                    "id": "v2",
                    "snippet": {
                        "publishedAt": "2024-03-01T09:00:00Z",
                        "title": "PRIVATE room tour",
                        "description": "部屋紹介"
                    }
                }
            ]
        })))
        .mount(&server)
        .await;
    // No captions for anything: the transcript degrades to empty.
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let options = ScanOptions {
        channel_id: "UCchan".to_owned(),
        api_key: None,
        max_videos: None,
        output_dir: None,
    };
    let report = run_scan(&options, &config).await.expect("scan should succeed");

    assert_eq!(report.scanned, 2);
    assert_eq!(report.pr_videos, 1);
    assert_eq!(report.path, config.output_dir.join("pr_videos.csv"));

    let rows = read_rows(&report.path).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.video_id, "v1");
    assert_eq!(row.published_at, "2024-04-01T09:00:00Z");
    assert!(row.is_pr);
    assert_eq!(row.pr_keyword, "PR");
    assert_eq!(row.sponsor, "ブランドX");
    assert_eq!(row.product, "アイテムY");
    assert_eq!(row.transcript, "");
    assert_eq!(row.video_url, "https://www.youtube.com/watch?v=v1");
    assert_eq!(row.confidence_score, 2);
}

#[tokio::test]
async fn scan_without_api_key_fails_before_any_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("create temp dir");
    let mut config = test_config(dir.path(), &server.uri());
    config.youtube_api_key = None;

    let options = ScanOptions {
        channel_id: "UCchan".to_owned(),
        api_key: None,
        max_videos: None,
        output_dir: None,
    };
    let err = run_scan(&options, &config).await.unwrap_err();
    assert!(err.to_string().contains("YOUTUBE_API_KEY"));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn scan_aborts_on_unknown_channel_without_writing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = test_config(dir.path(), &server.uri());

    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let options = ScanOptions {
        channel_id: "UCmissing".to_owned(),
        api_key: Some("cli-key".to_owned()),
        max_videos: None,
        output_dir: None,
    };
    let err = run_scan(&options, &config).await.unwrap_err();
    assert!(format!("{err:#}").contains("UCmissing"));
    assert!(!config.output_dir.join("pr_videos.csv").exists());
}

// ---------------------------------------------------------------------------
// enrich
// ---------------------------------------------------------------------------

fn row(product: &str, sponsor: &str) -> OutputRow {
    OutputRow {
        video_id: "v1".to_owned(),
        published_at: "2024-04-01T09:00:00Z".to_owned(),
        title: "【PR】アイテムYレビュー".to_owned(),
        description: "提供：ブランドX\n◆商品名：アイテムY".to_owned(),
        transcript: String::new(),
        is_pr: true,
        pr_keyword: "PR".to_owned(),
        sponsor: sponsor.to_owned(),
        product: product.to_owned(),
        video_url: "https://www.youtube.com/watch?v=v1".to_owned(),
        confidence_score: 0,
    }
}

#[test]
fn enrich_fills_blank_cells_and_rescores() {
    let extractor = Extractor::with_heuristics(BrandDictionary::from_terms(["アイテムY"]));
    let (enriched, filled) = enrich_row(row("", ""), &extractor);
    assert_eq!(enriched.product, "アイテムY");
    assert_eq!(enriched.sponsor, "ブランドX");
    assert_eq!(enriched.confidence_score, 2);
    assert_eq!(
        filled,
        Filled {
            product: true,
            sponsor: true
        }
    );
}

#[test]
fn enrich_keeps_existing_values() {
    let extractor = Extractor::with_heuristics(BrandDictionary::from_terms(["アイテムY"]));
    let (enriched, filled) = enrich_row(row("レビュー", "手書きの提供元"), &extractor);
    assert_eq!(enriched.product, "レビュー");
    assert_eq!(enriched.sponsor, "手書きの提供元");
    assert_eq!(enriched.confidence_score, 1);
    assert_eq!(filled, Filled::default());
}

#[test]
fn enrich_treats_whitespace_cells_as_blank() {
    let extractor = Extractor::with_heuristics(BrandDictionary::from_terms(["アイテムY"]));
    let (enriched, filled) = enrich_row(row(" ", " \t"), &extractor);
    assert_eq!(enriched.product, "アイテムY");
    assert_eq!(enriched.sponsor, "ブランドX");
    assert_eq!(
        filled,
        Filled {
            product: true,
            sponsor: true
        }
    );
}

#[test]
fn whitespace_product_does_not_score() {
    let extractor = Extractor::with_heuristics(BrandDictionary::default());
    let mut input = row(" ", "x");
    input.title = "c d".to_owned();
    input.description = "a b".to_owned();
    let (enriched, filled) = enrich_row(input, &extractor);
    assert_eq!(enriched.product, "");
    assert_eq!(enriched.confidence_score, 0);
    assert!(!filled.product);
}

#[test]
fn run_enrich_round_trips_a_table() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = test_config(dir.path(), "http://127.0.0.1:9");
    let input = dir.path().join("in.csv");
    write_rows(&input, &[row("", ""), row("固定品", "")]).unwrap();

    let output = dir.path().join("out").join("enriched.csv");
    let report = run_enrich(&input, Some(&output), &config).expect("enrich should succeed");

    assert_eq!(report.rows, 2);
    assert_eq!(report.products_filled, 1);
    assert_eq!(report.sponsors_filled, 2);
    assert_eq!(report.path, output);

    let rows = read_rows(&output).unwrap();
    assert_eq!(rows[0].product, "アイテムY");
    assert_eq!(rows[1].product, "固定品");
    assert_eq!(rows[1].confidence_score, 0);
}

#[test]
fn run_enrich_defaults_to_output_dir() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = test_config(dir.path(), "http://127.0.0.1:9");
    let input = dir.path().join("in.csv");
    write_rows(&input, &[]).unwrap();

    let report = run_enrich(&input, None, &config).unwrap();
    assert_eq!(report.path, config.output_dir.join("pr_videos_enriched.csv"));
    assert!(report.path.exists());
}
