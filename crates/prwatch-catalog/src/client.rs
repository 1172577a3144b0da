//! HTTP client for the YouTube Data API v3.
//!
//! Wraps `reqwest` with API key management, typed response decoding, and
//! per-request retry. Throttling responses (429/403) surface as
//! [`CatalogError::Throttled`] so that [`retry_with_backoff`] can absorb them.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use prwatch_core::VideoSummary;

use crate::error::CatalogError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::types::{ApiErrorEnvelope, ChannelListResponse, PlaylistItemsResponse, VideoListResponse};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Items per `playlistItems.list` page. Fixed by the service.
pub const PAGE_SIZE: usize = 50;

/// IDs per `videos.list` request. Fixed by the service.
pub const BATCH_SIZE: usize = 50;

/// Maximum number of feed pages before giving up on a cycling cursor.
///
/// Each page may be retried up to `max_retries` times, so the worst-case
/// request count is `MAX_PAGES * (1 + max_retries)`.
pub const MAX_PAGES: usize = 1_000;

/// Longest error-body excerpt carried in [`CatalogError::UnexpectedStatus`].
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Client for the video catalog service.
///
/// Use [`CatalogClient::new`] for production or
/// [`CatalogClient::with_base_url`] to point at a mock server in tests.
pub struct CatalogClient {
    client: Client,
    api_key: String,
    base_url: Url,
    retry: RetryPolicy,
}

impl CatalogClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, CatalogError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, retry, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`CatalogError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
        base_url: &str,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so that `Url::join` appends the endpoint
        // instead of replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            retry,
        })
    }

    /// Resolves a channel ID to the ID of its uploads feed.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidChannel`] if the channel lookup has no entries.
    /// - [`CatalogError::QuotaExceeded`] if throttling outlasts the retries.
    /// - [`CatalogError::UnexpectedStatus`], [`CatalogError::Http`],
    ///   [`CatalogError::Deserialize`] on other failures.
    pub async fn resolve_uploads_feed(&self, channel_id: &str) -> Result<String, CatalogError> {
        let response: ChannelListResponse = self
            .get_json(
                "channels",
                &[("part", "contentDetails"), ("id", channel_id)],
                &format!("channels(id={channel_id})"),
            )
            .await?;

        let channel = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::InvalidChannel(channel_id.to_owned()))?;

        let uploads = channel.content_details.related_playlists.uploads;
        tracing::debug!(channel_id, channel = %channel.id, uploads = %uploads, "resolved uploads feed");
        Ok(uploads)
    }

    /// Lists the video IDs of an uploads feed in feed order.
    ///
    /// Follows `nextPageToken` cursors until the feed is exhausted or
    /// `max_videos` IDs have been collected. The cap truncates mid-page, so
    /// the result holds exactly `min(max_videos, total)` IDs. Repeated IDs
    /// are kept only once.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::PaginationLimit`] after [`MAX_PAGES`] pages.
    /// - Any error from the underlying page request.
    pub async fn list_video_ids(
        &self,
        feed_id: &str,
        max_videos: Option<usize>,
    ) -> Result<Vec<String>, CatalogError> {
        if max_videos == Some(0) {
            return Ok(Vec::new());
        }

        let page_size = PAGE_SIZE.to_string();
        let mut ids: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(CatalogError::PaginationLimit {
                    feed_id: feed_id.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            let mut params = vec![
                ("part", "contentDetails"),
                ("playlistId", feed_id),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(token) = cursor.as_deref() {
                params.push(("pageToken", token));
            }

            let page: PlaylistItemsResponse = self
                .get_json(
                    "playlistItems",
                    &params,
                    &format!("playlistItems(playlistId={feed_id}, page={page_count})"),
                )
                .await?;

            for item in page.items {
                let video_id = item.content_details.video_id;
                if !seen.insert(video_id.clone()) {
                    tracing::debug!(video_id = %video_id, "duplicate video ID in uploads feed");
                    continue;
                }
                ids.push(video_id);
                if max_videos.is_some_and(|max| ids.len() >= max) {
                    tracing::debug!(pages = page_count, ids = ids.len(), "video cap reached");
                    return Ok(ids);
                }
            }

            tracing::debug!(page = page_count, ids = ids.len(), "fetched uploads page");

            cursor = page.next_page_token.filter(|token| !token.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        Ok(ids)
    }

    /// Fetches metadata for `video_ids` in batches of [`BATCH_SIZE`].
    ///
    /// IDs the service does not return (deleted, private) are simply absent
    /// from the result.
    ///
    /// # Errors
    ///
    /// Propagates any error from a batch request.
    pub async fn fetch_video_summaries(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoSummary>, CatalogError> {
        let mut summaries = Vec::with_capacity(video_ids.len());

        for (batch_index, batch) in video_ids.chunks(BATCH_SIZE).enumerate() {
            let joined = batch.join(",");
            let response: VideoListResponse = self
                .get_json(
                    "videos",
                    &[("part", "snippet,contentDetails"), ("id", &joined)],
                    &format!("videos(batch={batch_index}, ids={})", batch.len()),
                )
                .await?;

            let returned = response.items.len();
            if returned < batch.len() {
                tracing::debug!(
                    batch = batch_index,
                    requested = batch.len(),
                    returned,
                    "some requested videos were not returned"
                );
            }
            summaries.extend(response.items.into_iter().map(VideoSummary::from));
        }

        Ok(summaries)
    }

    /// Builds an endpoint URL with the API key and percent-encoded params.
    pub(crate) fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self
            .base_url
            .join(endpoint)
            .unwrap_or_else(|_| self.base_url.clone());
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    /// GETs `endpoint` with retry and decodes the JSON body into `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<T, CatalogError> {
        let url = self.build_url(endpoint, params);
        retry_with_backoff(&self.retry, || self.request_once(&url, endpoint, context)).await
    }

    /// Sends a single GET and maps the HTTP status onto [`CatalogError`].
    async fn request_once<T: DeserializeOwned>(
        &self,
        url: &Url,
        endpoint: &str,
        context: &str,
    ) -> Result<T, CatalogError> {
        // The query string carries the API key; strip the URL from transport errors.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::Http(e.without_url()))?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(CatalogError::Throttled {
                status: status.as_u16(),
                endpoint: endpoint.to_owned(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Http(e.without_url()))?;

        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint: endpoint.to_owned(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

/// Pulls `error.message` out of an API error body, falling back to a
/// truncated copy of the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
