//! HTTP client for the public timed-text caption endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::CaptionError;
use crate::fetcher::CaptionService;
use crate::parse::{parse_track_list, parse_transcript};
use crate::types::{CaptionSegment, CaptionTrack, TrackKind};

const DEFAULT_BASE_URL: &str = "https://www.youtube.com/";
const TIMEDTEXT_PATH: &str = "api/timedtext";

/// [`CaptionService`] backed by the `api/timedtext` XML endpoints.
pub struct TimedTextClient {
    client: Client,
    base_url: Url,
}

impl TimedTextClient {
    /// # Errors
    ///
    /// Returns [`CaptionError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, CaptionError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CaptionError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`CaptionError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, CaptionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CaptionError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    fn timedtext_url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self
            .base_url
            .join(TIMEDTEXT_PATH)
            .unwrap_or_else(|_| self.base_url.clone());
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    async fn get_text(&self, url: Url) -> Result<String, CaptionError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CaptionError::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CaptionError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response
            .text()
            .await
            .map_err(|e| CaptionError::Http(e.without_url()))
    }
}

#[async_trait]
impl CaptionService for TimedTextClient {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, CaptionError> {
        let url = self.timedtext_url(&[("type", "list"), ("v", video_id)]);
        let body = self.get_text(url).await?;
        parse_track_list(&body)
    }

    async fn fetch_segments(
        &self,
        video_id: &str,
        track: &CaptionTrack,
    ) -> Result<Vec<CaptionSegment>, CaptionError> {
        let mut params = vec![("v", video_id), ("lang", track.lang_code.as_str())];
        if !track.name.is_empty() {
            params.push(("name", track.name.as_str()));
        }
        if track.kind == TrackKind::Generated {
            params.push(("kind", "asr"));
        }
        let body = self.get_text(self.timedtext_url(&params)).await?;
        parse_transcript(&body)
    }
}
