//! Language-preference transcript lookup with graceful degradation.

use async_trait::async_trait;

use crate::error::CaptionError;
use crate::types::{CaptionSegment, CaptionTrack};

/// Caption languages tried in order when none are configured.
pub const DEFAULT_LANGUAGES: &[&str] = &["ja", "en"];

/// Backend able to list and download caption tracks.
#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Lists every caption track available for `video_id`.
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, CaptionError>;

    /// Downloads the segments of one track.
    async fn fetch_segments(
        &self,
        video_id: &str,
        track: &CaptionTrack,
    ) -> Result<Vec<CaptionSegment>, CaptionError>;
}

/// Picks a caption track by language preference and flattens it to text.
pub struct TranscriptFetcher<S> {
    service: S,
    languages: Vec<String>,
}

impl<S: CaptionService> TranscriptFetcher<S> {
    pub fn new(service: S, languages: Vec<String>) -> Self {
        Self { service, languages }
    }

    pub fn with_default_languages(service: S) -> Self {
        Self::new(
            service,
            DEFAULT_LANGUAGES.iter().map(|l| (*l).to_string()).collect(),
        )
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Fetches the transcript for `video_id`, surfacing the failure cause.
    ///
    /// # Errors
    ///
    /// - [`CaptionError::Disabled`] when the video has no tracks.
    /// - [`CaptionError::NotFound`] when no track matches a preferred language.
    /// - Any transport or parse error from the service.
    pub async fn try_fetch_transcript(&self, video_id: &str) -> Result<String, CaptionError> {
        let tracks = self.service.list_tracks(video_id).await?;
        if tracks.is_empty() {
            return Err(CaptionError::Disabled {
                video_id: video_id.to_owned(),
            });
        }

        let track =
            select_track(&tracks, &self.languages).ok_or_else(|| CaptionError::NotFound {
                video_id: video_id.to_owned(),
                languages: self.languages.clone(),
            })?;

        tracing::debug!(video_id, lang = %track.lang_code, kind = ?track.kind, "fetching caption track");
        let segments = self.service.fetch_segments(video_id, track).await?;
        Ok(join_segments(&segments))
    }

    /// Fetches the transcript for `video_id`, or an empty string on any
    /// failure. Failures are logged at `warn` and never propagate.
    pub async fn fetch_transcript(&self, video_id: &str) -> String {
        match self.try_fetch_transcript(video_id).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    video_id,
                    error = %error_chain(&err),
                    "transcript unavailable \u{2014} continuing with empty transcript"
                );
                String::new()
            }
        }
    }
}

/// `err` followed by each of its sources, joined with `: `.
fn error_chain(err: &CaptionError) -> String {
    let mut rendered = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// First track whose language matches, walking `languages` in order.
///
/// An exact code (`ja`) beats a regional variant (`ja-JP`) of the same
/// language; within either, list order decides.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let regional_prefix = format!("{lang}-");
        tracks
            .iter()
            .find(|t| t.lang_code == *lang)
            .or_else(|| {
                tracks
                    .iter()
                    .find(|t| t.lang_code.starts_with(&regional_prefix))
            })
    })
}

fn join_segments(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
