use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("HTTP error")]
    Http(#[from] reqwest::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The video exposes no caption tracks at all.
    #[error("captions are disabled for video {video_id}")]
    Disabled { video_id: String },

    /// Tracks exist, but none in the requested languages.
    #[error("no caption track for video {video_id} in languages {languages:?}")]
    NotFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid captions base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
