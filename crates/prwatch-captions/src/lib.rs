//! Transcript acquisition for PR-flagged videos.
//!
//! [`CaptionService`] abstracts the captioning backend; [`TimedTextClient`]
//! is the HTTP implementation. [`TranscriptFetcher`] applies the language
//! preference order and turns every failure into an empty transcript.

pub mod client;
pub mod error;
pub mod fetcher;
pub mod parse;
pub mod types;

pub use client::TimedTextClient;
pub use error::CaptionError;
pub use fetcher::{CaptionService, TranscriptFetcher, DEFAULT_LANGUAGES};
pub use types::{CaptionSegment, CaptionTrack, TrackKind};
