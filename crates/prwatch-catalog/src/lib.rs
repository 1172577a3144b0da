//! Client for the video catalog service (YouTube Data API v3).
//!
//! Resolves a channel to its uploads feed, pages through the feed's video
//! IDs, and batch-fetches metadata. Every request goes through
//! [`retry::retry_with_backoff`], which absorbs rate-limit and forbidden
//! responses until the retry budget runs out.

pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::{CatalogClient, BATCH_SIZE, MAX_PAGES, PAGE_SIZE};
pub use error::CatalogError;
pub use retry::{backoff_delay, retry_with_backoff, RetryPolicy};
