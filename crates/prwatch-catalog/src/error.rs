use thiserror::Error;

/// Errors returned by the catalog client.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error")]
    Http(#[from] reqwest::Error),

    /// HTTP 429 or 403 from the catalog service. Retried with back-off.
    #[error("throttled by catalog service (HTTP {status}) on {endpoint}")]
    Throttled { status: u16, endpoint: String },

    /// Throttling persisted through every retry.
    #[error("catalog quota exceeded: still throttled after {attempts} attempts")]
    QuotaExceeded { attempts: u32 },

    /// The channel lookup returned no entries.
    #[error("channel not found or invalid: {0}")]
    InvalidChannel(String),

    #[error("unexpected HTTP status {status} from {endpoint}: {message}")]
    UnexpectedStatus {
        status: u16,
        endpoint: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached for feed {feed_id}: exceeded {max_pages} pages")]
    PaginationLimit { feed_id: String, max_pages: usize },

    #[error("invalid catalog base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
