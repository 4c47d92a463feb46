use thiserror::Error;

/// Failures surfaced by the CMS client.
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("CMS error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid request url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl CmsError {
    /// Status code for HTTP failures, `None` for transport and decoding errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
