//! Repository traits describing content adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{Article, Candidate, HomeContent, News, Priority};

/// Failure of a single backend round trip.
///
/// `Clone` so one cached outcome can be handed to every caller waiting on a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },
    #[error("error response from api: {status}")]
    Status { status: u16 },
    #[error("backend reported errors: {}", .messages.join("; "))]
    Backend { messages: Vec<String> },
    #[error("failed to parse response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Read access to the site's content backend.
///
/// Each method is one backend query. Callers are expected to memoize results; the
/// repository itself never caches.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn home(&self) -> Result<HomeContent, FetchError>;
    async fn candidates(&self) -> Result<Vec<Candidate>, FetchError>;
    async fn priorities(&self) -> Result<Vec<Priority>, FetchError>;
    async fn news(&self) -> Result<Vec<News>, FetchError>;
    async fn disclaimer(&self) -> Result<String, FetchError>;
    /// `Ok(None)` when no article matches `slug`.
    async fn article_by_slug(&self, slug: &str) -> Result<Option<Article>, FetchError>;
}
