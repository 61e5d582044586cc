//! Collaborator seams: the platform transport and the credential source.

use crate::error::{HotFinderError, Result};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Video,
    Channel,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Video => "video",
            ResourceKind::Channel => "channel",
        }
    }
}

/// Parameters of one platform search call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformSearch {
    pub query: String,
    pub kind: ResourceKind,
    pub max_results: u32,
    pub region_code: Option<String>,
    pub relevance_language: Option<String>,
    pub order: Option<String>,
}

impl PlatformSearch {
    pub fn videos(query: &str, max_results: u32) -> Self {
        PlatformSearch {
            query: query.to_string(),
            kind: ResourceKind::Video,
            max_results,
            region_code: None,
            relevance_language: None,
            order: None,
        }
    }

    pub fn channels(query: &str, max_results: u32) -> Self {
        PlatformSearch {
            kind: ResourceKind::Channel,
            ..Self::videos(query, max_results)
        }
    }
}

/// Transport to the video platform. Implementations return the raw response JSON and
/// classify failures into `KeyInvalid`, `QuotaExceeded` or `Transport`.
#[async_trait]
pub trait VideoPlatformClient: Send + Sync {
    async fn search(&self, request: &PlatformSearch) -> Result<Value>;

    /// Batch of video items with snippet, statistics and contentDetails.
    async fn video_details(&self, ids: &[String]) -> Result<Value>;

    /// Batch of channel items with snippet and statistics.
    async fn channel_details(&self, ids: &[String]) -> Result<Value>;

    /// The platform's most-popular chart for a region and category.
    async fn most_popular(&self, region_code: &str, category_id: &str, max_results: u32)
        -> Result<Value>;
}

pub trait CredentialProvider: Send + Sync {
    fn api_key(&self) -> Result<String>;
}

/// A key fixed at startup, possibly absent.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential {
    key: Option<String>,
}

impl StaticCredential {
    pub fn new(key: Option<String>) -> Self {
        StaticCredential {
            key: key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()),
        }
    }
}

impl CredentialProvider for StaticCredential {
    fn api_key(&self) -> Result<String> {
        self.key.clone().ok_or(HotFinderError::MissingCredential)
    }
}
