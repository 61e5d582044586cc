use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHORTS_THRESHOLD_SECONDS: u64 = 180;

/// A video after mapping. `hot_score` and `ranking` are filled in later stages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub thumbnail_url: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub published_at: Option<DateTime<Utc>>,
    pub duration_seconds: u64,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
    pub published_at: Option<DateTime<Utc>>,
    pub country: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    Shorts,
    Normal,
    #[default]
    Both,
}

fn default_shorts_threshold() -> u64 {
    DEFAULT_SHORTS_THRESHOLD_SECONDS
}

/// Independent filter predicates. `None` means "no constraint".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfiguration {
    #[serde(default)]
    pub min_views: Option<u64>,
    #[serde(default)]
    pub min_views_per_hour: Option<f64>,
    #[serde(default)]
    pub video_type: VideoType,
    #[serde(default = "default_shorts_threshold", alias = "shortsDuration")]
    pub shorts_duration_threshold_seconds: u64,
    #[serde(default)]
    pub language: Option<String>,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        FilterConfiguration {
            min_views: None,
            min_views_per_hour: None,
            video_type: VideoType::Both,
            shorts_duration_threshold_seconds: DEFAULT_SHORTS_THRESHOLD_SECONDS,
            language: None,
        }
    }
}

impl FilterConfiguration {
    /// Filter set the dashboard starts with before anything is saved.
    pub fn dashboard_defaults() -> Self {
        FilterConfiguration {
            min_views: Some(20_000),
            min_views_per_hour: Some(600.0),
            video_type: VideoType::Both,
            shorts_duration_threshold_seconds: DEFAULT_SHORTS_THRESHOLD_SECONDS,
            language: Some("ko".to_string()),
        }
    }

    /// Configured language, treating an empty string as unset.
    pub fn language_filter(&self) -> Option<&str> {
        self.language.as_deref().filter(|lang| !lang.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Keyword,
    Channel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub query: String,
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteChannel {
    #[serde(flatten)]
    pub channel: ChannelRecord,
    pub added_at: DateTime<Utc>,
}
