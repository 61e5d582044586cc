//! Stable multi-key sorting, ranking annotation and sort statistics.

use crate::error::{HotFinderError, Result};
use crate::models::{ChannelRecord, VideoRecord};
use crate::scoring::{compute_relevance_score, relevance_from_parts, relevance_recency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Relevance,
    ViewCount,
    LikeCount,
    CommentCount,
    HotScore,
    SubscriberCount,
    DurationSeconds,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::ViewCount => "viewCount",
            SortKey::LikeCount => "likeCount",
            SortKey::CommentCount => "commentCount",
            SortKey::HotScore => "hotScore",
            SortKey::SubscriberCount => "subscriberCount",
            SortKey::DurationSeconds => "durationSeconds",
        }
    }
}

impl FromStr for SortKey {
    type Err = HotFinderError;

    fn from_str(key: &str) -> Result<Self> {
        match key {
            "relevance" => Ok(SortKey::Relevance),
            "viewCount" | "views" => Ok(SortKey::ViewCount),
            "likeCount" | "likes" => Ok(SortKey::LikeCount),
            "commentCount" | "comments" => Ok(SortKey::CommentCount),
            "hotScore" | "hot_score" => Ok(SortKey::HotScore),
            "subscriberCount" | "subscribers" => Ok(SortKey::SubscriberCount),
            "durationSeconds" | "duration" => Ok(SortKey::DurationSeconds),
            other => Err(HotFinderError::UnsupportedSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = HotFinderError;

    fn from_str(order: &str) -> Result<Self> {
        match order {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(HotFinderError::UnsupportedSortOrder(other.to_string())),
        }
    }
}

/// Named sort shortcuts offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPreset {
    Popular,
    Newest,
    Shortest,
    Longest,
    MostSubscribed,
}

impl SortPreset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "popular" => Some(SortPreset::Popular),
            "newest" => Some(SortPreset::Newest),
            "shortest" => Some(SortPreset::Shortest),
            "longest" => Some(SortPreset::Longest),
            "mostSubscribed" => Some(SortPreset::MostSubscribed),
            _ => None,
        }
    }

    pub fn sort(&self) -> (SortKey, SortOrder) {
        match self {
            SortPreset::Popular => (SortKey::ViewCount, SortOrder::Desc),
            SortPreset::Newest => (SortKey::Relevance, SortOrder::Desc),
            SortPreset::Shortest => (SortKey::DurationSeconds, SortOrder::Asc),
            SortPreset::Longest => (SortKey::DurationSeconds, SortOrder::Desc),
            SortPreset::MostSubscribed => (SortKey::SubscriberCount, SortOrder::Desc),
        }
    }
}

/// A record the sort engine can order. Keys a record type does not carry read as 0.
pub trait Rankable {
    fn sort_value(&self, key: SortKey, now: DateTime<Utc>) -> f64;
}

impl Rankable for VideoRecord {
    fn sort_value(&self, key: SortKey, now: DateTime<Utc>) -> f64 {
        match key {
            SortKey::Relevance => compute_relevance_score(self, now),
            SortKey::ViewCount => self.view_count as f64,
            SortKey::LikeCount => self.like_count as f64,
            SortKey::CommentCount => self.comment_count as f64,
            SortKey::HotScore => self.hot_score.unwrap_or(0.0),
            SortKey::SubscriberCount => 0.0,
            SortKey::DurationSeconds => self.duration_seconds as f64,
        }
    }
}

impl Rankable for ChannelRecord {
    fn sort_value(&self, key: SortKey, now: DateTime<Utc>) -> f64 {
        match key {
            SortKey::Relevance => relevance_from_parts(
                self.view_count,
                0,
                0,
                relevance_recency(self.published_at, now),
            ),
            SortKey::ViewCount => self.view_count as f64,
            SortKey::SubscriberCount => self.subscriber_count as f64,
            SortKey::LikeCount
            | SortKey::CommentCount
            | SortKey::HotScore
            | SortKey::DurationSeconds => 0.0,
        }
    }
}

pub fn compare_with_order_float(a: f64, b: f64, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        SortOrder::Desc => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Stable sort. Descending compares directly, so equal keys keep their input order.
pub fn sort_records<T: Rankable + Clone>(
    records: &[T],
    key: SortKey,
    order: SortOrder,
    now: DateTime<Utc>,
) -> Vec<T> {
    let mut keyed: Vec<(f64, &T)> = records
        .iter()
        .map(|record| (record.sort_value(key, now), record))
        .collect();

    keyed.sort_by(|a, b| compare_with_order_float(a.0, b.0, order));

    keyed.into_iter().map(|(_, record)| record.clone()).collect()
}

/// [`sort_records`] with the key and order given by name.
pub fn sort_records_by_name<T: Rankable + Clone>(
    records: &[T],
    key: &str,
    order: &str,
    now: DateTime<Utc>,
) -> Result<Vec<T>> {
    let key = key.parse::<SortKey>()?;
    let order = order.parse::<SortOrder>()?;
    Ok(sort_records(records, key, order, now))
}

pub fn assign_rankings(records: &mut [VideoRecord]) {
    for (index, record) in records.iter_mut().enumerate() {
        record.ranking = Some(index + 1);
    }
}

/// Descending sort by `key` followed by ranking annotation.
pub fn rank_videos(records: &[VideoRecord], key: SortKey, now: DateTime<Utc>) -> Vec<VideoRecord> {
    let mut ranked = sort_records(records, key, SortOrder::Desc, now);
    assign_rankings(&mut ranked);
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortStats {
    pub count: usize,
    pub sort_by: SortKey,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: i64,
}

pub fn sort_stats<T: Rankable>(records: &[T], key: SortKey, now: DateTime<Utc>) -> SortStats {
    let values: Vec<f64> = records.iter().map(|r| r.sort_value(key, now)).collect();

    if values.is_empty() {
        return SortStats {
            count: 0,
            sort_by: key,
            min: None,
            max: None,
            average: 0,
        };
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let average = values.iter().sum::<f64>() / values.len() as f64;

    SortStats {
        count: values.len(),
        sort_by: key,
        min: Some(min),
        max: Some(max),
        average: average.round() as i64,
    }
}
