//! Raw platform JSON to value objects.
//!
//! Every accessor indexes through `serde_json::Value`, which yields `Null` for missing
//! keys, so absent intermediate objects fall through to the documented defaults.

use crate::duration::parse_duration_to_seconds;
use crate::error::{HotFinderError, Result};
use crate::models::{ChannelRecord, VideoRecord};
use chrono::{DateTime, Utc};
use serde_json::Value;

const VIDEO_THUMBNAIL_SIZES: [&str; 3] = ["medium", "default", "high"];
const CHANNEL_THUMBNAIL_SIZES: [&str; 3] = ["high", "medium", "default"];

pub fn map_video_item(item: &Value) -> VideoRecord {
    let snippet = &item["snippet"];
    let statistics = &item["statistics"];

    let language = [
        snippet["defaultLanguage"].as_str(),
        snippet["defaultAudioLanguage"].as_str(),
    ]
    .into_iter()
    .flatten()
    .find(|lang| !lang.is_empty())
    .unwrap_or("")
    .to_string();

    VideoRecord {
        id: item_id(item),
        title: text_field(&snippet["title"]),
        description: text_field(&snippet["description"]),
        channel_title: text_field(&snippet["channelTitle"]),
        thumbnail_url: thumbnail_url(snippet, &VIDEO_THUMBNAIL_SIZES),
        view_count: count_field(&statistics["viewCount"]),
        like_count: count_field(&statistics["likeCount"]),
        comment_count: count_field(&statistics["commentCount"]),
        published_at: timestamp_field(&snippet["publishedAt"]),
        duration_seconds: parse_duration_to_seconds(
            item["contentDetails"]["duration"].as_str().unwrap_or("PT0S"),
        ),
        language,
        hot_score: None,
        ranking: None,
    }
}

pub fn map_channel_item(item: &Value) -> ChannelRecord {
    let snippet = &item["snippet"];
    let statistics = &item["statistics"];

    ChannelRecord {
        id: item_id(item),
        title: text_field(&snippet["title"]),
        description: text_field(&snippet["description"]),
        thumbnail_url: thumbnail_url(snippet, &CHANNEL_THUMBNAIL_SIZES),
        subscriber_count: count_field(&statistics["subscriberCount"]),
        video_count: count_field(&statistics["videoCount"]),
        view_count: count_field(&statistics["viewCount"]),
        published_at: timestamp_field(&snippet["publishedAt"]),
        country: text_field(&snippet["country"]),
    }
}

/// The `items` array of a platform response.
///
/// A missing `items` key is an empty page; a non-object envelope is an error.
pub fn response_items(response: &Value) -> Result<&[Value]> {
    let envelope = response.as_object().ok_or_else(|| {
        HotFinderError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_type_name(response)
        ))
    })?;

    match envelope.get("items") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(HotFinderError::MalformedResponse(format!(
            "expected `items` to be an array, got {}",
            json_type_name(other)
        ))),
    }
}

pub fn map_video_items(response: &Value) -> Result<Vec<VideoRecord>> {
    Ok(response_items(response)?.iter().map(map_video_item).collect())
}

pub fn map_channel_items(response: &Value) -> Result<Vec<ChannelRecord>> {
    Ok(response_items(response)?
        .iter()
        .map(map_channel_item)
        .collect())
}

/// Video IDs from a `search` response (`items[].id.videoId`).
pub fn extract_video_ids(response: &Value) -> Result<Vec<String>> {
    Ok(response_items(response)?
        .iter()
        .filter_map(|item| item["id"]["videoId"].as_str())
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect())
}

/// Channel IDs from a `search` response, preferring `snippet.channelId`.
pub fn extract_channel_ids(response: &Value) -> Result<Vec<String>> {
    Ok(response_items(response)?
        .iter()
        .filter_map(|item| {
            item["snippet"]["channelId"]
                .as_str()
                .or_else(|| item["id"]["channelId"].as_str())
        })
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect())
}

fn item_id(item: &Value) -> String {
    // `videos`/`channels` return a plain string id; `search` nests it.
    match &item["id"] {
        Value::String(id) => id.clone(),
        nested => nested["videoId"]
            .as_str()
            .or_else(|| nested["channelId"].as_str())
            .unwrap_or("")
            .to_string(),
    }
}

fn text_field(value: &Value) -> String {
    value.as_str().unwrap_or("").to_string()
}

/// Statistics arrive as decimal strings; plain numbers are accepted as well.
fn count_field(value: &Value) -> u64 {
    match value {
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            })
            .unwrap_or(0),
        _ => 0,
    }
}

fn timestamp_field(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str()?.parse::<DateTime<Utc>>().ok()
}

fn thumbnail_url(snippet: &Value, sizes: &[&str]) -> String {
    sizes
        .iter()
        .find_map(|size| snippet["thumbnails"][*size]["url"].as_str())
        .unwrap_or("")
        .to_string()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
