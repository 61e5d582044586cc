use crate::models::{FilterConfiguration, VideoRecord, VideoType};
use chrono::{DateTime, Utc};
use log::debug;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Hours between publish time and `now`; `None` when the publish time is unknown.
pub fn hours_since_published(record: &VideoRecord, now: DateTime<Utc>) -> Option<f64> {
    record
        .published_at
        .map(|published| (now - published).num_milliseconds() as f64 / MILLIS_PER_HOUR)
}

/// Views per hour since publishing, with elapsed time floored at one hour.
pub fn views_per_hour(record: &VideoRecord, now: DateTime<Utc>) -> Option<f64> {
    hours_since_published(record, now).map(|hours| record.view_count as f64 / hours.max(1.0))
}

pub fn matches_filters(
    record: &VideoRecord,
    config: &FilterConfiguration,
    now: DateTime<Utc>,
) -> bool {
    if let Some(min_views) = config.min_views {
        if record.view_count < min_views {
            return false;
        }
    }

    if let Some(min_views_per_hour) = config.min_views_per_hour {
        match views_per_hour(record, now) {
            Some(rate) if rate >= min_views_per_hour => {}
            _ => return false,
        }
    }

    let threshold = config.shorts_duration_threshold_seconds;
    let type_matches = match config.video_type {
        VideoType::Shorts => record.duration_seconds <= threshold,
        VideoType::Normal => record.duration_seconds > threshold,
        VideoType::Both => true,
    };
    if !type_matches {
        return false;
    }

    if let Some(language) = config.language_filter() {
        if record.language != language {
            return false;
        }
    }

    true
}

/// Keep the records passing every configured predicate, in input order.
pub fn apply_filters(
    records: &[VideoRecord],
    config: &FilterConfiguration,
    now: DateTime<Utc>,
) -> Vec<VideoRecord> {
    let filtered: Vec<VideoRecord> = records
        .iter()
        .filter(|record| matches_filters(record, config, now))
        .cloned()
        .collect();

    debug!(
        "Filtered {} records down to {}",
        records.len(),
        filtered.len()
    );
    filtered
}
