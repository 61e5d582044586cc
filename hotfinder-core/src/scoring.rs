use crate::error::{HotFinderError, Result};
use crate::filter::hours_since_published;
use crate::models::VideoRecord;
use chrono::{DateTime, Utc};

/// One week, the window over which the recency weight decays.
const DECAY_WINDOW_HOURS: f64 = 168.0;
const MIN_TIME_WEIGHT: f64 = 0.1;
const VIEW_SCALE: f64 = 10.0;
const LIKE_RATIO_WEIGHT: f64 = 2.0;
const COMMENT_RATIO_WEIGHT: f64 = 1.5;

/// Recency window of the relevance score, in days.
const RELEVANCE_RECENCY_DAYS: f64 = 30.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Popularity heuristic: log-scaled views, decayed by age, boosted by engagement.
pub fn compute_hot_score(record: &VideoRecord, now: DateTime<Utc>) -> Result<f64> {
    let hours = hours_since_published(record, now).ok_or_else(|| {
        HotFinderError::Computation(format!("video '{}' has no publish time", record.id))
    })?;

    let views = record.view_count as f64;
    let engagement_base = views.max(1.0);

    let mut score = (views + 1.0).log10() * VIEW_SCALE;

    let time_weight = (1.0 - hours.max(0.0) / DECAY_WINDOW_HOURS).max(MIN_TIME_WEIGHT);
    score *= time_weight;

    let like_ratio = record.like_count as f64 / engagement_base;
    score *= 1.0 + like_ratio * LIKE_RATIO_WEIGHT;

    let comment_ratio = record.comment_count as f64 / engagement_base;
    score *= 1.0 + comment_ratio * COMMENT_RATIO_WEIGHT;

    if !score.is_finite() {
        return Err(HotFinderError::Computation(format!(
            "non-finite hot score for video '{}'",
            record.id
        )));
    }

    Ok((score * 100.0).round() / 100.0)
}

/// Fallback ordering key. A missing publish time contributes no recency.
pub fn compute_relevance_score(record: &VideoRecord, now: DateTime<Utc>) -> f64 {
    relevance_from_parts(
        record.view_count,
        record.like_count,
        record.comment_count,
        relevance_recency(record.published_at, now),
    )
}

pub(crate) fn relevance_recency(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    published_at
        .map(|published| {
            let days = (now - published).num_milliseconds() as f64 / MILLIS_PER_DAY;
            (RELEVANCE_RECENCY_DAYS - days).max(0.0)
        })
        .unwrap_or(0.0)
}

pub(crate) fn relevance_from_parts(views: u64, likes: u64, comments: u64, recency: f64) -> f64 {
    (views as f64 + 1.0).log10() * 0.4
        + (likes as f64 + 1.0).log10() * 0.3
        + recency * 0.2
        + (comments as f64 + 1.0).log10() * 0.1
}

/// Store the hot score on every record. Fails on the first unscorable record.
pub fn annotate_hot_scores(records: &mut [VideoRecord], now: DateTime<Utc>) -> Result<()> {
    for record in records.iter_mut() {
        record.hot_score = Some(compute_hot_score(record, now)?);
    }
    Ok(())
}
