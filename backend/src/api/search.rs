use crate::models::{
    ApiResult, ChannelSearchRequest, ChannelSearchResponse, KeywordSearchRequest, PopularRequest,
    SuggestionsRequest, VideoSearchResponse,
};
use crate::AppState;
use hotfinder_core::models::VideoRecord;
use hotfinder_core::orchestrator::SearchOptions;
use hotfinder_core::ranking::{sort_records, sort_stats, SortKey, SortOrder, SortPreset};
use hotfinder_core::{HotFinderError, Result};
use log::info;
use rocket::serde::json::Json;
use rocket::{get, post, State};

/// A preset wins over explicit key/order; both default to relevance, descending.
pub fn resolve_sort(
    preset: Option<&str>,
    sort_by: Option<&str>,
    sort_order: Option<&str>,
) -> Result<(SortKey, SortOrder)> {
    if let Some(name) = preset {
        return SortPreset::from_name(name)
            .map(|preset| preset.sort())
            .ok_or_else(|| HotFinderError::InvalidQuery(format!("unknown sort preset '{name}'")));
    }

    let key = sort_by.map(str::parse::<SortKey>).transpose()?.unwrap_or_default();
    let order = sort_order.map(str::parse::<SortOrder>).transpose()?.unwrap_or_default();
    Ok((key, order))
}

fn video_response(state: &AppState, videos: Vec<VideoRecord>, key: SortKey) -> VideoSearchResponse {
    let stats = sort_stats(&videos, key, state.orchestrator.now());
    VideoSearchResponse {
        total: videos.len(),
        videos,
        stats,
    }
}

#[post("/search/keyword", format = "json", data = "<request>")]
pub async fn search_keyword(
    request: Json<KeywordSearchRequest>,
    state: &State<AppState>,
) -> ApiResult<Json<VideoSearchResponse>> {
    let request = request.into_inner();
    let (sort_key, sort_order) = resolve_sort(
        request.preset.as_deref(),
        request.sort_by.as_deref(),
        request.sort_order.as_deref(),
    )?;

    let options = SearchOptions {
        filters: request
            .filters
            .unwrap_or_else(|| state.preferences.filters()),
        sort_key,
        sort_order,
        region_code: request.region_code,
        max_results: request.max_results,
    };

    let videos = state
        .orchestrator
        .search_keyword(&request.keyword, &options)
        .await?;
    Ok(Json(video_response(state, videos, sort_key)))
}

#[post("/search/channel", format = "json", data = "<request>")]
pub async fn search_channel(
    request: Json<ChannelSearchRequest>,
    state: &State<AppState>,
) -> ApiResult<Json<ChannelSearchResponse>> {
    let channels = state.orchestrator.search_channel(&request.handle).await?;

    // Channels keep platform order unless the caller asks for a key or an order.
    let channels = if request.sort_by.is_some() || request.sort_order.is_some() {
        let (key, order) =
            resolve_sort(None, request.sort_by.as_deref(), request.sort_order.as_deref())?;
        sort_records(&channels, key, order, state.orchestrator.now())
    } else {
        channels
    };

    Ok(Json(ChannelSearchResponse {
        total: channels.len(),
        channels,
    }))
}

#[post("/popular", format = "json", data = "<request>")]
pub async fn popular_videos(
    request: Json<PopularRequest>,
    state: &State<AppState>,
) -> ApiResult<Json<VideoSearchResponse>> {
    let request = request.into_inner();
    let (sort_key, sort_order) = resolve_sort(
        request.preset.as_deref(),
        request.sort_by.as_deref().or(Some(SortKey::HotScore.as_str())),
        request.sort_order.as_deref(),
    )?;

    let options = SearchOptions {
        filters: request
            .filters
            .unwrap_or_else(|| state.preferences.filters()),
        sort_key,
        sort_order,
        region_code: request.region_code,
        max_results: None,
    };

    let videos = state.orchestrator.popular_videos(&options).await?;
    info!("Popular videos after filtering: {}", videos.len());
    Ok(Json(video_response(state, videos, sort_key)))
}

#[get("/trending?<country>&<category>")]
pub async fn trending_videos(
    country: Option<&str>,
    category: Option<&str>,
    state: &State<AppState>,
) -> ApiResult<Json<Vec<VideoRecord>>> {
    let videos = state.orchestrator.trending_videos(country, category).await?;
    Ok(Json(videos))
}

#[post("/suggestions", format = "json", data = "<request>")]
pub fn search_suggestions(
    request: Json<SuggestionsRequest>,
    state: &State<AppState>,
) -> Json<Vec<String>> {
    Json(state.orchestrator.search_suggestions(&request.query))
}
