use crate::models::{ApiResult, FavoriteChange, StatsResponse};
use crate::AppState;
use hotfinder_core::models::{ChannelRecord, FavoriteChannel, FilterConfiguration, SearchHistoryEntry};
use hotfinder_core::HotFinderError;
use log::info;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, State};

#[get("/preferences/filters")]
pub fn get_filters(state: &State<AppState>) -> Json<FilterConfiguration> {
    Json(state.preferences.filters())
}

#[put("/preferences/filters", format = "json", data = "<filters>")]
pub fn put_filters(
    filters: Json<FilterConfiguration>,
    state: &State<AppState>,
) -> ApiResult<Json<FilterConfiguration>> {
    state.preferences.save_filters(&filters)?;
    info!("Saved filters: {:?}", *filters);
    Ok(filters)
}

#[get("/preferences/history")]
pub fn search_history(state: &State<AppState>) -> Json<Vec<SearchHistoryEntry>> {
    Json(state.preferences.search_history())
}

#[get("/stats")]
pub fn search_stats(state: &State<AppState>) -> Json<StatsResponse> {
    let history = state.preferences.search_history();
    Json(StatsResponse {
        last_search: history.first().cloned(),
        history_size: history.len(),
        favorite_count: state.preferences.favorite_channels().len(),
    })
}

#[get("/favorites")]
pub fn list_favorites(state: &State<AppState>) -> Json<Vec<FavoriteChannel>> {
    Json(state.preferences.favorite_channels())
}

#[post("/favorites", format = "json", data = "<channel>")]
pub fn add_favorite(
    channel: Json<ChannelRecord>,
    state: &State<AppState>,
) -> ApiResult<Json<FavoriteChange>> {
    let changed = state.preferences.add_favorite_channel(channel.into_inner())?;
    Ok(Json(FavoriteChange { changed }))
}

#[delete("/favorites/<id>")]
pub fn remove_favorite(id: &str, state: &State<AppState>) -> ApiResult<Json<FavoriteChange>> {
    if state.preferences.remove_favorite_channel(id)? {
        Ok(Json(FavoriteChange { changed: true }))
    } else {
        Err(HotFinderError::NotFound(format!("favorite channel '{id}'")).into())
    }
}
