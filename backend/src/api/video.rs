use crate::models::ApiResult;
use crate::AppState;
use hotfinder_core::models::VideoRecord;
use hotfinder_core::HotFinderError;
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/video/<id>")]
pub async fn get_video(id: &str, state: &State<AppState>) -> ApiResult<Json<VideoRecord>> {
    match state.orchestrator.video_details(id).await? {
        Some(video) => Ok(Json(video)),
        None => Err(HotFinderError::NotFound(format!("video '{id}'")).into()),
    }
}
