use crate::models::ApiResult;
use crate::AppState;
use hotfinder_core::models::ChannelRecord;
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/analyze/channel/<id>")]
pub async fn analyze_channel(id: &str, state: &State<AppState>) -> ApiResult<Json<ChannelRecord>> {
    let channel = state.orchestrator.analyze_channel(id).await?;
    Ok(Json(channel))
}
