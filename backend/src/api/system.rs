use crate::models::{ApiKeyStatus, ApiResult};
use crate::AppState;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, State};

#[get("/validate-api-key")]
pub async fn validate_api_key(state: &State<AppState>) -> ApiResult<Json<ApiKeyStatus>> {
    let valid = state.orchestrator.validate_api_key().await?;
    Ok(Json(ApiKeyStatus { valid }))
}

#[delete("/cache")]
pub fn clear_cache(state: &State<AppState>) -> Status {
    state.orchestrator.clear_cache();
    Status::NoContent
}
