use hotfinder_core::models::{ChannelRecord, FilterConfiguration, SearchHistoryEntry, VideoRecord};
use hotfinder_core::ranking::SortStats;
use hotfinder_core::HotFinderError;
use log::error;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use std::io::Cursor;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSearchRequest {
    pub keyword: String,
    /// Falls back to the saved filters when omitted.
    #[serde(default)]
    pub filters: Option<FilterConfiguration>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
    /// Named shortcut; overrides `sort_by`/`sort_order`.
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSearchRequest {
    pub handle: String,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularRequest {
    #[serde(default)]
    pub filters: Option<FilterConfiguration>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSearchResponse {
    pub videos: Vec<VideoRecord>,
    pub total: usize,
    pub stats: SortStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSearchResponse {
    pub channels: Vec<ChannelRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiKeyStatus {
    pub valid: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub last_search: Option<SearchHistoryEntry>,
    pub history_size: usize,
    pub favorite_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteChange {
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip)]
    pub status: Status,
}

impl From<HotFinderError> for ErrorResponse {
    fn from(e: HotFinderError) -> Self {
        ErrorResponse {
            error: e.kind().to_string(),
            message: e.to_string(),
            status: status_for(&e),
        }
    }
}

pub fn status_for(e: &HotFinderError) -> Status {
    match e {
        HotFinderError::KeyInvalid | HotFinderError::MissingCredential => Status::Unauthorized,
        HotFinderError::QuotaExceeded => Status::TooManyRequests,
        HotFinderError::UnsupportedSortKey(_)
        | HotFinderError::UnsupportedSortOrder(_)
        | HotFinderError::InvalidQuery(_) => Status::BadRequest,
        HotFinderError::NotFound(_) => Status::NotFound,
        HotFinderError::Transport(_) | HotFinderError::MalformedResponse(_) => Status::BadGateway,
        HotFinderError::Computation(_) | HotFinderError::Storage(_) => {
            Status::InternalServerError
        }
    }
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        if self.status.code >= 500 {
            error!("{}: {}", self.error, self.message);
        }

        let json = serde_json::to_string(&self).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

pub type ApiResult<T> = Result<T, ErrorResponse>;
