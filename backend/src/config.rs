use crate::store::JsonFilePreferenceStore;
use crate::youtube::YouTubeApiClient;
use crate::AppState;
use anyhow::{Context, Result};
use env_logger::Builder;
use hotfinder_core::client::StaticCredential;
use hotfinder_core::clock::{Clock, SystemClock};
use hotfinder_core::orchestrator::{SearchDefaults, SearchOrchestrator};
use hotfinder_core::preferences::Preferences;
use lazy_static::lazy_static;
use log::{info, warn, LevelFilter};
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::sync::Arc;

lazy_static! {
    pub static ref YOUTUBE_API_KEY: Option<String> = env::var("YOUTUBE_API_KEY").ok();
    pub static ref YOUTUBE_API_BASE_URL: String = env::var("YOUTUBE_API_BASE_URL")
        .unwrap_or_else(|_| "https://www.googleapis.com/youtube/v3".to_string());
    pub static ref DEFAULT_REGION_CODE: String =
        env::var("DEFAULT_REGION_CODE").unwrap_or_else(|_| "KR".to_string());
    pub static ref DEFAULT_RELEVANCE_LANGUAGE: String =
        env::var("DEFAULT_RELEVANCE_LANGUAGE").unwrap_or_else(|_| "ko".to_string());
    pub static ref SEARCH_MAX_RESULTS: u32 = env::var("SEARCH_MAX_RESULTS")
        .unwrap_or_else(|_| "25".to_string())
        .parse::<u32>()
        .unwrap_or(25);
    pub static ref PREFERENCES_PATH: String =
        env::var("PREFERENCES_PATH").unwrap_or_else(|_| "hotfinder-preferences.json".to_string());
    pub static ref ALLOWED_ORIGIN: String =
        env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:8080".to_string());
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting hot finder backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn search_defaults() -> SearchDefaults {
    SearchDefaults {
        region_code: DEFAULT_REGION_CODE.clone(),
        relevance_language: DEFAULT_RELEVANCE_LANGUAGE.clone(),
        max_results: *SEARCH_MAX_RESULTS,
        ..SearchDefaults::default()
    }
}

pub fn create_app_state() -> Result<AppState> {
    if YOUTUBE_API_KEY.is_none() {
        warn!("YOUTUBE_API_KEY is not set; searches will fail until it is");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let credentials = Arc::new(StaticCredential::new(YOUTUBE_API_KEY.clone()));
    let client = YouTubeApiClient::new(&YOUTUBE_API_BASE_URL, credentials)
        .with_context(|| format!("Invalid YOUTUBE_API_BASE_URL '{}'", *YOUTUBE_API_BASE_URL))?;
    info!("Using YouTube API at: {}", *YOUTUBE_API_BASE_URL);

    let store = JsonFilePreferenceStore::open(&*PREFERENCES_PATH)
        .with_context(|| format!("Failed to open preferences at '{}'", *PREFERENCES_PATH))?;
    let preferences = Arc::new(Preferences::new(Arc::new(store), clock.clone()));

    let orchestrator = SearchOrchestrator::new(Arc::new(client), clock, search_defaults())
        .with_preferences(preferences.clone());

    Ok(AppState {
        orchestrator,
        preferences,
    })
}

pub fn create_cors() -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&[ALLOWED_ORIGIN.as_str()]))
        .allowed_methods(
            vec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Options,
            ]
            .into_iter()
            .map(From::from)
            .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Accept", "Content-Type"]))
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
