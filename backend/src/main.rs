#[macro_use]
extern crate rocket;

mod api;
mod config;
mod models;
mod store;
mod youtube;

use hotfinder_core::orchestrator::SearchOrchestrator;
use hotfinder_core::preferences::Preferences;
use rocket::{Build, Rocket};
use std::sync::Arc;

pub struct AppState {
    pub orchestrator: SearchOrchestrator,
    pub preferences: Arc<Preferences>,
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build().manage(state).mount("/api", api::routes())
}

#[launch]
fn rocket() -> _ {
    config::load_environment();
    config::init_logger();

    let state = config::create_app_state().expect("Failed to create app state");
    let cors = config::create_cors().expect("Failed to create CORS fairing");

    build_rocket(state).attach(cors)
}
