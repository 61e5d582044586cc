//! Ranking and filtering pipeline for YouTube search results.
//!
//! Raw platform JSON flows through [`mapper`] into [`models::VideoRecord`]s, then
//! through [`filter`], [`scoring`] and [`ranking`]. [`orchestrator::SearchOrchestrator`]
//! wires those stages to an injected [`client::VideoPlatformClient`] and a
//! [`cache::ResultCache`].

pub mod cache;
pub mod client;
pub mod clock;
pub mod duration;
pub mod error;
pub mod filter;
pub mod mapper;
pub mod models;
pub mod orchestrator;
pub mod preferences;
pub mod ranking;
pub mod scoring;

pub use error::{HotFinderError, Result};
