//! Guardian Server
//!
//! HTTP API over the toxicity scorer:
//! - `GET /health`
//! - `POST /api/score` scores a literal batch of texts
//! - `POST /api/youtube/score` fetches a video's comments and scores them
//!
//! State is loaded once at startup into an [`AppState`] shared by every
//! handler.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Settings;
pub use error::ApiError;
pub use routes::{create_router, serve, ScoreResponse};
pub use state::AppState;
