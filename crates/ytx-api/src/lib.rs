//! Axum HTTP API server.
//!
//! This crate provides:
//! - `POST /transcript` and `GET /transcript` returning flattened video data
//! - Service info, health and readiness endpoints
//! - Request logging, request IDs and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::TranscriptService;
pub use state::AppState;
