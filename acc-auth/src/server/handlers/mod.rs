mod auth;
mod hierarchy;

pub use auth::{callback, login, logout, me};
pub use hierarchy::{
    list_folder_contents, list_folder_permissions, list_hubs, list_projects, list_top_folders,
};

use crate::server::models::HealthResponse;
use axum::Json;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
