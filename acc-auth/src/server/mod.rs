pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod session_layer;

pub use config::Configuration;
pub use error::ServerError;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use services::{HierarchyService, OAuthClient, SessionStore};
use session_layer::session_layer;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub session_store: Arc<SessionStore>,
    pub oauth_client: Arc<OAuthClient>,
    pub hierarchy: Arc<HierarchyService>,
    pub frontend_origin: String,
    pub secure_cookies: bool,
}

impl AppState {
    /// Build every service from configuration. Must run inside a tokio
    /// runtime, the session store spawns its cleanup task.
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ServerError> {
        let oauth_client = Arc::new(OAuthClient::new(&configuration.oauth)?);
        let api = acc_api::Client::with_policy(
            configuration.api.base_url.clone(),
            configuration.api.backoff_policy(),
        )?;

        Ok(Self {
            session_store: Arc::new(SessionStore::new(
                configuration.server.session_ttl_seconds,
            )),
            hierarchy: Arc::new(HierarchyService::new(api, oauth_client.clone())),
            oauth_client,
            frontend_origin: configuration.frontend_origin.clone(),
            secure_cookies: configuration.server.secure_cookies,
        })
    }
}

pub fn router(state: AppState) -> Result<Router, ServerError> {
    let origin = HeaderValue::from_str(&state.frontend_origin).map_err(|_| {
        ServerError::Configuration(format!(
            "Invalid frontend origin: {}",
            state.frontend_origin
        ))
    })?;

    let sessions = session_layer(state.session_store.ttl(), state.secure_cookies)?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET])
        .allow_credentials(true);

    Ok(Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/login", get(handlers::login))
        .route("/auth/callback", get(handlers::callback))
        .route("/auth/logout", get(handlers::logout))
        .route("/auth/me", get(handlers::me))
        .route("/hubs", get(handlers::list_hubs))
        .route("/projects/{hub_id}", get(handlers::list_projects))
        .route("/top-folders/{project_id}", get(handlers::list_top_folders))
        .route(
            "/folders/{project_id}/{*folder_id}",
            get(handlers::list_folder_contents),
        )
        .route(
            "/permissions/{project_id}/{*folder_id}",
            get(handlers::list_folder_permissions),
        )
        .layer(sessions)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
