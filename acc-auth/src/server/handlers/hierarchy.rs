use axum::{
    extract::{Path, State},
    Json,
};
use tower_sessions::Session;
use tracing::{field, Span};

use crate::server::{error::ServerError, models::DataResponse, session_layer, AppState};

// A browser without a bound session and a session without a token both end
// up as 401 before any upstream call is made.
async fn bound_session_id(session: &Session) -> Result<String, ServerError> {
    let session_id = session_layer::session_id(session)
        .await?
        .ok_or(ServerError::Unauthenticated)?;
    Span::current().record("session_id", session_id.as_str());
    Ok(session_id)
}

#[tracing::instrument(skip_all, fields(session_id = field::Empty))]
pub async fn list_hubs(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<DataResponse>, ServerError> {
    let session_id = bound_session_id(&session).await?;
    let data = state
        .hierarchy
        .list_hubs(&state.session_store, &session_id)
        .await?;
    Ok(Json(DataResponse { data }))
}

#[tracing::instrument(skip_all, fields(session_id = field::Empty, hub_id = %hub_id))]
pub async fn list_projects(
    State(state): State<AppState>,
    Path(hub_id): Path<String>,
    session: Session,
) -> Result<Json<DataResponse>, ServerError> {
    let session_id = bound_session_id(&session).await?;
    let data = state
        .hierarchy
        .list_projects(&state.session_store, &session_id, &hub_id)
        .await?;
    Ok(Json(DataResponse { data }))
}

#[tracing::instrument(skip_all, fields(session_id = field::Empty, project_id = %project_id))]
pub async fn list_top_folders(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    session: Session,
) -> Result<Json<DataResponse>, ServerError> {
    let session_id = bound_session_id(&session).await?;
    let data = state
        .hierarchy
        .list_top_folders(&state.session_store, &session_id, &project_id)
        .await?;
    Ok(Json(DataResponse { data }))
}

#[tracing::instrument(skip_all, fields(session_id = field::Empty, %project_id, %folder_id))]
pub async fn list_folder_contents(
    State(state): State<AppState>,
    Path((project_id, folder_id)): Path<(String, String)>,
    session: Session,
) -> Result<Json<DataResponse>, ServerError> {
    let session_id = bound_session_id(&session).await?;
    let data = state
        .hierarchy
        .list_folder_contents(&state.session_store, &session_id, &project_id, &folder_id)
        .await?;
    Ok(Json(DataResponse { data }))
}

#[tracing::instrument(skip_all, fields(session_id = field::Empty, %project_id, %folder_id))]
pub async fn list_folder_permissions(
    State(state): State<AppState>,
    Path((project_id, folder_id)): Path<(String, String)>,
    session: Session,
) -> Result<Json<DataResponse>, ServerError> {
    let session_id = bound_session_id(&session).await?;
    let data = state
        .hierarchy
        .list_folder_permissions(&state.session_store, &session_id, &project_id, &folder_id)
        .await?;
    Ok(Json(DataResponse { data }))
}
