use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use tower_sessions::Session;
use tracing::{field, Span};

use crate::server::{
    error::ServerError,
    models::{CallbackParams, LoginResponse, LogoutResponse, MeResponse},
    session_layer::{bind_session_id, session_id},
    AppState,
};

/// Start the authorization-code flow.
///
/// Reuses the browser's session when its cookie points at a live one,
/// otherwise creates a fresh session. Any earlier pending state is replaced.
#[tracing::instrument(skip_all, fields(session_id = field::Empty))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<LoginResponse>, ServerError> {
    let existing = session_id(&session)
        .await?
        .filter(|id| state.session_store.get_session(id).is_some());

    let session_id = match existing {
        Some(id) => id,
        None => {
            let id = state.session_store.create_session();
            bind_session_id(&session, &id).await?;
            id
        }
    };
    Span::current().record("session_id", session_id.as_str());

    let (auth_url, oauth_state) = state.oauth_client.build_authorization_url();
    state.session_store.set_oauth_state(&session_id, oauth_state);

    tracing::info!("Issued authorization URL");
    Ok(Json(LoginResponse { auth_url }))
}

/// Provider redirect target.
///
/// The pending state is consumed before anything else is checked, so a
/// state value can never be replayed.
#[tracing::instrument(skip_all, fields(session_id = field::Empty))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, ServerError> {
    let session_id = session_id(&session)
        .await?
        .ok_or(ServerError::OAuthStateMismatch)?;
    Span::current().record("session_id", session_id.as_str());

    let expected = state.session_store.take_oauth_state(&session_id);

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "Provider returned an authorization error");
        return Err(ServerError::BadRequest(format!("Authorization failed: {}", error)));
    }

    let code = match (params.code, params.state, expected) {
        (Some(code), Some(received), Some(expected))
            if !code.is_empty() && received == expected =>
        {
            code
        }
        _ => {
            tracing::warn!("Callback code missing or state mismatch");
            return Err(ServerError::OAuthStateMismatch);
        }
    };

    let token = state.oauth_client.exchange_code(&code).await?;
    if !state.session_store.store_token(&session_id, token) {
        return Err(ServerError::Internal("Session expired during login".to_string()));
    }

    tracing::info!("Login completed");
    Ok(Redirect::to(&state.frontend_origin))
}

/// Drop the server-side session and expire the cookie.
#[tracing::instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<LogoutResponse>, ServerError> {
    if let Some(session_id) = session_id(&session).await? {
        if let Some(removed) = state.session_store.delete_session(&session_id) {
            tracing::info!(
                session_id = %session_id,
                session_age_seconds = removed.age().num_seconds(),
                "Logged out"
            );
        }
    }
    session.flush().await?;

    Ok(Json(LogoutResponse { ok: true }))
}

pub async fn me(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<MeResponse>, ServerError> {
    let authenticated = session_id(&session)
        .await?
        .and_then(|id| state.session_store.get_session(&id))
        .is_some_and(|s| s.is_authenticated());

    Ok(Json(MeResponse { authenticated }))
}
