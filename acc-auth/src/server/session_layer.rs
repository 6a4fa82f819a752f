//! Browser cookie handling via `tower-sessions`.
//!
//! The cookie's session record holds a single key, the id of the
//! server-side [`SessionStore`](crate::server::services::SessionStore)
//! entry carrying the token and OAuth state.

use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::server::error::ServerError;

pub const SESSION_COOKIE: &str = "acc_session";

const SESSION_ID_KEY: &str = "session_id";

pub fn session_layer(
    ttl: std::time::Duration,
    secure: bool,
) -> Result<SessionManagerLayer<MemoryStore>, ServerError> {
    let inactivity = time::Duration::try_from(ttl)
        .map_err(|e| ServerError::Configuration(format!("Invalid session TTL: {}", e)))?;

    Ok(SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_path("/")
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(secure)
        .with_expiry(Expiry::OnInactivity(inactivity)))
}

/// Server-side session id bound to this browser, if any.
pub async fn session_id(session: &Session) -> Result<Option<String>, ServerError> {
    Ok(session.get::<String>(SESSION_ID_KEY).await?)
}

pub async fn bind_session_id(session: &Session, session_id: &str) -> Result<(), ServerError> {
    session.insert(SESSION_ID_KEY, session_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn browser_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn unbound_session_has_no_id() {
        let session = browser_session();
        assert_eq!(session_id(&session).await.unwrap(), None);
    }

    #[tokio::test]
    async fn bound_id_is_read_back_and_flush_forgets_it() {
        let session = browser_session();
        bind_session_id(&session, "abc-123").await.unwrap();
        assert_eq!(session_id(&session).await.unwrap().as_deref(), Some("abc-123"));

        session.flush().await.unwrap();
        assert_eq!(session_id(&session).await.unwrap(), None);
    }

    #[test]
    fn oversized_ttl_is_a_configuration_error() {
        let err = session_layer(std::time::Duration::MAX, false).unwrap_err();
        assert!(matches!(err, ServerError::Configuration(_)));
    }
}
