//! Lazy token refresh around a fallible upstream operation.

use acc_api::AccApiError;
use async_trait::async_trait;
use std::future::Future;

use crate::common::Token;
use crate::server::error::ServerError;
use crate::server::services::SessionStore;

/// Exchanges a refresh token for a new [`Token`].
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<Token, ServerError>;
}

/// Run `operation` with the session's token, refreshing at most once.
///
/// If the provider answers 401 and the session holds a refresh token, the
/// token is refreshed, written back to the session and `operation` runs one
/// more time. Whatever the second attempt returns is final. Other failures,
/// and 401s without a refresh token, propagate untouched.
pub async fn with_refresh<T, F, Fut, R>(
    sessions: &SessionStore,
    session_id: &str,
    refresher: &R,
    mut operation: F,
) -> Result<T, ServerError>
where
    R: TokenRefresher + ?Sized,
    F: FnMut(Token) -> Fut,
    Fut: Future<Output = Result<T, AccApiError>>,
{
    let token = sessions
        .token(session_id)
        .ok_or(ServerError::Unauthenticated)?;

    let err = match operation(token).await {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    if !err.is_unauthorized() {
        return Err(err.into());
    }

    let refresh_token = match sessions
        .token(session_id)
        .filter(Token::has_refresh_token)
    {
        Some(current) => current.refresh_token,
        None => {
            tracing::debug!(
                session_id = %session_id,
                "Access token rejected and no refresh token available"
            );
            return Err(err.into());
        }
    };

    tracing::info!(session_id = %session_id, "Access token rejected, refreshing");
    let refreshed = refresher.refresh(&refresh_token).await?;
    sessions.store_token(session_id, refreshed.clone());

    operation(refreshed).await.map_err(ServerError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use reqwest::StatusCode;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn token(access: &str, refresh: &str) -> Token {
        Token {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            token_type: "Bearer".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            scope: BTreeSet::from(["data:read".to_string()]),
        }
    }

    fn http_error(status: StatusCode) -> AccApiError {
        AccApiError::Http {
            status,
            body: String::new(),
        }
    }

    /// Hands out `fresh-N` tokens and counts calls.
    #[derive(Default)]
    struct CountingRefresher {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TokenRefresher for CountingRefresher {
        async fn refresh(&self, refresh_token: &str) -> Result<Token, ServerError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(ServerError::AuthExchange("invalid_grant".into()));
            }
            Ok(token(&format!("fresh-{n}"), refresh_token))
        }
    }

    fn session_with(store: &SessionStore, t: Token) -> String {
        let id = store.create_session();
        store.store_token(&id, t);
        id
    }

    #[tokio::test]
    async fn refreshes_once_after_401_then_succeeds() {
        let store = SessionStore::new(600);
        let id = session_with(&store, token("stale", "r1"));
        let refresher = CountingRefresher::default();
        let seen = Mutex::new(Vec::new());

        let result = with_refresh(&store, &id, &refresher, |t| {
            seen.lock().unwrap().push(t.access_token.clone());
            let outcome = if t.access_token == "stale" {
                Err(http_error(StatusCode::UNAUTHORIZED))
            } else {
                Ok(vec![1, 2, 3])
            };
            async move { outcome }
        })
        .await
        .unwrap();

        assert_eq!(result, vec![1, 2, 3]);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["stale", "fresh-1"]);
        assert_eq!(store.token(&id).unwrap().access_token, "fresh-1");
    }

    #[tokio::test]
    async fn second_401_propagates_without_another_refresh() {
        let store = SessionStore::new(600);
        let id = session_with(&store, token("stale", "r1"));
        let refresher = CountingRefresher::default();
        let attempts = AtomicUsize::new(0);

        let err = with_refresh(&store, &id, &refresher, |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(http_error(StatusCode::UNAUTHORIZED)) }
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ServerError::Upstream(AccApiError::Http { status: StatusCode::UNAUTHORIZED, .. })
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_401_failures_skip_refresh() {
        let store = SessionStore::new(600);
        let id = session_with(&store, token("valid", "r1"));
        let refresher = CountingRefresher::default();

        let err = with_refresh(&store, &id, &refresher, |_| async {
            Err::<(), _>(http_error(StatusCode::FORBIDDEN))
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ServerError::Upstream(AccApiError::Http { status: StatusCode::FORBIDDEN, .. })
        ));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_refresh_token_propagates_first_401() {
        let store = SessionStore::new(600);
        let id = session_with(&store, token("stale", ""));
        let refresher = CountingRefresher::default();

        let err = with_refresh(&store, &id, &refresher, |_| async {
            Err::<(), _>(http_error(StatusCode::UNAUTHORIZED))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ServerError::Upstream(_)));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_refresh_propagates_and_keeps_old_token() {
        let store = SessionStore::new(600);
        let id = session_with(&store, token("stale", "revoked"));
        let refresher = CountingRefresher {
            fail: true,
            ..Default::default()
        };
        let attempts = AtomicUsize::new(0);

        let err = with_refresh(&store, &id, &refresher, |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(http_error(StatusCode::UNAUTHORIZED)) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ServerError::AuthExchange(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(store.token(&id).unwrap().access_token, "stale");
    }

    #[tokio::test]
    async fn session_without_token_is_unauthenticated() {
        let store = SessionStore::new(600);
        let id = store.create_session();
        let refresher = CountingRefresher::default();
        let attempts = AtomicUsize::new(0);

        let err = with_refresh(&store, &id, &refresher, |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, AccApiError>(()) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ServerError::Unauthenticated));
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }
}
