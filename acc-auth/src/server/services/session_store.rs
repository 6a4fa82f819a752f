use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::common::Token;
use crate::server::models::BrowserSession;

/// Per-browser session storage keyed by an opaque session id.
///
/// Sessions idle for longer than the TTL are evicted by a background task.
pub struct SessionStore {
    sessions: Arc<DashMap<String, BrowserSession>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        let store = Self {
            sessions: Arc::new(DashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
        };

        // Spawn background cleanup task
        let sessions_clone = store.sessions.clone();
        let ttl_clone = store.ttl;
        tokio::spawn(async move {
            cleanup_expired_sessions(sessions_clone, ttl_clone).await;
        });

        tracing::info!(
            "Session store initialized with idle TTL of {} seconds",
            ttl_seconds
        );
        store
    }

    /// Create an empty, unauthenticated session
    pub fn create_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .insert(session_id.clone(), BrowserSession::new());
        tracing::debug!(session_id = %session_id, "Created session");
        session_id
    }

    /// Get a session by ID, marking it as recently used
    pub fn get_session(&self, session_id: &str) -> Option<BrowserSession> {
        self.sessions.get_mut(session_id).map(|mut s| {
            s.last_seen_at = Utc::now();
            s.clone()
        })
    }

    /// Update a session using a closure
    pub fn update_session<F>(&self, session_id: &str, update_fn: F) -> bool
    where
        F: FnOnce(&mut BrowserSession),
    {
        self.sessions
            .get_mut(session_id)
            .map(|mut s| {
                update_fn(&mut s);
                s.last_seen_at = Utc::now();
                true
            })
            .unwrap_or(false)
    }

    pub fn set_oauth_state(&self, session_id: &str, state: String) -> bool {
        self.update_session(session_id, |s| s.oauth_state = Some(state))
    }

    /// Remove and return the pending OAuth state; it is only ever checked once
    pub fn take_oauth_state(&self, session_id: &str) -> Option<String> {
        let mut state = None;
        self.update_session(session_id, |s| state = s.oauth_state.take());
        state
    }

    pub fn token(&self, session_id: &str) -> Option<Token> {
        self.get_session(session_id).and_then(|s| s.token)
    }

    /// Store a token, replacing any previous one
    pub fn store_token(&self, session_id: &str, token: Token) -> bool {
        let result = self.update_session(session_id, |s| s.token = Some(token));
        if result {
            tracing::debug!(session_id = %session_id, "Stored token in session");
        }
        result
    }

    /// Delete a session, returning it if it existed
    pub fn delete_session(&self, session_id: &str) -> Option<BrowserSession> {
        let removed = self.sessions.remove(session_id).map(|(_, session)| session);
        tracing::debug!("Session deleted: {}", session_id);
        removed
    }

    /// Idle time after which sessions are evicted
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Background task that periodically evicts idle sessions
async fn cleanup_expired_sessions(sessions: Arc<DashMap<String, BrowserSession>>, ttl: Duration) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    loop {
        interval.tick().await;
        let now = Utc::now();
        let initial_count = sessions.len();

        sessions.retain(|session_id, session| {
            let idle = now
                .signed_duration_since(session.last_seen_at)
                .to_std()
                .unwrap_or(Duration::ZERO);

            if idle >= ttl {
                tracing::debug!(session_id = %session_id, "Cleaning up idle session");
                false
            } else {
                true
            }
        });

        let cleaned = initial_count.saturating_sub(sessions.len());
        if cleaned > 0 {
            tracing::info!(
                "Cleaned up {} idle sessions, {} remaining",
                cleaned,
                sessions.len()
            );
        }
    }
}
