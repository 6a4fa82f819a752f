use chrono::{DateTime, Utc};

use crate::common::Token;

/// Server-side state for one browser.
#[derive(Debug, Clone)]
pub struct BrowserSession {
    /// Set by `/auth/login`, consumed by `/auth/callback`.
    pub oauth_state: Option<String>,
    pub token: Option<Token>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl Default for BrowserSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            oauth_state: None,
            token: None,
            created_at: now,
            last_seen_at: now,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.created_at)
    }
}
