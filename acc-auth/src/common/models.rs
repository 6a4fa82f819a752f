use chrono::{serde::ts_seconds, DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// OAuth token held by a session.
///
/// Replaced as a whole on refresh, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    #[serde(with = "ts_seconds")]
    pub expires_at: DateTime<Utc>,
    pub scope: BTreeSet<String>,
}

impl Token {
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}
