use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccApiError {
    /// Non-2xx, non-429 response from the provider.
    #[error("({status}) {body}")]
    Http { status: StatusCode, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Access token is not a valid header value")]
    InvalidToken,

    /// Only produced when the backoff policy has an attempt ceiling.
    #[error("Still rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },
}

impl AccApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AccApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl From<serde_json::Error> for AccApiError {
    fn from(err: serde_json::Error) -> Self {
        AccApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_http_401_counts_as_unauthorized() {
        let unauthorized = AccApiError::Http {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        let forbidden = AccApiError::Http {
            status: StatusCode::FORBIDDEN,
            body: String::new(),
        };

        assert!(unauthorized.is_unauthorized());
        assert!(!forbidden.is_unauthorized());
        assert!(!AccApiError::Decode("bad".into()).is_unauthorized());
        assert_eq!(forbidden.status(), Some(StatusCode::FORBIDDEN));
    }
}
