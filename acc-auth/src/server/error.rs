use acc_api::AccApiError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// No token in the session. Distinct from a provider 401, which triggers
    /// a refresh instead.
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Invalid state or code")]
    OAuthStateMismatch,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The provider rejected an authorization code or refresh token.
    #[error("OAuth error: {0}")]
    AuthExchange(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] AccApiError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ServerError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, Value::from("Unauthorized"))
            }
            ServerError::OAuthStateMismatch => (
                StatusCode::BAD_REQUEST,
                Value::from("Invalid state or code"),
            ),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Value::from(msg)),
            ServerError::AuthExchange(msg) => {
                tracing::warn!(error = %msg, "Token exchange rejected");
                (StatusCode::BAD_GATEWAY, Value::from(msg))
            }
            ServerError::Upstream(AccApiError::Http { status, body }) => {
                tracing::warn!(%status, "Proxying upstream error");
                // Provider error bodies are usually JSON; pass them through as such
                let detail = serde_json::from_str(&body).unwrap_or(Value::String(body));
                (status, detail)
            }
            ServerError::Upstream(err) => {
                tracing::error!(error = %err, "Upstream request failed");
                (StatusCode::BAD_GATEWAY, Value::from(err.to_string()))
            }
            ServerError::Configuration(msg) | ServerError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, Value::from(msg))
            }
            ServerError::Session(err) => {
                tracing::error!(error = %err, "Session layer failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Value::from("Session unavailable"),
                )
            }
        };

        let body = Json(json!({
            "detail": detail,
        }));

        (status, body).into_response()
    }
}

impl
    From<
        oauth2::RequestTokenError<
            reqwest::Error,
            oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>,
        >,
    > for ServerError
{
    fn from(
        err: oauth2::RequestTokenError<
            reqwest::Error,
            oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>,
        >,
    ) -> Self {
        ServerError::AuthExchange(format!("Token request failed: {}", err))
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(err: config::ConfigError) -> Self {
        ServerError::Configuration(format!("Configuration error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ServerError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthenticated_has_fixed_body() {
        let (status, body) = render(ServerError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "Unauthorized"}));
    }

    #[tokio::test]
    async fn upstream_http_errors_keep_status_and_body() {
        let (status, body) = render(ServerError::Upstream(AccApiError::Http {
            status: StatusCode::FORBIDDEN,
            body: r#"{"errorCode":"AUTH-001"}"#.to_string(),
        }))
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"detail": {"errorCode": "AUTH-001"}}));

        let (status, body) = render(ServerError::Upstream(AccApiError::Http {
            status: StatusCode::NOT_FOUND,
            body: "no such folder".to_string(),
        }))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "no such folder"}));
    }

    #[tokio::test]
    async fn exchange_failures_are_bad_gateway() {
        let (status, _) = render(ServerError::AuthExchange("invalid_grant".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
