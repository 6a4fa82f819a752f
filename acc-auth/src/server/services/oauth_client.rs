use async_trait::async_trait;
use chrono::Utc;
use oauth2::{
    basic::{BasicClient, BasicTokenResponse, BasicTokenType},
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, HttpRequest,
    HttpResponse, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::common::Token;
use crate::server::config::OAuthConfiguration;
use crate::server::error::ServerError;
use crate::server::services::resilient::TokenRefresher;

// Bridges oauth2's request type onto our reqwest version
async fn execute(
    client: reqwest::Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let mut builder = client
        .request(request.method().clone(), request.uri().to_string())
        .body(request.body().clone());

    for (name, value) in request.headers() {
        builder = builder.header(name.as_str(), value.as_bytes());
    }

    let response = builder.send().await?;
    let status = response.status();
    let body = response.bytes().await?.to_vec();

    let mut http_response = HttpResponse::new(body);
    *http_response.status_mut() = status;

    Ok(http_response)
}

/// Authorization-code and refresh-token flows against the provider.
///
/// Holds only static configuration; client credentials are sent in the
/// request body of every token call. Token calls never follow redirects and
/// give up after the configured timeout.
pub struct OAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    scopes: Vec<String>,
}

impl OAuthClient {
    pub fn new(config: &OAuthConfiguration) -> Result<Self, ServerError> {
        let auth_url = AuthUrl::new(config.authorize_url.clone())
            .map_err(|e| ServerError::Configuration(format!("Invalid auth URL: {}", e)))?;

        let token_url = TokenUrl::new(config.token_url.clone())
            .map_err(|e| ServerError::Configuration(format!("Invalid token URL: {}", e)))?;

        let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| ServerError::Configuration(format!("Invalid redirect URI: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ServerError::Configuration(format!("Invalid HTTP client: {}", e)))?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url,
            token_url,
            redirect_url,
            scopes: config.scope_list(),
        })
    }

    /// Build the consent-page URL with a fresh anti-forgery state.
    ///
    /// Returns `(url, state)`; the caller must keep `state` to validate the
    /// callback.
    pub fn build_authorization_url(&self) -> (String, String) {
        let state = Self::generate_state_token();
        let csrf_token = CsrfToken::new(state.clone());
        let (auth_url, _) = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .authorize_url(|| csrf_token)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .url();
        (auth_url.to_string(), state)
    }

    /// Exchange authorization code for access and refresh tokens
    pub async fn exchange_code(&self, code: &str) -> Result<Token, ServerError> {
        let token_result = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(
                self.client_secret.expose_secret().to_string(),
            ))
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .set_auth_type(AuthType::RequestBody)
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&|request: HttpRequest| execute(self.http.clone(), request))
            .await?;

        let refresh_token = token_result
            .refresh_token()
            .ok_or_else(|| ServerError::AuthExchange("No refresh token in response".to_string()))?
            .secret()
            .to_string();

        let token = self.token_from_response(&token_result, refresh_token)?;
        tracing::debug!(
            "Successfully exchanged code for tokens, expires_at: {}",
            token.expires_at
        );
        Ok(token)
    }

    /// Exchange a refresh token for a new token.
    ///
    /// Providers that rotate refresh tokens return a new one; otherwise the
    /// one passed in stays valid and is kept.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token, ServerError> {
        let token_result = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(
                self.client_secret.expose_secret().to_string(),
            ))
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_auth_type(AuthType::RequestBody)
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&|request: HttpRequest| execute(self.http.clone(), request))
            .await?;

        let next_refresh_token = token_result
            .refresh_token()
            .map(|t| t.secret().to_string())
            .unwrap_or_else(|| refresh_token.to_string());

        let token = self.token_from_response(&token_result, next_refresh_token)?;
        tracing::debug!("Successfully refreshed tokens, expires_at: {}", token.expires_at);
        Ok(token)
    }

    fn token_from_response(
        &self,
        response: &BasicTokenResponse,
        refresh_token: String,
    ) -> Result<Token, ServerError> {
        let expires_in = response
            .expires_in()
            .ok_or_else(|| ServerError::AuthExchange("No expiration time in response".to_string()))?;

        let token_type = match response.token_type() {
            BasicTokenType::Bearer => "Bearer".to_string(),
            BasicTokenType::Mac => "MAC".to_string(),
            BasicTokenType::Extension(other) => other.clone(),
        };

        let scope: BTreeSet<String> = match response.scopes() {
            Some(scopes) => scopes.iter().map(|s| s.as_str().to_string()).collect(),
            None => self.scopes.iter().cloned().collect(),
        };

        Ok(Token {
            access_token: response.access_token().secret().to_string(),
            refresh_token,
            token_type,
            expires_at: Utc::now() + expires_in,
            scope,
        })
    }

    /// Generate a random CSRF state token
    pub fn generate_state_token() -> String {
        use base64::Engine;
        let mut rng = rand::rng();
        let random_bytes: Vec<u8> = (0..32).map(|_| rng.random()).collect();
        base64::prelude::BASE64_URL_SAFE_NO_PAD.encode(&random_bytes)
    }
}

#[async_trait]
impl TokenRefresher for OAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<Token, ServerError> {
        OAuthClient::refresh(self, refresh_token).await
    }
}
