use acc_api::BackoffPolicy;
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;

const ACC_AUTHORIZE_URL: &str = "https://developer.api.autodesk.com/authentication/v2/authorize";
const ACC_TOKEN_URL: &str = "https://developer.api.autodesk.com/authentication/v2/token";

/// Flat variables accepted alongside the nested `ACC_<SECTION>__<KEY>` form.
const FLAT_OVERRIDES: &[(&str, &str)] = &[
    ("ACC_CLIENT_ID", "oauth.client_id"),
    ("ACC_CLIENT_SECRET", "oauth.client_secret"),
    ("ACC_REDIRECT_URI", "oauth.redirect_uri"),
    ("ACC_SCOPES", "oauth.scopes"),
    ("FRONTEND_ORIGIN", "frontend_origin"),
];

#[derive(Debug, Deserialize, Clone)]
pub struct Configuration {
    #[serde(default)]
    pub server: ServerConfiguration,
    pub oauth: OAuthConfiguration,
    #[serde(default)]
    pub api: ApiConfiguration,
    #[serde(default = "default_frontend_origin")]
    pub frontend_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfiguration {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Idle time after which a browser session is dropped.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,

    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OAuthConfiguration {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,

    /// Space separated.
    #[serde(default = "default_scopes")]
    pub scopes: String,

    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Applies to every token endpoint call.
    #[serde(default = "default_token_request_timeout")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfiguration {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Unset means rate-limited requests are retried until they succeed.
    #[serde(default)]
    pub max_rate_limit_attempts: Option<u32>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_session_ttl() -> u64 {
    14 * 24 * 60 * 60
}

fn default_scopes() -> String {
    "data:read".to_string()
}

fn default_authorize_url() -> String {
    ACC_AUTHORIZE_URL.to_string()
}

fn default_token_url() -> String {
    ACC_TOKEN_URL.to_string()
}

fn default_token_request_timeout() -> u64 {
    30
}

fn default_api_base_url() -> String {
    acc_api::BASE_URL.to_string()
}

fn default_frontend_origin() -> String {
    "http://localhost:9000".to_string()
}

impl Default for ServerConfiguration {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_ttl_seconds: default_session_ttl(),
            secure_cookies: false,
        }
    }
}

impl Default for ApiConfiguration {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            max_rate_limit_attempts: None,
        }
    }
}

impl OAuthConfiguration {
    pub fn scope_list(&self) -> Vec<String> {
        self.scopes.split_whitespace().map(str::to_string).collect()
    }
}

impl ApiConfiguration {
    pub fn backoff_policy(&self) -> BackoffPolicy {
        let policy = BackoffPolicy::new();
        match self.max_rate_limit_attempts {
            Some(max_attempts) => policy.max_attempts(max_attempts),
            None => policy,
        }
    }
}

impl Configuration {
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_env(std::env::vars().collect())
    }

    /// Load `config.toml` if present, then the given environment.
    pub fn from_env(vars: HashMap<String, String>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(config::File::with_name("config"));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ACC")
                .prefix_separator("_")
                .separator("__")
                .source(Some(vars.clone())),
        );

        for (var, key) in FLAT_OVERRIDES {
            builder = builder.set_override_option(*key, vars.get(*var).cloned())?;
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn flat_variables_fill_oauth_section() {
        let configuration = Configuration::from_env(vars(&[
            ("ACC_CLIENT_ID", "client"),
            ("ACC_CLIENT_SECRET", "secret"),
            ("ACC_REDIRECT_URI", "http://localhost:8000/auth/callback"),
        ]))
        .unwrap();

        assert_eq!(configuration.oauth.client_id, "client");
        assert_eq!(configuration.oauth.client_secret.expose_secret(), "secret");
        assert_eq!(configuration.oauth.scope_list(), vec!["data:read"]);
        assert_eq!(configuration.frontend_origin, "http://localhost:9000");
        assert_eq!(configuration.oauth.token_url, ACC_TOKEN_URL);
        assert_eq!(configuration.oauth.request_timeout_seconds, 30);
        assert_eq!(configuration.api.base_url, acc_api::BASE_URL);
        assert_eq!(configuration.api.max_rate_limit_attempts, None);
    }

    #[test]
    fn scopes_and_frontend_origin_are_overridable() {
        let configuration = Configuration::from_env(vars(&[
            ("ACC_CLIENT_ID", "client"),
            ("ACC_CLIENT_SECRET", "secret"),
            ("ACC_REDIRECT_URI", "http://localhost:8000/auth/callback"),
            ("ACC_SCOPES", "data:read  account:read"),
            ("FRONTEND_ORIGIN", "https://explorer.example.com"),
        ]))
        .unwrap();

        assert_eq!(
            configuration.oauth.scope_list(),
            vec!["data:read", "account:read"]
        );
        assert_eq!(
            configuration.frontend_origin,
            "https://explorer.example.com"
        );
    }

    #[test]
    fn missing_client_id_is_an_error() {
        assert!(Configuration::from_env(vars(&[("ACC_CLIENT_SECRET", "secret")])).is_err());
    }
}
