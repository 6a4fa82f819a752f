pub mod backoff;
pub mod endpoints;
mod error;
mod macros;
pub mod pagination;
pub mod repositories;

pub use crate::backoff::{BackoffPolicy, BackoffRequester};
pub use crate::error::AccApiError;
pub use crate::pagination::Paginator;
use endpoints::Endpoint;
use repositories::*;
use serde_json::Value;

pub const BASE_URL: &str = "https://developer.api.autodesk.com";

/// Client for the provider's hierarchy endpoints.
///
/// Holds no credentials; every call takes the access token to use, so one
/// client can serve every session.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    paginator: Paginator,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AccApiError> {
        Self::with_policy(base_url, BackoffPolicy::default())
    }

    pub fn with_policy(
        base_url: impl Into<String>,
        policy: BackoffPolicy,
    ) -> Result<Self, AccApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            paginator: Paginator::new(BackoffRequester::new(policy)?),
        })
    }

    /// Fetch every record behind `endpoint`, following pagination links.
    pub async fn fetch_all<E>(
        &self,
        endpoint: &E,
        access_token: &str,
    ) -> Result<Vec<Value>, AccApiError>
    where
        E: Endpoint,
    {
        let url = format!("{}{}", self.base_url, endpoint.endpoint());
        self.paginator
            .fetch_all(&url, &endpoint.query(), access_token)
            .await
    }
}

pub struct Request;

impl Request {
    pub fn hubs() -> HubRepository {
        HubRepository::new()
    }

    pub fn project(project_id: impl Into<String>) -> ProjectRepository {
        ProjectRepository::new(project_id)
    }
}
