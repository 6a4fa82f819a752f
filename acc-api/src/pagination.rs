//! Link-driven pagination over the provider's `{data, links}` envelope.

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Method,
};
use serde::Deserialize;
use serde_json::Value;

use crate::backoff::BackoffRequester;
use crate::error::AccApiError;

#[derive(Debug, Deserialize)]
struct PageEnvelope {
    data: Vec<Value>,
    #[serde(default)]
    links: Option<PageLinks>,
}

#[derive(Debug, Deserialize)]
struct PageLinks {
    #[serde(default)]
    next: Option<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    #[serde(default)]
    href: Option<String>,
}

impl PageEnvelope {
    fn next_href(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.next.as_ref())
            .and_then(|next| next.href.as_deref())
            .filter(|href| !href.is_empty())
    }
}

#[derive(Clone)]
pub struct Paginator {
    requester: BackoffRequester,
}

impl Paginator {
    pub fn new(requester: BackoffRequester) -> Self {
        Self { requester }
    }

    /// Fetch every page starting at `url`, following `links.next.href` until
    /// it is absent. A follow link replaces both the URL and the query
    /// parameters of the previous request.
    pub async fn fetch_all(
        &self,
        url: &str,
        params: &[(String, String)],
        access_token: &str,
    ) -> Result<Vec<Value>, AccApiError> {
        let headers = bearer_headers(access_token)?;
        let mut url = url.to_string();
        let mut params = params.to_vec();
        let mut results = Vec::new();
        let mut pages = 0usize;

        loop {
            let response = self
                .requester
                .request(Method::GET, &url, Some(&headers), &params)
                .await?;
            let bytes = response.bytes().await?;
            let body: Value = serde_json::from_slice(&bytes)?;
            pages += 1;

            match absorb_page(body, &mut results)? {
                Some(next) => {
                    tracing::debug!(page = pages, next = %next, "Following next page");
                    url = next;
                    params.clear();
                }
                None => break,
            }
        }

        tracing::debug!(pages, records = results.len(), "Pagination complete");
        Ok(results)
    }
}

/// Append one page's records to `results` and return the follow link, if any.
fn absorb_page(body: Value, results: &mut Vec<Value>) -> Result<Option<String>, AccApiError> {
    if matches!(&body, Value::Object(map) if map.contains_key("data")) {
        let envelope: PageEnvelope = serde_json::from_value(body)?;
        let next = envelope.next_href().map(str::to_string);
        results.extend(envelope.data);
        return Ok(next);
    }

    match body {
        Value::Array(items) => {
            results.extend(items);
            Ok(None)
        }
        other => {
            results.push(other);
            Ok(None)
        }
    }
}

fn bearer_headers(access_token: &str) -> Result<HeaderMap, AccApiError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", access_token))
        .map_err(|_| AccApiError::InvalidToken)?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}
