//! Single requests with retry-on-429 semantics.

use chrono::Utc;
use reqwest::{header::HeaderMap, Method, Response, StatusCode};
use std::time::Duration;

use crate::error::AccApiError;
use crate::macros::setter;

/// Delay schedule for rate-limited requests.
///
/// The n-th retry waits `min(cap_units, 2^n + jitter)` units, where `jitter`
/// is the sub-second part of the wall clock. `max_attempts` is unset by
/// default, so a persistently rate-limited endpoint is polled forever.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    unit: Duration,
    cap_units: f64,
    request_timeout: Duration,
    max_attempts: Option<u32>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            cap_units: 60.0,
            request_timeout: Duration::from_secs(60),
            max_attempts: None,
        }
    }
}

impl BackoffPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(unit: Duration);
    setter!(cap_units: f64);
    setter!(request_timeout: Duration);
    setter!(opt max_attempts: u32);

    /// Delay before retry number `attempt` (starting at 1).
    pub fn delay(&self, attempt: u32, jitter: f64) -> Duration {
        let exponential = 2_f64.powi(attempt.min(32) as i32);
        let units = (exponential + jitter).min(self.cap_units);
        self.unit.mul_f64(units)
    }

    /// Upper bound on the sleep of any single retry.
    pub fn max_delay(&self) -> Duration {
        self.unit.mul_f64(self.cap_units)
    }
}

/// Sub-second component of the current time, in `[0, 1)`.
pub fn clock_jitter() -> f64 {
    f64::from(Utc::now().timestamp_subsec_millis() % 1000) / 1000.0
}

#[derive(Clone)]
pub struct BackoffRequester {
    client: reqwest::Client,
    policy: BackoffPolicy,
}

impl BackoffRequester {
    pub fn new(policy: BackoffPolicy) -> Result<Self, AccApiError> {
        let client = reqwest::Client::builder()
            .timeout(policy.request_timeout)
            .build()?;
        Ok(Self { client, policy })
    }

    /// Issue the request, sleeping and retrying for as long as the provider
    /// answers 429. Any other non-2xx status fails without retry.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        headers: Option<&HeaderMap>,
        params: &[(String, String)],
    ) -> Result<Response, AccApiError> {
        let mut attempt: u32 = 0;

        loop {
            let mut builder = self.client.request(method.clone(), url);
            if let Some(headers) = headers {
                builder = builder.headers(headers.clone());
            }
            if !params.is_empty() {
                builder = builder.query(params);
            }

            let response = builder.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                attempt += 1;
                if let Some(max_attempts) = self.policy.max_attempts {
                    if attempt >= max_attempts {
                        tracing::warn!(attempt, %url, "Giving up on rate-limited request");
                        return Err(AccApiError::RateLimited { attempts: attempt });
                    }
                }

                let delay = self.policy.delay(attempt, clock_jitter());
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    %url,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::debug!(%status, %url, "Upstream request failed");
                return Err(AccApiError::Http { status, body });
            }

            return Ok(response);
        }
    }
}
