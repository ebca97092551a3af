//! HTTP client used by every provider

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{FetchError, QueryParams};
use crate::config::HttpSettings;

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Single GET against a remote source.
///
/// `None` means no response was obtained at all (connection refused, timeout,
/// unreadable body); callers treat it like any other failed attempt.
#[async_trait]
pub trait Requester: Send + Sync {
    async fn get(&self, url: &str, params: &QueryParams) -> Option<HttpResponse>;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct RequesterConfig {
    /// Minimum time between the start of two consecutive requests
    pub delay: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for RequesterConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            user_agent: "ccingest/0.1.0".to_string(),
        }
    }
}

impl From<&HttpSettings> for RequesterConfig {
    fn from(settings: &HttpSettings) -> Self {
        Self {
            delay: settings.request_delay.as_duration(),
            request_timeout: settings.timeout.as_duration(),
            user_agent: settings.user_agent.clone(),
            ..Self::default()
        }
    }
}

/// reqwest-backed requester that spaces requests at least `delay` apart
pub struct DelayedRequester {
    client: Client,
    config: RequesterConfig,
    last_request: Mutex<Option<Instant>>,
}

impl DelayedRequester {
    pub fn new(config: RequesterConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            config,
            last_request: Mutex::new(None),
        })
    }

    async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.config.delay;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }

    async fn get_once(&self, url: &str, params: &QueryParams) -> Result<HttpResponse, reqwest::Error> {
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl Requester for DelayedRequester {
    async fn get(&self, url: &str, params: &QueryParams) -> Option<HttpResponse> {
        self.wait_turn().await;
        debug!(url, "Sending request");

        match self.get_once(url, params).await {
            Ok(response) => {
                debug!(url, status = response.status, size = response.body.len(), "Request completed");
                Some(response)
            }
            Err(e) => {
                let kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_redirect() {
                    "too many redirects"
                } else if e.is_connect() {
                    "connect"
                } else {
                    "request"
                };
                warn!(url, kind, error = %e, "Request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::HumanDuration;

    #[test]
    fn test_requester_config_defaults() {
        let config = RequesterConfig::default();
        assert_eq!(config.delay, Duration::from_secs(1));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "ccingest/0.1.0");
    }

    #[test]
    fn test_requester_config_from_settings() {
        let settings = HttpSettings {
            request_delay: HumanDuration::from_millis(300),
            timeout: HumanDuration::from_secs(5),
            user_agent: "agent/2".to_string(),
            ..HttpSettings::default()
        };

        let config = RequesterConfig::from(&settings);
        assert_eq!(config.delay, Duration::from_millis(300));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "agent/2");
    }

    #[test]
    fn test_response_helpers() {
        let ok = HttpResponse::new(204, "");
        assert!(ok.is_success());
        assert!(!HttpResponse::new(504, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());

        let json = HttpResponse::new(200, r#"{"id": 5}"#);
        assert_eq!(json.json().unwrap()["id"], 5);
        assert_eq!(json.text(), r#"{"id": 5}"#);
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_none() {
        let requester = DelayedRequester::new(RequesterConfig {
            delay: Duration::ZERO,
            connect_timeout: Duration::from_millis(200),
            request_timeout: Duration::from_millis(200),
            ..RequesterConfig::default()
        })
        .unwrap();

        let response = requester
            .get("http://127.0.0.1:1/unreachable", &QueryParams::new())
            .await;
        assert!(response.is_none());
    }
}
