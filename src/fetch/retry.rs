//! Fetch-with-retry

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::http::{HttpResponse, Requester};
use super::{FetchError, QueryParams};
use crate::config::HttpSettings;

/// `retries` retries after the first attempt, `delay` apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 5,
            delay: Duration::from_secs(1),
        }
    }
}

impl From<&HttpSettings> for RetryPolicy {
    fn from(settings: &HttpSettings) -> Self {
        Self {
            retries: settings.retries,
            delay: settings.retry_delay.as_duration(),
        }
    }
}

/// GET `url` and return its JSON body unmodified.
///
/// A missing response, a non-2xx status, an unparseable body or a JSON object
/// with a non-null `error` key all count as failed attempts.
pub async fn get_json<R>(
    requester: &R,
    url: &str,
    params: &QueryParams,
    policy: RetryPolicy,
) -> Result<Value, FetchError>
where
    R: Requester + ?Sized,
{
    fetch_with_retry(requester, url, params, policy, |response| {
        let body = response
            .json()
            .map_err(|e| format!("Could not parse response JSON: {}", e))?;

        match body.get("error") {
            Some(err) if !err.is_null() => Err(format!("Error in response JSON: {}", err)),
            _ => Ok(body),
        }
    })
    .await
}

/// GET `url` and return its body as text
pub async fn get_text<R>(
    requester: &R,
    url: &str,
    params: &QueryParams,
    policy: RetryPolicy,
) -> Result<String, FetchError>
where
    R: Requester + ?Sized,
{
    fetch_with_retry(requester, url, params, policy, |response| Ok(response.text())).await
}

async fn fetch_with_retry<R, T, F>(
    requester: &R,
    url: &str,
    params: &QueryParams,
    policy: RetryPolicy,
    accept: F,
) -> Result<T, FetchError>
where
    R: Requester + ?Sized,
    F: Fn(&HttpResponse) -> Result<T, String>,
{
    let max_attempts = policy.attempts();
    let mut attempts = 0;

    loop {
        attempts += 1;

        let outcome = match requester.get(url, params).await {
            None => Err("No response".to_string()),
            Some(response) if !response.is_success() => {
                Err(format!("HTTP {}", response.status))
            }
            Some(response) => accept(&response),
        };

        let last_error = match outcome {
            Ok(value) => {
                if attempts > 1 {
                    debug!(url, attempts, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if attempts >= max_attempts {
            error!(url, attempts, error = %last_error, "No retries remaining");
            return Err(FetchError::RetriesExhausted {
                url: url.to_string(),
                attempts,
                last_error,
            });
        }

        warn!(
            url,
            attempts,
            remaining = max_attempts - attempts,
            error = %last_error,
            "Bad response, retrying"
        );
        tokio::time::sleep(policy.delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::ScriptedRequester;
    use serde_json::json;

    const URL: &str = "https://api.example.com/newest";

    fn policy(retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_retries_with_none_response() {
        let requester = ScriptedRequester::new();

        let result = get_json(&requester, URL, &QueryParams::new(), policy(2)).await;

        assert!(matches!(
            result,
            Err(FetchError::RetriesExhausted { attempts: 3, .. })
        ));
        assert_eq!(requester.calls(URL), 3);
    }

    #[tokio::test]
    async fn test_retries_with_non_ok() {
        let requester = ScriptedRequester::new();
        requester.respond(URL, HttpResponse::new(504, r#"{"batchcomplete": ""}"#));

        let result = get_json(&requester, URL, &QueryParams::new(), policy(2)).await;

        assert!(result.is_err());
        assert_eq!(requester.calls(URL), 3);
    }

    #[tokio::test]
    async fn test_retries_with_error_json() {
        let requester = ScriptedRequester::new();
        requester.respond(URL, HttpResponse::new(200, r#"{"error": ""}"#));

        let result = get_json(&requester, URL, &QueryParams::new(), policy(2)).await;

        assert!(result.is_err());
        assert_eq!(requester.calls(URL), 3);
    }

    #[tokio::test]
    async fn test_retries_with_unparseable_body() {
        let requester = ScriptedRequester::new();
        requester.respond(URL, HttpResponse::new(200, "<html>maintenance</html>"));

        let result = get_json(&requester, URL, &QueryParams::new(), policy(0)).await;

        assert!(result.is_err());
        assert_eq!(requester.calls(URL), 1);
    }

    #[tokio::test]
    async fn test_returns_response_json_when_all_ok() {
        let requester = ScriptedRequester::new();
        requester.respond(URL, HttpResponse::new(200, r#"{"batchcomplete": ""}"#));

        let body = get_json(&requester, URL, &QueryParams::new(), policy(2))
            .await
            .unwrap();

        assert_eq!(requester.calls(URL), 1);
        assert_eq!(body, json!({"batchcomplete": ""}));
    }

    #[tokio::test]
    async fn test_null_error_key_is_not_a_failure() {
        let requester = ScriptedRequester::new();
        requester.respond(URL, HttpResponse::new(200, r#"{"error": null, "ok": true}"#));

        let body = get_json(&requester, URL, &QueryParams::new(), policy(2))
            .await
            .unwrap();

        assert_eq!(body["ok"], true);
        assert_eq!(requester.calls(URL), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let requester = ScriptedRequester::new();
        requester.respond_once(URL, None);
        requester.respond_once(URL, Some(HttpResponse::new(503, "")));
        requester.respond(URL, HttpResponse::new(200, "[1, 2, 3]"));

        let body = get_json(&requester, URL, &QueryParams::new(), policy(5))
            .await
            .unwrap();

        assert_eq!(body, json!([1, 2, 3]));
        assert_eq!(requester.calls(URL), 3);
    }

    #[tokio::test]
    async fn test_get_text() {
        let requester = ScriptedRequester::new();
        requester.respond(URL, HttpResponse::new(200, "<h1>hello</h1>"));

        let body = get_text(&requester, URL, &QueryParams::new(), policy(1))
            .await
            .unwrap();

        assert_eq!(body, "<h1>hello</h1>");
    }

    #[test]
    fn test_policy_attempts() {
        assert_eq!(RetryPolicy::default().attempts(), 6);
        assert_eq!(policy(0).attempts(), 1);
    }
}
