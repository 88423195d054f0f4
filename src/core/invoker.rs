use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, WeaverError};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
        }
    }
}

impl RetryPolicy {
    /// 指數退避：base * 2^attempt，再加上 [0, base) 的隨機抖動
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let jitter = self.base_delay.mul_f64(rand::random::<f64>());
        exponential.saturating_add(jitter)
    }
}

pub struct BackoffInvoker {
    client: Client,
    endpoint: String,
    api_key: String,
    request_timeout: Option<Duration>,
    policy: RetryPolicy,
}

impl BackoffInvoker {
    pub fn new(endpoint: String, api_key: String, policy: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            request_timeout: None,
            policy,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.api_endpoint().to_string(),
            api_key: config.api_key().to_string(),
            request_timeout: config.request_timeout_secs().map(Duration::from_secs),
            policy: RetryPolicy {
                max_retries: config.max_retries(),
                base_delay: Duration::from_millis(config.backoff_base_ms()),
            },
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 送出產圖請求。429 與連線層錯誤會重試，其他失敗直接回傳
    pub async fn invoke<T: Serialize>(&self, body: &T) -> Result<reqwest::Response> {
        let mut attempt: u32 = 0;

        loop {
            tracing::debug!(
                "📡 POST {} (attempt {}/{})",
                self.endpoint,
                attempt + 1,
                self.policy.max_retries + 1
            );

            let mut request = self
                .client
                .post(&self.endpoint)
                .header("x-goog-api-key", &self.api_key)
                .json(body);
            if let Some(timeout) = self.request_timeout {
                request = request.timeout(timeout);
            }

            let fault = match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let body_text = response.text().await.unwrap_or_default();
                    WeaverError::RemoteCallError {
                        status: StatusCode::TOO_MANY_REQUESTS,
                        body: body_text,
                    }
                }
                Ok(response) => {
                    // 非 429 的 HTTP 失敗不重試
                    let status = response.status();
                    let body_text = response.text().await.unwrap_or_default();
                    tracing::error!("❌ API returned {}, not retrying", status);
                    return Err(WeaverError::RemoteCallError {
                        status,
                        body: body_text,
                    });
                }
                Err(e) => WeaverError::ApiError(e),
            };

            if attempt >= self.policy.max_retries {
                tracing::error!("❌ Giving up after {} attempts: {}", attempt + 1, fault);
                return Err(WeaverError::RetriesExhaustedError {
                    attempts: attempt + 1,
                    source: Box::new(fault),
                });
            }

            let delay = self.policy.delay_for(attempt);
            tracing::warn!(
                "⏳ Attempt {} failed ({}), retrying in {:?}",
                attempt + 1,
                fault,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(10),
        }
    }

    struct StubConfig;

    impl ConfigProvider for StubConfig {
        fn api_endpoint(&self) -> &str {
            "https://example.com/models/portrait:generateContent"
        }

        fn api_key(&self) -> &str {
            "stub-key"
        }

        fn output_path(&self) -> &str {
            "./output"
        }

        fn max_retries(&self) -> u32 {
            3
        }

        fn backoff_base_ms(&self) -> u64 {
            250
        }

        fn request_timeout_secs(&self) -> Option<u64> {
            Some(30)
        }
    }

    #[tokio::test]
    async fn test_from_config_maps_retry_policy() {
        let invoker = BackoffInvoker::from_config(&StubConfig);

        let policy = invoker.policy();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_delay_for_stays_within_backoff_bounds() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
        };

        for attempt in 0..4u32 {
            let floor = Duration::from_millis(100 * 2u64.pow(attempt));
            let ceiling = floor + Duration::from_millis(100);
            for _ in 0..10 {
                let delay = policy.delay_for(attempt);
                assert!(delay >= floor, "attempt {}: {:?} below floor", attempt, delay);
                assert!(delay < ceiling, "attempt {}: {:?} at or above ceiling", attempt, delay);
            }
        }
    }

    #[test]
    fn test_delay_for_default_policy_first_wait_is_one_to_two_seconds() {
        let policy = RetryPolicy::default();
        let delay = policy.delay_for(0);
        assert!(delay >= Duration::from_secs(1));
        assert!(delay < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_invoke_returns_success_response() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/generate");
            then.status(200).json_body(json!({"candidates": []}));
        });

        let invoker = BackoffInvoker::new(
            server.url("/generate"),
            "test-key".to_string(),
            fast_policy(2),
        );
        let response = invoker.invoke(&json!({"ping": true})).await.unwrap();

        assert_eq!(response.status(), 200);
        api_mock.assert();
    }

    #[tokio::test]
    async fn test_invoke_sends_api_key_header_and_json_body() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/generate")
                .header("x-goog-api-key", "secret-key")
                .json_body(json!({"payload": "data"}));
            then.status(200).json_body(json!({}));
        });

        let invoker = BackoffInvoker::new(
            server.url("/generate"),
            "secret-key".to_string(),
            fast_policy(0),
        );
        invoker.invoke(&json!({"payload": "data"})).await.unwrap();

        api_mock.assert();
    }

    #[tokio::test]
    async fn test_invoke_retries_rate_limited_then_succeeds() {
        let server = MockServer::start();
        let mut rate_limited = server.mock(|when, then| {
            when.method(POST).path("/generate");
            then.status(429).body("quota exceeded");
        });

        let invoker = BackoffInvoker::new(
            server.url("/generate"),
            "test-key".to_string(),
            RetryPolicy {
                max_retries: 5,
                base_delay: Duration::from_millis(200),
            },
        );
        let handle = tokio::spawn(async move { invoker.invoke(&json!({"go": 1})).await });

        // 等前兩次都吃到 429，再把 mock 換成 200
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while rate_limited.hits() < 2 {
            assert!(
                std::time::Instant::now() < deadline,
                "never saw two rate-limited attempts"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        rate_limited.delete();
        let ok_mock = server.mock(|when, then| {
            when.method(POST).path("/generate");
            then.status(200).json_body(json!({"ok": true}));
        });

        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status(), 200);
        ok_mock.assert();
    }

    #[tokio::test]
    async fn test_invoke_gives_up_after_retry_ceiling() {
        let server = MockServer::start();
        let rate_limited = server.mock(|when, then| {
            when.method(POST).path("/generate");
            then.status(429).body("quota exceeded");
        });

        let invoker = BackoffInvoker::new(
            server.url("/generate"),
            "test-key".to_string(),
            fast_policy(2),
        );
        let error = invoker.invoke(&json!({"go": 1})).await.unwrap_err();

        rate_limited.assert_hits(3);
        match error {
            WeaverError::RetriesExhaustedError { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(
                    *source,
                    WeaverError::RemoteCallError { status, .. }
                        if status == StatusCode::TOO_MANY_REQUESTS
                ));
            }
            other => panic!("expected RetriesExhaustedError, got: {}", other),
        }
    }

    #[tokio::test]
    async fn test_invoke_does_not_retry_server_error() {
        let server = MockServer::start();
        let failing = server.mock(|when, then| {
            when.method(POST).path("/generate");
            then.status(500).body("internal failure");
        });

        let invoker = BackoffInvoker::new(
            server.url("/generate"),
            "test-key".to_string(),
            fast_policy(5),
        );
        let error = invoker.invoke(&json!({"go": 1})).await.unwrap_err();

        failing.assert_hits(1);
        match error {
            WeaverError::RemoteCallError { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "internal failure");
            }
            other => panic!("expected RemoteCallError, got: {}", other),
        }
    }

    #[tokio::test]
    async fn test_invoke_retries_connection_faults_until_ceiling() {
        // 沒有任何服務在聽的端口，send 會直接回連線錯誤
        let invoker = BackoffInvoker::new(
            "http://127.0.0.1:1/generate".to_string(),
            "test-key".to_string(),
            fast_policy(1),
        );
        let error = invoker.invoke(&json!({"go": 1})).await.unwrap_err();

        match error {
            WeaverError::RetriesExhaustedError { attempts, source } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*source, WeaverError::ApiError(_)));
            }
            other => panic!("expected RetriesExhaustedError, got: {}", other),
        }
    }
}
