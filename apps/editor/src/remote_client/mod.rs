/// Remote client: the single point of entry for calls to the resume service.
///
/// No other module talks HTTP. The enhancement and persistence layers see this
/// client only through the `EnhanceService` and `ResumeStore` traits.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::enhance::{EnhanceRequest, EnhanceService};
use crate::persistence::{ResumeStore, SaveReceipt, SaveRequest};

const ENHANCE_PATH: &str = "/ai-enhance";
const SAVE_PATH: &str = "/save-resume";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum RemoteCallError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status})")]
    Api { status: u16, detail: Option<String> },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No enhanced content received")]
    EmptyContent,

    #[error("Gave up after {retries} retries")]
    RetriesExhausted { retries: u32 },
}

impl RemoteCallError {
    /// The most specific user-facing text this error carries, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            RemoteCallError::Api { detail, .. } => detail.as_deref(),
            RemoteCallError::EmptyContent => Some("No enhanced content received"),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            RemoteCallError::Http(_) => true,
            RemoteCallError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// HTTP client for the enhancement/storage service.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteCallError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        })
    }

    /// Overrides the enhancement retry policy. `max_retries` counts attempts,
    /// so 1 disables retrying.
    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_base_delay = base_delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends one JSON POST and returns the body of a 2xx response.
    async fn post_once<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, RemoteCallError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("{} returned {}: {}", path, status, text);
            return Err(RemoteCallError::Api {
                status: status.as_u16(),
                detail: error_detail(&text),
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl EnhanceService for ApiClient {
    /// Retries transport failures, 429 and 5xx with exponential backoff.
    async fn enhance(&self, request: &EnhanceRequest) -> Result<String, RemoteCallError> {
        let mut last_error: Option<RemoteCallError> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.retry_base_delay, attempt);
                warn!(
                    "Enhance attempt {} for '{}' failed, retrying after {}ms...",
                    attempt,
                    request.section,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.post_once(ENHANCE_PATH, request).await {
                Ok(body) => {
                    debug!("Enhance call for '{}' succeeded", request.section);
                    return parse_enhance_body(&body);
                }
                Err(e) if e.is_retryable() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(RemoteCallError::RetriesExhausted {
            retries: self.max_retries,
        }))
    }
}

#[async_trait]
impl ResumeStore for ApiClient {
    async fn save(&self, request: &SaveRequest) -> Result<SaveReceipt, RemoteCallError> {
        let body = self.post_once(SAVE_PATH, request).await?;
        parse_save_body(&body)
    }
}

/// Delay before retry number `attempt` (1-based): the base delay doubled per
/// earlier retry, saturating instead of overflowing.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Extracts rewritten text from an enhancement response. Either `enhanced` or
/// `content` is accepted; the first non-empty string wins.
pub fn parse_enhance_body(body: &str) -> Result<String, RemoteCallError> {
    let value: Value = serde_json::from_str(body)?;
    ["enhanced", "content"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(RemoteCallError::EmptyContent)
}

pub fn parse_save_body(body: &str) -> Result<SaveReceipt, RemoteCallError> {
    Ok(serde_json::from_str(body)?)
}

/// Pulls `detail` (or `message`) out of an error body.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message"].iter().find_map(|key| match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enhance_body_prefers_enhanced() {
        let body = r#"{"enhanced": "Sharper text", "content": "Other"}"#;
        assert_eq!(parse_enhance_body(body).unwrap(), "Sharper text");
    }

    #[test]
    fn test_parse_enhance_body_falls_back_to_content() {
        let body = r#"{"enhanced": "", "content": "From content"}"#;
        assert_eq!(parse_enhance_body(body).unwrap(), "From content");
    }

    #[test]
    fn test_parse_enhance_body_rejects_other_shapes() {
        assert!(matches!(
            parse_enhance_body(r#"{"result": "x"}"#),
            Err(RemoteCallError::EmptyContent)
        ));
        assert!(matches!(
            parse_enhance_body(r#"{"enhanced": 12}"#),
            Err(RemoteCallError::EmptyContent)
        ));
        assert!(matches!(
            parse_enhance_body("<html>"),
            Err(RemoteCallError::Parse(_))
        ));
    }

    #[test]
    fn test_backoff_doubles_per_retry() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_saturates_for_long_retry_policies() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 40), base * u32::MAX);
        assert_eq!(backoff_delay(Duration::from_secs(u64::MAX), 2), Duration::MAX);
        assert_eq!(backoff_delay(Duration::ZERO, 64), Duration::ZERO);
    }

    #[test]
    fn test_parse_save_body_reads_optional_fields() {
        let receipt = parse_save_body(
            r#"{"message": "Resume saved successfully", "download_url": "/download-resume/a.json"}"#,
        )
        .unwrap();
        assert_eq!(receipt.message.as_deref(), Some("Resume saved successfully"));
        assert_eq!(receipt.download_url.as_deref(), Some("/download-resume/a.json"));
        assert_eq!(receipt.filename, None);

        assert_eq!(parse_save_body("{}").unwrap(), SaveReceipt::default());
    }

    #[test]
    fn test_error_detail_extraction() {
        assert_eq!(error_detail(r#"{"detail": "disk full"}"#).as_deref(), Some("disk full"));
        assert_eq!(error_detail(r#"{"message": "bad input"}"#).as_deref(), Some("bad input"));
        assert_eq!(
            error_detail(r#"{"detail": [{"loc": ["body"]}]}"#).as_deref(),
            Some(r#"[{"loc":["body"]}]"#)
        );
        assert_eq!(error_detail("Internal Server Error"), None);
        assert_eq!(error_detail(r#"{"detail": ""}"#), None);
    }

    #[test]
    fn test_retryable_statuses() {
        let api = |status| RemoteCallError::Api {
            status,
            detail: None,
        };
        assert!(api(429).is_retryable());
        assert!(api(503).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(!RemoteCallError::EmptyContent.is_retryable());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.endpoint(ENHANCE_PATH), "http://localhost:8000/ai-enhance");
    }
}
