//! OpenAI client configuration and retry handling.

use crate::config::{OpenAISettings, RetrySettings};
use crate::error::{AskTubeError, Result};
use async_openai::error::OpenAIError;
use async_openai::{config::OpenAIConfig, Client};
use backoff::ExponentialBackoffBuilder;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Create an OpenAI client from settings.
///
/// The API key comes from `OPENAI_API_KEY`; `api_base` points the client at any
/// OpenAI-compatible endpoint. The client's own rate-limit backoff is disabled,
/// so [`with_retry`] is the only retry layer.
pub fn create_client(settings: &OpenAISettings) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .map_err(|e| AskTubeError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(api_base) = &settings.api_base {
        config = config.with_api_base(api_base);
    }

    let no_backoff = ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build();

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_backoff))
}

/// Whether an API failure is worth retrying.
///
/// async-openai drops the HTTP status, so rate limits and server errors are
/// recognised from the error body. A body that is not JSON at all comes from a
/// gateway in front of the API and is treated as a server error.
pub fn is_transient(error: &OpenAIError) -> bool {
    match error {
        OpenAIError::Reqwest(e) => e.is_timeout() || e.is_connect() || e.is_body(),
        OpenAIError::ApiError(api) => {
            let kind = api.r#type.as_deref().unwrap_or_default();
            let code = api.code.as_deref().unwrap_or_default();
            if kind == "insufficient_quota" || code == "insufficient_quota" {
                return false;
            }
            matches!(kind, "server_error" | "rate_limit_exceeded" | "requests" | "tokens")
                || code == "rate_limit_exceeded"
        }
        OpenAIError::JSONDeserialize(_) => true,
        _ => false,
    }
}

/// Run `call` until it succeeds, fails with a non-transient error, or the
/// retry budget is spent.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetrySettings,
    operation: &str,
    transient: impl Fn(&E) -> bool,
    mut call: F,
) -> std::result::Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_retries && transient(&e) => {
                attempt += 1;
                let delay = policy.backoff(attempt);
                warn!(
                    "{} failed ({}), retry {}/{} in {:?}",
                    operation, e, attempt, policy.max_retries, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
