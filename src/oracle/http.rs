//! OpenAI-compatible chat-completions transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::core::config::{ApiKey, OracleConfig};
use crate::core::{Error, Result};
use crate::oracle::ChatTransport;
use crate::oracle::types::{ChatMessage, ChatParams};

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Outcome of one attempt: either final or worth retrying
enum Attempt {
    Done(Result<String>),
    Retry(Error),
}

/// Sends chat requests over HTTPS with bearer authentication.
///
/// Network errors, 429 and 5xx are retried with exponential backoff;
/// authentication failures are returned immediately.
pub struct HttpChatTransport {
    client: Client,
    endpoint: Url,
    api_key: ApiKey,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl HttpChatTransport {
    pub fn new(config: &OracleConfig, api_key: ApiKey) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {e}")))?;

        let endpoint = Url::parse(&format!(
            "{}/chat/completions",
            config.base_url.as_str().trim_end_matches('/')
        ))
        .map_err(|e| Error::config(format!("Invalid oracle base URL: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_secs(1),
        })
    }

    /// Override the first backoff delay; later delays double it
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    async fn attempt(&self, body: &ChatRequest<'_>) -> Attempt {
        let response = match self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(Error::transport(format!("Request failed: {e}"))),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Attempt::Done(Err(Error::transport(format!(
                "Authentication rejected by oracle (HTTP {status})"
            ))));
        }
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Attempt::Retry(Error::transport(format!("Oracle returned HTTP {status}")));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Attempt::Done(Err(Error::transport(format!(
                "Oracle returned HTTP {status}: {detail}"
            ))));
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                return Attempt::Done(Err(Error::protocol(format!(
                    "Malformed chat completion body: {e}"
                ))));
            }
        };
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        Attempt::Done(content.ok_or_else(|| Error::protocol("Chat completion had no content")))
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn chat(&self, messages: &[ChatMessage], params: &ChatParams) -> Result<String> {
        let body = ChatRequest {
            messages,
            model: &params.model,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(self.retry_base_delay, attempt)).await;
            }
            debug!(attempt, model = %params.model, "Sending chat completion request");
            match self.attempt(&body).await {
                Attempt::Done(result) => return result,
                Attempt::Retry(e) => {
                    if attempt < self.max_retries {
                        warn!(
                            error = %e,
                            "Oracle request failed (attempt {}/{}), retrying...",
                            attempt + 1,
                            self.max_retries + 1
                        );
                    }
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| Error::transport("All retry attempts failed")))
    }
}

/// `base * 2^(attempt - 1)`, saturating for large retry counts
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}
