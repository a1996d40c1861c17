//! Dictionary-backed chat transport for tests (`test-util` feature).
//!
//! Replies are chosen by the first rule whose needle occurs in the request's
//! messages. Every request is recorded.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::{Error, Result};
use crate::oracle::ChatTransport;
use crate::oracle::types::{ChatMessage, ChatParams};

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    TransportFailure(String),
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    rules: Vec<(String, Reply)>,
    fallback: Option<Reply>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `text` when `needle` occurs in the request
    pub fn on(mut self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Reply::Text(text.into())));
        self
    }

    /// Fail with a transport error when `needle` occurs in the request
    pub fn fail_on(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules
            .push((needle.into(), Reply::TransportFailure(message.into())));
        self
    }

    /// Reply used when no rule matches; without one, unmatched requests fail
    pub fn otherwise(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(Reply::Text(text.into()));
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Number of requests whose text contains `needle`
    pub fn requests_matching(&self, needle: &str) -> usize {
        self.requests
            .lock()
            .map(|r| r.iter().filter(|text| text.contains(needle)).count())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn chat(&self, messages: &[ChatMessage], _params: &ChatParams) -> Result<String> {
        let text = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(text.clone());
        }

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .or(self.fallback.as_ref());

        match reply {
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::TransportFailure(message)) => Err(Error::transport(message.clone())),
            None => Err(Error::transport("No scripted reply for request")),
        }
    }
}
