//! LLM oracle: typed requests, response extraction and the transport seam.

pub mod cache;
pub mod client;
pub mod extract;
#[cfg(any(test, feature = "test-util"))]
pub mod fixture;
pub mod http;
pub mod prompts;
pub mod types;

use async_trait::async_trait;

use crate::architecture::Architecture;
use crate::core::Result;
use crate::generation::{GenerationContext, GenerationOptions};

pub use client::OracleClient;
#[cfg(any(test, feature = "test-util"))]
pub use fixture::ScriptedTransport;
pub use http::HttpChatTransport;
pub use types::{ChatMessage, ChatParams, ChatRole, FragmentKind, Recommendation};

/// Raw chat-completion exchange
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage], params: &ChatParams) -> Result<String>;
}

/// Operations the generation pipeline asks of the model
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Folders and files for the described project.
    ///
    /// Fails with `OracleProtocol` when no architecture JSON can be recovered.
    async fn generate_architecture(
        &self,
        description: &str,
        options: &GenerationOptions,
    ) -> Result<Architecture>;

    /// Full source of one file, fence-free
    async fn generate_code(
        &self,
        file_path: &str,
        description: &str,
        context: &GenerationContext,
    ) -> Result<String>;

    /// Additional-feature fragment for a template's injection marker
    async fn generate_fragment(
        &self,
        kind: FragmentKind,
        description: &str,
        context: &GenerationContext,
    ) -> Result<String>;

    async fn generate_recommendation(&self, description: &str, prompt: &str)
    -> Result<Recommendation>;

    /// Singular lower-case domain entities named by the description
    async fn extract_entities(&self, description: &str) -> Result<Vec<String>>;
}
