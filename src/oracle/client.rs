//! Typed oracle operations on top of a chat transport

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::architecture::Architecture;
use crate::core::config::OracleConfig;
use crate::core::{Error, Result};
use crate::generation::{GenerationContext, GenerationOptions};
use crate::oracle::cache::{CacheKey, CodeCache};
use crate::oracle::extract::{first_json_array, first_json_object, json_object_candidates, sanitize_code};
use crate::oracle::http::HttpChatTransport;
use crate::oracle::types::{ChatMessage, ChatParams, FragmentKind, Recommendation};
use crate::oracle::{ChatTransport, Oracle, prompts};

pub struct OracleClient {
    transport: Arc<dyn ChatTransport>,
    params: ChatParams,
    cache: Mutex<CodeCache>,
}

impl OracleClient {
    pub fn new(transport: Arc<dyn ChatTransport>, params: ChatParams) -> Self {
        Self {
            transport,
            params,
            cache: Mutex::new(CodeCache::new()),
        }
    }

    /// Client over HTTPS; fails with a configuration error when no key is set
    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::config("No API key configured (set APIFORGE_API_KEY)"))?;
        let transport = HttpChatTransport::new(config, api_key)?;
        Ok(Self::new(Arc::new(transport), params_from(config)))
    }

    /// Entries currently held in the reusable-code cache
    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }

    async fn ask(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.transport.chat(&messages, &self.params).await
    }
}

pub fn params_from(config: &OracleConfig) -> ChatParams {
    ChatParams {
        model: config.model.clone(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// First object candidate that looks like an architecture document
fn parse_architecture(reply: &str) -> Result<Architecture> {
    for candidate in json_object_candidates(reply) {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) else {
            continue;
        };
        if value.get("files").is_none() && value.get("folders").is_none() {
            continue;
        }
        return serde_json::from_value(value)
            .map_err(|e| Error::protocol(format!("Architecture JSON has the wrong shape: {e}")));
    }
    Err(Error::protocol("No architecture JSON object in oracle reply"))
}

/// Singular lower-case names, de-duplicated in order of appearance
fn parse_entities(reply: &str) -> Result<Vec<String>> {
    let slice = first_json_array(reply)
        .ok_or_else(|| Error::protocol("No JSON array in entity reply"))?;
    let values: Vec<serde_json::Value> = serde_json::from_str(slice)
        .map_err(|e| Error::protocol(format!("Entity list is not valid JSON: {e}")))?;

    let mut entities: Vec<String> = Vec::new();
    for value in values {
        let name = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Object(map) => match map.get("name") {
                Some(serde_json::Value::String(s)) => s.clone(),
                _ => continue,
            },
            _ => continue,
        };
        let name = name.trim().to_lowercase();
        if !name.is_empty() && !entities.contains(&name) {
            entities.push(name);
        }
    }
    Ok(entities)
}

#[async_trait]
impl Oracle for OracleClient {
    async fn generate_architecture(
        &self,
        description: &str,
        options: &GenerationOptions,
    ) -> Result<Architecture> {
        let reply = self
            .ask(prompts::architecture_messages(description, options))
            .await?;
        let mut architecture = parse_architecture(&reply)?;
        architecture.refresh_optimization_info();
        info!(
            folders = architecture.folders.len(),
            files = architecture.files.len(),
            "Oracle proposed architecture"
        );
        Ok(architecture)
    }

    async fn generate_code(
        &self,
        file_path: &str,
        description: &str,
        context: &GenerationContext,
    ) -> Result<String> {
        let key = CacheKey::for_path(file_path, &context.database);
        if let Some(key) = &key {
            if let Some(code) = self.cache.lock().await.get(key) {
                return Ok(code.clone());
            }
        }

        debug!(target_file = %prompts::describe_target(file_path), "Requesting code");
        let reply = self
            .ask(prompts::code_messages(file_path, description, context))
            .await?;
        let code = sanitize_code(&reply);
        if code.is_empty() {
            return Err(Error::protocol(format!("Oracle returned no code for {file_path}")));
        }

        if let Some(key) = key {
            self.cache.lock().await.insert(key, code.clone());
        }
        Ok(code)
    }

    async fn generate_fragment(
        &self,
        kind: FragmentKind,
        description: &str,
        context: &GenerationContext,
    ) -> Result<String> {
        let reply = self
            .ask(prompts::fragment_messages(kind, description, context))
            .await?;
        if kind == FragmentKind::ModelSchema {
            return first_json_object(&reply)
                .map(str::to_string)
                .ok_or_else(|| Error::protocol("No JSON object in model schema reply"));
        }
        Ok(sanitize_code(&reply))
    }

    async fn generate_recommendation(
        &self,
        description: &str,
        prompt: &str,
    ) -> Result<Recommendation> {
        let reply = self
            .ask(prompts::recommendation_messages(description, prompt))
            .await?;
        let parsed = first_json_object(&reply)
            .and_then(|slice| serde_json::from_str::<Recommendation>(slice).ok());
        Ok(parsed.unwrap_or_else(|| {
            warn!("Recommendation reply had no usable JSON; using defaults");
            Recommendation::default()
        }))
    }

    async fn extract_entities(&self, description: &str) -> Result<Vec<String>> {
        let reply = self.ask(prompts::entity_messages(description)).await?;
        let entities = parse_entities(&reply)?;
        debug!(entities = ?entities, "Extracted entities");
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::{FileSpec, TemplateType};
    use crate::oracle::fixture::ScriptedTransport;

    fn client(transport: ScriptedTransport) -> (OracleClient, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let client = OracleClient::new(
            transport.clone(),
            ChatParams {
                model: "fixture".into(),
                temperature: 0.0,
                max_tokens: 100,
            },
        );
        (client, transport)
    }

    fn context() -> GenerationContext {
        let arch = Architecture::new(
            vec![],
            vec![FileSpec::templated("models/user.js", "", TemplateType::Model)],
        );
        GenerationContext::new("users", "users-api", &GenerationOptions::default(), &arch)
    }

    #[tokio::test]
    async fn test_architecture_extracted_from_prose() {
        let (client, _) = client(ScriptedTransport::new().otherwise(
            "Sure! {note} Here it is:\n```json\n{\"folders\":[{\"path\":\"models\"}],\
             \"files\":[{\"path\":\"models/user.js\",\"useTemplate\":true,\"templateType\":\"model\"}]}\n```",
        ));
        let arch = client
            .generate_architecture("users", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(arch.files.len(), 1);
        assert_eq!(arch.optimization_info.unwrap().template_files, 1);
    }

    #[tokio::test]
    async fn test_architecture_without_json_is_protocol_error() {
        let (client, _) = client(ScriptedTransport::new().otherwise("I cannot help with that."));
        let err = client
            .generate_architecture("users", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::OracleProtocol(_)));
    }

    #[tokio::test]
    async fn test_code_is_sanitized() {
        let (client, _) =
            client(ScriptedTransport::new().otherwise("```javascript\nconst x=1;\n```"));
        let code = client
            .generate_code("controllers/userController.js", "Users", &context())
            .await
            .unwrap();
        assert_eq!(code, "const x=1;\n");
    }

    #[tokio::test]
    async fn test_cacheable_code_is_reused() {
        let (client, transport) =
            client(ScriptedTransport::new().otherwise("module.exports = (req, res, next) => next();"));
        let ctx = context();
        let first = client
            .generate_code("middleware/auth.js", "Auth", &ctx)
            .await
            .unwrap();
        let second = client
            .generate_code("middleware/auth.js", "Auth again", &ctx)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.request_count(), 1);

        client
            .generate_code("models/user.js", "User", &ctx)
            .await
            .unwrap();
        client
            .generate_code("models/user.js", "User", &ctx)
            .await
            .unwrap();
        assert_eq!(transport.request_count(), 3);
        assert_eq!(client.cached_entries().await, 1);
    }

    #[tokio::test]
    async fn test_entities_deduplicated() {
        let (client, _) = client(
            ScriptedTransport::new().otherwise("Entities: [\"User\", \"post\", \"user\", {\"name\": \"tag\"}]"),
        );
        let entities = client.extract_entities("blog").await.unwrap();
        assert_eq!(entities, vec!["user", "post", "tag"]);
    }

    #[tokio::test]
    async fn test_recommendation_defaults_on_prose() {
        let (client, _) = client(ScriptedTransport::new().otherwise("Use whatever you like."));
        let rec = client.generate_recommendation("shop", "").await.unwrap();
        assert_eq!(rec, Recommendation::default());
    }

    #[tokio::test]
    async fn test_transport_errors_surface() {
        let (client, _) = client(ScriptedTransport::new().fail_on("", "timeout"));
        let err = client.extract_entities("blog").await.unwrap_err();
        assert!(matches!(err, Error::OracleTransport(_)));
    }
}
