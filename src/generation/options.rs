//! Run options supplied by the driver

use serde::{Deserialize, Serialize};

/// Options controlling one generation run.
///
/// Unknown keys are ignored and absent keys take their defaults, so saved
/// configurations and recovery files written by older builds still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub database: String,
    pub framework: String,
    pub auth: String,
    #[serde(rename = "includeGraphQL")]
    pub include_graphql: bool,
    pub include_websockets: bool,
    pub include_global_query: bool,
    pub use_templates: bool,
    pub generate_zip: bool,
    pub continue_on_error: bool,
    pub allow_preview_edit: bool,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookSpec>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            name: None,
            database: "MongoDB".to_string(),
            framework: "Express".to_string(),
            auth: "JWT".to_string(),
            include_graphql: false,
            include_websockets: false,
            include_global_query: false,
            use_templates: true,
            generate_zip: false,
            continue_on_error: false,
            allow_preview_edit: false,
            language: "JavaScript".to_string(),
            webhook: None,
        }
    }
}

impl GenerationOptions {
    /// Whether the configured database is a SQL engine (Sequelize models)
    pub fn is_sql(&self) -> bool {
        matches!(
            self.database.to_lowercase().as_str(),
            "postgresql" | "postgres" | "mysql" | "mariadb" | "sqlite" | "mssql"
        )
    }

    pub fn uses_auth(&self) -> bool {
        !matches!(self.auth.to_lowercase().as_str(), "" | "none")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureMethod {
    #[default]
    Hmac,
    Token,
    None,
}

impl std::str::FromStr for SignatureMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hmac" => Ok(Self::Hmac),
            "token" => Ok(Self::Token),
            "none" => Ok(Self::None),
            _ => Err(format!("Unknown signature method: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEventType {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

/// Inbound webhook receiver description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSpec {
    pub service_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,
    #[serde(default)]
    pub signature_method: SignatureMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_prefix: Option<String>,
    #[serde(default)]
    pub challenge: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_param: Option<String>,
    #[serde(default = "default_event_type_field")]
    pub event_type_field: String,
    #[serde(default)]
    pub event_types: Vec<WebhookEventType>,
}

fn default_event_type_field() -> String {
    "type".to_string()
}

impl WebhookSpec {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            description: String::new(),
            verification_token: None,
            signature_method: SignatureMethod::default(),
            signature_header: None,
            hash_algorithm: None,
            digest_format: None,
            signature_prefix: None,
            challenge: false,
            challenge_param: None,
            event_type_field: default_event_type_field(),
            event_types: Vec::new(),
        }
    }
}
