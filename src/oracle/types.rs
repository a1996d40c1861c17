//! Message and result types exchanged with the oracle

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters for one request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Stack recommendation for a described project.
///
/// Absent keys in the oracle's reply are filled from [`Recommendation::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendation {
    pub database: String,
    pub framework: String,
    pub auth: String,
    #[serde(rename = "includeGraphQL")]
    pub include_graphql: bool,
    pub include_websockets: bool,
    pub include_global_query: bool,
    pub recommendations: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Default for Recommendation {
    fn default() -> Self {
        Self {
            database: "MongoDB".to_string(),
            framework: "Express".to_string(),
            auth: "JWT".to_string(),
            include_graphql: false,
            include_websockets: false,
            include_global_query: true,
            recommendations: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

/// Feature fragments spliced into rendered templates at the injection marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Controller,
    Route,
    App,
    GlobalQuery,
    Webhook,
    /// JSON description of a model's fields, methods and statics
    ModelSchema,
}

impl FragmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Controller => "controller",
            Self::Route => "route",
            Self::App => "app",
            Self::GlobalQuery => "global query",
            Self::Webhook => "webhook",
            Self::ModelSchema => "model schema",
        }
    }
}

impl std::fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
