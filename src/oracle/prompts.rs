//! Prompt construction. Prompts are data: each request is a fixed system
//! message plus a user message composed from the description and context.

use crate::architecture::FileRole;
use crate::architecture::role::basename;
use crate::generation::{GenerationContext, GenerationOptions};
use crate::oracle::types::{ChatMessage, FragmentKind};

const RAW_SOURCE_RULE: &str = "Reply with the raw file content only. Do not wrap it in \
markdown code fences, do not add explanations and do not start with a file path comment.";

const ARCHITECTURE_SYSTEM: &str = r#"You are a senior backend architect. Design the folder and file structure of a backend API project.
Reply with a single JSON object and nothing else, shaped as:
{
  "folders": [{"path": "models", "description": "..."}],
  "files": [{"path": "models/user.js", "description": "...", "useTemplate": true, "templateType": "model"}]
}
Paths are relative, POSIX style, without a leading slash.
Set "useTemplate": true only for standard files and give "templateType" as one of
model, controller, route, middleware, config, main. Business-specific files use "useTemplate": false."#;

const ENTITY_SYSTEM: &str = "You extract domain entities from API descriptions. Reply with a JSON \
array of singular, lower-case entity names, for example [\"user\", \"post\"]. No other text.";

const RECOMMENDATION_SYSTEM: &str = r#"You advise on backend technology choices. Reply with a single JSON object:
{"database": "...", "framework": "...", "auth": "...", "includeGraphQL": false,
 "includeWebsockets": false, "includeGlobalQuery": true,
 "recommendations": ["..."], "suggestions": ["..."]}"#;

pub fn architecture_messages(description: &str, options: &GenerationOptions) -> Vec<ChatMessage> {
    let mut user = format!(
        "Project description: {description}\n\
         Language: {}\nFramework: {}\nDatabase: {}\nAuthentication: {}\n",
        options.language, options.framework, options.database, options.auth
    );
    if options.include_graphql {
        user.push_str("Include a GraphQL layer.\n");
    }
    if options.include_websockets {
        user.push_str("Include websocket support.\n");
    }
    if options.include_global_query {
        user.push_str("Include a cross-model search route at routes/globalQuery.js.\n");
    }
    vec![ChatMessage::system(ARCHITECTURE_SYSTEM), ChatMessage::user(user)]
}

pub fn entity_messages(description: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(ENTITY_SYSTEM),
        ChatMessage::user(format!("Description: {description}")),
    ]
}

pub fn recommendation_messages(description: &str, prompt: &str) -> Vec<ChatMessage> {
    let mut user = format!("Project description: {description}\n");
    if !prompt.trim().is_empty() {
        user.push_str(&format!("Additional requirements: {prompt}\n"));
    }
    vec![ChatMessage::system(RECOMMENDATION_SYSTEM), ChatMessage::user(user)]
}

/// Prompt for a whole file, specialised by the file's role
pub fn code_messages(path: &str, description: &str, context: &GenerationContext) -> Vec<ChatMessage> {
    let role = FileRole::classify(path);
    let focus = match role {
        FileRole::Model => format!(
            "Write a {} data model. Define fields with types and validation, \
             timestamps, and export the model.",
            model_layer(&context.database)
        ),
        FileRole::Controller => "Write a controller with create, list, get by id, update and \
             delete handlers. Import the model it manages from ../models, validate input and \
             answer with proper HTTP status codes."
            .to_string(),
        FileRole::Route => format!(
            "Write a {} router wiring HTTP verbs to the matching controller in ../controllers. \
             Protect mutating routes with the {} middleware when authentication is enabled.",
            context.framework, context.auth
        ),
        FileRole::Middleware => format!(
            "Write {} middleware. For authentication use {}, read secrets from process.env and \
             answer 401 on failure.",
            context.framework, context.auth
        ),
        FileRole::Config => format!(
            "Write a configuration file. Read every secret and connection string from \
             process.env and connect to {} where relevant.",
            context.database
        ),
        FileRole::Main | FileRole::Other => "Write the file so that it fits the rest of the \
             project and can be required by the other modules."
            .to_string(),
    };

    let system = format!(
        "You are an expert {} developer using {} with {} and {} authentication. {focus} {RAW_SOURCE_RULE}",
        context.language, context.framework, context.database, context.auth
    );
    let user = format!(
        "Project: {}\nProject description: {}\nFile: {path}\nPurpose: {description}\n\n{}",
        context.project_name,
        context.description,
        project_summary(context)
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Prompt for a fragment spliced at a template's injection marker
pub fn fragment_messages(
    kind: FragmentKind,
    description: &str,
    context: &GenerationContext,
) -> Vec<ChatMessage> {
    let task = match kind {
        FragmentKind::ModelSchema => format!(
            "Describe the fields of the model as a JSON object {{\"fields\": [{{\"name\": \"...\", \
             \"type\": \"...\", \"required\": true, \"unique\": false, \"default\": null, \
             \"ref\": null}}], \"methods\": [{{\"name\": \"...\", \"implementation\": \"...\"}}], \
             \"statics\": []}}. Types are {} types. Reply with the JSON object only.",
            model_layer(&context.database)
        ),
        FragmentKind::Controller => "Write additional controller handler functions beyond CRUD \
             that this resource needs. Export nothing; the handlers are added to the existing \
             exported object."
            .to_string(),
        FragmentKind::Route => "Write additional router.<verb>(...) registrations beyond CRUD \
             that this resource needs, using the existing `router` and `controller` bindings."
            .to_string(),
        FragmentKind::App => "Write extra application-level setup statements (middleware, \
             health checks) using the existing `app` binding."
            .to_string(),
        FragmentKind::GlobalQuery => "Write extra search helpers for the cross-model query \
             route using the existing `router` and `models` bindings."
            .to_string(),
        FragmentKind::Webhook => "Write the event handler functions for the webhook receiver, \
             one per event type, using the existing `handlers` object."
            .to_string(),
    };
    let raw = if kind == FragmentKind::ModelSchema {
        ""
    } else {
        RAW_SOURCE_RULE
    };
    let system = format!(
        "You are an expert {} developer using {} with {}. {task} {raw}",
        context.language, context.framework, context.database
    );
    let user = format!(
        "Project description: {}\nTarget: {description}\n\n{}",
        context.description,
        project_summary(context)
    );
    vec![ChatMessage::system(system.trim_end().to_string()), ChatMessage::user(user)]
}

/// Short, deterministic listing of the project for grounding imports
fn project_summary(context: &GenerationContext) -> String {
    let mut out = String::from("Project files:\n");
    for file in &context.files {
        out.push_str(&format!("- {}: {}\n", file.path, file.description));
    }
    if !context.models.is_empty() {
        let names: Vec<&str> = context.models.iter().map(|m| m.name.as_str()).collect();
        out.push_str(&format!("Models: {}\n", names.join(", ")));
    }
    if !context.routes.is_empty() {
        let mounts: Vec<String> = context
            .routes
            .iter()
            .map(|r| format!("/api/{} -> routes/{}", r.path, r.file))
            .collect();
        out.push_str(&format!("Routes: {}\n", mounts.join(", ")));
    }
    out
}

fn model_layer(database: &str) -> &'static str {
    match database.to_lowercase().as_str() {
        "mongodb" | "mongo" => "Mongoose",
        _ => "Sequelize",
    }
}

/// Short label used in log lines
pub fn describe_target(path: &str) -> String {
    format!("{} ({})", basename(path), FileRole::classify(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::{Architecture, FileSpec, TemplateType};

    fn context() -> GenerationContext {
        let arch = Architecture::new(
            vec![],
            vec![FileSpec::templated("models/user.js", "Users", TemplateType::Model)],
        );
        GenerationContext::new("user api", "users", &GenerationOptions::default(), &arch)
    }

    #[test]
    fn test_code_prompt_by_role() {
        let ctx = context();
        let model = code_messages("models/user.js", "User model", &ctx);
        assert!(model[0].content.contains("Mongoose"));
        assert!(model[0].content.contains("JWT"));
        assert!(model[0].content.contains("code fences"));
        let ctrl = code_messages("controllers/userController.js", "Users", &ctx);
        assert!(ctrl[0].content.contains("controller"));
        assert!(ctrl[1].content.contains("models/user.js"));
    }

    #[test]
    fn test_architecture_prompt_mentions_options() {
        let options = GenerationOptions {
            include_global_query: true,
            database: "PostgreSQL".into(),
            ..Default::default()
        };
        let messages = architecture_messages("shop", &options);
        assert!(messages[1].content.contains("PostgreSQL"));
        assert!(messages[1].content.contains("routes/globalQuery.js"));
    }
}
