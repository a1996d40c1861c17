//! End-to-end generation runs against a scripted oracle

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use apiforge::architecture::{Architecture, Category, FileSpec, FolderSpec};
use apiforge::core::{Error, Result};
use apiforge::generation::{
    Diagram, GenerationOptions, GenerationOutcome, GenerationRequest, GenerationResult, Phase,
    ProjectGenerator, SavedConfigStore, WebhookSpec,
};
use apiforge::oracle::{ChatParams, Oracle, OracleClient, ScriptedTransport};
use apiforge::storage::{DiagramRecord, DiagramRepository, SqliteDiagramRepository};
use apiforge::templates::TemplateEngine;
use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;

const ARCHITECT: &str = "senior backend architect";
const ENTITIES: &str = "extract domain entities";
const MODEL_SCHEMA: &str = "Describe the fields";

const BLOG_ARCHITECTURE: &str = r#"Here is the structure:
```json
{
  "folders": [
    {"path": "models", "description": "Data models"},
    {"path": "controllers", "description": "Handlers"},
    {"path": "routes", "description": "Routes"},
    {"path": "config", "description": "Configuration"}
  ],
  "files": [
    {"path": "models/user.js", "description": "User account", "useTemplate": true, "templateType": "model"},
    {"path": "models/post.js", "description": "Blog post", "useTemplate": true, "templateType": "model"},
    {"path": "controllers/userController.js", "description": "Users", "useTemplate": true, "templateType": "controller"},
    {"path": "controllers/postController.js", "description": "Posts", "useTemplate": true, "templateType": "controller"},
    {"path": "routes/userRoutes.js", "description": "User routes", "useTemplate": true, "templateType": "route"},
    {"path": "routes/postRoutes.js", "description": "Post routes", "useTemplate": true, "templateType": "route"},
    {"path": "app.js", "description": "Entry point", "useTemplate": true, "templateType": "main"}
  ]
}
```"#;

const POST_SCHEMA: &str = r#"{"fields": [{"name": "title", "type": "String", "required": true}]}"#;

const GLOBAL_QUERY_LINE: &str = "app.use('/api/global-query', require('./routes/globalQuery'));";

fn client(transport: ScriptedTransport) -> (Arc<dyn Oracle>, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let oracle = OracleClient::new(
        transport.clone(),
        ChatParams {
            model: "fixture".into(),
            temperature: 0.0,
            max_tokens: 1000,
        },
    );
    (Arc::new(oracle), transport)
}

fn generator(transport: ScriptedTransport, workspace: &Path) -> (ProjectGenerator, Arc<ScriptedTransport>) {
    let (oracle, transport) = client(transport);
    let generator = ProjectGenerator::new(oracle, TemplateEngine::embedded())
        .with_saved_store(SavedConfigStore::new(workspace.join("saved-projects")));
    (generator, transport)
}

/// Oracle that proposes the blog architecture and answers everything else generically
fn blog_oracle() -> ScriptedTransport {
    ScriptedTransport::new()
        .on(ARCHITECT, BLOG_ARCHITECTURE)
        .on(ENTITIES, r#"["user", "post"]"#)
        .on(MODEL_SCHEMA, POST_SCHEMA)
        .otherwise("// extra\n")
}

fn blog_options() -> GenerationOptions {
    GenerationOptions {
        database: "MongoDB".into(),
        framework: "Express".into(),
        auth: "JWT".into(),
        include_global_query: false,
        ..Default::default()
    }
}

fn completed(outcome: GenerationOutcome) -> GenerationResult {
    match outcome {
        GenerationOutcome::Completed(result) => result,
        GenerationOutcome::Paused(paused) => panic!("run paused: {paused:?}"),
    }
}

fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("{}: {e}", path.as_ref().display()))
}

fn ten_file_architecture() -> Architecture {
    Architecture::new(
        vec![],
        vec![
            FileSpec::custom("config/database.js", "Connection"),
            FileSpec::custom("models/user.js", "User"),
            FileSpec::custom("models/post.js", "Post"),
            FileSpec::custom("models/comment.js", "Comment"),
            FileSpec::custom("models/tag.js", "Tag"),
            FileSpec::custom("controllers/userController.js", "Users"),
            FileSpec::custom("controllers/postController.js", "Posts"),
            FileSpec::custom("routes/userRoutes.js", "User routes"),
            FileSpec::custom("routes/postRoutes.js", "Post routes"),
            FileSpec::custom("utils/slugify.js", "Slug helper"),
        ],
    )
}

fn synthesized_options() -> GenerationOptions {
    GenerationOptions {
        use_templates: false,
        ..Default::default()
    }
}

/// Repository whose writes always fail
struct BrokenRepository;

#[async_trait]
impl DiagramRepository for BrokenRepository {
    async fn find_by_name(&self, _name: &str) -> Result<Option<DiagramRecord>> {
        Ok(None)
    }

    async fn save(&self, _record: DiagramRecord) -> Result<DiagramRecord> {
        Err(Error::repository("database is locked"))
    }

    async fn find_recent(&self, _limit: usize) -> Result<Vec<DiagramRecord>> {
        Ok(Vec::new())
    }

    async fn delete_by_id(&self, _id: &str) -> Result<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_mongodb_blog_happy_path() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("blog-api");
    let (generator, _) = generator(blog_oracle(), dir.path());

    let result = completed(
        generator
            .generate(GenerationRequest::new(
                "API for blog with users and posts",
                &output,
                blog_options(),
            ))
            .await
            .unwrap(),
    );

    assert!(result.success);
    assert!(!result.resumed);
    assert_eq!(result.project_name, "blog-api");
    for folder in ["models", "controllers", "routes", "config"] {
        assert!(output.join(folder).is_dir(), "missing folder {folder}");
    }
    for file in [
        "models/user.js",
        "models/post.js",
        "controllers/userController.js",
        "controllers/postController.js",
        "routes/userRoutes.js",
        "routes/postRoutes.js",
        "app.js",
        "package.json",
        ".env.example",
    ] {
        assert!(output.join(file).is_file(), "missing file {file}");
    }
    assert!(!output.join(".recovery.json").exists());
    assert_eq!(result.total_files, 9);
    assert_eq!(result.generated_files.len(), 9);
    assert!(result.skipped_files.is_empty());

    assert!(read(output.join("models/post.js")).contains("title"));
    let app = read(output.join("app.js"));
    assert!(app.contains("require('./routes/userRoutes')"));
    assert!(app.contains("require('./routes/postRoutes')"));
    assert!(!app.contains("[IA_GENERATED_CODE]"));
    let manifest: Value = serde_json::from_str(&read(output.join("package.json"))).unwrap();
    assert!(manifest["dependencies"]["mongoose"].is_string());
}

#[tokio::test]
async fn test_architecture_without_json_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("blog");
    let transport = ScriptedTransport::new()
        .on(ARCHITECT, "A blog needs articles, users and comments. Good luck!")
        .on(ENTITIES, "[]")
        .on(MODEL_SCHEMA, POST_SCHEMA)
        .otherwise("// extra\n");
    let (generator, _) = generator(transport, dir.path());

    let result = completed(
        generator
            .generate(GenerationRequest::new("A blog about cooking", &output, blog_options()))
            .await
            .unwrap(),
    );

    assert!(result.success);
    for entity in ["articulo", "usuario", "comentario", "categoria"] {
        assert!(output.join(format!("models/{entity}.js")).is_file());
        assert!(output.join(format!("controllers/{entity}Controller.js")).is_file());
        assert!(output.join(format!("routes/{entity}Routes.js")).is_file());
    }
    assert!(output.join("middleware/auth.js").is_file());
    assert!(!output.join(".recovery.json").exists());
}

#[tokio::test]
async fn test_pause_mid_run_then_resume() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("blog");

    let (first, _) = generator(
        ScriptedTransport::new()
            .fail_on("File: models/comment.js", "connection reset by peer")
            .otherwise("module.exports = {};\n"),
        dir.path(),
    );
    let outcome = first
        .generate_from_architecture("blog", ten_file_architecture(), &output, synthesized_options())
        .await
        .unwrap();
    let GenerationOutcome::Paused(paused) = outcome else {
        panic!("expected the run to pause");
    };
    assert_eq!(paused.phase, Phase::GeneratingFiles);
    assert_eq!(paused.current_category, Some(Category::Models));
    assert_eq!(paused.current_category_index, Some(1));
    assert_eq!(paused.file_counter, 3);
    assert_eq!(paused.total_files, 10);
    assert!(paused.last_error.contains("models/comment.js"));

    let checkpoint: Value = serde_json::from_str(&read(output.join(".recovery.json"))).unwrap();
    assert_eq!(checkpoint["phase"], "generating_files");
    assert_eq!(checkpoint["currentCategory"], "models");
    assert_eq!(checkpoint["currentCategoryIndex"], 1);
    assert!(output.join("models/post.js").exists());
    assert!(!output.join("models/comment.js").exists());

    let (second, transport) = generator(
        ScriptedTransport::new().otherwise("module.exports = {};\n"),
        dir.path(),
    );
    let result = completed(
        second
            .generate_from_architecture("blog", ten_file_architecture(), &output, synthesized_options())
            .await
            .unwrap(),
    );

    assert!(result.resumed);
    assert_eq!(transport.requests_matching("File: config/database.js"), 0);
    assert_eq!(transport.requests_matching("File: models/user.js"), 0);
    assert_eq!(transport.requests_matching("File: models/post.js"), 0);
    assert_eq!(transport.requests_matching("File: models/comment.js"), 1);
    assert_eq!(transport.request_count(), 7);
    assert_eq!(result.total_files, 10);
    assert_eq!(result.generated_files.len(), 10);
    assert!(!output.join(".recovery.json").exists());

    // Files were written category by category across both runs
    let positions: Vec<usize> = result
        .generated_files
        .iter()
        .map(|p| {
            let relative = Path::new(p).strip_prefix(&output).unwrap();
            Category::of(&relative.to_string_lossy()).position()
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] <= w[1]), "{positions:?}");
}

#[tokio::test]
async fn test_resumed_tree_matches_uninterrupted_run() {
    let dir = TempDir::new().unwrap();
    let reply = "module.exports = {};\n";

    let straight = dir.path().join("straight");
    let (generator_a, _) = generator(ScriptedTransport::new().otherwise(reply), dir.path());
    completed(
        generator_a
            .generate_from_architecture("blog", ten_file_architecture(), &straight, synthesized_options())
            .await
            .unwrap(),
    );

    let interrupted = dir.path().join("interrupted");
    let (failing, _) = generator(
        ScriptedTransport::new()
            .fail_on("File: routes/postRoutes.js", "rate limited")
            .otherwise(reply),
        dir.path(),
    );
    let paused = failing
        .generate_from_architecture("blog", ten_file_architecture(), &interrupted, synthesized_options())
        .await
        .unwrap();
    assert!(!paused.is_completed());
    let (healthy, _) = generator(ScriptedTransport::new().otherwise(reply), dir.path());
    completed(
        healthy
            .generate_from_architecture("blog", ten_file_architecture(), &interrupted, synthesized_options())
            .await
            .unwrap(),
    );

    for file in &ten_file_architecture().files {
        assert_eq!(
            read(straight.join(&file.path)),
            read(interrupted.join(&file.path)),
            "{} differs",
            file.path
        );
    }
}

#[tokio::test]
async fn test_global_query_is_spliced_once() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("blog");
    let options = GenerationOptions {
        include_global_query: true,
        ..blog_options()
    };
    let (generator, _) = generator(blog_oracle(), dir.path());

    let request = GenerationRequest::new("API for blog with users and posts", &output, options);
    let result = completed(generator.generate(request.clone()).await.unwrap());

    assert!(output.join("routes/globalQuery.js").is_file());
    let app = read(output.join("app.js"));
    assert_eq!(
        app.lines().filter(|l| l.trim() == GLOBAL_QUERY_LINE).count(),
        1,
        "{app}"
    );
    assert_eq!(result.total_files, 10);
    assert_eq!(result.generated_files.len(), 10);

    completed(generator.generate(request).await.unwrap());
    assert_eq!(read(output.join("app.js")), app);
}

#[tokio::test]
async fn test_fenced_oracle_output_is_stripped() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("helpers");
    let (generator, _) = generator(
        ScriptedTransport::new().otherwise("```javascript\nconst x=1;\n```"),
        dir.path(),
    );
    let architecture = Architecture::new(
        vec![FolderSpec::new("lib", "")],
        vec![FileSpec::custom("lib/format.js", "Formatting helpers")],
    );

    completed(
        generator
            .generate_from_architecture("helpers", architecture, &output, GenerationOptions::default())
            .await
            .unwrap(),
    );

    let content = read(output.join("lib/format.js"));
    assert_eq!(content, "const x=1;\n");
    assert!(content.lines().all(|l| !l.starts_with("```") && !l.starts_with("// filepath:")));
}

#[tokio::test]
async fn test_repository_failure_degrades_to_sidecar() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("blog");
    let (generator, _) = generator(blog_oracle(), dir.path());
    let generator = generator.with_repository(Arc::new(BrokenRepository));

    let result = completed(
        generator
            .generate(GenerationRequest::new("API for blog with users and posts", &output, blog_options()))
            .await
            .unwrap(),
    );

    assert!(result.success);
    assert_eq!(result.diagram_id, None);
    let sidecar: Value = serde_json::from_str(&read(output.join("diagram.json"))).unwrap();
    for key in ["architecture", "diagram", "createdAt"] {
        assert!(sidecar.get(key).is_some(), "sidecar lacks {key}");
    }
    assert_eq!(sidecar["name"], "blog");
}

#[tokio::test]
async fn test_diagram_saved_and_regenerated() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("blog");
    let repo = Arc::new(SqliteDiagramRepository::in_memory().await.unwrap());
    let (generator, transport) = generator(blog_oracle(), dir.path());
    let generator = generator.with_repository(repo.clone());

    let result = completed(
        generator
            .generate(GenerationRequest::new("API for blog with users and posts", &output, blog_options()))
            .await
            .unwrap(),
    );
    let id = result.diagram_id.clone().expect("diagram id");
    assert!(!output.join("diagram.json").exists());

    let record = repo.find_by_name("blog").await.unwrap().expect("stored record");
    assert_eq!(record.id, id);
    assert_eq!(record.description, "API for blog with users and posts");
    let expected = Diagram::from_architecture(&record.architecture);
    let nodes: HashSet<_> = record.diagram.nodes.iter().collect();
    let expected_nodes: HashSet<_> = expected.nodes.iter().collect();
    let edges: HashSet<_> = record.diagram.edges.iter().collect();
    let expected_edges: HashSet<_> = expected.edges.iter().collect();
    assert_eq!(nodes, expected_nodes);
    assert_eq!(edges, expected_edges);
    assert!(record.diagram.edges.iter().any(|e| e.id == "models/post.js->controllers/postController.js"));

    let copy = dir.path().join("blog-copy");
    let architecture_requests = transport.requests_matching(ARCHITECT);
    let again = completed(generator.regenerate_from_diagram("blog", &copy).await.unwrap());
    assert_eq!(transport.requests_matching(ARCHITECT), architecture_requests);
    assert_eq!(again.project_name, "blog");
    assert_eq!(again.diagram_id, Some(id));
    assert!(copy.join("models/post.js").is_file());

    let missing = generator.regenerate_from_diagram("nope", &copy).await.unwrap_err();
    assert!(matches!(missing, Error::NotFound(_)));
}

#[tokio::test]
async fn test_zero_file_architecture_writes_only_folders() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("empty");
    let (generator, transport) = generator(ScriptedTransport::new(), dir.path());
    let architecture = Architecture::new(
        vec![FolderSpec::new("models", ""), FolderSpec::new("routes", "")],
        vec![],
    );

    let result = completed(
        generator
            .generate_from_architecture("nothing", architecture, &output, GenerationOptions::default())
            .await
            .unwrap(),
    );

    assert_eq!(result.total_files, 0);
    assert!(result.generated_files.is_empty());
    assert!(output.join("models").is_dir());
    assert!(output.join("routes").is_dir());
    assert_eq!(transport.request_count(), 0);
    assert!(!output.join(".recovery.json").exists());
}

#[tokio::test]
async fn test_unknown_template_type_is_synthesized() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("odd");
    let architecture: Architecture = serde_json::from_str(
        r#"{"folders": [{"path": "models"}],
            "files": [{"path": "models/user.js", "useTemplate": true, "templateType": "widget"}]}"#,
    )
    .unwrap();
    let (generator, transport) = generator(
        ScriptedTransport::new().otherwise("const User = {};\nmodule.exports = User;\n"),
        dir.path(),
    );

    completed(
        generator
            .generate_from_architecture("users", architecture, &output, GenerationOptions::default())
            .await
            .unwrap(),
    );

    assert_eq!(transport.requests_matching("File: models/user.js"), 1);
    assert_eq!(transport.requests_matching(MODEL_SCHEMA), 0);
    assert!(read(output.join("models/user.js")).starts_with("const User"));
}

#[tokio::test]
async fn test_continue_on_error_skips_failed_files() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("blog");
    let (generator, _) = generator(
        ScriptedTransport::new()
            .fail_on("File: models/post.js", "upstream 503")
            .otherwise("module.exports = {};\n"),
        dir.path(),
    );
    let options = GenerationOptions {
        continue_on_error: true,
        ..synthesized_options()
    };

    let result = completed(
        generator
            .generate_from_architecture("blog", ten_file_architecture(), &output, options)
            .await
            .unwrap(),
    );

    assert_eq!(result.skipped_files, vec!["models/post.js".to_string()]);
    assert_eq!(result.generated_files.len(), 9);
    assert!(!output.join("models/post.js").exists());
    assert!(output.join("models/comment.js").exists());
    assert!(!output.join(".recovery.json").exists());
}

#[tokio::test]
async fn test_webhook_and_graphql_post_phases() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("shop");
    let mut webhook = WebhookSpec::new("stripe");
    webhook.description = "Payment notifications".into();
    let options = GenerationOptions {
        include_graphql: true,
        webhook: Some(webhook),
        ..blog_options()
    };
    let (generator, _) = generator(blog_oracle(), dir.path());

    let result = completed(
        generator
            .generate(GenerationRequest::new("API for blog with users and posts", &output, options))
            .await
            .unwrap(),
    );

    let receiver = read(output.join("routes/webhooks/stripeWebhook.js"));
    assert!(receiver.contains("STRIPE_WEBHOOK_SECRET"));
    assert!(output.join("graphql/schema.js").is_file());

    let app = read(output.join("app.js"));
    assert!(app.contains("app.use('/api/webhooks/stripe', require('./routes/webhooks/stripeWebhook'));"));
    assert!(app.contains("app.use('/graphql', require('./graphql/schema'));"));
    assert!(read(output.join(".env.example")).contains("STRIPE_WEBHOOK_SECRET=your_webhook_secret"));

    assert_eq!(result.total_files, 11);
    assert_eq!(result.generated_files.len(), 11);
}

#[tokio::test]
async fn test_add_webhook_to_existing_project() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("svc");
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("app.js"), "const app = express();\n// Rutas\napp.use('/api/a', require('./routes/a'));\n\nmodule.exports = app;\n").unwrap();
    let (generator, _) = generator(ScriptedTransport::new().otherwise("// handlers\n"), dir.path());

    let path = generator
        .add_webhook(&output, &WebhookSpec::new("github"), &GenerationOptions::default())
        .await
        .unwrap();

    assert_eq!(path, output.join("routes/webhooks/githubWebhook.js"));
    let app = read(output.join("app.js"));
    let lines: Vec<&str> = app.lines().collect();
    assert_eq!(lines[3], "app.use('/api/webhooks/github', require('./routes/webhooks/githubWebhook'));");
    assert!(read(output.join(".env.example")).contains("GITHUB_WEBHOOK_SECRET="));
}

#[tokio::test]
async fn test_saved_configuration_round_trip() {
    let dir = TempDir::new().unwrap();
    let (generator, transport) = generator(blog_oracle(), dir.path());

    let path = generator
        .save_configuration("blog", "API for blog with users and posts", blog_options(), None)
        .await
        .unwrap();
    assert!(path.starts_with(dir.path().join("saved-projects")));
    let duplicate = generator
        .save_configuration("blog", "again", blog_options(), None)
        .await
        .unwrap_err();
    assert!(matches!(duplicate, Error::AlreadyExists(_)));

    let saved = generator.list_configurations().await.unwrap();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].architecture.has_file("package.json"));

    let before = transport.requests_matching(ARCHITECT);
    let output = dir.path().join("from-saved");
    let result = completed(generator.generate_from_saved("blog", &output).await.unwrap());
    assert_eq!(transport.requests_matching(ARCHITECT), before);
    assert_eq!(result.total_files, saved[0].architecture.files.len());
    assert!(output.join("routes/postRoutes.js").is_file());
}

#[tokio::test]
async fn test_zip_archive_next_to_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("blog");
    let options = GenerationOptions {
        generate_zip: true,
        ..blog_options()
    };
    let (generator, _) = generator(blog_oracle(), dir.path());

    let result = completed(
        generator
            .generate(GenerationRequest::new("API for blog with users and posts", &output, options))
            .await
            .unwrap(),
    );

    let zip_path = result.zip_path.expect("zip path");
    assert_eq!(zip_path, dir.path().canonicalize().unwrap().join("blog.zip"));
    let mut archive = zip::ZipArchive::new(std::fs::File::open(&zip_path).unwrap()).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names.iter().any(|n| n == "app.js"));
    assert!(names.iter().any(|n| n == "models/post.js"));
    assert!(names.iter().all(|n| !n.starts_with("blog/") && !n.contains(".recovery")));
}

#[tokio::test]
async fn test_unreadable_checkpoint_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("blog");
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join(".recovery.json"), "{\"phase\": 42").unwrap();
    let (generator, _) = generator(blog_oracle(), dir.path());

    let result = completed(
        generator
            .generate(GenerationRequest::new("API for blog with users and posts", &output, blog_options()))
            .await
            .unwrap(),
    );

    assert!(!result.resumed);
    assert_eq!(result.total_files, 9);
    assert!(!output.join(".recovery.json").exists());
}

#[tokio::test]
async fn test_preview_and_recommendation() {
    let dir = TempDir::new().unwrap();
    let transport = blog_oracle().on(
        "advise on backend technology",
        r#"{"database": "PostgreSQL", "framework": "Fastify", "recommendations": ["Use migrations"]}"#,
    );
    let (generator, _) = generator(transport, dir.path());

    let architecture = generator
        .preview("API for blog with users and posts", &blog_options())
        .await
        .unwrap();
    assert!(architecture.has_file("package.json"));
    assert!(architecture.has_file(".env.example"));
    assert!(architecture.has_file("models/user.js"));
    assert!(!dir.path().join("blog").exists());

    let recommendation = generator.recommend("A shop", "needs reporting").await.unwrap();
    assert_eq!(recommendation.database, "PostgreSQL");
    assert_eq!(recommendation.framework, "Fastify");
    assert_eq!(recommendation.auth, "JWT");
    assert_eq!(recommendation.recommendations, vec!["Use migrations".to_string()]);
}
