//! apiforge CLI entrypoint
//! Parses command-line arguments and dispatches to the project generator.
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use apiforge::architecture::Architecture;
use apiforge::core::Config;
use apiforge::generation::saved::SavedConfigStore;
use apiforge::generation::{
    GenerationOptions, GenerationOutcome, GenerationRequest, GenerationResult, PausedRun,
    ProjectGenerator, SignatureMethod, WebhookEventType, WebhookSpec,
};
use apiforge::oracle::OracleClient;
use apiforge::storage::{DiagramRepository, SqliteDiagramRepository};
use apiforge::templates::TemplateEngine;
use clap::Parser;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apiforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate a project; re-running with the same output resumes an interrupted run
    Generate {
        /// Natural-language description of the API
        #[arg(required_unless_present = "architecture")]
        description: Option<String>,
        /// Output directory
        #[arg(long, short)]
        output: PathBuf,
        /// Materialize an edited architecture file instead of asking the oracle
        #[arg(long)]
        architecture: Option<PathBuf>,
        #[command(flatten)]
        flags: OptionFlags,
    },
    /// Write the repaired architecture a run would use, for editing
    Preview {
        description: String,
        /// Destination file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        flags: OptionFlags,
    },
    /// Ask for a technology recommendation
    Recommend {
        description: String,
        /// Additional requirements
        #[arg(long, default_value = "")]
        prompt: String,
    },
    /// Add a webhook receiver to a generated project
    Webhook {
        /// Service sending the webhooks, e.g. stripe
        service: String,
        #[arg(long, short)]
        output: PathBuf,
        #[arg(long, default_value = "")]
        description: String,
        /// hmac, token or none
        #[arg(long, default_value = "hmac")]
        signature: SignatureMethod,
        #[arg(long)]
        signature_header: Option<String>,
        #[arg(long)]
        verification_token: Option<String>,
        /// Answer verification challenges
        #[arg(long)]
        challenge: bool,
        /// Handled event as `name:type`, repeatable
        #[arg(long = "event", value_parser = parse_event)]
        events: Vec<WebhookEventType>,
        #[command(flatten)]
        flags: OptionFlags,
    },
    /// Saved configurations under ./saved-projects
    Saved {
        #[command(subcommand)]
        action: SavedCommands,
    },
    /// Stored diagrams
    Diagrams {
        #[command(subcommand)]
        action: DiagramCommands,
    },
}

#[derive(clap::Subcommand, Debug)]
enum SavedCommands {
    /// Save a configuration (previews the architecture unless one is given)
    Save {
        name: String,
        description: String,
        #[arg(long)]
        architecture: Option<PathBuf>,
        #[command(flatten)]
        flags: OptionFlags,
    },
    List,
    /// Generate from a saved configuration
    Generate {
        name: String,
        #[arg(long, short)]
        output: PathBuf,
    },
}

#[derive(clap::Subcommand, Debug)]
enum DiagramCommands {
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    Delete {
        id: String,
    },
    /// Re-materialize a stored diagram's architecture
    Regenerate {
        name: String,
        #[arg(long, short)]
        output: PathBuf,
    },
}

/// Run options shared by the generating commands
#[derive(clap::Args, Debug, Clone)]
struct OptionFlags {
    /// Project name (defaults to the output directory name)
    #[arg(long)]
    name: Option<String>,
    #[arg(long, default_value = "MongoDB")]
    database: String,
    #[arg(long, default_value = "Express")]
    framework: String,
    #[arg(long, default_value = "JWT")]
    auth: String,
    #[arg(long, default_value = "JavaScript")]
    language: String,
    #[arg(long)]
    graphql: bool,
    #[arg(long)]
    websockets: bool,
    #[arg(long)]
    global_query: bool,
    /// Synthesize every file with the oracle
    #[arg(long)]
    no_templates: bool,
    /// Also write <output>/../<name>.zip
    #[arg(long)]
    zip: bool,
    #[arg(long)]
    continue_on_error: bool,
    /// Stop after writing the architecture preview so it can be edited
    #[arg(long)]
    allow_preview_edit: bool,
    /// Also generate a webhook receiver for this service
    #[arg(long)]
    webhook_service: Option<String>,
}

impl OptionFlags {
    fn into_options(self) -> GenerationOptions {
        GenerationOptions {
            name: self.name,
            database: self.database,
            framework: self.framework,
            auth: self.auth,
            include_graphql: self.graphql,
            include_websockets: self.websockets,
            include_global_query: self.global_query,
            use_templates: !self.no_templates,
            generate_zip: self.zip,
            continue_on_error: self.continue_on_error,
            allow_preview_edit: self.allow_preview_edit,
            language: self.language,
            webhook: self.webhook_service.map(WebhookSpec::new),
        }
    }
}

fn parse_event(raw: &str) -> Result<WebhookEventType, String> {
    let (name, kind) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected name:type, got '{raw}'"))?;
    Ok(WebhookEventType {
        name: name.trim().to_string(),
        kind: kind.trim().to_string(),
        description: String::new(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Generate {
            description,
            output,
            architecture,
            flags,
        } => {
            let generator = build_generator(&config).await?;
            let options = flags.into_options();
            let outcome = match architecture {
                Some(path) => {
                    let architecture = read_architecture(&path).await?;
                    generator
                        .generate_from_architecture(
                            description.as_deref().unwrap_or_default(),
                            architecture,
                            &output,
                            options,
                        )
                        .await
                }
                None if options.allow_preview_edit => {
                    let description = description.unwrap_or_default();
                    let architecture = generator.preview(&description, &options).await?;
                    let path = preview_path(&output);
                    write_json(&path, &architecture).await?;
                    println!("Architecture preview written to {}", path.display());
                    println!(
                        "Edit it, then run: apiforge generate --architecture {} --output {}",
                        path.display(),
                        output.display()
                    );
                    return Ok(());
                }
                None => {
                    generator
                        .generate(GenerationRequest::new(
                            description.unwrap_or_default(),
                            &output,
                            options,
                        ))
                        .await
                }
            }
            .context("Generation failed")?;
            report(outcome)?;
        }
        Commands::Preview {
            description,
            out,
            flags,
        } => {
            let generator = build_generator(&config).await?;
            let architecture = generator
                .preview(&description, &flags.into_options())
                .await
                .context("Preview failed")?;
            match out {
                Some(path) => {
                    write_json(&path, &architecture).await?;
                    info!(path = %path.display(), "Architecture preview written");
                }
                None => println!("{}", serde_json::to_string_pretty(&architecture)?),
            }
        }
        Commands::Recommend { description, prompt } => {
            let generator = build_generator(&config).await?;
            let recommendation = generator
                .recommend(&description, &prompt)
                .await
                .context("Recommendation failed")?;
            println!("{}", serde_json::to_string_pretty(&recommendation)?);
        }
        Commands::Webhook {
            service,
            output,
            description,
            signature,
            signature_header,
            verification_token,
            challenge,
            events,
            flags,
        } => {
            let generator = build_generator(&config).await?;
            let mut spec = WebhookSpec::new(service);
            spec.description = description;
            spec.signature_method = signature;
            spec.signature_header = signature_header;
            spec.verification_token = verification_token;
            spec.challenge = challenge;
            spec.event_types = events;
            let path = generator
                .add_webhook(&output, &spec, &flags.into_options())
                .await
                .context("Failed to add webhook")?;
            println!("Webhook receiver written to {}", path.display());
        }
        Commands::Saved { action } => match action {
            SavedCommands::Save {
                name,
                description,
                architecture,
                flags,
            } => {
                let generator = build_generator(&config).await?;
                let architecture = match architecture {
                    Some(path) => Some(read_architecture(&path).await?),
                    None => None,
                };
                let path = generator
                    .save_configuration(&name, &description, flags.into_options(), architecture)
                    .await
                    .with_context(|| format!("Failed to save configuration '{name}'"))?;
                println!("Saved configuration to {}", path.display());
            }
            SavedCommands::List => {
                let store = SavedConfigStore::in_current_dir()?;
                let configs = store.list().await.context("Failed to list configurations")?;
                if configs.is_empty() {
                    println!("No saved configurations in {}", store.dir().display());
                }
                for config in configs {
                    println!(
                        "{}  {}  {} files  {}",
                        config.created_at.format("%Y-%m-%d %H:%M"),
                        config.name,
                        config.architecture.files.len(),
                        config.description
                    );
                }
            }
            SavedCommands::Generate { name, output } => {
                let generator = build_generator(&config).await?;
                let outcome = generator
                    .generate_from_saved(&name, &output)
                    .await
                    .with_context(|| format!("Failed to generate from '{name}'"))?;
                report(outcome)?;
            }
        },
        Commands::Diagrams { action } => match action {
            DiagramCommands::List { limit } => {
                let repo = open_repository(&config).await?;
                for record in repo.find_recent(limit).await? {
                    println!(
                        "{}  {}  {}  {}",
                        record.id,
                        record.created_at.format("%Y-%m-%d %H:%M"),
                        record.name,
                        record.output_path
                    );
                }
            }
            DiagramCommands::Delete { id } => {
                let repo = open_repository(&config).await?;
                if repo.delete_by_id(&id).await? {
                    println!("Deleted diagram {id}");
                } else {
                    anyhow::bail!("No diagram with id {id}");
                }
            }
            DiagramCommands::Regenerate { name, output } => {
                let generator = build_generator(&config).await?;
                let outcome = generator
                    .regenerate_from_diagram(&name, &output)
                    .await
                    .with_context(|| format!("Failed to regenerate diagram '{name}'"))?;
                report(outcome)?;
            }
        },
    }
    Ok(())
}

/// Oracle, templates and (when available) the diagram repository
async fn build_generator(config: &Config) -> anyhow::Result<ProjectGenerator> {
    config.require_api_key()?;
    let oracle = OracleClient::from_config(&config.oracle).context("Failed to set up the oracle")?;
    let engine = match &config.template_dir {
        Some(dir) => TemplateEngine::with_root(dir).context("Failed to open template directory")?,
        None => TemplateEngine::embedded(),
    };
    let store = SavedConfigStore::in_current_dir()?;
    let mut generator = ProjectGenerator::new(Arc::new(oracle), engine).with_saved_store(store);

    match open_repository(config).await {
        Ok(repo) => generator = generator.with_repository(repo),
        Err(e) => warn!(error = %e, "Diagram repository unavailable; diagrams go to diagram.json"),
    }
    Ok(generator)
}

async fn open_repository(config: &Config) -> anyhow::Result<Arc<dyn DiagramRepository>> {
    let path = config.resolved_database_path();
    let repo = SqliteDiagramRepository::open(&path)
        .await
        .with_context(|| format!("Failed to open diagram database {}", path.display()))?;
    Ok(Arc::new(repo))
}

async fn read_architecture(path: &Path) -> anyhow::Result<Architecture> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid architecture file {}", path.display()))
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_string_pretty(value)?)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// `<output>/../<dir name>.architecture.json`
fn preview_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    output
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{name}.architecture.json"))
}

fn report(outcome: GenerationOutcome) -> anyhow::Result<()> {
    match outcome {
        GenerationOutcome::Completed(result) => {
            print_result(&result);
            Ok(())
        }
        GenerationOutcome::Paused(paused) => {
            print_paused(&paused);
            anyhow::bail!(
                "Generation paused after {}/{} files; re-run the same command to resume",
                paused.file_counter,
                paused.total_files
            )
        }
    }
}

fn print_result(result: &GenerationResult) {
    println!(
        "Generated {} at {} ({} files, {} skipped{})",
        result.project_name,
        result.output_path.display(),
        result.generated_files.len(),
        result.skipped_files.len(),
        if result.resumed { ", resumed" } else { "" }
    );
    for skipped in &result.skipped_files {
        println!("  skipped: {skipped}");
    }
    match &result.diagram_id {
        Some(id) => println!("Diagram saved as {id}"),
        None => println!("Diagram written to {}", result.output_path.join("diagram.json").display()),
    }
    if let Some(zip) = &result.zip_path {
        println!("Archive: {}", zip.display());
    }
}

fn print_paused(paused: &PausedRun) {
    eprintln!(
        "Paused in {} at {:?} ({}): {}",
        paused.output_path.display(),
        paused.phase,
        paused
            .current_category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string()),
        paused.last_error
    );
}
