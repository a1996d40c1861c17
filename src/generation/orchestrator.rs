//! Generation orchestration: drives a run from architecture to archive, with
//! recovery checkpoints between every observable step.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::architecture::{
    Architecture, Category, FileRole, FileSpec, GLOBAL_QUERY_PATH, TemplateType,
    default_architecture, repair,
};
use crate::core::utils::{to_camel_case, to_kebab_case};
use crate::core::{Error, Result};
use crate::generation::archive::{archive_path, zip_directory};
use crate::generation::diagram::Diagram;
use crate::generation::output::{FileSystemOutputService, OutputService, resolve_path};
use crate::generation::recovery::{Phase, RecoveryState, RecoveryStore};
use crate::generation::saved::{SAVED_PROJECTS_DIR, SavedConfigStore, SavedConfiguration};
use crate::generation::wiring::{entry_point_path, wire_env_var, wire_route};
use crate::generation::{GenerationContext, GenerationOptions, WebhookSpec};
use crate::oracle::prompts::describe_target;
use crate::oracle::{Oracle, Recommendation};
use crate::storage::{DiagramRecord, DiagramRepository};
use crate::templates::generators::webhook_secret_var;
use crate::templates::{TemplateEngine, TemplateGenerator, TemplateKind};

const GRAPHQL_SCHEMA_PATH: &str = "graphql/schema.js";
const ENV_TEMPLATE_PATH: &str = ".env.example";
const DIAGRAM_SIDECAR: &str = "diagram.json";

/// What the driver asks for
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub description: String,
    pub output: PathBuf,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(
        description: impl Into<String>,
        output: impl Into<PathBuf>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            description: description.into(),
            output: output.into(),
            options,
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    pub output_path: PathBuf,
    pub project_name: String,
    pub total_files: usize,
    /// Absolute paths of written files
    pub generated_files: Vec<String>,
    /// Relative paths given up on under `continueOnError`
    pub skipped_files: Vec<String>,
    pub diagram_id: Option<String>,
    pub zip_path: Option<PathBuf>,
    pub resumed: bool,
}

/// A run stopped on an error; its checkpoint stays on disk
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PausedRun {
    pub output_path: PathBuf,
    pub project_name: String,
    pub phase: Phase,
    pub current_category: Option<Category>,
    pub current_category_index: Option<usize>,
    pub file_counter: usize,
    pub total_files: usize,
    pub last_error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed(GenerationResult),
    Paused(PausedRun),
}

impl GenerationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagramSidecar<'a> {
    name: &'a str,
    description: &'a str,
    architecture: &'a Architecture,
    diagram: &'a Diagram,
    created_at: DateTime<Utc>,
}

/// Turns descriptions into project trees
pub struct ProjectGenerator {
    oracle: Arc<dyn Oracle>,
    templates: TemplateGenerator,
    output: Arc<dyn OutputService>,
    diagrams: Option<Arc<dyn DiagramRepository>>,
    saved: SavedConfigStore,
}

impl ProjectGenerator {
    pub fn new(oracle: Arc<dyn Oracle>, engine: TemplateEngine) -> Self {
        Self {
            templates: TemplateGenerator::new(engine, oracle.clone()),
            oracle,
            output: Arc::new(FileSystemOutputService::new()),
            diagrams: None,
            saved: SavedConfigStore::new(SAVED_PROJECTS_DIR),
        }
    }

    pub fn with_output(mut self, output: Arc<dyn OutputService>) -> Self {
        self.output = output;
        self
    }

    pub fn with_repository(mut self, diagrams: Arc<dyn DiagramRepository>) -> Self {
        self.diagrams = Some(diagrams);
        self
    }

    pub fn with_saved_store(mut self, saved: SavedConfigStore) -> Self {
        self.saved = saved;
        self
    }

    /// Generate a project, resuming from `<output>/.recovery.json` when present
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        let GenerationRequest {
            description,
            output,
            options,
        } = request;
        self.output.ensure_directory(&output).await?;
        let store = RecoveryStore::for_output(&output);

        if let Some(state) = self.resumable_state(&store).await? {
            return self.run(state, &output, &store, true).await;
        }

        let architecture = self.acquire_architecture(&description, &options).await;
        let project_name = project_name(&options, &output);
        let mut state = RecoveryState::new(project_name, description, architecture, options);
        store.save(&mut state).await?;
        self.run(state, &output, &store, false).await
    }

    /// Materialize a given architecture without consulting the oracle for
    /// one. Used for edited previews, saved configurations and stored diagrams.
    pub async fn generate_from_architecture(
        &self,
        description: &str,
        mut architecture: Architecture,
        output: &Path,
        options: GenerationOptions,
    ) -> Result<GenerationOutcome> {
        self.output.ensure_directory(output).await?;
        let store = RecoveryStore::for_output(output);
        if let Some(state) = self.resumable_state(&store).await? {
            return self.run(state, output, &store, true).await;
        }

        architecture.normalize();
        architecture.refresh_optimization_info();
        let issues = architecture.validate();
        if !issues.is_empty() {
            warn!(issues = ?issues, "Architecture has inconsistencies; generating anyway");
        }

        let project_name = project_name(&options, output);
        let mut state = RecoveryState::new(project_name, description, architecture, options);
        store.save(&mut state).await?;
        self.run(state, output, &store, false).await
    }

    /// The repaired architecture a run would use, without writing anything
    pub async fn preview(&self, description: &str, options: &GenerationOptions) -> Result<Architecture> {
        Ok(self.acquire_architecture(description, options).await)
    }

    pub async fn recommend(&self, description: &str, prompt: &str) -> Result<Recommendation> {
        self.oracle.generate_recommendation(description, prompt).await
    }

    /// Store a named configuration; previews the architecture when none is given
    pub async fn save_configuration(
        &self,
        name: &str,
        description: &str,
        options: GenerationOptions,
        architecture: Option<Architecture>,
    ) -> Result<PathBuf> {
        let architecture = match architecture {
            Some(architecture) => architecture,
            None => self.preview(description, &options).await?,
        };
        let config = SavedConfiguration {
            name: name.to_string(),
            description: description.to_string(),
            options,
            architecture,
            created_at: Utc::now(),
        };
        self.saved.save(&config).await
    }

    pub async fn list_configurations(&self) -> Result<Vec<SavedConfiguration>> {
        self.saved.list().await
    }

    pub async fn generate_from_saved(&self, name: &str, output: &Path) -> Result<GenerationOutcome> {
        let config = self.saved.load(name).await?;
        info!(name = %config.name, files = config.architecture.files.len(), "Generating from saved configuration");
        self.generate_from_architecture(&config.description, config.architecture, output, config.options)
            .await
    }

    /// Re-materialize the architecture stored under a diagram name
    pub async fn regenerate_from_diagram(&self, name: &str, output: &Path) -> Result<GenerationOutcome> {
        let repo = self
            .diagrams
            .as_ref()
            .ok_or_else(|| Error::config("No diagram repository configured"))?;
        let record = repo
            .find_by_name(name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Diagram '{name}'")))?;

        let mut options = record.options;
        options.name = Some(record.name);
        self.generate_from_architecture(&record.description, record.architecture, output, options)
            .await
    }

    /// Add a webhook receiver to an already generated project
    pub async fn add_webhook(
        &self,
        output: &Path,
        spec: &WebhookSpec,
        options: &GenerationOptions,
    ) -> Result<PathBuf> {
        let entry = find_entry_point(output).await;
        if entry.is_none() {
            warn!(output = %output.display(), "No entry point found; the webhook route must be registered by hand");
        }
        let project = project_name(options, output);
        let context = GenerationContext::new(&spec.description, &project, options, &Architecture::default());
        let (file, path) = self
            .write_webhook(output, entry.as_deref(), spec, &context, options)
            .await?;
        info!(path = %file.path, "Webhook receiver added");
        Ok(path)
    }

    /// Oracle architecture, or the keyword default when the oracle fails; repaired either way
    async fn acquire_architecture(&self, description: &str, options: &GenerationOptions) -> Architecture {
        let architecture = match self.oracle.generate_architecture(description, options).await {
            Ok(architecture) if !architecture.files.is_empty() => architecture,
            Ok(_) => {
                warn!("Oracle proposed an architecture without files; using the default architecture");
                default_architecture(description, options.include_global_query)
            }
            Err(e) => {
                warn!(error = %e, "Architecture generation failed; using the default architecture");
                default_architecture(description, options.include_global_query)
            }
        };
        repair(architecture, description, self.oracle.as_ref()).await
    }

    /// Stored checkpoint, or `None` to start fresh. A broken checkpoint is discarded.
    async fn resumable_state(&self, store: &RecoveryStore) -> Result<Option<RecoveryState>> {
        match store.load().await {
            Ok(Some(state)) => {
                info!(
                    project = %state.project_name,
                    phase = ?state.phase,
                    done = state.file_counter,
                    total = state.total_files,
                    "Resuming interrupted generation"
                );
                Ok(Some(state))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(error = %e, "Discarding unusable recovery state; starting fresh");
                store.clear().await?;
                Ok(None)
            }
        }
    }

    async fn run(
        &self,
        mut state: RecoveryState,
        output: &Path,
        store: &RecoveryStore,
        resumed: bool,
    ) -> Result<GenerationOutcome> {
        for folder in &state.architecture.folders {
            self.output.ensure_directory(&output.join(&folder.path)).await?;
        }
        debug!(folders = state.architecture.folders.len(), "Directories created");

        let mut context = match state.context.take() {
            Some(context) if state.phase != Phase::ArchitectureReady => context,
            _ => GenerationContext::new(
                &state.description,
                &state.project_name,
                &state.options,
                &state.architecture,
            ),
        };
        if state.phase == Phase::ArchitectureReady {
            state.phase = Phase::ModelsAnalyzed;
            state.context = Some(context.clone());
            store.save(&mut state).await?;
            info!(
                models = context.models.len(),
                routes = context.routes.len(),
                "Project classified"
            );
        } else {
            state.context = Some(context.clone());
        }

        if let Some(paused) = self.generate_files(&mut state, &context, output, store).await? {
            return Ok(GenerationOutcome::Paused(paused));
        }

        if let Some(paused) = self
            .run_post_phases(&mut state, &mut context, output, store)
            .await?
        {
            return Ok(GenerationOutcome::Paused(paused));
        }

        let diagram_id = self.record_diagram(&state, output).await;

        let zip_path = if state.options.generate_zip {
            let destination = archive_path(output, &state.project_name);
            match zip_directory(output, &destination).await {
                Ok(path) => Some(path),
                Err(e) => {
                    error!(error = %e, "Archive creation failed");
                    None
                }
            }
        } else {
            None
        };

        store.clear().await?;
        info!(
            project = %state.project_name,
            generated = state.generated_files.len(),
            skipped = state.skipped_files.len(),
            "Generation complete"
        );

        Ok(GenerationOutcome::Completed(GenerationResult {
            success: true,
            output_path: output.to_path_buf(),
            project_name: state.project_name,
            total_files: state.total_files,
            generated_files: state.generated_files,
            skipped_files: state.skipped_files,
            diagram_id,
            zip_path,
            resumed,
        }))
    }

    /// Files by category, starting at the checkpoint's resume point
    async fn generate_files(
        &self,
        state: &mut RecoveryState,
        context: &GenerationContext,
        output: &Path,
        store: &RecoveryStore,
    ) -> Result<Option<PausedRun>> {
        let (start_category, start_index) = state.resume_point();
        let files = state.architecture.files.clone();

        for (position, category) in Category::ORDER.iter().copied().enumerate() {
            if position < start_category {
                continue;
            }
            let bucket: Vec<&FileSpec> = files.iter().filter(|f| Category::of(&f.path) == category).collect();
            let first = if position == start_category { start_index } else { 0 };
            if first >= bucket.len() {
                continue;
            }
            if first == 0 {
                state.enter_category(category);
                store.save(state).await?;
            }

            for (index, file) in bucket.iter().enumerate().skip(first) {
                match self.produce(file, context, &state.options, output).await {
                    Ok(path) => {
                        state.file_counter += 1;
                        record_generated(state, &path);
                        info!(
                            "[{}/{}] {}",
                            state.file_counter,
                            state.total_files,
                            file.path
                        );
                    }
                    Err(e) if state.options.continue_on_error => {
                        state.file_counter += 1;
                        warn!(path = %file.path, error = %e, "Skipping file");
                        if !state.skipped_files.contains(&file.path) {
                            state.skipped_files.push(file.path.clone());
                        }
                        state.last_error = Some(format!("{}: {e}", file.path));
                    }
                    Err(e) => {
                        error!(path = %file.path, error = %e, "Generation paused");
                        state.phase = Phase::GeneratingFiles;
                        state.current_category = Some(category);
                        state.current_category_index = index.checked_sub(1);
                        state.last_error = Some(format!("{}: {e}", file.path));
                        store.save(state).await?;
                        return Ok(Some(paused(state, output)));
                    }
                }
                state.mark_progress(category, index);
                store.save(state).await?;
            }
        }

        state.phase = Phase::FilesGenerated;
        state.current_category = None;
        state.current_category_index = None;
        store.save(state).await?;
        Ok(None)
    }

    /// Generate one architecture file and write it; returns the written path
    async fn produce(
        &self,
        file: &FileSpec,
        context: &GenerationContext,
        options: &GenerationOptions,
        output: &Path,
    ) -> Result<PathBuf> {
        let kind = options
            .use_templates
            .then(|| TemplateKind::for_file(file))
            .flatten();
        let content = match kind {
            Some(kind) => {
                debug!(target_file = %describe_target(&file.path), template = ?kind, "Rendering from template");
                self.templates.generate(kind, file, context, options).await?
            }
            None => {
                debug!(target_file = %describe_target(&file.path), "Synthesizing with the oracle");
                self.oracle
                    .generate_code(&file.path, &file.description, context)
                    .await?
            }
        };
        let path = output.join(&file.path);
        self.output.write_file(&path, &content).await?;
        Ok(path)
    }

    /// Global query, webhook and GraphQL additions
    async fn run_post_phases(
        &self,
        state: &mut RecoveryState,
        context: &mut GenerationContext,
        output: &Path,
        store: &RecoveryStore,
    ) -> Result<Option<PausedRun>> {
        let options = state.options.clone();
        let entry = entry_point_path(&state.architecture).map(str::to_string);

        if options.include_global_query && !has_global_query(&state.architecture) {
            let file = FileSpec::templated(
                GLOBAL_QUERY_PATH,
                "Cross-model search endpoint",
                TemplateType::Route,
            );
            let step = async {
                let content = self
                    .templates
                    .generate_global_query(&file, context, &options)
                    .await?;
                let path = output.join(&file.path);
                self.output.write_file(&path, &content).await?;
                if let Some(entry) = &entry {
                    wire_route(self.output.as_ref(), output, entry, "/api/global-query", &file.path).await?;
                }
                Ok::<_, Error>(path)
            };
            let result = step.await;
            if let Some(paused) = self
                .finish_post_step(state, context, file, result, output, store)
                .await?
            {
                return Ok(Some(paused));
            }
        }

        if let Some(spec) = &options.webhook {
            let path = webhook_path(&spec.service_name);
            if !state.architecture.has_file(&path) {
                let result = self
                    .write_webhook(output, entry.as_deref(), spec, context, &options)
                    .await;
                let file = webhook_file(spec);
                if let Some(paused) = self
                    .finish_post_step(state, context, file, result.map(|(_, p)| p), output, store)
                    .await?
                {
                    return Ok(Some(paused));
                }
            }
        }

        if options.include_graphql && !has_graphql(&state.architecture) {
            let file = FileSpec::custom(
                GRAPHQL_SCHEMA_PATH,
                "GraphQL schema, resolvers over the models and an Express handler \
                 exported as module.exports",
            );
            let step = async {
                let content = self
                    .oracle
                    .generate_code(&file.path, &file.description, context)
                    .await?;
                let path = output.join(&file.path);
                self.output.write_file(&path, &content).await?;
                if let Some(entry) = &entry {
                    wire_route(self.output.as_ref(), output, entry, "/graphql", &file.path).await?;
                }
                Ok::<_, Error>(path)
            };
            let result = step.await;
            if let Some(paused) = self
                .finish_post_step(state, context, file, result, output, store)
                .await?
            {
                return Ok(Some(paused));
            }
        }

        Ok(None)
    }

    /// Account for a post-phase file: checkpoint on success, skip or pause on failure
    async fn finish_post_step(
        &self,
        state: &mut RecoveryState,
        context: &mut GenerationContext,
        file: FileSpec,
        result: Result<PathBuf>,
        output: &Path,
        store: &RecoveryStore,
    ) -> Result<Option<PausedRun>> {
        match result {
            Ok(path) => {
                state.total_files += 1;
                state.file_counter += 1;
                record_generated(state, &path);
                info!("[{}/{}] {}", state.file_counter, state.total_files, file.path);
                context.add_file(file.clone());
                state.architecture.files.push(file);
                state.architecture.normalize();
                state.architecture.refresh_optimization_info();
                state.context = Some(context.clone());
                store.save(state).await?;
                Ok(None)
            }
            Err(e) if state.options.continue_on_error => {
                warn!(path = %file.path, error = %e, "Skipping post-generation step");
                if !state.skipped_files.contains(&file.path) {
                    state.skipped_files.push(file.path.clone());
                }
                state.last_error = Some(format!("{}: {e}", file.path));
                store.save(state).await?;
                Ok(None)
            }
            Err(e) => {
                error!(path = %file.path, error = %e, "Generation paused");
                state.last_error = Some(format!("{}: {e}", file.path));
                store.save(state).await?;
                Ok(Some(paused(state, output)))
            }
        }
    }

    /// Render the webhook receiver, register its route and its secret
    async fn write_webhook(
        &self,
        output: &Path,
        entry: Option<&str>,
        spec: &WebhookSpec,
        context: &GenerationContext,
        options: &GenerationOptions,
    ) -> Result<(FileSpec, PathBuf)> {
        let file = webhook_file(spec);
        let content = self
            .templates
            .generate_webhook(&file, spec, context, options)
            .await?;
        let path = output.join(&file.path);
        self.output.write_file(&path, &content).await?;

        if let Some(entry) = entry {
            let mount = format!("/api/webhooks/{}", to_kebab_case(&spec.service_name));
            wire_route(self.output.as_ref(), output, entry, &mount, &file.path).await?;
        }
        wire_env_var(
            self.output.as_ref(),
            &output.join(ENV_TEMPLATE_PATH),
            &webhook_secret_var(&spec.service_name),
            "your_webhook_secret",
        )
        .await?;
        Ok((file, path))
    }

    /// Save through the repository, or write `diagram.json` beside the project
    async fn record_diagram(&self, state: &RecoveryState, output: &Path) -> Option<String> {
        let diagram = Diagram::from_architecture(&state.architecture);

        if let Some(repo) = &self.diagrams {
            let mut record = DiagramRecord::new(
                state.project_name.clone(),
                state.description.clone(),
                state.architecture.clone(),
                diagram.clone(),
                output.display().to_string(),
                state.options.clone(),
            );
            let saved = async {
                if let Some(existing) = repo.find_by_name(&record.name).await? {
                    record.id = existing.id;
                    record.created_at = existing.created_at;
                }
                repo.save(record).await
            }
            .await;
            match saved {
                Ok(record) => {
                    info!(name = %record.name, id = %record.id, "Diagram saved");
                    return Some(record.id);
                }
                Err(e) => warn!(error = %e, "Diagram repository unavailable; writing {DIAGRAM_SIDECAR}"),
            }
        }

        let sidecar = DiagramSidecar {
            name: &state.project_name,
            description: &state.description,
            architecture: &state.architecture,
            diagram: &diagram,
            created_at: Utc::now(),
        };
        let path = output.join(DIAGRAM_SIDECAR);
        let written = match serde_json::to_string_pretty(&sidecar) {
            Ok(json) => self.output.write_file(&path, &json).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = written {
            warn!(path = %path.display(), error = %e, "Could not write diagram sidecar");
        }
        None
    }
}

/// `options.name`, else the resolved output directory's name
fn project_name(options: &GenerationOptions, output: &Path) -> String {
    options
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| {
            resolve_path(output)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "api-project".to_string())
}

fn record_generated(state: &mut RecoveryState, path: &Path) {
    let path = std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string();
    if !state.generated_files.contains(&path) {
        state.generated_files.push(path);
    }
}

fn paused(state: &RecoveryState, output: &Path) -> PausedRun {
    PausedRun {
        output_path: output.to_path_buf(),
        project_name: state.project_name.clone(),
        phase: state.phase,
        current_category: state.current_category,
        current_category_index: state.current_category_index,
        file_counter: state.file_counter,
        total_files: state.total_files,
        last_error: state.last_error.clone().unwrap_or_default(),
    }
}

fn has_global_query(architecture: &Architecture) -> bool {
    architecture.files.iter().any(|f| {
        f.path.ends_with("routes/globalQuery.js") || f.path.ends_with("routes/global-query.js")
    })
}

fn has_graphql(architecture: &Architecture) -> bool {
    architecture
        .files
        .iter()
        .any(|f| f.path.starts_with("graphql/") || f.path.contains("/graphql/"))
}

/// `routes/webhooks/<service>Webhook.js`
fn webhook_path(service: &str) -> String {
    format!("routes/webhooks/{}Webhook.js", to_camel_case(service))
}

fn webhook_file(spec: &WebhookSpec) -> FileSpec {
    let description = if spec.description.is_empty() {
        format!("Webhook receiver for {}", spec.service_name)
    } else {
        spec.description.clone()
    };
    FileSpec::templated(webhook_path(&spec.service_name), description, TemplateType::Route)
}

/// Entry point of an existing project on disk
async fn find_entry_point(output: &Path) -> Option<String> {
    for dir in ["", "src/"] {
        for name in crate::architecture::role::ENTRY_POINTS {
            let candidate = format!("{dir}{name}");
            if tokio::fs::try_exists(output.join(&candidate)).await.unwrap_or(false)
                && FileRole::classify(&candidate) == FileRole::Main
            {
                return Some(candidate);
            }
        }
    }
    None
}
