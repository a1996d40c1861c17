//! Cross-wiring: registering post-phase files in the entry point and the
//! environment template. Every splice is idempotent.

use std::path::Path;

use tracing::{debug, warn};

use crate::architecture::role::relative_module;
use crate::architecture::{Architecture, FileRole};
use crate::core::Result;
use crate::generation::output::OutputService;

/// Marker line the canonical entry-point template places after its routes
pub const ROUTES_MARKER: &str = "// <routes:autogen>";

/// Comments that open a hand-written routes region
const ROUTES_COMMENTS: [&str; 2] = ["// Rutas", "// Routes"];

/// `app.use('<mount>', require('<module>'));`
pub fn route_registration(mount: &str, module: &str) -> String {
    format!("app.use('{mount}', require('{module}'));")
}

/// Insert a route registration into entry-point source.
///
/// Placement: before [`ROUTES_MARKER`]; without it, after the last `app.use(`
/// line of the block following a routes comment; without either, before
/// `module.exports`/`app.listen`, else at the end. An identical line already
/// present leaves the text untouched.
pub fn splice_route(source: &str, mount: &str, module: &str) -> String {
    let registration = route_registration(mount, module);
    let mut lines: Vec<&str> = source.lines().collect();
    if lines.iter().any(|l| l.trim() == registration) {
        return source.to_string();
    }

    let (at, indent) = insertion_point(&lines);
    let inserted = format!("{indent}{registration}");
    lines.insert(at, &inserted);

    let mut out = lines.join("\n");
    if source.is_empty() || source.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn insertion_point(lines: &[&str]) -> (usize, String) {
    if let Some(i) = lines.iter().position(|l| l.trim() == ROUTES_MARKER) {
        return (i, leading_ws(lines[i]).to_string());
    }

    if let Some(comment) = lines
        .iter()
        .position(|l| ROUTES_COMMENTS.iter().any(|c| l.trim_start().starts_with(c)))
    {
        let mut last = None;
        for (i, line) in lines.iter().enumerate().skip(comment + 1) {
            let trimmed = line.trim();
            if trimmed.starts_with("app.use(") {
                last = Some(i);
            } else if !trimmed.is_empty() && last.is_some() {
                break;
            }
        }
        return match last {
            Some(i) => (i + 1, leading_ws(lines[i]).to_string()),
            None => (comment + 1, leading_ws(lines[comment]).to_string()),
        };
    }

    if let Some(i) = lines.iter().position(|l| {
        let trimmed = l.trim_start();
        trimmed.starts_with("module.exports") || trimmed.starts_with("app.listen")
    }) {
        return (i, String::new());
    }

    (lines.len(), String::new())
}

fn leading_ws(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Append `NAME=value` unless `NAME` already appears anywhere in the text
pub fn append_env_var(source: &str, name: &str, value: &str) -> String {
    if source.contains(name) {
        return source.to_string();
    }
    let mut out = source.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("{name}={value}\n"));
    out
}

/// The architecture's entry point, if it declares one
pub fn entry_point_path(architecture: &Architecture) -> Option<&str> {
    architecture
        .files
        .iter()
        .find(|f| FileRole::classify(&f.path) == FileRole::Main)
        .map(|f| f.path.as_str())
}

/// Register `target` (a project-relative route file) in the entry point
/// under `mount`. Returns whether the entry point changed.
pub async fn wire_route(
    output: &dyn OutputService,
    root: &Path,
    entry_point: &str,
    mount: &str,
    target: &str,
) -> Result<bool> {
    let path = root.join(entry_point);
    let Some(source) = output.read_file(&path).await? else {
        warn!(entry = %entry_point, mount = %mount, "Entry point missing; route not registered");
        return Ok(false);
    };

    let spliced = splice_route(&source, mount, &relative_module(entry_point, target));
    if spliced == source {
        debug!(mount = %mount, "Route already registered");
        return Ok(false);
    }
    output.write_file(&path, &spliced).await?;
    Ok(true)
}

/// Append an environment variable to the env template, creating it if needed
pub async fn wire_env_var(
    output: &dyn OutputService,
    env_path: &Path,
    name: &str,
    value: &str,
) -> Result<bool> {
    let source = output.read_file(env_path).await?.unwrap_or_default();
    let updated = append_env_var(&source, name, value);
    if updated == source {
        return Ok(false);
    }
    output.write_file(env_path, &updated).await?;
    Ok(true)
}
