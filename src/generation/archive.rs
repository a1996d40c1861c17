//! ZIP packaging of a generated project

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::core::{Error, Result};
use crate::generation::output::resolve_path;
use crate::generation::recovery::is_recovery_file;

/// `<output>/../<project_name>.zip`, with `output` resolved first so `.`
/// still lands one level up
pub fn archive_path(output: &Path, project_name: &str) -> PathBuf {
    let output = resolve_path(output);
    let file_name = format!("{project_name}.zip");
    match output.parent() {
        Some(parent) => parent.join(file_name),
        None => output.join(file_name),
    }
}

/// Deflate `source` at maximum level into `destination`.
///
/// Entry names are relative to `source`; checkpoint files and the archive
/// itself are left out.
pub async fn zip_directory(source: &Path, destination: &Path) -> Result<PathBuf> {
    let source = source.to_path_buf();
    let destination = destination.to_path_buf();
    let written = tokio::task::spawn_blocking(move || write_zip(&source, &destination))
        .await
        .map_err(|e| Error::Archive(format!("Task execution failed: {e}")))??;
    Ok(written)
}

fn write_zip(source: &Path, destination: &Path) -> Result<PathBuf> {
    let file = File::create(destination).map_err(|e| Error::filesystem(destination, e))?;
    // Resolved only once the file exists, so both sides of the self-exclusion
    // check below are canonical.
    let source = resolve_path(source);
    let destination = resolve_path(destination);
    let (source, destination) = (source.as_path(), destination.as_path());
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let mut entries = 0usize;
    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Archive(e.to_string()))?;
        let path = entry.path();
        if path == destination || is_recovery_file(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let relative = path
            .strip_prefix(source)
            .map_err(|e| Error::Archive(e.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else {
            writer.start_file(name, options)?;
            let mut input = File::open(path).map_err(|e| Error::filesystem(path, e))?;
            io::copy(&mut input, &mut writer).map_err(|e| Error::filesystem(path, e))?;
            entries += 1;
        }
    }

    writer.finish()?;
    info!(archive = %destination.display(), files = entries, "Created project archive");
    Ok(destination.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_archive_path_is_beside_output() {
        assert_eq!(
            archive_path(Path::new("/work/blog-api"), "blog-api"),
            PathBuf::from("/work/blog-api.zip")
        );
    }

    #[test]
    fn test_archive_path_resolves_dot_segments() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("shop");
        std::fs::create_dir_all(output.join("models")).unwrap();

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(archive_path(&output.join("models/.."), "shop"), root.join("shop.zip"));
        assert_eq!(archive_path(&output.join("."), "shop"), root.join("shop.zip"));
    }

    #[tokio::test]
    async fn test_zip_skips_destination_inside_source() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.js"), "const app = 1;\n").unwrap();

        // Destination given through a `..` detour still matches the walked entry
        let destination = dir.path().join("models/../shop.zip");
        std::fs::create_dir_all(dir.path().join("models")).unwrap();
        let zip_path = zip_directory(dir.path(), &destination).await.unwrap();

        let archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(!names.contains(&"shop.zip"));
        assert!(names.contains(&"app.js"));
    }

    #[tokio::test]
    async fn test_zip_relative_entries_without_recovery() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("blog");
        std::fs::create_dir_all(output.join("models")).unwrap();
        std::fs::create_dir_all(output.join("routes")).unwrap();
        std::fs::write(output.join("app.js"), "const app = 1;\n").unwrap();
        std::fs::write(output.join("models/user.js"), "module.exports = {};\n").unwrap();
        std::fs::write(output.join(".recovery.json"), "{}").unwrap();

        let zip_path = zip_directory(&output, &archive_path(&output, "blog")).await.unwrap();
        assert_eq!(zip_path, dir.path().canonicalize().unwrap().join("blog.zip"));

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["app.js", "models/", "models/user.js", "routes/"]);

        let mut content = String::new();
        archive
            .by_name("models/user.js")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "module.exports = {};\n");
        assert_eq!(
            archive.by_name("app.js").unwrap().compression(),
            CompressionMethod::Deflated
        );
    }
}
