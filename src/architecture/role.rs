//! Path classification: the single source of truth for file roles and categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Entry-point basenames recognised at the project root or under `src/`
pub const ENTRY_POINTS: [&str; 3] = ["app.js", "index.js", "server.js"];

/// What a file is, judged by where it lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Model,
    Controller,
    Route,
    Middleware,
    Config,
    Main,
    Other,
}

impl FileRole {
    /// Classify a relative POSIX path.
    ///
    /// Directory segments win over file names, so `config/app.js` is a config
    /// file and not an entry point.
    pub fn classify(path: &str) -> Self {
        let path = path.trim_start_matches("./").trim_start_matches('/');
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let file_name = segments.pop().unwrap_or_default();

        for dir in &segments {
            match *dir {
                "models" | "model" => return Self::Model,
                "controllers" | "controller" => return Self::Controller,
                "routes" | "route" => return Self::Route,
                "middleware" | "middlewares" => return Self::Middleware,
                "config" => return Self::Config,
                _ => {}
            }
        }

        if file_name == "package.json" || file_name.starts_with(".env") {
            return Self::Config;
        }

        let at_root = segments.is_empty() || segments == ["src"];
        if at_root && ENTRY_POINTS.contains(&file_name) {
            return Self::Main;
        }

        Self::Other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Controller => "controller",
            Self::Route => "route",
            Self::Middleware => "middleware",
            Self::Config => "config",
            Self::Main => "main",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation bucket; files are produced category by category in [`Category::ORDER`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Config,
    Models,
    Controllers,
    Routes,
    Other,
}

impl Category {
    /// Upstream categories first: controllers import models, routes import
    /// controllers, the entry point references routes.
    pub const ORDER: [Category; 5] = [
        Category::Config,
        Category::Models,
        Category::Controllers,
        Category::Routes,
        Category::Other,
    ];

    pub fn of(path: &str) -> Self {
        let path = path.trim_start_matches("./").trim_start_matches('/');
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let role = FileRole::classify(path);
        if path.starts_with("config/")
            || path.contains("/config/")
            || file_name == "package.json"
            || file_name.starts_with(".env")
            || (file_name == "app.js" && role == FileRole::Main)
            || path.starts_with("middleware/")
            || path.contains("/middleware/")
        {
            return Self::Config;
        }

        match role {
            FileRole::Model => Self::Models,
            FileRole::Controller => Self::Controllers,
            FileRole::Route => Self::Routes,
            _ => Self::Other,
        }
    }

    /// Position in [`Category::ORDER`]
    pub fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|c| *c == self)
            .unwrap_or(Self::ORDER.len())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Models => "models",
            Self::Controllers => "controllers",
            Self::Routes => "routes",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "config" => Ok(Self::Config),
            "models" | "model" => Ok(Self::Models),
            "controllers" | "controller" => Ok(Self::Controllers),
            "routes" | "route" => Ok(Self::Routes),
            "other" | "rest" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}

/// File name without directory
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// File name without directory or final extension
pub fn file_stem(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Directory part of a relative path, empty at the root
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// `require()` path from one project file to another, without `.js`.
///
/// `relative_module("controllers/userController.js", "models/user.js")` is
/// `../models/user`.
pub fn relative_module(from_file: &str, to_file: &str) -> String {
    let from: Vec<&str> = parent_dir(from_file).split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to_file.split('/').filter(|s| !s.is_empty()).collect();
    let (to_dirs, to_name) = to.split_at(to.len().saturating_sub(1));

    let common = from
        .iter()
        .zip(to_dirs)
        .take_while(|(a, b)| a == b)
        .count();
    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend_from_slice(&to_dirs[common..]);
    let name = to_name.first().copied().unwrap_or_default();
    parts.push(name.strip_suffix(".js").unwrap_or(name));

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}
