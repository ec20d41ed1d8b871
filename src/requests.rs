use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::report::CheckRequest;

/// Request files to evaluate, rooted at the directory that holds the config.
#[derive(Debug)]
pub struct RequestSet {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
}

impl RequestSet {
    /// `path` is either a single request file or a directory walked for `*.json`.
    pub fn discover(path: &Path, config: &Config) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingPath(path.to_path_buf()));
        }

        if path.is_file() {
            return Ok(RequestSet {
                root: config_root(path),
                files: vec![path.to_path_buf()],
            });
        }

        let mut files = Vec::new();
        walk_dir(path, path, config, &mut files);
        files.sort();

        if files.is_empty() {
            return Err(Error::NoRequests(path.to_path_buf()));
        }

        tracing::debug!(root = %path.display(), count = files.len(), "discovered requests");
        Ok(RequestSet {
            root: path.to_path_buf(),
            files,
        })
    }
}

/// Directory searched for the config file when checking `path`.
pub fn config_root(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn load_request(path: &Path) -> Result<CheckRequest> {
    let contents = crate::error::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn walk_dir(root: &Path, dir: &Path, config: &Config, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable directory");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_dir(root, &path, config, files);
        } else if is_request_file(&path) && !config.is_file_ignored(root, &path) {
            files.push(path);
        }
    }
}

fn is_request_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
