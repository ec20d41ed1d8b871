use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::policy_db::PolicyDb;
use crate::report::{assemble, CheckRequest, ComplianceReport};
use crate::requests::{config_root, load_request, RequestSet};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Replaces each request's platform.
    pub platform: Option<String>,
    /// Replaces each request's product category.
    pub category: Option<String>,
    pub policy_db: Option<PathBuf>,
    /// Explicit config file; otherwise `ad-preflight.toml` next to the input.
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub source: String,
    pub report: ComplianceReport,
}

/// A request file that could not be read or parsed, and so was never scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRequest {
    pub source: String,
    pub reason: String,
}

pub struct EngineResult {
    pub outcomes: Vec<CheckOutcome>,
    pub skipped: Vec<SkippedRequest>,
    pub fail_below: u32,
}

impl EngineResult {
    /// A skipped request counts as a failure: it may hold a critical finding.
    pub fn passed(&self) -> bool {
        self.skipped.is_empty()
            && self
                .outcomes
                .iter()
                .all(|o| o.report.passed() && o.report.compliance_score >= self.fail_below)
    }
}

pub fn run(path: &Path, options: &RunOptions) -> Result<EngineResult> {
    let config = match &options.config {
        Some(file) => Config::load_file(file)?,
        None => Config::load(&config_root(path))?,
    };
    let tables = config.policy_tables()?;
    let policy_db = options.policy_db.as_deref().map(PolicyDb::load).transpose()?;

    let mut requests = RequestSet::discover(path, &config)?;
    if let Some(db_path) = &options.policy_db {
        let db_path = db_path.canonicalize().unwrap_or_else(|_| db_path.clone());
        requests
            .files
            .retain(|f| f.canonicalize().unwrap_or_else(|_| f.clone()) != db_path);
    }

    tracing::info!(
        root = %requests.root.display(),
        requests = requests.files.len(),
        "checking requests"
    );

    let checked: Vec<std::result::Result<CheckOutcome, SkippedRequest>> = requests
        .files
        .par_iter()
        .map(|file| {
            let source = display_source(&requests.root, file);
            let request = match load_request(file) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("skipping request: {e}");
                    return Err(SkippedRequest {
                        source,
                        reason: e.to_string(),
                    });
                }
            };
            let request = apply_overrides(request, options);
            let report = assemble(&request, &tables, policy_db.as_ref());
            tracing::debug!(
                file = %file.display(),
                score = report.compliance_score,
                status = %report.status,
                "checked request"
            );
            Ok(CheckOutcome { source, report })
        })
        .collect();

    let mut outcomes = Vec::new();
    let mut skipped = Vec::new();
    for entry in checked {
        match entry {
            Ok(outcome) => outcomes.push(outcome),
            Err(skip) => skipped.push(skip),
        }
    }

    if outcomes.is_empty() && skipped.is_empty() {
        return Err(Error::NoRequests(requests.root));
    }

    Ok(EngineResult {
        outcomes,
        skipped,
        fail_below: config.ci.fail_below,
    })
}

fn apply_overrides(mut request: CheckRequest, options: &RunOptions) -> CheckRequest {
    if let Some(platform) = &options.platform {
        request.platform = platform.clone();
    }
    if let Some(category) = &options.category {
        request.product_category = category.clone();
    }
    request
}

fn display_source(root: &Path, file: &Path) -> String {
    file.strip_prefix(root)
        .ok()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/")
}
