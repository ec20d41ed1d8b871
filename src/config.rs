use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::policy::{PlatformProfile, PolicyTables, SeverityMultipliers};

pub const CONFIG_FILENAME: &str = "ad-preflight.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub platforms: BTreeMap<String, PlatformOverride>,
    pub categories: BTreeMap<String, f64>,
    pub ignore: IgnoreConfig,
    pub ci: CiConfig,
}

/// Partial platform profile. Unset fields keep the built-in (or default) value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlatformOverride {
    pub display_name: Option<String>,
    pub strictness: Option<f64>,
    pub severity_multipliers: Option<MultiplierOverride>,
    pub prohibited_categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MultiplierOverride {
    pub critical: Option<f64>,
    pub warning: Option<f64>,
    pub info: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CiConfig {
    pub fail_below: u32,
}

impl Config {
    /// Looks for `ad-preflight.toml` in `root`; a missing file means defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILENAME);
        if !config_path.exists() {
            return Ok(Config::default());
        }
        Self::load_file(&config_path)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = crate::error::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Built-in tables with this config's overrides layered on top.
    pub fn policy_tables(&self) -> Result<PolicyTables> {
        let mut tables = PolicyTables::builtin().clone();

        for (key, overrides) in &self.platforms {
            let base = tables
                .platform(key)
                .cloned()
                .unwrap_or_else(|| tables.default_profile().clone());
            let profile = overrides.apply(key, base)?;
            tables.insert_platform(key, profile);
        }

        for (category, risk) in &self.categories {
            if !risk.is_finite() || *risk < 1.0 {
                return Err(Error::InvalidConfig(format!(
                    "category risk for '{category}' must be a finite number >= 1.0, found {risk}"
                )));
            }
            tables.insert_category_risk(category, *risk);
        }

        Ok(tables)
    }

    pub fn is_file_ignored(&self, root: &Path, file_path: &Path) -> bool {
        let absolute = file_path.to_string_lossy().replace('\\', "/");
        let relative = file_path
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| absolute.clone());

        self.ignore.files.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|glob| glob.matches(&relative) || glob.matches(&absolute))
                .unwrap_or(false)
        })
    }
}

impl PlatformOverride {
    fn apply(&self, key: &str, mut profile: PlatformProfile) -> Result<PlatformProfile> {
        if let Some(name) = &self.display_name {
            profile.display_name = name.clone();
        }

        if let Some(strictness) = self.strictness {
            if !strictness.is_finite() || strictness < 1.0 {
                return Err(Error::InvalidConfig(format!(
                    "strictness for platform '{key}' must be a finite number >= 1.0, found {strictness}"
                )));
            }
            profile.strictness = strictness;
        }

        if let Some(multipliers) = &self.severity_multipliers {
            profile.severity_multipliers = multipliers.apply(key, profile.severity_multipliers)?;
        }

        if let Some(categories) = &self.prohibited_categories {
            profile.set_prohibited_categories(categories);
        }

        Ok(profile)
    }
}

impl MultiplierOverride {
    fn apply(&self, key: &str, base: SeverityMultipliers) -> Result<SeverityMultipliers> {
        let check = |name: &str, value: Option<f64>, fallback: f64| match value {
            Some(v) if !v.is_finite() || v < 0.0 => Err(Error::InvalidConfig(format!(
                "{name} multiplier for platform '{key}' must be a finite non-negative number, found {v}"
            ))),
            Some(v) => Ok(v),
            None => Ok(fallback),
        };

        Ok(SeverityMultipliers {
            critical: check("critical", self.critical, base.critical)?,
            warning: check("warning", self.warning, base.warning)?,
            info: check("info", self.info, base.info)?,
        })
    }
}
