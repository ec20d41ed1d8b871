//! JSON rulebook describing base rules, per-platform overrides and the
//! regulation status of product categories.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::policy::normalize_key;
use crate::violation::{Severity, Violation};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PolicyDb {
    pub base_rules: Vec<PolicyRule>,
    pub platform_overrides: BTreeMap<String, PlatformOverrides>,
    #[serde(rename = "productCategories")]
    pub product_categories: Vec<ProductCategory>,
    #[serde(rename = "claimsRequiringPreScreen")]
    pub claims_requiring_pre_screen: Vec<PreScreenClaim>,
    pub prohibited_phrases: Vec<String>,
    pub required_disclaimers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_rule_severity", deserialize_with = "lenient_severity")]
    pub severity: Severity,
    #[serde(default)]
    pub pattern: Vec<String>,
}

/// Every key other than `additional_banned` is a rule id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlatformOverrides {
    #[serde(default)]
    pub additional_banned: Vec<String>,
    #[serde(flatten)]
    pub rules: BTreeMap<String, RuleOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleOverride {
    #[serde(default, deserialize_with = "lenient_optional_severity")]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub name: String,
    #[serde(default)]
    pub regulated: bool,
    #[serde(default)]
    pub requires_prescreen: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreScreenClaim {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Policy facts attached to a report for the requested platform and category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyContext {
    pub regulated: bool,
    pub requires_prescreen: bool,
    pub required_disclaimers: Vec<String>,
    pub banned_terms: Vec<String>,
}

impl PolicyDb {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = crate::error::read_to_string(path)?;
        let db: PolicyDb = serde_json::from_str(&contents).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            rules = db.base_rules.len(),
            "loaded policy database"
        );
        Ok(db)
    }

    fn overrides_for(&self, platform: &str) -> Option<&PlatformOverrides> {
        let key = normalize_key(platform);
        self.platform_overrides
            .iter()
            .find(|(name, _)| normalize_key(name) == key)
            .map(|(_, overrides)| overrides)
    }

    fn override_severity(&self, platform: &str, rule_id: &str) -> Option<Severity> {
        self.overrides_for(platform)
            .and_then(|o| o.rules.get(rule_id))
            .and_then(|o| o.severity)
    }

    /// Base rules with the platform's severity overrides applied.
    pub fn apply_platform_overrides(&self, platform: &str) -> Vec<PolicyRule> {
        self.base_rules
            .iter()
            .map(|rule| match self.override_severity(platform, &rule.id) {
                Some(severity) => PolicyRule {
                    severity,
                    ..rule.clone()
                },
                None => rule.clone(),
            })
            .collect()
    }

    pub fn category_info(&self, category: &str) -> Option<&ProductCategory> {
        let key = normalize_key(category);
        self.product_categories
            .iter()
            .find(|c| normalize_key(&c.name) == key)
    }

    pub fn pre_screen_claims(&self) -> &[PreScreenClaim] {
        &self.claims_requiring_pre_screen
    }

    pub fn platform_banned(&self, platform: &str) -> &[String] {
        self.overrides_for(platform)
            .map(|o| o.additional_banned.as_slice())
            .unwrap_or(&[])
    }

    /// Re-grades violations citing a rule the platform overrides.
    pub fn reclassify(&self, violations: &mut [Violation], platform: &str) {
        for violation in violations.iter_mut() {
            if let Some(severity) = self.override_severity(platform, &violation.policy_reference)
            {
                if severity != violation.severity {
                    tracing::debug!(
                        id = %violation.id,
                        rule = %violation.policy_reference,
                        from = %violation.severity,
                        to = %severity,
                        "platform override changed severity"
                    );
                    violation.severity = severity;
                }
            }
        }
    }

    pub fn context(&self, platform: &str, category: &str) -> PolicyContext {
        let info = self.category_info(category);
        PolicyContext {
            regulated: info.is_some_and(|c| c.regulated),
            requires_prescreen: info.is_some_and(|c| c.requires_prescreen),
            required_disclaimers: self.required_disclaimers.clone(),
            banned_terms: self.platform_banned(platform).to_vec(),
        }
    }
}

fn default_rule_severity() -> Severity {
    Severity::Info
}

fn lenient_severity<'de, D>(deserializer: D) -> std::result::Result<Severity, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(Severity::parse(&value))
}

fn lenient_optional_severity<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Severity>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().map(Severity::parse))
}
