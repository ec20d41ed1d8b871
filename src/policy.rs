use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::violation::Severity;

pub const DEFAULT_PLATFORM_KEY: &str = "default";
pub const NEUTRAL_CATEGORY_RISK: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityMultipliers {
    pub critical: f64,
    pub warning: f64,
    pub info: f64,
}

impl SeverityMultipliers {
    pub fn new(critical: f64, warning: f64, info: f64) -> Self {
        Self {
            critical,
            warning,
            info,
        }
    }

    pub fn get(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }
}

impl Default for SeverityMultipliers {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// Per-platform weighting applied to every violation penalty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformProfile {
    pub display_name: String,
    pub strictness: f64,
    pub severity_multipliers: SeverityMultipliers,
    prohibited_categories: Vec<String>,
}

impl PlatformProfile {
    pub fn new<I, S>(
        display_name: impl Into<String>,
        strictness: f64,
        severity_multipliers: SeverityMultipliers,
        prohibited_categories: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            display_name: display_name.into(),
            strictness,
            severity_multipliers,
            prohibited_categories: normalize_categories(prohibited_categories),
        }
    }

    pub fn general() -> Self {
        Self::new(
            "General Platform",
            1.0,
            SeverityMultipliers::default(),
            Vec::<String>::new(),
        )
    }

    /// Lower-cased prohibited category substrings.
    pub fn prohibited_categories(&self) -> &[String] {
        &self.prohibited_categories
    }

    pub fn set_prohibited_categories<I, S>(&mut self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.prohibited_categories = normalize_categories(categories);
    }

    /// Case-insensitive substring match of `category` against the prohibited list.
    pub fn prohibits(&self, category: &str) -> bool {
        let category = category.to_lowercase();
        self.prohibited_categories
            .iter()
            .any(|prohibited| category.contains(prohibited.as_str()))
    }
}

/// Immutable platform and category lookup tables injected into scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTables {
    platforms: BTreeMap<String, PlatformProfile>,
    category_risk: BTreeMap<String, f64>,
    default_profile: PlatformProfile,
}

impl PolicyTables {
    pub fn empty() -> Self {
        Self {
            platforms: BTreeMap::new(),
            category_risk: BTreeMap::new(),
            default_profile: PlatformProfile::general(),
        }
    }

    /// Compiled-in platform and category tables, shared for the process lifetime.
    pub fn builtin() -> &'static PolicyTables {
        static BUILTIN: OnceLock<PolicyTables> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut tables = PolicyTables::empty();
            for (key, profile) in builtin_platforms() {
                tables.insert_platform(key, profile);
            }
            for (category, risk) in BUILTIN_CATEGORY_RISK {
                tables.insert_category_risk(category, *risk);
            }
            tables
        })
    }

    /// `default` replaces the fallback profile rather than adding a platform.
    pub fn insert_platform(&mut self, key: &str, profile: PlatformProfile) {
        let key = normalize_key(key);
        if key == DEFAULT_PLATFORM_KEY {
            self.default_profile = profile;
        } else {
            self.platforms.insert(key, profile);
        }
    }

    pub fn insert_category_risk(&mut self, category: &str, risk: f64) {
        self.category_risk.insert(normalize_key(category), risk);
    }

    /// Profile registered under `key` (without falling back to the default).
    pub fn platform(&self, key: &str) -> Option<&PlatformProfile> {
        let key = normalize_key(key);
        if key == DEFAULT_PLATFORM_KEY {
            return Some(&self.default_profile);
        }
        self.platforms.get(&key)
    }

    pub fn default_profile(&self) -> &PlatformProfile {
        &self.default_profile
    }

    pub fn platforms(&self) -> impl Iterator<Item = (&str, &PlatformProfile)> {
        self.platforms.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn resolve_platform_profile(&self, platform: &str) -> &PlatformProfile {
        self.platforms
            .get(&normalize_key(platform))
            .unwrap_or(&self.default_profile)
    }

    pub fn resolve_category_risk(&self, category: &str) -> f64 {
        self.category_risk
            .get(&normalize_key(category))
            .copied()
            .unwrap_or(NEUTRAL_CATEGORY_RISK)
    }
}

impl Default for PolicyTables {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalize_categories<I, S>(categories: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    categories
        .into_iter()
        .map(|c| normalize_key(c.as_ref()))
        .filter(|c| !c.is_empty())
        .collect()
}

fn builtin_platforms() -> Vec<(&'static str, PlatformProfile)> {
    vec![
        (
            "meta",
            PlatformProfile::new(
                "Meta (Facebook/Instagram)",
                1.5,
                SeverityMultipliers::new(1.8, 1.3, 1.0),
                [
                    "before/after imagery",
                    "nudity",
                    "body shaming",
                    "unrealistic outcomes",
                ],
            ),
        ),
        (
            "tiktok",
            PlatformProfile::new(
                "TikTok",
                1.4,
                SeverityMultipliers::new(1.6, 1.3, 1.0),
                ["before/after imagery", "nudity", "sensitive content"],
            ),
        ),
        (
            "google",
            PlatformProfile::new(
                "Google Ads",
                1.2,
                SeverityMultipliers::new(1.4, 1.2, 1.0),
                ["misleading claims", "unverified medical claims"],
            ),
        ),
        (
            "youtube",
            PlatformProfile::new(
                "YouTube",
                1.1,
                SeverityMultipliers::new(1.3, 1.1, 1.0),
                ["misleading health claims"],
            ),
        ),
    ]
}

const BUILTIN_CATEGORY_RISK: &[(&str, f64)] = &[
    ("weight loss", 1.5),
    ("otc drugs", 1.4),
    ("food/dietary supplements", 1.3),
    ("alcohol", 1.3),
    ("milk code products", 1.4),
    ("cosmetics", 1.1),
    ("consumer electronics", 1.0),
    ("airline promo fares", 1.0),
];
