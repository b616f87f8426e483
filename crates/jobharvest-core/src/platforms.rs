use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, CoreError};

/// A job board the harvester knows how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LinkedIn,
    Indeed,
    Naukri,
    Internshala,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::LinkedIn,
        Platform::Indeed,
        Platform::Naukri,
        Platform::Internshala,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::Indeed => "indeed",
            Platform::Naukri => "naukri",
            Platform::Internshala => "internshala",
        }
    }

    /// Origin used to resolve relative apply links scraped from this platform.
    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Platform::LinkedIn => "https://www.linkedin.com",
            Platform::Indeed => "https://in.indeed.com",
            Platform::Naukri => "https://www.naukri.com",
            Platform::Internshala => "https://internshala.com",
        }
    }

    /// Per-platform timeout applied when the platforms file omits one.
    #[must_use]
    pub fn default_timeout_ms(self) -> u64 {
        match self {
            // Rendered through a browser session; pages take noticeably longer.
            Platform::Naukri => 180_000,
            _ => 120_000,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Ok(Platform::LinkedIn),
            "indeed" => Ok(Platform::Indeed),
            "naukri" => Ok(Platform::Naukri),
            "internshala" => Ok(Platform::Internshala),
            other => Err(CoreError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Per-platform harvest knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_page_count")]
    pub page_count: u32,
    /// Budget for the whole platform task, not for a single request.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl PlatformConfig {
    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            enabled: true,
            page_count: default_page_count(),
            timeout_ms: Some(platform.default_timeout_ms()),
        }
    }

    #[must_use]
    pub fn timeout_ms_or_default(&self, platform: Platform) -> u64 {
        self.timeout_ms
            .unwrap_or_else(|| platform.default_timeout_ms())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_page_count() -> u32 {
    3
}

/// What to search for on every platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub keywords: String,
    #[serde(default = "default_location")]
    pub location: String,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            keywords: "software developer".to_string(),
            location: default_location(),
        }
    }
}

fn default_location() -> String {
    "India".to_string()
}

/// Input to one harvest cycle: which platforms to run and how hard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub platforms: BTreeMap<Platform, PlatformConfig>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            platforms: Platform::ALL
                .into_iter()
                .map(|p| (p, PlatformConfig::for_platform(p)))
                .collect(),
        }
    }
}

impl HarvestConfig {
    /// Enabled platforms in a stable order.
    pub fn enabled(&self) -> impl Iterator<Item = (Platform, &PlatformConfig)> {
        self.platforms
            .iter()
            .filter(|(_, cfg)| cfg.enabled)
            .map(|(p, cfg)| (*p, cfg))
    }

    /// Restricts the cycle to `only`, disabling every other platform.
    #[must_use]
    pub fn restricted_to(mut self, only: &[Platform]) -> Self {
        if only.is_empty() {
            return self;
        }
        for (platform, cfg) in &mut self.platforms {
            cfg.enabled = cfg.enabled && only.contains(platform);
        }
        self
    }

    /// Overrides the page count of every platform.
    #[must_use]
    pub fn with_page_count(mut self, pages: u32) -> Self {
        for cfg in self.platforms.values_mut() {
            cfg.page_count = pages;
        }
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformsFile {
    #[serde(default)]
    pub search: SearchQuery,
    #[serde(default)]
    pub platforms: BTreeMap<Platform, PlatformConfig>,
}

impl PlatformsFile {
    /// Built-in settings used when no platforms file exists.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            search: SearchQuery::default(),
            platforms: HarvestConfig::default().platforms,
        }
    }

    /// Harvest config with every known platform present; platforms missing
    /// from the file fall back to their defaults.
    #[must_use]
    pub fn harvest_config(&self) -> HarvestConfig {
        let mut config = HarvestConfig::default();
        for (platform, cfg) in &self.platforms {
            config.platforms.insert(*platform, *cfg);
        }
        config
    }
}

/// Load and validate the platforms file. A missing file yields the built-in defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or fails validation.
pub fn load_platforms(path: &Path) -> Result<PlatformsFile, ConfigError> {
    if !path.exists() {
        return Ok(PlatformsFile::builtin());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PlatformsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_platforms(&content)
}

pub(crate) fn parse_platforms(content: &str) -> Result<PlatformsFile, ConfigError> {
    let file: PlatformsFile = serde_yaml::from_str(content)?;
    validate_platforms(&file)?;
    Ok(file)
}

fn validate_platforms(file: &PlatformsFile) -> Result<(), ConfigError> {
    if file.search.keywords.trim().is_empty() {
        return Err(ConfigError::Validation(
            "search.keywords must be non-empty".to_string(),
        ));
    }

    for (platform, cfg) in &file.platforms {
        if cfg.page_count == 0 {
            return Err(ConfigError::Validation(format!(
                "platform '{platform}' has page_count 0; must be at least 1"
            )));
        }
        if let Some(timeout_ms) = cfg.timeout_ms {
            if timeout_ms < 1_000 {
                return Err(ConfigError::Validation(format!(
                    "platform '{platform}' has timeout_ms {timeout_ms}; must be at least 1000"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "platforms_test.rs"]
mod tests;
