//! Site configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Integration that enables `.mdx` content files.
pub const MDX_INTEGRATION: &str = "mdx";

/// Main configuration structure for examnotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public origin of the site (e.g., "https://example.github.io").
    pub url: String,

    /// Path prefix the site is served under (e.g., "/final-exam-notes").
    #[serde(default)]
    pub base_path: String,

    /// Enabled build integrations, passed through to the host build tool.
    #[serde(default)]
    pub integrations: Vec<String>,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Root directory holding one subdirectory per collection.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("src/content")
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `EXAMNOTES__SECTION__KEY` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("EXAMNOTES")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.url.is_empty() {
            return Err(CoreError::config("site.url cannot be empty"));
        }

        if self.site.url.ends_with('/') {
            tracing::warn!("site.url should not have a trailing slash");
        }

        if !self.site.base_path.is_empty() {
            if !self.site.base_path.starts_with('/') {
                return Err(CoreError::config(format!(
                    "site.base_path must start with '/': {}",
                    self.site.base_path
                )));
            }
            if self.site.base_path.len() > 1 && self.site.base_path.ends_with('/') {
                tracing::warn!("site.base_path should not have a trailing slash");
            }
        }

        Ok(())
    }

    /// Whether an integration is enabled.
    pub fn has_integration(&self, name: &str) -> bool {
        self.site.integrations.iter().any(|i| i == name)
    }

    /// File extensions treated as content.
    pub fn content_extensions(&self) -> Vec<&'static str> {
        let mut extensions = vec!["md"];
        if self.has_integration(MDX_INTEGRATION) {
            extensions.push("mdx");
        }
        extensions
    }

    /// Directory holding the entries of `collection`.
    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.build.content_dir.join(collection)
    }

    /// Get the full URL for a path, including the base path.
    pub fn url_for(&self, path: &str) -> String {
        let origin = self.site.url.trim_end_matches('/');
        let base = self.site.base_path.trim_matches('/');
        let path = path.trim_start_matches('/');

        match (base.is_empty(), path.is_empty()) {
            (true, _) => format!("{origin}/{path}"),
            (false, true) => format!("{origin}/{base}/"),
            (false, false) => format!("{origin}/{base}/{path}"),
        }
    }
}
