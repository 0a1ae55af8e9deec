//! examnotes CLI Library
//!
//! Command implementations for the `examnotes` binary, exposed as a library so
//! they can be tested and reused.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (check, list, new, schema)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use examnotes::cmd;
//!
//! // Validate every collection of a site
//! cmd::check::run(Path::new("examnotes.toml"), false).unwrap();
//! ```

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

pub mod cmd;

// Re-export core types for convenience
pub use examnotes_content::{CollectionReport, ContentLoader};
pub use examnotes_core::{CollectionRegistry, Config, TopicEntry};

/// Load the site configuration with environment overrides.
///
/// A relative `build.content_dir` is resolved against the directory holding
/// the configuration file.
pub fn load_config(config_path: &Path) -> Result<Config> {
    let mut config = Config::load_with_env(config_path)
        .wrap_err_with(|| format!("Failed to load {}", config_path.display()))?;

    if config.build.content_dir.is_relative()
        && let Some(root) = config_path.parent()
    {
        config.build.content_dir = root.join(&config.build.content_dir);
    }

    tracing::debug!(content_dir = %config.build.content_dir.display(), "configuration loaded");
    Ok(config)
}

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// # Example
///
/// ```no_run
/// examnotes::init_tracing(2); // Enable DEBUG level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_resolves_content_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_path = dir.path().join("examnotes.toml");
        std::fs::write(
            &config_path,
            "[site]\nurl = \"https://notes.example.com\"\n\n[build]\ncontent_dir = \"content\"\n",
        )
        .expect("write");

        let config = load_config(&config_path).expect("load");
        assert_eq!(config.build.content_dir, dir.path().join("content"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/examnotes.toml")).expect_err("missing");
        assert!(format!("{err:#}").contains("not found"));
    }
}
