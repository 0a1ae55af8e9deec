//! Check command - validate configuration and content

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use examnotes_content::{ContentLoader, EntryFailure, LoadError};
use examnotes_core::{CollectionEntry, CollectionRegistry, Config, TopicEntry};

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates configuration and every entry of every registered collection.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and content");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match crate::load_config(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            println!("  ✗ Configuration invalid: {e:#}");
            bail!("Validation failed: configuration is invalid");
        }
    };
    check_config_values(&config, &mut result);

    println!("\nChecking collections...");
    let registry = CollectionRegistry::standard();
    let loader = ContentLoader::new(&config, &registry);
    for name in registry.names() {
        if name == TopicEntry::COLLECTION {
            check_collection::<TopicEntry>(&loader, &mut result)?;
        } else {
            result.add_warning(format!("No entry type for collection `{name}`"));
        }
    }

    // Print summary
    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Load one collection and record its failures and warnings.
fn check_collection<E: CollectionEntry>(
    loader: &ContentLoader<'_>,
    result: &mut ValidationResult,
) -> Result<()> {
    let report = loader.load::<E>()?;
    let collection = report.collection;
    let checked = report.entries.len() + report.failures.len();

    if checked == 0 {
        result.add_warning(format!("Collection `{collection}` has no entries"));
    }

    for failure in &report.failures {
        result.add_error(describe_failure(failure));
    }

    for (key, slugs) in report.shared_sort_keys() {
        result.add_warning(format!(
            "{collection}: entries {} share order {key}",
            slugs.join(", ")
        ));
    }

    if report.is_clean() {
        println!("  ✓ {collection}: all {checked} entries valid");
    } else {
        println!(
            "  ✗ {collection}: {}/{checked} entries have errors",
            report.failures.len()
        );
    }

    Ok(())
}

/// One line per failing file, listing every violated rule.
fn describe_failure(failure: &EntryFailure) -> String {
    match &failure.error {
        LoadError::Validation { source, .. } => {
            let details: Vec<_> = source
                .violations
                .iter()
                .map(|v| format!("{v} [{}]", v.rule()))
                .collect();
            format!("{}: {}", failure.path.display(), details.join("; "))
        }
        other => format!("{}: {other}", failure.path.display()),
    }
}

/// Check configuration values for common issues.
fn check_config_values(config: &Config, result: &mut ValidationResult) {
    if !config.site.url.starts_with("http") {
        result.add_warning("site.url should start with http:// or https://");
    }

    let content_dir = &config.build.content_dir;
    if !content_dir.exists() {
        result.add_error(format!(
            "Content directory does not exist: {}",
            content_dir.display()
        ));
    } else if !content_dir.is_dir() {
        result.add_error(format!(
            "Content path exists but is not a directory: {}",
            content_dir.display()
        ));
    }

    println!("  ✓ Configuration values checked");
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn site(topics: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("examnotes.toml"),
            "[site]\nurl = \"https://notes.example.com\"\n\n[build]\ncontent_dir = \"content\"\n",
        )
        .expect("write config");
        let topics_dir = dir.path().join("content/topics");
        fs::create_dir_all(&topics_dir).expect("mkdir");
        for (name, contents) in topics {
            fs::write(topics_dir.join(name), contents).expect("write topic");
        }
        dir
    }

    #[test]
    fn test_check_passes_on_valid_site() {
        let dir = site(&[("recursion.md", "---\ntitle: Recursion\norder: 3\n---\n")]);
        run(&dir.path().join("examnotes.toml"), true).expect("valid site");
    }

    #[test]
    fn test_check_fails_on_invalid_entry() {
        let dir = site(&[
            ("recursion.md", "---\ntitle: Recursion\norder: 3\n---\n"),
            ("sorting.md", "---\ntitle: Sorting\norder: 15\n---\n"),
        ]);
        let err = run(&dir.path().join("examnotes.toml"), false).expect_err("invalid site");
        assert!(err.to_string().contains("1 error(s)"));
    }

    #[test]
    fn test_strict_fails_on_shared_order() {
        let dir = site(&[
            ("a.md", "---\ntitle: A\norder: 2\n---\n"),
            ("b.md", "---\ntitle: B\norder: 2\n---\n"),
        ]);
        let config_path = dir.path().join("examnotes.toml");
        run(&config_path, false).expect("warnings only");
        let err = run(&config_path, true).expect_err("strict");
        assert!(err.to_string().contains("strict mode"));
    }

    #[test]
    fn test_check_fails_on_missing_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(run(&dir.path().join("examnotes.toml"), false).is_err());
    }

    #[test]
    fn test_describe_failure_lists_rules() {
        let raw = examnotes_core::RawMetadata::new();
        let source = TopicEntry::validate(&raw).expect_err("empty metadata");
        let failure = EntryFailure {
            path: "topics/empty.md".into(),
            error: LoadError::Validation {
                path: "topics/empty.md".into(),
                source,
            },
        };

        let line = describe_failure(&failure);
        assert!(line.starts_with("topics/empty.md: "));
        assert!(line.contains("missing required field `title` [missing]"));
        assert!(line.contains("missing required field `order` [missing]"));
    }
}
