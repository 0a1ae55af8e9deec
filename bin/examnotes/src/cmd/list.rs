//! List command - print validated entries in display order

use std::path::Path;

use color_eyre::eyre::Result;
use examnotes_content::{ContentLoader, LoadedEntry};
use examnotes_core::{CollectionEntry, CollectionRegistry, Config, TopicEntry};

/// Run the list command.
///
/// Prints every accepted topic, optionally restricted to one tag. Rejected
/// entries are counted but not shown; `check` reports them in detail.
pub fn run(config_path: &Path, tag: Option<&str>) -> Result<()> {
    tracing::info!(?config_path, ?tag, "Listing topics");

    let config = crate::load_config(config_path)?;
    let registry = CollectionRegistry::standard();
    let report = ContentLoader::new(&config, &registry).load::<TopicEntry>()?;

    let entries = match tag {
        Some(tag) => report.by_tag(tag),
        None => report.entries.iter().collect(),
    };

    for loaded in &entries {
        print!("{}", render(&config, loaded));
    }

    if entries.is_empty() {
        println!("No topics found");
    }

    if !report.is_clean() {
        println!();
        println!(
            "⚠ {} invalid entr{} skipped, run `examnotes check` for details",
            report.failures.len(),
            if report.failures.len() == 1 { "y" } else { "ies" }
        );
    }

    Ok(())
}

fn render(config: &Config, loaded: &LoadedEntry<TopicEntry>) -> String {
    let topic = &loaded.entry;
    let mut out = format!(
        "{:>2}. {}  {}\n",
        topic.order(),
        topic.title(),
        config.url_for(&loaded.site_path())
    );
    if let Some(description) = topic.description() {
        out.push_str(&format!("    {description}\n"));
    }
    if !topic.tags().is_empty() {
        out.push_str(&format!("    tags: {}\n", topic.tags().join(", ")));
    }
    if let Some(updated) = topic.last_updated() {
        out.push_str(&format!("    updated: {}\n", updated.format("%Y-%m-%d")));
    }
    out
}
