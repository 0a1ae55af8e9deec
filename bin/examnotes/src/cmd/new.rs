//! New command - create a new topic with valid frontmatter

use std::{
    fs,
    path::{Component, Path},
};

use chrono::Utc;
use color_eyre::eyre::{Result, WrapErr, bail};
use serde::Serialize;
use examnotes_content::slug_for;
use examnotes_core::{
    CollectionEntry, TopicEntry,
    config::MDX_INTEGRATION,
    entry::{ORDER_MAX, ORDER_MIN},
    parse_raw_frontmatter,
};

/// Options for a new topic.
#[derive(Debug, Clone)]
pub struct NewTopic<'a> {
    /// Path of the topic inside the collection, without extension.
    pub slug: &'a str,
    pub title: &'a str,
    pub order: u8,
    pub tags: &'a [String],
    /// Write an `.mdx` file instead of `.md`.
    pub mdx: bool,
}

/// Run the new command.
///
/// Creates a topic file whose frontmatter passes the `topics` schema. Existing
/// files are never overwritten.
pub fn run(config_path: &Path, topic: &NewTopic<'_>) -> Result<()> {
    tracing::info!(?config_path, slug = topic.slug, "Creating new topic");

    if !(ORDER_MIN..=ORDER_MAX).contains(&topic.order) {
        bail!(
            "order must be between {ORDER_MIN} and {ORDER_MAX}, got {}",
            topic.order
        );
    }

    let config = crate::load_config(config_path)?;

    let ext = if topic.mdx {
        if !config.has_integration(MDX_INTEGRATION) {
            bail!("the `{MDX_INTEGRATION}` integration is not enabled in site.integrations");
        }
        "mdx"
    } else {
        "md"
    };

    if Path::new(topic.slug).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    }) {
        bail!(
            "slug `{}` must stay inside the `{}` collection",
            topic.slug,
            TopicEntry::COLLECTION
        );
    }

    let relative = format!("{}.{ext}", topic.slug.trim_end_matches('/'));
    if slug_for(Path::new(&relative)).is_none() {
        bail!("cannot derive a slug from `{}`", topic.slug);
    }

    let file_path = config
        .collection_dir(TopicEntry::COLLECTION)
        .join(&relative);
    if file_path.exists() {
        bail!("refusing to overwrite {}", file_path.display());
    }

    let contents = generate_markdown(topic)?;
    let (raw, _) = parse_raw_frontmatter(&contents, &file_path)?;
    TopicEntry::validate(&raw).wrap_err("Generated frontmatter is invalid")?;

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).wrap_err("Failed to create directories")?;
    }
    fs::write(&file_path, contents).wrap_err("Failed to write file")?;

    tracing::info!(?file_path, "Created new topic");
    println!("Created: {}", file_path.display());

    Ok(())
}

/// Frontmatter written for a new topic.
#[derive(Debug, Serialize)]
struct TopicFrontmatter<'a> {
    title: &'a str,
    order: u8,
    tags: &'a [String],
    #[serde(rename = "lastUpdated")]
    last_updated: String,
}

fn generate_markdown(topic: &NewTopic<'_>) -> Result<String> {
    let frontmatter = TopicFrontmatter {
        title: topic.title,
        order: topic.order,
        tags: topic.tags,
        last_updated: Utc::now().format("%Y-%m-%d").to_string(),
    };
    let yaml = serde_yaml::to_string(&frontmatter).wrap_err("Failed to serialize frontmatter")?;

    Ok(format!("---\n{yaml}---\n\nWrite your notes here.\n"))
}
