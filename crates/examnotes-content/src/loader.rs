//! Content collection loading.
//!
//! Finds every content file of a collection, reads its frontmatter and
//! validates it. Each file is validated independently, so one bad entry is
//! reported without affecting its siblings.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use examnotes_core::{
    CollectionEntry, CollectionRegistry, CollectionSchema, Config, CoreError, ValidationError,
    parse_raw_frontmatter,
};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Content loading errors.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Frontmatter could not be read.
    #[error(transparent)]
    Frontmatter(#[from] CoreError),

    /// Frontmatter did not satisfy the collection schema.
    #[error("invalid frontmatter in {path}: {source}")]
    Validation {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    /// Two files resolve to the same slug.
    #[error("duplicate slug `{slug}` in {path} (already used by {first})")]
    DuplicateSlug {
        slug: String,
        path: PathBuf,
        first: PathBuf,
    },

    /// No slug can be derived from the path.
    #[error("invalid content path: {0}")]
    InvalidPath(PathBuf),

    /// The collection is not registered.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// A validated entry together with its identity.
#[derive(Debug, Clone)]
pub struct LoadedEntry<E> {
    /// Collection the entry belongs to.
    pub collection: &'static str,
    /// Identity derived from the path inside the collection directory.
    pub slug: String,
    /// Source file.
    pub path: PathBuf,
    /// Content after the frontmatter block.
    pub body: String,
    /// Validated metadata.
    pub entry: E,
}

impl<E> LoadedEntry<E> {
    /// Site-relative path of the entry.
    pub fn site_path(&self) -> String {
        format!("{}/{}", self.collection, self.slug)
    }
}

/// A file that could not be accepted into its collection.
#[derive(Debug)]
pub struct EntryFailure {
    pub path: PathBuf,
    pub error: LoadError,
}

/// Outcome of loading one collection.
#[derive(Debug)]
pub struct CollectionReport<E> {
    pub collection: &'static str,
    /// Accepted entries sorted by `(sort_key, slug)`.
    pub entries: Vec<LoadedEntry<E>>,
    /// Rejected files sorted by path.
    pub failures: Vec<EntryFailure>,
}

impl<E: CollectionEntry> CollectionReport<E> {
    fn new(collection: &'static str) -> Self {
        Self {
            collection,
            entries: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Whether every file was accepted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Look up an accepted entry by slug.
    pub fn get(&self, slug: &str) -> Option<&LoadedEntry<E>> {
        self.entries.iter().find(|e| e.slug == slug)
    }

    /// Accepted entries carrying `tag`, in display order.
    pub fn by_tag(&self, tag: &str) -> Vec<&LoadedEntry<E>> {
        self.entries
            .iter()
            .filter(|e| e.entry.tags().iter().any(|t| t == tag))
            .collect()
    }

    /// Sort keys shared by more than one entry, with the slugs sharing them.
    pub fn shared_sort_keys(&self) -> BTreeMap<i64, Vec<&str>> {
        let mut by_key: BTreeMap<i64, Vec<&str>> = BTreeMap::new();
        for loaded in &self.entries {
            by_key
                .entry(loaded.entry.sort_key())
                .or_default()
                .push(&loaded.slug);
        }
        by_key.retain(|_, slugs| slugs.len() > 1);
        by_key
    }
}

/// Loads collections from the configured content directory.
#[derive(Debug)]
pub struct ContentLoader<'a> {
    config: &'a Config,
    registry: &'a CollectionRegistry,
}

impl<'a> ContentLoader<'a> {
    /// Create a new loader.
    #[must_use]
    pub fn new(config: &'a Config, registry: &'a CollectionRegistry) -> Self {
        Self { config, registry }
    }

    /// Load and validate every entry of collection `E`.
    ///
    /// A missing collection directory yields an empty report.
    pub fn load<E: CollectionEntry>(&self) -> Result<CollectionReport<E>> {
        let collection = E::COLLECTION;
        let schema = self
            .registry
            .get(collection)
            .ok_or_else(|| LoadError::UnknownCollection(collection.to_string()))?;
        let dir = self.config.collection_dir(collection);

        info!(collection, dir = %dir.display(), "loading collection");

        let mut report = CollectionReport::new(collection);
        if !dir.is_dir() {
            warn!(collection, dir = %dir.display(), "collection directory not found");
            return Ok(report);
        }

        let files = self.find_content_files(&dir)?;
        info!(collection, count = files.len(), "found content files");

        // Collecting an indexed parallel iterator keeps file order.
        let results: Vec<_> = files
            .par_iter()
            .map(|path| Self::load_file::<E>(schema, &dir, path))
            .collect();

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        for (path, result) in files.into_iter().zip(results) {
            match result {
                Ok(loaded) => {
                    if let Some(first) = seen.get(&loaded.slug) {
                        let error = LoadError::DuplicateSlug {
                            slug: loaded.slug.clone(),
                            path: path.clone(),
                            first: first.clone(),
                        };
                        warn!(path = %path.display(), error = %error, "rejected entry");
                        report.failures.push(EntryFailure { path, error });
                        continue;
                    }
                    seen.insert(loaded.slug.clone(), path);
                    report.entries.push(loaded);
                }
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "rejected entry");
                    report.failures.push(EntryFailure { path, error });
                }
            }
        }

        report.entries.sort_by(|a, b| {
            a.entry
                .sort_key()
                .cmp(&b.entry.sort_key())
                .then_with(|| a.slug.cmp(&b.slug))
        });

        info!(
            collection,
            entries = report.entries.len(),
            failures = report.failures.len(),
            "collection loaded"
        );

        Ok(report)
    }

    /// Find content files under `dir`, sorted by path.
    ///
    /// Hidden entries and files starting with `_` are skipped.
    fn find_content_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let extensions = self.config.content_extensions();
        let mut files = Vec::new();

        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file()
                || entry.file_name().to_string_lossy().starts_with('_')
            {
                continue;
            }

            let path = entry.path();
            let is_content = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
            if is_content {
                files.push(path.to_path_buf());
            } else {
                debug!(path = %path.display(), "skipping non-content file");
            }
        }

        files.sort();
        Ok(files)
    }

    /// Read and validate a single content file.
    fn load_file<E: CollectionEntry>(
        schema: &CollectionSchema,
        dir: &Path,
        path: &Path,
    ) -> Result<LoadedEntry<E>> {
        debug!(path = %path.display(), "loading file");

        let relative = path.strip_prefix(dir).unwrap_or(path);
        let slug = slug_for(relative).ok_or_else(|| LoadError::InvalidPath(path.to_path_buf()))?;

        let content = fs::read_to_string(path)?;
        let (raw, body) = parse_raw_frontmatter(&content, path)?;
        let entry = E::validate_with(schema, &raw).map_err(|source| LoadError::Validation {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(LoadedEntry {
            collection: E::COLLECTION,
            slug,
            path: path.to_path_buf(),
            body,
            entry,
        })
    }
}

/// Derive an entry slug from its path relative to the collection directory.
///
/// - `recursion.md` → `recursion`
/// - `Graph Theory/BFS.md` → `graph-theory/bfs`
/// - `trees/index.md` → `trees`
pub fn slug_for(relative: &Path) -> Option<String> {
    let stem = relative.file_stem()?.to_str()?;

    let mut parts = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_str())
                .collect::<Option<Vec<_>>>()
        })
        .unwrap_or(Some(Vec::new()))?;

    if stem != "index" || parts.is_empty() {
        parts.push(stem);
    }

    let slug = parts
        .iter()
        .map(|part| slugify(part))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    (!slug.is_empty()).then_some(slug)
}

fn slugify(part: &str) -> String {
    part.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
