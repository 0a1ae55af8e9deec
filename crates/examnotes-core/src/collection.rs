//! Collection registry.
//!
//! The registry is built once at startup and handed out by reference; it is
//! never mutated after construction.

use std::collections::BTreeMap;

use crate::{
    entry::TopicEntry,
    frontmatter::RawMetadata,
    schema::{CollectionSchema, ValidatedFields, ValidationError},
};

/// A typed entry produced by validating one collection's frontmatter.
pub trait CollectionEntry: Sized + Send {
    /// Registered collection name; also the directory name under the content root.
    const COLLECTION: &'static str;

    /// Field rules for this collection.
    fn schema() -> CollectionSchema;

    /// Build the typed entry from fields that already passed `schema()`.
    fn from_fields(fields: ValidatedFields) -> Result<Self, ValidationError>;

    /// Position used to sort entries for display.
    fn sort_key(&self) -> i64;

    /// Tag labels carried by the entry.
    fn tags(&self) -> &[String];

    /// Validate raw metadata against `schema` and build the entry.
    fn validate_with(schema: &CollectionSchema, raw: &RawMetadata) -> Result<Self, ValidationError> {
        schema.validate(raw).and_then(Self::from_fields)
    }
}

/// Immutable table of collection name to schema.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    collections: BTreeMap<String, CollectionSchema>,
}

impl CollectionRegistry {
    /// Registry with every built-in collection.
    pub fn standard() -> Self {
        Self::from_schemas([TopicEntry::schema()])
    }

    /// Build a registry from schemas. Later duplicates replace earlier ones.
    pub fn from_schemas(schemas: impl IntoIterator<Item = CollectionSchema>) -> Self {
        let collections = schemas
            .into_iter()
            .map(|schema| (schema.name().to_string(), schema))
            .collect();
        Self { collections }
    }

    pub fn get(&self, name: &str) -> Option<&CollectionSchema> {
        self.collections.get(name)
    }

    /// Registered collection names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollectionSchema> {
        self.collections.values()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
