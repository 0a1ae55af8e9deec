//! examnotes core library
//!
//! Site configuration, frontmatter reading, and the declarative schema that
//! validates entries of the `topics` content collection.

pub mod collection;
pub mod config;
pub mod entry;
pub mod error;
pub mod frontmatter;
pub mod schema;

pub use collection::{CollectionEntry, CollectionRegistry};
pub use config::Config;
pub use entry::TopicEntry;
pub use error::{CoreError, Result};
pub use frontmatter::{RawMetadata, parse_raw_frontmatter};
pub use schema::{CollectionSchema, FieldViolation, ValidationError};
