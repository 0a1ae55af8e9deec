//! examnotes content loading
//!
//! Walks collection directories, assigns each file its slug, and validates
//! every entry's frontmatter against the registered schema.

pub mod loader;

pub use loader::{CollectionReport, ContentLoader, EntryFailure, LoadError, LoadedEntry, slug_for};
