//! Frontmatter splitting and parsing for content files.
//!
//! Both YAML (`---`) and TOML (`+++`) blocks are read into the same
//! [`RawMetadata`] mapping so the schema validator only ever sees one
//! representation.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{CoreError, Result};

/// Raw frontmatter metadata: field name to unvalidated value.
pub type RawMetadata = Mapping;

/// Delimiter types for frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// YAML frontmatter delimited by `---`.
    Yaml,
    /// TOML frontmatter delimited by `+++`.
    Toml,
}

impl FrontmatterFormat {
    /// Get the delimiter string for this format.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }

    fn detect(content: &str) -> Option<Self> {
        if content.starts_with("---") {
            Some(Self::Yaml)
        } else if content.starts_with("+++") {
            Some(Self::Toml)
        } else {
            None
        }
    }
}

/// Drop a leading UTF-8 byte order mark and whitespace.
fn trim_leading(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content).trim_start()
}

/// Split content into frontmatter and body.
///
/// The closing delimiter must start a line, so a `---` inside a YAML string
/// does not end the block. A leading byte order mark is ignored.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = trim_leading(content);
    let format = FrontmatterFormat::detect(content)?;
    let delimiter = format.delimiter();

    let after_first = &content[delimiter.len()..];
    let closing_pos = after_first.find(&format!("\n{delimiter}"))?;

    let frontmatter = after_first[..closing_pos].trim();
    let body = after_first[closing_pos + 1 + delimiter.len()..].trim_start();

    Some((format, frontmatter, body))
}

/// Parse the frontmatter block of `content` into raw metadata and body.
///
/// A file without a block yields empty metadata and the whole text as body.
pub fn parse_raw_frontmatter(content: &str, path: &Path) -> Result<(RawMetadata, String)> {
    let Some((format, fm_str, body)) = split_frontmatter(content) else {
        if FrontmatterFormat::detect(trim_leading(content)).is_some() {
            return Err(CoreError::frontmatter(path, "unclosed frontmatter block"));
        }
        return Ok((RawMetadata::new(), content.to_string()));
    };

    let metadata = match format {
        FrontmatterFormat::Yaml => parse_yaml_block(fm_str, path)?,
        FrontmatterFormat::Toml => {
            let table: toml::Table =
                toml::from_str(fm_str).map_err(|e| CoreError::frontmatter(path, e.to_string()))?;
            table
                .into_iter()
                .map(|(key, value)| (Value::String(key), toml_to_yaml(value)))
                .collect()
        }
    };

    tracing::trace!(path = %path.display(), ?format, fields = metadata.len(), "parsed frontmatter");
    Ok((metadata, body.to_string()))
}

fn parse_yaml_block(fm_str: &str, path: &Path) -> Result<RawMetadata> {
    let value: Value =
        serde_yaml::from_str(fm_str).map_err(|e| CoreError::frontmatter(path, e.to_string()))?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(RawMetadata::new()),
        other => Err(CoreError::frontmatter(
            path,
            format!("frontmatter must be a mapping, found {}", display_value(&other)),
        )),
    }
}

/// Convert a TOML value into the YAML value model.
///
/// Datetimes become their RFC 3339 text, which the date rule accepts.
fn toml_to_yaml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Value::Number(f.into()),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .into_iter()
                .map(|(key, value)| (Value::String(key), toml_to_yaml(value)))
                .collect(),
        ),
    }
}

/// Render a raw value compactly for error messages.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{s:?}"),
        Value::Sequence(items) => {
            let items: Vec<_> = items.iter().map(display_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(mapping) => {
            let entries: Vec<_> = mapping
                .iter()
                .map(|(k, v)| format!("{}: {}", display_value(k), display_value(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, display_value(&tagged.value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(metadata: &'a RawMetadata, key: &str) -> Option<&'a Value> {
        metadata.get(Value::String(key.to_string()))
    }

    #[test]
    fn test_split_yaml_frontmatter() {
        let content = r#"---
title: "Recursion"
order: 3
---

A function that calls itself."#;

        let (format, fm, body) = split_frontmatter(content).expect("split");
        assert_eq!(format, FrontmatterFormat::Yaml);
        assert!(fm.contains("title:"));
        assert!(body.starts_with("A function"));
    }

    #[test]
    fn test_split_toml_frontmatter() {
        let content = r#"+++
title = "Recursion"
order = 3
+++

A function that calls itself."#;

        let (format, fm, body) = split_frontmatter(content).expect("split");
        assert_eq!(format, FrontmatterFormat::Toml);
        assert!(fm.contains("title ="));
        assert!(body.starts_with("A function"));
    }

    #[test]
    fn test_split_ignores_inline_delimiter() {
        let content = "---\ntitle: \"a --- b\"\norder: 1\n---\nBody";
        let (_, fm, body) = split_frontmatter(content).expect("split");
        assert!(fm.contains("a --- b"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "Just some notes without frontmatter.";
        assert!(split_frontmatter(content).is_none());

        let (metadata, body) = parse_raw_frontmatter(content, Path::new("t.md")).expect("parse");
        assert!(metadata.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: "Graphs"
order: 4
tags:
  - bfs
  - dfs
---

Content here."#;

        let (metadata, body) = parse_raw_frontmatter(content, Path::new("graphs.md")).expect("parse");
        assert_eq!(get(&metadata, "title"), Some(&Value::String("Graphs".into())));
        assert_eq!(get(&metadata, "order").and_then(Value::as_i64), Some(4));
        assert_eq!(
            get(&metadata, "tags").and_then(Value::as_sequence).map(Vec::len),
            Some(2)
        );
        assert_eq!(body, "Content here.");
    }

    #[test]
    fn test_parse_toml_frontmatter_with_datetime() {
        let content = r#"+++
title = "Graphs"
order = 4
tags = ["bfs"]
lastUpdated = 2024-01-14
+++

Content here."#;

        let (metadata, _) = parse_raw_frontmatter(content, Path::new("graphs.md")).expect("parse");
        assert_eq!(get(&metadata, "order").and_then(Value::as_i64), Some(4));
        assert_eq!(
            get(&metadata, "lastUpdated").and_then(Value::as_str),
            Some("2024-01-14")
        );
    }

    #[test]
    fn test_empty_block_is_empty_metadata() {
        let (metadata, body) =
            parse_raw_frontmatter("---\n---\nBody", Path::new("t.md")).expect("parse");
        assert!(metadata.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_non_mapping_block_is_error() {
        let err = parse_raw_frontmatter("---\n- a\n- b\n---\n", Path::new("list.md"))
            .expect_err("list frontmatter");
        assert!(err.to_string().contains("must be a mapping"));
        assert!(err.to_string().contains("list.md"));
    }

    #[test]
    fn test_unclosed_block_is_error() {
        let err = parse_raw_frontmatter("---\ntitle: x\n", Path::new("open.md"))
            .expect_err("unclosed");
        assert!(err.to_string().contains("unclosed"));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let content = "\u{feff}---\ntitle: Recursion\norder: 3\n---\nBody";
        let (metadata, body) = parse_raw_frontmatter(content, Path::new("bom.md")).expect("parse");
        assert_eq!(get(&metadata, "title").and_then(Value::as_str), Some("Recursion"));
        assert_eq!(get(&metadata, "order").and_then(Value::as_i64), Some(3));
        assert_eq!(body, "Body");

        let err = parse_raw_frontmatter("\u{feff}+++\ntitle = \"x\"\n", Path::new("bom.md"))
            .expect_err("unclosed");
        assert!(err.to_string().contains("unclosed"));
    }

    #[test]
    fn test_integer_beyond_u64_is_frontmatter_error() {
        let err = parse_raw_frontmatter(
            "---\ntitle: Big\norder: 99999999999999999999\n---\n",
            Path::new("big.md"),
        )
        .expect_err("integer too large for YAML");
        assert!(matches!(err, CoreError::Frontmatter { .. }));
        assert!(err.to_string().contains("big.md"));
    }

    #[test]
    fn test_display_value() {
        let value: Value = serde_yaml::from_str("[1, \"two\", null]").expect("yaml");
        assert_eq!(display_value(&value), r#"[1, "two", null]"#);
    }
}
