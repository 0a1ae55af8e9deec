//! The `topics` collection: its schema and typed entry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_yaml::Value;

use crate::{
    collection::CollectionEntry,
    frontmatter::RawMetadata,
    schema::{
        CollectionSchema, Field, FieldSchema, FieldType, FieldValue, FieldViolation,
        ValidatedFields, ValidationError,
    },
};

/// Lowest allowed `order`.
pub const ORDER_MIN: u8 = 1;

/// Highest allowed `order`.
pub const ORDER_MAX: u8 = 11;

const TITLE: &str = "title";
const DESCRIPTION: &str = "description";
const ORDER: &str = "order";
const TAGS: &str = "tags";
const LAST_UPDATED: &str = "lastUpdated";

/// Validated metadata of one topic.
///
/// Constructed only through validation and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicEntry {
    title: String,
    description: Option<String>,
    order: u8,
    tags: Vec<String>,
    last_updated: Option<DateTime<Utc>>,
}

impl TopicEntry {
    /// Validate raw frontmatter against the `topics` schema.
    pub fn validate(raw: &RawMetadata) -> Result<Self, ValidationError> {
        Self::validate_with(&Self::schema(), raw)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Display position, always within `[ORDER_MIN, ORDER_MAX]`.
    pub fn order(&self) -> u8 {
        self.order
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Whether the entry carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl CollectionEntry for TopicEntry {
    const COLLECTION: &'static str = "topics";

    fn schema() -> CollectionSchema {
        CollectionSchema::new(
            Self::COLLECTION,
            vec![
                FieldSchema::required(TITLE, FieldType::Text { non_empty: true }),
                FieldSchema::optional(DESCRIPTION, FieldType::Text { non_empty: false }),
                FieldSchema::required(
                    ORDER,
                    FieldType::Integer {
                        min: i64::from(ORDER_MIN),
                        max: i64::from(ORDER_MAX),
                    },
                ),
                FieldSchema::defaulted(TAGS, FieldType::TextList, FieldValue::TextList(Vec::new())),
                FieldSchema::optional(LAST_UPDATED, FieldType::Date),
            ],
        )
    }

    fn from_fields(mut fields: ValidatedFields) -> Result<Self, ValidationError> {
        let title = match fields.take(TITLE) {
            Field::Present(FieldValue::Text(title)) => title,
            Field::Present(other) => return Err(wrong_type(TITLE, "text", &other)),
            Field::Absent => return Err(missing(TITLE)),
        };
        let order = match fields.take(ORDER) {
            Field::Present(FieldValue::Integer(order)) => order,
            Field::Present(other) => return Err(wrong_type(ORDER, "integer", &other)),
            Field::Absent => return Err(missing(ORDER)),
        };
        let order = u8::try_from(order).map_err(|_| FieldViolation::RangeViolation {
            field: ORDER.to_string(),
            min: i64::from(ORDER_MIN),
            max: i64::from(ORDER_MAX),
            value: Value::Number(order.into()),
        })?;

        let description = match fields.take(DESCRIPTION) {
            Field::Present(FieldValue::Text(text)) => Some(text),
            Field::Present(other) => return Err(wrong_type(DESCRIPTION, "text", &other)),
            Field::Absent => None,
        };
        let tags = match fields.take(TAGS) {
            Field::Present(FieldValue::TextList(tags)) => tags,
            Field::Present(other) => return Err(wrong_type(TAGS, "list of text", &other)),
            Field::Absent => Vec::new(),
        };
        let last_updated = match fields.take(LAST_UPDATED) {
            Field::Present(FieldValue::Date(date)) => Some(date),
            Field::Present(other) => return Err(wrong_type(LAST_UPDATED, "date", &other)),
            Field::Absent => None,
        };

        Ok(Self {
            title,
            description,
            order,
            tags,
            last_updated,
        })
    }

    fn sort_key(&self) -> i64 {
        i64::from(self.order)
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

fn missing(field: &str) -> ValidationError {
    FieldViolation::MissingRequiredField {
        field: field.to_string(),
    }
    .into()
}

/// A schema resolved `field` to a different type than the entry expects.
fn wrong_type(field: &str, expected: &'static str, value: &FieldValue) -> ValidationError {
    FieldViolation::TypeMismatch {
        field: field.to_string(),
        expected,
        value: value.to_raw(),
    }
    .into()
}
