//! Declarative frontmatter schemas and their validation.
//!
//! A [`CollectionSchema`] is an ordered list of [`FieldSchema`] rules. Validation
//! walks the rules in declaration order, checks presence, then type, then
//! range, and collects every failing field instead of stopping at the first.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_yaml::Value;
use thiserror::Error;

use crate::frontmatter::{RawMetadata, display_value};

/// Value type a field must conform to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A string. With `non_empty`, blank strings count as missing.
    Text { non_empty: bool },
    /// An integer-valued number within `[min, max]` inclusive.
    Integer { min: i64, max: i64 },
    /// A date or timestamp, normalised to UTC.
    Date,
    /// A sequence of strings.
    TextList,
}

impl FieldType {
    /// Short name of the expected type, used in mismatch reports.
    pub fn expected(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Integer { .. } => "integer",
            Self::Date => "date",
            Self::TextList => "list of text",
        }
    }

    /// Coerce a present raw value into its typed form.
    fn coerce(&self, field: &str, raw: &Value) -> Result<FieldValue, FieldViolation> {
        let mismatch = || FieldViolation::TypeMismatch {
            field: field.to_string(),
            expected: self.expected(),
            value: raw.clone(),
        };

        match self {
            Self::Text { non_empty } => {
                let text = raw.as_str().ok_or_else(mismatch)?;
                if *non_empty && text.trim().is_empty() {
                    return Err(FieldViolation::MissingRequiredField {
                        field: field.to_string(),
                    });
                }
                Ok(FieldValue::Text(text.to_string()))
            }
            Self::Integer { min, max } => {
                let number = integral_value(raw).ok_or_else(mismatch)?;
                if number < *min || number > *max {
                    return Err(FieldViolation::RangeViolation {
                        field: field.to_string(),
                        min: *min,
                        max: *max,
                        value: raw.clone(),
                    });
                }
                Ok(FieldValue::Integer(number))
            }
            Self::Date => raw
                .as_str()
                .and_then(parse_date)
                .map(FieldValue::Date)
                .ok_or_else(mismatch),
            Self::TextList => {
                let items = raw.as_sequence().ok_or_else(mismatch)?;
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .map(FieldValue::TextList)
                    .ok_or_else(mismatch)
            }
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { non_empty: true } => write!(f, "non-empty text"),
            Self::Integer { min, max } => write!(f, "integer in [{min}, {max}]"),
            other => write!(f, "{}", other.expected()),
        }
    }
}

/// A validated, typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Date(DateTime<Utc>),
    TextList(Vec<String>),
}

impl FieldValue {
    /// The raw frontmatter value this typed value corresponds to.
    pub fn to_raw(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Integer(n) => Value::Number((*n).into()),
            Self::Date(date) => Value::String(date.to_rfc3339()),
            Self::TextList(items) => {
                Value::Sequence(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Date(date) => write!(f, "{}", date.to_rfc3339()),
            Self::TextList(items) => write!(f, "{items:?}"),
        }
    }
}

/// Whether a field must be present, and what it resolves to when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Absent values resolve to the given default.
    Defaulted(FieldValue),
}

/// A field that may or may not carry a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<T> {
    Present(T),
    Absent,
}

impl<T> Field<T> {
    /// Convert into an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

/// A single field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub field_type: FieldType,
    pub presence: Presence,
}

impl FieldSchema {
    pub fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            presence: Presence::Required,
        }
    }

    pub fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            presence: Presence::Optional,
        }
    }

    pub fn defaulted(name: &'static str, field_type: FieldType, default: FieldValue) -> Self {
        Self {
            name,
            field_type,
            presence: Presence::Defaulted(default),
        }
    }

    /// Check this rule against raw metadata, resolving defaults.
    fn check(&self, raw: &RawMetadata) -> Result<Field<FieldValue>, FieldViolation> {
        match Field::from(raw.get(self.name)) {
            Field::Present(value) => self.field_type.coerce(self.name, value).map(Field::Present),
            Field::Absent => match &self.presence {
                Presence::Required => Err(FieldViolation::MissingRequiredField {
                    field: self.name.to_string(),
                }),
                Presence::Optional => Ok(Field::Absent),
                Presence::Defaulted(default) => Ok(Field::Present(default.clone())),
            },
        }
    }
}

/// One failed field rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldViolation {
    /// A required field is absent (or blank, for non-empty text).
    #[error("missing required field `{field}`")]
    MissingRequiredField { field: String },

    /// A field is present but not convertible to its declared type.
    #[error("field `{field}` expected {expected}, found {}", display_value(.value))]
    TypeMismatch {
        field: String,
        expected: &'static str,
        value: Value,
    },

    /// A field has the right type but lies outside its allowed range.
    #[error("field `{field}` must be between {min} and {max}, found {}", display_value(.value))]
    RangeViolation {
        field: String,
        min: i64,
        max: i64,
        value: Value,
    },
}

impl FieldViolation {
    /// Name of the failing field.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingRequiredField { field }
            | Self::TypeMismatch { field, .. }
            | Self::RangeViolation { field, .. } => field,
        }
    }

    /// Short name of the violated rule.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::MissingRequiredField { .. } => "missing",
            Self::TypeMismatch { .. } => "wrong-type",
            Self::RangeViolation { .. } => "out-of-range",
        }
    }

    /// The offending raw value, if one was present.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::MissingRequiredField { .. } => None,
            Self::TypeMismatch { value, .. } | Self::RangeViolation { value, .. } => Some(value),
        }
    }
}

/// Every field violation found in one metadata block, in declaration order.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// The violation reported for `field`, if any.
    pub fn violation_for(&self, field: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|v| v.field() == field)
    }
}

impl From<FieldViolation> for ValidationError {
    fn from(violation: FieldViolation) -> Self {
        Self::new(vec![violation])
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    let details: Vec<_> = violations.iter().map(ToString::to_string).collect();
    format!(
        "{} invalid field(s): {}",
        violations.len(),
        details.join("; ")
    )
}

/// Typed values produced by a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedFields {
    values: BTreeMap<&'static str, FieldValue>,
}

impl ValidatedFields {
    /// Look up a field without consuming it.
    pub fn get(&self, name: &str) -> Field<&FieldValue> {
        self.values.get(name).into()
    }

    /// Remove a field, leaving it absent.
    pub fn take(&mut self, name: &str) -> Field<FieldValue> {
        self.values.remove(name).into()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named schema for one content collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    name: String,
    fields: Vec<FieldSchema>,
}

impl CollectionSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field rules in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Validate raw metadata against every field rule.
    ///
    /// Keys the schema does not declare are ignored.
    pub fn validate(&self, raw: &RawMetadata) -> Result<ValidatedFields, ValidationError> {
        let mut values = BTreeMap::new();
        let mut violations = Vec::new();

        for field in &self.fields {
            match field.check(raw) {
                Ok(Field::Present(value)) => {
                    values.insert(field.name, value);
                }
                Ok(Field::Absent) => {}
                Err(violation) => violations.push(violation),
            }
        }

        for key in raw.keys() {
            let declared = key
                .as_str()
                .is_some_and(|k| self.fields.iter().any(|f| f.name == k));
            if !declared {
                tracing::debug!(
                    collection = %self.name,
                    key = %display_value(key),
                    "ignoring undeclared frontmatter key"
                );
            }
        }

        if violations.is_empty() {
            Ok(ValidatedFields { values })
        } else {
            Err(ValidationError::new(violations))
        }
    }
}

/// Read an integer-valued number, accepting floats with no fractional part.
///
/// Integral values between `i64::MAX` and `u64::MAX` saturate so they fail the
/// range check rather than the type check. Larger literals never get here:
/// the YAML reader rejects them as a frontmatter error.
fn integral_value(raw: &Value) -> Option<i64> {
    let Value::Number(number) = raw else {
        return None;
    };
    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    let f = number.as_f64()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// Parse a date in RFC 3339, `YYYY-MM-DD[T| ]HH:MM:SS` (UTC) or `YYYY-MM-DD` form.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn raw(yaml: &str) -> RawMetadata {
        serde_yaml::from_str(yaml).expect("yaml mapping")
    }

    fn schema() -> CollectionSchema {
        CollectionSchema::new(
            "notes",
            vec![
                FieldSchema::required("name", FieldType::Text { non_empty: true }),
                FieldSchema::optional("rank", FieldType::Integer { min: 1, max: 5 }),
                FieldSchema::optional("when", FieldType::Date),
                FieldSchema::defaulted("labels", FieldType::TextList, FieldValue::TextList(vec![])),
            ],
        )
    }

    #[test]
    fn test_required_field_missing() {
        let err = schema().validate(&raw("rank: 2")).expect_err("missing name");
        assert_eq!(
            err.violations,
            vec![FieldViolation::MissingRequiredField {
                field: "name".into()
            }]
        );
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let err = schema().validate(&raw("name: '   '")).expect_err("blank name");
        assert_eq!(err.violations[0].rule(), "missing");
    }

    #[test]
    fn test_defaulted_field_resolves() {
        let fields = schema().validate(&raw("name: x")).expect("valid");
        assert_eq!(
            fields.get("labels"),
            Field::Present(&FieldValue::TextList(vec![]))
        );
        assert_eq!(fields.get("rank"), Field::Absent);
    }

    #[test]
    fn test_integral_float_accepted() {
        let fields = schema().validate(&raw("name: x\nrank: 3.0")).expect("valid");
        assert_eq!(fields.get("rank"), Field::Present(&FieldValue::Integer(3)));
    }

    #[test]
    fn test_fractional_float_is_type_mismatch() {
        let err = schema().validate(&raw("name: x\nrank: 2.5")).expect_err("fraction");
        assert_eq!(err.violations[0].rule(), "wrong-type");
        assert_eq!(err.violations[0].field(), "rank");
    }

    #[test]
    fn test_numeric_text_is_type_mismatch() {
        let err = schema().validate(&raw("name: x\nrank: '3'")).expect_err("text rank");
        assert!(matches!(
            &err.violations[0],
            FieldViolation::TypeMismatch { expected: "integer", value, .. }
                if value == &Value::String("3".into())
        ));
    }

    #[test]
    fn test_integer_beyond_i64_is_range_violation() {
        let err = schema()
            .validate(&raw("name: x\nrank: 18446744073709551615"))
            .expect_err("u64::MAX");
        assert_eq!(err.violations[0].field(), "rank");
        assert_eq!(err.violations[0].rule(), "out-of-range");
    }

    #[test]
    fn test_null_is_type_mismatch() {
        let err = schema().validate(&raw("name: x\nwhen: null")).expect_err("null date");
        assert_eq!(err.violations[0].field(), "when");
        assert_eq!(err.violations[0].value(), Some(&Value::Null));
    }

    #[test]
    fn test_list_with_non_text_item() {
        let err = schema()
            .validate(&raw("name: x\nlabels: [a, 2]"))
            .expect_err("mixed list");
        assert_eq!(err.violations[0].field(), "labels");
        assert_eq!(err.violations[0].rule(), "wrong-type");
    }

    #[test]
    fn test_all_violations_reported_in_declaration_order() {
        let err = schema()
            .validate(&raw("rank: 9\nwhen: yesterday\nlabels: nope"))
            .expect_err("many");
        let fields: Vec<_> = err.violations.iter().map(FieldViolation::field).collect();
        assert_eq!(fields, vec!["name", "rank", "when", "labels"]);
        assert!(err.to_string().starts_with("4 invalid field(s)"));
    }

    #[test]
    fn test_undeclared_keys_ignored() {
        let fields = schema().validate(&raw("name: x\ndraft: true")).expect("valid");
        assert_eq!(fields.get("draft"), Field::Absent);
    }

    #[test]
    fn test_violation_messages() {
        let err = schema().validate(&raw("name: x\nrank: 7")).expect_err("range");
        assert_eq!(
            err.violations[0].to_string(),
            "field `rank` must be between 1 and 5, found 7"
        );
    }

    #[test]
    fn test_parse_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 14, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-01-14"), Some(midnight));
        assert_eq!(parse_date("2024-01-14T00:00:00Z"), Some(midnight));
        assert_eq!(parse_date("2024-01-14T01:00:00+01:00"), Some(midnight));
        assert_eq!(parse_date("2024-01-14T00:00:00"), Some(midnight));
        assert_eq!(parse_date("2024-01-14 00:00:00"), Some(midnight));
        assert_eq!(parse_date("14/01/2024"), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn test_schema_display() {
        assert_eq!(
            FieldType::Integer { min: 1, max: 11 }.to_string(),
            "integer in [1, 11]"
        );
        assert_eq!(FieldType::Text { non_empty: true }.to_string(), "non-empty text");
        assert_eq!(FieldType::Text { non_empty: false }.to_string(), "text");
        assert_eq!(FieldType::TextList.to_string(), "list of text");
    }
}
