//! Resume document model.
//!
//! A `ResumeDocument` is an ordered list of named fields. Insertion order is the
//! display order and survives every mutation. Each field holds a `FieldValue`,
//! which is one of three shapes: free text, a list of strings, or a list of
//! flat key/value records.

pub mod format;
pub mod list_ops;
pub mod sample;

use serde::{
    de::Deserializer,
    ser::{SerializeMap, Serializer},
    Deserialize, Serialize,
};
use serde_json::{Map, Value};
use thiserror::Error;

pub use format::{display_rows, flatten_for_enhancement, format_for_display, MAX_DISPLAY_ROWS};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{0}' is not a list")]
    NotAList(String),

    #[error("Entry {index} is out of range for '{field}' ({len} entries)")]
    IndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },

    #[error("Resume snapshot must be a JSON object")]
    NotAnObject,

    #[error("Malformed resume snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Record
// ────────────────────────────────────────────────────────────────────────────

/// One entry of a `RecordList` (an education line, a project, ...).
/// Keys are unique and keep the order they were inserted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record(Vec<(String, String)>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, keeping its position when it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `key: value` pairs joined with `separator`.
    pub fn pairs_joined(&self, separator: &str) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Builds a record from a flat JSON object. Numbers and booleans are kept as
    /// their text and a null becomes an empty value; nested values are not
    /// representable.
    fn from_json_object(map: &Map<String, Value>) -> Option<Self> {
        let mut record = Record::new();
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                _ => return None,
            };
            record.insert(key.clone(), text);
        }
        Some(record)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FieldValue
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    ScalarList(Vec<String>),
    RecordList(Vec<Record>),
}

impl FieldValue {
    /// Maps a JSON value onto a `FieldValue` only when the shape is represented
    /// exactly: a string, an array of strings, an array of flat objects, or a
    /// single flat object (kept as a one-record list).
    pub fn from_structured(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(FieldValue::Scalar(s.clone())),
            Value::Array(items) if items.iter().all(Value::is_string) => Some(
                FieldValue::ScalarList(
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                ),
            ),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_object().and_then(Record::from_json_object))
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::RecordList),
            Value::Object(map) => {
                Record::from_json_object(map).map(|r| FieldValue::RecordList(vec![r]))
            }
            _ => None,
        }
    }

    /// Total mapping used when importing snapshots: shapes that have no exact
    /// representation are kept as their JSON text.
    pub fn from_json(value: Value) -> Self {
        match Self::from_structured(&value) {
            Some(field) => field,
            None => match value {
                Value::Null => FieldValue::Scalar(String::new()),
                other => FieldValue::Scalar(other.to_string()),
            },
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Scalar(text) => Value::String(text.clone()),
            FieldValue::ScalarList(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FieldValue::RecordList(records) => Value::Array(
                records
                    .iter()
                    .map(|r| {
                        Value::Object(
                            r.iter()
                                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::ScalarList(items) => Some(items),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(FieldValue::from_json)
    }
}

/// Best-effort coercion of user-typed text: structured JSON that fits a
/// `FieldValue` shape is stored structured, anything else is kept verbatim.
pub fn parse_or_fallback(text: &str) -> FieldValue {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| FieldValue::from_structured(&value))
        .unwrap_or_else(|| FieldValue::Scalar(text.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// ResumeDocument
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeDocument {
    fields: Vec<(String, FieldValue)>,
}

impl ResumeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Imports a snapshot. The top level must be a JSON object; its key order
    /// becomes the field order.
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => Err(DocumentError::NotAnObject),
        }
    }

    fn from_map(map: Map<String, Value>) -> Self {
        Self {
            fields: map
                .into_iter()
                .map(|(name, value)| (name, FieldValue::from_json(value)))
                .collect(),
        }
    }

    pub fn to_json_value(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Two-space indented JSON in field order, the local export format.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Finds a field name ignoring ASCII case, returning the stored spelling.
    pub fn find_name(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Stores the user's literal text for `name`, coerced through
    /// [`parse_or_fallback`]. Unknown names are appended at the end.
    pub fn set_field(&mut self, name: &str, raw_input: &str) {
        self.replace(name, parse_or_fallback(raw_input));
    }

    /// Stores `value` as-is, keeping the field's position.
    pub fn replace(&mut self, name: &str, value: FieldValue) {
        match self.position(name) {
            Some(idx) => self.fields[idx].1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(n, _)| n == name)
    }
}

impl Serialize for ResumeDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResumeDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_parse_or_fallback_keeps_plain_text_verbatim() {
        let text = "Built things: fast, [mostly] reliably";
        assert_eq!(parse_or_fallback(text), FieldValue::Scalar(text.to_string()));
    }

    #[test]
    fn test_parse_or_fallback_reads_string_array() {
        assert_eq!(
            parse_or_fallback(r#"["Go", "", "Rust"]"#),
            FieldValue::ScalarList(vec!["Go".into(), "".into(), "Rust".into()])
        );
    }

    #[test]
    fn test_parse_or_fallback_reads_heterogeneous_records() {
        let parsed = parse_or_fallback(
            r#"[{"title": "Compiler", "link": "https://x.dev"}, {"degree": "BSc", "year": 2023}]"#,
        );
        assert_eq!(
            parsed,
            FieldValue::RecordList(vec![
                record(&[("title", "Compiler"), ("link", "https://x.dev")]),
                record(&[("degree", "BSc"), ("year", "2023")]),
            ])
        );
    }

    #[test]
    fn test_parse_or_fallback_keeps_record_key_order() {
        let FieldValue::RecordList(records) = parse_or_fallback(r#"[{"z": "1", "a": "2"}]"#)
        else {
            panic!("expected a record list");
        };
        let keys: Vec<_> = records[0].iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_parse_or_fallback_rejects_unrepresentable_shapes() {
        for text in ["42", "true", "null", r#"["a", {"k": "v"}]"#, r#"[["nested"]]"#, r#"[null]"#] {
            assert_eq!(
                parse_or_fallback(text),
                FieldValue::Scalar(text.to_string()),
                "input {text:?} should stay verbatim"
            );
        }
    }

    #[test]
    fn test_parse_or_fallback_unwraps_json_string_literal() {
        assert_eq!(
            parse_or_fallback(r#""quoted""#),
            FieldValue::Scalar("quoted".to_string())
        );
    }

    #[test]
    fn test_set_field_preserves_order_and_appends_new_fields() {
        let mut doc = ResumeDocument::from_value(json!({
            "name": "Ada",
            "objective": "Write programs",
            "skills": ["Math"]
        }))
        .unwrap();

        doc.set_field("objective", "Write better programs");
        doc.set_field("location", "London");

        let names: Vec<_> = doc.field_names().collect();
        assert_eq!(names, vec!["name", "objective", "skills", "location"]);
        assert_eq!(
            doc.get("objective"),
            Some(&FieldValue::Scalar("Write better programs".to_string()))
        );
    }

    #[test]
    fn test_import_is_total_over_json_shapes() {
        let doc = ResumeDocument::from_value(json!({
            "age": 30,
            "missing": null,
            "mixed": ["a", {"k": "v"}],
            "contact": {"email": "a@b.c"}
        }))
        .unwrap();

        assert_eq!(doc.get("age"), Some(&FieldValue::Scalar("30".into())));
        assert_eq!(doc.get("missing"), Some(&FieldValue::Scalar(String::new())));
        assert_eq!(
            doc.get("mixed"),
            Some(&FieldValue::Scalar(r#"["a",{"k":"v"}]"#.into()))
        );
        assert_eq!(
            doc.get("contact"),
            Some(&FieldValue::RecordList(vec![record(&[("email", "a@b.c")])]))
        );
    }

    #[test]
    fn test_import_keeps_records_with_null_values() {
        let doc =
            ResumeDocument::from_json_str(r#"{"education":[{"degree":"BSc","gpa":null}]}"#)
                .unwrap();
        assert_eq!(
            doc.get("education"),
            Some(&FieldValue::RecordList(vec![record(&[("degree", "BSc"), ("gpa", "")])]))
        );
        assert_eq!(
            doc.to_json_value(),
            json!({ "education": [{ "degree": "BSc", "gpa": "" }] })
        );
    }

    #[test]
    fn test_parse_or_fallback_reads_records_with_null_values() {
        assert_eq!(
            parse_or_fallback(r#"{"title": "Shop", "link": null}"#),
            FieldValue::RecordList(vec![record(&[("title", "Shop"), ("link", "")])])
        );
    }

    #[test]
    fn test_import_rejects_non_object_snapshot() {
        assert!(matches!(
            ResumeDocument::from_json_str("[1, 2]"),
            Err(DocumentError::NotAnObject)
        ));
        assert!(matches!(
            ResumeDocument::from_json_str("{not json"),
            Err(DocumentError::Malformed(_))
        ));
    }

    #[test]
    fn test_pretty_json_reimports_to_equal_document() {
        let doc = sample::placeholder_resume();
        let text = doc.to_pretty_json().unwrap();
        let reimported = ResumeDocument::from_json_str(&text).unwrap();
        assert_eq!(reimported, doc);
        assert!(text.starts_with("{\n  \"name\""));
    }

    #[test]
    fn test_find_name_ignores_case() {
        let doc = ResumeDocument::from_value(json!({ "Skills": ["Go"] })).unwrap();
        assert_eq!(doc.find_name("skills"), Some("Skills"));
        assert_eq!(doc.find_name("projects"), None);
    }
}
