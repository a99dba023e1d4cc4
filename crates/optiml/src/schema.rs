//! Input schema document.
//!
//! The schema describes the columns a packaged model expects and the target
//! it predicts:
//!
//! ```json
//! {
//!   "input_columns": {
//!     "col_0": {"variable_name": "age", "variable_type": "Numeric"},
//!     "col_1": {"variable_name": "sex", "variable_type": "Categorical",
//!               "inputs": {"0": "M", "1": "F"}}
//!   },
//!   "target": {"variable_name": "income"}
//! }
//! ```
//!
//! Key order of `input_columns` and of every `inputs` mapping is kept
//! exactly as written, since it drives form order and choice order.

use std::fmt;
use std::io::Read;

use indexmap::IndexMap;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// OrderedMap
// =============================================================================

/// String-keyed map that keeps insertion (document) order.
///
/// A repeated key keeps its first position and takes the last value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedMap<V>(IndexMap<String, V>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Insert or replace, keeping the original position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.values()
    }
}

/// Equal when the same entries appear in the same order.
impl<V: PartialEq> PartialEq for OrderedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.0.iter().eq(other.0.iter())
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// =============================================================================
// Label
// =============================================================================

/// Kind of JSON scalar a [`Label`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Text,
    Number,
    Bool,
}

/// A scalar JSON value (string, number or boolean) held as its canonical text.
///
/// `"M"` becomes `M`, `1` becomes `1`, `2.5` becomes `2.5`, `true` becomes
/// `true`. The kind is kept so that a selected label reaches the model as the
/// same scalar it was declared as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    text: String,
    kind: LabelKind,
}

impl Label {
    /// A text label.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LabelKind::Text,
        }
    }

    pub fn number(value: serde_json::Number) -> Self {
        Self {
            text: value.to_string(),
            kind: LabelKind::Number,
        }
    }

    pub fn bool(value: bool) -> Self {
        Self {
            text: value.to_string(),
            kind: LabelKind::Bool,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    /// The label read as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        self.text.trim().parse().ok()
    }

    /// The label as a boolean, if it was declared as one.
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            LabelKind::Bool => Some(self.text == "true"),
            LabelKind::Text | LabelKind::Number => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl PartialEq<str> for Label {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for Label {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.kind {
            LabelKind::Bool => serializer.serialize_bool(self.text == "true"),
            LabelKind::Number => match self.text.parse::<serde_json::Number>() {
                Ok(number) => number.serialize(serializer),
                Err(_) => serializer.serialize_str(&self.text),
            },
            LabelKind::Text => serializer.serialize_str(&self.text),
        }
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(Self::new(s)),
            serde_json::Value::Number(n) => Ok(Self::number(n)),
            serde_json::Value::Bool(b) => Ok(Self::bool(b)),
            other => Err(de::Error::custom(format!(
                "expected a string, number or boolean label, found {other}"
            ))),
        }
    }
}

// =============================================================================
// Column descriptors
// =============================================================================

/// Declared type of an input column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VariableType {
    Numeric,
    Binary,
    Categorical,
    /// Any other declared type; rendered as free text.
    Other(String),
}

impl VariableType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Numeric => "Numeric",
            Self::Binary => "Binary",
            Self::Categorical => "Categorical",
            Self::Other(name) => name,
        }
    }

    /// Whether the column is filled from a fixed set of choices.
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Binary | Self::Categorical)
    }
}

impl From<String> for VariableType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Numeric" => Self::Numeric,
            "Binary" => Self::Binary,
            "Categorical" => Self::Categorical,
            _ => Self::Other(name),
        }
    }
}

impl From<VariableType> for String {
    fn from(ty: VariableType) -> Self {
        match ty {
            VariableType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `input_columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name in the input row and the label shown to the user.
    pub variable_name: String,
    pub variable_type: VariableType,
    /// Code → display label, for choice columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<OrderedMap<Label>>,
}

impl ColumnDescriptor {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            variable_name: name.into(),
            variable_type: VariableType::Numeric,
            inputs: None,
        }
    }

    /// A choice column with `(code, label)` inputs.
    pub fn choice<K, L>(
        name: impl Into<String>,
        variable_type: VariableType,
        inputs: impl IntoIterator<Item = (K, L)>,
    ) -> Self
    where
        K: Into<String>,
        L: Into<Label>,
    {
        Self {
            variable_name: name.into(),
            variable_type,
            inputs: Some(inputs.into_iter().map(|(k, l)| (k, l.into())).collect()),
        }
    }

    pub fn other(name: impl Into<String>, variable_type: impl Into<String>) -> Self {
        Self {
            variable_name: name.into(),
            variable_type: VariableType::from(variable_type.into()),
            inputs: None,
        }
    }

    /// Display labels of `inputs`, in document order.
    pub fn choices(&self) -> impl Iterator<Item = &Label> {
        self.inputs.iter().flat_map(|inputs| inputs.values())
    }
}

/// The `target` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub variable_name: String,
}

// =============================================================================
// Schema
// =============================================================================

/// Schema validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("column '{column}' is {variable_type} but declares no inputs")]
    MissingInputs {
        column: String,
        variable_type: VariableType,
    },
}

#[derive(Deserialize)]
struct RawSchema {
    #[serde(default)]
    input_columns: OrderedMap<ColumnDescriptor>,
    #[serde(default)]
    target: Option<TargetDescriptor>,
}

/// Validated input schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct Schema {
    input_columns: OrderedMap<ColumnDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<TargetDescriptor>,
}

impl TryFrom<RawSchema> for Schema {
    type Error = SchemaError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        Self::new(raw.input_columns, raw.target)
    }
}

impl Schema {
    /// Build a schema, checking that every choice column declares `inputs`.
    pub fn new(
        input_columns: OrderedMap<ColumnDescriptor>,
        target: Option<TargetDescriptor>,
    ) -> Result<Self, SchemaError> {
        for column in input_columns.values() {
            if column.variable_type.is_choice() && column.inputs.is_none() {
                return Err(SchemaError::MissingInputs {
                    column: column.variable_name.clone(),
                    variable_type: column.variable_type.clone(),
                });
            }
        }

        Ok(Self {
            input_columns,
            target,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Column descriptors keyed by their schema key, in document order.
    pub fn input_columns(&self) -> &OrderedMap<ColumnDescriptor> {
        &self.input_columns
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.input_columns.values()
    }

    pub fn len(&self) -> usize {
        self.input_columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_columns.is_empty()
    }

    pub fn target(&self) -> Option<&TargetDescriptor> {
        self.target.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "input_columns": {
            "z": {"variable_name": "sex", "variable_type": "Categorical",
                  "inputs": {"1": "M", "0": "F"}},
            "a": {"variable_name": "age", "variable_type": "Numeric"},
            "m": {"variable_name": "notes", "variable_type": "Free", "extra": true}
        },
        "target": {"variable_name": "income"},
        "version": 3
    }"#;

    #[test]
    fn keeps_document_order() {
        let schema = Schema::from_json_str(DOC).unwrap();

        let keys: Vec<_> = schema.input_columns().keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);

        let sex = schema.input_columns().get("z").unwrap();
        let codes: Vec<_> = sex.inputs.as_ref().unwrap().keys().collect();
        assert_eq!(codes, ["1", "0"]);
        let labels: Vec<_> = sex.choices().map(Label::as_str).collect();
        assert_eq!(labels, ["M", "F"]);
    }

    #[test]
    fn variable_types() {
        let schema = Schema::from_json_str(DOC).unwrap();
        let types: Vec<_> = schema.columns().map(|c| c.variable_type.clone()).collect();
        assert_eq!(
            types,
            [
                VariableType::Categorical,
                VariableType::Numeric,
                VariableType::Other("Free".into())
            ]
        );
        assert_eq!(schema.target().unwrap().variable_name, "income");
    }

    #[test]
    fn missing_sections_are_tolerated() {
        let schema = Schema::from_json_str("{}").unwrap();
        assert!(schema.is_empty());
        assert!(schema.target().is_none());
    }

    #[test]
    fn choice_column_without_inputs_is_rejected() {
        let err = Schema::from_json_str(
            r#"{"input_columns": {"c": {"variable_name": "smoker", "variable_type": "Binary"}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("smoker"));
    }

    #[test]
    fn descriptor_requires_name_and_type() {
        assert!(
            Schema::from_json_str(r#"{"input_columns": {"c": {"variable_type": "Numeric"}}}"#)
                .is_err()
        );
    }

    #[test]
    fn non_string_labels_use_canonical_text() {
        let schema = Schema::from_json_str(
            r#"{"input_columns": {"c": {"variable_name": "n", "variable_type": "Binary",
                "inputs": {"0": 0, "1": 1.5, "2": true}}}}"#,
        )
        .unwrap();
        let labels: Vec<_> = schema
            .columns()
            .flat_map(|column| column.choices())
            .map(Label::as_str)
            .collect();
        assert_eq!(labels, ["0", "1.5", "true"]);
    }

    #[test]
    fn serializes_in_order() {
        let schema = Schema::from_json_str(DOC).unwrap();
        let json = serde_json::to_string(&schema).unwrap();
        let reparsed = Schema::from_json_str(&json).unwrap();
        assert_eq!(reparsed, schema);
        assert!(json.find("\"z\"").unwrap() < json.find("\"a\"").unwrap());
    }

    #[test]
    fn labels_keep_their_scalar_kind() {
        let schema = Schema::from_json_str(
            r#"{"input_columns": {"c": {"variable_name": "n", "variable_type": "Binary",
                "inputs": {"0": 0, "1": "x", "2": true}}}}"#,
        )
        .unwrap();
        let kinds: Vec<_> = schema
            .columns()
            .flat_map(|column| column.choices())
            .map(Label::kind)
            .collect();
        assert_eq!(kinds, [LabelKind::Number, LabelKind::Text, LabelKind::Bool]);

        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains(r#""inputs":{"0":0,"1":"x","2":true}"#), "{json}");
    }

    #[test]
    fn repeated_key_keeps_position_and_last_value() {
        let map: OrderedMap<u32> = serde_json::from_str(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, [("a", &3), ("b", &2)]);
    }
}
