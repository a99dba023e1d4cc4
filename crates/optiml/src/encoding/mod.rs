//! Per-column categorical encoders.
//!
//! The encoder artifact is a JSON object mapping a column name to a fitted
//! label encoder:
//!
//! ```json
//! {"sex": {"classes": ["F", "M"]}, "smoker": {"classes": ["no", "yes"]}}
//! ```

mod label;

use std::io::Read;

use serde::{Deserialize, Serialize};

pub use label::{LabelEncoder, UnknownLabel};

use crate::frame::{Cell, Row};
use crate::schema::OrderedMap;

/// A column value its encoder does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("column '{column}': {source}")]
pub struct EncodeError {
    pub column: String,
    #[source]
    pub source: UnknownLabel,
}

/// Column name → encoder, in artifact order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderSet(OrderedMap<LabelEncoder>);

impl EncoderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    pub fn insert(&mut self, column: impl Into<String>, encoder: LabelEncoder) {
        self.0.insert(column, encoder);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, column: impl Into<String>, encoder: LabelEncoder) -> Self {
        self.insert(column, encoder);
        self
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.0.get(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabelEncoder)> {
        self.0.iter()
    }

    /// Encode every column of `row` that has an encoder.
    ///
    /// Columns are visited in encoder order and the first failure aborts;
    /// the input row is never partially encoded. Columns without an encoder
    /// and encoders without a column are left alone.
    pub fn encode(&self, row: &Row) -> Result<Row, EncodeError> {
        let mut encoded = row.clone();
        for (column, encoder) in self.iter() {
            let Some(cell) = row.get(column) else {
                continue;
            };
            let code = encoder.transform(cell).map_err(|source| EncodeError {
                column: column.to_string(),
                source,
            })?;
            tracing::debug!(column, value = %cell, code, "encoded column");
            encoded.insert(column, Cell::Number(code as f64));
        }
        Ok(encoded)
    }
}
