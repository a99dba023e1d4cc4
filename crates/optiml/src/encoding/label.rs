//! Label encoder: maps a categorical value to its position in a class list.

use serde::{Deserialize, Serialize};

use crate::frame::Cell;
use crate::schema::Label;

/// Value not among an encoder's classes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unseen label '{0}'")]
pub struct UnknownLabel(pub String);

/// Encoder fitted on an ordered list of classes.
///
/// A value encodes to the index of the matching class. Text cells match on
/// the class text; number cells also match classes whose text is that number
/// (`1.0` matches the class `1`), boolean cells match boolean classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<Label>,
}

impl LabelEncoder {
    pub fn new<I, L>(classes: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classes(&self) -> &[Label] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Code of a single value.
    pub fn transform(&self, cell: &Cell) -> Result<usize, UnknownLabel> {
        let position = match cell {
            Cell::Text(text) => self.classes.iter().position(|c| c.as_str() == text.as_str()),
            Cell::Number(v) => self
                .classes
                .iter()
                .position(|c| c.as_f64() == Some(*v) || c.as_str() == v.to_string()),
            Cell::Bool(b) => self
                .classes
                .iter()
                .position(|c| c.as_bool() == Some(*b) || c.as_str() == b.to_string()),
            Cell::Missing => None,
        };

        position.ok_or_else(|| UnknownLabel(cell.to_string()))
    }

    /// Class label for a code.
    pub fn inverse_transform(&self, code: usize) -> Option<&Label> {
        self.classes.get(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_by_position() {
        let encoder = LabelEncoder::new(["F", "M"]);
        assert_eq!(encoder.transform(&Cell::from("F")), Ok(0));
        assert_eq!(encoder.transform(&Cell::from("M")), Ok(1));
        assert_eq!(encoder.inverse_transform(1).map(Label::as_str), Some("M"));
    }

    #[test]
    fn unseen_value_is_rejected() {
        let encoder = LabelEncoder::new(["F", "M"]);
        assert_eq!(
            encoder.transform(&Cell::from("X")),
            Err(UnknownLabel("X".into()))
        );
        assert!(encoder.transform(&Cell::Missing).is_err());
        // Matching is exact
        assert!(encoder.transform(&Cell::from("m")).is_err());
    }

    #[test]
    fn numeric_classes_match_numbers() {
        let encoder: LabelEncoder = serde_json::from_str(r#"{"classes": [0, 1, 2.5]}"#).unwrap();
        assert_eq!(encoder.transform(&Cell::Number(1.0)), Ok(1));
        assert_eq!(encoder.transform(&Cell::Number(2.5)), Ok(2));
        assert_eq!(encoder.transform(&Cell::from("1")), Ok(1));
        assert!(encoder.transform(&Cell::Number(3.0)).is_err());
    }

    #[test]
    fn boolean_classes_match_booleans() {
        let encoder: LabelEncoder = serde_json::from_str(r#"{"classes": [false, true]}"#).unwrap();
        assert_eq!(encoder.transform(&Cell::Bool(true)), Ok(1));
        assert_eq!(encoder.transform(&Cell::Bool(false)), Ok(0));
    }
}
