//! Single-row input table.

use std::fmt;

use crate::schema::{Label, LabelKind, OrderedMap};

/// One cell of the input row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Bool(bool),
    Missing,
}

impl Cell {
    /// The cell as a model feature.
    ///
    /// Text that parses as a number is accepted, booleans become 1 or 0 and
    /// `Missing` becomes NaN.
    pub fn to_feature(&self) -> Result<f32, NonNumericCell> {
        match self {
            Self::Number(v) => Ok(*v as f32),
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(|v| v as f32)
                .map_err(|_| NonNumericCell(text.clone())),
            Self::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Self::Missing => Ok(f32::NAN),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(text) => f.write_str(text),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Missing => f.write_str("<missing>"),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A selected choice, as the scalar it was declared as.
impl From<&Label> for Cell {
    fn from(label: &Label) -> Self {
        match label.kind() {
            LabelKind::Text => Self::Text(label.as_str().to_string()),
            LabelKind::Number => label
                .as_f64()
                .map_or_else(|| Self::Text(label.as_str().to_string()), Self::Number),
            LabelKind::Bool => label.as_bool().map_or(Self::Missing, Self::Bool),
        }
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// A text cell that is not a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not convert string to float: '{0}'")]
pub struct NonNumericCell(pub String);

/// A single row keyed by column name, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: OrderedMap<Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, keeping its position if it already exists.
    pub fn insert(&mut self, column: impl Into<String>, cell: impl Into<Cell>) {
        self.cells.insert(column, cell.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, column: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.insert(column, cell);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Cell)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Cell)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Cell::Number(30.0), 30.0)]
    #[case(Cell::Text("1".into()), 1.0)]
    #[case(Cell::Text(" 2.5 ".into()), 2.5)]
    #[case(Cell::Bool(true), 1.0)]
    #[case(Cell::Bool(false), 0.0)]
    fn numeric_cells(#[case] cell: Cell, #[case] expected: f32) {
        assert_eq!(cell.to_feature().unwrap(), expected);
    }

    #[test]
    fn missing_is_nan() {
        assert!(Cell::Missing.to_feature().unwrap().is_nan());
    }

    #[test]
    fn text_is_rejected_with_offending_value() {
        let err = Cell::from("M").to_feature().unwrap_err();
        assert_eq!(err.to_string(), "could not convert string to float: 'M'");
    }

    #[test]
    fn labels_become_cells_of_their_kind() {
        let labels: Vec<Label> = serde_json::from_str(r#"["M", 2, 2.5, true]"#).unwrap();
        let cells: Vec<Cell> = labels.iter().map(Cell::from).collect();
        assert_eq!(
            cells,
            [
                Cell::Text("M".into()),
                Cell::Number(2.0),
                Cell::Number(2.5),
                Cell::Bool(true)
            ]
        );
    }

    #[test]
    fn row_keeps_column_order() {
        let mut row = Row::new().with("age", 30.0).with("sex", "M");
        row.insert("age", 31.0);

        assert_eq!(row.columns().collect::<Vec<_>>(), ["age", "sex"]);
        assert_eq!(row.get("age"), Some(&Cell::Number(31.0)));
        assert!(!row.contains("income"));
    }
}
