//! Input form derived from a schema.
//!
//! One field per schema column, in schema order. The control is chosen by
//! the declared variable type:
//!
//! - `Numeric`: number input, starting at `0.0`
//! - `Binary` / `Categorical`: a select over the display labels of `inputs`,
//!   starting at the first label
//! - anything else: free text, starting empty

use std::fmt;

use crate::frame::{Cell, Row};
use crate::schema::{ColumnDescriptor, Label, Schema, VariableType};

/// Error editing a form field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("no input named '{0}'")]
    UnknownField(String),
    #[error("{field} expects a number, got '{value}'")]
    NotANumber { field: String, value: String },
    #[error("'{value}' is not an option for {field} (options: {})", choices.join(", "))]
    UnknownChoice {
        field: String,
        value: String,
        choices: Vec<String>,
    },
}

/// Input control of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Number { value: f64 },
    Select {
        choices: Vec<Label>,
        selected: Option<usize>,
    },
    Text { value: String },
}

impl Control {
    /// Short name of the control kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::Select { .. } => "select",
            Self::Text { .. } => "text",
        }
    }

    /// Current value as a row cell.
    pub fn value(&self) -> Cell {
        match self {
            Self::Number { value } => Cell::Number(*value),
            Self::Select { choices, selected } => selected
                .and_then(|idx| choices.get(idx))
                .map_or(Cell::Missing, Cell::from),
            Self::Text { value } => Cell::Text(value.clone()),
        }
    }
}

/// One rendered input.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    name: String,
    variable_type: VariableType,
    control: Control,
}

impl FormField {
    fn from_column(column: &ColumnDescriptor) -> Self {
        let control = match &column.variable_type {
            VariableType::Numeric => Control::Number { value: 0.0 },
            VariableType::Binary | VariableType::Categorical => {
                let choices: Vec<Label> = column.choices().cloned().collect();
                let selected = (!choices.is_empty()).then_some(0);
                Control::Select { choices, selected }
            }
            VariableType::Other(_) => Control::Text {
                value: String::new(),
            },
        };

        Self {
            name: column.variable_name.clone(),
            variable_type: column.variable_type.clone(),
            control,
        }
    }

    /// Column name; also the field label.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable_type(&self) -> &VariableType {
        &self.variable_type
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    /// Label with a type hint, e.g. `age (Numeric)`.
    pub fn caption(&self) -> String {
        let hint = match &self.control {
            Control::Number { .. } => "Numeric",
            Control::Select { .. } => self.variable_type.as_str(),
            Control::Text { .. } => "Text",
        };
        format!("{} ({hint})", self.name)
    }

    pub fn value(&self) -> Cell {
        self.control.value()
    }

    fn set(&mut self, raw: &str) -> Result<(), FormError> {
        match &mut self.control {
            Control::Number { value } => {
                *value = raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| FormError::NotANumber {
                        field: self.name.clone(),
                        value: raw.to_string(),
                    })?;
            }
            Control::Select { choices, selected } => {
                let idx = choices.iter().position(|c| c.as_str() == raw).ok_or_else(|| {
                    FormError::UnknownChoice {
                        field: self.name.clone(),
                        value: raw.to_string(),
                        choices: choices.iter().map(ToString::to_string).collect(),
                    }
                })?;
                *selected = Some(idx);
            }
            Control::Text { value } => *value = raw.to_string(),
        }
        Ok(())
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.caption(), self.value())
    }
}

/// The rendered form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Form {
    fields: Vec<FormField>,
}

impl Form {
    /// One field per schema column, in schema order.
    pub fn render(schema: &Schema) -> Self {
        let fields: Vec<_> = schema.columns().map(FormField::from_column).collect();
        tracing::debug!(fields = fields.len(), "rendered input form");
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Update a field from user text.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        self.fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?
            .set(raw)
    }

    /// Current values keyed by column name, rebuilt on every call.
    ///
    /// When two columns share a name the later one wins.
    pub fn values(&self) -> Row {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OrderedMap;

    fn schema() -> Schema {
        let columns: OrderedMap<ColumnDescriptor> = [
            ("c0", ColumnDescriptor::numeric("age")),
            (
                "c1",
                ColumnDescriptor::choice(
                    "sex",
                    VariableType::Categorical,
                    [("0", "M"), ("1", "F")],
                ),
            ),
            ("c2", ColumnDescriptor::other("notes", "Free text")),
        ]
        .into_iter()
        .collect();
        Schema::new(columns, None).unwrap()
    }

    #[test]
    fn controls_follow_variable_type() {
        let form = Form::render(&schema());

        let kinds: Vec<_> = form.fields().iter().map(|f| f.control().kind()).collect();
        assert_eq!(kinds, ["number", "select", "text"]);

        let captions: Vec<_> = form.fields().iter().map(FormField::caption).collect();
        assert_eq!(captions, ["age (Numeric)", "sex (Categorical)", "notes (Text)"]);
    }

    #[test]
    fn defaults() {
        let row = Form::render(&schema()).values();
        assert_eq!(row.get("age"), Some(&Cell::Number(0.0)));
        assert_eq!(row.get("sex"), Some(&Cell::Text("M".into())));
        assert_eq!(row.get("notes"), Some(&Cell::Text(String::new())));
    }

    #[test]
    fn empty_choices_yield_missing() {
        let columns: OrderedMap<ColumnDescriptor> = [(
            "c",
            ColumnDescriptor::choice("flag", VariableType::Binary, Vec::<(&str, &str)>::new()),
        )]
        .into_iter()
        .collect();
        let form = Form::render(&Schema::new(columns, None).unwrap());
        assert_eq!(form.values().get("flag"), Some(&Cell::Missing));
    }

    #[test]
    fn edits() {
        let mut form = Form::render(&schema());

        form.set("age", "30").unwrap();
        form.set("sex", "F").unwrap();
        form.set("notes", "hello").unwrap();

        let row = form.values();
        assert_eq!(row.get("age"), Some(&Cell::Number(30.0)));
        assert_eq!(row.get("sex"), Some(&Cell::Text("F".into())));
        assert_eq!(row.get("notes"), Some(&Cell::Text("hello".into())));
    }

    #[test]
    fn invalid_edits_leave_form_unchanged() {
        let mut form = Form::render(&schema());
        let before = form.clone();

        assert!(matches!(form.set("age", "thirty"), Err(FormError::NotANumber { .. })));
        assert!(matches!(form.set("age", "NaN"), Err(FormError::NotANumber { .. })));
        // Codes are not selectable, only labels
        assert!(matches!(form.set("sex", "0"), Err(FormError::UnknownChoice { .. })));
        assert_eq!(
            form.set("height", "1"),
            Err(FormError::UnknownField("height".into()))
        );
        assert_eq!(form, before);
    }
}
