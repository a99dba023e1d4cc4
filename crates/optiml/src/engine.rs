//! Single-row prediction.
//!
//! [`PredictionEngine::predict`] turns the current form values into one
//! prediction:
//!
//! 1. encode every column that has a label encoder
//! 2. build the feature vector, by feature name when the model declares
//!    names and by column order otherwise
//! 3. run the model on a one-row matrix and take its only result
//! 4. attach the capitalized target name

use std::fmt;

use ndarray::{Array1, Axis};

use crate::encoding::{EncoderSet, UnknownLabel};
use crate::frame::{NonNumericCell, Row};
use crate::model::{PredictionValue, Predictor};
use crate::schema::Schema;

// =============================================================================
// Errors
// =============================================================================

/// Error producing a prediction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    /// A column value is unknown to its encoder. The model was not called.
    #[error("Invalid input for encoded column: {column}")]
    InvalidEncodedInput {
        column: String,
        #[source]
        source: UnknownLabel,
    },
    /// Anything that went wrong after encoding.
    #[error("Error during prediction: {0}")]
    Failed(#[from] PredictionFailure),
}

/// Cause of a [`PredictError::Failed`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionFailure {
    #[error("{source}")]
    NonNumeric {
        column: String,
        #[source]
        source: NonNumericCell,
    },
    #[error("feature '{0}' is missing from the input")]
    MissingFeature(String),
    #[error("input has {found} features, but the model is expecting {expected} features")]
    FeatureCount { expected: usize, found: usize },
    #[error("schema has no target variable_name")]
    MissingTarget,
    #[error("model returned no prediction")]
    EmptyOutput,
}

// =============================================================================
// Prediction
// =============================================================================

/// A prediction ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Capitalized target name.
    pub target: String,
    pub value: PredictionValue,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: **{}**", self.target, self.value)
    }
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

// =============================================================================
// PredictionEngine
// =============================================================================

/// Runs single-row predictions against a loaded package.
#[derive(Clone, Copy)]
pub struct PredictionEngine<'a> {
    schema: &'a Schema,
    encoders: &'a EncoderSet,
    model: &'a dyn Predictor,
}

impl<'a> PredictionEngine<'a> {
    pub fn new(schema: &'a Schema, encoders: &'a EncoderSet, model: &'a dyn Predictor) -> Self {
        Self {
            schema,
            encoders,
            model,
        }
    }

    /// Predict the target for one row of raw form values.
    pub fn predict(&self, row: &Row) -> Result<Prediction, PredictError> {
        let encoded = self
            .encoders
            .encode(row)
            .map_err(|e| PredictError::InvalidEncodedInput {
                column: e.column,
                source: e.source,
            })?;

        let features = self.features(&encoded)?;
        tracing::debug!(?features, "running prediction");

        let matrix = Array1::from(features).insert_axis(Axis(0));
        let value = self
            .model
            .predict(matrix.view())
            .into_iter()
            .next()
            .ok_or(PredictionFailure::EmptyOutput)?;

        let target = self
            .schema
            .target()
            .ok_or(PredictionFailure::MissingTarget)?;

        let prediction = Prediction {
            target: capitalize(&target.variable_name),
            value,
        };
        tracing::info!(target = %prediction.target, value = %prediction.value, "prediction made");
        Ok(prediction)
    }

    /// Feature vector in model input order.
    fn features(&self, row: &Row) -> Result<Vec<f32>, PredictionFailure> {
        let meta = self.model.meta();

        let cells: Vec<_> = match &meta.feature_names {
            Some(names) => names
                .iter()
                .map(|name| {
                    row.get(name)
                        .map(|cell| (name.as_str(), cell))
                        .ok_or_else(|| PredictionFailure::MissingFeature(name.clone()))
                })
                .collect::<Result<_, _>>()?,
            None => {
                if row.len() != meta.n_features {
                    return Err(PredictionFailure::FeatureCount {
                        expected: meta.n_features,
                        found: row.len(),
                    });
                }
                row.iter().collect()
            }
        };

        cells
            .into_iter()
            .map(|(column, cell)| {
                cell.to_feature()
                    .map_err(|source| PredictionFailure::NonNumeric {
                        column: column.to_string(),
                        source,
                    })
            })
            .collect()
    }
}
