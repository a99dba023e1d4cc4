//! Native JSON model format.
//!
//! A persisted model is a versioned envelope around a typed payload:
//!
//! ```json
//! {"format_version": 1, "model_type": "gbdt", "model": { ... }}
//! ```
//!
//! Reading always goes through the schema types in [`schema`] and the
//! validating conversions in `convert`, so a model that loads is safe to
//! predict with.

mod convert;
mod error;
pub mod schema;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub use error::{ReadError, WriteError};
use schema::{GBDTModelSchema, GBLinearModelSchema, ModelEnvelope};

use crate::model::{GBDTModel, GBLinearModel, Model};

/// Current format version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

impl Model {
    /// Read a model from a JSON stream.
    pub fn read_json<R: Read>(reader: R) -> Result<Self, ReadError> {
        let envelope: ModelEnvelope = serde_json::from_reader(reader)?;
        Self::from_envelope(envelope)
    }

    /// Read a model from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ReadError> {
        let envelope: ModelEnvelope = serde_json::from_str(json)?;
        Self::from_envelope(envelope)
    }

    /// Load a model from a file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let file = File::open(path)?;
        Self::read_json(BufReader::new(file))
    }

    /// Write the model as JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), WriteError> {
        serde_json::to_writer(writer, &self.to_envelope()?)?;
        Ok(())
    }

    /// Serialize the model to JSON bytes.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, WriteError> {
        let mut buf = Vec::new();
        self.write_json(&mut buf)?;
        Ok(buf)
    }

    /// Save the model to a file, replacing any existing file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), WriteError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn to_envelope(&self) -> Result<ModelEnvelope, WriteError> {
        let (model_type, model) = match self {
            Model::Gbdt(model) => (
                GBDTModelSchema::MODEL_TYPE,
                serde_json::to_value(GBDTModelSchema::from(model))?,
            ),
            Model::GbLinear(model) => (
                GBLinearModelSchema::MODEL_TYPE,
                serde_json::to_value(GBLinearModelSchema::from(model))?,
            ),
        };

        Ok(ModelEnvelope {
            format_version: FORMAT_VERSION,
            model_type: model_type.to_string(),
            model,
        })
    }

    fn from_envelope(envelope: ModelEnvelope) -> Result<Self, ReadError> {
        if envelope.format_version != FORMAT_VERSION {
            return Err(ReadError::UnsupportedVersion {
                found: envelope.format_version,
                supported: FORMAT_VERSION,
            });
        }

        match envelope.model_type.as_str() {
            GBDTModelSchema::MODEL_TYPE => {
                let schema: GBDTModelSchema = serde_json::from_value(envelope.model)?;
                Ok(Model::Gbdt(GBDTModel::try_from(schema)?))
            }
            GBLinearModelSchema::MODEL_TYPE => {
                let schema: GBLinearModelSchema = serde_json::from_value(envelope.model)?;
                Ok(Model::GbLinear(GBLinearModel::try_from(schema)?))
            }
            other => Err(ReadError::UnknownModelType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Forest, LinearModel, ModelMeta, OutputTransform, Predictor, Tree};
    use ndarray::array;

    #[test]
    fn gblinear_roundtrip() {
        let model = Model::from(GBLinearModel::new(
            ModelMeta::for_regression(2).with_feature_names(["age", "sex"]),
            LinearModel::new(array![[0.5], [10.0], [1.0]]),
            vec![0.0],
            OutputTransform::Identity,
        ));

        let bytes = model.to_json_vec().unwrap();
        let loaded = Model::read_json(bytes.as_slice()).unwrap();

        assert_eq!(loaded, model);
        assert_eq!(loaded.predict_scores(&[30.0, 1.0]), vec![26.0]);
    }

    #[test]
    fn gbdt_roundtrip() {
        let model = Model::from(GBDTModel::new(
            ModelMeta::for_regression(1),
            Forest::for_regression()
                .with_base_score(vec![0.25])
                .with_tree(Tree::constant(1.0), 0),
            OutputTransform::Identity,
        ));

        let json = String::from_utf8(model.to_json_vec().unwrap()).unwrap();
        assert!(json.contains(r#""model_type":"gbdt""#));

        let loaded = Model::from_json_str(&json).unwrap();
        assert_eq!(loaded.predict_scores(&[0.0]), vec![1.25]);
    }

    #[test]
    fn unknown_model_type() {
        let err = Model::from_json_str(r#"{"format_version":1,"model_type":"svm","model":{}}"#)
            .unwrap_err();
        assert!(matches!(err, ReadError::UnknownModelType(t) if t == "svm"));
    }

    #[test]
    fn future_version_is_rejected() {
        let err = Model::from_json_str(r#"{"format_version":7,"model_type":"gbdt","model":{}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ReadError::UnsupportedVersion { found: 7, supported: 1 }
        ));
    }

    #[test]
    fn not_json() {
        assert!(matches!(
            Model::from_json_str("\u{80}pickle"),
            Err(ReadError::Json(_))
        ));
    }
}
