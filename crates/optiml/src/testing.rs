//! Fixtures for tests: in-memory package archives and small models.
//!
//! ```
//! use optiml::config::AppConfig;
//! use optiml::package::{ArtifactKind, ModelPackage};
//! use optiml::testing;
//!
//! let archive = testing::demographics_package().cursor().unwrap();
//! let package = ModelPackage::load(archive, &AppConfig::default()).unwrap();
//! assert_eq!(package.schema().len(), 2);
//!
//! let incomplete = testing::demographics_package()
//!     .without(ArtifactKind::Encoders)
//!     .cursor()
//!     .unwrap();
//! assert!(ModelPackage::load(incomplete, &AppConfig::default()).is_err());
//! ```

use std::io::{Cursor, Write};
use std::path::Path;

use ndarray::array;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::encoding::{EncoderSet, LabelEncoder};
use crate::model::{GBLinearModel, LinearModel, Model, ModelMeta, OutputTransform};
use crate::package::ArtifactKind;
use crate::schema::{ColumnDescriptor, OrderedMap, Schema, TargetDescriptor, VariableType};

// =============================================================================
// PackageBuilder
// =============================================================================

/// Error building a fixture archive.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] crate::persist::WriteError),
}

/// Assembles a package archive entry by entry.
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        self.entries.retain(|(p, _)| *p != path);
        self.entries.push((path, contents.into()));
        self
    }

    /// Raw bytes for an artifact.
    pub fn artifact(self, kind: ArtifactKind, contents: impl Into<Vec<u8>>) -> Self {
        self.file(kind.path(), contents)
    }

    pub fn schema(self, schema: &Schema) -> Result<Self, FixtureError> {
        Ok(self.artifact(ArtifactKind::Schema, serde_json::to_vec(schema)?))
    }

    pub fn model(self, model: &Model) -> Result<Self, FixtureError> {
        Ok(self.artifact(ArtifactKind::Model, model.to_json_vec()?))
    }

    pub fn encoders(self, encoders: &EncoderSet) -> Result<Self, FixtureError> {
        Ok(self.artifact(ArtifactKind::Encoders, serde_json::to_vec(encoders)?))
    }

    /// Drop an artifact.
    pub fn without(mut self, kind: ArtifactKind) -> Self {
        self.entries.retain(|(p, _)| p != kind.path());
        self
    }

    /// The archive as bytes.
    pub fn build(&self) -> Result<Vec<u8>, FixtureError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (path, contents) in &self.entries {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents)?;
        }
        Ok(zip.finish()?.into_inner())
    }

    /// The archive as a seekable reader.
    pub fn cursor(&self) -> Result<Cursor<Vec<u8>>, FixtureError> {
        Ok(Cursor::new(self.build()?))
    }

    /// Write the archive to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), FixtureError> {
        std::fs::write(path, self.build()?)?;
        Ok(())
    }
}

// =============================================================================
// Demographics fixture
// =============================================================================

/// `age` (Numeric) and `sex` (Categorical, `M`/`F`), target `income`.
pub fn demographics_schema() -> Schema {
    let columns: OrderedMap<ColumnDescriptor> = [
        ("age_col", ColumnDescriptor::numeric("age")),
        (
            "sex_col",
            ColumnDescriptor::choice("sex", VariableType::Categorical, [("m", "M"), ("f", "F")]),
        ),
    ]
    .into_iter()
    .collect();

    let target = TargetDescriptor {
        variable_name: "income".into(),
    };

    Schema::new(columns, Some(target)).expect("demographics schema is valid")
}

/// `sex`: `F` → 0, `M` → 1.
pub fn demographics_encoders() -> EncoderSet {
    EncoderSet::new().with("sex", LabelEncoder::new(["F", "M"]))
}

/// `income = 0.5 · age + 10 · sex + 1`, so `{age: 30, sex: 1}` gives 26.
pub fn demographics_model() -> Model {
    GBLinearModel::new(
        ModelMeta::for_regression(2).with_feature_names(["age", "sex"]),
        LinearModel::new(array![[0.5], [10.0], [1.0]]),
        vec![0.0],
        OutputTransform::Identity,
    )
    .into()
}

/// A complete package of the demographics fixture.
pub fn demographics_package() -> PackageBuilder {
    PackageBuilder::new()
        .schema(&demographics_schema())
        .and_then(|b| b.model(&demographics_model()))
        .and_then(|b| b.encoders(&demographics_encoders()))
        .expect("demographics fixtures serialize")
}
