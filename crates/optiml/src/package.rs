//! Model package loading.
//!
//! A model package is a zip archive with three artifacts at fixed,
//! case-sensitive paths:
//!
//! | Artifact | Path |
//! |----------|------|
//! | input schema | `artifacts/model_inputs.json` |
//! | model | `artifacts/best_model.pkl` |
//! | label encoders | `artifacts/label_encoders.pkl` |
//!
//! The archive is extracted into a fresh scratch directory that is removed
//! when loading returns, whether it succeeded or not.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::AppConfig;
use crate::encoding::EncoderSet;
use crate::model::{Model, Predictor};
use crate::persist::ReadError;
use crate::schema::Schema;

// =============================================================================
// ArtifactKind
// =============================================================================

/// The three artifacts of a package, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Schema,
    Model,
    Encoders,
}

impl ArtifactKind {
    /// All artifacts in the order they are resolved.
    pub const ALL: [ArtifactKind; 3] = [Self::Schema, Self::Model, Self::Encoders];

    /// Path inside the archive.
    pub fn path(self) -> &'static str {
        match self {
            Self::Schema => "artifacts/model_inputs.json",
            Self::Model => "artifacts/best_model.pkl",
            Self::Encoders => "artifacts/label_encoders.pkl",
        }
    }

    /// File name without the directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Schema => "model_inputs.json",
            Self::Model => "best_model.pkl",
            Self::Encoders => "label_encoders.pkl",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Error loading a package.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// A required artifact is not in the archive.
    #[error("{0} not found in the ZIP file.")]
    MissingArtifact(ArtifactKind),
    /// The archive or one of its artifacts could not be read.
    #[error("Failed to load model package: {0}")]
    Load(#[from] LoadError),
}

/// Cause of a [`PackageError::Load`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("invalid {}: {source}", ArtifactKind::Schema)]
    Schema {
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {}: {source}", ArtifactKind::Model)]
    Model {
        #[source]
        source: ReadError,
    },
    #[error("invalid {}: {source}", ArtifactKind::Encoders)]
    Encoders {
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// ModelPackage
// =============================================================================

/// The decoded artifacts of a package.
#[derive(Debug, Clone)]
pub struct ModelPackage {
    schema: Schema,
    model: Model,
    encoders: EncoderSet,
}

impl ModelPackage {
    pub fn new(schema: Schema, model: Model, encoders: EncoderSet) -> Self {
        Self {
            schema,
            model,
            encoders,
        }
    }

    /// Load a package from a zip archive.
    ///
    /// The first missing artifact (schema, then model, then encoders) is
    /// reported as [`PackageError::MissingArtifact`] and nothing else is
    /// decoded.
    pub fn load<R: Read + Seek>(archive: R, config: &AppConfig) -> Result<Self, PackageError> {
        let scratch = scratch_dir(config).map_err(LoadError::from)?;
        tracing::debug!(path = %scratch.path().display(), "extracting model package");

        let mut zip = zip::ZipArchive::new(archive).map_err(LoadError::from)?;
        zip.extract(scratch.path()).map_err(LoadError::from)?;

        let [schema_path, model_path, encoders_path] = resolve_artifacts(scratch.path())?;

        let schema = Schema::from_reader(open(&schema_path)?)
            .map_err(|source| LoadError::Schema { source })?;
        let model = Model::read_json(open(&model_path)?)
            .map_err(|source| LoadError::Model { source })?;
        let encoders = EncoderSet::from_reader(open(&encoders_path)?)
            .map_err(|source| LoadError::Encoders { source })?;

        tracing::info!(
            columns = schema.len(),
            model = model.kind(),
            n_features = model.meta().n_features,
            encoders = encoders.len(),
            "model package loaded"
        );

        // `scratch` is dropped here, removing the extracted files.
        Ok(Self::new(schema, model, encoders))
    }

    /// Load a package from a zip file on disk.
    pub fn load_path(path: impl AsRef<Path>, config: &AppConfig) -> Result<Self, PackageError> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "loading model package");
        let file = File::open(path).map_err(LoadError::from)?;
        Self::load(BufReader::new(file), config)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }
}

fn scratch_dir(config: &AppConfig) -> std::io::Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("optiml-");
    match &config.scratch_dir {
        Some(dir) => builder.tempdir_in(dir),
        None => builder.tempdir(),
    }
}

fn resolve_artifacts(root: &Path) -> Result<[PathBuf; 3], PackageError> {
    let resolve = |kind: ArtifactKind| {
        let path = root.join(kind.path());
        if path.is_file() {
            Ok(path)
        } else {
            tracing::debug!(artifact = %kind, "artifact missing from package");
            Err(PackageError::MissingArtifact(kind))
        }
    };

    Ok([
        resolve(ArtifactKind::Schema)?,
        resolve(ArtifactKind::Model)?,
        resolve(ArtifactKind::Encoders)?,
    ])
}

fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    Ok(BufReader::new(File::open(path)?))
}
