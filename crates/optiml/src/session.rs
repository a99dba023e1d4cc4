//! Per-user session state.
//!
//! A session is empty until a package is uploaded. A successful upload
//! replaces the previous package and form wholesale; a failed one leaves the
//! session empty. Every other action is evaluated against the current state
//! and never changes the package.

use std::io::{Read, Seek};
use std::path::Path;

use crate::config::AppConfig;
use crate::engine::{Prediction, PredictionEngine};
use crate::error::{Error, Result};
use crate::form::Form;
use crate::package::{ModelPackage, PackageError};

#[derive(Debug, Clone)]
struct Loaded {
    package: ModelPackage,
    form: Form,
}

/// State of one interactive session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: AppConfig,
    loaded: Option<Loaded>,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            loaded: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Load a package and render its form.
    pub fn upload<R: Read + Seek>(&mut self, archive: R) -> Result<&Form, PackageError> {
        self.loaded = None;
        let package = ModelPackage::load(archive, &self.config)?;
        Ok(self.install(package))
    }

    /// [`upload`](Self::upload) from a file on disk.
    pub fn upload_path(&mut self, path: impl AsRef<Path>) -> Result<&Form, PackageError> {
        self.loaded = None;
        let package = ModelPackage::load_path(path, &self.config)?;
        Ok(self.install(package))
    }

    fn install(&mut self, package: ModelPackage) -> &Form {
        let form = Form::render(package.schema());
        &self.loaded.insert(Loaded { package, form }).form
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn package(&self) -> Option<&ModelPackage> {
        self.loaded.as_ref().map(|loaded| &loaded.package)
    }

    pub fn form(&self) -> Option<&Form> {
        self.loaded.as_ref().map(|loaded| &loaded.form)
    }

    /// Edit one form field.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<()> {
        let loaded = self.loaded.as_mut().ok_or(Error::NoPackage)?;
        loaded.form.set(name, raw)?;
        Ok(())
    }

    /// Predict from the current form values.
    pub fn submit(&self) -> Result<Prediction> {
        let loaded = self.loaded.as_ref().ok_or(Error::NoPackage)?;
        let package = &loaded.package;
        let engine = PredictionEngine::new(package.schema(), package.encoders(), package.model());
        Ok(engine.predict(&loaded.form.values())?)
    }

    /// Drop the loaded package.
    pub fn clear(&mut self) {
        self.loaded = None;
    }
}
