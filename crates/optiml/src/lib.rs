//! optiml: interactive single-row inference for packaged tabular models.
//!
//! A model package is a zip archive holding an input schema, a serialized
//! model and a set of label encoders. Loading a package yields an input form
//! derived from the schema; submitting the form encodes the inputs, runs the
//! model on a single row and reports the prediction under the target name.
//!
//! # Key Types
//!
//! - [`ModelPackage`] - the three decoded artifacts of an uploaded archive
//! - [`Form`] - one input control per schema column
//! - [`PredictionEngine`] - encode, align and predict a single row
//! - [`Session`] - upload / edit / submit state of one user
//! - [`Model`] - tree-ensemble or linear predictor, see [`model`] and [`persist`]
//!
//! # Example
//!
//! ```
//! use optiml::{AppConfig, Session, testing};
//!
//! let mut session = Session::new(AppConfig::default());
//! session.upload(testing::demographics_package().cursor().unwrap()).unwrap();
//! session.set("age", "30").unwrap();
//!
//! let prediction = session.submit().unwrap();
//! assert_eq!(prediction.to_string(), "Income: **26.0**");
//! ```

pub mod config;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod form;
pub mod frame;
pub mod logging;
pub mod model;
pub mod package;
pub mod persist;
pub mod schema;
pub mod session;
pub mod testing;
pub mod ui;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use config::{AppConfig, LogFormat};
pub use encoding::{EncoderSet, LabelEncoder};
pub use engine::{PredictError, Prediction, PredictionEngine};
pub use error::{Error, Result};
pub use form::{Control, Form, FormField};
pub use frame::{Cell, Row};
pub use model::{Model, PredictionValue, Predictor};
pub use package::{ArtifactKind, ModelPackage, PackageError};
pub use schema::{Schema, VariableType};
pub use session::Session;
