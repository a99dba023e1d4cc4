//! Terminal rendering.
//!
//! Everything here produces plain text; [`Repl`] drives a [`Session`]
//! from a line-based input stream.
//!
//! [`Session`]: crate::session::Session

mod repl;

use std::fmt::{self, Write as _};

pub use repl::{Command, Repl};

use crate::form::{Control, Form};
use crate::schema::Label;

/// Page title.
pub const TITLE: &str = "OptiML - Prediction App";

/// Message shown after a successful upload.
pub const LOADED_MESSAGE: &str = "✅ Model package loaded successfully!";

/// Page header: title plus a pointer for users without a package.
pub fn header() -> String {
    format!(
        "{TITLE}\n{}\n\
         If you don't have a model package, create one with the OptiML Suite \
         (https://yogeshsj.vercel.app/).\n",
        "=".repeat(TITLE.chars().count())
    )
}

// =============================================================================
// Banner
// =============================================================================

/// Severity of a [`Banner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Inline status message.
///
/// Error banners are prefixed with `❌`; success text is shown as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl fmt::Display) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.to_string(),
        }
    }

    /// Banner for a successful upload.
    pub fn loaded() -> Self {
        Self::success(LOADED_MESSAGE)
    }

    pub fn is_error(&self) -> bool {
        self.kind == BannerKind::Error
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BannerKind::Success => f.write_str(&self.message),
            BannerKind::Error => write!(f, "❌ {}", self.message),
        }
    }
}

impl<T: fmt::Display, E: fmt::Display> From<Result<T, E>> for Banner {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::success(value.to_string()),
            Err(err) => Self::error(err),
        }
    }
}

// =============================================================================
// Form rendering
// =============================================================================

/// Text rendering of a form: one block per field with its caption, control
/// and current value.
pub fn render_form(form: &Form) -> String {
    let mut out = String::from("Enter Inputs for Prediction\n");
    if form.is_empty() {
        out.push_str("  (no inputs)\n");
        return out;
    }

    for field in form.fields() {
        // Writing to a String cannot fail.
        let _ = match field.control() {
            Control::Number { value } => {
                writeln!(out, "  {} [number] = {value}", field.caption())
            }
            Control::Select { choices, selected } => {
                let current = selected
                    .and_then(|idx| choices.get(idx))
                    .map_or("<none>", Label::as_str);
                let options: Vec<_> = choices.iter().map(Label::as_str).collect();
                writeln!(
                    out,
                    "  {} [select: {}] = {current}",
                    field.caption(),
                    options.join(" | ")
                )
            }
            Control::Text { value } => {
                writeln!(out, "  {} [text] = {value:?}", field.caption())
            }
        };
    }
    out
}
