//! Driving an interactive session from scripted input.

use std::io::Cursor;

use optiml::testing;
use optiml::ui::{Command, LOADED_MESSAGE, Repl};
use optiml::{AppConfig, Session};
use tempfile::TempDir;

fn run_script(script: &str) -> (String, Session) {
    let mut output = Vec::new();
    let mut repl = Repl::new(
        Session::new(AppConfig::default()),
        Cursor::new(script.as_bytes().to_vec()),
        &mut output,
    );
    repl.run().unwrap();
    let session = repl.into_session();
    (String::from_utf8(output).unwrap(), session)
}

#[test]
fn upload_edit_predict() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("demographics.zip");
    testing::demographics_package().write_to(&path).unwrap();

    let script = format!(
        "upload {}\nset age=30\npredict\nquit\n",
        path.display()
    );
    let (output, session) = run_script(&script);

    assert!(output.starts_with("OptiML - Prediction App\n"), "{output}");
    assert!(output.contains(LOADED_MESSAGE), "{output}");
    assert!(output.contains("Enter Inputs for Prediction"), "{output}");
    assert!(output.contains("age (Numeric) = 30"), "{output}");
    assert!(output.contains("Income: **26.0**"), "{output}");
    assert!(session.is_loaded());
}

#[test]
fn predict_before_upload() {
    let (output, session) = run_script("predict\n");

    assert!(
        output.contains("❌ Please upload a model package first."),
        "{output}"
    );
    assert!(!session.is_loaded());
}

#[test]
fn missing_archive_is_reported() {
    let dir = TempDir::new().unwrap();
    let script = format!("upload {}\n", dir.path().join("nope.zip").display());
    let (output, _) = run_script(&script);

    assert!(
        output.contains("❌ Failed to load model package: "),
        "{output}"
    );
}

#[test]
fn invalid_category_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("demographics.zip");
    testing::demographics_package().write_to(&path).unwrap();

    let script = format!("upload {}\nset sex=X\n", path.display());
    let (output, _) = run_script(&script);

    assert!(output.contains("❌ "), "{output}");
    assert!(output.contains("sex"), "{output}");
}

#[test]
fn unknown_command_keeps_running() {
    let (output, _) = run_script("train\nhelp\n");

    assert!(output.contains("❌ unknown command 'train'"), "{output}");
    assert!(output.contains("upload <path>"), "{output}");
}

#[test]
fn startup_upload_runs_before_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("demographics.zip");
    testing::demographics_package().write_to(&path).unwrap();

    let mut output = Vec::new();
    let mut repl = Repl::new(
        Session::default(),
        Cursor::new(b"predict\n".to_vec()),
        &mut output,
    )
    .with_startup(Command::Upload(path));
    repl.run().unwrap();
    drop(repl);

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("Income: **11.0**"), "{output}");
}
