//! optiml command-line front-end.
//!
//! ```text
//! optiml form model.zip
//! optiml predict model.zip --set age=30 --set sex=M
//! optiml session [model.zip]
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use optiml::config::RawConfig;
use optiml::ui::{self, Banner, Command, Repl};
use optiml::{AppConfig, LogFormat, Session};

#[derive(Parser)]
#[command(name = "optiml")]
#[command(about = "Load a model package and run single-row predictions", version)]
struct Cli {
    /// Directory to extract packages into (default: system temp dir)
    #[arg(long, global = true, value_name = "DIR")]
    scratch_dir: Option<PathBuf>,

    /// Log filter, e.g. `info` or `optiml=debug` (env: OPTIML_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    /// Log output format (env: OPTIML_LOG_FORMAT)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a package and print its input form
    Form {
        /// Model package (.zip)
        archive: PathBuf,
    },

    /// Load a package, fill in inputs and print the prediction
    Predict {
        /// Model package (.zip)
        archive: PathBuf,

        /// Input value, repeatable
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },

    /// Interactive session on stdin/stdout
    Session {
        /// Model package to upload at start
        archive: Option<PathBuf>,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", Banner::error(e));
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = optiml::logging::init(&config) {
        eprintln!("{}", Banner::error(e));
        return ExitCode::FAILURE;
    }

    match run(cli.command, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", Banner::error(e));
            ExitCode::FAILURE
        }
    }
}

/// Environment first, then command-line flags on top, validated once.
fn load_config(cli: &Cli) -> optiml::Result<AppConfig> {
    config_from(cli, RawConfig::from_env())
}

fn config_from(cli: &Cli, mut raw: RawConfig) -> optiml::Result<AppConfig> {
    if let Some(dir) = &cli.scratch_dir {
        raw.scratch_dir = Some(dir.clone());
    }
    if let Some(filter) = &cli.log_level {
        raw.log_filter = Some(filter.clone());
    }
    if let Some(format) = cli.log_format {
        raw.log_format = Some(format.to_string());
    }
    Ok(raw.build()?)
}

fn run(command: Commands, config: AppConfig) -> optiml::Result<ExitCode> {
    let mut session = Session::new(config);

    match command {
        Commands::Form { archive } => {
            let form = session.upload_path(&archive)?;
            println!("{}", Banner::loaded());
            print!("{}", ui::render_form(form));
        }
        Commands::Predict { archive, set } => {
            session.upload_path(&archive)?;
            for (name, value) in &set {
                session.set(name, value)?;
            }
            let prediction = session.submit()?;
            println!("{}", Banner::success(prediction.to_string()));
        }
        Commands::Session { archive } => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut repl = Repl::new(session, stdin.lock(), stdout.lock());
            if let Some(archive) = archive {
                repl = repl.with_startup(Command::Upload(archive));
            }
            repl.run()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_predict_with_globals() {
        let cli = Cli::try_parse_from([
            "optiml",
            "predict",
            "pkg.zip",
            "--set",
            "age=30",
            "--set",
            "sex=M",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.log_format, Some(LogFormat::Json));
        match cli.command {
            Commands::Predict { archive, set } => {
                assert_eq!(archive, PathBuf::from("pkg.zip"));
                assert_eq!(
                    set,
                    [
                        ("age".to_string(), "30".to_string()),
                        ("sex".to_string(), "M".to_string())
                    ]
                );
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn rejects_bad_assignment() {
        assert!(Cli::try_parse_from(["optiml", "predict", "pkg.zip", "--set", "age"]).is_err());
    }

    #[test]
    fn flags_override_invalid_environment() {
        let dir = tempfile::tempdir().unwrap();
        let dir_arg = dir.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "optiml",
            "--scratch-dir",
            dir_arg,
            "--log-format",
            "json",
            "form",
            "pkg.zip",
        ])
        .unwrap();
        let raw = RawConfig {
            scratch_dir: Some(PathBuf::from("/definitely/not/here")),
            log_filter: None,
            log_format: Some("xml".into()),
        };

        let config = config_from(&cli, raw).unwrap();

        assert_eq!(config.scratch_dir.as_deref(), Some(dir.path()));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_environment_without_flags_fails() {
        let cli = Cli::try_parse_from(["optiml", "form", "pkg.zip"]).unwrap();
        let raw = RawConfig {
            scratch_dir: Some(PathBuf::from("/definitely/not/here")),
            ..RawConfig::default()
        };

        assert!(config_from(&cli, raw).is_err());
    }
}
