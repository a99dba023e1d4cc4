//! Line-driven interactive session.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use super::{Banner, header, render_form};
use crate::error::Error;
use crate::session::Session;

const HELP: &str = "\
Commands:
  upload <path>        load a model package (.zip)
  form                 show the input form
  set <name>=<value>   change an input
  predict              run a prediction with the current inputs
  help                 show this message
  quit                 leave the session
";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(PathBuf),
    Form,
    Set { name: String, value: String },
    Predict,
    Help,
    Quit,
}

impl Command {
    /// Parse one line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb {
            "upload" if rest.is_empty() => return Err("usage: upload <path>".into()),
            "upload" => Self::Upload(PathBuf::from(rest)),
            "form" => Self::Form,
            "set" => match rest.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => Self::Set {
                    name: name.trim().to_string(),
                    value: value.trim().to_string(),
                },
                _ => return Err("usage: set <name>=<value>".into()),
            },
            "predict" => Self::Predict,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}', type 'help'")),
        };
        Ok(Some(command))
    }
}

/// Interactive loop over a [`Session`].
///
/// Every command is evaluated against the current session state and its
/// outcome written to `output` immediately.
pub struct Repl<R, W> {
    session: Session,
    input: R,
    output: W,
    prompt: String,
    startup: Vec<Command>,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(session: Session, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
            prompt: "optiml> ".to_string(),
            startup: Vec::new(),
        }
    }

    /// Queue a command to run right after the header is printed.
    pub fn with_startup(mut self, command: Command) -> Self {
        self.startup.push(command);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Print the header, then read and execute commands until `quit` or end
    /// of input.
    pub fn run(&mut self) -> io::Result<()> {
        write!(self.output, "{}", header())?;
        writeln!(self.output, "Type 'help' for commands.")?;

        for command in std::mem::take(&mut self.startup) {
            if !self.execute(command)? {
                return Ok(());
            }
        }

        let mut line = String::new();
        loop {
            write!(self.output, "{}", self.prompt)?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                break;
            }

            match Command::parse(&line) {
                Ok(Some(command)) => {
                    if !self.execute(command)? {
                        break;
                    }
                }
                Ok(None) => {}
                Err(message) => writeln!(self.output, "{}", Banner::error(message))?,
            }
        }

        tracing::info!("session ended");
        Ok(())
    }

    /// Execute one command. Returns `false` when the session should end.
    pub fn execute(&mut self, command: Command) -> io::Result<bool> {
        tracing::debug!(?command, "executing command");
        match command {
            Command::Upload(path) => match self.session.upload_path(&path) {
                Ok(form) => {
                    let form = render_form(form);
                    writeln!(self.output, "{}", Banner::loaded())?;
                    write!(self.output, "{form}")?;
                }
                Err(err) => writeln!(self.output, "{}", Banner::error(err))?,
            },
            Command::Form => match self.session.form() {
                Some(form) => write!(self.output, "{}", render_form(form))?,
                None => writeln!(self.output, "{}", Banner::error(Error::NoPackage))?,
            },
            Command::Set { name, value } => match self.session.set(&name, &value) {
                Ok(()) => {
                    if let Some(field) = self.session.form().and_then(|f| f.field(&name)) {
                        writeln!(self.output, "  {field}")?;
                    }
                }
                Err(err) => writeln!(self.output, "{}", Banner::error(err))?,
            },
            Command::Predict => {
                writeln!(self.output, "{}", Banner::from(self.session.submit()))?;
            }
            Command::Help => write!(self.output, "{HELP}")?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("form", Command::Form)]
    #[case("  predict  ", Command::Predict)]
    #[case("upload pkg.zip", Command::Upload(PathBuf::from("pkg.zip")))]
    #[case("upload my models/pkg.zip", Command::Upload(PathBuf::from("my models/pkg.zip")))]
    #[case("set age = 30", Command::Set { name: "age".into(), value: "30".into() })]
    #[case("set notes=a=b", Command::Set { name: "notes".into(), value: "a=b".into() })]
    #[case("exit", Command::Quit)]
    fn parses(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(Command::parse(line), Ok(Some(expected)));
    }

    #[rstest]
    #[case("upload")]
    #[case("set age")]
    #[case("set =3")]
    #[case("train")]
    fn rejects(#[case] line: &str) {
        assert!(Command::parse(line).is_err());
    }

    #[test]
    fn blank_line() {
        assert_eq!(Command::parse("   \n"), Ok(None));
    }
}
