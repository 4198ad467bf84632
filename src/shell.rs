//! Shell execution and structured command lines.

use crate::error::{Error, Result};
use std::fmt;
use std::process::{Command, ExitStatus};
use tracing::{debug, warn};

/// Separator placed between statements of a command list.
pub const STATEMENT_SEPARATOR: &str = "; ";

/// Join a command list into a single shell statement sequence.
pub fn join_commands<S: AsRef<str>>(cmds: &[S]) -> String {
    cmds.iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(STATEMENT_SEPARATOR)
}

/// Echo `cmd` to stderr (when `echo` is set) and run it with `sh -c`.
///
/// Blocks until the shell exits and returns its status. A non-zero status is
/// logged but left for the caller to act on.
pub fn run(cmd: &str, echo: bool) -> Result<ExitStatus> {
    if echo {
        eprintln!("{}", cmd);
    }

    let status = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .status()
        .map_err(|source| Error::Spawn {
            command: cmd.to_string(),
            source,
        })?;

    if !status.success() {
        warn!("shell exited with {}: {}", status, cmd);
    }
    Ok(status)
}

/// One argument of an [`Invocation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Rendered as-is.
    Plain(String),
    /// Rendered inside double quotes.
    Quoted(String),
}

impl Token {
    pub fn value(&self) -> &str {
        match self {
            Token::Plain(s) | Token::Quoted(s) => s,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Plain(s) => f.write_str(s),
            Token::Quoted(s) => write!(f, "\"{}\"", escape_double_quoted(s)),
        }
    }
}

/// Escape the characters that stay special inside a double-quoted shell word.
fn escape_double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// A program and its arguments, spawned without an intermediate shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub tokens: Vec<Token>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            tokens: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.tokens.push(Token::Plain(value.into()));
        self
    }

    /// Append a flag followed by its value.
    pub fn flag(self, name: &str, value: impl Into<String>) -> Self {
        self.arg(name).arg(value)
    }

    pub fn quoted(mut self, value: impl Into<String>) -> Self {
        self.tokens.push(Token::Quoted(value.into()));
        self
    }

    /// Argument values in order, without quoting.
    pub fn args(&self) -> Vec<&str> {
        self.tokens.iter().map(Token::value).collect()
    }

    /// A `Command` passing every token as a discrete argument.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args());
        cmd
    }

    /// Run the invocation with inherited stdio and fail on a non-zero exit.
    pub fn run_checked(&self) -> Result<ExitStatus> {
        let rendered = self.to_string();
        debug!("running {}", rendered);

        let status = self.command().status().map_err(|source| Error::Spawn {
            command: self.program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(Error::CommandFailed {
                command: rendered,
                status,
            });
        }
        Ok(status)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for token in &self.tokens {
            write!(f, " {}", token)?;
        }
        Ok(())
    }
}
