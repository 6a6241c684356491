//! Assembly of the final Python program and the handoff to an interpreter.
//!
//! Nothing here evaluates code. The expanded script is wrapped in a small
//! bootstrap and passed to an external interpreter process.

use std::process::{Command, ExitStatus};

use serde::Serialize;

use crate::engine::Expansion;

/// Definitions every script can rely on.
///
/// `DELIM` is the field separator used by `EL{ }` loops. Scripts may assign
/// it before the loop runs; [`Program::with_delimiter`] overrides it before
/// the script starts.
pub const PRELUDE: &str = "\
import sys
import re
import fileinput

DELIM = ' '

def toint(x, v=0):
    try:
        return int(x)
    except ValueError:
        return v
";

/// The interpreter used when none is configured.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Errors raised while handing a program to the interpreter.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to start interpreter `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Lines placed in front of the expanded script, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Preamble {
    lines: Vec<String>,
}

impl Preamble {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `import <modules>`.
    pub fn import(&mut self, modules: &str) -> &mut Self {
        self.lines.push(format!("import {modules}"));
        self
    }

    /// Adds `from <module> import *` for each comma separated module.
    pub fn import_all_from(&mut self, modules: &str) -> &mut Self {
        self.lines.extend(
            modules
                .split(',')
                .map(str::trim)
                .filter(|module| !module.is_empty())
                .map(|module| format!("from {module} import *")),
        );
        self
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// A preamble together with the expansion it precedes.
///
/// The `DELIM` override is not part of the script. It is set by the bootstrap,
/// so it does not count towards the one-liner check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Program {
    preamble: Preamble,
    #[serde(skip_serializing_if = "Option::is_none")]
    delimiter: Option<String>,
    expansion: Expansion,
}

impl Program {
    #[must_use]
    pub fn new(preamble: Preamble, expansion: Expansion) -> Self {
        Self {
            preamble,
            delimiter: None,
            expansion,
        }
    }

    /// Overrides the `DELIM` default for this program.
    #[must_use]
    pub fn with_delimiter(mut self, delim: impl Into<String>) -> Self {
        self.delimiter = Some(delim.into());
        self
    }

    #[must_use]
    pub fn delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref()
    }

    #[must_use]
    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    #[must_use]
    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    /// All script lines: the preamble followed by the indented expansion.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.preamble
            .lines()
            .iter()
            .cloned()
            .chain(self.expansion.to_lines())
            .collect()
    }

    /// The script as handed to the interpreter.
    #[must_use]
    pub fn script(&self) -> String {
        self.lines().join("\n")
    }

    /// The script preceded by the `DELIM` override, if any.
    #[must_use]
    pub fn listing(&self) -> String {
        match self.delimiter_setting() {
            Some(setting) => format!("{setting}\n{}", self.script()),
            None => self.script(),
        }
    }

    fn delimiter_setting(&self) -> Option<String> {
        self.delimiter
            .as_deref()
            .map(|delim| format!("DELIM = {}", python_literal(delim)))
    }

    /// A single line script is run interactively, so a bare expression
    /// prints its value.
    #[must_use]
    pub fn is_one_liner(&self) -> bool {
        self.preamble.lines().len() + self.expansion.lines().len() == 1
    }

    /// The complete source passed to the interpreter with `-c`.
    ///
    /// The interpreter's own arguments are shifted so that `argv[0]` is the
    /// script and the record source reads the files named after it.
    #[must_use]
    pub fn bootstrap(&self) -> String {
        let mode = if self.is_one_liner() { "single" } else { "exec" };
        let mut bootstrap = format!("{PRELUDE}\n");
        if let Some(setting) = self.delimiter_setting() {
            bootstrap.push_str(&setting);
            bootstrap.push('\n');
        }
        bootstrap.push_str("argv = sys.argv = sys.argv[1:]\n");
        bootstrap.push_str(&format!(
            "exec(compile({}, '<script>', '{mode}'))\n",
            python_literal(&self.script())
        ));
        bootstrap
    }
}

/// An external Python interpreter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interpreter {
    program: String,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPRETER)
    }
}

impl Interpreter {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Builds the interpreter command for `program`.
    ///
    /// # Arguments
    ///
    /// * `program` - The assembled program.
    /// * `argv` - What the script sees as `argv`, starting with the script itself.
    #[must_use]
    pub fn command(&self, program: &Program, argv: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command.arg("-c").arg(program.bootstrap()).args(argv);
        command
    }

    /// Runs `program` with inherited stdio and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the interpreter cannot be started.
    pub fn run(&self, program: &Program, argv: &[String]) -> Result<ExitStatus, RuntimeError> {
        tracing::info!(interpreter = %self.program, lines = program.lines().len(), "running script");
        self.command(program, argv)
            .status()
            .map_err(|source| RuntimeError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

/// Quotes `text` as a Python string literal.
///
/// JSON string syntax is a subset of Python's, including `\uXXXX` escapes.
fn python_literal(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}
