use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::internal::{Delimiter, Scanner};

/// The default indentation unit, repeated once per nesting level.
pub const INDENT: &str = "    ";

/// Appended to the statement that opens a block.
pub const BLOCK_MARKER: char = ':';

/// The two letters that turn a following `{` into a per-record loop.
pub const LOOP_TRIGGER: &str = "EL";

/// Header emitted in place of `EL{`, at the depth of the statement before it.
pub const LOOP_HEADER: &str = "for (L,S) in enumerate(fileinput.input()):";

/// Lines emitted at the start of every `EL{ }` body.
pub const LOOP_BODY: [&str; 3] = [
    "s = S.strip()",
    "F = s.split(DELIM)",
    "I = [ toint(v) for v in F ]",
];

/// A type alias for the result of an expansion pass.
///
/// # Examples
///
/// ```rust
/// use pyone::{expand, ExpandResult};
///
/// fn count_lines(fragment: &str) -> ExpandResult<usize> {
///     Ok(expand(fragment)?.lines().len())
/// }
///
/// assert_eq!(count_lines("a; b; c").unwrap(), 3);
/// ```
pub type ExpandResult<T> = Result<T, ExpandError>;

/// Errors raised while expanding a fragment.
#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    /// A `}` was found with no open block left to close.
    ///
    /// `trailing` holds the fragment from the start of the offending
    /// statement up to the end of the input.
    #[error("invalid syntax: {trailing}")]
    UnbalancedClose { trailing: String },

    /// The fragment could not be read.
    #[error("failed to read script {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One output line: trimmed statement text at a nesting depth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Line {
    pub depth: usize,
    pub text: String,
}

impl Line {
    /// Renders the line with `indent` repeated `depth` times in front.
    #[must_use]
    pub fn render(&self, indent: &str) -> String {
        format!("{}{}", indent.repeat(self.depth), self.text)
    }
}

/// The result of one expansion pass.
///
/// `depth` is the nesting level left open at the end of the fragment. It is
/// usually zero, but a fragment ending inside a block is not an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Expansion {
    indent: String,
    depth: usize,
    lines: Vec<Line>,
}

impl Expansion {
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Renders every line with its indentation.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.render(&self.indent))
            .collect()
    }
}

impl fmt::Display for Expansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lines().join("\n"))
    }
}

/// Turns one-liner scripts into indented, block structured Python.
///
/// `;` ends a statement, `{` opens a block (the statement before it gets a
/// trailing `:`), and `}` closes one. Delimiters inside quoted literals are
/// left alone. `EL{` opens a loop over the lines of the input files.
///
/// # Examples
///
/// ```rust
/// use pyone::ExpansionEngine;
///
/// let engine = ExpansionEngine::new();
/// let expansion = engine.expand("for x in range(3) { print(x) }").unwrap();
/// assert_eq!(expansion.to_string(), "for x in range(3):\n    print(x)");
/// ```
///
/// The engine keeps no state between passes, so one instance can expand any
/// number of fragments, from any number of threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpansionEngine {
    indent: String,
}

impl Default for ExpansionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpansionEngine {
    /// Creates an engine indenting with four spaces.
    #[must_use]
    pub fn new() -> Self {
        Self {
            indent: INDENT.to_owned(),
        }
    }

    /// Replaces the indentation unit.
    ///
    /// # Arguments
    ///
    /// * `indent` - The string repeated once per nesting level.
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Expands a fragment in a single pass.
    ///
    /// # Arguments
    ///
    /// * `fragment` - The one-liner script to expand.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::UnbalancedClose`] as soon as a `}` would close a
    /// block that was never opened. No partial output is returned.
    ///
    /// # Returns
    ///
    /// The expanded lines and the depth left open at the end.
    pub fn expand(&self, fragment: &str) -> ExpandResult<Expansion> {
        let mut builder = Builder::default();

        for segment in Scanner::new(fragment) {
            let text = &fragment[segment.span.clone()];
            match segment.delimiter {
                None | Some(Delimiter::Semicolon) => builder.statement(text),
                Some(Delimiter::BlockOpen) => match text.strip_suffix(LOOP_TRIGGER) {
                    Some(head) => builder.open_loop(head),
                    None => builder.open(text),
                },
                Some(Delimiter::BlockClose) => {
                    if !builder.close(text) {
                        return Err(ExpandError::UnbalancedClose {
                            trailing: fragment[segment.span.start..].to_owned(),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            lines = builder.lines.len(),
            depth = builder.depth,
            "expanded fragment"
        );
        Ok(Expansion {
            indent: self.indent.clone(),
            depth: builder.depth,
            lines: builder.lines,
        })
    }

    /// Expands a fragment read from a file.
    ///
    /// # Arguments
    ///
    /// * `path` - The file holding the one-liner script.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the expansion fails.
    pub fn expand_file<P: AsRef<Path>>(&self, path: P) -> ExpandResult<Expansion> {
        let path = path.as_ref();
        let fragment = std::fs::read_to_string(path).map_err(|source| ExpandError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.expand(&fragment)
    }
}

/// Expands a fragment with the default four space indentation.
///
/// # Errors
///
/// See [`ExpansionEngine::expand`].
pub fn expand(fragment: &str) -> ExpandResult<Expansion> {
    ExpansionEngine::new().expand(fragment)
}

#[derive(Default)]
struct Builder {
    depth: usize,
    lines: Vec<Line>,
}

impl Builder {
    fn emit(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        tracing::trace!(depth = self.depth, text, "emit line");
        self.lines.push(Line {
            depth: self.depth,
            text: text.to_owned(),
        });
    }

    fn statement(&mut self, text: &str) {
        self.emit(text);
    }

    fn open(&mut self, text: &str) {
        self.emit(&format!("{}{BLOCK_MARKER}", text.trim()));
        self.depth += 1;
    }

    fn open_loop(&mut self, head: &str) {
        tracing::debug!(depth = self.depth, "expanding record loop");
        self.emit(head);
        self.emit(LOOP_HEADER);
        self.depth += 1;
        for line in LOOP_BODY {
            self.emit(line);
        }
    }

    /// Returns `false` when there is no block left to close.
    fn close(&mut self, text: &str) -> bool {
        self.emit(text);
        match self.depth.checked_sub(1) {
            Some(depth) => {
                self.depth = depth;
                true
            }
            None => false,
        }
    }
}
