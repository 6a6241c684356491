//! Quick and dirty Python one-liners.
//!
//! This crate expands a densely packed, single line script into properly
//! indented Python. Blocks are written with braces and statements are
//! separated by semicolons, so a whole program fits on a command line. The
//! expansion is a single pass over the text; the result is handed to an
//! external Python interpreter and never evaluated here.
//!
//! # Syntax
//!
//! - `;`: ends a statement. `A; B; C` becomes three lines.
//! - `{ ... }`: indents the inner part. The statement in front of `{` gets a
//!   trailing `:`, so `A { B; C }` becomes `A:` followed by `B` and `C` one
//!   level deeper.
//! - `EL{ ... }`: runs the inner part once for each line of the files named
//!   on the command line, or of stdin when there are none.
//!
//! Delimiters inside `"..."` or `'...'` literals are never treated as
//! structure, and empty statements are dropped.
//!
//! # Record loops
//!
//! Inside `EL{ }` the following names are bound:
//!
//! - `L`: the current line number, starting at 0.
//! - `S`: the raw line, including its line terminator.
//! - `s`: the stripped line.
//! - `F`: the fields of `s`, split on `DELIM`.
//! - `I`: each field converted with `toint`, with 0 for anything non-numeric.
//!
//! `DELIM` defaults to a single space. Precisely, `EL{` expands to:
//!
//! ```python
//! for (L,S) in enumerate(fileinput.input()):
//!     s = S.strip()
//!     F = s.split(DELIM)
//!     I = [ toint(v) for v in F ]
//!     # ... the loop body ...
//! ```
//!
//! The loop is one fixed expansion. There is no general macro mechanism.
//!
//! # Example
//!
//! ```rust
//! use pyone::ExpansionEngine;
//!
//! let engine = ExpansionEngine::new();
//! let expansion = engine
//!     .expand(r#"n = 0 EL{ if s.endswith(";") { n += 1 } }; print(n)"#)
//!     .unwrap();
//!
//! let expected = r#"
//! n = 0
//! for (L,S) in enumerate(fileinput.input()):
//!     s = S.strip()
//!     F = s.split(DELIM)
//!     I = [ toint(v) for v in F ]
//!     if s.endswith(";"):
//!         n += 1
//! print(n)
//! "#
//! .trim();
//!
//! assert_eq!(expansion.to_string(), expected);
//! assert_eq!(expansion.depth(), 0);
//! ```
//!
//! A `}` without a matching `{` is the only error:
//!
//! ```rust
//! use pyone::{expand, ExpandError};
//!
//! let err = expand("print(1) }").unwrap_err();
//! assert!(matches!(err, ExpandError::UnbalancedClose { .. }));
//! assert_eq!(err.to_string(), "invalid syntax: print(1) }");
//! ```
//!
//! # Running scripts
//!
//! [`runtime::Program`] puts optional import lines in front of an expansion
//! and [`runtime::Interpreter`] runs the result with `python3`, after a
//! prelude defining `DELIM`, `toint` and `argv`.

pub mod engine;
mod internal;
pub mod runtime;

pub use engine::{expand, ExpandError, ExpandResult, Expansion, ExpansionEngine, Line};
pub use internal::{Delimiter, Scanner, Segment};
