use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

// One step of the scan: a plain run followed by either a structural delimiter
// or a complete quoted literal. A literal only extends the current segment.
static STEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[^"'{};]*(?:[{};]|"(?:\\.|[^"])*"|'(?:\\.|[^'])*')"#).unwrap()
});

/// A structural delimiter found outside of any quoted literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    /// `;`
    Semicolon,
    /// `{`
    BlockOpen,
    /// `}`
    BlockClose,
}

impl Delimiter {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b';' => Some(Self::Semicolon),
            b'{' => Some(Self::BlockOpen),
            b'}' => Some(Self::BlockClose),
            _ => None,
        }
    }
}

/// Text between two delimiters, as a byte range into the scanned fragment.
///
/// `delimiter` is `None` for the trailing remainder once no further delimiter
/// can be found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub span: Range<usize>,
    pub delimiter: Option<Delimiter>,
}

/// Splits a fragment on `;`, `{` and `}` while skipping over quoted literals.
///
/// The scan is a single left to right pass. An unterminated literal hides
/// every delimiter after it, so the rest of the fragment becomes the tail.
/// This fallback is kept as is, although it may be unintended: a missing
/// closing quote is never reported.
#[derive(Clone, Debug)]
pub struct Scanner<'a> {
    source: &'a str,
    start: usize,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            start: 0,
            pos: 0,
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        while self.pos < self.source.len() {
            let Some(step) = STEP.find(&self.source[self.pos..]) else {
                break;
            };
            let end = self.pos + step.end();
            self.pos = end;
            // the last byte is always ASCII: a delimiter or a closing quote
            if let Some(delimiter) = Delimiter::from_byte(self.source.as_bytes()[end - 1]) {
                let segment = Segment {
                    span: self.start..end - 1,
                    delimiter: Some(delimiter),
                };
                self.start = end;
                tracing::trace!(?segment, "scanned segment");
                return Some(segment);
            }
        }

        if self.start < self.source.len() {
            let segment = Segment {
                span: self.start..self.source.len(),
                delimiter: None,
            };
            self.start = self.source.len();
            self.pos = self.source.len();
            tracing::trace!(?segment, "scanned tail");
            return Some(segment);
        }

        None
    }
}
