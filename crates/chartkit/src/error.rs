use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::chart::BranchType;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to read file {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fumen write error ({path:?}): {reason}")]
    FileWrite {
        path: PathBuf,
        reason: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Course {index} not found (chart has {count} courses)")]
    CourseNotFound { index: usize, count: usize },

    #[error("Config parse error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One enclosing layer of a failed binary read, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
    Header,
    Measure { index: usize },
    Branch { branch: BranchType },
    Note { index: usize, count: usize },
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Measure { index } => write!(f, "measure {}", index),
            Self::Branch { branch } => write!(f, "{} notes", branch.name()),
            Self::Note { index, count } => write!(f, "note {}/{}", index + 1, count),
        }
    }
}

/// A failed fixed-size read from a Fumen buffer.
///
/// `offset` is the absolute byte position where the read that failed
/// started. Context frames are pushed by each enclosing layer while the
/// error propagates, so `context` reads outermost to innermost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub offset: usize,
    pub reason: String,
    pub context: Vec<ParseContext>,
}

impl ParseError {
    pub fn new(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            offset,
            reason: reason.into(),
            context: Vec::new(),
        }
    }

    /// Prepends an enclosing layer.
    pub fn within(mut self, frame: ParseContext) -> Self {
        self.context.insert(0, frame);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fumen parse error at offset 0x{:X} ({} bytes): ",
            self.offset, self.offset
        )?;
        for frame in &self.context {
            write!(f, "{}: ", frame)?;
        }
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for ParseError {}

/// Adds a context frame to the error side of a parse result.
pub(crate) trait ParseResultExt<T> {
    fn within(self, frame: ParseContext) -> std::result::Result<T, ParseError>;
}

impl<T> ParseResultExt<T> for std::result::Result<T, ParseError> {
    fn within(self, frame: ParseContext) -> std::result::Result<T, ParseError> {
        self.map_err(|e| e.within(frame))
    }
}
