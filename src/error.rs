//! Generation-time error taxonomy.
//!
//! Every variant is fatal to a generation run: the input is deterministic, so
//! retrying an unchanged source reproduces the same failure. Each variant keeps
//! enough context (declaration name, offending text, line) to locate the
//! problem in the annotated source.

use std::fmt;

/// Where in the annotated source an error was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Declaration the error belongs to (`MyApi::profile`, `ProfileParams.login`)
    pub item: String,
    /// 1-based line of the declaration, 0 when unknown
    pub line: usize,
}

impl SourceLocation {
    pub fn new(item: impl Into<String>, line: usize) -> Self {
        SourceLocation {
            item: item.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{} (line {})", self.item, self.line)
        } else {
            write!(f, "{}", self.item)
        }
    }
}

/// Fatal error raised while extracting, building or rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The input is not syntactically valid Rust
    MalformedSource {
        /// Parser message
        message: String,
        /// 1-based line of the syntax error
        line: usize,
        /// 1-based column of the syntax error
        column: usize,
    },
    /// A route payload or a validation directive string could not be decoded
    MalformedAnnotation {
        /// Annotated declaration
        location: SourceLocation,
        /// The annotation text as written
        text: String,
        /// What was wrong with it
        reason: String,
    },
    /// An annotated field has a type other than `String` or a signed integer
    UnsupportedFieldKind {
        /// Annotated field
        location: SourceLocation,
        /// The declared type as written
        ty: String,
    },
    /// An annotated function does not follow the handler convention
    StructuralMismatch {
        /// Offending declaration
        location: SourceLocation,
        /// Which part of the convention is violated
        reason: String,
    },
    /// Two handlers of one owning type claim the same path
    RouteConflict {
        /// Owning type
        owner: String,
        /// Contested route path
        path: String,
        /// Handler seen first
        first: String,
        /// Handler seen second
        second: String,
    },
    /// The model handed to the emitter violates one of its invariants
    RenderingInconsistency {
        /// Description of the violated invariant
        reason: String,
    },
}

impl GenerationError {
    /// Short taxonomy name, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::MalformedSource { .. } => "MalformedSource",
            GenerationError::MalformedAnnotation { .. } => "MalformedAnnotation",
            GenerationError::UnsupportedFieldKind { .. } => "UnsupportedFieldKind",
            GenerationError::StructuralMismatch { .. } => "StructuralMismatch",
            GenerationError::RouteConflict { .. } => "RouteConflict",
            GenerationError::RenderingInconsistency { .. } => "RenderingInconsistency",
        }
    }

    pub(crate) fn malformed(
        location: SourceLocation,
        text: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GenerationError::MalformedAnnotation {
            location,
            text: text.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(location: SourceLocation, reason: impl Into<String>) -> Self {
        GenerationError::StructuralMismatch {
            location,
            reason: reason.into(),
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        GenerationError::RenderingInconsistency {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::MalformedSource {
                message,
                line,
                column,
            } => write!(
                f,
                "[MalformedSource] line {line}, column {column}: {message}"
            ),
            GenerationError::MalformedAnnotation {
                location,
                text,
                reason,
            } => write!(
                f,
                "[MalformedAnnotation] {location}: {reason} in `{text}`"
            ),
            GenerationError::UnsupportedFieldKind { location, ty } => write!(
                f,
                "[UnsupportedFieldKind] {location}: annotated field has type `{ty}`, \
                expected `String` or a signed integer (i8, i16, i32, i64, isize)"
            ),
            GenerationError::StructuralMismatch { location, reason } => {
                write!(f, "[StructuralMismatch] {location}: {reason}")
            }
            GenerationError::RouteConflict {
                owner,
                path,
                first,
                second,
            } => write!(
                f,
                "[RouteConflict] {owner}: path '{path}' is claimed by both `{first}` and `{second}`"
            ),
            GenerationError::RenderingInconsistency { reason } => {
                write!(f, "[RenderingInconsistency] {reason}")
            }
        }
    }
}

impl std::error::Error for GenerationError {}

/// Result alias used by the generation pipeline.
pub type GenResult<T> = Result<T, GenerationError>;
