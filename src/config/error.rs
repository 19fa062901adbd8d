use crate::document::SyntaxError;
use itertools::Itertools;
use std::{fmt, io, path::PathBuf};

use super::sink::Sink;

/// An error when loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("location '{0}' is a directory, not a file")]
    IsDirectory(PathBuf),

    #[error("error parsing document: {0}")]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    #[error("error parsing 'auto_auth': {0}")]
    AutoAuth(#[from] AutoAuthError),
}

impl ConfigError {
    /// The broad category this error falls into.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::IsDirectory(_) => ErrorKind::Io,
            Self::Syntax(_) => ErrorKind::Syntax,
            Self::Schema(_) => ErrorKind::SchemaViolation,
            Self::AutoAuth(e) => e.kind(),
        }
    }
}

/// The broad category of a [`ConfigError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configuration could not be read.
    Io,

    /// The configuration is not a well formed document.
    Syntax,

    /// A block has the wrong cardinality or a field has the wrong type or value.
    SchemaViolation,

    /// A combination of fields is invalid.
    CrossFieldViolation,
}

/// An error when extracting the `auto_auth` block.
#[derive(Debug, thiserror::Error)]
pub enum AutoAuthError {
    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    #[error("error parsing 'method': {0}")]
    Method(SchemaViolation),

    #[error("error parsing 'sink' stanzas: {0}")]
    Sink(SchemaViolation),

    #[error("error parsing 'sink' stanzas: {0}")]
    Sinks(#[from] SinkErrors),
}

impl AutoAuthError {
    /// The broad category this error falls into.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(_) | Self::Method(_) | Self::Sink(_) => ErrorKind::SchemaViolation,
            Self::Sinks(errors) => errors.kind(),
        }
    }
}

/// A schema rule that was violated.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("one and only one '{0}' block is required")]
    ExactlyOneBlock(&'static str),

    #[error("at least one '{0}' block is required")]
    AtLeastOneBlock(&'static str),

    #[error("could not parse '{0}' as an object")]
    NotAnObject(&'static str),

    #[error("no 'method' block found")]
    MissingMethod,

    #[error("at least one 'sink' block must be provided")]
    MissingSinks,

    #[error("'type' must be specified")]
    MissingMethodType,

    #[error("sink type must be specified")]
    MissingSinkType,

    #[error("cannot convert '{field}' to {expected}, found {found}")]
    WrongType { field: &'static str, expected: &'static str, found: &'static str },

    #[error("invalid value '{value}' for '{field}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("invalid duration for '{field}': {reason}")]
    InvalidDuration { field: &'static str, reason: String },
}

/// A rule spanning more than one field that was violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CrossFieldViolation {
    #[error("specifying AAD data without 'dh_type' does not make sense")]
    AadWithoutDh,

    #[error("'dh_type' and 'dh_path' must be specified together")]
    DhIncomplete,
}

/// The reason a single sink failed to be extracted.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SinkErrorKind {
    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    #[error(transparent)]
    CrossField(#[from] CrossFieldViolation),
}

/// An error in a single `sink` block.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("sink.{}: {kind}", .sink_type.as_deref().unwrap_or("<unknown>"))]
pub struct SinkError {
    /// The position of the offending sink among all `sink` blocks.
    pub index: usize,

    /// The sink type, if it could be determined.
    pub sink_type: Option<String>,

    /// What went wrong.
    pub kind: SinkErrorKind,
}

/// Every error found while extracting `sink` blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct SinkErrors {
    errors: Vec<SinkError>,
    parsed: Vec<Sink>,
}

impl SinkErrors {
    pub(crate) fn new(errors: Vec<SinkError>, parsed: Vec<Sink>) -> Self {
        Self { errors, parsed }
    }

    /// Get the errors, in the order in which the failing sinks were declared.
    pub fn errors(&self) -> &[SinkError] {
        &self.errors
    }

    /// Get the sinks that were extracted successfully despite the other ones failing.
    pub fn parsed(&self) -> &[Sink] {
        &self.parsed
    }

    /// The broad category of these errors.
    ///
    /// This is only considered a cross field violation if every individual error is one.
    pub fn kind(&self) -> ErrorKind {
        let all_cross_field = !self.errors.is_empty()
            && self.errors.iter().all(|error| matches!(error.kind, SinkErrorKind::CrossField(_)));
        if all_cross_field {
            ErrorKind::CrossFieldViolation
        } else {
            ErrorKind::SchemaViolation
        }
    }
}

impl fmt::Display for SinkErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [error] => write!(f, "{error}"),
            errors => {
                let listed = errors.iter().map(|error| format!("* {error}")).join("\n\t");
                write!(f, "{} errors occurred:\n\t{listed}", errors.len())
            }
        }
    }
}

impl std::error::Error for SinkErrors {}
