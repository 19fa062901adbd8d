use std::fmt;

/// An error when parsing a configuration document.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("at line {line}, column {column}: {kind}")]
pub struct SyntaxError {
    /// The 1-based line where the error was found.
    pub line: usize,

    /// The 1-based column where the error was found.
    pub column: usize,

    /// What went wrong.
    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    pub(crate) fn new(position: Position, kind: SyntaxErrorKind) -> Self {
        Self { line: position.line, column: position.column, kind }
    }
}

/// A position within a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    /// The 1-based line.
    pub line: usize,

    /// The 1-based column, counted in characters.
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A kind of syntax error.
#[derive(Clone, Debug, PartialEq)]
pub enum SyntaxErrorKind {
    UnexpectedCharacter(char),
    UnterminatedString,
    UnterminatedComment,
    InvalidEscape(char),
    InvalidUnicodeEscape,
    InvalidNumber(String),
    UnexpectedToken { found: String, expected: &'static str },
    UnexpectedEnd { expected: &'static str },
    MultipleAssignmentKeys,
    NestingTooDeep,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SyntaxErrorKind::*;
        match self {
            UnexpectedCharacter(c) => write!(f, "unexpected character {c:?}"),
            UnterminatedString => write!(f, "unterminated string"),
            UnterminatedComment => write!(f, "unterminated block comment"),
            InvalidEscape(c) => write!(f, "invalid escape sequence '\\{c}'"),
            InvalidUnicodeEscape => write!(f, "invalid unicode escape sequence"),
            InvalidNumber(n) => write!(f, "invalid number '{n}'"),
            UnexpectedToken { found, expected } => write!(f, "expected {expected}, found {found}"),
            UnexpectedEnd { expected } => write!(f, "expected {expected}, found end of input"),
            MultipleAssignmentKeys => write!(f, "an assignment can only have a single key"),
            NestingTooDeep => write!(f, "document is nested too deeply"),
        }
    }
}
