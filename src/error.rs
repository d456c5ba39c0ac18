use thiserror::Error;

/// A location inside the input that an [`AceError`] points at.
///
/// Text input carries both a byte offset and a line/column pair; binary
/// input only ever has a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Position {
    pub fn at_offset(offset: usize) -> Self {
        Self { offset, line: None, column: None }
    }

    pub fn at(offset: usize, line: usize, column: usize) -> Self {
        Self { offset, line: Some(line), column: Some(column) }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => {
                write!(f, "offset {} (line {}, column {})", self.offset, line, col)
            }
            _ => write!(f, "offset {}", self.offset),
        }
    }
}

/// Every failure mode the core can produce, per the error handling design:
/// each kind carries a [`Position`] and a human message, is surfaced to the
/// caller as-is, and is never retried or partially recovered internally.
#[derive(Debug, Error)]
pub enum AceError {
    /// Malformed token in text input.
    #[error("lexical error at {pos}: {msg}")]
    Lexical { pos: Position, msg: String },

    /// Well-formed tokens in a forbidden arrangement.
    #[error("syntax error at {pos}: {msg}")]
    Syntax { pos: Position, msg: String },

    /// CBOR-level failure: truncation, wrong major type, bad UTF-8, unknown
    /// required tag.
    #[error("decode error at {pos}: {msg}")]
    Decode { pos: Position, msg: String },

    /// A value does not fit its declared type.
    #[error("type error at {pos}: {msg}")]
    Type { pos: Position, msg: String },

    /// Unknown namespace, object, or parameter name/enumerator during
    /// mandatory resolution.
    #[error("resolution error at {pos}: {msg}")]
    Resolution { pos: Position, msg: String },

    /// Parameter count does not match the declared signature arity.
    #[error("signature error at {pos}: {msg}")]
    Signature { pos: Position, msg: String },
}

impl AceError {
    pub fn lexical(pos: Position, msg: impl Into<String>) -> Self {
        Self::Lexical { pos, msg: msg.into() }
    }

    pub fn syntax(pos: Position, msg: impl Into<String>) -> Self {
        Self::Syntax { pos, msg: msg.into() }
    }

    pub fn decode(pos: Position, msg: impl Into<String>) -> Self {
        Self::Decode { pos, msg: msg.into() }
    }

    pub fn type_error(pos: Position, msg: impl Into<String>) -> Self {
        Self::Type { pos, msg: msg.into() }
    }

    pub fn resolution(pos: Position, msg: impl Into<String>) -> Self {
        Self::Resolution { pos, msg: msg.into() }
    }

    pub fn signature(pos: Position, msg: impl Into<String>) -> Self {
        Self::Signature { pos, msg: msg.into() }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::Lexical { pos, .. }
            | Self::Syntax { pos, .. }
            | Self::Decode { pos, .. }
            | Self::Type { pos, .. }
            | Self::Resolution { pos, .. }
            | Self::Signature { pos, .. } => *pos,
        }
    }
}

pub type Result<T> = std::result::Result<T, AceError>;
