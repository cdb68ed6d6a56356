//! Errors produced while decoding MI output.

use thiserror::Error;

/// Ways an MI line can fail to decode.
///
/// Columns are zero-based byte offsets into the line that was being parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MiError
{
    /// The line ended in the middle of a value.
    #[error("Unexpected end of input at column {column}")]
    UnexpectedEnd
    {
        /// Where the input ran out
        column: usize,
    },

    /// A byte that cannot start or continue the current production.
    #[error("Unexpected character '{found}' at column {column}, expected {expected}")]
    UnexpectedChar
    {
        /// The offending character
        found: char,
        /// Where it was found
        column: usize,
        /// What the parser was looking for
        expected: &'static str,
    },

    /// A backslash escape MI does not define.
    #[error("Invalid escape sequence '\\{0}' in c-string")]
    InvalidEscape(char),

    /// A result record with a class other than done/running/connected/error/exit.
    #[error("Unknown result class: {0}")]
    UnknownResultClass(String),

    /// A line that does not look like any MI output record.
    #[error("Unrecognized MI record: {0}")]
    UnrecognizedRecord(String),

    /// A result record is missing a field the caller relies on.
    #[error("Missing field '{0}' in result record")]
    MissingField(String),

    /// A field is present but holds the wrong kind of value.
    #[error("Field '{field}' has unexpected shape, expected {expected}")]
    UnexpectedShape
    {
        /// Name of the field
        field: String,
        /// Shape the caller needed
        expected: &'static str,
    },

    /// A register value refers to a number outside the register name list.
    #[error("Register number {number} is outside the name list of {registers} registers")]
    RegisterOutOfRange
    {
        /// Number reported by the backend
        number: usize,
        /// Length of the name list it should index into
        registers: usize,
    },
}

/// Convenience alias for `Result<T, MiError>`.
pub type MiResult<T> = std::result::Result<T, MiError>;
