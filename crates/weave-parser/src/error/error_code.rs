//! Error codes for Weave diagnostics.
//!
//! - `E0xx` - Lexer errors
//! - `E1xx` - Grammar errors

use std::fmt;

/// Stable codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Unterminated string literal.
    ///
    /// A string was opened with `"` but the line ended before it was closed.
    E001,

    /// Unexpected character.
    ///
    /// The character cannot start any token (e.g. `%` or `;`).
    E002,

    /// Invalid escape sequence.
    ///
    /// Valid escapes are: `\n`, `\r`, `\t`, `\b`, `\f`, `\\`, `\/`, `\'`, `\"`, `\0`, `\u{...}`.
    E003,

    /// Invalid unicode escape format; must be `\u{XXXX}` with 1-6 hex digits.
    E004,

    /// Unicode escape names a surrogate or out-of-range codepoint.
    E005,

    /// Empty unicode escape `\u{}`.
    E006,

    /// Unexpected token.
    ///
    /// The grammar could not match the token at this position. This is the
    /// first unmatched position of the document.
    E100,

    /// Incomplete input.
    ///
    /// The document ended before the current definition was complete.
    E101,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E006 => "E006",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
        }
    }

    /// Returns a short description, used as the default label text.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "invalid unicode escape",
            ErrorCode::E005 => "invalid unicode codepoint",
            ErrorCode::E006 => "empty unicode escape",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
        }
    }

    /// Returns `true` for codes raised by the lexer.
    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            ErrorCode::E001
                | ErrorCode::E002
                | ErrorCode::E003
                | ErrorCode::E004
                | ErrorCode::E005
                | ErrorCode::E006
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E101.to_string(), "E101");
    }

    #[test]
    fn test_description() {
        assert_eq!(ErrorCode::E002.description(), "unexpected character");
        assert_eq!(ErrorCode::E100.description(), "unexpected token");
    }

    #[test]
    fn test_is_lexical() {
        assert!(ErrorCode::E006.is_lexical());
        assert!(!ErrorCode::E100.is_lexical());
    }
}
