//! Error types shared by the translation pipeline
//!
//! Translation is all-or-nothing: the first [`TranslateError`] aborts and no
//! partial output is produced. Lexical problems are different; they are
//! collected as [`LexDiagnostic`]s and never stop the lexer.

use crate::parser::ast::SourceLocation;

/// A recoverable lexical problem (the offending input was skipped)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Lexical error at line {}, column {}: {message}", location.line, location.column)]
pub struct LexDiagnostic {
    pub message: String,
    pub location: SourceLocation,
}

/// Fatal translation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    /// The token stream does not match the grammar
    #[error("Syntax error at line {}, column {}: {message}", location.line, location.column)]
    Syntax {
        message: String,
        location: SourceLocation,
    },

    /// Unsupported attribute combination or array shape in a DCL
    #[error("Declaration error at line {}, column {}: {message}", location.line, location.column)]
    Declaration {
        message: String,
        location: SourceLocation,
    },

    /// A declared variable referenced with the wrong number of subscripts
    #[error("Subscript error at line {}, column {}: {message}", location.line, location.column)]
    Subscript {
        message: String,
        location: SourceLocation,
    },
}

impl TranslateError {
    pub fn location(&self) -> SourceLocation {
        match self {
            TranslateError::Syntax { location, .. }
            | TranslateError::Declaration { location, .. }
            | TranslateError::Subscript { location, .. } => *location,
        }
    }

    pub(crate) fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        TranslateError::Syntax {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn declaration(message: impl Into<String>, location: SourceLocation) -> Self {
        TranslateError::Declaration {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn subscript(message: impl Into<String>, location: SourceLocation) -> Self {
        TranslateError::Subscript {
            message: message.into(),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let err = TranslateError::syntax("Expected ';'", SourceLocation::new(3, 7));
        assert_eq!(
            err.to_string(),
            "Syntax error at line 3, column 7: Expected ';'"
        );
        assert_eq!(err.location(), SourceLocation::new(3, 7));
    }

    #[test]
    fn test_lex_diagnostic_display() {
        let diag = LexDiagnostic {
            message: "Illegal character '@'".to_string(),
            location: SourceLocation::new(1, 4),
        };
        assert_eq!(
            diag.to_string(),
            "Lexical error at line 1, column 4: Illegal character '@'"
        );
    }
}
