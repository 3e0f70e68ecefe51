//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! token-cursor helpers and the program entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: procedure header and `DCL` statements
//! - `statements`: assignments, control flow, and I/O statements
//! - `expressions`: expressions with precedence climbing, and conditions
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! The first syntax error aborts the parse; there is no recovery.

use crate::error::{LexDiagnostic, TranslateError};
use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token, TokenKind};

pub type ParseResult<T> = Result<T, TranslateError>;

/// Recursive descent parser for the PL/I subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    diagnostics: Vec<LexDiagnostic>,
}

impl Parser {
    /// Tokenize `source` and prepare to parse it. Lexical problems are
    /// recorded, never fatal.
    pub fn new(source: &str) -> Self {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();
        Self {
            tokens,
            position: 0,
            diagnostics: lexer.into_diagnostics(),
        }
    }

    /// Lexical diagnostics gathered while tokenizing
    pub fn diagnostics(&self) -> &[LexDiagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<LexDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Parse `name: PROC OPTIONS(MAIN); declarations statements END [name];`
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let (name, location) = self.parse_procedure_header()?;

        let mut declarations = Vec::new();
        while self.check(&TokenKind::Dcl) {
            declarations.push(self.parse_declaration()?);
        }

        let statements = self.parse_statements_until_end()?;

        self.expect_token(&TokenKind::End, "Expected 'end' to close the procedure")?;
        if !self.check(&TokenKind::Semicolon) {
            let end_loc = self.current_location();
            let label = self.expect_name()?;
            if label != name {
                return Err(TranslateError::syntax(
                    format!(
                        "END label '{}' does not match procedure '{}'",
                        label, name
                    ),
                    end_loc,
                ));
            }
        }
        self.expect_semicolon("after procedure 'end'")?;

        if !self.is_at_end() {
            return Err(self.unexpected("Expected end of input after the procedure"));
        }

        Ok(Program {
            name,
            declarations,
            statements,
            location,
        })
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn check_ahead(&self, n: usize, kind: &TokenKind) -> bool {
        self.peek_ahead(n)
            .is_some_and(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(kind))
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    /// Syntax error naming the current token
    pub(crate) fn unexpected(&self, message: &str) -> TranslateError {
        TranslateError::syntax(
            format!("{}, found {}", message, self.peek()),
            self.current_location(),
        )
    }

    pub(crate) fn expect_token(&mut self, kind: &TokenKind, message: &str) -> ParseResult<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(message))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> ParseResult<()> {
        self.expect_token(&TokenKind::LParen, &format!("Expected '(' {ctx}"))
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> ParseResult<()> {
        self.expect_token(&TokenKind::RParen, &format!("Expected ')' {ctx}"))
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> ParseResult<()> {
        self.expect_token(&TokenKind::Semicolon, &format!("Expected ';' {ctx}"))
    }

    pub(crate) fn expect_identifier(&mut self) -> ParseResult<String> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("Expected identifier"))
        }
    }

    /// Procedure labels may reuse keyword spellings (`main: proc ...`)
    pub(crate) fn expect_name(&mut self) -> ParseResult<String> {
        let token = self.peek();
        let name = match &token.kind {
            TokenKind::Ident(name) => name.clone(),
            _ if token.is_keyword() => token.lexeme.to_ascii_lowercase(),
            _ => return Err(self.unexpected("Expected a name")),
        };
        self.advance();
        Ok(name)
    }

    pub(crate) fn expect_number(&mut self) -> ParseResult<i64> {
        if let TokenKind::Number(n) = self.peek().kind {
            self.advance();
            Ok(n)
        } else {
            Err(self.unexpected("Expected integer constant"))
        }
    }

    /// `FILE('name')` as used by OPEN/READ/WRITE/CLOSE
    pub(crate) fn parse_file_reference(&mut self) -> ParseResult<String> {
        self.expect_token(&TokenKind::File, "Expected 'file'")?;
        self.expect_lparen("after 'file'")?;
        let name = self.expect_file_name()?;
        self.expect_rparen("after file name")?;
        Ok(name)
    }

    pub(crate) fn expect_file_name(&mut self) -> ParseResult<String> {
        let location = self.current_location();
        let name = match &self.peek().kind {
            TokenKind::CharConst(text) => text.trim().to_string(),
            _ => return Err(self.unexpected("Expected quoted file name")),
        };
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(TranslateError::syntax(
                format!("Invalid file name '{}'", name),
                location,
            ));
        }
        self.advance();
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_program() {
        let mut parser = Parser::new("p: proc options(main); end p;");
        let program = parser.parse_program().unwrap();

        assert_eq!(program.name, "p");
        assert!(program.declarations.is_empty());
        assert!(program.statements.is_empty());
    }

    #[test]
    fn test_end_label_is_optional() {
        let mut parser = Parser::new("Demo: procedure options(main); end;");
        let program = parser.parse_program().unwrap();
        assert_eq!(program.name, "demo");
    }

    #[test]
    fn test_end_label_must_match() {
        let mut parser = Parser::new("p: proc options(main); end q;");
        let err = parser.parse_program().unwrap_err();
        assert!(err.to_string().contains("does not match procedure 'p'"));
    }

    #[test]
    fn test_keyword_as_procedure_name() {
        let mut parser = Parser::new("main: proc options(main); end main;");
        assert_eq!(parser.parse_program().unwrap().name, "main");
    }

    #[test]
    fn test_error_names_offending_token() {
        let mut parser = Parser::new("p: proc options(main); x = 1 end p;");
        let err = parser.parse_program().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("found keyword 'end'"), "{}", message);
        assert_eq!(err.location().line, 1);
    }

    #[test]
    fn test_error_at_end_of_input() {
        let mut parser = Parser::new("p: proc options(main); x = 1;");
        let err = parser.parse_program().unwrap_err();
        assert!(err.to_string().contains("found end of input"));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let mut parser = Parser::new("p: proc options(main); end p; x = 1;");
        assert!(parser.parse_program().is_err());
    }

    #[test]
    fn test_lexical_diagnostics_are_kept() {
        let mut parser = Parser::new("p: proc options(main); @ end p;");
        assert!(parser.parse_program().is_ok());
        assert_eq!(parser.diagnostics().len(), 1);
    }
}
