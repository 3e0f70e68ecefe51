//! Statement parsing implementation
//!
//! This module handles parsing of all executable statements:
//!
//! - Assignment: `x = expr;`, `a(i) = expr;`
//! - Control flow: `IF`, `DO WHILE`, iterative `DO`, `SELECT`
//! - Groups: `DO; ... END;`
//! - Stream I/O: `PUT SKIP LIST(...)`, `GET LIST(...)`
//! - Record I/O: `OPEN`, `READ`, `WRITE`, `CLOSE`
//! - Embedded queries: `EXEC SQL "..." INTO v;`
//!
//! # Grammar
//!
//! ```text
//! group     ::= "do" ";" statement* "end" ";" | statement
//! statement ::= assign | if_stmt | do_while | do_loop | select
//!             | put | get | open | read | write | close | exec_sql
//! if_stmt   ::= "if" condition "then" group "else" group
//! do_while  ::= "do" "while" "(" condition ")" ";" statement* "end" ";"
//! do_loop   ::= "do" var "=" expr "to" expr ("by" expr)? ";" statement* "end" ";"
//! select    ::= "select" "(" expr ")" ";" when+ ("other" group)? "end" ";"
//! when      ::= "when" "(" expr ("," expr)* ")" group
//! ```
//!
//! A group is returned as a statement list, so a `DO; ... END;` group used
//! where a single statement is expected is flattened into its parent.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseResult, Parser};

impl Parser {
    /// Parse statements up to (not including) the next `END`
    pub(crate) fn parse_statements_until_end(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(&TokenKind::End) && !self.is_at_end() {
            if self.check(&TokenKind::Dcl) {
                return Err(self.unexpected("Declarations must precede executable statements"));
            }
            statements.extend(self.parse_group()?);
        }

        Ok(statements)
    }

    /// A `DO; ... END;` group or a single statement
    pub(crate) fn parse_group(&mut self) -> ParseResult<Vec<Stmt>> {
        if self.check(&TokenKind::Do) && self.check_ahead(1, &TokenKind::Semicolon) {
            self.advance(); // do
            self.advance(); // ;
            let body = self.parse_statements_until_end()?;
            self.expect_end("group")?;
            return Ok(body);
        }

        Ok(vec![self.parse_statement()?])
    }

    /// Parse a single statement
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let loc = self.current_location();

        if self.match_token(&TokenKind::If) {
            return self.parse_if_statement(loc);
        }

        if self.match_token(&TokenKind::Do) {
            if self.match_token(&TokenKind::While) {
                return self.parse_while_statement(loc);
            }
            return self.parse_do_loop(loc);
        }

        if self.match_token(&TokenKind::Select) {
            return self.parse_select_statement(loc);
        }

        if self.match_token(&TokenKind::Put) {
            return self.parse_put_statement(loc);
        }

        if self.match_token(&TokenKind::Get) {
            return self.parse_get_statement(loc);
        }

        if self.match_token(&TokenKind::Open) {
            let file = self.parse_file_reference()?;
            let mode = if self.match_token(&TokenKind::Input) {
                FileMode::Input
            } else if self.match_token(&TokenKind::Output) {
                FileMode::Output
            } else {
                return Err(self.unexpected("Expected 'input' or 'output' after file"));
            };
            self.expect_semicolon("after 'open'")?;
            return Ok(Stmt::Open {
                file,
                mode,
                location: loc,
            });
        }

        if self.match_token(&TokenKind::Read) {
            let file = self.parse_file_reference()?;
            self.expect_token(&TokenKind::Into, "Expected 'into' after file")?;
            let target = self.parse_parenthesized_var()?;
            self.expect_semicolon("after 'read'")?;
            return Ok(Stmt::Read {
                file,
                target,
                location: loc,
            });
        }

        if self.match_token(&TokenKind::Write) {
            let file = self.parse_file_reference()?;
            self.expect_token(&TokenKind::From, "Expected 'from' after file")?;
            let source = self.parse_parenthesized_var()?;
            self.expect_semicolon("after 'write'")?;
            return Ok(Stmt::Write {
                file,
                source,
                location: loc,
            });
        }

        if self.match_token(&TokenKind::Close) {
            let file = self.parse_file_reference()?;
            self.expect_semicolon("after 'close'")?;
            return Ok(Stmt::Close {
                file,
                location: loc,
            });
        }

        if self.match_token(&TokenKind::Exec) {
            return self.parse_exec_sql(loc);
        }

        if let TokenKind::Ident(_) = self.peek().kind {
            return self.parse_assignment(loc);
        }

        Err(self.unexpected("Expected statement"))
    }

    fn parse_assignment(&mut self, loc: SourceLocation) -> ParseResult<Stmt> {
        let target = self.parse_var_ref()?;
        self.expect_token(&TokenKind::Eq, "Expected '=' in assignment")?;
        let value = self.parse_expression()?;
        self.expect_semicolon("after assignment")?;

        Ok(Stmt::Assign {
            target,
            value,
            location: loc,
        })
    }

    fn parse_if_statement(&mut self, loc: SourceLocation) -> ParseResult<Stmt> {
        let condition = self.parse_condition()?;
        self.expect_token(&TokenKind::Then, "Expected 'then' after condition")?;
        let then_branch = self.parse_group()?;
        self.expect_token(&TokenKind::Else, "Expected 'else' branch")?;
        let else_branch = self.parse_group()?;

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    fn parse_while_statement(&mut self, loc: SourceLocation) -> ParseResult<Stmt> {
        self.expect_lparen("after 'while'")?;
        let condition = self.parse_condition()?;
        self.expect_rparen("after loop condition")?;
        self.expect_semicolon("after 'do while'")?;

        let body = self.parse_statements_until_end()?;
        self.expect_end("'do while'")?;

        Ok(Stmt::While {
            condition,
            body,
            location: loc,
        })
    }

    /// `DO v = start TO end [BY step];` (the `DO` is already consumed)
    fn parse_do_loop(&mut self, loc: SourceLocation) -> ParseResult<Stmt> {
        if !matches!(self.peek().kind, TokenKind::Ident(_)) {
            return Err(self.unexpected("Expected 'while', ';' or a control variable after 'do'"));
        }
        let var = self.parse_var_ref()?;
        self.expect_token(&TokenKind::Eq, "Expected '=' after control variable")?;
        let start = self.parse_expression()?;
        self.expect_token(&TokenKind::To, "Expected 'to' in iterative 'do'")?;
        let end = self.parse_expression()?;
        let step = if self.match_token(&TokenKind::By) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect_semicolon("after iterative 'do'")?;

        let body = self.parse_statements_until_end()?;
        self.expect_end("iterative 'do'")?;

        Ok(Stmt::DoLoop {
            var,
            start,
            end,
            step,
            body,
            location: loc,
        })
    }

    fn parse_select_statement(&mut self, loc: SourceLocation) -> ParseResult<Stmt> {
        self.expect_lparen("after 'select'")?;
        let subject = self.parse_expression()?;
        self.expect_rparen("after select subject")?;
        self.expect_semicolon("after 'select'")?;

        let mut whens = Vec::new();
        while self.check(&TokenKind::When) {
            let when_loc = self.current_location();
            self.advance();

            self.expect_lparen("after 'when'")?;
            let mut values = vec![self.parse_expression()?];
            while self.match_token(&TokenKind::Comma) {
                values.push(self.parse_expression()?);
            }
            self.expect_rparen("after 'when' values")?;

            let body = self.parse_group()?;
            whens.push(WhenClause {
                values,
                body,
                location: when_loc,
            });
        }

        if whens.is_empty() {
            return Err(self.unexpected("Expected at least one 'when' in 'select'"));
        }

        let other = if self.match_token(&TokenKind::Other) {
            Some(self.parse_group()?)
        } else {
            None
        };

        if self.check(&TokenKind::When) {
            return Err(self.unexpected("'when' must precede 'other'"));
        }
        self.expect_end("'select'")?;

        Ok(Stmt::Select {
            subject,
            whens,
            other,
            location: loc,
        })
    }

    /// `PUT [SKIP] LIST(e, ...);` or `PUT SKIP;`
    fn parse_put_statement(&mut self, loc: SourceLocation) -> ParseResult<Stmt> {
        let skip = self.match_token(&TokenKind::Skip);

        let mut items = Vec::new();
        if self.match_token(&TokenKind::List) {
            self.expect_lparen("after 'list'")?;
            items.push(self.parse_expression()?);
            while self.match_token(&TokenKind::Comma) {
                items.push(self.parse_expression()?);
            }
            self.expect_rparen("after 'list' items")?;
        } else if !skip {
            return Err(self.unexpected("Expected 'skip' or 'list' after 'put'"));
        }
        self.expect_semicolon("after 'put'")?;

        Ok(Stmt::Put {
            items,
            location: loc,
        })
    }

    fn parse_get_statement(&mut self, loc: SourceLocation) -> ParseResult<Stmt> {
        self.expect_token(&TokenKind::List, "Expected 'list' after 'get'")?;
        self.expect_lparen("after 'list'")?;
        let mut targets = vec![self.parse_var_ref()?];
        while self.match_token(&TokenKind::Comma) {
            targets.push(self.parse_var_ref()?);
        }
        self.expect_rparen("after 'get' targets")?;
        self.expect_semicolon("after 'get'")?;

        Ok(Stmt::Get {
            targets,
            location: loc,
        })
    }

    /// `EXEC SQL "query" INTO [:]v;` (the `EXEC` is already consumed)
    fn parse_exec_sql(&mut self, loc: SourceLocation) -> ParseResult<Stmt> {
        self.expect_token(&TokenKind::Sql, "Expected 'sql' after 'exec'")?;

        let sql = match &self.peek().kind {
            TokenKind::QueryText(text) => text.clone(),
            _ => return Err(self.unexpected("Expected double-quoted query text")),
        };
        self.advance();

        self.expect_token(&TokenKind::Into, "Expected 'into' after query")?;
        self.match_token(&TokenKind::Colon); // host-variable prefix
        let target = self.parse_var_ref()?;
        self.expect_semicolon("after 'exec sql'")?;

        Ok(Stmt::Query {
            sql,
            target,
            location: loc,
        })
    }

    /// `(v)` as used by READ INTO and WRITE FROM
    fn parse_parenthesized_var(&mut self) -> ParseResult<VarRef> {
        self.expect_lparen("before variable")?;
        let var = self.parse_var_ref()?;
        self.expect_rparen("after variable")?;
        Ok(var)
    }

    fn expect_end(&mut self, construct: &str) -> ParseResult<()> {
        self.expect_token(&TokenKind::End, &format!("Expected 'end' to close {construct}"))?;
        self.expect_semicolon("after 'end'")
    }
}
