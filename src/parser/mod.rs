//! PL/I subset parser
//!
//! This module transforms PL/I source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), split across `declarations`,
//!   `statements` and `expressions`
//! - [`ast`]: AST node definitions
//!
//! # Supported PL/I Subset
//!
//! - One `name: PROC OPTIONS(MAIN);` procedure per source
//! - Types: `FIXED BIN(p)`, `FIXED DEC(p[,q])`, `CHAR(n) [VARYING]`,
//!   with one- and two-dimensional arrays
//! - Statements: assignment, `IF/THEN/ELSE`, `DO WHILE`, iterative `DO`,
//!   `SELECT/WHEN/OTHER`, `PUT SKIP LIST`, `GET LIST`, record I/O and
//!   `EXEC SQL ... INTO`
//! - Built-ins: `SUBSTR`, `INDEX`, `DECIMAL`, `MOD`, `ENDFILE`
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser, one level per precedence tier.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{ParseResult, Parser};
