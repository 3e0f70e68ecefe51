//! # Introduction
//!
//! plipy translates a subset of PL/I into Python in a single pass. The
//! result is Python source text; running it is a separate, explicit step.
//!
//! ## Translation pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Generator → Python module → (Executor)
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds an AST. Lexical problems
//!    are skipped and reported; the first syntax error aborts.
//! 2. [`codegen`]: renders the AST. Declarations go through the array
//!    padding model in [`codegen::layout`], and blocks are indented by the
//!    structured renderer in [`codegen::writer`].
//! 3. [`translator`]: the [`Translator`] facade tying both together under a
//!    [`TranslatorConfig`].
//! 4. [`exec`]: opt-in execution of a [`GeneratedProgram`] with an external
//!    Python interpreter.
//! 5. [`ui`]: ratatui-based viewer; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! let program = plipy::translate(
//!     "p: proc options(main); dcl x fixed bin(15); x = 5 + 3 * 2; put skip list(x); end p;",
//! )
//! .unwrap();
//! assert!(program.code.contains("x = 5 + 3 * 2"));
//! ```
//!
//! ## Supported PL/I subset
//!
//! Types: `FIXED BIN`, `FIXED DEC`, `CHAR [VARYING]`, one- and
//! two-dimensional arrays. Statements: assignment, `IF/THEN/ELSE`,
//! `DO WHILE`, iterative `DO`, `SELECT`, `PUT SKIP LIST`, `GET LIST`,
//! `OPEN/READ/WRITE/CLOSE FILE`, `EXEC SQL ... INTO`.
//! Built-ins: `SUBSTR`, `INDEX`, `DECIMAL`, `MOD`, `ENDFILE`.

pub mod codegen;
pub mod config;
pub mod error;
pub mod exec;
pub mod parser;
pub mod translator;
pub mod ui;

pub use config::{CredentialResolver, Credentials, TranslatorConfig};
pub use error::{LexDiagnostic, TranslateError};
pub use exec::{ExecError, ExecutionOutput, Executor};
pub use translator::{GeneratedProgram, Translator};

/// Translate `source` with the default configuration
pub fn translate(source: &str) -> Result<GeneratedProgram, TranslateError> {
    Translator::default().translate(source)
}
