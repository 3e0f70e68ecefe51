//! Translation facade: source text in, Python module out

use crate::codegen::Generator;
use crate::config::TranslatorConfig;
use crate::error::{LexDiagnostic, TranslateError};
use crate::parser::Parser;

/// A translated program. Holding one never runs anything; see
/// [`crate::exec::Executor`] for that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProgram {
    /// Procedure name as written in the source (lower-cased)
    pub name: String,
    /// Complete Python module text
    pub code: String,
    /// Lexical problems that were skipped over
    pub diagnostics: Vec<LexDiagnostic>,
}

/// Translates PL/I source with a fixed configuration.
///
/// A translator holds no per-run state, so one instance may be shared and
/// reused across any number of translations.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate `source`. The first syntax, declaration or subscript error
    /// aborts the translation and no code is returned.
    pub fn translate(&self, source: &str) -> Result<GeneratedProgram, TranslateError> {
        // Lexical problems are logged by the lexer as they are found
        let mut parser = Parser::new(source);
        let program = parser.parse_program()?;
        tracing::debug!(
            procedure = %program.name,
            declarations = program.declarations.len(),
            statements = program.statements.len(),
            "parsed procedure"
        );

        let code = Generator::new(&self.config).generate(&program)?;

        Ok(GeneratedProgram {
            name: program.name,
            code,
            diagnostics: parser.take_diagnostics(),
        })
    }
}
