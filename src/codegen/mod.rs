//! Python code generation
//!
//! The [`Generator`] walks a parsed [`Program`] once and renders it through
//! the block renderer in [`writer`]:
//!
//! - [`layout`]: declared storage and initializers (the array padding model)
//! - [`expressions`]: expressions, conditions and variable references
//! - [`statements`]: statements and nested blocks
//! - [`runtime`]: support helpers emitted ahead of the procedure
//!
//! Output shape:
//!
//! ```text
//! # Generated by plipy <version> from PL/I procedure 'name'
//!
//! <support helpers, only those used>
//!
//! def name():
//!     <declarations>
//!     <statements>
//!
//!
//! if __name__ == '__main__':
//!     name()
//! ```

mod expressions;
pub mod layout;
pub mod runtime;
mod statements;
pub mod writer;

use std::sync::LazyLock;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::TranslatorConfig;
use crate::error::TranslateError;
use crate::parser::ast::Program;
use layout::Symbol;
use runtime::RuntimeNeeds;
use writer::Fragment;

/// Python keywords plus the builtins and modules generated code relies on
static RESERVED: LazyLock<FxHashSet<&'static str>> = LazyLock::new(|| {
    [
        // keywords
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
        "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
        "try", "while", "with", "yield", "match", "case",
        // builtins and modules used by generated code
        "print", "str", "int", "input", "range", "open", "len", "sys", "os", "mysql",
    ]
    .into_iter()
    .collect()
});

/// Map a PL/I identifier to a Python identifier.
///
/// Names that would shadow Python keywords or builtins, or that could clash
/// with generated `_pli_` names, get a trailing underscore. Names already
/// ending in `_` get one more, which keeps the mapping one-to-one.
pub fn python_name(name: &str) -> String {
    if RESERVED.contains(name) || name.starts_with('_') || name.ends_with('_') {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Per-translation code generation state
pub struct Generator<'a> {
    config: &'a TranslatorConfig,
    symbols: FxHashMap<String, Symbol>,
    needs: RuntimeNeeds,
    temporaries: usize,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a TranslatorConfig) -> Self {
        Self {
            config,
            symbols: FxHashMap::default(),
            needs: RuntimeNeeds::default(),
            temporaries: 0,
        }
    }

    /// Render `program` as a complete Python module
    pub fn generate(mut self, program: &Program) -> Result<String, TranslateError> {
        let mut body = self.declare(program)?;
        body.append(self.render_block(&program.statements)?);

        let procedure = python_name(&program.name);
        let mut unit = Fragment::new();
        unit.nest(format!("def {}():", procedure), body);
        unit.blank();
        unit.blank();
        unit.nest(
            "if __name__ == '__main__':",
            Fragment::line(format!("{}()", procedure)),
        );

        let mut code = format!(
            "# Generated by plipy {} from PL/I procedure '{}'\n\n",
            env!("CARGO_PKG_VERSION"),
            program.name
        );
        let support = runtime::support_code(self.needs, self.config.credentials.as_ref());
        if !support.is_empty() {
            code.push_str(&support);
            code.push_str("\n\n");
        }
        code.push_str(&unit.render(self.config.indent_width));

        tracing::debug!(
            procedure = %program.name,
            symbols = self.symbols.len(),
            helpers = ?self.needs,
            "generated python module"
        );

        Ok(code)
    }

    /// Record every declared name and emit its initializer
    fn declare(&mut self, program: &Program) -> Result<Fragment, TranslateError> {
        let mut fragment = Fragment::new();

        for declaration in &program.declarations {
            for item in &declaration.items {
                let symbol = Symbol::from_item(item, &declaration.data_type)?;
                if let Some(previous) = self.symbols.get(&symbol.name) {
                    return Err(TranslateError::declaration(
                        format!(
                            "'{}' is already declared at line {}",
                            symbol.name, previous.location.line
                        ),
                        item.location,
                    ));
                }

                fragment.push(format!(
                    "{} = {}",
                    python_name(&symbol.name),
                    symbol.initializer()
                ));
                self.symbols.insert(symbol.name.clone(), symbol);
            }
        }

        Ok(fragment)
    }

    pub(crate) fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// A fresh `_pli_<role><n>` name for a hoisted value
    pub(crate) fn temporary(&mut self, role: &str) -> String {
        self.temporaries += 1;
        format!("_pli_{}{}", role, self.temporaries)
    }
}
