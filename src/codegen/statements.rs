//! Statement rendering
//!
//! Each statement renders into its own [`Fragment`]; compound statements
//! render their bodies first and nest them, so indentation follows the
//! tree with no textual post-pass.

use super::expressions::{literal_int, ValueKind};
use super::runtime::python_string;
use super::writer::Fragment;
use super::Generator;
use crate::error::TranslateError;
use crate::parser::ast::*;

type RenderResult = Result<Fragment, TranslateError>;

impl Generator<'_> {
    /// Render a statement list (an empty list renders as nothing; the
    /// enclosing [`Fragment::nest`] supplies `pass`)
    pub(crate) fn render_block(&mut self, statements: &[Stmt]) -> RenderResult {
        let mut block = Fragment::new();
        for statement in statements {
            block.append(self.render_statement(statement)?);
        }
        Ok(block)
    }

    fn render_statement(&mut self, statement: &Stmt) -> RenderResult {
        match statement {
            Stmt::Assign { target, value, .. } => self.render_assignment(target, value),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.render_if(condition, then_branch, else_branch),

            Stmt::While {
                condition, body, ..
            } => {
                let header = format!("while {}:", self.render_condition(condition)?);
                let mut fragment = Fragment::new();
                fragment.nest(header, self.render_block(body)?);
                Ok(fragment)
            }

            Stmt::DoLoop {
                var,
                start,
                end,
                step,
                body,
                ..
            } => self.render_do_loop(var, start, end, step.as_ref(), body),

            Stmt::Select {
                subject,
                whens,
                other,
                ..
            } => self.render_select(subject, whens, other.as_deref()),

            Stmt::Put { items, .. } => {
                let items = items
                    .iter()
                    .map(|item| self.render_expr(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Fragment::line(format!("print({})", items.join(", "))))
            }

            Stmt::Get { targets, .. } => {
                self.needs.get = true;
                let mut fragment = Fragment::new();
                for target in targets {
                    fragment.push(format!(
                        "{} = _pli_get({})",
                        self.render_var_ref(target)?,
                        python_string(&target.name)
                    ));
                }
                Ok(fragment)
            }

            Stmt::Open { file, mode, .. } => {
                self.needs.files = true;
                let mode = match mode {
                    FileMode::Input => "'r'",
                    FileMode::Output => "'w'",
                };
                Ok(Fragment::line(format!(
                    "_pli_open({}, {})",
                    python_string(file),
                    mode
                )))
            }

            Stmt::Read { file, target, .. } => {
                self.needs.files = true;
                Ok(Fragment::line(format!(
                    "{} = _pli_read({})",
                    self.render_var_ref(target)?,
                    python_string(file)
                )))
            }

            Stmt::Write { file, source, .. } => {
                self.needs.files = true;
                Ok(Fragment::line(format!(
                    "_pli_write({}, {})",
                    python_string(file),
                    self.render_var_ref(source)?
                )))
            }

            Stmt::Close { file, .. } => {
                self.needs.files = true;
                Ok(Fragment::line(format!("_pli_close({})", python_string(file))))
            }

            Stmt::Query { sql, target, .. } => {
                self.needs.sql = true;
                Ok(Fragment::line(format!(
                    "{} = _pli_sql({})",
                    self.render_var_ref(target)?,
                    python_string(sql)
                )))
            }
        }
    }

    /// `target = value`, truncating toward zero when a quotient is stored
    /// into an integer variable
    fn render_assignment(&mut self, target: &VarRef, value: &Expr) -> RenderResult {
        let target_text = self.render_var_ref(target)?;
        let mut value_text = self.render_expr(value)?;

        if self.var_kind(target) == ValueKind::Integer && self.kind_of(value) == ValueKind::Decimal
        {
            value_text = format!("int({})", value_text);
        }

        Ok(Fragment::line(format!("{} = {}", target_text, value_text)))
    }

    /// Both branches are always present. An ELSE holding a single IF
    /// continues the chain as `elif`.
    fn render_if(
        &mut self,
        condition: &Condition,
        then_branch: &[Stmt],
        else_branch: &[Stmt],
    ) -> RenderResult {
        let mut fragment = Fragment::new();
        let header = format!("if {}:", self.render_condition(condition)?);
        fragment.nest(header, self.render_block(then_branch)?);

        let mut rest = else_branch;
        loop {
            match rest {
                [Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                    ..
                }] => {
                    let header = format!("elif {}:", self.render_condition(condition)?);
                    fragment.nest(header, self.render_block(then_branch)?);
                    rest = else_branch;
                }
                _ => {
                    fragment.nest("else:", self.render_block(rest)?);
                    break;
                }
            }
        }

        Ok(fragment)
    }

    /// `DO v = start TO end [BY step]` as a pre-test loop.
    ///
    /// Bounds that are not literals are evaluated once, before the loop,
    /// into `_pli_` temporaries. The direction test follows the sign of the
    /// step: fixed when the step is a literal, checked at run time otherwise.
    fn render_do_loop(
        &mut self,
        var: &VarRef,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &[Stmt],
    ) -> RenderResult {
        let mut fragment = Fragment::new();
        let var_text = self.render_var_ref(var)?;
        fragment.push(format!("{} = {}", var_text, self.render_expr(start)?));

        let limit = self.hoisted(end, "to", &mut fragment)?;

        let (test, increment) = match step {
            None => (format!("{} <= {}", var_text, limit), format!("{} += 1", var_text)),
            Some(step) => match literal_int(step) {
                Some(k) if k < 0 => (
                    format!("{} >= {}", var_text, limit),
                    format!("{} -= {}", var_text, k.unsigned_abs()),
                ),
                Some(k) => (
                    format!("{} <= {}", var_text, limit),
                    format!("{} += {}", var_text, k),
                ),
                None => {
                    let by = self.hoisted(step, "by", &mut fragment)?;
                    (
                        format!(
                            "({v} <= {limit} if {by} >= 0 else {v} >= {limit})",
                            v = var_text,
                        ),
                        format!("{} += {}", var_text, by),
                    )
                }
            },
        };

        let mut loop_body = self.render_block(body)?;
        loop_body.push(increment);
        fragment.nest(format!("while {}:", test), loop_body);

        Ok(fragment)
    }

    /// Literal bounds render inline; anything else is stored in a fresh
    /// temporary assigned in `fragment`
    fn hoisted(&mut self, expr: &Expr, role: &str, fragment: &mut Fragment) -> Result<String, TranslateError> {
        let rendered = self.render_expr(expr)?;
        if literal_int(expr).is_some() {
            return Ok(rendered);
        }

        let temporary = self.temporary(role);
        fragment.push(format!("{} = {}", temporary, rendered));
        Ok(temporary)
    }

    /// SELECT as an `if/elif/else` equality chain; first match wins and a
    /// missing OTHER leaves no `else`
    fn render_select(
        &mut self,
        subject: &Expr,
        whens: &[WhenClause],
        other: Option<&[Stmt]>,
    ) -> RenderResult {
        let subject = self.render_expr(subject)?;
        let mut fragment = Fragment::new();

        for (index, when) in whens.iter().enumerate() {
            let values = when
                .values
                .iter()
                .map(|value| self.render_expr(value))
                .collect::<Result<Vec<_>, _>>()?;

            let test = match values.as_slice() {
                [single] => format!("{} == {}", subject, single),
                _ => format!("{} in ({})", subject, values.join(", ")),
            };
            let keyword = if index == 0 { "if" } else { "elif" };
            fragment.nest(format!("{} {}:", keyword, test), self.render_block(&when.body)?);
        }

        if let Some(other) = other {
            fragment.nest("else:", self.render_block(other)?);
        }

        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::TranslatorConfig;
    use crate::error::TranslateError;
    use crate::translate;
    use crate::Translator;

    /// The translated procedure body, dedented by one level
    fn body(decls_and_statements: &str) -> String {
        let source = format!("p: proc options(main); {} end p;", decls_and_statements);
        let code = translate(&source).unwrap().code;
        let start = code.find("def p():\n").unwrap() + "def p():\n".len();
        let end = code.find("\n\n\nif __name__").unwrap();
        code[start..end]
            .lines()
            .map(|line| line.strip_prefix("    ").unwrap_or(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_if_else_and_elif_chain() {
        assert_eq!(
            body("if x = 1 then y = 1; else if x = 2 then y = 2; else y = 3;"),
            "if x == 1:\n    y = 1\nelif x == 2:\n    y = 2\nelse:\n    y = 3"
        );
    }

    #[test]
    fn test_nested_groups_indent() {
        assert_eq!(
            body("do while (i < 3); if i <> 1 then do; put skip list(i); end; else do; end; i = i + 1; end;"),
            "while i < 3:\n    if i != 1:\n        print(i)\n    else:\n        pass\n    i = i + 1"
        );
    }

    #[test]
    fn test_iterative_do_with_literal_bounds() {
        assert_eq!(
            body("do i = 1 to 3; put skip list(i); end;"),
            "i = 1\nwhile i <= 3:\n    print(i)\n    i += 1"
        );
        assert_eq!(
            body("do i = 10 to 1 by -2; end;"),
            "i = 10\nwhile i >= 1:\n    i -= 2"
        );
    }

    #[test]
    fn test_iterative_do_hoists_bounds() {
        assert_eq!(
            body("do i = 1 to n by k; end;"),
            "i = 1\n_pli_to1 = n\n_pli_by2 = k\n\
             while (i <= _pli_to1 if _pli_by2 >= 0 else i >= _pli_to1):\n    i += _pli_by2"
        );
    }

    #[test]
    fn test_select_chain() {
        assert_eq!(
            body("select (c); when (1) x = 1; when (2, 3) x = 2; other x = 0; end;"),
            "if c == 1:\n    x = 1\nelif c in (2, 3):\n    x = 2\nelse:\n    x = 0"
        );
        assert_eq!(
            body("select (c); when ('a') do; end; end;"),
            "if c == 'a':\n    pass"
        );
    }

    #[test]
    fn test_quotient_truncated_for_integer_target() {
        assert_eq!(
            body("dcl (x, y) fixed bin(31); dcl r fixed dec(7,2); x = y / 2; r = y / 2;"),
            "x = 0\ny = 0\nr = 0\nx = int(y / 2)\nr = y / 2"
        );
    }

    #[test]
    fn test_io_statements() {
        assert_eq!(
            body("dcl line char(80) varying; open file('in') input; read file('in') into (line); \
                  write file('in') from (line); close file('in'); get list(line); \
                  exec sql \"SELECT 1\" into line; put skip;"),
            "line = ''\n_pli_open('in', 'r')\nline = _pli_read('in')\n_pli_write('in', line)\n\
             _pli_close('in')\nline = _pli_get('line')\nline = _pli_sql('SELECT 1')\nprint()"
        );
    }

    #[test]
    fn test_indent_width_applies_to_body() {
        let config = TranslatorConfig::new().with_indent_width(2).unwrap();
        let code = Translator::new(config)
            .translate("p: proc options(main); if a = 1 then b = 1; else b = 2; end p;")
            .unwrap()
            .code;
        assert!(code.contains("def p():\n  if a == 1:\n    b = 1\n  else:\n    b = 2\n"));
    }

    #[test]
    fn test_subscript_error_in_statement() {
        let err = translate("p: proc options(main); dcl a(5) fixed bin; a = 1; end p;").unwrap_err();
        assert!(matches!(err, TranslateError::Subscript { .. }));
    }
}
