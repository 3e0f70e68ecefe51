//! Expression rendering
//!
//! Every rendered expression carries the Python precedence level of its
//! outermost operator. A child is parenthesised only when its level is
//! lower than its parent's, or equal on the right-hand side, so the Python
//! text groups exactly like the tree did.
//!
//! Values also carry a static [`ValueKind`] guess taken from declarations.
//! It decides where `str()` is needed for `||` and where an assignment to
//! an integer variable must truncate a quotient.

use super::python_name;
use super::runtime::python_string;
use super::Generator;
use crate::error::TranslateError;
use crate::parser::ast::*;

/// Python precedence levels used by generated code, loosest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Prec {
    Additive,
    Multiplicative,
    Unary,
    Atom,
}

#[derive(Debug, Clone)]
pub(crate) struct Rendered {
    pub text: String,
    pub prec: Prec,
}

impl Rendered {
    fn atom(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prec: Prec::Atom,
        }
    }

    /// Text usable where an operand of level `prec` is expected
    fn wrapped(self, prec: Prec, right: bool) -> String {
        if self.prec < prec || (right && self.prec == prec) {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

fn binary(left: Rendered, symbol: &str, right: Rendered, prec: Prec) -> Rendered {
    Rendered {
        text: format!(
            "{} {} {}",
            left.wrapped(prec, false),
            symbol,
            right.wrapped(prec, true)
        ),
        prec,
    }
}

/// Static value classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Integer,
    Decimal,
    Text,
    Unknown,
}

impl ValueKind {
    fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Decimal)
    }

    fn of_type(data_type: &DataType) -> Self {
        match data_type {
            DataType::FixedBinary { .. } => ValueKind::Integer,
            DataType::FixedDecimal { scale, .. } if scale.unwrap_or(0) > 0 => ValueKind::Decimal,
            DataType::FixedDecimal { .. } => ValueKind::Integer,
            DataType::Character { .. } => ValueKind::Text,
        }
    }

    /// Result of arithmetic on two operands
    fn arithmetic(left: Self, right: Self) -> Self {
        match (left, right) {
            (ValueKind::Integer, ValueKind::Integer) => ValueKind::Integer,
            (l, r) if l.is_numeric() && r.is_numeric() => ValueKind::Decimal,
            _ => ValueKind::Unknown,
        }
    }
}

/// Integer value of a literal, looking through unary minus
pub(crate) fn literal_int(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Number(n, _) => Some(*n),
        Expr::Unary {
            op: UnOp::Neg,
            operand,
            ..
        } => literal_int(operand).and_then(i64::checked_neg),
        _ => None,
    }
}

/// Expressions whose Python value is always a `str`
fn is_text_literal(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Text(..)
            | Expr::Binary {
                op: BinOp::Concat,
                ..
            }
            | Expr::Call {
                builtin: Builtin::Substr | Builtin::Decimal,
                ..
            }
    )
}

fn relational_symbol(op: RelOp) -> &'static str {
    match op {
        RelOp::Eq => "==",
        RelOp::Ne => "!=",
        RelOp::Lt => "<",
        RelOp::Le => "<=",
        RelOp::Gt => ">",
        RelOp::Ge => ">=",
    }
}

impl Generator<'_> {
    /// Render an expression for a context that needs no grouping
    pub(crate) fn render_expr(&mut self, expr: &Expr) -> Result<String, TranslateError> {
        Ok(self.render(expr)?.text)
    }

    /// Render `left op right`. Python comparisons bind looser than every
    /// arithmetic operator, so no parentheses are needed.
    pub(crate) fn render_condition(
        &mut self,
        condition: &Condition,
    ) -> Result<String, TranslateError> {
        Ok(format!(
            "{} {} {}",
            self.render_expr(&condition.left)?,
            relational_symbol(condition.op),
            self.render_expr(&condition.right)?
        ))
    }

    /// Render a variable reference, checking its subscripts against the
    /// declaration. Subscripts index the padded storage directly.
    pub(crate) fn render_var_ref(&mut self, var: &VarRef) -> Result<String, TranslateError> {
        self.check_subscripts(var)?;

        let mut text = python_name(&var.name);
        for subscript in &var.subscripts {
            text.push('[');
            text.push_str(&self.render_expr(subscript)?);
            text.push(']');
        }
        Ok(text)
    }

    fn check_subscripts(&self, var: &VarRef) -> Result<(), TranslateError> {
        let found = var.subscripts.len();

        let Some(symbol) = self.symbol(&var.name) else {
            if found > 0 {
                return Err(TranslateError::subscript(
                    format!("'{}' is not declared as an array", var.name),
                    var.location,
                ));
            }
            return Ok(());
        };

        let expected = symbol.rank();
        if expected == found {
            return Ok(());
        }

        let message = if expected == 0 {
            format!("'{}' is not an array and cannot be subscripted", var.name)
        } else {
            format!(
                "'{}' has {} dimension{} but is referenced with {} subscript{}",
                var.name,
                expected,
                if expected == 1 { "" } else { "s" },
                found,
                if found == 1 { "" } else { "s" }
            )
        };
        Err(TranslateError::subscript(message, var.location))
    }

    /// Static kind of a (possibly subscripted) variable
    pub(crate) fn var_kind(&self, var: &VarRef) -> ValueKind {
        self.symbol(&var.name)
            .map_or(ValueKind::Unknown, |symbol| ValueKind::of_type(&symbol.data_type))
    }

    pub(crate) fn kind_of(&self, expr: &Expr) -> ValueKind {
        match expr {
            Expr::Number(..) => ValueKind::Integer,
            Expr::Text(..) => ValueKind::Text,
            Expr::Var(var) => self.var_kind(var),
            Expr::Unary { operand, .. } => match self.kind_of(operand) {
                kind if kind.is_numeric() => kind,
                _ => ValueKind::Unknown,
            },
            Expr::Binary {
                op, left, right, ..
            } => match op {
                BinOp::Concat => ValueKind::Text,
                BinOp::Div => {
                    if self.kind_of(left).is_numeric() && self.kind_of(right).is_numeric() {
                        ValueKind::Decimal
                    } else {
                        ValueKind::Unknown
                    }
                }
                BinOp::Add | BinOp::Sub | BinOp::Mul => {
                    ValueKind::arithmetic(self.kind_of(left), self.kind_of(right))
                }
            },
            Expr::Call { builtin, args, .. } => match builtin {
                Builtin::Substr | Builtin::Decimal => ValueKind::Text,
                Builtin::Index => ValueKind::Integer,
                Builtin::Mod => match args.as_slice() {
                    [a, b] => ValueKind::arithmetic(self.kind_of(a), self.kind_of(b)),
                    _ => ValueKind::Unknown,
                },
            },
            Expr::EndFile { .. } => ValueKind::Integer,
        }
    }

    pub(crate) fn render(&mut self, expr: &Expr) -> Result<Rendered, TranslateError> {
        match expr {
            Expr::Number(n, _) => Ok(Rendered::atom(n.to_string())),
            Expr::Text(text, _) => Ok(Rendered::atom(python_string(text))),
            Expr::Var(var) => Ok(Rendered::atom(self.render_var_ref(var)?)),
            Expr::Unary {
                op: UnOp::Neg,
                operand,
                ..
            } => {
                let operand = self.render(operand)?;
                let text = if operand.prec <= Prec::Unary {
                    format!("-({})", operand.text)
                } else {
                    format!("-{}", operand.text)
                };
                Ok(Rendered {
                    text,
                    prec: Prec::Unary,
                })
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                let (symbol, prec) = match op {
                    BinOp::Add | BinOp::Concat => ("+", Prec::Additive),
                    BinOp::Sub => ("-", Prec::Additive),
                    BinOp::Mul => ("*", Prec::Multiplicative),
                    BinOp::Div => ("/", Prec::Multiplicative),
                };
                let (left, right) = if *op == BinOp::Concat {
                    (self.render_text(left)?, self.render_text(right)?)
                } else {
                    (self.render(left)?, self.render(right)?)
                };
                Ok(binary(left, symbol, right, prec))
            }
            Expr::Call { builtin, args, .. } => self.render_builtin(*builtin, args),
            Expr::EndFile { file, .. } => {
                self.needs.files = true;
                Ok(Rendered::atom(format!("_pli_endfile({})", python_string(file))))
            }
        }
    }

    /// Render an operand that must be a Python string. Anything not text by
    /// construction goes through `_pli_str`: a CHAR variable can still hold
    /// an `int` from GET LIST or `None` after EOF or a failed query.
    fn render_text(&mut self, expr: &Expr) -> Result<Rendered, TranslateError> {
        let rendered = self.render(expr)?;
        if is_text_literal(expr) {
            Ok(rendered)
        } else {
            self.needs.text = true;
            Ok(Rendered::atom(format!("_pli_str({})", rendered.text)))
        }
    }

    fn render_builtin(&mut self, builtin: Builtin, args: &[Expr]) -> Result<Rendered, TranslateError> {
        match (builtin, args) {
            // SUBSTR(s, i[, n]) -> s[i-1:i-1+n], 1-based start
            (Builtin::Substr, [string, start, rest @ ..]) => {
                let string = self.render_text(string)?.wrapped(Prec::Atom, false);

                // Folding falls back to rendered arithmetic on i64 overflow
                let low = match literal_int(start).and_then(|n| n.checked_sub(1)) {
                    Some(n) => Rendered::atom(n.to_string()),
                    None => {
                        let start = self.render(start)?;
                        binary(start, "-", Rendered::atom("1"), Prec::Additive)
                    }
                };

                let high = match rest.first() {
                    None => String::new(),
                    Some(length) => match literal_int(start)
                        .zip(literal_int(length))
                        .and_then(|(s, n)| s.checked_sub(1)?.checked_add(n))
                    {
                        Some(high) => high.to_string(),
                        None => {
                            let length = self.render(length)?;
                            binary(low.clone(), "+", length, Prec::Additive).text
                        }
                    },
                };

                Ok(Rendered::atom(format!("{}[{}:{}]", string, low.text, high)))
            }

            // INDEX(s, needle) -> 1-based position, 0 when absent
            (Builtin::Index, [string, needle]) => {
                let string = self.render_text(string)?.wrapped(Prec::Atom, false);
                let needle = self.render_text(needle)?.text;
                Ok(Rendered {
                    text: format!("{}.find({}) + 1", string, needle),
                    prec: Prec::Additive,
                })
            }

            (Builtin::Decimal, [value]) => {
                let value = self.render_expr(value)?;
                Ok(Rendered::atom(format!("str({})", value)))
            }

            (Builtin::Mod, [value, divisor]) => {
                let value = self.render(value)?;
                let divisor = self.render(divisor)?;
                Ok(binary(value, "%", divisor, Prec::Multiplicative))
            }

            _ => Err(TranslateError::syntax(
                format!("{} called with {} arguments", builtin.name(), args.len()),
                args.first().map(Expr::location).unwrap_or_default(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslatorConfig;
    use crate::parser::Parser;

    /// Render the right-hand side of the single assignment in `body`
    fn rhs(decls: &str, body: &str) -> Result<String, TranslateError> {
        let source = format!("p: proc options(main); {} {} end p;", decls, body);
        let program = Parser::new(&source).parse_program()?;
        let config = TranslatorConfig::default();
        let mut generator = Generator::new(&config);
        generator.declare(&program)?;
        match program.statements.first() {
            Some(Stmt::Assign { value, .. }) => generator.render_expr(value),
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_parentheses_only_where_needed() {
        assert_eq!(rhs("", "x = 5 + 3 * 2;").unwrap(), "5 + 3 * 2");
        assert_eq!(rhs("", "x = (5 + 3) * 2;").unwrap(), "(5 + 3) * 2");
        assert_eq!(rhs("", "x = a - (b - c);").unwrap(), "a - (b - c)");
        assert_eq!(rhs("", "x = (a - b) - c;").unwrap(), "a - b - c");
        assert_eq!(rhs("", "x = -(a + 1);").unwrap(), "-(a + 1)");
    }

    #[test]
    fn test_concat_converts_operands() {
        let decls = "dcl n fixed bin(15); dcl s char(10);";
        assert_eq!(rhs(decls, "x = s || n;").unwrap(), "_pli_str(s) + _pli_str(n)");
        assert_eq!(
            rhs(decls, "x = 'n=' || n + 1;").unwrap(),
            "'n=' + _pli_str(n + 1)"
        );
        assert_eq!(
            rhs(decls, "x = s || 'a' || s;").unwrap(),
            "_pli_str(s) + 'a' + _pli_str(s)"
        );
        assert_eq!(
            rhs(decls, "x = substr(s, 1, 2) || decimal(n);").unwrap(),
            "_pli_str(s)[0:2] + str(n)"
        );
    }

    #[test]
    fn test_substr_folds_literal_bounds() {
        assert_eq!(rhs("", "x = substr('abcdef', 2, 3);").unwrap(), "'abcdef'[1:4]");
        assert_eq!(rhs("", "x = substr('abcdef', 4);").unwrap(), "'abcdef'[3:]");
        let decls = "dcl s char(20) varying;";
        assert_eq!(
            rhs(decls, "x = substr(s, i, n + 1);").unwrap(),
            "_pli_str(s)[i - 1:i - 1 + (n + 1)]"
        );
    }

    #[test]
    fn test_substr_folding_never_overflows() {
        assert_eq!(
            rhs("", "x = substr('abc', 2, 9223372036854775807);").unwrap(),
            "'abc'[1:1 + 9223372036854775807]"
        );
        assert_eq!(
            rhs("", "x = substr('abc', -9223372036854775807, 9223372036854775807);").unwrap(),
            "'abc'[-9223372036854775808:-1]"
        );
    }

    #[test]
    fn test_index_decimal_mod() {
        let decls = "dcl s char(20);";
        assert_eq!(
            rhs(decls, "x = index(s, 'bc');").unwrap(),
            "_pli_str(s).find('bc') + 1"
        );
        assert_eq!(rhs("", "x = decimal(a + 1);").unwrap(), "str(a + 1)");
        assert_eq!(rhs("", "x = mod(a + 1, 3);").unwrap(), "(a + 1) % 3");
    }

    #[test]
    fn test_array_access_is_direct() {
        let decls = "dcl v(10) fixed bin(15); dcl m(3, 4) char(5);";
        assert_eq!(rhs(decls, "x = v(1) + v(i + 1);").unwrap(), "v[1] + v[i + 1]");
        assert_eq!(rhs(decls, "x = m(2, 3);").unwrap(), "m[2][3]");
    }

    #[test]
    fn test_subscript_count_checked() {
        let decls = "dcl v(10) fixed bin(15); dcl s char(5);";
        for body in ["x = v;", "x = v(1, 2);", "x = s(1);", "x = undeclared(1);"] {
            assert!(
                matches!(rhs(decls, body), Err(TranslateError::Subscript { .. })),
                "{}",
                body
            );
        }
    }

    #[test]
    fn test_mangled_names() {
        assert_eq!(rhs("dcl str fixed bin;", "x = str + 1;").unwrap(), "str_ + 1");
    }
}
