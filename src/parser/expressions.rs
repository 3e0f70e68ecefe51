//! Expression parsing implementation
//!
//! This module handles parsing of expressions using one recursive descent
//! level per precedence tier, plus the relational conditions used by `IF`
//! and `DO WHILE`.
//!
//! # Supported Expressions
//!
//! - Literals: integers, character constants
//! - Variables, optionally subscripted: `x`, `a(i + 1)`, `m(i, j)`
//! - Binary operators: `+ - * /` and concatenation `||`
//! - Unary minus
//! - Built-in calls: `SUBSTR`, `INDEX`, `DECIMAL`, `MOD`, `ENDFILE`
//!
//! # Precedence
//!
//! From loosest to tightest: `||`, then `+ -`, then `* /`, then unary minus.
//! Every binary tier is left-associative, so `5 + 3 * 2` is `5 + (3 * 2)`
//! and `a - b - c` is `(a - b) - c`. Relational operators are not part of
//! the expression grammar; they only appear in a [`Condition`].
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::error::TranslateError;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseResult, Parser};

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_concat()
    }

    /// Parse `left relop right`, optionally wrapped in parentheses
    pub(crate) fn parse_condition(&mut self) -> ParseResult<Condition> {
        if self.check(&TokenKind::LParen) {
            let saved = self.position;
            self.advance();
            if let Ok(condition) = self.parse_bare_condition() {
                if self.match_token(&TokenKind::RParen) {
                    return Ok(condition);
                }
            }
            // `(a + b) > c`: the parenthesis belonged to the left operand
            self.position = saved;
        }

        self.parse_bare_condition()
    }

    fn parse_bare_condition(&mut self) -> ParseResult<Condition> {
        let loc = self.current_location();
        let left = self.parse_expression()?;

        let op = match self.peek().kind {
            TokenKind::Eq | TokenKind::EqEq => RelOp::Eq,
            TokenKind::Ne => RelOp::Ne,
            TokenKind::Lt => RelOp::Lt,
            TokenKind::Le => RelOp::Le,
            TokenKind::Gt => RelOp::Gt,
            TokenKind::Ge => RelOp::Ge,
            _ => return Err(self.unexpected("Expected relational operator")),
        };
        self.advance();

        let right = self.parse_expression()?;

        Ok(Condition {
            left,
            op,
            right,
            location: loc,
        })
    }

    /// Parse concatenation (||)
    fn parse_concat(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;

        loop {
            let loc = self.current_location();
            if !self.match_token(&TokenKind::Concat) {
                break;
            }

            let right = Box::new(self.parse_additive()?);
            left = Expr::Binary {
                op: BinOp::Concat,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&TokenKind::Plus) {
                BinOp::Add
            } else if self.match_token(&TokenKind::Minus) {
                BinOp::Sub
            } else {
                break;
            };

            let right = Box::new(self.parse_multiplicative()?);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse multiplicative (* /)
    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&TokenKind::Star) {
                BinOp::Mul
            } else if self.match_token(&TokenKind::Slash) {
                BinOp::Div
            } else {
                break;
            };

            let right = Box::new(self.parse_unary()?);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse unary minus (and a redundant unary plus)
    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let loc = self.current_location();

        if self.match_token(&TokenKind::Minus) {
            let operand = Box::new(self.parse_unary()?);
            return Ok(Expr::Unary {
                op: UnOp::Neg,
                operand,
                location: loc,
            });
        }

        if self.match_token(&TokenKind::Plus) {
            return self.parse_unary();
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let loc = self.current_location();

        match &self.peek().kind {
            TokenKind::Number(n) => {
                let n = *n;
                self.advance();
                Ok(Expr::Number(n, loc))
            }
            TokenKind::CharConst(text) => {
                let text = text.clone();
                self.advance();
                Ok(Expr::Text(text, loc))
            }
            TokenKind::Ident(_) => Ok(Expr::Var(self.parse_var_ref()?)),
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                Ok(expr)
            }
            TokenKind::Substr => self.parse_builtin_call(Builtin::Substr, 2..=3),
            TokenKind::Index => self.parse_builtin_call(Builtin::Index, 2..=2),
            TokenKind::Decimal => self.parse_builtin_call(Builtin::Decimal, 1..=1),
            TokenKind::Mod => self.parse_builtin_call(Builtin::Mod, 2..=2),
            TokenKind::Endfile => {
                self.advance();
                self.expect_lparen("after 'endfile'")?;
                let file = self.expect_file_name()?;
                self.expect_rparen("after file name")?;
                Ok(Expr::EndFile {
                    file,
                    location: loc,
                })
            }
            _ => Err(self.unexpected("Expected expression")),
        }
    }

    fn parse_builtin_call(
        &mut self,
        builtin: Builtin,
        arity: std::ops::RangeInclusive<usize>,
    ) -> ParseResult<Expr> {
        let loc = self.current_location();
        self.advance();

        self.expect_lparen(&format!("after '{}'", builtin.name()))?;
        let mut args = vec![self.parse_expression()?];
        while self.match_token(&TokenKind::Comma) {
            args.push(self.parse_expression()?);
        }
        self.expect_rparen("after arguments")?;

        if !arity.contains(&args.len()) {
            let expected = if arity.start() == arity.end() {
                arity.start().to_string()
            } else {
                format!("{} or {}", arity.start(), arity.end())
            };
            return Err(TranslateError::syntax(
                format!(
                    "{} takes {} arguments, found {}",
                    builtin.name(),
                    expected,
                    args.len()
                ),
                loc,
            ));
        }

        Ok(Expr::Call {
            builtin,
            args,
            location: loc,
        })
    }

    /// Parse `name` or `name(e1[, e2 ...])`
    pub(crate) fn parse_var_ref(&mut self) -> ParseResult<VarRef> {
        let loc = self.current_location();
        let name = self.expect_identifier()?;

        let mut subscripts = Vec::new();
        if self.match_token(&TokenKind::LParen) {
            subscripts.push(self.parse_expression()?);
            while self.match_token(&TokenKind::Comma) {
                subscripts.push(self.parse_expression()?);
            }
            self.expect_rparen("after subscripts")?;
        }

        Ok(VarRef {
            name,
            subscripts,
            location: loc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Expr {
        let mut parser = Parser::new(source);
        parser.parse_expression().unwrap()
    }

    fn op_of(expr: &Expr) -> Option<BinOp> {
        match expr {
            Expr::Binary { op, .. } => Some(*op),
            _ => None,
        }
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        match expr("5 + 3 * 2") {
            Expr::Binary {
                op: BinOp::Add,
                left,
                right,
                ..
            } => {
                assert!(matches!(*left, Expr::Number(5, _)));
                assert_eq!(op_of(&right), Some(BinOp::Mul));
            }
            other => panic!("Expected addition at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associative() {
        match expr("a - b - c") {
            Expr::Binary {
                op: BinOp::Sub,
                left,
                right,
                ..
            } => {
                assert_eq!(op_of(&left), Some(BinOp::Sub));
                assert!(matches!(*right, Expr::Var(ref v) if v.name == "c"));
            }
            other => panic!("Expected subtraction at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_concat_is_loosest() {
        assert_eq!(op_of(&expr("'n=' || a + 1")), Some(BinOp::Concat));
    }

    #[test]
    fn test_parentheses_override() {
        assert_eq!(op_of(&expr("(5 + 3) * 2")), Some(BinOp::Mul));
    }

    #[test]
    fn test_unary_minus() {
        assert!(matches!(
            expr("-x * 2"),
            Expr::Binary { op: BinOp::Mul, ref left, .. } if matches!(**left, Expr::Unary { .. })
        ));
    }

    #[test]
    fn test_subscripted_reference() {
        match expr("m(i + 1, 2)") {
            Expr::Var(var) => {
                assert_eq!(var.name, "m");
                assert_eq!(var.subscripts.len(), 2);
            }
            other => panic!("Expected variable, got {:?}", other),
        }
    }

    #[test]
    fn test_builtin_calls() {
        assert!(matches!(
            expr("substr(s, 2, 3)"),
            Expr::Call { builtin: Builtin::Substr, ref args, .. } if args.len() == 3
        ));
        assert!(matches!(
            expr("endfile('data')"),
            Expr::EndFile { ref file, .. } if file == "data"
        ));
    }

    #[test]
    fn test_builtin_arity_checked() {
        let mut parser = Parser::new("index(s)");
        let err = parser.parse_expression().unwrap_err();
        assert!(err.to_string().contains("INDEX takes 2 arguments, found 1"));
    }

    #[test]
    fn test_conditions() {
        for (source, op) in [
            ("x = 1", RelOp::Eq),
            ("x <> 1", RelOp::Ne),
            ("x ^= 1", RelOp::Ne),
            ("(x >= 1)", RelOp::Ge),
            ("(x + 1) < y", RelOp::Lt),
        ] {
            let mut parser = Parser::new(source);
            let condition = parser.parse_condition().unwrap();
            assert_eq!(condition.op, op, "{}", source);
            assert!(parser.is_at_end(), "{}", source);
        }
    }

    #[test]
    fn test_condition_requires_operator() {
        let mut parser = Parser::new("x + 1 then");
        let err = parser.parse_condition().unwrap_err();
        assert!(err.to_string().contains("Expected relational operator"));
    }
}
