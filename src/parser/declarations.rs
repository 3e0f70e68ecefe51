//! Declaration parsing implementation
//!
//! This module handles the procedure header and `DCL` statements:
//!
//! - Procedure header: `name: PROC OPTIONS(MAIN);`
//! - Scalars: `DCL x FIXED BIN(15);`, `DCL s CHAR(20) VARYING;`
//! - Lists and factoring: `DCL a, b FIXED BIN(31);`, `DCL (a, b) CHAR(8);`
//! - Arrays: `DCL v(10) FIXED BIN(15);`, `DCL m(3, 4) CHAR(5);`
//!
//! # Grammar
//!
//! ```text
//! header      ::= name ":" "proc" "options" "(" "main" ")" ";"
//! declaration ::= "dcl" item ("," item)* attribute+ ";"
//! item        ::= ident dims? | "(" item ("," item)* ")" dims?
//! dims        ::= "(" int ("," int)* ")"
//! attribute   ::= "fixed" prec? | "bin" prec? | "dec" prec? | "char" len? | "varying"
//! ```
//!
//! Attribute combinations are resolved into a [`DataType`] here; an
//! unsupported combination is a declaration error, not a syntax error.

use crate::error::TranslateError;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseResult, Parser};

/// Attributes collected before resolution
#[derive(Debug, Default)]
struct Attributes {
    fixed: bool,
    binary: bool,
    decimal: bool,
    character: Option<u32>,
    varying: bool,
    precision: Option<(u32, Option<u32>)>,
    spelled: Vec<String>,
}

impl Parser {
    /// Parse `name: PROC OPTIONS(MAIN);`, returning the procedure name
    pub(crate) fn parse_procedure_header(&mut self) -> ParseResult<(String, SourceLocation)> {
        let loc = self.current_location();
        let name = self.expect_name()?;

        self.expect_token(&TokenKind::Colon, "Expected ':' after procedure name")?;
        self.expect_token(&TokenKind::Proc, "Expected 'proc'")?;
        self.expect_token(&TokenKind::Options, "Expected 'options' after 'proc'")?;
        self.expect_lparen("after 'options'")?;
        self.expect_token(&TokenKind::Main, "Expected 'main' in options")?;
        self.expect_rparen("after 'main'")?;
        self.expect_semicolon("after procedure header")?;

        Ok((name, loc))
    }

    /// Parse one `DCL ... ;` statement
    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Declaration> {
        let loc = self.current_location();
        self.expect_token(&TokenKind::Dcl, "Expected 'dcl'")?;

        let mut items = Vec::new();
        loop {
            self.parse_declaration_item(&mut items)?;
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        let attributes = self.parse_attributes()?;
        let data_type = resolve_attributes(&attributes, loc)?;

        self.expect_semicolon("after declaration")?;

        Ok(Declaration {
            items,
            data_type,
            location: loc,
        })
    }

    /// One item, or a parenthesised factored list whose trailing dimensions
    /// apply to every member declared without its own
    fn parse_declaration_item(&mut self, items: &mut Vec<DeclItem>) -> ParseResult<()> {
        if self.match_token(&TokenKind::LParen) {
            let first = items.len();
            loop {
                self.parse_declaration_item(items)?;
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect_rparen("after factored declaration list")?;

            if self.check(&TokenKind::LParen) {
                let dims = self.parse_dimensions()?;
                for item in items[first..].iter_mut().filter(|i| i.dims.is_empty()) {
                    item.dims = dims.clone();
                }
            }
            return Ok(());
        }

        let loc = self.current_location();
        let name = self.expect_identifier()?;
        let dims = if self.check(&TokenKind::LParen) {
            self.parse_dimensions()?
        } else {
            Vec::new()
        };

        items.push(DeclItem {
            name,
            dims,
            location: loc,
        });
        Ok(())
    }

    /// Parse `(n [, m ...])`
    fn parse_dimensions(&mut self) -> ParseResult<Vec<i64>> {
        self.expect_lparen("before array extent")?;
        let mut dims = vec![self.expect_number()?];
        while self.match_token(&TokenKind::Comma) {
            dims.push(self.expect_number()?);
        }
        self.expect_rparen("after array extent")?;
        Ok(dims)
    }

    fn parse_attributes(&mut self) -> ParseResult<Attributes> {
        let mut attrs = Attributes::default();

        loop {
            let loc = self.current_location();
            let spelled = self.peek().lexeme.to_ascii_lowercase();

            let duplicate = if self.match_token(&TokenKind::Fixed) {
                std::mem::replace(&mut attrs.fixed, true)
            } else if self.match_token(&TokenKind::Bin) {
                std::mem::replace(&mut attrs.binary, true)
            } else if self.match_token(&TokenKind::Dec) || self.match_token(&TokenKind::Decimal) {
                std::mem::replace(&mut attrs.decimal, true)
            } else if self.match_token(&TokenKind::Varying) {
                std::mem::replace(&mut attrs.varying, true)
            } else if self.match_token(&TokenKind::Char) {
                let length = if self.match_token(&TokenKind::LParen) {
                    let n = self.expect_number()?;
                    self.expect_rparen("after character length")?;
                    n
                } else {
                    1
                };
                let length = u32::try_from(length).ok().filter(|n| *n > 0).ok_or_else(|| {
                    TranslateError::declaration(
                        format!("Invalid character length {}", length),
                        loc,
                    )
                })?;
                attrs.character.replace(length).is_some()
            } else {
                break;
            };

            if duplicate {
                return Err(TranslateError::declaration(
                    format!("Attribute '{}' specified more than once", spelled),
                    loc,
                ));
            }
            attrs.spelled.push(spelled);

            // Precision follows FIXED, BIN or DEC
            if attrs.character.is_none() && self.check(&TokenKind::LParen) {
                if attrs.precision.is_some() {
                    return Err(TranslateError::declaration(
                        "Precision specified more than once",
                        self.current_location(),
                    ));
                }
                attrs.precision = Some(self.parse_precision()?);
            }
        }

        if attrs.spelled.is_empty() {
            return Err(self.unexpected("Expected data attributes ('fixed bin' or 'char')"));
        }

        Ok(attrs)
    }

    fn parse_precision(&mut self) -> ParseResult<(u32, Option<u32>)> {
        let loc = self.current_location();
        self.expect_lparen("before precision")?;
        let precision = self.expect_number()?;
        let scale = if self.match_token(&TokenKind::Comma) {
            Some(self.expect_number()?)
        } else {
            None
        };
        self.expect_rparen("after precision")?;

        let to_u32 = |n: i64| {
            u32::try_from(n).map_err(|_| {
                TranslateError::declaration(format!("Invalid precision {}", n), loc)
            })
        };
        Ok((to_u32(precision)?, scale.map(to_u32).transpose()?))
    }
}

fn resolve_attributes(attrs: &Attributes, loc: SourceLocation) -> ParseResult<DataType> {
    let precision = attrs.precision.map(|(p, _)| p);
    let scale = attrs.precision.and_then(|(_, q)| q);

    let unsupported = || {
        TranslateError::declaration(
            format!(
                "Unsupported attribute combination '{}'",
                attrs.spelled.join(" ")
            ),
            loc,
        )
    };

    match (attrs.fixed, attrs.binary, attrs.decimal, attrs.character) {
        (false, false, false, Some(length)) => Ok(DataType::Character {
            length,
            varying: attrs.varying,
        }),
        _ if attrs.varying => Err(unsupported()),
        (true, true, false, None) => {
            if scale.is_some_and(|q| q != 0) {
                return Err(TranslateError::declaration(
                    "FIXED BINARY with a fractional scale is not supported",
                    loc,
                ));
            }
            Ok(DataType::FixedBinary { precision })
        }
        (true, false, _, None) => Ok(DataType::FixedDecimal { precision, scale }),
        _ => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(source: &str) -> ParseResult<Declaration> {
        let mut parser = Parser::new(source);
        parser.parse_declaration()
    }

    #[test]
    fn test_scalar_declaration() {
        let decl = declaration("dcl x fixed bin(15);").unwrap();
        assert_eq!(decl.items.len(), 1);
        assert_eq!(decl.items[0].name, "x");
        assert!(decl.items[0].dims.is_empty());
        assert_eq!(
            decl.data_type,
            DataType::FixedBinary {
                precision: Some(15)
            }
        );
    }

    #[test]
    fn test_name_list_and_arrays() {
        let decl = declaration("DCL a(10), b, m(3,4) CHAR(8) VARYING;").unwrap();
        let shapes: Vec<(&str, &[i64])> = decl
            .items
            .iter()
            .map(|i| (i.name.as_str(), i.dims.as_slice()))
            .collect();
        assert_eq!(shapes, vec![("a", &[10][..]), ("b", &[][..]), ("m", &[3, 4][..])]);
        assert_eq!(
            decl.data_type,
            DataType::Character {
                length: 8,
                varying: true
            }
        );
    }

    #[test]
    fn test_factored_dimensions() {
        let decl = declaration("dcl (a, b(2)) (5) fixed bin(31);").unwrap();
        assert_eq!(decl.items[0].dims, vec![5]);
        assert_eq!(decl.items[1].dims, vec![2]);
    }

    #[test]
    fn test_fixed_decimal() {
        let decl = declaration("declare amount fixed dec(7,2);").unwrap();
        assert_eq!(
            decl.data_type,
            DataType::FixedDecimal {
                precision: Some(7),
                scale: Some(2)
            }
        );
    }

    #[test]
    fn test_unsupported_combination_is_declaration_error() {
        for source in [
            "dcl x char(5) fixed;",
            "dcl x bin(15);",
            "dcl x fixed bin varying;",
            "dcl x fixed fixed bin;",
        ] {
            let err = declaration(source).unwrap_err();
            assert!(
                matches!(err, TranslateError::Declaration { .. }),
                "{}: {:?}",
                source,
                err
            );
        }
    }

    #[test]
    fn test_missing_attributes_is_syntax_error() {
        let err = declaration("dcl x;").unwrap_err();
        assert!(matches!(err, TranslateError::Syntax { .. }));
    }
}
