//! Lexer (tokenizer) for PL/I source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Keywords are case-insensitive and identifiers are canonicalised to lower
//! case, so `X` and `x` name the same variable.
//!
//! Lexing never aborts. An unrecognized character is reported as a
//! [`LexDiagnostic`], exactly that character is discarded, and scanning
//! continues. Block comments `/* ... */` do not nest and end at the first
//! `*/`; an unterminated comment is reported and swallows the rest of the
//! input.

use super::ast::SourceLocation;
use crate::error::LexDiagnostic;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::LazyLock;

/// All token kinds produced by the lexer.
///
/// Literal kinds carry their decoded value; the raw text is kept on
/// [`Token::lexeme`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(i64),
    CharConst(String),
    QueryText(String), // double-quoted, only meaningful after EXEC SQL

    // Identifiers (lower-cased)
    Ident(String),

    // Keywords
    Proc,
    Options,
    Main,
    Dcl,
    Fixed,
    Bin,
    Dec,
    Char,
    Varying,
    If,
    Then,
    Else,
    Put,
    Get,
    Skip,
    List,
    End,
    When,
    Other,
    Select,
    Do,
    While,
    To,
    By,
    Substr,
    Index,
    Decimal,
    Mod,
    Endfile,
    Exec,
    Sql,
    Into,
    Open,
    Close,
    Read,
    Write,
    File,
    Input,
    Output,
    From,

    // Arithmetic
    Plus,  // +
    Minus, // -
    Star,  // *
    Slash, // /

    // String
    Concat, // ||

    // Comparison (a single '=' doubles as assignment)
    Eq,   // =
    EqEq, // ==
    Ne,   // <> ^= ¬=
    Lt,   // <
    Le,   // <=
    Gt,   // >
    Ge,   // >=

    // Punctuation
    LParen,    // (
    RParen,    // )
    Colon,     // :
    Semicolon, // ;
    Comma,     // ,

    // End of input
    Eof,
}

/// Keyword spellings, built once per process and shared read-only.
static KEYWORDS: LazyLock<FxHashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = FxHashMap::default();

    // Procedure structure
    map.insert("proc", TokenKind::Proc);
    map.insert("procedure", TokenKind::Proc);
    map.insert("options", TokenKind::Options);
    map.insert("main", TokenKind::Main);
    map.insert("end", TokenKind::End);

    // Declarations
    map.insert("dcl", TokenKind::Dcl);
    map.insert("declare", TokenKind::Dcl);
    map.insert("fixed", TokenKind::Fixed);
    map.insert("bin", TokenKind::Bin);
    map.insert("binary", TokenKind::Bin);
    map.insert("dec", TokenKind::Dec);
    map.insert("char", TokenKind::Char);
    map.insert("character", TokenKind::Char);
    map.insert("varying", TokenKind::Varying);

    // Control flow
    map.insert("if", TokenKind::If);
    map.insert("then", TokenKind::Then);
    map.insert("else", TokenKind::Else);
    map.insert("select", TokenKind::Select);
    map.insert("when", TokenKind::When);
    map.insert("other", TokenKind::Other);
    map.insert("otherwise", TokenKind::Other);
    map.insert("do", TokenKind::Do);
    map.insert("while", TokenKind::While);
    map.insert("to", TokenKind::To);
    map.insert("by", TokenKind::By);

    // Stream and record I/O
    map.insert("put", TokenKind::Put);
    map.insert("get", TokenKind::Get);
    map.insert("skip", TokenKind::Skip);
    map.insert("list", TokenKind::List);
    map.insert("open", TokenKind::Open);
    map.insert("close", TokenKind::Close);
    map.insert("read", TokenKind::Read);
    map.insert("write", TokenKind::Write);
    map.insert("file", TokenKind::File);
    map.insert("input", TokenKind::Input);
    map.insert("output", TokenKind::Output);
    map.insert("into", TokenKind::Into);
    map.insert("from", TokenKind::From);

    // Embedded SQL
    map.insert("exec", TokenKind::Exec);
    map.insert("sql", TokenKind::Sql);

    // Built-in functions
    map.insert("substr", TokenKind::Substr);
    map.insert("index", TokenKind::Index);
    map.insert("decimal", TokenKind::Decimal);
    map.insert("mod", TokenKind::Mod);
    map.insert("endfile", TokenKind::Endfile);

    map
});

/// Look up a (lower-cased) word in the keyword table.
pub fn keyword(word: &str) -> Option<TokenKind> {
    KEYWORDS.get(word).cloned()
}

/// A token with its source text and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        self.location
    }

    pub fn is_keyword(&self) -> bool {
        !matches!(
            self.kind,
            TokenKind::Number(_)
                | TokenKind::CharConst(_)
                | TokenKind::QueryText(_)
                | TokenKind::Ident(_)
                | TokenKind::Eof
        ) && self.lexeme.chars().all(|c| c.is_ascii_alphabetic())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::CharConst(_) => write!(f, "character constant {}", self.lexeme),
            TokenKind::QueryText(_) => write!(f, "query string {}", self.lexeme),
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::Eof => write!(f, "end of input"),
            _ if self.is_keyword() => write!(f, "keyword '{}'", self.lexeme.to_lowercase()),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}

/// Lexer for PL/I source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    diagnostics: Vec<LexDiagnostic>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the entire input. The stream always ends with `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    lexeme: String::new(),
                    location: self.current_location(),
                });
                break;
            }

            if let Some(token) = self.next_token() {
                tokens.push(token);
            }
        }

        tokens
    }

    /// Diagnostics collected so far
    pub fn diagnostics(&self) -> &[LexDiagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<LexDiagnostic> {
        self.diagnostics
    }

    /// Get next token; `None` when the input at this position was discarded
    fn next_token(&mut self) -> Option<Token> {
        let loc = self.current_location();
        let start = self.position;
        let ch = self.advance()?;

        let kind = match ch {
            '\'' => return self.char_constant(loc),
            '"' => return self.query_text(loc),
            '0'..='9' => return self.number_literal(loc),
            'a'..='z' | 'A'..='Z' | '_' => return Some(self.identifier_or_keyword(loc)),

            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Le
                } else if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Ne
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '^' | '¬' if self.peek() == Some('=') => {
                self.advance();
                TokenKind::Ne
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                TokenKind::Concat
            }

            _ => {
                self.report(format!("Illegal character '{}'", ch), loc);
                return None;
            }
        };

        Some(Token {
            kind,
            lexeme: self.input[start..self.position].iter().collect(),
            location: loc,
        })
    }

    /// Single-quoted character constant; `''` inside stands for one quote
    fn char_constant(&mut self, loc: SourceLocation) -> Option<Token> {
        let resume = self.checkpoint();
        let mut value = String::new();

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            if ch == '\'' {
                if self.peek() == Some('\'') {
                    self.advance();
                    value.push('\'');
                    continue;
                }
                let lexeme = self.input[resume.0 - 1..self.position].iter().collect();
                return Some(Token {
                    kind: TokenKind::CharConst(value),
                    lexeme,
                    location: loc,
                });
            }
            value.push(ch);
        }

        self.report("Unterminated character constant".to_string(), loc);
        self.restore(resume);
        None
    }

    /// Double-quoted query text; `\"` and `\\` are unescaped
    fn query_text(&mut self, loc: SourceLocation) -> Option<Token> {
        let resume = self.checkpoint();
        let mut value = String::new();

        while let Some(ch) = self.advance() {
            match ch {
                '"' => {
                    let lexeme = self.input[resume.0 - 1..self.position].iter().collect();
                    return Some(Token {
                        kind: TokenKind::QueryText(value),
                        lexeme,
                        location: loc,
                    });
                }
                '\\' => match self.peek() {
                    Some(next @ ('"' | '\\')) => {
                        self.advance();
                        value.push(next);
                    }
                    _ => value.push('\\'),
                },
                '\n' => break,
                _ => value.push(ch),
            }
        }

        self.report("Unterminated query string".to_string(), loc);
        self.restore(resume);
        None
    }

    /// Parse numeric literal (integers only)
    fn number_literal(&mut self, loc: SourceLocation) -> Option<Token> {
        let start = self.position - 1;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let lexeme: String = self.input[start..self.position].iter().collect();
        match lexeme.parse::<i64>() {
            Ok(value) => Some(Token {
                kind: TokenKind::Number(value),
                lexeme,
                location: loc,
            }),
            Err(_) => {
                self.report(format!("Integer literal out of range: {}", lexeme), loc);
                None
            }
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, loc: SourceLocation) -> Token {
        let start = self.position - 1;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let lexeme: String = self.input[start..self.position].iter().collect();
        let lowered = lexeme.to_ascii_lowercase();
        let kind = keyword(&lowered).unwrap_or(TokenKind::Ident(lowered));

        Token {
            kind,
            lexeme,
            location: loc,
        }
    }

    /// Skip whitespace and block comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('*') => {
                    self.skip_block_comment();
                }
                _ => break,
            }
        }
    }

    /// Skip block comment (/* ... */), no nesting
    fn skip_block_comment(&mut self) {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return;
            }
            self.advance();
        }

        self.report("Unterminated block comment".to_string(), start_loc);
    }

    fn report(&mut self, message: String, location: SourceLocation) {
        tracing::warn!(line = location.line, column = location.column, "{}", message);
        self.diagnostics.push(LexDiagnostic { message, location });
    }

    fn checkpoint(&self) -> (usize, usize, usize) {
        (self.position, self.line, self.column)
    }

    fn restore(&mut self, (position, line, column): (usize, usize, usize)) {
        self.position = position;
        self.line = line;
        self.column = column;
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("p: proc options(main);");

        assert!(matches!(tokens[0], TokenKind::Ident(ref s) if s == "p"));
        assert_eq!(tokens[1], TokenKind::Colon);
        assert_eq!(tokens[2], TokenKind::Proc);
        assert_eq!(tokens[3], TokenKind::Options);
        assert_eq!(tokens[4], TokenKind::LParen);
        assert_eq!(tokens[5], TokenKind::Main);
        assert_eq!(tokens[6], TokenKind::RParen);
        assert_eq!(tokens[7], TokenKind::Semicolon);
        assert_eq!(tokens[8], TokenKind::Eof);
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let tokens = kinds("DCL Dcl dcl DECLARE Fixed BINARY Counter");
        assert_eq!(&tokens[..6], &[
            TokenKind::Dcl,
            TokenKind::Dcl,
            TokenKind::Dcl,
            TokenKind::Dcl,
            TokenKind::Fixed,
            TokenKind::Bin,
        ]);
        assert!(matches!(tokens[6], TokenKind::Ident(ref s) if s == "counter"));
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("= == <> ^= <= >= < > || + - * /");
        assert_eq!(&tokens[..13], &[
            TokenKind::Eq,
            TokenKind::EqEq,
            TokenKind::Ne,
            TokenKind::Ne,
            TokenKind::Le,
            TokenKind::Ge,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Concat,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
        ]);
    }

    #[test]
    fn test_comments_never_reach_the_stream() {
        let tokens = kinds("x /* a * b / c\n spans lines */ = 1; /* second */");
        assert!(matches!(tokens[0], TokenKind::Ident(ref s) if s == "x"));
        assert_eq!(tokens[1], TokenKind::Eq);
        assert_eq!(tokens[2], TokenKind::Number(1));
        assert_eq!(tokens[3], TokenKind::Semicolon);
        assert_eq!(tokens[4], TokenKind::Eof);
    }

    #[test]
    fn test_comments_do_not_nest() {
        let tokens = kinds("/* outer /* inner */ x */");
        assert!(matches!(tokens[0], TokenKind::Ident(ref s) if s == "x"));
        assert_eq!(tokens[1], TokenKind::Star);
        assert_eq!(tokens[2], TokenKind::Slash);
    }

    #[test]
    fn test_unterminated_comment_is_reported() {
        let mut lexer = Lexer::new("x = 1; /* never closed");
        let tokens = lexer.tokenize();
        assert_eq!(tokens.len(), 5);
        assert_eq!(lexer.diagnostics().len(), 1);
        assert!(lexer.diagnostics()[0].message.contains("Unterminated block comment"));
    }

    #[test]
    fn test_char_constant_with_doubled_quote() {
        let tokens = Lexer::new("'it''s'").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::CharConst("it's".to_string()));
        assert_eq!(tokens[0].lexeme, "'it''s'");
    }

    #[test]
    fn test_query_text() {
        let tokens = kinds(r#"exec sql "select count(*) from \"film\"" into n;"#);
        assert_eq!(tokens[0], TokenKind::Exec);
        assert_eq!(tokens[1], TokenKind::Sql);
        assert_eq!(
            tokens[2],
            TokenKind::QueryText("select count(*) from \"film\"".to_string())
        );
        assert_eq!(tokens[3], TokenKind::Into);
    }

    #[test]
    fn test_illegal_character_is_skipped() {
        let mut lexer = Lexer::new("x = 1 @ 2;");
        let tokens: Vec<TokenKind> = lexer.tokenize().into_iter().map(|t| t.kind).collect();

        assert_eq!(tokens[2], TokenKind::Number(1));
        assert_eq!(tokens[3], TokenKind::Number(2));
        assert_eq!(lexer.diagnostics().len(), 1);
        assert_eq!(lexer.diagnostics()[0].location, SourceLocation::new(1, 7));
    }

    #[test]
    fn test_unterminated_char_constant_discards_only_the_quote() {
        let mut lexer = Lexer::new("x = 'abc\n;");
        let tokens: Vec<TokenKind> = lexer.tokenize().into_iter().map(|t| t.kind).collect();

        assert!(matches!(tokens[2], TokenKind::Ident(ref s) if s == "abc"));
        assert_eq!(tokens[3], TokenKind::Semicolon);
        assert_eq!(lexer.diagnostics().len(), 1);
    }

    #[test]
    fn test_line_tracking() {
        let tokens = Lexer::new("a\n  b\n\n c").tokenize();
        assert_eq!(tokens[0].location, SourceLocation::new(1, 1));
        assert_eq!(tokens[1].location, SourceLocation::new(2, 3));
        assert_eq!(tokens[2].location, SourceLocation::new(4, 2));
    }

    #[test]
    fn test_token_display() {
        let tokens = Lexer::new("dcl x 42 ;").tokenize();
        assert_eq!(tokens[0].to_string(), "keyword 'dcl'");
        assert_eq!(tokens[1].to_string(), "identifier 'x'");
        assert_eq!(tokens[2].to_string(), "number 42");
        assert_eq!(tokens[3].to_string(), "';'");
        assert_eq!(tokens[4].to_string(), "end of input");
    }
}
