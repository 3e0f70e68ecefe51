//! Line-at-a-time syntax highlighting for the source and generated panes
//!
//! This is a display aid, not a lexer: each line is scanned on its own, so a
//! PL/I block comment spanning several lines is only coloured on its first
//! line. PL/I words are classified through the translator's own keyword
//! table, which keeps the two in step.

use crate::parser::lexer::{self, TokenKind};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Pli,
    Python,
}

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "break", "def", "elif", "else", "except", "finally", "for", "if", "import",
    "in", "is", "not", "or", "pass", "return", "try", "while", "with", "None", "True", "False",
    "global", "raise",
];

const PYTHON_BUILTINS: &[&str] = &["print", "str", "int", "input", "open", "len", "range"];

pub fn highlight_line(line: &str, language: Language) -> Line<'static> {
    let mut spans = Vec::new();
    let mut word = String::new();
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let comment_start = match language {
            Language::Pli => c == '/' && line[i + 1..].starts_with('*'),
            Language::Python => c == '#',
        };

        if comment_start {
            flush_word(&mut spans, &mut word, language, false);
            let end = match language {
                Language::Pli => line[i + 2..]
                    .find("*/")
                    .map_or(line.len(), |offset| i + 2 + offset + 2),
                Language::Python => line.len(),
            };
            spans.push(Span::styled(
                line[i..end].to_string(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            while chars.next_if(|&(j, _)| j < end).is_some() {}
            continue;
        }

        if c == '\'' || c == '"' {
            flush_word(&mut spans, &mut word, language, false);
            let end = string_end(line, i, c, language);
            spans.push(Span::styled(
                line[i..end].to_string(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            while chars.next_if(|&(j, _)| j < end).is_some() {}
            continue;
        }

        if c.is_alphanumeric() || c == '_' {
            word.push(c);
            continue;
        }

        flush_word(&mut spans, &mut word, language, c == '(');
        spans.push(Span::styled(
            c.to_string(),
            Style::default().fg(DEFAULT_THEME.fg),
        ));
    }

    flush_word(&mut spans, &mut word, language, false);
    Line::from(spans)
}

/// Byte offset just past the literal opened at `start`; the end of the line
/// when it is unterminated
fn string_end(line: &str, start: usize, quote: char, language: Language) -> usize {
    let mut escaped = false;
    for (offset, c) in line[start + 1..].char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' && language == Language::Python {
            escaped = true;
        } else if c == quote {
            return start + 1 + offset + c.len_utf8();
        }
    }
    line.len()
}

fn flush_word(spans: &mut Vec<Span<'static>>, word: &mut String, language: Language, is_call: bool) {
    if word.is_empty() {
        return;
    }
    let style = word_style(word, language, is_call);
    spans.push(Span::styled(std::mem::take(word), style));
}

fn word_style(word: &str, language: Language, is_call: bool) -> Style {
    if word.chars().all(|c| c.is_ascii_digit()) {
        return Style::default().fg(DEFAULT_THEME.number);
    }

    let keyword = Style::default()
        .fg(DEFAULT_THEME.keyword)
        .add_modifier(Modifier::BOLD);

    match language {
        Language::Pli => match lexer::keyword(&word.to_ascii_lowercase()) {
            Some(
                TokenKind::Substr
                | TokenKind::Index
                | TokenKind::Decimal
                | TokenKind::Mod
                | TokenKind::Endfile,
            ) => Style::default().fg(DEFAULT_THEME.builtin),
            Some(
                TokenKind::Fixed
                | TokenKind::Bin
                | TokenKind::Dec
                | TokenKind::Char
                | TokenKind::Varying,
            ) => Style::default().fg(DEFAULT_THEME.attribute),
            Some(_) => keyword,
            None => Style::default().fg(DEFAULT_THEME.fg),
        },
        Language::Python => {
            if PYTHON_KEYWORDS.contains(&word) {
                keyword
            } else if PYTHON_BUILTINS.contains(&word) || (is_call && word.starts_with("_pli")) {
                Style::default().fg(DEFAULT_THEME.builtin)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|span| span.content.to_string()).collect()
    }

    #[test]
    fn test_pli_comment_and_keywords() {
        let line = highlight_line("DCL x FIXED BIN; /* counter */ x = 1;", Language::Pli);
        let texts = texts(&line);
        assert!(texts.contains(&"/* counter */".to_string()));
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.keyword));
        assert_eq!(line.spans[2].content, "x");
        assert_eq!(line.spans[4].style.fg, Some(DEFAULT_THEME.attribute));
    }

    #[test]
    fn test_python_string_with_escape() {
        let line = highlight_line(r"print('it\'s') # done", Language::Python);
        let texts = texts(&line);
        assert_eq!(texts[0], "print");
        assert!(texts.contains(&r"'it\'s'".to_string()));
        assert_eq!(texts.last().map(String::as_str), Some("# done"));
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let line = highlight_line("x = 'abc", Language::Pli);
        assert_eq!(line.spans.last().map(|s| s.content.to_string()), Some("'abc".to_string()));
    }
}
