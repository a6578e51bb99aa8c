//! CST-aware lexer that preserves all trivia
//!
//! Every byte of the input ends up in exactly one token, so the tree built
//! from these tokens prints back to the original text.

use crate::cst::SyntaxKind;
use std::ops::Range;

/// Simple span representing a range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: SyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: SyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

const CONDITIONAL_DIRECTIVES: &[&str] = &["if", "elseif", "else", "endif"];

/// Characters that form generic operator runs (`==`, `+=`, `&&`, `!==` ...)
fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '=' | '-' | '+' | '*' | '/' | '%' | '&' | '|' | '^' | '~' | '!'
    )
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

fn next_char(input: &str, index: usize) -> Option<char> {
    input[index..].chars().next()
}

/// Lex input preserving ALL trivia for CST construction
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut i = 0usize;

    while let Some(current) = next_char(input, i) {
        let start = i;
        let rest = &input[i..];

        let (kind, end) = match current {
            '\n' => (SyntaxKind::Newline, i + 1),
            '\r' => {
                let len = if rest.starts_with("\r\n") { 2 } else { 1 };
                (SyntaxKind::Newline, i + len)
            }
            c if c.is_whitespace() => {
                let end = scan_while(input, i, |c| c.is_whitespace() && c != '\n' && c != '\r');
                (SyntaxKind::Whitespace, end)
            }
            '/' if rest.starts_with("//") => (SyntaxKind::LineComment, line_end(input, i)),
            '/' if rest.starts_with("/*") => {
                let (end, error) = lex_block_comment(input, i);
                if let Some(err) = error {
                    errors.push(err);
                }
                (SyntaxKind::BlockComment, end)
            }
            '#' => lex_pound(input, i),
            '@' => {
                let end = scan_while(input, i + 1, is_ident_continue);
                if end == i + 1 {
                    errors.push(LexerError::new("Expected attribute name after '@'", span(i, end)));
                    (SyntaxKind::Unknown, end)
                } else {
                    (SyntaxKind::Attribute, end)
                }
            }
            '`' => {
                let end = match input[i + 1..].find('`') {
                    Some(offset) => i + 1 + offset + 1,
                    None => {
                        errors.push(LexerError::new("Unterminated escaped identifier", span(i, input.len())));
                        line_end(input, i)
                    }
                };
                (SyntaxKind::Ident, end)
            }
            c if is_ident_start(c) => {
                let end = scan_while(input, i, is_ident_continue);
                let kind = SyntaxKind::from_keyword(&input[i..end]).unwrap_or(SyntaxKind::Ident);
                (kind, end)
            }
            c if c.is_ascii_digit() => (SyntaxKind::NumberLiteral, lex_number(input, i)),
            '"' => {
                let (end, error) = lex_string(input, i);
                if let Some(err) = error {
                    errors.push(err);
                }
                (SyntaxKind::StringLiteral, end)
            }
            '(' => (SyntaxKind::LParen, i + 1),
            ')' => (SyntaxKind::RParen, i + 1),
            '{' => (SyntaxKind::LBrace, i + 1),
            '}' => (SyntaxKind::RBrace, i + 1),
            '[' => (SyntaxKind::LBracket, i + 1),
            ']' => (SyntaxKind::RBracket, i + 1),
            ',' => (SyntaxKind::Comma, i + 1),
            ':' => (SyntaxKind::Colon, i + 1),
            ';' => (SyntaxKind::Semicolon, i + 1),
            '<' => (SyntaxKind::LAngle, i + 1),
            '>' => (SyntaxKind::RAngle, i + 1),
            '.' if rest.starts_with("...") => (SyntaxKind::Operator, i + 3),
            '.' if rest.starts_with("..<") => (SyntaxKind::Operator, i + 3),
            '.' => (SyntaxKind::Dot, i + 1),
            '-' if rest.starts_with("->") => (SyntaxKind::Arrow, i + 2),
            '?' if rest.starts_with("??") => (SyntaxKind::Operator, i + 2),
            '?' => (SyntaxKind::Question, i + 1),
            '!' if !rest.starts_with("!=") => (SyntaxKind::Bang, i + 1),
            c if is_operator_char(c) => {
                let end = scan_while(input, i, is_operator_char);
                let kind = if end - i == 1 && c == '=' {
                    SyntaxKind::Equals
                } else {
                    SyntaxKind::Operator
                };
                (kind, end)
            }
            other => {
                let end = i + other.len_utf8();
                errors.push(LexerError::new(
                    format!("Unexpected character '{other}'"),
                    span(i, end),
                ));
                (SyntaxKind::Unknown, end)
            }
        };

        tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
        i = end;
    }

    (tokens, errors)
}

fn span(start: usize, end: usize) -> CstSpan {
    start..end
}

fn scan_while(input: &str, start: usize, pred: impl Fn(char) -> bool) -> usize {
    input[start..]
        .char_indices()
        .find(|(_, c)| !pred(*c))
        .map(|(offset, _)| start + offset)
        .unwrap_or(input.len())
}

/// Offset of the next line break (exclusive) or end of input
fn line_end(input: &str, start: usize) -> usize {
    input[start..]
        .find(['\n', '\r'])
        .map(|offset| start + offset)
        .unwrap_or(input.len())
}

/// Swift block comments nest
fn lex_block_comment(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                depth += 1;
                i += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return (i, None);
                }
            }
            _ => i += 1,
        }
    }
    (
        input.len(),
        Some(LexerError::new("Unterminated block comment", span(start, input.len()))),
    )
}

/// `#if`-family lines become trivia; other `#word` tokens are identifiers
fn lex_pound(input: &str, start: usize) -> (SyntaxKind, usize) {
    let word_end = scan_while(input, start + 1, is_ident_continue);
    let word = &input[start + 1..word_end];
    if word.is_empty() {
        return (SyntaxKind::Unknown, start + 1);
    }
    if !CONDITIONAL_DIRECTIVES.contains(&word) {
        return (SyntaxKind::Ident, word_end);
    }

    // The marker stops before a trailing comment so directives there stay visible
    let mut end = line_end(input, start);
    if let Some(comment) = input[start..end].find("//") {
        end = start + comment;
    }
    let trimmed = input[start..end].trim_end().len();
    (SyntaxKind::ConditionalMarker, start + trimmed)
}

fn lex_number(input: &str, start: usize) -> usize {
    let mut end = scan_while(input, start, |c| c.is_ascii_alphanumeric() || c == '_');
    // Fractional part only when a digit follows the dot (`1.5` but not `1.description`)
    if input[end..].starts_with('.')
        && input[end + 1..].chars().next().is_some_and(|c| c.is_ascii_digit())
    {
        end = scan_while(input, end + 1, |c| c.is_ascii_alphanumeric() || c == '_');
    }
    end
}

/// Lex a string literal, including multi-line literals and interpolations
fn lex_string(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let multiline = input[start..].starts_with("\"\"\"");
    let delimiter = if multiline { "\"\"\"" } else { "\"" };
    let mut i = start + delimiter.len();

    while let Some(c) = next_char(input, i) {
        if input[i..].starts_with(delimiter) {
            return (i + delimiter.len(), None);
        }
        match c {
            '\\' if input[i..].starts_with("\\(") => {
                i = skip_interpolation(input, i + 2);
            }
            '\\' => {
                i += 1;
                if let Some(escaped) = next_char(input, i) {
                    i += escaped.len_utf8();
                }
            }
            '\n' | '\r' if !multiline => {
                return (
                    i,
                    Some(LexerError::new("Unterminated string literal", span(start, i))),
                );
            }
            other => i += other.len_utf8(),
        }
    }

    (
        input.len(),
        Some(LexerError::new("Unterminated string literal", span(start, input.len()))),
    )
}

/// Skip the body of `\( ... )`, which may contain nested strings
fn skip_interpolation(input: &str, mut i: usize) -> usize {
    let mut depth = 1usize;
    while let Some(c) = next_char(input, i) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            '"' => {
                let (end, _) = lex_string(input, i);
                i = end;
                continue;
            }
            '\n' | '\r' => return i,
            _ => {}
        }
        i += c.len_utf8();
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        lex_with_trivia(input).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_function_signature() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("func foo() -> Void {}"),
            vec![
                FuncKw, Whitespace, Ident, LParen, RParen, Whitespace, Arrow, Whitespace, Ident,
                Whitespace, LBrace, RBrace
            ]
        );
    }

    #[test]
    fn lexing_is_lossless() {
        let source = "let s = \"a \\(b(\"c\")) d\" /* x /* y */ z */ // tail\r\n#if DEBUG // note\nx >= 1 != 2\n";
        let (tokens, errors) = lex_with_trivia(source);
        assert!(errors.is_empty(), "{errors:?}");
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn conditional_marker_stops_before_comment() {
        let (tokens, _) = lex_with_trivia("#if DEBUG // kestrel:disable all\n");
        assert_eq!(tokens[0].kind, SyntaxKind::ConditionalMarker);
        assert_eq!(tokens[0].text, "#if DEBUG");
        assert_eq!(tokens[1].kind, SyntaxKind::Whitespace);
        assert_eq!(tokens[2].kind, SyntaxKind::LineComment);
    }

    #[test]
    fn angle_brackets_are_single_tokens() {
        use SyntaxKind::*;
        assert_eq!(kinds("A<B<C>>"), vec![Ident, LAngle, Ident, LAngle, Ident, RAngle, RAngle]);
        assert_eq!(kinds("a >= b"), vec![Ident, Whitespace, RAngle, Equals, Whitespace, Ident]);
    }

    #[test]
    fn bang_and_not_equal() {
        use SyntaxKind::*;
        assert_eq!(kinds("x!"), vec![Ident, Bang]);
        assert_eq!(kinds("x != y"), vec![Ident, Whitespace, Operator, Whitespace, Ident]);
        assert_eq!(kinds("x !== y")[2], Operator);
    }

    #[test]
    fn reports_unterminated_comment() {
        let (tokens, errors) = lex_with_trivia("/* open");
        assert_eq!(tokens.len(), 1);
        assert_eq!(errors.len(), 1);
    }
}
