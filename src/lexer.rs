use std::{iter::Peekable, num::ParseIntError};

use crate::token::{Span, Token, TokenKind, KEYWORDS};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 2_048;

/// Splits `src` into tokens, appending them to `tokens`.
pub fn lex(src: &str, tokens: &mut Vec<Token>) {
    Lexer::new(src, tokens).lex();
}

/// Like [`lex`], but allocates the buffer.
pub fn lex_in_new(src: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    lex(src, &mut tokens);
    tokens
}

/// The IDL lexer.
///
/// Trivia (whitespace and comments) is kept in the token stream; the parser
/// is the one who skips it. Characters with no meaning in the grammar are
/// produced as [`TokenKind::ErrorUnexpectedChar`], so that the parser can
/// decide whether to reject or ignore them.
struct Lexer<'src, 'tok> {
    src: &'src str,
    iter: Peekable<std::str::Chars<'src>>,
    cursor: usize,
    line: u32,
    column: u32,
    current_lo: usize,
    current_line: u32,
    current_column: u32,
    tokens: &'tok mut Vec<Token>,
}

impl Lexer<'_, '_> {
    /// Runs until `Eof` has been pushed.
    fn lex(mut self) {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            let next = self.scan_token_kind();
            let is_eof = matches!(next, TokenKind::Eof);
            self.produce(next);
            if is_eof {
                break;
            }
        }
    }

    /// Classifies the token starting at the next character.
    fn scan_token_kind(&mut self) -> TokenKind {
        use TokenKind::*;
        let Some(c) = self.mark_advance() else {
            return Eof;
        };
        match c {
            '{' => LBrace,
            '}' => RBrace,
            '(' => LParen,
            ')' => RParen,
            '[' => LBracket,
            ']' => RBracket,
            ':' => Colon,
            ';' => Semicolon,
            ',' => Comma,
            '=' => Eq,
            '*' => Star,
            '&' => Amp,
            '/' => match self.peek() {
                Some('/') => self.inline_comment(),
                Some('*') => self.multiline_comment(),
                _ => ErrorUnexpectedChar,
            },
            quote @ ('"' | '\'') => self.string(quote),
            '0' if matches!(self.peek(), Some('x' | 'X')) => self.hex_number(),
            '-' if self.peek_is(|c| c.is_ascii_digit()) => self.number(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier_or_keyword(),
            c if c.is_whitespace() => self.whitespace(),
            _ => ErrorUnexpectedChar,
        }
    }

    /// Lexes a string delimited by `quote`.
    ///
    /// Like numbers, escape sequences are only resolved when the literal is
    /// extracted, which is why escaped strings get a token kind of their own.
    /// A NUL character ends the literal as unclosed.
    fn string(&mut self, quote: char) -> TokenKind {
        let mut has_escaped = false;
        let mut is_escaping = false;
        loop {
            match (is_escaping, self.advance()) {
                (_, None | Some('\0')) => return TokenKind::ErrorUnclosedString,
                (false, Some(c)) if c == quote => {
                    return if has_escaped {
                        TokenKind::EscapedString
                    } else {
                        TokenKind::String
                    };
                }
                (false, Some('\\')) => {
                    has_escaped = true;
                    is_escaping = true;
                }
                (_, Some(_)) => {
                    is_escaping = false;
                }
            }
        }
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        while self.peek_is(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        KEYWORDS
            .get(self.substr())
            .copied()
            .unwrap_or(TokenKind::Identifier)
    }

    fn number(&mut self) -> TokenKind {
        while self.peek_is(|c| c.is_ascii_digit()) {
            self.advance();
        }
        TokenKind::Number
    }

    fn hex_number(&mut self) -> TokenKind {
        assert!(matches!(self.advance(), Some('x' | 'X')));
        while self.peek_is(|c| c.is_ascii_hexdigit()) {
            self.advance();
        }
        TokenKind::Number
    }

    fn whitespace(&mut self) -> TokenKind {
        while self.peek_is(char::is_whitespace) {
            self.advance();
        }
        TokenKind::Whitespace
    }

    fn inline_comment(&mut self) -> TokenKind {
        assert_eq!(self.advance(), Some('/'));
        while !matches!(self.peek(), Some('\n') | None) {
            self.advance();
        }
        TokenKind::InlineComment
    }

    fn multiline_comment(&mut self) -> TokenKind {
        assert_eq!(self.advance(), Some('*'));
        loop {
            match self.advance() {
                Some('*') => (),
                None => return TokenKind::ErrorUnclosedComment,
                Some(_) => continue,
            }
            // A run of stars may precede the closing slash.
            while self.peek() == Some('*') {
                self.advance();
            }
            match self.advance() {
                Some('/') => break,
                None => return TokenKind::ErrorUnclosedComment,
                Some(_) => continue,
            }
        }
        TokenKind::MultilineComment
    }
}

impl Lexer<'_, '_> {
    fn new<'src, 'tok>(src: &'src str, tokens: &'tok mut Vec<Token>) -> Lexer<'src, 'tok> {
        Lexer {
            src,
            iter: src.chars().peekable(),
            cursor: 0,
            line: 1,
            column: 1,
            current_lo: 0,
            current_line: 1,
            current_column: 1,
            tokens,
        }
    }

    /// Marks the start of a token, then consumes one character.
    fn mark_advance(&mut self) -> Option<char> {
        self.current_lo = self.cursor;
        self.current_line = self.line;
        self.current_column = self.column;
        self.advance()
    }

    /// Returns the next character and advances the iterator, or `None` once
    /// the input is exhausted.
    fn advance(&mut self) -> Option<char> {
        let c = self.iter.next()?;
        self.cursor += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Returns the next character without advancing the iterator.
    fn peek(&mut self) -> Option<char> {
        self.iter.peek().copied()
    }

    fn peek_is(&mut self, pred: impl FnOnce(char) -> bool) -> bool {
        self.peek().is_some_and(pred)
    }

    fn span(&self) -> Span {
        Span::new(
            self.current_lo..self.cursor,
            self.current_line,
            self.current_column,
        )
    }

    /// Text of the token being scanned.
    fn substr(&self) -> &str {
        self.span().substr(self.src)
    }

    fn produce(&mut self, kind: TokenKind) {
        let span = self.span();
        self.tokens.push(Token::new(kind, span));
    }
}

pub mod extract {
    use super::*;

    /// Decimal values may be negative; hexadecimal ones never are.
    pub fn int(token: Token, src: &str) -> Result<i64, ParseIntError> {
        debug_assert_eq!(token.kind, TokenKind::Number);
        let text = token.span().substr(src);
        match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(digits) => i64::from_str_radix(digits, 16),
            None => text.parse(),
        }
    }

    pub fn is_hex(token: Token, src: &str) -> bool {
        let text = token.span().substr(src);
        text.starts_with("0x") || text.starts_with("0X")
    }

    pub fn ident(token: Token, src: &str) -> &str {
        debug_assert_eq!(token.kind, TokenKind::Identifier);
        token.span().substr(src)
    }

    /// Returns the contents of a string token, without its quotes.
    pub fn string(token: Token, src: &str) -> String {
        debug_assert!(token.kind.is_string());
        let raw = token.span().offset(1, -1).substr(src);
        if token.kind == TokenKind::EscapedString {
            perform_escape(raw)
        } else {
            raw.to_string()
        }
    }
}

fn perform_escape(raw: &str) -> String {
    let mut buf = String::with_capacity(raw.len());
    let mut escaped = false;
    for char in raw.chars() {
        let char = match (escaped, char) {
            (true, 't') => '\t',
            (true, 'n') => '\n',
            (true, 'r') => '\r',
            (true, '0') => '\0',
            (false, '\\') => {
                escaped = true;
                continue;
            }
            (_, char) => char,
        };
        escaped = false;
        buf.push(char);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds_and_ranges(src: &str) -> Vec<(TokenKind, std::ops::Range<usize>)> {
        lex_in_new(src)
            .into_iter()
            .map(|t| (t.kind, t.span().range()))
            .collect()
    }

    #[test]
    fn test_fixture_has_no_errors() {
        let input = include_str!("../bench/fixtures/big.idl");
        let has_errors = lex_in_new(input).into_iter().any(|t| t.kind.is_error());
        assert!(!has_errors);
    }

    #[test]
    fn tests_with_span() {
        use TokenKind::*;
        let cases = cases!(match .. {
            "{}()[]:;,=*&" => [
                (LBrace, 0..1),
                (RBrace, 1..2),
                (LParen, 2..3),
                (RParen, 3..4),
                (LBracket, 4..5),
                (RBracket, 5..6),
                (Colon, 6..7),
                (Semicolon, 7..8),
                (Comma, 8..9),
                (Eq, 9..10),
                (Star, 10..11),
                (Amp, 11..12),
                (Eof, 12..12),
            ],
            "interface Interface enum struct namespace import" => [
                (Interface, 0..9),
                (Whitespace, 9..10),
                (Identifier, 10..19),
                (Whitespace, 19..20),
                (Enum, 20..24),
                (Whitespace, 24..25),
                (Struct, 25..31),
                (Whitespace, 31..32),
                (Namespace, 32..41),
                (Whitespace, 41..42),
                (Import, 42..48),
                (Eof, 48..48),
            ],
            "1 -2 0x7FFFFFFF 0Xff - 3 12ab" => [
                (Number, 0..1),
                (Whitespace, 1..2),
                (Number, 2..4),
                (Whitespace, 4..5),
                (Number, 5..15),
                (Whitespace, 15..16),
                (Number, 16..20),
                (Whitespace, 20..21),
                (ErrorUnexpectedChar, 21..22),
                (Whitespace, 22..23),
                (Number, 23..24),
                (Whitespace, 24..25),
                (Number, 25..27),
                (Identifier, 27..29),
                (Eof, 29..29),
            ],
            "_a a_1 IFoo" => [
                (Identifier, 0..2),
                (Whitespace, 2..3),
                (Identifier, 3..6),
                (Whitespace, 6..7),
                (Identifier, 7..11),
                (Eof, 11..11),
            ],
            r#""" "abc" 'x' "it's" 'say "hi"'"# => [
                (String, 0..2),
                (Whitespace, 2..3),
                (String, 3..8),
                (Whitespace, 8..9),
                (String, 9..12),
                (Whitespace, 12..13),
                (String, 13..19),
                (Whitespace, 19..20),
                (String, 20..30),
                (Eof, 30..30),
            ],
            r#""a\"b" 'c\'d' "open"# => [
                (EscapedString, 0..6),
                (Whitespace, 6..7),
                (EscapedString, 7..13),
                (Whitespace, 13..14),
                (ErrorUnclosedString, 14..19),
                (Eof, 19..19),
            ],
            "a // line\nb /* block\n * more **/ c" => [
                (Identifier, 0..1),
                (Whitespace, 1..2),
                (InlineComment, 2..9),
                (Whitespace, 9..10),
                (Identifier, 10..11),
                (Whitespace, 11..12),
                (MultilineComment, 12..32),
                (Whitespace, 32..33),
                (Identifier, 33..34),
                (Eof, 34..34),
            ],
            "/* unclosed *" => [(ErrorUnclosedComment, 0..13), (Eof, 13..13)],
            "a @ # / b" => [
                (Identifier, 0..1),
                (Whitespace, 1..2),
                (ErrorUnexpectedChar, 2..3),
                (Whitespace, 3..4),
                (ErrorUnexpectedChar, 4..5),
                (Whitespace, 5..6),
                (ErrorUnexpectedChar, 6..7),
                (Whitespace, 7..8),
                (Identifier, 8..9),
                (Eof, 9..9),
            ],
            "a\0b" => [
                (Identifier, 0..1),
                (ErrorUnexpectedChar, 1..2),
                (Identifier, 2..3),
                (Eof, 3..3),
            ],
            "\"a\0b\"" => [
                (ErrorUnclosedString, 0..3),
                (Identifier, 3..4),
                (ErrorUnclosedString, 4..5),
                (Eof, 5..5),
            ],
        });

        for (input, tokens) in cases {
            assert_eq!(kinds_and_ranges(input), *tokens, "input: {input:?}");
        }
    }

    #[test]
    fn test_line_and_column() {
        let src = "interface IFoo\n{\n    void Bar();\n}";
        let positions: Vec<_> = lex_in_new(src)
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| (t.kind, t.span().line, t.span().column))
            .collect();
        assert_eq!(
            positions,
            [
                (TokenKind::Interface, 1, 1),
                (TokenKind::Identifier, 1, 11),
                (TokenKind::LBrace, 2, 1),
                (TokenKind::Identifier, 3, 5),
                (TokenKind::Identifier, 3, 10),
                (TokenKind::LParen, 3, 13),
                (TokenKind::RParen, 3, 14),
                (TokenKind::Semicolon, 3, 15),
                (TokenKind::RBrace, 4, 1),
                (TokenKind::Eof, 4, 2),
            ]
        );
    }

    #[test]
    fn test_extract() {
        let src = r#"0x7FFFFFFF -42 "plain" "a\tb\\c\"d" 'it\'s'"#;
        let tokens: Vec<_> = lex_in_new(src)
            .into_iter()
            .filter(|t| !t.kind.is_trivia() && !t.is_eof())
            .collect();
        assert_eq!(extract::int(tokens[0], src), Ok(0x7FFF_FFFF));
        assert!(extract::is_hex(tokens[0], src));
        assert_eq!(extract::int(tokens[1], src), Ok(-42));
        assert!(!extract::is_hex(tokens[1], src));
        assert_eq!(extract::string(tokens[2], src), "plain");
        assert_eq!(extract::string(tokens[3], src), "a\tb\\c\"d");
        assert_eq!(extract::string(tokens[4], src), "it's");
    }

    macro_rules! cases {
        (match .. {
            $($str:expr => [$(($kind:expr, $range:expr)),* $(,)?]),* $(,)?
        }) => {{
            &[$((
                $str,
                vec![$(($kind, $range)),*],
            )),*]
        }};
    }
    use cases;
}
