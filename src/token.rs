use std::{fmt, ops::Range};

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token { kind, span }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn line(&self) -> u32 {
        self.span.line
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {})", self.kind, self.span)
    }
}

/// A region of the source text, also tagged with the (1-based) line and
/// column of its first character.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub lo: usize,
    pub len: u32,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(Range { start: lo, end: hi }: Range<usize>, line: u32, column: u32) -> Span {
        debug_assert!(hi >= lo);
        let len = u32::try_from(hi - lo).unwrap_or(u32::MAX);
        Span {
            lo,
            len,
            line,
            column,
        }
    }

    pub fn hi(&self) -> usize {
        self.lo + self.len as usize
    }

    pub fn range(&self) -> Range<usize> {
        self.lo..self.hi()
    }

    /// Shrinks (or grows) the span bounds. Line and column are kept, since
    /// they only shift by the same amount on a single line.
    pub fn offset(self, lo: isize, hi: isize) -> Span {
        let new_lo = self.lo.saturating_add_signed(lo);
        let new_hi = self.hi().saturating_add_signed(hi).max(new_lo);
        Span::new(new_lo..new_hi, self.line, self.column)
    }

    pub fn substr(self, src: &str) -> &str {
        &src[self.range()]
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{} @ {self})", self.lo, self.hi())
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Interface,
    Enum,
    Struct,
    Namespace,
    Import,

    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semicolon,
    Comma,
    Eq,
    Star,
    Amp,

    Identifier,
    /// A quoted string without escape sequences.
    String,
    /// A quoted string containing at least one escape sequence.
    EscapedString,
    /// Either a decimal (possibly negative) or a `0x` hexadecimal integer.
    Number,

    Whitespace,
    InlineComment,
    MultilineComment,

    Eof,

    /// A character with no meaning in the grammar.
    ErrorUnexpectedChar,
    ErrorUnclosedString,
    ErrorUnclosedComment,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        use TokenKind::*;
        matches!(self, Whitespace | InlineComment | MultilineComment)
    }

    pub fn is_error(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            ErrorUnexpectedChar | ErrorUnclosedString | ErrorUnclosedComment
        )
    }

    pub fn is_string(self) -> bool {
        matches!(self, TokenKind::String | TokenKind::EscapedString)
    }

    /// A human readable description, used in diagnostics.
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            Interface => "`interface`",
            Enum => "`enum`",
            Struct => "`struct`",
            Namespace => "`namespace`",
            Import => "`import`",
            LBrace => "`{`",
            RBrace => "`}`",
            LParen => "`(`",
            RParen => "`)`",
            LBracket => "`[`",
            RBracket => "`]`",
            Colon => "`:`",
            Semicolon => "`;`",
            Comma => "`,`",
            Eq => "`=`",
            Star => "`*`",
            Amp => "`&`",
            Identifier => "identifier",
            String | EscapedString => "string",
            Number => "number",
            Whitespace => "whitespace",
            InlineComment | MultilineComment => "comment",
            Eof => "end of file",
            ErrorUnexpectedChar => "unexpected character",
            ErrorUnclosedString => "unclosed string",
            ErrorUnclosedComment => "unclosed comment",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Keywords are case sensitive.
pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "interface" => TokenKind::Interface,
    "enum" => TokenKind::Enum,
    "struct" => TokenKind::Struct,
    "namespace" => TokenKind::Namespace,
    "import" => TokenKind::Import,
};
