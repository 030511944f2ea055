use std::collections::BTreeSet;

use crate::{
    ast::{
        Attribute, AttributeValue, Attributes, Direction, EnumDef, EnumValue, IdlDocument,
        ImportDef, InterfaceDef, Member, MethodDef, MethodOrigin, ParameterDef, PropertyDef,
        StructDef, StructField, DEFAULT_BASE_INTERFACE,
    },
    lexer::{self, extract},
    token::{Span, Token, TokenKind},
    types::{self, TypeInfo},
};

type Result<T, E = ParseError> = std::result::Result<T, E>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// When set, characters with no meaning in the grammar are rejected.
    /// Otherwise they are silently skipped.
    pub strict: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { strict: true }
    }
}

impl ParseOptions {
    pub fn lenient() -> ParseOptions {
        ParseOptions { strict: false }
    }
}

/// Parses a whole IDL document with the default (strict) options.
pub fn parse_document(src: &str) -> Result<IdlDocument> {
    parse_document_with(src, ParseOptions::default())
}

pub fn parse_document_with(src: &str, options: ParseOptions) -> Result<IdlDocument> {
    let mut tokens = Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);
    parse_document_in(src, &mut tokens, options)
}

/// Parses a document reusing the provided tokens buffer, which must be empty.
pub fn parse_document_in(
    src: &str,
    tokens: &mut Vec<Token>,
    options: ParseOptions,
) -> Result<IdlDocument> {
    assert!(tokens.is_empty());
    lexer::lex(src, tokens);
    Parser::new(src, tokens, options).parse_document()
}

/// Base clause names the generated code cannot express.
static ILLEGAL_BASE_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "public", "private", "protected", "virtual", "static", "const", "volatile",
};

/// Second words of `unsigned`/`signed` compound types.
static COMPOUND_SUFFIXES: phf::Set<&'static str> = phf::phf_set! {
    "char", "int", "short", "long",
};

struct Parser<'src, 'tok> {
    src: &'src str,
    tokens: &'tok [Token],
    cursor: usize,
    options: ParseOptions,
    /// The namespace path of the innermost open namespace block.
    namespace: String,
    /// Every distinct namespace path opened so far.
    namespaces: BTreeSet<String>,
    document: IdlDocument,
}

impl Parser<'_, '_> {
    fn parse_document(mut self) -> Result<IdlDocument> {
        while self.except([]) {
            self.parse_item(true)?;
        }
        self.consume(TokenKind::Eof)?;
        self.document.namespace = self.namespaces.into_iter().next();
        Ok(self.document)
    }

    fn parse_item(&mut self, top_level: bool) -> Result<()> {
        use TokenKind::*;

        // Stray semicolons are empty declarations.
        if self.take(Semicolon) {
            return Ok(());
        }
        let attributes = self.parse_optional_attributes()?;
        match self.peek().kind {
            Import if top_level => {
                let import = self.parse_import()?;
                self.document.imports.push(import);
            }
            Namespace => self.parse_namespace()?,
            Interface => {
                let interface = self.parse_interface(attributes)?;
                self.document.interfaces.push(interface);
            }
            Enum => {
                let def = self.parse_enum()?;
                self.document.enums.push(def);
            }
            Struct => {
                let def = self.parse_struct()?;
                self.document.structs.push(def);
            }
            _ if top_level => {
                self.consume_any(&[Import, Namespace, Interface, Enum, Struct])?;
            }
            _ => {
                self.consume_any(&[Namespace, Interface, Enum, Struct, RBrace])?;
            }
        }
        Ok(())
    }

    /// `import "a/b.idl";`, or the unquoted `import a/b.idl;`.
    fn parse_import(&mut self) -> Result<ImportDef> {
        let keyword = self.consume(TokenKind::Import)?;
        let path = match self.take_bare_path() {
            Some(path) => path,
            None => {
                let token = self.consume_any(&[TokenKind::String, TokenKind::EscapedString])?;
                extract::string(token, self.src)
            }
        };
        self.consume(TokenKind::Semicolon)?;
        Ok(ImportDef {
            path,
            line: keyword.line(),
        })
    }

    /// Takes the run of adjacent tokens spelling an unquoted path. Separators
    /// lex as unexpected characters, so the run is read off the raw tokens.
    fn take_bare_path(&mut self) -> Option<String> {
        let start = self.cursor;
        let mut end = start;
        while self.tokens.get(end).is_some_and(|t| self.is_path_part(*t)) {
            end += 1;
        }
        if end == start {
            return None;
        }
        let lo = self.tokens[start].span().range().start;
        let hi = self.tokens[end - 1].span().range().end;
        self.cursor = end;
        self.setup();
        Some(self.src[lo..hi].to_string())
    }

    fn is_path_part(&self, token: Token) -> bool {
        use TokenKind::*;
        match token.kind {
            Identifier | Number | Interface | Enum | Struct | Namespace | Import => true,
            ErrorUnexpectedChar => {
                matches!(token.span().substr(self.src), "/" | "." | "-" | "\\")
            }
            _ => false,
        }
    }

    fn parse_namespace(&mut self) -> Result<()> {
        let keyword = self.consume(TokenKind::Namespace)?;
        let path = self.parse_qualified_name()?;
        self.consume(TokenKind::LBrace)?;

        let nested = if self.namespace.is_empty() {
            path.clone()
        } else {
            format!("{}::{path}", self.namespace)
        };
        if !self.namespaces.contains(&nested) && !self.namespaces.is_empty() {
            let mut all: Vec<_> = self.namespaces.iter().cloned().collect();
            all.push(nested);
            all.sort();
            return Err(keyword
                .span()
                .wrap_error(ParseErrorKind::MultipleNamespaces(all)));
        }
        self.namespaces.insert(nested.clone());
        let enclosing = std::mem::replace(&mut self.namespace, nested);

        while self.except([TokenKind::RBrace]) {
            self.parse_item(false)?;
        }
        self.expect_block_end("namespace", &path)?;
        self.take(TokenKind::Semicolon);

        self.namespace = enclosing;
        Ok(())
    }

    fn parse_interface(&mut self, mut attributes: Attributes) -> Result<InterfaceDef> {
        let keyword = self.consume(TokenKind::Interface)?;
        let name = self.parse_ident()?;

        let uuid = match attributes.remove("uuid") {
            Some(AttributeValue::String(uuid)) => uuid,
            _ => String::new(),
        };

        let base = if self.take(TokenKind::Colon) {
            let next = self.peek();
            if next.kind == TokenKind::Identifier {
                let word = extract::ident(next, self.src);
                if ILLEGAL_BASE_KEYWORDS.contains(word) {
                    return Err(next.span().wrap_error(ParseErrorKind::IllegalBaseKeyword {
                        interface: name,
                        keyword: word.to_string(),
                    }));
                }
            }
            self.parse_qualified_name()?
        } else {
            DEFAULT_BASE_INTERFACE.to_string()
        };

        self.consume(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while self.except([TokenKind::RBrace]) {
            members.push(self.parse_member()?);
        }
        self.expect_block_end("interface", &name)?;
        self.take(TokenKind::Semicolon);

        Ok(InterfaceDef {
            name,
            uuid,
            base,
            members,
            namespace: self.namespace.clone(),
            attributes,
            line: keyword.line(),
        })
    }

    fn parse_member(&mut self) -> Result<Member> {
        let line = self.peek().line();
        let attributes = self.parse_optional_attributes()?;
        if attributes.has("get") || attributes.has("set") {
            let ty = self.parse_type()?;
            let name = self.parse_ident()?;
            self.take(TokenKind::Semicolon);
            return Ok(Member::Property(PropertyDef {
                name,
                ty,
                has_getter: attributes.has("get"),
                has_setter: attributes.has("set"),
                line,
            }));
        }

        let return_ty = self.parse_type()?;
        let name = self.parse_ident()?;
        self.consume(TokenKind::LParen)?;
        let params = self.parse_list(TokenKind::RParen, TokenKind::Comma, Parser::parse_param)?;
        self.consume(TokenKind::RParen)?;
        // The pure-virtual marker (`= 0`) is accepted and discarded.
        if self.take(TokenKind::Eq) {
            self.consume(TokenKind::Number)?;
        }
        self.consume(TokenKind::Semicolon)?;

        Ok(Member::Method(MethodDef {
            name,
            return_ty,
            params,
            attributes,
            origin: MethodOrigin::Declared,
            line,
        }))
    }

    fn parse_param(&mut self) -> Result<ParameterDef> {
        let attributes = self.parse_optional_attributes()?;
        let direction = if attributes.has("out") {
            Direction::Out
        } else if attributes.has("inout") {
            Direction::InOut
        } else {
            Direction::In
        };
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;
        Ok(ParameterDef {
            name,
            ty,
            direction,
        })
    }

    fn parse_type(&mut self) -> Result<TypeInfo> {
        let is_const = self.take_word("const");
        let mut base_type = self.parse_qualified_name()?;

        if matches!(base_type.as_str(), "unsigned" | "signed") {
            let next = self.peek();
            if next.kind == TokenKind::Identifier
                && COMPOUND_SUFFIXES.contains(extract::ident(next, self.src))
            {
                self.advance();
                base_type.push(' ');
                base_type.push_str(extract::ident(next, self.src));
            }
        }

        let mut pointer_depth = 0;
        let mut is_reference = false;
        loop {
            let c = self.peek();
            match c.kind {
                TokenKind::Star => pointer_depth += 1,
                TokenKind::Amp if is_reference => {
                    return Err(c.span().wrap_error(ParseErrorKind::DoubleReference));
                }
                TokenKind::Amp => is_reference = true,
                _ => break,
            }
            self.advance();
        }

        Ok(TypeInfo {
            base_type,
            pointer_depth,
            is_const,
            is_reference,
        })
    }

    fn parse_enum(&mut self) -> Result<EnumDef> {
        let keyword = self.consume(TokenKind::Enum)?;
        let name = self.parse_ident()?;
        self.consume(TokenKind::LBrace)?;

        let mut values = Vec::new();
        let mut next_value: i64 = 0;
        while self.except([TokenKind::RBrace]) {
            let value_token = self.consume(TokenKind::Identifier)?;
            let value_name = extract::ident(value_token, self.src).to_string();
            let (value, is_hex, span) = if self.take(TokenKind::Eq) {
                let number = self.consume(TokenKind::Number)?;
                let value = extract::int(number, self.src)
                    .map_err(|_| number.span().wrap_error(ParseErrorKind::InvalidNumber))?;
                (value, extract::is_hex(number, self.src), number.span())
            } else {
                (next_value, false, value_token.span())
            };
            let Some(value) = enum_value_to_i32(value, is_hex) else {
                return Err(span.wrap_error(ParseErrorKind::EnumValueOutOfRange {
                    name: value_name,
                    value,
                }));
            };
            values.push(EnumValue {
                name: value_name,
                value,
            });
            next_value = i64::from(value) + 1;

            if !self.take(TokenKind::Comma) {
                break;
            }
        }
        self.expect_block_end("enum", &name)?;
        self.take(TokenKind::Semicolon);

        Ok(EnumDef {
            name,
            values,
            namespace: self.namespace.clone(),
            line: keyword.line(),
        })
    }

    fn parse_struct(&mut self) -> Result<StructDef> {
        let keyword = self.consume(TokenKind::Struct)?;
        let name = self.parse_ident()?;
        self.consume(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while self.except([TokenKind::RBrace]) {
            let type_token = self.peek();
            let ty = self.parse_type()?;
            let field = self.parse_ident()?;
            if !types::is_struct_field_type(&ty) {
                return Err(type_token
                    .span()
                    .wrap_error(ParseErrorKind::NonPrimitiveStructField {
                        struct_name: name,
                        field,
                        ty: ty.to_string(),
                        line: type_token.line(),
                    }));
            }
            self.consume(TokenKind::Semicolon)?;
            fields.push(StructField { name: field, ty });
        }
        self.expect_block_end("struct", &name)?;
        self.take(TokenKind::Semicolon);

        Ok(StructDef {
            name,
            fields,
            namespace: self.namespace.clone(),
            line: keyword.line(),
        })
    }

    fn parse_optional_attributes(&mut self) -> Result<Attributes> {
        if self.is(TokenKind::LBracket) {
            self.parse_attributes()
        } else {
            Ok(Attributes::default())
        }
    }

    fn parse_attributes(&mut self) -> Result<Attributes> {
        use TokenKind::*;

        self.consume(LBracket)?;
        let attributes = self.parse_list(RBracket, Comma, |p| {
            let name_token = p.consume(Identifier)?;
            let name = extract::ident(name_token, p.src).to_string();
            let value = if p.take(LParen) {
                let t = p.consume_any(&[String, EscapedString, Number, Identifier])?;
                let value = match t.kind {
                    String | EscapedString => AttributeValue::String(extract::string(t, p.src)),
                    Number => AttributeValue::Number(
                        extract::int(t, p.src)
                            .map_err(|_| t.span().wrap_error(ParseErrorKind::InvalidNumber))?,
                    ),
                    _ => AttributeValue::Ident(extract::ident(t, p.src).to_string()),
                };
                p.consume(RParen)?;
                value
            } else {
                AttributeValue::Flag
            };

            if name == "uuid" {
                match &value {
                    AttributeValue::String(uuid) if is_canonical_uuid(uuid) => {}
                    AttributeValue::String(other) | AttributeValue::Ident(other) => {
                        let kind = ParseErrorKind::InvalidUuid(other.clone());
                        return Err(name_token.span().wrap_error(kind));
                    }
                    other => {
                        let kind = ParseErrorKind::InvalidUuid(other.to_string());
                        return Err(name_token.span().wrap_error(kind));
                    }
                }
            }
            Ok(Attribute { name, value })
        })?;
        self.consume(RBracket)?;

        let mut list = Attributes::default();
        for attribute in attributes {
            list.push(attribute);
        }
        Ok(list)
    }

    /// Parses `ID ('::' ID)*`.
    fn parse_qualified_name(&mut self) -> Result<String> {
        let mut name = self.parse_ident()?;
        while self.take(TokenKind::Colon) {
            self.consume(TokenKind::Colon)?;
            name.push_str("::");
            name.push_str(&self.parse_ident()?);
        }
        Ok(name)
    }

    fn parse_ident(&mut self) -> Result<String> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(extract::ident(token, self.src).to_string())
    }

    /// Parses `item (delim item)*` until `end_delim` is found. Does **NOT**
    /// consume the end delimiter.
    fn parse_list<T>(
        &mut self,
        end_delim: TokenKind,
        separator: TokenKind,
        parse_item: impl Fn(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        debug_assert_ne!(end_delim, separator);

        let mut items = Vec::new();
        while self.except([end_delim]) {
            items.push(parse_item(self)?);
            if !self.take(separator) {
                break;
            }
        }
        Ok(items)
    }

    /// Consumes the closing brace of a block, reporting a dedicated error if
    /// the input ends before it.
    fn expect_block_end(&mut self, construct: &'static str, name: &str) -> Result<()> {
        let c = self.peek();
        if c.is_eof() {
            return Err(c.span().wrap_error(ParseErrorKind::UnterminatedBlock {
                construct,
                name: name.to_string(),
            }));
        }
        self.consume(TokenKind::RBrace)?;
        Ok(())
    }
}

impl Parser<'_, '_> {
    fn new<'src, 'tok>(
        src: &'src str,
        tokens: &'tok [Token],
        options: ParseOptions,
    ) -> Parser<'src, 'tok> {
        let mut p = Parser {
            src,
            tokens,
            cursor: 0,
            options,
            namespace: String::new(),
            namespaces: BTreeSet::new(),
            document: IdlDocument::default(),
        };
        p.setup();
        p
    }

    /// Setups the parser, skipping any trivia if necessary.
    fn setup(&mut self) {
        while self.is_skippable(self.peek().kind) {
            self.cursor += 1;
        }
    }

    fn is_skippable(&self, kind: TokenKind) -> bool {
        kind.is_trivia() || (!self.options.strict && kind == TokenKind::ErrorUnexpectedChar)
    }

    /// Returns the current token.
    #[inline]
    fn peek(&self) -> Token {
        match self.tokens.get(self.cursor) {
            Some(token) => *token,
            None => self.tokens[self.tokens.len() - 1],
        }
    }

    /// Returns the current token and advances. Skips any trivia.
    fn advance(&mut self) -> Token {
        let c = self.peek();
        if !c.is_eof() {
            while {
                self.cursor += 1;
                self.is_skippable(self.peek().kind)
            } {}
        }
        c
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Like [`Parser::take`], for contextual words such as `const`.
    fn take_word(&mut self, word: &str) -> bool {
        let c = self.peek();
        if c.kind == TokenKind::Identifier && extract::ident(c, self.src) == word {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one. If not,
    /// fails.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        let c = self.peek();
        if self.is(expect) {
            self.advance();
            Ok(c)
        } else {
            Err(self.unexpected(c, || ParseErrorKind::Unexpected {
                actual: c.kind,
                expected: expect,
            }))
        }
    }

    /// Advances if the current token matches any of the provided tokens. If
    /// not, fails.
    fn consume_any(&mut self, expect: &'static [TokenKind]) -> Result<Token> {
        for t in expect {
            if self.is(*t) {
                return Ok(self.advance());
            }
        }
        let c = self.peek();
        Err(self.unexpected(c, || ParseErrorKind::UnexpectedAny {
            actual: c.kind,
            expected: Box::from(expect),
        }))
    }

    /// Returns true while the current token does *not* match one of the
    /// provided ones. [`TokenKind::Eof`] is implicitly included in the list.
    ///
    /// This won't advance the cursor.
    fn except(&self, except: impl IntoIterator<Item = TokenKind>) -> bool {
        let c = self.peek();
        for e in except {
            if c.kind == e {
                return false;
            }
        }
        c.kind != TokenKind::Eof
    }

    /// Builds the error for an unexpected token. Lexical error tokens get a
    /// dedicated error kind.
    fn unexpected(&self, token: Token, otherwise: impl FnOnce() -> ParseErrorKind) -> ParseError {
        let kind = match token.kind {
            TokenKind::ErrorUnexpectedChar => {
                let c = token.span().substr(self.src).chars().next().unwrap_or('\0');
                ParseErrorKind::UnexpectedChar(c)
            }
            TokenKind::ErrorUnclosedString => ParseErrorKind::UnclosedString,
            TokenKind::ErrorUnclosedComment => ParseErrorKind::UnclosedComment,
            _ => otherwise(),
        };
        token.span().wrap_error(kind)
    }
}

/// Checks the canonical `8-4-4-4-12` hexadecimal form, without braces.
pub fn is_canonical_uuid(uuid: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    let mut count = 0;
    for (group, expected_len) in uuid.split('-').zip(GROUPS) {
        if group.len() != expected_len || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
            return false;
        }
        count += 1;
    }
    count == GROUPS.len() && uuid.split('-').count() == GROUPS.len()
}

/// Hexadecimal literals may spell the bit pattern of a negative value (e.g.
/// `0xFFFFFFFF`).
fn enum_value_to_i32(value: i64, is_hex: bool) -> Option<i32> {
    match i32::try_from(value) {
        Ok(value) => Some(value),
        Err(_) if is_hex => u32::try_from(value)
            .ok()
            .map(|bits| i32::from_ne_bytes(bits.to_ne_bytes())),
        Err(_) => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("line {}: {kind}", .span.line)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn line(&self) -> u32 {
        self.span.line
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {actual}")]
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    #[error("expected one of {}, found {actual}", display_kinds(expected))]
    UnexpectedAny {
        actual: TokenKind,
        expected: Box<[TokenKind]>,
    },
    #[error("unexpected character `{}`", .0.escape_default())]
    UnexpectedChar(char),
    #[error("unterminated string literal")]
    UnclosedString,
    #[error("unterminated block comment")]
    UnclosedComment,
    #[error("invalid integer literal")]
    InvalidNumber,
    #[error("invalid uuid `{0}`, expected 8-4-4-4-12 hexadecimal digits")]
    InvalidUuid(String),
    #[error("multiple namespaces in one file: {}", .0.join(", "))]
    MultipleNamespaces(Vec<String>),
    #[error("interface `{interface}` cannot use `{keyword}` in its base clause")]
    IllegalBaseKeyword { interface: String, keyword: String },
    #[error(
        "struct `{struct_name}` field `{field}` has type `{ty}` at line {line}, \
         but struct fields must be primitive"
    )]
    NonPrimitiveStructField {
        struct_name: String,
        field: String,
        ty: String,
        line: u32,
    },
    #[error("unexpected end of file inside {construct} `{name}`")]
    UnterminatedBlock {
        construct: &'static str,
        name: String,
    },
    #[error("enum value `{name}` ({value}) does not fit in 32 bits")]
    EnumValueOutOfRange { name: String, value: i64 },
    #[error("a type may be a reference only once")]
    DoubleReference,
}

fn display_kinds(kinds: &[TokenKind]) -> String {
    let names: Vec<_> = kinds.iter().map(|k| k.describe()).collect();
    names.join(", ")
}

impl Span {
    fn wrap_error(self, kind: ParseErrorKind) -> ParseError {
        ParseError { kind, span: self }
    }
}

#[cfg(test)]
mod tests {
    use crate::util::test_utils::tree_tests;

    tree_tests!(
        use parser;

        fn test_empty_document() {
            let doc = "  // nothing here\n";
            let tree_ok = "";
        }

        fn test_interface_with_methods() {
            let doc = r#"
                [uuid("11111111-2222-3333-4444-555555555555")]
                interface IExample {
                    DasResult Add(int32 a, int32 b, [out] int32* sum);
                    void Reset() = 0;
                };
            "#;
            let tree_ok = r#"
                interface IExample : IDasBase (uuid 11111111-2222-3333-4444-555555555555, line 3)
                  method DasResult Add(in int32 a, in int32 b, out int32* sum) (line 4)
                  method void Reset() (line 5)
            "#;
        }

        fn test_interface_base_and_attributes() {
            let doc = r#"
                [uuid("AAAAAAAA-BBBB-cccc-dddd-000000000000"), swig_export, version(2)]
                interface IDerived : Das::IBase
                {
                    [binary_buffer] DasResult Read([out] unsigned char** data, [inout] size_t& size);
                    [get, set] DasBool Enabled;
                    [get] const char* Name
                }
            "#;
            let tree_ok = r#"
                interface IDerived : Das::IBase (uuid AAAAAAAA-BBBB-cccc-dddd-000000000000, line 3)
                  attribute swig_export
                  attribute version(2)
                  method DasResult Read(out unsigned char** data, inout size_t& size) (line 5)
                    attribute binary_buffer
                  property DasBool Enabled (get, set, line 6)
                  property const char* Name (get, line 7)
            "#;
        }

        fn test_namespace_records_path() {
            let doc = "
                namespace A::B {
                    interface IFoo { void Bar(); }
                    enum E { X }
                }
            ";
            let tree_ok = "
                namespace A::B
                interface IFoo : IDasBase (uuid -, line 3) in A::B
                  method void Bar() (line 3)
                enum E (line 4) in A::B
                  X = 0
            ";
        }

        fn test_namespace_reopened_with_same_path() {
            let doc = "
                namespace A { struct P { int x; } }
                namespace A { struct Q { int y; } }
            ";
            let tree_ok = "
                namespace A
                struct P (line 2) in A
                  int x
                struct Q (line 3) in A
                  int y
            ";
        }

        fn test_multiple_namespaces() {
            let doc = "
                namespace A { }
                namespace B { }
            ";
            let expected_errors = &["line 3: multiple namespaces in one file: A, B"];
        }

        fn test_nested_namespace_blocks_are_distinct() {
            let doc = "namespace A { namespace B { } }";
            let expected_errors = &["line 1: multiple namespaces in one file: A, A::B"];
        }

        fn test_unterminated_namespace() {
            let doc = "namespace A {\n interface IFoo { }\n";
            let expected_errors = &["line 3: unexpected end of file inside namespace `A`"];
        }

        fn test_unterminated_interface() {
            let doc = "interface IFoo {\n void Bar();\n";
            let expected_errors = &["line 3: unexpected end of file inside interface `IFoo`"];
        }

        fn test_enum_auto_increment() {
            let doc = "
                enum Color { Red, Green = 5, Blue, Neg = -3, After, Hex = 0x10, Bits = 0xFFFFFFFF, Wrap };
            ";
            let tree_ok = "
                enum Color (line 2)
                  Red = 0
                  Green = 5
                  Blue = 6
                  Neg = -3
                  After = -2
                  Hex = 16
                  Bits = -1
                  Wrap = 0
            ";
        }

        fn test_enum_value_out_of_range() {
            let doc = "enum E { A = 2147483648 }";
            let expected_errors = &["line 1: enum value `A` (2147483648) does not fit in 32 bits"];
        }

        fn test_enum_implicit_overflow() {
            let doc = "enum E {\n A = 0x7FFFFFFF,\n B\n}";
            let expected_errors = &["line 3: enum value `B` (2147483648) does not fit in 32 bits"];
        }

        fn test_struct_fields() {
            let doc = "struct Point { int32 x; unsigned long y; double z; };";
            let tree_ok = "
                struct Point (line 1)
                  int32 x
                  unsigned long y
                  double z
            ";
        }

        fn test_struct_interface_field() {
            let doc = "\nstruct S {\n    IFoo f;\n}";
            let expected_errors = &[
                "line 3: struct `S` field `f` has type `IFoo` at line 3, but struct fields must be primitive",
            ];
        }

        fn test_struct_pointer_field() {
            let doc = "struct S { int32* p; }";
            let expected_errors = &[
                "line 1: struct `S` field `p` has type `int32*` at line 1, but struct fields must be primitive",
            ];
        }

        fn test_struct_string_field() {
            let doc = "struct S { string name; }";
            let expected_errors = &[
                "line 1: struct `S` field `name` has type `string` at line 1, but struct fields must be primitive",
            ];
        }

        fn test_imports() {
            let doc = r#"
                import "base.idl";
                import 'sub/other.idl';
            "#;
            let tree_ok = r#"
                import "base.idl" (line 2)
                import "sub/other.idl" (line 3)
            "#;
        }

        fn test_unquoted_imports() {
            let doc = "
                import base.idl;
                import ../shared/das-types.idl ;
                import enum/v2.idl;
            ";
            let tree_ok = r#"
                import "base.idl" (line 2)
                import "../shared/das-types.idl" (line 3)
                import "enum/v2.idl" (line 4)
            "#;
        }

        fn test_unquoted_import_stops_at_whitespace() {
            let doc = "import base .idl;";
            let expected_errors = &["line 1: unexpected character `.`"];
        }

        fn test_invalid_uuid() {
            let doc = r#"[uuid("1234")] interface IFoo { }"#;
            let expected_errors = &[
                "line 1: invalid uuid `1234`, expected 8-4-4-4-12 hexadecimal digits",
            ];
        }

        fn test_braced_uuid_is_rejected() {
            let doc = r#"[uuid("{11111111-2222-3333-4444-555555555555}")] interface IFoo { }"#;
            let expected_errors = &[
                "line 1: invalid uuid `{11111111-2222-3333-4444-555555555555}`, expected 8-4-4-4-12 hexadecimal digits",
            ];
        }

        fn test_illegal_base_keyword() {
            let doc = "interface IFoo : public IBar { }";
            let expected_errors = &["line 1: interface `IFoo` cannot use `public` in its base clause"];
        }

        fn test_double_reference() {
            let doc = "interface IFoo { void Bar(int32&& x); }";
            let expected_errors = &["line 1: a type may be a reference only once"];
        }

        fn test_missing_method_semicolon() {
            let doc = "interface IFoo {\n void Bar()\n void Baz();\n}";
            let expected_errors = &["line 3: expected `;`, found identifier"];
        }

        fn test_unexpected_char_strict() {
            let doc = "interface IFoo { void Bar(); @ }";
            let expected_errors = &["line 1: unexpected character `@`"];
        }

        fn test_nul_does_not_end_input() {
            let doc = "namespace A { }\0namespace B { }";
            let expected_errors = &["line 1: unexpected character `\\u{0}`"];
        }

        fn test_unclosed_string() {
            let doc = "import \"oops;\n";
            let expected_errors = &["line 1: unterminated string literal"];
        }

        fn test_top_level_garbage() {
            let doc = "void Foo();";
            let expected_errors = &[
                "line 1: expected one of `import`, `namespace`, `interface`, `enum`, `struct`, found identifier",
            ];
        }
    );

    mod lenient {
        use pretty_assertions::assert_eq;

        use crate::parser::{parse_document, parse_document_with, ParseOptions};

        #[test]
        fn test_unknown_chars_are_skipped() {
            let src = "interface IFoo { void Bar(); @ # } $";
            assert!(parse_document(src).is_err());
            let doc = parse_document_with(src, ParseOptions::lenient()).unwrap();
            assert_eq!(doc.interfaces.len(), 1);
            assert_eq!(doc.interfaces[0].methods().count(), 1);
        }

        #[test]
        fn test_input_after_nul_is_still_parsed() {
            let err = parse_document_with(
                "namespace A { }\0namespace B { }",
                ParseOptions::lenient(),
            )
            .unwrap_err();
            assert_eq!(err.to_string(), "line 1: multiple namespaces in one file: A, B");
        }

        #[test]
        fn test_error_carries_column() {
            let err = parse_document("interface IFoo {\n  void Bar(;\n}").unwrap_err();
            assert_eq!((err.span.line, err.span.column), (2, 12));
        }
    }

    mod uuid {
        use crate::parser::is_canonical_uuid;

        #[test]
        fn test_canonical_uuid() {
            assert!(is_canonical_uuid("11111111-2222-3333-4444-555555555555"));
            assert!(is_canonical_uuid("abcdef12-ABCD-0000-0000-000000000000"));
            assert!(!is_canonical_uuid("11111111-2222-3333-4444-55555555555"));
            assert!(!is_canonical_uuid("11111111-2222-3333-4444-555555555555-1"));
            assert!(!is_canonical_uuid("1111111g-2222-3333-4444-555555555555"));
            assert!(!is_canonical_uuid(""));
        }
    }
}
