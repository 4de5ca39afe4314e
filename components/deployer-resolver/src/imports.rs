//! Import extraction for contract sources.
//!
//! The whole source is lexed so that malformed input is rejected, but only
//! top-level `import` declarations are parsed. Locations written as string
//! literals are returned; address and identifier locations are skipped.

use regex::Regex;
use tracing::debug;

use crate::errors::{ParseError, ParseErrors};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexItem {
    StringLiteral(String),
    AddressLiteral(String),
    NumberLiteral,
    Identifier(String),
    OpenDelimiter(char),
    CloseDelimiter(char),
    Comma,
    Punctuation,
}

#[derive(Debug, Clone, Copy)]
enum TokenType {
    Whitespace,
    LineComment,
    StringLiteral,
    UnterminatedString,
    AddressLiteral,
    NumberLiteral,
    Identifier,
    OpenDelimiter,
    CloseDelimiter,
    Comma,
    Punctuation,
}

struct LexMatcher {
    matcher: Regex,
    handler: TokenType,
}

impl LexMatcher {
    fn new(regex_str: &str, handles: TokenType) -> LexMatcher {
        LexMatcher {
            matcher: Regex::new(&format!("^{}", regex_str)).expect("invalid lexer expression"),
            handler: handles,
        }
    }
}

lazy_static! {
    static ref LEX_MATCHERS: Vec<LexMatcher> = vec![
        LexMatcher::new(r"[ \t\r\n]+", TokenType::Whitespace),
        LexMatcher::new(r"//[^\n]*", TokenType::LineComment),
        LexMatcher::new(
            r#""(?P<value>(\\[^\n]|[^"\\\n])*)""#,
            TokenType::StringLiteral
        ),
        LexMatcher::new(r#"""#, TokenType::UnterminatedString),
        LexMatcher::new(r"0x[0-9a-fA-F_]+", TokenType::AddressLiteral),
        LexMatcher::new(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?", TokenType::NumberLiteral),
        LexMatcher::new(r"[A-Za-z_][A-Za-z0-9_]*", TokenType::Identifier),
        LexMatcher::new(r"[{(\[]", TokenType::OpenDelimiter),
        LexMatcher::new(r"[})\]]", TokenType::CloseDelimiter),
        LexMatcher::new(r",", TokenType::Comma),
        LexMatcher::new(r"[.:;<>=+\-*/!&|?@%^~#$]", TokenType::Punctuation),
    ];
}

const IMPORT_KEYWORD: &str = "import";
const FROM_KEYWORD: &str = "from";

/// Tracks the 1-based line and column while the lexer munches input.
#[derive(Clone, Copy)]
struct Cursor {
    line: u32,
    column: u32,
}

impl Cursor {
    fn advance(&mut self, consumed: &str) {
        for c in consumed.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn error(&self, kind: ParseErrors) -> ParseError {
        ParseError::new(kind, self.line, self.column)
    }
}

/// Length of a block comment starting at the beginning of `input`, following
/// nested `/* */` pairs.
fn block_comment_len(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut depth = 0;
    let mut i = 0;
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
                    return Some(i);
                }
            }
            _ => i += 1,
        }
    }
    None
}

fn unescape(raw: &str) -> Result<String, ParseErrors> {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('0') => value.push('\0'),
            Some('\\') => value.push('\\'),
            Some('"') => value.push('"'),
            Some('\'') => value.push('\''),
            // String template: the interpolated expression is kept verbatim.
            Some('(') => value.push_str("\\("),
            Some('u') => {
                if chars.next() != Some('{') {
                    return Err(ParseErrors::InvalidEscape('u'));
                }
                let mut code = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(h) if h.is_ascii_hexdigit() && code.len() < 8 => code.push(h),
                        _ => return Err(ParseErrors::InvalidEscape('u')),
                    }
                }
                let decoded = u32::from_str_radix(&code, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(ParseErrors::InvalidEscape('u'))?;
                value.push(decoded);
            }
            Some(other) => return Err(ParseErrors::InvalidEscape(other)),
            None => return Err(ParseErrors::UnterminatedString),
        }
    }
    Ok(value)
}

/// Splits `input` into tokens, dropping whitespace and comments. Each token
/// carries its line and column.
pub fn lex(input: &str) -> Result<Vec<(LexItem, u32, u32)>, ParseError> {
    let mut result = Vec::new();
    let mut cursor = Cursor { line: 1, column: 1 };
    let mut munch_index = 0;

    while munch_index < input.len() {
        let current_slice = &input[munch_index..];

        if current_slice.starts_with("/*") {
            let len = block_comment_len(current_slice)
                .ok_or_else(|| cursor.error(ParseErrors::UnterminatedComment))?;
            cursor.advance(&current_slice[..len]);
            munch_index += len;
            continue;
        }

        let matched = LEX_MATCHERS.iter().find_map(|matcher| {
            matcher
                .matcher
                .captures(current_slice)
                .map(|captures| (matcher.handler, captures))
        });

        let (handler, captures) = match matched {
            Some(matched) => matched,
            None => {
                let c = current_slice.chars().next().unwrap_or_default();
                return Err(cursor.error(ParseErrors::UnexpectedCharacter(c)));
            }
        };
        let whole_match = &current_slice[..captures.get(0).map_or(0, |m| m.end())];

        let token = match handler {
            TokenType::Whitespace | TokenType::LineComment => None,
            TokenType::UnterminatedString => {
                return Err(cursor.error(ParseErrors::UnterminatedString));
            }
            TokenType::StringLiteral => {
                let raw = captures.name("value").map_or("", |m| m.as_str());
                let value = unescape(raw).map_err(|kind| cursor.error(kind))?;
                Some(LexItem::StringLiteral(value))
            }
            TokenType::AddressLiteral => Some(LexItem::AddressLiteral(whole_match.to_string())),
            TokenType::NumberLiteral => Some(LexItem::NumberLiteral),
            TokenType::Identifier => Some(LexItem::Identifier(whole_match.to_string())),
            TokenType::OpenDelimiter => whole_match.chars().next().map(LexItem::OpenDelimiter),
            TokenType::CloseDelimiter => whole_match.chars().next().map(LexItem::CloseDelimiter),
            TokenType::Comma => Some(LexItem::Comma),
            TokenType::Punctuation => Some(LexItem::Punctuation),
        };

        if let Some(token) = token {
            result.push((token, cursor.line, cursor.column));
        }
        cursor.advance(whole_match);
        munch_index += whole_match.len();
    }

    Ok(result)
}

/// Import declarations found in a source.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportDeclarations {
    /// String-literal locations, in source order.
    pub locations: Vec<String>,
    /// Declarations using address or identifier locations.
    pub skipped: usize,
}

struct ImportParser<'a> {
    tokens: &'a [(LexItem, u32, u32)],
    position: usize,
    end: (u32, u32),
}

impl<'a> ImportParser<'a> {
    fn peek(&self) -> Option<&'a LexItem> {
        self.tokens.get(self.position).map(|(item, _, _)| item)
    }

    fn next(&mut self) -> Option<&'a LexItem> {
        let item = self.peek();
        if item.is_some() {
            self.position += 1;
        }
        item
    }

    fn error_here(&self, kind: ParseErrors) -> ParseError {
        match self.tokens.get(self.position) {
            Some((_, line, column)) => ParseError::new(kind, *line, *column),
            None => ParseError::new(kind, self.end.0, self.end.1),
        }
    }

    /// Parses what follows an `import` keyword. Returns the location when it
    /// is a string literal.
    fn parse_import(&mut self) -> Result<Option<String>, ParseError> {
        match self.peek() {
            Some(LexItem::StringLiteral(location)) => {
                self.position += 1;
                return Ok(Some(location.clone()));
            }
            Some(LexItem::AddressLiteral(_)) => {
                self.position += 1;
                return Ok(None);
            }
            _ => {}
        }

        let mut identifiers = 0;
        loop {
            match self.peek() {
                Some(LexItem::Identifier(name)) if name != FROM_KEYWORD || identifiers == 0 => {
                    self.position += 1;
                    identifiers += 1;
                }
                _ => return Err(self.error_here(ParseErrors::ExpectedImportIdentifier)),
            }
            match self.peek() {
                Some(LexItem::Comma) => self.position += 1,
                _ => break,
            }
        }

        match self.peek() {
            Some(LexItem::Identifier(keyword)) if keyword == FROM_KEYWORD => {
                self.position += 1;
            }
            Some(LexItem::StringLiteral(_)) => {
                return Err(self.error_here(ParseErrors::MissingImportFrom))
            }
            _ if identifiers == 1 => return Ok(None),
            _ => return Err(self.error_here(ParseErrors::MissingImportFrom)),
        }

        match self.peek() {
            Some(LexItem::StringLiteral(location)) => {
                self.position += 1;
                Ok(Some(location.clone()))
            }
            Some(LexItem::AddressLiteral(_)) | Some(LexItem::Identifier(_)) => {
                self.position += 1;
                Ok(None)
            }
            _ => Err(self.error_here(ParseErrors::ExpectedImportLocation)),
        }
    }

    fn parse(&mut self) -> Result<ImportDeclarations, ParseError> {
        let mut declarations = ImportDeclarations::default();
        let mut delimiters: Vec<(char, u32, u32)> = Vec::new();

        let tokens = self.tokens;
        while self.position < tokens.len() {
            let (item, line, column) = &tokens[self.position];
            match item {
                LexItem::OpenDelimiter(c) => {
                    delimiters.push((*c, *line, *column));
                    self.position += 1;
                }
                LexItem::CloseDelimiter(c) => {
                    let expected = match c {
                        '}' => '{',
                        ')' => '(',
                        _ => '[',
                    };
                    match delimiters.pop() {
                        Some((open, _, _)) if open == expected => {}
                        _ => {
                            return Err(ParseError::new(
                                ParseErrors::UnbalancedDelimiter(*c),
                                *line,
                                *column,
                            ))
                        }
                    }
                    self.position += 1;
                }
                LexItem::Identifier(keyword) if keyword == IMPORT_KEYWORD && delimiters.is_empty() => {
                    self.position += 1;
                    match self.parse_import()? {
                        Some(location) => declarations.locations.push(location),
                        None => declarations.skipped += 1,
                    }
                }
                _ => {
                    self.next();
                }
            }
        }

        if let Some((open, line, column)) = delimiters.pop() {
            return Err(ParseError::new(
                ParseErrors::UnclosedDelimiter(open),
                line,
                column,
            ));
        }

        Ok(declarations)
    }
}

fn end_position(input: &str) -> (u32, u32) {
    let mut cursor = Cursor { line: 1, column: 1 };
    cursor.advance(input);
    (cursor.line, cursor.column)
}

/// Lexes `source` and collects every top-level import declaration.
pub fn parse_import_declarations(source: &str) -> Result<ImportDeclarations, ParseError> {
    let tokens = lex(source)?;
    let mut parser = ImportParser {
        tokens: &tokens,
        position: 0,
        end: end_position(source),
    };
    parser.parse()
}

/// Returns the string-literal import locations declared by `source`, in
/// source order and with duplicates preserved.
pub fn extract_imports(source: &[u8]) -> Result<Vec<String>, ParseError> {
    let source = std::str::from_utf8(source).map_err(|e| {
        let valid = &source[..e.valid_up_to()];
        let (line, column) = end_position(&String::from_utf8_lossy(valid));
        ParseError::new(ParseErrors::InvalidEncoding, line, column)
    })?;
    let declarations = parse_import_declarations(source)?;
    if declarations.skipped > 0 {
        debug!(
            "skipped {} import declaration(s) without a string location",
            declarations.skipped
        );
    }
    Ok(declarations.locations)
}
