use std::io::{self, Read};

use crate::constants::{
    is_keyword, is_newline, is_non_identifier_char, is_sign, is_unicode_space, DECODED_ESCAPES,
    ENCODED_ESCAPES, KEYWORDS, MAX_CODE_POINT, MAX_UNICODE_ESCAPE_LEN,
};
use crate::decode::source::{CharSource, Exhausted, IoSource};
use crate::num::number::{canonical_integer, Digits};
use crate::pool::Pool;
use crate::token::{DataType, TokenRef, TokenTable};
use crate::{Error, Result};

const REFILL: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Literal {
    SlashDashComment,
    NodeSpace,
    WhiteSpace,
    LineSpace,
    NodeTerminator,
}

/// Cursor over a character source with on-demand lookahead.
///
/// In-memory input is copied into the lookahead buffer up front; a
/// [`CharSource`] is pulled from only when [`peek`](Reader::peek) runs past
/// what is buffered, and the consumed prefix is dropped before each refill.
pub struct Reader<S = Exhausted> {
    buffer: Vec<char>,
    position: usize,
    source: Option<S>,
    line: usize,
    column: usize,
    failure: Option<io::Error>,
}

impl Reader<Exhausted> {
    pub fn new(input: &str) -> Self {
        let mut buffer = Vec::with_capacity(input.len());
        buffer.extend(input.chars());
        Self::with_buffer(buffer, None)
    }

    /// Like [`Reader::new`], with the lookahead buffer taken from `pool`.
    pub fn with_pool(input: &str, pool: &mut Pool) -> Self {
        let mut buffer = pool.take_buffer(input.len());
        buffer.extend(input.chars());
        Self::with_buffer(buffer, None)
    }
}

impl<'a> From<&'a str> for Reader<Exhausted> {
    fn from(input: &'a str) -> Self {
        Reader::new(input)
    }
}

impl<R: Read> Reader<IoSource<R>> {
    pub fn from_read(inner: R) -> Self {
        Reader::from_source(IoSource::new(inner))
    }

    pub fn from_read_in(inner: R, pool: &mut Pool) -> Self {
        Reader::from_source_in(IoSource::new(inner), pool)
    }
}

impl<S: CharSource> Reader<S> {
    pub fn from_source(source: S) -> Self {
        Self::with_buffer(Vec::with_capacity(REFILL), Some(source))
    }

    /// Like [`Reader::from_source`], with the lookahead buffer taken from
    /// `pool`. Hand it back with [`Reader::release`].
    pub fn from_source_in(source: S, pool: &mut Pool) -> Self {
        Self::with_buffer(pool.take_buffer(REFILL), Some(source))
    }

    fn with_buffer(buffer: Vec<char>, source: Option<S>) -> Self {
        Self {
            buffer,
            position: 0,
            source,
            line: 0,
            column: 0,
            failure: None,
        }
    }

    /// Hands the lookahead buffer back to `pool`.
    pub fn release(self, pool: &mut Pool) {
        pool.put_buffer(self.buffer);
    }

    /// 1-based `(line, column)` of the cursor.
    pub fn position(&self) -> (usize, usize) {
        (self.line + 1, self.column + 1)
    }

    pub fn is_done(&mut self) -> bool {
        self.peek(0).is_none()
    }

    pub fn peek(&mut self, offset: usize) -> Option<char> {
        match self.buffer.get(self.position + offset) {
            Some(ch) => Some(*ch),
            None => self.fill(offset),
        }
    }

    fn fill(&mut self, offset: usize) -> Option<char> {
        let source = self.source.as_mut()?;

        if self.position > 0 {
            self.buffer.drain(..self.position.min(self.buffer.len()));
            self.position = 0;
        }

        let mut failure = None;
        let mut exhausted = false;
        while offset >= self.buffer.len() {
            let wanted = (offset + 1 - self.buffer.len()).max(REFILL);
            match source.read_chars(&mut self.buffer, wanted) {
                Ok(0) => {
                    exhausted = true;
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if exhausted || failure.is_some() {
            self.source = None;
            self.failure = failure;
        }
        self.buffer.get(offset).copied()
    }

    fn advance(&mut self, count: usize) {
        debug_assert!(self.position + count <= self.buffer.len());
        self.position += count;
        self.column += count;
    }

    fn next_char(&mut self) -> Option<char> {
        let symbol = self.peek(0)?;
        self.advance(1);
        Some(symbol)
    }

    pub fn scan_symbol(&mut self, symbol: char) -> bool {
        let matched = self.peek(0) == Some(symbol);
        if matched {
            self.advance(1);
        }
        matched
    }

    fn match_sequence(&mut self, offset: usize, sequence: &str) -> bool {
        sequence
            .chars()
            .enumerate()
            .all(|(i, expected)| self.peek(offset + i) == Some(expected))
    }

    fn scan_sequence(&mut self, sequence: &str) -> bool {
        if !self.match_sequence(0, sequence) {
            return false;
        }
        self.advance(sequence.chars().count());
        true
    }

    /// Error at the cursor, with any pending I/O failure of the source
    /// attached as the cause.
    pub(crate) fn error(&mut self, message: impl Into<String>) -> Error {
        let line = self.line;
        self.error_on_line(line, message)
    }

    /// Error at the cursor's column, reported on the 0-based `line`.
    fn error_on_line(&mut self, line: usize, message: impl Into<String>) -> Error {
        let error = Error::new(line + 1, self.column + 1, message);
        match self.failure.take() {
            Some(cause) => error.with_cause(cause),
            None => error,
        }
    }

    pub(crate) fn expectation_error(&mut self, expected: &str) -> Error {
        let found = self.peek(0);
        let (line, column) = self.position();
        let error = Error::expectation(line, column, expected, found);
        match self.failure.take() {
            Some(cause) => error.with_cause(cause),
            None => error,
        }
    }

    /// Fails if the source broke off with an I/O error.
    pub(crate) fn check_failure(&mut self) -> Result<()> {
        if self.failure.is_some() {
            return Err(self.error("failed to read input"));
        }
        Ok(())
    }

    pub(crate) fn scan(&mut self, literal: Literal) -> Result<bool> {
        Ok(match literal {
            Literal::SlashDashComment => self.scan_slash_dash_comment()?,
            Literal::NodeSpace => self.scan_node_space()?,
            Literal::WhiteSpace => self.scan_unicode_space() || self.scan_multi_line_comment()?,
            Literal::LineSpace => {
                self.scan_newline()
                    || self.scan_unicode_space()
                    || self.scan_multi_line_comment()?
                    || self.scan_single_line_comment()
            }
            Literal::NodeTerminator => {
                self.scan_symbol(';')
                    || self.is_done()
                    || self.scan_newline()
                    || self.scan_single_line_comment()
            }
        })
    }

    /// Repeats `literal` while it matches. `NodeTerminator` matches end of
    /// input without consuming it, so it is scanned once.
    pub(crate) fn scan_all(&mut self, literal: Literal) -> Result<bool> {
        if literal == Literal::NodeTerminator {
            return self.scan(literal);
        }
        let mut scanned = false;
        while self.scan(literal)? {
            scanned = true;
        }
        Ok(scanned)
    }

    fn scan_newline(&mut self) -> bool {
        let count = match self.peek(0) {
            Some('\r') if self.peek(1) == Some('\n') => 2,
            Some(ch) if is_newline(ch) => 1,
            _ => return false,
        };
        self.advance(count);
        self.line += 1;
        self.column = 0;
        true
    }

    fn scan_unicode_space(&mut self) -> bool {
        match self.peek(0) {
            Some(ch) if is_unicode_space(ch) => {
                self.advance(1);
                true
            }
            _ => false,
        }
    }

    fn scan_whitespace(&mut self) -> Result<bool> {
        self.scan_all(Literal::WhiteSpace)
    }

    fn scan_multi_line_comment(&mut self) -> Result<bool> {
        if !self.scan_sequence("/*") {
            return Ok(false);
        }
        while !self.scan_sequence("*/") {
            if self.scan_multi_line_comment()? || self.scan_newline() {
                continue;
            }
            if self.next_char().is_none() {
                return Err(self.error("Unexpected EOF in multi-line comment"));
            }
        }
        Ok(true)
    }

    fn scan_single_line_comment(&mut self) -> bool {
        if !self.scan_sequence("//") {
            return false;
        }
        while !self.scan_newline() && self.next_char().is_some() {}
        true
    }

    fn scan_slash_dash_comment(&mut self) -> Result<bool> {
        if !self.scan_sequence("/-") {
            return Ok(false);
        }
        while self.scan_node_space()? {}
        Ok(true)
    }

    fn scan_escline(&mut self) -> Result<bool> {
        if !self.scan_symbol('\\') {
            return Ok(false);
        }
        while self.scan_unicode_space() {}
        if self.scan_newline() || self.scan_single_line_comment() {
            return Ok(true);
        }
        Err(self.expectation_error("Line break or Single line comment"))
    }

    fn scan_node_space(&mut self) -> Result<bool> {
        let before = self.scan_whitespace()?;
        let escline = self.scan_escline()?;
        let after = self.scan_whitespace()?;
        Ok(before | escline | after)
    }

    pub fn read_annotation(&mut self, tokens: &mut TokenTable) -> Result<Option<TokenRef>> {
        if !self.scan_symbol('(') {
            return Ok(None);
        }
        let token = match self.read_string(tokens)? {
            Some(token) => token,
            None => match self.read_identifier(tokens) {
                Some(token) => token,
                None => return Err(self.expectation_error("String or Identifier")),
            },
        };
        if !self.scan_symbol(')') {
            return Err(self.expectation_error(")"));
        }
        Ok(Some(token))
    }

    /// Reads a bare identifier. Leaves the cursor alone and returns `None`
    /// for numbers, reserved symbols and keywords.
    pub fn read_identifier(&mut self, tokens: &mut TokenTable) -> Option<TokenRef> {
        let mut text = String::new();
        let mut offset = 0;
        let mut symbol = self.peek(0);

        if let Some(sign) = symbol.filter(|ch| is_sign(*ch)) {
            text.push(sign);
            offset = 1;
            symbol = self.peek(1);
        }

        match symbol {
            Some(ch) if !is_non_identifier_char(ch) && !ch.is_ascii_digit() => {}
            _ if offset == 0 => return None,
            _ => {
                self.advance(offset);
                return Some(tokens.allocate_token(DataType::String, &text));
            }
        }

        while let Some(ch) = symbol.filter(|ch| !is_non_identifier_char(*ch)) {
            text.push(ch);
            offset += 1;
            symbol = self.peek(offset);
        }

        if is_keyword(&text) {
            return None;
        }
        self.advance(offset);
        Some(tokens.allocate_token(DataType::String, &text))
    }

    pub fn read_value(&mut self, tokens: &mut TokenTable) -> Result<Option<TokenRef>> {
        if let Some(token) = self.read_string(tokens)? {
            return Ok(Some(token));
        }
        if let Some(token) = self.read_number(tokens) {
            return Ok(Some(token));
        }
        Ok(self.read_keyword(tokens))
    }

    pub fn read_string(&mut self, tokens: &mut TokenTable) -> Result<Option<TokenRef>> {
        match self.read_raw_string(tokens)? {
            Some(token) => Ok(Some(token)),
            None => self.read_escaped_string(tokens),
        }
    }

    fn read_escaped_string(&mut self, tokens: &mut TokenTable) -> Result<Option<TokenRef>> {
        if !self.scan_symbol('"') {
            return Ok(None);
        }

        let opened = self.line;
        let mut text = String::new();
        loop {
            if self.scan_newline() {
                text.push('\n');
                continue;
            }
            match self.next_char() {
                Some('"') => break,
                Some('\\') => self.read_escape(&mut text)?,
                Some(symbol) => text.push(symbol),
                None => return Err(self.error_on_line(opened, "Unexpected EOF in string")),
            }
        }

        Ok(Some(tokens.allocate_token(DataType::String, &text)))
    }

    fn read_escape(&mut self, text: &mut String) -> Result<()> {
        let Some(escaped) = self.next_char() else {
            return Err(self.error("Unexpected EOF in escape sequence"));
        };
        if let Some(at) = ENCODED_ESCAPES.iter().position(|ch| *ch == escaped) {
            text.push(DECODED_ESCAPES[at]);
            return Ok(());
        }
        if escaped != 'u' {
            return Err(self.error(format!("Invalid escape sequence '\\{escaped}'")));
        }
        if !self.scan_symbol('{') {
            return Err(self.expectation_error("{"));
        }

        let mut code_point = match self.next_char().and_then(|digit| digit.to_digit(16)) {
            Some(value) => value,
            None => return Err(self.error("Invalid unicode point data")),
        };
        let mut length = 1;
        loop {
            match self.peek(0) {
                Some('}') => {
                    self.advance(1);
                    break;
                }
                _ if length >= MAX_UNICODE_ESCAPE_LEN => return Err(self.expectation_error("}")),
                Some(digit) => match digit.to_digit(16) {
                    Some(value) => {
                        self.advance(1);
                        code_point = (code_point << 4) | value;
                    }
                    None => {
                        return Err(
                            self.error(format!("Expected hex digit or '}}' but got '{digit}'"))
                        )
                    }
                },
                None => return Err(self.expectation_error("}")),
            }
            length += 1;
        }

        if code_point > MAX_CODE_POINT {
            return Err(self.error(format!("Invalid unicode code point {code_point:x}")));
        }
        match char::from_u32(code_point) {
            Some(ch) => {
                text.push(ch);
                Ok(())
            }
            None => Err(self.error(format!("Invalid unicode symbol value {code_point:x}"))),
        }
    }

    fn read_raw_string(&mut self, tokens: &mut TokenTable) -> Result<Option<TokenRef>> {
        if self.peek(0) != Some('r') {
            return Ok(None);
        }

        let mut offset = 1;
        let mut hashes = 0;
        loop {
            match self.peek(offset) {
                Some('#') => hashes += 1,
                Some('"') => break,
                _ => return Ok(None),
            }
            offset += 1;
        }

        let mut closing = String::with_capacity(hashes + 1);
        closing.push('"');
        closing.push_str(&"#".repeat(hashes));
        self.advance(offset + 1);

        let opened = self.line;
        let mut text = String::new();
        loop {
            if self.scan_sequence(&closing) {
                break;
            }
            if self.scan_newline() {
                text.push('\n');
                continue;
            }
            match self.next_char() {
                Some(symbol) => text.push(symbol),
                None => {
                    let message = format!("expected '{closing}' but got 'EOF'");
                    return Err(self.error_on_line(opened, message));
                }
            }
        }

        Ok(Some(tokens.allocate_token(DataType::String, &text)))
    }

    pub fn read_number(&mut self, tokens: &mut TokenTable) -> Option<TokenRef> {
        self.read_real(tokens).or_else(|| self.read_integer(tokens))
    }

    /// Reads a decimal with a fraction and/or exponent. Plain integers are
    /// left for [`Reader::read_integer`].
    pub fn read_real(&mut self, tokens: &mut TokenTable) -> Option<TokenRef> {
        let sign = self.peek(0);
        let mut offset = usize::from(sign.is_some_and(is_sign));

        let first = self.peek(offset).filter(char::is_ascii_digit)?;
        offset += 1;

        let mut text = String::new();
        if sign == Some('-') {
            text.push('-');
        }
        text.push(first);

        let mut fraction = false;
        let mut exponent = false;
        while !fraction && !exponent {
            match self.peek(offset) {
                Some('_') => {}
                Some('.') => {
                    text.push('.');
                    fraction = true;
                }
                Some('e' | 'E') => {
                    text.push('E');
                    exponent = true;
                }
                Some(digit) if digit.is_ascii_digit() => text.push(digit),
                _ => return None,
            }
            offset += 1;
        }

        if fraction {
            text.push(self.peek(offset).filter(char::is_ascii_digit)?);
            offset += 1;
            loop {
                match self.peek(offset) {
                    Some('_') => {}
                    Some('e' | 'E') => {
                        text.push('E');
                        exponent = true;
                        offset += 1;
                        break;
                    }
                    Some(digit) if digit.is_ascii_digit() => text.push(digit),
                    _ => break,
                }
                offset += 1;
            }
        }

        if exponent {
            match self.peek(offset) {
                Some(sign) if is_sign(sign) => {
                    text.push(sign);
                    offset += 1;
                }
                Some(digit) if digit.is_ascii_digit() => text.push('+'),
                _ => return None,
            }
            text.push(self.peek(offset).filter(char::is_ascii_digit)?);
            offset += 1;
            loop {
                match self.peek(offset) {
                    Some('_') => {}
                    Some(digit) if digit.is_ascii_digit() => text.push(digit),
                    _ => break,
                }
                offset += 1;
            }
        }

        self.advance(offset);
        Some(tokens.allocate_token(DataType::Real, &text))
    }

    /// Reads a decimal, `0x`, `0o` or `0b` integer and stores it as
    /// canonical decimal text.
    pub fn read_integer(&mut self, tokens: &mut TokenTable) -> Option<TokenRef> {
        let sign = self.peek(0);
        let mut offset = usize::from(sign.is_some_and(is_sign));

        let radix = match (self.peek(offset), self.peek(offset + 1)) {
            (Some('0'), Some('x')) => 16,
            (Some('0'), Some('o')) => 8,
            (Some('0'), Some('b')) => 2,
            _ => 10,
        };
        if radix != 10 {
            offset += 2;
        }

        let mut digits = Digits::new();
        let first = self.peek(offset).and_then(|digit| digit.to_digit(radix))?;
        digits.push(first as u8);
        offset += 1;

        loop {
            match self.peek(offset) {
                Some('_') => {}
                Some(symbol) => match symbol.to_digit(radix) {
                    Some(value) => digits.push(value as u8),
                    None => break,
                },
                None => break,
            }
            offset += 1;
        }

        let text = canonical_integer(sign == Some('-'), &mut digits, radix);
        self.advance(offset);
        Some(tokens.allocate_token(DataType::Integer, &text))
    }

    pub fn read_keyword(&mut self, tokens: &mut TokenTable) -> Option<TokenRef> {
        let index = KEYWORDS
            .iter()
            .position(|keyword| self.scan_sequence(keyword))?;
        Some(tokens.allocate_keyword_token(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_with<F>(input: &str, read: F) -> (Option<String>, DataType, (usize, usize))
    where
        F: FnOnce(&mut Reader, &mut TokenTable) -> Option<TokenRef>,
    {
        let mut reader = Reader::new(input);
        let mut tokens = TokenTable::new();
        match read(&mut reader, &mut tokens) {
            Some(token) => (
                Some(tokens.get_token_data(token).to_string()),
                tokens.get_token_kind(token),
                reader.position(),
            ),
            None => (None, DataType::String, reader.position()),
        }
    }

    #[rstest::rstest]
    #[case("hello rest", Some("hello"))]
    #[case("-", Some("-"))]
    #[case("+flag", Some("+flag"))]
    #[case("-5", Some("-"))]
    #[case("a=b", Some("a"))]
    #[case("true", None)]
    #[case("truest", Some("truest"))]
    #[case("9lives", None)]
    #[case("{", None)]
    #[case("", None)]
    fn test_read_identifier(#[case] input: &str, #[case] expected: Option<&str>) {
        let (text, _, _) = read_with(input, |reader, tokens| reader.read_identifier(tokens));
        assert_eq!(text.as_deref(), expected);
    }

    #[rstest::rstest]
    #[case("255", "255")]
    #[case("0xFF", "255")]
    #[case("0xff", "255")]
    #[case("0o377", "255")]
    #[case("0b1111_1111", "255")]
    #[case("-0x10", "-16")]
    #[case("+42", "42")]
    #[case("1_000_000", "1000000")]
    #[case("007", "7")]
    #[case("-0", "0")]
    fn test_read_integer(#[case] input: &str, #[case] expected: &str) {
        let (text, kind, _) = read_with(input, |reader, tokens| reader.read_number(tokens));
        assert_eq!(text.as_deref(), Some(expected));
        assert_eq!(kind, DataType::Integer);
    }

    #[rstest::rstest]
    #[case("3.0", "3.0")]
    #[case("-1.25", "-1.25")]
    #[case("+1.5", "1.5")]
    #[case("1e10", "1E+10")]
    #[case("1.5e-3", "1.5E-3")]
    #[case("2E+2", "2E+2")]
    #[case("1_0.0_1", "10.01")]
    fn test_read_real(#[case] input: &str, #[case] expected: &str) {
        let (text, kind, _) = read_with(input, |reader, tokens| reader.read_number(tokens));
        assert_eq!(text.as_deref(), Some(expected));
        assert_eq!(kind, DataType::Real);
    }

    #[rstest::rstest]
    #[case("1.", Some("1"))]
    #[case("1e", Some("1"))]
    #[case("1e+", Some("1"))]
    #[case("0x", None)]
    #[case("x1", None)]
    fn test_malformed_numbers_fall_back(#[case] input: &str, #[case] expected: Option<&str>) {
        let (text, _, position) = read_with(input, |reader, tokens| reader.read_number(tokens));
        assert_eq!(text.as_deref(), expected);
        if expected.is_some() {
            assert_eq!(position, (1, 2));
        }
    }

    #[rstest::rstest]
    fn test_real_consumes_exactly_its_text() {
        let (_, _, position) = read_with("1.5 rest", |reader, tokens| reader.read_number(tokens));
        assert_eq!(position, (1, 4));
    }

    #[rstest::rstest]
    #[case(r#""plain""#, "plain")]
    #[case(r#""a\"b\\c""#, "a\"b\\c")]
    #[case(r#""\n\r\t\/\b\f""#, "\n\r\t/\u{08}\u{0c}")]
    #[case(r#""\u{41}\u{1F600}""#, "A😀")]
    #[case("\"two\nlines\"", "two\nlines")]
    #[case("\"crlf\r\nline\"", "crlf\nline")]
    #[case(r##"r"no \n escape""##, "no \\n escape")]
    #[case(r###"r#"has "quotes""#"###, "has \"quotes\"")]
    #[case(r###"r##"a "# b"##"###, "a \"# b")]
    fn test_read_string(#[case] input: &str, #[case] expected: &str) {
        let mut reader = Reader::new(input);
        let mut tokens = TokenTable::new();
        let token = reader.read_string(&mut tokens).unwrap().unwrap();
        assert_eq!(tokens.get_token_data(token), expected);
        assert!(reader.is_done());
    }

    #[rstest::rstest]
    #[case(r#""bad \q""#, "Invalid escape sequence '\\q'")]
    #[case(r#""\u{110000}""#, "Invalid unicode code point 110000")]
    #[case(r#""\u{D800}""#, "Invalid unicode symbol value d800")]
    #[case(r#""\u{1234567}""#, "expected '}' but got '7'")]
    #[case(r#""\u41""#, "expected '{' but got '4'")]
    #[case(r#""\u{}""#, "Invalid unicode point data")]
    #[case(r#""\u{4x}""#, "Expected hex digit or '}' but got 'x'")]
    #[case("\"open", "Unexpected EOF in string")]
    #[case("r#\"open\"", "expected '\"#' but got 'EOF'")]
    fn test_string_errors(#[case] input: &str, #[case] message: &str) {
        let mut reader = Reader::new(input);
        let mut tokens = TokenTable::new();
        let err = reader.read_string(&mut tokens).unwrap_err();
        assert_eq!(err.message, message);
    }

    #[rstest::rstest]
    #[case("\"abc", (1, 5))]
    #[case("\"ab\ncd", (1, 3))]
    #[case("r##\"a\"#\n\nxyz", (1, 4))]
    fn test_unterminated_string_reports_opening_line(
        #[case] input: &str,
        #[case] location: (usize, usize),
    ) {
        let mut reader = Reader::new(input);
        let err = reader.read_string(&mut TokenTable::new()).unwrap_err();
        assert_eq!(err.location(), location);
    }

    #[rstest::rstest]
    #[case("null", "null")]
    #[case("true", "true")]
    #[case("false", "false")]
    fn test_read_keyword(#[case] input: &str, #[case] expected: &str) {
        let (text, kind, _) = read_with(input, |reader, tokens| reader.read_keyword(tokens));
        assert_eq!(text.as_deref(), Some(expected));
        assert_eq!(kind, DataType::Keyword);
    }

    #[rstest::rstest]
    fn test_read_annotation() {
        let mut reader = Reader::new("(u8)(\"quoted type\")(");
        let mut tokens = TokenTable::new();
        let first = reader.read_annotation(&mut tokens).unwrap().unwrap();
        let second = reader.read_annotation(&mut tokens).unwrap().unwrap();
        assert_eq!(tokens.get_token_data(first), "u8");
        assert_eq!(tokens.get_token_data(second), "quoted type");

        let err = reader.read_annotation(&mut tokens).unwrap_err();
        assert_eq!(err.message, "expected 'String or Identifier' but got 'EOF'");
    }

    #[rstest::rstest]
    fn test_line_space_tracks_lines() {
        let mut reader = Reader::new("// c\n/* a\n /* nested */ */\r\n\u{2028}  x");
        assert!(reader.scan_all(Literal::LineSpace).unwrap());
        assert_eq!(reader.position(), (5, 3));
        assert_eq!(reader.peek(0), Some('x'));
    }

    #[rstest::rstest]
    fn test_unterminated_block_comment() {
        let mut reader = Reader::new("/* /* */");
        let err = reader.scan(Literal::LineSpace).unwrap_err();
        assert_eq!(err.message, "Unexpected EOF in multi-line comment");
    }

    #[rstest::rstest]
    fn test_escline_continues_a_line() {
        let mut reader = Reader::new("  \\  // note\n  next");
        assert!(reader.scan_all(Literal::NodeSpace).unwrap());
        assert_eq!(reader.peek(0), Some('n'));

        let mut reader = Reader::new("\\ x");
        let err = reader.scan(Literal::NodeSpace).unwrap_err();
        assert_eq!(
            err.message,
            "expected 'Line break or Single line comment' but got 'x'"
        );
    }

    #[rstest::rstest]
    fn test_node_terminators() {
        for input in [";", "\n", "// tail", ""] {
            let mut reader = Reader::new(input);
            assert!(reader.scan(Literal::NodeTerminator).unwrap(), "{input:?}");
        }
        let mut reader = Reader::new("x");
        assert!(!reader.scan(Literal::NodeTerminator).unwrap());
    }

    #[rstest::rstest]
    fn test_pull_source_refills_and_compacts() {
        let text = "node 1\n".repeat(600);
        let mut reader = Reader::from_source(text.chars().fuse());
        let mut tokens = TokenTable::new();
        let mut count = 0;
        while !reader.is_done() {
            reader.read_identifier(&mut tokens).unwrap();
            assert!(reader.scan_all(Literal::NodeSpace).unwrap());
            reader.read_number(&mut tokens).unwrap();
            assert!(reader.scan(Literal::NodeTerminator).unwrap());
            count += 1;
        }
        assert_eq!(count, 600);
        assert_eq!(reader.position(), (601, 1));
        assert!(reader.buffer.capacity() < text.len());
    }

    #[rstest::rstest]
    fn test_pool_backed_reader() {
        let mut pool = Pool::new();
        let mut reader = Reader::with_pool("abc", &mut pool);
        assert_eq!(reader.peek(2), Some('c'));
        reader.release(&mut pool);
        assert_eq!(pool.retained_buffers(), 1);
    }
}
