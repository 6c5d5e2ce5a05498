pub const KEYWORDS: &[&str] = &["null", "true", "false"];

pub const DEFAULT_INDENT: &str = "    ";

pub const MAX_DEPTH: usize = 256;

/// Longest `\u{...}` payload accepted by the reader.
pub const MAX_UNICODE_ESCAPE_LEN: usize = 6;

pub const MAX_CODE_POINT: u32 = 0x10_ffff;

/// Escape letters and the characters they decode to, index-aligned.
pub const ENCODED_ESCAPES: &[char] = &['n', 'r', 't', '\\', '/', '"', 'b', 'f'];
pub const DECODED_ESCAPES: &[char] = &['\n', '\r', '\t', '\\', '/', '"', '\u{08}', '\u{0c}'];

pub const RESERVED_SYMBOLS: &[char] = &[
    '\\', '/', '(', ')', '{', '}', '<', '>', ';', '[', ']', '=', ',', '"',
];

#[inline]
pub fn is_sign(ch: char) -> bool {
    matches!(ch, '+' | '-')
}

#[inline]
pub fn keyword_index(s: &str) -> Option<usize> {
    KEYWORDS.iter().position(|keyword| *keyword == s)
}

#[inline]
pub fn is_keyword(s: &str) -> bool {
    keyword_index(s).is_some()
}

/// Line terminators other than CRLF, which the reader treats as one break.
#[inline]
pub fn is_newline(ch: char) -> bool {
    matches!(
        ch,
        '\u{0a}' | '\u{0c}' | '\u{0d}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

#[inline]
pub fn is_unicode_space(ch: char) -> bool {
    matches!(
        ch,
        '\u{09}'
            | '\u{20}'
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
            | '\u{feff}'
    )
}

/// Characters that end (or can never start) an identifier.
#[inline]
pub fn is_non_identifier_char(ch: char) -> bool {
    ch <= '\u{20}' || RESERVED_SYMBOLS.contains(&ch) || is_unicode_space(ch) || is_newline(ch)
}
