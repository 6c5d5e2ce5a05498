use memchr::memchr2;

use crate::constants::{
    is_keyword, is_newline, is_non_identifier_char, is_sign, DECODED_ESCAPES, ENCODED_ESCAPES,
};

/// Whether `value` reads back as the same bare identifier.
///
/// An identifier is a non-empty run of identifier characters that does not
/// start with a digit (after an optional sign) and is not a keyword. A
/// lone `+` or `-` qualifies.
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    let rest = if is_sign(first) {
        match chars.clone().next() {
            None => return true,
            Some(second) if second.is_ascii_digit() => return false,
            Some(_) => chars,
        }
    } else if first.is_ascii_digit() || is_non_identifier_char(first) {
        return false;
    } else {
        chars
    };

    rest.clone().all(|ch| !is_non_identifier_char(ch)) && !is_keyword(value)
}

/// Appends `value` to `out` with quoted-string escapes applied.
///
/// `/` is left alone; Unicode line terminators without a short escape are
/// written as `\u{...}` so the reader does not fold them into `\n`.
pub fn escape_string_into(out: &mut String, value: &str) {
    let bytes = value.as_bytes();
    if memchr2(b'"', b'\\', bytes).is_none() && bytes.iter().all(|byte| (0x20..0x7f).contains(byte)) {
        out.push_str(value);
        return;
    }

    for ch in value.chars() {
        let escape = DECODED_ESCAPES
            .iter()
            .position(|decoded| *decoded == ch)
            .filter(|_| ch != '/');
        match escape {
            Some(at) => {
                out.push('\\');
                out.push(ENCODED_ESCAPES[at]);
            }
            None if is_newline(ch) => {
                out.push_str(&format!("\\u{{{:x}}}", u32::from(ch)));
            }
            None => out.push(ch),
        }
    }
}

pub fn write_quoted(out: &mut String, value: &str) {
    out.reserve(value.len() + 2);
    out.push('"');
    escape_string_into(out, value);
    out.push('"');
}

/// Writes `value` bare when it is an identifier, quoted otherwise.
pub fn write_identifier(out: &mut String, value: &str) {
    if is_identifier(value) {
        out.push_str(value);
    } else {
        write_quoted(out, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case("hello", true)]
    #[case("hello-world", true)]
    #[case("-", true)]
    #[case("+", true)]
    #[case("-flag", true)]
    #[case("r#raw", true)]
    #[case("ünïcödé", true)]
    #[case("a1", true)]
    #[case("", false)]
    #[case("hello world", false)]
    #[case("1abc", false)]
    #[case("-1", false)]
    #[case("+5x", false)]
    #[case("true", false)]
    #[case("null", false)]
    #[case("a=b", false)]
    #[case("semi;colon", false)]
    #[case("quote\"d", false)]
    #[case("line\u{2028}sep", false)]
    #[case("nbsp\u{a0}", false)]
    fn test_is_identifier(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_identifier(value), expected, "{value:?}");
    }

    #[rstest::rstest]
    #[case("plain", "plain")]
    #[case("a\"b", "a\\\"b")]
    #[case("back\\slash", "back\\\\slash")]
    #[case("line\nbreak\ttab\r", "line\\nbreak\\ttab\\r")]
    #[case("\u{08}\u{0c}", "\\b\\f")]
    #[case("a/b", "a/b")]
    #[case("snow ☃", "snow ☃")]
    #[case("ls\u{2028}", "ls\\u{2028}")]
    #[case("nel\u{85}", "nel\\u{85}")]
    fn test_escape_string(#[case] value: &str, #[case] expected: &str) {
        let mut out = String::new();
        escape_string_into(&mut out, value);
        assert_eq!(out, expected);
    }

    #[rstest::rstest]
    fn test_write_identifier_quotes_when_needed() {
        let mut out = String::new();
        write_identifier(&mut out, "hello");
        out.push(' ');
        write_identifier(&mut out, "hello world");
        out.push(' ');
        write_identifier(&mut out, "false");
        assert_eq!(out, "hello \"hello world\" \"false\"");
    }
}
