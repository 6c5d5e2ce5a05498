use smallvec::SmallVec;

pub type Digits = SmallVec<[u8; 32]>;

/// Renders signed digit values in `radix` as canonical decimal text.
///
/// `digits` holds one value per input digit, most significant first. The
/// conversion is repeated long division of the whole digit array by ten, so
/// the width of the input is unbounded. Leading zeros are dropped, an
/// all-zero input becomes `0`, and `-0` collapses to `0`.
pub fn canonical_integer(negative: bool, digits: &mut [u8], radix: u32) -> String {
    let decimal = if radix == 10 {
        let start = leading_zeros(digits);
        Digits::from_slice(&digits[start..])
    } else {
        to_decimal(digits, radix)
    };

    let mut out = String::with_capacity(decimal.len() + 1);
    if decimal.is_empty() {
        out.push('0');
        return out;
    }
    if negative {
        out.push('-');
    }
    out.extend(decimal.iter().map(|digit| char::from(b'0' + digit)));
    out
}

/// Converts digits of `radix` into decimal digits, most significant first.
/// Consumes `digits` as scratch space.
pub fn to_decimal(digits: &mut [u8], radix: u32) -> Digits {
    let mut reversed = Digits::new();
    let mut index = leading_zeros(digits);

    while index < digits.len() {
        let mut remainder = 0u32;
        for digit in &mut digits[index..] {
            remainder = remainder * radix + u32::from(*digit);
            *digit = (remainder / 10) as u8;
            remainder %= 10;
        }
        reversed.push(remainder as u8);
        index += leading_zeros(&digits[index..]);
    }

    reversed.reverse();
    reversed
}

fn leading_zeros(digits: &[u8]) -> usize {
    digits.iter().take_while(|digit| **digit == 0).count()
}

pub fn format_integer<I: itoa::Integer>(value: I) -> String {
    let mut buffer = itoa::Buffer::new();
    buffer.format(value).to_string()
}

/// Formats a finite float in the reader's canonical real form: an upper
/// case `E` with an explicit exponent sign.
pub fn format_real(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let mut buffer = ryu::Buffer::new();
    let raw = buffer.format_finite(value);
    Some(normalize_exponent(raw))
}

fn normalize_exponent(raw: &str) -> String {
    let Some(at) = raw.find(['e', 'E']) else {
        return raw.to_string();
    };
    let (mantissa, exponent) = (&raw[..at], &raw[at + 1..]);
    let mut out = String::with_capacity(raw.len() + 1);
    out.push_str(mantissa);
    out.push('E');
    if !exponent.starts_with(['-', '+']) {
        out.push('+');
    }
    out.push_str(exponent);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits_of(text: &str, radix: u32) -> Vec<u8> {
        text.chars()
            .map(|ch| ch.to_digit(radix).unwrap() as u8)
            .collect()
    }

    #[rstest::rstest]
    #[case("ff", 16, "255")]
    #[case("377", 8, "255")]
    #[case("11111111", 2, "255")]
    #[case("0000ff", 16, "255")]
    #[case("0", 16, "0")]
    #[case("10", 16, "16")]
    #[case("ffffffffffffffffffffffffffffffffffffffff", 16, "1461501637330902918203684832716283019655932542975")]
    fn test_radix_conversion(#[case] input: &str, #[case] radix: u32, #[case] expected: &str) {
        let mut digits = digits_of(input, radix);
        assert_eq!(canonical_integer(false, &mut digits, radix), expected);
    }

    #[rstest::rstest]
    fn test_decimal_keeps_arbitrary_width() {
        let text = "123456789012345678901234567890123456789012345678901234567890";
        let mut digits = digits_of(text, 10);
        assert_eq!(canonical_integer(true, &mut digits, 10), format!("-{text}"));
    }

    #[rstest::rstest]
    fn test_negative_zero_collapses() {
        let mut digits = vec![0, 0];
        assert_eq!(canonical_integer(true, &mut digits, 10), "0");
    }

    #[rstest::rstest]
    fn test_format_integer() {
        assert_eq!(format_integer(-42i64), "-42");
        assert_eq!(format_integer(u128::MAX), "340282366920938463463374607431768211455");
    }

    #[rstest::rstest]
    #[case(1.5, "1.5")]
    #[case(3.0, "3.0")]
    #[case(1e20, "1E+20")]
    #[case(1.5e-7, "1.5E-7")]
    #[case(-2.5e300, "-2.5E+300")]
    fn test_format_real(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_real(value).as_deref(), Some(expected));
    }

    #[rstest::rstest]
    fn test_non_finite_real_has_no_text() {
        assert_eq!(format_real(f64::NAN), None);
        assert_eq!(format_real(f64::INFINITY), None);
    }
}
