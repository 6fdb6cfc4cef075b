//! §4.A: the two number forms the lowering pipeline and the encoder both
//! need to recognize: unsigned (decimal or `0x` hex), and signed, for the
//! negative-literal lowering pass.

use std::convert::TryFrom;

/// Parses a decimal or `0x`/`0X`-prefixed hexadecimal unsigned integer.
/// Delegates to the machine's own loader parser so both ends of the
/// toolchain agree on what a number literal looks like.
pub fn parse_unsigned(text: &str) -> Option<u32> {
    vscpu::memory::parse_number(text)
}

/// Parses a signed 32-bit integer, decimal or `0x`-prefixed hex. Used by
/// the negative-literal lowering pass (§4.C pass 8), which needs to know
/// both the sign and the absolute value of an operand.
pub fn parse_signed(text: &str) -> Option<i32> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok().and_then(|v| i32::try_from(v).ok())
    } else {
        text.parse::<i32>().ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_decimal_and_hex_unsigned() {
        assert_eq!(parse_unsigned("42"), Some(42));
        assert_eq!(parse_unsigned("0x2A"), Some(42));
    }

    #[test]
    fn parses_negative_decimal() {
        assert_eq!(parse_signed("-7"), Some(-7));
        assert_eq!(parse_signed("7"), Some(7));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_unsigned("abc"), None);
        assert_eq!(parse_signed("abc"), None);
    }
}
