//! Leaf codecs: conversion between scalar values and their text form.
//!
//! A scanned [`Parameter`](crate::types::Parameter) is bound to a value through
//! the [`Leaf`] capability. Implementations are provided for `bool`, every
//! integer width, `f32`, `f64`, `String` and [`Duration`]. User types take part
//! by returning themselves from [`Walk::leaf`](crate::walk::Walk::leaf) and
//! [`Walk::leaf_mut`](crate::walk::Walk::leaf_mut).
//!
//! ## Text syntax
//!
//! - **bool**: `1 t T TRUE true True` and `0 f F FALSE false False`
//! - **integers**: optional sign, then decimal digits or a `0x`, `0o`, `0b`
//!   prefix; a leading `0` selects octal. `_` may separate digits.
//! - **floats**: decimal or exponent notation, `inf`, `infinity`, `nan`.
//!   Formatting uses the shortest representation that parses back to the same
//!   value, switching to exponent notation below `1e-4` and from `1e6` on.
//! - **durations**: a sequence of decimal numbers with units, such as `300ms`,
//!   `1.5h` or `2h45m`. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`
//!   and `h`. Negative durations are out of range.

use std::fmt;
use std::time::Duration;

use crate::error::ValueError;

// ============================================================================
// Leaf capability
// ============================================================================

/// A scalar value with a text form.
pub trait Leaf {
    /// Appends the text form of the value to `buf`.
    fn append_formatted(&self, buf: &mut String);

    /// Returns the text form of the value.
    fn format(&self) -> String {
        let mut buf = String::new();
        self.append_formatted(&mut buf);
        buf
    }

    /// Parses `text` as a value of this leaf's kind without modifying the
    /// value.
    fn parse(&self, text: &str) -> Result<LeafValue, ValueError>;

    /// Parses `text` and stores the result. On error the value is unchanged.
    fn set(&mut self, text: &str) -> Result<(), ValueError>;

    /// The current value.
    ///
    /// Defaults to the text form, for leaves without a natural
    /// [`LeafValue`] variant.
    fn get(&self) -> LeafValue {
        LeafValue::Str(self.format())
    }

    /// Whether the value is a boolean that command-line style consumers may
    /// set without an argument.
    fn is_bool_flag(&self) -> bool {
        false
    }
}

/// A parsed leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Duration(Duration),
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();
        match self {
            LeafValue::Bool(v) => v.append_formatted(&mut buf),
            LeafValue::Int(v) => v.append_formatted(&mut buf),
            LeafValue::Uint(v) => v.append_formatted(&mut buf),
            LeafValue::Float(v) => v.append_formatted(&mut buf),
            LeafValue::Str(v) => v.append_formatted(&mut buf),
            LeafValue::Duration(v) => v.append_formatted(&mut buf),
        }
        f.write_str(&buf)
    }
}

// ============================================================================
// bool
// ============================================================================

/// Parses a boolean.
pub fn parse_bool(text: &str) -> Result<bool, ValueError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::syntax("bool", text)),
    }
}

impl Leaf for bool {
    fn append_formatted(&self, buf: &mut String) {
        buf.push_str(if *self { "true" } else { "false" });
    }

    fn parse(&self, text: &str) -> Result<LeafValue, ValueError> {
        parse_bool(text).map(LeafValue::Bool)
    }

    fn set(&mut self, text: &str) -> Result<(), ValueError> {
        *self = parse_bool(text)?;
        Ok(())
    }

    fn get(&self) -> LeafValue {
        LeafValue::Bool(*self)
    }

    fn is_bool_flag(&self) -> bool {
        true
    }
}

// ============================================================================
// Integers
// ============================================================================

/// Parses an unsigned integer that fits in `bits` bits.
pub fn parse_uint(text: &str, bits: u32, kind: &'static str) -> Result<u64, ValueError> {
    parse_magnitude(text, text, bits, kind)
}

/// Parses a signed integer that fits in `bits` bits.
pub fn parse_int(text: &str, bits: u32, kind: &'static str) -> Result<i64, ValueError> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = match parse_magnitude(text, digits, bits, kind) {
        Ok(magnitude) => magnitude,
        Err(err @ ValueError::Syntax { .. }) => return Err(err),
        Err(ValueError::Range { .. }) => u64::MAX,
    };
    let cutoff = 1u64 << (bits - 1);
    if (!negative && magnitude >= cutoff) || (negative && magnitude > cutoff) {
        return Err(ValueError::range(kind, text));
    }
    let value = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };
    i64::try_from(value).map_err(|_| ValueError::range(kind, text))
}

/// Parses the unsigned digits of an integer, with an optional base prefix.
fn parse_magnitude(text: &str, digits: &str, bits: u32, kind: &'static str) -> Result<u64, ValueError> {
    if digits.is_empty() {
        return Err(ValueError::syntax(kind, text));
    }
    let (radix, body) = match digits.as_bytes() {
        [b'0', b'b' | b'B', _, ..] => (2, &digits[2..]),
        [b'0', b'o' | b'O', _, ..] => (8, &digits[2..]),
        [b'0', b'x' | b'X', _, ..] => (16, &digits[2..]),
        [b'0', ..] => (8, &digits[1..]),
        _ => (10, digits),
    };
    let max = if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    };

    let mut value: u64 = 0;
    let mut underscores = false;
    for c in body.chars() {
        if c == '_' {
            underscores = true;
            continue;
        }
        let digit = c
            .to_digit(radix)
            .ok_or_else(|| ValueError::syntax(kind, text))?;
        value = value
            .checked_mul(u64::from(radix))
            .and_then(|v| v.checked_add(u64::from(digit)))
            .filter(|v| *v <= max)
            .ok_or_else(|| ValueError::range(kind, text))?;
    }
    if underscores && !underscores_separate_digits(digits) {
        return Err(ValueError::syntax(kind, text));
    }
    Ok(value)
}

/// Checks that every `_` sits between digits or between a base prefix and a
/// digit.
fn underscores_separate_digits(digits: &str) -> bool {
    #[derive(PartialEq)]
    enum Last {
        Start,
        Digit,
        Underscore,
        Other,
    }

    let bytes = digits.as_bytes();
    let mut last = Last::Start;
    let mut hex = false;
    let mut rest = bytes;
    if let [b'0', prefix, tail @ ..] = bytes {
        if matches!(prefix.to_ascii_lowercase(), b'b' | b'o' | b'x') {
            last = Last::Digit;
            hex = prefix.to_ascii_lowercase() == b'x';
            rest = tail;
        }
    }
    for &b in rest {
        if b.is_ascii_digit() || (hex && b.is_ascii_hexdigit()) {
            last = Last::Digit;
        } else if b == b'_' {
            if last != Last::Digit {
                return false;
            }
            last = Last::Underscore;
        } else {
            if last == Last::Underscore {
                return false;
            }
            last = Last::Other;
        }
    }
    last != Last::Underscore
}

/// Converts a range-checked integer to its declared width.
fn narrow<T, V>(value: V, kind: &'static str, text: &str) -> Result<T, ValueError>
where
    T: TryFrom<V>,
{
    T::try_from(value).map_err(|_| ValueError::range(kind, text))
}

macro_rules! leaf_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Leaf for $ty {
                fn append_formatted(&self, buf: &mut String) {
                    buf.push_str(&self.to_string());
                }

                fn parse(&self, text: &str) -> Result<LeafValue, ValueError> {
                    parse_int(text, <$ty>::BITS, stringify!($ty)).map(LeafValue::Int)
                }

                fn set(&mut self, text: &str) -> Result<(), ValueError> {
                    let value = parse_int(text, <$ty>::BITS, stringify!($ty))?;
                    *self = narrow(value, stringify!($ty), text)?;
                    Ok(())
                }

                #[allow(clippy::unnecessary_cast)]
                fn get(&self) -> LeafValue {
                    LeafValue::Int(*self as i64)
                }
            }
        )*
    };
}

macro_rules! leaf_uint {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Leaf for $ty {
                fn append_formatted(&self, buf: &mut String) {
                    buf.push_str(&self.to_string());
                }

                fn parse(&self, text: &str) -> Result<LeafValue, ValueError> {
                    parse_uint(text, <$ty>::BITS, stringify!($ty)).map(LeafValue::Uint)
                }

                fn set(&mut self, text: &str) -> Result<(), ValueError> {
                    let value = parse_uint(text, <$ty>::BITS, stringify!($ty))?;
                    *self = narrow(value, stringify!($ty), text)?;
                    Ok(())
                }

                #[allow(clippy::unnecessary_cast)]
                fn get(&self) -> LeafValue {
                    LeafValue::Uint(*self as u64)
                }
            }
        )*
    };
}

leaf_int!(i8, i16, i32, i64, isize);
leaf_uint!(u8, u16, u32, u64, usize);

// ============================================================================
// Floats
// ============================================================================

fn is_infinity_literal(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Parses a 64-bit float.
pub fn parse_f64(text: &str) -> Result<f64, ValueError> {
    let value: f64 = text.parse().map_err(|_| ValueError::syntax("f64", text))?;
    if value.is_infinite() && !is_infinity_literal(text) {
        return Err(ValueError::range("f64", text));
    }
    Ok(value)
}

/// Parses a 32-bit float.
pub fn parse_f32(text: &str) -> Result<f32, ValueError> {
    let value: f32 = text.parse().map_err(|_| ValueError::syntax("f32", text))?;
    if value.is_infinite() && !is_infinity_literal(text) {
        return Err(ValueError::range("f32", text));
    }
    Ok(value)
}

/// Appends the shortest text that parses back to `value`.
fn append_float<F>(buf: &mut String, value: F, finite: bool, negative: bool)
where
    F: fmt::Display + fmt::LowerExp,
{
    if !finite {
        let text = value.to_string();
        buf.push_str(match text.as_str() {
            "NaN" => "NaN",
            _ if negative => "-Inf",
            _ => "+Inf",
        });
        return;
    }
    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        buf.push_str(&scientific);
        return;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..6).contains(&exponent) {
        buf.push_str(&value.to_string());
        return;
    }
    buf.push_str(mantissa);
    buf.push('e');
    buf.push(if exponent < 0 { '-' } else { '+' });
    let magnitude = exponent.unsigned_abs();
    if magnitude < 10 {
        buf.push('0');
    }
    buf.push_str(&magnitude.to_string());
}

impl Leaf for f32 {
    fn append_formatted(&self, buf: &mut String) {
        append_float(buf, *self, self.is_finite(), self.is_sign_negative());
    }

    fn parse(&self, text: &str) -> Result<LeafValue, ValueError> {
        parse_f32(text).map(|v| LeafValue::Float(f64::from(v)))
    }

    fn set(&mut self, text: &str) -> Result<(), ValueError> {
        *self = parse_f32(text)?;
        Ok(())
    }

    fn get(&self) -> LeafValue {
        LeafValue::Float(f64::from(*self))
    }
}

impl Leaf for f64 {
    fn append_formatted(&self, buf: &mut String) {
        append_float(buf, *self, self.is_finite(), self.is_sign_negative());
    }

    fn parse(&self, text: &str) -> Result<LeafValue, ValueError> {
        parse_f64(text).map(LeafValue::Float)
    }

    fn set(&mut self, text: &str) -> Result<(), ValueError> {
        *self = parse_f64(text)?;
        Ok(())
    }

    fn get(&self) -> LeafValue {
        LeafValue::Float(*self)
    }
}

// ============================================================================
// String
// ============================================================================

impl Leaf for String {
    fn append_formatted(&self, buf: &mut String) {
        buf.push_str(self);
    }

    fn parse(&self, text: &str) -> Result<LeafValue, ValueError> {
        Ok(LeafValue::Str(text.to_owned()))
    }

    fn set(&mut self, text: &str) -> Result<(), ValueError> {
        text.clone_into(self);
        Ok(())
    }

    fn get(&self) -> LeafValue {
        LeafValue::Str(self.clone())
    }
}

// ============================================================================
// Duration
// ============================================================================

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// The longest representable duration, about 292 years.
const MAX_DURATION_NANOS: u128 = i64::MAX as u128;

/// Fraction digits beyond this are ignored.
const MAX_FRACTION_DIGITS: usize = 25;

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SECOND,
        "m" => 60 * NANOS_PER_SECOND,
        "h" => 3_600 * NANOS_PER_SECOND,
        _ => return None,
    })
}

/// Parses a duration such as `1h30m` or `1.5s`.
pub fn parse_duration(text: &str) -> Result<Duration, ValueError> {
    const KIND: &str = "Duration";
    let syntax = || ValueError::syntax(KIND, text);
    let range = || ValueError::range(KIND, text);

    let (negative, mut rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(syntax());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, mut after) = rest.split_at(int_len);
        let mut frac_part = "";
        if let Some(fraction) = after.strip_prefix('.') {
            let frac_len = fraction.bytes().take_while(u8::is_ascii_digit).count();
            frac_part = &fraction[..frac_len];
            after = &fraction[frac_len..];
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(syntax());
        }

        let unit_len = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, tail) = after.split_at(unit_len);
        let scale = unit_nanos(unit).ok_or_else(syntax)?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| range())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(range)?;
        if !frac_part.is_empty() {
            let digits = &frac_part[..frac_part.len().min(MAX_FRACTION_DIGITS)];
            let numerator: u128 = digits.parse().map_err(|_| syntax())?;
            let denominator = 10u128.pow(digits.len() as u32);
            nanos = nanos
                .checked_add(numerator * scale / denominator)
                .ok_or_else(range)?;
        }

        total = total.checked_add(nanos).ok_or_else(range)?;
        if total > MAX_DURATION_NANOS {
            return Err(range());
        }
        rest = tail;
    }

    if negative && total != 0 {
        return Err(range());
    }
    let nanos = u64::try_from(total).map_err(|_| range())?;
    Ok(Duration::from_nanos(nanos))
}

/// Appends `value / 10^precision` with the fraction trimmed of trailing zeros.
fn append_fraction(buf: &mut String, value: u128, precision: u32) {
    let scale = 10u128.pow(precision);
    buf.push_str(&(value / scale).to_string());
    let fraction = value % scale;
    if fraction != 0 {
        let digits = format!("{:0width$}", fraction, width = precision as usize);
        buf.push('.');
        buf.push_str(digits.trim_end_matches('0'));
    }
}

/// Appends a duration in the form `72h3m0.5s`.
///
/// Durations under a second use the largest unit below one second that keeps
/// the leading digit nonzero, such as `1.5ms`. Zero is `0s`.
pub fn append_duration(buf: &mut String, duration: Duration) {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        buf.push_str("0s");
        return;
    }
    if nanos < NANOS_PER_SECOND {
        let (precision, unit) = match nanos {
            0..=999 => (0, "ns"),
            1_000..=999_999 => (3, "µs"),
            _ => (6, "ms"),
        };
        append_fraction(buf, nanos, precision);
        buf.push_str(unit);
        return;
    }

    let seconds = nanos / NANOS_PER_SECOND;
    let hours = seconds / 3_600;
    let minutes = seconds / 60 % 60;
    if hours > 0 {
        buf.push_str(&hours.to_string());
        buf.push('h');
    }
    if hours > 0 || minutes > 0 {
        buf.push_str(&minutes.to_string());
        buf.push('m');
    }
    append_fraction(buf, nanos % (60 * NANOS_PER_SECOND), 9);
    buf.push('s');
}

impl Leaf for Duration {
    fn append_formatted(&self, buf: &mut String) {
        append_duration(buf, *self);
    }

    fn parse(&self, text: &str) -> Result<LeafValue, ValueError> {
        parse_duration(text).map(LeafValue::Duration)
    }

    fn set(&mut self, text: &str) -> Result<(), ValueError> {
        *self = parse_duration(text)?;
        Ok(())
    }

    fn get(&self) -> LeafValue {
        LeafValue::Duration(*self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod bool_values {
        use super::*;

        #[test]
        fn accepts_all_spellings() {
            for text in ["1", "t", "T", "TRUE", "true", "True"] {
                assert_eq!(false.parse(text), Ok(LeafValue::Bool(true)), "{text}");
            }
            for text in ["0", "f", "F", "FALSE", "false", "False"] {
                assert_eq!(true.parse(text), Ok(LeafValue::Bool(false)), "{text}");
            }
        }

        #[test]
        fn rejects_other_text() {
            for text in ["", "yes", "tRUE", "2"] {
                assert!(matches!(parse_bool(text), Err(ValueError::Syntax { .. })), "{text}");
            }
        }

        #[test]
        fn is_a_flag() {
            assert!(true.is_bool_flag());
            assert!(!0i32.is_bool_flag());
            assert_eq!(true.format(), "true");
        }
    }

    mod integers {
        use super::*;

        fn check_bounds<T: Leaf>(leaf: T, min: i128, max: i128) {
            let kind = std::any::type_name::<T>();
            for inside in [min, max] {
                let parsed = leaf.parse(&inside.to_string());
                let expected = if min < 0 {
                    LeafValue::Int(inside as i64)
                } else {
                    LeafValue::Uint(inside as u64)
                };
                assert_eq!(parsed, Ok(expected), "{kind} {inside}");
            }
            // below zero, unsigned parsing fails on the sign instead
            let outside = if min < 0 { vec![min - 1, max + 1] } else { vec![max + 1] };
            for outside in outside {
                let parsed = leaf.parse(&outside.to_string());
                assert!(
                    matches!(parsed, Err(ValueError::Range { .. })),
                    "{kind} {outside}: {parsed:?}"
                );
            }
        }

        #[test]
        fn signed_bounds() {
            check_bounds(0i8, i8::MIN.into(), i8::MAX.into());
            check_bounds(0i16, i16::MIN.into(), i16::MAX.into());
            check_bounds(0i32, i32::MIN.into(), i32::MAX.into());
            check_bounds(0i64, i64::MIN.into(), i64::MAX.into());
        }

        #[test]
        fn unsigned_bounds() {
            check_bounds(0u8, 0, u8::MAX.into());
            check_bounds(0u16, 0, u16::MAX.into());
            check_bounds(0u32, 0, u32::MAX.into());
            check_bounds(0u64, 0, u64::MAX.into());
        }

        #[test]
        fn unsigned_rejects_sign() {
            assert!(matches!(0u8.parse("-1"), Err(ValueError::Syntax { .. })));
            assert!(matches!(0u8.parse("+1"), Err(ValueError::Syntax { .. })));
        }

        #[test]
        fn base_prefixes() {
            assert_eq!(parse_int("0x1F", 64, "i64"), Ok(31));
            assert_eq!(parse_int("-0X10", 64, "i64"), Ok(-16));
            assert_eq!(parse_int("0o17", 64, "i64"), Ok(15));
            assert_eq!(parse_int("017", 64, "i64"), Ok(15));
            assert_eq!(parse_int("0b101", 64, "i64"), Ok(5));
            assert_eq!(parse_int("0", 64, "i64"), Ok(0));
            assert_eq!(parse_uint("0xff", 8, "u8"), Ok(255));
            assert!(parse_int("0x", 64, "i64").is_err());
            assert!(parse_int("08", 64, "i64").is_err());
            assert!(parse_int("0x+1", 64, "i64").is_err());
            assert!(parse_int("0b2", 64, "i64").is_err());
        }

        #[test]
        fn underscores_must_separate_digits() {
            assert_eq!(parse_int("1_000", 64, "i64"), Ok(1000));
            assert_eq!(parse_int("0x_ff", 64, "i64"), Ok(255));
            assert_eq!(parse_int("-1_0", 64, "i64"), Ok(-10));
            for text in ["_1", "1_", "1__0", "0x_", "-_1"] {
                assert!(
                    matches!(parse_int(text, 64, "i64"), Err(ValueError::Syntax { .. })),
                    "{text}"
                );
            }
        }

        #[test]
        fn syntax_errors() {
            for text in ["", "-", "+", "1.0", "ten", "--1", " 1"] {
                assert!(
                    matches!(parse_int(text, 64, "i64"), Err(ValueError::Syntax { .. })),
                    "{text}"
                );
            }
        }

        #[test]
        fn formats_decimal() {
            assert_eq!((-42i16).format(), "-42");
            assert_eq!(u64::MAX.format(), "18446744073709551615");
            assert_eq!(0usize.format(), "0");
        }
    }

    mod floats {
        use super::*;

        #[test]
        fn parses_decimal_and_specials() {
            assert_eq!(parse_f64("1.5"), Ok(1.5));
            assert_eq!(parse_f64("-2e3"), Ok(-2000.0));
            assert_eq!(parse_f64("inf"), Ok(f64::INFINITY));
            assert_eq!(parse_f64("-Infinity"), Ok(f64::NEG_INFINITY));
            assert!(parse_f64("NaN").map(f64::is_nan).unwrap_or(false));
            assert!(matches!(parse_f64("1.5x"), Err(ValueError::Syntax { .. })));
        }

        #[test]
        fn overflow_is_out_of_range() {
            assert!(matches!(parse_f64("1e400"), Err(ValueError::Range { .. })));
            assert!(matches!(parse_f32("1e39"), Err(ValueError::Range { .. })));
            assert_eq!(parse_f32("3.5"), Ok(3.5));
        }

        #[test]
        fn formats_shortest() {
            assert_eq!(1.5f64.format(), "1.5");
            assert_eq!(0.1f32.format(), "0.1");
            assert_eq!(100000f64.format(), "100000");
            assert_eq!(1e6f64.format(), "1e+06");
            assert_eq!(1234567f64.format(), "1.234567e+06");
            assert_eq!(0.0001f64.format(), "0.0001");
            assert_eq!(0.00001f64.format(), "1e-05");
            assert_eq!(1e100f64.format(), "1e+100");
            assert_eq!(f64::INFINITY.format(), "+Inf");
            assert_eq!(f64::NEG_INFINITY.format(), "-Inf");
            assert_eq!(f64::NAN.format(), "NaN");
        }

        #[test]
        fn formatted_text_parses_back() {
            for value in [0.1f64, 1.0 / 3.0, 123.456, 6.02e23, -1e-7] {
                assert_eq!(value.parse(&value.format()), Ok(LeafValue::Float(value)));
            }
        }
    }

    mod durations {
        use super::*;

        fn ms(n: u64) -> Duration {
            Duration::from_millis(n)
        }

        #[test]
        fn parses_units() {
            assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
            assert_eq!(parse_duration("-0"), Ok(Duration::ZERO));
            assert_eq!(parse_duration("5ns"), Ok(Duration::from_nanos(5)));
            assert_eq!(parse_duration("7us"), Ok(Duration::from_micros(7)));
            assert_eq!(parse_duration("7µs"), Ok(Duration::from_micros(7)));
            assert_eq!(parse_duration("300ms"), Ok(ms(300)));
            assert_eq!(parse_duration("1.5s"), Ok(ms(1500)));
            assert_eq!(parse_duration("+2m"), Ok(Duration::from_secs(120)));
            assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5400)));
            assert_eq!(parse_duration(".5h"), Ok(Duration::from_secs(1800)));
            assert_eq!(parse_duration("1.s"), Ok(Duration::from_secs(1)));
            assert_eq!(
                parse_duration("1.000000001s"),
                Ok(Duration::new(1, 1))
            );
        }

        #[test]
        fn rejects_malformed() {
            for text in ["", "1", "s", ".s", "1x", "1h-2m", "1.2.3s", "-"] {
                assert!(
                    matches!(parse_duration(text), Err(ValueError::Syntax { .. })),
                    "{text}"
                );
            }
        }

        #[test]
        fn rejects_negative_and_overflow() {
            assert!(matches!(parse_duration("-1s"), Err(ValueError::Range { .. })));
            assert!(matches!(parse_duration("3000000h"), Err(ValueError::Range { .. })));
            assert!(matches!(
                parse_duration("99999999999999999999999999999999999999999h"),
                Err(ValueError::Range { .. })
            ));
            // the fraction alone pushes the total past the limit
            assert!(matches!(
                parse_duration("94522879700260684295381835.9h"),
                Err(ValueError::Range { .. })
            ));
        }

        #[test]
        fn formats_like_clock() {
            assert_eq!(Duration::ZERO.format(), "0s");
            assert_eq!(Duration::from_nanos(5).format(), "5ns");
            assert_eq!(Duration::from_nanos(1_500).format(), "1.5µs");
            assert_eq!(ms(1).format(), "1ms");
            assert_eq!(Duration::from_micros(1_500).format(), "1.5ms");
            assert_eq!(ms(1500).format(), "1.5s");
            assert_eq!(Duration::from_secs(90).format(), "1m30s");
            assert_eq!(Duration::from_secs(3600).format(), "1h0m0s");
            assert_eq!(Duration::new(3723, 500_000_000).format(), "1h2m3.5s");
        }

        #[test]
        fn formatted_text_parses_back() {
            for d in [ms(1), Duration::new(3723, 500_000_000), Duration::from_nanos(1_500)] {
                assert_eq!(parse_duration(&d.format()), Ok(d));
            }
        }
    }

    mod strings {
        use super::*;

        #[test]
        fn identity() {
            let s = String::from("a/b");
            assert_eq!(s.format(), "a/b");
            assert_eq!(s.parse(""), Ok(LeafValue::Str(String::new())));
        }

        #[test]
        fn leaf_value_display() {
            assert_eq!(LeafValue::Duration(Duration::from_secs(60)).to_string(), "1m0s");
            assert_eq!(LeafValue::Int(-3).to_string(), "-3");
            assert_eq!(LeafValue::Str("x".into()).to_string(), "x");
        }
    }

    mod setting {
        use super::*;

        #[test]
        fn set_stores_parsed_value() {
            let mut port = 0u16;
            port.set("0x1F90").expect("set port");
            assert_eq!(port, 8080);
            assert_eq!(port.get(), LeafValue::Uint(8080));

            let mut offset = 0i8;
            offset.set("-128").expect("set offset");
            assert_eq!(offset.get(), LeafValue::Int(-128));

            let mut verbose = false;
            verbose.set("T").expect("set flag");
            assert!(verbose);

            let mut ratio = 0f32;
            ratio.set("0.25").expect("set ratio");
            assert_eq!(ratio.get(), LeafValue::Float(0.25));

            let mut name = String::from("old");
            name.set("new").expect("set name");
            assert_eq!(name.get(), LeafValue::Str("new".to_string()));

            let mut timeout = Duration::ZERO;
            timeout.set("1m30s").expect("set timeout");
            assert_eq!(timeout.get(), LeafValue::Duration(Duration::from_secs(90)));
        }

        #[test]
        fn failed_set_keeps_value() {
            let mut retries = 3u8;
            let err = retries.set("256").expect_err("out of range");
            assert_eq!(err.kind(), "u8");
            assert_eq!(retries, 3);

            let mut timeout = Duration::from_secs(1);
            assert!(timeout.set("1x").is_err());
            assert_eq!(timeout, Duration::from_secs(1));
        }
    }
}
