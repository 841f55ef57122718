//! Duration literal parsing.
//!
//! Accepts a sequence of `<number><unit>` components such as `45m`,
//! `1h30m` or `1.5s`. Numbers may carry a decimal fraction. Valid units are
//! `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m` and `h`. A bare `0` means zero.

use std::time::Duration;

/// Largest representable duration, in nanoseconds.
const MAX_NANOS: u64 = i64::MAX as u64;

/// Fraction digits past this point are below nanosecond precision.
const MAX_FRACTION_DIGITS: usize = 18;

/// Errors produced while parsing a duration literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    /// Input is empty or a component has no number.
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("duration {0:?} is out of range")]
    Overflow(String),

    /// `std::time::Duration` cannot hold negative values.
    #[error("negative duration {0:?} is not supported")]
    Negative(String),
}

/// Nanoseconds per unit suffix.
fn unit_nanos(unit: &str) -> Option<u64> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 60 * 60 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}

/// Parse a duration literal such as `"1h30m"`.
///
/// # Errors
///
/// Returns a [`DurationError`] if the literal is malformed, uses an unknown
/// unit, exceeds `i64::MAX` nanoseconds, or is negative and non-zero.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationError::Invalid(input.to_string()));
    }

    let overflow = || DurationError::Overflow(input.to_string());
    let mut total: u64 = 0;

    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, after_int) = rest.split_at(int_len);

        let (frac_digits, after_number) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };

        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(DurationError::Invalid(input.to_string()));
        }

        let unit_len = after_number
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_number.len());
        let (unit, tail) = after_number.split_at(unit_len);

        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let whole = int_digits.bytes().try_fold(0u64, |acc, d| {
            acc.checked_mul(10)?.checked_add(u64::from(d - b'0'))
        });
        let mut nanos = whole
            .and_then(|w| w.checked_mul(scale))
            .ok_or_else(overflow)?;

        if !frac_digits.is_empty() {
            let (fraction, denominator) = frac_digits
                .bytes()
                .take(MAX_FRACTION_DIGITS)
                .fold((0u64, 1u64), |(f, den), d| {
                    (f * 10 + u64::from(d - b'0'), den * 10)
                });
            // Strictly less than `scale`, so it fits back into u64.
            let frac_nanos = u128::from(fraction) * u128::from(scale) / u128::from(denominator);
            nanos = nanos.checked_add(frac_nanos as u64).ok_or_else(overflow)?;
        }

        total = total
            .checked_add(nanos)
            .filter(|t| *t <= MAX_NANOS)
            .ok_or_else(overflow)?;
        rest = tail;
    }

    if negative && total != 0 {
        return Err(DurationError::Negative(input.to_string()));
    }

    Ok(Duration::from_nanos(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_single_components() {
        assert_eq!(parse_duration("45m"), Ok(Duration::from_secs(45 * 60)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("7us"), Ok(Duration::from_micros(7)));
        assert_eq!(parse_duration("7µs"), Ok(Duration::from_micros(7)));
        assert_eq!(parse_duration("12ns"), Ok(Duration::from_nanos(12)));
    }

    #[test]
    fn sums_composite_literals() {
        assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(90 * 60)));
        assert_eq!(
            parse_duration("2h45m30s500ms"),
            Ok(Duration::from_millis(((2 * 60 + 45) * 60 + 30) * 1000 + 500))
        );
    }

    #[test]
    fn parses_fractions() {
        assert_eq!(parse_duration("1.5h"), Ok(Duration::from_secs(90 * 60)));
        assert_eq!(parse_duration(".5s"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration("2.s"), Ok(Duration::from_secs(2)));
        assert_eq!(
            parse_duration("1.0000000019s"),
            Ok(Duration::from_nanos(1_000_000_001))
        );
    }

    #[test]
    fn zero_and_signs() {
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("-0"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("+10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("-0s"), Ok(Duration::ZERO));
        assert_eq!(
            parse_duration("-5m"),
            Err(DurationError::Negative("-5m".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_literals() {
        assert_eq!(
            parse_duration(""),
            Err(DurationError::Invalid(String::new()))
        );
        assert_eq!(
            parse_duration("-"),
            Err(DurationError::Invalid("-".to_string()))
        );
        assert_eq!(
            parse_duration("invalid"),
            Err(DurationError::Invalid("invalid".to_string()))
        );
        assert_eq!(
            parse_duration("30"),
            Err(DurationError::MissingUnit("30".to_string()))
        );
        assert_eq!(
            parse_duration("1h30"),
            Err(DurationError::MissingUnit("1h30".to_string()))
        );
        assert_eq!(
            parse_duration("3d"),
            Err(DurationError::UnknownUnit {
                unit: "d".to_string(),
                input: "3d".to_string(),
            })
        );
        assert!(parse_duration(" 5m").is_err());
        assert!(parse_duration("5m ").is_err());
    }

    #[test]
    fn rejects_overflow() {
        assert!(matches!(
            parse_duration("9999999999999h"),
            Err(DurationError::Overflow(_))
        ));
        assert!(matches!(
            parse_duration("99999999999999999999ns"),
            Err(DurationError::Overflow(_))
        ));
        // Just over i64::MAX nanoseconds once both components are summed.
        assert!(matches!(
            parse_duration("2562047h48m"),
            Err(DurationError::Overflow(_))
        ));
    }
}
