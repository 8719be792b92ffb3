//! Duration strings in the `1h30m` style.
//!
//! A duration is an optional sign followed by one or more
//! `<decimal><unit>` pairs, e.g. `"300ms"`, `"-1.5h"` or `"2h45m"`.
//! Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`.
//! A bare `"0"` is accepted as zero.

use chrono::TimeDelta;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Units ordered so that longer suffixes are tried before their prefixes.
const UNITS: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", NANOS_PER_MICRO),
    ("\u{00b5}s", NANOS_PER_MICRO),
    ("\u{03bc}s", NANOS_PER_MICRO),
    ("ms", NANOS_PER_MILLI),
    ("s", NANOS_PER_SECOND),
    ("m", 60 * NANOS_PER_SECOND),
    ("h", 3_600 * NANOS_PER_SECOND),
];

/// Parse a duration string. The error is a human-readable reason.
pub fn parse_duration(input: &str) -> Result<TimeDelta, String> {
    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (amount, after_number) = take_number(rest)?;
        let (unit_nanos, after_unit) = take_unit(after_number)?;
        total = amount
            .nanos(unit_nanos)
            .and_then(|n| total.checked_add(n))
            .filter(|n| *n <= i64::MAX as u128)
            .ok_or_else(|| "duration out of range".to_string())?;
        rest = after_unit;
    }

    // Bounded by i64::MAX above.
    let nanos = total as i64;
    Ok(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}

/// A decimal number split into its integer digits and fractional digits.
struct Amount<'a> {
    whole: &'a str,
    fraction: &'a str,
}

impl Amount<'_> {
    fn nanos(&self, unit: u128) -> Option<u128> {
        let whole: u128 = if self.whole.is_empty() {
            0
        } else {
            self.whole.parse().ok()?
        };
        let mut nanos = whole.checked_mul(unit)?;

        // Fractional digits beyond what the unit can resolve are dropped.
        let mut scale = 1u128;
        let mut fraction = 0u128;
        for digit in self.fraction.bytes() {
            if scale.checked_mul(10).map_or(true, |s| s > unit) {
                break;
            }
            scale *= 10;
            fraction = fraction * 10 + u128::from(digit - b'0');
        }
        nanos = nanos.checked_add(fraction * unit / scale)?;
        Some(nanos)
    }
}

fn take_number(s: &str) -> Result<(Amount<'_>, &str), String> {
    let whole_len = s.bytes().take_while(u8::is_ascii_digit).count();
    let (whole, rest) = s.split_at(whole_len);

    let (fraction, rest) = match rest.strip_prefix('.') {
        Some(after_dot) => {
            let len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            after_dot.split_at(len)
        }
        None => ("", rest),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(format!("expected a number at '{s}'"));
    }
    Ok((Amount { whole, fraction }, rest))
}

fn take_unit(s: &str) -> Result<(u128, &str), String> {
    let len = s
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit() || *c == '.')
        .map_or(s.len(), |(i, _)| i);
    let (unit, rest) = s.split_at(len);

    if unit.is_empty() {
        return Err("missing unit".to_string());
    }
    UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, nanos)| (*nanos, rest))
        .ok_or_else(|| format!("unknown unit '{unit}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_units() {
        assert_eq!(parse_duration("24h"), Ok(TimeDelta::hours(24)));
        assert_eq!(parse_duration("90s"), Ok(TimeDelta::seconds(90)));
        assert_eq!(parse_duration("15m"), Ok(TimeDelta::minutes(15)));
        assert_eq!(parse_duration("250ms"), Ok(TimeDelta::milliseconds(250)));
        assert_eq!(parse_duration("3us"), Ok(TimeDelta::microseconds(3)));
        assert_eq!(parse_duration("3µs"), Ok(TimeDelta::microseconds(3)));
        assert_eq!(parse_duration("7ns"), Ok(TimeDelta::nanoseconds(7)));
    }

    #[test]
    fn test_compound_and_fractional() {
        assert_eq!(parse_duration("1h30m"), Ok(TimeDelta::minutes(90)));
        assert_eq!(parse_duration("1.5h"), Ok(TimeDelta::minutes(90)));
        assert_eq!(parse_duration(".5s"), Ok(TimeDelta::milliseconds(500)));
        assert_eq!(parse_duration("2h45m30.5s"), Ok(TimeDelta::milliseconds(9_930_500)));
    }

    #[test]
    fn test_sign_and_zero() {
        assert_eq!(parse_duration("0"), Ok(TimeDelta::zero()));
        assert_eq!(parse_duration("-2h"), Ok(TimeDelta::hours(-2)));
        assert_eq!(parse_duration("+10s"), Ok(TimeDelta::seconds(10)));
    }

    #[test]
    fn test_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("notaduration").is_err());
        assert!(parse_duration("24").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration("1h ").is_err());
        assert!(parse_duration("-").is_err());
    }

    #[test]
    fn test_overflow() {
        assert!(parse_duration("9999999999999h").is_err());
    }
}
