//! Duration literal parsing for the `timeout` attribute.
//!
//! The attribute uses the classic `number + unit` literal form: `"18ms"`,
//! `"1.5s"`, `"3h30m"`. Units are `ns`, `us` (or `µs`/`μs`), `ms`, `s`,
//! `m`, `h`. A bare `"0"` is accepted without a unit; a number without a
//! unit is not. Negative literals are rejected since a negative timeout has
//! no meaning.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parse a duration literal. Returns `None` on any malformation.
pub(crate) fn parse(s: &str) -> Option<Duration> {
    let rest = s.strip_prefix('+').unwrap_or(s);
    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() || rest.starts_with('-') {
        return None;
    }

    let mut rest = rest;
    let mut nanos: u128 = 0;
    while !rest.is_empty() {
        let (int_digits, after_int) = split_digits(rest);
        let (frac_digits, after_frac) = match after_int.strip_prefix('.') {
            Some(r) => split_digits(r),
            None => ("", after_int),
        };
        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }

        let (unit, after_unit) = split_unit(after_frac)?;

        if !int_digits.is_empty() {
            let int: u128 = int_digits.parse().ok()?;
            nanos = nanos.checked_add(int.checked_mul(unit)?)?;
        }
        // Each fractional digit scales the unit down one decimal place.
        // Anything below a nanosecond truncates.
        let mut scale = unit;
        for digit in frac_digits.bytes() {
            scale /= 10;
            nanos = nanos.checked_add(u128::from(digit - b'0').checked_mul(scale)?)?;
        }

        rest = after_unit;
    }

    u64::try_from(nanos).ok().map(Duration::from_nanos)
}

/// Split a leading run of ASCII digits from the rest of the input.
fn split_digits(s: &str) -> (&str, &str) {
    let end = s
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Split a leading unit token, returning its factor in nanoseconds.
fn split_unit(s: &str) -> Option<(u128, &str)> {
    // Two-letter units must be tried before their one-letter suffixes.
    const UNITS: [(&str, u128); 8] = [
        ("ns", 1),
        ("us", 1_000),
        ("\u{b5}s", 1_000),  // µs
        ("\u{3bc}s", 1_000), // μs
        ("ms", 1_000_000),
        ("s", NANOS_PER_SEC),
        ("m", 60 * NANOS_PER_SEC),
        ("h", 3_600 * NANOS_PER_SEC),
    ];

    for (name, factor) in UNITS {
        if let Some(rest) = s.strip_prefix(name) {
            return Some((factor, rest));
        }
    }
    None
}
