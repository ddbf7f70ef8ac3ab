//! Numeric policy for monetary values.
//!
//! Amounts are `f64` end to end: the persisted format carries whatever the
//! user typed, quantities and tax rates are fractional, and bad input coerces
//! to zero instead of failing. Rounding to two decimals happens only at the
//! display boundary ([`round2`] / [`format_amount`]).

/// Rounds a monetary value to 2 decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parses user-entered amounts, accepting `.` or `,` as decimal separator.
///
/// Anything that does not parse as a finite number coerces to `0.0`.
#[must_use]
pub fn parse_amount(raw: &str) -> f64 {
    let normalized = raw.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Formats an amount with a currency symbol and 2 decimals, e.g. `$12.50`.
#[must_use]
pub fn format_amount(symbol: &str, amount: f64) -> String {
    format!("{symbol}{amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_comma_separator() {
        assert_eq!(parse_amount("12,5"), 12.5);
        assert_eq!(parse_amount(" 7.25 "), 7.25);
    }

    #[test]
    fn parse_coerces_junk_to_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
    }

    #[test]
    fn format_rounds_to_two_decimals() {
        assert_eq!(format_amount("$", 10.0), "$10.00");
        assert_eq!(format_amount("€", 0.126), "€0.13");
        assert_eq!(format_amount("$", -60.0), "$-60.00");
    }

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(round2(10.006), 10.01);
        assert_eq!(round2(100.0 / 3.0), 33.33);
        assert_eq!(round2(10.0), 10.0);
    }
}
