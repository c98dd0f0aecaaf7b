//! Conversion between decimal token strings and base units.
//!
//! The ledger never sees anything but `u128` base units. These helpers exist
//! for the edges: configs, scenarios and reports written by humans.

use thiserror::Error;

use crate::config::{NATIVE_DECIMALS, UNITS_PER_TOKEN};

/// Errors produced when parsing a decimal amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    /// The string was empty or contained something other than digits and a
    /// single decimal point.
    #[error("malformed amount: {0:?}")]
    Malformed(String),

    /// More fractional digits than the native asset supports.
    #[error("too many decimal places in {input:?}: at most {max} allowed")]
    TooPrecise {
        /// The offending input.
        input: String,
        /// Maximum fractional digits.
        max: u32,
    },

    /// The value does not fit in `u128` base units.
    #[error("amount out of range: {0:?}")]
    OutOfRange(String),
}

/// Parses a decimal token amount (`"1.234567"`) into base units.
///
/// ```
/// use xstro_protocol::ledger::units::parse_units;
///
/// assert_eq!(parse_units("0.99").unwrap(), 990_000_000_000_000_000);
/// ```
pub fn parse_units(input: &str) -> Result<u128, UnitsError> {
    let trimmed = input.trim();
    let malformed = || UnitsError::Malformed(input.to_string());

    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(malformed());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    if frac.len() > NATIVE_DECIMALS as usize {
        return Err(UnitsError::TooPrecise {
            input: input.to_string(),
            max: NATIVE_DECIMALS,
        });
    }

    let out_of_range = || UnitsError::OutOfRange(input.to_string());

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| out_of_range())?
    };

    let frac_units = if frac.is_empty() {
        0
    } else {
        let scale = 10u128.pow(NATIVE_DECIMALS - frac.len() as u32);
        frac.parse::<u128>().map_err(|_| malformed())? * scale
    };

    whole_units
        .checked_mul(UNITS_PER_TOKEN)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(out_of_range)
}

/// Formats base units as a decimal token string with trailing zeros trimmed.
///
/// ```
/// use xstro_protocol::ledger::units::format_units;
///
/// assert_eq!(format_units(2_224_567_000_000_000_000), "2.224567");
/// assert_eq!(format_units(0), "0");
/// ```
pub fn format_units(amount: u128) -> String {
    let whole = amount / UNITS_PER_TOKEN;
    let frac = amount % UNITS_PER_TOKEN;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", frac, width = NATIVE_DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Converts base units to a lossy `f64` token value. Display and metrics only.
pub fn to_display_f64(amount: u128) -> f64 {
    amount as f64 / UNITS_PER_TOKEN as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_and_fractional() {
        assert_eq!(parse_units("1").unwrap(), UNITS_PER_TOKEN);
        assert_eq!(parse_units("1.234567").unwrap(), 1_234_567_000_000_000_000);
        assert_eq!(parse_units(".5").unwrap(), UNITS_PER_TOKEN / 2);
        assert_eq!(parse_units("3.").unwrap(), 3 * UNITS_PER_TOKEN);
        assert_eq!(parse_units(" 0 ").unwrap(), 0);
    }

    #[test]
    fn parse_smallest_unit() {
        assert_eq!(parse_units("0.000000000000000001").unwrap(), 1);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(parse_units(""), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("."), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("-1"), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("1.2.3"), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("1e18"), Err(UnitsError::Malformed(_))));
    }

    #[test]
    fn parse_rejects_excess_precision() {
        let result = parse_units("0.0000000000000000001");
        assert!(matches!(result, Err(UnitsError::TooPrecise { max: 18, .. })));
    }

    #[test]
    fn parse_rejects_overflow() {
        let huge = format!("{}", u128::MAX);
        assert!(matches!(parse_units(&huge), Err(UnitsError::OutOfRange(_))));
    }

    #[test]
    fn format_trims_trailing_zeros() {
        assert_eq!(format_units(990_000_000_000_000_000), "0.99");
        assert_eq!(format_units(1), "0.000000000000000001");
        assert_eq!(format_units(5 * UNITS_PER_TOKEN), "5");
    }

    #[test]
    fn scenario_figures_survive_formatting() {
        let deposit = parse_units("1.234567").unwrap();
        let injected = parse_units("0.99").unwrap();
        assert_eq!(format_units(deposit + injected), "2.224567");
    }
}
