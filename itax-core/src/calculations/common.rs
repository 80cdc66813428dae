//! Common utility functions for tax calculations.
//!
//! Rounding, clamping and amount parsing shared by the engine and the
//! helpers built on top of it.

use rust_decimal::{Decimal, RoundingStrategy};

use super::LiabilityError;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use itax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to the nearest whole rupee, halves away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use itax_core::calculations::common::round_to_rupee;
///
/// assert_eq!(round_to_rupee(dec!(650.49)), dec!(650));
/// assert_eq!(round_to_rupee(dec!(650.50)), dec!(651));
/// ```
pub fn round_to_rupee(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use itax_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Clamps negative intermediates to zero.
pub fn floor_zero(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// Largest amount accepted for any single input: ₹10^15.
///
/// Five heads at this ceiling, multiplied by any rate, stay far inside
/// `Decimal`'s range, so the engine's arithmetic cannot overflow.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Rejects a negative amount or one above [`MAX_AMOUNT`], naming the field
/// it came from.
pub fn ensure_amount(
    field: &str,
    value: Decimal,
) -> Result<Decimal, LiabilityError> {
    if value < Decimal::ZERO {
        return Err(LiabilityError::invalid_input(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    if value > MAX_AMOUNT {
        return Err(LiabilityError::invalid_input(
            field,
            format!("must not exceed {MAX_AMOUNT}, got {value}"),
        ));
    }
    Ok(value)
}

/// Parses a user-entered amount.
///
/// Whitespace is trimmed, comma separators (`12,50,000` or `1,250,000`) and a
/// leading rupee sign are ignored, and an empty cell counts as zero. Anything
/// that is not a finite, non-negative number up to [`MAX_AMOUNT`] (`NaN`,
/// `inf`, `-5`, `abc`) is an [`LiabilityError::InvalidInput`] for `field`.
pub fn parse_amount(
    field: &str,
    raw: &str,
) -> Result<Decimal, LiabilityError> {
    let normalized = raw.trim().trim_start_matches('₹').trim().replace(',', "");
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let value = normalized.parse::<Decimal>().map_err(|_| {
        tracing::warn!(field, input = %raw, "rejected non-numeric amount");
        LiabilityError::invalid_input(field, format!("'{raw}' is not a number"))
    })?;
    ensure_amount(field, value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // rounding tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_preserves_already_rounded_values() {
        assert_eq!(round_half_up(dec!(16250.05)), dec!(16250.05));
    }

    #[test]
    fn round_to_rupee_rounds_half_away_from_zero() {
        assert_eq!(round_to_rupee(dec!(0.5)), dec!(1));
        assert_eq!(round_to_rupee(dec!(800.004)), dec!(800));
        assert_eq!(round_to_rupee(dec!(13000.05)), dec!(13000));
    }

    #[test]
    fn floor_zero_clamps_negatives() {
        assert_eq!(floor_zero(dec!(-0.01)), dec!(0));
        assert_eq!(floor_zero(dec!(42)), dec!(42));
    }

    // =========================================================================
    // parse_amount tests
    // =========================================================================

    #[test]
    fn parse_amount_accepts_indian_and_western_grouping() {
        assert_eq!(parse_amount("salary", "12,50,000"), Ok(dec!(1250000)));
        assert_eq!(parse_amount("salary", "1,250,000.50"), Ok(dec!(1250000.50)));
    }

    #[test]
    fn parse_amount_strips_rupee_sign_and_whitespace() {
        assert_eq!(parse_amount("salary", "  ₹ 75,000 "), Ok(dec!(75000)));
    }

    #[test]
    fn parse_amount_treats_empty_as_zero() {
        assert_eq!(parse_amount("other_sources", "   "), Ok(Decimal::ZERO));
    }

    #[test]
    fn parse_amount_rejects_non_finite_text() {
        for raw in ["NaN", "inf", "-inf", "abc"] {
            let result = parse_amount("capital_gains", raw);

            assert!(
                matches!(
                    &result,
                    Err(LiabilityError::InvalidInput { field, .. }) if field == "capital_gains"
                ),
                "expected InvalidInput for {raw}, got {result:?}"
            );
        }
    }

    #[test]
    fn parse_amount_rejects_negative_values() {
        assert_eq!(
            parse_amount("deductions", "-100"),
            Err(LiabilityError::InvalidInput {
                field: "deductions".to_string(),
                reason: "must not be negative, got -100".to_string(),
            })
        );
    }

    #[test]
    fn max_amount_is_ten_to_the_fifteenth() {
        assert_eq!(MAX_AMOUNT, dec!(1_000_000_000_000_000));
    }

    #[test]
    fn parse_amount_accepts_the_ceiling_and_rejects_above_it() {
        assert_eq!(parse_amount("salary", "1000000000000000"), Ok(MAX_AMOUNT));

        let result = parse_amount("salary", "79228162514264337593543950335");

        assert!(
            matches!(&result, Err(LiabilityError::InvalidInput { field, .. }) if field == "salary"),
            "got {result:?}"
        );
    }
}
