//! Display helpers for amounts in tables.

use rust_decimal::Decimal;

/// Formats a rupee amount with Indian digit grouping (`₹12,50,000`).
///
/// Trailing zeros in the fraction are dropped, so whole rupees print
/// without a decimal point.
pub fn format_rupees(amount: &Decimal) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = amount.abs().normalize().to_string();
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = format!("{sign}₹{}", group_indian(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Formats a percentage already scaled to 0..100.
pub fn format_percent(rate: &Decimal) -> String {
    format!("{:.2}%", rate)
}

/// Formats a fractional rate (0.05) as a percentage (`5%`).
pub fn format_rate(rate: &Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// Like [`format_rupees`], with a dash for a missing amount.
pub fn format_optional_rupees(amount: &Option<Decimal>) -> String {
    amount.as_ref().map_or_else(|| "-".to_string(), format_rupees)
}

/// `2025` -> `2025-26`.
pub fn assessment_year_label(year: i32) -> String {
    format!("{year}-{:02}", (year + 1).rem_euclid(100))
}

// Last three digits, then pairs: 1,23,45,678.
fn group_indian(whole: &str) -> String {
    if whole.len() <= 3 {
        return whole.to_string();
    }
    let (head, tail) = whole.split_at(whole.len() - 3);

    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn small_amounts_are_not_grouped() {
        assert_eq!(format_rupees(&dec!(0)), "₹0");
        assert_eq!(format_rupees(&dec!(650)), "₹650");
    }

    #[test]
    fn lakhs_and_crores_use_indian_grouping() {
        assert_eq!(format_rupees(&dec!(1250)), "₹1,250");
        assert_eq!(format_rupees(&dec!(1250000)), "₹12,50,000");
        assert_eq!(format_rupees(&dec!(12345678)), "₹1,23,45,678");
        assert_eq!(format_rupees(&dec!(500000000)), "₹50,00,00,000");
    }

    #[test]
    fn fraction_keeps_significant_digits() {
        assert_eq!(format_rupees(&dec!(12500.20)), "₹12,500.2");
        assert_eq!(format_rupees(&dec!(16250.00)), "₹16,250");
    }

    #[test]
    fn negative_amounts_carry_sign_before_symbol() {
        assert_eq!(format_rupees(&dec!(-23400)), "-₹23,400");
    }

    #[test]
    fn missing_amount_is_a_dash() {
        assert_eq!(format_optional_rupees(&None), "-");
        assert_eq!(format_optional_rupees(&Some(dec!(150000))), "₹1,50,000");
    }

    #[test]
    fn assessment_year_wraps_century() {
        assert_eq!(assessment_year_label(2025), "2025-26");
        assert_eq!(assessment_year_label(2099), "2099-00");
    }

    #[test]
    fn rates_and_percentages() {
        assert_eq!(format_rate(&dec!(0.05)), "5%");
        assert_eq!(format_rate(&dec!(0.37)), "37%");
        assert_eq!(format_percent(&dec!(17.16)), "17.16%");
        assert_eq!(format_percent(&dec!(0)), "0.00%");
    }
}
