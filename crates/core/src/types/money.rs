//! Naira amounts.
//!
//! Prices travel as decimal strings (`"9200.00"`) or plain JSON numbers and
//! are held as [`Decimal`] everywhere so subtotals never pick up float drift.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency sign for Nigerian Naira.
pub const NAIRA_SIGN: char = '₦';

/// Format an amount the way the storefront displays prices.
///
/// Thousands are comma separated, at most two fraction digits are shown
/// and trailing fraction zeros are dropped (`9200.00` prints as `₦9,200`).
///
/// ```
/// use jhytermax_core::format_naira;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_naira(Decimal::new(920_000, 2)), "₦9,200");
/// assert_eq!(format_naira(Decimal::new(12_345_675, 3)), "₦12,345.68");
/// ```
#[must_use]
pub fn format_naira(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let digits = rounded.abs().to_string();
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{sign}{NAIRA_SIGN}{grouped}.{fraction}"),
        None => format!("{sign}{NAIRA_SIGN}{grouped}"),
    }
}
