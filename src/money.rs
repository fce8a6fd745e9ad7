//! Monetary arithmetic
//!
//! All amounts are stored and summed as integer cents (`i64`); `Decimal`
//! appears only at the API boundary. Integer summation cannot drift across
//! many small additions the way binary floating point does.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Tolerance for reconciling client-submitted totals (0.01 currency units)
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert a decimal currency amount to integer cents, rounding half-up to
/// two fractional digits. Returns `None` when the value does not fit in i64.
pub fn to_cents(value: Decimal) -> Option<i64> {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    (rounded * Decimal::ONE_HUNDRED).to_i64()
}

/// Convert integer cents to a decimal currency amount (2 fractional digits)
pub fn to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_round_trip() {
        assert_eq!(to_cents(Decimal::new(4500, 2)), Some(4500));
        assert_eq!(to_cents(Decimal::new(1, 2)), Some(1));
        assert_eq!(to_decimal(9000), Decimal::new(9000, 2));
    }

    #[test]
    fn rounds_half_up_to_cents() {
        assert_eq!(to_cents(Decimal::new(1005, 3)), Some(101));
        assert_eq!(to_cents(Decimal::new(1004, 3)), Some(100));
    }

    #[test]
    fn accumulation_is_exact() {
        // 0.01 summed one thousand times must be exactly 10.00
        let mut total = 0i64;
        for _ in 0..1000 {
            total += to_cents(Decimal::new(1, 2)).unwrap();
        }
        assert_eq!(to_decimal(total), Decimal::new(1000, 2));
    }
}
