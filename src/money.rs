//! Fixed-point amounts
//!
//! Fees, weights and thresholds are all `rust_decimal::Decimal`, so summing
//! many line items never drifts the way `f64` would.

use rust_decimal::{Decimal, RoundingStrategy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Monetary amount in the store currency
pub type Money = Decimal;

/// How to round fees to the currency scale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// 2.345 -> 2.35, -2.345 -> -2.35
    #[default]
    HalfUp,
    /// Banker's rounding: 2.345 -> 2.34
    HalfEven,
}

impl Rounding {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Rounding::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Rounding::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Round an amount to `scale` decimal places
pub fn round_money(amount: Money, scale: u32, rounding: Rounding) -> Money {
    amount.round_dp_with_strategy(scale, rounding.strategy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_money(d("2.345"), 2, Rounding::HalfUp), d("2.35"));
        assert_eq!(round_money(d("10"), 2, Rounding::HalfUp), d("10"));
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_money(d("2.345"), 2, Rounding::HalfEven), d("2.34"));
        assert_eq!(round_money(d("2.355"), 2, Rounding::HalfEven), d("2.36"));
    }

    #[test]
    fn test_no_float_drift() {
        let total: Money = std::iter::repeat(d("0.1")).take(10).sum();
        assert_eq!(total, d("1"));
    }
}
