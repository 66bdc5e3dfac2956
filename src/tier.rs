//! Rate tier evaluation
//!
//! Tiers are not cumulative. Among the tiers of the requested kind whose
//! threshold the metric reaches (inclusive), only the one with the largest
//! threshold contributes its fee.

use crate::money::Money;
use crate::zone::{RateTier, TierKind};
use rust_decimal::Decimal;

/// Pick the highest tier of `kind` reached by `metric`
///
/// Equal thresholds only occur in unvalidated data; the earliest one in input
/// order wins.
pub fn select_tier(tiers: &[RateTier], kind: TierKind, metric: Decimal) -> Option<&RateTier> {
    tiers
        .iter()
        .filter(|t| t.kind() == kind && t.threshold() <= metric)
        .fold(None, |best: Option<&RateTier>, tier| match best {
            Some(b) if b.threshold() >= tier.threshold() => Some(b),
            _ => Some(tier),
        })
}

/// Additional fee for `metric`, or zero when no tier qualifies
pub fn evaluate(tiers: &[RateTier], kind: TierKind, metric: Decimal) -> Money {
    let fee = select_tier(tiers, kind, metric)
        .map(RateTier::additional_fee)
        .unwrap_or(Decimal::ZERO);

    tracing::trace!(%kind, %metric, %fee, "evaluated rate tiers");
    fee
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn weight_tiers() -> Vec<RateTier> {
        vec![
            RateTier::weight(dec!(10), dec!(25)),
            RateTier::weight(dec!(5), dec!(10)),
            RateTier::price(dec!(1), dec!(99)),
        ]
    }

    #[test]
    fn test_highest_qualifying_tier_not_cumulative() {
        assert_eq!(evaluate(&weight_tiers(), TierKind::Weight, dec!(12)), dec!(25));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(evaluate(&weight_tiers(), TierKind::Weight, dec!(5)), dec!(10));
        assert_eq!(evaluate(&weight_tiers(), TierKind::Weight, dec!(10)), dec!(25));
    }

    #[test]
    fn test_below_all_thresholds_is_zero() {
        assert_eq!(evaluate(&weight_tiers(), TierKind::Weight, dec!(4.99)), Decimal::ZERO);
    }

    #[test]
    fn test_other_kind_ignored() {
        let tiers = vec![RateTier::weight(dec!(0), dec!(7))];
        assert_eq!(evaluate(&tiers, TierKind::Price, dec!(1000)), Decimal::ZERO);
        assert_eq!(evaluate(&[], TierKind::Weight, dec!(1)), Decimal::ZERO);
    }

    #[test]
    fn test_negative_fee_passes_through() {
        let tiers = vec![RateTier::price(dec!(100), dec!(-20))];
        assert_eq!(evaluate(&tiers, TierKind::Price, dec!(150)), dec!(-20));
    }

    #[test]
    fn test_duplicate_threshold_first_wins() {
        let tiers = vec![
            RateTier::weight(dec!(5), dec!(1)),
            RateTier::weight(dec!(5), dec!(2)),
        ];
        let picked = select_tier(&tiers, TierKind::Weight, dec!(6)).unwrap();
        assert_eq!(picked.additional_fee(), dec!(1));
    }
}
