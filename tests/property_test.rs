//! Property-based tests for matching, tier evaluation and zone writes

use proptest::prelude::*;
use rust_decimal::Decimal;
use shipfee::*;
use std::collections::BTreeMap;

const REGIONS: [&str; 4] = ["Greater Accra", "Ashanti", "Volta", "Northern"];

fn amount(max_cents: i64) -> impl Strategy<Value = Decimal> {
    (0..max_cents).prop_map(|c| Decimal::new(c, 2))
}

fn signed_amount(max_cents: i64) -> impl Strategy<Value = Decimal> {
    (-max_cents..max_cents).prop_map(|c| Decimal::new(c, 2))
}

fn any_tier() -> impl Strategy<Value = RateTier> {
    (any::<bool>(), (0i64..20).prop_map(Decimal::from), signed_amount(5_000)).prop_map(
        |(is_weight, threshold, fee)| {
            if is_weight {
                RateTier::weight(threshold, fee)
            } else {
                RateTier::price(threshold, fee)
            }
        },
    )
}

fn zone(id: usize, region: &str, base_rate: Decimal, tiers: Vec<RateTier>) -> ShippingZone {
    ShippingZone {
        id: ZoneId(format!("z{}", id)),
        name: region.to_string(),
        vendor_region: REGIONS[0].into(),
        region: region.into(),
        base_rate,
        is_default: false,
        additional_rates: tiers,
    }
}

#[derive(Debug, Clone)]
enum Op {
    Create { region: usize, is_default: bool },
    SetDefault(usize),
    Delete(usize),
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..REGIONS.len(), any::<bool>())
            .prop_map(|(region, is_default)| Op::Create { region, is_default }),
        (0usize..8).prop_map(Op::SetDefault),
        (0usize..8).prop_map(Op::Delete),
    ]
}

proptest! {
    #[test]
    fn test_highest_qualifying_tier_only(
        tiers in prop::collection::vec(any_tier(), 0..8),
        metric in (0i64..25).prop_map(Decimal::from),
    ) {
        let expected = tiers
            .iter()
            .filter(|t| t.kind() == TierKind::Weight && t.threshold() <= metric)
            .map(|t| t.threshold())
            .max()
            .map(|best| {
                tiers
                    .iter()
                    .find(|t| t.kind() == TierKind::Weight && t.threshold() == best)
                    .map(RateTier::additional_fee)
                    .unwrap_or_default()
            })
            .unwrap_or(Decimal::ZERO);

        prop_assert_eq!(evaluate(&tiers, TierKind::Weight, metric), expected);
    }

    #[test]
    fn test_fee_never_negative(
        base_rate in amount(5_000),
        tiers in prop::collection::vec(any_tier(), 0..6),
        weight in amount(3_000),
        price in amount(3_000),
    ) {
        let zones = vec![zone(1, "Ashanti", base_rate, tiers)];
        let shipment = Shipment {
            vendor_region: REGIONS[0].into(),
            destination_region: "Ashanti".into(),
            total_weight: weight,
            total_price: price,
        };
        let fee = quote_shipment(&shipment, &zones, &CalculatorOptions::default()).unwrap();
        prop_assert!(fee.fee >= Decimal::ZERO);
        prop_assert!(fee.fee.scale() <= 2);
    }

    #[test]
    fn test_exact_match_beats_default(
        destination in 0..REGIONS.len(),
        default_region in 0..REGIONS.len(),
    ) {
        let mut zones: Vec<ShippingZone> = REGIONS
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != destination)
            .map(|(i, r)| zone(i, r, Decimal::ONE, vec![]))
            .collect();
        let mut exact = zone(99, REGIONS[destination], Decimal::TWO, vec![]);
        exact.is_default = destination == default_region;
        for z in zones.iter_mut() {
            z.is_default = z.region == REGIONS[default_region];
        }
        zones.push(exact);

        let matched = match_zone(REGIONS[0], REGIONS[destination], &zones).unwrap();
        prop_assert_eq!(matched.kind, MatchKind::Exact);
        prop_assert_eq!(matched.zone.region.as_str(), REGIONS[destination]);
    }

    #[test]
    fn test_compute_is_deterministic(
        weights in prop::collection::vec(amount(2_000), 0..6),
        destination in 0..REGIONS.len(),
    ) {
        let mut default_zone = zone(0, REGIONS[0], Decimal::TEN, vec![]);
        default_zone.is_default = true;
        let book = ZoneBook {
            vendor_id: VendorId::from("v"),
            base_region: REGIONS[0].into(),
            zones: vec![
                default_zone,
                zone(
                    1,
                    REGIONS[1],
                    Decimal::from(20),
                    vec![RateTier::weight(Decimal::from(5), Decimal::from(8))],
                ),
            ],
        };
        let books: BTreeMap<VendorId, ZoneBook> = [(book.vendor_id.clone(), book)].into();
        let cart = Cart {
            destination_region: REGIONS[destination].into(),
            items: weights
                .into_iter()
                .map(|weight| LineItem {
                    product_id: String::new(),
                    vendor_id: VendorId::from("v"),
                    weight,
                    price: Decimal::ONE,
                    quantity: 1,
                })
                .collect(),
        };

        let first = compute(&cart, &books, &CalculatorOptions::default()).unwrap();
        let second = compute(&cart, &books, &CalculatorOptions::default()).unwrap();
        prop_assert_eq!(&first, &second);
        let sum: Decimal = first.per_vendor.values().map(VendorFee::fee).sum();
        prop_assert_eq!(first.total, sum);
    }

    #[test]
    fn test_at_most_one_default_after_any_writes(ops in prop::collection::vec(any_op(), 1..25)) {
        let mut book = ZoneBook::new("v", REGIONS[0]);

        for op in ops {
            let before = book.clone();
            let mut manager = ZoneManager::new(&mut book);
            let ids: Vec<ZoneId> = manager.book().zones.iter().map(|z| z.id.clone()).collect();
            let result = match op {
                Op::Create { region, is_default } => manager
                    .create(&ZoneDraft {
                        name: REGIONS[region].into(),
                        vendor_region: REGIONS[0].into(),
                        region: REGIONS[region].into(),
                        base_rate: Decimal::ONE,
                        is_default,
                        ..ZoneDraft::default()
                    })
                    .map(|_| ()),
                Op::SetDefault(i) if i < ids.len() => manager.set_default(&ids[i]).map(|_| ()),
                Op::Delete(i) if i < ids.len() => manager.delete(&ids[i]).map(|_| ()),
                Op::SetDefault(_) | Op::Delete(_) => continue,
            };

            if result.is_err() {
                prop_assert_eq!(&book, &before);
            }
            prop_assert!(check_default_invariant(&book.zones).is_ok());
            prop_assert!(book.check(&ValidationLimits::default()).is_ok());
        }
    }
}
