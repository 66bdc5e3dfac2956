//! Admin workflow: validated writes, base-region moves and catalog files

use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shipfee::*;
use tempfile::TempDir;

fn draft(region: &str, base_rate: Decimal, is_default: bool) -> ZoneDraft {
    ZoneDraft {
        name: format!("To {}", region),
        vendor_region: "Greater Accra".into(),
        region: region.into(),
        base_rate,
        is_default,
        ..ZoneDraft::default()
    }
}

#[rstest]
#[case::missing_name(ZoneDraft { name: " ".into(), ..draft("Volta", dec!(1), false) }, "Z001", "name")]
#[case::missing_region(draft("", dec!(1), false), "Z002", "region")]
#[case::missing_vendor_region(
    ZoneDraft { vendor_region: String::new(), ..draft("Volta", dec!(1), false) },
    "Z003",
    "vendorRegion"
)]
#[case::negative_base_rate(draft("Volta", dec!(-0.01), false), "Z004", "baseRate")]
#[case::negative_threshold(
    ZoneDraft {
        additional_rates: vec![RateTier::price(dec!(-1), dec!(2))],
        ..draft("Volta", dec!(1), false)
    },
    "Z005",
    "additionalRates[0].threshold"
)]
fn test_rejected_payloads(#[case] payload: ZoneDraft, #[case] code: &str, #[case] field: &str) {
    let err = validate_zone(&payload).unwrap_err();
    assert!(err.has_code(code), "expected {} in {:?}", code, err.issues);
    assert!(err.has_field(field), "expected field {} in {:?}", field, err.issues);
}

#[test]
fn test_admin_session() {
    let mut book = ZoneBook::new("kofi", "Greater Accra");
    let mut manager = ZoneManager::new(&mut book);

    let local = manager.create(&draft("Greater Accra", dec!(10), true)).unwrap();
    let ashanti = manager.create(&draft("Ashanti", dec!(20), false)).unwrap();
    assert_eq!(local.changes.len(), 1);

    // Promoting Ashanti demotes Local in the same outcome
    let promoted = manager.set_default(&ashanti.zone.id).unwrap();
    let demoted: Vec<&ZoneId> = promoted.demoted().map(ZoneChange::zone_id).collect();
    assert_eq!(demoted, vec![&local.zone.id]);

    // Same destination twice is refused and nothing changes
    let snapshot = manager.book().clone();
    let err = manager.create(&draft(" ashanti ", dec!(5), false)).unwrap_err();
    assert!(matches!(err, Error::Config(ref e) if e.has_code("Z008")));
    assert_eq!(manager.book(), &snapshot);

    let defaults: Vec<&str> = book
        .zones
        .iter()
        .filter(|z| z.is_default)
        .map(|z| z.name.as_str())
        .collect();
    assert_eq!(defaults, vec!["To Ashanti"]);
    assert_eq!(book.default_zone("greater accra").map(|z| z.id.clone()), Some(ashanti.zone.id));
}

#[test]
fn test_base_region_change_then_reconcile() {
    let mut catalog = ZoneCatalog::default();
    let mut book = ZoneBook::new("kofi", "Greater Accra");
    {
        let mut manager = ZoneManager::new(&mut book);
        manager.create(&draft("Greater Accra", dec!(10), true)).unwrap();
        manager.create(&draft("Ashanti", dec!(20), false)).unwrap();
        let stale = manager.set_base_region("Ashanti").unwrap();
        assert_eq!(stale.len(), 2);
    }
    catalog.vendors.push(book);

    // Stale zones no longer serve the vendor
    let cart = Cart {
        destination_region: "Ashanti".into(),
        items: vec![LineItem {
            product_id: "p1".into(),
            vendor_id: VendorId::from("kofi"),
            weight: dec!(1),
            price: dec!(1),
            quantity: 1,
        }],
    };
    let calculator = FeeCalculator::default();
    assert!(calculator.compute_with_catalog(&cart, &catalog).is_err());

    let report = reconcile(&catalog);
    assert_eq!(report.status, ReconcileStatus::Drifted);
    assert!(report.vendors[0].unserved);

    let applied = apply_reconciliation(&mut catalog, &ValidationLimits::default()).unwrap();
    assert_eq!(applied[0].1.len(), 2);
    assert!(reconcile(&catalog).is_synced());

    let quote = calculator.compute_with_catalog(&cart, &catalog).unwrap();
    assert_eq!(quote.total, dec!(20));
}

#[test]
fn test_catalog_and_config_files() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("shipfee.yaml");
    std::fs::write(
        &config_path,
        "version: 1\nvalidation:\n  require_default_zone: true\n",
    )
    .unwrap();

    let config_result = validate_config_file(&config_path);
    assert!(!config_result.has_errors(), "{}", config_result.to_report());
    let config = EngineConfig::load_from_dir(dir.path()).unwrap().unwrap();

    let mut book = ZoneBook::new("ama", "Volta");
    ZoneManager::new(&mut book)
        .create(&ZoneDraft {
            vendor_region: "Volta".into(),
            ..draft("Oti", dec!(12), false)
        })
        .unwrap();
    let catalog = ZoneCatalog {
        vendors: vec![book],
    };
    let catalog_path = dir.path().join("zones.yaml");
    std::fs::write(&catalog_path, catalog.to_yaml().unwrap()).unwrap();

    let result = validate_catalog_file(&catalog_path, &config);
    assert!(!result.has_errors(), "{}", result.to_report());
    assert_eq!(result.zones_checked, 1);
    let codes: Vec<&str> = result.issues.iter().map(|i| i.code.as_str()).collect();
    assert_eq!(codes, vec!["W011"]);

    let reloaded =
        ZoneCatalog::from_yaml(&std::fs::read_to_string(&catalog_path).unwrap()).unwrap();
    assert_eq!(reloaded, catalog);
    assert_eq!(reloaded.fingerprint(), catalog.fingerprint());
}
