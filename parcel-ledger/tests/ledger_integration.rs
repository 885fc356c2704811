//! Tests d'intégration du registre : ingestion, numérotation, agrégats, visibilité

use std::path::PathBuf;

use parcel_geo::Crs;
use parcel_ledger::{
    aggregate, by_status, visible_set, IngestStatus, JsonFileStore, LedgerConfig, MemoryStore,
    NewParcel, Parcel, ParcelLedger, ParcelStatus, ParcelStore, ParcelUpdate, VisibilitySet,
    NOT_AVAILABLE,
};
use rust_decimal::Decimal;

fn spanish_ledger() -> ParcelLedger<MemoryStore> {
    let config = LedgerConfig::from_preset("es-sdgc").unwrap();
    ParcelLedger::new(MemoryStore::new(), config.resolver().unwrap())
        .with_default_crs(config.default_crs)
}

/// Rectangle en ETRS89 / UTM 30N, près de Madrid
fn rectangle(x0: f64, y0: f64, width: f64, height: f64) -> Vec<(f64, f64)> {
    vec![
        (x0, y0),
        (x0 + width, y0),
        (x0 + width, y0 + height),
        (x0, y0 + height),
        (x0, y0),
    ]
}

fn parcel(id: &str, status: ParcelStatus, ha: Option<f64>, cost: Option<Decimal>) -> Parcel {
    Parcel {
        id: id.to_string(),
        parcel_id: id.to_string(),
        display_name: None,
        lot_number: id.to_string(),
        source_crs: Crs::from_epsg(25830),
        boundary: vec![],
        geometry: None,
        area_hectares: ha,
        status,
        total_cost: cost,
        geometry_error: None,
    }
}

#[test]
fn test_lot_number_determinism() {
    let resolver = LedgerConfig::from_preset("es-sdgc")
        .unwrap()
        .resolver()
        .unwrap();

    for raw in [
        "ES.SDGC.CP.28079A00100023",
        "uploads/ES.SDGC.CP.45168A01200007.gml",
        "lot 4417",
        "xyz",
    ] {
        assert_eq!(resolver.resolve(raw), resolver.resolve(raw), "raw={}", raw);
    }
}

#[test]
fn test_lot_number_fallback_sentinel() {
    let resolver = LedgerConfig::from_preset("generic")
        .unwrap()
        .resolver()
        .unwrap();
    assert_eq!(resolver.resolve("xyz"), NOT_AVAILABLE);
}

#[test]
fn test_aggregate_empty_is_zero() {
    let summary = aggregate(&[]);

    assert_eq!(summary.total_investment, Decimal::ZERO);
    assert_eq!(summary.total_owned_area, Decimal::ZERO);
    assert_eq!(summary.total_owned_area_sqm, Decimal::ZERO);
    assert_eq!(summary.avg_cost_per_hectare, Decimal::ZERO);
    assert_eq!(summary.avg_cost_per_sqm, Decimal::ZERO);
    assert_eq!(summary.confirmed_potential_investment, Decimal::ZERO);
    assert_eq!(summary.estimated_potential_investment, Decimal::ZERO);
    assert_eq!(summary.potential_investment, Decimal::ZERO);
    assert!(!summary.has_estimated_costs);
}

#[test]
fn test_partial_data_handling() {
    let parcels = vec![
        parcel("a", ParcelStatus::Owned, Some(1.0), Some(Decimal::from(10_000))),
        parcel("b", ParcelStatus::Owned, Some(2.0), None),
        parcel("c", ParcelStatus::Owned, Some(3.0), Some(Decimal::from(30_000))),
    ];
    let summary = aggregate(&parcels);

    assert_eq!(summary.owned_count, 3);
    assert_eq!(summary.total_investment, Decimal::from(40_000));
    assert_eq!(summary.total_owned_area, Decimal::from(4));
    assert_eq!(summary.parcels_without_cost, vec!["b"]);
    assert!(summary.parcels_without_area.is_empty());
    assert_eq!(summary.valid_for_calculation, vec!["a", "c"]);
}

#[test]
fn test_estimation_scenario() {
    // 2 ha acquis pour 100 000 : 5 par m²
    let parcels = vec![
        parcel("owned", ParcelStatus::Owned, Some(2.0), Some(Decimal::from(100_000))),
        parcel("nego", ParcelStatus::Negotiating, Some(2.0), None),
    ];
    let summary = aggregate(&parcels);

    assert_eq!(summary.avg_cost_per_sqm, Decimal::from(5));
    assert_eq!(summary.estimated_potential_investment, Decimal::from(100_000));
    assert_eq!(summary.potential_investment, Decimal::from(100_000));
    assert!(summary.has_estimated_costs);
}

#[test]
fn test_visibility_toggle_idempotent() {
    let parcels = vec![
        parcel("a", ParcelStatus::Owned, None, None),
        parcel("b", ParcelStatus::ShoppingList, None, None),
    ];
    let mut visibility: VisibilitySet = ["a"].into_iter().collect();

    for id in ["a", "b"] {
        let before = visibility.is_visible(id);
        visibility.toggle(id);
        visibility.toggle(id);
        assert_eq!(visibility.is_visible(id), before, "id={}", id);
    }

    let visible: Vec<&str> = visible_set(&parcels, &visibility)
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(visible, vec!["a"]);
}

#[test]
fn test_batch_partial_failure() {
    let mut ledger = spanish_ledger();
    let batch = vec![
        NewParcel::new(
            "ES.SDGC.CP.28079A00100023",
            rectangle(440_000.0, 4_474_000.0, 200.0, 100.0),
        )
        .with_status(ParcelStatus::Owned)
        .with_cost(Decimal::from(8_000)),
        // Moins de 3 sommets distincts : signalée, pas écartée
        NewParcel::new(
            "ES.SDGC.CP.28079A00100024",
            vec![(440_300.0, 4_474_000.0), (440_400.0, 4_474_000.0), (440_300.0, 4_474_000.0)],
        )
        .with_status(ParcelStatus::Owned),
        NewParcel::new(
            "ES.SDGC.CP.28079A00100025",
            rectangle(440_500.0, 4_474_000.0, 100.0, 100.0),
        )
        .with_status(ParcelStatus::Negotiating),
    ];

    let report = ledger.ingest_batch(batch).unwrap();
    assert_eq!(report.status, IngestStatus::PartialSuccess);
    assert_eq!(report.ingested, 3);
    assert_eq!(report.flagged, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].parcel_id, "ES.SDGC.CP.28079A00100024");

    let parcels = ledger.parcels().unwrap();
    let lots: Vec<&str> = parcels.iter().map(|p| p.lot_number.as_str()).collect();
    assert_eq!(lots, vec!["001-23", "001-24", "001-25"]);

    let summary = ledger.summary().unwrap();
    assert_eq!(summary.flagged_parcels.len(), 1);
    assert_eq!(summary.parcels_without_area, vec![parcels[1].id.clone()]);
    assert_eq!(summary.valid_for_calculation, vec![parcels[0].id.clone()]);
    // 8 000 pour ~2 ha : le 1 ha en négociation est estimé à ~4 000
    assert!(summary.has_estimated_costs);
    let estimate = summary.estimated_potential_investment;
    assert!(
        estimate > Decimal::from(3_990) && estimate < Decimal::from(4_010),
        "estimate={}",
        estimate
    );
}

#[test]
fn test_axis_swapped_survey_corrected() {
    let mut ledger = spanish_ledger();
    let swapped: Vec<(f64, f64)> = rectangle(440_000.0, 4_474_000.0, 100.0, 100.0)
        .into_iter()
        .map(|(x, y)| (y, x))
        .collect();

    let report = ledger
        .ingest_batch(vec![NewParcel::new("ES.SDGC.CP.28079A00300001", swapped)])
        .unwrap();
    assert_eq!(report.status, IngestStatus::Success);
    assert_eq!(report.corrections.get("AXIS_SWAPPED"), Some(&1));

    let parcel = &ledger.parcels().unwrap()[0];
    let first = parcel.geometry.as_ref().unwrap()[0];
    assert!((first.lat - 40.416).abs() < 0.01, "lat={}", first.lat);
    assert!((first.lng - (-3.706)).abs() < 0.01, "lng={}", first.lng);
    // La saisie brute est conservée telle quelle
    assert_eq!(parcel.boundary[0], (4_474_000.0, 440_000.0));
}

#[test]
fn test_status_transitions_keep_boundary() {
    let mut ledger = spanish_ledger();
    let parcel = ledger
        .ingest(NewParcel::new(
            "ES.SDGC.CP.28079A00100023",
            rectangle(440_000.0, 4_474_000.0, 100.0, 100.0),
        ))
        .unwrap();
    assert_eq!(parcel.status, ParcelStatus::ShoppingList);

    for status in [
        ParcelStatus::Negotiating,
        ParcelStatus::Owned,
        ParcelStatus::Negotiating,
        ParcelStatus::ShoppingList,
    ] {
        let updated = ledger.update(&parcel.id, &ParcelUpdate::status(status)).unwrap();
        assert_eq!(updated.status, status);
        assert_eq!(updated.boundary, parcel.boundary);
        assert_eq!(updated.lot_number, parcel.lot_number);
        assert_eq!(updated.area_hectares, parcel.area_hectares);
    }

    let parcels = ledger.parcels().unwrap();
    assert_eq!(by_status(&parcels, ParcelStatus::ShoppingList).len(), 1);
    assert!(by_status(&parcels, ParcelStatus::Owned).is_empty());
}

fn temp_store(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "parcel_ledger_it_{}_{}.json",
        name,
        std::process::id()
    ));
    std::fs::remove_file(&path).ok();
    path
}

#[test]
fn test_json_store_roundtrip_through_ledger() {
    let path = temp_store("ledger");
    let config = LedgerConfig::from_preset("es-sdgc").unwrap();

    {
        let store = JsonFileStore::open(&path).unwrap();
        let mut ledger =
            ParcelLedger::new(store, config.resolver().unwrap()).with_default_crs(config.default_crs);
        ledger
            .ingest(
                NewParcel::new(
                    "ES.SDGC.CP.28079A00100023",
                    rectangle(440_000.0, 4_474_000.0, 100.0, 100.0),
                )
                .with_status(ParcelStatus::Owned)
                .with_cost(Decimal::new(1_999_999, 2)),
            )
            .unwrap();
    }

    let store = JsonFileStore::open(&path).unwrap();
    let parcels = store.list().unwrap();
    assert_eq!(parcels.len(), 1);
    assert_eq!(parcels[0].lot_number, "001-23");
    assert_eq!(parcels[0].total_cost, Some(Decimal::new(1_999_999, 2)));
    assert!(parcels[0].geometry.is_some());

    // Le numéro déjà pris est respecté après rechargement
    let mut ledger =
        ParcelLedger::new(store, config.resolver().unwrap()).with_default_crs(config.default_crs);
    let second = ledger
        .ingest(NewParcel::new(
            "ES.SDGC.CP.28079B00100023",
            rectangle(441_000.0, 4_474_000.0, 100.0, 100.0),
        ))
        .unwrap();
    assert_eq!(second.lot_number, "001-23-2");

    std::fs::remove_file(path).ok();
}

#[test]
fn test_flagged_non_finite_survey_keeps_store_readable() {
    let path = temp_store("non_finite");
    let config = LedgerConfig::from_preset("es-sdgc").unwrap();

    let mut boundary = rectangle(440_000.0, 4_474_000.0, 100.0, 100.0);
    boundary[0] = (f64::NAN, 4_474_000.0);

    let store = JsonFileStore::open(&path).unwrap();
    let mut ledger =
        ParcelLedger::new(store, config.resolver().unwrap()).with_default_crs(config.default_crs);
    let report = ledger
        .ingest_batch(vec![
            NewParcel::new("ES.SDGC.CP.28079A00100031", boundary),
            NewParcel::new(
                "ES.SDGC.CP.28079A00100032",
                rectangle(440_500.0, 4_474_000.0, 100.0, 100.0),
            ),
        ])
        .unwrap();
    assert_eq!(report.flagged, 1);

    let reopened = JsonFileStore::open(&path).unwrap();
    let parcels = reopened.list().unwrap();
    assert_eq!(parcels.len(), 2);
    assert!(parcels[0].is_flagged());
    assert!(parcels[0].boundary[0].0.is_nan());
    assert_eq!(parcels[1].lot_number, "001-32");

    let summary = aggregate(&parcels);
    assert_eq!(summary.flagged_parcels.len(), 1);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_aggregate_overflow_does_not_panic() {
    let parcels = vec![
        parcel("a", ParcelStatus::Owned, Some(1.0), Some(Decimal::MAX)),
        parcel("b", ParcelStatus::Owned, Some(1.0), Some(Decimal::MAX)),
    ];
    let summary = aggregate(&parcels);

    assert_eq!(summary.total_investment, Decimal::MAX);
    assert_eq!(summary.overflowed_parcels, vec!["b"]);
    assert!(summary.has_data_issues());
}
