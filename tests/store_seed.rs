// tests/store_seed.rs
//
// Seed-file loading and schema-drift tolerance: documents under legacy
// collection names and field shapes must come out canonical, and the seeded
// store must honor the lookup precedence rules the scored flow depends on.

use std::io::Write as _;

use sbri_risk_service::store::{DocumentStore, MemStore, Page};

/// A deliberately old-shaped seed: alternate collection names everywhere.
const LEGACY_SEED: &str = r#"{
    "profiles": [
        { "companyNumber": "01234567", "name": "DRIFT HOLDINGS LTD", "sic_code": "47110", "registered_office_region": "Leeds" }
    ],
    "business_profiles": [
        { "company_number": "01234567", "status": "DORMANT" }
    ],
    "company_accounts": [
        { "company_number": "01234567", "year": 2021, "revenue": "800000", "profit_loss": -15000 },
        { "company_number": "01234567", "periodEnd": "2022-06-30", "sales": 900000, "net_profit": 45000 }
    ],
    "officer_changes": [
        { "company_number": "01234567", "resigned_on": "2024-11-02", "person_name": "Dana Fox" },
        { "company_number": "01234567", "notified_on": "2023-04-01", "officer": { "name": "Eli Gray", "description": "Appointed to the board" } }
    ],
    "sector_benchmarks": [
        { "sic": "47110", "region": "Leeds", "period": "2024Q2", "fail_rate": 4.2 },
        { "sic": "47110", "period": "2024Q1", "fail_rate": 0.03 }
    ],
    "thresholds": [
        { "sic": "47110", "medium": 35 }
    ],
    "scores": [
        { "company_number": "01234567", "score": "55", "reasons": ["Legacy import"] }
    ]
}"#;

fn legacy_store() -> MemStore {
    let mut file = tempfile::NamedTempFile::new().expect("temp seed file");
    file.write_all(LEGACY_SEED.as_bytes()).expect("write seed");
    MemStore::load_from_file(file.path()).expect("load legacy seed")
}

#[tokio::test]
async fn legacy_profile_fields_are_canonicalized() {
    let store = legacy_store();
    let p = store.profile("01234567").await.unwrap().unwrap();
    assert_eq!(p.company_name, "DRIFT HOLDINGS LTD");
    assert_eq!(p.sic_codes, vec!["47110".to_string()]);
    assert_eq!(p.region.as_deref(), Some("Leeds"));

    let status = store.business_status("01234567").await.unwrap();
    assert_eq!(status.as_deref(), Some("DORMANT"));
}

#[tokio::test]
async fn latest_accounts_come_from_the_newest_legacy_record() {
    let store = legacy_store();
    let latest = store.latest_accounts("01234567").await.unwrap().unwrap();
    // periodEnd 2022-06-30 beats the bare year 2021.
    assert_eq!(latest.turnover, 900_000.0);
    assert_eq!(latest.profit, 45_000.0);
    assert_eq!(
        latest.period_end,
        chrono::NaiveDate::from_ymd_opt(2022, 6, 30)
    );
}

#[tokio::test]
async fn officer_changes_normalize_names_and_types() {
    let store = legacy_store();
    let changes = store
        .director_changes("01234567", Page::default())
        .await
        .unwrap();
    assert_eq!(changes.len(), 2);

    // Newest first: the resignation.
    assert_eq!(changes[0].change_type.as_deref(), Some("Resigned"));
    assert_eq!(changes[0].officer_name.as_deref(), Some("Dana Fox"));

    // Nested officer object, type inferred from the description text.
    assert_eq!(changes[1].change_type.as_deref(), Some("Appointed"));
    assert_eq!(changes[1].officer_name.as_deref(), Some("Eli Gray"));
    assert_eq!(
        changes[1].details.as_deref(),
        Some("Appointed to the board")
    );
}

#[tokio::test]
async fn sector_and_threshold_precedence_survive_legacy_naming() {
    let store = legacy_store();

    // Region-specific record wins; percentage-style rate stays raw here
    // (the engine normalizes it later).
    let regional = store
        .sector_stats("47110", Some("Leeds"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(regional.failure_rate, 4.2);

    let agnostic = store.sector_stats("47110", None).await.unwrap().unwrap();
    assert_eq!(agnostic.failure_rate, 0.03);

    let rec = store
        .thresholds_record("47110", Some("Leeds"))
        .await
        .unwrap()
        .unwrap();
    // Region-agnostic record applies to any region; only `medium` is set.
    assert_eq!(rec.medium, Some(35.0));
    assert_eq!(rec.high, None);
}

#[tokio::test]
async fn stored_score_parses_numeric_strings() {
    let store = legacy_store();
    let stored = store.stored_score("01234567").await.unwrap().unwrap();
    assert_eq!(stored.score, 55.0);
    assert_eq!(stored.reasons, vec!["Legacy import".to_string()]);
}

#[tokio::test]
async fn missing_seed_file_falls_back_to_demo_data() {
    let store = MemStore::load_or_default("data/definitely-missing-seed.json");
    assert!(store.seeded_profiles() > 0);
    assert!(store.profile("00000006").await.unwrap().is_some());
}
