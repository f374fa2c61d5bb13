// tests/scored_bands.rs
//
// Band boundary tests for the public /scored endpoint. Stored score records
// pin the numeric score exactly, so the classification boundaries can be
// probed end to end: thresholds are inclusive lower bounds.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::Request,
    Router,
};
use http::StatusCode;
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use sbri_risk_service::api::{self, AppState};
use sbri_risk_service::risk::Thresholds;
use sbri_risk_service::store::{DocumentStore, MemStore};

/// One company per probed score; 9000xx numbers carry no industry code, so
/// the global default thresholds {high: 70, medium: 40} apply. 910001 has a
/// partial per-industry override (high only) to prove per-field fallback.
fn band_router() -> Router {
    let seed = json!({
        "profiles": [
            { "company_number": "900039", "company_name": "BAND 39 LTD" },
            { "company_number": "900040", "company_name": "BAND 40 LTD" },
            { "company_number": "900069", "company_name": "BAND 69 LTD" },
            { "company_number": "900070", "company_name": "BAND 70 LTD" },
            { "company_number": "910001", "company_name": "OVERRIDE LTD", "sic_codes": ["11111"] }
        ],
        "risk_scores": [
            { "company_number": "900039", "score": 39, "reasons": ["pinned"] },
            { "company_number": "900040", "score": 40, "reasons": ["pinned"] },
            { "company_number": "900069", "score": 69, "reasons": ["pinned"] },
            { "company_number": "900070", "score": 70, "reasons": ["pinned"] },
            { "company_number": "910001", "score": 67, "reasons": ["pinned"] }
        ],
        "risk_thresholds": [
            { "sic_code": "11111", "high": 65 }
        ]
    });
    let store: Arc<dyn DocumentStore> = Arc::new(MemStore::from_value(&seed));
    api::router(AppState {
        store,
        registry: None,
        default_thresholds: Thresholds::default(),
    })
}

async fn scored_level(router: Router, number: &str) -> String {
    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/sbri/company/{number}/scored"))
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "scored {number}");
    let bytes = to_bytes(resp.into_body(), 256 * 1024).await.unwrap();
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    v["risk"]["level"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn boundary_scores_land_in_the_higher_band() {
    assert_eq!(scored_level(band_router(), "900039").await, "low");
    assert_eq!(scored_level(band_router(), "900040").await, "medium");
    assert_eq!(scored_level(band_router(), "900069").await, "medium");
    assert_eq!(scored_level(band_router(), "900070").await, "high");
}

#[tokio::test]
async fn partial_threshold_override_reclassifies_stored_score() {
    // Score 67 is medium under the defaults, but the industry record lowers
    // `high` to 65 while `medium` still comes from the global default.
    assert_eq!(scored_level(band_router(), "910001").await, "high");
}
