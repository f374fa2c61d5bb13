use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics::counter;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::{anon_hash, dev_logging_enabled};
use crate::engine::{self, ScoringInputs};
use crate::model::{CcjRecord, CompanyProfile, DirectorChange, Filing, InsolvencyNotice};
use crate::registry::RegistryClient;
use crate::risk::{RiskResult, Thresholds};
use crate::store::{normalize, DocumentStore, Page};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub registry: Option<Arc<RegistryClient>>,
    pub default_thresholds: Thresholds,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/sbri/health", get(health))
        .route("/api/sbri/search", get(search))
        .route("/api/sbri/company/{number}", get(company))
        .route("/api/sbri/company/{number}/filings", get(filings))
        .route(
            "/api/sbri/company/{number}/director-changes",
            get(director_changes),
        )
        .route("/api/sbri/company/{number}/ccjs", get(ccjs))
        .route("/api/sbri/company/{number}/full", get(company_full))
        .route("/api/sbri/company/{number}/scored", get(company_scored))
        .route("/api/sbri/sector/{sic}", get(sector))
        .route("/api/sbri/insolvency/{number}", get(insolvency))
        .route("/api/sbri/registry/company/{number}", get(registry_company))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Error surface at the HTTP boundary. The scoring engine itself never
/// fails; everything here comes from lookups or the registry proxy.
pub enum ApiError {
    NotFound(&'static str),
    Lookup(&'static str, anyhow::Error),
    RateLimited,
    Upstream(&'static str, anyhow::Error),
    NotConfigured(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            ApiError::NotFound(code) => (StatusCode::NOT_FOUND, code),
            ApiError::Lookup(code, e) => {
                warn!(error = ?e, code, "lookup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, code)
            }
            ApiError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            ApiError::Upstream(code, e) => {
                warn!(error = ?e, code, "upstream call failed");
                (StatusCode::BAD_GATEWAY, code)
            }
            ApiError::NotConfigured(code) => (StatusCode::SERVICE_UNAVAILABLE, code),
        };
        (status, Json(json!({ "error": code }))).into_response()
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    profiles: usize,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let profiles = state
        .store
        .profile_count()
        .await
        .map_err(|e| ApiError::Lookup("health_failed", e))?;
    Ok(Json(HealthResponse {
        status: "ok",
        profiles,
    }))
}

#[derive(serde::Deserialize)]
struct SearchQuery {
    #[serde(default)]
    name: String,
}

const SEARCH_LIMIT: usize = 50;

async fn search(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<CompanyProfile>>, ApiError> {
    if q.name.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }
    let items = state
        .store
        .search_profiles(&q.name, SEARCH_LIMIT)
        .await
        .map_err(|e| ApiError::Lookup("search_failed", e))?;
    Ok(Json(items))
}

/// Profile with business status injected and the latest accounts attached.
/// Status injection is best-effort; a failing status lookup never fails the
/// profile request.
async fn load_profile(
    store: &dyn DocumentStore,
    company_number: &str,
) -> anyhow::Result<Option<CompanyProfile>> {
    let Some(mut profile) = store.profile(company_number).await? else {
        return Ok(None);
    };
    if profile.status.is_none() {
        if let Some(raw) = store
            .business_status(company_number)
            .await
            .ok()
            .flatten()
        {
            profile.status = normalize::capitalize_status(&raw);
        }
    }
    if profile.latest_accounts.is_none() {
        profile.latest_accounts = store.latest_accounts(company_number).await?;
    }
    Ok(Some(profile))
}

async fn company(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let profile = load_profile(state.store.as_ref(), &number)
        .await
        .map_err(|e| ApiError::Lookup("profile_lookup_failed", e))?;
    // Unknown companies answer with an empty document, matching the
    // original read contract; only /scored insists on 404.
    match profile {
        Some(p) => Ok(Json(serde_json::to_value(p).unwrap_or_else(|_| json!({})))),
        None => Ok(Json(json!({}))),
    }
}

#[derive(serde::Serialize)]
struct PagedResponse<T> {
    page: usize,
    size: usize,
    items: Vec<T>,
}

async fn filings(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(page): Query<Page>,
) -> Result<Json<PagedResponse<Filing>>, ApiError> {
    let page = page.clamped();
    let items = state
        .store
        .filings(&number, page)
        .await
        .map_err(|e| ApiError::Lookup("filings_failed", e))?;
    Ok(Json(PagedResponse {
        page: page.page,
        size: page.size,
        items,
    }))
}

async fn director_changes(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(page): Query<Page>,
) -> Result<Json<PagedResponse<DirectorChange>>, ApiError> {
    let page = page.clamped();
    let items = state
        .store
        .director_changes(&number, page)
        .await
        .map_err(|e| ApiError::Lookup("director_changes_failed", e))?;
    Ok(Json(PagedResponse {
        page: page.page,
        size: page.size,
        items,
    }))
}

#[derive(serde::Serialize)]
struct ItemsResponse<T> {
    items: Vec<T>,
}

async fn ccjs(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<ItemsResponse<CcjRecord>>, ApiError> {
    let items = state
        .store
        .ccjs(&number)
        .await
        .map_err(|e| ApiError::Lookup("ccj_lookup_failed", e))?;
    Ok(Json(ItemsResponse { items }))
}

const INSOLVENCY_LIMIT: usize = 50;

async fn insolvency(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<ItemsResponse<InsolvencyNotice>>, ApiError> {
    let items = state
        .store
        .insolvency_notices(&number, INSOLVENCY_LIMIT)
        .await
        .map_err(|e| ApiError::Lookup("insolvency_lookup_failed", e))?;
    Ok(Json(ItemsResponse { items }))
}

#[derive(serde::Deserialize)]
struct SectorQuery {
    region: Option<String>,
}

async fn sector(
    State(state): State<AppState>,
    Path(sic): Path<String>,
    Query(q): Query<SectorQuery>,
) -> Result<Json<Value>, ApiError> {
    let benchmark = state
        .store
        .sector_stats(&sic, q.region.as_deref())
        .await
        .map_err(|e| ApiError::Lookup("sector_lookup_failed", e))?;
    match benchmark {
        Some(b) => Ok(Json(serde_json::to_value(b).unwrap_or_else(|_| json!({})))),
        None => Ok(Json(json!({}))),
    }
}

#[derive(serde::Serialize)]
struct FullCompanyResponse {
    company_number: String,
    profile: Value,
    latest_accounts: Option<crate::model::FinancialSnapshot>,
}

async fn company_full(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<FullCompanyResponse>, ApiError> {
    let profile = load_profile(state.store.as_ref(), &number)
        .await
        .map_err(|e| ApiError::Lookup("profile_full_failed", e))?;
    let latest_accounts = profile.as_ref().and_then(|p| p.latest_accounts.clone());
    let profile_json = profile
        .map(|p| serde_json::to_value(p).unwrap_or_else(|_| json!({})))
        .unwrap_or_else(|| json!({}));
    Ok(Json(FullCompanyResponse {
        company_number: number,
        profile: profile_json,
        latest_accounts,
    }))
}

#[derive(serde::Serialize)]
struct ScoredResponse {
    profile: CompanyProfile,
    risk: RiskResult,
}

async fn company_scored(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<ScoredResponse>, ApiError> {
    let profile = load_profile(state.store.as_ref(), &number)
        .await
        .map_err(|e| ApiError::Lookup("profile_scored_failed", e))?
        .ok_or(ApiError::NotFound("company_not_found"))?;

    // Stored-score and benchmark lookups are best-effort: a missing or
    // failing collection degrades to a fresh computation, never to a 500.
    let stored = state.store.stored_score(&number).await.ok().flatten();

    let sic = profile.primary_sic().map(str::to_string);
    let region = profile.region.as_deref();
    let (benchmark, thresholds_record) = match sic.as_deref() {
        Some(code) => (
            state.store.sector_stats(code, region).await.ok().flatten(),
            state
                .store
                .thresholds_record(code, region)
                .await
                .ok()
                .flatten(),
        ),
        None => (None, None),
    };
    let thresholds = state
        .default_thresholds
        .overridden_by(thresholds_record.as_ref());

    let risk = engine::assess(&ScoringInputs {
        snapshot: profile.latest_accounts.as_ref(),
        benchmark: benchmark.as_ref(),
        thresholds,
        stored: stored.as_ref(),
    });

    counter!("sbri_scored_requests_total").increment(1);
    if stored.is_some() {
        counter!("sbri_scored_stored_total").increment(1);
    }
    if dev_logging_enabled() {
        // Anonymized id only; raw company numbers stay out of logs.
        info!(
            target: "scored",
            id = %anon_hash(&number),
            score = risk.score,
            level = %risk.level,
            stored = stored.is_some(),
        );
    }

    Ok(Json(ScoredResponse { profile, risk }))
}

async fn registry_company(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let Some(client) = state.registry.as_ref() else {
        return Err(ApiError::NotConfigured("registry_not_configured"));
    };
    if !client.allow() {
        counter!("sbri_registry_limited_total").increment(1);
        return Err(ApiError::RateLimited);
    }
    let body = client
        .company(&number)
        .await
        .map_err(|e| ApiError::Upstream("registry_lookup_failed", e))?
        .ok_or(ApiError::NotFound("company_not_found"))?;
    Ok(Json(body))
}
