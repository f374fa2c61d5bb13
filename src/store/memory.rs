// src/store/memory.rs
//! In-memory document store seeded from a JSON file. Legacy collection names
//! and document shapes are accepted and canonicalized at load time; all
//! queries afterwards run against the canonical model only.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::normalize;
use super::{DocumentStore, Page};
use crate::model::{
    CcjRecord, CompanyProfile, DirectorChange, Filing, FinancialSnapshot, InsolvencyNotice,
    SectorBenchmark, StoredScore, ThresholdsRecord,
};

/// Collection-name candidates, first present wins (drift across seed
/// generations; same fallback order the historical data used).
const PROFILE_COLLECTIONS: &[&str] = &["profiles"];
const BUSINESS_PROFILE_COLLECTIONS: &[&str] = &["business_profiles", "sbri_business_profiles"];
const ACCOUNTS_COLLECTIONS: &[&str] = &[
    "financial_accounts",
    "sbri_financial_accounts",
    "company_accounts",
    "accounts",
];
const SCORE_COLLECTIONS: &[&str] = &["sbri_risk_scores", "risk_scores", "scores"];
const DIRECTOR_CHANGE_COLLECTIONS: &[&str] = &[
    "officer_changes",
    "director_changes",
    "officers_changes",
    "officer_appointments",
    "appointments",
    "officers",
];
const SECTOR_COLLECTIONS: &[&str] = &["sector_stats", "sector_benchmarks"];
const THRESHOLD_COLLECTIONS: &[&str] = &["risk_thresholds", "thresholds"];
const FILING_COLLECTIONS: &[&str] = &["filings"];
const INSOLVENCY_COLLECTIONS: &[&str] = &["insolvency_notices"];
const CCJ_COLLECTIONS: &[&str] = &["ccj_details", "sbri_ccj_details", "ccjs"];

#[derive(Debug, Default)]
pub struct MemStore {
    profiles: Vec<CompanyProfile>,
    business_status: HashMap<String, String>,
    accounts: HashMap<String, Vec<FinancialSnapshot>>,
    filings: HashMap<String, Vec<Filing>>,
    director_changes: HashMap<String, Vec<DirectorChange>>,
    ccjs: HashMap<String, Vec<CcjRecord>>,
    insolvency: HashMap<String, Vec<InsolvencyNotice>>,
    sector_stats: Vec<SectorBenchmark>,
    thresholds: Vec<ThresholdsRecord>,
    scores: HashMap<String, Vec<StoredScore>>,
}

fn collection<'a>(root: &'a Value, names: &[&str]) -> &'a [Value] {
    names
        .iter()
        .find_map(|n| root.get(*n).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

impl MemStore {
    /// Build a store from a seed document, normalizing every record.
    pub fn from_value(root: &Value) -> Self {
        let mut store = Self::default();

        for doc in collection(root, PROFILE_COLLECTIONS) {
            if let Some(p) = normalize::normalize_profile(doc) {
                store.profiles.push(p);
            }
        }

        for doc in collection(root, BUSINESS_PROFILE_COLLECTIONS) {
            if let (Some(n), Some(s)) = (
                normalize::company_number(doc),
                normalize::str_field(doc, &["status"]),
            ) {
                store.business_status.insert(n, s);
            }
        }

        for doc in collection(root, ACCOUNTS_COLLECTIONS) {
            if let Some(n) = normalize::company_number(doc) {
                store
                    .accounts
                    .entry(n)
                    .or_default()
                    .push(normalize::normalize_accounts(doc));
            }
        }

        for doc in collection(root, FILING_COLLECTIONS) {
            if let Some(n) = normalize::company_number(doc) {
                store
                    .filings
                    .entry(n)
                    .or_default()
                    .push(normalize::normalize_filing(doc));
            }
        }

        for doc in collection(root, DIRECTOR_CHANGE_COLLECTIONS) {
            if let Some(n) = normalize::company_number(doc) {
                store
                    .director_changes
                    .entry(n)
                    .or_default()
                    .push(normalize::normalize_director_change(doc));
            }
        }

        for doc in collection(root, CCJ_COLLECTIONS) {
            if let Some(n) = normalize::company_number(doc) {
                store
                    .ccjs
                    .entry(n)
                    .or_default()
                    .push(normalize::normalize_ccj(doc));
            }
        }

        for doc in collection(root, INSOLVENCY_COLLECTIONS) {
            if let Some(n) = normalize::company_number(doc) {
                store
                    .insolvency
                    .entry(n)
                    .or_default()
                    .push(normalize::normalize_insolvency(doc));
            }
        }

        for doc in collection(root, SECTOR_COLLECTIONS) {
            if let Some(s) = normalize::normalize_sector_stats(doc) {
                store.sector_stats.push(s);
            }
        }

        for doc in collection(root, THRESHOLD_COLLECTIONS) {
            if let Some(t) = normalize::normalize_thresholds_record(doc) {
                store.thresholds.push(t);
            }
        }

        for doc in collection(root, SCORE_COLLECTIONS) {
            if let Some(s) = normalize::normalize_stored_score(doc) {
                store.scores.entry(s.company_number.clone()).or_default().push(s);
            }
        }

        store.sort_collections();
        store
    }

    /// Newest-first ordering, records without a date last.
    fn sort_collections(&mut self) {
        for v in self.accounts.values_mut() {
            v.sort_by(|a, b| b.period_end.cmp(&a.period_end));
        }
        for v in self.filings.values_mut() {
            v.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));
        }
        for v in self.director_changes.values_mut() {
            v.sort_by(|a, b| b.event_date.cmp(&a.event_date));
        }
        for v in self.ccjs.values_mut() {
            v.sort_by(|a, b| b.judgment_date.cmp(&a.judgment_date));
        }
        for v in self.insolvency.values_mut() {
            v.sort_by(|a, b| b.notice_date.cmp(&a.notice_date));
        }
        for v in self.scores.values_mut() {
            v.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed data from {}", path.display()))?;
        let root: Value = serde_json::from_str(&content)
            .with_context(|| format!("parsing seed data at {}", path.display()))?;
        Ok(Self::from_value(&root))
    }

    /// Load from a seed file, falling back to the built-in demo dataset when
    /// the file is missing or unreadable.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_file(&path) {
            Ok(store) => {
                info!(
                    path = %path.as_ref().display(),
                    profiles = store.seeded_profiles(),
                    "seed data loaded"
                );
                store
            }
            Err(e) => {
                warn!(error = ?e, "seed data unavailable; using built-in demo seed");
                Self::default_seed()
            }
        }
    }

    /// Built-in demo dataset, routed through the same normalization path as
    /// file-based seeds.
    pub fn default_seed() -> Self {
        Self::from_value(&demo_seed())
    }

    /// Number of seeded company profiles (sync; used at boot for metrics).
    pub fn seeded_profiles(&self) -> usize {
        self.profiles.len()
    }

    fn find_profile(&self, company_number: &str) -> Option<&CompanyProfile> {
        self.profiles
            .iter()
            .find(|p| p.company_number == company_number)
    }

    /// Latest record for a SIC code among the given candidates, preferring
    /// dated periods (lexicographic period labels sort chronologically).
    fn latest_sector<'a, I>(candidates: I) -> Option<&'a SectorBenchmark>
    where
        I: Iterator<Item = &'a SectorBenchmark>,
    {
        candidates.max_by(|a, b| a.period.cmp(&b.period))
    }

    fn pick_sector(&self, sic_code: &str, region: Option<&str>) -> Option<&SectorBenchmark> {
        if let Some(r) = region {
            let hit = Self::latest_sector(
                self.sector_stats
                    .iter()
                    .filter(|s| s.sic_code == sic_code && s.region.as_deref() == Some(r)),
            );
            if hit.is_some() {
                return hit;
            }
        }
        let region_agnostic = Self::latest_sector(
            self.sector_stats
                .iter()
                .filter(|s| s.sic_code == sic_code && s.region.is_none()),
        );
        if region_agnostic.is_some() {
            return region_agnostic;
        }
        Self::latest_sector(self.sector_stats.iter().filter(|s| s.sic_code == sic_code))
    }

    fn pick_thresholds(&self, sic_code: &str, region: Option<&str>) -> Option<&ThresholdsRecord> {
        if let Some(r) = region {
            let hit = self
                .thresholds
                .iter()
                .find(|t| t.sic_code == sic_code && t.region.as_deref() == Some(r));
            if hit.is_some() {
                return hit;
            }
        }
        self.thresholds
            .iter()
            .find(|t| t.sic_code == sic_code && t.region.is_none())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemStore {
    async fn profile(&self, company_number: &str) -> Result<Option<CompanyProfile>> {
        Ok(self.find_profile(company_number).cloned())
    }

    async fn search_profiles(&self, name: &str, limit: usize) -> Result<Vec<CompanyProfile>> {
        let q = name.trim().to_lowercase();
        if q.is_empty() {
            return Ok(Vec::new());
        }
        let mut hits: Vec<(f64, &CompanyProfile)> = self
            .profiles
            .iter()
            .filter(|p| p.company_name.to_lowercase().contains(&q))
            .map(|p| (strsim::jaro_winkler(&q, &p.company_name.to_lowercase()), p))
            .collect();
        hits.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(hits.into_iter().take(limit).map(|(_, p)| p.clone()).collect())
    }

    async fn business_status(&self, company_number: &str) -> Result<Option<String>> {
        Ok(self.business_status.get(company_number).cloned())
    }

    async fn latest_accounts(&self, company_number: &str) -> Result<Option<FinancialSnapshot>> {
        Ok(self
            .accounts
            .get(company_number)
            .and_then(|v| v.first())
            .cloned())
    }

    async fn filings(&self, company_number: &str, page: Page) -> Result<Vec<Filing>> {
        let page = page.clamped();
        Ok(self
            .filings
            .get(company_number)
            .map(|v| v.iter().skip(page.offset()).take(page.size).cloned().collect())
            .unwrap_or_default())
    }

    async fn director_changes(
        &self,
        company_number: &str,
        page: Page,
    ) -> Result<Vec<DirectorChange>> {
        let page = page.clamped();
        Ok(self
            .director_changes
            .get(company_number)
            .map(|v| v.iter().skip(page.offset()).take(page.size).cloned().collect())
            .unwrap_or_default())
    }

    async fn ccjs(&self, company_number: &str) -> Result<Vec<CcjRecord>> {
        Ok(self.ccjs.get(company_number).cloned().unwrap_or_default())
    }

    async fn insolvency_notices(
        &self,
        company_number: &str,
        limit: usize,
    ) -> Result<Vec<InsolvencyNotice>> {
        Ok(self
            .insolvency
            .get(company_number)
            .map(|v| v.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn sector_stats(
        &self,
        sic_code: &str,
        region: Option<&str>,
    ) -> Result<Option<SectorBenchmark>> {
        Ok(self.pick_sector(sic_code, region).cloned())
    }

    async fn thresholds_record(
        &self,
        sic_code: &str,
        region: Option<&str>,
    ) -> Result<Option<ThresholdsRecord>> {
        Ok(self.pick_thresholds(sic_code, region).cloned())
    }

    async fn stored_score(&self, company_number: &str) -> Result<Option<StoredScore>> {
        Ok(self
            .scores
            .get(company_number)
            .and_then(|v| v.first())
            .cloned())
    }

    async fn profile_count(&self) -> Result<usize> {
        Ok(self.profiles.len())
    }
}

/// The built-in demo dataset: two companies, sector stats for SIC 62020, a
/// partial threshold override, and a stored score for the second company.
/// Some records deliberately use legacy shapes so the normalization path is
/// exercised end to end.
pub fn demo_seed() -> Value {
    json!({
        "profiles": [
            {
                "company_number": "00000006",
                "company_name": "SBRI Test Co Ltd",
                "sic_codes": ["62020"],
                "region": "London",
                "incorporation_date": "2016-04-18",
                "address": {
                    "address_line_1": "1 Tech Lane",
                    "address_line_2": "Farringdon",
                    "postal_code": "EC1A 1AA",
                    "country": "United Kingdom"
                }
            },
            {
                "company_number": "00000007",
                "company_name": "NEWCO TEST LTD"
            }
        ],
        "sbri_business_profiles": [
            { "company_number": "00000006", "status": "active" }
        ],
        "financial_accounts": [
            {
                "company_number": "00000006",
                "period_start": "2023-01-01",
                "period_end": "2023-12-31",
                "turnover": 1_350_000,
                "profit": 130_000
            },
            {
                "company_number": "00000006",
                "periodEnd": "2022-12-31",
                "revenue": 1_200_000,
                "net_profit": 90_000
            }
        ],
        "filings": [
            {
                "company_number": "00000006",
                "transaction_id": "t1",
                "filing_date": "2024-10-31",
                "category": "accounts",
                "description": "Total exemption full accounts made up to 2024-03-31"
            },
            {
                "company_number": "00000006",
                "transaction_id": "t2",
                "filing_date": "2024-06-10",
                "category": "confirmation-statement",
                "description": "Confirmation statement made on 2024-06-01"
            }
        ],
        "director_changes": [
            {
                "company_number": "00000006",
                "event_date": "2025-03-15",
                "change_type": "Appointed",
                "officer_name": "Alice Smith",
                "officer_role": "Director",
                "details": "Appointed as director",
                "source": "Seeder"
            },
            {
                "company_number": "00000006",
                "event_date": "2025-01-20",
                "change_type": "RoleChanged",
                "officer_name": "Carol White",
                "officer_role": "Company Secretary",
                "details": "Role changed to Company Secretary",
                "source": "Seeder"
            },
            {
                "company_number": "00000006",
                "date": "2025-07-02",
                "name": "Bob Jones",
                "position": "Director",
                "description": "Resigned from board"
            }
        ],
        "sector_stats": [
            {
                "sic_code": "62020",
                "region": "London",
                "period": "2024Q4",
                "avg_margin": 0.10,
                "failure_rate": 0.018,
                "sample_size": 1432
            },
            {
                "sic_code": "62020",
                "period": "2024Q3",
                "avg_margin": 0.09,
                "failure_rate": 0.025,
                "sample_size": 5210
            }
        ],
        "risk_thresholds": [
            { "sic_code": "62020", "region": "London", "high": 65 }
        ],
        "sbri_risk_scores": [
            {
                "company_number": "00000007",
                "score": 85,
                "reasons": ["Manual review: supplier insolvency"],
                "updated_at": "2025-06-01T09:30:00Z"
            },
            {
                "company_number": "00000007",
                "score": 40,
                "reasons": ["Initial assessment"],
                "updated_at": "2025-01-01T00:00:00Z"
            }
        ],
        "insolvency_notices": [
            {
                "company_number": "00000006",
                "notice_date": "2023-08-15",
                "notice_type": "Winding-up order (example)",
                "url": "https://www.thegazette.co.uk/"
            }
        ],
        "ccj_details": [
            {
                "company_number": "00000006",
                "judgment_date": "2023-06-12",
                "amount": 950,
                "court": "County Court Business Centre",
                "case_number": "TL123456",
                "status": "satisfied",
                "satisfied_date": "2023-08-01"
            }
        ]
    })
}
