// src/store/mod.rs
//! Document-store collaborator: the read API resolves every lookup through
//! the `DocumentStore` trait, keyed by company number, SIC code, and region.
//! `MemStore` is the JSON-seeded in-memory implementation used by the demo.

pub mod memory;
pub mod normalize;

pub use memory::MemStore;

use anyhow::Result;

use crate::model::{
    CcjRecord, CompanyProfile, DirectorChange, Filing, FinancialSnapshot, InsolvencyNotice,
    SectorBenchmark, StoredScore, ThresholdsRecord,
};

/// Paging window for list endpoints. `page` is 1-based; `size` caps at 100.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct Page {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_size")]
    pub size: usize,
}

fn default_page() -> usize {
    1
}

fn default_size() -> usize {
    25
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

impl Page {
    /// Clamp to valid bounds: page at least 1, size in 1..=100.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            size: self.size.clamp(1, 100),
        }
    }

    /// Number of items to skip. Call on an already-clamped page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.size)
    }
}

/// Read-side lookups the HTTP layer depends on. Implementations may fail
/// (unreachable backend); the scoring engine itself never does.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn profile(&self, company_number: &str) -> Result<Option<CompanyProfile>>;

    /// Case-insensitive substring search over company names, best match first.
    async fn search_profiles(&self, name: &str, limit: usize) -> Result<Vec<CompanyProfile>>;

    /// Raw business status from the business-profiles collection, if any.
    async fn business_status(&self, company_number: &str) -> Result<Option<String>>;

    /// Accounts for the most recent reporting period.
    async fn latest_accounts(&self, company_number: &str) -> Result<Option<FinancialSnapshot>>;

    async fn filings(&self, company_number: &str, page: Page) -> Result<Vec<Filing>>;

    async fn director_changes(&self, company_number: &str, page: Page)
        -> Result<Vec<DirectorChange>>;

    async fn ccjs(&self, company_number: &str) -> Result<Vec<CcjRecord>>;

    async fn insolvency_notices(
        &self,
        company_number: &str,
        limit: usize,
    ) -> Result<Vec<InsolvencyNotice>>;

    /// Benchmark for a SIC code. A region-specific record wins over a
    /// region-agnostic one for the same code.
    async fn sector_stats(
        &self,
        sic_code: &str,
        region: Option<&str>,
    ) -> Result<Option<SectorBenchmark>>;

    /// Threshold override record for a SIC code, same region precedence.
    async fn thresholds_record(
        &self,
        sic_code: &str,
        region: Option<&str>,
    ) -> Result<Option<ThresholdsRecord>>;

    /// Most recently updated stored score for a company, if any.
    async fn stored_score(&self, company_number: &str) -> Result<Option<StoredScore>>;

    async fn profile_count(&self) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_clamps_to_valid_bounds() {
        let p = Page { page: 0, size: 500 }.clamped();
        assert_eq!(p.page, 1);
        assert_eq!(p.size, 100);
        assert_eq!(p.offset(), 0);

        let p = Page { page: 3, size: 25 }.clamped();
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn page_defaults_from_empty_query() {
        let p: Page = serde_json::from_str("{}").unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.size, 25);
    }
}
