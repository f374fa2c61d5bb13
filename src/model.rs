// src/model.rs
//! Canonical domain documents served by the read API.
//!
//! Every type here is produced by the normalization adapter in
//! `store::normalize`; handlers and the scoring engine never see the legacy
//! field-name variants that occur in seed data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Company profile as returned by the profile endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_number: String,
    #[serde(default)]
    pub company_name: String,
    /// Business status ("Active", "Dissolved", ...). Injected from the
    /// business-profiles collection when the profile has none of its own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Industry classifiers; the first entry is the primary code used for
    /// sector and threshold lookups.
    #[serde(default)]
    pub sic_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incorporation_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_accounts: Option<FinancialSnapshot>,
}

impl CompanyProfile {
    /// Primary industry classification code, if any.
    pub fn primary_sic(&self) -> Option<&str> {
        self.sic_codes.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line_1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Most recent reporting-period figures for a company.
/// Missing or non-numeric turnover/profit arrive here already coerced to 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub turnover: f64,
    #[serde(default)]
    pub profit: f64,
}

/// Aggregate sector statistics keyed by SIC code and (optionally) region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorBenchmark {
    pub sic_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Reporting period label, e.g. "2024Q4". Lexicographically sortable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_margin: Option<f64>,
    /// Historical failure rate; may be a fraction (0-1) or a percentage
    /// (0-100). The engine normalizes, not this type.
    #[serde(default)]
    pub failure_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u64>,
}

/// Per-industry threshold override record. Either cut-point may be absent;
/// resolution falls back to the global default field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsRecord {
    pub sic_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<f64>,
}

/// Previously persisted score for a company. When present, the stored
/// score/reasons win over a fresh computation; most recently updated first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScore {
    pub company_number: String,
    pub score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filing_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Normalized director/officer change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    /// "Appointed", "Resigned", "RoleChanged", ... Inferred when the source
    /// document carries no explicit type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub officer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub officer_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsolvencyNotice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// County Court Judgment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CcjRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judgment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satisfied_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_sic_is_first_code() {
        let p = CompanyProfile {
            company_number: "00000006".into(),
            company_name: "EXAMPLE LTD".into(),
            status: None,
            sic_codes: vec!["62020".into(), "70229".into()],
            region: Some("London".into()),
            incorporation_date: None,
            address: None,
            latest_accounts: None,
        };
        assert_eq!(p.primary_sic(), Some("62020"));
    }

    #[test]
    fn profile_omits_absent_optionals_in_json() {
        let p = CompanyProfile {
            company_number: "00000007".into(),
            company_name: "NEWCO TEST LTD".into(),
            status: None,
            sic_codes: vec![],
            region: None,
            incorporation_date: None,
            address: None,
            latest_accounts: None,
        };
        let v = serde_json::to_value(&p).unwrap();
        assert!(v.get("status").is_none());
        assert!(v.get("latest_accounts").is_none());
        assert_eq!(v["company_number"], serde_json::json!("00000007"));
    }

    #[test]
    fn snapshot_defaults_to_zero_figures() {
        let s: FinancialSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(s.turnover, 0.0);
        assert_eq!(s.profit, 0.0);
        assert!(s.period_end.is_none());
    }
}
