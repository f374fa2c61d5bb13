// src/store/normalize.rs
//! Schema-drift adapter: maps the several legacy document shapes that occur
//! in seed data onto the canonical model. Every field-name fallback lives
//! here, at the load boundary; the engine and the handlers never branch on
//! variants.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::model::{
    Address, CcjRecord, CompanyProfile, DirectorChange, Filing, FinancialSnapshot,
    InsolvencyNotice, SectorBenchmark, StoredScore, ThresholdsRecord,
};

static RESIGN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)resign").expect("resign regex"));
static APPOINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)appoint").expect("appoint regex"));

/// Event-date candidates for director changes, in precedence order.
const EVENT_DATE_FIELDS: &[&str] = &[
    "effective_date",
    "event_date",
    "change_date",
    "date",
    "appointed_on",
    "appointment_date",
    "resigned_on",
    "resignation_date",
    "notified_on",
    "updated_at",
    "created_at",
];

/// First non-empty string among the named fields.
pub(crate) fn str_field(doc: &Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|n| {
        doc.get(*n)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// First numeric value among the named fields. Accepts JSON numbers and
/// numeric strings; anything else counts as absent.
pub(crate) fn num_field(doc: &Value, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|n| match doc.get(*n) {
        Some(Value::Number(x)) => x.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// First parseable date among the named fields. Accepts `YYYY-MM-DD`,
/// RFC 3339 timestamps, and bare years (number or string).
pub(crate) fn date_field(doc: &Value, names: &[&str]) -> Option<NaiveDate> {
    names.iter().find_map(|n| match doc.get(*n) {
        Some(Value::String(s)) => parse_date(s),
        Some(Value::Number(x)) => x.as_i64().and_then(year_start),
        _ => None,
    })
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let t = s.trim();
    if let Ok(d) = t.parse::<NaiveDate>() {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.date_naive());
    }
    t.parse::<i64>().ok().and_then(year_start)
}

fn year_start(year: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)
}

fn datetime_field(doc: &Value, names: &[&str]) -> Option<DateTime<chrono::Utc>> {
    str_field(doc, names).and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.to_utc())
            .ok()
            .or_else(|| {
                parse_date(&s)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc())
            })
    })
}

/// Company number under any of its historical spellings.
pub(crate) fn company_number(doc: &Value) -> Option<String> {
    str_field(doc, &["company_number", "companyNumber", "company_no"])
}

/// "active" -> "Active": first letter up, rest down. Empty input yields None.
pub fn capitalize_status(s: &str) -> Option<String> {
    let t = s.trim();
    let mut chars = t.chars();
    let first = chars.next()?;
    Some(format!(
        "{}{}",
        first.to_uppercase(),
        chars.as_str().to_lowercase()
    ))
}

/// Uppercase the first alphabetic character of each word, leaving the rest
/// untouched ("role changed" -> "Role Changed", "RoleChanged" unchanged).
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => format!("{}{}", c.to_uppercase(), chars.as_str()),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// SIC codes from a `sic_codes` array or a scalar `sic_code`/`sic` field.
fn sic_codes(doc: &Value) -> Vec<String> {
    if let Some(arr) = doc.get("sic_codes").and_then(Value::as_array) {
        let codes: Vec<String> = arr
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();
        if !codes.is_empty() {
            return codes;
        }
    }
    str_field(doc, &["sic_code", "sic"])
        .map(|c| vec![c])
        .unwrap_or_default()
}

pub fn normalize_profile(doc: &Value) -> Option<CompanyProfile> {
    let number = company_number(doc)?;
    let address = doc
        .get("address")
        .cloned()
        .and_then(|v| serde_json::from_value::<Address>(v).ok());
    Some(CompanyProfile {
        company_number: number,
        company_name: str_field(doc, &["company_name", "companyName", "name"])
            .unwrap_or_default(),
        status: str_field(doc, &["status"]),
        sic_codes: sic_codes(doc),
        region: str_field(doc, &["region", "registered_office_region"]),
        incorporation_date: date_field(doc, &["incorporation_date", "date_of_creation"]),
        address,
        latest_accounts: doc.get("latest_accounts").map(normalize_accounts),
    })
}

/// Accounts figures under any legacy naming; non-numeric values coerce to 0.
pub fn normalize_accounts(doc: &Value) -> FinancialSnapshot {
    FinancialSnapshot {
        period_start: date_field(doc, &["period_start", "periodStart"]),
        period_end: date_field(doc, &["period_end", "periodEnd", "made_up_to", "year"]),
        turnover: num_field(doc, &["turnover", "revenue", "sales"]).unwrap_or(0.0),
        profit: num_field(doc, &["profit", "net_profit", "profit_loss"]).unwrap_or(0.0),
    }
}

pub fn normalize_filing(doc: &Value) -> Filing {
    Filing {
        transaction_id: str_field(doc, &["transaction_id", "transactionId"]),
        filing_date: date_field(doc, &["filing_date", "date"]),
        category: str_field(doc, &["category", "type"]),
        description: str_field(doc, &["description", "details"]),
    }
}

/// Director/officer change events under their many historical shapes.
///
/// The event date coalesces over every known date field; the change type is
/// taken verbatim when explicit, otherwise inferred from resign/appoint
/// keywords anywhere in the document.
pub fn normalize_director_change(doc: &Value) -> DirectorChange {
    let explicit = str_field(doc, &["change_type", "type", "action"]);
    let change_type = explicit
        .or_else(|| {
            let blob = doc.to_string();
            if doc.get("resigned_on").is_some() || RESIGN_RE.is_match(&blob) {
                Some("Resigned".to_string())
            } else if doc.get("appointed_on").is_some() || APPOINT_RE.is_match(&blob) {
                Some("Appointed".to_string())
            } else {
                None
            }
        })
        .map(|t| title_case(&t));

    let officer = doc.get("officer");
    let officer_name = str_field(doc, &["officer_name", "name", "person_name"])
        .or_else(|| officer.and_then(|o| str_field(o, &["name", "person_name"])));
    let details = str_field(doc, &["details", "description", "text"])
        .or_else(|| officer.and_then(|o| str_field(o, &["details", "description"])));

    DirectorChange {
        event_date: date_field(doc, EVENT_DATE_FIELDS),
        change_type,
        officer_name,
        officer_role: str_field(doc, &["role", "officer_role", "position"]),
        details,
        source: str_field(doc, &["source"]),
    }
}

pub fn normalize_sector_stats(doc: &Value) -> Option<SectorBenchmark> {
    let sic_code = str_field(doc, &["sic_code", "sic", "code"])?;
    Some(SectorBenchmark {
        sic_code,
        region: str_field(doc, &["region"]),
        period: str_field(doc, &["period"]),
        avg_margin: num_field(doc, &["avg_margin", "average_margin"]),
        failure_rate: num_field(doc, &["failure_rate", "fail_rate"]).unwrap_or(0.0),
        sample_size: num_field(doc, &["sample_size"]).map(|n| n.max(0.0) as u64),
    })
}

pub fn normalize_thresholds_record(doc: &Value) -> Option<ThresholdsRecord> {
    let sic_code = str_field(doc, &["sic_code", "sic", "code"])?;
    Some(ThresholdsRecord {
        sic_code,
        region: str_field(doc, &["region"]),
        high: num_field(doc, &["high"]),
        medium: num_field(doc, &["medium"]),
    })
}

pub fn normalize_stored_score(doc: &Value) -> Option<StoredScore> {
    let number = company_number(doc)?;
    let reasons = doc
        .get("reasons")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Some(StoredScore {
        company_number: number,
        score: num_field(doc, &["score"]).unwrap_or(0.0),
        reasons,
        updated_at: datetime_field(doc, &["updated_at", "updatedAt", "created_at"]),
    })
}

pub fn normalize_insolvency(doc: &Value) -> InsolvencyNotice {
    InsolvencyNotice {
        notice_date: date_field(doc, &["notice_date", "date"]),
        notice_type: str_field(doc, &["notice_type", "type"]),
        url: str_field(doc, &["url", "link"]),
    }
}

pub fn normalize_ccj(doc: &Value) -> CcjRecord {
    CcjRecord {
        judgment_date: date_field(doc, &["judgment_date", "date"]),
        amount: num_field(doc, &["amount", "value"]),
        court: str_field(doc, &["court"]),
        case_number: str_field(doc, &["case_number", "caseNumber"]),
        status: str_field(doc, &["status"]),
        satisfied_date: date_field(doc, &["satisfied_date"]),
    }
}
