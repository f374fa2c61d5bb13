// src/risk.rs
//! Risk verdict types: bounded score, categorical band, and the explanation
//! strings shown to users. The derivation itself lives in `engine`.

use serde::{Deserialize, Serialize};

use crate::model::ThresholdsRecord;

/// Global default cut-points used when no industry-specific record applies.
pub const DEFAULT_HIGH: f64 = 70.0;
pub const DEFAULT_MEDIUM: f64 = 40.0;

/// Categorical risk band. Boundary scores belong to the higher band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Human-readable band label used as the final explanation line.
    pub fn band_label(&self) -> &'static str {
        match self {
            RiskLevel::High => "High risk band",
            RiskLevel::Medium => "Medium risk band",
            RiskLevel::Low => "Low risk band",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete scoring outcome for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// Integer score in [0, 100]; higher means riskier.
    pub score: u8,
    pub level: RiskLevel,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Score cut-points on the 0-100 scale. Both are inclusive lower bounds:
/// `score >= high` classifies as high, `score >= medium` as medium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: DEFAULT_HIGH,
            medium: DEFAULT_MEDIUM,
        }
    }
}

impl Thresholds {
    /// Apply a per-industry override record on top of these cut-points.
    /// Each field falls back independently: a record carrying only `high`
    /// keeps the base `medium`, and vice versa.
    pub fn overridden_by(mut self, record: Option<&ThresholdsRecord>) -> Self {
        if let Some(r) = record {
            if let Some(h) = r.high {
                self.high = h;
            }
            if let Some(m) = r.medium {
                self.medium = m;
            }
        }
        self
    }
}
