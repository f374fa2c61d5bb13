//! # Risk Scoring Engine
//! Pure, testable logic that maps `(snapshot, benchmark, thresholds)` →
//! `RiskResult`. No I/O; every lookup happens in the calling layer, which
//! hands over already-resolved inputs.
//!
//! Policy: blended penalty score in [0, 100] (higher = riskier). Margin at or
//! above 15% is penalty-free; margin at or below zero is maximum penalty;
//! linear in between. The sector failure rate contributes a second, smaller
//! penalty. A stored score record skips the computation entirely.

use crate::model::{FinancialSnapshot, SectorBenchmark, StoredScore};
use crate::risk::{RiskLevel, RiskResult, Thresholds};

/// Margin at or above this level carries no penalty.
const MARGIN_FLOOR: f64 = 0.15;
/// Blend weights: margin dominates, sector failure is secondary.
const MARGIN_WEIGHT: f64 = 0.65;
const FAILURE_WEIGHT: f64 = 0.35;

/// Intermediate derivation, kept for explainability and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Integer score in [0, 100].
    pub score: u8,
    /// Profit margin actually used (0 when turnover is not positive).
    pub margin: f64,
    /// Penalty in [0, 1] from the margin rule.
    pub margin_penalty: f64,
    /// Penalty in [0, 1] from the normalized sector failure rate.
    pub failure_penalty: f64,
}

/// Coerce NaN/±inf to the neutral 0.0; the engine never faults on bad input.
fn num(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Compute the blended risk score for one company.
///
/// A missing benchmark behaves as a zero failure rate. Failure rates above 1
/// are treated as percentage-style values and divided by 100 before clamping.
pub fn compute_score(
    snapshot: &FinancialSnapshot,
    benchmark: Option<&SectorBenchmark>,
) -> ScoreBreakdown {
    let turnover = num(snapshot.turnover);
    let profit = num(snapshot.profit);
    let margin = if turnover > 0.0 { profit / turnover } else { 0.0 };

    let fail_raw = num(benchmark.map(|b| b.failure_rate).unwrap_or(0.0));
    let fail_rate = if fail_raw > 1.0 {
        fail_raw / 100.0
    } else {
        fail_raw
    };

    let margin_penalty = if margin >= MARGIN_FLOOR {
        0.0
    } else if margin <= 0.0 {
        1.0
    } else {
        (MARGIN_FLOOR - margin) / MARGIN_FLOOR
    };
    let failure_penalty = fail_rate.clamp(0.0, 1.0);

    let score_float = 100.0 * (MARGIN_WEIGHT * margin_penalty + FAILURE_WEIGHT * failure_penalty);
    // The weighted sum cannot leave [0, 100] for penalties in [0, 1]; clamp anyway.
    let score = score_float.clamp(0.0, 100.0).round() as u8;

    ScoreBreakdown {
        score,
        margin,
        margin_penalty,
        failure_penalty,
    }
}

/// Classify a score into a band. Thresholds are inclusive lower bounds, so a
/// score equal to a cut-point lands in the higher band.
pub fn classify(score: u8, thresholds: &Thresholds) -> RiskLevel {
    let s = f64::from(score);
    if s >= thresholds.high {
        RiskLevel::High
    } else if s >= thresholds.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Exactly three explanation lines, in order: margin, normalized sector
/// failure (the clamped penalty, not the raw benchmark value), band label.
pub fn explain(margin: f64, failure_penalty: f64, level: RiskLevel) -> Vec<String> {
    vec![
        format!("Gross margin ~ {:.1}%", margin * 100.0),
        format!("Sector failure ~ {:.1}%", failure_penalty * 100.0),
        level.band_label().to_string(),
    ]
}

/// Per-request inputs, already resolved by the calling layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringInputs<'a> {
    pub snapshot: Option<&'a FinancialSnapshot>,
    pub benchmark: Option<&'a SectorBenchmark>,
    pub thresholds: Thresholds,
    pub stored: Option<&'a StoredScore>,
}

/// Full assessment used by the scored endpoint.
///
/// A stored score record always wins: its score (clamped to an integer in
/// [0, 100]) and reasons pass through unchanged and only the band is
/// recomputed against the current thresholds. There is no invalidation; the
/// caller owns freshness.
pub fn assess(inputs: &ScoringInputs<'_>) -> RiskResult {
    if let Some(stored) = inputs.stored {
        let score = num(stored.score).clamp(0.0, 100.0).round() as u8;
        return RiskResult {
            score,
            level: classify(score, &inputs.thresholds),
            reasons: stored.reasons.clone(),
        };
    }

    let empty = FinancialSnapshot::default();
    let snapshot = inputs.snapshot.unwrap_or(&empty);
    let b = compute_score(snapshot, inputs.benchmark);
    let level = classify(b.score, &inputs.thresholds);
    RiskResult {
        score: b.score,
        level,
        reasons: explain(b.margin, b.failure_penalty, level),
    }
}
