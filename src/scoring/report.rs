use super::categories::{CategoryScore, CategoryScoreMap, MAX_TOTAL_SCORE};
use serde::Serialize;
use std::fmt::Write;

/// Totals at or above this are shown as healthy on the dashboard.
pub const HEALTHY_THRESHOLD: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Healthy,
    NeedsImprovement,
}

impl ScoreBand {
    pub fn for_total(total: f32) -> Self {
        if total >= HEALTHY_THRESHOLD {
            Self::Healthy
        } else {
            Self::NeedsImprovement
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Shareable plain-text summary of a breakdown and its total.
///
/// Lists each category once, in breakdown order, as `name: score / max`.
/// Numbers use their shortest exact decimal form, so the printed total reads
/// back as the value passed in.
pub fn build_report(scores: &CategoryScoreMap, total_score: f32) -> String {
    let mut report = String::new();
    report.push_str("\u{1F37D}\u{FE0F} NutriTrack Food Quality Report\n");
    report.push_str("===============================\n\n");

    for entry in scores.iter() {
        let _ = writeln!(report, "{}: {} / {}", entry.category, entry.score, entry.max);
    }

    let _ = writeln!(
        report,
        "\n\u{1F31F} Total Food Quality Score: {} / {}",
        total_score, MAX_TOTAL_SCORE
    );
    report.push_str(
        "\n\u{1F4D8} This report reflects your food intake breakdown based on your preferences.\n",
    );
    report.push_str("Keep striving for balanced nutrition! \u{1F4AA}");
    report
}

/// Serializable insights payload for machine-readable output.
#[derive(Debug, Clone, Serialize)]
pub struct InsightsView {
    pub categories: Vec<CategoryScore>,
    pub total_score: f32,
    pub max_total_score: f32,
    pub band: ScoreBand,
    pub band_label: &'static str,
}

impl InsightsView {
    pub fn new(scores: &CategoryScoreMap, total_score: f32) -> Self {
        let band = ScoreBand::for_total(total_score);
        Self {
            categories: scores.iter().cloned().collect(),
            total_score,
            max_total_score: MAX_TOTAL_SCORE,
            band,
            band_label: band.label(),
        }
    }
}
