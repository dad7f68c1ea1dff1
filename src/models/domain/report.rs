use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::domain::round::RoundKind;

pub const POINTS_PER_ROUND: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl PerformanceTier {
    /// Excellent at 80% or more, Good at 60% or more. Compared in integers so
    /// exactly 80% never drops to Good.
    pub fn from_points(total: u32, max: u32) -> Self {
        if max == 0 {
            return PerformanceTier::NeedsImprovement;
        }
        if total * 100 >= 80 * max {
            PerformanceTier::Excellent
        } else if total * 100 >= 60 * max {
            PerformanceTier::Good
        } else {
            PerformanceTier::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::Good => "Good",
            PerformanceTier::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Outstanding Performance!",
            PerformanceTier::Good => "Good Performance!",
            PerformanceTier::NeedsImprovement => "Keep Practicing!",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundBreakdown {
    pub round: RoundKind,
    pub label: String,
    pub score: u8,
    pub max_score: u8,
    pub percentage: f64,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StudyPlan {
    pub daily_practice: String,
    pub weekly_schedule: String,
    pub key_focus: String,
    pub practice_tests: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinalReport {
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub performance_tier: PerformanceTier,
    pub headline: String,
    pub scores_by_round: BTreeMap<RoundKind, u8>,
    pub average_score: f64,
    pub score_std_dev: f64,
    pub strengths: Vec<RoundKind>,
    pub improvements: Vec<RoundKind>,
    pub breakdown: Vec<RoundBreakdown>,
    pub feedback: Vec<String>,
    pub tips: BTreeMap<RoundKind, String>,
    pub study_plan: StudyPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_eighty_percent_is_excellent() {
        assert_eq!(PerformanceTier::from_points(12, 15), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::from_points(11, 15), PerformanceTier::Good);
    }

    #[test]
    fn exactly_sixty_percent_is_good() {
        assert_eq!(PerformanceTier::from_points(9, 15), PerformanceTier::Good);
        assert_eq!(
            PerformanceTier::from_points(8, 15),
            PerformanceTier::NeedsImprovement
        );
    }

    #[test]
    fn tier_serializes_with_display_label() {
        let json = serde_json::to_string(&PerformanceTier::NeedsImprovement)
            .expect("tier should serialize");
        assert_eq!(json, "\"Needs Improvement\"");
    }
}
