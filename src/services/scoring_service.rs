use std::collections::BTreeMap;

use crate::errors::{AppError, AppResult};
use crate::models::domain::question::{Question, NOT_ANSWERED};
use crate::models::domain::report::{
    FinalReport, PerformanceTier, RoundBreakdown, StudyPlan, POINTS_PER_ROUND,
};
use crate::models::domain::round::{QuestionOutcome, RoundKind, RoundResult};

pub struct ScoringService;

impl ScoringService {
    /// Grades one answer. An unanswered question is always wrong.
    pub fn is_correct(question: &Question, submitted: Option<&str>) -> bool {
        let Some(submitted) = submitted else {
            return false;
        };

        match question {
            Question::MultipleChoice(q) => submitted == q.correct,
            Question::FillBlank(q) => {
                submitted.trim().to_lowercase() == q.correct_answer.trim().to_lowercase()
            }
            Question::TrueFalseNotGiven(q) => submitted == q.correct_answer.label(),
        }
    }

    /// Grades a whole round. Missing trailing answers count as not answered.
    pub fn grade_round(
        kind: RoundKind,
        questions: &[Question],
        answers: &[Option<String>],
        timed_out: bool,
    ) -> RoundResult {
        let mut raw_correct = 0;
        let mut outcomes = Vec::with_capacity(questions.len());

        for (index, question) in questions.iter().enumerate() {
            let submitted = answers.get(index).and_then(|a| a.as_deref());
            let is_correct = Self::is_correct(question, submitted);
            if is_correct {
                raw_correct += 1;
            }

            outcomes.push(QuestionOutcome {
                number: index + 1,
                prompt: question.prompt().to_string(),
                submitted: submitted
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(NOT_ANSWERED)
                    .to_string(),
                correct_answer: question.correct_answer().to_string(),
                is_correct,
                explanation: question.explanation().map(str::to_string),
            });
        }

        let question_count = questions.len();
        let accuracy_percentage = if question_count == 0 {
            0.0
        } else {
            raw_correct as f64 * 100.0 / question_count as f64
        };

        RoundResult {
            round: kind,
            raw_correct,
            question_count,
            normalized_score: Self::normalize(kind, raw_correct, question_count),
            accuracy_percentage,
            timed_out,
            questions: outcomes,
        }
    }

    /// `round(raw / total * 5)` with halves rounded up, clamped to 0..=5.
    /// Integer arithmetic keeps 2.5 and 3.5 exact.
    pub fn normalize_aptitude(raw_correct: usize, total: usize) -> u8 {
        if total == 0 {
            return 0;
        }
        let raw = raw_correct.min(total);
        let points = POINTS_PER_ROUND as usize;
        let scaled = (2 * raw * points + total) / (2 * total);
        scaled.min(points) as u8
    }

    pub fn normalize(kind: RoundKind, raw_correct: usize, question_count: usize) -> u8 {
        match kind {
            RoundKind::Aptitude => Self::normalize_aptitude(raw_correct, question_count),
            RoundKind::Listening | RoundKind::Reading => {
                raw_correct.min(POINTS_PER_ROUND as usize) as u8
            }
        }
    }

    /// Builds the final report. Every round must have a score in 0..=5.
    pub fn aggregate(
        scores: &BTreeMap<RoundKind, u8>,
        duration_seconds: Option<i64>,
    ) -> AppResult<FinalReport> {
        let mut values = Vec::with_capacity(RoundKind::ORDER.len());
        for kind in RoundKind::ORDER {
            let score = scores.get(&kind).copied().ok_or_else(|| {
                AppError::ScoreError(format!("Missing score for the {} round", kind))
            })?;
            if score > POINTS_PER_ROUND {
                return Err(AppError::ScoreError(format!(
                    "Score {} for the {} round is outside 0..={}",
                    score, kind, POINTS_PER_ROUND
                )));
            }
            values.push((kind, score));
        }

        let count = values.len() as u32;
        let total: u32 = values.iter().map(|(_, s)| *s as u32).sum();
        let max_score = count * POINTS_PER_ROUND as u32;
        let percentage = total as f64 * 100.0 / max_score as f64;
        let tier = PerformanceTier::from_points(total, max_score);

        let average_score = total as f64 / count as f64;
        let score_std_dev = sample_std_dev(&values, average_score);

        // Compared as score * n against the sum so ties are exact.
        let strengths: Vec<RoundKind> = values
            .iter()
            .filter(|(_, s)| *s as u32 * count > total)
            .map(|(k, _)| *k)
            .collect();
        let improvements: Vec<RoundKind> = values
            .iter()
            .filter(|(_, s)| (*s as u32 * count) < total)
            .map(|(k, _)| *k)
            .collect();

        let breakdown = values
            .iter()
            .map(|(kind, score)| RoundBreakdown {
                round: *kind,
                label: kind.label().to_string(),
                score: *score,
                max_score: POINTS_PER_ROUND,
                percentage: *score as f64 * 100.0 / POINTS_PER_ROUND as f64,
                message: round_message(*score).to_string(),
            })
            .collect();

        let tips = values
            .iter()
            .map(|(kind, score)| (*kind, tip_for(*kind, *score).to_string()))
            .collect();

        let feedback = Self::feedback(tier, score_std_dev, &strengths, &improvements);

        log::debug!(
            "Aggregated report: {}/{} ({:.1}%) {}",
            total,
            max_score,
            percentage,
            tier.label()
        );

        Ok(FinalReport {
            total_score: total,
            max_score,
            percentage,
            performance_tier: tier,
            headline: tier.headline().to_string(),
            scores_by_round: values.iter().copied().collect(),
            average_score,
            score_std_dev,
            strengths,
            improvements,
            breakdown,
            feedback,
            tips,
            study_plan: study_plan_for(tier),
            duration_seconds,
        })
    }

    pub fn feedback(
        tier: PerformanceTier,
        std_dev: f64,
        strengths: &[RoundKind],
        improvements: &[RoundKind],
    ) -> Vec<String> {
        let mut feedback = vec![match tier {
            PerformanceTier::Excellent => "Outstanding performance across all sections!",
            PerformanceTier::Good => "Good overall performance with room for improvement.",
            PerformanceTier::NeedsImprovement => {
                "Additional practice recommended to improve scores."
            }
        }
        .to_string()];

        if std_dev < 1.0 {
            feedback.push("Very consistent performance across all sections.".to_string());
        } else if std_dev > 2.0 {
            feedback.push("Performance varies significantly between sections.".to_string());
        }

        if !strengths.is_empty() {
            feedback.push(format!("Strong performance in: {}", join_labels(strengths)));
        }
        if !improvements.is_empty() {
            feedback.push(format!("Focus on improving: {}", join_labels(improvements)));
        }

        feedback
    }
}

fn sample_std_dev(values: &[(RoundKind, u8)], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values
        .iter()
        .map(|(_, s)| (*s as f64 - mean).powi(2))
        .sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

fn join_labels(kinds: &[RoundKind]) -> String {
    kinds
        .iter()
        .map(|k| k.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn round_message(score: u8) -> &'static str {
    if score >= 4 {
        "Excellent performance! You've demonstrated strong mastery in this area."
    } else if score >= 3 {
        "Good work! Some room for improvement but generally solid performance."
    } else {
        "This area needs more focus and practice to improve your skills."
    }
}

fn tip_for(kind: RoundKind, score: u8) -> &'static str {
    match (kind, score) {
        (RoundKind::Aptitude, 0..=2) => {
            "Focus on basic arithmetic and algebra. Practice 30 minutes daily with mental math exercises."
        }
        (RoundKind::Aptitude, 3) => {
            "Good foundation! Work on complex problem-solving and time management during calculations."
        }
        (RoundKind::Aptitude, _) => {
            "Excellent aptitude skills! Maintain your edge with advanced problem-solving practice."
        }
        (RoundKind::Listening, 0..=2) => {
            "Start with slow-paced English content. Use subtitles initially, then gradually remove them."
        }
        (RoundKind::Listening, 3) => {
            "Practice with varied accents and faster speech. Try news broadcasts and podcasts."
        }
        (RoundKind::Listening, _) => {
            "Outstanding listening skills! Challenge yourself with technical content and rapid speech."
        }
        (RoundKind::Reading, 0..=2) => {
            "Build vocabulary with graded readers. Focus on comprehension over speed initially."
        }
        (RoundKind::Reading, 3) => {
            "Expand to complex texts. Practice skimming and scanning techniques for efficiency."
        }
        (RoundKind::Reading, _) => {
            "Excellent reading ability! Tackle academic papers and technical documents to stay sharp."
        }
    }
}

fn study_plan_for(tier: PerformanceTier) -> StudyPlan {
    let (daily, weekly, focus, tests) = match tier {
        PerformanceTier::Excellent => (
            "45-60 minutes maintenance study",
            "3-4 days focused practice",
            "Advanced topics and maintaining current level",
            "One full test every 2 weeks",
        ),
        PerformanceTier::Good => (
            "1-1.5 hours structured study",
            "5 days consistent practice",
            "Strengthen weak areas while maintaining strong sections",
            "One full mock test weekly",
        ),
        PerformanceTier::NeedsImprovement => (
            "2-2.5 hours intensive study",
            "6 days focused practice with one rest day",
            "Foundation building in all areas with extra attention to weakest sections",
            "Two practice sessions weekly plus one full test",
        ),
    };

    StudyPlan {
        daily_practice: daily.to_string(),
        weekly_schedule: weekly.to_string(),
        key_focus: focus.to_string(),
        practice_tests: tests.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::question::TfngAnswer;
    use crate::test_utils::fixtures::{fill_blank, mcq, tfng};

    fn fill(answer: &str) -> Question {
        fill_blank("Sleep affects __________.", answer)
    }

    fn scores(a: u8, l: u8, r: u8) -> BTreeMap<RoundKind, u8> {
        BTreeMap::from([
            (RoundKind::Aptitude, a),
            (RoundKind::Listening, l),
            (RoundKind::Reading, r),
        ])
    }

    #[test]
    fn multiple_choice_needs_exact_option() {
        assert!(ScoringService::is_correct(&mcq("Pick one", "B"), Some("B")));
        assert!(!ScoringService::is_correct(&mcq("Pick one", "B"), Some("b")));
        assert!(!ScoringService::is_correct(&mcq("Pick one", "B"), None));
    }

    #[test]
    fn fill_blank_ignores_case_and_surrounding_whitespace() {
        assert!(ScoringService::is_correct(&fill("Hormones"), Some("  hormones ")));
        assert!(!ScoringService::is_correct(&fill("hormones"), Some("hormone")));
        assert!(!ScoringService::is_correct(&fill("hormones"), None));
    }

    #[test]
    fn tfng_is_case_sensitive() {
        let q = tfng("Adults need 7-9 hours.", TfngAnswer::NotGiven);
        assert!(ScoringService::is_correct(&q, Some("Not Given")));
        assert!(!ScoringService::is_correct(&q, Some("not given")));
    }

    #[test]
    fn aptitude_half_points_round_up() {
        // 10/20 * 5 = 2.5 and 14/20 * 5 = 3.5
        assert_eq!(ScoringService::normalize_aptitude(10, 20), 3);
        assert_eq!(ScoringService::normalize_aptitude(14, 20), 4);
        assert_eq!(ScoringService::normalize_aptitude(9, 20), 2);
        assert_eq!(ScoringService::normalize_aptitude(11, 20), 3);
    }

    #[test]
    fn aptitude_normalization_stays_in_range() {
        for total in 1..=25 {
            for raw in 0..=total {
                let score = ScoringService::normalize_aptitude(raw, total);
                assert!(score <= 5, "{}/{} gave {}", raw, total, score);
            }
            assert_eq!(ScoringService::normalize_aptitude(0, total), 0);
            assert_eq!(ScoringService::normalize_aptitude(total, total), 5);
        }
        assert_eq!(ScoringService::normalize_aptitude(0, 0), 0);
        assert_eq!(ScoringService::normalize_aptitude(30, 20), 5);
    }

    #[test]
    fn batch_rounds_score_one_point_per_answer() {
        assert_eq!(ScoringService::normalize(RoundKind::Listening, 3, 5), 3);
        assert_eq!(ScoringService::normalize(RoundKind::Reading, 5, 5), 5);
    }

    #[test]
    fn grade_round_marks_missing_answers_not_answered() {
        let questions = vec![
            fill("heart"),
            tfng("The heart has four chambers.", TfngAnswer::True),
            mcq("Pick one", "A"),
        ];
        let answers = vec![Some("Heart".to_string())];

        let result = ScoringService::grade_round(RoundKind::Reading, &questions, &answers, true);

        assert_eq!(result.raw_correct, 1);
        assert_eq!(result.question_count, 3);
        assert!(result.timed_out);
        assert_eq!(result.questions[1].submitted, NOT_ANSWERED);
        assert!(!result.questions[2].is_correct);
        assert_eq!(result.questions[2].explanation.as_deref(), Some("The answer is A"));
    }

    #[test]
    fn aggregate_full_traversal_scores() {
        let report = ScoringService::aggregate(&scores(4, 3, 5), Some(300)).unwrap();

        assert_eq!(report.total_score, 12);
        assert_eq!(report.max_score, 15);
        assert_eq!(report.percentage, 80.0);
        assert_eq!(report.performance_tier, PerformanceTier::Excellent);
        assert_eq!(report.strengths, vec![RoundKind::Reading]);
        assert_eq!(report.improvements, vec![RoundKind::Listening]);
        assert_eq!(report.duration_seconds, Some(300));
        assert_eq!(report.breakdown.len(), 3);
    }

    #[test]
    fn aggregate_ties_belong_to_neither_list() {
        let report = ScoringService::aggregate(&scores(3, 3, 3), None).unwrap();

        assert!(report.strengths.is_empty());
        assert!(report.improvements.is_empty());
        assert_eq!(report.score_std_dev, 0.0);
        assert!(report
            .feedback
            .contains(&"Very consistent performance across all sections.".to_string()));
    }

    #[test]
    fn aggregate_flags_uneven_sections() {
        let report = ScoringService::aggregate(&scores(5, 0, 1), None).unwrap();

        assert!(report.score_std_dev > 2.0);
        assert_eq!(report.performance_tier, PerformanceTier::NeedsImprovement);
        assert!(report
            .feedback
            .contains(&"Performance varies significantly between sections.".to_string()));
        assert!(report
            .feedback
            .contains(&"Strong performance in: Aptitude".to_string()));
    }

    #[test]
    fn aggregate_rejects_missing_round() {
        let mut partial = scores(4, 3, 5);
        partial.remove(&RoundKind::Reading);

        let err = ScoringService::aggregate(&partial, None).unwrap_err();
        assert!(matches!(err, AppError::ScoreError(_)));
    }

    #[test]
    fn aggregate_rejects_out_of_range_score() {
        let err = ScoringService::aggregate(&scores(4, 3, 9), None).unwrap_err();
        assert!(matches!(err, AppError::ScoreError(_)));
    }

    #[test]
    fn tips_follow_score_bands() {
        let report = ScoringService::aggregate(&scores(2, 3, 4), None).unwrap();
        assert!(report.tips[&RoundKind::Aptitude].starts_with("Focus on basic arithmetic"));
        assert!(report.tips[&RoundKind::Listening].starts_with("Practice with varied accents"));
        assert!(report.tips[&RoundKind::Reading].starts_with("Excellent reading ability"));
        assert_eq!(report.study_plan.weekly_schedule, "5 days consistent practice");
    }
}
