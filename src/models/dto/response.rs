use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::models::domain::question::{Question, QuestionType};
use crate::models::domain::round::{RoundKind, RoundResult, RoundState, RoundStatus};
use crate::models::domain::session::{Difficulty, Page, Session, Stage, TimeLimits};
use crate::timer::{format_time, Urgency};

#[derive(Debug, Clone, Serialize)]
pub struct SessionDto {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_name: Option<String>,
    pub difficulty: Difficulty,
    pub current_round: Option<Stage>,
    pub current_page: Page,
    pub next_round: Option<RoundKind>,
    pub test_started: bool,
    pub test_complete: bool,
    pub rounds_completed: Vec<RoundKind>,
    pub scores: BTreeMap<RoundKind, u8>,
    pub time_limits: TimeLimits,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_end_time: Option<DateTime<Utc>>,
}

impl From<&Session> for SessionDto {
    fn from(session: &Session) -> Self {
        SessionDto {
            id: session.id.clone(),
            candidate_name: session.candidate_name.clone(),
            difficulty: session.difficulty,
            current_round: session.current_round,
            current_page: session.current_page,
            next_round: session.next_round(),
            test_started: session.test_started,
            test_complete: session.test_complete,
            rounds_completed: session.rounds_completed.clone(),
            scores: session.progress(),
            time_limits: session.time_limits,
            test_start_time: session.test_start_time,
            test_end_time: session.test_end_time,
        }
    }
}

/// A question as shown to the candidate, without its answer key.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub number: usize,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub prompt: String,
    pub options: Vec<String>,
}

impl QuestionView {
    pub fn new(index: usize, question: &Question) -> Self {
        QuestionView {
            number: index + 1,
            question_type: question.question_type(),
            prompt: question.prompt().to_string(),
            options: question.options(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundView {
    pub round: RoundKind,
    pub status: RoundStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passage: Option<String>,
    pub question_count: usize,
    /// Aptitude shows one question at a time; the batch rounds show all.
    pub questions: Vec<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_index: Option<usize>,
    pub time_limit_secs: u64,
    pub remaining_seconds: u64,
    pub remaining_display: String,
    pub urgency: Urgency,
    pub audio_available: bool,
    pub text_only: bool,
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RoundResult>,
}

impl RoundView {
    pub fn build(round: &RoundState, now: Instant) -> Self {
        let finished = round.is_finished();
        let questions = if finished {
            Vec::new()
        } else if round.kind.is_batch() {
            round
                .questions
                .iter()
                .enumerate()
                .map(|(i, q)| QuestionView::new(i, q))
                .collect()
        } else {
            round
                .questions
                .get(round.current_index)
                .map(|q| vec![QuestionView::new(round.current_index, q)])
                .unwrap_or_default()
        };

        let remaining = if finished {
            Duration::ZERO
        } else {
            round.timer.remaining_at(now)
        };

        // The passage is read aloud in the listening round; show it as
        // text only when no audio could be produced.
        let audio_available = round.audio.is_some();
        let text_only = round.kind == RoundKind::Listening && !audio_available;
        let passage = match round.kind {
            RoundKind::Listening if audio_available && !finished => None,
            _ => round.passage.clone(),
        };

        RoundView {
            round: round.kind,
            status: round.status,
            title: round.title.clone(),
            passage,
            question_count: round.questions.len(),
            questions,
            current_index: (!round.kind.is_batch()).then_some(round.current_index),
            time_limit_secs: round.time_limit_secs,
            remaining_seconds: remaining.as_secs(),
            remaining_display: format_time(remaining),
            urgency: if finished {
                Urgency::Normal
            } else {
                round.timer.urgency_at(now)
            },
            audio_available,
            text_only,
            used_fallback: round.used_fallback,
            result: round.result.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResponse {
    pub round: RoundKind,
    pub finished: bool,
    pub answered: usize,
    pub remaining_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RoundResult>,
    pub session: SessionDto,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
