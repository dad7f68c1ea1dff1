//! Drives one round through Uninitialized -> InProgress -> Finished.
//!
//! Every entry point takes the caller's `now` so timeouts are checked against
//! a single instant per request.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::{AppError, AppResult};
use crate::models::domain::round::{RoundKind, RoundResult, RoundStatus};
use crate::models::domain::Session;
use crate::models::dto::response::{RoundView, SessionDto, SubmissionResponse};
use crate::services::audio_service::{remove_audio, AudioProvider};
use crate::services::content::{ContentProvider, ContentRequest, RetryPolicy};
use crate::services::scoring_service::ScoringService;

pub struct RoundController {
    content_provider: Arc<dyn ContentProvider>,
    audio_provider: Arc<dyn AudioProvider>,
    retry_policy: RetryPolicy,
    aptitude_question_count: usize,
}

impl RoundController {
    pub fn new(
        content_provider: Arc<dyn ContentProvider>,
        audio_provider: Arc<dyn AudioProvider>,
        retry_policy: RetryPolicy,
        aptitude_question_count: usize,
    ) -> Self {
        Self {
            content_provider,
            audio_provider,
            retry_policy,
            aptitude_question_count,
        }
    }

    /// Enters (or polls) a round: loads content on first entry and applies
    /// the timeout check. A finished round returns its stored result.
    pub async fn enter(
        &self,
        session: &mut Session,
        kind: RoundKind,
        now: Instant,
    ) -> AppResult<RoundView> {
        if !session.test_started {
            return Err(AppError::Conflict("The test has not been started".to_string()));
        }

        if let Some(round) = session.round(kind).filter(|r| r.is_finished()) {
            return Ok(RoundView::build(round, now));
        }

        ensure_current(session, kind)?;
        self.ensure_loaded(session, kind, now).await;
        self.check_timeout(session, kind, now).await;

        let round = session
            .round(kind)
            .ok_or_else(|| AppError::InternalError(format!("{} round missing", kind)))?;
        Ok(RoundView::build(round, now))
    }

    /// Records one aptitude answer and moves to the next question.
    pub async fn submit_answer(
        &self,
        session: &mut Session,
        kind: RoundKind,
        answer: Option<String>,
        now: Instant,
    ) -> AppResult<SubmissionResponse> {
        if let Some(done) = self.guard_submission(session, kind)? {
            return Ok(done);
        }
        if kind.is_batch() {
            return Err(AppError::ValidationError(format!(
                "The {} round takes all answers in one submission",
                kind
            )));
        }

        if self.check_timeout(session, kind, now).await {
            log::info!("Discarding late answer for {} in session {}", kind, session.id);
            return Ok(submission(session, kind));
        }

        let round = session.round_mut(kind);
        let Some(question) = round.questions.get(round.current_index) else {
            return Err(AppError::Conflict(format!("No question pending in the {} round", kind)));
        };

        let answer = normalize_answer(answer);
        if ScoringService::is_correct(question, answer.as_deref()) {
            round.raw_correct += 1;
        }
        round.answers.push(answer);
        round.current_index += 1;

        if round.current_index >= round.questions.len() {
            self.finalize(session, kind, false).await;
        }

        Ok(submission(session, kind))
    }

    /// Takes every answer for a listening or reading round at once.
    pub async fn submit_batch(
        &self,
        session: &mut Session,
        kind: RoundKind,
        answers: Vec<Option<String>>,
        now: Instant,
    ) -> AppResult<SubmissionResponse> {
        if let Some(done) = self.guard_submission(session, kind)? {
            return Ok(done);
        }
        if !kind.is_batch() {
            return Err(AppError::ValidationError(
                "The aptitude round takes one answer at a time".to_string(),
            ));
        }

        let question_count = session.round_mut(kind).questions.len();
        if answers.len() > question_count {
            return Err(AppError::ValidationError(format!(
                "Got {} answers for {} questions",
                answers.len(),
                question_count
            )));
        }

        if self.check_timeout(session, kind, now).await {
            log::info!("Discarding late submission for {} in session {}", kind, session.id);
            return Ok(submission(session, kind));
        }

        let round = session.round_mut(kind);
        let mut answers: Vec<Option<String>> = answers.into_iter().map(normalize_answer).collect();
        answers.resize(question_count, None);
        round.answers = answers;

        self.finalize(session, kind, false).await;
        Ok(submission(session, kind))
    }

    /// Explicit completion. Ignored unless `kind` is the current round; an
    /// unfinished current round is finalized first, forfeiting what is
    /// unanswered.
    pub async fn complete(&self, session: &mut Session, kind: RoundKind, now: Instant) -> SessionDto {
        if session.active_round() == Some(kind) {
            let timed_out = session
                .round(kind)
                .is_some_and(|r| r.timer.expired_at(now));
            self.finalize(session, kind, timed_out).await;
        }
        SessionDto::from(&*session)
    }

    /// Finalizes the round once its timer has run out. Returns whether the
    /// round is finished afterwards.
    pub async fn check_timeout(&self, session: &mut Session, kind: RoundKind, now: Instant) -> bool {
        let expired = match session.round(kind) {
            Some(round) if round.is_finished() => return true,
            Some(round) => round.status == RoundStatus::InProgress && round.timer.expired_at(now),
            None => false,
        };

        if expired {
            log::info!("Time is up for {} in session {}", kind, session.id);
            self.finalize(session, kind, true).await;
        }
        expired
    }

    /// Scores the round, stores the result and advances the session.
    /// Does nothing for a round that is already finished.
    pub async fn finalize(&self, session: &mut Session, kind: RoundKind, timed_out: bool) {
        let round = session.round_mut(kind);
        if round.is_finished() {
            return;
        }

        let result = ScoringService::grade_round(kind, &round.questions, &round.answers, timed_out);
        if kind == RoundKind::Aptitude && result.raw_correct != round.raw_correct {
            log::warn!(
                "Running aptitude count {} differs from graded count {}",
                round.raw_correct,
                result.raw_correct
            );
        }

        round.status = RoundStatus::Finished;
        round.submitted = true;
        round.raw_correct = result.raw_correct;
        round.timer.reset();
        round.result = Some(result.clone());
        let audio = round.audio.take();

        if let Some(asset) = audio {
            remove_audio(&asset).await;
        }

        log_result(&session.id, &result);
        session.record_score(kind, result.normalized_score);
        session.complete_round(kind);
    }

    async fn ensure_loaded(&self, session: &mut Session, kind: RoundKind, now: Instant) {
        if session
            .round(kind)
            .is_some_and(|r| r.status != RoundStatus::Uninitialized)
        {
            return;
        }

        let request = ContentRequest::new(kind, session.difficulty, self.aptitude_question_count);
        let bundle = self
            .retry_policy
            .acquire(self.content_provider.as_ref(), &request)
            .await;

        let audio = match (&bundle.passage, kind) {
            (Some(passage), RoundKind::Listening) => {
                match self.audio_provider.synthesize(&session.id, passage).await {
                    Ok(asset) => Some(asset),
                    Err(e) => {
                        log::warn!("Listening audio unavailable, showing text only: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };

        // Content loading can take a while; the clock starts once it is ready.
        let started = now.max(Instant::now());
        let session_id = session.id.clone();
        let round = session.round_mut(kind);
        round.title = Some(bundle.title);
        round.passage = bundle.passage;
        round.answers = Vec::with_capacity(bundle.questions.len());
        round.questions = bundle.questions;
        round.used_fallback = bundle.used_fallback;
        round.current_index = 0;
        round.raw_correct = 0;
        round.audio = audio;
        round.started_at = Some(Utc::now());
        round.status = RoundStatus::InProgress;
        round
            .timer
            .start_at(started, Duration::from_secs(round.time_limit_secs));

        log::info!(
            "Session {} entered {} round with {} questions{}",
            session_id,
            kind,
            round.questions.len(),
            if round.used_fallback { " (fallback)" } else { "" }
        );
    }

    /// Shared submission checks. `Some` carries the stored result of a round
    /// that already finished.
    fn guard_submission(
        &self,
        session: &Session,
        kind: RoundKind,
    ) -> AppResult<Option<SubmissionResponse>> {
        if session.test_complete {
            return Err(AppError::Conflict(
                "The test is complete; no more answers are accepted".to_string(),
            ));
        }
        if session.round(kind).is_some_and(|r| r.is_finished()) {
            return Ok(Some(submission(session, kind)));
        }
        ensure_current(session, kind)?;
        if session
            .round(kind)
            .map_or(true, |r| r.status == RoundStatus::Uninitialized)
        {
            return Err(AppError::Conflict(format!(
                "The {} round has not been entered yet",
                kind
            )));
        }
        Ok(None)
    }
}

fn ensure_current(session: &Session, kind: RoundKind) -> AppResult<()> {
    if session.active_round() != Some(kind) {
        return Err(AppError::Conflict(format!(
            "The {} round is not the current round",
            kind
        )));
    }
    Ok(())
}

fn normalize_answer(answer: Option<String>) -> Option<String> {
    answer.filter(|a| !a.trim().is_empty())
}

fn submission(session: &Session, kind: RoundKind) -> SubmissionResponse {
    let (finished, answered, remaining_questions, result) = match session.round(kind) {
        Some(round) => (
            round.is_finished(),
            round.answers.iter().filter(|a| a.is_some()).count(),
            if round.is_finished() { 0 } else { round.remaining_questions() },
            round.result.clone(),
        ),
        None => (false, 0, 0, None),
    };

    SubmissionResponse {
        round: kind,
        finished,
        answered,
        remaining_questions,
        result,
        session: SessionDto::from(session),
    }
}

fn log_result(session_id: &str, result: &RoundResult) {
    log::info!(
        "Session {} finished {}: {}/{} correct, score {}/5{}",
        session_id,
        result.round,
        result.raw_correct,
        result.question_count,
        result.normalized_score,
        if result.timed_out { " (timed out)" } else { "" }
    );
}
