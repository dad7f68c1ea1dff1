use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::errors::{AppError, AppResult};
use crate::models::domain::report::FinalReport;
use crate::models::domain::round::{RoundKind, RoundState};
use crate::services::scoring_service::ScoringService;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(AppError::ValidationError(format!(
                "Difficulty must be one of Easy, Medium, Hard (got '{}')",
                value
            ))),
        }
    }
}

/// Where the candidate is in the fixed round order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Aptitude,
    Listening,
    Reading,
    Complete,
}

impl Stage {
    pub fn round(&self) -> Option<RoundKind> {
        match self {
            Stage::Aptitude => Some(RoundKind::Aptitude),
            Stage::Listening => Some(RoundKind::Listening),
            Stage::Reading => Some(RoundKind::Reading),
            Stage::Complete => None,
        }
    }
}

impl From<RoundKind> for Stage {
    fn from(kind: RoundKind) -> Self {
        match kind {
            RoundKind::Aptitude => Stage::Aptitude,
            RoundKind::Listening => Stage::Listening,
            RoundKind::Reading => Stage::Reading,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Setup,
    Aptitude,
    Listening,
    Reading,
    Results,
}

impl From<RoundKind> for Page {
    fn from(kind: RoundKind) -> Self {
        match kind {
            RoundKind::Aptitude => Page::Aptitude,
            RoundKind::Listening => Page::Listening,
            RoundKind::Reading => Page::Reading,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimeLimits {
    pub aptitude_secs: u64,
    pub listening_secs: u64,
    pub reading_secs: u64,
}

impl Default for TimeLimits {
    fn default() -> Self {
        Self {
            aptitude_secs: 720,
            listening_secs: 180,
            reading_secs: 600,
        }
    }
}

impl TimeLimits {
    pub fn for_round(&self, kind: RoundKind) -> u64 {
        match kind {
            RoundKind::Aptitude => self.aptitude_secs,
            RoundKind::Listening => self.listening_secs,
            RoundKind::Reading => self.reading_secs,
        }
    }
}

/// One candidate's test attempt. Every mutation goes through a method here
/// or through the round controller.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub candidate_name: Option<String>,
    pub difficulty: Difficulty,
    pub current_round: Option<Stage>,
    pub current_page: Page,
    pub test_started: bool,
    pub test_complete: bool,
    pub session_start: Option<DateTime<Utc>>,
    pub test_start_time: Option<DateTime<Utc>>,
    pub test_end_time: Option<DateTime<Utc>>,
    pub rounds_completed: Vec<RoundKind>,
    pub rounds: HashMap<RoundKind, RoundState>,
    pub scores: BTreeMap<RoundKind, u8>,
    pub time_limits: TimeLimits,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            candidate_name: None,
            difficulty: Difficulty::default(),
            current_round: None,
            current_page: Page::Setup,
            test_started: false,
            test_complete: false,
            session_start: None,
            test_start_time: None,
            test_end_time: None,
            rounds_completed: Vec::new(),
            rounds: HashMap::new(),
            scores: BTreeMap::new(),
            time_limits: TimeLimits::default(),
        }
    }

    /// Begins a fresh attempt. Nothing changes when validation fails.
    pub fn start(&mut self, name: &str, difficulty: &str, time_limits: TimeLimits) -> AppResult<()> {
        self.start_at(Instant::now(), name, difficulty, time_limits)
    }

    pub fn start_at(
        &mut self,
        now: Instant,
        name: &str,
        difficulty: &str,
        time_limits: TimeLimits,
    ) -> AppResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Name must not be empty".to_string()));
        }
        let difficulty: Difficulty = difficulty.parse()?;

        let mut fresh = Session::new(self.id.clone());
        let started = Utc::now();
        let first = RoundKind::first();

        fresh.candidate_name = Some(name.to_string());
        fresh.difficulty = difficulty;
        fresh.time_limits = time_limits;
        fresh.test_started = true;
        fresh.session_start = Some(started);
        fresh.test_start_time = Some(started);
        fresh.current_round = Some(Stage::from(first));
        fresh.current_page = Page::from(first);

        let mut round = RoundState::new(first, time_limits.for_round(first));
        round
            .timer
            .start_at(now, Duration::from_secs(round.time_limit_secs));
        fresh.rounds.insert(first, round);

        *self = fresh;
        log::info!(
            "Session {} started for '{}' at {} difficulty",
            self.id,
            name,
            difficulty
        );
        Ok(())
    }

    pub fn active_round(&self) -> Option<RoundKind> {
        self.current_round.and_then(|stage| stage.round())
    }

    /// Round after the current one, if any.
    pub fn next_round(&self) -> Option<RoundKind> {
        self.active_round().and_then(|kind| kind.next())
    }

    pub fn is_completed(&self, kind: RoundKind) -> bool {
        self.rounds_completed.contains(&kind)
    }

    /// Marks `kind` complete and advances. Returns false (and changes nothing)
    /// unless `kind` is the current round.
    pub fn complete_round(&mut self, kind: RoundKind) -> bool {
        if self.test_complete || self.active_round() != Some(kind) {
            log::debug!(
                "Ignoring completion of {} for session {} (current: {:?})",
                kind,
                self.id,
                self.current_round
            );
            return false;
        }

        if !self.is_completed(kind) {
            self.rounds_completed.push(kind);
        }

        match kind.next() {
            Some(next) => {
                self.current_round = Some(Stage::from(next));
                self.current_page = Page::from(next);
            }
            None => {
                self.current_round = Some(Stage::Complete);
                self.current_page = Page::Results;
                self.test_complete = true;
                self.test_end_time = Some(Utc::now());
            }
        }

        log::info!(
            "Session {} completed round {}, now at {:?}",
            self.id,
            kind,
            self.current_round
        );
        true
    }

    /// Stores a round's normalized score. A completed round is never rescored.
    pub fn record_score(&mut self, kind: RoundKind, score: u8) {
        if self.is_completed(kind) {
            return;
        }
        self.scores.insert(kind, score.min(5));
    }

    pub fn round(&self, kind: RoundKind) -> Option<&RoundState> {
        self.rounds.get(&kind)
    }

    pub fn round_mut(&mut self, kind: RoundKind) -> &mut RoundState {
        let limit = self.time_limits.for_round(kind);
        self.rounds
            .entry(kind)
            .or_insert_with(|| RoundState::new(kind, limit))
    }

    /// Discards everything, keeping only the session id.
    pub fn restart(&mut self) {
        log::info!("Session {} restarted", self.id);
        *self = Session::new(self.id.clone());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        let start = self.session_start?;
        let end = self.test_end_time.unwrap_or_else(Utc::now);
        Some((end - start).num_seconds())
    }

    /// Final report. Only available once every round has produced a score.
    pub fn summary(&self) -> AppResult<FinalReport> {
        if !self.test_complete {
            return Err(AppError::Conflict(
                "The report is available once all rounds are complete".to_string(),
            ));
        }
        ScoringService::aggregate(&self.scores, self.duration_seconds())
    }

    /// Scores of completed rounds only.
    pub fn progress(&self) -> BTreeMap<RoundKind, u8> {
        self.rounds_completed
            .iter()
            .filter_map(|kind| self.scores.get(kind).map(|score| (*kind, *score)))
            .collect()
    }

    /// Checks the session invariants, returning the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if !self.test_started {
            return Ok(());
        }

        if self.candidate_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err("candidate name missing".to_string());
        }
        if self.session_start.is_none() {
            return Err("session start time missing".to_string());
        }

        match self.current_round {
            None => return Err("current round not set".to_string()),
            Some(Stage::Complete) => {
                if !self.test_complete {
                    return Err("complete stage without test_complete".to_string());
                }
            }
            Some(stage) => {
                if self.test_complete {
                    return Err("test_complete while a round is active".to_string());
                }
                let kind = stage.round().ok_or("invalid stage")?;
                if self.current_page != Page::from(kind) {
                    return Err("page/round mismatch".to_string());
                }
            }
        }

        let mut seen = Vec::new();
        for kind in &self.rounds_completed {
            if seen.contains(kind) {
                return Err(format!("round {} completed twice", kind));
            }
            seen.push(*kind);
        }

        let expected: Vec<RoundKind> = RoundKind::ORDER
            .iter()
            .take(self.rounds_completed.len())
            .copied()
            .collect();
        if expected != self.rounds_completed {
            return Err("rounds completed out of order".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> Session {
        let mut session = Session::new("s-1");
        session
            .start("Jane", "Easy", TimeLimits::default())
            .expect("start should succeed");
        session
    }

    #[test]
    fn new_session_is_at_setup() {
        let session = Session::new("s-1");
        assert_eq!(session.current_page, Page::Setup);
        assert!(session.current_round.is_none());
        assert!(!session.test_started);
        assert!(session.validate().is_ok());
    }

    #[test]
    fn start_rejects_blank_name_without_mutation() {
        let mut session = Session::new("s-1");
        let err = session
            .start("   ", "Easy", TimeLimits::default())
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(!session.test_started);
        assert_eq!(session.current_page, Page::Setup);
    }

    #[test]
    fn start_rejects_unknown_difficulty() {
        let mut session = Session::new("s-1");
        assert!(session
            .start("Jane", "Impossible", TimeLimits::default())
            .is_err());
        assert!(!session.test_started);
    }

    #[test]
    fn start_enters_aptitude_and_starts_its_timer() {
        let session = started();

        assert!(session.test_started);
        assert_eq!(session.candidate_name.as_deref(), Some("Jane"));
        assert_eq!(session.difficulty, Difficulty::Easy);
        assert_eq!(session.current_round, Some(Stage::Aptitude));
        assert_eq!(session.current_page, Page::Aptitude);
        assert!(session.round(RoundKind::Aptitude).unwrap().timer.is_started());
        assert!(session.validate().is_ok());
    }

    #[test]
    fn completing_out_of_order_is_a_no_op() {
        let mut session = started();

        assert!(!session.complete_round(RoundKind::Reading));
        assert_eq!(session.current_round, Some(Stage::Aptitude));
        assert!(session.rounds_completed.is_empty());
    }

    #[test]
    fn completing_twice_records_once() {
        let mut session = started();

        assert!(session.complete_round(RoundKind::Aptitude));
        assert!(!session.complete_round(RoundKind::Aptitude));

        assert_eq!(session.rounds_completed, vec![RoundKind::Aptitude]);
        assert_eq!(session.current_round, Some(Stage::Listening));
        assert_eq!(session.current_page, Page::Listening);
    }

    #[test]
    fn completing_last_round_finishes_the_test() {
        let mut session = started();
        for kind in RoundKind::ORDER {
            assert!(session.complete_round(kind));
        }

        assert!(session.test_complete);
        assert_eq!(session.current_round, Some(Stage::Complete));
        assert_eq!(session.current_page, Page::Results);
        assert!(session.test_end_time.is_some());
        assert_eq!(session.next_round(), None);
        assert!(session.validate().is_ok());
    }

    #[test]
    fn next_round_follows_fixed_order() {
        let mut session = started();
        assert_eq!(session.next_round(), Some(RoundKind::Listening));
        session.complete_round(RoundKind::Aptitude);
        assert_eq!(session.next_round(), Some(RoundKind::Reading));
    }

    #[test]
    fn summary_requires_completion() {
        let mut session = started();
        session.record_score(RoundKind::Aptitude, 4);
        assert!(matches!(session.summary(), Err(AppError::Conflict(_))));
    }

    #[test]
    fn completed_round_is_never_rescored() {
        let mut session = started();
        session.record_score(RoundKind::Aptitude, 4);
        session.complete_round(RoundKind::Aptitude);
        session.record_score(RoundKind::Aptitude, 1);

        assert_eq!(session.scores.get(&RoundKind::Aptitude), Some(&4));
    }

    #[test]
    fn progress_only_reports_completed_rounds() {
        let mut session = started();
        session.record_score(RoundKind::Aptitude, 4);
        assert!(session.progress().is_empty());

        session.complete_round(RoundKind::Aptitude);
        assert_eq!(session.progress().get(&RoundKind::Aptitude), Some(&4));
    }

    #[test]
    fn restart_matches_a_brand_new_session() {
        let mut session = started();
        session.record_score(RoundKind::Aptitude, 3);
        session.complete_round(RoundKind::Aptitude);

        session.restart();
        let fresh = Session::new("s-1");

        assert_eq!(session.id, fresh.id);
        assert_eq!(session.current_round, fresh.current_round);
        assert_eq!(session.current_page, fresh.current_page);
        assert!(session.rounds_completed.is_empty());
        assert!(session.scores.is_empty());
        assert!(session.rounds.is_empty());
        assert!(!session.test_started);
    }

    #[test]
    fn validate_detects_page_mismatch() {
        let mut session = started();
        session.current_page = Page::Results;
        assert!(session.validate().is_err());
    }
}
