use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::domain::question::Question;
use crate::timer::RoundTimer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundKind {
    Aptitude,
    Listening,
    Reading,
}

impl RoundKind {
    /// Fixed round order.
    pub const ORDER: [RoundKind; 3] = [RoundKind::Aptitude, RoundKind::Listening, RoundKind::Reading];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundKind::Aptitude => "aptitude",
            RoundKind::Listening => "listening",
            RoundKind::Reading => "reading",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoundKind::Aptitude => "Aptitude",
            RoundKind::Listening => "Listening",
            RoundKind::Reading => "Reading",
        }
    }

    pub fn first() -> Self {
        Self::ORDER[0]
    }

    pub fn next(&self) -> Option<Self> {
        let index = Self::ORDER.iter().position(|r| r == self)?;
        Self::ORDER.get(index + 1).copied()
    }

    /// Listening and reading take every answer in one submission.
    pub fn is_batch(&self) -> bool {
        !matches!(self, RoundKind::Aptitude)
    }
}

impl fmt::Display for RoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "aptitude" => Ok(RoundKind::Aptitude),
            "listening" => Ok(RoundKind::Listening),
            "reading" => Ok(RoundKind::Reading),
            other => Err(AppError::NotFound(format!("Unknown round '{}'", other))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Uninitialized,
    InProgress,
    Finished,
}

/// Reference to a synthesized listening passage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioAsset {
    pub path: PathBuf,
    pub content_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuestionOutcome {
    pub number: usize,
    pub prompt: String,
    pub submitted: String,
    pub correct_answer: String,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundResult {
    pub round: RoundKind,
    pub raw_correct: usize,
    pub question_count: usize,
    pub normalized_score: u8,
    pub accuracy_percentage: f64,
    pub timed_out: bool,
    pub questions: Vec<QuestionOutcome>,
}

/// Round-local state, created lazily the first time a round becomes current.
#[derive(Clone, Debug)]
pub struct RoundState {
    pub kind: RoundKind,
    pub status: RoundStatus,
    pub title: Option<String>,
    pub passage: Option<String>,
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub answers: Vec<Option<String>>,
    /// Running count for the index-driven aptitude flow.
    pub raw_correct: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub time_limit_secs: u64,
    pub timer: RoundTimer,
    pub submitted: bool,
    pub used_fallback: bool,
    pub audio: Option<AudioAsset>,
    pub result: Option<RoundResult>,
}

impl RoundState {
    pub fn new(kind: RoundKind, time_limit_secs: u64) -> Self {
        Self {
            kind,
            status: RoundStatus::Uninitialized,
            title: None,
            passage: None,
            questions: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            raw_correct: 0,
            started_at: None,
            time_limit_secs,
            timer: RoundTimer::new(),
            submitted: false,
            used_fallback: false,
            audio: None,
            result: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == RoundStatus::Finished
    }

    pub fn remaining_questions(&self) -> usize {
        self.questions.len().saturating_sub(self.current_index)
    }
}
