//! Question and passage acquisition for the three rounds.
//!
//! A [`ContentProvider`] produces raw model text. [`RetryPolicy`] repairs,
//! parses and validates it (strict first, then flexible) and falls back to
//! static content of the same shape when both attempts fail, so a round can
//! always start.

pub mod fallback;
pub mod provider;
pub mod repair;
pub mod retry;
pub mod validation;

use serde::Serialize;

use crate::models::domain::question::Question;
use crate::models::domain::round::RoundKind;
use crate::models::domain::session::Difficulty;

pub use provider::{ContentProvider, LlmContentProvider, OfflineContentProvider};
pub use retry::RetryPolicy;

pub const PASSAGE_QUESTION_COUNT: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentRequest {
    pub round: RoundKind,
    pub difficulty: Difficulty,
    pub question_count: usize,
}

impl ContentRequest {
    pub fn new(round: RoundKind, difficulty: Difficulty, aptitude_count: usize) -> Self {
        let question_count = match round {
            RoundKind::Aptitude => aptitude_count,
            RoundKind::Listening | RoundKind::Reading => PASSAGE_QUESTION_COUNT,
        };
        Self {
            round,
            difficulty,
            question_count,
        }
    }

    pub fn distribution(&self) -> QuestionDistribution {
        QuestionDistribution::for_difficulty(self.difficulty)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentBundle {
    pub title: String,
    pub passage: Option<String>,
    pub questions: Vec<Question>,
    pub used_fallback: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    Strict,
    Flexible,
}

impl ValidationMode {
    /// Attempt 1 is strict, every later attempt flexible.
    pub fn for_attempt(attempt: u32) -> Self {
        if attempt <= 1 {
            ValidationMode::Strict
        } else {
            ValidationMode::Flexible
        }
    }
}

/// Question mix for the listening and reading rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuestionDistribution {
    pub fill_blank: usize,
    pub true_false_not_given: usize,
}

impl QuestionDistribution {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy | Difficulty::Medium => Self {
                fill_blank: 3,
                true_false_not_given: 2,
            },
            Difficulty::Hard => Self {
                fill_blank: 2,
                true_false_not_given: 3,
            },
        }
    }

    pub fn total(&self) -> usize {
        self.fill_blank + self.true_false_not_given
    }

    pub fn of(questions: &[Question]) -> Self {
        let fill_blank = questions
            .iter()
            .filter(|q| matches!(q, Question::FillBlank(_)))
            .count();
        let true_false_not_given = questions
            .iter()
            .filter(|q| matches!(q, Question::TrueFalseNotGiven(_)))
            .count();
        Self {
            fill_blank,
            true_false_not_given,
        }
    }
}
