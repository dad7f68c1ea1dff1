use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static BLANK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{3,}").expect("BLANK_MARKER is a valid regex pattern"));

pub const MULTIPLE_CHOICE_OPTION_COUNT: usize = 4;

/// Label used when a question was never answered.
pub const NOT_ANSWERED: &str = "Not answered";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Question {
    MultipleChoice(MultipleChoiceQuestion),
    FillBlank(FillBlankQuestion),
    TrueFalseNotGiven(TrueFalseNotGivenQuestion),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MultipleChoiceQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FillBlankQuestion {
    pub question: String,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrueFalseNotGivenQuestion {
    pub question: String,
    pub correct_answer: TfngAnswer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum TfngAnswer {
    #[serde(rename = "True")]
    True,
    #[serde(rename = "False")]
    False,
    #[serde(rename = "Not Given")]
    NotGiven,
}

impl TfngAnswer {
    pub const ALL: [TfngAnswer; 3] = [TfngAnswer::True, TfngAnswer::False, TfngAnswer::NotGiven];

    pub fn label(&self) -> &'static str {
        match self {
            TfngAnswer::True => "True",
            TfngAnswer::False => "False",
            TfngAnswer::NotGiven => "Not Given",
        }
    }

    /// Exact, case-sensitive match against the three fixed labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.label() == label)
    }

    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|a| a.label().to_string()).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    FillBlank,
    TrueFalseNotGiven,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Question::MultipleChoice(_) => QuestionType::MultipleChoice,
            Question::FillBlank(_) => QuestionType::FillBlank,
            Question::TrueFalseNotGiven(_) => QuestionType::TrueFalseNotGiven,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            Question::MultipleChoice(q) => &q.question,
            Question::FillBlank(q) => &q.question,
            Question::TrueFalseNotGiven(q) => &q.question,
        }
    }

    /// Options shown to the candidate. Fill-blank questions have none.
    pub fn options(&self) -> Vec<String> {
        match self {
            Question::MultipleChoice(q) => q.options.clone(),
            Question::FillBlank(_) => Vec::new(),
            Question::TrueFalseNotGiven(_) => TfngAnswer::labels(),
        }
    }

    pub fn correct_answer(&self) -> &str {
        match self {
            Question::MultipleChoice(q) => &q.correct,
            Question::FillBlank(q) => &q.correct_answer,
            Question::TrueFalseNotGiven(q) => q.correct_answer.label(),
        }
    }

    pub fn explanation(&self) -> Option<&str> {
        match self {
            Question::MultipleChoice(q) => q.explanation.as_deref(),
            _ => None,
        }
    }

    /// Checks the structural rules every accepted question must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt().trim().is_empty() {
            return Err("question text is empty".to_string());
        }

        match self {
            Question::MultipleChoice(q) => {
                if q.options.len() != MULTIPLE_CHOICE_OPTION_COUNT {
                    return Err(format!(
                        "needs exactly {} options, got {}",
                        MULTIPLE_CHOICE_OPTION_COUNT,
                        q.options.len()
                    ));
                }
                if q.options.iter().any(|o| o.trim().is_empty()) {
                    return Err("contains an empty option".to_string());
                }
                if !q.options.contains(&q.correct) {
                    return Err(format!("correct answer '{}' is not in options", q.correct));
                }
            }
            Question::FillBlank(q) => {
                let blanks = BLANK_MARKER.find_iter(&q.question).count();
                if blanks != 1 {
                    return Err(format!("needs exactly one blank marker, got {}", blanks));
                }
                let answer = q.correct_answer.trim();
                if answer.is_empty() {
                    return Err("correct answer is empty".to_string());
                }
                if answer.split_whitespace().count() != 1 {
                    return Err(format!("correct answer '{}' is not a single token", answer));
                }
            }
            Question::TrueFalseNotGiven(_) => {}
        }

        Ok(())
    }
}
