use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::domain::question::{
    FillBlankQuestion, MultipleChoiceQuestion, Question, TfngAnswer, TrueFalseNotGivenQuestion,
};

/// Shape the model is asked to return for every round.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct GeneratedContentDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub passage: Option<String>,
    #[serde(default)]
    pub questions: Vec<GeneratedQuestionDto>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct GeneratedQuestionDto {
    /// `multiple_choice`, `fill_blank` or `true_false_not_given`.
    #[serde(rename = "type", default)]
    pub question_type: Option<String>,
    pub question: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Correct option for multiple choice questions.
    #[serde(default)]
    pub correct: Option<String>,
    /// Correct answer for fill-blank and true/false/not given questions.
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
}

impl GeneratedQuestionDto {
    /// Aptitude questions often come back untagged.
    fn kind(&self) -> &str {
        match self.question_type.as_deref() {
            Some(kind) => kind,
            None if self.options.as_ref().is_some_and(|o| o.len() == 4) => "multiple_choice",
            None => "",
        }
    }
}

impl TryFrom<GeneratedQuestionDto> for Question {
    type Error = AppError;

    fn try_from(dto: GeneratedQuestionDto) -> Result<Self, Self::Error> {
        let question = match dto.kind() {
            "multiple_choice" => {
                let correct = dto
                    .correct
                    .or(dto.correct_answer)
                    .ok_or_else(|| AppError::ContentError("Missing correct option".to_string()))?;
                Question::MultipleChoice(MultipleChoiceQuestion {
                    question: dto.question,
                    options: dto.options.unwrap_or_default(),
                    correct,
                    explanation: dto.explanation.filter(|e| !e.trim().is_empty()),
                })
            }
            "fill_blank" => Question::FillBlank(FillBlankQuestion {
                question: dto.question,
                correct_answer: dto.correct_answer.or(dto.correct).ok_or_else(|| {
                    AppError::ContentError("Missing fill-blank answer".to_string())
                })?,
                skill: dto.skill,
            }),
            "true_false_not_given" => {
                if let Some(options) = &dto.options {
                    if *options != TfngAnswer::labels() {
                        return Err(AppError::ContentError(format!(
                            "True/False/Not Given options must be {:?}",
                            TfngAnswer::labels()
                        )));
                    }
                }
                let label = dto.correct_answer.or(dto.correct).unwrap_or_default();
                let correct_answer = TfngAnswer::from_label(label.trim()).ok_or_else(|| {
                    AppError::ContentError(format!("'{}' is not True, False or Not Given", label))
                })?;
                Question::TrueFalseNotGiven(TrueFalseNotGivenQuestion {
                    question: dto.question,
                    correct_answer,
                    skill: dto.skill,
                })
            }
            other => {
                return Err(AppError::ContentError(format!(
                    "Unsupported question type '{}'",
                    other
                )))
            }
        };

        question.validate().map_err(AppError::ContentError)?;
        Ok(question)
    }
}
