use crate::errors::{AppError, AppResult};
use crate::models::domain::question::Question;
use crate::models::domain::round::RoundKind;
use crate::models::dto::content_dto::{GeneratedContentDto, GeneratedQuestionDto};
use crate::services::content::fallback::pad_aptitude;
use crate::services::content::repair::clean_json;
use crate::services::content::{
    ContentBundle, ContentRequest, QuestionDistribution, ValidationMode, PASSAGE_QUESTION_COUNT,
};

/// Inclusive passage length bounds in words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordRange {
    pub min: usize,
    pub max: usize,
}

impl WordRange {
    pub fn for_round(round: RoundKind, mode: ValidationMode) -> Option<Self> {
        let (min, max) = match (round, mode) {
            (RoundKind::Aptitude, _) => return None,
            (RoundKind::Listening, ValidationMode::Strict) => (150, 280),
            (RoundKind::Listening, ValidationMode::Flexible) => (100, 350),
            (RoundKind::Reading, ValidationMode::Strict) => (200, 400),
            (RoundKind::Reading, ValidationMode::Flexible) => (120, 500),
        };
        Some(Self { min, max })
    }

    pub fn contains(&self, words: usize) -> bool {
        (self.min..=self.max).contains(&words)
    }
}

/// Share of the requested aptitude questions that must come back, in percent.
pub fn aptitude_threshold(count: usize, mode: ValidationMode) -> usize {
    let percent = match mode {
        ValidationMode::Strict => 95,
        ValidationMode::Flexible => 85,
    };
    count * percent / 100
}

/// Repairs, parses and validates raw model output for `request`.
pub fn parse_content(
    raw: &str,
    request: &ContentRequest,
    mode: ValidationMode,
) -> AppResult<ContentBundle> {
    let value = clean_json(raw)?;
    let content: GeneratedContentDto = if value.is_array() {
        GeneratedContentDto {
            questions: serde_json::from_value(value)?,
            ..Default::default()
        }
    } else {
        serde_json::from_value(value)?
    };

    match request.round {
        RoundKind::Aptitude => validate_aptitude(content, request, mode),
        RoundKind::Listening | RoundKind::Reading => validate_passage(content, request, mode),
    }
}

fn validate_aptitude(
    content: GeneratedContentDto,
    request: &ContentRequest,
    mode: ValidationMode,
) -> AppResult<ContentBundle> {
    let count = request.question_count;
    let minimum = aptitude_threshold(count, mode);

    let mut questions = Vec::with_capacity(count);
    for (index, dto) in content.questions.into_iter().take(count).enumerate() {
        match convert(dto, index) {
            Ok(question @ Question::MultipleChoice(_)) => questions.push(question),
            Ok(_) => {
                let err = format!("Question {} is not multiple choice", index + 1);
                if mode == ValidationMode::Strict {
                    return Err(AppError::ContentError(err));
                }
                log::warn!("Dropping aptitude question: {}", err);
            }
            Err(err) if mode == ValidationMode::Strict => return Err(err),
            Err(err) => log::warn!("Dropping aptitude question: {}", err),
        }
    }

    if questions.len() < minimum {
        return Err(AppError::ContentError(format!(
            "Got {} valid aptitude questions, need at least {}",
            questions.len(),
            minimum
        )));
    }

    Ok(ContentBundle {
        title: content
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Aptitude Assessment".to_string()),
        passage: None,
        questions: pad_aptitude(questions, count),
        used_fallback: false,
    })
}

fn validate_passage(
    content: GeneratedContentDto,
    request: &ContentRequest,
    mode: ValidationMode,
) -> AppResult<ContentBundle> {
    let title = content
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::ContentError("Missing title".to_string()))?;
    let passage = content
        .passage
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::ContentError("Missing passage".to_string()))?;

    if let Some(range) = WordRange::for_round(request.round, mode) {
        let words = passage.split_whitespace().count();
        if !range.contains(words) {
            let message = format!(
                "Passage has {} words (target {}-{})",
                words, range.min, range.max
            );
            match mode {
                ValidationMode::Strict => return Err(AppError::ContentError(message)),
                ValidationMode::Flexible => log::warn!("{}", message),
            }
        }
    }

    if content.questions.len() != PASSAGE_QUESTION_COUNT {
        return Err(AppError::ContentError(format!(
            "Need exactly {} questions, got {}",
            PASSAGE_QUESTION_COUNT,
            content.questions.len()
        )));
    }

    let questions = content
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, dto)| match convert(dto, index)? {
            Question::MultipleChoice(_) => Err(AppError::ContentError(format!(
                "Question {} must be fill_blank or true_false_not_given",
                index + 1
            ))),
            question => Ok(question),
        })
        .collect::<AppResult<Vec<Question>>>()?;

    let expected = request.distribution();
    let actual = QuestionDistribution::of(&questions);
    if actual != expected {
        let message = format!(
            "Question mix is {} fill_blank / {} true_false_not_given, expected {} / {}",
            actual.fill_blank,
            actual.true_false_not_given,
            expected.fill_blank,
            expected.true_false_not_given
        );
        match mode {
            ValidationMode::Strict => return Err(AppError::ContentError(message)),
            ValidationMode::Flexible => log::warn!("{}", message),
        }
    }

    Ok(ContentBundle {
        title,
        passage: Some(passage),
        questions,
        used_fallback: false,
    })
}

fn convert(dto: GeneratedQuestionDto, index: usize) -> AppResult<Question> {
    Question::try_from(dto).map_err(|e| match e {
        AppError::ContentError(msg) => {
            AppError::ContentError(format!("Question {}: {}", index + 1, msg))
        }
        other => other,
    })
}
