#[cfg(test)]
pub mod fixtures {
    use crate::models::domain::question::{
        FillBlankQuestion, MultipleChoiceQuestion, Question, TfngAnswer, TrueFalseNotGivenQuestion,
    };
    use crate::models::domain::session::TimeLimits;
    use crate::models::domain::Session;

    /// A session that has just started, at Easy difficulty with default limits.
    pub fn started_session() -> Session {
        let mut session = Session::new("test-session");
        session
            .start("Jane", "Easy", TimeLimits::default())
            .expect("fixture session should start");
        session
    }

    pub fn mcq(prompt: &str, correct: &str) -> Question {
        Question::MultipleChoice(MultipleChoiceQuestion {
            question: prompt.to_string(),
            options: vec![
                correct.to_string(),
                "wrong 1".to_string(),
                "wrong 2".to_string(),
                "wrong 3".to_string(),
            ],
            correct: correct.to_string(),
            explanation: Some(format!("The answer is {}", correct)),
        })
    }

    pub fn fill_blank(prompt: &str, answer: &str) -> Question {
        Question::FillBlank(FillBlankQuestion {
            question: prompt.to_string(),
            correct_answer: answer.to_string(),
            skill: None,
        })
    }

    pub fn tfng(prompt: &str, answer: TfngAnswer) -> Question {
        Question::TrueFalseNotGiven(TrueFalseNotGivenQuestion {
            question: prompt.to_string(),
            correct_answer: answer,
            skill: None,
        })
    }

    /// Three fill-blank and two T/F/NG questions, the Easy mix.
    pub fn passage_questions() -> Vec<Question> {
        vec![
            fill_blank("The river flows to the ___.", "sea"),
            fill_blank("Bees make ___.", "honey"),
            fill_blank("Paper comes from ___.", "trees"),
            tfng("The sun rises in the east.", TfngAnswer::True),
            tfng("The author owns a boat.", TfngAnswer::NotGiven),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::session::Stage;
    use crate::services::content::QuestionDistribution;

    #[test]
    fn test_fixtures_started_session() {
        let session = started_session();
        assert!(session.test_started);
        assert_eq!(session.current_round, Some(Stage::Aptitude));
        assert!(session.validate().is_ok());
    }

    #[test]
    fn test_fixtures_questions_are_valid() {
        assert!(mcq("2 + 2?", "4").validate().is_ok());
        assert!(passage_questions().iter().all(|q| q.validate().is_ok()));
    }

    #[test]
    fn test_fixtures_passage_mix() {
        let distribution = QuestionDistribution::of(&passage_questions());
        assert_eq!(distribution.fill_blank, 3);
        assert_eq!(distribution.true_false_not_given, 2);
    }
}
