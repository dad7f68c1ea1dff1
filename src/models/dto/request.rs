use serde::Deserialize;
use validator::Validate;

use crate::models::domain::session::TimeLimits;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 20))]
    pub difficulty: String,

    #[validate(nested)]
    #[serde(default)]
    pub time_limits: Option<TimeLimitsOverride>,
}

/// Per-session overrides of the configured round limits, in seconds.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TimeLimitsOverride {
    #[validate(range(min = 1, max = 7200))]
    pub aptitude_secs: Option<u64>,

    #[validate(range(min = 1, max = 7200))]
    pub listening_secs: Option<u64>,

    #[validate(range(min = 1, max = 7200))]
    pub reading_secs: Option<u64>,
}

impl TimeLimitsOverride {
    pub fn apply(&self, base: TimeLimits) -> TimeLimits {
        TimeLimits {
            aptitude_secs: self.aptitude_secs.unwrap_or(base.aptitude_secs),
            listening_secs: self.listening_secs.unwrap_or(base.listening_secs),
            reading_secs: self.reading_secs.unwrap_or(base.reading_secs),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    /// `None` records the question as not answered.
    #[validate(length(max = 500))]
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SubmitBatchRequest {
    #[validate(length(max = 50))]
    #[serde(default)]
    pub answers: Vec<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_accepts_missing_time_limits() {
        let request: StartSessionRequest =
            serde_json::from_str(r#"{"name":"Jane","difficulty":"Easy"}"#).unwrap();

        assert!(request.validate().is_ok());
        assert!(request.time_limits.is_none());
    }

    #[test]
    fn start_request_rejects_empty_name() {
        let request = StartSessionRequest {
            name: String::new(),
            difficulty: "Easy".to_string(),
            time_limits: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn time_limit_override_must_be_positive() {
        let request = StartSessionRequest {
            name: "Jane".to_string(),
            difficulty: "Easy".to_string(),
            time_limits: Some(TimeLimitsOverride {
                aptitude_secs: Some(0),
                ..Default::default()
            }),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn override_only_replaces_given_rounds() {
        let limits = TimeLimitsOverride {
            aptitude_secs: Some(1),
            ..Default::default()
        }
        .apply(TimeLimits::default());

        assert_eq!(limits.aptitude_secs, 1);
        assert_eq!(limits.listening_secs, 180);
        assert_eq!(limits.reading_secs, 600);
    }

    #[test]
    fn batch_request_keeps_unanswered_slots() {
        let request: SubmitBatchRequest =
            serde_json::from_str(r#"{"answers":["heart",null,"True"]}"#).unwrap();
        assert_eq!(request.answers.len(), 3);
        assert!(request.answers[1].is_none());
    }
}
