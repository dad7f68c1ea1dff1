use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::services::content::fallback::fallback_bundle;
use crate::services::content::validation::parse_content;
use crate::services::content::{ContentBundle, ContentProvider, ContentRequest, ValidationMode};

pub const DEFAULT_ATTEMPTS: u32 = 2;

/// Bounded strict-then-flexible attempts followed by static fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            timeout,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Always yields content of the requested shape.
    pub async fn acquire(
        &self,
        provider: &dyn ContentProvider,
        request: &ContentRequest,
    ) -> ContentBundle {
        for attempt in 1..=self.attempts {
            let mode = ValidationMode::for_attempt(attempt);
            log::info!(
                "Generating {} content (attempt {}/{}, {:?} validation)",
                request.round,
                attempt,
                self.attempts,
                mode
            );

            match self.attempt(provider, request, mode).await {
                Ok(bundle) => {
                    log::info!(
                        "Generated {} content with {} questions ({:?} validation)",
                        request.round,
                        bundle.questions.len(),
                        mode
                    );
                    return bundle;
                }
                Err(err) => log::warn!(
                    "Attempt {}/{} for {} content failed: {}",
                    attempt,
                    self.attempts,
                    request.round,
                    err
                ),
            }
        }

        log::warn!("Falling back to static {} content", request.round);
        fallback_bundle(request)
    }

    async fn attempt(
        &self,
        provider: &dyn ContentProvider,
        request: &ContentRequest,
        mode: ValidationMode,
    ) -> AppResult<ContentBundle> {
        let raw = tokio::time::timeout(self.timeout, provider.generate(request))
            .await
            .map_err(|_| {
                AppError::ContentError(format!(
                    "Provider timed out after {}s",
                    self.timeout.as_secs()
                ))
            })??;

        parse_content(&raw, request, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::round::RoundKind;
    use crate::models::domain::session::Difficulty;
    use crate::services::content::provider::MockContentProvider;
    use crate::services::content::QuestionDistribution;
    use async_trait::async_trait;
    use serde_json::json;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(Duration::from_secs(1))
    }

    fn aptitude_json(count: usize) -> String {
        let questions: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "question": format!("Generated {}?", i),
                    "options": ["a", "b", "c", "d"],
                    "correct": "c",
                    "explanation": "c"
                })
            })
            .collect();
        json!({ "questions": questions }).to_string()
    }

    #[actix_web::test]
    async fn failing_provider_yields_fallback_of_same_shape() {
        let mut provider = MockContentProvider::new();
        provider
            .expect_generate()
            .times(2)
            .returning(|_| Err(AppError::ContentError("boom".to_string())));

        let request = ContentRequest::new(RoundKind::Listening, Difficulty::Hard, 20);
        let bundle = policy().acquire(&provider, &request).await;

        assert!(bundle.used_fallback);
        assert_eq!(bundle.questions.len(), 5);
        assert_eq!(
            QuestionDistribution::of(&bundle.questions),
            QuestionDistribution::for_difficulty(Difficulty::Hard)
        );
    }

    #[actix_web::test]
    async fn first_valid_response_wins() {
        let mut provider = MockContentProvider::new();
        provider
            .expect_generate()
            .times(1)
            .returning(|_| Ok(aptitude_json(20)));

        let request = ContentRequest::new(RoundKind::Aptitude, Difficulty::Easy, 20);
        let bundle = policy().acquire(&provider, &request).await;

        assert!(!bundle.used_fallback);
        assert_eq!(bundle.questions[0].prompt(), "Generated 0?");
    }

    #[actix_web::test]
    async fn second_attempt_uses_flexible_validation() {
        // 18 of 20 fails strict (needs 19) but passes flexible (needs 17).
        let mut provider = MockContentProvider::new();
        provider
            .expect_generate()
            .times(2)
            .returning(|_| Ok(aptitude_json(18)));

        let request = ContentRequest::new(RoundKind::Aptitude, Difficulty::Easy, 20);
        let bundle = policy().acquire(&provider, &request).await;

        assert!(!bundle.used_fallback);
        assert_eq!(bundle.questions.len(), 20);
    }

    #[actix_web::test]
    async fn zero_attempts_goes_straight_to_fallback() {
        let mut provider = MockContentProvider::new();
        provider.expect_generate().times(0);

        let request = ContentRequest::new(RoundKind::Aptitude, Difficulty::Easy, 20);
        let bundle = policy().with_attempts(0).acquire(&provider, &request).await;

        assert!(bundle.used_fallback);
        assert_eq!(bundle.questions.len(), 20);
    }

    struct SlowProvider;

    #[async_trait]
    impl ContentProvider for SlowProvider {
        async fn generate(&self, _request: &ContentRequest) -> AppResult<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(aptitude_json(20))
        }
    }

    #[actix_web::test]
    async fn slow_provider_is_cut_off() {
        let request = ContentRequest::new(RoundKind::Aptitude, Difficulty::Easy, 20);
        let policy = RetryPolicy::new(Duration::from_millis(20));

        let bundle = policy.acquire(&SlowProvider, &request).await;
        assert!(bundle.used_fallback);
    }
}
