use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use secrecy::ExposeSecret;
use serde_json::json;

use crate::config::Config;
use crate::constants::prompts::{self, PassagePrompt};
use crate::errors::{AppError, AppResult};
use crate::models::domain::round::RoundKind;
use crate::models::dto::content_dto::GeneratedContentDto;
use crate::services::content::ContentRequest;

const TEMPERATURE: f32 = 0.7;
const APTITUDE_MAX_TOKENS: u32 = 8000;
const PASSAGE_MAX_TOKENS: u32 = 3500;

static CONTENT_SCHEMA: Lazy<String> = Lazy::new(|| {
    let schema = schemars::schema_for!(GeneratedContentDto);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
});

/// Source of raw, unvalidated round content.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn generate(&self, request: &ContentRequest) -> AppResult<String>;
}

/// Chat completion against any OpenAI-compatible endpoint.
pub struct LlmContentProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl LlmContentProvider {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.llm_api_key.expose_secret().to_string())
            .with_api_base(config.llm_api_base.clone());

        Self {
            client: Client::with_config(openai_config),
            model: config.llm_model.clone(),
        }
    }

    pub fn prompt(request: &ContentRequest) -> String {
        match request.round {
            RoundKind::Aptitude => prompts::aptitude_prompt(
                request.difficulty,
                request.question_count,
                &CONTENT_SCHEMA,
            ),
            RoundKind::Listening | RoundKind::Reading => {
                let distribution = request.distribution();
                let spoken = request.round == RoundKind::Listening;
                let (min_words, max_words) = if spoken { (180, 250) } else { (250, 350) };
                prompts::passage_prompt(
                    &PassagePrompt {
                        difficulty: request.difficulty,
                        topic: prompts::random_topic(),
                        fill_blank: distribution.fill_blank,
                        true_false_not_given: distribution.true_false_not_given,
                        min_words,
                        max_words,
                        spoken,
                    },
                    &CONTENT_SCHEMA,
                )
            }
        }
    }
}

#[async_trait]
impl ContentProvider for LlmContentProvider {
    async fn generate(&self, request: &ContentRequest) -> AppResult<String> {
        let max_tokens = match request.round {
            RoundKind::Aptitude => APTITUDE_MAX_TOKENS,
            _ => PASSAGE_MAX_TOKENS,
        };

        log::info!(
            "Requesting {} {} content from {}",
            request.difficulty,
            request.round,
            self.model
        );

        let response: serde_json::Value = self
            .client
            .chat()
            .create_byot(json!({
                "model": self.model,
                "temperature": TEMPERATURE,
                "max_tokens": max_tokens,
                "messages": [
                    { "role": "system", "content": prompts::SYSTEM_PROMPT },
                    { "role": "user", "content": Self::prompt(request) }
                ]
            }))
            .await
            .map_err(|e| AppError::ContentError(format!("Chat completion failed: {}", e)))?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::ContentError("Empty response from model".to_string()))?;

        log::debug!("Model returned {} chars", content.len());
        Ok(content.to_string())
    }
}

/// Used in dev mode: never calls out, so every round gets fallback content.
pub struct OfflineContentProvider;

#[async_trait]
impl ContentProvider for OfflineContentProvider {
    async fn generate(&self, request: &ContentRequest) -> AppResult<String> {
        log::debug!("Content generation disabled for {} round", request.round);
        Err(AppError::ContentError(
            "Content generation is disabled".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::session::Difficulty;

    #[test]
    fn schema_describes_questions() {
        assert!(CONTENT_SCHEMA.contains("questions"));
        assert!(CONTENT_SCHEMA.contains("correct_answer"));
    }

    #[test]
    fn listening_prompt_asks_for_spoken_passage() {
        let request = ContentRequest::new(RoundKind::Listening, Difficulty::Hard, 20);
        let prompt = LlmContentProvider::prompt(&request);
        assert!(prompt.contains("listening comprehension"));
        assert!(prompt.contains("180-250 words"));
    }

    #[test]
    fn aptitude_prompt_embeds_schema() {
        let request = ContentRequest::new(RoundKind::Aptitude, Difficulty::Easy, 20);
        let prompt = LlmContentProvider::prompt(&request);
        assert!(prompt.contains("EXACTLY 20 aptitude questions"));
        assert!(prompt.contains("\"questions\""));
    }

    #[actix_web::test]
    async fn offline_provider_always_fails() {
        let request = ContentRequest::new(RoundKind::Reading, Difficulty::Easy, 20);
        let result = OfflineContentProvider.generate(&request).await;
        assert!(matches!(result, Err(AppError::ContentError(_))));
    }
}
