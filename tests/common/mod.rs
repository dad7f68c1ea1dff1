#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mock_exam_server::errors::{AppError, AppResult};
use mock_exam_server::models::domain::round::{AudioAsset, RoundKind};
use mock_exam_server::services::audio_service::AudioProvider;
use mock_exam_server::services::content::{ContentProvider, ContentRequest, RetryPolicy};
use mock_exam_server::services::round_controller::RoundController;

/// Serves well-formed content for every round and counts calls.
#[derive(Default)]
pub struct CannedContentProvider {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ContentProvider for CannedContentProvider {
    async fn generate(&self, request: &ContentRequest) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = match request.round {
            RoundKind::Aptitude => aptitude_content(request.question_count),
            RoundKind::Listening => passage_content("Morning Markets", 200),
            RoundKind::Reading => passage_content("Coral Reefs", 300),
        };
        Ok(format!("```json\n{}\n```", body))
    }
}

/// Fails every call, as an unreachable model would.
pub struct FailingContentProvider;

#[async_trait]
impl ContentProvider for FailingContentProvider {
    async fn generate(&self, _request: &ContentRequest) -> AppResult<String> {
        Err(AppError::ContentError("provider unavailable".to_string()))
    }
}

pub struct NoAudio;

#[async_trait]
impl AudioProvider for NoAudio {
    async fn synthesize(&self, _session_id: &str, _text: &str) -> AppResult<AudioAsset> {
        Err(AppError::ContentError("no speech".to_string()))
    }
}

pub fn controller(provider: Arc<dyn ContentProvider>) -> RoundController {
    RoundController::new(
        provider,
        Arc::new(NoAudio),
        RetryPolicy::new(Duration::from_secs(1)),
        20,
    )
}

fn aptitude_content(count: usize) -> String {
    let questions: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "type": "multiple_choice",
                "question": format!("What is {} + {}?", i, i),
                "options": [
                    (2 * i).to_string(),
                    (2 * i + 1).to_string(),
                    (2 * i + 2).to_string(),
                    (2 * i + 3).to_string()
                ],
                "correct": (2 * i).to_string(),
                "explanation": format!("{} + {} = {}", i, i, 2 * i)
            })
        })
        .collect();
    json!({ "title": "Aptitude", "questions": questions }).to_string()
}

fn passage_content(title: &str, words: usize) -> String {
    let passage = vec!["market"; words].join(" ");
    json!({
        "title": title,
        "passage": passage,
        "questions": [
            { "type": "fill_blank", "question": "Traders arrive at ___.", "correct_answer": "dawn" },
            { "type": "fill_blank", "question": "Fruit is sold by ___.", "correct_answer": "weight" },
            { "type": "fill_blank", "question": "The square is paved with ___.", "correct_answer": "stone" },
            {
                "type": "true_false_not_given",
                "question": "The market opens every day.",
                "options": ["True", "False", "Not Given"],
                "correct_answer": "True"
            },
            {
                "type": "true_false_not_given",
                "question": "Prices are set by the council.",
                "options": ["True", "False", "Not Given"],
                "correct_answer": "Not Given"
            }
        ]
    })
    .to_string()
}
