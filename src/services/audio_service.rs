use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::domain::round::AudioAsset;

const SPEECH_CONTENT_TYPE: &str = "audio/mpeg";
const MAX_SPEECH_CHARS: usize = 4096;

/// Turns a listening passage into a playable file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioProvider: Send + Sync {
    async fn synthesize(&self, session_id: &str, text: &str) -> AppResult<AudioAsset>;
}

/// OpenAI-compatible `/audio/speech` client writing mp3 files to disk.
pub struct SpeechAudioProvider {
    client: reqwest::Client,
    api_key: SecretString,
    api_base: String,
    model: String,
    voice: String,
    audio_dir: PathBuf,
}

impl SpeechAudioProvider {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.content_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: config.tts_api_key.clone(),
            api_base: config.tts_api_base.trim_end_matches('/').to_string(),
            model: config.tts_model.clone(),
            voice: config.tts_voice.clone(),
            audio_dir: PathBuf::from(&config.audio_dir),
        }
    }

    fn file_path(&self, session_id: &str) -> PathBuf {
        self.audio_dir
            .join(format!("{}-listening-{}.mp3", session_id, uuid::Uuid::new_v4()))
    }
}

#[async_trait]
impl AudioProvider for SpeechAudioProvider {
    async fn synthesize(&self, session_id: &str, text: &str) -> AppResult<AudioAsset> {
        let input: String = text.chars().take(MAX_SPEECH_CHARS).collect();
        if input.trim().is_empty() {
            return Err(AppError::ContentError("No passage text to narrate".to_string()));
        }

        let response = self
            .client
            .post(format!("{}/audio/speech", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({
                "model": self.model,
                "voice": self.voice,
                "input": input,
                "response_format": "mp3"
            }))
            .send()
            .await
            .map_err(|e| AppError::ContentError(format!("Speech request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ContentError(format!(
                "Speech endpoint returned {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::ContentError(format!("Failed to read speech audio: {}", e)))?;

        tokio::fs::create_dir_all(&self.audio_dir).await?;
        let path = self.file_path(session_id);
        tokio::fs::write(&path, &bytes).await?;

        log::info!(
            "Wrote {} bytes of listening audio to {}",
            bytes.len(),
            path.display()
        );

        Ok(AudioAsset {
            path,
            content_type: SPEECH_CONTENT_TYPE.to_string(),
        })
    }
}

/// Never produces audio; the listening passage is shown as text.
pub struct TextOnlyAudioProvider;

#[async_trait]
impl AudioProvider for TextOnlyAudioProvider {
    async fn synthesize(&self, _session_id: &str, _text: &str) -> AppResult<AudioAsset> {
        Err(AppError::ContentError("Audio synthesis is disabled".to_string()))
    }
}

/// Deletes a generated file. A file that is already gone is not an error.
pub async fn remove_audio(asset: &AudioAsset) {
    if let Err(e) = remove_file(&asset.path).await {
        log::warn!("Failed to remove audio {}: {}", asset.path.display(), e);
    }
}

async fn remove_file(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn text_only_provider_never_produces_audio() {
        let result = TextOnlyAudioProvider.synthesize("s-1", "Hello").await;
        assert!(result.is_err());
    }

    #[actix_web::test]
    async fn unreachable_endpoint_is_a_content_error() {
        let mut config = Config::test_config();
        config.tts_api_base = "http://127.0.0.1:9".to_string();
        let provider = SpeechAudioProvider::new(&config);

        let result = provider.synthesize("s-1", "Some passage").await;
        assert!(matches!(result, Err(AppError::ContentError(_))));
    }

    #[actix_web::test]
    async fn remove_audio_deletes_file_and_tolerates_missing() {
        let dir = std::env::temp_dir().join("mock_exam_audio_remove_test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join(format!("{}.mp3", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"id3").await.unwrap();

        let asset = AudioAsset {
            path: path.clone(),
            content_type: SPEECH_CONTENT_TYPE.to_string(),
        };
        remove_audio(&asset).await;
        assert!(!path.exists());

        remove_audio(&asset).await;
    }
}
