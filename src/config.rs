use secrecy::SecretString;
use std::env;

use crate::models::domain::session::TimeLimits;

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub llm_api_key: SecretString,
    pub llm_api_base: String,
    pub llm_model: String,
    pub tts_api_key: SecretString,
    pub tts_api_base: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub audio_dir: String,
    pub content_timeout_secs: u64,
    pub aptitude_question_count: usize,
    pub time_limits: TimeLimits,
    pub session_idle_secs: u64,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            web_server_port: parse_or("WEB_SERVER_PORT", 8080),
            llm_api_key: SecretString::from(env::var("LLM_API_KEY").unwrap_or_default()),
            llm_api_base: env::var("LLM_API_BASE")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            llm_model: env::var("LLM_MODEL")
                .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
            tts_api_key: SecretString::from(
                env::var("TTS_API_KEY")
                    .or_else(|_| env::var("LLM_API_KEY"))
                    .unwrap_or_default(),
            ),
            tts_api_base: env::var("TTS_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            tts_model: env::var("TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            tts_voice: env::var("TTS_VOICE").unwrap_or_else(|_| "alloy".to_string()),
            audio_dir: env::var("AUDIO_DIR").unwrap_or_else(|_| {
                env::temp_dir()
                    .join("mock_exam_audio")
                    .to_string_lossy()
                    .into_owned()
            }),
            content_timeout_secs: parse_or("CONTENT_TIMEOUT_SECS", 45),
            aptitude_question_count: parse_or("APTITUDE_QUESTION_COUNT", 20),
            time_limits: TimeLimits {
                aptitude_secs: parse_or("APTITUDE_TIME_LIMIT_SECS", 720),
                listening_secs: parse_or("LISTENING_TIME_LIMIT_SECS", 180),
                reading_secs: parse_or("READING_TIME_LIMIT_SECS", 600),
            },
            session_idle_secs: parse_or("SESSION_IDLE_TIMEOUT_SECS", 7200),
            dev_mode: env::var("DEV_MODE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Warns about settings that will force every round onto fallback content.
    /// Returns false when live content generation is unavailable.
    pub fn validate_for_production(&self) -> bool {
        use secrecy::ExposeSecret;

        if self.dev_mode {
            log::warn!("DEV_MODE is enabled: all rounds will use fallback content");
            return false;
        }

        if self.llm_api_key.expose_secret().trim().is_empty() {
            log::warn!(
                "LLM_API_KEY is not set: content generation will fail and rounds will use fallback content"
            );
            return false;
        }

        if self.aptitude_question_count == 0 {
            log::warn!("APTITUDE_QUESTION_COUNT is 0, using fallback size instead");
            return false;
        }

        true
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            llm_api_key: SecretString::from(String::new()),
            llm_api_base: "http://localhost:9999/v1".to_string(),
            llm_model: "test-model".to_string(),
            tts_api_key: SecretString::from(String::new()),
            tts_api_base: "http://localhost:9999/v1".to_string(),
            tts_model: "test-tts".to_string(),
            tts_voice: "alloy".to_string(),
            audio_dir: env::temp_dir()
                .join("mock_exam_audio_test")
                .to_string_lossy()
                .into_owned(),
            content_timeout_secs: 1,
            aptitude_question_count: 20,
            time_limits: TimeLimits::default(),
            session_idle_secs: 7200,
            dev_mode: true,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
