use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    repositories::InMemorySessionRepository,
    services::{
        audio_service::{AudioProvider, SpeechAudioProvider, TextOnlyAudioProvider},
        content::{ContentProvider, LlmContentProvider, OfflineContentProvider, RetryPolicy},
        round_controller::RoundController,
        session_service::SessionService,
    },
};

const DEFAULT_APTITUDE_QUESTION_COUNT: usize = 20;

#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Live providers, or offline ones in dev mode.
    pub fn new(config: Config) -> Self {
        let (content_provider, audio_provider): (Arc<dyn ContentProvider>, Arc<dyn AudioProvider>) =
            if config.dev_mode {
                (Arc::new(OfflineContentProvider), Arc::new(TextOnlyAudioProvider))
            } else {
                (
                    Arc::new(LlmContentProvider::new(&config)),
                    Arc::new(SpeechAudioProvider::new(&config)),
                )
            };

        Self::with_providers(config, content_provider, audio_provider)
    }

    pub fn with_providers(
        config: Config,
        content_provider: Arc<dyn ContentProvider>,
        audio_provider: Arc<dyn AudioProvider>,
    ) -> Self {
        let question_count = match config.aptitude_question_count {
            0 => DEFAULT_APTITUDE_QUESTION_COUNT,
            n => n,
        };

        let controller = RoundController::new(
            content_provider,
            audio_provider,
            RetryPolicy::new(Duration::from_secs(config.content_timeout_secs)),
            question_count,
        );
        let session_service = Arc::new(SessionService::new(
            Arc::new(InMemorySessionRepository::new()),
            controller,
            config.time_limits,
            Duration::from_secs(config.session_idle_secs),
        ));

        Self {
            session_service,
            config: Arc::new(config),
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::new(Config::test_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn dev_mode_state_builds_without_network() {
        let state = AppState::for_tests();
        assert!(state.config.dev_mode);
    }
}
