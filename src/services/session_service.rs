use std::sync::Arc;
use std::time::{Duration, Instant};
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::domain::report::FinalReport;
use crate::models::domain::round::{AudioAsset, RoundKind};
use crate::models::domain::session::TimeLimits;
use crate::models::domain::Session;
use crate::models::dto::request::{StartSessionRequest, SubmitAnswerRequest, SubmitBatchRequest};
use crate::models::dto::response::{RoundView, SessionDto, SubmissionResponse};
use crate::repositories::{SessionHandle, SessionRepository};
use crate::services::audio_service::remove_audio;
use crate::services::round_controller::RoundController;

/// Every operation holds the session's lock until its result is recorded,
/// so concurrent requests for one session apply one after another.
pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
    controller: RoundController,
    default_time_limits: TimeLimits,
    max_idle: Duration,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        controller: RoundController,
        default_time_limits: TimeLimits,
        max_idle: Duration,
    ) -> Self {
        Self {
            repository,
            controller,
            default_time_limits,
            max_idle,
        }
    }

    pub async fn start_session(&self, request: StartSessionRequest) -> AppResult<SessionDto> {
        request.validate()?;
        self.evict_idle(Instant::now()).await?;

        let limits = request
            .time_limits
            .as_ref()
            .map_or(self.default_time_limits, |o| o.apply(self.default_time_limits));

        let mut session = Session::new(uuid::Uuid::new_v4().to_string());
        session.start(&request.name, &request.difficulty, limits)?;

        let handle = self.repository.insert(session).await?;
        let session = handle.lock().await;
        Ok(SessionDto::from(&*session))
    }

    pub async fn get_session(&self, id: &str) -> AppResult<SessionDto> {
        let handle = self.load(id).await?;
        let session = handle.lock().await;
        Ok(SessionDto::from(&*session))
    }

    pub async fn enter_round(&self, id: &str, round: &str) -> AppResult<RoundView> {
        let kind: RoundKind = round.parse()?;
        let handle = self.load(id).await?;
        let mut session = handle.lock().await;

        self.controller.enter(&mut session, kind, Instant::now()).await
    }

    pub async fn submit_answer(
        &self,
        id: &str,
        round: &str,
        request: SubmitAnswerRequest,
    ) -> AppResult<SubmissionResponse> {
        request.validate()?;
        let kind: RoundKind = round.parse()?;
        let handle = self.load(id).await?;
        let mut session = handle.lock().await;

        self.controller
            .submit_answer(&mut session, kind, request.answer, Instant::now())
            .await
    }

    pub async fn submit_batch(
        &self,
        id: &str,
        round: &str,
        request: SubmitBatchRequest,
    ) -> AppResult<SubmissionResponse> {
        request.validate()?;
        let kind: RoundKind = round.parse()?;
        let handle = self.load(id).await?;
        let mut session = handle.lock().await;

        self.controller
            .submit_batch(&mut session, kind, request.answers, Instant::now())
            .await
    }

    pub async fn complete_round(&self, id: &str, round: &str) -> AppResult<SessionDto> {
        let kind: RoundKind = round.parse()?;
        let handle = self.load(id).await?;
        let mut session = handle.lock().await;

        Ok(self.controller.complete(&mut session, kind, Instant::now()).await)
    }

    pub async fn report(&self, id: &str) -> AppResult<FinalReport> {
        let handle = self.load(id).await?;
        let session = handle.lock().await;
        session.summary()
    }

    /// Wipes the session back to setup. Generated audio is deleted first.
    pub async fn restart(&self, id: &str) -> AppResult<SessionDto> {
        let handle = self.load(id).await?;
        let mut session = handle.lock().await;

        discard_audio(&mut session).await;
        session.restart();
        Ok(SessionDto::from(&*session))
    }

    /// Audio for the in-progress listening round.
    pub async fn audio(&self, id: &str) -> AppResult<AudioAsset> {
        let handle = self.load(id).await?;
        let session = handle.lock().await;
        session
            .round(RoundKind::Listening)
            .filter(|r| !r.is_finished())
            .and_then(|r| r.audio.clone())
            .ok_or_else(|| {
                AppError::NotFound(format!("No listening audio for session '{}'", id))
            })
    }

    /// Drops sessions unused for longer than the idle limit, with their audio.
    pub async fn evict_idle(&self, now: Instant) -> AppResult<usize> {
        let evicted = self.repository.remove_idle(now, self.max_idle).await?;
        for handle in &evicted {
            let mut session = handle.lock().await;
            discard_audio(&mut session).await;
            log::info!("Evicted idle session {}", session.id);
        }
        if !evicted.is_empty() {
            log::info!("{} sessions remain active", self.repository.count().await?);
        }
        Ok(evicted.len())
    }

    async fn load(&self, id: &str) -> AppResult<SessionHandle> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session with id '{}' not found", id)))
    }
}

async fn discard_audio(session: &mut Session) {
    for round in session.rounds.values_mut() {
        if let Some(asset) = round.audio.take() {
            remove_audio(&asset).await;
        }
    }
}
