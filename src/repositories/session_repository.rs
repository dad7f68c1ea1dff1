use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

use crate::errors::{AppError, AppResult};
use crate::models::domain::Session;

/// A stored session. Holding the lock serializes every operation on it.
pub type SessionHandle = Arc<Mutex<Session>>;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Looks a session up and marks it as used.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<SessionHandle>>;
    async fn insert(&self, session: Session) -> AppResult<SessionHandle>;
    /// Removes every session not looked up since `now - max_idle`.
    async fn remove_idle(&self, now: Instant, max_idle: Duration) -> AppResult<Vec<SessionHandle>>;
    async fn count(&self) -> AppResult<usize>;
}

struct Entry {
    session: SessionHandle,
    last_touched: Instant,
}

/// Sessions live only as long as the process.
#[derive(Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<SessionHandle>> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.get_mut(id).map(|entry| {
            entry.last_touched = Instant::now();
            Arc::clone(&entry.session)
        }))
    }

    async fn insert(&self, session: Session) -> AppResult<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(AppError::Conflict(format!(
                "Session with id '{}' already exists",
                session.id
            )));
        }
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(
            id,
            Entry {
                session: Arc::clone(&handle),
                last_touched: Instant::now(),
            },
        );
        Ok(handle)
    }

    async fn remove_idle(&self, now: Instant, max_idle: Duration) -> AppResult<Vec<SessionHandle>> {
        let mut sessions = self.sessions.write().await;
        let idle: Vec<String> = sessions
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.last_touched) > max_idle)
            .map(|(id, _)| id.clone())
            .collect();

        Ok(idle
            .iter()
            .filter_map(|id| sessions.remove(id))
            .map(|entry| entry.session)
            .collect())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.sessions.read().await.len())
    }
}
