//! In-memory session state. One Record per session, never persisted.
//!
//! Sessions idle for longer than the store's TTL are evicted by a periodic sweep.

pub mod handlers;
pub mod merge;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Record;

/// Everything the wizard accumulates for one user.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    pub record: Record,
    /// Last generated cover letter, kept verbatim.
    pub cover_letter: Option<String>,
}

struct Entry {
    session: Session,
    last_seen: Instant,
}

impl Entry {
    fn touch(&mut self) -> &mut Session {
        self.last_seen = Instant::now();
        &mut self.session
    }
}

/// Owns all live sessions. Cloning shares the same map.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn create(&self) -> (Uuid, Session) {
        let id = Uuid::new_v4();
        let session = Session::default();
        self.inner.write().await.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        info!("Created session {id}");
        (id, session)
    }

    /// Returns a snapshot of the session. Counts as activity.
    pub async fn get(&self, id: Uuid) -> Result<Session, AppError> {
        self.update(id, |session| session.clone()).await
    }

    /// Applies `f` to the session under the write lock and returns its result.
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.inner.write().await;
        let entry = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        Ok(f(entry.touch()))
    }

    /// Discards the Record and cover letter, leaving an empty session under the same id.
    pub async fn reset(&self, id: Uuid) -> Result<Session, AppError> {
        let session = self
            .update(id, |session| {
                *session = Session::default();
                session.clone()
            })
            .await?;
        info!("Reset session {id}");
        Ok(session)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Ended session {id}"))
            .ok_or_else(|| not_found(id))
    }

    /// Drops every session idle for longer than the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle sessions ({} live)", sessions.len());
        }
        evicted
    }

    /// Runs `evict_idle` every `period` (at least one second) for the life of the process.
    pub fn spawn_eviction(&self, period: Duration) -> JoinHandle<()> {
        let period = period.max(Duration::from_secs(1));
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                store.evict_idle().await;
            }
        })
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
