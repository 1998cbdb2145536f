//! Active session registry.
//!
//! Each session owns one [`SessionLog`] behind its own mutex, so detections
//! within a session run one at a time while sessions stay independent.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use platelog_core::{PlateError, SessionLog};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

pub type SessionId = String;

/// Shared handle to one session's log.
pub type SharedLog = Arc<Mutex<SessionLog>>;

struct SessionEntry {
    log: SharedLog,
    last_active: Instant,
}

/// Manages live sessions.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session with an empty log.
    pub async fn create(&self) -> SessionId {
        let session_id = uuid::Uuid::new_v4().to_string();
        let mut w = self.sessions.write().await;
        w.insert(
            session_id.clone(),
            SessionEntry {
                log: Arc::new(Mutex::new(SessionLog::new())),
                last_active: Instant::now(),
            },
        );
        session_id
    }

    /// Look up a session and mark it active.
    pub async fn get(&self, session_id: &str) -> Result<SharedLog, PlateError> {
        let mut w = self.sessions.write().await;
        let entry = w
            .get_mut(session_id)
            .ok_or_else(|| PlateError::SessionNotFound(session_id.to_string()))?;
        entry.last_active = Instant::now();
        Ok(Arc::clone(&entry.log))
    }

    /// End a session, dropping its log. Returns how many records it held.
    pub async fn remove(&self, session_id: &str) -> Result<usize, PlateError> {
        let entry = {
            let mut w = self.sessions.write().await;
            w.remove(session_id)
                .ok_or_else(|| PlateError::SessionNotFound(session_id.to_string()))?
        };
        let records = entry.log.lock().await.len();
        Ok(records)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions idle for longer than `max_idle`. Returns each reaped
    /// session id with the number of records its log held.
    pub async fn reap_idle(&self, max_idle: Duration) -> Vec<(SessionId, usize)> {
        let now = Instant::now();
        let expired: Vec<(SessionId, SessionEntry)> = {
            let mut w = self.sessions.write().await;
            let ids: Vec<SessionId> = w
                .iter()
                .filter(|(_, e)| now.duration_since(e.last_active) > max_idle)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| w.remove(&id).map(|entry| (id, entry)))
                .collect()
        };

        let mut reaped = Vec::with_capacity(expired.len());
        for (id, entry) in expired {
            let records = entry.log.lock().await.len();
            reaped.push((id, records));
        }
        if !reaped.is_empty() {
            info!("[SessionRegistry] Reaped {} idle sessions", reaped.len());
        }
        reaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platelog_core::DetectionRecord;

    #[tokio::test]
    async fn test_create_get_remove() {
        let registry = SessionRegistry::new();
        let id = registry.create().await;
        assert_eq!(registry.len().await, 1);

        let log = registry.get(&id).await.unwrap();
        log.lock().await.append(DetectionRecord::new("ABC123").unwrap());

        assert_eq!(registry.remove(&id).await.unwrap(), 1);
        assert!(registry.is_empty().await);
        assert!(matches!(registry.get(&id).await, Err(PlateError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new();
        let a = registry.create().await;
        let b = registry.create().await;

        registry.get(&a).await.unwrap().lock().await.append(DetectionRecord::new("A1").unwrap());

        assert_eq!(registry.get(&a).await.unwrap().lock().await.len(), 1);
        assert!(registry.get(&b).await.unwrap().lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_reap_idle() {
        let registry = SessionRegistry::new();
        let id = registry.create().await;
        let log = registry.get(&id).await.unwrap();
        log.lock().await.append(DetectionRecord::new("IDLE1").unwrap());
        log.lock().await.append(DetectionRecord::new("IDLE2").unwrap());

        assert!(registry.reap_idle(Duration::from_secs(3600)).await.is_empty());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(registry.reap_idle(Duration::from_millis(5)).await, vec![(id, 2)]);
        assert!(registry.is_empty().await);
    }
}
