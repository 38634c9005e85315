//! Session Registry — one `ScreeningSession` per job id for the lifetime of
//! the registry entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use crate::scoring_client::ScoringBackend;
use crate::screening::session::{ScreeningSession, ScreeningStatus};
use crate::screening::weights::WeightStore;

/// Process-wide map from job id to its session. Only the map itself is
/// guarded here; each session carries its own lock.
pub struct SessionRegistry {
    backend: Arc<dyn ScoringBackend>,
    weights: Arc<WeightStore>,
    sessions: Mutex<HashMap<String, Arc<ScreeningSession>>>,
}

impl SessionRegistry {
    pub fn new(backend: Arc<dyn ScoringBackend>, weights: Arc<WeightStore>) -> Self {
        Self {
            backend,
            weights,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the job's session, creating it on first use. Concurrent callers
    /// for an unseen job all receive the same instance.
    pub fn get_or_create(&self, job_id: &str) -> Arc<ScreeningSession> {
        let mut sessions = self.lock();
        let session = sessions.entry(job_id.to_string()).or_insert_with(|| {
            info!("Creating screening session for job '{job_id}'");
            Arc::new(ScreeningSession::new(
                job_id,
                Arc::clone(&self.backend),
                Arc::clone(&self.weights),
            ))
        });
        Arc::clone(session)
    }

    pub fn get(&self, job_id: &str) -> Option<Arc<ScreeningSession>> {
        self.lock().get(job_id).cloned()
    }

    /// Drops the job's session. A running attempt is cancelled first so its
    /// result is discarded.
    pub fn remove(&self, job_id: &str) -> Option<Arc<ScreeningSession>> {
        let removed = self.lock().remove(job_id)?;
        if removed.status() == ScreeningStatus::Running {
            // may have finished in between, which is fine
            removed.cancel().ok();
        }
        info!("Removed screening session for job '{job_id}'");
        Some(removed)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<ScreeningSession>>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}
