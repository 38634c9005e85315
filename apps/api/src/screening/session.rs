//! Screening Session — per-job state machine owning at most one in-flight
//! screening attempt.
//!
//! ```text
//! Idle ──start──▶ Running ──ok──▶ Complete
//!   ▲               │  └──err──▶ Failed
//!   └────cancel─────┘
//! Complete / Failed ──start──▶ Running
//! ```
//!
//! Every `start` takes a new attempt number. A finishing attempt is applied
//! only if the session is still `Running` that same attempt; anything else is
//! stale and dropped. Cancellation never interrupts the network call.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::scoring_client::{ScoringBackend, ScreeningRequest};
use crate::screening::error::ScreeningError;
use crate::screening::models::{Candidate, Job, ResumeInput};
use crate::screening::normalizer::normalize;
use crate::screening::weights::WeightStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    Idle,
    Running,
    Complete,
    Failed,
}

/// Point-in-time view of a session. `candidates` is non-empty only in
/// `Complete`, `error` is set only in `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub job_id: String,
    pub status: ScreeningStatus,
    pub attempt: u64,
    pub candidate_count: usize,
    pub candidates: Vec<Candidate>,
    pub error: Option<ScreeningError>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Handle to a launched attempt. Dropping `task` detaches it.
#[derive(Debug)]
pub struct Attempt {
    pub number: u64,
    pub task: JoinHandle<()>,
}

#[derive(Debug)]
struct SessionState {
    status: ScreeningStatus,
    attempt: u64,
    candidates: Vec<Candidate>,
    error: Option<ScreeningError>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

pub struct ScreeningSession {
    job_id: String,
    backend: Arc<dyn ScoringBackend>,
    weights: Arc<WeightStore>,
    state: Mutex<SessionState>,
    updates: watch::Sender<SessionSnapshot>,
}

impl ScreeningSession {
    pub fn new(
        job_id: impl Into<String>,
        backend: Arc<dyn ScoringBackend>,
        weights: Arc<WeightStore>,
    ) -> Self {
        let state = SessionState {
            status: ScreeningStatus::Idle,
            attempt: 0,
            candidates: Vec::new(),
            error: None,
            started_at: None,
            finished_at: None,
        };
        let job_id = job_id.into();
        let (updates, _) = watch::channel(snapshot_of(&job_id, &state));
        Self {
            job_id,
            backend,
            weights,
            state: Mutex::new(state),
            updates,
        }
    }

    pub fn status(&self) -> ScreeningStatus {
        self.lock().status
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        snapshot_of(&self.job_id, &self.lock())
    }

    /// Receiver that observes every state transition from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// Launches a screening attempt on the tokio runtime.
    ///
    /// Input is validated against the current weights before any state
    /// change; a validation failure leaves the session untouched.
    pub fn start(
        self: &Arc<Self>,
        job: &Job,
        resumes: &[ResumeInput],
    ) -> Result<Attempt, ScreeningError> {
        if job.id != self.job_id {
            return Err(ScreeningError::validation(format!(
                "job '{}' does not belong to session '{}'",
                job.id, self.job_id
            )));
        }
        let weights = self.weights.get();
        let request = ScreeningRequest::compose(job, resumes, &weights)?;

        let number = {
            let mut state = self.lock();
            if state.status == ScreeningStatus::Running {
                return Err(ScreeningError::AlreadyRunning {
                    job_id: self.job_id.clone(),
                });
            }
            state.attempt += 1;
            state.status = ScreeningStatus::Running;
            state.candidates.clear();
            state.error = None;
            state.started_at = Some(Utc::now());
            state.finished_at = None;
            self.publish(&state);
            state.attempt
        };

        info!(
            "Screening attempt {} started for job '{}' ({} resume(s))",
            number,
            self.job_id,
            request.resumes.len()
        );

        let session = Arc::clone(self);
        let task = tokio::spawn(async move {
            let outcome = session.backend.submit(&request).await;
            session.finish(number, outcome);
        });

        Ok(Attempt { number, task })
    }

    /// Abandons the running attempt. Its eventual result is discarded.
    pub fn cancel(&self) -> Result<u64, ScreeningError> {
        let mut state = self.lock();
        if state.status != ScreeningStatus::Running {
            return Err(ScreeningError::NotRunning {
                job_id: self.job_id.clone(),
            });
        }
        state.status = ScreeningStatus::Idle;
        state.finished_at = Some(Utc::now());
        self.publish(&state);
        info!(
            "Screening attempt {} cancelled for job '{}'",
            state.attempt, self.job_id
        );
        Ok(state.attempt)
    }

    fn finish(&self, number: u64, outcome: Result<Value, ScreeningError>) {
        // normalize outside the lock; the result may still turn out stale
        let result = outcome.and_then(|raw| normalize(&raw));

        let mut state = self.lock();
        if state.status != ScreeningStatus::Running || state.attempt != number {
            debug!(
                "Discarding stale result of attempt {} for job '{}' (current attempt {}, {:?})",
                number, self.job_id, state.attempt, state.status
            );
            return;
        }

        state.finished_at = Some(Utc::now());
        match result {
            Ok(candidates) => {
                info!(
                    "Screening attempt {} complete for job '{}': {} candidate(s)",
                    number,
                    self.job_id,
                    candidates.len()
                );
                state.status = ScreeningStatus::Complete;
                state.candidates = candidates;
            }
            Err(e) => {
                warn!(
                    "Screening attempt {} failed for job '{}': {e}",
                    number, self.job_id
                );
                state.status = ScreeningStatus::Failed;
                state.candidates.clear();
                state.error = Some(e);
            }
        }
        self.publish(&state);
    }

    fn publish(&self, state: &SessionState) {
        self.updates.send_replace(snapshot_of(&self.job_id, state));
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn snapshot_of(job_id: &str, state: &SessionState) -> SessionSnapshot {
    SessionSnapshot {
        job_id: job_id.to_string(),
        status: state.status,
        attempt: state.attempt,
        candidate_count: state.candidates.len(),
        candidates: state.candidates.clone(),
        error: state.error.clone(),
        started_at: state.started_at,
        finished_at: state.finished_at,
    }
}
