//! Job status store: job id -> latest snapshot, shared by the simulator (writer) and pollers.

use crate::error::{DemoError, DemoResult};
use crate::generation::GenerationResult;
use crate::phase::{Phase, PhaseStep, CANCELLED_MESSAGE, IN_FLIGHT_ESTIMATE_MS};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

/// One simulated generation. Progress only moves forward; `result` is set once, on completion.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: String,
    pub phase: Phase,
    pub progress: u8,
    pub message: String,
    /// Remaining-time hint in milliseconds.
    pub estimated_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    #[serde(skip)]
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Fresh job in the first scripted phase with zero progress.
    pub fn new(id: impl Into<String>, first: &PhaseStep, estimated_time: u64) -> Self {
        Self {
            id: id.into(),
            phase: first.phase,
            progress: 0,
            message: first.message.to_string(),
            estimated_time,
            result: None,
            cancelled: false,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Enter a non-terminal phase. Progress never decreases.
    pub(crate) fn enter(&mut self, step: &PhaseStep, progress: u8) {
        self.phase = step.phase;
        self.progress = self.progress.max(progress.min(99));
        self.message = step.message.to_string();
        self.estimated_time = IN_FLIGHT_ESTIMATE_MS;
    }

    /// Enter `completed` with the job's one and only result.
    pub(crate) fn complete(&mut self, step: &PhaseStep, result: GenerationResult) {
        self.phase = Phase::Completed;
        self.progress = 100;
        self.message = step.message.to_string();
        self.estimated_time = 0;
        self.result = Some(result);
        self.finished_at = Some(Utc::now());
    }

    pub(crate) fn cancel(&mut self) {
        self.cancelled = true;
        self.phase = Phase::Cancelled;
        self.message = CANCELLED_MESSAGE.to_string();
        self.estimated_time = 0;
        self.finished_at = Some(Utc::now());
    }
}

/// Concurrent in-memory store. Every write happens under the entry's shard lock,
/// so a reader always gets a whole snapshot.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: DashMap<String, Job>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job whose id is not yet present. Returns false (and leaves the store untouched)
    /// if the id is already taken.
    pub fn insert_new(&self, job: Job) -> bool {
        match self.jobs.entry(job.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(job);
                true
            }
        }
    }

    /// Latest snapshot, or `NotFound` for unknown or evicted ids.
    pub fn get(&self, job_id: &str) -> DemoResult<Job> {
        self.jobs
            .get(job_id)
            .map(|j| j.value().clone())
            .ok_or_else(|| DemoError::NotFound(job_id.to_string()))
    }

    /// Mutate a job in place under its lock and return whatever `f` returns.
    pub fn update<R>(&self, job_id: &str, f: impl FnOnce(&mut Job) -> R) -> DemoResult<R> {
        let mut entry = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| DemoError::NotFound(job_id.to_string()))?;
        Ok(f(entry.value_mut()))
    }

    pub fn remove(&self, job_id: &str) -> Option<Job> {
        self.jobs.remove(job_id).map(|(_, job)| job)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationRequest;
    use crate::phase::PHASE_SCRIPT;

    fn job(id: &str) -> Job {
        Job::new(id, &PHASE_SCRIPT[0], 3000)
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = JobStore::new();
        assert!(store.get("job_missing").unwrap_err().is_not_found());
        assert!(store.update("job_missing", |_| ()).is_err());
    }

    #[test]
    fn insert_new_refuses_duplicates() {
        let store = JobStore::new();
        assert!(store.insert_new(job("job_1")));
        assert!(!store.insert_new(job("job_1")));
        assert_eq!(store.len(), 1);
        let snap = store.get("job_1").unwrap();
        assert_eq!(snap.phase, Phase::Processing);
        assert_eq!(snap.progress, 0);
    }

    #[test]
    fn progress_never_moves_backwards() {
        let store = JobStore::new();
        store.insert_new(job("job_1"));
        store.update("job_1", |j| j.enter(&PHASE_SCRIPT[1], 40)).unwrap();
        store.update("job_1", |j| j.enter(&PHASE_SCRIPT[0], 20)).unwrap();
        assert_eq!(store.get("job_1").unwrap().progress, 40);
        // 100 is reserved for completion
        store.update("job_1", |j| j.enter(&PHASE_SCRIPT[3], 100)).unwrap();
        assert_eq!(store.get("job_1").unwrap().progress, 99);
    }

    #[test]
    fn completion_sets_result_and_full_progress() {
        let store = JobStore::new();
        store.insert_new(job("job_1"));
        let req = GenerationRequest::new("Hello world", "sarah-us-female");
        let result = GenerationResult::build(&req, "/a.mp3".into(), 5800);
        store
            .update("job_1", |j| j.complete(&PHASE_SCRIPT[4], result.clone()))
            .unwrap();
        let snap = store.get("job_1").unwrap();
        assert_eq!(snap.phase, Phase::Completed);
        assert_eq!(snap.progress, 100);
        assert_eq!(snap.result, Some(result));
        assert!(snap.finished_at.is_some());
        assert!(store.remove("job_1").is_some());
        assert!(store.is_empty());
    }
}
