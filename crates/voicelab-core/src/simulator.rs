//! Job simulator: accepts generation requests and walks each job through the phase script.
//! Every job gets its own tokio task; phases within a job run strictly in order.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info};

use crate::audio::{AudioLocator, RandomSampleAudio};
use crate::config::DemoConfig;
use crate::error::{DemoError, DemoResult};
use crate::generation::{GenerationRequest, GenerationResult, SubmitReceipt, QUEUE_POSITION};
use crate::phase::{progress_after, scaled_delay, Phase, PHASE_SCRIPT};
use crate::store::{Job, JobStore};
use crate::usage::UsageTracker;
use crate::voices::VoiceCatalog;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorSettings {
    pub max_characters: usize,
    /// How long a finished (completed or cancelled) job stays queryable.
    pub retention: Duration,
    pub delay_scale: f64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self::from(&DemoConfig::default())
    }
}

impl From<&DemoConfig> for SimulatorSettings {
    fn from(config: &DemoConfig) -> Self {
        Self {
            max_characters: config.max_characters,
            retention: config.retention(),
            delay_scale: config.delay_scale(),
        }
    }
}

/// Cheap to clone; clones share the same store, tracker and locator.
#[derive(Clone)]
pub struct JobSimulator {
    store: Arc<JobStore>,
    usage: Arc<UsageTracker>,
    catalog: Arc<VoiceCatalog>,
    locator: Arc<dyn AudioLocator>,
    settings: SimulatorSettings,
}

impl JobSimulator {
    pub fn new(
        store: Arc<JobStore>,
        usage: Arc<UsageTracker>,
        catalog: Arc<VoiceCatalog>,
        settings: SimulatorSettings,
    ) -> Self {
        Self {
            store,
            usage,
            catalog,
            locator: Arc::new(RandomSampleAudio),
            settings,
        }
    }

    /// Replace the audio locator strategy (e.g. a fixed clip in tests).
    pub fn with_locator(mut self, locator: Arc<dyn AudioLocator>) -> Self {
        self.locator = locator;
        self
    }

    /// Validate and accept a request, then start its phase task. Returns without waiting for
    /// the job. Input errors are reported before the quota check; an accepted job holds one
    /// generation slot until it completes or is cancelled.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: GenerationRequest) -> DemoResult<SubmitReceipt> {
        request.validate(self.settings.max_characters)?;
        if !self.catalog.contains(&request.voice_id) {
            return Err(DemoError::UnknownVoice(request.voice_id));
        }
        if !self.usage.try_reserve() {
            let limit = self.usage.limits().daily_generations;
            info!(limit, "generation rejected: daily limit reached");
            return Err(DemoError::QuotaExceeded { limit });
        }

        let estimated_time = request.estimated_time_ms();
        let first = &PHASE_SCRIPT[0];
        let job_id = loop {
            let id = new_job_id();
            if self.store.insert_new(Job::new(id.as_str(), first, estimated_time)) {
                break id;
            }
        };
        info!(
            job_id = %job_id,
            voice = %request.voice_id,
            chars = request.char_count(),
            estimated_time,
            "generation job accepted"
        );

        let sim = self.clone();
        let task_id = job_id.clone();
        tokio::spawn(async move {
            sim.run(task_id, request).await;
        });

        Ok(SubmitReceipt {
            job_id,
            estimated_time,
            queue_position: QUEUE_POSITION,
        })
    }

    /// Latest snapshot of a job.
    pub fn status(&self, job_id: &str) -> DemoResult<Job> {
        self.store.get(job_id)
    }

    /// Stop a job between phases. The job keeps its progress, never produces a result, and is
    /// not counted as a generation. Its slot is released at once and the retention window
    /// starts now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn cancel(&self, job_id: &str) -> DemoResult<Job> {
        let cancelled = self.store.update(job_id, |job| {
            if job.is_terminal() {
                return Err(DemoError::Validation(format!(
                    "Job {} is already {}",
                    job_id,
                    job.phase.as_str()
                )));
            }
            job.cancel();
            Ok(job.clone())
        })??;
        self.usage.release();
        info!(job_id = %job_id, progress = cancelled.progress, "generation job cancelled");

        let sim = self.clone();
        let task_id = job_id.to_string();
        tokio::spawn(async move {
            sim.evict_after_retention(&task_id).await;
        });
        Ok(cancelled)
    }

    async fn run(self, job_id: String, request: GenerationRequest) {
        let total = PHASE_SCRIPT.len();
        let mut elapsed = Duration::ZERO;

        for (index, step) in PHASE_SCRIPT.iter().enumerate() {
            let delay = scaled_delay(step.delay, self.settings.delay_scale);
            tokio::time::sleep(delay).await;
            elapsed += delay;

            let progress = progress_after(index + 1, total);
            let completing = step.phase == Phase::Completed;
            // The cancelled flag is checked under the entry lock, so a cancel can't interleave
            // with a phase write.
            let advanced = if completing {
                let result = GenerationResult::build(
                    &request,
                    self.locator.locate(&request),
                    elapsed.as_millis() as u64,
                );
                self.store.update(&job_id, |job| {
                    if job.cancelled {
                        return false;
                    }
                    job.complete(step, result);
                    true
                })
            } else {
                self.store.update(&job_id, |job| {
                    if job.cancelled {
                        return false;
                    }
                    job.enter(step, progress);
                    true
                })
            };

            match advanced {
                Ok(true) => {
                    debug!(job_id = %job_id, phase = step.phase.as_str(), progress, "phase advanced")
                }
                // Cancelled: `cancel` owns the slot release and the eviction.
                Ok(false) => return,
                Err(_) => {
                    debug!(job_id = %job_id, "job evicted before its next phase");
                    return;
                }
            }

            if completing {
                let stats = self.usage.record_generation(request.char_count());
                info!(
                    job_id = %job_id,
                    total_generations = stats.total_generations,
                    generation_time_ms = elapsed.as_millis() as u64,
                    "generation job completed"
                );
            }
        }

        self.evict_after_retention(&job_id).await;
    }

    async fn evict_after_retention(&self, job_id: &str) {
        tokio::time::sleep(self.settings.retention).await;
        if self.store.remove(job_id).is_some() {
            debug!(job_id = %job_id, "job evicted after retention window");
        }
    }
}

/// `job_<epoch millis>_<9 lowercase alphanumerics>`
fn new_job_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!(
        "job_{}_{}",
        Utc::now().timestamp_millis(),
        suffix.to_ascii_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::UsageLimits;

    fn simulator() -> JobSimulator {
        JobSimulator::new(
            Arc::new(JobStore::new()),
            Arc::new(UsageTracker::ephemeral(UsageLimits::default())),
            Arc::new(VoiceCatalog::builtin()),
            SimulatorSettings::default(),
        )
    }

    #[test]
    fn job_ids_have_expected_shape() {
        let id = new_job_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "job");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_voice_is_rejected_without_a_job() {
        let sim = simulator();
        let err = sim
            .submit(GenerationRequest::new("Hello", "robot-xx-none"))
            .unwrap_err();
        assert!(matches!(err, DemoError::UnknownVoice(ref v) if v == "robot-xx-none"));
        assert!(sim.store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_job_stops_and_is_not_counted() {
        let sim = simulator();
        let receipt = sim
            .submit(GenerationRequest::new("Hello world", "sarah-us-female"))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1200)).await;
        let before = sim.status(&receipt.job_id).unwrap();
        assert_eq!(before.phase, Phase::Processing);
        assert_eq!(before.progress, 20);

        let cancelled = sim.cancel(&receipt.job_id).unwrap();
        assert_eq!(cancelled.phase, Phase::Cancelled);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let after = sim.status(&receipt.job_id).unwrap();
        assert_eq!(after.phase, Phase::Cancelled);
        assert_eq!(after.progress, 20);
        assert!(after.result.is_none());
        assert_eq!(sim.usage.stats().total_generations, 0);

        assert!(sim.cancel(&receipt.job_id).is_err());

        tokio::time::sleep(Duration::from_secs(40)).await;
        assert!(sim.status(&receipt.job_id).unwrap_err().is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_job_retention_starts_at_cancel() {
        let sim = simulator();
        let receipt = sim
            .submit(GenerationRequest::new("Hello world", "sarah-us-female"))
            .unwrap();

        // Between phase writes: the job task next wakes at 2.5s.
        tokio::time::sleep(Duration::from_millis(1200)).await;
        sim.cancel(&receipt.job_id).unwrap();

        tokio::time::sleep(Duration::from_millis(29_900)).await;
        assert!(sim.status(&receipt.job_id).is_ok());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(sim.status(&receipt.job_id).unwrap_err().is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_gives_the_slot_back() {
        let sim = JobSimulator::new(
            Arc::new(JobStore::new()),
            Arc::new(UsageTracker::ephemeral(UsageLimits {
                daily_generations: 1,
                ..Default::default()
            })),
            Arc::new(VoiceCatalog::builtin()),
            SimulatorSettings::default(),
        );
        let first = sim
            .submit(GenerationRequest::new("Hello", "sarah-us-female"))
            .unwrap();
        assert!(matches!(
            sim.submit(GenerationRequest::new("Hello", "sarah-us-female")),
            Err(DemoError::QuotaExceeded { limit: 1 })
        ));

        sim.cancel(&first.job_id).unwrap();
        assert_eq!(sim.usage.in_flight(), 0);
        let second = sim
            .submit(GenerationRequest::new("Hello", "sarah-us-female"))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(6000)).await;
        assert_eq!(sim.status(&second.job_id).unwrap().phase, Phase::Completed);
        assert_eq!(sim.usage.stats().total_generations, 1);
        assert_eq!(sim.usage.in_flight(), 0);
    }
}
