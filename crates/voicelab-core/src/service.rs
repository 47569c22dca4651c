//! The demo service: one per process, owning the catalog, job store, simulator and usage tracker.

use std::sync::Arc;

use serde::Serialize;

use crate::audio::AudioLocator;
use crate::config::DemoConfig;
use crate::error::{DemoError, DemoResult};
use crate::generation::{GenerationRequest, SubmitReceipt};
use crate::simulator::{JobSimulator, SimulatorSettings};
use crate::store::{Job, JobStore};
use crate::upgrade::{UpgradePrompt, UpgradeTrigger};
use crate::usage::{RateLimitInfo, UsageLimits, UsageReport, UsageTracker};
use crate::voices::{VoiceCatalog, VoiceFilters, VoiceListing};

/// Preview lookup result. Premium voices carry the voice-limit upsell.
#[derive(Debug, Clone, Serialize)]
pub struct VoicePreview {
    pub voice_id: String,
    pub preview_url: String,
    pub premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<UpgradePrompt>,
}

pub struct DemoService {
    catalog: Arc<VoiceCatalog>,
    store: Arc<JobStore>,
    usage: Arc<UsageTracker>,
    simulator: JobSimulator,
}

impl DemoService {
    /// Build the service, persisting usage under `config.storage_path`. If the store can't be
    /// opened the service still runs, with counters kept in memory only.
    pub fn new(config: DemoConfig) -> Self {
        let limits = limits_from(&config);
        let usage = match UsageTracker::open(&config.storage_path, limits) {
            Ok(tracker) => tracker,
            Err(e) => {
                tracing::warn!(
                    path = %config.storage_path,
                    error = %e,
                    "usage storage unavailable; counters will not survive a restart"
                );
                UsageTracker::ephemeral(limits)
            }
        };
        Self::with_usage(config, usage)
    }

    /// Build the service around an existing tracker.
    pub fn with_usage(config: DemoConfig, usage: UsageTracker) -> Self {
        let catalog = Arc::new(VoiceCatalog::builtin());
        let store = Arc::new(JobStore::new());
        let usage = Arc::new(usage);
        let simulator = JobSimulator::new(
            Arc::clone(&store),
            Arc::clone(&usage),
            Arc::clone(&catalog),
            SimulatorSettings::from(&config),
        );
        Self {
            catalog,
            store,
            usage,
            simulator,
        }
    }

    /// Service with in-memory counters.
    pub fn ephemeral(config: DemoConfig) -> Self {
        let usage = UsageTracker::ephemeral(limits_from(&config));
        Self::with_usage(config, usage)
    }

    pub fn with_locator(mut self, locator: Arc<dyn AudioLocator>) -> Self {
        self.simulator = self.simulator.with_locator(locator);
        self
    }

    pub fn voices(&self, filters: &VoiceFilters) -> VoiceListing {
        self.catalog.list(filters)
    }

    pub fn voice_preview(&self, voice_id: &str) -> VoicePreview {
        let premium = self.catalog.get(voice_id).is_some_and(|v| v.premium);
        VoicePreview {
            voice_id: voice_id.to_string(),
            preview_url: self.catalog.preview_url(voice_id),
            premium,
            upgrade: premium.then(|| UpgradePrompt::for_trigger(UpgradeTrigger::VoiceLimit)),
        }
    }

    pub fn submit(&self, request: GenerationRequest) -> DemoResult<SubmitReceipt> {
        self.simulator.submit(request)
    }

    pub fn status(&self, job_id: &str) -> DemoResult<Job> {
        self.simulator.status(job_id)
    }

    pub fn cancel(&self, job_id: &str) -> DemoResult<Job> {
        self.simulator.cancel(job_id)
    }

    pub fn usage(&self) -> UsageReport {
        self.usage.report()
    }

    pub fn rate_limit(&self) -> RateLimitInfo {
        self.usage.rate_limit_info()
    }

    /// Number of jobs currently held (live or within their retention window).
    pub fn active_jobs(&self) -> usize {
        self.store.len()
    }

    /// Reject ids that can't name a job before they reach the store.
    pub fn check_job_id(job_id: Option<&str>) -> DemoResult<&str> {
        match job_id.map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(DemoError::Validation("Job ID is required".to_string())),
        }
    }
}

fn limits_from(config: &DemoConfig) -> UsageLimits {
    UsageLimits {
        daily_characters: config.daily_characters,
        daily_generations: config.daily_generations,
        ..UsageLimits::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_preview_carries_upsell() {
        let service = DemoService::ephemeral(DemoConfig::default());
        let emma = service.voice_preview("emma-gb-female");
        assert!(emma.premium);
        assert_eq!(emma.preview_url, "/audio/previews/emma.mp3");
        assert!(emma.upgrade.is_some());

        let unknown = service.voice_preview("nobody");
        assert!(!unknown.premium);
        assert_eq!(unknown.preview_url, "/audio/previews/default.mp3");
        assert!(unknown.upgrade.is_none());
    }

    #[test]
    fn job_id_must_be_present() {
        assert!(DemoService::check_job_id(None).is_err());
        assert!(DemoService::check_job_id(Some("  ")).is_err());
        assert_eq!(DemoService::check_job_id(Some(" job_1 ")).unwrap(), "job_1");
    }

    #[test]
    fn unavailable_storage_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file in the way").unwrap();
        let config = DemoConfig {
            storage_path: blocker.join("usage").to_string_lossy().into_owned(),
            ..DemoConfig::default()
        };
        let service = DemoService::new(config);
        assert_eq!(service.usage().usage.total_generations, 0);
        assert!(!service.usage.is_persistent());
    }
}
