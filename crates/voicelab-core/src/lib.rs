//! VoiceLab demo core library.
//! Voice catalog, simulated generation jobs, the job status store and usage gating.
//! No real synthesis happens anywhere in here: jobs walk a fixed phase script and finish
//! with a canned audio locator.

pub mod audio;
pub mod config;
pub mod error;
pub mod generation;
pub mod phase;
pub mod service;
pub mod simulator;
pub mod store;
pub mod upgrade;
pub mod usage;
pub mod voices;

pub use audio::{AudioLocator, FixedAudio, RandomSampleAudio};
pub use config::DemoConfig;
pub use error::{DemoError, DemoResult};
pub use generation::{Emotion, GenerationRequest, GenerationResult, SubmitReceipt, SAMPLE_TEXTS};
pub use phase::{Phase, PHASE_SCRIPT};
pub use service::{DemoService, VoicePreview};
pub use simulator::{JobSimulator, SimulatorSettings};
pub use store::{Job, JobStore};
pub use upgrade::{UpgradePrompt, UpgradeTrigger};
pub use usage::{RateLimitInfo, UsageLimits, UsageReport, UsageStats, UsageTracker};
pub use voices::{Language, Voice, VoiceCatalog, VoiceFilters, VoiceGender, VoiceListing};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
