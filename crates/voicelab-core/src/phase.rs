//! Scripted generation phases.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle phase of a simulated generation job. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Processing,
    Analyzing,
    Synthesizing,
    Finalizing,
    Completed,
    Cancelled,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Processing => "processing",
            Phase::Analyzing => "analyzing",
            Phase::Synthesizing => "synthesizing",
            Phase::Finalizing => "finalizing",
            Phase::Completed => "completed",
            Phase::Cancelled => "cancelled",
        }
    }
}

/// One step of the script: after `delay` elapses the job enters `phase` with `message`.
#[derive(Debug, Clone, Copy)]
pub struct PhaseStep {
    pub phase: Phase,
    pub message: &'static str,
    pub delay: Duration,
}

pub const PHASE_SCRIPT: [PhaseStep; 5] = [
    PhaseStep {
        phase: Phase::Processing,
        message: "Processing your text...",
        delay: Duration::from_millis(1000),
    },
    PhaseStep {
        phase: Phase::Analyzing,
        message: "Analyzing speech patterns...",
        delay: Duration::from_millis(1500),
    },
    PhaseStep {
        phase: Phase::Synthesizing,
        message: "Synthesizing audio...",
        delay: Duration::from_millis(2000),
    },
    PhaseStep {
        phase: Phase::Finalizing,
        message: "Finalizing your audio...",
        delay: Duration::from_millis(800),
    },
    PhaseStep {
        phase: Phase::Completed,
        message: "Audio ready!",
        delay: Duration::from_millis(500),
    },
];

pub const CANCELLED_MESSAGE: &str = "Generation cancelled";

/// Remaining-time hint reported while a job is between phases.
pub const IN_FLIGHT_ESTIMATE_MS: u64 = 1000;

/// Progress after `completed` of `total` steps: `min(100, completed * 100 / total)`.
pub fn progress_after(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (completed.saturating_mul(100) / total).min(100) as u8
}

/// `delay * scale`, rounded to whole milliseconds.
pub fn scaled_delay(delay: Duration, scale: f64) -> Duration {
    let millis = (delay.as_millis() as f64 * scale).round();
    Duration::from_millis(if millis.is_finite() && millis > 0.0 { millis as u64 } else { 0 })
}

/// Wall time of the whole script at the given delay scale.
pub fn script_duration(scale: f64) -> Duration {
    PHASE_SCRIPT.iter().map(|s| scaled_delay(s.delay, scale)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_ends_in_completed_only() {
        let terminal: Vec<Phase> = PHASE_SCRIPT
            .iter()
            .map(|s| s.phase)
            .filter(|p| p.is_terminal())
            .collect();
        assert_eq!(terminal, [Phase::Completed]);
        assert_eq!(PHASE_SCRIPT.last().map(|s| s.phase), Some(Phase::Completed));
    }

    #[test]
    fn progress_reaches_100_on_last_step() {
        let total = PHASE_SCRIPT.len();
        let steps: Vec<u8> = (1..=total).map(|n| progress_after(n, total)).collect();
        assert_eq!(steps, [20, 40, 60, 80, 100]);
        assert_eq!(progress_after(0, total), 0);
        assert_eq!(progress_after(7, 3), 100);
    }

    #[test]
    fn script_duration_scales() {
        assert_eq!(script_duration(1.0), Duration::from_millis(5800));
        assert_eq!(script_duration(0.5), Duration::from_millis(2900));
        assert_eq!(script_duration(0.0), Duration::ZERO);
        assert_eq!(scaled_delay(Duration::from_millis(800), 0.1), Duration::from_millis(80));
    }

    #[test]
    fn phase_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::Synthesizing).unwrap(), "\"synthesizing\"");
        assert_eq!(Phase::Cancelled.as_str(), "cancelled");
    }
}
