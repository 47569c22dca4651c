//! Upsell prompts shown when a visitor runs into a demo limit.

use crate::error::DemoError;
use crate::usage::UsageStats;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeTrigger {
    VoiceLimit,
    UsageLimit,
    CharacterLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradePrompt {
    pub trigger: UpgradeTrigger,
    pub title: &'static str,
    pub message: &'static str,
    pub cta: &'static str,
}

impl UpgradePrompt {
    pub fn for_trigger(trigger: UpgradeTrigger) -> Self {
        let (title, message, cta) = match trigger {
            UpgradeTrigger::VoiceLimit => (
                "Unlock Premium Voices",
                "Access 50+ professional voices with different accents and styles.",
                "Upgrade Now",
            ),
            UpgradeTrigger::UsageLimit => (
                "You've reached your daily limit",
                "Upgrade to Pro for unlimited generations and longer text support.",
                "Go Premium",
            ),
            UpgradeTrigger::CharacterLimit => (
                "Need more characters?",
                "Pro users can generate audio from texts up to 10,000 characters.",
                "Upgrade Today",
            ),
        };
        Self {
            trigger,
            title,
            message,
            cta,
        }
    }

    /// Prompt matching a rejected submission, if the rejection is a demo limit.
    pub fn for_error(err: &DemoError) -> Option<Self> {
        match err {
            DemoError::QuotaExceeded { .. } => Some(Self::for_trigger(UpgradeTrigger::UsageLimit)),
            DemoError::TextTooLong { .. } => Some(Self::for_trigger(UpgradeTrigger::CharacterLimit)),
            _ => None,
        }
    }

    /// Prompt to show alongside usage stats: only once the daily cap is reached.
    pub fn for_usage(stats: &UsageStats) -> Option<Self> {
        stats
            .daily_limit_reached
            .then(|| Self::for_trigger(UpgradeTrigger::UsageLimit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_errors_map_to_prompts() {
        let quota = UpgradePrompt::for_error(&DemoError::QuotaExceeded { limit: 5 }).unwrap();
        assert_eq!(quota.trigger, UpgradeTrigger::UsageLimit);
        let chars = UpgradePrompt::for_error(&DemoError::TextTooLong { len: 600, max: 500 }).unwrap();
        assert_eq!(chars.cta, "Upgrade Today");
        assert!(UpgradePrompt::for_error(&DemoError::NotFound("job".into())).is_none());
    }

    #[test]
    fn usage_prompt_waits_for_the_cap() {
        let mut stats = UsageStats::default();
        assert!(UpgradePrompt::for_usage(&stats).is_none());
        stats.daily_limit_reached = true;
        assert_eq!(
            UpgradePrompt::for_usage(&stats).map(|p| p.trigger),
            Some(UpgradeTrigger::UsageLimit)
        );
    }
}
