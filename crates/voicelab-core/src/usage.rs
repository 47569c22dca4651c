//! Usage tracker: cross-session generation counters backed by a small sled store.
//! The counters live in memory; sled only makes them survive a restart.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DemoResult;

/// Key of the JSON blob inside the usage tree.
const USAGE_KEY: &str = "usage_stats";

const FREE_TIER_FEATURES: [&str; 3] = ["Basic voices", "Limited generations", "Standard quality"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_generations: u32,
    pub characters_used: u64,
    #[serde(default)]
    pub last_generation: Option<DateTime<Utc>>,
    /// Derived from `total_generations` whenever stats are read; stored values are ignored.
    #[serde(default)]
    pub daily_limit_reached: bool,
    #[serde(default)]
    pub premium_features_used: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLimits {
    pub daily_characters: u32,
    pub daily_generations: u32,
    pub concurrent_generations: u32,
}

impl Default for UsageLimits {
    fn default() -> Self {
        Self {
            daily_characters: crate::config::DEFAULT_DAILY_CHARACTERS,
            daily_generations: crate::config::DEFAULT_DAILY_GENERATIONS,
            concurrent_generations: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
}

#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub tier: SubscriptionTier,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub usage: UsageStats,
    pub limits: UsageLimits,
    pub subscription: Subscription,
}

/// Rate-limit bookkeeping for response headers. `reset` is ms since epoch of the next local
/// midnight; `retry_after` (seconds) is only present once nothing remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    pub reset: i64,
    pub retry_after: Option<i64>,
}

/// Saved counters plus the slots held by accepted jobs that haven't finished yet.
#[derive(Debug, Default)]
struct Counters {
    stats: UsageStats,
    reserved: u32,
}

impl Counters {
    fn committed(&self) -> u32 {
        self.stats.total_generations.saturating_add(self.reserved)
    }
}

pub struct UsageTracker {
    db: Option<sled::Db>,
    counters: Mutex<Counters>,
    limits: UsageLimits,
}

impl UsageTracker {
    /// Open (or create) the usage store at `path` and load any saved counters.
    pub fn open(path: impl AsRef<Path>, limits: UsageLimits) -> DemoResult<Self> {
        let db = sled::open(path.as_ref())?;
        let stats = load_stats(&db);
        tracing::info!(
            path = %path.as_ref().display(),
            total_generations = stats.total_generations,
            "usage tracker opened"
        );
        Ok(Self {
            db: Some(db),
            counters: Mutex::new(Counters { stats, reserved: 0 }),
            limits,
        })
    }

    /// Counters that live for this process only.
    pub fn ephemeral(limits: UsageLimits) -> Self {
        Self {
            db: None,
            counters: Mutex::new(Counters::default()),
            limits,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.db.is_some()
    }

    pub fn limits(&self) -> UsageLimits {
        self.limits
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Hold one generation slot for an accepted job. Fails, holding nothing, once completed
    /// plus held generations reach the daily cap.
    pub fn try_reserve(&self) -> bool {
        let mut counters = self.lock();
        if counters.committed() >= self.limits.daily_generations {
            return false;
        }
        counters.reserved += 1;
        true
    }

    /// Give back a slot taken by [`try_reserve`](Self::try_reserve) for a job that won't complete.
    pub fn release(&self) {
        let mut counters = self.lock();
        counters.reserved = counters.reserved.saturating_sub(1);
    }

    /// Count one completed generation of `char_count` characters and persist. Consumes the
    /// job's held slot, if any.
    pub fn record_generation(&self, char_count: usize) -> UsageStats {
        let snapshot = {
            let mut counters = self.lock();
            counters.reserved = counters.reserved.saturating_sub(1);
            let stats = &mut counters.stats;
            stats.total_generations = stats.total_generations.saturating_add(1);
            stats.characters_used = stats.characters_used.saturating_add(char_count as u64);
            stats.last_generation = Some(Utc::now());
            stats.daily_limit_reached = stats.total_generations >= self.limits.daily_generations;
            stats.clone()
        };
        self.persist(&snapshot);
        snapshot
    }

    /// Failures are logged and swallowed; the in-memory counters stay authoritative.
    fn persist(&self, stats: &UsageStats) {
        let Some(db) = &self.db else {
            return;
        };
        let saved = serde_json::to_vec(stats)
            .map_err(|e| e.to_string())
            .and_then(|bytes| db.insert(USAGE_KEY, bytes).map_err(|e| e.to_string()))
            .and_then(|_| db.flush().map_err(|e| e.to_string()));
        if let Err(e) = saved {
            tracing::warn!(error = %e, "failed to persist usage stats; counters kept in memory");
        }
    }

    pub fn stats(&self) -> UsageStats {
        let mut stats = self.lock().stats.clone();
        stats.daily_limit_reached = stats.total_generations >= self.limits.daily_generations;
        stats
    }

    /// True once completed plus in-flight generations reach the daily cap.
    pub fn is_over_limit(&self) -> bool {
        self.lock().committed() >= self.limits.daily_generations
    }

    /// Generations still available today, not counting slots held by running jobs.
    pub fn remaining(&self) -> u32 {
        self.limits
            .daily_generations
            .saturating_sub(self.lock().committed())
    }

    /// Accepted jobs that have neither completed nor been cancelled.
    pub fn in_flight(&self) -> u32 {
        self.lock().reserved
    }

    pub fn rate_limit_info(&self) -> RateLimitInfo {
        let remaining = self.remaining();
        let now = Local::now();
        let reset = next_local_midnight(now);
        let reset_ms = reset.timestamp_millis();
        let retry_after = (remaining == 0).then(|| {
            let ms = (reset_ms - now.timestamp_millis()).max(0);
            (ms + 999) / 1000
        });
        RateLimitInfo {
            limit: self.limits.daily_generations,
            remaining,
            reset: reset_ms,
            retry_after,
        }
    }

    pub fn report(&self) -> UsageReport {
        UsageReport {
            usage: self.stats(),
            limits: self.limits,
            subscription: Subscription {
                tier: SubscriptionTier::Free,
                features: FREE_TIER_FEATURES.iter().map(|f| f.to_string()).collect(),
            },
        }
    }
}

/// Saved counters, or zeroes when nothing is stored or the blob doesn't parse.
fn load_stats(db: &sled::Db) -> UsageStats {
    match db.get(USAGE_KEY) {
        Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable usage stats");
            UsageStats::default()
        }),
        Ok(None) => UsageStats::default(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read usage stats");
            UsageStats::default()
        }
    }
}

fn next_local_midnight(now: DateTime<Local>) -> DateTime<Local> {
    now.date_naive()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .unwrap_or_else(|| now + ChronoDuration::hours(24))
}
