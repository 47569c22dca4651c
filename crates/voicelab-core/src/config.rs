//! Demo configuration loaded from file and environment.
//!
//! | Key | Env | Default | Description |
//! |-----|-----|---------|-------------|
//! | host | VOICELAB_HOST | 127.0.0.1 | Gateway bind host. |
//! | port | VOICELAB_PORT | 8010 | Gateway bind port. |
//! | storage_path | VOICELAB_STORAGE_PATH | ./data/voicelab_usage | Sled directory for usage counters. |
//! | max_characters | VOICELAB_MAX_CHARACTERS | 500 | Demo text cap per request. |
//! | daily_generations | VOICELAB_DAILY_GENERATIONS | 5 | Completed generations before the quota trips. |
//! | daily_characters | VOICELAB_DAILY_CHARACTERS | 2500 | Advertised character allowance (reported only). |
//! | retention_secs | VOICELAB_RETENTION_SECS | 30 | How long a finished job stays queryable. |
//! | phase_delay_scale | VOICELAB_PHASE_DELAY_SCALE | 1.0 | Multiplier applied to every scripted phase delay. |

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MAX_CHARACTERS: usize = 500;
pub const DEFAULT_DAILY_GENERATIONS: u32 = 5;
pub const DEFAULT_DAILY_CHARACTERS: u32 = 2500;
pub const DEFAULT_RETENTION_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    pub host: String,
    pub port: u16,
    pub storage_path: String,
    pub max_characters: usize,
    pub daily_generations: u32,
    pub daily_characters: u32,
    pub retention_secs: u64,
    pub phase_delay_scale: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8010,
            storage_path: "./data/voicelab_usage".to_string(),
            max_characters: DEFAULT_MAX_CHARACTERS,
            daily_generations: DEFAULT_DAILY_GENERATIONS,
            daily_characters: DEFAULT_DAILY_CHARACTERS,
            retention_secs: DEFAULT_RETENTION_SECS,
            phase_delay_scale: 1.0,
        }
    }
}

impl DemoConfig {
    /// Load config from file and environment. Precedence: env `VOICELAB_*` > `VOICELAB_CONFIG` file
    /// (default `config/voicelab.toml`, optional) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("VOICELAB_CONFIG").unwrap_or_else(|_| "config/voicelab".to_string());
        let defaults = Self::default();
        let built = config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("storage_path", defaults.storage_path)?
            .set_default("max_characters", defaults.max_characters as i64)?
            .set_default("daily_generations", i64::from(defaults.daily_generations))?
            .set_default("daily_characters", i64::from(defaults.daily_characters))?
            .set_default("retention_secs", defaults.retention_secs as i64)?
            .set_default("phase_delay_scale", defaults.phase_delay_scale)?
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(
                config::Environment::with_prefix("VOICELAB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        built.try_deserialize()
    }

    /// `host:port` for the gateway listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    /// Delay multiplier, clamped to a usable value. Negative or non-finite input falls back to 1.0.
    pub fn delay_scale(&self) -> f64 {
        if self.phase_delay_scale.is_finite() && self.phase_delay_scale >= 0.0 {
            self.phase_delay_scale
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_limits() {
        let cfg = DemoConfig::default();
        assert_eq!(cfg.max_characters, 500);
        assert_eq!(cfg.daily_generations, 5);
        assert_eq!(cfg.retention(), Duration::from_secs(30));
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8010");
    }

    #[test]
    fn bad_delay_scale_falls_back() {
        let mut cfg = DemoConfig::default();
        cfg.phase_delay_scale = -2.0;
        assert_eq!(cfg.delay_scale(), 1.0);
        cfg.phase_delay_scale = f64::NAN;
        assert_eq!(cfg.delay_scale(), 1.0);
        cfg.phase_delay_scale = 0.25;
        assert_eq!(cfg.delay_scale(), 0.25);
    }

    #[test]
    fn load_layers_env_over_file_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("voicelab.toml");
        std::fs::write(&file, "port = 9000\ndaily_generations = 7\nretention_secs = 12\n").unwrap();

        // Only this test touches VOICELAB_* variables.
        std::env::set_var("VOICELAB_CONFIG", &file);
        std::env::set_var("VOICELAB_DAILY_GENERATIONS", "3");
        std::env::set_var("VOICELAB_PHASE_DELAY_SCALE", "0.5");
        let loaded = DemoConfig::load();
        std::env::remove_var("VOICELAB_CONFIG");
        std::env::remove_var("VOICELAB_DAILY_GENERATIONS");
        std::env::remove_var("VOICELAB_PHASE_DELAY_SCALE");

        let cfg = loaded.unwrap();
        assert_eq!(cfg.daily_generations, 3);
        assert_eq!(cfg.phase_delay_scale, 0.5);
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.retention_secs, 12);
        assert_eq!(cfg.max_characters, 500);
        assert_eq!(cfg.host, "127.0.0.1");
    }
}
