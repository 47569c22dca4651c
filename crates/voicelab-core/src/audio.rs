//! Audio estimates, display formatting, and the strategy that picks a canned clip for a result.

use crate::generation::GenerationRequest;
use rand::seq::SliceRandom;

pub const WORDS_PER_MINUTE: u64 = 150;

pub const SAMPLE_AUDIO: [&str; 3] = [
    "/audio/samples/sample1.mp3",
    "/audio/samples/sample2.mp3",
    "/audio/samples/sample3.mp3",
];

/// Whitespace-separated words; blank text still counts as one word.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count().max(1)
}

/// Spoken duration in whole seconds: `ceil(words / 150 * 60)`.
pub fn estimate_duration_secs(text: &str) -> u32 {
    let words = word_count(text) as u64;
    (words * 60).div_ceil(WORDS_PER_MINUTE) as u32
}

/// Rough encoded size: `ceil(0.8 * chars)` kilobytes.
pub fn estimate_file_size_kb(chars: usize) -> u64 {
    (chars as u64 * 4).div_ceil(5)
}

/// `m:ss`
pub fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Human-readable byte count with one decimal, trailing `.0` dropped (`1536` -> `1.5 KB`).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}

/// Picks the audio locator for a completed job.
pub trait AudioLocator: Send + Sync {
    fn locate(&self, request: &GenerationRequest) -> String;
}

/// Uniformly random pick from [`SAMPLE_AUDIO`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSampleAudio;

impl AudioLocator for RandomSampleAudio {
    fn locate(&self, _request: &GenerationRequest) -> String {
        SAMPLE_AUDIO
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(SAMPLE_AUDIO[0])
            .to_string()
    }
}

/// Always returns the same locator.
#[derive(Debug, Clone)]
pub struct FixedAudio(pub String);

impl AudioLocator for FixedAudio {
    fn locate(&self, _request: &GenerationRequest) -> String {
        self.0.clone()
    }
}
