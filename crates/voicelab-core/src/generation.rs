//! Generation requests, results and submission receipts.

use crate::audio;
use crate::error::{DemoError, DemoResult};
use crate::voices::Language;
use serde::{Deserialize, Serialize};

pub const MIN_SPEED: f32 = 0.5;
pub const MAX_SPEED: f32 = 2.0;
pub const DEFAULT_SPEED: f32 = 1.0;

/// Reported queue position. The demo has no real queue.
pub const QUEUE_POSITION: u32 = 1;

/// Lower bound for the up-front time estimate, in milliseconds.
pub const MIN_ESTIMATE_MS: u64 = 3000;

/// Canned texts offered to visitors who don't want to type.
pub const SAMPLE_TEXTS: [&str; 5] = [
    "Welcome to VoiceLab, where cutting-edge AI meets exceptional audio quality.",
    "In the enchanted realm of Lirathen, where the rivers shimmered with golden light, and the mountains sang with the voices of the ancients, there lived a phoenix named Solvinar.",
    "The future of communication lies in the seamless integration of natural language processing and voice synthesis technology.",
    "Once upon a time, in a galaxy far, far away, brave explorers discovered new worlds filled with wonder and mystery.",
    "Transform your content with our revolutionary text-to-speech platform, designed for creators, educators, and businesses worldwide.",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Excited,
    Calm,
    Dramatic,
}

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

/// A visitor's submission. Missing fields deserialize to empty/default values so that
/// validation, not deserialization, reports what is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub voice_id: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default)]
    pub emotion: Emotion,
    #[serde(default)]
    pub language: Language,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            speed: DEFAULT_SPEED,
            emotion: Emotion::default(),
            language: Language::default(),
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Length in characters (Unicode scalar values).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Input checks: non-blank text, a voice id, text within `max_characters`, speed in range.
    pub fn validate(&self, max_characters: usize) -> DemoResult<()> {
        if self.text.trim().is_empty() {
            return Err(DemoError::Validation("Text is required".to_string()));
        }
        if self.voice_id.trim().is_empty() {
            return Err(DemoError::Validation("Voice ID is required".to_string()));
        }
        let len = self.char_count();
        if len > max_characters {
            return Err(DemoError::TextTooLong {
                len,
                max: max_characters,
            });
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(DemoError::Validation(format!(
                "Speed must be between {} and {}",
                MIN_SPEED, MAX_SPEED
            )));
        }
        Ok(())
    }

    /// Up-front estimate: `max(3000, chars * 10)` milliseconds.
    pub fn estimated_time_ms(&self) -> u64 {
        (self.char_count() as u64 * 10).max(MIN_ESTIMATE_MS)
    }
}

/// Returned by a successful submission; the job runs on in the background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub job_id: String,
    pub estimated_time: u64,
    pub queue_position: u32,
}

/// Outcome of a completed job. Built once, at completion, and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub audio_url: String,
    /// Seconds, at 150 words per minute.
    pub duration: u32,
    pub text_length: usize,
    pub voice_used: String,
    /// Milliseconds spent in the scripted phases.
    pub generation_time: u64,
    /// Kilobytes.
    pub file_size: u64,
}

impl GenerationResult {
    pub fn build(request: &GenerationRequest, audio_url: String, generation_time_ms: u64) -> Self {
        let text_length = request.char_count();
        Self {
            audio_url,
            duration: audio::estimate_duration_secs(&request.text),
            text_length,
            voice_used: request.voice_id.clone(),
            generation_time: generation_time_ms,
            file_size: audio::estimate_file_size_kb(text_length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fail_validation_not_parsing() {
        let req: GenerationRequest = serde_json::from_str(r#"{"voice_id":"sarah-us-female"}"#).unwrap();
        assert_eq!(req.speed, DEFAULT_SPEED);
        assert_eq!(req.emotion, Emotion::Neutral);
        assert_eq!(req.language, Language::EnUs);
        let err = req.validate(500).unwrap_err();
        assert_eq!(err.to_string(), "Text is required");

        let req = GenerationRequest::new("Hello", "  ");
        assert_eq!(req.validate(500).unwrap_err().to_string(), "Voice ID is required");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let text = "é".repeat(500);
        let req = GenerationRequest::new(text, "sarah-us-female");
        assert_eq!(req.char_count(), 500);
        assert!(req.validate(500).is_ok());

        let req = GenerationRequest::new("a".repeat(501), "sarah-us-female");
        match req.validate(500) {
            Err(DemoError::TextTooLong { len, max }) => {
                assert_eq!(len, 501);
                assert_eq!(max, 500);
            }
            other => panic!("expected TextTooLong, got {:?}", other),
        }
    }

    #[test]
    fn speed_must_be_in_range() {
        let base = GenerationRequest::new("Hello", "sarah-us-female");
        assert!(base.clone().with_speed(0.5).validate(500).is_ok());
        assert!(base.clone().with_speed(2.0).validate(500).is_ok());
        assert!(base.clone().with_speed(2.1).validate(500).is_err());
        assert!(base.with_speed(f32::NAN).validate(500).is_err());
    }

    #[test]
    fn estimate_has_a_floor() {
        assert_eq!(GenerationRequest::new("Hi", "v").estimated_time_ms(), 3000);
        assert_eq!(
            GenerationRequest::new("a".repeat(450), "v").estimated_time_ms(),
            4500
        );
    }

    #[test]
    fn result_echoes_request() {
        let req = GenerationRequest::new("Hello world", "sarah-us-female");
        let result = GenerationResult::build(&req, "/audio/samples/sample1.mp3".into(), 5800);
        assert_eq!(result.text_length, 11);
        assert_eq!(result.voice_used, "sarah-us-female");
        assert_eq!(result.duration, 1);
        assert_eq!(result.file_size, 9);
        assert_eq!(result.generation_time, 5800);
    }
}
