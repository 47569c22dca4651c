//! Error types for the VoiceLab demo service

use thiserror::Error;

/// Result type alias for demo service operations
pub type DemoResult<T> = Result<T, DemoError>;

/// Errors surfaced by the demo service. Every variant is terminal for the call that raised it.
#[derive(Error, Debug)]
pub enum DemoError {
    #[error("{0}")]
    Validation(String),

    #[error("Text exceeds maximum length of {max} characters for demo (got {len})")]
    TextTooLong { len: usize, max: usize },

    #[error("Daily limit of {limit} generations reached. Upgrade to Pro for unlimited generations.")]
    QuotaExceeded { limit: u32 },

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Generation job not found or expired: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DemoError {
    /// True for errors caused by the caller's input or quota (reported as 400).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DemoError::Validation(_)
                | DemoError::TextTooLong { .. }
                | DemoError::QuotaExceeded { .. }
                | DemoError::UnknownVoice(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DemoError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_client_errors() {
        assert!(DemoError::Validation("Text is required".into()).is_client_error());
        assert!(DemoError::TextTooLong { len: 501, max: 500 }.is_client_error());
        assert!(DemoError::QuotaExceeded { limit: 5 }.is_client_error());
        assert!(!DemoError::NotFound("job_1".into()).is_client_error());
        assert!(DemoError::NotFound("job_1".into()).is_not_found());
        assert!(!DemoError::Internal("boom".into()).is_client_error());
    }

    #[test]
    fn text_too_long_message_names_the_cap() {
        let msg = DemoError::TextTooLong { len: 600, max: 500 }.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("600"));
    }
}
