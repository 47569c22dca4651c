//! JSON envelope shared by every endpoint, plus DemoError -> HTTP mapping.

use axum::{
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use voicelab_core::{DemoError, RateLimitInfo, UpgradePrompt};

pub const NO_STORE: &str = "no-cache, no-store, must-revalidate";
pub const PUBLIC_FIVE_MINUTES: &str = "public, max-age=300";

const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
const RATE_LIMIT_RETRY_AFTER: &str = "x-ratelimit-retry-after";

/// `{success, data?, error?, upgrade?, timestamp}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<UpgradePrompt>,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            upgrade: None,
            timestamp: timestamp(),
        }
    }

    pub fn with_upgrade(mut self, upgrade: Option<UpgradePrompt>) -> Self {
        self.upgrade = upgrade;
        self
    }
}

impl ApiResponse<()> {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            upgrade: None,
            timestamp: timestamp(),
        }
    }
}

pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Handler error. Client errors keep their message; anything unexpected is logged and
/// reported as a generic 500.
#[derive(Debug)]
pub struct ApiError(pub DemoError);

impl From<DemoError> for ApiError {
    fn from(err: DemoError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if self.0.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        let body = ApiResponse::failure(message).with_upgrade(UpgradePrompt::for_error(&self.0));
        (status, Json(body)).into_response()
    }
}

/// `X-RateLimit-*` headers; `Retry-After` only once the allowance is used up.
pub fn rate_limit_headers(info: &RateLimitInfo) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(RATE_LIMIT_LIMIT), HeaderValue::from(info.limit));
    headers.insert(HeaderName::from_static(RATE_LIMIT_REMAINING), HeaderValue::from(info.remaining));
    headers.insert(HeaderName::from_static(RATE_LIMIT_RESET), HeaderValue::from(info.reset));
    if let Some(retry_after) = info.retry_after {
        headers.insert(HeaderName::from_static(RATE_LIMIT_RETRY_AFTER), HeaderValue::from(retry_after));
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_details() {
        let err = ApiError(DemoError::Internal("sled exploded".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError(DemoError::NotFound("job_1".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(DemoError::QuotaExceeded { limit: 5 }).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn retry_after_header_is_optional() {
        let open = rate_limit_headers(&RateLimitInfo {
            limit: 5,
            remaining: 3,
            reset: 1_700_000_000_000,
            retry_after: None,
        });
        assert_eq!(open.get("x-ratelimit-remaining").unwrap(), "3");
        assert!(open.get("x-ratelimit-retry-after").is_none());

        let exhausted = rate_limit_headers(&RateLimitInfo {
            limit: 5,
            remaining: 0,
            reset: 1_700_000_000_000,
            retry_after: Some(120),
        });
        assert_eq!(exhausted.get("x-ratelimit-retry-after").unwrap(), "120");
        assert_eq!(exhausted.get("x-ratelimit-reset").unwrap(), "1700000000000");
    }
}
