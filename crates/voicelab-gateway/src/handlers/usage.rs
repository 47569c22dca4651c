use std::sync::Arc;

use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;
use voicelab_core::{RateLimitInfo, UpgradePrompt, UsageReport};

use super::AppState;
use crate::response::{rate_limit_headers, ApiResponse, NO_STORE};

#[derive(Debug, Serialize)]
pub struct UsageView {
    #[serde(flatten)]
    pub report: UsageReport,
    pub rate_limit: RateLimitInfo,
}

/// Usage counters, limits and tier, with the usage-limit upsell once the cap is hit.
pub async fn report(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state.service.usage();
    let rate_limit = state.service.rate_limit();
    let upgrade = UpgradePrompt::for_usage(&report.usage);
    (
        rate_limit_headers(&rate_limit),
        [(header::CACHE_CONTROL, NO_STORE)],
        Json(ApiResponse::ok(UsageView { report, rate_limit }).with_upgrade(upgrade)),
    )
}
