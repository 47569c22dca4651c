use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use voicelab_core::{DemoError, DemoResult, Language, VoiceFilters, VoiceGender};

use super::AppState;
use crate::response::{ApiError, ApiResponse, PUBLIC_FIVE_MINUTES};

/// Raw query string filters. Empty values mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct VoiceQuery {
    pub gender: Option<String>,
    pub language: Option<String>,
    pub premium: Option<String>,
}

impl VoiceQuery {
    pub fn into_filters(self) -> DemoResult<VoiceFilters> {
        let gender = match non_empty(self.gender) {
            Some(g) => Some(g.parse::<VoiceGender>().map_err(DemoError::Validation)?),
            None => None,
        };
        let language = match non_empty(self.language) {
            Some(l) => Some(l.parse::<Language>().map_err(DemoError::Validation)?),
            None => None,
        };
        let premium = non_empty(self.premium).map(|p| p.eq_ignore_ascii_case("true"));
        Ok(VoiceFilters {
            gender,
            language,
            premium,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VoiceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filters = query.into_filters()?;
    let listing = state.service.voices(&filters);
    Ok((
        [(header::CACHE_CONTROL, PUBLIC_FIVE_MINUTES)],
        Json(ApiResponse::ok(listing)),
    ))
}

pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(voice_id): Path<String>,
) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, PUBLIC_FIVE_MINUTES)],
        Json(ApiResponse::ok(state.service.voice_preview(&voice_id))),
    )
}
