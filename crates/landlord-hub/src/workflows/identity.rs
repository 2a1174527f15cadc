use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::requests::domain::MemberId;

/// Header carrying the authenticated member id. Session handling happens upstream.
pub const MEMBER_HEADER: &str = "x-member-id";

pub(crate) fn current_member(headers: &HeaderMap) -> Result<MemberId, Response> {
    headers
        .get(MEMBER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| MemberId(value.to_string()))
        .ok_or_else(|| {
            let payload = json!({ "error": format!("missing {MEMBER_HEADER} header") });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })
}
