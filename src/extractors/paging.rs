//! Paging window from `?offset=&limit=`, clamped to the configured maximum limit.

use crate::error::AppError;
use crate::paging::Paging;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

#[derive(Deserialize)]
struct PagingParams {
    offset: Option<String>,
    limit: Option<String>,
}

/// Extractor for the paging window. Values that are missing, non-numeric or non-positive fall
/// back to offset 0 and the configured max limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagingRequest(pub Paging);

fn lenient(v: Option<String>) -> Option<i64> {
    v.and_then(|s| s.trim().parse().ok())
}

#[async_trait]
impl FromRequestParts<AppState> for PagingRequest {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PagingParams>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(PagingRequest(Paging::new(
            lenient(params.offset),
            lenient(params.limit),
            state.config.paging_max_limit,
        )))
    }
}
