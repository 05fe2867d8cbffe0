use super::{body_into, parse_id};
use crate::error::AppError;
use crate::extractors::PagingRequest;
use crate::models::{CreateEntitlement, UpdateEntitlement};
use crate::response::{success_created, success_one, success_page, success_related};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

pub async fn list(
    State(state): State<AppState>,
    PagingRequest(paging): PagingRequest,
) -> Result<impl IntoResponse, AppError> {
    let page = state.entitlements.list(paging).await?;
    success_page(&page, paging)
}

pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let row = state.entitlements.get(parse_id(&id)?).await?;
    success_one(&row)
}

/// GET /products/entitlements/:id/resources
pub async fn resources(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let page = state.entitlements.resources(parse_id(&id)?).await?;
    success_related(&page)
}

pub async fn create(State(state): State<AppState>, Json(body): Json<Value>) -> Result<impl IntoResponse, AppError> {
    let dto: CreateEntitlement = body_into(body)?;
    let row = state.entitlements.create(&dto).await?;
    success_created(&row)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let dto: UpdateEntitlement = body_into(body)?;
    let row = state.entitlements.update(id, &dto).await?;
    success_one(&row)
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    state.entitlements.delete(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
