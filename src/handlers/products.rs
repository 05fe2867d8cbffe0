use super::{body_into, parse_id, query_from};
use crate::error::AppError;
use crate::extractors::PagingRequest;
use crate::freshness::{http_date, max_timestamp, max_timestamp_of};
use crate::models::{CreateProduct, ProductQuery, UpdateProduct};
use crate::response::{success_created, success_one, success_page, success_related};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

const UPDATED_AT: &str = "updated_at";

fn last_modified(at: Option<DateTime<Utc>>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(value) = at.and_then(|t| HeaderValue::from_str(&http_date(t)).ok()) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    headers
}

/// GET /products?region=&withEntitlements=&withResources=&offset=&limit=
///
/// `id` is not a list filter; use `/products/:id`.
pub async fn list(
    State(state): State<AppState>,
    uri: Uri,
    PagingRequest(paging): PagingRequest,
) -> Result<impl IntoResponse, AppError> {
    let query: ProductQuery = query_from(&uri)?;
    let page = state.products.list(&query, paging).await?;
    let headers = last_modified(max_timestamp_of(&page.items, UPDATED_AT));
    Ok((headers, success_page(&page, paging)?))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let query: ProductQuery = query_from(&uri)?;
    let item = state.products.get(id, &query).await?;
    let headers = last_modified(max_timestamp(&item, UPDATED_AT));
    Ok((headers, success_one(&item)?))
}

/// GET /products/:id/entitlements
pub async fn entitlements(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let page = state.products.entitlements(parse_id(&id)?).await?;
    success_related(&page)
}

pub async fn create(State(state): State<AppState>, Json(body): Json<Value>) -> Result<impl IntoResponse, AppError> {
    let dto: CreateProduct = body_into(body)?;
    let row = state.products.create(&dto).await?;
    success_created(&row)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let dto: UpdateProduct = body_into(body)?;
    let row = state.products.update(id, &dto).await?;
    success_one(&row)
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    state.products.delete(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
