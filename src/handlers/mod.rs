//! HTTP handlers for the catalog routes.

pub mod entitlements;
pub mod products;
pub mod resources;

use crate::case::value_keys_to_snake_case;
use crate::error::AppError;
use axum::extract::Query;
use axum::http::Uri;
use serde::de::DeserializeOwned;
use serde_json::Value;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::BadRequest(format!("invalid id: {}", id_str)))
}

/// Decode the query string; malformed values are a 400 in the usual error envelope.
fn query_from<T: DeserializeOwned>(uri: &Uri) -> Result<T, AppError> {
    Query::<T>::try_from_uri(uri)
        .map(|Query(q)| q)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// Decode a request body whose keys may be camelCase or snake_case.
fn body_into<T: DeserializeOwned>(mut body: Value) -> Result<T, AppError> {
    if !body.is_object() {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    }
    value_keys_to_snake_case(&mut body);
    serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))
}
