//! Typed rows, nested views and request DTOs for the catalog entities.

mod entitlement;
mod product;
mod resource;

pub use entitlement::*;
pub use product::*;
pub use resource::*;

use crate::error::AppError;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Flatten a change DTO into column -> value attributes, dropping unset (skipped) fields.
pub fn to_attributes<T: Serialize>(dto: &T) -> Result<HashMap<String, Value>, AppError> {
    match serde_json::to_value(dto).map_err(|e| AppError::BadRequest(e.to_string()))? {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}
