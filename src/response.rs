//! Standard response envelope helpers. Payload keys go out in camelCase.

use crate::case::value_keys_to_camel_case_recursive;
use crate::error::AppError;
use crate::paging::{Paged, Paging};
use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// `count` is the total number of matching roots, not the length of `data`.
#[derive(Serialize)]
pub struct PageMeta {
    pub count: i64,
    pub offset: i64,
    pub limit: i64,
}

fn camel<T: Serialize>(data: &T) -> Result<Value, AppError> {
    let mut value = serde_json::to_value(data).map_err(|e| AppError::Configuration(e.to_string()))?;
    value_keys_to_camel_case_recursive(&mut value);
    Ok(value)
}

pub fn success_one<T: Serialize>(data: &T) -> Result<(StatusCode, Json<SuccessOne<Value>>), AppError> {
    Ok((StatusCode::OK, Json(SuccessOne { data: camel(data)? })))
}

pub fn success_created<T: Serialize>(data: &T) -> Result<(StatusCode, Json<SuccessOne<Value>>), AppError> {
    Ok((StatusCode::CREATED, Json(SuccessOne { data: camel(data)? })))
}

pub fn success_page<T: Serialize>(
    page: &Paged<T>,
    paging: Paging,
) -> Result<(StatusCode, Json<SuccessMany<Value>>), AppError> {
    let data = page.items.iter().map(camel).collect::<Result<Vec<_>, _>>()?;
    Ok((
        StatusCode::OK,
        Json(SuccessMany {
            data,
            meta: PageMeta {
                count: page.count,
                offset: paging.offset,
                limit: paging.limit,
            },
        }),
    ))
}

/// Related-entity lists are not windowed: offset 0, limit equal to the count.
pub fn success_related<T: Serialize>(page: &Paged<T>) -> Result<(StatusCode, Json<SuccessMany<Value>>), AppError> {
    success_page(page, Paging { offset: 0, limit: page.count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_envelope_carries_total_count_and_camel_keys() {
        let page = Paged::new(vec![json!({"region_ids": [1], "entitlements": [{"updated_at": "x"}]})], 12);
        let (status, Json(body)) = success_page(&page, Paging { offset: 5, limit: 1 }).unwrap();
        assert_eq!(status, StatusCode::OK);
        let body = serde_json::to_value(body).unwrap();
        assert_eq!(
            body,
            json!({
                "data": [{"regionIds": [1], "entitlements": [{"updatedAt": "x"}]}],
                "meta": {"count": 12, "offset": 5, "limit": 1}
            })
        );
    }
}
