//! OpenAPI document with component schemas for the catalog DTOs.

use crate::models::{
    CreateEntitlement, CreateProduct, CreateResource, Entitlement, Product, Resource,
    UpdateEntitlement, UpdateProduct, UpdateResource,
};
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Product services", description = "Products, entitlements and resources"),
    components(schemas(
        Product,
        CreateProduct,
        UpdateProduct,
        Entitlement,
        CreateEntitlement,
        UpdateEntitlement,
        Resource,
        CreateResource,
        UpdateResource
    )),
    tags((name = "products"), (name = "entitlements"), (name = "resources"))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// GET /api-docs/openapi.json
pub fn openapi_routes() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}
