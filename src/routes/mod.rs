//! Route tables and the assembled application router.

mod catalog;
mod common;
mod openapi;

pub use catalog::catalog_routes;
pub use common::common_routes;
pub use openapi::{openapi_routes, ApiDoc};

use crate::state::AppState;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

/// Prefix all catalog routes are nested under.
pub const API_PREFIX: &str = "/api/product-services";

/// Health/readiness/version at the root, catalog under [`API_PREFIX`], OpenAPI document.
pub fn app_router(state: AppState) -> Router {
    let body_limit = state.config.request_body_limit;
    let cors_enabled = state.config.cors_enabled;
    let router = Router::new()
        .merge(common_routes(state.clone()))
        .merge(openapi_routes())
        .nest(API_PREFIX, catalog_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit));
    if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
