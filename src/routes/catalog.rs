//! Product, entitlement and resource routes.
//! `/products/entitlements` is a static segment and takes precedence over `/products/:id`.

use crate::handlers::{entitlements, products, resources};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn catalog_routes(state: AppState) -> Router {
    Router::new()
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/entitlements",
            get(entitlements::list).post(entitlements::create),
        )
        .route(
            "/products/entitlements/:id",
            get(entitlements::read)
                .put(entitlements::update)
                .delete(entitlements::delete),
        )
        .route("/products/entitlements/:id/resources", get(entitlements::resources))
        .route(
            "/products/:id",
            get(products::read).put(products::update).delete(products::delete),
        )
        .route("/products/:id/entitlements", get(products::entitlements))
        .route("/resources", get(resources::list).post(resources::create))
        .route(
            "/resources/:id",
            get(resources::read).put(resources::update).delete(resources::delete),
        )
        .with_state(state)
}
