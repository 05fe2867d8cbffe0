//! Product catalog: products, entitlements and resources linked through integer-array
//! containment columns, served over REST from PostgreSQL.
//!
//! Reads can join a linear chain of entities (product -> entitlement -> resource) in one
//! statement and hydrate the flat rows back into nested items.

pub mod case;
pub mod config;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod freshness;
pub mod handlers;
pub mod hydrate;
pub mod models;
pub mod paging;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::Config;
pub use error::{AppError, ConfigError};
pub use paging::{Paged, Paging};
pub use routes::{app_router, API_PREFIX};
pub use service::{EntitlementService, ProductService, Repository, ResourceService};
pub use state::AppState;
