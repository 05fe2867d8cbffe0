//! Shared application state for all routes.

use crate::config::Config;
use crate::entity::{SchemaTables, TableNameCache};
use crate::service::{EntitlementService, ProductService, ResourceService};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub products: ProductService,
    pub entitlements: EntitlementService,
    pub resources: ResourceService,
}

impl AppState {
    /// Services share one table-name cache scoped to the configured schema.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let tables = Arc::new(TableNameCache::new(SchemaTables::new(config.db_schema.clone())));
        AppState {
            products: ProductService::new(Arc::clone(&tables), pool.clone()),
            entitlements: EntitlementService::new(Arc::clone(&tables), pool.clone()),
            resources: ResourceService::new(tables, pool.clone()),
            config: Arc::new(config),
            pool,
        }
    }
}
