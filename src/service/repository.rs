//! Repository over one root entity: plain reads, relationship-chain reads, and single-row
//! mutations. Every operation is one statement per round trip (plus a count for paged reads).

use super::CrudService;
use crate::entity::{Chain, ChainLink, EntityDescriptor, TableNameCache};
use crate::error::AppError;
use crate::hydrate::{Hydrator, Node, RawRow};
use crate::paging::{Paged, Paging};
use crate::sql::{self, Filter};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct Repository {
    entity: &'static EntityDescriptor,
    tables: Arc<TableNameCache>,
    pool: PgPool,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").field("entity", &self.entity.alias).finish()
    }
}

fn typed<T: DeserializeOwned>(row: RawRow) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(row))
        .map_err(|e| AppError::Configuration(format!("row does not match declared type: {}", e)))
}

impl Repository {
    pub fn new(entity: &'static EntityDescriptor, tables: Arc<TableNameCache>, pool: PgPool) -> Self {
        Repository { entity, tables, pool }
    }

    pub fn entity(&self) -> &'static EntityDescriptor {
        self.entity
    }

    fn link(&self, entity: &'static EntityDescriptor) -> ChainLink {
        ChainLink {
            entity,
            table: self.tables.resolve(entity),
        }
    }

    fn not_found(&self) -> AppError {
        AppError::NotFound(self.entity.label().to_string())
    }

    /// Root rows matching `filter` within `paging`, plus the total matching count.
    pub async fn find_all<T: DeserializeOwned>(
        &self,
        filter: &Filter,
        paging: Option<Paging>,
    ) -> Result<Paged<T>, AppError> {
        let link = self.link(self.entity);
        let list = sql::select_list(&link, filter, paging)?;
        let count = sql::count_roots(&link, filter)?;
        let (rows, count) = tokio::try_join!(
            CrudService::query_many(&self.pool, &list),
            CrudService::count(&self.pool, &count)
        )?;
        let items = rows.into_iter().map(typed).collect::<Result<Vec<T>, _>>()?;
        Ok(Paged::new(items, count))
    }

    /// First row matching `filter`, or NotFound.
    pub async fn find_by_id<T: DeserializeOwned>(&self, filter: &Filter) -> Result<T, AppError> {
        let link = self.link(self.entity);
        let q = sql::select_list(&link, filter, Some(Paging { offset: 0, limit: 1 }))?;
        let row = CrudService::query_optional(&self.pool, &q).await?;
        row.map(typed).unwrap_or_else(|| Err(self.not_found()))
    }

    async fn find_nodes(
        &self,
        chain: &Chain,
        filter: &Filter,
        paging: Option<Paging>,
    ) -> Result<Vec<Node>, AppError> {
        let resolved = chain.resolve(&self.tables);
        let q = sql::select_chain(&resolved, filter, paging)?;
        let rows = CrudService::query_many(&self.pool, &q).await?;
        Hydrator::new(&resolved).hydrate(&rows)
    }

    /// Root rows joined through `related` (a linear chain starting at this repository's
    /// entity), hydrated into nested `T`s. The paging window and the count apply to roots.
    pub async fn find_and_count_with_related<T: DeserializeOwned>(
        &self,
        filter: &Filter,
        paging: Option<Paging>,
        related: &[&'static EntityDescriptor],
    ) -> Result<Paged<T>, AppError> {
        let chain = Chain::joined(self.entity, related)?;
        let count = sql::count_roots(&self.link(self.entity), filter)?;
        let (nodes, count) = tokio::try_join!(
            self.find_nodes(&chain, filter, paging),
            CrudService::count(&self.pool, &count)
        )?;
        let items = nodes.into_iter().map(Node::into_typed).collect::<Result<Vec<T>, _>>()?;
        Ok(Paged::new(items, count))
    }

    /// Single root joined through `related`, or NotFound.
    pub async fn find_one_with_related<T: DeserializeOwned>(
        &self,
        filter: &Filter,
        related: &[&'static EntityDescriptor],
    ) -> Result<T, AppError> {
        let chain = Chain::joined(self.entity, related)?;
        let nodes = self
            .find_nodes(&chain, filter, Some(Paging { offset: 0, limit: 1 }))
            .await?;
        match nodes.into_iter().next() {
            Some(node) => node.into_typed(),
            None => Err(self.not_found()),
        }
    }

    /// Distinct `child` rows referenced by the containment column of parent `parent_id`.
    /// A missing parent or an empty containment column gives `([], 0)`.
    pub async fn find_related_and_count_by<T: DeserializeOwned>(
        &self,
        parent_id: i64,
        child: &'static EntityDescriptor,
    ) -> Result<Paged<T>, AppError> {
        Chain::joined(self.entity, &[child])?;
        let q = sql::select_related_distinct(&self.link(self.entity), &self.link(child), parent_id);
        let rows = CrudService::query_many(&self.pool, &q).await?;
        let count = rows.len() as i64;
        let items = rows.into_iter().map(typed).collect::<Result<Vec<T>, _>>()?;
        Ok(Paged::new(items, count))
    }

    /// Insert one row; returns it as stored (defaults applied).
    pub async fn create<T: DeserializeOwned>(&self, attributes: &HashMap<String, Value>) -> Result<T, AppError> {
        let q = sql::insert(&self.link(self.entity), attributes);
        let row = CrudService::query_optional(&self.pool, &q)
            .await?
            .ok_or_else(|| AppError::Db(sqlx::Error::RowNotFound))?;
        typed(row)
    }

    /// Update exactly one live row by primary key and return the post-update row.
    pub async fn update_by_id<T: DeserializeOwned>(
        &self,
        id: i64,
        attributes: &HashMap<String, Value>,
    ) -> Result<T, AppError> {
        let q = sql::update_by_id(&self.link(self.entity), id, attributes);
        let mut rows = CrudService::query_many(&self.pool, &q).await?;
        match rows.len() {
            0 => Err(self.not_found()),
            1 => typed(rows.remove(0)),
            n => {
                tracing::error!(entity = self.entity.alias, id, rows = n, "update by id matched several rows");
                Err(AppError::DataIntegrity(format!(
                    "update of {} {} matched {} rows",
                    self.entity.alias, id, n
                )))
            }
        }
    }

    /// Stamp `deleted_at` on a live row. Returns the number of rows affected.
    pub async fn soft_delete(&self, id: i64) -> Result<u64, AppError> {
        let q = sql::soft_delete(&self.link(self.entity), id)?;
        CrudService::execute(&self.pool, &q).await
    }
}
