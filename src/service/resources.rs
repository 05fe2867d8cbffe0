use super::{deleted, require_name, Repository};
use crate::entity::{TableNameCache, RESOURCE};
use crate::error::AppError;
use crate::models::{to_attributes, CreateResource, Resource, UpdateResource};
use crate::paging::{Paged, Paging};
use crate::sql::Filter;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ResourceService {
    repo: Repository,
}

impl ResourceService {
    pub fn new(tables: Arc<TableNameCache>, pool: PgPool) -> Self {
        ResourceService {
            repo: Repository::new(&RESOURCE, tables, pool),
        }
    }

    pub async fn list(&self, paging: Paging) -> Result<Paged<Resource>, AppError> {
        self.repo.find_all(&Filter::new(), Some(paging)).await
    }

    pub async fn get(&self, id: i64) -> Result<Resource, AppError> {
        self.repo.find_by_id(&Filter::new().eq("id", id)).await
    }

    pub async fn create(&self, dto: &CreateResource) -> Result<Resource, AppError> {
        require_name(&dto.name)?;
        self.repo.create(&to_attributes(dto)?).await
    }

    pub async fn update(&self, id: i64, dto: &UpdateResource) -> Result<Resource, AppError> {
        if let Some(name) = &dto.name {
            require_name(name)?;
        }
        self.repo.update_by_id(id, &to_attributes(dto)?).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        deleted(self.repo.soft_delete(id).await?, RESOURCE.label())
    }
}
