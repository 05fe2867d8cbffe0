use super::{deleted, require_name, Repository};
use crate::entity::{TableNameCache, ENTITLEMENT, RESOURCE};
use crate::error::AppError;
use crate::models::{to_attributes, CreateEntitlement, Entitlement, Resource, UpdateEntitlement};
use crate::paging::{Paged, Paging};
use crate::sql::Filter;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct EntitlementService {
    repo: Repository,
}

fn check_counts(service_period_days: Option<i32>, quantity_per_period: Option<i32>) -> Result<(), AppError> {
    if service_period_days.is_some_and(|d| d < 0) || quantity_per_period.is_some_and(|q| q < 0) {
        return Err(AppError::Validation(
            "service_period_days and quantity_per_period must not be negative".into(),
        ));
    }
    Ok(())
}

impl EntitlementService {
    pub fn new(tables: Arc<TableNameCache>, pool: PgPool) -> Self {
        EntitlementService {
            repo: Repository::new(&ENTITLEMENT, tables, pool),
        }
    }

    pub async fn list(&self, paging: Paging) -> Result<Paged<Entitlement>, AppError> {
        self.repo.find_all(&Filter::new(), Some(paging)).await
    }

    pub async fn get(&self, id: i64) -> Result<Entitlement, AppError> {
        self.repo.find_by_id(&Filter::new().eq("id", id)).await
    }

    /// Resources granted by entitlement `id`; `([], 0)` when it has none or does not exist.
    pub async fn resources(&self, id: i64) -> Result<Paged<Resource>, AppError> {
        self.repo.find_related_and_count_by(id, &RESOURCE).await
    }

    pub async fn create(&self, dto: &CreateEntitlement) -> Result<Entitlement, AppError> {
        require_name(&dto.name)?;
        check_counts(Some(dto.service_period_days), Some(dto.quantity_per_period))?;
        self.repo.create(&to_attributes(dto)?).await
    }

    pub async fn update(&self, id: i64, dto: &UpdateEntitlement) -> Result<Entitlement, AppError> {
        if let Some(name) = &dto.name {
            require_name(name)?;
        }
        check_counts(dto.service_period_days, dto.quantity_per_period)?;
        self.repo.update_by_id(id, &to_attributes(dto)?).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        deleted(self.repo.soft_delete(id).await?, ENTITLEMENT.label())
    }
}
