use super::{deleted, require_name, Repository};
use crate::entity::{TableNameCache, ENTITLEMENT, PRODUCT, RESOURCE};
use crate::error::AppError;
use crate::models::{
    to_attributes, CreateProduct, Entitlement, EntitlementWithResources, Product, ProductQuery,
    ProductWith, UpdateProduct,
};
use crate::paging::{Paged, Paging};
use crate::sql::Filter;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ProductService {
    repo: Repository,
}

/// How much of the product -> entitlement -> resource chain a read hydrates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Depth {
    Product,
    Entitlements,
    Resources,
}

impl Depth {
    fn of(query: &ProductQuery) -> Self {
        if query.with_resources {
            Depth::Resources
        } else if query.with_entitlements {
            Depth::Entitlements
        } else {
            Depth::Product
        }
    }
}

fn to_json<T: Serialize>(item: &T) -> Result<Value, AppError> {
    serde_json::to_value(item).map_err(|e| AppError::Configuration(e.to_string()))
}

/// With entitlements attached the raw id list is redundant and is dropped from the item.
fn detach_entitlement_ids(mut item: Value) -> Value {
    if let Value::Object(map) = &mut item {
        map.remove("entitlement_ids");
    }
    item
}

fn paged_json<T: Serialize>(page: Paged<T>, nested: bool) -> Result<Paged<Value>, AppError> {
    let items = page
        .items
        .iter()
        .map(|p| to_json(p).map(|v| if nested { detach_entitlement_ids(v) } else { v }))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Paged::new(items, page.count))
}

impl ProductService {
    pub fn new(tables: Arc<TableNameCache>, pool: PgPool) -> Self {
        ProductService {
            repo: Repository::new(&PRODUCT, tables, pool),
        }
    }

    /// Products matching the query's filters, optionally with entitlements (and their
    /// resources) nested. Items are returned as JSON since their shape depends on the query.
    pub async fn list(&self, query: &ProductQuery, paging: Paging) -> Result<Paged<Value>, AppError> {
        let filter = query.to_filter();
        match Depth::of(query) {
            Depth::Product => {
                let page: Paged<Product> = self.repo.find_all(&filter, Some(paging)).await?;
                paged_json(page, false)
            }
            Depth::Entitlements => {
                let page: Paged<ProductWith<Entitlement>> = self
                    .repo
                    .find_and_count_with_related(&filter, Some(paging), &[&ENTITLEMENT])
                    .await?;
                paged_json(page, true)
            }
            Depth::Resources => {
                let page: Paged<ProductWith<EntitlementWithResources>> = self
                    .repo
                    .find_and_count_with_related(&filter, Some(paging), &[&ENTITLEMENT, &RESOURCE])
                    .await?;
                paged_json(page, true)
            }
        }
    }

    /// One product by id with the same nesting options as [`list`](Self::list); `region`
    /// still applies as a filter.
    pub async fn get(&self, id: i64, query: &ProductQuery) -> Result<Value, AppError> {
        let filter = query.to_filter_by_id(id);
        match Depth::of(query) {
            Depth::Product => to_json(&self.repo.find_by_id::<Product>(&filter).await?),
            Depth::Entitlements => {
                let item: ProductWith<Entitlement> =
                    self.repo.find_one_with_related(&filter, &[&ENTITLEMENT]).await?;
                to_json(&item).map(detach_entitlement_ids)
            }
            Depth::Resources => {
                let item: ProductWith<EntitlementWithResources> = self
                    .repo
                    .find_one_with_related(&filter, &[&ENTITLEMENT, &RESOURCE])
                    .await?;
                to_json(&item).map(detach_entitlement_ids)
            }
        }
    }

    /// Entitlements included in product `id`; `([], 0)` when it has none or does not exist.
    pub async fn entitlements(&self, id: i64) -> Result<Paged<Entitlement>, AppError> {
        self.repo.find_related_and_count_by(id, &ENTITLEMENT).await
    }

    pub async fn create(&self, dto: &CreateProduct) -> Result<Product, AppError> {
        require_name(&dto.name)?;
        self.repo.create(&to_attributes(dto)?).await
    }

    pub async fn update(&self, id: i64, dto: &UpdateProduct) -> Result<Product, AppError> {
        if let Some(name) = &dto.name {
            require_name(name)?;
        }
        self.repo.update_by_id(id, &to_attributes(dto)?).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        deleted(self.repo.soft_delete(id).await?, PRODUCT.label())
    }
}
