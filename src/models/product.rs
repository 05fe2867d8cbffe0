use super::Entitlement;
use crate::sql::Filter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub external_offerings: Vec<i32>,
    /// Containment column: ids of entitlements included in this product.
    pub entitlement_ids: Vec<i32>,
    pub region_ids: Vec<i32>,
    pub excluded_products: Vec<i32>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Product with its entitlements hydrated; `E` is [`Entitlement`] or
/// [`EntitlementWithResources`](super::EntitlementWithResources).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductWith<E = Entitlement> {
    #[serde(flatten)]
    pub product: Product,
    pub entitlements: Vec<E>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProduct {
    pub name: String,
    pub public: bool,
    #[serde(default)]
    pub external_offerings: Vec<i32>,
    #[serde(default)]
    pub entitlement_ids: Vec<i32>,
    #[serde(default)]
    pub region_ids: Vec<i32>,
    #[serde(default)]
    pub excluded_products: Vec<i32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_offerings: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entitlement_ids: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_ids: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_products: Option<Vec<i32>>,
}

/// Query-string filters for product reads (`?region=3&withEntitlements=true`). Other keys,
/// `id` included, are ignored: a product is selected by id only through the path.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Only products available in this region (`region_ids` contains it).
    pub region: Option<i64>,
    #[serde(default)]
    pub with_entitlements: bool,
    /// Also hydrate each entitlement's resources. Implies `with_entitlements`.
    #[serde(default)]
    pub with_resources: bool,
}

impl ProductQuery {
    pub fn to_filter(&self) -> Filter {
        self.narrow(Filter::new())
    }

    /// Filter for a single product: the primary key plus the same query narrowing.
    pub fn to_filter_by_id(&self, id: i64) -> Filter {
        self.narrow(Filter::new().eq("id", id))
    }

    fn narrow(&self, filter: Filter) -> Filter {
        match self.region {
            Some(region) => filter.contains("region_ids", region),
            None => filter,
        }
    }
}
