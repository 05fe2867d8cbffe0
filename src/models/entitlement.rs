use super::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Entitlement {
    pub id: i32,
    pub name: String,
    /// Containment column: ids of resources granted by this entitlement.
    pub resource_ids: Vec<i32>,
    pub service_period_days: i32,
    pub quantity_per_period: i32,
    pub insurance_enabled_for: Vec<i32>,
    pub region_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Entitlement with its resources hydrated from `resource_ids`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitlementWithResources {
    #[serde(flatten)]
    pub entitlement: Entitlement,
    pub resources: Vec<Resource>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateEntitlement {
    pub name: String,
    #[serde(default)]
    pub resource_ids: Vec<i32>,
    pub service_period_days: i32,
    pub quantity_per_period: i32,
    #[serde(default)]
    pub insurance_enabled_for: Vec<i32>,
    #[serde(default)]
    pub region_ids: Vec<i32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateEntitlement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_ids: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_period_days: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_per_period: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_enabled_for: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_ids: Option<Vec<i32>>,
}
