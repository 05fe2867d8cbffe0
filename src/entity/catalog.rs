//! The three catalog entities. Products hold `entitlement_ids`, entitlements hold `resource_ids`.

use super::descriptor::{Column, EntityDescriptor};

pub static PRODUCT: EntityDescriptor = EntityDescriptor {
    alias: "product",
    table: "products",
    primary_key: "id",
    columns: &[
        Column::managed("id", "int4"),
        Column::writable("name", "varchar"),
        Column::writable("public", "bool"),
        Column::managed("created_at", "timestamptz"),
        Column::managed("updated_at", "timestamptz"),
        Column::writable_with_default("external_offerings", "int4[]"),
        Column::writable_with_default("entitlement_ids", "int4[]"),
        Column::writable_with_default("region_ids", "int4[]"),
        Column::writable_with_default("excluded_products", "int4[]"),
        Column::managed("deleted_at", "timestamptz"),
    ],
    deleted_at: Some("deleted_at"),
    updated_at: Some("updated_at"),
};

pub static ENTITLEMENT: EntityDescriptor = EntityDescriptor {
    alias: "entitlement",
    table: "entitlements",
    primary_key: "id",
    columns: &[
        Column::managed("id", "int4"),
        Column::writable("name", "varchar"),
        Column::writable_with_default("resource_ids", "int4[]"),
        Column::writable("service_period_days", "int4"),
        Column::writable("quantity_per_period", "int4"),
        Column::writable_with_default("insurance_enabled_for", "int4[]"),
        Column::writable_with_default("region_ids", "int4[]"),
        Column::managed("created_at", "timestamptz"),
        Column::managed("updated_at", "timestamptz"),
        Column::managed("deleted_at", "timestamptz"),
    ],
    deleted_at: Some("deleted_at"),
    updated_at: Some("updated_at"),
};

pub static RESOURCE: EntityDescriptor = EntityDescriptor {
    alias: "resource",
    table: "resources",
    primary_key: "id",
    columns: &[
        Column::managed("id", "int4"),
        Column::writable("name", "varchar"),
        Column::writable("billable", "bool"),
        Column::writable("accepts_insurance", "bool"),
        Column::managed("created_at", "timestamptz"),
        Column::managed("updated_at", "timestamptz"),
        Column::managed("deleted_at", "timestamptz"),
    ],
    deleted_at: Some("deleted_at"),
    updated_at: Some("updated_at"),
};
