//! Builds parameterized SELECT, INSERT, UPDATE from entity descriptors.
//! Identifiers come from static descriptors only; values are always parameters.

use crate::entity::{ChainLink, Column, EntityDescriptor, ResolvedChain, ALIAS_SEPARATOR};
use crate::error::AppError;
use crate::paging::Paging;
use crate::sql::filter::{Filter, Predicate};
use serde_json::Value;
use std::collections::HashMap;

/// Quote identifier for PostgreSQL (safe: only from descriptors).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// Push a value and return its placeholder cast to `pg_type`.
    fn placeholder(&mut self, v: Value, pg_type: &str) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, pg_type)
    }
}

/// Namespaced result column for `alias`.`column`.
pub fn namespaced(alias: &str, column: &str) -> String {
    format!("{}{}{}", alias, ALIAS_SEPARATOR, column)
}

fn column_prefix(alias: Option<&str>) -> String {
    alias.map(|a| format!("{}.", quoted(a))).unwrap_or_default()
}

/// Plain SELECT list, optionally qualified by `alias`.
fn select_column_list(entity: &EntityDescriptor, alias: Option<&str>) -> String {
    let prefix = column_prefix(alias);
    entity
        .columns
        .iter()
        .map(|c| format!("{}{}", prefix, quoted(c.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT list with every column renamed to `<alias>_<column>`.
fn namespaced_column_list(entity: &EntityDescriptor) -> String {
    entity
        .columns
        .iter()
        .map(|c| {
            format!(
                "{}.{} AS {}",
                quoted(entity.alias),
                quoted(c.name),
                quoted(&namespaced(entity.alias, c.name))
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn live_row_condition(entity: &EntityDescriptor, alias: Option<&str>) -> Option<String> {
    entity
        .deleted_at
        .map(|col| format!("{}{} IS NULL", column_prefix(alias), quoted(col)))
}

/// Whether `value` can be cast to `pg_type` without overflow. Non-integral numbers never equal
/// an integer column. Non-numeric values and non-integer types are left to the database.
fn in_range(pg_type: &str, value: &Value) -> bool {
    let Some(n) = value.as_number() else { return true };
    match pg_type {
        "int2" => n.as_i64().is_some_and(|n| i16::try_from(n).is_ok()),
        "int4" => n.as_i64().is_some_and(|n| i32::try_from(n).is_ok()),
        "int8" => n.as_i64().is_some(),
        _ => true,
    }
}

/// `col = $n::type`, or `FALSE` when `value` is out of the column's range: such a value matches
/// no row and binding it would fail the cast.
fn equals_condition(q: &mut QueryBuf, prefix: &str, col: &Column, value: &Value) -> String {
    if !in_range(col.pg_type, value) {
        return "FALSE".to_string();
    }
    let ph = q.placeholder(value.clone(), col.pg_type);
    format!("{}{} = {}", prefix, quoted(col.name), ph)
}

fn primary_key_condition(q: &mut QueryBuf, entity: &EntityDescriptor, alias: Option<&str>, id: i64) -> String {
    let prefix = column_prefix(alias);
    match entity.column(entity.primary_key) {
        Some(col) => equals_condition(q, &prefix, col, &Value::from(id)),
        None => {
            let ph = q.placeholder(Value::from(id), "int8");
            format!("{}{} = {}", prefix, quoted(entity.primary_key), ph)
        }
    }
}

/// WHERE conditions for the root filter plus the soft-delete guard.
fn filter_conditions(
    q: &mut QueryBuf,
    entity: &EntityDescriptor,
    alias: Option<&str>,
    filter: &Filter,
) -> Result<Vec<String>, AppError> {
    let prefix = column_prefix(alias);
    let mut parts: Vec<String> = live_row_condition(entity, alias).into_iter().collect();
    for p in &filter.predicates {
        let col = entity.column(p.column()).ok_or_else(|| {
            AppError::Configuration(format!("{} has no column '{}' to filter on", entity.alias, p.column()))
        })?;
        match p {
            Predicate::Equals { value, .. } => {
                parts.push(equals_condition(q, &prefix, col, value));
            }
            Predicate::Contains { value, .. } => {
                let element_type = col.pg_type.strip_suffix("[]").ok_or_else(|| {
                    AppError::Configuration(format!(
                        "{}.{} is not an array column",
                        entity.alias, col.name
                    ))
                })?;
                let value = Value::from(*value);
                if !in_range(element_type, &value) {
                    parts.push("FALSE".to_string());
                    continue;
                }
                let ph = q.placeholder(value, element_type);
                parts.push(format!("{}{} @> ARRAY[{}]", prefix, quoted(col.name), ph));
            }
        }
    }
    Ok(parts)
}

fn where_clause(parts: &[String]) -> String {
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

fn window_clause(paging: Option<Paging>) -> String {
    paging
        .map(|p| format!(" LIMIT {} OFFSET {}", p.limit, p.offset))
        .unwrap_or_default()
}

/// Containment join condition: `parent.<child>_ids @> ARRAY[child.id]`.
fn containment_condition(parent: &EntityDescriptor, child: &EntityDescriptor) -> String {
    format!(
        "{}.{} @> ARRAY[{}.{}]",
        quoted(parent.alias),
        quoted(&parent.containment_column(child)),
        quoted(child.alias),
        quoted(child.primary_key)
    )
}

/// Relationship chain query. Selects every column of every chain entity namespaced by alias,
/// LEFT JOINs each entity onto the previous one through its containment column, and applies
/// `filter` and `paging` to the root rows only (inside a derived table), so the window bounds
/// root entities rather than joined rows.
pub fn select_chain(chain: &ResolvedChain, filter: &Filter, paging: Option<Paging>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let root = chain.root();
    let root_entity = root.entity;

    let root_conditions = filter_conditions(&mut q, root_entity, None, filter)?;
    let root_source = format!(
        "(SELECT * FROM {}{} ORDER BY {}{}) {}",
        root.table.qualified(),
        where_clause(&root_conditions),
        quoted(root_entity.primary_key),
        window_clause(paging),
        quoted(root_entity.alias)
    );

    let select_list = chain
        .links
        .iter()
        .map(|l| namespaced_column_list(l.entity))
        .collect::<Vec<_>>()
        .join(", ");

    let mut joins = String::new();
    for pair in chain.links.windows(2) {
        let (parent, child) = (pair[0].entity, &pair[1]);
        let mut on = vec![containment_condition(parent, child.entity)];
        on.extend(live_row_condition(child.entity, Some(child.entity.alias)));
        joins.push_str(&format!(
            " LEFT JOIN {} {} ON {}",
            child.table.qualified(),
            quoted(child.entity.alias),
            on.join(" AND ")
        ));
    }

    let order = chain
        .links
        .iter()
        .map(|l| format!("{}.{}", quoted(l.entity.alias), quoted(l.entity.primary_key)))
        .collect::<Vec<_>>()
        .join(", ");

    q.sql = format!("SELECT {} FROM {}{} ORDER BY {}", select_list, root_source, joins, order);
    Ok(q)
}

/// Count of root rows matching `filter`; no joins, no window.
pub fn count_roots(root: &ChainLink, filter: &Filter) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let conditions = filter_conditions(&mut q, root.entity, None, filter)?;
    q.sql = format!("SELECT COUNT(*) FROM {}{}", root.table.qualified(), where_clause(&conditions));
    Ok(q)
}

/// SELECT list with filter, ORDER BY pk, optional LIMIT/OFFSET. No joins.
pub fn select_list(link: &ChainLink, filter: &Filter, paging: Option<Paging>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let entity = link.entity;
    let conditions = filter_conditions(&mut q, entity, None, filter)?;
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}{}",
        select_column_list(entity, None),
        link.table.qualified(),
        where_clause(&conditions),
        quoted(entity.primary_key),
        window_clause(paging)
    );
    Ok(q)
}

/// Distinct children referenced by one parent's containment column. The child is the selected
/// table and the parent, joined through the same containment predicate, supplies the filter.
pub fn select_related_distinct(parent: &ChainLink, child: &ChainLink, parent_id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let (p, c) = (parent.entity, child.entity);
    let mut conditions = vec![primary_key_condition(&mut q, p, Some(p.alias), parent_id)];
    conditions.extend(live_row_condition(p, Some(p.alias)));
    conditions.extend(live_row_condition(c, Some(c.alias)));

    q.sql = format!(
        "SELECT DISTINCT {} FROM {} {} INNER JOIN {} {} ON {}{} ORDER BY {}.{}",
        select_column_list(c, Some(c.alias)),
        child.table.qualified(),
        quoted(c.alias),
        parent.table.qualified(),
        quoted(p.alias),
        containment_condition(p, c),
        where_clause(&conditions),
        quoted(c.alias),
        quoted(c.primary_key)
    );
    q
}

/// INSERT writable columns present in `body`; columns with a DB default are omitted when absent.
pub fn insert(link: &ChainLink, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let entity = link.entity;
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in entity.columns.iter().filter(|c| c.writable) {
        let val = body.get(c.name).cloned();
        if val.is_none() && c.has_default {
            continue;
        }
        placeholders.push(q.placeholder(val.unwrap_or(Value::Null), c.pg_type));
        cols.push(quoted(c.name));
    }
    q.sql = if cols.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            link.table.qualified(),
            select_column_list(entity, None)
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            link.table.qualified(),
            cols.join(", "),
            placeholders.join(", "),
            select_column_list(entity, None)
        )
    };
    q
}

/// UPDATE one live row by primary key: SET writable columns present in `body`, bump
/// `updated_at`, and return the post-update row(s).
pub fn update_by_id(link: &ChainLink, id: i64, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let entity = link.entity;
    let mut sets = Vec::new();
    // Descriptor order keeps the statement text stable regardless of map iteration order.
    for c in entity.columns.iter().filter(|c| c.writable) {
        let Some(v) = body.get(c.name) else { continue };
        let rhs = q.placeholder(v.clone(), c.pg_type);
        sets.push(format!("{} = {}", quoted(c.name), rhs));
    }
    if let Some(col) = entity.updated_at {
        sets.push(format!("{} = NOW()", quoted(col)));
    }
    if sets.is_empty() {
        // Nothing to change: touch the primary key so RETURNING still reports the match.
        sets.push(format!("{0} = {0}", quoted(entity.primary_key)));
    }
    let mut conditions = vec![primary_key_condition(&mut q, entity, None, id)];
    conditions.extend(live_row_condition(entity, None));
    q.sql = format!(
        "UPDATE {} SET {}{} RETURNING {}",
        link.table.qualified(),
        sets.join(", "),
        where_clause(&conditions),
        select_column_list(entity, None)
    );
    q
}

/// Soft delete by primary key: stamp `deleted_at` on the live row.
pub fn soft_delete(link: &ChainLink, id: i64) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let entity = link.entity;
    let deleted_at = entity
        .deleted_at
        .ok_or_else(|| AppError::Configuration(format!("{} does not support soft delete", entity.alias)))?;
    let id_condition = primary_key_condition(&mut q, entity, None, id);
    q.sql = format!(
        "UPDATE {} SET {} = NOW() WHERE {} AND {} IS NULL",
        link.table.qualified(),
        quoted(deleted_at),
        id_condition,
        quoted(deleted_at)
    );
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Chain, SchemaTables, TableNameCache, ENTITLEMENT, PRODUCT, RESOURCE};
    use serde_json::json;

    fn cache() -> TableNameCache {
        TableNameCache::new(SchemaTables::new("public"))
    }

    #[test]
    fn chain_joins_each_pair_through_containment() {
        let cache = cache();
        let chain = Chain::joined(&PRODUCT, &[&ENTITLEMENT, &RESOURCE]).unwrap().resolve(&cache);
        let q = select_chain(&chain, &Filter::new(), None).unwrap();
        assert!(q.sql.contains(
            r#"LEFT JOIN "public"."entitlements" "entitlement" ON "product"."entitlement_ids" @> ARRAY["entitlement"."id"] AND "entitlement"."deleted_at" IS NULL"#
        ));
        assert!(q.sql.contains(
            r#"LEFT JOIN "public"."resources" "resource" ON "entitlement"."resource_ids" @> ARRAY["resource"."id"]"#
        ));
        assert!(q.sql.contains(r#""product"."name" AS "product_name""#));
        assert!(q.sql.contains(r#""resource"."accepts_insurance" AS "resource_accepts_insurance""#));
        assert!(q.sql.ends_with(r#"ORDER BY "product"."id", "entitlement"."id", "resource"."id""#));
        assert!(q.params.is_empty());
    }

    #[test]
    fn window_and_filter_bound_root_rows_only() {
        let cache = cache();
        let chain = Chain::joined(&PRODUCT, &[&ENTITLEMENT]).unwrap().resolve(&cache);
        let filter = Filter::new().eq("id", 4).contains("region_ids", 2);
        let q = select_chain(&chain, &filter, Some(Paging { offset: 10, limit: 5 })).unwrap();
        assert!(q.sql.contains(
            r#"FROM (SELECT * FROM "public"."products" WHERE "deleted_at" IS NULL AND "id" = $1::int4 AND "region_ids" @> ARRAY[$2::int4] ORDER BY "id" LIMIT 5 OFFSET 10) "product" LEFT JOIN"#
        ));
        assert_eq!(q.params, vec![json!(4), json!(2)]);
    }

    #[test]
    fn root_only_chain_has_no_joins() {
        let cache = cache();
        let chain = Chain::root(&RESOURCE).unwrap().resolve(&cache);
        let q = select_chain(&chain, &Filter::new(), None).unwrap();
        assert!(!q.sql.contains("JOIN"));
        assert!(q.sql.contains(r#""resource"."id" AS "resource_id""#));
    }

    #[test]
    fn unknown_filter_column_is_configuration_error() {
        let cache = cache();
        let chain = Chain::root(&PRODUCT).unwrap().resolve(&cache);
        let err = select_chain(&chain, &Filter::new().eq("colour", "red"), None).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        let err = count_roots(chain.root(), &Filter::new().contains("name", 1)).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn count_uses_same_filter_without_join_or_window() {
        let cache = cache();
        let chain = Chain::joined(&PRODUCT, &[&ENTITLEMENT]).unwrap().resolve(&cache);
        let q = count_roots(chain.root(), &Filter::new().contains("region_ids", 3)).unwrap();
        assert_eq!(
            q.sql,
            r#"SELECT COUNT(*) FROM "public"."products" WHERE "deleted_at" IS NULL AND "region_ids" @> ARRAY[$1::int4]"#
        );
        assert_eq!(q.params, vec![json!(3)]);
    }

    #[test]
    fn related_lookup_selects_children_filtered_by_parent() {
        let cache = cache();
        let chain = Chain::joined(&ENTITLEMENT, &[&RESOURCE]).unwrap().resolve(&cache);
        let q = select_related_distinct(&chain.links[0], &chain.links[1], 12);
        assert!(q.sql.starts_with(r#"SELECT DISTINCT "resource"."id", "resource"."name""#));
        assert!(q.sql.contains(
            r#"FROM "public"."resources" "resource" INNER JOIN "public"."entitlements" "entitlement" ON "entitlement"."resource_ids" @> ARRAY["resource"."id"]"#
        ));
        assert!(q.sql.contains(r#"WHERE "entitlement"."id" = $1::int4"#));
        assert_eq!(q.params, vec![json!(12)]);
    }

    #[test]
    fn update_sets_known_writable_columns_in_descriptor_order() {
        let cache = cache();
        let link = Chain::root(&RESOURCE).unwrap().resolve(&cache).links.remove(0);
        let body: HashMap<String, Value> = [
            ("billable".to_string(), json!(true)),
            ("name".to_string(), json!("MRI")),
            ("created_at".to_string(), json!("2020-01-01T00:00:00Z")),
            ("bogus".to_string(), json!(1)),
        ]
        .into_iter()
        .collect();
        let q = update_by_id(&link, 9, &body);
        assert_eq!(
            q.sql,
            r#"UPDATE "public"."resources" SET "name" = $1::varchar, "billable" = $2::bool, "updated_at" = NOW() WHERE "id" = $3::int4 AND "deleted_at" IS NULL RETURNING "id", "name", "billable", "accepts_insurance", "created_at", "updated_at", "deleted_at""#
        );
        assert_eq!(q.params, vec![json!("MRI"), json!(true), json!(9)]);
    }

    #[test]
    fn insert_omits_defaulted_columns_when_absent() {
        let cache = cache();
        let link = Chain::root(&PRODUCT).unwrap().resolve(&cache).links.remove(0);
        let body: HashMap<String, Value> = [
            ("name".to_string(), json!("Plan")),
            ("public".to_string(), json!(false)),
            ("entitlement_ids".to_string(), json!([1, 2])),
        ]
        .into_iter()
        .collect();
        let q = insert(&link, &body);
        assert!(q.sql.starts_with(
            r#"INSERT INTO "public"."products" ("name", "public", "entitlement_ids") VALUES ($1::varchar, $2::bool, $3::int4[]) RETURNING"#
        ));
        assert_eq!(q.params.len(), 3);
    }

    #[test]
    fn ids_beyond_int4_match_nothing_without_binding() {
        let cache = cache();
        let link = Chain::root(&PRODUCT).unwrap().resolve(&cache).links.remove(0);
        let huge = 3_000_000_000_i64;

        let q = update_by_id(&link, huge, &HashMap::from([("name".to_string(), json!("x"))]));
        assert!(q.sql.contains(r#"WHERE FALSE AND "deleted_at" IS NULL"#));
        assert_eq!(q.params, vec![json!("x")]);

        let q = soft_delete(&link, huge).unwrap();
        assert!(q.sql.ends_with(r#"WHERE FALSE AND "deleted_at" IS NULL"#));
        assert!(q.params.is_empty());

        let chain = Chain::joined(&PRODUCT, &[&ENTITLEMENT]).unwrap().resolve(&cache);
        let q = select_related_distinct(&chain.links[0], &chain.links[1], huge);
        assert!(q.sql.contains("WHERE FALSE AND"));
        assert!(q.params.is_empty());

        let q = count_roots(&link, &Filter::new().eq("id", huge).contains("region_ids", huge)).unwrap();
        assert_eq!(
            q.sql,
            r#"SELECT COUNT(*) FROM "public"."products" WHERE "deleted_at" IS NULL AND FALSE AND FALSE"#
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn range_check_follows_column_type() {
        assert!(in_range("int4", &json!(i32::MAX)));
        assert!(!in_range("int4", &json!(i64::from(i32::MAX) + 1)));
        assert!(!in_range("int4", &json!(1.5)));
        assert!(!in_range("int2", &json!(40_000)));
        assert!(in_range("int8", &json!(3_000_000_000_i64)));
        assert!(!in_range("int8", &json!(u64::MAX)));
        assert!(in_range("varchar", &json!(u64::MAX)));
        assert!(in_range("int4", &json!("7")));
    }

    #[test]
    fn soft_delete_only_touches_live_rows() {
        let cache = cache();
        let link = Chain::root(&ENTITLEMENT).unwrap().resolve(&cache).links.remove(0);
        let q = soft_delete(&link, 3).unwrap();
        assert_eq!(
            q.sql,
            r#"UPDATE "public"."entitlements" SET "deleted_at" = NOW() WHERE "id" = $1::int4 AND "deleted_at" IS NULL"#
        );
    }
}
