//! Statement execution against PostgreSQL: binds builder parameters, decodes rows to JSON maps.

use crate::error::AppError;
use crate::hydrate::RawRow;
use crate::sql::{PgBindValue, QueryBuf};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

pub struct CrudService;

impl CrudService {
    /// Run a SELECT (or `RETURNING`) statement and decode every row.
    pub async fn query_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<RawRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = Self::bind_all(&q.sql, &q.params).fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_map).collect())
    }

    /// Run a statement expected to produce at most one row.
    pub async fn query_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<RawRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = Self::bind_all(&q.sql, &q.params).fetch_optional(pool).await?;
        Ok(row.as_ref().map(row_to_map))
    }

    /// Run a `SELECT COUNT(*)` statement.
    pub async fn count(pool: &PgPool, q: &QueryBuf) -> Result<i64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "count");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        Ok(query.fetch_one(pool).await?)
    }

    /// Run a statement without a result set; returns the number of affected rows.
    pub async fn execute(pool: &PgPool, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let done = Self::bind_all(&q.sql, &q.params).execute(pool).await?;
        Ok(done.rows_affected())
    }

    fn bind_all<'q>(sql: &'q str, params: &[Value]) -> Query<'q, Postgres, PgArguments> {
        let mut query = sqlx::query(sql);
        for p in params {
            query = query.bind(PgBindValue::from_json(p));
        }
        query
    }
}

fn row_to_map(row: &PgRow) -> RawRow {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = RawRow::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    map
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.and_utc().to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    // Containment columns (int4[] / int8[]).
    if let Ok(Some(ids)) = row.try_get::<Option<Vec<i32>>, _>(name) {
        return Value::Array(ids.into_iter().map(Value::from).collect());
    }
    if let Ok(Some(ids)) = row.try_get::<Option<Vec<i64>>, _>(name) {
        return Value::Array(ids.into_iter().map(Value::from).collect());
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
