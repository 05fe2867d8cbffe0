//! Convert serde_json::Value to types that sqlx can bind.
//!
//! Every placeholder the builder emits carries an explicit cast (`$1::int4[]`), so each value
//! only needs to arrive with a type PostgreSQL can cast from. Nulls are sent as `text`.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value that can be bound to a PostgreSQL query. Converts from serde_json::Value.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    /// JSON arrays whose elements are all integers (containment columns).
    I64Array(Vec<i64>),
    Json(Value),
}

impl PgBindValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => PgBindValue::Null,
            Value::Bool(b) => PgBindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PgBindValue::I64(i)
                } else {
                    PgBindValue::F64(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => PgBindValue::String(s.clone()),
            Value::Array(items) => {
                let ints: Option<Vec<i64>> = items.iter().map(Value::as_i64).collect();
                match ints {
                    Some(ints) => PgBindValue::I64Array(ints),
                    None => PgBindValue::Json(v.clone()),
                }
            }
            Value::Object(_) => PgBindValue::Json(v.clone()),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => IsNull::Yes,
            PgBindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::String(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            PgBindValue::I64Array(v) => <Vec<i64> as Encode<Postgres>>::encode_by_ref(v, buf)?,
            PgBindValue::Json(v) => <serde_json::Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Null | PgBindValue::String(_) => <String as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::Bool(_) => <bool as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::I64(_) => <i64 as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::F64(_) => <f64 as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::I64Array(_) => <Vec<i64> as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::Json(_) => <serde_json::Value as sqlx::Type<Postgres>>::type_info(),
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}
