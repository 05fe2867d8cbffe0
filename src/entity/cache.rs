//! Per-repository memo of entity -> storage name.
//!
//! Resolution is deterministic for a given schema, so concurrent first calls may both run the
//! lookup; whichever insert lands first is kept and both callers observe the same value.

use super::descriptor::EntityDescriptor;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Physical storage name of an entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableName {
    pub schema: String,
    pub table: String,
}

impl TableName {
    /// Quoted, schema-qualified name for SQL.
    pub fn qualified(&self) -> String {
        format!("{}.{}", quoted(&self.schema), quoted(&self.table))
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Metadata lookup behind the cache.
pub trait TableNameSource: Send + Sync {
    fn lookup(&self, entity: &EntityDescriptor) -> TableName;
}

/// Places every entity table in one configured schema.
#[derive(Clone, Debug)]
pub struct SchemaTables {
    pub schema: String,
}

impl SchemaTables {
    pub fn new(schema: impl Into<String>) -> Self {
        SchemaTables { schema: schema.into() }
    }
}

impl TableNameSource for SchemaTables {
    fn lookup(&self, entity: &EntityDescriptor) -> TableName {
        TableName {
            schema: self.schema.clone(),
            table: entity.table.to_string(),
        }
    }
}

pub struct TableNameCache {
    source: Box<dyn TableNameSource>,
    names: RwLock<HashMap<&'static str, Arc<TableName>>>,
}

impl TableNameCache {
    pub fn new(source: impl TableNameSource + 'static) -> Self {
        TableNameCache {
            source: Box::new(source),
            names: RwLock::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, entity: &EntityDescriptor) -> Arc<TableName> {
        if let Some(name) = self
            .names
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(entity.alias)
        {
            return Arc::clone(name);
        }
        let resolved = Arc::new(self.source.lookup(entity));
        tracing::debug!(entity = entity.alias, table = %resolved.qualified(), "resolved table name");
        let mut names = self.names.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(names.entry(entity.alias).or_insert(resolved))
    }

    pub fn len(&self) -> usize {
        self.names.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TableNameCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableNameCache").field("cached", &self.len()).finish()
    }
}
