use super::cache::{TableName, TableNameCache};
use super::descriptor::{EntityDescriptor, ALIAS_SEPARATOR};
use crate::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;

/// Linear parent -> child -> grandchild path. Each entity is joined to the previous one through
/// the previous entity's `<alias>_ids` containment column. Branching is not representable.
#[derive(Clone, Debug)]
pub struct Chain {
    entities: Vec<&'static EntityDescriptor>,
}

impl Chain {
    /// Root-only chain (no joins).
    pub fn root(root: &'static EntityDescriptor) -> Result<Self, AppError> {
        Self::build(vec![root])
    }

    /// Root plus at least one related entity. An empty `related` list is a configuration error.
    pub fn joined(
        root: &'static EntityDescriptor,
        related: &[&'static EntityDescriptor],
    ) -> Result<Self, AppError> {
        if related.is_empty() {
            return Err(AppError::Configuration(format!(
                "relationship chain for {} requested without related entities",
                root.alias
            )));
        }
        let mut entities = Vec::with_capacity(related.len() + 1);
        entities.push(root);
        entities.extend_from_slice(related);
        Self::build(entities)
    }

    fn build(entities: Vec<&'static EntityDescriptor>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for e in &entities {
            if e.alias.is_empty() || e.alias.contains(ALIAS_SEPARATOR) {
                return Err(AppError::Configuration(format!(
                    "entity alias '{}' must be non-empty and must not contain '{}'",
                    e.alias, ALIAS_SEPARATOR
                )));
            }
            if !seen.insert(e.alias) {
                return Err(AppError::Configuration(format!(
                    "entity '{}' appears twice in relationship chain",
                    e.alias
                )));
            }
        }
        for pair in entities.windows(2) {
            let column = pair[0].containment_column(pair[1]);
            if pair[0].column(&column).is_none() {
                return Err(AppError::Configuration(format!(
                    "{} has no containment column {} for {}",
                    pair[0].alias, column, pair[1].alias
                )));
            }
        }
        Ok(Chain { entities })
    }

    /// Attach storage names from the cache.
    pub fn resolve(&self, tables: &TableNameCache) -> ResolvedChain {
        ResolvedChain {
            links: self
                .entities
                .iter()
                .map(|&e| ChainLink {
                    entity: e,
                    table: tables.resolve(e),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChainLink {
    pub entity: &'static EntityDescriptor,
    pub table: Arc<TableName>,
}

/// A [`Chain`] with storage names attached; shared by the composer and the hydrator.
#[derive(Clone, Debug)]
pub struct ResolvedChain {
    pub links: Vec<ChainLink>,
}

impl ResolvedChain {
    pub fn root(&self) -> &ChainLink {
        &self.links[0]
    }

    /// Collection name children at `position` are hydrated into (the child table name).
    pub fn collection_name(&self, position: usize) -> &str {
        &self.links[position].table.table
    }
}
