//! Row hydration: flat, alias-namespaced join rows back into a nested tree.
//!
//! Result columns are named `<alias><ALIAS_SEPARATOR><column>` (`entitlement_resource_ids`).
//! The alias is everything before the first separator, so aliases must not contain it while
//! column names may. A column whose prefix names no chain alias is a composer/hydrator
//! disagreement and is reported as [`AppError::DataIntegrity`].
//!
//! One pass over the rows, O(rows x chain length). Per chain position a dedup map keyed by
//! primary key holds the node built for that key; a node is linked under a given parent at
//! most once no matter how many rows re-surface the pair. A null primary key (outer-join miss)
//! stops the walk for that row at that position.

use crate::entity::{ResolvedChain, ALIAS_SEPARATOR};
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

pub type RawRow = Map<String, Value>;

/// A hydrated entity: its own attributes plus, except at the last chain position, the named
/// collection of its children.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub attributes: Map<String, Value>,
    pub children: Option<Children>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Children {
    pub name: String,
    pub items: Vec<Node>,
}

impl Node {
    /// Attributes with the child collection inserted under its name.
    pub fn into_value(self) -> Value {
        let mut map = self.attributes;
        if let Some(children) = self.children {
            let items = children.items.into_iter().map(Node::into_value).collect();
            map.insert(children.name, Value::Array(items));
        }
        Value::Object(map)
    }

    /// Deserialize into the caller's declared shape. A mismatch means the chain and the
    /// declared type disagree.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, AppError> {
        serde_json::from_value(self.into_value())
            .map_err(|e| AppError::Configuration(format!("hydrated row does not match declared type: {}", e)))
    }
}

/// Split a namespaced column into `(alias, column)`.
pub fn split_column(name: &str) -> Option<(&str, &str)> {
    name.split_once(ALIAS_SEPARATOR)
        .filter(|(alias, column)| !alias.is_empty() && !column.is_empty())
}

#[derive(Default)]
struct Slot {
    attributes: Map<String, Value>,
    children: Vec<usize>,
}

#[derive(Default)]
struct Level {
    by_key: HashMap<i64, usize>,
    slots: Vec<Slot>,
}

pub struct Hydrator<'a> {
    chain: &'a ResolvedChain,
    positions: HashMap<&'static str, usize>,
}

impl<'a> Hydrator<'a> {
    pub fn new(chain: &'a ResolvedChain) -> Self {
        let positions = chain
            .links
            .iter()
            .enumerate()
            .map(|(i, l)| (l.entity.alias, i))
            .collect();
        Hydrator { chain, positions }
    }

    /// Partition one row into an attribute bag per chain position.
    fn partition(&self, row: &RawRow) -> Result<Vec<Map<String, Value>>, AppError> {
        let mut bags = vec![Map::new(); self.chain.links.len()];
        for (key, value) in row {
            let (alias, column) = split_column(key)
                .ok_or_else(|| AppError::DataIntegrity(format!("result column '{}' has no entity prefix", key)))?;
            let position = *self
                .positions
                .get(alias)
                .ok_or_else(|| AppError::DataIntegrity(format!("result column '{}' names no chain entity", key)))?;
            bags[position].insert(column.to_string(), value.clone());
        }
        Ok(bags)
    }

    fn primary_key(&self, position: usize, bag: &Map<String, Value>) -> Result<Option<i64>, AppError> {
        let entity = self.chain.links[position].entity;
        match bag.get(entity.primary_key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v.as_i64().map(Some).ok_or_else(|| {
                AppError::DataIntegrity(format!("{}.{} is not an integer: {}", entity.alias, entity.primary_key, v))
            }),
        }
    }

    pub fn hydrate(&self, rows: &[RawRow]) -> Result<Vec<Node>, AppError> {
        let depth = self.chain.links.len();
        let mut levels: Vec<Level> = (0..depth).map(|_| Level::default()).collect();
        let mut roots: Vec<usize> = Vec::new();
        // (position, parent slot, child slot) pairs already linked.
        let mut linked: HashSet<(usize, usize, usize)> = HashSet::new();

        for row in rows {
            let mut bags = self.partition(row)?;
            let mut parent: Option<usize> = None;
            for (position, bag) in bags.iter_mut().enumerate() {
                let Some(key) = self.primary_key(position, bag)? else {
                    break;
                };
                let level = &mut levels[position];
                let slot = match level.by_key.get(&key) {
                    Some(&slot) => slot,
                    None => {
                        level.slots.push(Slot {
                            attributes: std::mem::take(bag),
                            children: Vec::new(),
                        });
                        let slot = level.slots.len() - 1;
                        level.by_key.insert(key, slot);
                        slot
                    }
                };
                match parent {
                    None => {
                        if linked.insert((0, 0, slot)) {
                            roots.push(slot);
                        }
                    }
                    Some(p) => {
                        if linked.insert((position, p, slot)) {
                            levels[position - 1].slots[p].children.push(slot);
                        }
                    }
                }
                parent = Some(slot);
            }
        }

        Ok(roots.into_iter().map(|slot| self.build(&levels, 0, slot)).collect())
    }

    /// Typed variant of [`hydrate`](Self::hydrate).
    pub fn hydrate_as<T: DeserializeOwned>(&self, rows: &[RawRow]) -> Result<Vec<T>, AppError> {
        self.hydrate(rows)?.into_iter().map(Node::into_typed).collect()
    }

    fn build(&self, levels: &[Level], position: usize, slot: usize) -> Node {
        let s = &levels[position].slots[slot];
        let children = (position + 1 < levels.len()).then(|| Children {
            name: self.chain.collection_name(position + 1).to_string(),
            items: s
                .children
                .iter()
                .map(|&child| self.build(levels, position + 1, child))
                .collect(),
        });
        Node {
            attributes: s.attributes.clone(),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Chain, Column, EntityDescriptor, SchemaTables, TableNameCache, ENTITLEMENT, PRODUCT, RESOURCE};
    use serde_json::json;

    static ROOT: EntityDescriptor = EntityDescriptor {
        alias: "root",
        table: "roots",
        primary_key: "id",
        columns: &[
            Column::managed("id", "int4"),
            Column::writable("name", "varchar"),
            Column::writable_with_default("child_ids", "int4[]"),
        ],
        deleted_at: None,
        updated_at: None,
    };

    static CHILD: EntityDescriptor = EntityDescriptor {
        alias: "child",
        table: "children",
        primary_key: "id",
        columns: &[Column::managed("id", "int4")],
        deleted_at: None,
        updated_at: None,
    };

    fn rows(values: Value) -> Vec<RawRow> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn resolved(root: &'static EntityDescriptor, related: &[&'static EntityDescriptor]) -> ResolvedChain {
        let cache = TableNameCache::new(SchemaTables::new("public"));
        let chain = if related.is_empty() {
            Chain::root(root).unwrap()
        } else {
            Chain::joined(root, related).unwrap()
        };
        chain.resolve(&cache)
    }

    #[test]
    fn worked_example_dedups_roots_and_keeps_empty_collections() {
        let chain = resolved(&ROOT, &[&CHILD]);
        let raw = rows(json!([
            {"root_id": 1, "root_name": "A", "child_id": 10},
            {"root_id": 1, "root_name": "A", "child_id": 11},
            {"root_id": 2, "root_name": "B", "child_id": null}
        ]));
        let out: Vec<Value> = Hydrator::new(&chain)
            .hydrate(&raw)
            .unwrap()
            .into_iter()
            .map(Node::into_value)
            .collect();
        assert_eq!(
            out,
            vec![
                json!({"id": 1, "name": "A", "children": [{"id": 10}, {"id": 11}]}),
                json!({"id": 2, "name": "B", "children": []}),
            ]
        );
    }

    #[test]
    fn empty_rows_hydrate_to_empty_list() {
        let chain = resolved(&ROOT, &[&CHILD]);
        assert!(Hydrator::new(&chain).hydrate(&[]).unwrap().is_empty());
    }

    #[test]
    fn root_only_chain_maps_one_node_per_row() {
        let chain = resolved(&ROOT, &[]);
        let raw = rows(json!([
            {"root_id": 1, "root_name": "A"},
            {"root_id": 2, "root_name": "B"},
            {"root_id": 3, "root_name": "C"}
        ]));
        let nodes = Hydrator::new(&chain).hydrate(&raw).unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(|n| n.children.is_none()));
    }

    #[test]
    fn all_null_children_give_empty_not_missing_collections() {
        let chain = resolved(&ROOT, &[&CHILD]);
        let raw = rows(json!([
            {"root_id": 1, "root_name": "A", "child_id": null},
            {"root_id": 2, "root_name": "B", "child_id": null}
        ]));
        for node in Hydrator::new(&chain).hydrate(&raw).unwrap() {
            let children = node.children.expect("collection present");
            assert_eq!(children.name, "children");
            assert!(children.items.is_empty());
        }
    }

    #[test]
    fn grandchild_expansion_does_not_duplicate_children() {
        let chain = resolved(&PRODUCT, &[&ENTITLEMENT, &RESOURCE]);
        let raw = rows(json!([
            {"product_id": 1, "entitlement_id": 5, "resource_id": 100},
            {"product_id": 1, "entitlement_id": 5, "resource_id": 101},
            {"product_id": 1, "entitlement_id": 6, "resource_id": null},
            {"product_id": 2, "entitlement_id": 5, "resource_id": 100},
            {"product_id": 2, "entitlement_id": 5, "resource_id": 101}
        ]));
        let out: Vec<Value> = Hydrator::new(&chain)
            .hydrate(&raw)
            .unwrap()
            .into_iter()
            .map(Node::into_value)
            .collect();
        assert_eq!(
            out,
            vec![
                json!({"id": 1, "entitlements": [
                    {"id": 5, "resources": [{"id": 100}, {"id": 101}]},
                    {"id": 6, "resources": []}
                ]}),
                json!({"id": 2, "entitlements": [
                    {"id": 5, "resources": [{"id": 100}, {"id": 101}]}
                ]}),
            ]
        );
    }

    #[test]
    fn top_level_count_equals_distinct_root_keys() {
        let chain = resolved(&ROOT, &[&CHILD]);
        let raw = rows(json!([
            {"root_id": 3, "child_id": 1},
            {"root_id": 1, "child_id": 1},
            {"root_id": 3, "child_id": 2},
            {"root_id": 2, "child_id": null},
            {"root_id": 1, "child_id": 3}
        ]));
        let nodes = Hydrator::new(&chain).hydrate(&raw).unwrap();
        let keys: Vec<i64> = nodes.iter().map(|n| n.attributes["id"].as_i64().unwrap()).collect();
        assert_eq!(keys, vec![3, 1, 2]);
    }

    #[test]
    fn column_names_keep_inner_separators() {
        assert_eq!(split_column("entitlement_resource_ids"), Some(("entitlement", "resource_ids")));
        assert_eq!(split_column("noseparator"), None);
        assert_eq!(split_column("_id"), None);
    }

    #[test]
    fn unattributable_column_is_data_integrity_fault() {
        let chain = resolved(&ROOT, &[&CHILD]);
        let raw = rows(json!([{"root_id": 1, "stranger_id": 4}]));
        let err = Hydrator::new(&chain).hydrate(&raw).unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
    }

    #[test]
    fn non_integer_key_is_data_integrity_fault() {
        let chain = resolved(&ROOT, &[]);
        let raw = rows(json!([{"root_id": "one"}]));
        assert!(matches!(Hydrator::new(&chain).hydrate(&raw), Err(AppError::DataIntegrity(_))));
    }

    #[test]
    fn typed_hydration_reports_shape_mismatch_as_configuration() {
        #[derive(serde::Deserialize)]
        #[allow(dead_code)]
        struct Flat {
            id: i64,
            name: String,
        }
        let chain = resolved(&ROOT, &[&CHILD]);
        let raw = rows(json!([{"root_id": 1, "root_name": "A", "child_id": 10}]));
        #[derive(serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        #[allow(dead_code)]
        struct Strict {
            id: i64,
            name: String,
        }
        assert!(Hydrator::new(&chain).hydrate_as::<Flat>(&raw).is_ok());
        assert!(matches!(
            Hydrator::new(&chain).hydrate_as::<Strict>(&raw),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn rehydration_is_deterministic() {
        let chain = resolved(&ROOT, &[&CHILD]);
        let raw = rows(json!([
            {"root_id": 1, "child_id": 2},
            {"root_id": 1, "child_id": 3}
        ]));
        let h = Hydrator::new(&chain);
        assert_eq!(h.hydrate(&raw).unwrap(), h.hydrate(&raw).unwrap());
    }
}
