//! Entity descriptors, relationship chains and the table-name cache.

mod cache;
mod catalog;
mod chain;
mod descriptor;

pub use cache::{SchemaTables, TableName, TableNameCache, TableNameSource};
pub use catalog::{ENTITLEMENT, PRODUCT, RESOURCE};
pub use chain::{Chain, ChainLink, ResolvedChain};
pub use descriptor::{Column, EntityDescriptor, ALIAS_SEPARATOR};
